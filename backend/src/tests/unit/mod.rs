pub mod filter_scenarios;
pub mod filter_user;
