pub mod api_pieces;
pub mod api_saints;
