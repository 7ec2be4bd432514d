//! Filter conditions for the `saints_users` table
//!
//! `translate` turns host-supplied `{field, operator, value}` triples into a
//! typed [`Conjunction`], which can be rendered as a parameterized `SELECT`
//! (see [`query`]) or evaluated against records in memory (see [`evaluate`]).

pub mod conditions;
pub mod evaluate;
pub mod query;

use pieces_shared::UserField;

pub use conditions::{translate, Conjunction, FilterValue, Predicate, PredicateKind};

/// Rejected filter input. Translation never produces a partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unsupported operator: {operator}")]
    UnsupportedOperator { field: UserField, operator: String },

    #[error("Operator {operator} cannot be applied to field {field}")]
    OperatorNotApplicable { field: UserField, operator: String },

    #[error("Missing value for field {0}")]
    MissingValue(UserField),

    #[error("Invalid value for field {field}: {value} ({reason})")]
    InvalidValue {
        field: UserField,
        value: String,
        reason: String,
    },
}

impl FilterError {
    /// Field name the error is reported against
    pub fn subject(&self) -> String {
        match self {
            Self::UnknownField(name) => name.clone(),
            Self::UnsupportedOperator { field, .. }
            | Self::OperatorNotApplicable { field, .. }
            | Self::MissingValue(field)
            | Self::InvalidValue { field, .. } => field.property().to_string(),
        }
    }
}
