//! Parameterized SQL for filtered user retrieval
//!
//! Column names come from the static `UserField` table; every operand is
//! bound as a parameter.

use pieces_shared::UserField;
use sqlx::{Postgres, QueryBuilder};

use super::conditions::{substring_pattern, Conjunction, FilterValue, Predicate, PredicateKind};
use crate::pagination::PageWindow;

pub const USERS_TABLE: &str = "saints_users";

fn user_columns() -> String {
    UserField::ALL
        .iter()
        .map(|f| f.column())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Integer(n) => builder.push_bind(*n),
        FilterValue::Text(s) => builder.push_bind(s.clone()),
        FilterValue::Timestamp(t) => builder.push_bind(*t),
    };
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    builder.push(predicate.field.column());

    let (sql_op, operand) = match &predicate.kind {
        PredicateKind::Eq(v) => (" = ", Some(v.clone())),
        PredicateKind::Ne(v) => (" <> ", Some(v.clone())),
        PredicateKind::Gt(v) => (" > ", Some(v.clone())),
        PredicateKind::Gte(v) => (" >= ", Some(v.clone())),
        PredicateKind::Lt(v) => (" < ", Some(v.clone())),
        PredicateKind::Lte(v) => (" <= ", Some(v.clone())),
        PredicateKind::Like(s) => (" LIKE ", Some(FilterValue::Text(substring_pattern(s)))),
        PredicateKind::ILike(s) => (" ILIKE ", Some(FilterValue::Text(substring_pattern(s)))),
        PredicateKind::NotILike(s) => (" NOT ILIKE ", Some(FilterValue::Text(substring_pattern(s)))),
        PredicateKind::IsNull => (" IS NULL", None),
        PredicateKind::IsNotNull => (" IS NOT NULL", None),
    };

    builder.push(sql_op);
    if let Some(value) = operand {
        push_value(builder, &value);
    }
}

/// Append `WHERE a AND b ...`; nothing for an empty conjunction
pub fn push_where(builder: &mut QueryBuilder<'static, Postgres>, conjunction: &Conjunction) {
    if conjunction.is_empty() {
        return;
    }
    for (i, predicate) in conjunction.predicates().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(builder, predicate);
    }
}

/// `SELECT ... WHERE ... ORDER BY id ASC LIMIT $n OFFSET $m`
pub fn select_users(conjunction: &Conjunction, window: &PageWindow) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM {}", user_columns(), USERS_TABLE));
    push_where(&mut builder, conjunction);
    builder.push(" ORDER BY id ASC LIMIT ");
    builder.push_bind(window.limit());
    builder.push(" OFFSET ");
    builder.push_bind(window.offset());
    builder
}
