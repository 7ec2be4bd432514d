// Condition translation - validates raw filter conditions against the user schema

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pieces_shared::{FieldKind, FilterCondition, FilterOperator, UserField};
use serde::Serialize;
use serde_json::Value;

use super::FilterError;

/// Operand after validation against the field's value rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// One atomic test, one variant per operator
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateKind {
    Eq(FilterValue),
    Ne(FilterValue),
    Gt(FilterValue),
    Gte(FilterValue),
    Lt(FilterValue),
    Lte(FilterValue),
    /// Raw substring; wrapped with `%` when rendered
    Like(String),
    ILike(String),
    NotILike(String),
    IsNull,
    IsNotNull,
}

impl PredicateKind {
    pub fn operator(&self) -> FilterOperator {
        match self {
            Self::Eq(_) => FilterOperator::Eq,
            Self::Ne(_) => FilterOperator::Ne,
            Self::Gt(_) => FilterOperator::Gt,
            Self::Gte(_) => FilterOperator::Gte,
            Self::Lt(_) => FilterOperator::Lt,
            Self::Lte(_) => FilterOperator::Lte,
            Self::Like(_) => FilterOperator::Like,
            Self::ILike(_) => FilterOperator::Ilike,
            Self::NotILike(_) => FilterOperator::NotIlike,
            Self::IsNull => FilterOperator::IsNull,
            Self::IsNotNull => FilterOperator::IsNotNull,
        }
    }

    /// The validated operand, if the operator takes one
    pub fn operand(&self) -> Option<FilterValue> {
        match self {
            Self::Eq(v) | Self::Ne(v) | Self::Gt(v) | Self::Gte(v) | Self::Lt(v) | Self::Lte(v) => {
                Some(v.clone())
            }
            Self::Like(s) | Self::ILike(s) | Self::NotILike(s) => Some(FilterValue::Text(s.clone())),
            Self::IsNull | Self::IsNotNull => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: UserField,
    pub kind: PredicateKind,
}

/// Normalised condition in the shape sent to campaign runners
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCondition {
    pub column: &'static str,
    pub operator: FilterOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

/// Predicates combined with AND, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conjunction {
    predicates: Vec<Predicate>,
}

impl Conjunction {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn normalized(&self) -> Vec<NormalizedCondition> {
        self.predicates
            .iter()
            .map(|p| NormalizedCondition {
                column: p.field.column(),
                operator: p.kind.operator(),
                value: p.kind.operand(),
            })
            .collect()
    }
}

/// Wrap a substring for LIKE-style matching
pub fn substring_pattern(value: &str) -> String {
    format!("%{}%", value)
}

/// Translate host conditions into a conjunction of typed predicates.
///
/// Field names are resolved for the whole batch first, so an unknown field is
/// reported even when an earlier condition carries a bad operator or value.
/// After that, the first failing condition in input order is reported.
pub fn translate(conditions: &[FilterCondition]) -> Result<Conjunction, FilterError> {
    let fields = conditions
        .iter()
        .map(|c| UserField::from_name(&c.field).ok_or_else(|| FilterError::UnknownField(c.field.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let predicates = conditions
        .iter()
        .zip(fields)
        .map(|(condition, field)| translate_one(condition, field))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Conjunction { predicates })
}

fn translate_one(condition: &FilterCondition, field: UserField) -> Result<Predicate, FilterError> {
    let operator = FilterOperator::parse(&condition.operator).ok_or_else(|| {
        FilterError::UnsupportedOperator {
            field,
            operator: condition.operator.clone(),
        }
    })?;

    if operator.is_pattern() && !field.kind().is_textual() {
        return Err(FilterError::OperatorNotApplicable {
            field,
            operator: operator.to_string(),
        });
    }

    let operand = || -> Result<FilterValue, FilterError> {
        let value = condition
            .value
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or(FilterError::MissingValue(field))?;
        coerce_value(field, value)
    };

    let kind = match operator {
        FilterOperator::Eq => PredicateKind::Eq(operand()?),
        FilterOperator::Ne => PredicateKind::Ne(operand()?),
        FilterOperator::Gt => PredicateKind::Gt(operand()?),
        FilterOperator::Gte => PredicateKind::Gte(operand()?),
        FilterOperator::Lt => PredicateKind::Lt(operand()?),
        FilterOperator::Lte => PredicateKind::Lte(operand()?),
        FilterOperator::Like => PredicateKind::Like(text_operand(operand()?)),
        FilterOperator::Ilike => PredicateKind::ILike(text_operand(operand()?)),
        FilterOperator::NotIlike => PredicateKind::NotILike(text_operand(operand()?)),
        FilterOperator::IsNull => PredicateKind::IsNull,
        FilterOperator::IsNotNull => PredicateKind::IsNotNull,
    };

    Ok(Predicate { field, kind })
}

// Pattern operators are restricted to textual fields, whose operands are always text.
fn text_operand(value: FilterValue) -> String {
    match value {
        FilterValue::Text(s) => s,
        FilterValue::Integer(n) => n.to_string(),
        FilterValue::Timestamp(t) => t.to_rfc3339(),
    }
}

/// Validate and coerce a raw JSON value against the field's rule
pub fn coerce_value(field: UserField, value: &Value) -> Result<FilterValue, FilterError> {
    let invalid = |reason: &str| FilterError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    match field.kind() {
        FieldKind::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64))
                .map(FilterValue::Integer)
                .ok_or_else(|| invalid("expected an integer")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(FilterValue::Integer)
                .map_err(|_| invalid("expected an integer")),
            _ => Err(invalid("expected an integer")),
        },
        FieldKind::Text => match value {
            Value::String(s) => Ok(FilterValue::Text(s.clone())),
            _ => Err(invalid("expected a string")),
        },
        FieldKind::Enumerated(allowed) => match value {
            Value::String(s) if allowed.contains(&s.as_str()) => Ok(FilterValue::Text(s.clone())),
            _ => Err(invalid(&format!("expected one of {}", allowed.join(", ")))),
        },
        FieldKind::Timestamp => match value {
            Value::String(s) => parse_timestamp(s)
                .map(FilterValue::Timestamp)
                .ok_or_else(|| invalid("expected a date")),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(FilterValue::Timestamp)
                .ok_or_else(|| invalid("expected a date")),
            _ => Err(invalid("expected a date")),
        },
    }
}

/// Accepts RFC 3339, naive date-times (read as UTC) and plain dates
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
