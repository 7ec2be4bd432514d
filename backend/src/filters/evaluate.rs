//! In-process evaluation of predicates with SQL semantics
//!
//! A `NULL` column never satisfies a comparison or a pattern (including
//! `NOT ILIKE`), mirroring Postgres three-valued logic in a `WHERE` clause.
//! Text ordering (`gt`, `lt`, ...) is byte order, not the database collation.

use std::cmp::Ordering;

use pieces_shared::{User, UserField};

use super::conditions::{substring_pattern, Conjunction, FilterValue, Predicate, PredicateKind};

/// Read a column of a user as a filter value
pub fn column_value(user: &User, field: UserField) -> Option<FilterValue> {
    match field {
        UserField::Id => Some(FilterValue::Integer(i64::from(user.id))),
        UserField::DeviceId => Some(FilterValue::Text(user.device_id.clone())),
        UserField::TrackAcceptedDate => user.track_accepted_date.map(FilterValue::Timestamp),
        UserField::NotificationsAcceptedDate => user.notifications_accepted_date.map(FilterValue::Timestamp),
        UserField::CreatedAt => user.created_at.map(FilterValue::Timestamp),
        UserField::Platform => user.platform.clone().map(FilterValue::Text),
        UserField::LastIp => user.last_ip.clone().map(FilterValue::Text),
        UserField::LastLocation => user.last_location.clone().map(FilterValue::Text),
    }
}

fn compare(left: &FilterValue, right: &FilterValue) -> Option<Ordering> {
    match (left, right) {
        (FilterValue::Integer(a), FilterValue::Integer(b)) => Some(a.cmp(b)),
        (FilterValue::Text(a), FilterValue::Text(b)) => Some(a.cmp(b)),
        (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl Predicate {
    pub fn matches(&self, user: &User) -> bool {
        let column = column_value(user, self.field);

        let ordering = |operand: &FilterValue| column.as_ref().and_then(|c| compare(c, operand));
        let text = || match &column {
            Some(FilterValue::Text(s)) => Some(s.as_str()),
            _ => None,
        };

        match &self.kind {
            PredicateKind::Eq(v) => ordering(v) == Some(Ordering::Equal),
            PredicateKind::Ne(v) => matches!(ordering(v), Some(o) if o != Ordering::Equal),
            PredicateKind::Gt(v) => ordering(v) == Some(Ordering::Greater),
            PredicateKind::Gte(v) => matches!(ordering(v), Some(Ordering::Greater | Ordering::Equal)),
            PredicateKind::Lt(v) => ordering(v) == Some(Ordering::Less),
            PredicateKind::Lte(v) => matches!(ordering(v), Some(Ordering::Less | Ordering::Equal)),
            PredicateKind::Like(s) => text().is_some_and(|t| like(t, &substring_pattern(s), false)),
            PredicateKind::ILike(s) => text().is_some_and(|t| like(t, &substring_pattern(s), true)),
            PredicateKind::NotILike(s) => text().is_some_and(|t| !like(t, &substring_pattern(s), true)),
            PredicateKind::IsNull => column.is_none(),
            PredicateKind::IsNotNull => column.is_some(),
        }
    }
}

impl Conjunction {
    pub fn matches(&self, user: &User) -> bool {
        self.predicates().iter().all(|p| p.matches(user))
    }
}

/// SQL `LIKE`: `%` matches any run, `_` one character, `\` escapes the next one
pub fn like(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let fold = |s: &str| -> Vec<char> {
        if case_insensitive {
            s.to_lowercase().chars().collect()
        } else {
            s.chars().collect()
        }
    };
    let text = fold(text);
    let pattern = fold(pattern);

    // Greedy matcher with single backtrack point on the last `%`
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('_') => {
                t += 1;
                p += 1;
            }
            Some('\\') if p + 1 < pattern.len() && pattern[p + 1] == text[t] => {
                t += 1;
                p += 2;
            }
            Some(c) if *c != '\\' && *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((bp, bt)) => {
                    backtrack = Some((bp, bt + 1));
                    p = bp + 1;
                    t = bt + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
