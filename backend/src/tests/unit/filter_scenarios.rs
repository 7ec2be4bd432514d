use pieces_shared::FilterCondition;
use serde_json::json;

use crate::filters::{translate, FilterError};
use crate::pagination::PageWindow;
use crate::store::{MemoryUserStore, UserStore};
use crate::tests::fixtures::sample_users;

async fn matching_ids(conditions: &[FilterCondition]) -> Vec<i32> {
    let store = MemoryUserStore::new(sample_users());
    let conjunction = translate(conditions).expect("conditions should translate");
    store
        .fetch_users(&conjunction, &PageWindow::default())
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect()
}

#[tokio::test]
async fn test_platform_eq_returns_only_matching_ordered_by_id() {
    let ids = matching_ids(&[FilterCondition::equals("platform", json!("ios"))]).await;
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_no_conditions_matches_everything() {
    assert_eq!(matching_ids(&[]).await, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_case_insensitive_pattern_matches_substring() {
    let ids = matching_ids(&[FilterCondition::new("lastLocation", "ilike", Some(json!("smith")))]).await;
    assert_eq!(ids, vec![1, 5]);

    let ids = matching_ids(&[FilterCondition::new("lastLocation", "like", Some(json!("smith")))]).await;
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_negated_pattern_skips_missing_values() {
    let ids = matching_ids(&[FilterCondition::new("lastLocation", "notIlike", Some(json!("smith")))]).await;
    assert_eq!(ids, vec![4]);
}

#[tokio::test]
async fn test_null_checks() {
    assert_eq!(matching_ids(&[FilterCondition::is_null("trackAcceptedDate")]).await, vec![3, 4, 5]);
    assert_eq!(
        matching_ids(&[FilterCondition::new("trackAcceptedDate", "isNotNull", None)]).await,
        vec![1, 2]
    );
}

#[tokio::test]
async fn test_null_check_ignores_invalid_value() {
    let ids = matching_ids(&[FilterCondition::new("createdAt", "isNotNull", Some(json!("not-a-date")))]).await;
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_timestamp_comparison() {
    let ids = matching_ids(&[FilterCondition::new("createdAt", "gt", Some(json!("2024-01-10")))]).await;
    assert_eq!(ids, vec![5]);
}

#[tokio::test]
async fn test_conjunction_is_commutative() {
    let conditions = vec![
        FilterCondition::new("platform", "ne", Some(json!("ios"))),
        FilterCondition::new("trackAcceptedDate", "isNotNull", None),
        FilterCondition::new("id", "lte", Some(json!(4))),
    ];
    let expected = matching_ids(&conditions).await;
    assert_eq!(expected, vec![2]);

    let orders: [[usize; 3]; 5] = [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for order in orders {
        let permuted: Vec<_> = order.iter().map(|&i| conditions[i].clone()).collect();
        assert_eq!(matching_ids(&permuted).await, expected, "order {:?}", order);
    }
}

#[test]
fn test_unknown_field_blamed_before_other_failures() {
    let conditions = vec![
        FilterCondition::new("createdAt", "gt", Some(json!("not-a-date"))),
        FilterCondition::new("platform", "between", Some(json!("ios"))),
        FilterCondition::equals("doesNotExist", json!(1)),
    ];
    assert_eq!(
        translate(&conditions).unwrap_err(),
        FilterError::UnknownField("doesNotExist".to_string())
    );
}

#[test]
fn test_first_invalid_condition_is_reported() {
    let conditions = vec![
        FilterCondition::new("platform", "between", Some(json!("ios"))),
        FilterCondition::new("createdAt", "gt", Some(json!("not-a-date"))),
    ];
    assert!(matches!(
        translate(&conditions).unwrap_err(),
        FilterError::UnsupportedOperator { .. }
    ));

    let reversed: Vec<_> = conditions.into_iter().rev().collect();
    assert!(matches!(translate(&reversed).unwrap_err(), FilterError::InvalidValue { .. }));
}

#[test]
fn test_pagination_offsets() {
    let first = PageWindow::new(1, 100).unwrap();
    assert_eq!((first.offset(), first.limit()), (0, 100));

    let third = PageWindow::new(3, 50).unwrap();
    assert_eq!((third.offset(), third.limit()), (100, 50));
}
