use pieces_shared::FilterCondition;
use serde_json::json;

use crate::error::AppError;
use crate::pieces::saints::filter_user::{filter_users, FilterUserProps};
use crate::store::MockUserStore;
use crate::tests::fixtures::UserFixture;

fn props(page: i64, users_per_page: i64, filters: Vec<FilterCondition>) -> FilterUserProps {
    FilterUserProps {
        page,
        users_per_page,
        filters,
    }
}

#[tokio::test]
async fn test_passes_window_and_conditions_to_store() {
    let mut store = MockUserStore::new();
    store
        .expect_fetch_users()
        .withf(|conjunction, window| conjunction.len() == 1 && window.offset() == 100 && window.limit() == 50)
        .times(1)
        .returning(|_, _| Ok(vec![UserFixture::new(101).platform("ios").build()]));

    let page = filter_users(&store, &props(3, 50, vec![FilterCondition::equals("platform", json!("ios"))]))
        .await
        .unwrap();

    assert_eq!(page.number_of_users, 1);
    assert_eq!(page.next_page, 4);
    assert_eq!(page.users[0].id, 101);
}

#[tokio::test]
async fn test_invalid_timestamp_never_reaches_store() {
    let mut store = MockUserStore::new();
    store.expect_fetch_users().times(0);

    let err = filter_users(
        &store,
        &props(1, 100, vec![FilterCondition::new("createdAt", "gt", Some(json!("not-a-date")))]),
    )
    .await
    .unwrap_err();

    match err {
        AppError::ValidationError { details } => assert!(details.contains_key("createdAt")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_field_never_reaches_store() {
    let mut store = MockUserStore::new();
    store.expect_fetch_users().times(0);

    let err = filter_users(&store, &props(1, 100, vec![FilterCondition::equals("doesNotExist", json!("x"))]))
        .await
        .unwrap_err();

    match err {
        AppError::ValidationError { details } => {
            assert_eq!(details["doesNotExist"], vec!["Unknown field: doesNotExist".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_rejects_out_of_range_page_size() {
    let mut store = MockUserStore::new();
    store.expect_fetch_users().times(0);

    for size in [0, 1001] {
        let err = filter_users(&store, &props(1, size, Vec::new())).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
    }
}

#[tokio::test]
async fn test_huge_page_is_rejected_before_store() {
    let mut store = MockUserStore::new();
    store.expect_fetch_users().times(0);

    let err = filter_users(&store, &props(i64::MAX, 1000, Vec::new())).await.unwrap_err();
    match err {
        AppError::ValidationError { details } => assert!(details.contains_key("page")),
        other => panic!("unexpected error: {:?}", other),
    }
}
