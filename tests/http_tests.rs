mod common;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use common::{date, memory_store, problem, CyclingSource, ScriptedSource};
use daily_problems::domain::{Category, DailyProblemSet};
use daily_problems::error::StoreError;
use daily_problems::store::ProblemStore;
use daily_problems::{build_router, AppConfig, AppState};
use serde_json::Value;
use tower::ServiceExt;

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn app() -> (Router, Arc<daily_problems::store::SqliteProblemStore>) {
    common::init_tracing();
    let store = memory_store();
    let state = common::app_state(store.clone(), Arc::new(ScriptedSource::new()));
    (build_router(state), store)
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = app();
    let (status, body) = get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn malformed_dates_are_rejected() {
    let (app, _) = app();
    for raw in ["02-30-2024", "2024-02-01", "2-1-2024", "13-01-2024", "today"] {
        let (status, body) = get(&app, &format!("/problems/date/{raw}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert_eq!(body, serde_json::json!({ "message": "Incorrect date format" }));
    }
}

#[tokio::test]
async fn unknown_date_returns_all_nulls() {
    let (app, _) = app();
    let (status, body) = get(&app, "/problems/date/02-01-2024").await;
    assert_eq!(status, StatusCode::OK);
    for key in ["ANY", "EASY", "MEDIUM", "HARD"] {
        assert!(body["problems"][key].is_null(), "{key}");
    }
}

#[tokio::test]
async fn stored_day_is_served_and_reads_are_idempotent() {
    let (app, store) = app();
    let mut set = DailyProblemSet::default();
    set.set(Category::Any, Some(problem("11")));
    set.set(Category::Hard, Some(problem("42")));
    store.save(date(2024, 2, 1), &set).await.unwrap();

    let (status, first) = get(&app, "/problems/date/02-01-2024").await;
    let (_, second) = get(&app, "/api/v1/problems/date/02-01-2024").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    let any = &first["problems"]["ANY"];
    assert_eq!(any["id"], "11");
    assert_eq!(any["title"], "Problem 11");
    assert_eq!(any["difficulty"], "MEDIUM");
    assert_eq!(any["url"], "https://leetcode.com/problems/problem-11");
    assert_eq!(any["topics"], serde_json::json!(["Array"]));
    assert!(first["problems"]["EASY"].is_null());
    assert_eq!(first["problems"]["HARD"]["id"], "42");
}

#[tokio::test]
async fn selector_run_is_visible_through_endpoint() {
    common::init_tracing();
    let store = memory_store();
    let state = common::app_state(store, Arc::new(CyclingSource::new(3)));
    let selector = state.selector.clone();
    let app = build_router(state);

    selector.run_for_date(date(2024, 12, 25)).await.unwrap();

    let (status, body) = get(&app, "/problems/date/12-25-2024").await;
    assert_eq!(status, StatusCode::OK);
    for category in Category::ALL {
        assert_eq!(body["problems"][category.as_str()]["id"], format!("{category}-0"));
    }
}

/// Every call fails, as if the database were unreachable.
struct BrokenStore;

#[async_trait]
impl ProblemStore for BrokenStore {
    async fn save(&self, _date: NaiveDate, _problems: &DailyProblemSet) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }

    async fn get_daily_problems(&self, _date: NaiveDate) -> Result<DailyProblemSet, StoreError> {
        Err(StoreError::Poisoned)
    }

    async fn recent_problem_ids(
        &self,
        _category: Category,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<HashSet<String>, StoreError> {
        Err(StoreError::Poisoned)
    }
}

#[tokio::test]
async fn store_failure_is_internal_error_without_detail() {
    common::init_tracing();
    let state = AppState::new(AppConfig::default(), Arc::new(BrokenStore), Arc::new(ScriptedSource::new()));
    let app = build_router(state);

    let (status, body) = get(&app, "/problems/date/02-01-2024").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "message": "Internal server error" }));

    // Format errors are still reported before the store is touched.
    let (status, _) = get(&app, "/problems/date/2024-02-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
