use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use marker_core::db::{MemoryActionLogStore, MemoryLibraryAdapter};
use marker_core::Service;
use marker_model::{MediaItem, MediaItemId, MediaItemType, Section, SectionId};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECTION_ID: SectionId = SectionId(1);
const EPISODE_ID: MediaItemId = MediaItemId(12);
const EPISODE_DURATION: i64 = 600_000;

async fn test_app() -> axum::Router {
    let library = Arc::new(MemoryLibraryAdapter::new());
    library.seed_section(Section { id: SECTION_ID, name: "TV Shows".into(), section_type: MediaItemType::Show });
    library.seed_item(MediaItem {
        id: EPISODE_ID,
        item_type: MediaItemType::Episode,
        parent_id: None,
        section_id: SECTION_ID,
        duration: Some(EPISODE_DURATION),
        title: "Episode 1".into(),
    });
    let action_log = Arc::new(MemoryActionLogStore::new());
    let service = Arc::new(Service::new(library, Some(action_log), true, true));
    service.bootstrap(&[SECTION_ID]).await.expect("bootstrap");
    marker_server::dispatch::router(service)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn add_then_query_round_trips_over_http() {
    let app = test_app().await;

    let add_body = json!({"metadata_id": EPISODE_ID.get(), "start": 0, "end": 1000, "type": "intro", "final": 0});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/add")
                .header("content-type", "application/json")
                .body(Body::from(add_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["start"], 0);
    assert_eq!(created["end"], 1000);

    let response = app
        .oneshot(Request::builder().uri(format!("/query?keys={}", EPISODE_ID.get())).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let markers = body_json(response).await;
    assert_eq!(markers[EPISODE_ID.get().to_string()].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn add_with_flipped_interval_is_bad_request() {
    let app = test_app().await;
    let add_body = json!({"metadata_id": EPISODE_ID.get(), "start": 1000, "end": 0, "type": "intro", "final": 0});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/add")
                .header("content-type", "application/json")
                .body(Body::from(add_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_unknown_marker_is_not_found() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().method("POST").uri("/delete/999999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_threads_user_created_flag_over_http() {
    let app = test_app().await;

    let add_body = json!({"metadata_id": EPISODE_ID.get(), "start": 0, "end": 1000, "type": "intro", "final": 0});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/add")
                .header("content-type", "application/json")
                .body(Body::from(add_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let marker_id = created["id"].as_i64().unwrap();

    let edit_body = json!({"start": 0, "end": 2000, "type": "intro", "final": 0, "userCreated": 0});
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/edit/{marker_id}"))
                .header("content-type", "application/json")
                .body(Body::from(edit_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["end"], 2000);
    assert_eq!(edited["created_by_user"], false);
}

#[tokio::test]
async fn suspend_then_add_is_service_unavailable() {
    let app = test_app().await;
    let response =
        app.clone().oneshot(Request::builder().method("POST").uri("/suspend").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let add_body = json!({"metadata_id": EPISODE_ID.get(), "start": 0, "end": 1000, "type": "intro", "final": 0});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/add")
                .header("content-type", "application/json")
                .body(Body::from(add_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
