mod common;

use common::{fixture, EPISODE_ID, SECTION_ID};
use marker_core::MarkerError;
use marker_model::MarkerType;

/// Scenario 1: single add on an empty parent.
#[tokio::test]
async fn add_on_empty_parent() {
    let (service, _library) = fixture().await;

    let marker = service.add(EPISODE_ID, 0, 1000, MarkerType::Intro, false, true).await.expect("add succeeds");

    assert_eq!(marker.start, 0);
    assert_eq!(marker.end, 1000);
    assert_eq!(marker.index, 0);
    assert_eq!(marker.marker_type, MarkerType::Intro);

    let bucket = service.section_stats(SECTION_ID).await.expect("stats");
    assert_eq!(bucket.total_intros, 1);
    assert_eq!(bucket.total_credits, 0);
}

/// Scenario 2: a flipped interval is rejected and nothing is logged.
#[tokio::test]
async fn add_flipped_interval_is_bad_request() {
    let (service, _library) = fixture().await;

    let err = service.add(EPISODE_ID, 1000, 0, MarkerType::Intro, false, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::BadRequest(_)));

    let markers = service.markers_for_parents(&[EPISODE_ID]).await.expect("query");
    assert!(markers.get(&EPISODE_ID).map(|v| v.is_empty()).unwrap_or(true));
}

/// Scenario 3: editing into an overlap is a no-op (P2 preserved).
#[tokio::test]
async fn edit_into_overlap_is_rejected_and_state_unchanged() {
    let (service, _library) = fixture().await;

    let m1 = service.add(EPISODE_ID, 15_000, 45_000, MarkerType::Intro, false, true).await.unwrap();
    let m2 = service.add(EPISODE_ID, 60_000, 90_000, MarkerType::Credits, false, true).await.unwrap();

    let err = service.edit(m1.id, 30_000, 70_000, MarkerType::Intro, false, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::Overlap(_)));

    let markers = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    let stored = &markers[&EPISODE_ID];
    assert_eq!(stored.iter().find(|m| m.id == m1.id).unwrap().start, 15_000);
    assert_eq!(stored.iter().find(|m| m.id == m2.id).unwrap().start, 60_000);
}

/// B1: `start == end` is rejected.
#[tokio::test]
async fn add_zero_length_interval_is_bad_request() {
    let (service, _library) = fixture().await;
    let err = service.add(EPISODE_ID, 1000, 1000, MarkerType::Intro, false, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::BadRequest(_)));
}

/// B2: `end == duration` is allowed; `end == duration + 1` is rejected.
#[tokio::test]
async fn add_at_duration_boundary() {
    let (service, _library) = fixture().await;

    let ok = service
        .add(EPISODE_ID, common::EPISODE_DURATION - 1000, common::EPISODE_DURATION, MarkerType::Credits, true, true)
        .await
        .expect("end == duration is allowed");
    assert_eq!(ok.end, common::EPISODE_DURATION);

    let err = service.edit(ok.id, 0, common::EPISODE_DURATION + 1, MarkerType::Credits, true, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::BadRequest(_)));
}

/// `final` may only be set on Add when the type is `credits`.
#[tokio::test]
async fn add_final_on_non_credits_is_rejected() {
    let (service, _library) = fixture().await;
    let err = service.add(EPISODE_ID, 0, 1000, MarkerType::Intro, true, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::BadRequest(_)));
}

/// Edit silently clears `final` on a non-credits type rather than
/// rejecting (the documented Add/Edit asymmetry).
#[tokio::test]
async fn edit_clears_final_on_non_credits_instead_of_rejecting() {
    let (service, _library) = fixture().await;
    let marker = service.add(EPISODE_ID, 0, 1000, MarkerType::Credits, true, true).await.unwrap();

    let edited = service.edit(marker.id, 0, 1000, MarkerType::Intro, true, true).await.expect("edit succeeds");
    assert!(!edited.is_final);
    assert_eq!(edited.marker_type, MarkerType::Intro);
}

/// R1: `Add(m); Delete(m.id)` restores the pre-Add cache state; both ops
/// are recorded in the action log.
#[tokio::test]
async fn add_then_delete_round_trips_cache_and_log() {
    let (service, _library) = fixture().await;

    let before = service.section_stats(SECTION_ID).await.unwrap();
    let marker = service.add(EPISODE_ID, 0, 1000, MarkerType::Intro, false, true).await.unwrap();
    let deleted = service.delete(marker.id).await.expect("delete succeeds");
    assert_eq!(deleted.id, marker.id);

    let after = service.section_stats(SECTION_ID).await.unwrap();
    assert_eq!(before, after);

    let remaining = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    assert!(remaining[&EPISODE_ID].is_empty());
}

/// Deleting or editing an id that doesn't exist is `NotFound`.
#[tokio::test]
async fn edit_unknown_marker_is_not_found() {
    let (service, _library) = fixture().await;
    let err = service.edit(marker_model::MarkerId(999), 0, 1000, MarkerType::Intro, false, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::NotFound(_)));
}

/// Indices stay contiguous and start-ordered after interleaved adds (P1).
#[tokio::test]
async fn indices_stay_contiguous_after_inserts() {
    let (service, _library) = fixture().await;

    service.add(EPISODE_ID, 100_000, 120_000, MarkerType::Intro, false, true).await.unwrap();
    service.add(EPISODE_ID, 0, 10_000, MarkerType::Intro, false, true).await.unwrap();
    service.add(EPISODE_ID, 50_000, 60_000, MarkerType::Commercial, false, true).await.unwrap();

    let markers = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    let mut stored = markers[&EPISODE_ID].clone();
    stored.sort_by_key(|m| m.index);
    let starts: Vec<i64> = stored.iter().map(|m| m.start).collect();
    assert_eq!(starts, vec![0, 50_000, 100_000]);
    let indices: Vec<i32> = stored.iter().map(|m| m.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
