mod common;

use common::{fixture, fixture_no_backup, EPISODE_ID, SECTION_ID};
use marker_contracts::LibraryAdapter;
use marker_core::MarkerError;
use marker_model::MarkerType;

/// Scenario 6: add a marker, have the foreign library silently delete it
/// (bypassing `Service::delete`, so no `Delete` log entry is written), and
/// confirm the reconciler surfaces it as a purge candidate. Restoring it
/// re-adds an equal marker and clears the candidate.
#[tokio::test]
async fn purge_round_trip() {
    let (service, library) = fixture().await;
    let marker = service.add(EPISODE_ID, 10_000, 20_000, MarkerType::Intro, false, true).await.unwrap();

    // Simulate the foreign application wiping the row out from under us.
    library.delete_marker(marker.id, &[]).await.unwrap();

    // Nothing rebuilds the purge index until the next bootstrap/resume.
    service.suspend().await.unwrap();
    service.resume(&[SECTION_ID]).await.unwrap();

    let candidates = service.purge_check(EPISODE_ID).await.expect("purge_check");
    assert_eq!(candidates.len(), 1);
    let candidate = &candidates[0];
    assert_eq!(candidate.start, marker.start);
    assert_eq!(candidate.end, marker.end);
    assert_eq!(candidate.marker_type, marker.marker_type);

    let restored = service.restore(candidate.old_marker_id, SECTION_ID).await.expect("restore");
    assert_eq!(restored.start, marker.start);
    assert_eq!(restored.end, marker.end);
    assert_eq!(restored.marker_type, marker.marker_type);
    assert_eq!(restored.is_final, marker.is_final);

    let remaining = service.purge_check(EPISODE_ID).await.unwrap();
    assert!(remaining.is_empty());
}

/// Ignoring a purge candidate clears it from the index without
/// recreating the marker.
#[tokio::test]
async fn ignore_purge_drops_candidate_without_restoring() {
    let (service, library) = fixture().await;
    let marker = service.add(EPISODE_ID, 10_000, 20_000, MarkerType::Intro, false, true).await.unwrap();
    library.delete_marker(marker.id, &[]).await.unwrap();
    service.suspend().await.unwrap();
    service.resume(&[SECTION_ID]).await.unwrap();

    let candidates = service.purge_check(EPISODE_ID).await.unwrap();
    assert_eq!(candidates.len(), 1);

    service.ignore_purge(candidates[0].old_marker_id, SECTION_ID).await.expect("ignore_purge");

    let remaining = service.purge_check(EPISODE_ID).await.unwrap();
    assert!(remaining.is_empty());

    let live = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    assert!(live[&EPISODE_ID].is_empty());
}

/// Restoring or ignoring an id with no matching candidate is `NotFound`.
#[tokio::test]
async fn restore_unknown_candidate_is_not_found() {
    let (service, _library) = fixture().await;
    let err = service.restore(marker_model::MarkerId(12_345), SECTION_ID).await.unwrap_err();
    assert!(matches!(err, MarkerError::NotFound(_)));
}

/// Purge/restore/ignore all require the action log; with it disabled they
/// fail `FeatureDisabled` rather than silently no-op'ing.
#[tokio::test]
async fn purge_operations_require_backup_actions() {
    let (service, _library) = fixture_no_backup().await;

    assert!(matches!(
        service.purge_check(EPISODE_ID).await.unwrap_err(),
        MarkerError::FeatureDisabled(_)
    ));
    assert!(matches!(
        service.purges_for_section(SECTION_ID).await.unwrap_err(),
        MarkerError::FeatureDisabled(_)
    ));
    assert!(matches!(
        service.restore(marker_model::MarkerId(1), SECTION_ID).await.unwrap_err(),
        MarkerError::FeatureDisabled(_)
    ));
    assert!(matches!(
        service.ignore_purge(marker_model::MarkerId(1), SECTION_ID).await.unwrap_err(),
        MarkerError::FeatureDisabled(_)
    ));
}
