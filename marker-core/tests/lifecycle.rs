mod common;

use common::{fixture, EPISODE_ID, SECTION_ID};
use marker_core::MarkerError;
use marker_model::MarkerType;

/// Once suspended, mutating and read operations alike fail `Unavailable`
/// instead of hanging or silently operating on stale state.
#[tokio::test]
async fn suspend_blocks_further_operations() {
    let (service, _library) = fixture().await;
    service.add(EPISODE_ID, 0, 1_000, MarkerType::Intro, false, true).await.unwrap();

    service.suspend().await.expect("suspend succeeds");

    let err = service.add(EPISODE_ID, 2_000, 3_000, MarkerType::Intro, false, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::Unavailable(_)));

    let err = service.section_stats(SECTION_ID).await.unwrap_err();
    assert!(matches!(err, MarkerError::Unavailable(_)));
}

/// Resuming restores normal operation and rebuilds the cache/purge index.
#[tokio::test]
async fn resume_restores_operation_and_preserves_stats() {
    let (service, _library) = fixture().await;
    service.add(EPISODE_ID, 0, 1_000, MarkerType::Intro, false, true).await.unwrap();
    let before = service.section_stats(SECTION_ID).await.unwrap();

    service.suspend().await.unwrap();
    service.resume(&[SECTION_ID]).await.expect("resume succeeds");

    let after = service.section_stats(SECTION_ID).await.unwrap();
    assert_eq!(before, after);

    service.add(EPISODE_ID, 2_000, 3_000, MarkerType::Intro, false, true).await.expect("add succeeds again");
}

/// `begin_shutdown` is terminal: no further operation is admitted, even a
/// call to `resume`.
#[tokio::test]
async fn shutdown_is_terminal() {
    let (service, _library) = fixture().await;
    service.begin_shutdown().await;

    let err = service.add(EPISODE_ID, 0, 1_000, MarkerType::Intro, false, true).await.unwrap_err();
    assert!(matches!(err, MarkerError::Unavailable(_)));

    let err = service.resume(&[SECTION_ID]).await.unwrap_err();
    assert!(matches!(err, MarkerError::Unavailable(_)));
}
