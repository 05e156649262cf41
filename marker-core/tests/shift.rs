mod common;

use common::{fixture, EPISODE_DURATION, EPISODE_ID, SEASON_ID};
use marker_model::MarkerType;

/// Scenario 4: a uniform shift that pushes a marker's end past the parent's
/// duration is clamped (Cutoff) when not an outright Error.
#[tokio::test]
async fn shift_clamps_to_duration() {
    let (service, _library) = fixture().await;
    let marker = service
        .add(EPISODE_ID, EPISODE_DURATION - 10_000, EPISODE_DURATION - 1_000, MarkerType::Credits, true, true)
        .await
        .unwrap();

    let result = service.shift(SEASON_ID, 5_000, 5_000, false, &[]).await.expect("shift succeeds");
    assert!(result.applied);
    assert!(!result.conflict);
    assert!(!result.overflow);

    let shifted = result.all_markers.iter().find(|m| m.id == marker.id).unwrap();
    assert_eq!(shifted.end, EPISODE_DURATION);
    assert_eq!(shifted.start, marker.start + 5_000);
}

/// B3: a shift whose resulting interval is entirely out of range (here, the
/// whole marker pushed past the end of the episode) is classified Error and
/// refused without `force`.
#[tokio::test]
async fn shift_overflow_without_force_is_refused() {
    let (service, _library) = fixture().await;
    service.add(EPISODE_ID, EPISODE_DURATION - 5_000, EPISODE_DURATION, MarkerType::Credits, true, true).await.unwrap();

    let result = service.shift(SEASON_ID, EPISODE_DURATION, EPISODE_DURATION, false, &[]).await.unwrap();
    assert!(!result.applied);
    assert!(!result.conflict);
    assert!(result.overflow);
}

/// The same overflowing shift with `force` drops the out-of-range marker
/// and applies to the rest.
#[tokio::test]
async fn shift_overflow_with_force_drops_the_offender() {
    let (service, _library) = fixture().await;
    let keep = service.add(EPISODE_ID, 0, 1_000, MarkerType::Intro, false, true).await.unwrap();

    let result = service.shift(SEASON_ID, EPISODE_DURATION * 2, EPISODE_DURATION * 2, true, &[]).await.unwrap();
    assert!(result.applied);
    assert!(result.all_markers.is_empty());

    let remaining = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    assert!(remaining[&EPISODE_ID].iter().any(|m| m.id == keep.id));
}

/// Scenario 5 / B4: more than one live marker under the same parent is a
/// linked conflict; shift refuses (but does not mutate anything) unless
/// forced, and forcing moves every retained marker.
#[tokio::test]
async fn shift_linked_conflict_then_force() {
    let (service, _library) = fixture().await;
    let m1 = service.add(EPISODE_ID, 0, 1_000, MarkerType::Intro, false, true).await.unwrap();
    let m2 = service.add(EPISODE_ID, 2_000, 3_000, MarkerType::Commercial, false, true).await.unwrap();

    let refused = service.shift(SEASON_ID, 500, 500, false, &[]).await.unwrap();
    assert!(!refused.applied);
    assert!(refused.conflict);

    let after_refusal = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    let stored = &after_refusal[&EPISODE_ID];
    assert_eq!(stored.iter().find(|m| m.id == m1.id).unwrap().start, 0);
    assert_eq!(stored.iter().find(|m| m.id == m2.id).unwrap().start, 2_000);

    let forced = service.shift(SEASON_ID, 500, 500, true, &[]).await.unwrap();
    assert!(forced.applied);
    assert!(forced.all_markers.iter().any(|m| m.id == m1.id && m.start == 500));
    assert!(forced.all_markers.iter().any(|m| m.id == m2.id && m.start == 2_500));
}

/// A non-uniform shift (`d_start != d_end`) stretches each marker's length;
/// even when every marker individually lands `Clean`, the post-shift state
/// can overlap within a linked group. That must abort as `Internal` rather
/// than silently committing an I1 violation.
#[tokio::test]
async fn shift_rejects_post_shift_overlap_within_linked_group() {
    let (service, _library) = fixture().await;
    service.add(EPISODE_ID, 0, 2_000, MarkerType::Intro, false, true).await.unwrap();
    service.add(EPISODE_ID, 2_200, 5_000, MarkerType::Commercial, false, true).await.unwrap();

    // new A = [1000, 7000), new B = [3200, 10000) -- both individually
    // within [0, EPISODE_DURATION], but they now overlap.
    let err = service.shift(SEASON_ID, 1_000, 5_000, true, &[]).await.unwrap_err();
    assert!(matches!(err, marker_core::MarkerError::Internal(_)));

    let after = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    let stored = &after[&EPISODE_ID];
    assert_eq!(stored.iter().find(|m| m.start == 0).unwrap().end, 2_000);
    assert_eq!(stored.iter().find(|m| m.start == 2_200).unwrap().end, 5_000);
}

/// Ignoring one of two conflicting markers removes the conflict and shifts
/// only the retained one.
#[tokio::test]
async fn shift_with_ignored_id_skips_linked_conflict() {
    let (service, _library) = fixture().await;
    let kept = service.add(EPISODE_ID, 0, 1_000, MarkerType::Intro, false, true).await.unwrap();
    let ignored = service.add(EPISODE_ID, 2_000, 3_000, MarkerType::Commercial, false, true).await.unwrap();

    let result = service.shift(SEASON_ID, 500, 500, false, &[ignored.id]).await.unwrap();
    assert!(result.applied);
    assert!(!result.conflict);
    assert!(result.all_markers.iter().any(|m| m.id == kept.id && m.start == 500));
    assert!(result.all_markers.iter().all(|m| m.id != ignored.id));
}

/// R2: shifting by `+d` then `-d` restores the original interval when
/// neither pass crosses Cutoff or Error.
#[tokio::test]
async fn shift_forward_then_back_restores_interval() {
    let (service, _library) = fixture().await;
    let marker = service.add(EPISODE_ID, 10_000, 20_000, MarkerType::Intro, false, true).await.unwrap();

    service.shift(SEASON_ID, 5_000, 5_000, false, &[]).await.unwrap();
    let result = service.shift(SEASON_ID, -5_000, -5_000, false, &[]).await.unwrap();
    assert!(result.applied);

    let restored = result.all_markers.iter().find(|m| m.id == marker.id).unwrap();
    assert_eq!(restored.start, marker.start);
    assert_eq!(restored.end, marker.end);
}

/// `CheckShift` never mutates state, regardless of conflicts.
#[tokio::test]
async fn check_shift_is_read_only() {
    let (service, _library) = fixture().await;
    service.add(EPISODE_ID, 0, 1_000, MarkerType::Intro, false, true).await.unwrap();
    service.add(EPISODE_ID, 2_000, 3_000, MarkerType::Commercial, false, true).await.unwrap();

    let checked = service.check_shift(SEASON_ID).await.unwrap();
    assert!(!checked.applied);
    assert!(checked.conflict);
    assert_eq!(checked.all_markers.len(), 2);

    let after = service.markers_for_parents(&[EPISODE_ID]).await.unwrap();
    assert_eq!(after[&EPISODE_ID].len(), 2);
}

/// A delta of `(0, 0)` is always rejected up front.
#[tokio::test]
async fn shift_zero_delta_is_bad_request() {
    let (service, _library) = fixture().await;
    let err = service.shift(SEASON_ID, 0, 0, false, &[]).await.unwrap_err();
    assert!(matches!(err, marker_core::MarkerError::BadRequest(_)));
}
