//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rota_core::{
  Error as CoreError,
  chore::{ChoreChanges, NewChore},
  clock::FixedClock,
  house::{HouseRole, NewHouse},
  occurrence::OccurrenceChanges,
  repeat::RepeatDelta,
  schedule::NewSchedule,
  store::{BundleVersions, ChoreStore, EditBundle},
  version::ClientVersion,
};
use uuid::Uuid;

use crate::SqliteStore;

const NOW: &str = "2025-06-01T10:00:00Z";

fn now() -> DateTime<Utc> { NOW.parse().unwrap() }

fn days(n: i64) -> RepeatDelta {
  RepeatDelta { days: n, ..RepeatDelta::default() }
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory_with_clock(Arc::new(FixedClock(now())))
    .await
    .expect("in-memory store")
}

fn new_house() -> NewHouse {
  NewHouse {
    name:        "Baker Street".into(),
    address:     Some("221B".into()),
    max_members: 4,
  }
}

fn weekly(assignee: Uuid) -> NewSchedule {
  NewSchedule {
    assignee_user_id:     assignee,
    start_date:           now(),
    repeat_delta:         days(7),
    generate_occurrences: true,
  }
}

/// A house with an owner and one extra member, plus one chore.
struct Fixture {
  owner:    Uuid,
  member:   Uuid,
  house_id: Uuid,
  chore_id: Uuid,
}

async fn fixture(s: &SqliteStore) -> Fixture {
  let owner = Uuid::new_v4();
  let member = Uuid::new_v4();
  let house = s.create_house(owner, new_house()).await.unwrap();
  s.add_member(house.house_id, member, HouseRole::Member)
    .await
    .unwrap();
  let chore = s
    .create_chore(house.house_id, NewChore {
      name:        "Dishes".into(),
      description: None,
      color:       Some("#00aaff".into()),
    })
    .await
    .unwrap();
  Fixture {
    owner,
    member,
    house_id: house.house_id,
    chore_id: chore.chore_id,
  }
}

fn conflict_message(err: CoreError) -> String {
  match err {
    CoreError::Conflict { message, .. } => message,
    other => panic!("expected conflict, got {other:?}"),
  }
}

// ─── Houses and membership ───────────────────────────────────────────────────

#[tokio::test]
async fn create_house_seeds_owner_membership() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let house = s.create_house(owner, new_house()).await.unwrap();

  assert_eq!(house.version, 1);
  let members = s.list_members(house.house_id).await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].user_id, owner);
  assert_eq!(members[0].role, HouseRole::Owner);
}

#[tokio::test]
async fn duplicate_membership_is_rejected() {
  let s = store().await;
  let f = fixture(&s).await;

  let err = s
    .add_member(f.house_id, f.member, HouseRole::Member)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Validation(msg) if msg == "User already in this house."));
}

#[tokio::test]
async fn full_house_rejects_new_members() {
  let s = store().await;
  let f = fixture(&s).await;

  // Capacity is 4; two seats are taken.
  s.add_member(f.house_id, Uuid::new_v4(), HouseRole::Member)
    .await
    .unwrap();
  s.add_member(f.house_id, Uuid::new_v4(), HouseRole::Member)
    .await
    .unwrap();

  let err = s
    .add_member(f.house_id, Uuid::new_v4(), HouseRole::Member)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Validation(msg) if msg == "House is full."));
}

#[tokio::test]
async fn delete_house_is_owner_only_and_cascades() {
  let s = store().await;
  let f = fixture(&s).await;

  let err = s
    .delete_house(f.member, f.house_id, Some(ClientVersion::Int(1)))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));

  s.delete_house(f.owner, f.house_id, Some(ClientVersion::Int(1)))
    .await
    .unwrap();

  assert!(matches!(
    s.get_house(f.house_id).await.unwrap_err(),
    CoreError::NotFound { .. }
  ));
  assert!(matches!(
    s.get_chore(f.house_id, f.chore_id).await.unwrap_err(),
    CoreError::NotFound { .. }
  ));
}

// ─── Chores and version checks ───────────────────────────────────────────────

#[tokio::test]
async fn update_chore_bumps_version_once() {
  let s = store().await;
  let f = fixture(&s).await;

  let updated = s
    .update_chore(
      f.house_id,
      f.chore_id,
      ChoreChanges { name: Some("Dry dishes".into()), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();
  assert_eq!(updated.name, "Dry dishes");
  assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn stale_chore_version_is_rejected_with_message() {
  let s = store().await;
  let f = fixture(&s).await;

  let err = s
    .update_chore(
      f.house_id,
      f.chore_id,
      ChoreChanges { name: Some("x".into()), ..Default::default() },
      Some(ClientVersion::Int(7)),
    )
    .await
    .unwrap_err();
  assert_eq!(conflict_message(err), "Chore has been modified.");
}

#[tokio::test]
async fn missing_version_is_rejected_with_message() {
  let s = store().await;
  let f = fixture(&s).await;

  let err = s
    .update_chore(
      f.house_id,
      f.chore_id,
      ChoreChanges { name: Some("x".into()), ..Default::default() },
      None,
    )
    .await
    .unwrap_err();
  assert_eq!(
    conflict_message(err),
    "Chore version is required for concurrency check."
  );
}

#[tokio::test]
async fn string_versions_are_accepted() {
  let s = store().await;
  let f = fixture(&s).await;

  s.update_chore(
    f.house_id,
    f.chore_id,
    ChoreChanges { name: Some("x".into()), ..Default::default() },
    Some(ClientVersion::Text("1".into())),
  )
  .await
  .unwrap();
}

// ─── Occurrence generation ───────────────────────────────────────────────────

#[tokio::test]
async fn weekly_schedule_fills_thirty_day_horizon() {
  let s = store().await;
  let f = fixture(&s).await;

  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  assert_eq!(schedule.version, 1);
  assert_eq!(generated.len(), 5); // start, +7, +14, +21, +28
  assert_eq!(generated[0].due_date, now());
  assert_eq!(generated[4].due_date, now() + TimeDelta::days(28));
  assert!(generated.iter().all(|o| o.version == 1 && !o.completed));
}

#[tokio::test]
async fn generation_is_idempotent() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, first) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  assert_eq!(first.len(), 5);

  let again = s
    .generate_for_schedule(schedule.schedule_id, now() + TimeDelta::days(30))
    .await
    .unwrap();
  assert!(again.is_empty());
}

#[tokio::test]
async fn longer_horizon_extends_from_latest() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, _) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  let extra = s
    .generate_for_schedule(schedule.schedule_id, now() + TimeDelta::days(44))
    .await
    .unwrap();
  assert_eq!(extra.len(), 2); // +35, +42
  assert_eq!(extra[0].due_date, now() + TimeDelta::days(35));
}

#[tokio::test]
async fn zero_delta_yields_single_occurrence() {
  let s = store().await;
  let f = fixture(&s).await;

  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, NewSchedule {
      assignee_user_id:     f.member,
      start_date:           now(),
      repeat_delta:         RepeatDelta::default(),
      generate_occurrences: true,
    })
    .await
    .unwrap();
  assert_eq!(generated.len(), 1);

  let again = s
    .generate_for_schedule(schedule.schedule_id, now() + TimeDelta::days(365))
    .await
    .unwrap();
  assert!(again.is_empty());
}

#[tokio::test]
async fn dormant_schedule_generates_nothing() {
  let s = store().await;
  let f = fixture(&s).await;

  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, NewSchedule {
      generate_occurrences: false,
      ..weekly(f.member)
    })
    .await
    .unwrap();
  assert!(generated.is_empty());
}

// ─── Completion chaining ─────────────────────────────────────────────────────

#[tokio::test]
async fn completing_chains_the_next_occurrence() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  let last = generated.last().unwrap();

  let update = s
    .update_occurrence(
      f.member,
      f.house_id,
      last.occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();

  assert!(update.occurrence.completed);
  assert_eq!(update.occurrence.version, 2);
  let chained = update.chained.expect("chained occurrence");
  assert_eq!(chained.due_date, last.due_date + TimeDelta::days(7));
}

#[tokio::test]
async fn chaining_skips_occupied_slots() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  // The first occurrence's successor already exists from horizon fill.
  let update = s
    .update_occurrence(
      f.member,
      f.house_id,
      generated[0].occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();
  assert!(update.chained.is_none());
}

#[tokio::test]
async fn recompleting_is_not_an_edge() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  let last = generated.last().unwrap();

  let first = s
    .update_occurrence(
      f.member,
      f.house_id,
      last.occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();
  assert!(first.chained.is_some());

  // Writing completed=true again flips nothing, so nothing chains even
  // though the next-next slot is free.
  let second = s
    .update_occurrence(
      f.member,
      f.house_id,
      last.occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(2)),
    )
    .await
    .unwrap();
  assert!(second.chained.is_none());
}

#[tokio::test]
async fn zero_delta_completion_does_not_chain() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, NewSchedule {
      repeat_delta: RepeatDelta::default(),
      ..weekly(f.member)
    })
    .await
    .unwrap();

  let update = s
    .update_occurrence(
      f.member,
      f.house_id,
      generated[0].occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();
  assert!(update.chained.is_none());
}

#[tokio::test]
async fn stale_occurrence_version_is_rejected() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  let err = s
    .update_occurrence(
      f.member,
      f.house_id,
      generated[0].occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(9)),
    )
    .await
    .unwrap_err();
  assert_eq!(conflict_message(err), "Chore occurrence has been modified.");
}

#[tokio::test]
async fn completion_stamps_and_clears_completed_at() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  let last = generated.last().unwrap();
  assert_eq!(last.completed_at, None);

  let update = s
    .update_occurrence(
      f.member,
      f.house_id,
      last.occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();
  assert_eq!(update.occurrence.completed_at, Some(now()));

  let reread = s
    .get_occurrence(f.house_id, last.occurrence_id)
    .await
    .unwrap();
  assert_eq!(reread.completed_at, Some(now()));

  // Flipping back clears the stamp; completed_at stays in lockstep.
  let reverted = s
    .update_occurrence(
      f.member,
      f.house_id,
      last.occurrence_id,
      OccurrenceChanges { completed: Some(false), ..Default::default() },
      Some(ClientVersion::Int(2)),
    )
    .await
    .unwrap();
  assert!(!reverted.occurrence.completed);
  assert_eq!(reverted.occurrence.completed_at, None);
}

#[tokio::test]
async fn member_cannot_edit_anothers_occurrence() {
  let s = store().await;
  let f = fixture(&s).await;
  // Schedule assigned to the owner; a plain member tries to complete it.
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.owner))
    .await
    .unwrap();

  let err = s
    .update_occurrence(
      f.member,
      f.house_id,
      generated[0].occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(msg) if msg == "Only the owner can edit chores assigned to others."));

  let untouched = s
    .get_occurrence(f.house_id, generated[0].occurrence_id)
    .await
    .unwrap();
  assert!(!untouched.completed);
}

#[tokio::test]
async fn owner_may_complete_a_members_occurrence() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  let update = s
    .update_occurrence(
      f.owner,
      f.house_id,
      generated.last().unwrap().occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();
  assert!(update.occurrence.completed);
}

#[tokio::test]
async fn non_member_cannot_touch_occurrences() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  let err = s
    .update_occurrence(
      Uuid::new_v4(),
      f.house_id,
      generated[0].occurrence_id,
      OccurrenceChanges { completed: Some(true), ..Default::default() },
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(msg) if msg == "You do not belong to this house."));
}

// ─── Dashboard listing ───────────────────────────────────────────────────────

#[tokio::test]
async fn list_occurrences_filters_by_window_and_orders() {
  let s = store().await;
  let f = fixture(&s).await;
  s.create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  let window = s
    .list_occurrences(
      f.house_id,
      Some(now() + TimeDelta::days(7)),
      Some(now() + TimeDelta::days(21)),
    )
    .await
    .unwrap();

  // Half-open window: +7 and +14, not +21.
  assert_eq!(window.len(), 2);
  assert_eq!(window[0].occurrence.due_date, now() + TimeDelta::days(7));
  assert_eq!(window[1].occurrence.due_date, now() + TimeDelta::days(14));
  assert_eq!(window[0].chore.chore_id, f.chore_id);
  assert_eq!(window[0].assignee_user_id, f.member);
  assert_eq!(window[0].repeat_label, "Every week");
}

// ─── Composite edits ─────────────────────────────────────────────────────────

fn bundle(f: &Fixture, schedule_id: Uuid, occurrence_id: Uuid) -> EditBundle {
  EditBundle {
    acting_user_id: f.owner,
    house_id: f.house_id,
    chore_id: f.chore_id,
    schedule_id,
    occurrence_id,
    versions: BundleVersions {
      house:      Some(ClientVersion::Int(1)),
      chore:      Some(ClientVersion::Int(1)),
      schedule:   Some(ClientVersion::Int(1)),
      occurrence: Some(ClientVersion::Int(1)),
    },
    chore: ChoreChanges::default(),
    assignee_id: None,
    start_date: None,
    repeat_delta: None,
    due_date: None,
    completed: None,
  }
}

#[tokio::test]
async fn bundle_edits_chore_and_occurrence_together() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  let last = generated.last().unwrap();

  let outcome = s
    .edit_bundle(EditBundle {
      chore: ChoreChanges {
        name: Some("Deep clean".into()),
        ..Default::default()
      },
      completed: Some(true),
      ..bundle(&f, schedule.schedule_id, last.occurrence_id)
    })
    .await
    .unwrap();

  assert_eq!(outcome.chore.name, "Deep clean");
  assert_eq!(outcome.chore.version, 2);
  // Schedule untouched, version unchanged.
  assert_eq!(outcome.schedule.version, 1);
  assert!(outcome.occurrence.completed);
  assert_eq!(outcome.occurrence.version, 2);
  assert!(outcome.chained.is_some());
}

#[tokio::test]
async fn bundle_version_checks_run_in_entity_order() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  // Both chore and occurrence versions are stale; the chore check fires
  // first and nothing is written.
  let err = s
    .edit_bundle(EditBundle {
      versions: BundleVersions {
        house:      Some(ClientVersion::Int(1)),
        chore:      Some(ClientVersion::Int(9)),
        schedule:   Some(ClientVersion::Int(1)),
        occurrence: Some(ClientVersion::Int(9)),
      },
      completed: Some(true),
      ..bundle(&f, schedule.schedule_id, generated[0].occurrence_id)
    })
    .await
    .unwrap_err();
  assert_eq!(conflict_message(err), "Chore has been modified.");

  let untouched = s
    .get_occurrence(f.house_id, generated[0].occurrence_id)
    .await
    .unwrap();
  assert!(!untouched.completed);
  assert_eq!(untouched.version, 1);
}

#[tokio::test]
async fn bundle_timing_change_discards_and_regenerates() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  assert_eq!(generated.len(), 5);

  let outcome = s
    .edit_bundle(EditBundle {
      repeat_delta: Some(days(10)),
      ..bundle(&f, schedule.schedule_id, generated[0].occurrence_id)
    })
    .await
    .unwrap();
  assert_eq!(outcome.schedule.version, 2);
  assert_eq!(outcome.schedule.repeat_delta, days(10));

  let listed = s
    .list_occurrences(f.house_id, None, None)
    .await
    .unwrap();
  // The edited occurrence survives; its old siblings are discarded and the
  // 10-day rhythm regenerates from it out to the 30-day horizon.
  let dues: Vec<_> = listed
    .iter()
    .map(|v| (v.occurrence.due_date - now()).num_days())
    .collect();
  assert_eq!(dues, vec![0, 10, 20, 30]);
}

#[tokio::test]
async fn bundle_reassignment_creates_fresh_schedule() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  let first = &generated[0];

  let outcome = s
    .edit_bundle(EditBundle {
      assignee_id: Some(f.owner),
      ..bundle(&f, schedule.schedule_id, first.occurrence_id)
    })
    .await
    .unwrap();

  assert_ne!(outcome.schedule.schedule_id, schedule.schedule_id);
  assert_eq!(outcome.schedule.assignee_user_id, f.owner);
  assert_eq!(outcome.schedule.version, 1);
  assert_eq!(outcome.occurrence.schedule_id, outcome.schedule.schedule_id);
  assert_eq!(outcome.occurrence.version, 2);

  // The old schedule and its remaining occurrences are retired.
  assert!(matches!(
    s.get_schedule(f.house_id, schedule.schedule_id).await.unwrap_err(),
    CoreError::NotFound { .. }
  ));
  let listed = s.list_occurrences(f.house_id, None, None).await.unwrap();
  assert!(
    listed
      .iter()
      .all(|v| v.occurrence.schedule_id == outcome.schedule.schedule_id)
  );
  assert_eq!(listed[0].assignee_user_id, f.owner);
}

#[tokio::test]
async fn bundle_reassignment_requires_target_membership() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  let err = s
    .edit_bundle(EditBundle {
      assignee_id: Some(Uuid::new_v4()),
      ..bundle(&f, schedule.schedule_id, generated[0].occurrence_id)
    })
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Validation(msg) if msg == "Assignee is not a member of this house."));
}

#[tokio::test]
async fn bundle_rejects_members_editing_others_schedules() {
  let s = store().await;
  let f = fixture(&s).await;
  // Schedule assigned to the owner; a plain member tries to edit it.
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.owner))
    .await
    .unwrap();

  let err = s
    .edit_bundle(EditBundle {
      acting_user_id: f.member,
      completed: Some(true),
      ..bundle(&f, schedule.schedule_id, generated[0].occurrence_id)
    })
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(msg) if msg == "Only the owner can edit chores assigned to others."));
}

#[tokio::test]
async fn owner_may_edit_other_members_schedules() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  // bundle() acts as the owner.
  s.edit_bundle(EditBundle {
    completed: Some(true),
    ..bundle(&f, schedule.schedule_id, generated[0].occurrence_id)
  })
  .await
  .unwrap();
}

// ─── Schedule updates and deletion ───────────────────────────────────────────

#[tokio::test]
async fn update_schedule_reconciles_pending_occurrences() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, _) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();

  // The assignee edits their own schedule; no owner role needed.
  let updated = s
    .update_schedule(
      f.member,
      f.house_id,
      f.chore_id,
      schedule.schedule_id,
      None,
      Some(days(2)),
      None,
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap();
  assert_eq!(updated.version, 2);

  // All pending rows are discarded, so the 2-day rhythm restarts from the
  // start date. Discarded slots (+0, +14, +28 from the weekly run) stay
  // empty; everything else inside the horizon fills in.
  let listed = s.list_occurrences(f.house_id, None, None).await.unwrap();
  let dues: Vec<_> = listed
    .iter()
    .map(|v| (v.occurrence.due_date - now()).num_days())
    .collect();
  assert_eq!(dues, vec![2, 4, 6, 8, 10, 12, 16, 18, 20, 22, 24, 26, 30]);
}

#[tokio::test]
async fn member_cannot_touch_anothers_schedule() {
  let s = store().await;
  let f = fixture(&s).await;
  // Schedule assigned to the owner; a plain member tries to edit it.
  let (schedule, _) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.owner))
    .await
    .unwrap();

  let err = s
    .update_schedule(
      f.member,
      f.house_id,
      f.chore_id,
      schedule.schedule_id,
      None,
      Some(days(2)),
      None,
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(msg) if msg == "Only the owner can edit chores assigned to others."));

  let err = s
    .delete_schedule(
      f.member,
      f.house_id,
      f.chore_id,
      schedule.schedule_id,
      Some(ClientVersion::Int(1)),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));

  // The owner may do both.
  s.delete_schedule(
    f.owner,
    f.house_id,
    f.chore_id,
    schedule.schedule_id,
    Some(ClientVersion::Int(1)),
  )
  .await
  .unwrap();
}

#[tokio::test]
async fn deleted_schedule_slots_are_not_resurrected() {
  let s = store().await;
  let f = fixture(&s).await;
  let (schedule, generated) = s
    .create_schedule(f.house_id, f.chore_id, weekly(f.member))
    .await
    .unwrap();
  assert_eq!(generated.len(), 5);

  s.delete_schedule(
    f.member,
    f.house_id,
    f.chore_id,
    schedule.schedule_id,
    Some(ClientVersion::Int(1)),
  )
  .await
  .unwrap();

  // The generator keys on active schedules only.
  let err = s
    .generate_for_schedule(schedule.schedule_id, now() + TimeDelta::days(60))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound { .. }));

  assert!(
    s.list_occurrences(f.house_id, None, None)
      .await
      .unwrap()
      .is_empty()
  );
}

// ─── Reminders ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reminder_scan_finds_due_soon_and_marks_sent() {
  let s = store().await;
  let f = fixture(&s).await;

  // One occurrence due in exactly one hour.
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, NewSchedule {
      start_date: now() + TimeDelta::hours(1),
      ..weekly(f.member)
    })
    .await
    .unwrap();
  let target = &generated[0];

  let lower = now() + TimeDelta::hours(1) - TimeDelta::minutes(1);
  let upper = now() + TimeDelta::hours(1) + TimeDelta::minutes(1);

  let due = s.due_for_reminder(lower, upper).await.unwrap();
  assert_eq!(due.len(), 1);
  assert_eq!(due[0].occurrence.occurrence_id, target.occurrence_id);
  assert_eq!(due[0].chore.name, "Dishes");

  s.mark_notification_sent(target.occurrence_id).await.unwrap();
  assert!(s.due_for_reminder(lower, upper).await.unwrap().is_empty());

  let reread = s
    .get_occurrence(f.house_id, target.occurrence_id)
    .await
    .unwrap();
  assert!(reread.notification_sent);
  assert_eq!(reread.notification_sent_at, Some(now()));
}

#[tokio::test]
async fn completed_occurrences_are_not_reminded() {
  let s = store().await;
  let f = fixture(&s).await;
  let (_, generated) = s
    .create_schedule(f.house_id, f.chore_id, NewSchedule {
      start_date: now() + TimeDelta::hours(1),
      ..weekly(f.member)
    })
    .await
    .unwrap();

  s.update_occurrence(
    f.member,
    f.house_id,
    generated[0].occurrence_id,
    OccurrenceChanges { completed: Some(true), ..Default::default() },
    Some(ClientVersion::Int(1)),
  )
  .await
  .unwrap();

  let lower = now() + TimeDelta::hours(1) - TimeDelta::minutes(1);
  let upper = now() + TimeDelta::hours(1) + TimeDelta::minutes(1);
  assert!(s.due_for_reminder(lower, upper).await.unwrap().is_empty());
}
