//! The persistence contract.
//!
//! One trait covers the whole domain; the SQLite implementation lives in
//! `rota-store-sqlite`. All reads are scoped to non-deleted rows unless a
//! method takes an explicit [`Scope`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Result,
  chore::{Chore, ChoreChanges, NewChore},
  house::{House, HouseMember, HouseRole, NewHouse},
  occurrence::{
    ChoreOccurrence, OccurrenceChanges, OccurrenceUpdate, OccurrenceView,
  },
  repeat::RepeatDelta,
  schedule::{ChoreSchedule, NewSchedule},
  version::ClientVersion,
};

/// Row visibility for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  ActiveOnly,
  IncludingDeleted,
}

/// One composite edit touching a chore, its schedule, and one occurrence,
/// applied atomically under a single set of version checks.
#[derive(Debug, Clone)]
pub struct EditBundle {
  pub acting_user_id: Uuid,
  pub house_id:       Uuid,
  pub chore_id:       Uuid,
  pub schedule_id:    Uuid,
  pub occurrence_id:  Uuid,
  pub versions:       BundleVersions,
  pub chore:          ChoreChanges,
  /// New assignee. Supplying a user other than the schedule's current
  /// assignee retires the schedule and creates a new one.
  pub assignee_id:    Option<Uuid>,
  pub start_date:     Option<DateTime<Utc>>,
  pub repeat_delta:   Option<RepeatDelta>,
  pub due_date:       Option<DateTime<Utc>>,
  pub completed:      Option<bool>,
}

/// Client-echoed versions for each entity in the bundle, checked in
/// house → chore → schedule → occurrence order.
#[derive(Debug, Clone, Default)]
pub struct BundleVersions {
  pub house:      Option<ClientVersion>,
  pub chore:      Option<ClientVersion>,
  pub schedule:   Option<ClientVersion>,
  pub occurrence: Option<ClientVersion>,
}

/// Final state of everything a composite edit touched.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EditOutcome {
  pub chore:      Chore,
  pub schedule:   ChoreSchedule,
  pub occurrence: ChoreOccurrence,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chained:    Option<ChoreOccurrence>,
}

pub trait ChoreStore: Send + Sync + 'static {
  // ─── Houses ────────────────────────────────────────────────────────────

  /// Create a house with `owner` as its first (owner-role) member.
  fn create_house(
    &self,
    owner: Uuid,
    new: NewHouse,
  ) -> impl Future<Output = Result<House>> + Send + '_;

  fn get_house(
    &self,
    house_id: Uuid,
  ) -> impl Future<Output = Result<House>> + Send + '_;

  /// Add a member. Fails on a full house or a duplicate membership.
  fn add_member(
    &self,
    house_id: Uuid,
    user_id: Uuid,
    role: HouseRole,
  ) -> impl Future<Output = Result<HouseMember>> + Send + '_;

  fn list_members(
    &self,
    house_id: Uuid,
  ) -> impl Future<Output = Result<Vec<HouseMember>>> + Send + '_;

  /// The caller's role in the house, or None if not a member.
  fn role_of(
    &self,
    house_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<HouseRole>>> + Send + '_;

  /// Soft-delete a house and everything under it. Owner only.
  fn delete_house(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    version: Option<ClientVersion>,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ─── Chores ────────────────────────────────────────────────────────────

  fn create_chore(
    &self,
    house_id: Uuid,
    new: NewChore,
  ) -> impl Future<Output = Result<Chore>> + Send + '_;

  fn get_chore(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
  ) -> impl Future<Output = Result<Chore>> + Send + '_;

  fn list_chores(
    &self,
    house_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Chore>>> + Send + '_;

  fn update_chore(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
    changes: ChoreChanges,
    version: Option<ClientVersion>,
  ) -> impl Future<Output = Result<Chore>> + Send + '_;

  /// Soft-delete a chore, its schedules, and their occurrences.
  fn delete_chore(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
    version: Option<ClientVersion>,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ─── Schedules ─────────────────────────────────────────────────────────

  /// Create a schedule and immediately fill its generation horizon.
  fn create_schedule(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
    new: NewSchedule,
  ) -> impl Future<Output = Result<(ChoreSchedule, Vec<ChoreOccurrence>)>>
  + Send
  + '_;

  fn get_schedule(
    &self,
    house_id: Uuid,
    schedule_id: Uuid,
  ) -> impl Future<Output = Result<ChoreSchedule>> + Send + '_;

  fn list_schedules(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChoreSchedule>>> + Send + '_;

  /// Update a schedule's timing in place, discarding pending future
  /// occurrences and regenerating from the new parameters. Only the owner
  /// or the schedule's own assignee may edit it.
  fn update_schedule(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    chore_id: Uuid,
    schedule_id: Uuid,
    start_date: Option<DateTime<Utc>>,
    repeat_delta: Option<RepeatDelta>,
    generate_occurrences: Option<bool>,
    version: Option<ClientVersion>,
  ) -> impl Future<Output = Result<ChoreSchedule>> + Send + '_;

  /// Soft-delete a schedule and its occurrences. Owner or assignee only.
  fn delete_schedule(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    chore_id: Uuid,
    schedule_id: Uuid,
    version: Option<ClientVersion>,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Idempotent horizon fill: insert the schedule's missing occurrences up
  /// to `horizon` and return only the newly created ones.
  fn generate_for_schedule(
    &self,
    schedule_id: Uuid,
    horizon: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<ChoreOccurrence>>> + Send + '_;

  // ─── Occurrences ───────────────────────────────────────────────────────

  /// Occurrences across a house's chores with due dates in `[from, to)`,
  /// joined with chore context, ordered by due date.
  fn list_occurrences(
    &self,
    house_id: Uuid,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<OccurrenceView>>> + Send + '_;

  fn get_occurrence(
    &self,
    house_id: Uuid,
    occurrence_id: Uuid,
  ) -> impl Future<Output = Result<ChoreOccurrence>> + Send + '_;

  /// Direct occurrence edit with version check and completion chaining.
  /// Only the owner or the owning schedule's assignee may edit.
  fn update_occurrence(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    occurrence_id: Uuid,
    changes: OccurrenceChanges,
    version: Option<ClientVersion>,
  ) -> impl Future<Output = Result<OccurrenceUpdate>> + Send + '_;

  /// Apply a composite chore/schedule/occurrence edit atomically.
  fn edit_bundle(
    &self,
    bundle: EditBundle,
  ) -> impl Future<Output = Result<EditOutcome>> + Send + '_;

  // ─── Reminders ─────────────────────────────────────────────────────────

  /// Incomplete, un-notified occurrences due within `[lower, upper]`.
  fn due_for_reminder(
    &self,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<OccurrenceView>>> + Send + '_;

  /// Flag an occurrence as notified without a version check; the reminder
  /// scan is a system actor and must not race user edits into conflicts.
  fn mark_notification_sent(
    &self,
    occurrence_id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}
