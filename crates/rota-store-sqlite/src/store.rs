//! [`SqliteStore`] — the SQLite implementation of [`ChoreStore`].

use std::{path::Path, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use rota_core::{
  Error as CoreError, Result as CoreResult,
  chore::{Chore, ChoreChanges, NewChore},
  clock::{Clock, SystemClock},
  house::{House, HouseMember, HouseRole, NewHouse},
  occurrence::{
    ChoreOccurrence, OccurrenceChanges, OccurrenceUpdate, OccurrenceView,
  },
  repeat::{DEFAULT_HORIZON_DAYS, RepeatDelta},
  schedule::{ChoreSchedule, NewSchedule},
  store::{ChoreStore, EditBundle, EditOutcome, Scope},
  version::{ClientVersion, check_version},
};

use crate::{
  Result, chores, houses, mutate, occurrences, schedules, schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rota chore store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The single
/// connection also serialises writers, so every transaction body in this
/// crate runs without interleaving.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<dyn Clock>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, clock: Arc::new(SystemClock) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with_clock(Arc::new(SystemClock)).await
  }

  /// Open an in-memory store on a caller-supplied clock, so tests can pin
  /// "now".
  pub async fn open_in_memory_with_clock(
    clock: Arc<dyn Clock>,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, clock };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn now(&self) -> DateTime<Utc> { self.clock.now() }

  fn horizon(&self, now: DateTime<Utc>) -> DateTime<Utc> {
    now + TimeDelta::days(i64::from(DEFAULT_HORIZON_DAYS))
  }

  /// Run a read-only closure on the connection thread.
  async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Run a closure inside a transaction: commit on Ok, roll back on Err.
  async fn with_tx<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match f(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          Err(err) => {
            tx.rollback()?;
            Ok(Err(err))
          }
        }
      })
      .await?
  }
}

// ─── ChoreStore impl ─────────────────────────────────────────────────────────

impl ChoreStore for SqliteStore {
  // ── Houses ────────────────────────────────────────────────────────────────

  async fn create_house(&self, owner: Uuid, new: NewHouse) -> CoreResult<House> {
    let now = self.now();
    let house = House {
      house_id: Uuid::new_v4(),
      name: new.name,
      address: new.address,
      max_members: new.max_members,
      version: 1,
      created_at: now,
      deleted_at: None,
    };
    let owner_member = HouseMember {
      member_id: Uuid::new_v4(),
      house_id: house.house_id,
      user_id: owner,
      role: HouseRole::Owner,
      joined_at: now,
    };

    self
      .with_tx(move |tx| {
        houses::insert_house(tx, &house)?;
        houses::insert_member(tx, &owner_member)?;
        Ok(house)
      })
      .await
      .map_err(Into::into)
  }

  async fn get_house(&self, house_id: Uuid) -> CoreResult<House> {
    self
      .with_conn(move |conn| houses::require_house(conn, house_id))
      .await
      .map_err(Into::into)
  }

  async fn add_member(
    &self,
    house_id: Uuid,
    user_id: Uuid,
    role: HouseRole,
  ) -> CoreResult<HouseMember> {
    let now = self.now();
    self
      .with_tx(move |tx| {
        let house = houses::require_house(tx, house_id)?;
        if houses::role_of(tx, house_id, user_id)?.is_some() {
          return Err(
            CoreError::Validation("User already in this house.".to_owned())
              .into(),
          );
        }
        if houses::member_count(tx, house_id)? >= house.max_members {
          return Err(
            CoreError::Validation("House is full.".to_owned()).into(),
          );
        }
        let member = HouseMember {
          member_id: Uuid::new_v4(),
          house_id,
          user_id,
          role,
          joined_at: now,
        };
        houses::insert_member(tx, &member)?;
        Ok(member)
      })
      .await
      .map_err(Into::into)
  }

  async fn list_members(&self, house_id: Uuid) -> CoreResult<Vec<HouseMember>> {
    self
      .with_conn(move |conn| {
        houses::require_house(conn, house_id)?;
        houses::list_members(conn, house_id)
      })
      .await
      .map_err(Into::into)
  }

  async fn role_of(
    &self,
    house_id: Uuid,
    user_id: Uuid,
  ) -> CoreResult<Option<HouseRole>> {
    self
      .with_conn(move |conn| houses::role_of(conn, house_id, user_id))
      .await
      .map_err(Into::into)
  }

  async fn delete_house(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    version: Option<ClientVersion>,
  ) -> CoreResult<()> {
    let now = self.now();
    self
      .with_tx(move |tx| {
        let house = houses::require_house(tx, house_id)?;
        let role = houses::require_member(tx, house_id, acting_user_id)?;
        if role != HouseRole::Owner {
          return Err(
            CoreError::Forbidden(
              "Only the owner can delete the house.".to_owned(),
            )
            .into(),
          );
        }
        check_version(house.version, version.as_ref(), "House")?;
        houses::soft_delete_house(tx, house_id, now)
      })
      .await
      .map_err(Into::into)
  }

  // ── Chores ────────────────────────────────────────────────────────────────

  async fn create_chore(
    &self,
    house_id: Uuid,
    new: NewChore,
  ) -> CoreResult<Chore> {
    let now = self.now();
    self
      .with_tx(move |tx| {
        houses::require_house(tx, house_id)?;
        let chore = Chore {
          chore_id: Uuid::new_v4(),
          house_id,
          name: new.name,
          description: new.description,
          color: new.color,
          version: 1,
          created_at: now,
          deleted_at: None,
        };
        chores::insert_chore(tx, &chore)?;
        Ok(chore)
      })
      .await
      .map_err(Into::into)
  }

  async fn get_chore(&self, house_id: Uuid, chore_id: Uuid) -> CoreResult<Chore> {
    self
      .with_conn(move |conn| chores::require_chore(conn, house_id, chore_id))
      .await
      .map_err(Into::into)
  }

  async fn list_chores(&self, house_id: Uuid) -> CoreResult<Vec<Chore>> {
    self
      .with_conn(move |conn| {
        houses::require_house(conn, house_id)?;
        chores::list_chores(conn, house_id)
      })
      .await
      .map_err(Into::into)
  }

  async fn update_chore(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
    changes: ChoreChanges,
    version: Option<ClientVersion>,
  ) -> CoreResult<Chore> {
    self
      .with_tx(move |tx| {
        let mut chore = chores::require_chore(tx, house_id, chore_id)?;
        check_version(chore.version, version.as_ref(), "Chore")?;
        chores::apply_chore_changes(tx, &mut chore, &changes)?;
        Ok(chore)
      })
      .await
      .map_err(Into::into)
  }

  async fn delete_chore(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
    version: Option<ClientVersion>,
  ) -> CoreResult<()> {
    let now = self.now();
    self
      .with_tx(move |tx| {
        let chore = chores::require_chore(tx, house_id, chore_id)?;
        check_version(chore.version, version.as_ref(), "Chore")?;
        chores::soft_delete_chore(tx, chore_id, now)
      })
      .await
      .map_err(Into::into)
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  async fn create_schedule(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
    new: NewSchedule,
  ) -> CoreResult<(ChoreSchedule, Vec<ChoreOccurrence>)> {
    let now = self.now();
    let horizon = self.horizon(now);
    self
      .with_tx(move |tx| {
        chores::require_chore(tx, house_id, chore_id)?;
        if houses::role_of(tx, house_id, new.assignee_user_id)?.is_none() {
          return Err(
            CoreError::Validation(
              "Assignee is not a member of this house.".to_owned(),
            )
            .into(),
          );
        }
        let schedule = ChoreSchedule {
          schedule_id: Uuid::new_v4(),
          chore_id,
          assignee_user_id: new.assignee_user_id,
          start_date: new.start_date,
          repeat_delta: new.repeat_delta,
          generate_occurrences: new.generate_occurrences,
          version: 1,
          created_at: now,
          deleted_at: None,
        };
        schedules::insert_schedule(tx, &schedule)?;
        let generated = schedules::fill_horizon(tx, &schedule, horizon, now)?;
        Ok((schedule, generated))
      })
      .await
      .map_err(Into::into)
  }

  async fn get_schedule(
    &self,
    house_id: Uuid,
    schedule_id: Uuid,
  ) -> CoreResult<ChoreSchedule> {
    self
      .with_conn(move |conn| {
        schedules::require_schedule(conn, house_id, schedule_id)
      })
      .await
      .map_err(Into::into)
  }

  async fn list_schedules(
    &self,
    house_id: Uuid,
    chore_id: Uuid,
  ) -> CoreResult<Vec<ChoreSchedule>> {
    self
      .with_conn(move |conn| {
        chores::require_chore(conn, house_id, chore_id)?;
        schedules::list_schedules(conn, house_id, chore_id)
      })
      .await
      .map_err(Into::into)
  }

  async fn update_schedule(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    chore_id: Uuid,
    schedule_id: Uuid,
    start_date: Option<DateTime<Utc>>,
    repeat_delta: Option<RepeatDelta>,
    generate_occurrences: Option<bool>,
    version: Option<ClientVersion>,
  ) -> CoreResult<ChoreSchedule> {
    let now = self.now();
    let horizon = self.horizon(now);
    self
      .with_tx(move |tx| {
        houses::require_house(tx, house_id)?;
        let role = houses::require_member(tx, house_id, acting_user_id)?;
        let mut schedule =
          schedules::require_schedule(tx, house_id, schedule_id)?;
        if schedule.chore_id != chore_id {
          return Err(CoreError::not_found("schedule", schedule_id).into());
        }
        schedules::require_editor(&schedule, acting_user_id, role)?;
        check_version(schedule.version, version.as_ref(), "Chore schedule")?;

        let timing_changed = start_date.is_some() || repeat_delta.is_some();
        if let Some(start_date) = start_date {
          schedule.start_date = start_date;
        }
        if let Some(delta) = repeat_delta {
          schedule.repeat_delta = delta;
        }
        if let Some(generate) = generate_occurrences {
          schedule.generate_occurrences = generate;
        }

        if timing_changed {
          // Pending rows from now on are stale under the new timing.
          schedules::discard_pending(tx, schedule_id, now, None, now)?;
        }
        schedules::update_schedule_row(tx, &schedule)?;
        schedule.version += 1;
        schedules::fill_horizon(tx, &schedule, horizon, now)?;
        Ok(schedule)
      })
      .await
      .map_err(Into::into)
  }

  async fn delete_schedule(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    chore_id: Uuid,
    schedule_id: Uuid,
    version: Option<ClientVersion>,
  ) -> CoreResult<()> {
    let now = self.now();
    self
      .with_tx(move |tx| {
        houses::require_house(tx, house_id)?;
        let role = houses::require_member(tx, house_id, acting_user_id)?;
        let schedule = schedules::require_schedule(tx, house_id, schedule_id)?;
        if schedule.chore_id != chore_id {
          return Err(CoreError::not_found("schedule", schedule_id).into());
        }
        schedules::require_editor(&schedule, acting_user_id, role)?;
        check_version(schedule.version, version.as_ref(), "Chore schedule")?;
        schedules::soft_delete_schedule(tx, schedule_id, now)
      })
      .await
      .map_err(Into::into)
  }

  async fn generate_for_schedule(
    &self,
    schedule_id: Uuid,
    horizon: DateTime<Utc>,
  ) -> CoreResult<Vec<ChoreOccurrence>> {
    let now = self.now();
    self
      .with_tx(move |tx| {
        let schedule =
          schedules::get_schedule_by_id(tx, schedule_id, Scope::ActiveOnly)?
            .ok_or_else(|| CoreError::not_found("schedule", schedule_id))?;
        schedules::fill_horizon(tx, &schedule, horizon, now)
      })
      .await
      .map_err(Into::into)
  }

  // ── Occurrences ───────────────────────────────────────────────────────────

  async fn list_occurrences(
    &self,
    house_id: Uuid,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
  ) -> CoreResult<Vec<OccurrenceView>> {
    self
      .with_conn(move |conn| {
        houses::require_house(conn, house_id)?;
        occurrences::list_views(conn, house_id, from, to)
      })
      .await
      .map_err(Into::into)
  }

  async fn get_occurrence(
    &self,
    house_id: Uuid,
    occurrence_id: Uuid,
  ) -> CoreResult<ChoreOccurrence> {
    self
      .with_conn(move |conn| {
        occurrences::require_occurrence(conn, house_id, occurrence_id)
      })
      .await
      .map_err(Into::into)
  }

  async fn update_occurrence(
    &self,
    acting_user_id: Uuid,
    house_id: Uuid,
    occurrence_id: Uuid,
    changes: OccurrenceChanges,
    version: Option<ClientVersion>,
  ) -> CoreResult<OccurrenceUpdate> {
    let now = self.now();
    self
      .with_tx(move |tx| {
        mutate::update_occurrence_tx(
          tx,
          acting_user_id,
          house_id,
          occurrence_id,
          &changes,
          version.as_ref(),
          now,
        )
      })
      .await
      .map_err(Into::into)
  }

  async fn edit_bundle(&self, bundle: EditBundle) -> CoreResult<EditOutcome> {
    let now = self.now();
    let horizon = self.horizon(now);
    self
      .with_tx(move |tx| mutate::edit_bundle_tx(tx, &bundle, horizon, now))
      .await
      .map_err(Into::into)
  }

  // ── Reminders ─────────────────────────────────────────────────────────────

  async fn due_for_reminder(
    &self,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
  ) -> CoreResult<Vec<OccurrenceView>> {
    self
      .with_conn(move |conn| occurrences::due_for_reminder(conn, lower, upper))
      .await
      .map_err(Into::into)
  }

  async fn mark_notification_sent(
    &self,
    occurrence_id: Uuid,
  ) -> CoreResult<()> {
    let now = self.now();
    self
      .with_conn(move |conn| {
        occurrences::mark_notification_sent(conn, occurrence_id, now)
      })
      .await
      .map_err(Into::into)
  }
}
