//! Background reminder scan.
//!
//! Every tick, finds incomplete occurrences due in about an hour that have
//! not been notified yet, dispatches a reminder to the assignee, and marks
//! the occurrence as sent. A failed dispatch leaves the flag untouched so
//! the next pass retries.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use rota_core::{
  notify::NotificationDispatcher, occurrence::OccurrenceView,
  store::ChoreStore,
};
use uuid::Uuid;

/// Dispatcher that writes reminders to the log. Stands in until a push
/// transport is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
  async fn dispatch(&self, user_id: Uuid, view: &OccurrenceView) -> bool {
    tracing::info!(
      %user_id,
      chore = %view.chore.name,
      due = %view.occurrence.due_date,
      "chore reminder",
    );
    true
  }
}

/// One scan pass at `now`: the window is one hour out, give or take a
/// minute to absorb tick jitter.
pub async fn scan_once<S, D>(store: &S, dispatcher: &D, now: DateTime<Utc>)
where
  S: ChoreStore,
  D: NotificationDispatcher,
{
  let target = now + TimeDelta::hours(1);
  let lower = target - TimeDelta::minutes(1);
  let upper = target + TimeDelta::minutes(1);

  let due = match store.due_for_reminder(lower, upper).await {
    Ok(due) => due,
    Err(err) => {
      tracing::error!(%err, "reminder scan failed");
      return;
    }
  };

  for view in due {
    let user_id = view.assignee_user_id;
    if !dispatcher.dispatch(user_id, &view).await {
      tracing::warn!(
        %user_id,
        occurrence_id = %view.occurrence.occurrence_id,
        "reminder dispatch failed; will retry next pass",
      );
      continue;
    }
    if let Err(err) = store
      .mark_notification_sent(view.occurrence.occurrence_id)
      .await
    {
      tracing::error!(
        %err,
        occurrence_id = %view.occurrence.occurrence_id,
        "failed to mark reminder as sent",
      );
    }
  }
}

/// Run the reminder scan forever on a fixed interval.
pub async fn run<S, D>(store: Arc<S>, dispatcher: D, every: Duration)
where
  S: ChoreStore,
  D: NotificationDispatcher,
{
  let mut ticker = tokio::time::interval(every);
  loop {
    ticker.tick().await;
    scan_once(store.as_ref(), &dispatcher, Utc::now()).await;
  }
}
