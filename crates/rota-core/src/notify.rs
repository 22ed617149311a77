//! Notification dispatch seam.

use uuid::Uuid;

use crate::occurrence::OccurrenceView;

/// Delivers a due-soon reminder to a user. Returns true on success; the
/// reminder scan only marks an occurrence as notified after a successful
/// dispatch, so failures are retried on the next pass.
pub trait NotificationDispatcher: Send + Sync {
  fn dispatch(
    &self,
    user_id: Uuid,
    view: &OccurrenceView,
  ) -> impl Future<Output = bool> + Send;
}
