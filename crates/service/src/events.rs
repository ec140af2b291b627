//! Change hub: every mutation of a task or label is published here so that
//! connected clients can refresh their cached copies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    #[serde(rename = "task.created")]
    TaskCreated,
    #[serde(rename = "task.updated")]
    TaskUpdated,
    #[serde(rename = "task.deleted")]
    TaskDeleted,
    #[serde(rename = "task.labels")]
    TaskLabels,
    #[serde(rename = "label.created")]
    LabelCreated,
    #[serde(rename = "label.updated")]
    LabelUpdated,
    #[serde(rename = "label.deleted")]
    LabelDeleted,
    /// Last event a subscription of that user yields.
    #[serde(rename = "user.deleted")]
    UserDeleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::TaskCreated => "task.created",
            ChangeKind::TaskUpdated => "task.updated",
            ChangeKind::TaskDeleted => "task.deleted",
            ChangeKind::TaskLabels => "task.labels",
            ChangeKind::LabelCreated => "label.created",
            ChangeKind::LabelUpdated => "label.updated",
            ChangeKind::LabelDeleted => "label.deleted",
            ChangeKind::UserDeleted => "user.deleted",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    #[serde(skip)]
    pub user_id: i32,
    pub kind: ChangeKind,
    pub entity_id: i32,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(user_id: i32, kind: ChangeKind, entity_id: i32) -> Self {
        Self { user_id, kind, entity_id, at: Utc::now() }
    }
}

/// Fan-out of change events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<ChangeEvent>,
    closed: Arc<watch::Sender<bool>>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let (closed, _) = watch::channel(false);
        Self { sender, closed: Arc::new(closed) }
    }

    /// Ends every open subscription, e.g. on server shutdown.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    /// Publishing with nobody listening is fine.
    pub fn publish(&self, event: ChangeEvent) {
        trace!(user_id = event.user_id, kind = event.kind.as_str(), entity_id = event.entity_id, "change_published");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self, user_id: i32) -> ChangeSubscription {
        ChangeSubscription { user_id, receiver: self.sender.subscribe(), closed: self.closed.subscribe(), finished: false }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(256)
    }
}

/// What a subscriber sees next.
#[derive(Debug, Clone)]
pub enum Received {
    Event(ChangeEvent),
    /// The subscriber fell behind and this many events were dropped.
    Lagged(u64),
}

/// A subscription that only yields one user's events.
#[derive(Debug)]
pub struct ChangeSubscription {
    user_id: i32,
    receiver: broadcast::Receiver<ChangeEvent>,
    closed: watch::Receiver<bool>,
    finished: bool,
}

impl ChangeSubscription {
    pub fn user_id(&self) -> i32 { self.user_id }

    /// `None` once the hub is closed or gone, or after the user's `UserDeleted`.
    pub async fn recv(&mut self) -> Option<Received> {
        loop {
            if self.finished || *self.closed.borrow() {
                return None;
            }
            let next = tokio::select! {
                r = self.receiver.recv() => r,
                changed = self.closed.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                    continue;
                }
            };
            match next {
                Ok(event) if event.user_id == self.user_id => {
                    self.finished = event.kind == ChangeKind::UserDeleted;
                    return Some(Received::Event(event));
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => return Some(Received::Lagged(n)),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
