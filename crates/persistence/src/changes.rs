//! In-process change hub.
//!
//! Every committed write publishes a [`FamilyChange`] here; WebSocket
//! subscribers receive the changes for their own family and poke their
//! clients to refetch. Publication happens after commit, so a subscriber
//! that refetches on receipt always observes the new state.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered changes per hub before slow subscribers start lagging.
const CHANGE_BUFFER: usize = 256;

/// Which collection a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCollection {
    Families,
    CalendarItems,
    Chats,
    Messages,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Created,
    Updated,
    Deleted,
}

/// A committed write, scoped to one family.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyChange {
    pub family_code: String,
    pub collection: ChangeCollection,
    pub entity_id: Uuid,
    pub op: ChangeOp,
}

/// Fan-out point for committed writes. Cheap to clone; all clones share the
/// same channel.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    tx: broadcast::Sender<FamilyChange>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_BUFFER);
        Self { tx }
    }

    /// Publish a change. A hub with no subscribers drops it silently.
    pub fn publish(&self, change: FamilyChange) {
        let _ = self.tx.send(change);
    }

    /// Subscribe to changes for one family. Changes for other families are
    /// filtered out before delivery.
    pub fn subscribe(&self, family_code: impl Into<String>) -> FamilySubscription {
        FamilySubscription {
            family_code: family_code.into(),
            rx: self.tx.subscribe(),
        }
    }
}

/// A live subscription to one family's changes.
pub struct FamilySubscription {
    family_code: String,
    rx: broadcast::Receiver<FamilyChange>,
}

impl FamilySubscription {
    /// Wait for the next change in this family. Returns `None` once the hub
    /// is gone. A lagged receiver skips the overwritten changes and keeps
    /// going; clients refetch on every change anyway.
    pub async fn next(&mut self) -> Option<FamilyChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.family_code == self.family_code => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, family_code = %self.family_code, "change subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(family: &str, op: ChangeOp) -> FamilyChange {
        FamilyChange {
            family_code: family.to_string(),
            collection: ChangeCollection::Messages,
            entity_id: Uuid::new_v4(),
            op,
        }
    }

    #[tokio::test]
    async fn delivers_changes_for_subscribed_family() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe("ABC-1234-DE#");

        hub.publish(change("ABC-1234-DE#", ChangeOp::Created));

        let got = sub.next().await.unwrap();
        assert_eq!(got.family_code, "ABC-1234-DE#");
        assert_eq!(got.op, ChangeOp::Created);
    }

    #[tokio::test]
    async fn filters_other_families() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe("ABC-1234-DE#");

        hub.publish(change("XYZ-9999-QQ$", ChangeOp::Created));
        hub.publish(change("ABC-1234-DE#", ChangeOp::Deleted));

        let got = sub.next().await.unwrap();
        assert_eq!(got.op, ChangeOp::Deleted);
    }

    #[tokio::test]
    async fn ends_when_hub_dropped() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe("ABC-1234-DE#");
        drop(hub);

        assert!(sub.next().await.is_none());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let hub = ChangeHub::new();
        hub.publish(change("ABC-1234-DE#", ChangeOp::Updated));
    }

    #[test]
    fn change_serializes_snake_case() {
        let json = serde_json::to_value(change("ABC-1234-DE#", ChangeOp::Created)).unwrap();
        assert_eq!(json["collection"], "messages");
        assert_eq!(json["op"], "created");
    }
}
