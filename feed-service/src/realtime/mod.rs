/// Mutation fanout.
///
/// Every successful create/update/delete emits one event onto a broadcast
/// channel. Delivery is best-effort and fire-and-forget: publishing never
/// blocks and a send with no subscribers is not an error.
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEvent {
    pub action: PostAction,
    pub post: Post,
}

#[derive(Clone)]
pub struct FeedBroadcaster {
    tx: broadcast::Sender<PostEvent>,
}

impl FeedBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit one mutation event. Never fails the originating operation.
    pub fn publish(&self, action: PostAction, post: &Post) {
        let event = PostEvent {
            action,
            post: post.clone(),
        };

        if self.tx.send(event).is_err() {
            tracing::debug!(?action, "no feed subscribers connected");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PostEvent> {
        self.tx.subscribe()
    }
}
