//! GraphQL subscriptions (WebSocket support)
//!
//! Surfaces the mutation fanout channel to connected clients. Delivery is
//! at-most-once and best-effort: a slow consumer that overflows its buffer
//! simply misses events.
use std::pin::Pin;

use async_graphql::{Context, Enum, Result as GraphQLResult, Subscription, SimpleObject};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::realtime::{self, FeedBroadcaster};

use super::content::Post;

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(rename_items = "lowercase")]
pub enum PostAction {
    Create,
    Update,
    Delete,
}

impl From<realtime::PostAction> for PostAction {
    fn from(action: realtime::PostAction) -> Self {
        match action {
            realtime::PostAction::Create => PostAction::Create,
            realtime::PostAction::Update => PostAction::Update,
            realtime::PostAction::Delete => PostAction::Delete,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct PostFeedEvent {
    pub action: PostAction,
    pub post: Post,
}

impl From<realtime::PostEvent> for PostFeedEvent {
    fn from(event: realtime::PostEvent) -> Self {
        Self {
            action: event.action.into(),
            post: event.post.into(),
        }
    }
}

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Emits one event per successful post create/update/delete.
    async fn post_events(
        &self,
        ctx: &Context<'_>,
    ) -> GraphQLResult<Pin<Box<dyn Stream<Item = PostFeedEvent> + Send>>> {
        let events = ctx.data::<FeedBroadcaster>()?;

        Ok(BroadcastStream::new(events.subscribe())
            .filter_map(|event| async move { event.ok().map(PostFeedEvent::from) })
            .boxed())
    }
}
