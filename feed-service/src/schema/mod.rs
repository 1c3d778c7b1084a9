//! GraphQL schema: the query-language surface of the facade.
//!
//! Resolvers are thin adapters over the same services the REST handlers
//! call; the soft gate upstream attaches a [`Gate`] and resolvers reject
//! anonymous or invalid identities themselves.

pub mod auth;
pub mod content;
pub mod subscription;
pub mod user;

use async_graphql::{Context, MergedObject, Schema};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::Gate;
use crate::realtime::FeedBroadcaster;
use crate::services::{AccountService, PostService};

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(auth::AuthQuery, content::ContentQuery, user::UserQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(auth::AuthMutation, content::ContentMutation, user::UserMutation);

/// GraphQL app schema type with WebSocket subscriptions
pub type AppSchema = Schema<QueryRoot, MutationRoot, subscription::SubscriptionRoot>;

pub fn build_schema(
    accounts: AccountService,
    posts: PostService,
    events: FeedBroadcaster,
) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        subscription::SubscriptionRoot,
    )
    .data(accounts)
    .data(posts)
    .data(events)
    .finish()
}

/// Verify the gate attached a verified identity and return it.
///
/// Rejections carry the same two kinds the hard gate uses, so the same
/// broken credential classifies identically through either surface.
pub(crate) fn require_auth(ctx: &Context<'_>) -> Result<Uuid, AppError> {
    match ctx.data_opt::<Gate>() {
        Some(Gate::Authenticated { user_id }) => Ok(*user_id),
        Some(Gate::Invalid) => Err(AppError::CredentialVerification(
            "Invalid or expired token".to_string(),
        )),
        _ => Err(AppError::Unauthenticated("Not authenticated".to_string())),
    }
}
