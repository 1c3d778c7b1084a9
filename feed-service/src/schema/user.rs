//! Account schema and resolvers
use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::models;
use crate::services::AccountService;

use super::require_auth;

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub post_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<models::User> for User {
    fn from(user: models::User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            status: user.status,
            post_ids: user.post_ids.iter().map(|id| id.to_string()).collect(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The authenticated account.
    async fn user(&self, ctx: &Context<'_>) -> GraphQLResult<User> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let accounts = ctx.data::<AccountService>()?;

        let user = accounts
            .current_user(user_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(user.into())
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Update the authenticated account's status line.
    async fn update_status(&self, ctx: &Context<'_>, status: String) -> GraphQLResult<User> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let accounts = ctx.data::<AccountService>()?;

        let user = accounts
            .update_status(user_id, &status)
            .await
            .map_err(|e| e.extend())?;

        Ok(user.into())
    }
}
