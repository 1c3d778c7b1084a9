//! Authentication schema and resolvers
use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result as GraphQLResult, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::services::AccountService;

use super::user::User;

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
pub struct AuthData {
    pub token: String,
    pub user_id: String,
}

#[derive(InputObject, Clone, Debug)]
pub struct UserInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Default)]
pub struct AuthQuery;

#[Object]
impl AuthQuery {
    /// Exchange credentials for a bearer token.
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> GraphQLResult<AuthData> {
        let accounts = ctx.data::<AccountService>()?;

        let session = accounts
            .log_in(&email, &password)
            .await
            .map_err(|e| e.extend())?;

        Ok(AuthData {
            token: session.token,
            user_id: session.user_id.to_string(),
        })
    }
}

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    /// Register a new account.
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        user_input: UserInput,
    ) -> GraphQLResult<User> {
        let accounts = ctx.data::<AccountService>()?;

        let user = accounts
            .sign_up(&user_input.name, &user_input.email, &user_input.password)
            .await
            .map_err(|e| e.extend())?;

        Ok(user.into())
    }
}
