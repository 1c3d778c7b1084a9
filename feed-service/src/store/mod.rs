/// Document stores for the two persisted collections.
///
/// The domain layer only sees these traits: lookup by identifier, exact
/// match on email, skip/limit paging, and atomic per-document updates.
/// `postgres` is the production backend; `memory` backs the test suite and
/// the `memory` store mode.
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Post, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. A duplicate email fails with a conflict-classified
    /// validation error.
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update the status string, returning the updated user when present.
    async fn set_status(
        &self,
        id: Uuid,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>>;

    /// Append a post id to the owner's post set. Must be atomic with respect
    /// to other mutations of the same owner's set.
    async fn push_post(&self, user_id: Uuid, post_id: Uuid) -> Result<()>;

    /// Remove a post id from the owner's post set. Same atomicity contract
    /// as [`UserStore::push_post`].
    async fn pull_post(&self, user_id: Uuid, post_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &Post) -> Result<()>;

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    async fn count_posts(&self) -> Result<i64>;

    /// One page of posts, newest first.
    async fn posts_page(&self, offset: i64, limit: i64) -> Result<Vec<Post>>;

    /// Persist changed fields of an existing post; `false` when absent.
    async fn update_post(&self, post: &Post) -> Result<bool>;

    /// Remove a post; `false` when absent.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
}
