/// In-memory stores.
///
/// Backs the test suite and the `memory` store mode. The write lock is held
/// across every read-modify-write so per-owner post-set updates keep the
/// same atomicity contract as the Postgres backend.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, FieldError, Result};
use crate::models::{Post, User};
use crate::store::{PostStore, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Validation(vec![FieldError::new(
                "email",
                "Email exists already, please pick a different one",
            )]));
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.status = status.to_string();
            user.updated_at = updated_at;
            user.clone()
        }))
    }

    async fn push_post(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&user_id) {
            user.post_ids.retain(|id| *id != post_id);
            user.post_ids.push(post_id);
        }
        Ok(())
    }

    async fn pull_post(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&user_id) {
            user.post_ids.retain(|id| *id != post_id);
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn count_posts(&self) -> Result<i64> {
        Ok(self.posts.read().await.len() as i64)
    }

    async fn posts_page(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut ordered: Vec<Post> = posts.values().cloned().collect();
        // Newest first, id as a deterministic tie-breaker
        ordered.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(ordered
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_post(&self, post: &Post) -> Result<bool> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            status: "I am new!".to_string(),
            post_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&sample_user("jane@example.com")).await.unwrap();

        let err = store
            .insert_user(&sample_user("jane@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_push_and_pull_post_ids() {
        let store = MemoryStore::new();
        let user = sample_user("jane@example.com");
        store.insert_user(&user).await.unwrap();

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        store.push_post(user.id, first).await.unwrap();
        store.push_post(user.id, second).await.unwrap();

        let stored = store.user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.post_ids, vec![first, second]);

        store.pull_post(user.id, first).await.unwrap();
        let stored = store.user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.post_ids, vec![second]);
    }

    #[tokio::test]
    async fn test_posts_page_orders_newest_first() {
        let store = MemoryStore::new();
        let creator = Uuid::new_v4();
        let base = Utc::now();

        for i in 0..3 {
            let at = base + chrono::Duration::seconds(i);
            store
                .insert_post(&Post {
                    id: Uuid::new_v4(),
                    title: format!("Post number {}", i),
                    content: "body".to_string(),
                    image_url: "/image/dummy.png".to_string(),
                    creator,
                    created_at: at,
                    updated_at: at,
                })
                .await
                .unwrap();
        }

        let page = store.posts_page(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].created_at >= page[1].created_at);

        let rest = store.posts_page(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
    }
}
