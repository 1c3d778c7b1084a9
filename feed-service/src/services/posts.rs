/// Post service - the authenticated post lifecycle.
///
/// Ownership is enforced here, not in the surfaces: only the creator may
/// mutate or delete a post, and `creator`/`created_at` never change after
/// creation.
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::assets::AssetStore;
use crate::error::{AppError, Result};
use crate::models::Post;
use crate::realtime::{FeedBroadcaster, PostAction};
use crate::store::{PostStore, UserStore};
use crate::validators;

/// Input for create/update. `image_url` of `None` means "keep what is
/// stored" on update and "use the placeholder" on create.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// One page of the feed, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
    assets: AssetStore,
    events: FeedBroadcaster,
    page_size: i64,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
        assets: AssetStore,
        events: FeedBroadcaster,
        page_size: i64,
    ) -> Self {
        Self {
            posts,
            users,
            assets,
            events,
            page_size,
        }
    }

    /// The asset store mutations reconcile against.
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Publish a new post owned by `owner`.
    pub async fn create_post(&self, owner: Uuid, draft: PostDraft) -> Result<Post> {
        let errors = validators::post_errors(&draft.title, &draft.content);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        // The gate verified the token; the identity behind it must still exist.
        if self.users.user_by_id(owner).await?.is_none() {
            return Err(AppError::Unauthenticated("Invalid user".to_string()));
        }

        let image_url = draft
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.assets.placeholder().to_string());

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            content: draft.content.trim().to_string(),
            image_url,
            creator: owner,
            created_at: now,
            updated_at: now,
        };

        self.posts.insert_post(&post).await?;
        self.users.push_post(owner, post.id).await?;

        self.events.publish(PostAction::Create, &post);
        tracing::info!(post_id = %post.id, creator = %owner, "post created");

        Ok(post)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post> {
        self.posts
            .post_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// One feed page. An out-of-range page yields an empty slice, and
    /// `total_pages` is at least 1 even for an empty feed.
    pub async fn list_posts(&self, page: i64) -> Result<PostPage> {
        let current_page = page.max(1);
        let total_items = self.posts.count_posts().await?;

        let total_pages = ((total_items + self.page_size - 1) / self.page_size).max(1);

        let posts = if total_items > 0 {
            self.posts
                .posts_page((current_page - 1) * self.page_size, self.page_size)
                .await?
        } else {
            vec![]
        };

        Ok(PostPage {
            posts,
            current_page,
            total_pages,
            total_items,
        })
    }

    /// Edit a post. Only the creator may do this; a changed image path
    /// reconciles the superseded asset.
    pub async fn update_post(&self, id: Uuid, requester: Uuid, draft: PostDraft) -> Result<Post> {
        let errors = validators::post_errors(&draft.title, &draft.content);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let mut post = self.get_post(id).await?;
        if post.creator != requester {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let old_image = post.image_url.clone();

        post.title = draft.title.trim().to_string();
        post.content = draft.content.trim().to_string();
        if let Some(image_url) = draft.image_url.filter(|url| !url.trim().is_empty()) {
            post.image_url = image_url;
        }
        // Server-assigned and monotonic even under clock weirdness
        post.updated_at = Utc::now().max(post.updated_at);

        if !self.posts.update_post(&post).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        if post.image_url != old_image {
            self.assets.reconcile(&old_image, &post.image_url).await;
        }

        self.events.publish(PostAction::Update, &post);

        Ok(post)
    }

    /// Delete a post. Removes the document, prunes the owner's post set,
    /// then reconciles the image asset; the asset step is non-fatal.
    pub async fn delete_post(&self, id: Uuid, requester: Uuid) -> Result<()> {
        let post = self.get_post(id).await?;
        if post.creator != requester {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        if !self.posts.delete_post(id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        // Post-set pruning happens before asset cleanup and is never skipped
        // because of it.
        self.users.pull_post(post.creator, id).await?;

        self.assets
            .reconcile(&post.image_url, self.assets.placeholder())
            .await;

        self.events.publish(PostAction::Delete, &post);
        tracing::info!(post_id = %id, creator = %requester, "post deleted");

        Ok(())
    }
}
