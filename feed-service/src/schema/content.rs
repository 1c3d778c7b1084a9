//! Post schema and resolvers
use async_graphql::{
    Context, ErrorExtensions, InputObject, Object, Result as GraphQLResult, SimpleObject, ID,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models;
use crate::services::{PostDraft, PostService};

use super::require_auth;

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<models::Post> for Post {
    fn from(post: models::Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            creator: post.creator.to_string(),
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl From<crate::services::PostPage> for PostPage {
    fn from(page: crate::services::PostPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(Post::from).collect(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

impl From<PostInput> for PostDraft {
    fn from(input: PostInput) -> Self {
        PostDraft {
            title: input.title,
            content: input.content,
            image_url: input.image_url,
        }
    }
}

fn parse_post_id(id: &str) -> GraphQLResult<Uuid> {
    // An unparseable id behaves like an absent one
    Uuid::parse_str(id)
        .map_err(|_| AppError::NotFound("Post not found".to_string()).extend())
}

#[derive(Default)]
pub struct ContentQuery;

#[Object]
impl ContentQuery {
    /// A single post by id.
    async fn post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<Post> {
        require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;

        let post = posts
            .get_post(parse_post_id(&post_id)?)
            .await
            .map_err(|e| e.extend())?;

        Ok(post.into())
    }

    /// One page of the feed, newest first.
    async fn posts(&self, ctx: &Context<'_>, page: Option<i64>) -> GraphQLResult<PostPage> {
        require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;

        let page = posts
            .list_posts(page.unwrap_or(1))
            .await
            .map_err(|e| e.extend())?;

        Ok(page.into())
    }
}

#[derive(Default)]
pub struct ContentMutation;

#[Object]
impl ContentMutation {
    /// Publish a new post owned by the authenticated account.
    async fn create_post(&self, ctx: &Context<'_>, post_input: PostInput) -> GraphQLResult<Post> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;

        let post = posts
            .create_post(user_id, post_input.into())
            .await
            .map_err(|e| e.extend())?;

        Ok(post.into())
    }

    /// Edit an existing post; only its creator may.
    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: ID,
        post_input: PostInput,
    ) -> GraphQLResult<Post> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;

        let post = posts
            .update_post(parse_post_id(&id)?, user_id, post_input.into())
            .await
            .map_err(|e| e.extend())?;

        Ok(post.into())
    }

    /// Delete a post; only its creator may.
    async fn delete_post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<bool> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;

        posts
            .delete_post(parse_post_id(&post_id)?, user_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(true)
    }
}
