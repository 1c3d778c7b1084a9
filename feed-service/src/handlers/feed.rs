/// Feed handlers - HTTP endpoints for the post lifecycle.
///
/// Mutating routes take `multipart/form-data` with `title` and `content`
/// text fields and at most one file under the fixed `image` field; an
/// `image` text field carries an already-stored path instead.
use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use crate::assets::AssetStore;
use crate::error::{AppError, FieldError, Result};
use crate::middleware::UserId;
use crate::services::{PostDraft, PostService};

const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// One page of the feed
pub async fn get_posts(
    posts: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = posts.list_posts(query.page.unwrap_or(1)).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// A single post by id
pub async fn get_post(
    posts: web::Data<PostService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = posts.get_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "post": post })))
}

/// Publish a new post
pub async fn create_post(
    posts: web::Data<PostService>,
    assets: web::Data<AssetStore>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let draft = read_post_form(payload, &assets).await?;
    let post = posts.create_post(user_id.0, draft).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "post": post })))
}

/// Edit an existing post
pub async fn update_post(
    posts: web::Data<PostService>,
    assets: web::Data<AssetStore>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let draft = read_post_form(payload, &assets).await?;
    let post = posts.update_post(*post_id, user_id.0, draft).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "post": post })))
}

/// Delete a post
pub async fn delete_post(
    posts: web::Data<PostService>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    posts.delete_post(*post_id, user_id.0).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Drain a multipart payload into a post draft, storing an accepted upload
/// on the way through.
async fn read_post_form(mut payload: Multipart, assets: &AssetStore) -> Result<PostDraft> {
    let mut title = String::new();
    let mut content = String::new();
    let mut image_path: Option<String> = None;
    let mut stored_upload: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;

        let filename = field
            .content_disposition()
            .get_filename()
            .map(|name| name.to_string());
        let field_name = field.name().to_string();
        let content_type = field
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(multipart_error)?;
            data.extend_from_slice(&bytes);
            if data.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::Validation(vec![FieldError::new(
                    "image",
                    "Image exceeds the 8MB upload limit",
                )]));
            }
        }

        match (field_name.as_str(), filename) {
            ("image", Some(filename)) => {
                // Disallowed content types are excluded at intake; the
                // request still proceeds without a file.
                stored_upload = assets.store(&filename, &content_type, &data).await?;
            }
            ("image", None) => {
                image_path = Some(text(data)?).filter(|s| !s.trim().is_empty());
            }
            ("title", _) => title = text(data)?,
            ("content", _) => content = text(data)?,
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok(PostDraft {
        title,
        content,
        // A freshly stored upload wins over a passed-through path
        image_url: stored_upload.or(image_path),
    })
}

fn text(data: Vec<u8>) -> Result<String> {
    String::from_utf8(data).map_err(|_| {
        AppError::Validation(vec![FieldError::new("form", "Field is not valid UTF-8")])
    })
}

fn multipart_error(err: actix_multipart::MultipartError) -> AppError {
    AppError::Validation(vec![FieldError::new(
        "form",
        format!("Multipart error: {}", err),
    )])
}
