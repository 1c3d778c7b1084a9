//! Shared fixture for the integration suites: one in-memory state wired
//! behind the exact routing table the binary serves.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error};
use tempfile::TempDir;

use crypto_core::jwt::TokenCodec;
use feed_service::assets::AssetStore;
use feed_service::config::AssetConfig;
use feed_service::handlers::AppState;
use feed_service::realtime::FeedBroadcaster;
use feed_service::schema::build_schema;
use feed_service::services::{AccountService, PostService};
use feed_service::store::MemoryStore;

pub const TEST_SECRET: &str = "test-secret";
pub const PLACEHOLDER: &str = "/image/dummy.png";

pub struct TestContext {
    pub state: AppState,
    pub codec: TokenCodec,
    pub events: FeedBroadcaster,
    pub upload_dir: TempDir,
}

pub fn context() -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let upload_dir = TempDir::new().expect("tempdir");
    let assets = AssetStore::new(&AssetConfig {
        upload_dir: upload_dir.path().to_string_lossy().to_string(),
        public_base: "/image".to_string(),
        placeholder: PLACEHOLDER.to_string(),
    });
    let codec = TokenCodec::new(TEST_SECRET);
    let events = FeedBroadcaster::new(16);

    let accounts = AccountService::new(store.clone(), codec.clone());
    let posts = PostService::new(store.clone(), store, assets.clone(), events.clone(), 2);
    let schema = build_schema(accounts.clone(), posts.clone(), events.clone());

    TestContext {
        state: AppState {
            accounts,
            posts,
            assets,
            codec: codec.clone(),
            schema,
        },
        codec,
        events,
        upload_dir,
    }
}

/// The same routing table `main` serves, over this context's state.
pub fn app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = Error,
        InitError = (),
    >,
> {
    let state = ctx.state.clone();
    App::new().configure(move |cfg| state.configure(cfg))
}

/// Register an account and return `(user_id, bearer token)`.
pub async fn signed_up_user(ctx: &TestContext, name: &str, email: &str) -> (uuid::Uuid, String) {
    let user = ctx
        .state
        .accounts
        .sign_up(name, email, "secret1")
        .await
        .expect("sign up");
    let token = ctx.codec.issue(user.id, &user.email).expect("token");
    (user.id, token)
}

/// A token whose expiry is already in the past.
pub fn expired_token(user_id: uuid::Uuid, email: &str) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    let now = chrono::Utc::now();
    let claims = crypto_core::jwt::Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: (now - chrono::Duration::hours(2)).timestamp(),
        exp: (now - chrono::Duration::hours(1)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode")
}

/// Build a `multipart/form-data` body with text fields and at most one
/// file part under the fixed `image` field.
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}
