/// Account handlers - HTTP endpoints for sign-up, login and profile status.
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::UserView;
use crate::services::AccountService;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Register a new account
pub async fn sign_up(
    accounts: web::Data<AccountService>,
    req: web::Json<SignUpRequest>,
) -> Result<HttpResponse> {
    let user = accounts
        .sign_up(&req.name, &req.email, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "user_id": user.id })))
}

/// Exchange credentials for a bearer token
pub async fn log_in(
    accounts: web::Data<AccountService>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let session = accounts.log_in(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": session.token,
        "user_id": session.user_id,
    })))
}

/// The authenticated account
pub async fn current_user(
    accounts: web::Data<AccountService>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let user = accounts.current_user(user_id.0).await?;

    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

/// Update the authenticated account's status line
pub async fn update_status(
    accounts: web::Data<AccountService>,
    user_id: UserId,
    req: web::Json<StatusRequest>,
) -> Result<HttpResponse> {
    let user = accounts.update_status(user_id.0, &req.status).await?;

    Ok(HttpResponse::Ok().json(UserView::from(user)))
}
