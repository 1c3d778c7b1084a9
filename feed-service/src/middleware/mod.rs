/// HTTP middleware for the feed service.
///
/// Both gates run the same token classifier; they differ only in policy.
/// `RequireAuth` fronts the REST surface and rejects before any handler
/// runs. `IdentityGate` fronts the GraphQL surface and only stamps the
/// request - resolvers decide what an anonymous caller may do.
use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ResponseError;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crypto_core::jwt::TokenCodec;

use crate::error::AppError;

/// Outcome of classifying one request's credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// A verified identity.
    Authenticated { user_id: Uuid },
    /// No credential supplied.
    Anonymous,
    /// A credential was supplied but failed verification.
    Invalid,
}

/// Classify an `Authorization` header value against the token codec.
pub fn classify(header: Option<&str>, codec: &TokenCodec) -> Gate {
    let Some(header) = header else {
        return Gate::Anonymous;
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return Gate::Invalid;
    };

    match codec.verify(token).and_then(|claims| claims.user_id()) {
        Ok(user_id) => Gate::Authenticated { user_id },
        Err(_) => Gate::Invalid,
    }
}

fn authorization_header(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
}

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .copied()
                .ok_or_else(|| AppError::Unauthenticated("User ID missing".to_string()).into()),
        )
    }
}

// =====================================================================
// Hard gate
// =====================================================================

/// Rejecting gate: a request without a verified identity never reaches the
/// handler. A missing credential and a failing one carry different error
/// kinds, but both block.
pub struct RequireAuth {
    codec: TokenCodec,
}

impl RequireAuth {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService {
            service: Rc::new(service),
            codec: self.codec.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    codec: TokenCodec,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let gate = classify(authorization_header(&req), &self.codec);

        Box::pin(async move {
            let rejected = match gate {
                Gate::Authenticated { user_id } => {
                    req.extensions_mut().insert(UserId(user_id));
                    let res = service.call(req).await?;
                    return Ok(res.map_into_left_body());
                }
                Gate::Anonymous => AppError::Unauthenticated("Not authenticated".to_string()),
                Gate::Invalid => {
                    AppError::CredentialVerification("Invalid or expired token".to_string())
                }
            };

            let response = rejected.error_response();
            Ok(req.into_response(response).map_into_right_body())
        })
    }
}

// =====================================================================
// Soft gate
// =====================================================================

/// Non-rejecting gate: stamps the classified identity onto the request and
/// always proceeds.
pub struct IdentityGate {
    codec: TokenCodec,
}

impl IdentityGate {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityGateService {
            service: Rc::new(service),
            codec: self.codec.clone(),
        }))
    }
}

pub struct IdentityGateService<S> {
    service: Rc<S>,
    codec: TokenCodec,
}

impl<S, B> Service<ServiceRequest> for IdentityGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let gate = classify(authorization_header(&req), &self.codec);

        req.extensions_mut().insert(gate);
        if let Gate::Authenticated { user_id } = gate {
            req.extensions_mut().insert(UserId(user_id));
        }

        Box::pin(async move { service.call(req).await })
    }
}
