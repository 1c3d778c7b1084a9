/// HTTP surface wiring.
///
/// `AppState::configure` registers both surfaces on an actix app so the
/// binary and the integration tests run the exact same routing table.
pub mod auth;
pub mod feed;

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};

use crypto_core::jwt::TokenCodec;

use crate::assets::AssetStore;
use crate::middleware::{Gate, IdentityGate, RequireAuth};
use crate::schema::AppSchema;
use crate::services::{AccountService, PostService};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub posts: PostService,
    pub assets: AssetStore,
    pub codec: TokenCodec,
    pub schema: AppSchema,
}

async fn graphql_handler(
    schema: web::Data<AppSchema>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let gate = http_req
        .extensions()
        .get::<Gate>()
        .copied()
        .unwrap_or(Gate::Anonymous);

    schema.execute(req.into_inner().data(gate)).await.into()
}

async fn graphql_subscription_handler(
    schema: web::Data<AppSchema>,
    req: HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<HttpResponse> {
    GraphQLSubscription::new(schema.as_ref().clone()).start(&req, payload)
}

async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "feed-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

impl AppState {
    pub fn configure(self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.accounts.clone()))
            .app_data(web::Data::new(self.posts.clone()))
            .app_data(web::Data::new(self.assets.clone()))
            .app_data(web::Data::new(self.schema.clone()))
            .route("/health", web::get().to(health_handler))
            .service(
                web::scope("/feed")
                    .wrap(RequireAuth::new(self.codec.clone()))
                    .service(
                        web::resource("/posts")
                            .route(web::get().to(feed::get_posts))
                            .route(web::post().to(feed::create_post)),
                    )
                    .service(
                        web::resource("/posts/{post_id}")
                            .route(web::get().to(feed::get_post))
                            .route(web::put().to(feed::update_post))
                            .route(web::delete().to(feed::delete_post)),
                    ),
            )
            .service(
                web::scope("/auth")
                    .route("/signup", web::put().to(auth::sign_up))
                    .route("/login", web::post().to(auth::log_in))
                    .service(
                        web::scope("")
                            .wrap(RequireAuth::new(self.codec.clone()))
                            .route("/user", web::get().to(auth::current_user))
                            .route("/status", web::patch().to(auth::update_status)),
                    ),
            )
            .service(
                web::scope("/graphql")
                    .wrap(IdentityGate::new(self.codec))
                    .service(
                        web::resource("")
                            .route(web::post().to(graphql_handler))
                            .route(web::get().to(graphql_subscription_handler)),
                    ),
            );
    }
}
