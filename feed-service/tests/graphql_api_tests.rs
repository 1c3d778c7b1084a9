//! GraphQL surface integration tests, executed against the schema the way
//! the soft gate feeds it: a `Gate` value attached per request.
mod common;

use async_graphql::Request;
use feed_service::middleware::Gate;
use serde_json::Value;

async fn execute(ctx: &common::TestContext, gate: Gate, query: &str) -> Value {
    let response = ctx
        .state
        .schema
        .execute(Request::new(query).data(gate))
        .await;
    serde_json::to_value(&response).expect("serializable response")
}

fn first_error_code(response: &Value) -> &str {
    response["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or("")
}

#[actix_web::test]
async fn test_create_user_and_login() {
    let ctx = common::context();

    let response = execute(
        &ctx,
        Gate::Anonymous,
        r#"mutation {
            createUser(userInput: { name: "Jane", email: "jane@example.com", password: "secret1" }) {
                id name email status postIds
            }
        }"#,
    )
    .await;
    assert!(response["errors"].is_null(), "unexpected: {response}");
    let user = &response["data"]["createUser"];
    assert_eq!(user["status"], "I am new!");
    assert_eq!(user["postIds"].as_array().unwrap().len(), 0);

    // login is a query on this surface
    let response = execute(
        &ctx,
        Gate::Anonymous,
        r#"{ login(email: "jane@example.com", password: "secret1") { token userId } }"#,
    )
    .await;
    assert!(response["errors"].is_null(), "unexpected: {response}");
    assert_eq!(
        response["data"]["login"]["userId"],
        user["id"].as_str().unwrap()
    );

    // The issued token verifies and decodes to the same user
    let token = response["data"]["login"]["token"].as_str().unwrap();
    let claims = ctx.codec.verify(token).expect("verifies");
    assert_eq!(claims.sub, user["id"].as_str().unwrap());
}

#[actix_web::test]
async fn test_validation_failures_are_multi_entry() {
    let ctx = common::context();

    let response = execute(
        &ctx,
        Gate::Anonymous,
        r#"mutation {
            createUser(userInput: { name: "J", email: "nope", password: "ab" }) { id }
        }"#,
    )
    .await;

    assert_eq!(first_error_code(&response), "VALIDATION_FAILED");
    let errors = response["errors"][0]["extensions"]["errors"]
        .as_array()
        .expect("field errors");
    assert_eq!(errors.len(), 3);
}

#[actix_web::test]
async fn test_reads_require_authentication() {
    let ctx = common::context();

    let response = execute(&ctx, Gate::Anonymous, r#"{ posts(page: 1) { totalItems } }"#).await;
    assert_eq!(first_error_code(&response), "UNAUTHENTICATED");

    let response = execute(&ctx, Gate::Invalid, r#"{ posts(page: 1) { totalItems } }"#).await;
    assert_eq!(first_error_code(&response), "CREDENTIAL_VERIFICATION");
}

#[actix_web::test]
async fn test_post_lifecycle_over_graphql() {
    let ctx = common::context();
    let (user_id, _) = common::signed_up_user(&ctx, "Jane", "jane@example.com").await;
    let gate = Gate::Authenticated { user_id };

    // Create
    let response = execute(
        &ctx,
        gate,
        r#"mutation {
            createPost(postInput: { title: "Hello World", content: "First post" }) {
                id title content imageUrl creator createdAt updatedAt
            }
        }"#,
    )
    .await;
    assert!(response["errors"].is_null(), "unexpected: {response}");
    let post = response["data"]["createPost"].clone();
    let post_id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["imageUrl"], common::PLACEHOLDER);
    assert_eq!(post["creator"], user_id.to_string());

    // The owner's post set tracks it
    let response = execute(&ctx, gate, r#"{ user { postIds } }"#).await;
    assert_eq!(response["data"]["user"]["postIds"][0], post_id.as_str());

    // Read one + paged list
    let response = execute(
        &ctx,
        gate,
        &format!(r#"{{ post(postId: "{post_id}") {{ title }} }}"#),
    )
    .await;
    assert_eq!(response["data"]["post"]["title"], "Hello World");

    let response = execute(
        &ctx,
        gate,
        r#"{ posts(page: 1) { totalItems totalPages currentPage posts { id } } }"#,
    )
    .await;
    let page = &response["data"]["posts"];
    assert_eq!(page["totalItems"], 1);
    assert_eq!(page["totalPages"], 1);

    // Update keeps creator and createdAt
    let response = execute(
        &ctx,
        gate,
        &format!(
            r#"mutation {{
                updatePost(id: "{post_id}", postInput: {{ title: "Hello Again", content: "First post" }}) {{
                    title creator createdAt updatedAt imageUrl
                }}
            }}"#
        ),
    )
    .await;
    let updated = &response["data"]["updatePost"];
    assert_eq!(updated["title"], "Hello Again");
    assert_eq!(updated["creator"], post["creator"]);
    assert_eq!(updated["createdAt"], post["createdAt"]);
    assert_eq!(updated["imageUrl"], common::PLACEHOLDER);

    // Delete, then the id is gone and the post set is pruned
    let response = execute(
        &ctx,
        gate,
        &format!(r#"mutation {{ deletePost(postId: "{post_id}") }}"#),
    )
    .await;
    assert_eq!(response["data"]["deletePost"], true);

    let response = execute(
        &ctx,
        gate,
        &format!(r#"{{ post(postId: "{post_id}") {{ title }} }}"#),
    )
    .await;
    assert_eq!(first_error_code(&response), "NOT_FOUND");

    let response = execute(&ctx, gate, r#"{ user { postIds } }"#).await;
    assert!(response["data"]["user"]["postIds"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[actix_web::test]
async fn test_ownership_enforced_for_foreign_posts() {
    let ctx = common::context();
    let (owner_id, _) = common::signed_up_user(&ctx, "Jane", "jane@example.com").await;
    let (intruder_id, _) = common::signed_up_user(&ctx, "Eve", "eve@example.com").await;

    let post = ctx
        .state
        .posts
        .create_post(
            owner_id,
            feed_service::services::PostDraft {
                title: "Hello World".to_string(),
                content: "First post".to_string(),
                image_url: None,
            },
        )
        .await
        .unwrap();

    let response = execute(
        &ctx,
        Gate::Authenticated {
            user_id: intruder_id,
        },
        &format!(
            r#"mutation {{
                updatePost(id: "{}", postInput: {{ title: "Hijacked post", content: "gotcha" }}) {{ id }}
            }}"#,
            post.id
        ),
    )
    .await;
    assert_eq!(first_error_code(&response), "FORBIDDEN");

    let response = execute(
        &ctx,
        Gate::Authenticated {
            user_id: intruder_id,
        },
        &format!(r#"mutation {{ deletePost(postId: "{}") }}"#, post.id),
    )
    .await;
    assert_eq!(first_error_code(&response), "FORBIDDEN");
}

#[actix_web::test]
async fn test_update_status_over_graphql() {
    let ctx = common::context();
    let (user_id, _) = common::signed_up_user(&ctx, "Jane", "jane@example.com").await;

    let response = execute(
        &ctx,
        Gate::Authenticated { user_id },
        r#"mutation { updateStatus(status: "Shipping things") { status } }"#,
    )
    .await;
    assert_eq!(response["data"]["updateStatus"]["status"], "Shipping things");
}
