//! API routes

mod auth;
mod bookings;
mod health;
mod location;
mod menu;
pub mod metrics;
mod orders;
pub mod types;

use axum::{Router, extract::DefaultBodyLimit, http::Uri};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::{AppState, MetricsHandle};

pub use auth::{MaybeAuth, RequireAdmin, RequireAuth};

/// Request bodies are small JSON or form payloads
const MAX_BODY_BYTES: usize = 64 * 1024;

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(menu::routes())
        .merge(bookings::routes())
        .merge(orders::routes())
        .merge(location::routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.fallback(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use cova_auth::{AuthService, InactiveUserPolicy, TokenService};
    use cova_db::{Database, DocumentStore, MemoryStore};
    use jsonwebtoken::Algorithm;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const ADMIN_EMAIL: &str = "admin@cova.test";
    const ADMIN_PASSWORD: &str = "admin-pass";

    struct TestApp {
        router: Router,
        store: Arc<MemoryStore>,
        tokens: Arc<TokenService>,
    }

    async fn app() -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let db = Database::with_store(store.clone());
        let tokens = Arc::new(
            TokenService::new("test-secret-key", Algorithm::HS256, chrono::Duration::hours(24))
                .unwrap(),
        );
        let auth = AuthService::new(db.clone(), tokens.clone(), InactiveUserPolicy::Reject);
        auth.bootstrap_admin("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        TestApp {
            router: create_router(AppState::new(db, auth, true), None),
            store,
            tokens,
        }
    }

    fn degraded_app() -> Router {
        let db = Database::unavailable();
        let tokens = Arc::new(
            TokenService::new("test-secret-key", Algorithm::HS256, chrono::Duration::hours(24))
                .unwrap(),
        );
        let auth = AuthService::new(db.clone(), tokens, InactiveUserPolicy::Reject);
        create_router(AppState::new(db, auth, false), None)
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::post("/auth/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", email, password)))
            .unwrap()
    }

    async fn login(router: &Router, email: &str, password: &str) -> String {
        let response = send(router, login_request(email, password)).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn signup(router: &Router, email: &str, password: &str) -> Response {
        send(
            router,
            post_json(
                "/auth/signup",
                None,
                json!({"name": "Ada", "email": email, "password": password}),
            ),
        )
        .await
    }

    fn menu_item() -> Value {
        json!({"name": "Steak", "price": 24.5, "category": "Mains", "is_bestseller": true})
    }

    fn booking() -> Value {
        json!({
            "name": "Ada",
            "phone": "555-0100",
            "date": "2025-03-14",
            "time": "19:30",
            "guests": 4
        })
    }

    fn order() -> Value {
        json!({"items": [{"item_id": "m1", "quantity": 2}], "total": 49.0})
    }

    #[tokio::test]
    async fn test_root_and_schema() {
        let app = app().await;

        let root = body_json(send(&app.router, get("/", None)).await).await;
        assert_eq!(root, json!({"name": "COVA", "status": "ok"}));

        let schema = body_json(send(&app.router, get("/schema", None)).await).await;
        assert_eq!(
            schema["collections"],
            json!(["user", "menuitem", "order", "booking", "location"])
        );
    }

    #[tokio::test]
    async fn test_signup_login_flow() {
        let app = app().await;

        let response = signup(&app.router, "a@x.com", "pw123").await;
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["token_type"], "bearer");
        let user_id = created["user_id"].as_str().unwrap().to_string();

        let duplicate = signup(&app.router, "a@x.com", "pw123").await;
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(duplicate).await["detail"], "Email already registered");

        let token = login(&app.router, "a@x.com", "pw123").await;
        let me = body_json(send(&app.router, get("/auth/me", Some(&token))).await).await;
        assert_eq!(me["id"], user_id.as_str());
        assert_eq!(me["email"], "a@x.com");
        assert_eq!(me["role"], "customer");
        assert!(me.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let app = app().await;
        signup(&app.router, "a@x.com", "pw123").await;

        for (email, password) in [("a@x.com", "nope"), ("ghost@x.com", "pw123")] {
            let response = send(&app.router, login_request(email, password)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                body_json(response).await["detail"],
                "Incorrect email or password"
            );
        }
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let app = app().await;

        let response = signup(&app.router, "not-an-email", "pw123").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_menu_requires_admin() {
        let app = app().await;
        signup(&app.router, "a@x.com", "pw123").await;
        let customer = login(&app.router, "a@x.com", "pw123").await;
        let admin = login(&app.router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

        let anonymous = send(&app.router, post_json("/menu", None, menu_item())).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let forbidden = send(&app.router, post_json("/menu", Some(&customer), menu_item())).await;
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(forbidden).await["detail"], "Admins only");

        let created = send(&app.router, post_json("/menu", Some(&admin), menu_item())).await;
        assert_eq!(created.status(), StatusCode::OK);
        assert!(body_json(created).await["id"].is_string());

        let menu = body_json(send(&app.router, get("/menu?category=Mains&bestseller=true", None)).await).await;
        assert_eq!(menu.as_array().unwrap().len(), 1);
        assert_eq!(menu[0]["name"], "Steak");

        let desserts = body_json(send(&app.router, get("/menu?category=Desserts", None)).await).await;
        assert!(desserts.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_menu_item_rejected() {
        let app = app().await;
        let admin = login(&app.router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

        let response = send(
            &app.router,
            post_json(
                "/menu",
                Some(&admin),
                json!({"name": "Soup", "price": -1.0, "category": "Starters"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_bookings() {
        let app = app().await;
        signup(&app.router, "a@x.com", "pw123").await;
        let customer = login(&app.router, "a@x.com", "pw123").await;
        let admin = login(&app.router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

        let created = send(&app.router, post_json("/bookings", None, booking())).await;
        assert_eq!(created.status(), StatusCode::OK);
        assert_eq!(body_json(created).await["message"], "Booking received");

        let mut too_big = booking();
        too_big["guests"] = json!(21);
        let rejected = send(&app.router, post_json("/bookings", None, too_big)).await;
        assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let unauthenticated = send(&app.router, get("/bookings", None)).await;
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

        let forbidden = send(&app.router, get("/bookings", Some(&customer))).await;
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let listed = body_json(send(&app.router, get("/bookings", Some(&admin))).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["guests"], 4);
    }

    #[tokio::test]
    async fn test_anonymous_order_has_no_owner() {
        let app = app().await;

        let response = send(&app.router, post_json("/orders", None, order())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["message"], "Order placed");

        let stored = app.store.find("order", None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, created["id"].as_str().unwrap());
        assert!(stored[0].body.get("user_id").is_none_or(Value::is_null));
    }

    #[tokio::test]
    async fn test_orders_are_stamped_and_scoped() {
        let app = app().await;
        let user_id = body_json(signup(&app.router, "a@x.com", "pw123").await).await["user_id"]
            .as_str()
            .unwrap()
            .to_string();
        signup(&app.router, "b@x.com", "pw456").await;
        let alice = login(&app.router, "a@x.com", "pw123").await;
        let bob = login(&app.router, "b@x.com", "pw456").await;

        let placed = send(&app.router, post_json("/orders", Some(&alice), order())).await;
        assert_eq!(placed.status(), StatusCode::OK);
        send(&app.router, post_json("/orders", None, order())).await;

        let mine = body_json(send(&app.router, get("/orders", Some(&alice))).await).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["user_id"], user_id.as_str());
        assert_eq!(mine[0]["status"], "pending");

        let theirs = body_json(send(&app.router, get("/orders", Some(&bob))).await).await;
        assert!(theirs.as_array().unwrap().is_empty());

        let anonymous = send(&app.router, get("/orders", None)).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_presented_token_must_be_valid() {
        let app = app().await;
        signup(&app.router, "a@x.com", "pw123").await;

        let expired = app
            .tokens
            .issue_with_ttl("a@x.com", chrono::Duration::seconds(-1))
            .unwrap();
        for token in [expired.as_str(), "not-a-token"] {
            let response = send(&app.router, post_json("/orders", Some(token), order())).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
            assert_eq!(
                body_json(response).await["detail"],
                "Could not validate credentials"
            );
        }

        let ghost = app.tokens.issue("ghost@x.com").unwrap();
        let response = send(&app.router, get("/orders", Some(&ghost))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_location_fallback() {
        let app = app().await;

        let location = body_json(send(&app.router, get("/location", None)).await).await;
        assert_eq!(location["address"], "123 COVA Street, Food City");
        assert_eq!(location["opening_hours"], "Mon-Sun: 10:00 - 22:00");
    }

    #[tokio::test]
    async fn test_diagnostics() {
        let app = app().await;

        let report = body_json(send(&app.router, get("/test", None)).await).await;
        assert_eq!(report["backend"], "running");
        assert_eq!(report["database"], "connected");
        assert_eq!(report["database_backend"], "memory");
        assert_eq!(report["database_url"], "set");
        assert_eq!(report["collections"], json!(["user"]));
    }

    #[tokio::test]
    async fn test_degraded_mode() {
        let router = degraded_app();

        let report = body_json(send(&router, get("/test", None)).await).await;
        assert_eq!(report["database"], "not available");
        assert_eq!(report["connection_status"], "Not Connected");

        let booking = send(&router, post_json("/bookings", None, booking())).await;
        assert_eq!(booking.status(), StatusCode::SERVICE_UNAVAILABLE);

        let signup = signup(&router, "a@x.com", "pw123").await;
        assert_eq!(signup.status(), StatusCode::SERVICE_UNAVAILABLE);

        let menu = body_json(send(&router, get("/menu", None)).await).await;
        assert_eq!(menu, json!([]));

        let location = body_json(send(&router, get("/location", None)).await).await;
        assert_eq!(location["address"], "123 COVA Street, Food City");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app().await;
        let response = send(&app.router, get("/nope", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
