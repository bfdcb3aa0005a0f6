//! HTTP surface of the marketplace.
//!
//! Handlers are thin: they pull the caller, path and body out of the request, call into
//! [`crate::core`], and let [`Error`](crate::errors::Error) pick the status code.

use crate::{config::settings::Settings, core::analytics::LanguageModelAdvisor};
use axum::{
    Json, Router,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;

/// Caller identity extractor
pub mod caller;
/// Error to response mapping
pub mod error;
/// Listing endpoints
pub mod listings;
/// Purchase endpoints
pub mod purchases;
/// Revenue analytics endpoints
pub mod revenue;
/// User endpoints
pub mod users;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Shared connection pool
    pub db: Arc<DatabaseConnection>,
    /// Advisory generator for revenue analysis
    pub advisor: Arc<LanguageModelAdvisor>,
    /// Loaded settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wraps the shared pieces for cheap cloning into handlers.
    #[must_use]
    pub fn new(db: DatabaseConnection, advisor: LanguageModelAdvisor, settings: Settings) -> Self {
        Self {
            db: Arc::new(db),
            advisor: Arc::new(advisor),
            settings: Arc::new(settings),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/users", post(users::register))
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/users/me/stats", get(users::my_stats))
        .route("/users/me/listings", get(users::my_listings))
        .route("/users/me/payout-account", put(users::set_payout_account))
        .route("/users/:id", get(users::public_profile))
        .route("/listings", get(listings::browse).post(listings::create))
        .route(
            "/listings/:id",
            get(listings::view)
                .patch(listings::update)
                .delete(listings::delete),
        )
        .route(
            "/transactions",
            get(purchases::history).post(purchases::start),
        )
        .route("/transactions/breakdown", get(purchases::breakdown))
        .route("/transactions/:id", get(purchases::get))
        .route("/transactions/:id/confirm", post(purchases::confirm))
        .route("/transactions/:id/complete", post(purchases::complete))
        .route("/transactions/:id/cancel", post(purchases::cancel))
        .route("/revenue/analyze", post(revenue::analyze))
        .route("/revenue/insights", get(revenue::insights))
        .route("/revenue/metrics", get(revenue::metrics));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Category, ListingStatus, TransactionStatus};
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use tower::ServiceExt;

    pub async fn test_state() -> Result<AppState> {
        let db = setup_test_db().await?;
        Ok(AppState::new(
            db,
            LanguageModelAdvisor::unconfigured(),
            Settings::default(),
        ))
    }

    /// Sends one request through a fresh router and returns the status and JSON body.
    pub async fn call(
        state: &AppState,
        method: Method,
        uri: &str,
        caller: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            request = request.header(caller::CALLER_HEADER, caller.to_string());
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn listing_body(title: &str, price: f64) -> Value {
        json!({
            "title": title,
            "description": "Barely used, comes with the original box and cables.",
            "price": price,
            "category": "ELECTRONICS",
            "condition": "LIKE_NEW",
            "pickup_location": "Koramangala, Bengaluru"
        })
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let state = test_state().await?;
        let (status, body) = call(&state, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_and_profile() -> Result<()> {
        let state = test_state().await?;

        let (status, user) = call(
            &state,
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "dana@example.com", "name": "Dana" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = user["id"].as_i64().unwrap();

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "DANA@example.com", "name": "Dana Again" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");

        let (status, _) = call(&state, Method::GET, "/api/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, me) = call(
            &state,
            Method::PATCH,
            "/api/users/me",
            Some(id),
            Some(json!({ "bio": "Selling my old gear" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["bio"], "Selling my old gear");

        let (status, profile) =
            call(&state, Method::GET, &format!("/api/users/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["name"], "Dana");

        let (status, _) = call(&state, Method::GET, "/api/users/9999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_endpoints() -> Result<()> {
        let state = test_state().await?;
        let seller = create_test_user(&state.db, "seller@example.com").await?;
        let other = create_test_user(&state.db, "other@example.com").await?;

        let (status, created) = call(
            &state,
            Method::POST,
            "/api/listings",
            Some(seller.id),
            Some(listing_body("Noise cancelling headphones", 150.0)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/listings",
            Some(seller.id),
            Some(listing_body("Bad", 150.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, viewed) = call(
            &state,
            Method::GET,
            &format!("/api/listings/{id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(viewed["views"], 1);

        let (status, page) = call(
            &state,
            Method::GET,
            "/api/listings?category=electronics&sort=price_asc",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["listings"].as_array().unwrap().len(), 1);
        assert_eq!(page["next_cursor"], Value::Null);

        let (status, _) = call(
            &state,
            Method::PATCH,
            &format!("/api/listings/{id}"),
            Some(other.id),
            Some(json!({ "price": 99.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = call(
            &state,
            Method::PATCH,
            &format!("/api/listings/{id}"),
            Some(seller.id),
            Some(json!({ "price": 120.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price"], json!(120.0));

        let (status, _) = call(
            &state,
            Method::DELETE,
            &format!("/api/listings/{id}"),
            Some(seller.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(
            &state,
            Method::GET,
            &format!("/api/listings/{id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_flow() -> Result<()> {
        let state = test_state().await?;
        let seller = create_test_user(&state.db, "seller@example.com").await?;
        let buyer = create_test_user(&state.db, "buyer@example.com").await?;
        let listing = create_test_listing(&state.db, seller.id, Category::Furniture, 250.0).await?;
        let start = json!({ "listing_id": listing.id });

        // No payout account yet
        let (status, _) = call(
            &state,
            Method::POST,
            "/api/transactions",
            Some(buyer.id),
            Some(start.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/users/me/payout-account",
            Some(seller.id),
            Some(json!({ "account_id": "acct_seller" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, purchase) = call(
            &state,
            Method::POST,
            "/api/transactions",
            Some(buyer.id),
            Some(start),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(purchase["commission"], json!(25.0));
        assert_eq!(purchase["seller_payout"], json!(225.0));
        let id = purchase["id"].as_i64().unwrap();

        // Only the buyer confirms payment
        let (status, _) = call(
            &state,
            Method::POST,
            &format!("/api/transactions/{id}/confirm"),
            Some(seller.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, confirmed) = call(
            &state,
            Method::POST,
            &format!("/api/transactions/{id}/confirm"),
            Some(buyer.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            confirmed["status"],
            json!(TransactionStatus::PaymentCompleted)
        );

        let (status, completed) = call(
            &state,
            Method::POST,
            &format!("/api/transactions/{id}/complete"),
            Some(seller.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(completed["status"], json!(TransactionStatus::Completed));

        let (status, _) = call(
            &state,
            Method::POST,
            &format!("/api/transactions/{id}/cancel"),
            Some(buyer.id),
            Some(json!({ "reason": "Changed my mind" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, sold) = call(
            &state,
            Method::GET,
            &format!("/api/listings/{}", listing.id),
            None,
            None,
        )
        .await;
        assert_eq!(sold["status"], json!(ListingStatus::Sold));

        let (status, history) = call(
            &state,
            Method::GET,
            "/api/transactions",
            Some(seller.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history["sales"].as_array().unwrap().len(), 1);
        assert!(history["purchases"].as_array().unwrap().is_empty());

        let (status, _) = call(
            &state,
            Method::GET,
            &format!("/api/transactions/{id}"),
            Some(9999),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_breakdown_endpoint() -> Result<()> {
        let state = test_state().await?;

        let (status, body) = call(
            &state,
            Method::GET,
            "/api/transactions/breakdown?amount=19.99",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["commission"], json!(2.0));
        assert_eq!(body["seller_payout"], json!(17.99));

        let (status, _) = call(
            &state,
            Method::GET,
            "/api/transactions/breakdown?amount=-5",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }
}
