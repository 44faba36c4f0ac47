//! HTTP server for the Inventory Movement Ledger.
//!
//! A thin axum surface over the ledger coordinator: record movements,
//! snapshot the chain, run verification, and list the transaction log.
//! All domain behavior lives below this crate; handlers translate between
//! HTTP and the coordinator's types.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{AnchorSettings, SeedProduct, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::ImlServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn seeded_state(seed: &[(u64, u64)]) -> AppState {
        let config = ServerConfig {
            inventory: seed
                .iter()
                .map(|&(product_id, quantity)| SeedProduct {
                    product_id,
                    quantity,
                })
                .collect(),
            ..ServerConfig::default()
        };
        AppState::from_config(&config).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(seeded_state(&[]));
        let response = app.oneshot(get("/v1/health")).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn info_reports_fresh_chain() {
        let app = build_router(seeded_state(&[]));
        let response = app.oneshot(get("/v1/info")).await.unwrap();
        assert_eq!(response.status(), 200);

        let body = body_json(response).await;
        assert_eq!(body["chain"]["length"], 1);
        assert_eq!(body["chain"]["valid"], true);
    }

    #[tokio::test]
    async fn record_movement_returns_receipt_with_warning_when_unanchored() {
        let state = seeded_state(&[(42, 10)]);
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/v1/movements",
                json!({"type": "export", "product_id": 42, "amount": 3}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body = body_json(response).await;
        assert_eq!(body["entry"]["type"], "export");
        assert_eq!(body["entry"]["amount"], 3);
        assert_eq!(body["block"]["index"], 1);
        assert_eq!(body["anchored"], false);
        assert!(body["warning"]
            .as_str()
            .unwrap()
            .contains("disabled by configuration"));

        let chain = build_router(state).oneshot(get("/v1/chain")).await.unwrap();
        let chain_body = body_json(chain).await;
        assert_eq!(chain_body["length"], 2);
        assert_eq!(chain_body["blocks"][1]["payload"]["amount"], 3);
    }

    #[tokio::test]
    async fn insufficient_stock_is_a_conflict() {
        let state = seeded_state(&[(42, 10)]);

        let response = build_router(state.clone())
            .oneshot(post_json(
                "/v1/movements",
                json!({"type": "export", "product_id": 42, "amount": 20}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 409);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("insufficient stock"));

        // No block was appended for the failed movement.
        let chain = build_router(state).oneshot(get("/v1/chain")).await.unwrap();
        assert_eq!(body_json(chain).await["length"], 1);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let response = build_router(seeded_state(&[]))
            .oneshot(post_json(
                "/v1/movements",
                json!({"type": "import", "product_id": 99, "amount": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn zero_amount_is_a_bad_request() {
        let response = build_router(seeded_state(&[(1, 5)]))
            .oneshot(post_json(
                "/v1/movements",
                json!({"type": "import", "product_id": 1, "amount": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/movements")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = build_router(seeded_state(&[]))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn verify_endpoint_reports_validity() {
        let state = seeded_state(&[(7, 10)]);
        build_router(state.clone())
            .oneshot(post_json(
                "/v1/movements",
                json!({"type": "import", "product_id": 7, "amount": 2}),
            ))
            .await
            .unwrap();

        let response = build_router(state)
            .oneshot(get("/v1/chain/verify"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body = body_json(response).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["length"], 2);
        assert!(body.get("first_invalid_index").is_none());
    }

    #[tokio::test]
    async fn logs_endpoint_lists_and_filters() {
        let state = seeded_state(&[(1, 10), (2, 10)]);
        for (product, amount) in [(1, 3), (2, 4), (1, 1)] {
            build_router(state.clone())
                .oneshot(post_json(
                    "/v1/movements",
                    json!({"type": "export", "product_id": product, "amount": amount}),
                ))
                .await
                .unwrap();
        }

        let all = build_router(state.clone())
            .oneshot(get("/v1/logs"))
            .await
            .unwrap();
        assert_eq!(body_json(all).await["count"], 3);

        let filtered = build_router(state)
            .oneshot(get("/v1/logs?product_id=1"))
            .await
            .unwrap();
        let body = body_json(filtered).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["entries"][0]["product_id"], 1);
        assert_eq!(body["entries"][1]["product_id"], 1);
    }
}
