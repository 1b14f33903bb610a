use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::dispatch::BoundRoute;
use crate::registry::EndpointTable;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub routes: usize,
    pub endpoints: usize,
}

#[derive(Serialize)]
pub struct RouteListing {
    /// Units in bind order.
    pub bound: Vec<BoundRoute>,
    /// Route id → resolved endpoint.
    pub endpoints: EndpointTable,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        routes: state.bound.len(),
        endpoints: state.endpoints.len(),
    })
}

pub async fn get_routes(State(state): State<AdminState>) -> Json<RouteListing> {
    Json(RouteListing {
        bound: state.bound.to_vec(),
        endpoints: (*state.endpoints).clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::setup_admin_router;
    use crate::route::Verb;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    fn state() -> AdminState {
        let mut endpoints = EndpointTable::new();
        endpoints.insert("health", "/health".into());
        let bound = vec![BoundRoute {
            id: "health".into(),
            method: Verb::Get,
            endpoint: "/health".into(),
            order: 0,
        }];
        AdminState::new("secret", endpoints, bound)
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let res = setup_admin_router(state())
            .oneshot(Request::builder().uri("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = setup_admin_router(state())
            .oneshot(
                Request::builder()
                    .uri("/admin/status")
                    .header("Authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_lists_routes() {
        let res = setup_admin_router(state())
            .oneshot(
                Request::builder()
                    .uri("/admin/routes")
                    .header("Authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["bound"][0]["id"], "health");
        assert_eq!(json["bound"][0]["method"], "GET");
        assert_eq!(json["endpoints"]["health"], "/health");
    }
}
