//! 内置端点

use std::sync::Arc;

use async_trait::async_trait;
use bunny_core::{Endpoint, EndpointOutcome, FnEndpoint, Request, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Pong {
    service: String,
    received_at: String,
}

/// 健康检查端点
pub struct PingEndpoint;

#[async_trait]
impl Endpoint for PingEndpoint {
    fn name(&self) -> &str {
        "ping"
    }

    async fn handle_request(&self, request: Request) -> EndpointOutcome {
        Response::json(&Pong {
            service: request.service().to_string(),
            received_at: request.received_at().to_rfc3339(),
        })
        .into()
    }
}

pub fn echo_endpoint() -> Arc<dyn Endpoint> {
    Arc::new(FnEndpoint::new("echo", |request: Request| async move {
        EndpointOutcome::ok(Response::raw(request.into_body()))
    }))
}

pub fn builtin_endpoints() -> Vec<Arc<dyn Endpoint>> {
    vec![Arc::new(PingEndpoint), echo_endpoint()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunny_core::Delivery;

    fn request(endpoint: &str, body: &[u8]) -> Request {
        Request::from_delivery(
            Delivery::new(format!("bunny.{endpoint}"), body.to_vec()),
            "bunny",
            endpoint,
        )
    }

    #[tokio::test]
    async fn test_ping_reports_service() {
        let outcome = PingEndpoint.handle_request(request("ping", b"")).await;
        assert!(!outcome.is_error());
        match outcome.response {
            Response::Json(value) => assert_eq!(value["service"], "bunny"),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_echo_returns_body() {
        let outcome = echo_endpoint()
            .handle_request(request("echo", b"\x01\x02"))
            .await;
        assert_eq!(outcome.response, Response::Raw(vec![1, 2]));
    }

    #[test]
    fn test_builtin_endpoint_names() {
        let names: Vec<String> = builtin_endpoints()
            .iter()
            .map(|endpoint| endpoint.name().to_string())
            .collect();
        assert_eq!(names, vec!["ping".to_string(), "echo".to_string()]);
    }
}
