use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::Endpoint;

/// 端点注册表：端点名称 -> 端点
///
/// 同名端点重复注册时原子替换旧端点；已经路由到旧端点的请求继续持有旧端点的引用。
#[derive(Clone)]
pub struct EndpointRegistry {
    endpoints: Arc<RwLock<HashMap<String, Arc<dyn Endpoint>>>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self {
            endpoints: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 注册端点，返回被替换的旧端点
    pub async fn register(&self, endpoint: Arc<dyn Endpoint>) -> Option<Arc<dyn Endpoint>> {
        let name = endpoint.name().to_string();
        let mut registry = self.endpoints.write().await;
        let previous = registry.insert(name.clone(), endpoint);
        if previous.is_some() {
            debug!(endpoint = %name, "替换已注册的端点");
        } else {
            debug!(endpoint = %name, "注册端点");
        }
        previous
    }

    pub async fn register_batch(&self, endpoints: Vec<Arc<dyn Endpoint>>) {
        let mut registry = self.endpoints.write().await;
        for endpoint in endpoints {
            registry.insert(endpoint.name().to_string(), endpoint);
        }
    }

    /// 注销端点，不存在时不做任何事
    pub async fn deregister(&self, name: &str) -> bool {
        let mut registry = self.endpoints.write().await;
        let removed = registry.remove(name).is_some();
        if removed {
            debug!(endpoint = %name, "注销端点");
        }
        removed
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Endpoint>> {
        let registry = self.endpoints.read().await;
        registry.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        let registry = self.endpoints.read().await;
        registry.contains_key(name)
    }

    pub async fn count(&self) -> usize {
        let registry = self.endpoints.read().await;
        registry.len()
    }

    pub async fn list(&self) -> Vec<String> {
        let registry = self.endpoints.read().await;
        let mut names: Vec<String> = registry.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn clear(&self) {
        let mut registry = self.endpoints.write().await;
        registry.clear();
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Request, Response};
    use crate::traits::EndpointOutcome;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticEndpoint {
        name: String,
        tag: &'static str,
    }

    impl StaticEndpoint {
        fn new(name: &str, tag: &'static str) -> Arc<dyn Endpoint> {
            Arc::new(Self {
                name: name.to_string(),
                tag,
            })
        }
    }

    #[async_trait]
    impl Endpoint for StaticEndpoint {
        fn name(&self) -> &str {
            &self.name
        }

        async fn handle_request(&self, _request: Request) -> EndpointOutcome {
            EndpointOutcome::ok(Response::Json(json!({ "tag": self.tag })))
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = EndpointRegistry::new();
        assert!(registry.register(StaticEndpoint::new("get", "v1")).await.is_none());

        let endpoint = registry.get("get").await.unwrap();
        assert_eq!(endpoint.name(), "get");
        assert!(registry.get("missing").await.is_none());
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_reregister_replaces_endpoint() {
        let registry = EndpointRegistry::new();
        registry.register(StaticEndpoint::new("get", "v1")).await;
        let held = registry.get("get").await.unwrap();

        let previous = registry.register(StaticEndpoint::new("get", "v2")).await;
        assert!(previous.is_some());
        assert_eq!(registry.count().await, 1);

        let request = || {
            Request::from_delivery(crate::models::Delivery::new("svc.get", Vec::new()), "svc", "get")
        };
        let current = registry.get("get").await.unwrap();
        let outcome = current.handle_request(request()).await;
        assert_eq!(outcome.response, Response::Json(json!({"tag": "v2"})));

        // 替换前取得的引用仍指向旧端点
        let outcome = held.handle_request(request()).await;
        assert_eq!(outcome.response, Response::Json(json!({"tag": "v1"})));
    }

    #[tokio::test]
    async fn test_deregister_is_idempotent() {
        let registry = EndpointRegistry::new();
        registry.register(StaticEndpoint::new("get", "v1")).await;

        assert!(registry.deregister("get").await);
        assert!(!registry.deregister("get").await);
        assert!(!registry.deregister("never-registered").await);
        assert!(registry.get("get").await.is_none());
        assert!(!registry.contains("get").await);
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let registry = EndpointRegistry::new();
        registry
            .register_batch(vec![
                StaticEndpoint::new("update", "v1"),
                StaticEndpoint::new("create", "v1"),
            ])
            .await;

        assert_eq!(registry.list().await, vec!["create".to_string(), "update".to_string()]);

        registry.clear().await;
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_and_lookup() {
        const N: usize = 200;
        let registry = EndpointRegistry::new();

        let mut handles = Vec::with_capacity(N * 2);
        for i in 0..N {
            let writer = registry.clone();
            handles.push(tokio::spawn(async move {
                writer
                    .register(StaticEndpoint::new(&format!("endpoint-{i}"), "v1"))
                    .await;
            }));
            let reader = registry.clone();
            handles.push(tokio::spawn(async move {
                // 与注册并发的查询只能看到完整的端点或者看不到
                if let Some(endpoint) = reader.get(&format!("endpoint-{i}")).await {
                    assert_eq!(endpoint.name(), format!("endpoint-{i}"));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.count().await, N);
        for i in 0..N {
            assert!(registry.get(&format!("endpoint-{i}")).await.is_some());
        }
    }
}
