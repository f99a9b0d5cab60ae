use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 从消息代理收到的一条请求消息
///
/// 路由键格式为 `"<服务名>.<端点名>"`，关联ID和回复地址原样用于回复。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub routing_key: String,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
    pub body: Vec<u8>,
}

impl Delivery {
    pub fn new<K: Into<String>>(routing_key: K, body: Vec<u8>) -> Self {
        Self {
            routing_key: routing_key.into(),
            correlation_id: None,
            reply_to: None,
            body,
        }
    }
    pub fn with_correlation_id<S: Into<String>>(mut self, correlation_id: S) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
    pub fn with_reply_to<S: Into<String>>(mut self, reply_to: S) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// 发往回复地址的应答消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publishing {
    pub correlation_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Publishing {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            correlation_id: None,
            timestamp: Utc::now(),
            content_type: None,
            body,
        }
    }
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }
    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_builder() {
        let delivery = Delivery::new("users.get", b"{}".to_vec())
            .with_correlation_id("corr-1")
            .with_reply_to("amq.rabbitmq.reply-to");

        assert_eq!(delivery.routing_key, "users.get");
        assert_eq!(delivery.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(delivery.reply_to.as_deref(), Some("amq.rabbitmq.reply-to"));
        assert_eq!(delivery.body, b"{}");
    }

    #[test]
    fn test_publishing_timestamp_is_utc_now() {
        let before = Utc::now();
        let publishing = Publishing::new(Vec::new()).with_correlation_id(Some("c".to_string()));
        let after = Utc::now();

        assert!(publishing.timestamp >= before && publishing.timestamp <= after);
        assert_eq!(publishing.correlation_id.as_deref(), Some("c"));
        assert!(publishing.content_type.is_none());
    }
}
