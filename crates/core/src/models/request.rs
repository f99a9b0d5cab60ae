use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use bunny_errors::{BunnyError, BunnyResult};

use super::Delivery;

/// 交给端点处理的请求
///
/// 由 [`Request::from_delivery`] 构造，构造过程不会失败；
/// 请求体是否合法由端点自行判断。
#[derive(Debug, Clone)]
pub struct Request {
    service: String,
    endpoint: String,
    correlation_id: Option<String>,
    reply_to: Option<String>,
    body: Vec<u8>,
    received_at: DateTime<Utc>,
}

impl Request {
    pub fn from_delivery<S: Into<String>, E: Into<String>>(
        delivery: Delivery,
        service: S,
        endpoint: E,
    ) -> Self {
        Self {
            service: service.into(),
            endpoint: endpoint.into(),
            correlation_id: delivery.correlation_id,
            reply_to: delivery.reply_to,
            body: delivery.body,
            received_at: Utc::now(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// 按JSON解码请求体
    pub fn decode<T: DeserializeOwned>(&self) -> BunnyResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BunnyError::Serialization(format!("解码 {} 请求体失败: {e}", self.endpoint))
        })
    }
}
