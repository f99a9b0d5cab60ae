//! 请求/应答适配：消息 -> 端点请求，端点应答 -> 回复消息

use tracing::error;

use bunny_core::{Delivery, Publishing, Request, Response};
use bunny_errors::BunnyResult;

pub fn build_request(delivery: Delivery, service: &str, endpoint: &str) -> Request {
    Request::from_delivery(delivery, service, endpoint)
}

/// 按约定的线上编码（JSON）序列化应答
pub fn serialize_response(response: &Response) -> BunnyResult<Vec<u8>> {
    match response {
        Response::Empty => Ok(Vec::new()),
        Response::Json(value) => Ok(serde_json::to_vec(value)?),
        Response::Raw(bytes) => Ok(bytes.clone()),
    }
}

/// 构造回复消息。序列化失败时记录错误并以空消息体继续回复，
/// 保证等待中的调用方能收到应答。
///
/// `Response::Json` 持有的是已构造好的 `serde_json::Value`，编码为字节不会失败；
/// 类型到 JSON 的转换失败发生在 `Response::json` 中，由端点作为错误返回，
/// 此时应答为 `Response::Empty`，同样以空消息体回复。
pub fn build_reply(response: &Response, correlation_id: Option<String>) -> Publishing {
    let body = serialize_response(response).unwrap_or_else(|e| {
        error!("[Server] 序列化应答失败: {}", e);
        Vec::new()
    });

    let reply = Publishing::new(body).with_correlation_id(correlation_id);
    match response.content_type() {
        Some(content_type) => reply.with_content_type(content_type),
        None => reply,
    }
}
