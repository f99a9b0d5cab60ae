use serde::Serialize;

use bunny_errors::BunnyResult;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_BINARY: &str = "application/octet-stream";

/// 端点产生的应答
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Response {
    /// 空应答，序列化为空消息体
    #[default]
    Empty,
    Json(serde_json::Value),
    /// 已编码的字节，原样发送
    Raw(Vec<u8>),
}

impl Response {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> BunnyResult<Self> {
        Ok(Response::Json(serde_json::to_value(value)?))
    }

    pub fn raw(bytes: Vec<u8>) -> Self {
        Response::Raw(bytes)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Response::Empty)
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Response::Empty => None,
            Response::Json(_) => Some(CONTENT_TYPE_JSON),
            Response::Raw(_) => Some(CONTENT_TYPE_BINARY),
        }
    }
}

impl From<serde_json::Value> for Response {
    fn from(value: serde_json::Value) -> Self {
        Response::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct User {
        id: u64,
        name: String,
    }

    #[test]
    fn test_json_response_from_struct() {
        let response = Response::json(&User {
            id: 1,
            name: "alice".to_string(),
        })
        .unwrap();

        assert_eq!(response, Response::Json(json!({"id": 1, "name": "alice"})));
        assert_eq!(response.content_type(), Some(CONTENT_TYPE_JSON));
    }

    #[test]
    fn test_default_response_is_empty() {
        let response = Response::default();
        assert!(response.is_empty());
        assert_eq!(response.content_type(), None);
        assert_eq!(Response::raw(vec![1, 2]).content_type(), Some(CONTENT_TYPE_BINARY));
    }
}
