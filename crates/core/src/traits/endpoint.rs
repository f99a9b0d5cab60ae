use std::future::Future;

use async_trait::async_trait;

use bunny_errors::{BunnyError, BunnyResult};

use crate::models::{Request, Response};

/// 可独立调用的命名请求处理器
///
/// 同一个端点会被多个并发请求同时调用，实现必须是并发安全的。
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// 端点名称，即路由键中服务名之后的部分
    fn name(&self) -> &str;

    async fn handle_request(&self, request: Request) -> EndpointOutcome;
}

/// 端点处理结果
///
/// 处理器可以在返回错误的同时给出应答；无论是否有错误，应答都会被发送。
#[derive(Debug, Default)]
pub struct EndpointOutcome {
    pub response: Response,
    pub error: Option<BunnyError>,
}

impl EndpointOutcome {
    pub fn ok(response: Response) -> Self {
        Self {
            response,
            error: None,
        }
    }
    pub fn failed(error: BunnyError) -> Self {
        Self {
            response: Response::Empty,
            error: Some(error),
        }
    }
    pub fn partial(response: Response, error: BunnyError) -> Self {
        Self {
            response,
            error: Some(error),
        }
    }
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<BunnyResult<Response>> for EndpointOutcome {
    fn from(result: BunnyResult<Response>) -> Self {
        match result {
            Ok(response) => Self::ok(response),
            Err(error) => Self::failed(error),
        }
    }
}

/// 将异步闭包包装为端点
pub struct FnEndpoint<F> {
    name: String,
    handler: F,
}

impl<F, Fut> FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EndpointOutcome> + Send + 'static,
{
    pub fn new<S: Into<String>>(name: S, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F, Fut> Endpoint for FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EndpointOutcome> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_request(&self, request: Request) -> EndpointOutcome {
        (self.handler)(request).await
    }
}
