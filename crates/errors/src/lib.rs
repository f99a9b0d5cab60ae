use thiserror::Error;

#[derive(Debug, Error)]
pub enum BunnyError {
    #[error("消息代理错误: {0}")]
    Broker(String),
    #[error("连接消息代理超时: {seconds}秒")]
    ConnectTimeout { seconds: u64 },
    #[error("尚未连接到消息代理")]
    NotConnected,
    #[error("服务尚未初始化")]
    NotInitialised,
    #[error("服务已经初始化")]
    AlreadyInitialised,
    #[error("端点未找到: {name}")]
    EndpointNotFound { name: String },
    #[error("端点处理错误: {0}")]
    Endpoint(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type BunnyResult<T> = Result<T, BunnyError>;

impl BunnyError {
    pub fn broker_error<S: Into<String>>(msg: S) -> Self {
        Self::Broker(msg.into())
    }
    pub fn endpoint_error<S: Into<String>>(msg: S) -> Self {
        Self::Endpoint(msg.into())
    }
    pub fn endpoint_not_found<S: Into<String>>(name: S) -> Self {
        Self::EndpointNotFound { name: name.into() }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    /// 启动阶段的致命错误，发生后服务进程应当退出
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BunnyError::Broker(_)
                | BunnyError::ConnectTimeout { .. }
                | BunnyError::NotConnected
                | BunnyError::NotInitialised
                | BunnyError::Configuration(_)
        )
    }
}

impl From<serde_json::Error> for BunnyError {
    fn from(err: serde_json::Error) -> Self {
        BunnyError::Serialization(err.to_string())
    }
}
