use std::sync::Arc;

use async_trait::async_trait;

use bunny_config::ServiceConfig;
use bunny_errors::BunnyResult;

use super::Endpoint;

/// 提供给宿主进程的服务接口
#[async_trait]
pub trait Server: Send + Sync {
    /// 设置服务名称和描述，必须在 `run` 之前调用，且只能调用一次
    fn initialise(&self, config: ServiceConfig) -> BunnyResult<()>;

    /// 连接消息代理并处理请求，直到消费流结束。
    ///
    /// 只有启动阶段的致命错误（连接超时、连接失败、无法消费）会以 `Err` 返回，
    /// 单个请求的错误不会影响返回值。
    async fn run(&self) -> BunnyResult<()>;

    /// 未初始化时返回空字符串
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn register_endpoint(&self, endpoint: Arc<dyn Endpoint>);

    async fn deregister_endpoint(&self, name: &str);
}
