use async_trait::async_trait;
use futures::stream::BoxStream;

use bunny_errors::BunnyResult;

use crate::models::{Delivery, Publishing};

/// 消费流，连接或通道关闭时结束
pub type DeliveryStream = BoxStream<'static, Delivery>;

/// 消息代理连接抽象接口
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// 建立连接。调用方自行施加超时
    async fn connect(&self) -> BunnyResult<()>;

    /// 订阅路由键前缀为 `"<service_name>."` 的所有消息
    async fn consume(&self, service_name: &str) -> BunnyResult<DeliveryStream>;

    /// 发布消息，不等待投递确认。可被并发调用
    async fn publish(&self, exchange: &str, routing_key: &str, message: Publishing)
        -> BunnyResult<()>;

    fn is_connected(&self) -> bool;
}
