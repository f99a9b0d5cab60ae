use async_trait::async_trait;
use futures::{future, StreamExt};
use lapin::{
    options::*, types::FieldTable, types::ShortString, BasicProperties, Channel, Connection,
    ConnectionProperties, ExchangeKind,
};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use bunny_config::BrokerConfig;
use bunny_core::{routing, BrokerConnection, Delivery, DeliveryStream, Publishing};
use bunny_errors::{BunnyError, BunnyResult};

struct RabbitSession {
    connection: Connection,
    channel: Channel,
}

/// RabbitMQ连接实现
///
/// 每个服务声明一个以服务名命名的队列，并以 `"<服务名>.#"` 绑定到 topic 交换机。
/// 消费时不做确认，回复通过默认交换机直接发往请求方的回复队列。
pub struct RabbitConnection {
    config: BrokerConfig,
    session: OnceCell<RabbitSession>,
}

impl RabbitConnection {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            session: OnceCell::new(),
        }
    }

    fn session(&self) -> BunnyResult<&RabbitSession> {
        self.session.get().ok_or(BunnyError::NotConnected)
    }

    async fn open_session(&self) -> BunnyResult<RabbitSession> {
        let connection = Connection::connect(&self.config.url, ConnectionProperties::default())
            .await
            .map_err(|e| BunnyError::Broker(format!("连接RabbitMQ失败: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BunnyError::Broker(format!("创建通道失败: {e}")))?;

        info!("成功连接到RabbitMQ: {}", self.config.url);
        Ok(RabbitSession {
            connection,
            channel,
        })
    }

    /// 声明交换机和服务队列并完成绑定
    async fn declare_service_queue(&self, channel: &Channel, service_name: &str) -> BunnyResult<()> {
        let durable = self.config.durable_queues;

        channel
            .exchange_declare(
                &self.config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                BunnyError::Broker(format!("声明交换机 {} 失败: {e}", self.config.exchange))
            })?;

        channel
            .queue_declare(
                service_name,
                QueueDeclareOptions {
                    durable,
                    exclusive: false,
                    auto_delete: !durable,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BunnyError::Broker(format!("声明队列 {service_name} 失败: {e}")))?;

        let binding_key = routing::binding_key(service_name);
        channel
            .queue_bind(
                service_name,
                &self.config.exchange,
                &binding_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BunnyError::Broker(format!("绑定队列 {service_name} 失败: {e}")))?;

        debug!(
            "队列 {} 已绑定到交换机 {}: {}",
            service_name, self.config.exchange, binding_key
        );
        Ok(())
    }

    /// 关闭连接
    pub async fn close(&self) -> BunnyResult<()> {
        let session = self.session()?;
        session
            .connection
            .close(200, "正常关闭")
            .await
            .map_err(|e| BunnyError::Broker(format!("关闭连接失败: {e}")))?;

        info!("RabbitMQ连接已关闭");
        Ok(())
    }
}

fn into_delivery(delivery: lapin::message::Delivery) -> Delivery {
    let properties = &delivery.properties;
    Delivery {
        routing_key: delivery.routing_key.to_string(),
        correlation_id: properties.correlation_id().as_ref().map(ShortString::to_string),
        reply_to: properties.reply_to().as_ref().map(ShortString::to_string),
        body: delivery.data,
    }
}

fn into_properties(message: &Publishing) -> BasicProperties {
    let mut properties =
        BasicProperties::default().with_timestamp(message.timestamp.timestamp().max(0) as u64);
    if let Some(correlation_id) = &message.correlation_id {
        properties = properties.with_correlation_id(ShortString::from(correlation_id.clone()));
    }
    if let Some(content_type) = &message.content_type {
        properties = properties.with_content_type(ShortString::from(content_type.clone()));
    }
    properties
}

#[async_trait]
impl BrokerConnection for RabbitConnection {
    async fn connect(&self) -> BunnyResult<()> {
        self.session
            .get_or_try_init(|| self.open_session())
            .await
            .map(|_| ())
    }

    async fn consume(&self, service_name: &str) -> BunnyResult<DeliveryStream> {
        let session = self.session()?;
        self.declare_service_queue(&session.channel, service_name)
            .await?;

        let consumer_tag = format!("{service_name}-{}", uuid::Uuid::new_v4());
        let consumer = session
            .channel
            .basic_consume(
                service_name,
                &consumer_tag,
                BasicConsumeOptions {
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BunnyError::Broker(format!("创建消费者失败: {e}")))?;

        debug!("为队列 {} 创建消费者: {}", service_name, consumer_tag);

        let service = service_name.to_string();
        let stream = consumer
            .take_while(move |result| {
                if let Err(e) = result {
                    error!("[{}] 消费者出错，停止消费: {}", service, e);
                }
                future::ready(result.is_ok())
            })
            .filter_map(|result| future::ready(result.ok().map(into_delivery)))
            .boxed();

        Ok(stream)
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: Publishing,
    ) -> BunnyResult<()> {
        let session = self.session()?;
        let properties = into_properties(&message);

        let confirm = session
            .channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                &message.body,
                properties,
            )
            .await
            .map_err(|e| BunnyError::Broker(format!("发布消息到 {routing_key} 失败: {e}")))?;

        // 通道未开启确认模式时立即完成
        confirm
            .await
            .map_err(|e| BunnyError::Broker(format!("消息发布确认失败: {e}")))?;

        debug!("消息已发布到: {}", routing_key);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session
            .get()
            .map(|session| session.connection.status().connected())
            .unwrap_or(false)
    }
}
