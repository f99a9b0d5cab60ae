use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info};

use bunny_core::{BrokerConnection, Delivery, DeliveryStream, Publishing};
use bunny_errors::{BunnyError, BunnyResult};

/// 连接行为，用于模拟消息代理不可用的情况
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConnectBehaviour {
    #[default]
    Succeed,
    /// 连接永远不会完成
    Stall,
    Fail,
}

/// 已发布的消息记录
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub message: Publishing,
}

/// 内存消息代理实现
///
/// 使用 Tokio channels 模拟消息代理，适用于嵌入式部署和测试：
/// 通过 [`InMemoryBroker::deliver`] 注入请求，通过 [`InMemoryBroker::published`] 观察回复。
pub struct InMemoryBroker {
    connect_behaviour: ConnectBehaviour,
    connected: AtomicBool,
    sender: Mutex<Option<mpsc::UnboundedSender<Delivery>>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Delivery>>>,
    published: Mutex<Vec<PublishedMessage>>,
    published_count: watch::Sender<usize>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::with_connect_behaviour(ConnectBehaviour::Succeed)
    }

    pub fn with_connect_behaviour(connect_behaviour: ConnectBehaviour) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (published_count, _) = watch::channel(0);
        Self {
            connect_behaviour,
            connected: AtomicBool::new(false),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            published: Mutex::new(Vec::new()),
            published_count,
        }
    }

    /// 投递一条请求，在订阅之前投递的消息会被缓存
    pub async fn deliver(&self, delivery: Delivery) -> BunnyResult<()> {
        let sender = self.sender.lock().await;
        match sender.as_ref() {
            Some(sender) => sender
                .send(delivery)
                .map_err(|_| BunnyError::Broker("消费流已关闭".to_string())),
            None => Err(BunnyError::Broker("消息代理已关闭".to_string())),
        }
    }

    /// 关闭投递通道，已缓存的消息消费完后消费流结束
    pub async fn close(&self) {
        if self.sender.lock().await.take().is_some() {
            info!("内存消息代理已关闭");
        }
    }

    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().await.clone()
    }

    /// 等待至少 `count` 条消息被发布
    pub async fn wait_for_published(
        &self,
        count: usize,
        timeout: Duration,
    ) -> BunnyResult<Vec<PublishedMessage>> {
        let mut receiver = self.published_count.subscribe();
        tokio::time::timeout(timeout, receiver.wait_for(|published| *published >= count))
            .await
            .map_err(|_| BunnyError::Internal(format!("等待 {count} 条发布消息超时")))?
            .map_err(|e| BunnyError::Internal(e.to_string()))?;
        Ok(self.published().await)
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerConnection for InMemoryBroker {
    async fn connect(&self) -> BunnyResult<()> {
        match self.connect_behaviour {
            ConnectBehaviour::Succeed => {
                self.connected.store(true, Ordering::SeqCst);
                Ok(())
            }
            ConnectBehaviour::Stall => std::future::pending().await,
            ConnectBehaviour::Fail => Err(BunnyError::Broker("内存消息代理拒绝连接".to_string())),
        }
    }

    async fn consume(&self, service_name: &str) -> BunnyResult<DeliveryStream> {
        if !self.is_connected() {
            return Err(BunnyError::NotConnected);
        }
        let receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| BunnyError::Broker("内存消息代理只支持一个消费者".to_string()))?;

        debug!("订阅服务 {} 的消息", service_name);
        let prefix = format!("{service_name}.");
        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|delivery| (delivery, receiver))
        })
        // 模拟 "<服务名>.#" 绑定
        .filter(move |delivery| futures::future::ready(delivery.routing_key.starts_with(&prefix)))
        .boxed();

        Ok(stream)
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: Publishing,
    ) -> BunnyResult<()> {
        if !self.is_connected() {
            return Err(BunnyError::NotConnected);
        }
        let mut published = self.published.lock().await;
        published.push(PublishedMessage {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            message,
        });
        self.published_count.send_replace(published.len());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
