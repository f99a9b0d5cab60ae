use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use bunny_config::{AppConfig, DispatchConfig, ServiceConfig};
use bunny_core::{routing, BrokerConnection, Delivery, Endpoint, EndpointRegistry, Server};
use bunny_errors::{BunnyError, BunnyResult};

use crate::adapter;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 单条消息的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Replied,
    /// 端点未注册，不回复，调用方自行超时
    EndpointNotFound,
    /// 消息没有回复地址，端点已执行但不回复
    NoReplyTo,
    PublishFailed,
}

/// 请求分发服务
///
/// 连接消息代理后订阅 `"<服务名>.#"`，每收到一条消息就启动一个独立任务：
/// 解析端点、调用端点并把应答发回消息的回复地址。
pub struct DispatchServer {
    identity: OnceLock<ServiceConfig>,
    registry: EndpointRegistry,
    connection: Arc<dyn BrokerConnection>,
    connect_timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
}

impl DispatchServer {
    pub fn new(connection: Arc<dyn BrokerConnection>) -> Self {
        Self {
            identity: OnceLock::new(),
            registry: EndpointRegistry::new(),
            connection,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            limiter: None,
        }
    }

    /// 按应用配置创建并初始化服务
    pub fn from_config(config: &AppConfig, connection: Arc<dyn BrokerConnection>) -> BunnyResult<Self> {
        let server = Self::new(connection)
            .with_connect_timeout(config.broker.connection_timeout())
            .with_dispatch_config(&config.dispatch);
        server.initialise(config.service.clone())?;
        Ok(server)
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// `max_concurrent_requests` 为 0 时不限制并发
    pub fn with_dispatch_config(mut self, config: &DispatchConfig) -> Self {
        self.limiter = config
            .is_bounded()
            .then(|| Arc::new(Semaphore::new(config.max_concurrent_requests)));
        self
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    async fn connect(&self, service: &str) -> BunnyResult<()> {
        match tokio::time::timeout(self.connect_timeout, self.connection.connect()).await {
            Ok(Ok(())) => {
                info!("[Server] [{}] 已连接到消息代理", service);
                Ok(())
            }
            Ok(Err(e)) => {
                error!("[Server] [{}] 连接消息代理失败: {}", service, e);
                Err(e)
            }
            Err(_) => {
                error!(
                    "[Server] [{}] 连接消息代理超时 ({:?})",
                    service, self.connect_timeout
                );
                Err(BunnyError::ConnectTimeout {
                    seconds: self.connect_timeout.as_secs(),
                })
            }
        }
    }
}

/// 在各请求任务之间共享的分发上下文
struct Dispatcher {
    service: String,
    registry: EndpointRegistry,
    connection: Arc<dyn BrokerConnection>,
}

impl Dispatcher {
    async fn handle_delivery(&self, delivery: Delivery) -> DispatchOutcome {
        let endpoint_name = routing::endpoint_name(&self.service, &delivery.routing_key).to_string();

        let Some(endpoint) = self.registry.get(&endpoint_name).await else {
            error!(
                routing_key = %delivery.routing_key,
                "[Server] 无法处理请求: {}",
                BunnyError::endpoint_not_found(&endpoint_name)
            );
            return DispatchOutcome::EndpointNotFound;
        };

        let correlation_id = delivery.correlation_id.clone();
        let reply_to = delivery.reply_to.clone();
        let request = adapter::build_request(delivery, &self.service, &endpoint_name);

        let outcome = endpoint.handle_request(request).await;
        if let Some(e) = &outcome.error {
            error!(
                endpoint = %endpoint_name,
                correlation_id = ?correlation_id,
                "[Server] 端点 {} 返回错误: {}",
                endpoint_name,
                e
            );
        }

        let reply = adapter::build_reply(&outcome.response, correlation_id);

        let Some(reply_to) = reply_to else {
            warn!(endpoint = %endpoint_name, "[Server] 请求缺少回复地址，丢弃应答");
            return DispatchOutcome::NoReplyTo;
        };

        match self.connection.publish("", &reply_to, reply).await {
            Ok(()) => {
                debug!(endpoint = %endpoint_name, reply_to = %reply_to, "[Server] 应答已发送");
                DispatchOutcome::Replied
            }
            Err(e) => {
                error!(
                    endpoint = %endpoint_name,
                    reply_to = %reply_to,
                    "[Server] 发送应答失败: {}",
                    e
                );
                DispatchOutcome::PublishFailed
            }
        }
    }
}

#[async_trait]
impl Server for DispatchServer {
    fn initialise(&self, config: ServiceConfig) -> BunnyResult<()> {
        self.identity
            .set(config)
            .map_err(|_| BunnyError::AlreadyInitialised)
    }

    async fn run(&self) -> BunnyResult<()> {
        let service = self
            .identity
            .get()
            .ok_or(BunnyError::NotInitialised)?
            .name
            .clone();

        self.connect(&service).await?;

        info!(
            "[Server] [{}] 开始监听 {}",
            service,
            routing::binding_key(&service)
        );
        let mut deliveries = self.connection.consume(&service).await.map_err(|e| {
            error!("[Server] [{}] 无法从消息代理消费: {}", service, e);
            e
        })?;

        let dispatcher = Arc::new(Dispatcher {
            service: service.clone(),
            registry: self.registry.clone(),
            connection: Arc::clone(&self.connection),
        });
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                next = deliveries.next() => {
                    let Some(delivery) = next else { break };
                    debug!(
                        routing_key = %delivery.routing_key,
                        "[Server] [{}] 收到新消息",
                        service
                    );

                    let permit = match &self.limiter {
                        Some(limiter) => Some(
                            Arc::clone(limiter)
                                .acquire_owned()
                                .await
                                .map_err(|e| BunnyError::Internal(e.to_string()))?,
                        ),
                        None => None,
                    };

                    let dispatcher = Arc::clone(&dispatcher);
                    in_flight.spawn(async move {
                        let outcome = dispatcher.handle_delivery(delivery).await;
                        drop(permit);
                        outcome
                    });
                }
                // 任务完成即回收，不必等到下一条消息
                Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = result {
                        error!("[Server] [{}] 请求处理任务异常退出: {}", service, e);
                    }
                }
            }
        }

        info!(
            "[Server] [{}] 消费流已结束，等待 {} 个请求处理完成",
            service,
            in_flight.len()
        );
        while let Some(result) = in_flight.join_next().await {
            if let Err(e) = result {
                error!("[Server] [{}] 请求处理任务异常退出: {}", service, e);
            }
        }

        info!("[Server] [{}] 退出", service);
        Ok(())
    }

    fn name(&self) -> &str {
        self.identity
            .get()
            .map(|config| config.name.as_str())
            .unwrap_or("")
    }

    fn description(&self) -> &str {
        self.identity
            .get()
            .map(|config| config.description.as_str())
            .unwrap_or("")
    }

    async fn register_endpoint(&self, endpoint: Arc<dyn Endpoint>) {
        let name = endpoint.name().to_string();
        if self.registry.register(endpoint).await.is_some() {
            info!("[Server] 端点 {} 已被替换", name);
        } else {
            info!("[Server] 注册端点 {}", name);
        }
    }

    async fn deregister_endpoint(&self, name: &str) {
        if self.registry.deregister(name).await {
            info!("[Server] 注销端点 {}", name);
        }
    }
}
