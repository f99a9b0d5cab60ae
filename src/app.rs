use anyhow::{Context, Result};
use bunny_config::AppConfig;
use bunny_core::{BunnyResult, Server};
use bunny_infrastructure::BrokerFactory;
use bunny_server::DispatchServer;
use tracing::info;

use crate::endpoints;

/// 主应用程序，持有唯一的服务实例
pub struct Application {
    server: DispatchServer,
}

impl Application {
    /// 创建新的应用实例
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!(
            "初始化应用程序，服务: {}，消息代理: {}",
            config.service.name,
            BrokerFactory::get_type_string(&config.broker.r#type)
        );

        let connection = BrokerFactory::create(&config.broker).context("创建消息代理连接失败")?;
        let server =
            DispatchServer::from_config(&config, connection).context("初始化服务失败")?;

        for endpoint in endpoints::builtin_endpoints() {
            server.register_endpoint(endpoint).await;
        }

        Ok(Self { server })
    }

    /// 运行服务，直到消费流结束
    pub async fn run(&self) -> BunnyResult<()> {
        info!(
            "启动服务 {} ({})",
            self.server.name(),
            self.server.description()
        );
        self.server.run().await
    }
}
