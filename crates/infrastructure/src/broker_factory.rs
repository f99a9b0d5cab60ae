use std::sync::Arc;

use tracing::{debug, info};

use bunny_config::{BrokerConfig, BrokerType, ConfigValidator};
use bunny_core::BrokerConnection;
use bunny_errors::{BunnyError, BunnyResult};

use crate::{InMemoryBroker, RabbitConnection};

pub struct BrokerFactory;

impl BrokerFactory {
    /// 按配置创建消息代理连接，返回的连接尚未建立
    pub fn create(config: &BrokerConfig) -> BunnyResult<Arc<dyn BrokerConnection>> {
        Self::validate_config(config)?;
        debug!("Creating broker connection with type: {:?}", config.r#type);

        match config.r#type {
            BrokerType::Rabbitmq => {
                info!("Initializing RabbitMQ broker connection");
                Ok(Arc::new(RabbitConnection::new(config.clone())))
            }
            BrokerType::InMemory => {
                info!("Initializing in-memory broker");
                Ok(Arc::new(InMemoryBroker::new()))
            }
        }
    }

    pub fn validate_config(config: &BrokerConfig) -> BunnyResult<()> {
        config
            .validate()
            .map_err(|e| BunnyError::Configuration(e.to_string()))
    }

    pub fn get_type_string(broker_type: &BrokerType) -> &'static str {
        match broker_type {
            BrokerType::Rabbitmq => "rabbitmq",
            BrokerType::InMemory => "in_memory",
        }
    }
}
