pub mod broker_factory;
pub mod in_memory_broker;
pub mod rabbitmq;

pub use broker_factory::BrokerFactory;
pub use in_memory_broker::{ConnectBehaviour, InMemoryBroker, PublishedMessage};
pub use rabbitmq::RabbitConnection;
