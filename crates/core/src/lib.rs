pub mod endpoint_registry;
pub mod logging;
pub mod models;
pub mod routing;
pub mod traits;

pub use endpoint_registry::*;
pub use models::{Delivery, Publishing, Request, Response};
pub use traits::{BrokerConnection, DeliveryStream, Endpoint, EndpointOutcome, FnEndpoint, Server};

pub use bunny_config::ServiceConfig;
pub use bunny_errors::{BunnyError, BunnyResult};
