pub mod app_config;
pub mod broker;
pub mod dispatch;
pub mod logging;
pub mod service;

pub use app_config::*;
pub use broker::*;
pub use dispatch::*;
pub use logging::*;
pub use service::*;
