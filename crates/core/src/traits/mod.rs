pub mod broker;
pub mod endpoint;
pub mod server;

pub use broker::*;
pub use endpoint::*;
pub use server::*;
