pub mod adapter;
pub mod dispatch_server;

pub use dispatch_server::{DispatchOutcome, DispatchServer, DEFAULT_CONNECT_TIMEOUT};
