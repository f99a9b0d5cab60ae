pub mod delivery;
pub mod request;
pub mod response;

pub use delivery::*;
pub use request::*;
pub use response::*;
