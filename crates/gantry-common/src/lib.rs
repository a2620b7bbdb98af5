pub mod errors;
pub mod id;

pub use errors::{BridgeError, ConfigError, PlatformError};
pub use id::{new_id, SessionId};

pub type Result<T> = std::result::Result<T, BridgeError>;
