pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, NeonvibeError, StorageError};
pub use events::{EventBus, SessionEvent};
pub use id::{new_id, SessionId};
pub use types::{FileMap, Message, ProviderKind, Role, TurnState};

pub type Result<T> = std::result::Result<T, NeonvibeError>;
