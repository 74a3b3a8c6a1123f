pub mod error;
pub mod json_bridge;
pub mod library;
pub mod schema;
pub mod settings;
pub mod store;

pub use error::{Result, StoreError};
pub use library::{DB_FILE, Library, default_base_dir};
pub use settings::{MemorySettings, Settings};
pub use store::{Store, StoreStats};
