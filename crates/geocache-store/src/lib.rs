pub mod config;
pub mod error;
pub mod json_bridge;
pub mod paths;
pub mod schema;
pub mod store;

pub use config::load_config;
pub use error::{Result, StoreError};
pub use paths::{config_path, db_path, default_base_dir, open_data_dir};
pub use store::{MementoStats, Store};
