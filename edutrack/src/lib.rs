pub mod activity;
pub mod backup;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};

pub use edutrack_storage as storage;
