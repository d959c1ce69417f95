// Public modules
pub mod config;
pub mod error;
pub mod rewrite;
pub mod table;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
