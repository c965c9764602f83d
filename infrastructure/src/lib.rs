//! Infrastructure layer for agentry
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod approval;
pub mod config;
pub mod llm;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use approval::KeywordApprovalParser;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig,
    FileReactConfig, FileStoreConfig,
};
pub use llm::{OpenAiCompatibleClient, OpenAiConfig};
pub use logging::JsonlConversationLogger;
pub use store::JsonFileSnapshotStore;
