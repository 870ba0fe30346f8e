//! assessly-providers: question bank sources.
//!
//! Implements the `QuestionBankProvider` trait for the built-in sample bank
//! and for directories of TOML bank files, and loads `assessly.toml`.

pub mod config;
pub mod directory;
pub mod error;
pub mod mock;
pub mod sample;

pub use config::{create_provider, load_config, load_config_from, AssesslyConfig, BankSource};
pub use directory::DirectoryProvider;
pub use error::ProviderError;
pub use mock::MockProvider;
pub use sample::BuiltinProvider;
