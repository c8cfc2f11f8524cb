//! quizplay-store — Configuration and collaborator implementations.
//!
//! Implements the `QuestionSource` and `ResultStore` traits from
//! `quizplay-core` on top of files and memory, and loads `quizplay.toml`.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;

pub use config::{load_config, load_config_from, QuizplayConfig};
pub use error::StoreError;
pub use file::{FileQuestionSource, JsonResultStore, SnapshotFile, StoredResult};
pub use memory::{MemoryResultStore, StaticQuestionSource};
