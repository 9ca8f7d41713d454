//! Registry module - in-memory index over register.jsonl / 注册表模块
//!
//! Architecture principles / 架构原则：
//! - The registry only exposes pure query primitives: search, list_files,
//!   categories, find_by_file, learning_path, related
//! - I/O (cloning the rules repo, reading register.jsonl) belongs to the caller
//! - Readers always see one fully formed snapshot; load swaps it in one step
//! - Results are deterministic: ties keep load order (search) or file order
//!   (learning path), never hash-map iteration order

pub mod engine;
pub mod error;
pub mod graph;
pub mod learning;
pub mod store;

pub use error::RegistryError;
pub use graph::{EdgeTarget, RelatedRules};
pub use learning::{layer_name, LAYER_NAMES};
pub use store::Registry;
