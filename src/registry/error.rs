//! Registry error types / 注册表错误类型

use thiserror::Error;

/// Errors surfaced by registry operations / 注册表操作的错误
///
/// Listings and searches stay permissive and return empty results instead;
/// only loads and direct lookups by identifier fail.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed register.jsonl line; the previous snapshot stays intact / 索引行格式错误
    #[error("invalid register entry at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// No record with the requested file path / 找不到对应的规则文件
    #[error("rule file not found: {0}")]
    NotFound(String),

    /// Phase outside the produced layer range / 阶段超出层级范围
    #[error("phase {phase} out of range (valid: 1-{layers})")]
    PhaseOutOfRange { phase: usize, layers: usize },
}
