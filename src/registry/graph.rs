//! Edge graph accessor - resolve declared relations to records / 图边访问
//!
//! Targets that have no matching record are reported with a placeholder
//! title instead of failing; only the starting file itself must exist.

use serde::Serialize;

use super::error::RegistryError;
use crate::models::RuleRecord;

/// Placeholder title for dangling edge targets / 悬空目标的占位标题
pub const MISSING_TITLE: &str = "(not found)";

/// One resolved edge target / 单个已解析的边目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeTarget {
    pub file: String,
    pub title: String,
}

/// Resolved edges of one record, grouped by kind / 按类型分组的已解析边
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelatedRules {
    pub requires: Vec<EdgeTarget>,
    pub required_by: Vec<EdgeTarget>,
    pub feeds: Vec<EdgeTarget>,
    pub fed_by: Vec<EdgeTarget>,
    pub related: Vec<EdgeTarget>,
}

impl RelatedRules {
    /// Whether every edge kind is empty / 是否所有边都为空
    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
            && self.required_by.is_empty()
            && self.feeds.is_empty()
            && self.fed_by.is_empty()
            && self.related.is_empty()
    }

    /// (kind, targets) pairs in declaration order / 按声明顺序的 (类型, 目标)
    pub fn kinds(&self) -> [(&'static str, &[EdgeTarget]); 5] {
        [
            ("requires", self.requires.as_slice()),
            ("required_by", self.required_by.as_slice()),
            ("feeds", self.feeds.as_slice()),
            ("fed_by", self.fed_by.as_slice()),
            ("related", self.related.as_slice()),
        ]
    }
}

/// Resolve a list of target files against the snapshot / 解析目标文件列表
fn resolve(records: &[RuleRecord], targets: &[String]) -> Vec<EdgeTarget> {
    targets
        .iter()
        .map(|target| EdgeTarget {
            file: target.clone(),
            title: records
                .iter()
                .find(|r| &r.file == target)
                .map(|r| r.title.clone())
                .unwrap_or_else(|| MISSING_TITLE.to_string()),
        })
        .collect()
}

/// Resolve all edges declared by `file` / 解析 file 声明的所有边
///
/// Fails with NotFound only when `file` itself has no record; a record
/// without edges yields an all-empty result.
pub fn related(records: &[RuleRecord], file: &str) -> Result<RelatedRules, RegistryError> {
    let record = records
        .iter()
        .find(|r| r.file == file)
        .ok_or_else(|| RegistryError::NotFound(file.to_string()))?;

    Ok(RelatedRules {
        requires: resolve(records, &record.edges.requires),
        required_by: resolve(records, &record.edges.required_by),
        feeds: resolve(records, &record.edges.feeds),
        fed_by: resolve(records, &record.edges.fed_by),
        related: resolve(records, &record.edges.related),
    })
}
