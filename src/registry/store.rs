//! Record store - atomically swapped snapshot of register.jsonl / 记录存储
//!
//! `load` builds the whole record list before publishing it with a single
//! write-lock swap, so concurrent readers observe either the old snapshot
//! in full or the new one in full, never a mix.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;

use super::engine;
use super::error::RegistryError;
use super::graph::{self, RelatedRules};
use super::learning;
use crate::models::RuleRecord;

/// In-memory index of register.jsonl entries / register.jsonl 的内存索引
pub struct Registry {
    snapshot: RwLock<Arc<Vec<RuleRecord>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Parse one JSON object per non-blank line and publish the new list / 解析并发布新快照
    ///
    /// A parse error reports the offending 1-based line number and leaves
    /// the previous snapshot untouched.
    pub fn load(&self, source: &str) -> Result<usize, RegistryError> {
        let mut records = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: RuleRecord =
                serde_json::from_str(line).map_err(|source| RegistryError::Parse {
                    line: idx + 1,
                    source,
                })?;
            records.push(record);
        }

        let count = records.len();
        *self.snapshot.write() = Arc::new(records);
        Ok(count)
    }

    /// Current snapshot in load order / 当前快照（加载顺序）
    ///
    /// Readers keep whatever snapshot was current when they grabbed the Arc.
    pub fn all(&self) -> Arc<Vec<RuleRecord>> {
        self.snapshot.read().clone()
    }

    /// Number of loaded records / 已加载的记录数
    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries, optionally filtered by exact category / 条目列表，可按分类过滤
    pub fn list_files(&self, category: Option<&str>) -> Vec<RuleRecord> {
        let snapshot = self.all();
        match category {
            Some(cat) => snapshot
                .iter()
                .filter(|r| r.category == cat)
                .cloned()
                .collect(),
            None => snapshot.iter().cloned().collect(),
        }
    }

    /// Distinct category values, sorted lexically / 去重并排序的分类
    pub fn categories(&self) -> Vec<String> {
        self.all()
            .iter()
            .map(|r| r.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Exact lookup by file path / 按文件路径精确查找
    pub fn find_by_file(&self, file: &str) -> Option<RuleRecord> {
        self.all().iter().find(|r| r.file == file).cloned()
    }

    /// Search entries by query tokens, see registry::engine / 按查询词元搜索
    pub fn search(&self, query: &str, category: Option<&str>, limit: usize) -> Vec<RuleRecord> {
        engine::search(&self.all(), query, category, limit)
    }

    /// Layered reading order, see registry::learning / 分层阅读顺序
    pub fn learning_path(
        &self,
        languages: &[String],
        phase: Option<usize>,
    ) -> Result<Vec<Vec<RuleRecord>>, RegistryError> {
        learning::learning_path(&self.all(), languages, phase)
    }

    /// Resolved graph edges of one entry, see registry::graph / 单条记录的已解析图边
    pub fn related(&self, file: &str) -> Result<RelatedRules, RegistryError> {
        graph::related(&self.all(), file)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_register() -> &'static str {
        concat!(
            r#"{"file":"global/style.md","category":"global","title":"Style","layer":1}"#,
            "\n\n",
            r#"{"file":"python/types.md","category":"python","title":"Type Hints","layer":3}"#,
            "\n",
            r#"{"file":"python/naming.md","category":"python","title":"Naming","layer":3}"#,
            "\n",
            r#"{"file":"misc/notes.md","title":"Notes"}"#,
            "\n",
        )
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let registry = Registry::new();
        let count = registry.load(sample_register()).unwrap();
        assert_eq!(count, 4);
        assert_eq!(registry.len(), 4);
        // Load order is preserved / 保持加载顺序
        assert_eq!(registry.all()[0].file, "global/style.md");
        assert_eq!(registry.all()[3].file, "misc/notes.md");
    }

    #[test]
    fn test_load_replaces_snapshot_wholesale() {
        let registry = Registry::new();
        registry.load(sample_register()).unwrap();

        registry
            .load(r#"{"file":"rust/ownership.md","category":"rust"}"#)
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_file("python/types.md").is_none());
    }

    #[test]
    fn test_parse_error_reports_line_and_keeps_old_snapshot() {
        let registry = Registry::new();
        registry.load(sample_register()).unwrap();

        let bad = "{\"file\":\"a.md\"}\n{not json}\n";
        let err = registry.load(bad).unwrap_err();
        match err {
            RegistryError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        // Previous snapshot must survive the failed load / 失败的加载不影响旧快照
        assert_eq!(registry.len(), 4);
        assert!(registry.find_by_file("python/types.md").is_some());
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_loads() {
        let registry = Registry::new();
        registry.load(sample_register()).unwrap();

        let before = registry.all();
        registry
            .load(r#"{"file":"rust/ownership.md","category":"rust"}"#)
            .unwrap();
        let after = registry.all();

        // The old Arc still holds the complete old list, the new one only
        // the new list; no reader can see a mix of both.
        assert_eq!(before.len(), 4);
        assert!(before.iter().all(|r| r.file != "rust/ownership.md"));
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].file, "rust/ownership.md");
    }

    #[test]
    fn test_list_files_filters_by_exact_category() {
        let registry = Registry::new();
        registry.load(sample_register()).unwrap();

        assert_eq!(registry.list_files(None).len(), 4);
        let python = registry.list_files(Some("python"));
        assert_eq!(python.len(), 2);
        assert!(python.iter().all(|r| r.category == "python"));
        assert!(registry.list_files(Some("Python")).is_empty());
        assert!(registry.list_files(Some("unknown")).is_empty());
    }

    #[test]
    fn test_categories_sorted_and_distinct() {
        let registry = Registry::new();
        registry.load(sample_register()).unwrap();

        // Uncategorized records contribute the empty category / 未分类记录贡献空分类
        assert_eq!(registry.categories(), vec!["", "global", "python"]);
    }

    #[test]
    fn test_find_by_file() {
        let registry = Registry::new();
        registry.load(sample_register()).unwrap();

        let record = registry.find_by_file("python/types.md").unwrap();
        assert_eq!(record.title, "Type Hints");
        assert!(registry.find_by_file("python/missing.md").is_none());
    }
}
