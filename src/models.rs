use serde::{Deserialize, Serialize};

/// Curriculum layer used when a register entry has none / 未标注层级时使用的默认值
pub const DEFAULT_LAYER: u8 = 4;

fn default_layer() -> u8 {
    DEFAULT_LAYER
}

/// Graph edges declared by a rule document / 规则文档声明的图边
///
/// Each kind holds file paths of other register entries. Targets are kept
/// as written; resolution against the loaded records happens at query time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleEdges {
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub required_by: Vec<String>,
    #[serde(default)]
    pub feeds: Vec<String>,
    #[serde(default)]
    pub fed_by: Vec<String>,
    #[serde(default)]
    pub related: Vec<String>,
}

impl RuleEdges {
    /// Whether every edge kind is empty / 是否所有边都为空
    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
            && self.required_by.is_empty()
            && self.feeds.is_empty()
            && self.fed_by.is_empty()
            && self.related.is_empty()
    }
}

/// One register.jsonl entry — the metadata of a single rule document / 单个规则文档的元数据
///
/// Missing optional fields default at parse time, so consumers never have
/// to re-check field presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    /// File path relative to the repo root, unique key / 相对仓库根目录的文件路径（唯一键）
    pub file: String,
    /// Language or functional grouping; empty means unclassified / 语言或功能分组
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// RULE marker lines extracted from the document / 文档中的 RULE 标记
    #[serde(default)]
    pub rules: Vec<String>,
    /// BANNED marker lines extracted from the document / 文档中的 BANNED 标记
    #[serde(default)]
    pub banned: Vec<String>,
    /// Curriculum layer 1-6 / 课程层级
    #[serde(default = "default_layer")]
    pub layer: u8,
    /// Files this document references, bare name or category/name / 引用的其他规则文件
    #[serde(default)]
    pub refs: Vec<String>,
    #[serde(default)]
    pub edges: RuleEdges,
    #[serde(default)]
    pub has_examples: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record_defaults() {
        let record: RuleRecord = serde_json::from_str(r#"{"file":"rust/errors.md"}"#).unwrap();
        assert_eq!(record.file, "rust/errors.md");
        assert_eq!(record.category, "");
        assert_eq!(record.title, "");
        assert_eq!(record.layer, DEFAULT_LAYER);
        assert!(record.tags.is_empty());
        assert!(record.edges.is_empty());
        assert!(!record.has_examples);
    }

    #[test]
    fn test_full_record_round_trip() {
        let json = r#"{
            "file": "python/types.md",
            "category": "python",
            "title": "Type Hints",
            "subtitle": "Static typing rules",
            "tags": ["types", "mypy"],
            "concepts": ["typing"],
            "keywords": ["annotation"],
            "rules": ["RULE-1"],
            "banned": ["Any"],
            "layer": 3,
            "refs": ["naming", "global/errors"],
            "edges": {"requires": ["python/naming.md"], "related": ["python/errors.md"]},
            "has_examples": true
        }"#;
        let record: RuleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.layer, 3);
        assert_eq!(record.edges.requires, vec!["python/naming.md"]);
        assert!(record.edges.required_by.is_empty());
        assert!(record.has_examples);
        assert_eq!(record.refs.len(), 2);
    }
}
