//! Search engine - weighted bidirectional substring scoring / 搜索引擎
//!
//! Queries are whitespace-split into lower-cased tokens. Every (token,
//! field) pair that matches in either containment direction adds the
//! field's weight to the record score. A short field like "io" therefore
//! matches the longer token "ioerror" and vice versa / 双向子串匹配.
//!
//! Scoring is deterministic: records are visited in load order and the
//! sort on score is stable, so equal scores keep load order.

use crate::models::RuleRecord;

/// Field weights / 字段权重
const WEIGHT_FILE: u32 = 3;
const WEIGHT_TITLE: u32 = 3;
const WEIGHT_SUBTITLE: u32 = 1;
const WEIGHT_TAG: u32 = 2;
const WEIGHT_CONCEPT: u32 = 2;
const WEIGHT_KEYWORD: u32 = 1;
const WEIGHT_CATEGORY: u32 = 1;

/// Split a query into lower-cased tokens / 将查询拆分为小写词元
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

/// Bidirectional substring match / 双向子串匹配
///
/// Empty field text never matches — an absent subtitle or category must
/// not score against every token.
fn matches(token: &str, field: &str) -> bool {
    !field.is_empty() && (field.contains(token) || token.contains(field))
}

/// Build (text, weight) pairs for one record / 构建单条记录的加权字段
fn weighted_fields(record: &RuleRecord) -> Vec<(String, u32)> {
    let mut fields = Vec::with_capacity(
        4 + record.tags.len() + record.concepts.len() + record.keywords.len(),
    );
    // File path matches path fragments like "types" in "python/types.md"
    fields.push((record.file.to_lowercase(), WEIGHT_FILE));
    fields.push((record.title.to_lowercase(), WEIGHT_TITLE));
    fields.push((record.subtitle.to_lowercase(), WEIGHT_SUBTITLE));
    for tag in &record.tags {
        fields.push((tag.to_lowercase(), WEIGHT_TAG));
    }
    for concept in &record.concepts {
        fields.push((concept.to_lowercase(), WEIGHT_CONCEPT));
    }
    for keyword in &record.keywords {
        fields.push((keyword.to_lowercase(), WEIGHT_KEYWORD));
    }
    fields.push((record.category.to_lowercase(), WEIGHT_CATEGORY));
    fields
}

/// Score one record against the query tokens / 对单条记录打分
fn score_record(record: &RuleRecord, tokens: &[String]) -> u32 {
    let fields = weighted_fields(record);
    let mut score = 0;
    for token in tokens {
        for (text, weight) in &fields {
            if matches(token, text) {
                score += weight;
            }
        }
    }
    score
}

/// Search records by query tokens / 按查询词元搜索记录
///
/// Blank queries and limit 0 yield an empty result, not an error. Records
/// scoring 0 are excluded; the rest sort by score descending with load
/// order as the stable tie-break, truncated to `limit`.
pub fn search(
    records: &[RuleRecord],
    query: &str,
    category: Option<&str>,
    limit: usize,
) -> Vec<RuleRecord> {
    let tokens = tokenize_query(query);
    if tokens.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(u32, &RuleRecord)> = Vec::new();
    for record in records {
        // Category pre-filter is exact and case-sensitive / 分类过滤区分大小写
        if let Some(cat) = category {
            if record.category != cat {
                continue;
            }
        }
        let score = score_record(record, &tokens);
        if score > 0 {
            scored.push((score, record));
        }
    }

    // Stable sort: equal scores keep load order / 稳定排序，同分保持加载顺序
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, record)| record.clone())
        .collect()
}
