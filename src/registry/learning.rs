//! Learning path planner - curated layer grouping / 学习路径规划
//!
//! Groups the relevant records by the curated `layer` field from
//! register.jsonl (1-6):
//!   1: Global foundations
//!   2: Project methodology
//!   3: Language core (types, structure, errors, naming)
//!   4: Language advanced (testing, tooling, platform)
//!   5: Infrastructure (automation, devops, ipc, platform-ux)
//!   6: Reference (READMEs, quick-refs)
//!
//! Only layers relevant to the requested languages are produced; global
//! and project-files categories are always included as foundation.

use std::collections::{BTreeMap, BTreeSet};

use super::error::RegistryError;
use crate::models::RuleRecord;

/// Fixed layer vocabulary, index = layer - 1 / 固定的层级命名
pub const LAYER_NAMES: [&str; 6] = [
    "Global foundations",
    "Project methodology",
    "Language core",
    "Language advanced",
    "Infrastructure",
    "Reference",
];

/// Human name for a layer number / 层级的可读名称
pub fn layer_name(layer: u8) -> &'static str {
    match layer {
        1..=6 => LAYER_NAMES[(layer - 1) as usize],
        _ => "Unknown",
    }
}

/// Build the ordered layer sequence for the given languages / 构建有序的层级序列
///
/// Languages are matched case-insensitively against record categories.
/// `phase` is 1-based into the produced sequence; outside it is an error.
/// No matching records at all yields an empty sequence.
pub fn learning_path(
    records: &[RuleRecord],
    languages: &[String],
    phase: Option<usize>,
) -> Result<Vec<Vec<RuleRecord>>, RegistryError> {
    let mut include_cats: BTreeSet<String> =
        languages.iter().map(|lang| lang.to_lowercase()).collect();
    // Always include global + project-files as foundation / 始终包含基础分类
    include_cats.insert("global".to_string());
    include_cats.insert("project-files".to_string());

    let relevant: Vec<&RuleRecord> = records
        .iter()
        .filter(|r| include_cats.contains(&r.category.to_lowercase()))
        .collect();
    if relevant.is_empty() {
        return Ok(Vec::new());
    }

    // BTreeMap keeps layer numbers ascending without relying on hash order
    let mut groups: BTreeMap<u8, Vec<RuleRecord>> = BTreeMap::new();
    for record in relevant {
        groups.entry(record.layer).or_default().push(record.clone());
    }

    let mut layers: Vec<Vec<RuleRecord>> = groups.into_values().collect();
    for layer in &mut layers {
        layer.sort_by(|a, b| a.file.cmp(&b.file));
    }

    match phase {
        None => Ok(layers),
        Some(p) if (1..=layers.len()).contains(&p) => Ok(vec![layers.swap_remove(p - 1)]),
        Some(p) => Err(RegistryError::PhaseOutOfRange {
            phase: p,
            layers: layers.len(),
        }),
    }
}
