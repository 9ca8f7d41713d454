//! MCP tool implementations / MCP 工具实现
//!
//! Tools only render registry data as markdown text; all querying lives in
//! rules_mcp::registry and stays free of formatting decisions.

use std::collections::BTreeSet;

use anyhow::Result;

use rules_mcp::utils::clean_rule_path;

use crate::state::AppState;

/// Get started overview with live stats / 带实时统计的入门总览
pub async fn help(state: &AppState) -> Result<String> {
    let records = state.registry.all();
    let cats = state.registry.categories();
    let rule_count: usize = records.iter().map(|e| e.rules.len()).sum();
    let banned_count: usize = records.iter().map(|e| e.banned.len()).sum();
    let cat_list = cats.join(", ");

    Ok(format!(
        r#"# Rules MCP — AI coding standards lookup

**{total} rules** across **{cat_count} categories** ({rule_count} RULE markers, {banned_count} BANNED markers)

## Tools

| Tool | Purpose | Example |
|------|---------|---------|
| `help()` | This overview | — |
| `search_rules(query)` | Find rules by keyword | `search_rules("testing")` |
| `get_rule(file)` | Read full rule content | `get_rule("python/types.md")` |
| `get_context(languages)` | All rules for languages | `get_context(["python", "js"])` |
| `get_learning_path(languages)` | Phased reading order | `get_learning_path(["cpp"], phase=1)` |
| `list_rules(category)` | Browse available rules | `list_rules("rust")` |
| `get_related(file)` | Follow edges to related rules | `get_related("python/types.md")` |

## Quick start

- **App architecture / folder layout** → `get_context(["global"])`
- **New project setup** → `get_context(["global", "project-files"])`
- **Learn a language's rules** → `get_learning_path(["python"], phase=1)`
- **Search a topic** → `search_rules("error handling")`
- **Browse everything** → `list_rules()`

## Categories

{cat_list}"#,
        total = records.len(),
        cat_count = cats.len(),
    ))
}

/// Search rules by keyword / 按关键词搜索规则
pub async fn search_rules(
    state: &AppState,
    query: &str,
    category: Option<&str>,
    limit: usize,
) -> Result<String> {
    let results = state.registry.search(query, category, limit);
    if results.is_empty() {
        return Ok("No matching rules found.".to_string());
    }

    let mut lines: Vec<String> = Vec::new();
    for entry in &results {
        lines.push(format!("- **{}**: {}", entry.file, entry.title));
        let tags: Vec<&str> = entry.tags.iter().take(5).map(String::as_str).collect();
        if !tags.is_empty() {
            lines.push(format!("  tags: {}", tags.join(", ")));
        }
    }
    Ok(lines.join("\n"))
}

/// Full markdown content of one rule file / 单个规则文件的完整内容
pub async fn get_rule(state: &AppState, file: &str) -> Result<String> {
    let Some(repo_path) = state.repo_path() else {
        return Ok("Rules repository is not synced yet.".to_string());
    };

    // Register paths are repo-relative; never let them escape the checkout
    let clean = clean_rule_path(file);
    if clean.is_empty() {
        return Ok(format!("File not found: {}", file));
    }

    match tokio::fs::read_to_string(repo_path.join(&clean)).await {
        Ok(content) => Ok(content),
        Err(_) => Ok(format!("File not found: {}", file)),
    }
}

/// Combined rules context for languages and topics / 按语言与主题组合的规则上下文
pub async fn get_context(
    state: &AppState,
    languages: &[String],
    topics: &[String],
) -> Result<String> {
    let Some(repo_path) = state.repo_path() else {
        return Ok("Rules repository is not synced yet.".to_string());
    };

    let lang_set: BTreeSet<String> = languages.iter().map(|l| l.to_lowercase()).collect();
    let topic_set: BTreeSet<String> = topics.iter().map(|t| t.to_lowercase()).collect();

    let records = state.registry.all();
    let matched: Vec<_> = records
        .iter()
        .filter(|entry| {
            if lang_set.contains(&entry.category.to_lowercase()) {
                return true;
            }
            !topic_set.is_empty()
                && (entry
                    .concepts
                    .iter()
                    .any(|c| topic_set.contains(&c.to_lowercase()))
                    || entry
                        .tags
                        .iter()
                        .any(|t| topic_set.contains(&t.to_lowercase())))
        })
        .collect();

    if matched.is_empty() {
        return Ok("No rules found for the given languages/topics.".to_string());
    }

    let mut sections: Vec<String> = Vec::new();
    for entry in matched {
        let path = repo_path.join(clean_rule_path(&entry.file));
        // Entries whose document is missing from the checkout are skipped
        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            continue;
        };

        sections.push(format!("## {}", entry.file));
        if !entry.rules.is_empty() {
            sections.push(format!("**RULES:** {}", entry.rules.join(" | ")));
        }
        if !entry.banned.is_empty() {
            sections.push(format!("**BANNED:** {}", entry.banned.join(" | ")));
        }
        sections.push(content);
        sections.push("---".to_string());
    }

    Ok(sections.join("\n\n"))
}

/// Phased reading order / 分阶段阅读顺序
pub async fn get_learning_path(
    state: &AppState,
    languages: &[String],
    phase: Option<usize>,
) -> Result<String> {
    let layers = state.registry.learning_path(languages, phase)?;
    if layers.is_empty() {
        return Ok("No rules found for the given languages.".to_string());
    }

    let total: usize = layers.iter().map(Vec::len).sum();
    let total_phases = phase.unwrap_or(layers.len());

    let mut sections: Vec<String> = vec![format!(
        "# Learning Path: {} — {} rules in {} phases\n",
        languages.join(", "),
        total,
        total_phases,
    )];

    for (i, layer) in layers.iter().enumerate() {
        let phase_num = phase.unwrap_or(i + 1);
        sections.push(format!("## Phase {}: {} rules", phase_num, layer.len()));
        for entry in layer {
            let mut markers: Vec<String> = Vec::new();
            if !entry.rules.is_empty() {
                markers.push(format!("RULES: {}", entry.rules.len()));
            }
            if !entry.banned.is_empty() {
                markers.push(format!("BANNED: {}", entry.banned.len()));
            }
            let marker_str = if markers.is_empty() {
                String::new()
            } else {
                format!(" [{}]", markers.join(", "))
            };
            sections.push(format!("- {}: {}{}", entry.file, entry.title, marker_str));
        }
        sections.push(String::new());
    }

    Ok(sections.join("\n"))
}

/// Related rules along graph edges / 沿图边的相关规则
pub async fn get_related(state: &AppState, file: &str) -> Result<String> {
    let edges = state.registry.related(file)?;
    if edges.is_empty() {
        return Ok(format!("No edges found for {}", file));
    }

    // Human labels are a rendering concern and stay out of the registry
    let labels = [
        ("requires", "Depends on (must read first)"),
        ("required_by", "Depended on by"),
        ("feeds", "Feeds into"),
        ("fed_by", "Fed by"),
        ("related", "Related"),
    ];

    let mut lines: Vec<String> = vec![format!("# Edges for {}\n", file)];
    for (kind, targets) in edges.kinds() {
        if targets.is_empty() {
            continue;
        }
        let label = labels
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, label)| *label)
            .unwrap_or(kind);
        lines.push(format!("## {}", label));
        for target in targets {
            lines.push(format!("- {}: {}", target.file, target.title));
        }
        lines.push(String::new());
    }

    Ok(lines.join("\n"))
}

/// List rule files, optionally filtered by category / 列出规则文件
pub async fn list_rules(state: &AppState, category: Option<&str>) -> Result<String> {
    let entries = state.registry.list_files(category);
    if entries.is_empty() {
        let available = state.registry.categories().join(", ");
        return Ok(format!(
            "No rules found. Available categories: {}",
            available
        ));
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current_cat: Option<&str> = None;
    for entry in &entries {
        if current_cat != Some(entry.category.as_str()) {
            current_cat = Some(entry.category.as_str());
            lines.push(format!("\n### {}", entry.category));
        }
        lines.push(format!("- {}: {}", entry.file, entry.title));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AppState {
        AppState::with_register(concat!(
            r#"{"file":"global/style.md","category":"global","title":"Style","layer":1,"rules":["R1","R2"]}"#,
            "\n",
            r#"{"file":"python/types.md","category":"python","title":"Type Hints","layer":3,"tags":["types","mypy","hints","static","checker","extra"],"banned":["Any"],"edges":{"requires":["python/naming.md"]}}"#,
            "\n",
            r#"{"file":"python/naming.md","category":"python","title":"Naming","layer":3}"#,
            "\n",
        ))
    }

    #[tokio::test]
    async fn test_help_reports_stats_and_categories() {
        let state = sample_state();
        let text = help(&state).await.unwrap();
        assert!(text.contains("**3 rules** across **2 categories**"));
        assert!(text.contains("(2 RULE markers, 1 BANNED markers)"));
        assert!(text.contains("global, python"));
    }

    #[tokio::test]
    async fn test_search_rules_renders_hits_with_capped_tags() {
        let state = sample_state();
        let text = search_rules(&state, "types", None, 10).await.unwrap();
        assert!(text.contains("- **python/types.md**: Type Hints"));
        // Only the first five tags are shown / 最多展示五个标签
        assert!(text.contains("tags: types, mypy, hints, static, checker"));
        assert!(!text.contains("extra"));
    }

    #[tokio::test]
    async fn test_search_rules_no_hits() {
        let state = sample_state();
        let text = search_rules(&state, "zzz-nothing", None, 10).await.unwrap();
        assert_eq!(text, "No matching rules found.");
    }

    #[tokio::test]
    async fn test_get_rule_before_sync() {
        let state = sample_state();
        let text = get_rule(&state, "python/types.md").await.unwrap();
        assert_eq!(text, "Rules repository is not synced yet.");
    }

    fn sample_checkout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("python")).unwrap();
        std::fs::create_dir_all(dir.path().join("global")).unwrap();
        std::fs::write(dir.path().join("python/types.md"), "# Type Hints\n").unwrap();
        std::fs::write(dir.path().join("python/naming.md"), "# Naming\n").unwrap();
        std::fs::write(dir.path().join("global/style.md"), "# Style\n").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_get_rule_reads_document() {
        let state = sample_state();
        let checkout = sample_checkout();
        state.set_repo_path(checkout.path().to_path_buf());

        let text = get_rule(&state, "python/types.md").await.unwrap();
        assert_eq!(text, "# Type Hints\n");
        let text = get_rule(&state, "python/missing.md").await.unwrap();
        assert_eq!(text, "File not found: python/missing.md");
    }

    #[tokio::test]
    async fn test_get_rule_cannot_escape_checkout() {
        let state = sample_state();
        let checkout = sample_checkout();
        std::fs::write(checkout.path().parent().unwrap().join("secret.md"), "secret").ok();
        state.set_repo_path(checkout.path().to_path_buf());

        let text = get_rule(&state, "../secret.md").await.unwrap();
        assert!(text.starts_with("File not found"));
        let text = get_rule(&state, "..").await.unwrap();
        assert!(text.starts_with("File not found"));
    }

    #[tokio::test]
    async fn test_get_context_renders_matched_documents() {
        let state = sample_state();
        let checkout = sample_checkout();
        state.set_repo_path(checkout.path().to_path_buf());

        let text = get_context(&state, &["python".to_string()], &[]).await.unwrap();
        assert!(text.contains("## python/types.md"));
        assert!(text.contains("**BANNED:** Any"));
        assert!(text.contains("# Type Hints"));
        assert!(!text.contains("## global/style.md"));
    }

    #[tokio::test]
    async fn test_get_context_matches_topics_across_languages() {
        let state = sample_state();
        let checkout = sample_checkout();
        state.set_repo_path(checkout.path().to_path_buf());

        // No language hit, but the "types" tag matches the topic / 主题命中标签
        let text = get_context(&state, &[], &["types".to_string()]).await.unwrap();
        assert!(text.contains("## python/types.md"));
        assert!(!text.contains("## python/naming.md"));

        let text = get_context(&state, &[], &["nothing".to_string()]).await.unwrap();
        assert_eq!(text, "No rules found for the given languages/topics.");
    }

    #[tokio::test]
    async fn test_get_learning_path_renders_phases() {
        let state = sample_state();
        let text = get_learning_path(&state, &["python".to_string()], None)
            .await
            .unwrap();
        assert!(text.contains("# Learning Path: python — 3 rules in 2 phases"));
        assert!(text.contains("## Phase 1: 1 rules"));
        assert!(text.contains("- global/style.md: Style [RULES: 2]"));
        assert!(text.contains("## Phase 2: 2 rules"));
        assert!(text.contains("- python/types.md: Type Hints [BANNED: 1]"));
    }

    #[tokio::test]
    async fn test_get_learning_path_single_phase_keeps_number() {
        let state = sample_state();
        let text = get_learning_path(&state, &["python".to_string()], Some(2))
            .await
            .unwrap();
        assert!(text.contains("## Phase 2: 2 rules"));
        assert!(!text.contains("## Phase 1"));
    }

    #[tokio::test]
    async fn test_get_learning_path_phase_out_of_range_is_error() {
        let state = sample_state();
        let err = get_learning_path(&state, &["python".to_string()], Some(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("phase 5 out of range"));
    }

    #[tokio::test]
    async fn test_get_related_renders_labels() {
        let state = sample_state();
        let text = get_related(&state, "python/types.md").await.unwrap();
        assert!(text.contains("# Edges for python/types.md"));
        assert!(text.contains("## Depends on (must read first)"));
        assert!(text.contains("- python/naming.md: Naming"));
    }

    #[tokio::test]
    async fn test_get_related_without_edges() {
        let state = sample_state();
        let text = get_related(&state, "python/naming.md").await.unwrap();
        assert_eq!(text, "No edges found for python/naming.md");
    }

    #[tokio::test]
    async fn test_get_related_unknown_file_is_error() {
        let state = sample_state();
        assert!(get_related(&state, "python/nope.md").await.is_err());
    }

    #[tokio::test]
    async fn test_list_rules_groups_by_category() {
        let state = sample_state();
        let text = list_rules(&state, None).await.unwrap();
        assert!(text.contains("### global"));
        assert!(text.contains("### python"));
        assert!(text.contains("- python/naming.md: Naming"));
    }

    #[tokio::test]
    async fn test_list_rules_unknown_category_lists_available() {
        let state = sample_state();
        let text = list_rules(&state, Some("cobol")).await.unwrap();
        assert_eq!(text, "No rules found. Available categories: global, python");
    }
}
