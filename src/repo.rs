//! Rules repository sync - clone on first use, pull afterwards / 规则仓库同步
//!
//! Shells out to the git binary; a non-zero exit fails with the captured
//! stderr in the error chain. The registry itself never touches the
//! checkout — callers read register.jsonl and hand the text to load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::process::Command;

use crate::config::RepoSettings;

/// Run one git command, failing on non-zero exit / 运行一条 git 命令
async fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    tracing::debug!("git {}", args.join(" "));

    let output = cmd.output().await.context("failed to spawn git")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Clone the repo if missing, pull if present, return the checkout path / 克隆或拉取仓库
pub async fn ensure_repo(settings: &RepoSettings) -> Result<PathBuf> {
    let checkout = settings.checkout_dir();

    if checkout.join(".git").is_dir() {
        tracing::info!("Pulling rules repo at {:?}", checkout);
        run_git(Some(&checkout), &["pull", "--ff-only"]).await?;
    } else {
        if let Some(parent) = checkout.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {:?}", parent))?;
        }
        tracing::info!("Cloning {} into {:?}", settings.url, checkout);
        let dest = checkout.to_string_lossy();
        run_git(None, &["clone", settings.url.as_str(), dest.as_ref()]).await?;
    }

    Ok(checkout)
}
