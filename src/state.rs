use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use parking_lot::RwLock;

use rules_mcp::config::RepoSettings;
use rules_mcp::registry::Registry;
use rules_mcp::repo;

/// Shared application state / 共享应用状态
pub struct AppState {
    pub registry: Registry,
    pub repo_settings: RepoSettings,
    /// Checkout path, set after the first successful sync / 首次同步后的检出路径
    repo_path: RwLock<Option<PathBuf>>,
    last_pull: RwLock<Option<Instant>>,
    /// Unix timestamp of the last successful sync, for reporting / 上次成功同步的时间戳
    last_synced: RwLock<Option<i64>>,
}

impl AppState {
    pub fn new(repo_settings: RepoSettings) -> Self {
        Self {
            registry: Registry::new(),
            repo_settings,
            repo_path: RwLock::new(None),
            last_pull: RwLock::new(None),
            last_synced: RwLock::new(None),
        }
    }

    /// Checkout path of the rules repo, if synced / 已同步的检出路径
    pub fn repo_path(&self) -> Option<PathBuf> {
        self.repo_path.read().clone()
    }

    /// Unix timestamp of the last successful sync / 上次成功同步的时间戳
    pub fn last_synced(&self) -> Option<i64> {
        *self.last_synced.read()
    }

    /// Whether the last pull is older than the configured interval / 上次拉取是否已过期
    pub fn needs_pull(&self) -> bool {
        match *self.last_pull.read() {
            Some(at) => at.elapsed() >= self.repo_settings.pull_interval(),
            None => true,
        }
    }

    /// Clone-or-pull the repo and reload the register / 同步仓库并重载索引
    ///
    /// The registry swaps its snapshot in one step, so concurrent readers
    /// keep serving the previous records until the reload completes.
    pub async fn refresh(&self) -> Result<()> {
        let checkout = repo::ensure_repo(&self.repo_settings).await?;
        let register = self.repo_settings.register_path();
        let source = tokio::fs::read_to_string(&register)
            .await
            .with_context(|| format!("failed to read {:?}", register))?;
        let count = self.registry.load(&source)?;

        *self.repo_path.write() = Some(checkout);
        *self.last_pull.write() = Some(Instant::now());
        *self.last_synced.write() = Some(chrono::Utc::now().timestamp());
        tracing::info!("Loaded {} rule records from {:?}", count, register);
        Ok(())
    }

    #[cfg(test)]
    pub fn with_register(source: &str) -> Self {
        let state = Self::new(RepoSettings::default());
        state.registry.load(source).expect("test register must parse");
        state
    }

    #[cfg(test)]
    pub fn set_repo_path(&self, path: PathBuf) {
        *self.repo_path.write() = Some(path);
    }
}

/// Spawn the periodic repo refresher / 启动定时刷新任务
///
/// Re-pulls at most once per configured interval; a failed refresh keeps
/// the previous snapshot and retries on the next tick.
pub fn spawn_refresher(state: Arc<AppState>) {
    let interval = state.repo_settings.pull_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick fires immediately; the initial load already happened / 首个 tick 立即触发
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if !state.needs_pull() {
                continue;
            }
            if let Err(e) = state.refresh().await {
                tracing::warn!("Rules repo refresh failed: {:#}", e);
            }
        }
    });
}
