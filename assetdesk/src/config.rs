use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use assetdesk_common::helpers::fs::secure_file;
use assetdesk_common::{AssetdeskConfig, AssetdeskConfigStore};
use config::{Config, Environment, File};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, Mutex};
use tracing::*;

pub const ENV_PREFIX: &str = "ASSETDESK";

pub fn load_config(path: &Path, secure: bool) -> Result<AssetdeskConfig> {
    if secure {
        secure_file(path).context("Could not secure config")?;
    }

    let store: AssetdeskConfigStore = Config::builder()
        .add_source(File::from(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Could not load config")?
        .try_deserialize()
        .context("Could not parse config")?;

    let config = AssetdeskConfig {
        store,
        paths_relative_to: path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    info!(
        "Using config: {path:?} (asset code prefix: {}, API tokens: {})",
        config.store.asset_codes.prefix,
        config.store.api_tokens.len(),
    );
    Ok(config)
}

pub async fn watch_config<P: AsRef<Path>>(
    path: P,
    config: Arc<Mutex<AssetdeskConfig>>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(1);
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.blocking_send(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(path.as_ref(), RecursiveMode::NonRecursive)?;

    loop {
        match rx.recv().await {
            Some(Ok(event)) => {
                if event.kind.is_modify() {
                    match load_config(path.as_ref(), false) {
                        Ok(new_config) => {
                            *(config.lock().await) = new_config;
                            info!("Reloaded config");
                        }
                        Err(error) => error!(?error, "Failed to reload config"),
                    }
                }
            }
            Some(Err(error)) => error!(?error, "Failed to watch config"),
            None => {
                error!("Config watch failed");
                return Ok(());
            }
        }
    }
}
