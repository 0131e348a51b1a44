use std::net::ToSocketAddrs;

use anyhow::Result;
use assetdesk_admin::AdminServer;
use assetdesk_common::version::assetdesk_version;
use assetdesk_core::Services;
#[cfg(target_os = "linux")]
use sd_notify::NotifyState;
use tracing::*;

use crate::config::{load_config, watch_config};

pub(crate) async fn command(cli: &crate::Cli) -> Result<()> {
    let version = assetdesk_version();
    info!(%version, "Assetdesk");

    let config = load_config(&cli.config, true)?;
    let services = Services::new(config.clone()).await?;

    let address = config
        .store
        .http
        .listen
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve the listen address"))?;

    let admin = AdminServer::new(&services).run(address);

    if console::user_attended() {
        info!("--------------------------------------------");
        info!("Assetdesk is now running.");
        info!("Admin API on http://{}/api", config.store.http.listen);
        info!("API docs on http://{}/api-docs", config.store.http.listen);
        if config.store.api_tokens.is_empty() {
            warn!("No API tokens are configured, every API request will be rejected");
        }
        info!("--------------------------------------------");
    }

    #[cfg(target_os = "linux")]
    if let Ok(true) = sd_notify::booted() {
        use std::time::Duration;
        tokio::spawn(async {
            if let Err(error) = async {
                sd_notify::notify(false, &[NotifyState::Ready])?;
                loop {
                    sd_notify::notify(false, &[NotifyState::Watchdog])?;
                    tokio::time::sleep(Duration::from_secs(15)).await;
                }
                #[allow(unreachable_code)]
                Ok::<(), anyhow::Error>(())
            }
            .await
            {
                error!(?error, "Failed to communicate with systemd");
            }
        });
    }

    drop(config);

    tokio::spawn({
        let path = cli.config.clone();
        let config = services.config.clone();
        async move {
            if let Err(error) = watch_config(path, config).await {
                error!(?error, "Config watcher stopped");
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        result = admin => {
            if let Err(error) = result {
                error!(?error, "Admin server error");
                std::process::exit(1);
            }
        }
    }

    info!("Exiting");
    Ok(())
}
