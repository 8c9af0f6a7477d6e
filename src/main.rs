use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transfer_monitor::config::Config;
use transfer_monitor::{
    HostInstruction, ObservableCall, TransferCall, TransferMonitorService, TransferStatus,
};

/// Environment variable naming an optional TOML configuration file
const CONFIG_PATH_ENV: &str = "TRANSFER_MONITOR_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting transfer monitor demo");
    info!("Effective configuration:\n{}", config.to_toml()?);

    demo_transfer(&config, &[100, 180, 200]).await?;
    demo_transfer(&config, &[100, 486]).await?;

    info!("Transfer monitor demo complete");
    Ok(())
}

/// Drive one transfer through the given REFER progress codes and print what
/// the host would receive
async fn demo_transfer(config: &Config, progress: &[u16]) -> anyhow::Result<()> {
    info!("=== Transfer Demo {:?} ===", progress);

    let first_call = Arc::new(ObservableCall::with_status(
        Some("+31 50 123 4567".to_string()),
        TransferStatus::Initialized,
    ));
    let second_call = Arc::new(ObservableCall::new(Some("204".to_string())));

    let (monitor, mut host) = TransferMonitorService::spawn(&config.monitor);
    monitor
        .set_primary_call(Some(first_call.clone() as Arc<dyn TransferCall>))
        .await?;
    monitor
        .set_secondary_call(Some(second_call.clone() as Arc<dyn TransferCall>))
        .await?;
    monitor.activate().await?;

    let signaling = {
        let call = first_call.clone();
        let progress = progress.to_vec();
        tokio::spawn(async move {
            for code in progress {
                tokio::time::sleep(Duration::from_millis(300)).await;
                let status = call.apply_refer_progress(code);
                info!("REFER progress {} -> {}", code, status);
            }
        })
    };

    while let Some(instruction) = host.recv().await {
        println!("{}", serde_json::to_string(&instruction)?);

        if let HostInstruction::Dismiss { .. } = instruction {
            monitor.deactivate().await?;
            break;
        }
    }

    signaling.await?;
    monitor.shutdown().await;
    Ok(())
}
