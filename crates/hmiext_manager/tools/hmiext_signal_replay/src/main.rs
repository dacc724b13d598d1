use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncReadExt;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hmiext_manager::error::log_core_error;
use hmiext_manager::lifecycle::{spawn_signal_pump, LifecycleManager, ResolvePolicy};
use hmiext_signal_replay::config::Config;
use hmiext_signal_replay::report::{format_notification, render_graph, ConsoleDelegate};
use hmiext_signal_replay::script::parse_script;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("HMIEXT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_args();

    if config.print_graph {
        print!("{}", render_graph());
        return Ok(());
    }

    let text = read_script(&config.script).await?;
    let entries = parse_script(&text).map_err(|err| {
        log_core_error(&err);
        anyhow::Error::new(err)
    })?;

    info!(
        app = %config.app_name,
        script = %config.script,
        signals = entries.len(),
        strict = config.strict,
        "replaying signal script"
    );

    let policy = ResolvePolicy {
        strict_connect: config.strict,
    };
    let manager = Arc::new(
        LifecycleManager::builder(config.app_name.clone())
            .policy(policy)
            .notification_capacity(config.channel_capacity)
            .delegate(ConsoleDelegate::new(config.app_name.clone()))
            .build()
            .map_err(anyhow::Error::new)
            .context("failed to build lifecycle manager")?,
    );

    let mut notifications = manager.subscribe_notifications();
    let printer = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(n) => println!("{}", format_notification(&n)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let pump = spawn_signal_pump(manager.clone(), rx, !config.keep_going);

    for entry in entries {
        if tx.send(entry.signal).await.is_err() {
            warn!(line = entry.line, "signal pump closed early");
            break;
        }
    }
    drop(tx);

    let summary = pump.await.context("signal pump task failed")?;

    // Dropping the last manager handle closes the broadcast stream and ends the printer.
    drop(manager);
    let _ = printer.await;

    info!(
        accepted = summary.accepted,
        duplicates = summary.duplicates,
        rejected = summary.rejected,
        delegate_failures = summary.delegate_failures,
        "replay finished"
    );

    if let Some(violation) = summary.violation {
        if !config.keep_going {
            bail!("replay stopped: {violation}");
        }
    }

    Ok(())
}

async fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read script from stdin")?;
        Ok(text)
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read script {source}"))
    }
}
