// ABOUTME: Command-line consumer of the Akaza notification stream
// ABOUTME: Opens the push connection and prints the de-duplicated feed as it changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Follow the feed until Ctrl-C
//! AKAZA_API_BASE_URL=https://api.akaza.io AKAZA_SESSION_COOKIE="sid=..." akaza-notify watch
//!
//! # Print the first batch and exit
//! akaza-notify watch --base-url http://localhost:8080 --once
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use akaza_notifications::config::StreamConfig;
use akaza_notifications::logging;
use akaza_notifications::models::Notification;
use akaza_notifications::notifications::{
    use_notifications, NotificationProvider, Snapshot, StaticSession,
};

#[derive(Parser)]
#[command(
    name = "akaza-notify",
    about = "Akaza notification stream client",
    long_about = "Connects to the Akaza push endpoint and prints the notification feed."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow the notification feed
    Watch {
        /// API base URL (overrides `AKAZA_API_BASE_URL`)
        #[arg(long)]
        base_url: Option<String>,

        /// Exit after the first non-empty feed
        #[arg(long)]
        once: bool,

        /// Number of newest notifications to print per update
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_from_env().context("Failed to initialize logging")?;

    match cli.command {
        Command::Watch {
            base_url,
            once,
            limit,
        } => watch(base_url, once, limit).await,
    }
}

async fn watch(base_url: Option<String>, once: bool, limit: usize) -> Result<()> {
    let config = StreamConfig::from_env_with_base_url(base_url.as_deref())?;
    let session = StaticSession(config.session_cookie.is_some());
    let provider = NotificationProvider::new(&config, &session)?;

    provider
        .scope(async {
            let feed = use_notifications()?;
            let Some(stream) = feed.client() else {
                warn!("AKAZA_SESSION_COOKIE is not set, no session to watch notifications for");
                return anyhow::Ok(());
            };
            info!(url = %stream.url(), "Watching notifications");

            let mut updates = WatchStream::new(stream.subscribe());
            loop {
                tokio::select! {
                    update = updates.next() => {
                        let Some(snapshot) = update else { break };
                        if snapshot.is_empty() {
                            continue;
                        }
                        render(&snapshot, limit);
                        if once {
                            break;
                        }
                    }
                    _ = signal::ctrl_c() => {
                        info!("Interrupted, closing notification stream");
                        break;
                    }
                }
            }
            anyhow::Ok(())
        })
        .await?;

    provider.shutdown();
    Ok(())
}

fn render(snapshot: &Snapshot, limit: usize) {
    let unread = snapshot.iter().filter(|n| n.unread).count();
    println!("\n{} notifications ({unread} unread)", snapshot.len());
    println!("{}", "=".repeat(60));
    for notification in snapshot.iter().rev().take(limit) {
        println!("{}", format_line(notification));
    }
}

fn format_line(notification: &Notification) -> String {
    let marker = if notification.unread { "*" } else { " " };
    let flag = if notification.is_match() { " [match]" } else { "" };
    format!(
        "{marker} {} {}{flag}\n    {}",
        notification.created_at.format("%Y-%m-%d %H:%M"),
        notification.title,
        notification.message
    )
}
