// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Serves `POST /api/contact` for a portfolio site. Each accepted submission
//! is validated, stripped of angle brackets, and emailed to the site owner
//! with `Reply-To` set to the submitter.
//!
//! ## Configuration
//!
//! Read from the environment (a `.env` file is loaded first if present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: Submissions per client per window (default: 3)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length in seconds (default: 60)
//! - `SMTP_HOST` / `SMTP_PORT`: Relay (default: smtp.gmail.com:587)
//! - `SMTP_USER` / `SMTP_PASS`: Relay credentials
//! - `CONTACT_EMAIL`: Where notifications go (default: `SMTP_USER`)

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    handlers::{router, AppState},
    mailer::{EmailDispatcher, SmtpMailer},
    Config,
};

#[derive(Parser)]
#[command(name = "contact-relay", version, about = "Rate-limited contact form to email relay")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Override BIND_ADDR
        #[arg(long, env = "BIND_ADDR")]
        bind_addr: Option<String>,
    },
    /// Send a plain-text test message to the contact address and exit
    SendTestEmail,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();

    match args.command.unwrap_or(Command::Serve { bind_addr: None }) {
        Command::Serve { bind_addr } => {
            if let Some(bind_addr) = bind_addr {
                config.bind_addr = bind_addr;
            }
            serve(config).await
        }
        Command::SendTestEmail => send_test_email(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        "Starting contact relay"
    );

    let mailer = SmtpMailer::new(&config.smtp)?;
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid BIND_ADDR {}", config.bind_addr))?;

    let state = Arc::new(AppState::new(config, mailer)?);
    info!(recipient = %state.dispatcher.recipient(), "Contact notifications enabled");

    let sweeper = state.limiter.spawn_sweeper();
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.stop().await;
    info!("Contact relay stopped");

    Ok(())
}

async fn send_test_email(config: Config) -> anyhow::Result<()> {
    let mailer = SmtpMailer::new(&config.smtp)?;
    mailer.ping().await?;

    let dispatcher = EmailDispatcher::from_config(mailer, &config)?;
    dispatcher.send_test().await?;

    info!(recipient = %dispatcher.recipient(), "Test email sent");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }

    info!("Starting graceful shutdown");
}
