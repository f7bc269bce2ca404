use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use otp_mailer::config::Args;
use otp_mailer::mailer::{MailRelay, SmtpRelay};
use otp_mailer::state::AppState;
use otp_mailer::{build_router, telemetry};

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap can pick the values up from the environment
    dotenvy::dotenv().ok();
    let args = Args::parse();
    telemetry::init();

    let relay: Arc<dyn MailRelay> =
        Arc::new(SmtpRelay::new(&args).context("invalid SMTP relay configuration")?);
    let state = Arc::new(AppState::new(&args, Arc::clone(&relay)));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(port = args.port, mode = args.mode.as_str(), "otp mailer running");
    info!(host = %args.smtp_host, port = args.smtp_port, "relaying through smtp");
    info!(
        hourly = args.rate_limit_hourly,
        daily = args.rate_limit_daily,
        "per-recipient rate limits"
    );
    info!(origins = ?args.origins(), "allowed origins");

    // a dead relay is logged, not fatal
    tokio::spawn(async move {
        match relay.verify().await {
            Ok(()) => info!("smtp server is ready"),
            Err(e) => warn!(error = %e, "smtp connection failed"),
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
