//! # pagseguro-dev
//!
//! Local stand-in for the PagSeguro gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Account the stub accepts
//! export PAGSEGURO_EMAIL=john@doe.com
//! export PAGSEGURO_TOKEN=9CA8D46AF0C6177CB4C23D76CAF5E4B0
//!
//! # Where to post notifications after a payment (optional)
//! export NOTIFY_URL=http://localhost:3000/webhook/pagseguro
//!
//! # Run the stub
//! pagseguro-dev
//! ```

use pagseguro_dev::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let base = state.config.base_url.clone();

    info!("Environment: {}", state.config.environment);
    info!("Account: {}", state.account.email);
    match state.config.notify_url {
        Some(ref url) => info!("Notifications go to {}", url),
        None => info!("NOTIFY_URL not set, payments will not be announced"),
    }

    if state.config.is_production() {
        tracing::warn!("pagseguro-dev is a developer tool; do not expose it in production");
    }

    let app = routes::create_router(state);

    info!("PagSeguro developer stub on http://{}", addr);
    info!("Point clients at PAGSEGURO_DEVELOPER=true PAGSEGURO_DEVELOPER_BASE={}", base);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  PagSeguro developer stub
  ━━━━━━━━━━━━━━━━━━━━━━━━
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
