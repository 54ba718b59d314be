use fnotifier::config::Config;
use fnotifier::service::submission::SubmissionService;
use fnotifier::sheets::{ReadinessGate, SheetsAuthorizer};
use fnotifier::telegram::{TelegramApi, TelegramListener, admin_chat_channel};
use fnotifier::{FnotifierState, fnotifier_router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        telegram_api = %cfg.telegram.api_base_url,
        admin_chat_id = ?cfg.telegram.admin_chat_id,
        spreadsheet_id = %cfg.sheets.spreadsheet_id,
        range = %cfg.sheets.range,
        auth_strategy = ?cfg.sheets.auth_strategy,
        token_path = %cfg.sheets.token_path.display(),
    );

    let store = fnotifier::db::spawn(&cfg.basic.database_url).await?;

    let (recorder, admin_chat) = admin_chat_channel(cfg.telegram.admin_chat_id);
    let telegram = TelegramApi::new(&cfg.telegram)?;
    TelegramListener::new(telegram.clone(), recorder, cfg.telegram.poll_timeout_secs).spawn();

    let gate = ReadinessGate::new();
    let authorizer = SheetsAuthorizer::from_config(&cfg.sheets, gate.clone())?;
    authorizer.start().await?;

    let submissions = SubmissionService::new(
        Arc::new(store),
        Arc::new(telegram),
        admin_chat.clone(),
        gate.clone(),
    );
    let state = FnotifierState::new(submissions, gate, authorizer, admin_chat);
    let app = fnotifier_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
