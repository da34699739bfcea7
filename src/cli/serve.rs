//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::StatusboardConfig;
use crate::logging::{generate_request_id, init_tracing};
use crate::viewmodel::PollingViewModel;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<StatusboardConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        StatusboardConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        StatusboardConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref backend_url) = args.backend_url {
        config.gateway.base_url = backend_url.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_dashboard {
        config.dashboard.enabled = false;
    }

    Ok(config)
}

/// Build application state, with the server-side poller when the
/// dashboard is enabled.
///
/// The poller is seeded with one up-front fetch so the first page load has
/// data; if that fetch fails it starts empty and loading.
pub async fn build_app_state(
    config: StatusboardConfig,
) -> Result<Arc<AppState>, Box<dyn std::error::Error>> {
    let config = Arc::new(config);
    let mut state = AppState::new(Arc::clone(&config))?;

    if config.dashboard.enabled {
        let seed = match state.gateway.list(&generate_request_id()).await {
            Ok(services) => {
                tracing::info!(services = services.len(), "Seeded dashboard from backend");
                Some(services)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Initial fetch failed, dashboard starts empty");
                None
            }
        };

        tracing::info!(
            interval_secs = config.dashboard.refresh_interval_seconds,
            "Starting server-side poller"
        );
        let viewmodel = PollingViewModel::initialize(
            state.gateway.clone(),
            config.dashboard.interval(),
            seed,
        );
        state = state.with_viewmodel(Arc::new(viewmodel));
    } else {
        tracing::info!("Server-side poller disabled");
    }

    Ok(Arc::new(state))
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    init_tracing(&config.logging)?;

    tracing::info!(backend = %config.gateway.base_url, "Starting statusboard");
    tracing::debug!(?config, "Loaded configuration");

    let addr = config.server.bind_addr();
    let app_state = build_app_state(config).await?;
    let app = create_router(Arc::clone(&app_state));

    let cancel_token = CancellationToken::new();
    tracing::info!(addr = %addr, "statusboard listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    if let Some(viewmodel) = &app_state.viewmodel {
        tracing::info!("Waiting for poller to stop");
        viewmodel.dispose().await;
    }

    tracing::info!("statusboard stopped");
    Ok(())
}
