//! Application struct that encapsulates server assembly and serving logic.

use crate::cli::RunArgs;
use arc_swap::ArcSwap;
use ecolens_core::config::Config;
use ecolens_core::lifecycle::signal::SignalHandler;
use ecolens_core::lifecycle::{self, Lifecycle};
use std::path::Path;
use std::sync::Arc;

pub struct LoadedConfig {
    pub config: Config,
    /// The file was missing and defaults were used.
    pub defaulted: bool,
}

/// Load the YAML config. A missing file yields defaults; an unreadable or
/// invalid file is an error.
pub fn load_config(path: &str) -> anyhow::Result<LoadedConfig> {
    if !Path::new(path).exists() {
        return Ok(LoadedConfig {
            config: Config::default(),
            defaulted: true,
        });
    }
    let config = Config::load(path)
        .map_err(|e| anyhow::anyhow!("failed to load config '{path}': {e}"))?;
    Ok(LoadedConfig {
        config,
        defaulted: false,
    })
}

/// Listen address overrides from the command line. They win over the file on
/// startup and on every reload.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Overrides {
    pub fn from_args(args: &RunArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
        }
    }

    fn apply(&self, config: &mut Config) {
        if let Some(ref host) = self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

pub struct Application {
    config: Arc<ArcSwap<Config>>,
    app_router: axum::Router,
    config_path: String,
    overrides: Overrides,
    api_key: Option<String>,
    lifecycle: Arc<dyn Lifecycle>,
}

impl Application {
    /// Apply CLI overrides, inject the API key, build the executor and router.
    pub fn build(args: &RunArgs, mut config: Config) -> anyhow::Result<Self> {
        let overrides = Overrides::from_args(args);
        overrides.apply(&mut config);

        // The key is read once here and carried across reloads.
        let api_key = args.common.api_key.clone();
        let config = config.with_api_key(api_key.clone());
        if config.api_key.is_none() {
            tracing::warn!("GROQ_API_KEY is not set; analyze requests will fail until it is");
        }

        let executor = ecolens_provider::build_executor(&config)?;

        tracing::info!(
            "Loaded {} profiles (default '{}'), upstream {} model {}",
            config.profiles.len(),
            config.default_profile,
            config.upstream.base_url,
            config.upstream.model,
        );

        let config = Arc::new(ArcSwap::from_pointee(config));
        let state = ecolens_server::AppState {
            config: config.clone(),
            executor,
        };
        let app_router = ecolens_server::build_router(state);

        Ok(Self {
            config,
            app_router,
            config_path: args.common.config.clone(),
            overrides,
            api_key,
            lifecycle: Arc::from(lifecycle::detect_lifecycle()),
        })
    }

    /// Serve HTTP, reload on SIGHUP, and drain on SIGINT/SIGTERM.
    pub async fn serve(self) -> anyhow::Result<()> {
        let Self {
            config,
            app_router,
            config_path,
            overrides,
            api_key,
            lifecycle,
        } = self;

        let (signal_handler, mut shutdown_rx) = SignalHandler::new();

        let reload_config = config.clone();
        let reload_lifecycle = lifecycle.clone();
        let reload_fn = move || {
            reload_lifecycle.on_reloading();
            if let Err(e) = reload(&reload_config, &config_path, &overrides, api_key.clone()) {
                tracing::error!("Config reload failed, keeping previous config: {e}");
            }
            reload_lifecycle.on_reloaded();
        };

        tokio::spawn(async move {
            if let Err(e) = signal_handler.run(reload_fn).await {
                tracing::error!("Signal handler failed: {e}");
            }
        });

        let addr = {
            let cfg = config.load();
            format!("{}:{}", cfg.host, cfg.port)
        };

        tracing::info!("Starting HTTP server on {addr}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        lifecycle.on_ready();

        let shutdown = async move {
            let _ = shutdown_rx.wait_for(|v| *v).await;
        };

        axum::serve(listener, app_router)
            .with_graceful_shutdown(shutdown)
            .await?;

        lifecycle.on_stopping();
        tracing::info!("Server shut down.");
        Ok(())
    }
}

/// Re-read the config file and swap it in. On error the old snapshot stays.
fn reload(
    current: &ArcSwap<Config>,
    path: &str,
    overrides: &Overrides,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let mut new_cfg = Config::load(path)?;
    overrides.apply(&mut new_cfg);
    let new_cfg = new_cfg.with_api_key(api_key);

    let old = current.load();
    // The executor, listener and body limit are built once at startup.
    if new_cfg.upstream.base_url != old.upstream.base_url || new_cfg.proxy_url != old.proxy_url {
        tracing::warn!("upstream base-url / proxy-url changes take effect after restart");
    }
    if new_cfg.host != old.host || new_cfg.port != old.port {
        tracing::warn!("host / port changes take effect after restart");
    }
    if new_cfg.body_limit_kb != old.body_limit_kb {
        tracing::warn!("body-limit-kb changes take effect after restart");
    }

    tracing::info!(
        "Config reloaded: {} profiles (default '{}'), model {}",
        new_cfg.profiles.len(),
        new_cfg.default_profile,
        new_cfg.upstream.model,
    );
    current.store(Arc::new(new_cfg));
    Ok(())
}
