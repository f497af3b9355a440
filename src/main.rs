mod app;
mod cli;

use clap::Parser;
use cli::{AnalyzeArgs, Cli, Command, CommonArgs, RunArgs};
use ecolens_core::config::Config;
use ecolens_server::translator::RequestTranslator;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Parse an empty arg list so env fallbacks still apply to the default command.
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(RunArgs::parse_from(["ecolens"])));

    match command {
        Command::Run(args) => cmd_run(args),
        Command::Analyze(args) => cmd_analyze(args),
        Command::Profiles(args) => cmd_profiles(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let loaded = app::load_config(&args.common.config)?;

    let _guard = ecolens_core::lifecycle::logging::init_logging(
        &args.common.log_level,
        loaded.config.logging_to_file,
        loaded.config.log_dir.as_deref(),
    );
    if loaded.defaulted {
        tracing::warn!(
            "Config file '{}' not found, using defaults",
            args.common.config
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let application = app::Application::build(&args, loaded.config)?;
        application.serve().await
    })
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let loaded = app::load_config(&args.common.config)?;
    let _guard = ecolens_core::lifecycle::logging::init_logging(&args.common.log_level, false, None);

    let config = loaded.config.with_api_key(args.common.api_key.clone());
    let executor = ecolens_provider::build_executor(&config)?;
    let translator = RequestTranslator::new(Arc::new(config), executor);

    let body = serde_json::json!({
        "productName": args.product,
        "ingredientsText": args.ingredients,
    })
    .to_string();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let value = runtime.block_on(translator.translate(args.profile.as_deref(), body.as_bytes()))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_profiles(args: CommonArgs) -> anyhow::Result<()> {
    let config: Config = app::load_config(&args.config)?.config;
    for name in config.profile_names() {
        let Some(profile) = config.profile(name) else {
            continue;
        };
        let marker = if name == config.default_profile { "*" } else { " " };
        println!(
            "{marker} {name:<20} model={:<24} temperature={:.1} max-tokens={} json-mode={}",
            profile.model.as_deref().unwrap_or(&config.upstream.model),
            profile.temperature,
            profile
                .max_tokens
                .map_or_else(|| "-".to_string(), |t| t.to_string()),
            profile.json_mode,
        );
    }
    Ok(())
}
