mod cli;
mod commands;
mod store;

use std::process::ExitCode;

use neonvibe_config::NeonvibeConfig;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use cli::Command;
use commands::GenerateOptions;
use store::SessionStore;

const DEFAULT_DIRECTIVE: &str = "neonvibe=info";

fn init_logging(directive: &str) {
    let directive: Directive = directive.parse().unwrap_or_else(|_| {
        eprintln!("invalid log level '{directive}', using {DEFAULT_DIRECTIVE}");
        DEFAULT_DIRECTIVE
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into())
    });
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = neonvibe_config::load_config_from(args.config.as_deref());
    let directive = match (&args.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.level.as_directive().to_string(),
        (None, Err(_)) => DEFAULT_DIRECTIVE.to_string(),
    };
    init_logging(&directive);

    tracing::debug!("NeonVibe v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) if args.config.is_some() => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::warn!("Config load failed, using defaults: {e}");
            NeonvibeConfig::default()
        }
    };

    let store = match SessionStore::from_config(&config.storage) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Command::Generate {
            prompt,
            session,
            out,
            provider,
            model,
        } => {
            let opts = GenerateOptions {
                prompt,
                session,
                out,
                provider,
                model,
            };
            let config_path = args
                .config
                .clone()
                .or_else(|| neonvibe_config::toml_loader::default_config_path().ok());
            commands::generate(&config, config_path.as_deref(), &store, opts).await
        }
        Command::Sessions => commands::list_sessions(&store).map(|()| ExitCode::SUCCESS),
        Command::Show { id } => commands::show_session(&store, &id).map(|()| ExitCode::SUCCESS),
        Command::Delete { id } => commands::delete_session(&store, &id).map(|()| ExitCode::SUCCESS),
        Command::Export { id, zip } => {
            commands::export_session(&store, &id, zip).map(|()| ExitCode::SUCCESS)
        }
        Command::Config {
            provider,
            model,
            api_key,
        } => {
            let update = commands::ConfigUpdate {
                provider,
                model,
                api_key,
            };
            commands::config(config, args.config.as_deref(), &store, update)
                .map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
