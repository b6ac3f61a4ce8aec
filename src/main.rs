use cidade_conectada::cli::{Cli, Commands};
use cidade_conectada::types::config::Config;
use cidade_conectada::CidadeResult;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> CidadeResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|e| {
            eprintln!("Aviso: {} ({}), usando padrões", e, cli.config.display());
            Config::default_config()
        })
    } else {
        Config::load_or_default()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("cidade_conectada={}", log_level)
            .parse()
            .unwrap_or_else(|_| {
                "cidade_conectada=info"
                    .parse()
                    .expect("fallback directive is valid")
            }),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            cidade_conectada::cli::commands::init(path).await?;
        }
        Commands::Config => {
            cidade_conectada::cli::commands::config_cmd(&cli.config).await?;
        }
        Commands::Preload {
            urls,
            file,
            json,
            max_concurrent,
        } => {
            cidade_conectada::cli::commands::preload(urls, file, json, max_concurrent, &config)
                .await?;
        }
        Commands::Version => {
            cidade_conectada::cli::commands::version();
        }
    }

    Ok(())
}
