use clap::Parser;
use hermes::cli::{Cli, Commands};
use hermes::types::config::Config;
use hermes::HermesResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> HermesResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|_| Config::default_config())
    } else {
        Config::default_config()
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
        format!("hermes={}", log_level)
            .parse()
            .unwrap_or_else(|_| "hermes=info".parse().expect("fallback directive is valid")),
    );

    let json = config.general.log_format == "json";
    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            hermes::cli::commands::init(path).await?;
        }
        Commands::Ask { message } => {
            hermes::cli::commands::ask(&message, &config).await?;
        }
        Commands::Chat => {
            hermes::cli::commands::chat(&config).await?;
        }
        Commands::Analyze => {
            hermes::cli::commands::analyze(&config).await?;
        }
        Commands::Knowledge { limit } => {
            hermes::cli::commands::knowledge(limit, &config).await?;
        }
        Commands::Status => {
            hermes::cli::commands::status(&config).await?;
        }
        Commands::Export { output } => {
            hermes::cli::commands::export_knowledge(&output, &config).await?;
        }
        Commands::Import { input } => {
            hermes::cli::commands::import_knowledge(&input, &config).await?;
        }
        Commands::Config => {
            hermes::cli::commands::config_cmd(&cli.config).await?;
        }
        Commands::Version => {
            hermes::cli::commands::version();
        }
    }

    Ok(())
}
