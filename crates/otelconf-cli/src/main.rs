mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::compile::OutputFormat;
use commands::ManifestArgs;

#[derive(Parser)]
#[command(
    name = "otelconf",
    version,
    about = "Compile operator properties into an OpenTelemetry collector configuration"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile properties into a collector configuration document
    Compile {
        /// Path to the properties YAML file
        #[arg(long)]
        properties: PathBuf,
        #[command(flatten)]
        manifest: ManifestArgs,
        /// Deployment config directory holding `certs/`
        #[arg(long)]
        config_dir: Option<PathBuf>,
        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Compile properties and report whether they are valid
    Check {
        /// Path to the properties YAML file
        #[arg(long)]
        properties: PathBuf,
        #[command(flatten)]
        manifest: ManifestArgs,
    },
    /// List the component types included in the distribution
    Components {
        #[command(flatten)]
        manifest: ManifestArgs,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Compile {
            properties,
            manifest,
            config_dir,
            output,
            format,
        } => commands::compile::execute(
            &properties,
            &manifest,
            config_dir,
            output.as_deref(),
            format,
        ),
        Commands::Check {
            properties,
            manifest,
        } => commands::check::execute(&properties, &manifest),
        Commands::Components { manifest, json } => commands::components::execute(&manifest, json),
    }
}
