use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use takshark::input::collect_inputs;
use takshark::render::{render, OutputFormat};
use takshark::{dissector_from_config, listen, logging};
use takshark_core::AppConfig;
use takshark_dissect::Transport;
use tracing::{debug, info};

/// takshark - TAK, CoT and OMNI traffic decoder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode captured payloads given as hex or files
    Decode(DecodeArgs),
    /// Decode live traffic on the configured ports
    Listen(ListenArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Payload as hex, may be repeated
    #[arg(long = "hex", value_name = "HEX")]
    hex: Vec<String>,

    /// Files holding raw payload bytes
    files: Vec<PathBuf>,

    /// Treat each input as a TCP stream segment and decode every message in it
    #[arg(long)]
    stream: bool,

    /// Attach the raw field map to decoded records
    #[arg(long)]
    raw: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, env = "TAKSHARK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ListenArgs {
    /// Path to configuration file
    #[arg(short, long, env = "TAKSHARK_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = AppConfig::from_config_builder(path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Decode(args) => {
            let mut config = load_config(args.config.as_ref())?;
            logging::init(&config.logging)?;
            if args.raw {
                config.dissect.raw_fields = true;
            }
            decode(&config, &args)
        }
        Command::Listen(args) => {
            let config = load_config(args.config.as_ref())?;
            logging::init(&config.logging)?;
            info!(
                tak = ?config.ports.tak,
                omni = ?config.ports.omni,
                "starting listeners"
            );
            listen::run(&config, dissector_from_config(&config.dissect), args.output).await
        }
    }
}

fn decode(config: &AppConfig, args: &DecodeArgs) -> Result<()> {
    let dissector = dissector_from_config(&config.dissect);
    let inputs = collect_inputs(&args.hex, &args.files)?;

    for input in inputs {
        debug!(source = %input.label, len = input.bytes.len(), "decoding input");
        let outcomes = if args.stream {
            dissector.dissect_stream(&input.bytes)
        } else {
            vec![dissector.dissect(&input.bytes, Transport::Datagram)]
        };
        for outcome in &outcomes {
            println!("{}", render(&input.label, outcome, args.output));
        }
    }
    Ok(())
}
