use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use apcctl::config::{ConfigFile, DEFAULT_CONFIG_PATH};
use apcctl::status::state_label;
use apcctl::{OUTLET_COUNT, OutletCommand, OutletController, PortNumber};
use clap::{Parser, Subcommand};
use log::warn;

#[derive(Parser, Debug)]
#[command(name = "apcctl", about = "Control APC network power strip", version)]
struct Args {
    /// Point to custom config file
    #[arg(long = "config", value_name = "FILENAME", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Turn port on [defaults to last port if empty]
    On {
        #[arg(allow_negative_numbers = true)]
        port: Option<String>,
    },

    /// Turn port off [defaults to last port if empty]
    Off {
        #[arg(allow_negative_numbers = true)]
        port: Option<String>,
    },

    /// Reset port [defaults to last port if empty]
    Reset {
        #[arg(allow_negative_numbers = true)]
        port: Option<String>,
    },

    /// List all ports, their aliases, and their status
    List,

    /// Set an alias for a port number
    SetAlias { name: String, num: PortNumber },

    /// Remove alias for a port
    RmAlias { name: String },

    /// Set host of APC device via IP address or hostname
    SetHost { hostname: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::On { port } => control(&args.config, port, OutletCommand::On).await,
        Command::Off { port } => control(&args.config, port, OutletCommand::Off).await,
        Command::Reset { port } => control(&args.config, port, OutletCommand::Reset).await,
        Command::List => list(&args.config).await,
        Command::SetAlias { name, num } => {
            let mut config = ConfigFile::load_or_default(&args.config)?;
            eprintln!("Setting alias '{name}'...");
            config.set_alias(num, &name)?;
            config.save()?;
            Ok(())
        }
        Command::RmAlias { name } => {
            let mut config = ConfigFile::load(&args.config)?;
            eprintln!("Removing alias '{name}'...");
            config.rm_alias(&name)?;
            config.save()?;
            Ok(())
        }
        Command::SetHost { hostname } => {
            let mut config = ConfigFile::load_or_default(&args.config)?;
            config.set_host(hostname);
            config.save()?;
            Ok(())
        }
    }
}

async fn control(path: &Path, token: Option<String>, command: OutletCommand) -> Result<()> {
    let mut config = ConfigFile::load(path)?;
    config.check_basic_settings()?;

    let port = config.resolve_port(token.as_deref().unwrap_or(""))?;
    if usize::try_from(port).map_or(true, |p| p == 0 || p > OUTLET_COUNT) {
        warn!("port {port} is outside 1-{OUTLET_COUNT}; the device will likely reject it");
    }

    match command {
        OutletCommand::On => println!("Turning on port: {port}"),
        OutletCommand::Off => println!("Turning off port: {port}"),
        OutletCommand::Reset => println!("Reset port: {port}"),
    }

    let pdu = OutletController::new(config.endpoint())?;
    pdu.control(port, command)
        .await
        .with_context(|| format!("Failed to {command} port {port}"))?;

    config.set_last_port(port);
    config.save()?;
    Ok(())
}

async fn list(path: &Path) -> Result<()> {
    let config = ConfigFile::load(path)?;
    config.check_basic_settings()?;

    let pdu = OutletController::new(config.endpoint())?;
    let status = pdu
        .status()
        .await
        .context("Failed to read outlet status")?;
    let aliases = config.alias_table();

    println!("   Port   Alias                Status");
    for (num, on) in status.iter() {
        let num = PortNumber::try_from(num)?;
        let flag = if config.last_port == Some(num) { "*" } else { " " };
        let name = aliases.name_of(num).unwrap_or("");
        println!("{}  {}:     {:<20} {:>6}", flag, num, name, state_label(on));
    }
    Ok(())
}
