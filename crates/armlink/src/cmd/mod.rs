use clap::{Args, Subcommand};
use std::path::PathBuf;

use armlink_node::NodeConfig;

use crate::exit::{node_error, CliResult};
use crate::output::OutputFormat;

pub mod encode;
pub mod ports;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Forward JSON arm commands read from stdin, one per line.
    Run(RunArgs),
    /// Send a single arm command.
    Send(SendArgs),
    /// Print the wire frame for a command without opening a device.
    Encode(EncodeArgs),
    /// List serial ports on this host.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the controller board is attached.
#[derive(Args, Debug, Default)]
pub struct LinkArgs {
    /// Serial device path or serial://path[:baud] URL [default: /dev/ttyUSB2].
    #[arg(long, env = "ARMLINK_SERIAL_PORT")]
    pub serial_port: Option<String>,
    /// Baud rate [default: 9600].
    #[arg(long, env = "ARMLINK_BAUDRATE")]
    pub baudrate: Option<u32>,
    /// JSON config file; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Stop accumulating received bytes past this many.
    #[arg(long, value_name = "BYTES")]
    pub receive_limit: Option<usize>,
}

impl LinkArgs {
    /// Layer defaults, then the config file, then flags.
    pub fn resolve(&self) -> CliResult<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_json_file(path)
                .map_err(|err| node_error("config load failed", err))?,
            None => NodeConfig::default(),
        };
        if let Some(serial_port) = &self.serial_port {
            config.serial_port = serial_port.clone();
        }
        if let Some(baudrate) = self.baudrate {
            config.baudrate = baudrate;
        }
        if self.receive_limit.is_some() {
            config.receive_limit = self.receive_limit;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Print everything received from the board on exit.
    #[arg(long)]
    pub dump_received: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Turret position.
    #[arg(long, short = 't')]
    pub turret: u16,
    /// Shoulder position.
    #[arg(long, short = 's')]
    pub shoulder: u16,
    /// Keep the link open this long and print what the board sends back (e.g. 500ms, 2s).
    #[arg(long, value_name = "DURATION")]
    pub listen: Option<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Turret position.
    #[arg(long, short = 't')]
    pub turret: u16,
    /// Shoulder position.
    #[arg(long, short = 's')]
    pub shoulder: u16,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
