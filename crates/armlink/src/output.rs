use std::io::{IsTerminal, Write};

use armlink_frame::ArmCommand;
use armlink_node::NodeStats;
use armlink_transport::PortSummary;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    turret: u16,
    shoulder: u16,
    frame: &'a str,
    size: usize,
}

pub fn print_frame(command: &ArmCommand, format: OutputFormat) {
    let frame = command.to_frame();
    let hex = hex_bytes(&frame);
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                turret: command.turret,
                shoulder: command.shoulder,
                frame: &hex,
                size: frame.len(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["TURRET", "SHOULDER", "FRAME"]);
            table.add_row(vec![
                command.turret.to_string(),
                command.shoulder.to_string(),
                hex,
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "turret={} shoulder={} frame={}",
                command.turret, command.shoulder, hex
            );
        }
        OutputFormat::Raw => print_raw(&frame),
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

pub fn print_ports(ports: &[PortSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports
                .iter()
                .map(|port| PortOutput {
                    name: &port.name,
                    kind: port.kind,
                    description: port.description.as_deref(),
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["PORT", "TYPE", "DESCRIPTION"]);
            for port in ports {
                table.add_row(vec![
                    port.name.clone(),
                    port.kind.to_string(),
                    port.description.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for port in ports {
                match &port.description {
                    Some(description) => {
                        println!("{} ({}) {}", port.name, port.kind, description)
                    }
                    None => println!("{} ({})", port.name, port.kind),
                }
            }
        }
        OutputFormat::Raw => {
            for port in ports {
                println!("{}", port.name);
            }
        }
    }
}

pub fn print_stats(stats: &NodeStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ENABLED", "CONNECTED", "SENT", "RECEIVED", "DROPPED"]);
            table.add_row(vec![
                stats.enabled.to_string(),
                stats.connected.to_string(),
                stats.frames_sent.to_string(),
                stats.bytes_received.to_string(),
                stats.bytes_dropped.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "enabled={} connected={} frames_sent={} bytes_received={} bytes_dropped={}",
                stats.enabled,
                stats.connected,
                stats.frames_sent,
                stats.bytes_received,
                stats.bytes_dropped
            );
        }
        OutputFormat::Raw => {}
    }
}

#[derive(Serialize)]
struct ReceivedOutput<'a> {
    received: &'a str,
    size: usize,
}

pub fn print_received(text: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ReceivedOutput {
            received: text,
            size: text.len(),
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["SIZE", "RECEIVED"]);
            table.add_row(vec![text.len().to_string(), text.escape_debug().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("received ({} bytes): {}", text.len(), text.escape_debug()),
        OutputFormat::Raw => print_raw(text.as_bytes()),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Space-separated uppercase hex, e.g. `EA E3 34 12`.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
