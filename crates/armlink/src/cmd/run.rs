use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use armlink_frame::ARM_COMMAND_TOPIC;
use armlink_node::{ArmNode, NodeError};

use crate::cmd::RunArgs;
use crate::exit::{io_error, node_error, CliError, CliResult, SUCCESS};
use crate::output::{print_raw, print_received, print_stats, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.resolve()?;
    let node = ArmNode::new(&config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let lines = spawn_stdin_reader();
    let result = forward_lines(&node, &lines, &running);

    if args.dump_received {
        match format {
            OutputFormat::Raw => print_raw(&node.received_bytes()),
            _ => print_received(&node.received_text(), format),
        }
    }
    print_stats(&node.stats(), format);

    result.map(|forwarded| {
        tracing::info!(forwarded, "command stream finished");
        SUCCESS
    })
}

/// Forward every command line until the stream ends or `running` drops.
///
/// Malformed lines are logged and skipped. Returns the number of commands
/// handed to the node.
fn forward_lines(
    node: &ArmNode,
    lines: &Receiver<std::io::Result<String>>,
    running: &AtomicBool,
) -> CliResult<u64> {
    let mut forwarded = 0u64;

    while running.load(Ordering::SeqCst) {
        let line = match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => line.map_err(|err| io_error("reading commands failed", err))?,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match node.handle_message(line.as_bytes()) {
            Ok(()) => forwarded += 1,
            Err(NodeError::Frame(err)) => {
                tracing::warn!(topic = ARM_COMMAND_TOPIC, error = %err, "skipping malformed command");
            }
            Err(err) => return Err(node_error("forward failed", err)),
        }
    }

    Ok(forwarded)
}

fn spawn_stdin_reader() -> Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
