use std::time::Duration;

use armlink_frame::ArmCommand;
use armlink_node::ArmNode;

use crate::cmd::SendArgs;
use crate::exit::{node_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR, USAGE};
use crate::output::{print_frame, print_received, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let listen = args.listen.as_deref().map(parse_duration).transpose()?;
    let config = args.link.resolve()?;

    let node = ArmNode::new(&config);
    if !node.is_enabled() {
        return Err(CliError::new(
            TRANSPORT_ERROR,
            format!("arm link unavailable on {}", config.serial_port),
        ));
    }

    let command = ArmCommand::new(args.turret, args.shoulder);
    node.handle_command(&command)
        .map_err(|err| node_error("send failed", err))?;
    print_frame(&command, format);

    if let Some(window) = listen {
        std::thread::sleep(window);
        print_received(&node.received_text(), format);
    }

    Ok(SUCCESS)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
