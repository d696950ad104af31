use armlink_frame::ArmCommand;

use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    print_frame(&ArmCommand::new(args.turret, args.shoulder), format);
    Ok(SUCCESS)
}
