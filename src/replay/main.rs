// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-camera-bridge-replay requires the 'std' feature");

use asimov_camera_bridge::cli::{self, ReplayError, ReplaySession};
use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use std::{
    error::Error as StdError,
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

/// Replays a JSON-lines script of channel calls and native camera events
/// against a camera bridge, printing replies and channel notifications.
#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Platform view id; selects the `plugins/camera_kit_<ID>` channel.
    #[arg(long, value_name = "ID", default_value = "0")]
    view_id: i64,

    /// Treat the camera permission as already granted.
    #[arg(long)]
    granted: bool,

    /// Script to replay; reads standard input when omitted.
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_replay(&options) {
        Ok(()) => EX_OK,
        Err(err) => cli::handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_replay(options: &Options) -> Result<(), ReplayError> {
    let input: Box<dyn BufRead> = match &options.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut session = ReplaySession::new(options.view_id, options.granted)?;
    cli::info_user(
        &options.flags,
        &format!("replaying on channel {}", session.channel_name()),
    );

    let mut out = io::stdout().lock();
    session.run(input, &mut out, |msg| cli::warn_user(&options.flags, msg))
}
