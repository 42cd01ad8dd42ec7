use std::ffi::OsString;
use std::process::ExitCode;

use sd::dispatch::{Dispatcher, Exec};
use sd::env::{Environment, ProcessEnvironment};
use sd::flags::RuntimeFlags;
use sd::{Sd, SdError, logger, theme};

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let flags = RuntimeFlags::prescan(args.iter().cloned());
    let env = ProcessEnvironment;

    let filter = logger::level_filter(flags.debug, env.var("RUST_LOG").as_deref());
    if let Err(e) = logger::init(filter) {
        eprintln!("{} {e}", theme::error_prefix());
    }

    match run(args, flags, &env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(SdError::Cli(e)) => e.exit(),
        Err(e) => {
            log::debug!("Error running command: {e:?}");
            eprintln!("{} {e}", theme::error_prefix());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<OsString>, flags: RuntimeFlags, env: &ProcessEnvironment) -> Result<(), SdError> {
    let sd = Sd::load(flags, env)?;
    let dispatcher = Dispatcher::new(env, &Exec);
    sd.run(args, &dispatcher, &mut std::io::stdout().lock())
}
