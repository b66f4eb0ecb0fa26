use std::process::ExitCode;

use env_logger::Env;

use patchset::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
