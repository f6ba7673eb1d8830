use std::process::ExitCode;

mod cli;
mod platform;

fn main() -> ExitCode {
    match cli::Cli::run_from_args() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("wayback-rescue error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
