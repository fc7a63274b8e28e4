use std::process::ExitCode;

fn main() -> ExitCode {
    jobshell::cli::run()
}
