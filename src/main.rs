//! Binary entrypoint that launches the seedscout server.

use std::process::ExitCode;

use seedscout::startup;

fn main() -> ExitCode {
    startup::run()
}
