use std::process::ExitCode;

fn main() -> ExitCode {
    bulksheet_lib::run()
}
