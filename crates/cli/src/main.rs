use std::process::ExitCode;

fn main() -> ExitCode {
    retrieval_ask_cli::run()
}
