use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    capmodel_cli::run().await
}
