use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if starry_core::entrypoint().await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
