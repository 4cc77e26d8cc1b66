use anyhow::Result;
use copilot::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
