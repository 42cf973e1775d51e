//! Command line entry point for uncloud

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine, settings then come from the environment only
    dotenvy::dotenv().ok();

    cli::run().await?;
    Ok(())
}
