use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the process environment is used as is.
    dotenvy::dotenv().ok();

    services::telemetry::init_tracing("info");

    api::start().await?;

    Ok(())
}
