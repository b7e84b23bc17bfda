use anyhow::Context;
use waitlist::{config::AppConfig, App};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        waitlist::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        waitlist::init_dbg_tracing();
    }

    let config = AppConfig::load().context("failed to load the configuration")?;
    let app = App::build_from_config(config)
        .await
        .context("failed to build the app")?;

    waitlist::serve(app).await?;

    Ok(())
}
