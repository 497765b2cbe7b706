use cardhook::{App, ConfigBuilder, TransactionsModule};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigBuilder::new().from_env().build()?;
    cardhook::init_tracing_with_config(&config);

    tracing::info!(
        credentials = config.credentials.len(),
        "Starting cardhook"
    );

    App::from_config(config)?
        .register_module(TransactionsModule)
        .serve()
        .await?;

    Ok(())
}
