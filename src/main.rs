use proventos::{cli::cli, services::shared::logger::init_logger};

async fn run_proventos() -> anyhow::Result<()> {
    init_logger();
    cli().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    run_proventos().await?;
    Ok(())
}
