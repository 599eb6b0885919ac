#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = ilaw_rust::run().await {
        eprintln!("ilaw-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
