use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    leadgress::cli::run().await?;
    Ok(())
}
