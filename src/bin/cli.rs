use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    docsnap::cli::run().await
}
