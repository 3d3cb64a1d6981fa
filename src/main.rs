#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sugarlab_lib::run().await
}
