#[tokio::main]
async fn main() -> anyhow::Result<()> {
    knowbatch_server::start().await
}
