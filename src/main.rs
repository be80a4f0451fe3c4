#[tokio::main]
async fn main() -> anyhow::Result<()> {
    patient_api::run().await
}
