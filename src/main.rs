#[tokio::main]
async fn main() {
    parish_backend::run().await;
}
