#[tokio::main]
async fn main() {
    salonbook::init_tracing();

    if let Err(err) = salonbook::run().await {
        tracing::error!("fatal: {err}");
        std::process::exit(1);
    }
}
