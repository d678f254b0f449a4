use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();
    plot_server::init_tracing();

    if let Err(e) = plot_server::run().await {
        tracing::error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}
