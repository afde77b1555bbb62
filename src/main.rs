#[tokio::main]
async fn main() {
    // Load .env for local development before logging reads RUST_LOG.
    let _ = dotenvy::dotenv();
    env_logger::init();

    if let Err(e) = visapath_lib::run().await {
        eprintln!("Error running application: {}", e);
        std::process::exit(1);
    }
}
