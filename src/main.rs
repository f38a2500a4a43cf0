use prefixwind::run_from_env;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_from_env().await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
