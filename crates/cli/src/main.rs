use clap::Parser;

#[tokio::main]
async fn main() {
    dca_cli::init_tracing();
    if let Err(err) = dca_cli::run(dca_cli::args::Cli::parse()).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
