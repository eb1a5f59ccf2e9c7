use std::net::SocketAddr;
use std::process;

use clap::Parser;
use spinroom::{ServerConfig, SpinroomServer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "spinroom-server", about = "Real-time random-participant-picker server")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn setup_logger() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "spinroom=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    setup_logger();
    let args = Args::parse();

    let addr: SocketAddr = match format!("{}:{}", args.host, args.port).parse() {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!(%err, "invalid bind address");
            process::exit(1);
        }
    };

    let server = match SpinroomServer::bind(addr, ServerConfig::default()).await {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(%err, %addr, "failed to bind");
            process::exit(1);
        }
    };

    if let Err(err) = server.run().await {
        tracing::error!(%err, "server error");
        process::exit(1);
    }
}
