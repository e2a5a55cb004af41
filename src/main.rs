use clap::Parser;
use logwise::privacy::LogIt;
use std::time::Duration;
use weather_server::registry::ServerInfo;
use weather_server::stdio::Server;
use weather_server::weather::{self, WeatherConfig};

/// Serve simulated weather tools to an MCP client over stdin/stdout.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Milliseconds each weather lookup blocks before answering.
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
}

fn main() {
    let args = Args::parse();
    let config = WeatherConfig {
        latency: Duration::from_millis(args.latency_ms),
    };
    let registry = match weather::registry(ServerInfo::default(), &config) {
        Ok(registry) => registry,
        Err(e) => {
            logwise::error_sync!("invalid registry: {error}", error = LogIt(&e));
            std::process::exit(1);
        }
    };

    eprintln!("Weather MCP server running on stdio");
    if let Err(e) = Server::new(&registry).run() {
        logwise::error_sync!("transport failed: {error}", error = LogIt(&e));
        std::process::exit(1);
    }
}
