use clap::Parser;

use design_intake_lib::gateway::GatewayConfig;
use design_intake_lib::server::{self, ServerAppState};

/// Design Intake - guided, AI-assisted product design intake wizard
#[derive(Parser, Debug)]
#[command(name = "design-intake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the server to
    #[arg(long, default_value = "3430", env = "DESIGN_INTAKE_PORT")]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0", env = "DESIGN_INTAKE_BIND")]
    bind: String,

    /// Allowed CORS origins (repeatable). Defaults to permissive when unset.
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = GatewayConfig::from_env();
    let state = ServerAppState::new(config);

    let cors_origins = if cli.cors_origins.is_empty() {
        None
    } else {
        Some(cli.cors_origins)
    };

    server::run_server(cli.port, &cli.bind, state, cors_origins)
        .await
        .map_err(anyhow::Error::msg)
}
