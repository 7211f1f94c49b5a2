use std::sync::Arc;

use clap::Parser;
use rmcp::handler::server::router::Router;
use rmcp::serve_server;

use azure_devops_mcp::cli::{Cli, Commands, Transport};
use azure_devops_mcp::clients::connection::ConnectionProvider;
use azure_devops_mcp::features::{registry, AdoService};
use azure_devops_mcp::infra::{config::AdoConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    if let Some(Commands::CheckConfig) = cli.command {
        return azure_devops_mcp::cli::check_config();
    }

    tracing::info!(transport = ?cli.transport, "BOOT azure-devops-mcp");

    // Configuration is read now but validated lazily: a missing PAT surfaces
    // through the tool error path on first use, not as a startup crash.
    let provider = Arc::new(ConnectionProvider::new(AdoConfig::from_env()));
    let handler = AdoService::new(provider);
    let tools = registry::build_tool_router()?;

    match cli.transport {
        Transport::Stdio => {
            let service = Router::new(handler).with_tools(tools);
            let running = serve_server(service, (tokio::io::stdin(), tokio::io::stdout())).await?;
            running.waiting().await?;
        }
    }
    Ok(())
}
