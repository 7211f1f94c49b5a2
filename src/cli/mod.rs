use clap::{Parser, Subcommand, ValueEnum};

use crate::infra::config::{AdoConfig, ORG_URL_VAR, PAT_VAR};

#[derive(Parser)]
#[command(name = "azure-devops-mcp")]
#[command(about = "Azure DevOps MCP server")]
#[command(version)]
pub struct Cli {
    /// Transport to serve the MCP protocol on.
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Stdio,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate configuration without starting the server
    CheckConfig,
}

/// Report which required settings are missing. The server itself never needs
/// this to start; it exists for operators wiring up credentials.
pub fn check_config() -> anyhow::Result<()> {
    let cfg = AdoConfig::from_env();
    let mut missing = Vec::new();
    if cfg.pat.is_none() {
        missing.push(PAT_VAR);
    }
    if cfg.organization_url.is_none() {
        missing.push(ORG_URL_VAR);
    }
    if missing.is_empty() {
        println!("Configuration is valid");
        Ok(())
    } else {
        anyhow::bail!("missing required environment variables: {}", missing.join(", "))
    }
}
