//! Environment configuration.
//!
//! The two Azure DevOps settings are captured as raw options and validated on
//! first use inside the connection provider, so a misconfigured server still
//! starts and reports the problem through the normal tool error path.

pub const PAT_VAR: &str = "AZURE_DEVOPS_PAT";
pub const ORG_URL_VAR: &str = "AZURE_DEVOPS_ORGANIZATION_URL";

/// Required Azure DevOps settings, possibly absent.
#[derive(Debug, Clone, Default)]
pub struct AdoConfig {
    pub pat: Option<String>,
    pub organization_url: Option<String>,
}

impl AdoConfig {
    pub fn from_env() -> Self {
        Self {
            pat: read(PAT_VAR),
            organization_url: read(ORG_URL_VAR),
        }
    }

    /// Fixed values, used by tests and by the config checker.
    pub fn new(pat: impl Into<String>, organization_url: impl Into<String>) -> Self {
        Self {
            pat: Some(pat.into()),
            organization_url: Some(organization_url.into()),
        }
    }
}

fn read(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
