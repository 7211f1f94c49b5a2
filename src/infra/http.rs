use std::time::Duration;

use reqwest::RequestBuilder;

/// Build a reqwest client with sane defaults for the Azure DevOps REST API.
pub fn make_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client")
}

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("ado-{}-{}", now.as_secs(), now.subsec_nanos())
}

/// Add standard headers to an outgoing request. Returns the updated builder
/// and the request id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let b = builder.header("x-request-id", rid.as_str()).header(
        reqwest::header::USER_AGENT,
        format!("azure-devops-mcp/{}", env!("CARGO_PKG_VERSION")),
    );
    (b, rid)
}

#[cfg(test)]
mod tests {
    #[test]
    fn request_ids_carry_the_prefix() {
        let rid = super::generate_request_id();
        assert!(rid.starts_with("ado-"));
    }
}
