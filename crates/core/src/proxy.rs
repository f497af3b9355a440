use reqwest::{Client, Proxy};

/// Build the shared outbound HTTP client.
///
/// - `proxy_url` is `Some(url)` with non-empty url → route through it
/// - `None` or `Some("")` → direct connection, system proxy env ignored
///
/// No connect or request timeout is set; a slow upstream is bounded only by
/// whatever the caller or hosting environment enforces.
pub fn build_http_client(proxy_url: Option<&str>) -> Result<Client, anyhow::Error> {
    let mut builder =
        Client::builder().user_agent(concat!("ecolens/", env!("CARGO_PKG_VERSION")));

    match proxy_url {
        Some(url) if !url.is_empty() => {
            let proxy = Proxy::all(url)?; // reqwest auto-detects http/https/socks5
            builder = builder.proxy(proxy);
        }
        _ => builder = builder.no_proxy(),
    }

    Ok(builder.build()?)
}

/// Validate that a proxy URL is well-formed.
pub fn validate_proxy_url(url: &str) -> Result<(), anyhow::Error> {
    if url.is_empty() {
        return Ok(());
    }
    let parsed =
        url::Url::parse(url).map_err(|e| anyhow::anyhow!("invalid proxy URL '{url}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" | "socks5" => Ok(()),
        scheme => Err(anyhow::anyhow!(
            "unsupported proxy scheme '{scheme}' in URL '{url}', expected http/https/socks5"
        )),
    }
}
