pub mod common;
pub mod openai_compat;

use ecolens_core::config::Config;
use ecolens_core::provider::CompletionExecutor;
use std::sync::Arc;

/// Build the completion executor for a config: one shared HTTP client,
/// honouring `proxy-url`.
pub fn build_executor(config: &Config) -> anyhow::Result<Arc<dyn CompletionExecutor>> {
    let client = ecolens_core::proxy::build_http_client(config.proxy_url.as_deref())?;
    Ok(Arc::new(openai_compat::OpenAICompatExecutor::new(
        client,
        &config.upstream,
    )))
}
