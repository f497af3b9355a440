use axum::http::HeaderMap;
use std::time::Instant;

/// Per-request metadata for logging, inserted as an axum `Extension`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// UUID v4.
    pub request_id: String,
    pub start_time: Instant,
    /// First `x-forwarded-for` hop, else `x-real-ip`.
    pub client_ip: Option<String>,
}

impl RequestContext {
    pub fn new(client_ip: Option<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            start_time: Instant::now(),
            client_ip,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let client_ip = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| header("x-real-ip").map(str::to_string));
        Self::new(client_ip)
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_from_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.client_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(ctx.request_id.len(), 36);
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(
            RequestContext::from_headers(&headers).client_ip.as_deref(),
            Some("10.0.0.2")
        );
        assert!(RequestContext::from_headers(&HeaderMap::new()).client_ip.is_none());
    }
}
