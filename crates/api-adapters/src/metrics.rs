//! Prometheus request metrics.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
struct RequestLabels {
    method: String,
    status: String,
}

/// Registry with a request counter labelled by method and status class.
#[derive(Debug)]
pub struct HttpMetrics {
    registry: Registry,
    requests: Family<RequestLabels, Counter>,
}

impl HttpMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("petconnect");
        let requests = Family::<RequestLabels, Counter>::default();
        registry.register(
            "http_requests",
            "HTTP requests served, by method and status class",
            requests.clone(),
        );
        Self { registry, requests }
    }

    pub fn record(&self, method: &str, status: u16) {
        self.requests
            .get_or_create(&RequestLabels {
                method: method.to_owned(),
                status: format!("{}xx", status / 100),
            })
            .inc();
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

impl Default for HttpMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_requests_by_status_class() {
        let metrics = HttpMetrics::new();
        metrics.record("GET", 200);
        metrics.record("GET", 204);
        metrics.record("POST", 404);

        let body = metrics.render().unwrap();
        assert!(body.contains(r#"petconnect_http_requests_total{method="GET",status="2xx"} 2"#));
        assert!(body.contains(r#"petconnect_http_requests_total{method="POST",status="4xx"} 1"#));
        assert!(body.ends_with("# EOF\n"));
    }
}
