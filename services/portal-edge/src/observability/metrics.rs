//! Edge Metrics
//!
//! Prometheus counters for guard decisions and proxied calls, registered on a
//! per-process registry and rendered in text format at `/metrics`.

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

const NAMESPACE: &str = "portal_edge";

/// Guard and proxy metrics
#[derive(Clone)]
pub struct EdgeMetrics {
    registry: Registry,
    /// Guard decisions by outcome
    pub guard_decisions: CounterVec,
    /// Proxied requests by method and relayed status
    pub proxy_requests: CounterVec,
    /// Time spent waiting on the origin
    pub upstream_latency: HistogramVec,
}

impl EdgeMetrics {
    /// Creates metrics on a fresh registry
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Creates metrics registered on `registry`
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let guard_decisions = CounterVec::new(
            Opts::new("guard_decisions_total", "Access guard decisions").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(guard_decisions.clone()))?;

        let proxy_requests = CounterVec::new(
            Opts::new("proxy_requests_total", "Requests forwarded to the origin")
                .namespace(NAMESPACE),
            &["method", "status"],
        )?;
        registry.register(Box::new(proxy_requests.clone()))?;

        let upstream_latency = HistogramVec::new(
            HistogramOpts::new("proxy_upstream_seconds", "Origin round-trip time in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method"],
        )?;
        registry.register(Box::new(upstream_latency.clone()))?;

        Ok(Self {
            registry,
            guard_decisions,
            proxy_requests,
            upstream_latency,
        })
    }

    /// Records a guard decision
    pub fn record_decision(&self, outcome: &str) {
        self.guard_decisions.with_label_values(&[outcome]).inc();
    }

    /// Records a proxied request and its origin latency
    pub fn record_proxy(&self, method: &str, status: u16, latency_secs: f64) {
        self.proxy_requests
            .with_label_values(&[method, &status.to_string()])
            .inc();
        self.upstream_latency
            .with_label_values(&[method])
            .observe(latency_secs);
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for EdgeMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeMetrics").finish_non_exhaustive()
    }
}
