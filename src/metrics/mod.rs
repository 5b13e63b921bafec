// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub use server::start_metrics_server;

use crate::utils::CircuitState;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// - HTTP traffic per route
// - Orders placed and paid
// - Outbox relay deliveries, failures and dead letters
// - Mail transport circuit breaker state
//
// Scraped from the separate metrics server at /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // HTTP
    pub http_requests: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Orders
    pub orders_placed: IntCounter,
    pub orders_paid: IntCounter,

    // Outbox relay
    pub outbox_delivered: IntCounterVec,
    pub outbox_failed: IntCounterVec,
    pub outbox_dead_lettered: IntCounterVec,
    pub outbox_backlog: IntGauge,
    pub mails_sent: IntCounterVec,

    // Circuit breaker
    pub circuit_breaker_state: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests served"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request latency")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["route"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        let orders_placed = IntCounter::new("orders_placed_total", "Orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let orders_paid = IntCounter::new("orders_paid_total", "Orders marked as paid")?;
        registry.register(Box::new(orders_paid.clone()))?;

        let outbox_delivered = IntCounterVec::new(
            Opts::new("outbox_delivered_total", "Outbox messages delivered"),
            &["event_type"],
        )?;
        registry.register(Box::new(outbox_delivered.clone()))?;

        let outbox_failed = IntCounterVec::new(
            Opts::new("outbox_failed_total", "Outbox delivery attempts that failed"),
            &["event_type"],
        )?;
        registry.register(Box::new(outbox_failed.clone()))?;

        let outbox_dead_lettered = IntCounterVec::new(
            Opts::new("outbox_dead_lettered_total", "Outbox messages moved to dead letter"),
            &["event_type"],
        )?;
        registry.register(Box::new(outbox_dead_lettered.clone()))?;

        let outbox_backlog = IntGauge::new("outbox_backlog", "Undelivered messages seen in the last poll")?;
        registry.register(Box::new(outbox_backlog.clone()))?;

        let mails_sent = IntCounterVec::new(
            Opts::new("mails_sent_total", "E-mails handed to the transport"),
            &["template"],
        )?;
        registry.register(Box::new(mails_sent.clone()))?;

        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Mail circuit breaker state (0=closed, 1=open, 2=half-open)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_request_duration,
            orders_placed,
            orders_paid,
            outbox_delivered,
            outbox_failed,
            outbox_dead_lettered,
            outbox_backlog,
            mails_sent,
            circuit_breaker_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_http_request(&self, method: &str, route: &str, status: u16, seconds: f64) {
        self.http_requests
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.http_request_duration
            .with_label_values(&[route])
            .observe(seconds);
    }

    pub fn record_delivered(&self, event_type: &str, mails: usize) {
        self.outbox_delivered.with_label_values(&[event_type]).inc();
        tracing::debug!(event_type = event_type, mails = mails, "Recorded outbox delivery");
    }

    pub fn record_failed(&self, event_type: &str) {
        self.outbox_failed.with_label_values(&[event_type]).inc();
    }

    pub fn record_dead_lettered(&self, event_type: &str) {
        self.outbox_dead_lettered.with_label_values(&[event_type]).inc();
    }

    pub fn record_mail_sent(&self, template: &str) {
        self.mails_sent.with_label_values(&[template]).inc();
    }

    pub fn set_circuit_state(&self, state: CircuitState) {
        self.circuit_breaker_state.set(state.as_gauge());
    }
}
