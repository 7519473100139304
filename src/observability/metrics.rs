use prometheus::{Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_ERROR: &str = "error";
pub const OUTCOME_REMOTE_ERROR: &str = "remote_error";

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_refresh_requests: IntCounterVec,
    pub token_refresh_duration: Histogram,
    pub token_expiry_unix: IntGauge,
    pub token_cache_operations: IntCounterVec,

    // Message metrics
    pub messages_sent: IntCounterVec,
    pub message_send_duration: HistogramVec,
    pub message_token_retries: IntCounter,

    // Media metrics
    pub media_uploads: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("wecomnotify".into()), None).expect("metrics registry");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token
            token_refresh_requests: IntCounterVec::new(Opts::new("token_refresh_requests_total", "Credential exchange calls by outcome"),&["outcome"],).expect("metric definition"),
            token_refresh_duration: Histogram::with_opts(HistogramOpts::new("token_refresh_duration_seconds", "Credential exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),).expect("metric definition"),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the current access token").expect("metric definition"),
            token_cache_operations: IntCounterVec::new(Opts::new("token_cache_operations_total", "Token cache file loads and saves"),&["operation", "outcome"],).expect("metric definition"),

            // Message
            messages_sent: IntCounterVec::new(Opts::new("messages_sent_total", "Message send calls by type and outcome"),&["msgtype", "outcome"],).expect("metric definition"),
            message_send_duration: HistogramVec::new(HistogramOpts::new("message_send_duration_seconds", "Message send round trip seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["msgtype"],).expect("metric definition"),
            message_token_retries: IntCounter::new("message_token_retries_total", "Resends after a token expired/invalid reply").expect("metric definition"),

            // Media
            media_uploads: IntCounterVec::new(Opts::new("media_uploads_total", "Media uploads by type and outcome"),&["type", "outcome"],).expect("metric definition"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_refresh_requests.clone())).expect("metric registration");
        reg.register(Box::new(metrics.token_refresh_duration.clone())).expect("metric registration");
        reg.register(Box::new(metrics.token_expiry_unix.clone())).expect("metric registration");
        reg.register(Box::new(metrics.token_cache_operations.clone())).expect("metric registration");
        reg.register(Box::new(metrics.messages_sent.clone())).expect("metric registration");
        reg.register(Box::new(metrics.message_send_duration.clone())).expect("metric registration");
        reg.register(Box::new(metrics.message_token_retries.clone())).expect("metric registration");
        reg.register(Box::new(metrics.media_uploads.clone())).expect("metric registration");

        metrics
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
