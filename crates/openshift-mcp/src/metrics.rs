use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Label for names that are not in the tool registry.
pub const UNKNOWN_TOOL: &str = "unknown";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref TOOL_INVOCATIONS_TOTAL: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new(
                "openshift_mcp_tool_invocations_total",
                "Total number of tool invocations by outcome.",
            ),
            &["tool", "outcome"],
        )
        .unwrap();
        REGISTRY.register(Box::new(counter.clone())).unwrap();
        counter
    };
    pub static ref TOOL_DURATION_SECONDS: HistogramVec = {
        let histogram = HistogramVec::new(
            HistogramOpts::new(
                "openshift_mcp_tool_duration_seconds",
                "Time spent in cluster and LLM gateway calls.",
            ),
            &["tool"],
        )
        .unwrap();
        REGISTRY.register(Box::new(histogram.clone())).unwrap();
        histogram
    };
}

// Metrics register themselves on first use; this forces it so /metrics lists
// them before the first invocation.
pub fn register_metrics() {
    lazy_static::initialize(&TOOL_INVOCATIONS_TOTAL);
    lazy_static::initialize(&TOOL_DURATION_SECONDS);
}

pub fn record_invocation(tool: &str, success: bool, elapsed: Option<Duration>) {
    let outcome = if success { "success" } else { "error" };
    TOOL_INVOCATIONS_TOTAL
        .with_label_values(&[tool, outcome])
        .inc();
    if let Some(elapsed) = elapsed {
        TOOL_DURATION_SECONDS
            .with_label_values(&[tool])
            .observe(elapsed.as_secs_f64());
    }
}

// Function to gather metrics for exposition
pub fn gather_metrics() -> crate::Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| crate::Error::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| crate::Error::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}
