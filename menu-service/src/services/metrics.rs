//! Prometheus metrics for menu-service.
//!
//! HTTP request metrics are recorded by the shared middleware through the
//! `metrics` facade; menu generation outcomes and upstream latency live in a
//! local `prometheus` registry. `/metrics` renders both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static MENU_GENERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static UPSTREAM_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup; later calls are ignored.
pub fn init_metrics() {
    if REGISTRY.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
    }

    let registry = Registry::new();

    let generations = IntCounterVec::new(
        Opts::new(
            "menu_generations_total",
            "Menu generation requests by outcome",
        ),
        &["outcome"],
    );

    let latency = HistogramVec::new(
        HistogramOpts::new(
            "menu_upstream_latency_seconds",
            "Latency of upstream chat completion calls",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["model"],
    );

    match (generations, latency) {
        (Ok(generations), Ok(latency)) => {
            let registered = registry
                .register(Box::new(generations.clone()))
                .and_then(|_| registry.register(Box::new(latency.clone())));
            if let Err(e) = registered {
                tracing::warn!(error = %e, "Failed to register menu metrics");
                return;
            }
            let _ = MENU_GENERATIONS_TOTAL.set(generations);
            let _ = UPSTREAM_LATENCY_SECONDS.set(latency);
            let _ = REGISTRY.set(registry);
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Failed to create menu metrics");
        }
    }
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    if let Some(registry) = REGISTRY.get() {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&registry.gather(), &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record the outcome of one `/generate_menu` call.
pub fn record_generation(outcome: &str) {
    if let Some(counter) = MENU_GENERATIONS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_upstream_latency(model: &str, seconds: f64) {
    if let Some(histogram) = UPSTREAM_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[model]).observe(seconds);
    }
}
