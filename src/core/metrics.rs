use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_quiz_attempt(mode: &'static str) {
    metrics::counter!("quiz_attempts_recorded_total", "mode" => mode).increment(1);
}

pub(crate) fn record_badges_awarded(source: &'static str, count: usize) {
    if count == 0 {
        return;
    }
    metrics::counter!("badges_awarded_total", "source" => source).increment(count as u64);
}

pub(crate) fn record_reading_seconds(seconds: i64) {
    metrics::counter!("reading_seconds_recorded_total").increment(seconds.max(0) as u64);
}
