use prometheus::core::Collector;
use prometheus::{opts, Counter, CounterVec, Encoder, Gauge, GaugeVec, Registry, TextEncoder};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Service self-metrics. Nothing about the host is kept here; snapshots are
/// only counted and timed.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    started_at: Instant,
    pub hostsnap_snapshot_requests_total: CounterVec,
    pub hostsnap_snapshot_build_seconds: GaugeVec,
    pub hostsnap_provider_errors_total: CounterVec,
    pub hostsnap_scrape_count_total: Counter,
    pub hostsnap_uptime_seconds: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let hostsnap_snapshot_requests_total = CounterVec::new(
            opts!(
                "hostsnap_snapshot_requests_total",
                "Snapshot requests served, by snapshot kind"
            ),
            &["kind"],
        )?;
        let hostsnap_snapshot_build_seconds = GaugeVec::new(
            opts!(
                "hostsnap_snapshot_build_seconds",
                "Duration of the last snapshot build in seconds, by snapshot kind"
            ),
            &["kind"],
        )?;
        let hostsnap_provider_errors_total = CounterVec::new(
            opts!(
                "hostsnap_provider_errors_total",
                "Provider calls that failed and were replaced by zero values, by call"
            ),
            &["call"],
        )?;
        let hostsnap_scrape_count_total = Counter::with_opts(opts!(
            "hostsnap_scrape_count_total",
            "Number of /metrics scrapes"
        ))?;
        let hostsnap_uptime_seconds = Gauge::with_opts(opts!(
            "hostsnap_uptime_seconds",
            "Seconds since the service started"
        ))?;

        register(&registry, &hostsnap_snapshot_requests_total)?;
        register(&registry, &hostsnap_snapshot_build_seconds)?;
        register(&registry, &hostsnap_provider_errors_total)?;
        register(&registry, &hostsnap_scrape_count_total)?;
        register(&registry, &hostsnap_uptime_seconds)?;

        Ok(Arc::new(Self {
            registry,
            started_at: Instant::now(),
            hostsnap_snapshot_requests_total,
            hostsnap_snapshot_build_seconds,
            hostsnap_provider_errors_total,
            hostsnap_scrape_count_total,
            hostsnap_uptime_seconds,
        }))
    }

    pub fn observe_snapshot(&self, kind: &str, took: Duration) {
        self.hostsnap_snapshot_requests_total
            .with_label_values(&[kind])
            .inc();
        self.hostsnap_snapshot_build_seconds
            .with_label_values(&[kind])
            .set(took.as_secs_f64());
    }

    pub fn inc_provider_error(&self, call: &str) {
        self.hostsnap_provider_errors_total
            .with_label_values(&[call])
            .inc();
    }

    pub fn inc_scrape_count(&self) {
        self.hostsnap_scrape_count_total.inc();
    }

    pub fn encode_metrics(&self) -> Result<Vec<u8>, prometheus::Error> {
        self.hostsnap_uptime_seconds
            .set(self.started_at.elapsed().as_secs_f64());

        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        let mf = self.registry.gather();
        encoder.encode(&mf, &mut buf)?;
        Ok(buf)
    }
}

fn register<T: Collector + Clone + 'static>(
    registry: &Registry,
    collector: &T,
) -> Result<(), prometheus::Error> {
    registry.register(Box::new(collector.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_are_labelled_by_call() {
        let metrics = Metrics::new().expect("инициализация метрик");
        metrics.inc_provider_error("process_name");
        metrics.inc_provider_error("process_name");
        metrics.observe_snapshot("process", Duration::from_millis(5));

        let text = String::from_utf8(metrics.encode_metrics().unwrap()).unwrap();
        assert!(text.contains("hostsnap_provider_errors_total{call=\"process_name\"} 2"));
        assert!(text.contains("hostsnap_snapshot_requests_total{kind=\"process\"} 1"));
        assert!(text.contains("hostsnap_uptime_seconds"));
    }
}
