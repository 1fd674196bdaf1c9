//! Hand-rolled Prometheus text exposition primitives: the wire format is
//! simple enough that writing it directly avoids a dependency whose only
//! job here is string formatting.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Accumulates `# HELP` / `# TYPE` / sample lines in declaration order and
/// renders them as `text/plain; version=0.0.4` body.
#[derive(Default)]
pub struct Exposition {
    lines: Vec<String>,
}

impl Exposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(mut self, name: &str, help: &str, value: u64) -> Self {
        self.lines.push(format!("# HELP {name} {help}"));
        self.lines.push(format!("# TYPE {name} counter"));
        self.lines.push(format!("{name} {value}"));
        self
    }

    pub fn gauge(mut self, name: &str, help: &str, value: u64) -> Self {
        self.lines.push(format!("# HELP {name} {help}"));
        self.lines.push(format!("# TYPE {name} gauge"));
        self.lines.push(format!("{name} {value}"));
        self
    }

    /// Emits one gauge family with multiple labeled samples, e.g.
    /// `replicator_jobs_by_status{status="queued"} 3`.
    pub fn labeled_gauge_family(mut self, name: &str, help: &str, samples: &[(&str, &str, u64)]) -> Self {
        self.lines.push(format!("# HELP {name} {help}"));
        self.lines.push(format!("# TYPE {name} gauge"));
        for (label, value_label, value) in samples {
            self.lines.push(format!("{name}{{{label}=\"{value_label}\"}} {value}"));
        }
        self
    }

    pub fn render(self) -> String {
        let mut body = self.lines.join("\n");
        body.push('\n');
        body
    }
}

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_accumulates() {
        let c = Counter::default();
        c.inc();
        c.inc_by(4);
        assert_eq!(c.get(), 5);
    }

    #[test]
    fn renders_expected_text_shape() {
        let body = Exposition::new()
            .counter("replicator_jobs_total", "Total jobs", 3)
            .render();
        assert_eq!(
            body,
            "# HELP replicator_jobs_total Total jobs\n# TYPE replicator_jobs_total counter\nreplicator_jobs_total 3\n"
        );
    }

    #[test]
    fn renders_labeled_family() {
        let body = Exposition::new()
            .labeled_gauge_family(
                "replicator_jobs_by_status",
                "Jobs by status",
                &[("status", "queued", 2), ("status", "failed", 1)],
            )
            .render();
        assert!(body.contains("replicator_jobs_by_status{status=\"queued\"} 2"));
        assert!(body.contains("replicator_jobs_by_status{status=\"failed\"} 1"));
    }
}
