//! Data-plane metric counters: chunk traffic, byte totals, and dedupe
//! outcomes.

use crate::metrics::{Counter, Exposition};

#[derive(Default)]
pub struct DataPlaneMetrics {
    pub chunks_put_total: Counter,
    pub chunks_get_total: Counter,
    pub chunks_head_total: Counter,
    pub bytes_in_total: Counter,
    pub bytes_out_total: Counter,
    pub dedupe_hits_total: Counter,
    pub dedupe_misses_total: Counter,
}

impl DataPlaneMetrics {
    pub fn render(&self) -> String {
        Exposition::new()
            .counter("replicator_chunks_put_total", "Total chunk PUTs", self.chunks_put_total.get())
            .counter("replicator_chunks_get_total", "Total chunk GETs", self.chunks_get_total.get())
            .counter(
                "replicator_chunks_head_total",
                "Total chunk HEAD checks",
                self.chunks_head_total.get(),
            )
            .counter("replicator_bytes_in_total", "Total bytes received by node", self.bytes_in_total.get())
            .counter("replicator_bytes_out_total", "Total bytes sent by node", self.bytes_out_total.get())
            .counter(
                "replicator_dedupe_hits_total",
                "Total dedupe hits (chunk already existed)",
                self.dedupe_hits_total.get(),
            )
            .counter(
                "replicator_dedupe_misses_total",
                "Total dedupe misses (chunk stored)",
                self.dedupe_misses_total.get(),
            )
            .render()
    }
}
