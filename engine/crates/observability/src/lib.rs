use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Timing of one save or load, reported through `tracing`.
#[derive(Debug, Clone)]
pub struct SnapshotMetrics {
    pub operation: &'static str,
    pub duration_us: u128,
    pub bytes: usize,
    pub entity_count: usize,
}

impl SnapshotMetrics {
    /// Saves and loads slower than this are logged as warnings.
    pub const BUDGET_US: u128 = 50_000;

    pub fn over_budget(&self) -> bool {
        self.duration_us > Self::BUDGET_US
    }

    pub fn log(&self) {
        if self.over_budget() {
            tracing::warn!(
                operation = self.operation,
                duration_us = self.duration_us,
                bytes = self.bytes,
                entities = self.entity_count,
                "snapshot {} exceeded budget ({}us > {}us)",
                self.operation,
                self.duration_us,
                Self::BUDGET_US
            );
        } else {
            tracing::info!(
                operation = self.operation,
                duration_us = self.duration_us,
                bytes = self.bytes,
                entities = self.entity_count,
                "snapshot {} completed",
                self.operation
            );
        }
    }
}
