use std::{fs, path::PathBuf};

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Prometheus recorder whose snapshot is dumped to a file when the run ends,
/// in the node-exporter textfile format.
pub struct MetricsTextfile {
    handle: PrometheusHandle,
    path: PathBuf,
}

pub fn init<P: Into<PathBuf>>(path: P) -> anyhow::Result<MetricsTextfile> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus metrics recorder")?;
    Ok(MetricsTextfile {
        handle,
        path: path.into(),
    })
}

impl MetricsTextfile {
    pub fn write(&self) -> anyhow::Result<()> {
        fs::write(&self.path, self.handle.render())
            .with_context(|| format!("failed to write metrics to {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "metrics written");
        Ok(())
    }
}
