use crate::core::{BatchReport, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitoring: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitoring: bool) -> Self {
        Self {
            pipeline,
            monitoring,
        }
    }

    pub async fn run(&self) -> Result<BatchReport> {
        let mut monitor = PhaseMonitor::new(self.monitoring);
        tracing::info!("Starting ETL process...");

        // Extract
        let extraction = self.pipeline.extract().await?;
        tracing::info!("Extracted {} files", extraction.documents.len());
        monitor.mark("extract");

        // Transform
        let transformed = self.pipeline.transform(extraction).await?;
        tracing::debug!("Transformed {} files", transformed.processed.len());
        monitor.mark("transform");

        // Load
        let report = self.pipeline.load(transformed).await?;
        monitor.mark("load");

        tracing::info!("Processed {}", report.summary());
        monitor.log_final_stats();

        Ok(report)
    }
}
