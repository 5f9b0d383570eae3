use crate::adapters::sink::DualStreamSink;
use crate::config::{BatchConfig, FaultPolicy};
use crate::core::matcher::MatchClient;
use crate::core::serializer::{render_raw_table, serialize_record};
use crate::domain::model::{MatchOutcome, MatchResult, Target, TargetId};
use crate::domain::ports::CatalogService;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetFailure {
    pub target_id: TargetId,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Targets written to both streams.
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub malformed: usize,
    /// Targets skipped after a service fault; never written.
    pub failures: Vec<TargetFailure>,
}

impl BatchSummary {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            processed: 0,
            matched: 0,
            unmatched: 0,
            malformed: 0,
            failures: Vec::new(),
        }
    }

    fn count(&mut self, outcome: &MatchOutcome) {
        self.processed += 1;
        match outcome {
            MatchOutcome::Matched(_) => self.matched += 1,
            MatchOutcome::Unmatched => self.unmatched += 1,
            MatchOutcome::Malformed { .. } => self.malformed += 1,
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Writes one result to both streams. Both entries are rendered before either
/// is written, so a rendering error cannot leave the streams out of step.
pub fn write_result<C: Write, T: Write>(
    result: &MatchResult,
    sink: &mut DualStreamSink<C, T>,
) -> Result<()> {
    let line = serialize_record(&result.to_record())?;
    let raw = render_raw_table(result.table.as_ref().filter(|t| !t.is_empty()))?;
    sink.append(&result.target_id, &line, &raw)
}

/// Runs targets through the match client one at a time, in input order.
pub struct BatchEngine<S: CatalogService> {
    client: MatchClient<S>,
    options: BatchConfig,
}

impl<S: CatalogService> BatchEngine<S> {
    pub fn new(client: MatchClient<S>, options: BatchConfig) -> Self {
        Self { client, options }
    }

    /// The slice of `targets` this run will visit after `skip` and `limit`.
    pub fn selected<'a>(&self, targets: &'a [Target]) -> &'a [Target] {
        let start = self.options.skip.min(targets.len());
        let end = match self.options.limit {
            Some(limit) => start.saturating_add(limit).min(targets.len()),
            None => targets.len(),
        };
        &targets[start..end]
    }

    /// Both streams are flushed before this returns, whether or not the batch
    /// completed, so output up to a failing target stays on disk.
    pub async fn run<C: Write, T: Write>(
        &self,
        targets: &[Target],
        sink: &mut DualStreamSink<C, T>,
    ) -> Result<BatchSummary> {
        let selected = self.selected(targets);
        let mut summary = BatchSummary::new(Utc::now());

        tracing::info!(
            "Cross-matching {} target(s) ({} skipped)",
            selected.len(),
            targets.len().min(self.options.skip)
        );

        let outcome = self.process_all(selected, sink, &mut summary).await;
        let flushed = sink.flush();
        summary.finished_at = Utc::now();
        outcome?;
        flushed?;

        tracing::info!(
            "Done: {} processed ({} matched, {} unmatched, {} malformed), {} failed in {}s",
            summary.processed,
            summary.matched,
            summary.unmatched,
            summary.malformed,
            summary.failures.len(),
            summary.elapsed().num_seconds()
        );
        Ok(summary)
    }

    async fn process_all<C: Write, T: Write>(
        &self,
        selected: &[Target],
        sink: &mut DualStreamSink<C, T>,
        summary: &mut BatchSummary,
    ) -> Result<()> {
        let total = selected.len();

        for (index, target) in selected.iter().enumerate() {
            tracing::info!("[{}/{}] {}", index + 1, total, target.catalog_id);

            let result = match self.client.find_match(target).await {
                Ok(result) => result,
                Err(e)
                    if e.is_service_fault()
                        && self.options.on_service_fault == FaultPolicy::Skip =>
                {
                    tracing::warn!("{}: skipped after service fault: {}", target.catalog_id, e);
                    summary.failures.push(TargetFailure {
                        target_id: target.catalog_id.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    tracing::error!("{}: aborting batch: {}", target.catalog_id, e);
                    return Err(e);
                }
            };

            write_result(&result, sink)?;
            sink.flush()?;
            summary.count(&result.outcome);
        }

        Ok(())
    }
}
