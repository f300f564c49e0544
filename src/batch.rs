//! Sequential batch generation.
//!
//! Records are processed strictly in input order; output identities depend on
//! that order plus issuance time, so there is no parallel fan-out. A failure
//! in one record is logged and recorded as its outcome, never aborting the
//! rest of the batch.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::error::TeamcardResult;
use crate::instantiate::Instantiator;
use crate::raster::Rasterizer;
use crate::record::Record;

/// Where finished PNGs go. The persistence medium is the caller's concern.
pub trait OutputSink {
    fn persist(&mut self, identity: &str, bytes: &[u8]) -> TeamcardResult<()>;
}

/// Writes `{identity}.png` files under one directory, created on first use.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OutputSink for DirectorySink {
    fn persist(&mut self, identity: &str, bytes: &[u8]) -> TeamcardResult<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(format!("{identity}.png"));
        fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BatchOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
        }
    }
}

/// Outcome for one record, in batch order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RecordOutcome {
    Generated { identity: String, team: String },
    Failed { identity: String, team: String, reason: String },
}

#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct BatchReport {
    pub success_count: usize,
    pub outcomes: Vec<RecordOutcome>,
}

/// Run one full batch. `cancel` is checked between records: already-produced
/// outputs stay intact and unprocessed records are simply left out of the
/// report.
pub fn run_batch(
    records: &[Record],
    instantiator: &Instantiator,
    rasterizer: &dyn Rasterizer,
    sink: &mut dyn OutputSink,
    cancel: &AtomicBool,
    options: BatchOptions,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, record) in records.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(processed = index, total = records.len(), "batch cancelled");
            break;
        }

        let identity = output_identity(record, index);
        let team = record.display_name().to_string();
        tracing::info!(%team, n = index + 1, total = records.len(), "generating card");

        let result = instantiator
            .instantiate(record)
            .and_then(|doc| rasterizer.render_png(&doc, options.width, options.height))
            .and_then(|png| sink.persist(&identity, &png));

        match result {
            Ok(()) => {
                report.success_count += 1;
                report.outcomes.push(RecordOutcome::Generated { identity, team });
            }
            Err(e) => {
                tracing::error!(%team, error = %e, "card generation failed");
                report.outcomes.push(RecordOutcome::Failed {
                    identity,
                    team,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

/// Collision-resistant output identity: sanitized team/day stem, issuance
/// time in unix millis and the batch index as disambiguator. Two rows with
/// the same name and day still get distinct identities via the index.
pub fn output_identity(record: &Record, index: usize) -> String {
    let team = if record.team_name.is_empty() {
        format!("team_{index}")
    } else {
        record.team_name.clone()
    };
    let stem = if record.day.is_empty() {
        team
    } else {
        format!("{team}_{}", record.day)
    };
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}_{millis}_{index}", safe_file_stem(&stem))
}

/// File-name sanitizer: anything outside ASCII alphanumerics and Hangul
/// syllables becomes an underscore.
fn safe_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || ('가'..='힣').contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}
