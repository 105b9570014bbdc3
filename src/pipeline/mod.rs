pub mod aggregate;
pub mod sanitize;
pub mod split;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::classify::{self, InlineClassifier};
use crate::entity::EntityCounts;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The wrapped batch cannot be tokenized at all; nothing can be extracted.
    #[error("batch does not parse as markup: {0}")]
    BatchParse(#[source] quick_xml::Error),
    /// The classifier failed on one segment.
    #[error("classification failed: {0}")]
    Tag(anyhow::Error),
    /// The tagged output of one segment cannot be re-parsed.
    #[error("tagged segment does not re-parse: {0}")]
    Aggregate(#[source] quick_xml::Error),
}

/// One document's slot in the batch report.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    /// 1-based position in the batch
    pub index: usize,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOutcome {
    Counts(EntityCounts),
    Failed(String),
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.outcome, DocumentOutcome::Failed(_)))
            .count()
    }
}

/// Drive the whole batch: sanitize once, split once, then tag and aggregate
/// each article in order. `on_document` fires after every document with its
/// 1-based index, the total, and the outcome; presentation lives there.
///
/// A failure while tagging or aggregating one segment is logged, recorded as
/// `Failed` in that document's slot, and processing continues. Only a batch
/// that cannot be split at all aborts the run.
pub fn run(
    raw: &str,
    body_tag: &str,
    limit: Option<usize>,
    classifier: &dyn InlineClassifier,
    mut on_document: impl FnMut(usize, usize, &DocumentOutcome),
) -> Result<BatchReport, PipelineError> {
    let cleaned = sanitize::sanitize(raw);
    let mut segments = split::split(&cleaned, body_tag).map_err(PipelineError::BatchParse)?;
    if let Some(n) = limit {
        segments.truncate(n);
    }
    let total = segments.len();
    info!("Split batch into {} article(s)", total);

    let mut documents = Vec::with_capacity(total);
    for (i, segment) in segments.iter().enumerate() {
        let index = i + 1;
        let outcome = match process_segment(segment, classifier) {
            Ok(counts) => DocumentOutcome::Counts(counts),
            Err(e) => {
                warn!("Document {}/{} failed: {}", index, total, e);
                DocumentOutcome::Failed(e.to_string())
            }
        };
        on_document(index, total, &outcome);
        documents.push(DocumentReport { index, outcome });
    }

    Ok(BatchReport { documents })
}

fn process_segment(
    segment: &str,
    classifier: &dyn InlineClassifier,
) -> Result<EntityCounts, PipelineError> {
    let tagged = classify::tag(segment, classifier).map_err(PipelineError::Tag)?;
    aggregate::aggregate(&tagged).map_err(PipelineError::Aggregate)
}

// ── Tests ──
