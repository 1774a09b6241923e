use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;

use crate::checks::traits::Defect;
use crate::core::document::Document;
use crate::core::validator::{default_validator, DocumentReport, Validator};
use crate::fixers::default_registry;
use crate::fixers::registry::{AppliedFix, FixerRegistry};

use super::prompt::{build_repair_prompt, unwrap_markdown_fence};
use super::rewriter::{RewriteError, Rewriter};

#[derive(Debug)]
pub enum RepairOutcome {
    /// Nothing to repair; no external call was made.
    AlreadyValid,
    Repaired,
    /// The rewrite came back but some blocks are still invalid.
    StillInvalid,
    /// The rewrite failed, timed out or was cancelled; the input is returned.
    Unavailable(RewriteError),
    /// The rewrite added or removed diagram blocks; the input is returned.
    Rejected { before: usize, after: usize },
}

impl RepairOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RepairOutcome::AlreadyValid => "already-valid",
            RepairOutcome::Repaired => "repaired",
            RepairOutcome::StillInvalid => "still-invalid",
            RepairOutcome::Unavailable(_) => "unavailable",
            RepairOutcome::Rejected { .. } => "rejected",
        }
    }
}

#[derive(Debug)]
pub struct RepairReport {
    pub document: String,
    pub outcome: RepairOutcome,
    pub before: DocumentReport,
    pub after: DocumentReport,
    pub fixes: Vec<AppliedFix>,
}

impl RepairReport {
    fn unchanged(document: &str, report: DocumentReport, outcome: RepairOutcome) -> Self {
        Self {
            document: document.to_string(),
            outcome,
            after: report.clone(),
            before: report,
            fixes: Vec::new(),
        }
    }

    pub fn per_block_validity(&self) -> Vec<bool> {
        self.after.per_block_validity()
    }

    /// Defects left after the repair attempt, keyed by block index.
    pub fn residual_defects(&self) -> Vec<(usize, &Defect)> {
        self.after
            .invalid_blocks()
            .flat_map(|b| b.result.defects.iter().map(move |d| (b.index, d)))
            .collect()
    }

    pub fn changed(&self) -> bool {
        matches!(
            self.outcome,
            RepairOutcome::Repaired | RepairOutcome::StillInvalid
        )
    }
}

pub struct RepairOrchestrator {
    validator: Validator,
    registry: FixerRegistry,
    timeout: Option<Duration>,
}

impl RepairOrchestrator {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            registry: default_registry(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn check(&self, document: &str) -> DocumentReport {
        self.validator.validate_document(&Document::parse(document))
    }

    pub fn repair_prompt(&self, document: &str) -> Option<String> {
        let report = self.check(document);
        (!report.is_valid()).then(|| build_repair_prompt(document, &report))
    }

    pub async fn repair(&self, document: &str, rewriter: &dyn Rewriter) -> RepairReport {
        self.repair_until(document, rewriter, std::future::pending()).await
    }

    /// One repair round-trip through `rewriter`, abandoned when `cancelled`
    /// resolves first. The result is always re-validated.
    pub async fn repair_until<F>(
        &self,
        document: &str,
        rewriter: &dyn Rewriter,
        cancelled: F,
    ) -> RepairReport
    where
        F: Future<Output = ()>,
    {
        let before = self.check(document);
        if before.is_valid() {
            tracing::info!(blocks = before.blocks.len(), "all diagram blocks valid, skipping repair");
            return RepairReport::unchanged(document, before, RepairOutcome::AlreadyValid);
        }

        let prompt = build_repair_prompt(document, &before);
        tracing::info!(
            rewriter = rewriter.name(),
            invalid_blocks = before.invalid_blocks().count(),
            defects = before.defect_count(),
            "requesting diagram repair"
        );

        let guarded = AssertUnwindSafe(rewriter.rewrite(&prompt))
            .catch_unwind()
            .map(|result| result.unwrap_or_else(|panic| Err(RewriteError::from_panic(panic))));
        let call = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, guarded)
                    .await
                    .unwrap_or(Err(RewriteError::Timeout(limit))),
                None => guarded.await,
            }
        };
        let response = tokio::select! {
            result = call => result,
            _ = cancelled => Err(RewriteError::Cancelled),
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "diagram repair unavailable, keeping original document");
                return RepairReport::unchanged(document, before, RepairOutcome::Unavailable(e));
            }
        };

        let rewritten = unwrap_markdown_fence(&response).to_string();
        let after = self.check(&rewritten);
        if after.blocks.len() != before.blocks.len() {
            tracing::warn!(
                before = before.blocks.len(),
                after = after.blocks.len(),
                "rewrite changed the number of diagram blocks, keeping original document"
            );
            let outcome = RepairOutcome::Rejected {
                before: before.blocks.len(),
                after: after.blocks.len(),
            };
            return RepairReport::unchanged(document, before, outcome);
        }

        let outcome = if after.is_valid() {
            RepairOutcome::Repaired
        } else {
            RepairOutcome::StillInvalid
        };
        tracing::info!(outcome = outcome.label(), residual = after.defect_count(), "diagram repair finished");

        RepairReport {
            document: rewritten,
            outcome,
            before,
            after,
            fixes: Vec::new(),
        }
    }

    /// Repairs with the built-in fixers instead of an external rewriter.
    pub fn repair_locally(&self, document: &str) -> RepairReport {
        let parsed = Document::parse(document);
        let before = self.validator.validate_document(&parsed);
        if before.is_valid() {
            return RepairReport::unchanged(document, before, RepairOutcome::AlreadyValid);
        }

        let mut replacements = HashMap::new();
        let mut fixes = Vec::new();
        for (block, report) in parsed.blocks().iter().zip(&before.blocks) {
            if report.result.is_valid {
                continue;
            }
            let fix = self.registry.fix_block(block, &report.result.defects, false);
            if fix.changed() {
                replacements.insert(block.index, fix.content);
            }
            fixes.extend(fix.fixes);
        }

        let rewritten = parsed.reassemble(&replacements);
        let after = self.check(&rewritten);
        let outcome = if after.is_valid() {
            RepairOutcome::Repaired
        } else {
            RepairOutcome::StillInvalid
        };

        RepairReport {
            document: rewritten,
            outcome,
            before,
            after,
            fixes,
        }
    }

    /// What `repair_locally` would do, without changing anything.
    pub fn preview_local_fixes(&self, document: &str) -> Vec<AppliedFix> {
        let parsed = Document::parse(document);
        let before = self.validator.validate_document(&parsed);
        parsed
            .blocks()
            .iter()
            .zip(&before.blocks)
            .filter(|(_, report)| !report.result.is_valid)
            .flat_map(|(block, report)| {
                self.registry
                    .fix_block(block, &report.result.defects, true)
                    .fixes
            })
            .collect()
    }
}

impl Default for RepairOrchestrator {
    fn default() -> Self {
        Self::new(default_validator())
    }
}

pub async fn repair_document(document: &str, rewriter: &dyn Rewriter) -> RepairReport {
    RepairOrchestrator::default().repair(document, rewriter).await
}
