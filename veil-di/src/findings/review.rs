//! QA review ledger
//!
//! Holds the reviewer's approve/reject decisions over the QA findings for
//! the current session, and runs the simulated automated reprocess.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use veil_common::events::{EventBus, VeilEvent};

use super::{FindingsSource, QaResult, QaStatus, StepFindings};
use crate::models::step::QA;

/// Reviewer decision on one finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl From<ReviewDecision> for QaStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approve => QaStatus::Approved,
            ReviewDecision::Reject => QaStatus::Rejected,
        }
    }
}

fn rescore(results: &mut [QaResult]) {
    let mut rng = rand::thread_rng();
    for result in results.iter_mut() {
        result.status = if rng.gen_bool(0.5) {
            QaStatus::Approved
        } else {
            QaStatus::Pending
        };
    }
}

/// Review counters shown on the QA step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    /// Findings no longer pending
    pub reviewed: usize,
    pub total: usize,
    /// round(approved / total * 100); 0 for an empty ledger
    pub quality_score: u8,
}

impl ReviewSummary {
    pub fn from_results(results: &[QaResult]) -> Self {
        let count = |status: QaStatus| results.iter().filter(|r| r.status == status).count();
        let approved = count(QaStatus::Approved);
        let rejected = count(QaStatus::Rejected);
        let pending = count(QaStatus::Pending);
        let total = results.len();

        let quality_score = if total == 0 {
            0
        } else {
            (approved as f64 / total as f64 * 100.0).round() as u8
        };

        Self {
            approved,
            rejected,
            pending,
            reviewed: total - pending,
            total,
            quality_score,
        }
    }
}

/// Session QA ledger
pub struct QaReview {
    initial: Vec<QaResult>,
    results: RwLock<Vec<QaResult>>,
    reprocess_delay: Duration,
    reprocessing: AtomicBool,
    event_bus: EventBus,
}

impl QaReview {
    pub fn new(results: Vec<QaResult>, reprocess_delay: Duration, event_bus: EventBus) -> Self {
        Self {
            results: RwLock::new(results.clone()),
            initial: results,
            reprocess_delay,
            reprocessing: AtomicBool::new(false),
            event_bus,
        }
    }

    /// Seed the ledger with the QA step's findings from `source`
    pub fn from_source(
        source: &dyn FindingsSource,
        reprocess_delay: Duration,
        event_bus: EventBus,
    ) -> Self {
        let results = match source.findings_for(QA) {
            Some(StepFindings::QaResults(results)) => results,
            _ => Vec::new(),
        };
        Self::new(results, reprocess_delay, event_bus)
    }

    pub fn is_reprocessing(&self) -> bool {
        self.reprocessing.load(Ordering::SeqCst)
    }

    /// Start a simulated reprocess of every finding
    ///
    /// Returns false without doing anything when a run is already in
    /// progress. After the configured delay each finding comes back either
    /// approved or pending at random; reviewer decisions are overwritten.
    pub fn reprocess(self: &Arc<Self>) -> bool {
        if self
            .reprocessing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("QA reprocess already running");
            return false;
        }

        let review = Arc::clone(self);
        tokio::spawn(async move {
            let finding_count = review.results.read().await.len();
            info!(findings = finding_count, "QA reprocess started");
            review.event_bus.emit_lossy(VeilEvent::QaReprocessStarted {
                finding_count,
                timestamp: chrono::Utc::now(),
            });

            tokio::time::sleep(review.reprocess_delay).await;

            let summary = {
                let mut results = review.results.write().await;
                rescore(&mut results);
                ReviewSummary::from_results(&results)
            };
            review.reprocessing.store(false, Ordering::SeqCst);

            info!(
                approved = summary.approved,
                pending = summary.pending,
                quality_score = summary.quality_score,
                "QA reprocess completed"
            );
            review.event_bus.emit_lossy(VeilEvent::QaReprocessCompleted {
                approved: summary.approved,
                pending: summary.pending,
                quality_score: summary.quality_score,
                timestamp: chrono::Utc::now(),
            });
        });

        true
    }

    pub async fn results(&self) -> Vec<QaResult> {
        self.results.read().await.clone()
    }

    /// Record a decision; `None` when no finding has this id
    pub async fn decide(&self, finding_id: &str, decision: ReviewDecision) -> Option<QaResult> {
        let updated = {
            let mut results = self.results.write().await;
            let result = results.iter_mut().find(|r| r.id == finding_id)?;
            result.status = decision.into();
            result.clone()
        };

        info!(
            finding_id = %finding_id,
            status = %updated.status,
            "QA finding reviewed"
        );
        self.event_bus.emit_lossy(VeilEvent::QaFindingReviewed {
            finding_id: finding_id.to_string(),
            status: updated.status.to_string(),
            timestamp: chrono::Utc::now(),
        });

        Some(updated)
    }

    pub async fn summary(&self) -> ReviewSummary {
        ReviewSummary::from_results(&self.results.read().await)
    }

    /// Discard all decisions made this session
    pub async fn reset(&self) {
        *self.results.write().await = self.initial.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::MockFindings;

    fn review() -> QaReview {
        QaReview::from_source(&MockFindings::new(), Duration::from_secs(3), EventBus::new(8))
    }

    #[test]
    fn test_empty_ledger_scores_zero() {
        let summary = ReviewSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.quality_score, 0);
    }

    #[tokio::test]
    async fn test_seeded_summary() {
        let summary = review().summary().await;

        assert_eq!(summary.approved, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.reviewed, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.quality_score, 33);
    }

    #[tokio::test]
    async fn test_decisions_update_summary() {
        let review = review();

        review.decide("1", ReviewDecision::Approve).await.expect("finding 1");
        review.decide("3", ReviewDecision::Approve).await.expect("finding 3");
        let summary = review.summary().await;

        assert_eq!(summary.approved, 3);
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.quality_score, 100);
    }

    #[tokio::test]
    async fn test_unknown_finding() {
        assert!(review().decide("42", ReviewDecision::Reject).await.is_none());
    }

    #[tokio::test]
    async fn test_reset_restores_seed() {
        let review = review();
        review.decide("2", ReviewDecision::Reject).await.expect("finding 2");
        review.reset().await;

        assert_eq!(review.summary().await.approved, 1);
    }

    #[test]
    fn test_rescore_never_rejects() {
        let mut results = match MockFindings::new().findings_for(QA) {
            Some(StepFindings::QaResults(results)) => results,
            other => panic!("unexpected findings {:?}", other),
        };

        for _ in 0..20 {
            rescore(&mut results);
            assert!(results.iter().all(|r| r.status != QaStatus::Rejected));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reprocess_runs_once_after_delay() {
        let bus = EventBus::new(16);
        let review = Arc::new(QaReview::from_source(
            &MockFindings::new(),
            Duration::from_secs(3),
            bus.clone(),
        ));
        let mut rx = bus.subscribe();

        assert!(review.reprocess());
        assert!(review.is_reprocessing());
        assert!(!review.reprocess());

        match rx.recv().await.expect("started event") {
            VeilEvent::QaReprocessStarted { finding_count, .. } => assert_eq!(finding_count, 3),
            other => panic!("unexpected event {:?}", other),
        }

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(review.is_reprocessing());

        let (approved, pending) = match rx.recv().await.expect("completed event") {
            VeilEvent::QaReprocessCompleted { approved, pending, .. } => (approved, pending),
            other => panic!("unexpected event {:?}", other),
        };
        assert_eq!(approved + pending, 3);
        assert!(!review.is_reprocessing());

        let summary = review.summary().await;
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.approved, approved);

        assert!(review.reprocess());
    }
}
