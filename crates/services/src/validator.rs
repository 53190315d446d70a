use std::sync::Arc;

use serde::{Deserialize, Serialize};

use goalcast_db::{PredictionGateway, PredictionRow, Settlement};
use goalcast_models::{
    settle_labels, unit_profit, GoalcastError, PredictionStatus, Result, GOAL_LINE,
};

use crate::footy_api::ResultsProvider;

/// What one validation sweep did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub examined: usize,
    pub settled: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub push: usize,
    pub still_pending: usize,
    pub failures: Vec<(String, String)>,
}

/// Reconciles PENDING rows against settled results. Each row is an
/// independent unit: a failed result fetch for one match never stops
/// the rest of the batch.
pub struct ValidationService {
    results: Arc<dyn ResultsProvider>,
    gateway: PredictionGateway,
}

impl ValidationService {
    pub fn new(results: Arc<dyn ResultsProvider>, gateway: PredictionGateway) -> Self {
        Self { results, gateway }
    }

    pub async fn validate_pending(&self) -> Result<ValidationSummary> {
        let pending = self.gateway.fetch_pending().await?;
        let mut summary = ValidationSummary {
            examined: pending.len(),
            ..ValidationSummary::default()
        };

        tracing::info!(pending = pending.len(), "starting validation sweep");

        for row in &pending {
            match self.validate_row(row).await {
                Ok(Some(status)) => {
                    summary.settled += 1;
                    match status {
                        PredictionStatus::Correct => summary.correct += 1,
                        PredictionStatus::Incorrect => summary.incorrect += 1,
                        PredictionStatus::Push => summary.push += 1,
                        PredictionStatus::Pending => {}
                    }
                }
                Ok(None) => summary.still_pending += 1,
                Err(e) => {
                    tracing::warn!(match_id = %row.match_id, error = %e, "validation failed for row");
                    summary.failures.push((row.match_id.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            examined = summary.examined,
            settled = summary.settled,
            correct = summary.correct,
            incorrect = summary.incorrect,
            push = summary.push,
            still_pending = summary.still_pending,
            failures = summary.failures.len(),
            "validation sweep finished"
        );

        Ok(summary)
    }

    /// Settles one row. Ok(None) means the result is not available
    /// yet and the row stays PENDING for a later sweep; that is the
    /// expected path, not an error.
    async fn validate_row(&self, row: &PredictionRow) -> Result<Option<PredictionStatus>> {
        let winner = row.winner_label()?;
        let goal_line = row.goal_line()?;

        let result = match self.results.settled_result(&row.match_id).await {
            Ok(result) => result,
            Err(GoalcastError::ResultUnavailable { .. }) => {
                tracing::debug!(match_id = %row.match_id, "result not settled yet");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let status = settle_labels(winner, goal_line, &result, GOAL_LINE);
        let profit = unit_profit(status, row.picked_side_odds()?);

        let settlement = Settlement {
            match_id: row.match_id.clone(),
            status,
            actual_result: result.scoreline(),
            profit,
        };

        let applied = self.gateway.settle(&settlement).await?;
        if !applied {
            // Row left PENDING between fetch and update, or settled
            // by a concurrent sweep; either way nothing to redo.
            tracing::debug!(match_id = %row.match_id, "row was no longer pending, skipping");
            return Ok(None);
        }

        tracing::info!(
            match_id = %row.match_id,
            status = status.as_str(),
            actual = %settlement.actual_result,
            "prediction settled"
        );

        Ok(Some(status))
    }
}
