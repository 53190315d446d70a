use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::schema::{PendingRecord, PredictionRow, Settlement};
use goalcast_models::{GoalcastError, PredictionStatus, Result};

/// Outcome of an idempotent pending write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    /// The match id already had a row; the write was a no-op.
    AlreadyPresent,
}

/// Storage seam for predictions. The gateway talks to one primary
/// store and, when configured, mirrors writes to a secondary one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Insert a PENDING row unless the match id already has one.
    /// At-most-one row per match id, enforced by the store's unique
    /// key, never by an application-level lock.
    async fn insert_pending(&self, record: &PendingRecord) -> Result<WriteOutcome>;

    /// Which of the given match ids already have a stored row.
    async fn existing_match_ids(&self, match_ids: &[String]) -> Result<HashSet<String>>;

    /// All rows still awaiting validation.
    async fn fetch_pending(&self) -> Result<Vec<PredictionRow>>;

    /// Write terminal fields to a PENDING row. Returns false when the
    /// row was not PENDING anymore (already settled elsewhere).
    async fn apply_settlement(&self, settlement: &Settlement) -> Result<bool>;
}

pub struct PgPredictionStore {
    pool: PgPool,
}

impl PgPredictionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionStore for PgPredictionStore {
    async fn insert_pending(&self, record: &PendingRecord) -> Result<WriteOutcome> {
        let p = &record.prediction;
        let result = sqlx::query(
            r"INSERT INTO predictions (
                id, match_id, kickoff_date, home_team, away_team, model_version,
                predicted_home_goals, predicted_away_goals, total_goals, goal_difference,
                winner, goal_line_label, confidence, grade, status, over_odds, under_odds
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (match_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&p.match_id)
        .bind(p.kickoff_date)
        .bind(&p.home_team)
        .bind(&p.away_team)
        .bind(&p.model_version)
        .bind(p.predicted_home_goals)
        .bind(p.predicted_away_goals)
        .bind(p.total_goals)
        .bind(p.goal_difference)
        .bind(p.winner.as_str())
        .bind(p.goal_line_label.as_str())
        .bind(p.confidence)
        .bind(p.grade.as_str())
        .bind(PredictionStatus::Pending.as_str())
        .bind(record.over_odds)
        .bind(record.under_odds)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(match_id = %p.match_id, "prediction already stored, skipping");
            Ok(WriteOutcome::AlreadyPresent)
        } else {
            Ok(WriteOutcome::Inserted)
        }
    }

    async fn existing_match_ids(&self, match_ids: &[String]) -> Result<HashSet<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT match_id FROM predictions WHERE match_id = ANY($1)")
                .bind(match_ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn fetch_pending(&self) -> Result<Vec<PredictionRow>> {
        let rows = sqlx::query_as::<_, PredictionRow>(
            "SELECT * FROM predictions WHERE status = $1 ORDER BY kickoff_date, match_id",
        )
        .bind(PredictionStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn apply_settlement(&self, settlement: &Settlement) -> Result<bool> {
        if !settlement.status.is_terminal() {
            return Err(GoalcastError::DataIntegrity {
                match_id: settlement.match_id.clone(),
                reason: "settlement status must be terminal".to_string(),
            });
        }

        // The status predicate is the transition guard: a row that
        // already settled is left untouched.
        let result = sqlx::query(
            r"UPDATE predictions
              SET status = $2, actual_result = $3, profit = $4, validated_at = now()
              WHERE match_id = $1 AND status = $5",
        )
        .bind(&settlement.match_id)
        .bind(settlement.status.as_str())
        .bind(&settlement.actual_result)
        .bind(settlement.profit)
        .bind(PredictionStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Routes writes to the primary store and mirrors them best-effort
/// to an optional secondary store. A secondary failure is logged and
/// never propagated; both stores must nevertheless agree on settled
/// history, so settlements are mirrored too.
pub struct PredictionGateway {
    primary: Arc<dyn PredictionStore>,
    secondary: Option<Arc<dyn PredictionStore>>,
}

impl PredictionGateway {
    pub fn new(primary: Arc<dyn PredictionStore>) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: Arc<dyn PredictionStore>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub async fn record_pending(&self, record: &PendingRecord) -> Result<WriteOutcome> {
        let outcome = self.primary.insert_pending(record).await?;

        if let Some(secondary) = &self.secondary {
            if let Err(e) = secondary.insert_pending(record).await {
                tracing::warn!(
                    match_id = %record.prediction.match_id,
                    error = %e,
                    "secondary store write failed, continuing"
                );
            }
        }

        Ok(outcome)
    }

    pub async fn existing_match_ids(&self, match_ids: &[String]) -> Result<HashSet<String>> {
        self.primary.existing_match_ids(match_ids).await
    }

    pub async fn fetch_pending(&self) -> Result<Vec<PredictionRow>> {
        self.primary.fetch_pending().await
    }

    pub async fn settle(&self, settlement: &Settlement) -> Result<bool> {
        let applied = self.primary.apply_settlement(settlement).await?;

        if let Some(secondary) = &self.secondary {
            if let Err(e) = secondary.apply_settlement(settlement).await {
                tracing::warn!(
                    match_id = %settlement.match_id,
                    error = %e,
                    "secondary store settlement failed, continuing"
                );
            }
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use goalcast_models::Prediction;
    use rust_decimal_macros::dec;

    fn record() -> PendingRecord {
        let prediction = Prediction::from_model_output(
            "match_42".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Home FC".to_string(),
            "Away FC".to_string(),
            "ridge-v1".to_string(),
            1.3,
            1.1,
            0.7,
        )
        .unwrap();
        PendingRecord {
            prediction,
            over_odds: Some(dec!(1.95)),
            under_odds: Some(dec!(1.85)),
        }
    }

    #[tokio::test]
    async fn test_gateway_returns_primary_outcome() {
        let mut primary = MockPredictionStore::new();
        primary
            .expect_insert_pending()
            .times(1)
            .returning(|_| Ok(WriteOutcome::AlreadyPresent));

        let gateway = PredictionGateway::new(Arc::new(primary));
        let outcome = gateway.record_pending(&record()).await.unwrap();
        assert_eq!(outcome, WriteOutcome::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_secondary_failure_does_not_block_primary_write() {
        let mut primary = MockPredictionStore::new();
        primary
            .expect_insert_pending()
            .times(1)
            .returning(|_| Ok(WriteOutcome::Inserted));

        let mut secondary = MockPredictionStore::new();
        secondary.expect_insert_pending().times(1).returning(|_| {
            Err(GoalcastError::UpstreamUnavailable(
                "secondary down".to_string(),
            ))
        });

        let gateway = PredictionGateway::new(Arc::new(primary)).with_secondary(Arc::new(secondary));
        let outcome = gateway.record_pending(&record()).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Inserted);
    }

    #[tokio::test]
    async fn test_primary_failure_propagates() {
        let mut primary = MockPredictionStore::new();
        primary
            .expect_insert_pending()
            .times(1)
            .returning(|_| Err(GoalcastError::UpstreamUnavailable("primary down".to_string())));

        let gateway = PredictionGateway::new(Arc::new(primary));
        assert!(gateway.record_pending(&record()).await.is_err());
    }

    #[tokio::test]
    async fn test_settlement_mirrored_to_secondary() {
        let settlement = Settlement {
            match_id: "match_42".to_string(),
            status: goalcast_models::PredictionStatus::Correct,
            actual_result: "2-1".to_string(),
            profit: Some(dec!(0.95)),
        };

        let mut primary = MockPredictionStore::new();
        primary
            .expect_apply_settlement()
            .times(1)
            .returning(|_| Ok(true));

        let mut secondary = MockPredictionStore::new();
        secondary
            .expect_apply_settlement()
            .times(1)
            .returning(|_| Ok(true));

        let gateway = PredictionGateway::new(Arc::new(primary)).with_secondary(Arc::new(secondary));
        assert!(gateway.settle(&settlement).await.unwrap());
    }
}
