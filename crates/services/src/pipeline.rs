use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goalcast_db::{PendingRecord, PredictionGateway, WriteOutcome};
use goalcast_ml::{FeatureBuilder, GoalPredictor};
use goalcast_models::{Fixture, GoalcastError, Result};

use crate::footy_api::{forecast_window_from, StatsProvider};

/// Per-fixture skip record surfaced in the run summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedFixture {
    pub match_id: String,
    pub reason: String,
}

/// What one daily run did, stage by stage. No partial output files:
/// this summary and the idempotent store writes are the only outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub fetched: usize,
    pub skipped_existing: usize,
    pub featurized: usize,
    pub predicted: usize,
    pub persisted: usize,
    pub skipped: Vec<SkippedFixture>,
}

impl RunSummary {
    fn skip(&mut self, match_id: &str, reason: impl Into<String>) {
        self.skipped.push(SkippedFixture {
            match_id: match_id.to_string(),
            reason: reason.into(),
        });
    }
}

/// Orchestrates one daily batch: fetch the 3-day window, derive
/// features, run inference, persist PENDING rows. Every write is
/// idempotent, so the whole run can be repeated safely mid-day.
pub struct PredictionPipeline {
    provider: Arc<dyn StatsProvider>,
    builder: FeatureBuilder,
    predictor: GoalPredictor,
    gateway: PredictionGateway,
}

impl PredictionPipeline {
    pub fn new(
        provider: Arc<dyn StatsProvider>,
        predictor: GoalPredictor,
        gateway: PredictionGateway,
    ) -> Self {
        Self {
            provider,
            builder: FeatureBuilder::new(),
            predictor,
            gateway,
        }
    }

    /// Runs the batch for the window anchored at `now` (callers pass
    /// `Utc::now()`; tests pin an instant). Per-fixture failures are
    /// skip-and-continue; only configuration and model problems abort.
    pub async fn run_daily(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let window = forecast_window_from(now);
        tracing::info!(
            from = %window[0],
            to = %window[2],
            model = self.predictor.model_version(),
            "starting daily prediction run"
        );

        let mut summary = RunSummary::default();
        let mut fixtures: Vec<Fixture> = Vec::new();

        for date in window {
            match self.provider.fixtures_for(date).await {
                Ok(batch) => fixtures.extend(batch),
                Err(e) => {
                    // One dead day must not sink the other two.
                    tracing::warn!(%date, error = %e, "fixture fetch failed for day");
                    summary.skip(&format!("day:{date}"), e.to_string());
                }
            }
        }
        summary.fetched = fixtures.len();

        let match_ids: Vec<String> = fixtures.iter().map(|f| f.match_id.clone()).collect();
        let existing: HashSet<String> = if match_ids.is_empty() {
            HashSet::new()
        } else {
            self.gateway.existing_match_ids(&match_ids).await?
        };

        for fixture in &fixtures {
            if existing.contains(&fixture.match_id) {
                summary.skipped_existing += 1;
                continue;
            }
            if let Err(e) = self.process_fixture(fixture, &mut summary).await {
                if e.is_fatal_for_run() {
                    return Err(e);
                }
                summary.skip(&fixture.match_id, e.to_string());
            }
        }

        tracing::info!(
            fetched = summary.fetched,
            skipped_existing = summary.skipped_existing,
            featurized = summary.featurized,
            predicted = summary.predicted,
            persisted = summary.persisted,
            skipped = summary.skipped.len(),
            "daily prediction run finished"
        );

        Ok(summary)
    }

    async fn process_fixture(&self, fixture: &Fixture, summary: &mut RunSummary) -> Result<()> {
        let home_stats = self.provider.team_stats(&fixture.home_team_id).await;
        let away_stats = self.provider.team_stats(&fixture.away_team_id).await;

        let (home_stats, away_stats) = match (home_stats, away_stats) {
            (Ok(h), Ok(a)) => (h, a),
            _ => {
                return Err(GoalcastError::MissingStatistics {
                    match_id: fixture.match_id.clone(),
                })
            }
        };

        let features = self.builder.build(fixture, &home_stats, &away_stats)?;
        summary.featurized += 1;

        let prediction = self.predictor.predict(fixture, &features)?;
        summary.predicted += 1;

        tracing::debug!(
            match_id = %fixture.match_id,
            home = %fixture.home_team_name,
            away = %fixture.away_team_name,
            predicted_home = prediction.predicted_home_goals,
            predicted_away = prediction.predicted_away_goals,
            winner = prediction.winner.as_str(),
            line = prediction.goal_line_label.as_str(),
            grade = prediction.grade.as_str(),
            "generated prediction"
        );

        let record = PendingRecord::new(prediction, fixture.odds.as_ref());
        match self.gateway.record_pending(&record).await? {
            WriteOutcome::Inserted => summary.persisted += 1,
            WriteOutcome::AlreadyPresent => summary.skipped_existing += 1,
        }

        Ok(())
    }
}
