use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use goalcast_models::{
    GoalLineLabel, OddsSnapshot, Prediction, PredictionStatus, Result, WinnerLabel,
};

/// A prediction row as stored in the `predictions` table. `match_id`
/// is unique per store; everything after `status` stays NULL until
/// the validator settles the row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PredictionRow {
    pub id: Uuid,
    pub match_id: String,
    pub kickoff_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub model_version: String,
    pub predicted_home_goals: f64,
    pub predicted_away_goals: f64,
    pub total_goals: f64,
    pub goal_difference: f64,
    pub winner: String,
    pub goal_line_label: String,
    pub confidence: f64,
    pub grade: String,
    pub status: String,
    pub over_odds: Option<Decimal>,
    pub under_odds: Option<Decimal>,
    pub actual_result: Option<String>,
    pub profit: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
}

impl PredictionRow {
    pub fn status(&self) -> Result<PredictionStatus> {
        PredictionStatus::parse(&self.status)
    }

    pub fn winner_label(&self) -> Result<WinnerLabel> {
        WinnerLabel::parse(&self.winner)
    }

    pub fn goal_line(&self) -> Result<GoalLineLabel> {
        GoalLineLabel::parse(&self.goal_line_label)
    }

    /// Odds for the goal-line side this row actually picked, if they
    /// were captured at prediction time.
    pub fn picked_side_odds(&self) -> Result<Option<Decimal>> {
        Ok(match self.goal_line()? {
            GoalLineLabel::Over => self.over_odds,
            GoalLineLabel::Under => self.under_odds,
        })
    }
}

/// Write-side record handed to the gateway: the immutable prediction
/// plus the goal-line odds captured with the fixture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRecord {
    pub prediction: Prediction,
    pub over_odds: Option<Decimal>,
    pub under_odds: Option<Decimal>,
}

impl PendingRecord {
    pub fn new(prediction: Prediction, odds: Option<&OddsSnapshot>) -> Self {
        Self {
            prediction,
            over_odds: odds.and_then(|o| o.over_line),
            under_odds: odds.and_then(|o| o.under_line),
        }
    }
}

/// Fields written exactly once when a pending row settles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settlement {
    pub match_id: String,
    pub status: PredictionStatus,
    pub actual_result: String,
    pub profit: Option<Decimal>,
}
