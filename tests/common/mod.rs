// Shared test doubles and fixture builders for the integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use goalcast_db::{PendingRecord, PredictionRow, PredictionStore, Settlement, WriteOutcome};
use goalcast_ml::{GoalPredictor, RidgeArtifact, ScalerArtifact};
use goalcast_models::{
    Fixture, GoalcastError, OddsSnapshot, PredictionStatus, Result, SettledResult, TeamStats,
    FEATURE_NAMES, FEATURE_SCHEMA_VERSION,
};
use goalcast_services::{ResultsProvider, StatsProvider};

/// Store double with real unique-key and transition-guard semantics,
/// so idempotence and state-machine behavior are exercised the same
/// way the SQL store exercises them.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<HashMap<String, PredictionRow>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, match_id: &str) -> Option<PredictionRow> {
        self.rows.lock().unwrap().get(match_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl PredictionStore for InMemoryStore {
    async fn insert_pending(&self, record: &PendingRecord) -> Result<WriteOutcome> {
        let mut rows = self.rows.lock().unwrap();
        let p = &record.prediction;
        if rows.contains_key(&p.match_id) {
            return Ok(WriteOutcome::AlreadyPresent);
        }
        rows.insert(
            p.match_id.clone(),
            PredictionRow {
                id: Uuid::new_v4(),
                match_id: p.match_id.clone(),
                kickoff_date: p.kickoff_date,
                home_team: p.home_team.clone(),
                away_team: p.away_team.clone(),
                model_version: p.model_version.clone(),
                predicted_home_goals: p.predicted_home_goals,
                predicted_away_goals: p.predicted_away_goals,
                total_goals: p.total_goals,
                goal_difference: p.goal_difference,
                winner: p.winner.as_str().to_string(),
                goal_line_label: p.goal_line_label.as_str().to_string(),
                confidence: p.confidence,
                grade: p.grade.as_str().to_string(),
                status: PredictionStatus::Pending.as_str().to_string(),
                over_odds: record.over_odds,
                under_odds: record.under_odds,
                actual_result: None,
                profit: None,
                created_at: Utc::now(),
                validated_at: None,
            },
        );
        Ok(WriteOutcome::Inserted)
    }

    async fn existing_match_ids(&self, match_ids: &[String]) -> Result<HashSet<String>> {
        let rows = self.rows.lock().unwrap();
        Ok(match_ids
            .iter()
            .filter(|id| rows.contains_key(*id))
            .cloned()
            .collect())
    }

    async fn fetch_pending(&self) -> Result<Vec<PredictionRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|row| row.status == PredictionStatus::Pending.as_str())
            .cloned()
            .collect())
    }

    async fn apply_settlement(&self, settlement: &Settlement) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&settlement.match_id) else {
            return Ok(false);
        };
        if row.status != PredictionStatus::Pending.as_str() {
            return Ok(false);
        }
        row.status = settlement.status.as_str().to_string();
        row.actual_result = Some(settlement.actual_result.clone());
        row.profit = settlement.profit;
        row.validated_at = Some(Utc::now());
        Ok(true)
    }
}

/// Stats provider backed by static maps; dates listed in
/// `fail_dates` simulate an upstream outage for that day.
#[derive(Default)]
pub struct StaticStatsProvider {
    pub fixtures: HashMap<NaiveDate, Vec<Fixture>>,
    pub stats: HashMap<String, TeamStats>,
    pub fail_dates: HashSet<NaiveDate>,
}

#[async_trait]
impl StatsProvider for StaticStatsProvider {
    async fn fixtures_for(&self, date: NaiveDate) -> Result<Vec<Fixture>> {
        if self.fail_dates.contains(&date) {
            return Err(GoalcastError::UpstreamUnavailable(format!(
                "fixtures for {date}: retries exhausted"
            )));
        }
        Ok(self.fixtures.get(&date).cloned().unwrap_or_default())
    }

    async fn team_stats(&self, team_id: &str) -> Result<TeamStats> {
        self.stats
            .get(team_id)
            .cloned()
            .ok_or_else(|| GoalcastError::MissingStatistics {
                match_id: format!("team:{team_id}"),
            })
    }
}

/// Results provider returning only the scores it was seeded with;
/// everything else is still in play. Ids in `fail_ids` simulate a
/// transport failure rather than an unfinished match.
#[derive(Default)]
pub struct StaticResultsProvider {
    pub results: HashMap<String, SettledResult>,
    pub fail_ids: HashSet<String>,
}

#[async_trait]
impl ResultsProvider for StaticResultsProvider {
    async fn settled_result(&self, match_id: &str) -> Result<SettledResult> {
        if self.fail_ids.contains(match_id) {
            return Err(GoalcastError::UpstreamUnavailable(format!(
                "match {match_id}: retries exhausted"
            )));
        }
        self.results
            .get(match_id)
            .cloned()
            .ok_or_else(|| GoalcastError::ResultUnavailable {
                match_id: match_id.to_string(),
            })
    }
}

pub fn kickoff(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn fixture(match_id: &str, kickoff_utc: DateTime<Utc>, home: &str, away: &str) -> Fixture {
    Fixture {
        match_id: match_id.to_string(),
        kickoff_utc,
        home_team_id: format!("{home}_id"),
        home_team_name: home.to_string(),
        away_team_id: format!("{away}_id"),
        away_team_name: away.to_string(),
        league_id: "league_1".to_string(),
        league_name: "Test League".to_string(),
        odds: None,
    }
}

pub fn fixture_with_odds(
    match_id: &str,
    kickoff_utc: DateTime<Utc>,
    home: &str,
    away: &str,
    odds: OddsSnapshot,
) -> Fixture {
    let mut f = fixture(match_id, kickoff_utc, home, away);
    f.odds = Some(odds);
    f
}

pub fn team_stats(team_id: &str, points_per_game: f64, rank: i32) -> TeamStats {
    TeamStats {
        team_id: team_id.to_string(),
        matches_played: 10,
        points_per_game,
        performance_rank: rank,
        goals_scored_avg: 1.5,
        goals_conceded_avg: 1.1,
        xg_for_avg: 1.4,
        xg_against_avg: 1.2,
        shots_total: 130,
        shots_on_target: 45,
        possession_avg: 52.0,
        corners_avg: 5.0,
        cards_avg: 2.1,
        clean_sheet_pct: 30.0,
        btts_pct: 55.0,
        over15_potential: 78.0,
        over25_potential: 52.0,
    }
}

/// Identity scaler and fixed-output ridge heads: predictions come out
/// at exactly the intercepts, which keeps expected labels obvious.
pub fn fixed_output_predictor(home_goals: f64, away_goals: f64) -> GoalPredictor {
    let scaler = ScalerArtifact {
        schema_version: FEATURE_SCHEMA_VERSION.to_string(),
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        mean: vec![0.0; FEATURE_NAMES.len()],
        scale: vec![1.0; FEATURE_NAMES.len()],
    };
    let head = |intercept: f64| RidgeArtifact {
        model_version: "ridge-v1".to_string(),
        weights: vec![0.0; FEATURE_NAMES.len()],
        intercept,
        residual_std: 0.8,
    };
    GoalPredictor::from_artifacts(scaler, head(home_goals), head(away_goals)).unwrap()
}
