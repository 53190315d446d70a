use serde::{Deserialize, Serialize};

/// Version tag for the feature schema below. The model artifacts
/// record the version and feature list they were fit on; the
/// predictor refuses to run on a mismatch.
pub const FEATURE_SCHEMA_VERSION: &str = "v1";

/// Canonical feature ordering. `MatchFeatures::as_vec` emits values
/// in exactly this order, and the scaler/model artifacts were fit on
/// it. Changing this list requires bumping `FEATURE_SCHEMA_VERSION`.
pub const FEATURE_NAMES: [&str; 40] = [
    "home_ppg",
    "away_ppg",
    "home_form_points",
    "away_form_points",
    "home_goals_scored_avg",
    "away_goals_scored_avg",
    "home_goals_conceded_avg",
    "away_goals_conceded_avg",
    "home_xg_for",
    "away_xg_for",
    "home_xg_against",
    "away_xg_against",
    "home_shots_avg",
    "away_shots_avg",
    "home_shots_on_target_avg",
    "away_shots_on_target_avg",
    "home_shot_accuracy",
    "away_shot_accuracy",
    "home_possession_avg",
    "away_possession_avg",
    "home_corners_avg",
    "away_corners_avg",
    "home_cards_avg",
    "away_cards_avg",
    "home_clean_sheet_pct",
    "away_clean_sheet_pct",
    "home_btts_pct",
    "away_btts_pct",
    "home_over15_potential",
    "away_over15_potential",
    "home_over25_potential",
    "away_over25_potential",
    "home_elo_approx",
    "away_elo_approx",
    "goals_market_avg",
    "odds_implied_home",
    "odds_implied_draw",
    "odds_implied_away",
    "h2h_avg_goals",
    "momentum",
];

/// Fixed-schema numeric representation of one fixture, one row per
/// match id, never mutated after the builder emits it.
///
/// `h2h_avg_goals` and `momentum` are structurally absent from the
/// upstream feed and are always 0.0. They are kept in the schema
/// because the models were fit with them present; they are documented
/// zero-valued features, not missing-value sentinels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchFeatures {
    pub match_id: String,
    pub home_ppg: f64,
    pub away_ppg: f64,
    pub home_form_points: f64,
    pub away_form_points: f64,
    pub home_goals_scored_avg: f64,
    pub away_goals_scored_avg: f64,
    pub home_goals_conceded_avg: f64,
    pub away_goals_conceded_avg: f64,
    pub home_xg_for: f64,
    pub away_xg_for: f64,
    pub home_xg_against: f64,
    pub away_xg_against: f64,
    pub home_shots_avg: f64,
    pub away_shots_avg: f64,
    pub home_shots_on_target_avg: f64,
    pub away_shots_on_target_avg: f64,
    pub home_shot_accuracy: f64,
    pub away_shot_accuracy: f64,
    pub home_possession_avg: f64,
    pub away_possession_avg: f64,
    pub home_corners_avg: f64,
    pub away_corners_avg: f64,
    pub home_cards_avg: f64,
    pub away_cards_avg: f64,
    pub home_clean_sheet_pct: f64,
    pub away_clean_sheet_pct: f64,
    pub home_btts_pct: f64,
    pub away_btts_pct: f64,
    pub home_over15_potential: f64,
    pub away_over15_potential: f64,
    pub home_over25_potential: f64,
    pub away_over25_potential: f64,
    pub home_elo_approx: f64,
    pub away_elo_approx: f64,
    pub goals_market_avg: f64,
    pub odds_implied_home: f64,
    pub odds_implied_draw: f64,
    pub odds_implied_away: f64,
    pub h2h_avg_goals: f64,
    pub momentum: f64,
}

impl MatchFeatures {
    /// Values in `FEATURE_NAMES` order. This is the only sanctioned
    /// way to turn features into a numeric vector.
    pub fn as_vec(&self) -> Vec<f64> {
        vec![
            self.home_ppg,
            self.away_ppg,
            self.home_form_points,
            self.away_form_points,
            self.home_goals_scored_avg,
            self.away_goals_scored_avg,
            self.home_goals_conceded_avg,
            self.away_goals_conceded_avg,
            self.home_xg_for,
            self.away_xg_for,
            self.home_xg_against,
            self.away_xg_against,
            self.home_shots_avg,
            self.away_shots_avg,
            self.home_shots_on_target_avg,
            self.away_shots_on_target_avg,
            self.home_shot_accuracy,
            self.away_shot_accuracy,
            self.home_possession_avg,
            self.away_possession_avg,
            self.home_corners_avg,
            self.away_corners_avg,
            self.home_cards_avg,
            self.away_cards_avg,
            self.home_clean_sheet_pct,
            self.away_clean_sheet_pct,
            self.home_btts_pct,
            self.away_btts_pct,
            self.home_over15_potential,
            self.away_over15_potential,
            self.home_over25_potential,
            self.away_over25_potential,
            self.home_elo_approx,
            self.away_elo_approx,
            self.goals_market_avg,
            self.odds_implied_home,
            self.odds_implied_draw,
            self.odds_implied_away,
            self.h2h_avg_goals,
            self.momentum,
        ]
    }
}
