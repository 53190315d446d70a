use goalcast_models::{
    Fixture, GoalcastError, MatchFeatures, Result, TeamStats, GOAL_LINE,
};
use rust_decimal::prelude::ToPrimitive;

/// Turns a fixture plus its two team-stat records into one
/// fixed-schema feature row. Stateless; one instance serves a whole
/// batch and per-fixture calls are independent.
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Derives the feature row for one fixture.
    ///
    /// Callers are responsible for having already excluded fixtures
    /// whose team stats could not be retrieved (MissingStatistics at
    /// the fetch boundary); this function only ever sees complete
    /// stat records and fails with DataIntegrity on non-finite input.
    pub fn build(
        &self,
        fixture: &Fixture,
        home: &TeamStats,
        away: &TeamStats,
    ) -> Result<MatchFeatures> {
        let (odds_implied_home, odds_implied_draw, odds_implied_away) = match &fixture.odds {
            Some(odds) => (
                implied_probability(odds.home.to_f64()),
                implied_probability(odds.draw.to_f64()),
                implied_probability(odds.away.to_f64()),
            ),
            None => (0.0, 0.0, 0.0),
        };

        let over25_avg = (home.over25_potential + away.over25_potential) / 2.0;
        let over15_avg = (home.over15_potential + away.over15_potential) / 2.0;

        let features = MatchFeatures {
            match_id: fixture.match_id.clone(),
            home_ppg: home.points_per_game,
            away_ppg: away.points_per_game,
            home_form_points: home.form_points(),
            away_form_points: away.form_points(),
            home_goals_scored_avg: home.goals_scored_avg,
            away_goals_scored_avg: away.goals_scored_avg,
            home_goals_conceded_avg: home.goals_conceded_avg,
            away_goals_conceded_avg: away.goals_conceded_avg,
            home_xg_for: home.xg_for_avg,
            away_xg_for: away.xg_for_avg,
            home_xg_against: home.xg_against_avg,
            away_xg_against: away.xg_against_avg,
            home_shots_avg: home.shots_avg(),
            away_shots_avg: away.shots_avg(),
            home_shots_on_target_avg: home.shots_on_target_avg(),
            away_shots_on_target_avg: away.shots_on_target_avg(),
            home_shot_accuracy: home.shot_accuracy(),
            away_shot_accuracy: away.shot_accuracy(),
            home_possession_avg: home.possession_avg,
            away_possession_avg: away.possession_avg,
            home_corners_avg: home.corners_avg,
            away_corners_avg: away.corners_avg,
            home_cards_avg: home.cards_avg,
            away_cards_avg: away.cards_avg,
            home_clean_sheet_pct: home.clean_sheet_pct,
            away_clean_sheet_pct: away.clean_sheet_pct,
            home_btts_pct: home.btts_pct,
            away_btts_pct: away.btts_pct,
            home_over15_potential: home.over15_potential,
            away_over15_potential: away.over15_potential,
            home_over25_potential: home.over25_potential,
            away_over25_potential: away.over25_potential,
            home_elo_approx: home.elo_approx(),
            away_elo_approx: away.elo_approx(),
            goals_market_avg: GOAL_LINE + (over25_avg - over15_avg) / 100.0,
            odds_implied_home,
            odds_implied_draw,
            odds_implied_away,
            // Structurally absent upstream: kept at 0.0 by contract,
            // not a missing-value sentinel.
            h2h_avg_goals: 0.0,
            momentum: 0.0,
        };

        if features.as_vec().iter().any(|v| !v.is_finite()) {
            return Err(GoalcastError::DataIntegrity {
                match_id: fixture.match_id.clone(),
                reason: "non-finite value in feature row".to_string(),
            });
        }

        Ok(features)
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn implied_probability(odds: Option<f64>) -> f64 {
    match odds {
        Some(o) if o > 1.0 => 1.0 / o,
        _ => 0.0,
    }
}
