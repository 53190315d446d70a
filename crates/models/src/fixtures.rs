use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scheduled match with known teams and kickoff, outcome not yet known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fixture {
    pub match_id: String,
    pub kickoff_utc: DateTime<Utc>,
    pub home_team_id: String,
    pub home_team_name: String,
    pub away_team_id: String,
    pub away_team_name: String,
    pub league_id: String,
    pub league_name: String,
    pub odds: Option<OddsSnapshot>,
}

/// Closing market odds captured at fetch time. Absent when the
/// upstream feed has not priced the match yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OddsSnapshot {
    pub home: Decimal,
    pub draw: Decimal,
    pub away: Decimal,
    pub over_line: Option<Decimal>,
    pub under_line: Option<Decimal>,
}

impl Fixture {
    /// Calendar day of kickoff on the UTC clock. All day-window logic
    /// keys off this, never off the host timezone.
    pub fn kickoff_date(&self) -> NaiveDate {
        self.kickoff_utc.date_naive()
    }
}

/// Raw per-team statistics as returned by the stats provider for a
/// team's recent window (last 5-10 matches plus season aggregates).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamStats {
    pub team_id: String,
    pub matches_played: u32,
    pub points_per_game: f64,
    pub performance_rank: i32,
    pub goals_scored_avg: f64,
    pub goals_conceded_avg: f64,
    pub xg_for_avg: f64,
    pub xg_against_avg: f64,
    pub shots_total: u32,
    pub shots_on_target: u32,
    pub possession_avg: f64,
    pub corners_avg: f64,
    pub cards_avg: f64,
    pub clean_sheet_pct: f64,
    pub btts_pct: f64,
    pub over15_potential: f64,
    pub over25_potential: f64,
}

impl TeamStats {
    /// Shots-on-target ratio over the window; 0.0 when the team took
    /// no shots at all (promoted sides early in a season do this).
    pub fn shot_accuracy(&self) -> f64 {
        if self.shots_total == 0 {
            0.0
        } else {
            f64::from(self.shots_on_target) / f64::from(self.shots_total)
        }
    }

    /// Points over a rolling five-match window.
    pub fn form_points(&self) -> f64 {
        self.points_per_game * 5.0
    }

    /// Shots taken per match; 0.0 before a team has played.
    pub fn shots_avg(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            f64::from(self.shots_total) / f64::from(self.matches_played)
        }
    }

    /// Shots on target per match; 0.0 before a team has played.
    pub fn shots_on_target_avg(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            f64::from(self.shots_on_target) / f64::from(self.matches_played)
        }
    }

    /// Rank-derived rating on an Elo-like scale. This is an
    /// approximation anchored at 1500, not a true Elo; values are not
    /// comparable across data sources.
    pub fn elo_approx(&self) -> f64 {
        1500.0 + f64::from(self.performance_rank) * 10.0
    }
}

/// Final score of a completed match, as settled by the results API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettledResult {
    pub match_id: String,
    pub home_goals: i32,
    pub away_goals: i32,
}

impl SettledResult {
    pub fn total_goals(&self) -> i32 {
        self.home_goals + self.away_goals
    }

    /// "2-1" style scoreline used for the persisted actual_result field.
    pub fn scoreline(&self) -> String {
        format!("{}-{}", self.home_goals, self.away_goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stats(shots_total: u32, shots_on_target: u32) -> TeamStats {
        TeamStats {
            team_id: "t1".to_string(),
            matches_played: 10,
            points_per_game: 1.8,
            performance_rank: 4,
            goals_scored_avg: 1.6,
            goals_conceded_avg: 1.1,
            xg_for_avg: 1.5,
            xg_against_avg: 1.2,
            shots_total,
            shots_on_target,
            possession_avg: 55.0,
            corners_avg: 5.5,
            cards_avg: 2.0,
            clean_sheet_pct: 30.0,
            btts_pct: 60.0,
            over15_potential: 80.0,
            over25_potential: 55.0,
        }
    }

    #[test]
    fn test_shot_accuracy_in_unit_range() {
        let s = stats(120, 42);
        assert!((s.shot_accuracy() - 0.35).abs() < 1e-9);
        assert!(s.shot_accuracy() >= 0.0 && s.shot_accuracy() <= 1.0);
    }

    #[test]
    fn test_shot_accuracy_zero_shots() {
        let s = stats(0, 0);
        assert_eq!(s.shot_accuracy(), 0.0);
    }

    #[test]
    fn test_form_points_and_elo_approx() {
        let s = stats(100, 30);
        assert!((s.form_points() - 9.0).abs() < 1e-9);
        assert!((s.elo_approx() - 1540.0).abs() < 1e-9);
    }

    #[test]
    fn test_kickoff_date_is_utc_calendar_day() {
        // 23:00Z on 2024-03-01 is already 2024-03-02 in UTC+10; the
        // fixture date must stay on the UTC day.
        let fixture = Fixture {
            match_id: "42".to_string(),
            kickoff_utc: Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap(),
            home_team_id: "h".to_string(),
            home_team_name: "Home".to_string(),
            away_team_id: "a".to_string(),
            away_team_name: "Away".to_string(),
            league_id: "l".to_string(),
            league_name: "League".to_string(),
            odds: None,
        };
        assert_eq!(
            fixture.kickoff_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_settled_result_helpers() {
        let result = SettledResult {
            match_id: "42".to_string(),
            home_goals: 2,
            away_goals: 1,
        };
        assert_eq!(result.total_goals(), 3);
        assert_eq!(result.scoreline(), "2-1");
    }
}
