use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{GoalcastError, Result};
use crate::fixtures::SettledResult;

/// The fixed goals line every prediction is graded against.
pub const GOAL_LINE: f64 = 2.5;

/// Predicted goal difference at or below this magnitude is called a
/// draw. 0.15 is pinned deliberately: a 1.3 vs 1.1 prediction
/// (diff 0.2) is a home call, a dead-even 1.2 vs 1.1 (diff 0.1 within
/// model noise) is not.
pub const DRAW_TOLERANCE: f64 = 0.15;

/// Tolerance for "the settled total landed exactly on the line".
const LINE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WinnerLabel {
    Home,
    Draw,
    Away,
}

impl WinnerLabel {
    /// Deterministic function of the predicted goal difference.
    pub fn from_goal_difference(diff: f64) -> Self {
        if diff > DRAW_TOLERANCE {
            Self::Home
        } else if diff < -DRAW_TOLERANCE {
            Self::Away
        } else {
            Self::Draw
        }
    }

    /// Label for a settled integer scoreline; no tolerance applies.
    pub fn from_settled(home_goals: i32, away_goals: i32) -> Self {
        match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => Self::Home,
            std::cmp::Ordering::Less => Self::Away,
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Draw => "DRAW",
            Self::Away => "AWAY",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "HOME" => Ok(Self::Home),
            "DRAW" => Ok(Self::Draw),
            "AWAY" => Ok(Self::Away),
            other => Err(GoalcastError::DataIntegrity {
                match_id: String::new(),
                reason: format!("unknown winner label '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalLineLabel {
    Over,
    Under,
}

impl GoalLineLabel {
    /// Side of the line for a total. Totals at or below the line are
    /// Under, so a predicted 2.4 can never carry an OVER label.
    pub fn from_total(total: f64, line: f64) -> Self {
        if total > line {
            Self::Over
        } else {
            Self::Under
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Over => "OVER",
            Self::Under => "UNDER",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "OVER" => Ok(Self::Over),
            "UNDER" => Ok(Self::Under),
            other => Err(GoalcastError::DataIntegrity {
                match_id: String::new(),
                reason: format!("unknown goal line label '{other}'"),
            }),
        }
    }
}

/// Letter grade derived from confidence by a fixed monotonic step
/// function. The thresholds here are the single source of truth;
/// nothing downstream re-derives grades with different cut points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Grade {
    APlus,
    A,
    BPlus,
    B,
    CPlus,
    C,
    D,
}

impl Grade {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.90 {
            Self::APlus
        } else if confidence >= 0.80 {
            Self::A
        } else if confidence >= 0.70 {
            Self::BPlus
        } else if confidence >= 0.60 {
            Self::B
        } else if confidence >= 0.50 {
            Self::CPlus
        } else if confidence >= 0.40 {
            Self::C
        } else {
            Self::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Immutable output of one inference pass over one fixture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub match_id: String,
    pub kickoff_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub model_version: String,
    pub predicted_home_goals: f64,
    pub predicted_away_goals: f64,
    pub total_goals: f64,
    pub goal_difference: f64,
    pub winner: WinnerLabel,
    pub goal_line_label: GoalLineLabel,
    pub confidence: f64,
    pub grade: Grade,
}

impl Prediction {
    /// Builds a prediction from raw model outputs. Goals are floored
    /// at zero and confidence is clamped into [0, 1] here, before the
    /// labels are derived, so label and number can never contradict.
    #[allow(clippy::too_many_arguments)]
    pub fn from_model_output(
        match_id: String,
        kickoff_date: NaiveDate,
        home_team: String,
        away_team: String,
        model_version: String,
        raw_home_goals: f64,
        raw_away_goals: f64,
        raw_confidence: f64,
    ) -> Result<Self> {
        if raw_home_goals.is_nan() || raw_away_goals.is_nan() || raw_confidence.is_nan() {
            return Err(GoalcastError::DataIntegrity {
                match_id,
                reason: "model produced NaN output".to_string(),
            });
        }

        let predicted_home_goals = raw_home_goals.max(0.0);
        let predicted_away_goals = raw_away_goals.max(0.0);
        let total_goals = predicted_home_goals + predicted_away_goals;
        let goal_difference = predicted_home_goals - predicted_away_goals;
        let confidence = raw_confidence.clamp(0.0, 1.0);

        Ok(Self {
            match_id,
            kickoff_date,
            home_team,
            away_team,
            model_version,
            predicted_home_goals,
            predicted_away_goals,
            total_goals,
            goal_difference,
            winner: WinnerLabel::from_goal_difference(goal_difference),
            goal_line_label: GoalLineLabel::from_total(total_goals, GOAL_LINE),
            confidence,
            grade: Grade::from_confidence(confidence),
        })
    }

    /// Terminal status for this prediction against a settled result,
    /// graded on the fixed 2.5 line.
    pub fn settle(&self, result: &SettledResult) -> PredictionStatus {
        settle_labels(self.winner, self.goal_line_label, result, GOAL_LINE)
    }
}

/// Terminal status for a (winner, goal-line) pick against a settled
/// result.
///
/// Order matters: a total landing exactly on the line is a PUSH
/// before any label comparison (reachable on whole-goal lines; the
/// stock 2.5 line can never push on an integer score). Otherwise both
/// picked labels must match; a drawn match counts against a HOME or
/// AWAY pick the same way everywhere.
pub fn settle_labels(
    winner: WinnerLabel,
    goal_line_label: GoalLineLabel,
    result: &SettledResult,
    line: f64,
) -> PredictionStatus {
    let actual_total = f64::from(result.total_goals());
    if (actual_total - line).abs() < LINE_EPSILON {
        return PredictionStatus::Push;
    }

    let actual_winner = WinnerLabel::from_settled(result.home_goals, result.away_goals);
    let actual_side = GoalLineLabel::from_total(actual_total, line);

    if winner == actual_winner && goal_line_label == actual_side {
        PredictionStatus::Correct
    } else {
        PredictionStatus::Incorrect
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PredictionStatus {
    Pending,
    Correct,
    Incorrect,
    Push,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The only legal move is Pending to a terminal state. Terminal
    /// rows are settled history and never re-enter the machine.
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Correct => "CORRECT",
            Self::Incorrect => "INCORRECT",
            Self::Push => "PUSH",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CORRECT" => Ok(Self::Correct),
            "INCORRECT" => Ok(Self::Incorrect),
            "PUSH" => Ok(Self::Push),
            other => Err(GoalcastError::DataIntegrity {
                match_id: String::new(),
                reason: format!("unknown prediction status '{other}'"),
            }),
        }
    }
}

/// Profit at a 1-unit stake on the goal-line side the model picked.
/// None when the odds were never captured for the fixture; a push
/// always returns the stake regardless of odds availability.
pub fn unit_profit(status: PredictionStatus, side_odds: Option<Decimal>) -> Option<Decimal> {
    match status {
        PredictionStatus::Push => Some(Decimal::ZERO),
        PredictionStatus::Correct => side_odds.map(|odds| odds - dec!(1)),
        PredictionStatus::Incorrect => Some(dec!(-1)),
        PredictionStatus::Pending => None,
    }
}
