use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use goalcast_models::{
    Fixture, GoalcastError, MatchFeatures, Prediction, Result, FEATURE_NAMES,
    FEATURE_SCHEMA_VERSION,
};

/// Standardization parameters fit alongside the ridge models. The
/// recorded schema version and feature list are checked against the
/// builder's schema before any inference runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub schema_version: String,
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// One ridge regression head (home or away goals): weights over the
/// standardized feature vector, an intercept, and the residual
/// standard deviation observed on the training hold-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeArtifact {
    pub model_version: String,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub residual_std: f64,
}

/// Pre-trained goal predictor: scaler plus home/away ridge heads.
///
/// Inference order is pinned and matches training: standardize first,
/// then apply the ridge weights. `test_held_out_example` guards the
/// order against regressions, since swapping it degrades accuracy
/// silently rather than erroring.
pub struct GoalPredictor {
    scaler: ScalerArtifact,
    home: RidgeArtifact,
    away: RidgeArtifact,
    mean: Array1<f64>,
    scale: Array1<f64>,
    home_weights: Array1<f64>,
    away_weights: Array1<f64>,
}

impl GoalPredictor {
    /// Loads `scaler.json`, `ridge_home.json` and `ridge_away.json`
    /// from the artifact directory. Any read or parse failure is
    /// ModelUnavailable and fatal for the run: no partial predictions
    /// from a stale or half-loaded model.
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        let scaler: ScalerArtifact = read_artifact(&artifact_dir.join("scaler.json"))?;
        let home: RidgeArtifact = read_artifact(&artifact_dir.join("ridge_home.json"))?;
        let away: RidgeArtifact = read_artifact(&artifact_dir.join("ridge_away.json"))?;
        Self::from_artifacts(scaler, home, away)
    }

    /// Validates artifact consistency against the feature schema.
    /// Drift here is a ConfigurationError, never a silent reshape.
    pub fn from_artifacts(
        scaler: ScalerArtifact,
        home: RidgeArtifact,
        away: RidgeArtifact,
    ) -> Result<Self> {
        if scaler.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(GoalcastError::Configuration(format!(
                "scaler fit on feature schema '{}', builder emits '{}'",
                scaler.schema_version, FEATURE_SCHEMA_VERSION
            )));
        }
        if scaler.feature_names != FEATURE_NAMES {
            return Err(GoalcastError::Configuration(
                "scaler feature list does not match the builder schema".to_string(),
            ));
        }

        let width = FEATURE_NAMES.len();
        for (label, len) in [
            ("scaler mean", scaler.mean.len()),
            ("scaler scale", scaler.scale.len()),
            ("home weights", home.weights.len()),
            ("away weights", away.weights.len()),
        ] {
            if len != width {
                return Err(GoalcastError::Configuration(format!(
                    "{label} has width {len}, schema expects {width}"
                )));
            }
        }
        if scaler.scale.iter().any(|s| *s <= 0.0 || !s.is_finite()) {
            return Err(GoalcastError::Configuration(
                "scaler contains a non-positive scale entry".to_string(),
            ));
        }
        if home.residual_std <= 0.0 || away.residual_std <= 0.0 {
            return Err(GoalcastError::Configuration(
                "ridge artifact has a non-positive residual std".to_string(),
            ));
        }
        if home.model_version != away.model_version {
            return Err(GoalcastError::Configuration(format!(
                "home/away ridge heads disagree on version: '{}' vs '{}'",
                home.model_version, away.model_version
            )));
        }

        let mean = Array1::from(scaler.mean.clone());
        let scale = Array1::from(scaler.scale.clone());
        let home_weights = Array1::from(home.weights.clone());
        let away_weights = Array1::from(away.weights.clone());

        Ok(Self {
            scaler,
            home,
            away,
            mean,
            scale,
            home_weights,
            away_weights,
        })
    }

    pub fn model_version(&self) -> &str {
        &self.home.model_version
    }

    pub fn schema_version(&self) -> &str {
        &self.scaler.schema_version
    }

    /// Runs both ridge heads over one feature row and assembles the
    /// final prediction. Confidence is the predicted margin over the
    /// combined residual noise, clamped into [0, 1] inside
    /// `Prediction::from_model_output` before anything escapes.
    pub fn predict(&self, fixture: &Fixture, features: &MatchFeatures) -> Result<Prediction> {
        if features.match_id != fixture.match_id {
            return Err(GoalcastError::DataIntegrity {
                match_id: fixture.match_id.clone(),
                reason: format!(
                    "feature row belongs to match {}",
                    features.match_id
                ),
            });
        }

        let x = Array1::from(features.as_vec());
        let z = (&x - &self.mean) / &self.scale;

        let raw_home = self.home_weights.dot(&z) + self.home.intercept;
        let raw_away = self.away_weights.dot(&z) + self.away.intercept;

        let margin = (raw_home.max(0.0) - raw_away.max(0.0)).abs();
        let raw_confidence = margin / (self.home.residual_std + self.away.residual_std);

        Prediction::from_model_output(
            fixture.match_id.clone(),
            fixture.kickoff_date(),
            fixture.home_team_name.clone(),
            fixture.away_team_name.clone(),
            self.home.model_version.clone(),
            raw_home,
            raw_away,
            raw_confidence,
        )
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        GoalcastError::ModelUnavailable(format!("{}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        GoalcastError::ModelUnavailable(format!("{}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use goalcast_models::{GoalLineLabel, WinnerLabel};

    fn fixture() -> Fixture {
        Fixture {
            match_id: "m1".to_string(),
            kickoff_utc: Utc.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).unwrap(),
            home_team_id: "h".to_string(),
            home_team_name: "Home FC".to_string(),
            away_team_id: "a".to_string(),
            away_team_name: "Away FC".to_string(),
            league_id: "l1".to_string(),
            league_name: "League One".to_string(),
            odds: None,
        }
    }

    fn zero_features(match_id: &str) -> MatchFeatures {
        let mut values = serde_json::Map::new();
        for name in FEATURE_NAMES {
            values.insert(name.to_string(), serde_json::json!(0.0));
        }
        values.insert("match_id".to_string(), serde_json::json!(match_id));
        serde_json::from_value(serde_json::Value::Object(values)).unwrap()
    }

    fn scaler() -> ScalerArtifact {
        ScalerArtifact {
            schema_version: FEATURE_SCHEMA_VERSION.to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            mean: vec![0.0; FEATURE_NAMES.len()],
            scale: vec![1.0; FEATURE_NAMES.len()],
        }
    }

    fn ridge(intercept: f64, first_weight: f64, residual_std: f64) -> RidgeArtifact {
        let mut weights = vec![0.0; FEATURE_NAMES.len()];
        weights[0] = first_weight;
        RidgeArtifact {
            model_version: "ridge-v1".to_string(),
            weights,
            intercept,
            residual_std,
        }
    }

    #[test]
    fn test_held_out_example() {
        // Scale-then-weight order validated against a hand-computed
        // example: mean 2.0 / scale 0.5 on home_ppg, weight 0.3.
        let mut scaler = scaler();
        scaler.mean[0] = 2.0;
        scaler.scale[0] = 0.5;
        let predictor =
            GoalPredictor::from_artifacts(scaler, ridge(1.4, 0.3, 1.0), ridge(1.1, 0.0, 1.0))
                .unwrap();

        let mut features = zero_features("m1");
        features.home_ppg = 3.0;

        let prediction = predictor.predict(&fixture(), &features).unwrap();
        // z = (3.0 - 2.0) / 0.5 = 2.0; home = 1.4 + 0.3 * 2.0 = 2.0
        assert!((prediction.predicted_home_goals - 2.0).abs() < 1e-9);
        assert!((prediction.predicted_away_goals - 1.1).abs() < 1e-9);
        assert_eq!(prediction.winner, WinnerLabel::Home);
        assert_eq!(prediction.goal_line_label, GoalLineLabel::Over);
    }

    #[test]
    fn test_confidence_always_in_unit_range() {
        // Tiny residual stds blow the raw score far past 1.0; the
        // persisted value must still be clamped.
        let predictor =
            GoalPredictor::from_artifacts(scaler(), ridge(4.0, 0.0, 0.1), ridge(0.5, 0.0, 0.1))
                .unwrap();
        let prediction = predictor.predict(&fixture(), &zero_features("m1")).unwrap();
        assert!(prediction.confidence >= 0.0 && prediction.confidence <= 1.0);
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn test_schema_version_drift_is_fatal() {
        let mut drifted = scaler();
        drifted.schema_version = "v0".to_string();
        let result =
            GoalPredictor::from_artifacts(drifted, ridge(1.0, 0.0, 1.0), ridge(1.0, 0.0, 1.0));
        assert!(matches!(result, Err(GoalcastError::Configuration(_))));
    }

    #[test]
    fn test_reordered_feature_list_is_fatal() {
        let mut drifted = scaler();
        drifted.feature_names.swap(0, 1);
        let result =
            GoalPredictor::from_artifacts(drifted, ridge(1.0, 0.0, 1.0), ridge(1.0, 0.0, 1.0));
        assert!(matches!(result, Err(GoalcastError::Configuration(_))));
    }

    #[test]
    fn test_width_mismatch_is_fatal() {
        let mut short = ridge(1.0, 0.0, 1.0);
        short.weights.pop();
        let result = GoalPredictor::from_artifacts(scaler(), short, ridge(1.0, 0.0, 1.0));
        assert!(matches!(result, Err(GoalcastError::Configuration(_))));
    }

    #[test]
    fn test_foreign_feature_row_rejected() {
        let predictor =
            GoalPredictor::from_artifacts(scaler(), ridge(1.0, 0.0, 1.0), ridge(1.0, 0.0, 1.0))
                .unwrap();
        let result = predictor.predict(&fixture(), &zero_features("other_match"));
        assert!(matches!(result, Err(GoalcastError::DataIntegrity { .. })));
    }

    #[test]
    fn test_missing_artifacts_are_model_unavailable() {
        let result = GoalPredictor::load(Path::new("/nonexistent/artifacts"));
        assert!(matches!(result, Err(GoalcastError::ModelUnavailable(_))));
    }
}
