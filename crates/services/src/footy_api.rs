use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::{sleep, Duration};

use goalcast_models::{
    Fixture, GoalcastError, OddsSnapshot, Result, SettledResult, TeamStats,
};

/// The 3-day forward window (today, +1, +2) on the UTC calendar.
/// The window is a pure function of the instant passed in; callers
/// hand it `Utc::now()` so the host timezone can never leak in.
pub fn forecast_window_from(now: DateTime<Utc>) -> [NaiveDate; 3] {
    let today = now.date_naive();
    [
        today,
        today + chrono::Days::new(1),
        today + chrono::Days::new(2),
    ]
}

pub fn forecast_window() -> [NaiveDate; 3] {
    forecast_window_from(Utc::now())
}

/// Upstream fixture/statistics source seam for the pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn fixtures_for(&self, date: NaiveDate) -> Result<Vec<Fixture>>;

    /// Recent-window statistics for one team. Fails with
    /// MissingStatistics when the provider has no record for the
    /// team; the caller excludes the fixture rather than zero-fill.
    async fn team_stats(&self, team_id: &str) -> Result<TeamStats>;
}

/// Settled-results source seam for the validator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultsProvider: Send + Sync {
    /// Final score for a completed match. ResultUnavailable while
    /// the match has not finished; the row stays PENDING.
    async fn settled_result(&self, match_id: &str) -> Result<SettledResult>;
}

#[derive(Debug, Clone)]
pub struct FootyApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for FootyApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.football-data-api.com".to_string(),
            api_key: String::new(),
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

/// HTTP client for the football statistics provider. Transient
/// failures are retried with exponential backoff up to the configured
/// budget; exhaustion surfaces UpstreamUnavailable to the core.
pub struct FootyApi {
    client: reqwest::Client,
    config: FootyApiConfig,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
struct ApiFixture {
    id: i64,
    date_unix: i64,
    #[serde(rename = "homeID")]
    home_id: i64,
    home_name: String,
    #[serde(rename = "awayID")]
    away_id: i64,
    away_name: String,
    competition_id: i64,
    league_name: Option<String>,
    odds_ft_1: Option<Decimal>,
    odds_ft_x: Option<Decimal>,
    odds_ft_2: Option<Decimal>,
    odds_ft_over25: Option<Decimal>,
    odds_ft_under25: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ApiMatchDetail {
    #[allow(dead_code)]
    id: i64,
    status: String,
    #[serde(rename = "homeGoalCount")]
    home_goal_count: i32,
    #[serde(rename = "awayGoalCount")]
    away_goal_count: i32,
}

impl FootyApi {
    pub fn new(config: FootyApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// GET with retry/backoff. Returns Ok(None) on a 404 so callers
    /// can map "not found" to their own domain error; every other
    /// failure mode retries and eventually surfaces
    /// UpstreamUnavailable.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = self.config.retry_backoff_ms * 2u64.pow(attempt - 1);
                sleep(Duration::from_millis(backoff)).await;
            }

            let request = self
                .client
                .get(&url)
                .query(&[("key", self.config.api_key.as_str())])
                .query(params);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if status.is_success() {
                        let envelope: Envelope<T> = response.json().await.map_err(|e| {
                            GoalcastError::UpstreamUnavailable(format!(
                                "{path}: malformed response: {e}"
                            ))
                        })?;
                        return Ok(Some(envelope.data));
                    }
                    last_error = format!("{path}: HTTP {status}");
                    if status.is_client_error() {
                        // 4xx other than 404 will not improve on retry.
                        break;
                    }
                }
                Err(e) => {
                    last_error = format!("{path}: {e}");
                }
            }
            tracing::debug!(attempt, error = %last_error, "stats API request failed");
        }

        Err(GoalcastError::UpstreamUnavailable(last_error))
    }
}

#[async_trait]
impl StatsProvider for FootyApi {
    async fn fixtures_for(&self, date: NaiveDate) -> Result<Vec<Fixture>> {
        let fixtures: Vec<ApiFixture> = self
            .get_json("/todays-matches", &[("date", date.format("%Y-%m-%d").to_string())])
            .await?
            .unwrap_or_default();

        Ok(fixtures.into_iter().filter_map(to_fixture).collect())
    }

    async fn team_stats(&self, team_id: &str) -> Result<TeamStats> {
        let stats: Option<TeamStats> = self
            .get_json("/lastx", &[("team_id", team_id.to_string())])
            .await?;

        stats.ok_or_else(|| GoalcastError::MissingStatistics {
            match_id: format!("team:{team_id}"),
        })
    }
}

#[async_trait]
impl ResultsProvider for FootyApi {
    async fn settled_result(&self, match_id: &str) -> Result<SettledResult> {
        let detail: ApiMatchDetail = self
            .get_json("/match", &[("match_id", match_id.to_string())])
            .await?
            .ok_or_else(|| GoalcastError::ResultUnavailable {
                match_id: match_id.to_string(),
            })?;

        if detail.status != "complete" {
            return Err(GoalcastError::ResultUnavailable {
                match_id: match_id.to_string(),
            });
        }

        Ok(SettledResult {
            match_id: match_id.to_string(),
            home_goals: detail.home_goal_count,
            away_goals: detail.away_goal_count,
        })
    }
}

fn to_fixture(api: ApiFixture) -> Option<Fixture> {
    let kickoff_utc = DateTime::<Utc>::from_timestamp(api.date_unix, 0)?;

    // The feed reports absent odds as values at or below 1.0.
    let priced = |odds: Option<Decimal>| odds.filter(|o| *o > Decimal::ONE);
    let odds = match (priced(api.odds_ft_1), priced(api.odds_ft_x), priced(api.odds_ft_2)) {
        (Some(home), Some(draw), Some(away)) => Some(OddsSnapshot {
            home,
            draw,
            away,
            over_line: priced(api.odds_ft_over25),
            under_line: priced(api.odds_ft_under25),
        }),
        _ => None,
    };

    Some(Fixture {
        match_id: api.id.to_string(),
        kickoff_utc,
        home_team_id: api.home_id.to_string(),
        home_team_name: api.home_name,
        away_team_id: api.away_id.to_string(),
        away_team_name: api.away_name,
        league_id: api.competition_id.to_string(),
        league_name: api.league_name.unwrap_or_default(),
        odds,
    })
}
