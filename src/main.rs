mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use goalcast_db::{DatabaseConnection, PgPredictionStore, PredictionGateway};
use goalcast_ml::GoalPredictor;
use goalcast_services::{FootyApi, FootyApiConfig, PredictionPipeline, ValidationService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goalcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "predict".to_string());

    info!("⚽ Starting Goalcast prediction pipeline, mode: {mode}");

    let config = AppConfig::new().context("loading configuration")?;
    if config.stats_api.api_key.is_empty() {
        bail!("stats_api.api_key is not configured");
    }
    info!("✅ Configuration loaded");
    info!("📊 Database: {}", config.database_url());

    let connection = DatabaseConnection::new(config.database_url(), config.database.max_connections)
        .await
        .context("connecting to primary database")?;
    connection.run_migrations().await.context("running migrations")?;

    let primary = Arc::new(PgPredictionStore::new(connection.pool().clone()));
    let mut gateway = PredictionGateway::new(primary);

    // A dead mirror must not block the daily run.
    if let Some(url) = &config.secondary_database.url {
        match DatabaseConnection::new(url, config.database.max_connections).await {
            Ok(secondary_conn) => {
                if let Err(e) = secondary_conn.run_migrations().await {
                    warn!("secondary store migrations failed: {e}");
                }
                gateway = gateway
                    .with_secondary(Arc::new(PgPredictionStore::new(secondary_conn.pool().clone())));
                info!("🔁 Secondary store mirroring enabled");
            }
            Err(e) => warn!("secondary store unavailable, continuing without it: {e}"),
        }
    }

    let api = Arc::new(FootyApi::new(FootyApiConfig {
        base_url: config.stats_api.base_url.clone(),
        api_key: config.stats_api.api_key.clone(),
        max_retries: config.stats_api.max_retries,
        retry_backoff_ms: config.stats_api.retry_backoff_ms,
    }));

    match mode.as_str() {
        "predict" => {
            let predictor = GoalPredictor::load(Path::new(&config.model.artifact_dir))
                .context("loading model artifacts")?;
            info!("🧠 Model loaded: {}", predictor.model_version());

            let pipeline = PredictionPipeline::new(api, predictor, gateway);
            let summary = pipeline.run_daily(Utc::now()).await?;

            info!(
                "🎯 Run complete: {} fetched, {} featurized, {} predicted, {} persisted, {} already stored, {} skipped",
                summary.fetched,
                summary.featurized,
                summary.predicted,
                summary.persisted,
                summary.skipped_existing,
                summary.skipped.len()
            );
            for skipped in &summary.skipped {
                info!("  ↳ skipped {}: {}", skipped.match_id, skipped.reason);
            }
        }
        "validate" => {
            let validator = ValidationService::new(api, gateway);
            let summary = validator.validate_pending().await?;

            info!(
                "🏁 Validation complete: {} examined, {} settled ({} correct / {} incorrect / {} push), {} still pending, {} failures",
                summary.examined,
                summary.settled,
                summary.correct,
                summary.incorrect,
                summary.push,
                summary.still_pending,
                summary.failures.len()
            );
        }
        other => bail!("unknown mode '{other}', expected 'predict' or 'validate'"),
    }

    Ok(())
}
