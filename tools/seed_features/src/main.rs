use anyhow::{bail, Context, Result};
use figment::providers::Env;
use figment::Figment;
use serde::Deserialize;
use shared::adapters::DynamoDbFeatureRepository;
use std::env;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct SeedConfig {
    #[serde(rename = "appfeatureenabled_storage_table_name")]
    feature_table_name: String,
}

/// Marks every feature named on the command line as enabled, e.g.
/// `seed_features GOVCLOUD OPENSEARCH`.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: SeedConfig = Figment::new()
        .merge(Env::raw().only(&["APPFEATUREENABLED_STORAGE_TABLE_NAME"]))
        .extract()
        .context("APPFEATUREENABLED_STORAGE_TABLE_NAME is not set")?;

    let feature_names: Vec<String> = env::args().skip(1).collect();
    if feature_names.is_empty() {
        bail!("usage: seed_features <FEATURE_NAME>...");
    }

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let feature_repo = DynamoDbFeatureRepository::new(aws_sdk_dynamodb::Client::new(&aws_config));

    let written = feature_repo
        .seed_enabled_features(&config.feature_table_name, &feature_names)
        .await?;
    tracing::info!(
        "Enabled {} features in {}",
        written,
        config.feature_table_name
    );

    Ok(())
}
