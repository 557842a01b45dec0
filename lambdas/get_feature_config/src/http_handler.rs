use crate::config::Config;
use figment::Figment;
use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use shared::core::{FeatureConfig, FeatureConfigReader, FeatureRepository};
use shared::utils::{error_response, json_response};

pub(crate) struct HandlerDeps<R: FeatureRepository> {
    pub config_source: Figment,
    pub config_reader: FeatureConfigReader<R>,
}

#[tracing::instrument(skip(deps, event))]
pub(crate) async fn function_handler<R: FeatureRepository>(
    deps: &HandlerDeps<R>,
    event: Request,
) -> Result<Response<Body>, Error> {
    tracing::info!("Received {} {}", event.method(), event.uri().path());

    let response = read_feature_config(deps)
        .await
        .and_then(|feature_config| json_response(&StatusCode::OK, &feature_config));

    match response {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::error!("Failed to read feature configuration: {}", e);
            error_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn read_feature_config<R: FeatureRepository>(
    deps: &HandlerDeps<R>,
) -> Result<FeatureConfig, Error> {
    let config = Config::extract_from(&deps.config_source)?;

    tracing::info!(
        "Reading enabled features from {:?}",
        config.feature_table_name
    );
    let feature_config = deps
        .config_reader
        .read(
            config.asset_storage_bucket,
            config.feature_table_name.as_deref(),
        )
        .await?;
    tracing::info!(
        "Read {} enabled features",
        feature_config.feature_count()
    );

    Ok(feature_config)
}
