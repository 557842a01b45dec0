use crate::config::Config;
use crate::http_handler::{function_handler, HandlerDeps};
use lambda_http::{run, service_fn, tracing, Error};
use shared::adapters::DynamoDbFeatureRepository;
use shared::core::FeatureConfigReader;

mod config;
mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);

    let feature_repo = DynamoDbFeatureRepository::new(dynamodb_client);
    let deps = HandlerDeps {
        config_source: Config::figment(),
        config_reader: FeatureConfigReader::new(feature_repo),
    };

    run(service_fn(|event| function_handler(&deps, event))).await
}
