use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureConfigError {
    #[error("feature table name is not configured")]
    MissingTableName,
    #[error("error reading feature table: {0}")]
    Store(String),
    #[error("invalid feature name {0:?}: names must not contain a comma")]
    InvalidFeatureName(String),
    #[error("malformed feature row: {0}")]
    MalformedRow(String),
    #[error("feature table returned the same continuation key twice")]
    StalledPagination,
}
