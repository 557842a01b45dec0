use figment::providers::Env;
use figment::Figment;
use serde::{Deserialize, Serialize};

pub(crate) const ASSET_STORAGE_BUCKET: &str = "ASSET_STORAGE_BUCKET";
pub(crate) const FEATURE_TABLE_NAME: &str = "APPFEATUREENABLED_STORAGE_TABLE_NAME";

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Config {
    pub asset_storage_bucket: Option<String>,
    #[serde(rename = "appfeatureenabled_storage_table_name")]
    pub feature_table_name: Option<String>,
}

impl Config {
    /// The provider chain; values are read from the environment on every `extract_from`.
    pub fn figment() -> Figment {
        Figment::new().merge(Env::raw().only(&[ASSET_STORAGE_BUCKET, FEATURE_TABLE_NAME]))
    }

    pub fn extract_from(figment: &Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}
