use crate::error::FeatureConfigError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

pub const FEATURE_NAME_ATTRIBUTE: &str = "featureName";
pub const ENABLED_ATTRIBUTE: &str = "enabled";
pub const ENABLED_VALUE: &str = "true";
pub const FEATURE_SEPARATOR: &str = ",";

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait FeatureRepository: Debug {
    /// Reads one page of feature rows, starting after `start_key` when given.
    async fn list_features(
        &self,
        table_name: &str,
        start_key: Option<ContinuationToken>,
    ) -> Result<FeaturePage, FeatureConfigError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureRow {
    pub feature_name: String,
    pub enabled: Option<String>,
}

impl FeatureRow {
    pub fn new(feature_name: String, enabled: Option<String>) -> Self {
        Self {
            feature_name,
            enabled,
        }
    }

    pub fn enabled(feature_name: &str) -> Self {
        Self::new(feature_name.to_string(), Some(ENABLED_VALUE.to_string()))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.as_deref() == Some(ENABLED_VALUE)
    }
}

/// Opaque cursor handed back by the store while more rows remain.
/// Maps key attribute names to their string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationToken(HashMap<String, String>);

impl ContinuationToken {
    pub fn new(key: HashMap<String, String>) -> Self {
        Self(key)
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct FeaturePage {
    pub rows: Vec<FeatureRow>,
    pub continuation_token: Option<ContinuationToken>,
}

impl FeaturePage {
    pub fn new(rows: Vec<FeatureRow>, continuation_token: Option<ContinuationToken>) -> Self {
        Self {
            rows,
            continuation_token,
        }
    }
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureConfig {
    pub bucket: Option<String>,
    pub features_enabled: String,
}

impl FeatureConfig {
    pub fn new(bucket: Option<String>, feature_names: &[String]) -> Self {
        Self {
            bucket,
            features_enabled: feature_names.join(FEATURE_SEPARATOR),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.features_enabled
            .split(FEATURE_SEPARATOR)
            .filter(|name| !name.is_empty())
            .count()
    }
}

#[derive(Debug)]
pub struct FeatureConfigReader<R: FeatureRepository> {
    feature_repo: R,
}

impl<R: FeatureRepository> FeatureConfigReader<R> {
    pub fn new(feature_repo: R) -> Self {
        Self { feature_repo }
    }

    pub async fn read(
        &self,
        bucket: Option<String>,
        table_name: Option<&str>,
    ) -> Result<FeatureConfig, FeatureConfigError> {
        let table_name = table_name
            .filter(|name| !name.is_empty())
            .ok_or(FeatureConfigError::MissingTableName)?;

        let feature_names = self.enabled_feature_names(table_name).await?;

        Ok(FeatureConfig::new(bucket, &feature_names))
    }

    /// Pages through the whole table and returns the names of enabled features
    /// in the order the store yields them. Any page failure discards what was
    /// gathered so far.
    pub async fn enabled_feature_names(
        &self,
        table_name: &str,
    ) -> Result<Vec<String>, FeatureConfigError> {
        let mut feature_names = vec![];
        let mut start_key: Option<ContinuationToken> = None;

        loop {
            let page = self
                .feature_repo
                .list_features(table_name, start_key.clone())
                .await?;

            for row in page.rows.into_iter().filter(FeatureRow::is_enabled) {
                if row.feature_name.is_empty() {
                    tracing::warn!("Skipping enabled feature row with an empty name");
                    continue;
                }
                if row.feature_name.contains(FEATURE_SEPARATOR) {
                    tracing::warn!(
                        "Skipping enabled feature {:?}: name contains the separator",
                        row.feature_name
                    );
                    continue;
                }
                feature_names.push(row.feature_name);
            }

            match page.continuation_token {
                None => break,
                Some(next_key) if start_key.as_ref() == Some(&next_key) => {
                    return Err(FeatureConfigError::StalledPagination);
                }
                Some(next_key) => start_key = Some(next_key),
            }
        }

        Ok(feature_names)
    }
}
