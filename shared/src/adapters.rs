use crate::{
    core::{
        ContinuationToken, FeaturePage, FeatureRepository, FeatureRow, ENABLED_ATTRIBUTE,
        ENABLED_VALUE, FEATURE_NAME_ATTRIBUTE, FEATURE_SEPARATOR,
    },
    error::FeatureConfigError,
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    types::{AttributeValue, PutRequest, WriteRequest},
    Client,
};
use std::collections::{HashMap, HashSet};

pub const SCAN_PAGE_SIZE: i32 = 100;
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

#[derive(Debug)]
pub struct DynamoDbFeatureRepository {
    dynamodb_client: Client,
}

impl DynamoDbFeatureRepository {
    pub fn new(dynamodb_client: Client) -> Self {
        Self { dynamodb_client }
    }

    /// Writes one `{enabled: "true", featureName}` row per distinct, non-empty name.
    /// Returns how many rows were written.
    pub async fn seed_enabled_features(
        &self,
        table_name: &str,
        feature_names: &[String],
    ) -> Result<usize, FeatureConfigError> {
        let batches = seed_batches(feature_names)?;
        let mut written = 0;

        for batch in batches {
            let batch_len = batch.len();
            let result = self
                .dynamodb_client
                .batch_write_item()
                .request_items(table_name, batch)
                .send()
                .await
                .map_err(|e| {
                    FeatureConfigError::Store(format!(
                        "Error writing feature rows: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            let unprocessed = result
                .unprocessed_items
                .unwrap_or_default()
                .values()
                .map(Vec::len)
                .sum::<usize>();
            if unprocessed > 0 {
                return Err(FeatureConfigError::Store(format!(
                    "{} of {} feature rows were not processed",
                    unprocessed, batch_len
                )));
            }

            written += batch_len;
            tracing::info!("Wrote {} feature rows to {}", batch_len, table_name);
        }

        Ok(written)
    }
}

#[async_trait]
impl FeatureRepository for DynamoDbFeatureRepository {
    async fn list_features(
        &self,
        table_name: &str,
        start_key: Option<ContinuationToken>,
    ) -> Result<FeaturePage, FeatureConfigError> {
        let result = self
            .dynamodb_client
            .scan()
            .table_name(table_name)
            .limit(SCAN_PAGE_SIZE)
            .set_exclusive_start_key(start_key.map(to_exclusive_start_key))
            .send()
            .await
            .map_err(|e| {
                FeatureConfigError::Store(format!(
                    "Error executing scan: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let rows = result
            .items
            .unwrap_or_default()
            .into_iter()
            .map(FeatureRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let continuation_token = result
            .last_evaluated_key
            .filter(|key| !key.is_empty())
            .map(to_continuation_token)
            .transpose()?;

        Ok(FeaturePage::new(rows, continuation_token))
    }
}

fn to_exclusive_start_key(token: ContinuationToken) -> HashMap<String, AttributeValue> {
    token
        .into_inner()
        .into_iter()
        .map(|(name, value)| (name, AttributeValue::S(value)))
        .collect()
}

fn to_continuation_token(
    key: HashMap<String, AttributeValue>,
) -> Result<ContinuationToken, FeatureConfigError> {
    key.into_iter()
        .map(|(name, value)| match value {
            AttributeValue::S(s) => Ok((name, s)),
            _ => Err(FeatureConfigError::MalformedRow(format!(
                "continuation key attribute {} is not a String",
                name
            ))),
        })
        .collect::<Result<HashMap<_, _>, _>>()
        .map(ContinuationToken::new)
}

/// Builds BatchWriteItem requests for the given names, at most 25 per batch.
/// Names containing the separator are rejected before anything is built.
pub fn seed_batches(feature_names: &[String]) -> Result<Vec<Vec<WriteRequest>>, FeatureConfigError> {
    if let Some(name) = feature_names
        .iter()
        .find(|name| name.contains(FEATURE_SEPARATOR))
    {
        return Err(FeatureConfigError::InvalidFeatureName(name.to_string()));
    }

    let mut seen = HashSet::new();
    let requests = feature_names
        .iter()
        .filter(|name| !name.is_empty() && seen.insert(name.as_str()))
        .map(|name| {
            PutRequest::builder()
                .item(ENABLED_ATTRIBUTE, AttributeValue::S(ENABLED_VALUE.to_string()))
                .item(FEATURE_NAME_ATTRIBUTE, AttributeValue::S(name.to_string()))
                .build()
                .map(|put| WriteRequest::builder().put_request(put).build())
                .map_err(|e| FeatureConfigError::Store(format!("Error building put request: {}", e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(requests
        .chunks(MAX_BATCH_WRITE_ITEMS)
        .map(|chunk| chunk.to_vec())
        .collect())
}

impl TryFrom<HashMap<String, AttributeValue>> for FeatureRow {
    type Error = FeatureConfigError;

    fn try_from(item: HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        let feature_name = item
            .get(FEATURE_NAME_ATTRIBUTE)
            .ok_or_else(|| FeatureConfigError::MalformedRow("featureName not found".to_string()))?
            .as_s()
            .map(|s| s.to_string())
            .map_err(|_| FeatureConfigError::MalformedRow("featureName is not a String".to_string()))?;
        let enabled = item.get(ENABLED_ATTRIBUTE).and_then(|value| match value {
            AttributeValue::S(s) => Some(s.to_string()),
            AttributeValue::Bool(b) => Some(b.to_string()),
            _ => None,
        });

        Ok(FeatureRow::new(feature_name, enabled))
    }
}

#[cfg(test)]
mod tests {
    use super::{seed_batches, to_continuation_token, to_exclusive_start_key};
    use crate::core::{ContinuationToken, FeatureRow};
    use crate::error::FeatureConfigError;
    use aws_sdk_dynamodb::types::AttributeValue;
    use std::collections::HashMap;

    fn item(attributes: &[(&str, AttributeValue)]) -> HashMap<String, AttributeValue> {
        attributes
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn when_item_has_string_attributes_should_convert() {
        let row = FeatureRow::try_from(item(&[
            ("featureName", AttributeValue::S("OPENSEARCH".to_string())),
            ("enabled", AttributeValue::S("true".to_string())),
        ]))
        .unwrap();

        assert_eq!(row.feature_name, "OPENSEARCH");
        assert!(row.is_enabled());
    }

    #[test]
    fn when_enabled_is_bool_should_compare_as_string() {
        let on = FeatureRow::try_from(item(&[
            ("featureName", AttributeValue::S("a".to_string())),
            ("enabled", AttributeValue::Bool(true)),
        ]))
        .unwrap();
        let off = FeatureRow::try_from(item(&[
            ("featureName", AttributeValue::S("b".to_string())),
            ("enabled", AttributeValue::Bool(false)),
        ]))
        .unwrap();

        assert!(on.is_enabled());
        assert!(!off.is_enabled());
    }

    #[test]
    fn when_enabled_missing_should_be_disabled() {
        let row = FeatureRow::try_from(item(&[(
            "featureName",
            AttributeValue::S("a".to_string()),
        )]))
        .unwrap();

        assert_eq!(row.enabled, None);
        assert!(!row.is_enabled());
    }

    #[test]
    fn when_feature_name_missing_should_fail() {
        let result = FeatureRow::try_from(item(&[(
            "enabled",
            AttributeValue::S("true".to_string()),
        )]));

        assert!(matches!(result, Err(FeatureConfigError::MalformedRow(_))));
    }

    #[test]
    fn when_feature_name_not_a_string_should_fail() {
        let result = FeatureRow::try_from(item(&[
            ("featureName", AttributeValue::N("1".to_string())),
            ("enabled", AttributeValue::S("true".to_string())),
        ]));

        assert!(matches!(result, Err(FeatureConfigError::MalformedRow(_))));
    }

    #[test]
    fn continuation_token_keeps_key_attributes() {
        let key = item(&[
            ("enabled", AttributeValue::S("true".to_string())),
            ("featureName", AttributeValue::S("GOVCLOUD".to_string())),
        ]);

        let token = to_continuation_token(key.clone()).unwrap();

        assert_eq!(
            token,
            ContinuationToken::new(HashMap::from([
                ("enabled".to_string(), "true".to_string()),
                ("featureName".to_string(), "GOVCLOUD".to_string()),
            ]))
        );
        assert_eq!(to_exclusive_start_key(token), key);
    }

    #[test]
    fn when_continuation_key_not_a_string_should_fail() {
        let result = to_continuation_token(item(&[("id", AttributeValue::N("7".to_string()))]));

        assert!(matches!(result, Err(FeatureConfigError::MalformedRow(_))));
    }

    #[test]
    fn seed_batches_drop_duplicates_and_empty_names() {
        let names = vec![
            "GOVCLOUD".to_string(),
            "".to_string(),
            "OPENSEARCH".to_string(),
            "GOVCLOUD".to_string(),
        ];

        let batches = seed_batches(&names).unwrap();

        assert_eq!(batches.len(), 1);
        let written: Vec<String> = batches[0]
            .iter()
            .map(|request| {
                let put = request.put_request().unwrap();
                assert_eq!(
                    put.item().get("enabled"),
                    Some(&AttributeValue::S("true".to_string()))
                );
                put.item()["featureName"].as_s().unwrap().to_string()
            })
            .collect();
        assert_eq!(written, vec!["GOVCLOUD", "OPENSEARCH"]);
    }

    #[test]
    fn seed_batches_reject_names_containing_separator() {
        let names = vec!["GOVCLOUD".to_string(), "a,b".to_string()];

        let result = seed_batches(&names);

        assert!(matches!(
            result,
            Err(FeatureConfigError::InvalidFeatureName(name)) if name == "a,b"
        ));
    }

    #[test]
    fn seed_batches_split_at_twenty_five_items() {
        let names: Vec<String> = (0..60).map(|i| format!("feature-{}", i)).collect();

        let batches = seed_batches(&names).unwrap();

        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![25, 25, 10]);
    }
}
