//! Inbound change-notification payloads.
//!
//! Shape: `{ "value": [ { "resourceData": { "@odata.id": "..." } }, ... ] }`.
//! Required fields are checked here so nothing downstream deals with
//! missing or mistyped JSON.

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// A batch of resource changes delivered by one webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    #[serde(rename = "value")]
    pub changes: Vec<ResourceChange>,
}

/// One changed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    #[serde(rename = "resourceData")]
    pub resource_data: ResourceData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Opaque resource path, e.g. `Users/{id}/Messages/{id}`.
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl ResourceChange {
    pub fn new(resource_path: impl Into<String>) -> Self {
        Self {
            resource_data: ResourceData {
                odata_id: resource_path.into(),
            },
        }
    }

    pub fn resource_path(&self) -> &str {
        &self.resource_data.odata_id
    }
}

impl ChangeNotification {
    /// Parse and validate a raw payload.
    pub fn from_json(raw: &str) -> Result<Self, PayloadError> {
        let notification: Self =
            serde_json::from_str(raw).map_err(|e| PayloadError::Malformed(e.to_string()))?;
        notification.check()?;
        Ok(notification)
    }

    /// Validate an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, PayloadError> {
        let notification: Self =
            serde_json::from_value(value).map_err(|e| PayloadError::Malformed(e.to_string()))?;
        notification.check()?;
        Ok(notification)
    }

    fn check(&self) -> Result<(), PayloadError> {
        if let Some(pos) = self
            .changes
            .iter()
            .position(|c| c.resource_path().trim().is_empty())
        {
            return Err(PayloadError::Malformed(format!(
                "value[{pos}].resourceData.@odata.id is empty"
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_graph_payload() {
        let raw = r##"{
            "value": [
                {
                    "subscriptionId": "sub-1",
                    "changeType": "created",
                    "resource": "Users/u1/Messages/m1",
                    "resourceData": {
                        "@odata.type": "#Microsoft.Graph.Message",
                        "@odata.id": "Users/u1/Messages/m1",
                        "id": "m1"
                    }
                },
                { "resourceData": { "@odata.id": "Users/u1/Messages/m2" } }
            ]
        }"##;
        let n = ChangeNotification::from_json(raw).unwrap();
        assert_eq!(n.len(), 2);
        assert_eq!(n.changes[0].resource_path(), "Users/u1/Messages/m1");
        assert_eq!(n.changes[1].resource_path(), "Users/u1/Messages/m2");
    }

    #[test]
    fn empty_batch_is_valid() {
        let n = ChangeNotification::from_json(r#"{"value": []}"#).unwrap();
        assert!(n.is_empty());
    }

    #[test]
    fn missing_value_is_malformed() {
        let err = ChangeNotification::from_json(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn missing_odata_id_is_malformed() {
        let err = ChangeNotification::from_json(r#"{"value": [{"resourceData": {"id": "m1"}}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("@odata.id"));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let err =
            ChangeNotification::from_json(r#"{"value": [{"resourceData": {"@odata.id": 42}}]}"#)
                .unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn blank_resource_path_is_malformed() {
        let err = ChangeNotification::from_value(serde_json::json!({
            "value": [
                { "resourceData": { "@odata.id": "Users/u1/Messages/m1" } },
                { "resourceData": { "@odata.id": "  " } }
            ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("value[1]"));
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(ChangeNotification::from_json("validationToken=abc").is_err());
    }
}
