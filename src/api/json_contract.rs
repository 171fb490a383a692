use serde::{Deserialize, Serialize};

use crate::error::{InspectorError, InspectorResult};

use super::InspectorSnapshot;

pub const INSPECTOR_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: InspectorSnapshot,
}

impl InspectorSnapshot {
    pub fn to_json_pretty(&self) -> InspectorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            InspectorError::InvalidData(format!("failed to serialize snapshot json: {e}"))
        })
    }

    pub fn to_json_contract_v1_pretty(&self) -> InspectorResult<String> {
        let payload = InspectorSnapshotJsonContractV1 {
            schema_version: INSPECTOR_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            InspectorError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts both a bare snapshot and a versioned v1 contract payload.
    pub fn from_json_compat_str(input: &str) -> InspectorResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<InspectorSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: InspectorSnapshotJsonContractV1 =
            serde_json::from_str(input).map_err(|e| {
                InspectorError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
            })?;
        if payload.schema_version != INSPECTOR_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(InspectorError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}
