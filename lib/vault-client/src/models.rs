use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// KV v2 secret data with version metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvData {
    pub data: HashMap<String, serde_json::Value>,
    pub metadata: KvVersion,
}

/// Version information for a secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvVersion {
    pub version: u64,
    pub created_time: DateTime<Utc>,
    #[serde(default)]
    pub destroyed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_data_deserialize() {
        let json = r#"{
            "data": {"value": "db.internal"},
            "metadata": {
                "version": 3,
                "created_time": "2024-01-01T00:00:00Z",
                "destroyed": false
            }
        }"#;
        let data: KvData = serde_json::from_str(json).unwrap();
        assert_eq!(data.metadata.version, 3);
        assert_eq!(data.data.get("value").unwrap(), "db.internal");
    }

    #[test]
    fn test_kv_version_destroyed_defaults_to_false() {
        let json = r#"{
            "version": 2,
            "created_time": "2024-01-01T00:00:00Z"
        }"#;
        let version: KvVersion = serde_json::from_str(json).unwrap();
        assert_eq!(version.version, 2);
        assert!(!version.destroyed);
    }
}
