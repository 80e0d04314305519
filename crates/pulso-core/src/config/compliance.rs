//! Content validation and payload encryption configuration.

use serde::{Deserialize, Serialize};

/// Content validation and payload encryption configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Payload data fields whose values are replaced with ciphertext
    /// before the notification leaves the engine.
    #[serde(default = "default_sensitive_fields")]
    pub sensitive_fields: Vec<String>,
    /// Base64-encoded 16-byte AES key for payload field encryption.
    ///
    /// The built-in default is a development key; deployments override it
    /// through `PULSO__COMPLIANCE__ENCRYPTION_KEY`.
    #[serde(default = "default_encryption_key")]
    pub encryption_key: String,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            sensitive_fields: default_sensitive_fields(),
            encryption_key: default_encryption_key(),
        }
    }
}

fn default_sensitive_fields() -> Vec<String> {
    vec![
        "cpf".to_string(),
        "phone".to_string(),
        "address".to_string(),
        "medical_notes".to_string(),
    ]
}

fn default_encryption_key() -> String {
    // "pulso-dev-key-16"
    "cHVsc28tZGV2LWtleS0xNg==".to_string()
}
