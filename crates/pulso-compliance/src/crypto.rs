//! Payload field encryption.
//!
//! Sensitive fields inside a notification's data payload are replaced
//! with AES-128-CBC ciphertext before the payload leaves the engine.
//! Each value gets a fresh random IV; the stored form is
//! `base64(iv || ciphertext)`.

use aes::Aes128;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::RngExt;
use serde_json::Value;

use pulso_core::config::compliance::ComplianceConfig;
use pulso_core::error::{AppError, ErrorKind};
use pulso_core::result::AppResult;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const IV_LEN: usize = 16;

/// Encrypts configured sensitive payload fields.
#[derive(Clone, Debug)]
pub struct PayloadCipher {
    key: [u8; 16],
    sensitive_fields: Vec<String>,
}

impl PayloadCipher {
    /// Build a cipher from configuration. Fails when the configured key
    /// does not decode to exactly 16 bytes.
    pub fn new(config: &ComplianceConfig) -> AppResult<Self> {
        let decoded = BASE64.decode(&config.encryption_key).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Encryption key is not base64", e)
        })?;
        let key: [u8; 16] = decoded.try_into().map_err(|_| {
            AppError::configuration("Encryption key must decode to exactly 16 bytes")
        })?;

        Ok(Self {
            key,
            sensitive_fields: config.sensitive_fields.clone(),
        })
    }

    /// Replace every configured sensitive string field in `data` with
    /// ciphertext. Sets `_encrypted: true` only when at least one field
    /// was replaced; payloads without sensitive fields pass through
    /// untouched.
    pub fn encrypt_payload(&self, mut data: Value) -> AppResult<Value> {
        let Some(object) = data.as_object_mut() else {
            return Ok(data);
        };

        let mut replaced = false;
        for field in &self.sensitive_fields {
            if let Some(Value::String(plaintext)) = object.get(field.as_str()) {
                let ciphertext = self.encrypt_string(plaintext);
                object.insert(field.clone(), Value::String(ciphertext));
                replaced = true;
            }
        }

        if replaced {
            object.insert("_encrypted".to_string(), Value::Bool(true));
        }
        Ok(data)
    }

    /// Recover the plaintext of one encrypted field value. Used by
    /// operational tooling, never on the delivery path.
    pub fn decrypt_field(&self, encoded: &str) -> AppResult<String> {
        let combined = BASE64.decode(encoded).map_err(|e| {
            AppError::with_source(ErrorKind::Validation, "Encrypted field is not base64", e)
        })?;
        if combined.len() < IV_LEN {
            return Err(AppError::validation("Encrypted field is too short"));
        }

        let (iv, ciphertext) = combined.split_at(IV_LEN);
        let plaintext = Aes128CbcDec::new(&self.key.into(), iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| AppError::validation("Encrypted field failed to decrypt"))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::with_source(ErrorKind::Validation, "Decrypted value is not UTF-8", e))
    }

    fn encrypt_string(&self, plaintext: &str) -> String {
        let iv: [u8; IV_LEN] = rand::rng().random();
        let ciphertext = Aes128CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut combined = Vec::with_capacity(IV_LEN + ciphertext.len());
        combined.extend_from_slice(&iv);
        combined.extend_from_slice(&ciphertext);
        BASE64.encode(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cipher() -> PayloadCipher {
        PayloadCipher::new(&ComplianceConfig::default()).unwrap()
    }

    #[test]
    fn test_sensitive_fields_replaced_and_flagged() {
        let data = json!({"cpf": "123.456.789-00", "appointment": "tomorrow"});
        let encrypted = cipher().encrypt_payload(data).unwrap();

        assert_eq!(encrypted["_encrypted"], json!(true));
        assert_eq!(encrypted["appointment"], json!("tomorrow"));
        assert_ne!(encrypted["cpf"], json!("123.456.789-00"));
    }

    #[test]
    fn test_payload_without_sensitive_fields_untouched() {
        let data = json!({"appointment": "tomorrow", "room": 4});
        let encrypted = cipher().encrypt_payload(data.clone()).unwrap();
        assert_eq!(encrypted, data);
        assert!(encrypted.get("_encrypted").is_none());
    }

    #[test]
    fn test_encrypted_field_roundtrips() {
        let cipher = cipher();
        let data = json!({"phone": "+55 11 91234-5678"});
        let encrypted = cipher.encrypt_payload(data).unwrap();

        let stored = encrypted["phone"].as_str().unwrap();
        assert_eq!(cipher.decrypt_field(stored).unwrap(), "+55 11 91234-5678");
    }

    #[test]
    fn test_fresh_iv_per_encryption() {
        let cipher = cipher();
        let a = cipher.encrypt_payload(json!({"cpf": "same"})).unwrap();
        let b = cipher.encrypt_payload(json!({"cpf": "same"})).unwrap();
        assert_ne!(a["cpf"], b["cpf"]);
    }

    #[test]
    fn test_non_string_sensitive_values_left_alone() {
        let data = json!({"cpf": 12345678900u64});
        let encrypted = cipher().encrypt_payload(data.clone()).unwrap();
        assert_eq!(encrypted, data);
    }

    #[test]
    fn test_bad_key_rejected() {
        let config = ComplianceConfig {
            encryption_key: BASE64.encode(b"short"),
            ..Default::default()
        };
        let err = PayloadCipher::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let err = cipher().decrypt_field("bm90IGEgcmVhbCBjaXBoZXJ0ZXh0ISE=").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
