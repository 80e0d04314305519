//! Compliance layer: outbound content validation, payload field
//! encryption, the consent ledger, and data-portability/erasure tooling.
//!
//! Every send passes through this layer before it may touch the
//! transport: the consent gate blocks processing for users without an
//! affirmative record, the validator rejects content carrying personal
//! identifiers, and the cipher replaces sensitive payload fields with
//! ciphertext.

pub mod consent;
pub mod crypto;
pub mod privacy;
pub mod validator;

pub use consent::ConsentLedger;
pub use crypto::PayloadCipher;
pub use privacy::{PrivacyService, UserDataExport};
pub use validator::{ContentValidator, ValidationReport};
