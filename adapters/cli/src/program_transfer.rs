use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use codecraft_system_compiler::Program;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SHARE_DOMAIN: &str = "kru";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded program payload.
pub(crate) const SHARE_HEADER: &str = "kru:v1";
/// Delimiter used to separate the prefix and payload.
const FIELD_DELIMITER: char = ':';

/// Program packaged for copy-and-paste sharing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SharedProgram {
    /// Level the program was written for, if known.
    #[serde(default)]
    pub(crate) level: Option<u32>,
    /// Authored block tree.
    pub(crate) program: Program,
}

impl SharedProgram {
    /// Encodes the program into a single-line share code.
    pub(crate) fn encode(&self) -> Result<String, TransferError> {
        let json = serde_json::to_vec(self).map_err(TransferError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SHARE_HEADER}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a share code produced by [`SharedProgram::encode`].
    pub(crate) fn decode(value: &str) -> Result<Self, TransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TransferError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().unwrap_or_default();
        let version = parts.next().ok_or(TransferError::MissingVersion)?;
        let payload = parts.next().ok_or(TransferError::MissingPayload)?;

        if domain != SHARE_DOMAIN {
            return Err(TransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SHARE_VERSION {
            return Err(TransferError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(TransferError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)
    }
}

/// Errors that can occur while encoding or decoding share codes.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyPayload,
    /// The share code did not contain a version segment.
    #[error("share code is missing the version")]
    MissingVersion,
    /// The share code did not include the payload segment.
    #[error("share code is missing the payload")]
    MissingPayload,
    /// The share code used an unexpected prefix segment.
    #[error("share prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The share code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse share payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The program could not be serialised.
    #[error("could not serialise program: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use codecraft_system_compiler::Block;

    fn shared(level: Option<u32>) -> SharedProgram {
        SharedProgram {
            level,
            program: Program::new(vec![
                Block::Start,
                Block::Repeat {
                    times: 4,
                    body: vec![Block::Move],
                },
            ]),
        }
    }

    #[test]
    fn share_code_carries_level_and_program() {
        let original = shared(Some(5));

        let code = original.encode().expect("program encodes");
        assert!(code.starts_with(&format!("{SHARE_HEADER}:")));

        let decoded = SharedProgram::decode(&format!("  {code}\n")).expect("code decodes");
        assert_eq!(decoded, original);
    }

    #[test]
    fn share_code_without_level_decodes() {
        let json = br#"{"program":{"blocks":[{"type":"move"}]}}"#;
        let code = format!("{SHARE_HEADER}:{}", STANDARD_NO_PAD.encode(json));

        let decoded = SharedProgram::decode(&code).expect("code decodes");

        assert_eq!(decoded.level, None);
        assert_eq!(decoded.program.block_count(), 1);
    }

    #[test]
    fn foreign_codes_are_rejected() {
        assert!(matches!(
            SharedProgram::decode("   "),
            Err(TransferError::EmptyPayload)
        ));
        assert!(matches!(
            SharedProgram::decode("blocks:v1:abc"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "blocks"
        ));
        assert!(matches!(
            SharedProgram::decode("kru:v2:abc"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            SharedProgram::decode("kru:v1"),
            Err(TransferError::MissingPayload)
        ));
        assert!(matches!(
            SharedProgram::decode("kru:v1:!!!"),
            Err(TransferError::InvalidEncoding(_))
        ));
    }
}
