use core::fmt;

/// Stable, machine-readable error codes.
///
/// Callers branch on these, so the string form returned by
/// [`ErrorCode::as_str`] never changes between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    CanonicalizationFailed,
    CommitmentMismatch,
    DeltaExceedsMaximumSize,
    DeltaHashMismatch,
    DidDocumentPublicKeyIdDuplicated,
    DidDocumentPublicKeyMissingOrIncorrectType,
    DidDocumentServiceIdDuplicated,
    DidMalformed,
    DidMethodMismatch,
    DidSuffixMismatch,
    EncodedStringIncorrectEncoding,
    IdNotUsingBase64UrlCharacterSet,
    IdTooLong,
    JwkEd25519HasIncorrectLengthOfD,
    JwkEd25519HasIncorrectLengthOfX,
    JwkEd25519MissingOrInvalidCrv,
    JwkEd25519MissingOrInvalidKty,
    JwkEs256kHasIncorrectLengthOfD,
    JwkEs256kHasIncorrectLengthOfX,
    JwkEs256kHasIncorrectLengthOfY,
    JwkEs256kMissingOrInvalidCrv,
    JwkEs256kMissingOrInvalidKty,
    JwsAlgorithmMismatch,
    JwsMalformed,
    KeyGenerationFailed,
    MultihashStringNotAMultihash,
    MultihashUnsupportedHashAlgorithm,
    OperationMalformed,
    PublicKeyJwkEd25519HasUnexpectedProperty,
    PublicKeyJwkEs256kHasUnexpectedProperty,
    PublicKeyPurposeDuplicated,
    RevealValueMismatch,
    ServiceEndpointCannotBeAnArray,
    ServiceEndpointMissingOrIncorrectType,
    ServiceEndpointStringNotValidUri,
    ServiceTypeTooLong,
    SignatureVerificationFailed,
    SigningFailed,
    UnsupportedKeyType,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanonicalizationFailed => "CanonicalizationFailed",
            Self::CommitmentMismatch => "CommitmentMismatch",
            Self::DeltaExceedsMaximumSize => "DeltaExceedsMaximumSize",
            Self::DeltaHashMismatch => "DeltaHashMismatch",
            Self::DidDocumentPublicKeyIdDuplicated => "DidDocumentPublicKeyIdDuplicated",
            Self::DidDocumentPublicKeyMissingOrIncorrectType => {
                "DidDocumentPublicKeyMissingOrIncorrectType"
            }
            Self::DidDocumentServiceIdDuplicated => "DidDocumentServiceIdDuplicated",
            Self::DidMalformed => "DidMalformed",
            Self::DidMethodMismatch => "DidMethodMismatch",
            Self::DidSuffixMismatch => "DidSuffixMismatch",
            Self::EncodedStringIncorrectEncoding => "EncodedStringIncorrectEncoding",
            Self::IdNotUsingBase64UrlCharacterSet => "IdNotUsingBase64UrlCharacterSet",
            Self::IdTooLong => "IdTooLong",
            Self::JwkEd25519HasIncorrectLengthOfD => "JwkEd25519HasIncorrectLengthOfD",
            Self::JwkEd25519HasIncorrectLengthOfX => "JwkEd25519HasIncorrectLengthOfX",
            Self::JwkEd25519MissingOrInvalidCrv => "JwkEd25519MissingOrInvalidCrv",
            Self::JwkEd25519MissingOrInvalidKty => "JwkEd25519MissingOrInvalidKty",
            Self::JwkEs256kHasIncorrectLengthOfD => "JwkEs256kHasIncorrectLengthOfD",
            Self::JwkEs256kHasIncorrectLengthOfX => "JwkEs256kHasIncorrectLengthOfX",
            Self::JwkEs256kHasIncorrectLengthOfY => "JwkEs256kHasIncorrectLengthOfY",
            Self::JwkEs256kMissingOrInvalidCrv => "JwkEs256kMissingOrInvalidCrv",
            Self::JwkEs256kMissingOrInvalidKty => "JwkEs256kMissingOrInvalidKty",
            Self::JwsAlgorithmMismatch => "JwsAlgorithmMismatch",
            Self::JwsMalformed => "JwsMalformed",
            Self::KeyGenerationFailed => "KeyGenerationFailed",
            Self::MultihashStringNotAMultihash => "MultihashStringNotAMultihash",
            Self::MultihashUnsupportedHashAlgorithm => "MultihashUnsupportedHashAlgorithm",
            Self::OperationMalformed => "OperationMalformed",
            Self::PublicKeyJwkEd25519HasUnexpectedProperty => {
                "PublicKeyJwkEd25519HasUnexpectedProperty"
            }
            Self::PublicKeyJwkEs256kHasUnexpectedProperty => {
                "PublicKeyJwkEs256kHasUnexpectedProperty"
            }
            Self::PublicKeyPurposeDuplicated => "PublicKeyPurposeDuplicated",
            Self::RevealValueMismatch => "RevealValueMismatch",
            Self::ServiceEndpointCannotBeAnArray => "ServiceEndpointCannotBeAnArray",
            Self::ServiceEndpointMissingOrIncorrectType => "ServiceEndpointMissingOrIncorrectType",
            Self::ServiceEndpointStringNotValidUri => "ServiceEndpointStringNotValidUri",
            Self::ServiceTypeTooLong => "ServiceTypeTooLong",
            Self::SignatureVerificationFailed => "SignatureVerificationFailed",
            Self::SigningFailed => "SigningFailed",
            Self::UnsupportedKeyType => "UnsupportedKeyType",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by every fallible operation of this crate.
///
/// Validation fails fast: the first violation found aborts the whole
/// operation and is reported here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct IonError {
    pub code: ErrorCode,
    pub message: String,
}

impl IonError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl From<serde_json::Error> for IonError {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ErrorCode::CanonicalizationFailed, value.to_string())
    }
}

pub type Result<T, E = IonError> = std::result::Result<T, E>;
