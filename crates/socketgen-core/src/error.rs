//! Error types for schema extraction and code emission

use thiserror::Error;

/// Result type alias for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Error raised while turning a descriptor tree into a [`DescriptorModel`].
///
/// Every variant is fatal to the run: no model is produced and no emitter is
/// invoked.
///
/// [`DescriptorModel`]: crate::DescriptorModel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The compiled descriptor could not be obtained or decoded
    #[error("descriptor unavailable: {0}")]
    DescriptorUnavailable(String),

    /// The descriptor set contains no files at all
    #[error("descriptor set contains no files")]
    EmptyDescriptorSet,

    /// No top-level message with the wrapper name in the selected file
    #[error("message '{wrapper}' not found in {file}")]
    WrapperNotFound { wrapper: String, file: String },

    /// The wrapper message has no oneof with the payload name
    #[error("'{oneof}' oneof field not found in {wrapper}")]
    OneofNotFound { wrapper: String, oneof: String },

    /// The payload oneof exists but declares no members
    #[error("'{oneof}' oneof in {wrapper} has no variants")]
    EmptyVariantSet { wrapper: String, oneof: String },

    /// A payload oneof member refers to a scalar instead of a message
    #[error("oneof member '{field}' in {wrapper} is not a message type")]
    NonMessageVariant { wrapper: String, field: String },
}

impl ExtractError {
    /// Stable identifier for reports and exit messages
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::DescriptorUnavailable(_) => "DescriptorUnavailable",
            ExtractError::EmptyDescriptorSet => "EmptyDescriptorSet",
            ExtractError::WrapperNotFound { .. } => "WrapperNotFound",
            ExtractError::OneofNotFound { .. } => "OneofNotFound",
            ExtractError::EmptyVariantSet { .. } => "EmptyVariantSet",
            ExtractError::NonMessageVariant { .. } => "NonMessageVariant",
        }
    }
}

impl From<prost::DecodeError> for ExtractError {
    fn from(err: prost::DecodeError) -> Self {
        ExtractError::DescriptorUnavailable(err.to_string())
    }
}

/// Error raised by a single emitter.
///
/// A well-formed model never produces one; seeing it means an identifier that
/// cannot be expressed in the target language slipped through extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// An identifier cannot be used as-is in generated source
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// A referenced message lives in a package the target language cannot
    /// import from the generated files
    #[error("type '{type_name}' from package '{package}' cannot be referenced from the generated code")]
    UnreachableType { type_name: String, package: String },

    /// Writing into the output buffer failed
    #[error("failed to format generated source")]
    Format(#[from] std::fmt::Error),
}

/// Per-language outcome error recorded by the orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// No emitter is registered for the requested tag
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The emitter rejected a structurally valid model
    #[error("{language} emitter failed: {source}")]
    EmitterFailure {
        language: String,
        #[source]
        source: EmitError,
    },
}

impl GenerateError {
    /// Stable identifier for reports and exit messages
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::UnsupportedLanguage(_) => "UnsupportedLanguage",
            GenerateError::EmitterFailure { .. } => "EmitterFailure",
        }
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
