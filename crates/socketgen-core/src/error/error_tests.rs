#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// ============================================================================
// Stable codes
// ============================================================================

#[test_case(ExtractError::DescriptorUnavailable("x".into()), "DescriptorUnavailable")]
#[test_case(ExtractError::EmptyDescriptorSet, "EmptyDescriptorSet")]
#[test_case(
    ExtractError::WrapperNotFound { wrapper: "GamePacket".into(), file: "a.proto".into() },
    "WrapperNotFound"
)]
#[test_case(
    ExtractError::OneofNotFound { wrapper: "GamePacket".into(), oneof: "payload".into() },
    "OneofNotFound"
)]
#[test_case(
    ExtractError::EmptyVariantSet { wrapper: "GamePacket".into(), oneof: "payload".into() },
    "EmptyVariantSet"
)]
#[test_case(
    ExtractError::NonMessageVariant { wrapper: "GamePacket".into(), field: "text".into() },
    "NonMessageVariant"
)]
fn ExtractError___code___is_variant_name(error: ExtractError, expected: &str) {
    assert_eq!(error.code(), expected);
}

#[test_case(GenerateError::UnsupportedLanguage("bogus".into()), "UnsupportedLanguage")]
#[test_case(
    GenerateError::EmitterFailure {
        language: "go".into(),
        source: EmitError::InvalidIdentifier("1x".into()),
    },
    "EmitterFailure"
)]
fn GenerateError___code___is_variant_name(error: GenerateError, expected: &str) {
    assert_eq!(error.code(), expected);
}

// ============================================================================
// Messages carry their details
// ============================================================================

#[test_case(
    ExtractError::WrapperNotFound { wrapper: "GamePacket".into(), file: "packet.proto".into() }
        .into_boxed(),
    "packet.proto"
)]
#[test_case(
    ExtractError::OneofNotFound { wrapper: "Envelope".into(), oneof: "body".into() }
        .into_boxed(),
    "body"
)]
#[test_case(
    ExtractError::DescriptorUnavailable("protoc missing".into()).into_boxed(),
    "protoc missing"
)]
#[test_case(GenerateError::UnsupportedLanguage("cobol".into()).into_boxed(), "cobol")]
#[test_case(
    EmitError::UnreachableType { type_name: "game.common.Ping".into(), package: "game.common".into() }
        .into_boxed(),
    "game.common.Ping"
)]
fn error___display___preserves_details(error: Box<dyn std::error::Error>, expected_part: &str) {
    let display = error.to_string();

    assert!(
        display.contains(expected_part),
        "Error message '{}' should contain '{}'",
        display,
        expected_part
    );
}

trait IntoBoxed {
    fn into_boxed(self) -> Box<dyn std::error::Error>;
}

impl<E: std::error::Error + 'static> IntoBoxed for E {
    fn into_boxed(self) -> Box<dyn std::error::Error> {
        Box::new(self)
    }
}

#[test]
fn ExtractError___from_decode_error___is_descriptor_unavailable() {
    use prost::Message;

    let err = prost_types::FileDescriptorSet::decode(&[0xff, 0xff, 0xff][..]).unwrap_err();
    let converted = ExtractError::from(err);

    assert_eq!(converted.code(), "DescriptorUnavailable");
}

#[test]
fn GenerateError___emitter_failure___exposes_source() {
    use std::error::Error as _;

    let error = GenerateError::EmitterFailure {
        language: "java".into(),
        source: EmitError::InvalidIdentifier("bad-name".into()),
    };

    assert!(error.to_string().contains("java emitter failed"));
    assert!(error.source().is_some());
}
