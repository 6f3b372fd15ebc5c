#![allow(non_snake_case)]

use super::*;
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, OneofDescriptorProto};
use socketgen_core::{EmitOptions, SourceUnit, UnitKind};
use tempfile::TempDir;
use test_case::test_case;

fn message_field(name: &str, number: i32, type_name: &str, oneof: Option<i32>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::Message as i32),
        type_name: Some(type_name.to_string()),
        oneof_index: oneof,
        ..Default::default()
    }
}

fn starter_descriptor_bytes() -> Vec<u8> {
    let message = |name: &str| DescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    };

    let wrapper = DescriptorProto {
        name: Some("GamePacket".to_string()),
        field: vec![
            message_field("header", 1, ".packet.Header", None),
            message_field("login_req", 10, ".packet.LoginReq", Some(0)),
            message_field("login_res", 11, ".packet.LoginRes", Some(0)),
            message_field("chat_msg", 12, ".packet.ChatMsg", Some(0)),
        ],
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("payload".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let file = FileDescriptorProto {
        name: Some("packet.proto".to_string()),
        package: Some("packet".to_string()),
        message_type: vec![
            message("Header"),
            message("LoginReq"),
            message("LoginRes"),
            message("ChatMsg"),
            wrapper,
        ],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    };

    FileDescriptorSet { file: vec![file] }.encode_to_vec()
}

/// Config reading a descriptor set written into `dir`.
fn config_in(dir: &TempDir, languages: &[&str]) -> Config {
    let descriptor = dir.path().join("packet.pb");
    fs::write(&descriptor, starter_descriptor_bytes()).unwrap();

    Config {
        descriptor_set: Some(descriptor),
        out_dir: dir.path().join("gen"),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        ..Config::default()
    }
}

fn extract_error(err: &anyhow::Error) -> &ExtractError {
    err.downcast_ref::<ExtractError>().unwrap()
}

// load_model tests

#[test]
fn load_model___descriptor_set_file___extracts_payloads() {
    let dir = tempfile::tempdir().unwrap();

    let model = load_model(&config_in(&dir, &[])).unwrap();

    assert_eq!(model.package_name, "packet");
    let fields: Vec<_> = model.variants.iter().map(|v| v.field_name.as_str()).collect();
    assert_eq!(fields, vec!["login_req", "login_res", "chat_msg"]);
}

#[test]
fn load_model___missing_descriptor_file___descriptor_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        descriptor_set: Some(dir.path().join("missing.pb")),
        ..Config::default()
    };

    let err = load_model(&config).unwrap_err();

    assert_eq!(extract_error(&err).code(), "DescriptorUnavailable");
}

#[test]
fn load_model___garbage_bytes___descriptor_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pb");
    fs::write(&path, [0x0a, 0xff, 0xff, 0xff, 0xff]).unwrap();
    let config = Config {
        descriptor_set: Some(path),
        ..Config::default()
    };

    let err = load_model(&config).unwrap_err();

    assert_eq!(extract_error(&err).code(), "DescriptorUnavailable");
}

#[test]
fn load_model___renamed_wrapper___wrapper_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir, &[]);
    config.schema.wrapper_message = "Envelope".to_string();

    let err = load_model(&config).unwrap_err();

    assert_eq!(extract_error(&err).code(), "WrapperNotFound");
}

// execute tests

#[test]
fn execute___go_and_bogus___writes_go_then_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, &["go", "bogus"]);

    let err = execute(&config).unwrap_err();

    assert!(err.to_string().contains("1 of 2"), "{err}");
    let go_dir = config.out_dir.join("go");
    assert!(go_dir.join("handler.go").is_file());
    assert!(go_dir.join("dispatcher.go").is_file());
    assert!(!config.out_dir.join("bogus").exists());
}

#[test]
fn execute___every_language___one_directory_each() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, &socketgen_core::BUILTIN_LANGUAGES);

    execute(&config).unwrap();

    for language in socketgen_core::BUILTIN_LANGUAGES {
        let lang_dir = config.out_dir.join(language);
        assert!(lang_dir.is_dir(), "{language} not written");
        assert!(fs::read_dir(&lang_dir).unwrap().count() >= 2);
    }
}

#[test]
fn execute___no_serve_no_send___skips_stream_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir, &["go"]);
    config.output.serve_loop = false;
    config.output.send_helpers = false;

    execute(&config).unwrap();

    let go_dir = config.out_dir.join("go");
    assert!(go_dir.join("handler.go").is_file());
    assert!(!go_dir.join("stream.go").exists());
}

// write_report tests

#[test]
fn write_report___nested_unit_path___creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let report = GenerationReport {
        outcomes: vec![socketgen_core::LanguageOutcome {
            language: "java".to_string(),
            result: Ok(vec![SourceUnit::new(
                "com/example/PacketHandler.java",
                UnitKind::Handler,
                "interface PacketHandler {}\n".to_string(),
            )]),
        }],
    };

    let written = write_report(&report, dir.path()).unwrap();

    let expected = dir.path().join("java/com/example/PacketHandler.java");
    assert_eq!(written, vec![expected.clone()]);
    assert_eq!(fs::read_to_string(expected).unwrap(), "interface PacketHandler {}\n");
}

#[test]
fn write_report___failures_only___writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let report = GenerationReport {
        outcomes: vec![socketgen_core::LanguageOutcome {
            language: "cobol".to_string(),
            result: Err(GenerateError::UnsupportedLanguage("cobol".to_string())),
        }],
    };

    let written = write_report(&report, dir.path()).unwrap();

    assert!(written.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// report_lines tests

#[test]
fn report_lines___mixed_outcomes___request_order() {
    let dir = tempfile::tempdir().unwrap();
    let model = load_model(&config_in(&dir, &[])).unwrap();
    let report = EmitterRegistry::new()
        .with_options(EmitOptions::minimal())
        .generate(&model, &["bogus", "go"]);

    let lines = report_lines(&report);

    assert_eq!(
        lines,
        vec![
            "Warning: Language 'bogus' is not supported.".to_string(),
            "Successfully generated Go code (2 files).".to_string(),
        ]
    );
}

#[test_case("go", "Go")]
#[test_case("ts", "TypeScript")]
#[test_case("csharp", "C#")]
#[test_case("cobol", "cobol"; "unknown tag passes through")]
fn display_name___maps_tags(tag: &str, expected: &str) {
    assert_eq!(display_name(tag), expected);
}
