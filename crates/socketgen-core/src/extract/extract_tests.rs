#![allow(non_snake_case)]

use super::*;
use crate::descriptor::FieldDescriptor;
use test_case::test_case;

fn game_packet() -> MessageDescriptor {
    MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("header", 1, ".packet.Header"))
        .with_field(FieldDescriptor::message("login_req", 10, ".packet.LoginReq").in_oneof(0))
        .with_field(FieldDescriptor::message("login_res", 11, ".packet.LoginRes").in_oneof(0))
        .with_field(FieldDescriptor::message("chat_msg", 12, ".packet.ChatMsg").in_oneof(0))
}

fn packet_file() -> FileDescriptor {
    FileDescriptor::new("packet.proto", "packet")
        .with_message(MessageDescriptor::new("Header"))
        .with_message(MessageDescriptor::new("LoginReq"))
        .with_message(MessageDescriptor::new("LoginRes"))
        .with_message(MessageDescriptor::new("ChatMsg"))
        .with_message(game_packet())
}

fn packet_set() -> DescriptorSet {
    DescriptorSet::new(vec![packet_file()])
}

// ============================================================================
// Happy path
// ============================================================================

#[test]
fn extract___standard_packet___yields_variants_in_declaration_order() {
    let model = extract(&packet_set(), &ExtractOptions::default()).unwrap();

    assert_eq!(model.package_name, "packet");
    assert_eq!(model.wrapper_name, "GamePacket");
    assert_eq!(model.oneof_name, "payload");
    assert_eq!(
        model.variants,
        vec![
            PayloadVariant {
                type_name: "LoginReq".into(),
                field_name: "login_req".into(),
                qualified_type_name: "packet.LoginReq".into(),
                type_package: "packet".into(),
                type_file: "packet.proto".into(),
            },
            PayloadVariant {
                type_name: "LoginRes".into(),
                field_name: "login_res".into(),
                qualified_type_name: "packet.LoginRes".into(),
                type_package: "packet".into(),
                type_file: "packet.proto".into(),
            },
            PayloadVariant {
                type_name: "ChatMsg".into(),
                field_name: "chat_msg".into(),
                qualified_type_name: "packet.ChatMsg".into(),
                type_package: "packet".into(),
                type_file: "packet.proto".into(),
            },
        ]
    );
}

#[test]
fn extract___same_tree_twice___yields_equal_models() {
    let set = packet_set();

    let first = extract(&set, &ExtractOptions::default()).unwrap();
    let second = extract(&set, &ExtractOptions::default()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn extract___records_header_field() {
    let model = extract(&packet_set(), &ExtractOptions::default()).unwrap();

    assert_eq!(model.header.field_name, "header");
    assert_eq!(model.header.type_name, "Header");
    assert_eq!(model.header.qualified_type_name, "packet.Header");
    assert_eq!(model.header.type_package, "packet");
    assert_eq!(model.header.type_file, "packet.proto");
}

#[test]
fn extract___missing_header___assumes_conventional_header() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("ping", 1, ".packet.Ping").in_oneof(0));
    let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet").with_message(wrapper)]);

    let model = extract(&set, &ExtractOptions::default()).unwrap();

    assert_eq!(model.header, HeaderField::conventional("header", "packet", "packet.proto"));
}

#[test]
fn extract___records_declared_messages_and_source_file() {
    let model = extract(&packet_set(), &ExtractOptions::default()).unwrap();

    assert_eq!(model.source_file, "packet.proto");
    assert_eq!(
        model.declared_messages,
        vec!["Header", "LoginReq", "LoginRes", "ChatMsg", "GamePacket"]
    );
}

#[test]
fn extract___ignores_fields_of_other_oneofs() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("meta")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("trace", 2, ".packet.Trace").in_oneof(0))
        .with_field(FieldDescriptor::message("ping", 3, ".packet.Ping").in_oneof(1))
        .with_field(FieldDescriptor::message("plain", 4, ".packet.Plain"));
    let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet").with_message(wrapper)]);

    let model = extract(&set, &ExtractOptions::default()).unwrap();

    assert_eq!(model.variants.len(), 1);
    assert_eq!(model.variants[0].field_name, "ping");
}

#[test]
fn extract___imported_variant___records_defining_package() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("ping", 1, ".game.common.Ping").in_oneof(0));
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("common.proto", "game.common").with_message(MessageDescriptor::new("Ping")),
        FileDescriptor::new("packet.proto", "packet").with_message(wrapper),
    ]);

    let model = extract(&set, &ExtractOptions::new().with_source_file("packet.proto")).unwrap();

    assert_eq!(model.variants[0].type_name, "Ping");
    assert_eq!(model.variants[0].qualified_type_name, "game.common.Ping");
    assert_eq!(model.variants[0].type_package, "game.common");
    assert_eq!(model.variants[0].type_file, "common.proto");
}

#[test]
fn extract___variant_from_sibling_file_of_same_package___records_that_file() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("header", 1, ".game.Header"))
        .with_field(FieldDescriptor::message("ping", 2, ".game.Ping").in_oneof(0))
        .with_field(FieldDescriptor::message("login_req", 3, ".game.LoginReq").in_oneof(0));
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("game/common.proto", "game")
            .with_message(MessageDescriptor::new("Header"))
            .with_message(MessageDescriptor::new("Ping")),
        FileDescriptor::new("game/packet.proto", "game")
            .with_message(MessageDescriptor::new("LoginReq"))
            .with_message(wrapper),
    ]);

    let model = extract(&set, &ExtractOptions::new().with_source_file("packet.proto")).unwrap();

    assert_eq!(model.header.type_file, "game/common.proto");
    assert_eq!(model.variants[0].type_file, "game/common.proto");
    assert_eq!(model.variants[1].type_file, "game/packet.proto");
}

#[test]
fn extract___nested_variant___keeps_package_of_outer_message() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("join", 1, ".packet.Lobby.JoinReq").in_oneof(0));
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("packet.proto", "packet")
            .with_message(MessageDescriptor::new("Lobby").with_nested(MessageDescriptor::new("JoinReq")))
            .with_message(wrapper),
    ]);

    let model = extract(&set, &ExtractOptions::default()).unwrap();

    assert_eq!(model.variants[0].type_name, "JoinReq");
    assert_eq!(model.variants[0].type_package, "packet");
}

#[test]
fn extract___unresolvable_variant_type___guesses_package() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("a", 1, ".packet.Local").in_oneof(0))
        .with_field(FieldDescriptor::message("b", 2, ".other.Remote").in_oneof(0));
    let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet").with_message(wrapper)]);

    let model = extract(&set, &ExtractOptions::default()).unwrap();

    assert_eq!(model.variants[0].type_package, "packet");
    assert_eq!(model.variants[1].type_package, "other");
    assert_eq!(model.variants[1].type_file, "packet.proto");
}

#[test]
fn extract___custom_names___are_honoured() {
    let wrapper = MessageDescriptor::new("Envelope")
        .with_oneof("body")
        .with_field(FieldDescriptor::message("meta", 1, ".net.Meta"))
        .with_field(FieldDescriptor::message("move_cmd", 2, ".net.MoveCmd").in_oneof(0));
    let set = DescriptorSet::new(vec![FileDescriptor::new("net.proto", "net").with_message(wrapper)]);
    let options = ExtractOptions::new()
        .with_wrapper_message("Envelope")
        .with_oneof_field("body")
        .with_header_field("meta");

    let model = extract(&set, &options).unwrap();

    assert_eq!(model.wrapper_name, "Envelope");
    assert_eq!(model.oneof_name, "body");
    assert_eq!(model.header.type_name, "Meta");
    assert_eq!(model.variants[0].type_name, "MoveCmd");
}

// ============================================================================
// File selection
// ============================================================================

fn multi_file_set() -> DescriptorSet {
    DescriptorSet::new(vec![
        FileDescriptor::new("google/protobuf/timestamp.proto", "google.protobuf"),
        FileDescriptor::new("proto/packet.proto", "packet").with_message(game_packet()),
        FileDescriptor::new("proto/zzz.proto", "zzz"),
    ])
}

#[test_case("packet.proto" ; "bare base name")]
#[test_case("./proto/packet.proto" ; "relative path")]
#[test_case("/home/dev/game/proto/packet.proto" ; "absolute path")]
fn extract___requested_file___is_selected_by_base_name(requested: &str) {
    let model = extract(&multi_file_set(), &ExtractOptions::new().with_source_file(requested)).unwrap();

    assert_eq!(model.source_file, "proto/packet.proto");
}

#[test]
fn extract___no_requested_file___falls_back_to_last_file() {
    let err = extract(&multi_file_set(), &ExtractOptions::default()).unwrap_err();

    assert_eq!(
        err,
        ExtractError::WrapperNotFound {
            wrapper: "GamePacket".into(),
            file: "proto/zzz.proto".into(),
        }
    );
}

#[test]
fn extract___unmatched_requested_file___falls_back_to_last_file() {
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("common.proto", "common"),
        packet_file(),
    ]);

    let model = extract(&set, &ExtractOptions::new().with_source_file("missing.proto")).unwrap();

    assert_eq!(model.source_file, "packet.proto");
}

#[test]
fn extract___suffix_without_path_boundary___does_not_match() {
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("mypacket.proto", "wrong").with_message(game_packet()),
        packet_file(),
        FileDescriptor::new("tail.proto", "tail"),
    ]);

    let model = extract(&set, &ExtractOptions::new().with_source_file("packet.proto")).unwrap();

    assert_eq!(model.package_name, "packet");
}

#[test]
fn extract___duplicate_base_names___first_match_wins() {
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("a/packet.proto", "first").with_message(game_packet()),
        FileDescriptor::new("b/packet.proto", "second").with_message(game_packet()),
    ]);

    let model = extract(&set, &ExtractOptions::new().with_source_file("packet.proto")).unwrap();

    assert_eq!(model.package_name, "first");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn extract___empty_set___fails() {
    let err = extract(&DescriptorSet::default(), &ExtractOptions::default()).unwrap_err();

    assert_eq!(err, ExtractError::EmptyDescriptorSet);
}

#[test]
fn extract___missing_wrapper___fails_with_wrapper_not_found() {
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("packet.proto", "packet").with_message(MessageDescriptor::new("Other")),
    ]);

    let err = extract(&set, &ExtractOptions::default()).unwrap_err();

    assert_eq!(err.code(), "WrapperNotFound");
}

#[test]
fn extract___wrapper_only_nested___is_not_found() {
    let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet")
        .with_message(MessageDescriptor::new("Outer").with_nested(game_packet()))]);

    let err = extract(&set, &ExtractOptions::default()).unwrap_err();

    assert_eq!(err.code(), "WrapperNotFound");
}

#[test]
fn extract___missing_oneof___fails_with_oneof_not_found() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("body")
        .with_field(FieldDescriptor::message("ping", 1, ".packet.Ping").in_oneof(0));
    let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet").with_message(wrapper)]);

    let err = extract(&set, &ExtractOptions::default()).unwrap_err();

    assert_eq!(
        err,
        ExtractError::OneofNotFound {
            wrapper: "GamePacket".into(),
            oneof: "payload".into(),
        }
    );
}

#[test]
fn extract___oneof_without_members___fails_with_empty_variant_set() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("header", 1, ".packet.Header"));
    let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet").with_message(wrapper)]);

    let err = extract(&set, &ExtractOptions::default()).unwrap_err();

    assert_eq!(err.code(), "EmptyVariantSet");
}

#[test]
fn extract___scalar_member___fails_with_non_message_variant() {
    let wrapper = MessageDescriptor::new("GamePacket")
        .with_oneof("payload")
        .with_field(FieldDescriptor::message("ping", 1, ".packet.Ping").in_oneof(0))
        .with_field(FieldDescriptor::scalar("text", 2).in_oneof(0));
    let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet").with_message(wrapper)]);

    let err = extract(&set, &ExtractOptions::default()).unwrap_err();

    assert_eq!(
        err,
        ExtractError::NonMessageVariant {
            wrapper: "GamePacket".into(),
            field: "text".into(),
        }
    );
}

// ============================================================================
// Helpers
// ============================================================================

#[test_case("packet.proto", "packet.proto", true)]
#[test_case("proto/packet.proto", "packet.proto", true)]
#[test_case("mypacket.proto", "packet.proto", false)]
#[test_case("packet.proto.bak", "packet.proto", false)]
fn matches_base_name___checks_path_boundary(declared: &str, base: &str, expected: bool) {
    assert_eq!(matches_base_name(declared, base), expected);
}

#[test_case(".packet.LoginReq", "LoginReq")]
#[test_case("LoginReq", "LoginReq")]
#[test_case(".a.b.Outer.Inner", "Inner")]
fn last_segment___takes_final_component(input: &str, expected: &str) {
    assert_eq!(last_segment(input), expected);
}
