//! Dart dispatcher generation for `protoc-gen-dart` bindings.
//!
//! Dart imports are not transitive, so every schema file that declares the
//! header or a payload type gets its own `.pb.dart` import.

use super::{
    EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, handler_method, module_path,
    send_method, validate_model,
};
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::{to_camel_case, to_pascal_case};
use std::fmt::Write;

/// Emitter for the `dart` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct DartEmitter;

impl Emitter for DartEmitter {
    fn language(&self) -> &'static str {
        "dart"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("packet_handler.dart", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new(
                "packet_dispatcher.dart",
                UnitKind::Dispatcher,
                dispatcher_file(model)?,
            ),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "packet_stream.dart",
                UnitKind::Stream,
                stream_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

/// protoc-gen-dart flattens nested messages with `_`.
fn type_ref(t: &impl TypeReference) -> String {
    t.nested_path().join("_")
}

fn bindings_imports(model: &DescriptorModel) -> Vec<String> {
    model
        .referenced_files()
        .into_iter()
        .map(|file| format!("import '{}.pb.dart';", module_path(file)))
        .collect()
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(&model.header);
    let mut code = banner("//", model);

    writeln!(code)?;
    for line in bindings_imports(model) {
        writeln!(code, "{line}")?;
    }
    writeln!(code)?;
    writeln!(
        code,
        "/// One callback per [{}] payload variant.",
        model.wrapper_name
    )?;
    writeln!(code, "abstract interface class PacketHandler {{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "  void {}({header} header, {} msg);",
            handler_method(&variant.field_name),
            type_ref(variant)
        )?;
    }
    writeln!(code, "}}")?;

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let which = format!("which{}", to_pascal_case(&model.oneof_name));
    let case_enum = format!("{wrapper}_{}", to_pascal_case(&model.oneof_name));
    let header = to_camel_case(&model.header.field_name);
    let mut code = banner("//", model);

    writeln!(code)?;
    writeln!(code, "import 'package:protobuf/protobuf.dart';")?;
    writeln!(code)?;
    writeln!(code, "import 'packet_handler.dart';")?;
    for line in bindings_imports(model) {
        writeln!(code, "{line}")?;
    }
    writeln!(code)?;
    writeln!(code, "/// The frame could not be decoded as a [{wrapper}].")?;
    writeln!(code, "class PacketDecodeException implements Exception {{")?;
    writeln!(code, "  PacketDecodeException(this.cause);")?;
    writeln!(code)?;
    writeln!(code, "  final Object cause;")?;
    writeln!(code)?;
    writeln!(code, "  @override")?;
    writeln!(
        code,
        "  String toString() => 'PacketDecodeException: failed to decode {wrapper}: $cause';"
    )?;
    writeln!(code, "}}")?;
    writeln!(code)?;
    writeln!(
        code,
        "/// The decoded [{wrapper}] carries no known payload."
    )?;
    writeln!(code, "class UnknownPayloadException implements Exception {{")?;
    writeln!(code, "  UnknownPayloadException(this.payload);")?;
    writeln!(code)?;
    writeln!(code, "  final {case_enum} payload;")?;
    writeln!(code)?;
    writeln!(code, "  @override")?;
    writeln!(
        code,
        "  String toString() => 'UnknownPayloadException: unknown {wrapper} payload: $payload';"
    )?;
    writeln!(code, "}}")?;
    writeln!(code)?;
    writeln!(
        code,
        "void dispatch(List<int> data, PacketHandler handler) {{"
    )?;
    writeln!(code, "  final {wrapper} packet;")?;
    writeln!(code, "  try {{")?;
    writeln!(code, "    packet = {wrapper}.fromBuffer(data);")?;
    writeln!(code, "  }} on InvalidProtocolBufferException catch (e) {{")?;
    writeln!(code, "    throw PacketDecodeException(e);")?;
    writeln!(code, "  }}")?;
    writeln!(code)?;
    writeln!(code, "  switch (packet.{which}()) {{")?;
    for variant in &model.variants {
        let member = to_camel_case(&variant.field_name);
        writeln!(code, "    case {case_enum}.{member}:")?;
        writeln!(
            code,
            "      handler.{}(packet.{header}, packet.{member});",
            handler_method(&variant.field_name)
        )?;
    }
    writeln!(code, "    default:")?;
    writeln!(code, "      throw UnknownPayloadException(packet.{which}());")?;
    writeln!(code, "  }}")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let header = type_ref(&model.header);
    let mut code = banner("//", model);

    writeln!(code)?;
    writeln!(code, "import 'dart:typed_data';")?;
    writeln!(code)?;
    if options.serve_loop {
        writeln!(code, "import 'packet_dispatcher.dart';")?;
        writeln!(code, "import 'packet_handler.dart';")?;
    }
    if options.send_helpers {
        for line in bindings_imports(model) {
            writeln!(code, "{line}")?;
        }
    }
    writeln!(code)?;
    writeln!(code, "/// Reads and writes whole [{wrapper}] frames.")?;
    writeln!(code, "abstract interface class PacketStream {{")?;
    writeln!(code, "  Future<Uint8List> readFrame();")?;
    writeln!(code)?;
    writeln!(code, "  Future<void> writeFrame(Uint8List data);")?;
    writeln!(code, "}}")?;

    if options.serve_loop {
        writeln!(code)?;
        writeln!(
            code,
            "/// Dispatches frames until [PacketStream.readFrame] throws."
        )?;
        writeln!(code, "///")?;
        writeln!(
            code,
            "/// Decode and unknown-payload failures go to [onError] and do not stop the loop."
        )?;
        writeln!(code, "Future<Never> serve(")?;
        writeln!(code, "  PacketStream stream,")?;
        writeln!(code, "  PacketHandler handler, {{")?;
        writeln!(code, "  void Function(Exception error)? onError,")?;
        writeln!(code, "}}) async {{")?;
        writeln!(code, "  while (true) {{")?;
        writeln!(code, "    final data = await stream.readFrame();")?;
        writeln!(code, "    try {{")?;
        writeln!(code, "      dispatch(data, handler);")?;
        writeln!(code, "    }} on PacketDecodeException catch (e) {{")?;
        writeln!(code, "      onError?.call(e);")?;
        writeln!(code, "    }} on UnknownPayloadException catch (e) {{")?;
        writeln!(code, "      onError?.call(e);")?;
        writeln!(code, "    }}")?;
        writeln!(code, "  }}")?;
        writeln!(code, "}}")?;
    }

    if options.send_helpers {
        let header_key = to_camel_case(&model.header.field_name);
        for variant in &model.variants {
            writeln!(code)?;
            writeln!(
                code,
                "Future<void> {}(PacketStream stream, {header} header, {} msg) {{",
                send_method(&variant.field_name),
                type_ref(variant)
            )?;
            writeln!(code, "  final packet = {wrapper}()")?;
            writeln!(code, "    ..{header_key} = header")?;
            writeln!(
                code,
                "    ..{} = msg;",
                to_camel_case(&variant.field_name)
            )?;
            writeln!(code, "  return stream.writeFrame(packet.writeToBuffer());")?;
            writeln!(code, "}}")?;
        }
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::emit::fixtures::{assert_in_order, model_with_foreign_variant, sample_model, unit};

    fn emit_default() -> Vec<SourceUnit> {
        DartEmitter
            .emit(&sample_model(), &EmitOptions::default())
            .unwrap()
    }

    #[test]
    fn handler___interface_class_with_methods_in_order() {
        let units = emit_default();
        let handler = unit(&units, "packet_handler.dart");

        assert_in_order(
            handler,
            &[
                "import 'packet.pb.dart';",
                "abstract interface class PacketHandler {",
                "void onLoginReq(Header header, LoginReq msg);",
                "void onLoginRes(Header header, LoginRes msg);",
                "void onChatMsg(Header header, ChatMsg msg);",
            ],
        );
    }

    #[test]
    fn dispatcher___switches_on_which_payload() {
        let units = emit_default();
        let dispatcher = unit(&units, "packet_dispatcher.dart");

        assert_in_order(
            dispatcher,
            &[
                "packet = GamePacket.fromBuffer(data);",
                "on InvalidProtocolBufferException catch (e) {",
                "throw PacketDecodeException(e);",
                "switch (packet.whichPayload()) {",
                "case GamePacket_Payload.loginReq:",
                "handler.onLoginReq(packet.header, packet.loginReq);",
                "case GamePacket_Payload.loginRes:",
                "case GamePacket_Payload.chatMsg:",
                "default:",
                "throw UnknownPayloadException(packet.whichPayload());",
            ],
        );
    }

    #[test]
    fn stream___serve_and_cascade_send() {
        let units = emit_default();
        let stream = unit(&units, "packet_stream.dart");

        assert!(stream.contains("Future<Never> serve("));
        assert!(stream.contains("} on UnknownPayloadException catch (e) {"));
        assert_in_order(
            stream,
            &[
                "Future<void> sendChatMsg(PacketStream stream, Header header, ChatMsg msg) {",
                "final packet = GamePacket()",
                "..header = header",
                "..chatMsg = msg;",
                "return stream.writeFrame(packet.writeToBuffer());",
            ],
        );
    }

    #[test]
    fn handler___foreign_variant___imports_its_library() {
        let units = DartEmitter
            .emit(&model_with_foreign_variant(), &EmitOptions::minimal())
            .unwrap();
        let handler = unit(&units, "packet_handler.dart");

        assert_in_order(
            handler,
            &[
                "import 'packet.pb.dart';",
                "import 'game/common.pb.dart';",
                "void onPing(Header header, Ping msg);",
            ],
        );
        assert_eq!(handler.matches("import '").count(), 2);
    }

    #[test]
    fn emit___minimal_options___omit_stream() {
        let units = DartEmitter.emit(&sample_model(), &EmitOptions::minimal()).unwrap();

        assert!(units.iter().all(|u| u.kind != UnitKind::Stream));
    }
}
