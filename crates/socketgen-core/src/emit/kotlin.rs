//! Kotlin dispatcher generation on top of `protobuf-java` classes.

use super::java::{case_enum, package_line, type_ref, wrapper_ref};
use super::{
    EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, handler_method, send_method,
    validate_model,
};
use crate::model::DescriptorModel;
use crate::naming::{proto_camel_case, proto_pascal_case, to_upper_snake_case};
use std::fmt::Write;

/// Emitter for the `kotlin` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct KotlinEmitter;

impl Emitter for KotlinEmitter {
    fn language(&self) -> &'static str {
        "kotlin"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("PacketHandler.kt", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new(
                "PacketDispatcher.kt",
                UnitKind::Dispatcher,
                dispatcher_file(model)?,
            ),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "PacketStream.kt",
                UnitKind::Stream,
                stream_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(model, &model.header);
    let mut code = banner("//", model);

    writeln!(code)?;
    code.push_str(&package_line(model, "")?);
    writeln!(
        code,
        "/** One callback per [{}] payload variant. */",
        wrapper_ref(model)
    )?;
    writeln!(code, "interface PacketHandler {{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "    fun {}(header: {header}, msg: {})",
            handler_method(&variant.field_name),
            type_ref(model, variant)
        )?;
    }
    writeln!(code, "}}")?;

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper_name = &model.wrapper_name;
    let wrapper = wrapper_ref(model);
    let case_enum = case_enum(model);
    let case_property = format!("{}Case", proto_camel_case(&model.oneof_name));
    let header = proto_camel_case(&model.header.field_name);
    let mut code = banner("//", model);

    writeln!(code)?;
    code.push_str(&package_line(model, "")?);
    writeln!(code, "import com.google.protobuf.InvalidProtocolBufferException")?;
    writeln!(code)?;
    writeln!(code, "/** The frame could not be decoded as a [{wrapper}]. */")?;
    writeln!(
        code,
        "class PacketDecodeException(cause: Throwable) : Exception(\"failed to decode {wrapper_name}\", cause)"
    )?;
    writeln!(code)?;
    writeln!(code, "/** The decoded [{wrapper}] carries no known payload. */")?;
    writeln!(code, "class UnknownPayloadException(val payloadCase: {case_enum}) :")?;
    writeln!(
        code,
        "    Exception(\"unknown {wrapper_name} payload: $payloadCase\")"
    )?;
    writeln!(code)?;
    writeln!(code, "object PacketDispatcher {{")?;
    writeln!(code, "    fun dispatch(data: ByteArray, handler: PacketHandler) {{")?;
    writeln!(code, "        val packet = try {{")?;
    writeln!(code, "            {wrapper}.parseFrom(data)")?;
    writeln!(code, "        }} catch (e: InvalidProtocolBufferException) {{")?;
    writeln!(code, "            throw PacketDecodeException(e)")?;
    writeln!(code, "        }}")?;
    writeln!(code)?;
    writeln!(code, "        when (packet.{case_property}) {{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "            {case_enum}.{} -> handler.{}(packet.{header}, packet.{})",
            to_upper_snake_case(&variant.field_name),
            handler_method(&variant.field_name),
            proto_camel_case(&variant.field_name)
        )?;
    }
    writeln!(
        code,
        "            else -> throw UnknownPayloadException(packet.{case_property})"
    )?;
    writeln!(code, "        }}")?;
    writeln!(code, "    }}")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = wrapper_ref(model);
    let mut code = banner("//", model);

    writeln!(code)?;
    code.push_str(&package_line(model, "")?);
    writeln!(code, "/** Reads and writes whole [{wrapper}] frames. */")?;
    writeln!(code, "interface PacketStream {{")?;
    writeln!(code, "    fun readFrame(): ByteArray")?;
    writeln!(code)?;
    writeln!(code, "    fun writeFrame(data: ByteArray)")?;
    writeln!(code, "}}")?;

    if options.serve_loop {
        writeln!(code)?;
        writeln!(code, "/**")?;
        writeln!(
            code,
            " * Dispatches frames until [PacketStream.readFrame] throws. Decode and"
        )?;
        writeln!(
            code,
            " * unknown-payload failures go to [onError] and do not stop the loop."
        )?;
        writeln!(code, " */")?;
        writeln!(
            code,
            "fun PacketStream.serve(handler: PacketHandler, onError: ((Exception) -> Unit)? = null): Nothing {{"
        )?;
        writeln!(code, "    while (true) {{")?;
        writeln!(code, "        val data = readFrame()")?;
        writeln!(code, "        try {{")?;
        writeln!(code, "            PacketDispatcher.dispatch(data, handler)")?;
        writeln!(code, "        }} catch (e: PacketDecodeException) {{")?;
        writeln!(code, "            onError?.invoke(e)")?;
        writeln!(code, "        }} catch (e: UnknownPayloadException) {{")?;
        writeln!(code, "            onError?.invoke(e)")?;
        writeln!(code, "        }}")?;
        writeln!(code, "    }}")?;
        writeln!(code, "}}")?;
    }

    if options.send_helpers {
        let header_type = type_ref(model, &model.header);
        let header_setter = format!("set{}", proto_pascal_case(&model.header.field_name));
        for variant in &model.variants {
            writeln!(code)?;
            writeln!(
                code,
                "fun PacketStream.{}(header: {header_type}, msg: {}) {{",
                send_method(&variant.field_name),
                type_ref(model, variant)
            )?;
            writeln!(code, "    val packet = {wrapper}.newBuilder()")?;
            writeln!(code, "        .{header_setter}(header)")?;
            writeln!(
                code,
                "        .set{}(msg)",
                proto_pascal_case(&variant.field_name)
            )?;
            writeln!(code, "        .build()")?;
            writeln!(code, "    writeFrame(packet.toByteArray())")?;
            writeln!(code, "}}")?;
        }
    }

    Ok(code)
}
