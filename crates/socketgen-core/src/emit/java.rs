//! Java dispatcher generation for `protobuf-java` bindings.
//!
//! Without `java_multiple_files`, protoc nests every message in an outer class
//! named after the file (`packet.proto` -> `Packet`). When that name collides
//! with a message declared in the file, protoc appends `OuterClass`. The Kotlin
//! emitter targets the same classes and reuses the helpers here.

use super::{
    EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, handler_method, send_method,
    validate_model,
};
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::{proto_pascal_case, to_upper_snake_case};
use std::fmt::Write;

/// Emitter for the `java` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaEmitter;

impl Emitter for JavaEmitter {
    fn language(&self) -> &'static str {
        "java"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("PacketHandler.java", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new(
                "PacketDispatcher.java",
                UnitKind::Dispatcher,
                dispatcher_file(model, options)?,
            ),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "PacketStream.java",
                UnitKind::Stream,
                stream_file(model)?,
            ));
        }
        Ok(units)
    }
}

/// Outer class name protoc derives from a schema file name.
fn outer_class_name(file: &str) -> String {
    let stem = file.rsplit(['/', '\\']).next().unwrap_or(file);
    proto_pascal_case(stem.strip_suffix(".proto").unwrap_or(stem))
}

/// Outer class protoc generates for the source file.
pub(super) fn outer_class(model: &DescriptorModel) -> String {
    let name = outer_class_name(&model.source_file);
    if model.declared_messages.iter().any(|m| *m == name) {
        format!("{name}OuterClass")
    } else {
        name
    }
}

/// JVM class reference for a schema message.
///
/// Types from other packages are assumed to be generated with
/// `java_multiple_files`, so their qualified name is the class name. Types
/// from a sibling file of the same package go through that file's outer
/// class, whose messages are not known here to detect an `OuterClass` suffix.
pub(super) fn type_ref(model: &DescriptorModel, t: &impl TypeReference) -> String {
    if t.is_foreign_to(&model.package_name) {
        return t.qualified_type_name().to_string();
    }
    let outer = if t.type_file() == model.source_file {
        outer_class(model)
    } else {
        outer_class_name(t.type_file())
    };
    format!("{outer}.{}", t.nested_path().join("."))
}

/// `Packet.GamePacket`
pub(super) fn wrapper_ref(model: &DescriptorModel) -> String {
    format!("{}.{}", outer_class(model), model.wrapper_name)
}

/// `Packet.GamePacket.PayloadCase`
pub(super) fn case_enum(model: &DescriptorModel) -> String {
    format!(
        "{}.{}Case",
        wrapper_ref(model),
        proto_pascal_case(&model.oneof_name)
    )
}

pub(super) fn package_line(model: &DescriptorModel, terminator: &str) -> EmitResult<String> {
    let mut code = String::new();
    if !model.package_name.is_empty() {
        writeln!(code, "package {}{terminator}", model.package_name)?;
        writeln!(code)?;
    }
    Ok(code)
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(model, &model.header);
    let mut code = banner("//", model);

    writeln!(code)?;
    code.push_str(&package_line(model, ";")?);
    writeln!(
        code,
        "/** One callback per {{@code {}}} payload variant. */",
        model.wrapper_name
    )?;
    writeln!(code, "public interface PacketHandler {{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "    void {}({header} header, {} msg);",
            handler_method(&variant.field_name),
            type_ref(model, variant)
        )?;
    }
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_file(model: &DescriptorModel) -> EmitResult<String> {
    let mut code = banner("//", model);

    writeln!(code)?;
    code.push_str(&package_line(model, ";")?);
    writeln!(code, "import java.io.IOException;")?;
    writeln!(code)?;
    writeln!(
        code,
        "/** Reads and writes whole {{@code {}}} frames. */",
        model.wrapper_name
    )?;
    writeln!(code, "public interface PacketStream {{")?;
    writeln!(code, "    byte[] readFrame() throws IOException;")?;
    writeln!(code)?;
    writeln!(code, "    void writeFrame(byte[] data) throws IOException;")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper_name = &model.wrapper_name;
    let wrapper = wrapper_ref(model);
    let case_enum = case_enum(model);
    let case_getter = format!("get{}Case", proto_pascal_case(&model.oneof_name));
    let header_getter = format!("get{}", proto_pascal_case(&model.header.field_name));
    let mut code = banner("//", model);

    writeln!(code)?;
    code.push_str(&package_line(model, ";")?);
    writeln!(code, "import com.google.protobuf.InvalidProtocolBufferException;")?;
    if options.wants_stream() {
        writeln!(code, "import java.io.IOException;")?;
    }
    if options.serve_loop {
        writeln!(code, "import java.util.function.Consumer;")?;
    }
    writeln!(code)?;
    writeln!(code, "public final class PacketDispatcher {{")?;
    writeln!(code, "    private PacketDispatcher() {{}}")?;
    writeln!(code)?;
    writeln!(
        code,
        "    /** The frame could not be decoded as a {{@code {wrapper_name}}}. */"
    )?;
    writeln!(
        code,
        "    public static final class PacketDecodeException extends Exception {{"
    )?;
    writeln!(code, "        public PacketDecodeException(Throwable cause) {{")?;
    writeln!(
        code,
        "            super(\"failed to decode {wrapper_name}\", cause);"
    )?;
    writeln!(code, "        }}")?;
    writeln!(code, "    }}")?;
    writeln!(code)?;
    writeln!(
        code,
        "    /** The decoded {{@code {wrapper_name}}} carries no known payload. */"
    )?;
    writeln!(
        code,
        "    public static final class UnknownPayloadException extends Exception {{"
    )?;
    writeln!(code, "        private final {case_enum} payloadCase;")?;
    writeln!(code)?;
    writeln!(
        code,
        "        public UnknownPayloadException({case_enum} payloadCase) {{"
    )?;
    writeln!(
        code,
        "            super(\"unknown {wrapper_name} payload: \" + payloadCase);"
    )?;
    writeln!(code, "            this.payloadCase = payloadCase;")?;
    writeln!(code, "        }}")?;
    writeln!(code)?;
    writeln!(code, "        public {case_enum} getPayloadCase() {{")?;
    writeln!(code, "            return payloadCase;")?;
    writeln!(code, "        }}")?;
    writeln!(code, "    }}")?;
    writeln!(code)?;
    writeln!(
        code,
        "    public static void dispatch(byte[] data, PacketHandler handler)"
    )?;
    writeln!(
        code,
        "            throws PacketDecodeException, UnknownPayloadException {{"
    )?;
    writeln!(code, "        {wrapper} packet;")?;
    writeln!(code, "        try {{")?;
    writeln!(code, "            packet = {wrapper}.parseFrom(data);")?;
    writeln!(code, "        }} catch (InvalidProtocolBufferException e) {{")?;
    writeln!(code, "            throw new PacketDecodeException(e);")?;
    writeln!(code, "        }}")?;
    writeln!(code)?;
    writeln!(code, "        switch (packet.{case_getter}()) {{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "            case {}:",
            to_upper_snake_case(&variant.field_name)
        )?;
        writeln!(
            code,
            "                handler.{}(packet.{header_getter}(), packet.get{}());",
            handler_method(&variant.field_name),
            proto_pascal_case(&variant.field_name)
        )?;
        writeln!(code, "                return;")?;
    }
    writeln!(code, "            default:")?;
    writeln!(
        code,
        "                throw new UnknownPayloadException(packet.{case_getter}());"
    )?;
    writeln!(code, "        }}")?;
    writeln!(code, "    }}")?;

    if options.serve_loop {
        writeln!(code)?;
        writeln!(code, "    /**")?;
        writeln!(
            code,
            "     * Dispatches frames until {{@link PacketStream#readFrame()}} throws. Decode and"
        )?;
        writeln!(
            code,
            "     * unknown-payload failures go to {{@code onError}} (may be null)."
        )?;
        writeln!(code, "     */")?;
        writeln!(
            code,
            "    public static void serve(PacketStream stream, PacketHandler handler, Consumer<Exception> onError)"
        )?;
        writeln!(code, "            throws IOException {{")?;
        writeln!(code, "        while (true) {{")?;
        writeln!(code, "            byte[] data = stream.readFrame();")?;
        writeln!(code, "            try {{")?;
        writeln!(code, "                dispatch(data, handler);")?;
        writeln!(
            code,
            "            }} catch (PacketDecodeException | UnknownPayloadException e) {{"
        )?;
        writeln!(code, "                if (onError != null) {{")?;
        writeln!(code, "                    onError.accept(e);")?;
        writeln!(code, "                }}")?;
        writeln!(code, "            }}")?;
        writeln!(code, "        }}")?;
        writeln!(code, "    }}")?;
    }

    if options.send_helpers {
        let header_type = type_ref(model, &model.header);
        let header_setter = format!("set{}", proto_pascal_case(&model.header.field_name));
        for variant in &model.variants {
            writeln!(code)?;
            writeln!(
                code,
                "    public static void {}(PacketStream stream, {header_type} header, {} msg)",
                send_method(&variant.field_name),
                type_ref(model, variant)
            )?;
            writeln!(code, "            throws IOException {{")?;
            writeln!(code, "        {wrapper} packet = {wrapper}.newBuilder()")?;
            writeln!(code, "                .{header_setter}(header)")?;
            writeln!(
                code,
                "                .set{}(msg)",
                proto_pascal_case(&variant.field_name)
            )?;
            writeln!(code, "                .build();")?;
            writeln!(code, "        stream.writeFrame(packet.toByteArray());")?;
            writeln!(code, "    }}")?;
        }
    }
    writeln!(code, "}}")?;

    Ok(code)
}
