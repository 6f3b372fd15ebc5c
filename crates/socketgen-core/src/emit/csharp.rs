//! C# dispatcher generation for `Google.Protobuf` bindings.
//!
//! The namespace follows the protobuf C# default: each package segment in
//! PascalCase. Nested messages live under the generated `Types` class, and
//! types from other packages are referenced through `global::`.

use super::{EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, validate_model};
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::{package_segments, proto_pascal_case, to_pascal_case};
use std::fmt::Write;

/// Emitter for the `csharp` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct CSharpEmitter;

impl Emitter for CSharpEmitter {
    fn language(&self) -> &'static str {
        "csharp"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("IPacketHandler.cs", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new(
                "PacketDispatcher.cs",
                UnitKind::Dispatcher,
                dispatcher_file(model)?,
            ),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "IPacketStream.cs",
                UnitKind::Stream,
                stream_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

fn namespace(package: &str) -> String {
    package_segments(package).join(".")
}

/// C# type name as seen from the model's namespace.
fn type_ref(model: &DescriptorModel, t: &impl TypeReference) -> String {
    let local = t.nested_path().join(".Types.");
    if !t.is_foreign_to(&model.package_name) {
        return local;
    }
    match namespace(t.type_package()) {
        ns if ns.is_empty() => format!("global::{local}"),
        ns => format!("global::{ns}.{local}"),
    }
}

/// Banner, usings and the file-scoped namespace.
fn preamble(model: &DescriptorModel, usings: &[&str]) -> EmitResult<String> {
    let mut code = banner("//", model);
    writeln!(code)?;
    writeln!(code, "#nullable enable")?;
    if !usings.is_empty() {
        writeln!(code)?;
        for using in usings {
            writeln!(code, "using {using};")?;
        }
    }
    let ns = namespace(&model.package_name);
    if !ns.is_empty() {
        writeln!(code)?;
        writeln!(code, "namespace {ns};")?;
    }
    writeln!(code)?;
    Ok(code)
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(model, &model.header);
    let mut code = preamble(model, &[])?;

    writeln!(code, "/// <summary>")?;
    writeln!(
        code,
        "/// One callback per <see cref=\"{}\"/> payload variant.",
        model.wrapper_name
    )?;
    writeln!(code, "/// </summary>")?;
    writeln!(code, "public interface IPacketHandler")?;
    writeln!(code, "{{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "    void On{}({header} header, {} msg);",
            to_pascal_case(&variant.field_name),
            type_ref(model, variant)
        )?;
    }
    writeln!(code, "}}")?;

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let case_enum = format!("{wrapper}.{}OneofCase", proto_pascal_case(&model.oneof_name));
    let case_property = format!("{}Case", proto_pascal_case(&model.oneof_name));
    let header = proto_pascal_case(&model.header.field_name);
    let mut code = preamble(model, &["System", "Google.Protobuf"])?;

    writeln!(
        code,
        "/// <summary>The frame could not be decoded as a <see cref=\"{wrapper}\"/>.</summary>"
    )?;
    writeln!(code, "public sealed class PacketDecodeException : Exception")?;
    writeln!(code, "{{")?;
    writeln!(code, "    public PacketDecodeException(Exception inner)")?;
    writeln!(
        code,
        "        : base(\"failed to decode {wrapper}\", inner)"
    )?;
    writeln!(code, "    {{")?;
    writeln!(code, "    }}")?;
    writeln!(code, "}}")?;
    writeln!(code)?;
    writeln!(
        code,
        "/// <summary>The decoded <see cref=\"{wrapper}\"/> carries no known payload.</summary>"
    )?;
    writeln!(code, "public sealed class UnknownPayloadException : Exception")?;
    writeln!(code, "{{")?;
    writeln!(
        code,
        "    public UnknownPayloadException({case_enum} payloadCase)"
    )?;
    writeln!(
        code,
        "        : base($\"unknown {wrapper} payload: {{payloadCase}}\")"
    )?;
    writeln!(code, "    {{")?;
    writeln!(code, "        PayloadCase = payloadCase;")?;
    writeln!(code, "    }}")?;
    writeln!(code)?;
    writeln!(code, "    public {case_enum} PayloadCase {{ get; }}")?;
    writeln!(code, "}}")?;
    writeln!(code)?;
    writeln!(code, "public static class PacketDispatcher")?;
    writeln!(code, "{{")?;
    writeln!(
        code,
        "    public static void Dispatch(byte[] data, IPacketHandler handler)"
    )?;
    writeln!(code, "    {{")?;
    writeln!(code, "        {wrapper} packet;")?;
    writeln!(code, "        try")?;
    writeln!(code, "        {{")?;
    writeln!(code, "            packet = {wrapper}.Parser.ParseFrom(data);")?;
    writeln!(code, "        }}")?;
    writeln!(code, "        catch (InvalidProtocolBufferException ex)")?;
    writeln!(code, "        {{")?;
    writeln!(code, "            throw new PacketDecodeException(ex);")?;
    writeln!(code, "        }}")?;
    writeln!(code)?;
    writeln!(code, "        switch (packet.{case_property})")?;
    writeln!(code, "        {{")?;
    for variant in &model.variants {
        let member = proto_pascal_case(&variant.field_name);
        writeln!(code, "            case {case_enum}.{member}:")?;
        writeln!(
            code,
            "                handler.On{}(packet.{header}, packet.{member});",
            to_pascal_case(&variant.field_name)
        )?;
        writeln!(code, "                break;")?;
    }
    writeln!(code, "            default:")?;
    writeln!(
        code,
        "                throw new UnknownPayloadException(packet.{case_property});"
    )?;
    writeln!(code, "        }}")?;
    writeln!(code, "    }}")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let header_type = type_ref(model, &model.header);
    let header = proto_pascal_case(&model.header.field_name);

    let mut usings = Vec::new();
    if options.serve_loop {
        usings.push("System");
    }
    usings.extend(["System.Threading", "System.Threading.Tasks"]);
    if options.send_helpers {
        usings.push("Google.Protobuf");
    }
    let mut code = preamble(model, &usings)?;

    writeln!(
        code,
        "/// <summary>Reads and writes whole <see cref=\"{wrapper}\"/> frames.</summary>"
    )?;
    writeln!(code, "public interface IPacketStream")?;
    writeln!(code, "{{")?;
    writeln!(
        code,
        "    Task<byte[]> ReadFrameAsync(CancellationToken cancellationToken = default);"
    )?;
    writeln!(code)?;
    writeln!(
        code,
        "    Task WriteFrameAsync(byte[] data, CancellationToken cancellationToken = default);"
    )?;
    writeln!(code, "}}")?;
    writeln!(code)?;
    writeln!(code, "public static class PacketStreamExtensions")?;
    writeln!(code, "{{")?;

    let mut first = true;
    if options.serve_loop {
        first = false;
        writeln!(code, "    /// <summary>")?;
        writeln!(
            code,
            "    /// Dispatches frames until <see cref=\"IPacketStream.ReadFrameAsync\"/> throws."
        )?;
        writeln!(
            code,
            "    /// Decode and unknown-payload failures go to <paramref name=\"onError\"/>."
        )?;
        writeln!(code, "    /// </summary>")?;
        writeln!(code, "    public static async Task ServeAsync(")?;
        writeln!(code, "        this IPacketStream stream,")?;
        writeln!(code, "        IPacketHandler handler,")?;
        writeln!(code, "        Action<Exception>? onError = null,")?;
        writeln!(code, "        CancellationToken cancellationToken = default)")?;
        writeln!(code, "    {{")?;
        writeln!(code, "        while (true)")?;
        writeln!(code, "        {{")?;
        writeln!(
            code,
            "            var data = await stream.ReadFrameAsync(cancellationToken).ConfigureAwait(false);"
        )?;
        writeln!(code, "            try")?;
        writeln!(code, "            {{")?;
        writeln!(code, "                PacketDispatcher.Dispatch(data, handler);")?;
        writeln!(code, "            }}")?;
        writeln!(
            code,
            "            catch (Exception ex) when (ex is PacketDecodeException or UnknownPayloadException)"
        )?;
        writeln!(code, "            {{")?;
        writeln!(code, "                onError?.Invoke(ex);")?;
        writeln!(code, "            }}")?;
        writeln!(code, "        }}")?;
        writeln!(code, "    }}")?;
    }

    if options.send_helpers {
        for variant in &model.variants {
            let member = proto_pascal_case(&variant.field_name);
            if !first {
                writeln!(code)?;
            }
            first = false;
            writeln!(
                code,
                "    public static Task Send{}Async(",
                to_pascal_case(&variant.field_name)
            )?;
            writeln!(code, "        this IPacketStream stream,")?;
            writeln!(code, "        {header_type} header,")?;
            writeln!(code, "        {} msg,", type_ref(model, variant))?;
            writeln!(code, "        CancellationToken cancellationToken = default)")?;
            writeln!(code, "    {{")?;
            writeln!(
                code,
                "        var packet = new {wrapper} {{ {header} = header, {member} = msg }};"
            )?;
            writeln!(
                code,
                "        return stream.WriteFrameAsync(packet.ToByteArray(), cancellationToken);"
            )?;
            writeln!(code, "    }}")?;
        }
    }
    writeln!(code, "}}")?;

    Ok(code)
}
