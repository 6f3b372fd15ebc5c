//! Go dispatcher generation for `google.golang.org/protobuf` bindings.
//!
//! The generated files live in the same Go package as the `protoc-gen-go`
//! output, so message types are referenced unqualified. The oneof is matched
//! with a type switch over the `isGamePacket_Payload` wrapper types.
//!
//! Struct, field and getter names are spelled the way `protoc-gen-go` spells
//! them ([`go_camel_case`]); only the `On`/`Send` names are socketgen's own.
//! A payload or header type from another schema package has no import path
//! here and is rejected with [`EmitError::UnreachableType`].

use super::{EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, validate_model};
use crate::error::EmitError;
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::{go_camel_case, to_pascal_case};
use std::fmt::Write;

/// Emitter for the `go` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoEmitter;

impl Emitter for GoEmitter {
    fn language(&self) -> &'static str {
        "go"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("handler.go", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new("dispatcher.go", UnitKind::Dispatcher, dispatcher_file(model)?),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "stream.go",
                UnitKind::Stream,
                stream_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

/// Go package clause: last segment of the schema package, or the file stem.
fn package_clause(model: &DescriptorModel) -> String {
    let name = match model.package_name.rsplit('.').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => model.source_stem().to_string(),
    };
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Go type name of a message in the model's package (`Lobby_JoinReq`).
fn type_ref(model: &DescriptorModel, t: &impl TypeReference) -> EmitResult<String> {
    if t.type_package() != model.package_name {
        return Err(EmitError::UnreachableType {
            type_name: t.qualified_type_name().to_string(),
            package: t.type_package().to_string(),
        });
    }
    Ok(go_camel_case(&t.nested_path().join(".")))
}

/// Name of the generated oneof wrapper struct (`GamePacket_LoginReq`).
fn oneof_wrapper(model: &DescriptorModel, field_name: &str) -> String {
    format!("{}_{}", go_camel_case(&model.wrapper_name), go_camel_case(field_name))
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(model, &model.header)?;
    let mut code = banner("//", model);

    writeln!(code)?;
    writeln!(code, "package {}", package_clause(model))?;
    writeln!(code)?;
    writeln!(
        code,
        "// Handler receives one callback per {} payload variant.",
        model.wrapper_name
    )?;
    writeln!(code, "type Handler interface {{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "\tOn{}(header *{}, msg *{})",
            to_pascal_case(&variant.field_name),
            header,
            type_ref(model, variant)?
        )?;
    }
    writeln!(code, "}}")?;

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper = go_camel_case(&model.wrapper_name);
    let oneof = go_camel_case(&model.oneof_name);
    let header_getter = format!("Get{}", go_camel_case(&model.header.field_name));
    let mut code = banner("//", model);

    writeln!(code)?;
    writeln!(code, "package {}", package_clause(model))?;
    writeln!(code)?;
    writeln!(code, "import (")?;
    writeln!(code, "\t\"errors\"")?;
    writeln!(code, "\t\"fmt\"")?;
    writeln!(code)?;
    writeln!(code, "\t\"google.golang.org/protobuf/proto\"")?;
    writeln!(code, ")")?;
    writeln!(code)?;
    writeln!(
        code,
        "// ErrDecode is returned when a frame cannot be decoded as a {wrapper}."
    )?;
    writeln!(
        code,
        "var ErrDecode = errors.New(\"socketgen: failed to decode {wrapper}\")"
    )?;
    writeln!(code)?;
    writeln!(
        code,
        "// ErrUnknownPayload is returned when a decoded {wrapper} carries no known payload."
    )?;
    writeln!(
        code,
        "var ErrUnknownPayload = errors.New(\"socketgen: unknown {wrapper} payload\")"
    )?;
    writeln!(code)?;
    writeln!(
        code,
        "// Dispatch decodes data as a {wrapper} and calls the handler method for its payload."
    )?;
    writeln!(code, "func Dispatch(data []byte, h Handler) error {{")?;
    writeln!(code, "\tpacket := &{wrapper}{{}}")?;
    writeln!(code, "\tif err := proto.Unmarshal(data, packet); err != nil {{")?;
    writeln!(code, "\t\treturn fmt.Errorf(\"%w: %v\", ErrDecode, err)")?;
    writeln!(code, "\t}}")?;
    writeln!(code)?;
    writeln!(code, "\tswitch p := packet.{oneof}.(type) {{")?;
    for variant in &model.variants {
        let member = go_camel_case(&variant.field_name);
        writeln!(code, "\tcase *{}:", oneof_wrapper(model, &variant.field_name))?;
        writeln!(
            code,
            "\t\th.On{}(packet.{header_getter}(), p.{member})",
            to_pascal_case(&variant.field_name)
        )?;
    }
    writeln!(code, "\tdefault:")?;
    writeln!(
        code,
        "\t\treturn fmt.Errorf(\"%w: %T\", ErrUnknownPayload, packet.{oneof})"
    )?;
    writeln!(code, "\t}}")?;
    writeln!(code, "\treturn nil")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = go_camel_case(&model.wrapper_name);
    let header = type_ref(model, &model.header)?;
    let mut code = banner("//", model);

    writeln!(code)?;
    writeln!(code, "package {}", package_clause(model))?;
    writeln!(code)?;
    if options.send_helpers {
        writeln!(code, "import \"google.golang.org/protobuf/proto\"")?;
        writeln!(code)?;
    }
    writeln!(code, "// Stream reads and writes whole {wrapper} frames.")?;
    writeln!(code, "type Stream interface {{")?;
    writeln!(code, "\tReadFrame() ([]byte, error)")?;
    writeln!(code, "\tWriteFrame(data []byte) error")?;
    writeln!(code, "}}")?;

    if options.serve_loop {
        writeln!(code)?;
        writeln!(
            code,
            "// Serve dispatches frames from s to h until ReadFrame fails."
        )?;
        writeln!(
            code,
            "// Dispatch failures go to onError (if non-nil) and do not stop the loop."
        )?;
        writeln!(
            code,
            "func Serve(s Stream, h Handler, onError func(error)) error {{"
        )?;
        writeln!(code, "\tfor {{")?;
        writeln!(code, "\t\tdata, err := s.ReadFrame()")?;
        writeln!(code, "\t\tif err != nil {{")?;
        writeln!(code, "\t\t\treturn err")?;
        writeln!(code, "\t\t}}")?;
        writeln!(
            code,
            "\t\tif err := Dispatch(data, h); err != nil && onError != nil {{"
        )?;
        writeln!(code, "\t\t\tonError(err)")?;
        writeln!(code, "\t\t}}")?;
        writeln!(code, "\t}}")?;
        writeln!(code, "}}")?;
    }

    if options.send_helpers {
        let header_key = format!("{}:", go_camel_case(&model.header.field_name));
        let oneof_key = format!("{}:", go_camel_case(&model.oneof_name));
        let width = header_key.len().max(oneof_key.len()) + 1;

        for variant in &model.variants {
            let send = to_pascal_case(&variant.field_name);
            let member = go_camel_case(&variant.field_name);
            writeln!(code)?;
            writeln!(code, "// Send{send} writes a {wrapper} carrying msg to s.")?;
            writeln!(
                code,
                "func Send{send}(s Stream, header *{header}, msg *{}) error {{",
                type_ref(model, variant)?
            )?;
            writeln!(code, "\tdata, err := proto.Marshal(&{wrapper}{{")?;
            writeln!(code, "\t\t{header_key:<width$}header,")?;
            writeln!(
                code,
                "\t\t{oneof_key:<width$}&{}{{{member}: msg}},",
                oneof_wrapper(model, &variant.field_name)
            )?;
            writeln!(code, "\t}})")?;
            writeln!(code, "\tif err != nil {{")?;
            writeln!(code, "\t\treturn err")?;
            writeln!(code, "\t}}")?;
            writeln!(code, "\treturn s.WriteFrame(data)")?;
            writeln!(code, "}}")?;
        }
    }

    Ok(code)
}
