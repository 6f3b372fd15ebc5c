//! Python dispatcher generation for `protoc --python_out` bindings.
//!
//! Message types are referenced through the `_pb2` module of the schema file
//! that declares them. Field names that are Python keywords (`from`,
//! `import`, ...) are read with `getattr` and passed with `**{...}`.

use super::{
    EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, module_path, validate_model,
};
use crate::model::{DescriptorModel, TypeReference};
use std::fmt::Write;

/// Emitter for the `python` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonEmitter;

impl Emitter for PythonEmitter {
    fn language(&self) -> &'static str {
        "python"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("packet_handler.py", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new(
                "packet_dispatcher.py",
                UnitKind::Dispatcher,
                dispatcher_file(model)?,
            ),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "packet_stream.py",
                UnitKind::Stream,
                stream_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

/// Reserved words that cannot appear as attribute or keyword-argument names.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

fn is_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Dotted module protoc generates for a schema file (`game.common_pb2`).
fn pb2_module(file: &str) -> String {
    format!("{}_pb2", module_path(file).replace('/', "."))
}

/// `import` lines for every schema file the header and variants come from.
fn pb2_imports(model: &DescriptorModel) -> Vec<String> {
    model
        .referenced_files()
        .into_iter()
        .map(|file| format!("import {}", pb2_module(file)))
        .collect()
}

/// `packet_pb2.Lobby.JoinReq`
fn type_ref(t: &(impl TypeReference + ?Sized)) -> String {
    format!("{}.{}", pb2_module(t.type_file()), t.nested_path().join("."))
}

/// `obj.name`, or `getattr(obj, "name")` when `name` is reserved.
fn attr(obj: &str, name: &str) -> String {
    if is_keyword(name) {
        format!("getattr({obj}, \"{name}\")")
    } else {
        format!("{obj}.{name}")
    }
}

/// Keyword arguments `name=value`, unpacked from a dict when any name is reserved.
fn kwargs(pairs: &[(&str, &str)]) -> String {
    if pairs.iter().any(|(name, _)| is_keyword(name)) {
        let entries: Vec<String> = pairs
            .iter()
            .map(|(name, value)| format!("\"{name}\": {value}"))
            .collect();
        format!("**{{{}}}", entries.join(", "))
    } else {
        let args: Vec<String> = pairs.iter().map(|(name, value)| format!("{name}={value}")).collect();
        args.join(", ")
    }
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(&model.header);
    let mut code = banner("#", model);

    writeln!(code)?;
    writeln!(code, "from __future__ import annotations")?;
    writeln!(code)?;
    writeln!(code, "import abc")?;
    writeln!(code)?;
    for line in pb2_imports(model) {
        writeln!(code, "{line}")?;
    }
    writeln!(code)?;
    writeln!(code)?;
    writeln!(code, "class PacketHandler(abc.ABC):")?;
    writeln!(
        code,
        "    \"\"\"One callback per {} payload variant.\"\"\"",
        model.wrapper_name
    )?;
    for variant in &model.variants {
        writeln!(code)?;
        writeln!(code, "    @abc.abstractmethod")?;
        writeln!(
            code,
            "    def on_{}(self, header: {header}, msg: {}) -> None: ...",
            variant.field_name,
            type_ref(variant)
        )?;
    }

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let pb2 = pb2_module(&model.source_file);
    let header = attr("packet", &model.header.field_name);
    let mut code = banner("#", model);

    writeln!(code)?;
    writeln!(code, "from __future__ import annotations")?;
    writeln!(code)?;
    writeln!(code, "from google.protobuf.message import DecodeError")?;
    writeln!(code)?;
    writeln!(code, "import {pb2}")?;
    writeln!(code, "from packet_handler import PacketHandler")?;
    writeln!(code)?;
    writeln!(code)?;
    writeln!(code, "class PacketDecodeError(Exception):")?;
    writeln!(
        code,
        "    \"\"\"The frame could not be decoded as a {wrapper}.\"\"\""
    )?;
    writeln!(code)?;
    writeln!(code)?;
    writeln!(code, "class UnknownPayloadError(Exception):")?;
    writeln!(
        code,
        "    \"\"\"The decoded {wrapper} carries no known payload.\"\"\""
    )?;
    writeln!(code)?;
    writeln!(code)?;
    writeln!(
        code,
        "def dispatch(data: bytes, handler: PacketHandler) -> None:"
    )?;
    writeln!(code, "    packet = {pb2}.{wrapper}()")?;
    writeln!(code, "    try:")?;
    writeln!(code, "        packet.ParseFromString(data)")?;
    writeln!(code, "    except DecodeError as err:")?;
    writeln!(code, "        raise PacketDecodeError(str(err)) from err")?;
    writeln!(code)?;
    writeln!(
        code,
        "    which = packet.WhichOneof(\"{}\")",
        model.oneof_name
    )?;
    for (i, variant) in model.variants.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "elif" };
        let field = &variant.field_name;
        writeln!(code, "    {keyword} which == \"{field}\":")?;
        writeln!(
            code,
            "        handler.on_{field}({header}, {})",
            attr("packet", field)
        )?;
    }
    writeln!(code, "    else:")?;
    writeln!(
        code,
        "        raise UnknownPayloadError(f\"unknown {wrapper} payload: {{which}}\")"
    )?;

    Ok(code)
}

fn stream_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let pb2 = pb2_module(&model.source_file);
    let header = type_ref(&model.header);
    let mut code = banner("#", model);

    let typing: &[&str] = if options.serve_loop {
        &["Callable", "NoReturn", "Optional", "Protocol"]
    } else {
        &["Protocol"]
    };

    writeln!(code)?;
    writeln!(code, "from __future__ import annotations")?;
    writeln!(code)?;
    writeln!(code, "from typing import {}", typing.join(", "))?;
    writeln!(code)?;
    if options.send_helpers {
        for line in pb2_imports(model) {
            writeln!(code, "{line}")?;
        }
    }
    if options.serve_loop {
        writeln!(
            code,
            "from packet_dispatcher import PacketDecodeError, UnknownPayloadError, dispatch"
        )?;
        writeln!(code, "from packet_handler import PacketHandler")?;
    }
    writeln!(code)?;
    writeln!(code)?;
    writeln!(code, "class PacketStream(Protocol):")?;
    writeln!(code, "    \"\"\"Reads and writes whole {wrapper} frames.\"\"\"")?;
    writeln!(code)?;
    writeln!(code, "    def read_frame(self) -> bytes: ...")?;
    writeln!(code)?;
    writeln!(code, "    def write_frame(self, data: bytes) -> None: ...")?;

    if options.serve_loop {
        writeln!(code)?;
        writeln!(code)?;
        writeln!(code, "def serve(")?;
        writeln!(code, "    stream: PacketStream,")?;
        writeln!(code, "    handler: PacketHandler,")?;
        writeln!(
            code,
            "    on_error: Optional[Callable[[Exception], None]] = None,"
        )?;
        writeln!(code, ") -> NoReturn:")?;
        writeln!(
            code,
            "    \"\"\"Dispatch frames until read_frame raises.\"\"\""
        )?;
        writeln!(code, "    while True:")?;
        writeln!(code, "        data = stream.read_frame()")?;
        writeln!(code, "        try:")?;
        writeln!(code, "            dispatch(data, handler)")?;
        writeln!(
            code,
            "        except (PacketDecodeError, UnknownPayloadError) as err:"
        )?;
        writeln!(code, "            if on_error is not None:")?;
        writeln!(code, "                on_error(err)")?;
    }

    if options.send_helpers {
        let header_key = &model.header.field_name;
        for variant in &model.variants {
            let field = &variant.field_name;
            writeln!(code)?;
            writeln!(code)?;
            writeln!(
                code,
                "def send_{field}(stream: PacketStream, header: {header}, msg: {}) -> None:",
                type_ref(variant)
            )?;
            writeln!(
                code,
                "    packet = {pb2}.{wrapper}({})",
                kwargs(&[(header_key.as_str(), "header"), (field.as_str(), "msg")])
            )?;
            writeln!(code, "    stream.write_frame(packet.SerializeToString())")?;
        }
    }

    Ok(code)
}
