//! Ruby dispatcher generation for `google-protobuf` bindings.
//!
//! Definitions are nested in the module path the Ruby plugin derives from the
//! package. Bodies are rendered flush-left and then indented once per module.

use super::{EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, indent, validate_model};
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::package_segments;
use std::fmt::Write;

/// Emitter for the `ruby` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct RubyEmitter;

impl Emitter for RubyEmitter {
    fn language(&self) -> &'static str {
        "ruby"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("packet_handler.rb", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new(
                "packet_dispatcher.rb",
                UnitKind::Dispatcher,
                dispatcher_file(model)?,
            ),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "packet_stream.rb",
                UnitKind::Stream,
                stream_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

/// Ruby constant path as seen from inside the model's modules.
fn type_ref(model: &DescriptorModel, t: &impl TypeReference) -> String {
    let local = t.nested_path().join("::");
    if !t.is_foreign_to(&model.package_name) {
        return local;
    }
    let mut segments = package_segments(t.type_package());
    segments.push(local);
    format!("::{}", segments.join("::"))
}

/// Wrap `body` in the package modules and prepend the file header.
fn wrap(model: &DescriptorModel, requires: &[String], body: &str) -> EmitResult<String> {
    let modules = package_segments(&model.package_name);
    let mut code = String::from("# frozen_string_literal: true\n\n");
    code.push_str(&banner("#", model));
    writeln!(code)?;
    if !requires.is_empty() {
        for require in requires {
            writeln!(code, "{require}")?;
        }
        writeln!(code)?;
    }
    for (depth, module) in modules.iter().enumerate() {
        writeln!(code, "{}module {module}", "  ".repeat(depth))?;
    }
    code.push_str(&indent(body, "  ", modules.len()));
    for depth in (0..modules.len()).rev() {
        writeln!(code, "{}end", "  ".repeat(depth))?;
    }
    Ok(code)
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(model, &model.header);
    let mut body = String::new();

    writeln!(
        body,
        "# One callback per {} payload variant. Include this module and",
        model.wrapper_name
    )?;
    writeln!(body, "# override every method.")?;
    writeln!(body, "module PacketHandler")?;
    for (i, variant) in model.variants.iter().enumerate() {
        if i > 0 {
            writeln!(body)?;
        }
        let method = format!("on_{}", variant.field_name);
        writeln!(body, "  # @param header [{header}, nil]")?;
        writeln!(body, "  # @param msg [{}]", type_ref(model, variant))?;
        writeln!(body, "  # @return [void]")?;
        writeln!(body, "  def {method}(header, msg)")?;
        writeln!(
            body,
            "    raise NotImplementedError, \"#{{self.class}} must implement {method}\""
        )?;
        writeln!(body, "  end")?;
    }
    writeln!(body, "end")?;

    wrap(model, &[], &body)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let oneof = &model.oneof_name;
    let header = &model.header.field_name;
    let mut body = String::new();

    writeln!(body, "# The frame could not be decoded as a {wrapper}.")?;
    writeln!(body, "class PacketDecodeError < StandardError; end")?;
    writeln!(body)?;
    writeln!(body, "# The decoded {wrapper} carries no known payload.")?;
    writeln!(body, "class UnknownPayloadError < StandardError; end")?;
    writeln!(body)?;
    writeln!(body, "module PacketDispatcher")?;
    writeln!(body, "  module_function")?;
    writeln!(body)?;
    writeln!(
        body,
        "  # Decode a {wrapper} and call the handler method for its payload."
    )?;
    writeln!(body, "  #")?;
    writeln!(body, "  # @raise [PacketDecodeError]")?;
    writeln!(body, "  # @raise [UnknownPayloadError]")?;
    writeln!(body, "  def dispatch(data, handler)")?;
    writeln!(body, "    begin")?;
    writeln!(body, "      packet = {wrapper}.decode(data)")?;
    writeln!(body, "    rescue Google::Protobuf::ParseError => e")?;
    writeln!(
        body,
        "      raise PacketDecodeError, \"failed to decode {wrapper}: #{{e.message}}\""
    )?;
    writeln!(body, "    end")?;
    writeln!(body)?;
    writeln!(body, "    case packet.{oneof}")?;
    for variant in &model.variants {
        let field = &variant.field_name;
        writeln!(body, "    when :{field}")?;
        writeln!(
            body,
            "      handler.on_{field}(packet.{header}, packet.{field})"
        )?;
    }
    writeln!(body, "    else")?;
    writeln!(
        body,
        "      raise UnknownPayloadError, \"unknown {wrapper} payload: #{{packet.{oneof}.inspect}}\""
    )?;
    writeln!(body, "    end")?;
    writeln!(body, "  end")?;
    writeln!(body, "end")?;

    let requires = vec![
        "require \"google/protobuf\"".to_string(),
        format!("require_relative \"{}_pb\"", model.source_stem()),
    ];
    wrap(model, &requires, &body)
}

fn stream_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let header_type = type_ref(model, &model.header);
    let mut body = String::new();

    writeln!(
        body,
        "# Reads and writes whole {wrapper} frames. Include this module and"
    )?;
    writeln!(body, "# implement both methods.")?;
    writeln!(body, "module PacketStream")?;
    writeln!(body, "  # @return [String] one encoded frame")?;
    writeln!(body, "  def read_frame")?;
    writeln!(
        body,
        "    raise NotImplementedError, \"#{{self.class}} must implement read_frame\""
    )?;
    writeln!(body, "  end")?;
    writeln!(body)?;
    writeln!(body, "  # @param data [String]")?;
    writeln!(body, "  # @return [void]")?;
    writeln!(body, "  def write_frame(data)")?;
    writeln!(
        body,
        "    raise NotImplementedError, \"#{{self.class}} must implement write_frame\""
    )?;
    writeln!(body, "  end")?;
    writeln!(body, "end")?;
    writeln!(body)?;
    writeln!(body, "module PacketStreams")?;
    writeln!(body, "  module_function")?;

    if options.serve_loop {
        writeln!(body)?;
        writeln!(
            body,
            "  # Dispatch frames until read_frame raises. Decode and unknown-payload"
        )?;
        writeln!(
            body,
            "  # failures are yielded to the block and do not stop the loop."
        )?;
        writeln!(body, "  def serve(stream, handler, &on_error)")?;
        writeln!(body, "    loop do")?;
        writeln!(body, "      data = stream.read_frame")?;
        writeln!(body, "      begin")?;
        writeln!(body, "        PacketDispatcher.dispatch(data, handler)")?;
        writeln!(body, "      rescue PacketDecodeError, UnknownPayloadError => e")?;
        writeln!(body, "        on_error&.call(e)")?;
        writeln!(body, "      end")?;
        writeln!(body, "    end")?;
        writeln!(body, "  end")?;
    }

    if options.send_helpers {
        let header_key = &model.header.field_name;
        for variant in &model.variants {
            let field = &variant.field_name;
            writeln!(body)?;
            writeln!(body, "  # @param header [{header_type}, nil]")?;
            writeln!(body, "  # @param msg [{}]", type_ref(model, variant))?;
            writeln!(body, "  def send_{field}(stream, header, msg)")?;
            writeln!(
                body,
                "    packet = {wrapper}.new({header_key}: header, {field}: msg)"
            )?;
            writeln!(body, "    stream.write_frame({wrapper}.encode(packet))")?;
            writeln!(body, "  end")?;
        }
    }
    writeln!(body, "end")?;

    let mut requires = Vec::new();
    if options.serve_loop {
        requires.push("require_relative \"packet_dispatcher\"".to_string());
    }
    if options.send_helpers {
        requires.push(format!("require_relative \"{}_pb\"", model.source_stem()));
    }
    wrap(model, &requires, &body)
}
