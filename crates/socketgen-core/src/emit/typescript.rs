//! TypeScript dispatcher generation for `ts-proto` bindings.
//!
//! ts-proto renders oneof members as optional camelCase properties on the
//! wrapper, so the dispatcher checks them one by one in declaration order.
//! ts-proto writes one module per schema file, so types are imported from
//! the module of the file that declares them.

use super::{
    EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, handler_method, module_path,
    send_method, types_by_file, validate_model,
};
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::to_camel_case;
use std::fmt::Write;

/// Emitter for the `ts` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptEmitter;

impl Emitter for TypeScriptEmitter {
    fn language(&self) -> &'static str {
        "ts"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("handler.ts", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new("dispatcher.ts", UnitKind::Dispatcher, dispatcher_file(model)?),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "stream.ts",
                UnitKind::Stream,
                stream_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

/// ts-proto type name: nested messages are flattened with `_`.
fn type_ref(t: &(impl TypeReference + ?Sized)) -> String {
    t.nested_path().join("_")
}

/// One import statement per schema file declaring the header or a variant,
/// names sorted. `own` adds bindings from the model's own file.
fn import_lines(model: &DescriptorModel, keyword: &str, own: &[&str]) -> Vec<String> {
    types_by_file(model)
        .into_iter()
        .filter_map(|(file, types)| {
            let mut names: Vec<String> = types.into_iter().map(type_ref).collect();
            if file == model.source_file {
                names.extend(own.iter().map(|name| name.to_string()));
            }
            names.sort();
            names.dedup();
            if names.is_empty() {
                return None;
            }
            Some(format!(
                "{keyword} {{ {} }} from \"./{}\";",
                names.join(", "),
                module_path(file)
            ))
        })
        .collect()
}

fn handler_file(model: &DescriptorModel) -> EmitResult<String> {
    let header = type_ref(&model.header);
    let mut code = banner("//", model);

    writeln!(code)?;
    for line in import_lines(model, "import type", &[]) {
        writeln!(code, "{line}")?;
    }
    writeln!(code)?;
    writeln!(
        code,
        "/** One callback per {} payload variant. */",
        model.wrapper_name
    )?;
    writeln!(code, "export interface PacketHandler {{")?;
    for variant in &model.variants {
        writeln!(
            code,
            "  {}(header: {header} | undefined, msg: {}): void;",
            handler_method(&variant.field_name),
            type_ref(variant)
        )?;
    }
    writeln!(code, "}}")?;

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let header = to_camel_case(&model.header.field_name);
    let mut code = banner("//", model);

    writeln!(code)?;
    writeln!(
        code,
        "import {{ {wrapper} }} from \"./{}\";",
        module_path(&model.source_file)
    )?;
    writeln!(code, "import type {{ PacketHandler }} from \"./handler\";")?;
    writeln!(code)?;
    writeln!(code, "/** The frame could not be decoded as a {wrapper}. */")?;
    writeln!(code, "export class PacketDecodeError extends Error {{")?;
    writeln!(code, "  constructor(readonly reason: unknown) {{")?;
    writeln!(
        code,
        "    super(`failed to decode {wrapper}: ${{String(reason)}}`);"
    )?;
    writeln!(code, "    this.name = \"PacketDecodeError\";")?;
    writeln!(code, "  }}")?;
    writeln!(code, "}}")?;
    writeln!(code)?;
    writeln!(code, "/** The decoded {wrapper} carries no known payload. */")?;
    writeln!(code, "export class UnknownPayloadError extends Error {{")?;
    writeln!(code, "  constructor() {{")?;
    writeln!(code, "    super(\"unknown {wrapper} payload\");")?;
    writeln!(code, "    this.name = \"UnknownPayloadError\";")?;
    writeln!(code, "  }}")?;
    writeln!(code, "}}")?;
    writeln!(code)?;
    writeln!(
        code,
        "export function dispatch(data: Uint8Array, handler: PacketHandler): void {{"
    )?;
    writeln!(code, "  let packet: {wrapper};")?;
    writeln!(code, "  try {{")?;
    writeln!(code, "    packet = {wrapper}.decode(data);")?;
    writeln!(code, "  }} catch (err) {{")?;
    writeln!(code, "    throw new PacketDecodeError(err);")?;
    writeln!(code, "  }}")?;
    for variant in &model.variants {
        let member = to_camel_case(&variant.field_name);
        writeln!(code)?;
        writeln!(code, "  if (packet.{member} !== undefined) {{")?;
        writeln!(
            code,
            "    handler.{}(packet.{header}, packet.{member});",
            handler_method(&variant.field_name)
        )?;
        writeln!(code, "    return;")?;
        writeln!(code, "  }}")?;
    }
    writeln!(code)?;
    writeln!(code, "  throw new UnknownPayloadError();")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let header = type_ref(&model.header);
    let mut code = banner("//", model);

    writeln!(code)?;
    if options.send_helpers {
        for line in import_lines(model, "import", &[wrapper.as_str()]) {
            writeln!(code, "{line}")?;
        }
    }
    if options.serve_loop {
        writeln!(
            code,
            "import {{ dispatch, PacketDecodeError, UnknownPayloadError }} from \"./dispatcher\";"
        )?;
        writeln!(code, "import type {{ PacketHandler }} from \"./handler\";")?;
    }
    writeln!(code)?;
    writeln!(code, "/** Reads and writes whole {wrapper} frames. */")?;
    writeln!(code, "export interface PacketStream {{")?;
    writeln!(code, "  readFrame(): Promise<Uint8Array>;")?;
    writeln!(code, "  writeFrame(data: Uint8Array): Promise<void>;")?;
    writeln!(code, "}}")?;

    if options.serve_loop {
        writeln!(code)?;
        writeln!(code, "/**")?;
        writeln!(
            code,
            " * Dispatch frames until readFrame rejects. Decode and unknown-payload"
        )?;
        writeln!(
            code,
            " * failures go to onError and do not stop the loop."
        )?;
        writeln!(code, " */")?;
        writeln!(code, "export async function serve(")?;
        writeln!(code, "  stream: PacketStream,")?;
        writeln!(code, "  handler: PacketHandler,")?;
        writeln!(code, "  onError?: (err: Error) => void,")?;
        writeln!(code, "): Promise<never> {{")?;
        writeln!(code, "  for (;;) {{")?;
        writeln!(code, "    const data = await stream.readFrame();")?;
        writeln!(code, "    try {{")?;
        writeln!(code, "      dispatch(data, handler);")?;
        writeln!(code, "    }} catch (err) {{")?;
        writeln!(
            code,
            "      if (err instanceof PacketDecodeError || err instanceof UnknownPayloadError) {{"
        )?;
        writeln!(code, "        onError?.(err);")?;
        writeln!(code, "        continue;")?;
        writeln!(code, "      }}")?;
        writeln!(code, "      throw err;")?;
        writeln!(code, "    }}")?;
        writeln!(code, "  }}")?;
        writeln!(code, "}}")?;
    }

    if options.send_helpers {
        let header_key = to_camel_case(&model.header.field_name);
        for variant in &model.variants {
            writeln!(code)?;
            writeln!(code, "export function {}(", send_method(&variant.field_name))?;
            writeln!(code, "  stream: PacketStream,")?;
            writeln!(code, "  header: {header} | undefined,")?;
            writeln!(code, "  msg: {},", type_ref(variant))?;
            writeln!(code, "): Promise<void> {{")?;
            writeln!(
                code,
                "  const packet = {wrapper}.fromPartial({{ {header_key}: header, {}: msg }});",
                to_camel_case(&variant.field_name)
            )?;
            writeln!(
                code,
                "  return stream.writeFrame({wrapper}.encode(packet).finish());"
            )?;
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
        TypeScriptEmitter
            .emit(&sample_model(), &EmitOptions::default())
            .unwrap()
    }

    #[test]
    fn handler___imports_sorted_types_and_declares_methods() {
        let units = emit_default();
        let handler = unit(&units, "handler.ts");

        assert!(handler.contains(
            "import type { ChatMsg, Header, LoginReq, LoginRes } from \"./packet\";"
        ));
        assert_in_order(
            handler,
            &[
                "onLoginReq(header: Header | undefined, msg: LoginReq): void;",
                "onLoginRes(header: Header | undefined, msg: LoginRes): void;",
                "onChatMsg(header: Header | undefined, msg: ChatMsg): void;",
            ],
        );
    }

    #[test]
    fn dispatcher___checks_members_in_order_then_throws_unknown() {
        let units = emit_default();
        let dispatcher = unit(&units, "dispatcher.ts");

        assert_in_order(
            dispatcher,
            &[
                "packet = GamePacket.decode(data);",
                "throw new PacketDecodeError(err);",
                "if (packet.loginReq !== undefined) {",
                "handler.onLoginReq(packet.header, packet.loginReq);",
                "if (packet.loginRes !== undefined) {",
                "if (packet.chatMsg !== undefined) {",
                "throw new UnknownPayloadError();",
            ],
        );
    }

    #[test]
    fn stream___serve_rethrows_other_errors() {
        let units = emit_default();
        let stream = unit(&units, "stream.ts");

        assert_in_order(
            stream,
            &[
                "): Promise<never> {",
                "const data = await stream.readFrame();",
                "err instanceof PacketDecodeError || err instanceof UnknownPayloadError",
                "onError?.(err);",
                "throw err;",
            ],
        );
    }

    #[test]
    fn stream___send_helper_builds_partial_wrapper() {
        let units = emit_default();
        let stream = unit(&units, "stream.ts");

        assert!(stream.contains(
            "import { ChatMsg, GamePacket, Header, LoginReq, LoginRes } from \"./packet\";"
        ));
        assert!(stream.contains("export function sendChatMsg("));
        assert!(stream.contains("GamePacket.fromPartial({ header: header, chatMsg: msg })"));
    }

    #[test]
    fn stream___send_only___has_no_dispatcher_import() {
        let options = EmitOptions {
            serve_loop: false,
            send_helpers: true,
        };
        let units = TypeScriptEmitter.emit(&sample_model(), &options).unwrap();
        let stream = unit(&units, "stream.ts");

        assert!(!stream.contains("./dispatcher"));
        assert!(!stream.contains("serve("));
    }

    #[test]
    fn handler___foreign_variant___imports_from_declaring_module() {
        let units = TypeScriptEmitter
            .emit(&model_with_foreign_variant(), &EmitOptions::minimal())
            .unwrap();
        let handler = unit(&units, "handler.ts");

        assert_in_order(
            handler,
            &[
                "import type { ChatMsg, Header, LoginReq, LoginRes } from \"./packet\";",
                "import type { Ping } from \"./game/common\";",
                "onPing(header: Header | undefined, msg: Ping): void;",
            ],
        );
    }

    #[test]
    fn stream___foreign_variant___keeps_wrapper_in_own_module() {
        let units = TypeScriptEmitter
            .emit(&model_with_foreign_variant(), &EmitOptions::default())
            .unwrap();
        let stream = unit(&units, "stream.ts");

        assert!(stream.contains(
            "import { ChatMsg, GamePacket, Header, LoginReq, LoginRes } from \"./packet\";"
        ));
        assert!(stream.contains("import { Ping } from \"./game/common\";"));
        assert!(!stream.contains("Ping, "));
    }
}
