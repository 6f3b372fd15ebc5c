//! PHP dispatcher generation for `google/protobuf` bindings.
//!
//! Output follows PSR-4: one class or interface per file, in the namespace the
//! protobuf PHP plugin derives from the package (PascalCase segments).

use super::{
    EmitOptions, EmitResult, Emitter, SourceUnit, UnitKind, banner, handler_method, send_method,
    validate_model,
};
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::{package_segments, proto_pascal_case};
use std::fmt::Write;

/// Emitter for the `php` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpEmitter;

impl Emitter for PhpEmitter {
    fn language(&self) -> &'static str {
        "php"
    }

    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>> {
        validate_model(model)?;

        let mut units = vec![
            SourceUnit::new("PacketHandler.php", UnitKind::Handler, handler_file(model)?),
            SourceUnit::new(
                "PacketDispatcher.php",
                UnitKind::Dispatcher,
                dispatcher_file(model)?,
            ),
            SourceUnit::new(
                "PacketDecodeException.php",
                UnitKind::Error,
                exception_file(
                    model,
                    "PacketDecodeException",
                    &format!("The frame could not be decoded as a {}.", model.wrapper_name),
                )?,
            ),
            SourceUnit::new(
                "UnknownPayloadException.php",
                UnitKind::Error,
                exception_file(
                    model,
                    "UnknownPayloadException",
                    &format!("The decoded {} carries no known payload.", model.wrapper_name),
                )?,
            ),
        ];
        if options.wants_stream() {
            units.push(SourceUnit::new(
                "PacketStream.php",
                UnitKind::Stream,
                stream_interface_file(model)?,
            ));
            units.push(SourceUnit::new(
                "PacketStreams.php",
                UnitKind::Stream,
                stream_helpers_file(model, options)?,
            ));
        }
        Ok(units)
    }
}

fn namespace(package: &str) -> String {
    package_segments(package).join("\\")
}

/// PHP class name as seen from the model's namespace.
fn type_ref(model: &DescriptorModel, t: &impl TypeReference) -> String {
    let local = t.nested_path().join("\\");
    if !t.is_foreign_to(&model.package_name) {
        return local;
    }
    match namespace(t.type_package()) {
        ns if ns.is_empty() => format!("\\{local}"),
        ns => format!("\\{ns}\\{local}"),
    }
}

/// Accessor names follow protoc's PHP spelling (`login_2fa` gives `getLogin2Fa`).
fn getter(field_name: &str) -> String {
    format!("get{}", proto_pascal_case(field_name))
}

fn setter(field_name: &str) -> String {
    format!("set{}", proto_pascal_case(field_name))
}

fn preamble(model: &DescriptorModel) -> EmitResult<String> {
    let mut code = String::from("<?php\n\n");
    code.push_str(&banner("//", model));
    writeln!(code)?;
    writeln!(code, "declare(strict_types=1);")?;
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
    let mut code = preamble(model)?;

    writeln!(code, "/**")?;
    writeln!(
        code,
        " * One callback per {} payload variant.",
        model.wrapper_name
    )?;
    writeln!(code, " */")?;
    writeln!(code, "interface PacketHandler")?;
    writeln!(code, "{{")?;
    for (i, variant) in model.variants.iter().enumerate() {
        if i > 0 {
            writeln!(code)?;
        }
        writeln!(
            code,
            "    public function {}(?{header} $header, {} $msg): void;",
            handler_method(&variant.field_name),
            type_ref(model, variant)
        )?;
    }
    writeln!(code, "}}")?;

    Ok(code)
}

fn exception_file(model: &DescriptorModel, class: &str, doc: &str) -> EmitResult<String> {
    let mut code = preamble(model)?;

    writeln!(code, "/**")?;
    writeln!(code, " * {doc}")?;
    writeln!(code, " */")?;
    writeln!(code, "final class {class} extends \\RuntimeException")?;
    writeln!(code, "{{")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn dispatcher_file(model: &DescriptorModel) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let which = getter(&model.oneof_name);
    let header = getter(&model.header.field_name);
    let mut code = preamble(model)?;

    writeln!(code, "final class PacketDispatcher")?;
    writeln!(code, "{{")?;
    writeln!(code, "    /**")?;
    writeln!(
        code,
        "     * Decode a {wrapper} and call the handler method for its payload."
    )?;
    writeln!(code, "     *")?;
    writeln!(code, "     * @throws PacketDecodeException")?;
    writeln!(code, "     * @throws UnknownPayloadException")?;
    writeln!(code, "     */")?;
    writeln!(
        code,
        "    public static function dispatch(string $data, PacketHandler $handler): void"
    )?;
    writeln!(code, "    {{")?;
    writeln!(code, "        $packet = new {wrapper}();")?;
    writeln!(code, "        try {{")?;
    writeln!(code, "            $packet->mergeFromString($data);")?;
    writeln!(code, "        }} catch (\\Exception $e) {{")?;
    writeln!(
        code,
        "            throw new PacketDecodeException('failed to decode {wrapper}: ' . $e->getMessage(), 0, $e);"
    )?;
    writeln!(code, "        }}")?;
    writeln!(code)?;
    writeln!(code, "        switch ($packet->{which}()) {{")?;
    for variant in &model.variants {
        writeln!(code, "            case '{}':", variant.field_name)?;
        writeln!(
            code,
            "                $handler->{}($packet->{header}(), $packet->{}());",
            handler_method(&variant.field_name),
            getter(&variant.field_name)
        )?;
        writeln!(code, "                return;")?;
    }
    writeln!(code, "            default:")?;
    writeln!(
        code,
        "                throw new UnknownPayloadException('unknown {wrapper} payload: ' . $packet->{which}());"
    )?;
    writeln!(code, "        }}")?;
    writeln!(code, "    }}")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_interface_file(model: &DescriptorModel) -> EmitResult<String> {
    let mut code = preamble(model)?;

    writeln!(code, "/**")?;
    writeln!(
        code,
        " * Reads and writes whole {} frames.",
        model.wrapper_name
    )?;
    writeln!(code, " */")?;
    writeln!(code, "interface PacketStream")?;
    writeln!(code, "{{")?;
    writeln!(code, "    public function readFrame(): string;")?;
    writeln!(code)?;
    writeln!(code, "    public function writeFrame(string $data): void;")?;
    writeln!(code, "}}")?;

    Ok(code)
}

fn stream_helpers_file(model: &DescriptorModel, options: &EmitOptions) -> EmitResult<String> {
    let wrapper = &model.wrapper_name;
    let header_type = type_ref(model, &model.header);
    let mut code = preamble(model)?;

    writeln!(code, "final class PacketStreams")?;
    writeln!(code, "{{")?;

    let mut first = true;
    if options.serve_loop {
        first = false;
        writeln!(code, "    /**")?;
        writeln!(
            code,
            "     * Dispatch frames until readFrame() throws. Decode and unknown-payload"
        )?;
        writeln!(code, "     * failures go to $onError and do not stop the loop.")?;
        writeln!(code, "     *")?;
        writeln!(code, "     * @param (callable(\\Throwable): void)|null $onError")?;
        writeln!(code, "     */")?;
        writeln!(
            code,
            "    public static function serve(PacketStream $stream, PacketHandler $handler, ?callable $onError = null): never"
        )?;
        writeln!(code, "    {{")?;
        writeln!(code, "        while (true) {{")?;
        writeln!(code, "            $data = $stream->readFrame();")?;
        writeln!(code, "            try {{")?;
        writeln!(
            code,
            "                PacketDispatcher::dispatch($data, $handler);"
        )?;
        writeln!(
            code,
            "            }} catch (PacketDecodeException | UnknownPayloadException $e) {{"
        )?;
        writeln!(code, "                if ($onError !== null) {{")?;
        writeln!(code, "                    $onError($e);")?;
        writeln!(code, "                }}")?;
        writeln!(code, "            }}")?;
        writeln!(code, "        }}")?;
        writeln!(code, "    }}")?;
    }

    if options.send_helpers {
        for variant in &model.variants {
            if !first {
                writeln!(code)?;
            }
            first = false;
            writeln!(
                code,
                "    public static function {}(PacketStream $stream, ?{header_type} $header, {} $msg): void",
                send_method(&variant.field_name),
                type_ref(model, variant)
            )?;
            writeln!(code, "    {{")?;
            writeln!(code, "        $packet = new {wrapper}();")?;
            writeln!(
                code,
                "        $packet->{}($header);",
                setter(&model.header.field_name)
            )?;
            writeln!(
                code,
                "        $packet->{}($msg);",
                setter(&variant.field_name)
            )?;
            writeln!(
                code,
                "        $stream->writeFrame($packet->serializeToString());"
            )?;
            writeln!(code, "    }}")?;
        }
    }
    writeln!(code, "}}")?;

    Ok(code)
}
