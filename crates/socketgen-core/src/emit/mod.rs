//! Per-language dispatcher emitters.
//!
//! Each target language has one [`Emitter`] that turns a [`DescriptorModel`]
//! into source text. All of them produce the same three pieces:
//!
//! - **Handler contract**: one `on<Variant>` method per payload variant taking
//!   the header and the variant payload.
//! - **Dispatcher**: decodes bytes into the wrapper, checks variants in model
//!   order, calls the matching handler method, and raises a decode failure or
//!   an unknown-payload failure that callers can tell apart.
//! - **Stream helpers** (optional, see [`EmitOptions`]): a read/write frame
//!   abstraction, a serve loop that reports dispatch failures and keeps going,
//!   and one send helper per variant.
//!
//! # Architecture
//!
//! ```text
//! DescriptorModel
//!     ↓
//!  validate_model
//!     ↓
//!  ├─→ [GoEmitter]         → handler.go, dispatcher.go, stream.go
//!  ├─→ [TypeScriptEmitter] → handler.ts, dispatcher.ts, stream.ts
//!  ├─→ [PythonEmitter]     → packet_handler.py, packet_dispatcher.py, packet_stream.py
//!  ├─→ [CSharpEmitter]     → IPacketHandler.cs, PacketDispatcher.cs, IPacketStream.cs
//!  ├─→ [DartEmitter]       → packet_handler.dart, packet_dispatcher.dart, packet_stream.dart
//!  ├─→ [PhpEmitter]        → PacketHandler.php, PacketDispatcher.php, ...
//!  ├─→ [RubyEmitter]       → packet_handler.rb, packet_dispatcher.rb, packet_stream.rb
//!  ├─→ [KotlinEmitter]     → PacketHandler.kt, PacketDispatcher.kt, PacketStream.kt
//!  └─→ [JavaEmitter]       → PacketHandler.java, PacketDispatcher.java, PacketStream.java
//! ```
//!
//! Emitters are pure: the output depends only on the model and options, never
//! on time, randomness or the filesystem.

use crate::error::EmitError;
use crate::model::{DescriptorModel, TypeReference};
use crate::naming::{is_identifier, to_pascal_case};
use serde::Serialize;

pub mod csharp;
pub mod dart;
pub mod go;
pub mod java;
pub mod kotlin;
pub mod php;
pub mod python;
pub mod ruby;
pub mod typescript;

pub use csharp::CSharpEmitter;
pub use dart::DartEmitter;
pub use go::GoEmitter;
pub use java::JavaEmitter;
pub use kotlin::KotlinEmitter;
pub use php::PhpEmitter;
pub use python::PythonEmitter;
pub use ruby::RubyEmitter;
pub use typescript::TypeScriptEmitter;

/// Result type alias for emitters
pub type EmitResult<T> = Result<T, EmitError>;

/// Role of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Handler capability contract
    Handler,
    /// Decode-and-route routine
    Dispatcher,
    /// Frame stream abstraction (and, where idiomatic, serve/send helpers)
    Stream,
    /// Failure types in languages that want one type per file
    Error,
}

/// One logical generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    /// File name relative to the language output directory.
    pub path: String,

    pub kind: UnitKind,

    pub contents: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, kind: UnitKind, contents: String) -> Self {
        Self {
            path: path.into(),
            kind,
            contents,
        }
    }
}

/// Switches for the optional parts of the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Emit the serve loop.
    pub serve_loop: bool,

    /// Emit one send helper per variant.
    pub send_helpers: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            serve_loop: true,
            send_helpers: true,
        }
    }
}

impl EmitOptions {
    /// Dispatcher and handler only.
    pub fn minimal() -> Self {
        Self {
            serve_loop: false,
            send_helpers: false,
        }
    }

    /// Whether the stream abstraction is needed at all.
    pub fn wants_stream(&self) -> bool {
        self.serve_loop || self.send_helpers
    }
}

/// A code generator for one target language.
pub trait Emitter: Send + Sync {
    /// Language tag this emitter answers to (`go`, `ts`, ...).
    fn language(&self) -> &'static str;

    /// Produce the generated files for `model`.
    fn emit(&self, model: &DescriptorModel, options: &EmitOptions) -> EmitResult<Vec<SourceUnit>>;
}

/// Check that every name an emitter will splice into source is a plain identifier.
pub fn validate_model(model: &DescriptorModel) -> EmitResult<()> {
    let mut names: Vec<&str> = vec![
        model.wrapper_name.as_str(),
        model.oneof_name.as_str(),
        model.header.field_name.as_str(),
        model.header.type_name.as_str(),
    ];
    names.extend(model.header.nested_path());
    names.extend(model.package_name.split('.').filter(|s| !s.is_empty()));

    for variant in &model.variants {
        names.push(variant.field_name.as_str());
        names.push(variant.type_name.as_str());
        names.extend(variant.nested_path());
        names.extend(variant.type_package.split('.').filter(|s| !s.is_empty()));
    }

    match names.into_iter().find(|name| !is_identifier(name)) {
        Some(bad) => Err(EmitError::InvalidIdentifier(bad.to_string())),
        None => Ok(()),
    }
}

/// `on` + PascalCase field name, the handler method name in camel-cased languages.
pub(crate) fn handler_method(field_name: &str) -> String {
    format!("on{}", to_pascal_case(field_name))
}

/// `send` + PascalCase field name.
pub(crate) fn send_method(field_name: &str) -> String {
    format!("send{}", to_pascal_case(field_name))
}

/// Header and variant types grouped by the schema file declaring them, in
/// [`DescriptorModel::referenced_files`] order.
pub(crate) fn types_by_file(model: &DescriptorModel) -> Vec<(&str, Vec<&dyn TypeReference>)> {
    let types = std::iter::once(&model.header as &dyn TypeReference)
        .chain(model.variants.iter().map(|v| v as &dyn TypeReference));
    let mut groups: Vec<(&str, Vec<&dyn TypeReference>)> = model
        .referenced_files()
        .into_iter()
        .map(|file| (file, Vec::new()))
        .collect();
    for t in types {
        if let Some((_, members)) = groups.iter_mut().find(|(file, _)| *file == t.type_file()) {
            members.push(t);
        }
    }
    groups
}

/// Schema file name without its `.proto` suffix, with `/` separators
/// (`game/common.proto` becomes `game/common`).
pub(crate) fn module_path(file: &str) -> String {
    let path = file.replace('\\', "/");
    match path.strip_suffix(".proto") {
        Some(stem) => stem.to_string(),
        None => path,
    }
}

/// Generated-file banner in the given line comment syntax.
pub(crate) fn banner(comment: &str, model: &DescriptorModel) -> String {
    format!(
        "{comment} Code generated by socketgen. DO NOT EDIT.\n{comment} source: {}\n",
        model.source_file
    )
}

/// Indent every non-empty line of `text` by `levels` steps of `unit`.
pub(crate) fn indent(text: &str, unit: &str, levels: usize) -> String {
    let prefix = unit.repeat(levels);
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !line.is_empty() {
            out.push_str(&prefix);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}
