//! socketgen-core - Packet dispatcher generation from protobuf descriptors
//!
//! This crate turns a compiled schema with a wrapper message (by default
//! `GamePacket`) and a payload oneof (by default `payload`) into handler
//! interfaces and dispatchers for several languages:
//! - [`descriptor`] holds the typed descriptor tree decoded from a
//!   `FileDescriptorSet`
//! - [`extract()`] reads a [`DescriptorModel`] out of that tree
//! - [`emit`] contains one [`Emitter`] per target language
//! - [`EmitterRegistry`] runs the requested emitters and collects a
//!   [`GenerationReport`]
//!
//! Nothing here touches the filesystem or spawns processes; compiling the
//! schema and writing the output belong to the caller.
//!
//! # Example
//!
//! ```
//! use socketgen_core::descriptor::{DescriptorSet, FieldDescriptor, FileDescriptor, MessageDescriptor};
//! use socketgen_core::{EmitterRegistry, ExtractOptions, extract};
//!
//! let wrapper = MessageDescriptor::new("GamePacket")
//!     .with_field(FieldDescriptor::message("header", 1, ".packet.Header"))
//!     .with_oneof("payload")
//!     .with_field(FieldDescriptor::message("login_req", 10, ".packet.LoginReq").in_oneof(0));
//! let file = FileDescriptor::new("packet.proto", "packet")
//!     .with_message(MessageDescriptor::new("Header"))
//!     .with_message(MessageDescriptor::new("LoginReq"))
//!     .with_message(wrapper);
//!
//! let model = extract(&DescriptorSet::new(vec![file]), &ExtractOptions::default()).unwrap();
//! let report = EmitterRegistry::new().generate(&model, &["go", "ts"]);
//!
//! assert!(report.is_complete());
//! ```

pub mod descriptor;
pub mod emit;
pub mod error;
pub mod extract;
pub mod model;
pub mod naming;
pub mod registry;

pub use emit::{EmitOptions, Emitter, SourceUnit, UnitKind};
pub use error::{EmitError, ExtractError, ExtractResult, GenerateError};
pub use extract::{ExtractOptions, extract};
pub use model::{DescriptorModel, HeaderField, PayloadVariant, TypeReference};
pub use registry::{BUILTIN_LANGUAGES, EmitterRegistry, GenerationReport, LanguageOutcome};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DescriptorModel, EmitOptions, Emitter, EmitterRegistry, ExtractError, ExtractOptions,
        GenerateError, GenerationReport, SourceUnit, extract,
    };
}
