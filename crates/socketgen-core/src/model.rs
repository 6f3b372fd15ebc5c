//! Language-neutral description of one wrapper message and its payload variants.
//!
//! The model is built once by [`extract`](crate::extract()) and then only read:
//! every emitter receives the same `&DescriptorModel`.
//!
//! # Ordering
//!
//! [`DescriptorModel::variants`] keeps the declaration order of the oneof
//! members in the schema. Emitters walk it front to back, so generated method
//! and case order is identical across regenerations of the same schema.

use serde::Serialize;

/// Extracted view of a wrapper message with a oneof payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorModel {
    /// Schema package (may be empty).
    pub package_name: String,

    /// Declared name of the schema file the model was taken from.
    pub source_file: String,

    /// Name of the wrapper message (e.g. `GamePacket`).
    pub wrapper_name: String,

    /// Name of the payload oneof inside the wrapper (e.g. `payload`).
    pub oneof_name: String,

    /// The wrapper's common header field.
    pub header: HeaderField,

    /// Top-level message names declared in the source file.
    pub declared_messages: Vec<String>,

    /// Payload variants in declaration order.
    pub variants: Vec<PayloadVariant>,
}

/// One member of the payload oneof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadVariant {
    /// Bare message type name (`LoginReq`).
    pub type_name: String,

    /// Oneof member name in schema convention (`login_req`).
    pub field_name: String,

    /// Fully qualified type name without the leading dot (`packet.LoginReq`).
    pub qualified_type_name: String,

    /// Package that declares the message type.
    pub type_package: String,

    /// Declared name of the schema file that defines the message type.
    pub type_file: String,
}

/// The wrapper's header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderField {
    pub field_name: String,
    pub type_name: String,
    pub qualified_type_name: String,
    pub type_package: String,
    pub type_file: String,
}

/// A reference to a schema message type that emitters can render per language.
pub trait TypeReference {
    /// Fully qualified name without the leading dot.
    fn qualified_type_name(&self) -> &str;

    /// Package declaring the type.
    fn type_package(&self) -> &str;

    /// Schema file declaring the type (`game/common.proto`).
    fn type_file(&self) -> &str;

    /// Message path inside its package, outermost first.
    ///
    /// `packet.Lobby.JoinReq` in package `packet` yields `["Lobby", "JoinReq"]`.
    fn nested_path(&self) -> Vec<&str> {
        let qualified = self.qualified_type_name();
        let package = self.type_package();
        let local = if package.is_empty() {
            qualified
        } else {
            qualified
                .strip_prefix(package)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(qualified)
        };
        local.split('.').filter(|s| !s.is_empty()).collect()
    }

    /// Whether the type lives outside `package`.
    fn is_foreign_to(&self, package: &str) -> bool {
        self.type_package() != package
    }
}

impl TypeReference for PayloadVariant {
    fn qualified_type_name(&self) -> &str {
        &self.qualified_type_name
    }

    fn type_package(&self) -> &str {
        &self.type_package
    }

    fn type_file(&self) -> &str {
        &self.type_file
    }
}

impl TypeReference for HeaderField {
    fn qualified_type_name(&self) -> &str {
        &self.qualified_type_name
    }

    fn type_package(&self) -> &str {
        &self.type_package
    }

    fn type_file(&self) -> &str {
        &self.type_file
    }
}

impl HeaderField {
    /// Conventional `Header` message assumed when the wrapper declares none.
    ///
    /// It is taken to live next to the wrapper, in `file`.
    pub fn conventional(field_name: &str, package: &str, file: &str) -> Self {
        let qualified_type_name = if package.is_empty() {
            "Header".to_string()
        } else {
            format!("{package}.Header")
        };

        Self {
            field_name: field_name.to_string(),
            type_name: "Header".to_string(),
            qualified_type_name,
            type_package: package.to_string(),
            type_file: file.to_string(),
        }
    }
}

impl DescriptorModel {
    /// Base name of the source file without directories or the `.proto` suffix.
    ///
    /// Generated imports (`packet_pb2`, `packet.pb.dart`, `./packet`) are built
    /// from this stem.
    pub fn source_stem(&self) -> &str {
        let base = self
            .source_file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.source_file);
        base.strip_suffix(".proto").unwrap_or(base)
    }

    /// Schema files declaring the header and variant types, the model's own
    /// file first and the rest in first-use order.
    pub fn referenced_files(&self) -> Vec<&str> {
        let mut files = vec![self.source_file.as_str()];
        let used = std::iter::once(self.header.type_file.as_str())
            .chain(self.variants.iter().map(|v| v.type_file.as_str()));
        for file in used {
            if !files.contains(&file) {
                files.push(file);
            }
        }
        files
    }

    /// Look up a variant by its oneof member name.
    pub fn variant(&self, field_name: &str) -> Option<&PayloadVariant> {
        self.variants.iter().find(|v| v.field_name == field_name)
    }
}
