//! Typed descriptor tree.
//!
//! A small set of records (files, messages, fields, oneof groups) mirroring the
//! parts of `google.protobuf.FileDescriptorSet` the extractor reads. The tree
//! is built once from compiler output, or by hand in tests:
//!
//! ```
//! use socketgen_core::descriptor::{DescriptorSet, FieldDescriptor, FileDescriptor, MessageDescriptor};
//!
//! let set = DescriptorSet::new(vec![FileDescriptor::new("packet.proto", "packet").with_message(
//!     MessageDescriptor::new("GamePacket")
//!         .with_oneof("payload")
//!         .with_field(FieldDescriptor::message("login_req", 10, ".packet.LoginReq").in_oneof(0)),
//! )]);
//!
//! assert_eq!(set.files[0].messages[0].fields.len(), 1);
//! ```

use crate::error::ExtractResult;
use prost::Message as _;

/// All files of one compilation closure, in compiler order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorSet {
    pub files: Vec<FileDescriptor>,
}

/// One schema file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Declared path, relative to the include root (`proto/packet.proto`).
    pub name: String,
    pub package: String,
    /// Top-level messages in declaration order.
    pub messages: Vec<MessageDescriptor>,
}

/// A message declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub oneofs: Vec<OneofGroup>,
    pub nested: Vec<MessageDescriptor>,
}

/// A field declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: i32,
    /// Referenced type for message and enum fields (`.packet.LoginReq`), empty for scalars.
    pub type_name: String,
    /// Whether the field holds a message (as opposed to a scalar or enum).
    pub is_message: bool,
    /// Index into the owning message's oneof list.
    pub oneof_index: Option<i32>,
}

/// A oneof group declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneofGroup {
    pub name: String,
}

impl DescriptorSet {
    pub fn new(files: Vec<FileDescriptor>) -> Self {
        Self { files }
    }

    /// Decode a binary `FileDescriptorSet` as written by `protoc --descriptor_set_out`.
    pub fn decode(bytes: &[u8]) -> ExtractResult<Self> {
        let raw = prost_types::FileDescriptorSet::decode(bytes)?;
        Ok(Self::from(raw))
    }

    /// Package that declares the message with the given fully qualified name.
    ///
    /// Accepts names with or without the leading dot and searches nested
    /// messages. Returns `None` when no file in the set declares it.
    pub fn package_of(&self, qualified: &str) -> Option<&str> {
        self.file_of(qualified).map(|file| file.package.as_str())
    }

    /// File that declares the message with the given fully qualified name.
    pub fn file_of(&self, qualified: &str) -> Option<&FileDescriptor> {
        let qualified = qualified.strip_prefix('.').unwrap_or(qualified);

        self.files.iter().find(|file| {
            let local = if file.package.is_empty() {
                Some(qualified)
            } else {
                qualified
                    .strip_prefix(file.package.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
            };

            local.is_some_and(|local| {
                let path: Vec<&str> = local.split('.').collect();
                find_message(&file.messages, &path).is_some()
            })
        })
    }
}

fn find_message<'a>(messages: &'a [MessageDescriptor], path: &[&str]) -> Option<&'a MessageDescriptor> {
    let (first, rest) = path.split_first()?;
    let message = messages.iter().find(|m| m.name == *first)?;
    if rest.is_empty() {
        Some(message)
    } else {
        find_message(&message.nested, rest)
    }
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.messages.push(message);
        self
    }

    /// Find a top-level message by name.
    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name == name)
    }
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_oneof(mut self, name: impl Into<String>) -> Self {
        self.oneofs.push(OneofGroup { name: name.into() });
        self
    }

    pub fn with_nested(mut self, message: MessageDescriptor) -> Self {
        self.nested.push(message);
        self
    }

    /// Position of the oneof group with the given name.
    pub fn oneof_index(&self, name: &str) -> Option<usize> {
        self.oneofs.iter().position(|o| o.name == name)
    }
}

impl FieldDescriptor {
    /// A message-typed field.
    pub fn message(name: impl Into<String>, number: i32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: type_name.into(),
            is_message: true,
            oneof_index: None,
        }
    }

    /// A scalar field (no referenced type).
    pub fn scalar(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: String::new(),
            is_message: false,
            oneof_index: None,
        }
    }

    /// Mark the field as a member of the oneof at `index`.
    pub fn in_oneof(mut self, index: i32) -> Self {
        self.oneof_index = Some(index);
        self
    }
}

// ============================================================================
// Conversion from compiler output
// ============================================================================

impl From<prost_types::FileDescriptorSet> for DescriptorSet {
    fn from(raw: prost_types::FileDescriptorSet) -> Self {
        Self {
            files: raw.file.into_iter().map(FileDescriptor::from).collect(),
        }
    }
}

impl From<prost_types::FileDescriptorProto> for FileDescriptor {
    fn from(raw: prost_types::FileDescriptorProto) -> Self {
        Self {
            name: raw.name().to_string(),
            package: raw.package().to_string(),
            messages: raw
                .message_type
                .into_iter()
                .map(MessageDescriptor::from)
                .collect(),
        }
    }
}

impl From<prost_types::DescriptorProto> for MessageDescriptor {
    fn from(raw: prost_types::DescriptorProto) -> Self {
        Self {
            name: raw.name().to_string(),
            fields: raw.field.into_iter().map(FieldDescriptor::from).collect(),
            oneofs: raw
                .oneof_decl
                .into_iter()
                .map(|o| OneofGroup {
                    name: o.name().to_string(),
                })
                .collect(),
            nested: raw
                .nested_type
                .into_iter()
                .map(MessageDescriptor::from)
                .collect(),
        }
    }
}

impl From<prost_types::FieldDescriptorProto> for FieldDescriptor {
    fn from(raw: prost_types::FieldDescriptorProto) -> Self {
        use prost_types::field_descriptor_proto::Type;

        // Unresolved descriptors leave `type` unset and only carry the name.
        let is_message = match raw.r#type {
            Some(_) => matches!(raw.r#type(), Type::Message | Type::Group),
            None => !raw.type_name().is_empty(),
        };

        Self {
            name: raw.name().to_string(),
            number: raw.number(),
            type_name: raw.type_name().to_string(),
            is_message,
            oneof_index: raw.oneof_index,
        }
    }
}
