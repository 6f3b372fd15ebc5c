//! Descriptor extraction.
//!
//! Locates the wrapper message and its payload oneof inside a
//! [`DescriptorSet`] and turns them into a [`DescriptorModel`].
//!
//! # File selection
//!
//! Compiling with `--include_imports` puts every imported file in the set, so
//! the extractor first picks the file to read:
//!
//! 1. If [`ExtractOptions::source_file`] is set, the first file whose declared
//!    name ends with the requested base name on a path boundary wins
//!    (`packet.proto` matches `proto/packet.proto`, not `mypacket.proto`).
//! 2. Otherwise, or if nothing matches, the last file in the set is used. The
//!    compiler lists the requested file after its imports, so this holds for a
//!    single-file compilation but is a best-effort guess in general.
//!
//! Two files with the same base name under different include paths are
//! ambiguous. The first one wins and a warning is logged; pass a descriptor
//! set compiled from a single root file to avoid it.

use crate::descriptor::{DescriptorSet, FileDescriptor, MessageDescriptor};
use crate::error::{ExtractError, ExtractResult};
use crate::model::{DescriptorModel, HeaderField, PayloadVariant};

/// Default wrapper message name.
pub const DEFAULT_WRAPPER_MESSAGE: &str = "GamePacket";

/// Default payload oneof name.
pub const DEFAULT_ONEOF_FIELD: &str = "payload";

/// Default header field name.
pub const DEFAULT_HEADER_FIELD: &str = "header";

/// Names the extractor looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Wrapper message name (default `GamePacket`).
    pub wrapper_message: String,

    /// Payload oneof name inside the wrapper (default `payload`).
    pub oneof_field: String,

    /// Header field name inside the wrapper (default `header`).
    pub header_field: String,

    /// Schema file originally requested from the compiler, if known.
    pub source_file: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            wrapper_message: DEFAULT_WRAPPER_MESSAGE.to_string(),
            oneof_field: DEFAULT_ONEOF_FIELD.to_string(),
            header_field: DEFAULT_HEADER_FIELD.to_string(),
            source_file: None,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer the file matching this requested schema path.
    pub fn with_source_file(mut self, path: impl Into<String>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    pub fn with_wrapper_message(mut self, name: impl Into<String>) -> Self {
        self.wrapper_message = name.into();
        self
    }

    pub fn with_oneof_field(mut self, name: impl Into<String>) -> Self {
        self.oneof_field = name.into();
        self
    }

    pub fn with_header_field(mut self, name: impl Into<String>) -> Self {
        self.header_field = name.into();
        self
    }
}

/// Build a [`DescriptorModel`] from a descriptor tree.
///
/// The traversal is pure: the same set and options always produce an equal
/// model, with variants in field declaration order.
pub fn extract(set: &DescriptorSet, options: &ExtractOptions) -> ExtractResult<DescriptorModel> {
    let file = select_file(set, options.source_file.as_deref())?;

    tracing::debug!(
        "Reading '{}' from '{}' (package '{}')",
        options.wrapper_message,
        file.name,
        file.package
    );

    let wrapper = file
        .message(&options.wrapper_message)
        .ok_or_else(|| ExtractError::WrapperNotFound {
            wrapper: options.wrapper_message.clone(),
            file: file.name.clone(),
        })?;

    let oneof_index =
        wrapper
            .oneof_index(&options.oneof_field)
            .ok_or_else(|| ExtractError::OneofNotFound {
                wrapper: wrapper.name.clone(),
                oneof: options.oneof_field.clone(),
            })?;

    let variants = collect_variants(set, file, wrapper, oneof_index)?;
    if variants.is_empty() {
        return Err(ExtractError::EmptyVariantSet {
            wrapper: wrapper.name.clone(),
            oneof: options.oneof_field.clone(),
        });
    }

    for variant in &variants {
        tracing::debug!(
            "Payload variant {} (field {}, type {})",
            variant.type_name,
            variant.field_name,
            variant.qualified_type_name
        );
    }

    Ok(DescriptorModel {
        package_name: file.package.clone(),
        source_file: file.name.clone(),
        wrapper_name: wrapper.name.clone(),
        oneof_name: options.oneof_field.clone(),
        header: header_field(set, file, wrapper, &options.header_field),
        declared_messages: file.messages.iter().map(|m| m.name.clone()).collect(),
        variants,
    })
}

/// Pick the file to read from the set.
fn select_file<'a>(set: &'a DescriptorSet, requested: Option<&str>) -> ExtractResult<&'a FileDescriptor> {
    let last = set.files.last().ok_or(ExtractError::EmptyDescriptorSet)?;

    let Some(requested) = requested else {
        return Ok(last);
    };

    let base = base_name(requested);
    let mut matches = set.files.iter().filter(|f| matches_base_name(&f.name, base));

    match matches.next() {
        Some(first) => {
            if let Some(other) = matches.next() {
                tracing::warn!(
                    "Both '{}' and '{}' match '{}'; using '{}'",
                    first.name,
                    other.name,
                    requested,
                    first.name
                );
            }
            Ok(first)
        }
        None => {
            tracing::warn!(
                "No file in the descriptor set matches '{}'; falling back to '{}'",
                requested,
                last.name
            );
            Ok(last)
        }
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn matches_base_name(declared: &str, base: &str) -> bool {
    match declared.strip_suffix(base) {
        Some(prefix) => prefix.is_empty() || prefix.ends_with('/') || prefix.ends_with('\\'),
        None => false,
    }
}

fn collect_variants(
    set: &DescriptorSet,
    file: &FileDescriptor,
    wrapper: &MessageDescriptor,
    oneof_index: usize,
) -> ExtractResult<Vec<PayloadVariant>> {
    wrapper
        .fields
        .iter()
        .filter(|f| f.oneof_index.and_then(|i| usize::try_from(i).ok()) == Some(oneof_index))
        .map(|field| {
            if !field.is_message {
                return Err(ExtractError::NonMessageVariant {
                    wrapper: wrapper.name.clone(),
                    field: field.name.clone(),
                });
            }

            let qualified_type_name = strip_leading_dot(&field.type_name).to_string();
            Ok(PayloadVariant {
                type_name: last_segment(&field.type_name).to_string(),
                field_name: field.name.clone(),
                type_package: type_package(set, file, &qualified_type_name),
                type_file: type_file(set, file, &qualified_type_name),
                qualified_type_name,
            })
        })
        .collect()
}

fn header_field(
    set: &DescriptorSet,
    file: &FileDescriptor,
    wrapper: &MessageDescriptor,
    field_name: &str,
) -> HeaderField {
    match wrapper
        .fields
        .iter()
        .find(|f| f.name == field_name && f.is_message)
    {
        Some(field) => {
            let qualified_type_name = strip_leading_dot(&field.type_name).to_string();
            HeaderField {
                field_name: field.name.clone(),
                type_name: last_segment(&field.type_name).to_string(),
                type_package: type_package(set, file, &qualified_type_name),
                type_file: type_file(set, file, &qualified_type_name),
                qualified_type_name,
            }
        }
        None => {
            tracing::warn!(
                "{} has no '{}' message field; assuming a 'Header' message in package '{}'",
                wrapper.name,
                field_name,
                file.package
            );
            HeaderField::conventional(field_name, &file.package, &file.name)
        }
    }
}

/// Package declaring `qualified`, falling back to a guess when the set lacks it.
fn type_package(set: &DescriptorSet, file: &FileDescriptor, qualified: &str) -> String {
    if let Some(package) = set.package_of(qualified) {
        return package.to_string();
    }

    let in_file_package = file.package.is_empty()
        || qualified
            .strip_prefix(file.package.as_str())
            .is_some_and(|rest| rest.starts_with('.'));
    if in_file_package {
        return file.package.clone();
    }

    match qualified.rsplit_once('.') {
        Some((package, _)) => package.to_string(),
        None => String::new(),
    }
}

/// Schema file declaring `qualified`; types missing from the set are taken
/// to live in the selected file.
fn type_file(set: &DescriptorSet, file: &FileDescriptor, qualified: &str) -> String {
    set.file_of(qualified).unwrap_or(file).name.clone()
}

fn strip_leading_dot(name: &str) -> &str {
    name.strip_prefix('.').unwrap_or(name)
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
#[path = "extract/extract_tests.rs"]
mod extract_tests;
