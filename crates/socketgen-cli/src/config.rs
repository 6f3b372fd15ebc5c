//! socketgen.toml parsing and validation
//!
//! Every key is optional. Command-line flags are applied on top with
//! [`Config::apply`].
//!
//! ```toml
//! proto = "proto/packet.proto"
//! out_dir = "./gen"
//! languages = ["go", "ts"]
//! protoc = true
//! include_paths = ["third_party"]
//!
//! [schema]
//! wrapper_message = "GamePacket"
//! oneof_field = "payload"
//! header_field = "header"
//!
//! [output]
//! serve_loop = true
//! send_helpers = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use socketgen_core::extract::{DEFAULT_HEADER_FIELD, DEFAULT_ONEOF_FIELD, DEFAULT_WRAPPER_MESSAGE};
use socketgen_core::naming::is_identifier;
use socketgen_core::{EmitOptions, ExtractOptions};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "socketgen.toml";

/// socketgen.toml structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema file to compile
    #[serde(default = "default_proto")]
    pub proto: PathBuf,

    /// Root of the generated tree; each language gets a subdirectory
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Languages generated when `--lang` is not given
    #[serde(default)]
    pub languages: Vec<String>,

    /// Also run protoc to produce the protobuf bindings for each language
    #[serde(default)]
    pub protoc: bool,

    /// Extra `-I` paths for protoc
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Pre-compiled `FileDescriptorSet`; skips compiling `proto`
    #[serde(default)]
    pub descriptor_set: Option<PathBuf>,

    #[serde(default)]
    pub schema: SchemaSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Names looked up in the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSection {
    #[serde(default = "default_wrapper_message")]
    pub wrapper_message: String,

    #[serde(default = "default_oneof_field")]
    pub oneof_field: String,

    #[serde(default = "default_header_field")]
    pub header_field: String,
}

/// Optional parts of the generated code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_true")]
    pub serve_loop: bool,

    #[serde(default = "default_true")]
    pub send_helpers: bool,
}

fn default_proto() -> PathBuf {
    PathBuf::from("packet.proto")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("./gen")
}

fn default_wrapper_message() -> String {
    DEFAULT_WRAPPER_MESSAGE.to_string()
}

fn default_oneof_field() -> String {
    DEFAULT_ONEOF_FIELD.to_string()
}

fn default_header_field() -> String {
    DEFAULT_HEADER_FIELD.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proto: default_proto(),
            out_dir: default_out_dir(),
            languages: Vec::new(),
            protoc: false,
            include_paths: Vec::new(),
            descriptor_set: None,
            schema: SchemaSection::default(),
            output: OutputSection::default(),
        }
    }
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            wrapper_message: default_wrapper_message(),
            oneof_field: default_oneof_field(),
            header_field: default_header_field(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            serve_loop: true,
            send_helpers: true,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub proto: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub languages: Vec<String>,
    pub protoc: bool,
    pub descriptor_set: Option<PathBuf>,
    pub no_serve: bool,
    pub no_send: bool,
}

impl Config {
    /// Load config from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config: {:?}", path.as_ref()))?;

        Self::from_str(&content)
            .with_context(|| format!("Invalid config: {:?}", path.as_ref()))
    }

    /// Parse config from string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Load `explicit` if given, else `socketgen.toml` in `dir` if present,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::info!("Using config {:?}", candidate);
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line values on top of the file values
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(proto) = overrides.proto {
            self.proto = proto;
        }
        if let Some(out_dir) = overrides.out_dir {
            self.out_dir = out_dir;
        }
        if !overrides.languages.is_empty() {
            self.languages = overrides.languages;
        }
        if overrides.protoc {
            self.protoc = true;
        }
        if let Some(descriptor_set) = overrides.descriptor_set {
            self.descriptor_set = Some(descriptor_set);
        }
        if overrides.no_serve {
            self.output.serve_loop = false;
        }
        if overrides.no_send {
            self.output.send_helpers = false;
        }
    }

    /// Validate schema names
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("schema.wrapper_message", &self.schema.wrapper_message),
            ("schema.oneof_field", &self.schema.oneof_field),
            ("schema.header_field", &self.schema.header_field),
        ];
        for (key, value) in names {
            if value.is_empty() {
                anyhow::bail!("{} cannot be empty", key);
            }
            if !is_identifier(value) {
                anyhow::bail!("{} must be a plain identifier, got '{}'", key, value);
            }
        }

        if self.proto.as_os_str().is_empty() && self.descriptor_set.is_none() {
            anyhow::bail!("proto cannot be empty");
        }

        Ok(())
    }

    /// Validate for a generation run, which also needs languages
    pub fn validate_for_generation(&self) -> Result<()> {
        self.validate()?;

        if self.languages.is_empty() {
            anyhow::bail!(
                "No languages requested; pass --lang or set `languages` in {}",
                DEFAULT_CONFIG_FILE
            );
        }

        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::default()
            .with_wrapper_message(&self.schema.wrapper_message)
            .with_oneof_field(&self.schema.oneof_field)
            .with_header_field(&self.schema.header_field)
            .with_source_file(self.proto.to_string_lossy())
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            serve_loop: self.output.serve_loop,
            send_helpers: self.output.send_helpers,
        }
    }
}
