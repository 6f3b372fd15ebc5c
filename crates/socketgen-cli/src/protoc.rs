//! protoc invocation
//!
//! Two uses: compiling the schema into a `FileDescriptorSet` the extractor can
//! read, and (optionally) producing the protobuf bindings each generated
//! dispatcher builds on.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Environment variable overriding the protoc executable.
pub const PROTOC_ENV_VAR: &str = "PROTOC";

/// protoc executable: `$PROTOC` if set, else `protoc` from `PATH`.
pub fn protoc_binary() -> PathBuf {
    std::env::var_os(PROTOC_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("protoc"))
}

/// `-I` arguments: the schema's own directory first, then the extra paths.
fn include_args(proto: &Path, include_paths: &[PathBuf]) -> Vec<String> {
    let parent = match proto.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    std::iter::once(parent)
        .chain(include_paths.iter().map(PathBuf::as_path))
        .map(|dir| format!("-I{}", dir.display()))
        .collect()
}

fn run(args: &[String]) -> Result<Output> {
    let protoc = protoc_binary();
    tracing::debug!("Running {} {}", protoc.display(), args.join(" "));

    match Command::new(&protoc).args(args).output() {
        Ok(output) => Ok(output),
        Err(err) if err.kind() == ErrorKind::NotFound => anyhow::bail!(
            "protoc is not installed or not in PATH (looked for {:?}; set {} to override)",
            protoc,
            PROTOC_ENV_VAR
        ),
        Err(err) => Err(err).with_context(|| format!("Failed to execute {:?}", protoc)),
    }
}

/// Compile `proto` with `--include_imports` and return the encoded descriptor set.
pub fn compile_descriptor_set(proto: &Path, include_paths: &[PathBuf]) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir().context("Failed to create temporary directory")?;
    let out = dir.path().join("descriptor.pb");

    let mut args = vec![
        format!("--descriptor_set_out={}", out.display()),
        "--include_imports".to_string(),
    ];
    args.extend(include_args(proto, include_paths));
    args.push(proto.display().to_string());

    let output = run(&args)?;
    if !output.status.success() {
        anyhow::bail!(
            "protoc failed to compile {}: {}",
            proto.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    std::fs::read(&out).with_context(|| format!("Failed to read descriptor set: {:?}", out))
}

/// protoc flags producing the bindings for `language`, or `None` when protoc
/// has no output for it.
pub fn bindings_args(language: &str, out_dir: &Path) -> Option<Vec<String>> {
    let out = out_dir.display();
    let args = match language {
        "go" => vec![
            format!("--go_out={out}"),
            "--go_opt=paths=source_relative".to_string(),
        ],
        "ts" => vec![format!("--ts_proto_out={out}")],
        "python" => vec![format!("--python_out={out}")],
        "csharp" => vec![format!("--csharp_out={out}")],
        "dart" => vec![format!("--dart_out={out}")],
        "php" => vec![format!("--php_out={out}")],
        "ruby" => vec![format!("--ruby_out={out}")],
        "kotlin" => vec![format!("--java_out={out}"), format!("--kotlin_out={out}")],
        "java" => vec![format!("--java_out={out}")],
        _ => return None,
    };
    Some(args)
}

/// Run protoc to produce the bindings for `language` into `out_dir`.
pub fn generate_bindings(
    language: &str,
    proto: &Path,
    include_paths: &[PathBuf],
    out_dir: &Path,
) -> Result<()> {
    let Some(mut args) = bindings_args(language, out_dir) else {
        anyhow::bail!("protoc has no output for '{}'", language);
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    args.extend(include_args(proto, include_paths));
    args.push(proto.display().to_string());

    let output = run(&args)?;
    if !output.status.success() {
        anyhow::bail!(
            "protoc failed for {}: {}",
            language,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}
