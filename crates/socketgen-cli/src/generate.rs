//! Gen command implementation
//!
//! Obtains the descriptor set, extracts the model, runs the requested emitters
//! and writes each language's sources under `<out_dir>/<lang>/`.

use crate::config::{Config, Overrides};
use crate::{inspect, protoc};
use anyhow::{Context, Result};
use socketgen_core::descriptor::DescriptorSet;
use socketgen_core::{DescriptorModel, EmitterRegistry, ExtractError, GenerateError, GenerationReport, extract};
use std::fs;
use std::path::{Path, PathBuf};

/// Run the gen command
pub fn run(config_path: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = Config::discover(config_path.as_deref(), &cwd)?;
    config.apply(overrides);
    config.validate_for_generation()?;

    execute(&config)
}

/// Generate for an already resolved config.
///
/// Successful languages are written even when others fail; the error is
/// returned afterwards so the process exits non-zero.
pub fn execute(config: &Config) -> Result<()> {
    let registry = EmitterRegistry::new().with_options(config.emit_options());

    println!("Generating code for languages: {}", config.languages.join(", "));
    println!("Output directory: {}", config.out_dir.display());

    if config.protoc {
        run_protoc_bindings(config, &registry);
    }

    let model = load_model(config)?;
    print!("{}", inspect::describe_model(&model));

    let report = registry.generate(&model, &config.languages);
    let written = write_report(&report, &config.out_dir)?;
    tracing::info!("Wrote {} files", written.len());

    print_report(&report);

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{} of {} requested languages failed", failed, report.len());
    }

    Ok(())
}

// ============================================================================
// Descriptor Loading
// ============================================================================

/// Read or compile the descriptor set and extract the model.
pub fn load_model(config: &Config) -> Result<DescriptorModel> {
    let bytes = match &config.descriptor_set {
        Some(path) => fs::read(path)
            .map_err(|err| ExtractError::DescriptorUnavailable(format!("{}: {err}", path.display())))?,
        None => protoc::compile_descriptor_set(&config.proto, &config.include_paths)
            .map_err(|err| ExtractError::DescriptorUnavailable(format!("{err:#}")))?,
    };

    let set = DescriptorSet::decode(&bytes)?;
    let model = extract(&set, &config.extract_options())?;
    Ok(model)
}

// ============================================================================
// protoc Bindings
// ============================================================================

fn run_protoc_bindings(config: &Config, registry: &EmitterRegistry) {
    for language in &config.languages {
        if !registry.supports(language) {
            continue;
        }

        println!("Running protoc for {language}...");
        let out_dir = config.out_dir.join(language);
        match protoc::generate_bindings(language, &config.proto, &config.include_paths, &out_dir) {
            Ok(()) => println!("Generated protobuf bindings for {language}."),
            Err(err) => {
                println!("Warning: Failed to run protoc for {language}: {err:#}");
                println!("Make sure you have 'protoc' and the {language} plugin installed.");
            }
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Write every successful language's units under `out_dir/<lang>/`.
///
/// Returns the written paths in report order.
pub fn write_report(report: &GenerationReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (language, units) in report.successes() {
        let lang_dir = out_dir.join(language);
        for unit in units {
            let path = lang_dir.join(&unit.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
            fs::write(&path, &unit.contents)
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::debug!("Wrote {:?}", path);
            written.push(path);
        }
    }

    Ok(written)
}

/// Human-readable name for a language tag.
pub fn display_name(language: &str) -> &str {
    match language {
        "go" => "Go",
        "ts" => "TypeScript",
        "python" => "Python",
        "csharp" => "C#",
        "dart" => "Dart",
        "php" => "PHP",
        "ruby" => "Ruby",
        "kotlin" => "Kotlin",
        "java" => "Java",
        other => other,
    }
}

/// One status line per requested language, in request order.
pub fn report_lines(report: &GenerationReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(units) => format!(
                "Successfully generated {} code ({} files).",
                display_name(&outcome.language),
                units.len()
            ),
            Err(GenerateError::UnsupportedLanguage(language)) => {
                format!("Warning: Language '{language}' is not supported.")
            }
            Err(err) => format!(
                "Error generating {} code: {}",
                display_name(&outcome.language),
                err
            ),
        })
        .collect()
}

fn print_report(report: &GenerationReport) {
    for line in report_lines(report) {
        println!("{line}");
    }
}

#[cfg(test)]
#[path = "generate/generate_tests.rs"]
mod generate_tests;
