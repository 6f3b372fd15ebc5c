//! Inspect command implementation

use crate::config::{Config, Overrides};
use crate::generate::load_model;
use anyhow::{Context, Result};
use socketgen_core::DescriptorModel;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Run the inspect command
pub fn run(config_path: Option<PathBuf>, overrides: Overrides, json: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = Config::discover(config_path.as_deref(), &cwd)?;
    config.apply(overrides);
    config.validate()?;

    let model = load_model(&config)?;
    if json {
        let rendered = serde_json::to_string_pretty(&model).context("Failed to serialize model")?;
        println!("{rendered}");
    } else {
        print!("{}", describe_model(&model));
    }

    Ok(())
}

/// Package and payload summary shared by `gen` and `inspect`.
pub fn describe_model(model: &DescriptorModel) -> String {
    let mut out = String::new();

    let package = if model.package_name.is_empty() {
        "(none)"
    } else {
        model.package_name.as_str()
    };
    let _ = writeln!(out, "Found package: {package}");
    let _ = writeln!(
        out,
        "Wrapper: {} (oneof: {}, header: {} {})",
        model.wrapper_name, model.oneof_name, model.header.type_name, model.header.field_name
    );
    let _ = writeln!(out, "Detected payloads:");
    for variant in &model.variants {
        let _ = writeln!(
            out,
            " - {} (Field: {}, Type: {})",
            variant.type_name, variant.field_name, variant.qualified_type_name
        );
    }

    out
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use socketgen_core::{HeaderField, PayloadVariant};

    fn model(package: &str) -> DescriptorModel {
        DescriptorModel {
            package_name: package.to_string(),
            source_file: "packet.proto".to_string(),
            wrapper_name: "GamePacket".to_string(),
            oneof_name: "payload".to_string(),
            header: HeaderField::conventional("header", package, "packet.proto"),
            declared_messages: vec!["Header".to_string(), "LoginReq".to_string()],
            variants: vec![PayloadVariant {
                type_name: "LoginReq".to_string(),
                field_name: "login_req".to_string(),
                qualified_type_name: "packet.LoginReq".to_string(),
                type_package: "packet".to_string(),
                type_file: "packet.proto".to_string(),
            }],
        }
    }

    #[test]
    fn describe_model___lists_package_and_payloads() {
        let text = describe_model(&model("packet"));

        assert_eq!(
            text,
            "Found package: packet\n\
             Wrapper: GamePacket (oneof: payload, header: Header header)\n\
             Detected payloads:\n \
             - LoginReq (Field: login_req, Type: packet.LoginReq)\n"
        );
    }

    #[test]
    fn describe_model___empty_package___placeholder() {
        let text = describe_model(&model(""));

        assert!(text.starts_with("Found package: (none)\n"));
    }
}
