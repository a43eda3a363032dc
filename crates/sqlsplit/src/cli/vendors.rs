//! `sqlsplit vendors` command implementation.

use colored::Colorize;
use sqlsplit::{BlockEnd, Config, CustomVendor, VendorClassifier, VendorRegistry};

/// Run the vendors command.
///
/// Custom vendors from the configuration also list their procedural-start
/// patterns.
pub fn run(config: &Config, registry: &VendorRegistry) -> anyhow::Result<()> {
    println!("{}", "Registered vendors".cyan().bold());
    println!();

    for (name, vendor) in registry.vendors() {
        let block_end = match vendor.block_end() {
            BlockEnd::Line(token) => format!("'{token}' line"),
            BlockEnd::ActiveDelimiter => "active delimiter".to_string(),
        };
        let port = vendor
            .default_port()
            .map(|p| format!(", port {p}"))
            .unwrap_or_default();
        let mut extras = Vec::new();
        if vendor.supports_delimiter_directive() {
            extras.push("DELIMITER");
        }
        if vendor.supports_dollar_quoting() {
            extras.push("$$ quoting");
        }
        if vendor.supports_backslash_escapes() {
            extras.push("backslash escapes");
        }
        let extras = if extras.is_empty() {
            String::new()
        } else {
            format!(", {}", extras.join(", "))
        };

        println!(
            "  {} {}: delimiter '{}', blocks end at {}{}{}",
            "•".dimmed(),
            name.white().bold(),
            vendor.default_delimiter(),
            block_end,
            extras,
            port.dimmed()
        );
    }

    for entry in &config.vendors {
        let custom = CustomVendor::from_config(entry)?;
        if custom.patterns().is_empty() {
            continue;
        }
        println!();
        println!("{} {}", "Procedural starts for".cyan(), custom.name().white().bold());
        for pattern in custom.patterns() {
            println!("  {} {}", "•".dimmed(), pattern.as_str());
        }
    }

    Ok(())
}
