//! Build script for mindlift-daemon
//!
//! Validates the embedded mindlift.toml at compile time so a broken default
//! configuration never ships.

use std::fs;
use std::path::Path;

use mindlift_core::config::ControlConfig;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    validate_config();
}

/// Validate mindlift.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=mindlift.toml");

    let config_path = Path::new("mindlift.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: mindlift.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The daemon embeds mindlift.toml as its default configuration.   ║\n\
            ║  Please create one in the mindlift-daemon directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read mindlift.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail("Invalid TOML syntax in mindlift.toml", &[e.to_string()]),
    };

    validate_required_sections(&config);
    validate_link(&config);
    validate_control(&config);

    println!("cargo:warning=mindlift.toml validated successfully");
}

/// Print a boxed error and abort the build
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .flat_map(|e| e.lines())
            .map(|line| {
                let truncated = if line.chars().count() > 62 {
                    format!("{}...", line.chars().take(59).collect::<String>())
                } else {
                    line.to_string()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let mut errors = Vec::new();

    for section in ["link", "control"] {
        match config.get(section) {
            Some(toml::Value::Table(_)) => {}
            Some(_) => errors.push(format!("[{}] must be a table", section)),
            None => errors.push(format!("Missing [{}] section", section)),
        }
    }

    if !errors.is_empty() {
        fail("Missing required sections in mindlift.toml", &errors);
    }
}

/// Validate robot and headset addresses
fn validate_link(config: &toml::Value) {
    let Some(link) = config.get("link").and_then(|l| l.as_table()) else {
        return;
    };

    let mut errors = Vec::new();

    for key in ["robot_host", "headset_addr"] {
        match link.get(key) {
            Some(toml::Value::String(s)) if !s.trim().is_empty() => {}
            Some(_) => errors.push(format!("[link] '{}' must be a non-empty string", key)),
            None => {}
        }
    }

    if let Some(toml::Value::String(addr)) = link.get("headset_addr") {
        if addr.rsplit_once(':').is_none() {
            errors.push("[link] headset_addr must be host:port".to_string());
        }
    }

    for key in ["secondary_port", "modbus_port"] {
        if let Some(value) = link.get(key) {
            match value.as_integer() {
                Some(port) if (1..=65535).contains(&port) => {}
                _ => errors.push(format!("[link] '{}' must be 1-65535", key)),
            }
        }
    }

    if let Some(value) = link.get("modbus_unit_id") {
        match value.as_integer() {
            Some(id) if (0..=255).contains(&id) => {}
            _ => errors.push("[link] 'modbus_unit_id' must be 0-255".to_string()),
        }
    }

    if let Some(value) = link.get("socket_timeout_ms") {
        match value.as_integer() {
            Some(ms) if ms > 0 => {}
            _ => errors.push("[link] 'socket_timeout_ms' must be positive".to_string()),
        }
    }

    if !errors.is_empty() {
        fail("Invalid [link] configuration", &errors);
    }
}

/// Deserialize and validate the control section with the runtime rules
fn validate_control(config: &toml::Value) {
    let Some(control) = config.get("control") else {
        return;
    };

    let control: ControlConfig = match control.clone().try_into() {
        Ok(control) => control,
        Err(e) => fail("Invalid [control] configuration", &[e.to_string()]),
    };

    if let Err(e) = control.validate() {
        fail("Invalid [control] configuration", &[e.to_string()]);
    }
}
