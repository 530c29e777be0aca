use crate::config::{config_file, config_key, read_config, write_config_value, Settings, CONFIG_KEYS};
use crate::error::{Error, Result};

/// Run the config command
pub fn run_config(key: Option<&str>, value: Option<&str>, list_keys: bool) -> Result<()> {
    if list_keys {
        print_keys();
        return Ok(());
    }

    let path = config_file();
    let values = read_config(&path);

    match (key, value) {
        (None, None) => {
            println!("Current configuration ({}):\n", path.display());
            for k in CONFIG_KEYS {
                let (shown, source) = effective(k.key, &values);
                println!("  {:24} {}{}", k.key, shown, source);
            }
        }
        (Some(k), None) => {
            let known = config_key(k).ok_or_else(|| unknown_key(k))?;
            let (shown, source) = effective(known.key, &values);
            println!("{}: {}{}", known.key, shown, source);
        }
        (Some(k), Some(v)) => {
            let known = config_key(k).ok_or_else(|| unknown_key(k))?;

            // Refuse values the settings loader would reject later
            let mut candidate = values.clone();
            candidate.insert(known.key.to_string(), v.to_string());
            Settings::from_map(&candidate)?;

            write_config_value(&path, known.key, v)?;
            println!("Set {} = {}", known.key, display_value(known.key, v));
        }
        (None, Some(_)) => {
            return Err(Error::InvalidInput(
                "Key required when setting a value".to_string(),
            ));
        }
    }

    Ok(())
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "unknown key {:?}. Run 'friends config --list' to see the keys",
        key
    ))
}

/// Value in effect and where it comes from
fn effective(key: &str, values: &std::collections::HashMap<String, String>) -> (String, &'static str) {
    let Some(k) = config_key(key) else {
        return (String::new(), "");
    };

    if let Ok(v) = std::env::var(k.env) {
        return (display_value(key, &v), "  (env)");
    }
    match values.get(key) {
        Some(v) => (display_value(key, v), ""),
        None if k.default.is_empty() => ("(not set)".to_string(), ""),
        None => (k.default.to_string(), "  (default)"),
    }
}

fn display_value(key: &str, value: &str) -> String {
    if key == "siyuan_token" && !value.is_empty() {
        let visible: String = value.chars().take(4).collect();
        format!("{}****", visible)
    } else {
        value.to_string()
    }
}

fn print_keys() {
    println!("Configuration keys:\n");
    println!("{:24} {:28} {}", "Key", "Environment", "Description");
    println!("{}", "-".repeat(90));

    for k in CONFIG_KEYS {
        println!("{:24} {:28} {}", k.key, k.env, k.description);
        if !k.default.is_empty() {
            println!("{:24} {:28} default: {}", "", "", k.default);
        }
    }

    println!("\nConfig file: {}", config_file().display());
    println!("Set a key with: friends config <key> <value>");
}
