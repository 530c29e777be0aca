use crate::error::{Error, Result};
use crate::host::siyuan::SiYuanSettings;
use crate::labels::Lang;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A recognised configuration key
#[derive(Debug, Clone)]
pub struct ConfigKey {
    pub key: &'static str,
    pub env: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

pub static CONFIG_KEYS: &[ConfigKey] = &[
    ConfigKey {
        key: "backend",
        env: "FRIENDS_BACKEND",
        default: "siyuan",
        description: "Where documents live: siyuan or local",
    },
    ConfigKey {
        key: "siyuan_url",
        env: "FRIENDS_SIYUAN_URL",
        default: "http://127.0.0.1:6806",
        description: "SiYuan kernel address",
    },
    ConfigKey {
        key: "siyuan_token",
        env: "FRIENDS_SIYUAN_TOKEN",
        default: "",
        description: "API token from SiYuan settings > About",
    },
    ConfigKey {
        key: "notebook",
        env: "FRIENDS_NOTEBOOK",
        default: "",
        description: "Notebook id new documents are created in",
    },
    ConfigKey {
        key: "db_path",
        env: "FRIENDS_DB_PATH",
        default: "",
        description: "SQLite file for the local backend",
    },
    ConfigKey {
        key: "friends_path",
        env: "FRIENDS_FRIENDS_PATH",
        default: "/Friends/",
        description: "Document path for friend profiles",
    },
    ConfigKey {
        key: "interactions_path",
        env: "FRIENDS_INTERACTIONS_PATH",
        default: "/Interactions/",
        description: "Document path for interaction logs",
    },
    ConfigKey {
        key: "reminders_path",
        env: "FRIENDS_REMINDERS_PATH",
        default: "/Reminders/",
        description: "Document path for reminders",
    },
    ConfigKey {
        key: "financial_path",
        env: "FRIENDS_FINANCIAL_PATH",
        default: "/Financial/",
        description: "Document path embedded for financial records",
    },
    ConfigKey {
        key: "reminder_interval_secs",
        env: "FRIENDS_REMINDER_INTERVAL",
        default: "86400",
        description: "Seconds between due-reminder checks in watch mode",
    },
    ConfigKey {
        key: "request_timeout_secs",
        env: "FRIENDS_REQUEST_TIMEOUT",
        default: "0",
        description: "HTTP timeout for host calls, 0 disables it",
    },
    ConfigKey {
        key: "lang",
        env: "FRIENDS_LANG",
        default: "zh_CN",
        description: "Language of generated documents: zh_CN or en",
    },
];

pub fn config_key(key: &str) -> Option<&'static ConfigKey> {
    CONFIG_KEYS.iter().find(|k| k.key == key)
}

// -----------------------------------------------------------------------------
// Config file
// -----------------------------------------------------------------------------

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("friendship-recorder")
}

/// Config file location, `FRIENDS_CONFIG` overrides the default
pub fn config_file() -> PathBuf {
    std::env::var("FRIENDS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.yaml"))
}

/// Read a flat key/value config file, missing or unreadable files are empty
pub fn read_config(path: &Path) -> HashMap<String, String> {
    if path.exists() {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(config) => {
                    return config
                        .into_iter()
                        .filter_map(|(k, v)| scalar(v).map(|v| (k, v)))
                        .collect()
                }
                Err(e) => log::warn!("Ignoring malformed config {}: {}", path.display(), e),
            }
        }
    }
    HashMap::new()
}

/// Hand-written files may hold numbers or booleans where strings are expected
fn scalar(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Set one value in the config file
pub fn write_config_value(path: &Path, key: &str, value: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let mut config = read_config(path);
    config.insert(key.to_string(), value.to_string());

    let content =
        serde_yaml::to_string(&config).map_err(|e| Error::Config(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Resolved settings
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    SiYuan,
    Local,
}

/// Document paths for each entity kind, each with leading and trailing `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub friends: String,
    pub interactions: String,
    pub reminders: String,
    pub financial: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            friends: "/Friends/".to_string(),
            interactions: "/Interactions/".to_string(),
            reminders: "/Reminders/".to_string(),
            financial: "/Financial/".to_string(),
        }
    }
}

fn normalize_dir(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: Backend,
    pub siyuan_url: String,
    pub siyuan_token: Option<String>,
    pub notebook: String,
    pub db_path: PathBuf,
    pub layout: Layout,
    pub reminder_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub lang: Lang,
}

impl Settings {
    /// Config file, then environment overrides
    pub fn load() -> Result<Self> {
        let mut values = read_config(&config_file());
        for key in CONFIG_KEYS {
            if let Ok(value) = std::env::var(key.env) {
                values.insert(key.key.to_string(), value);
            }
        }
        Self::from_map(&values)
    }

    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| -> String {
            values
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| config_key(key).map(|k| k.default.to_string()))
                .unwrap_or_default()
        };

        let backend = match get("backend").as_str() {
            "siyuan" => Backend::SiYuan,
            "local" => Backend::Local,
            other => return Err(Error::Config(format!("unknown backend: {}", other))),
        };

        let db_path = match get("db_path").as_str() {
            "" => config_dir().join("friends.db"),
            path => PathBuf::from(path),
        };

        let interval_secs: u64 = parse_number(&get("reminder_interval_secs"), "reminder_interval_secs")?;
        if interval_secs == 0 {
            return Err(Error::Config(
                "reminder_interval_secs must be greater than zero".to_string(),
            ));
        }
        let timeout_secs: u64 = parse_number(&get("request_timeout_secs"), "request_timeout_secs")?;

        let token = get("siyuan_token");

        Ok(Self {
            backend,
            siyuan_url: get("siyuan_url"),
            siyuan_token: if token.is_empty() { None } else { Some(token) },
            notebook: get("notebook"),
            db_path,
            layout: Layout {
                friends: normalize_dir(&get("friends_path")),
                interactions: normalize_dir(&get("interactions_path")),
                reminders: normalize_dir(&get("reminders_path")),
                financial: normalize_dir(&get("financial_path")),
            },
            reminder_interval: Duration::from_secs(interval_secs),
            request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            lang: get("lang").parse().map_err(Error::Config)?,
        })
    }

    pub fn siyuan(&self) -> SiYuanSettings {
        SiYuanSettings {
            base_url: self.siyuan_url.clone(),
            token: self.siyuan_token.clone(),
            notebook: self.notebook.clone(),
            timeout: self.request_timeout,
        }
    }
}

fn parse_number(value: &str, key: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a whole number, got {:?}", key, value)))
}
