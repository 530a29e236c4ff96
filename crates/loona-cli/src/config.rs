use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use loona_core::crypto::hasher::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM};
use loona_core::HasherParams;

pub const DEFAULT_UNLOCK_TTL_SECONDS: u64 = 900;
const MIN_HASH_MEMORY_KIB: u32 = 8;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoonaConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub remember_unlock: bool,
    pub unlock_ttl_seconds: u64,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            remember_unlock: false,
            unlock_ttl_seconds: DEFAULT_UNLOCK_TTL_SECONDS,
            hash_memory_kib: DEFAULT_MEMORY_KIB,
            hash_iterations: DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl LoonaConfig {
    pub fn new(
        store_path: PathBuf,
        remember_unlock: bool,
        unlock_ttl_seconds: u64,
        timezone: Option<String>,
    ) -> Self {
        Self {
            store: StoreSection {
                path: Some(store_path.to_string_lossy().to_string()),
            },
            security: SecuritySection {
                remember_unlock,
                unlock_ttl_seconds,
                ..SecuritySection::default()
            },
            ui: UiSection {
                timezone,
                editor: None,
            },
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.security.hash_memory_kib < MIN_HASH_MEMORY_KIB {
            return Err(anyhow::anyhow!(
                "security.hash_memory_kib must be at least {}",
                MIN_HASH_MEMORY_KIB
            ));
        }
        if self.security.hash_iterations < 1 {
            return Err(anyhow::anyhow!("security.hash_iterations must be at least 1"));
        }
        if let Some(timezone) = self.ui.timezone.as_deref() {
            parse_timezone(timezone)?;
        }
        Ok(())
    }

    pub fn hasher_params(&self) -> HasherParams {
        HasherParams::new(
            self.security.hash_memory_kib,
            self.security.hash_iterations,
            DEFAULT_PARALLELISM,
        )
    }
}

pub fn parse_timezone(value: &str) -> anyhow::Result<chrono_tz::Tz> {
    value
        .parse::<chrono_tz::Tz>()
        .map_err(|_| anyhow::anyhow!("Unknown timezone: {}", value))
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("loona.db"))
}

/// Identity session written by `loona login`.
pub fn session_file_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("session.json"))
}

/// Session-scope unlock cache; the runtime dir is cleared at logout/reboot.
pub fn session_cache_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_runtime_dir()?.join("unlock-cache.json"))
}

/// Persistent unlock cache, only written when `remember_unlock` is on.
pub fn persistent_cache_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("unlock-cache.json"))
}

/// Read the config file, or defaults if it does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<LoonaConfig> {
    if !path.exists() {
        return Ok(LoonaConfig::default());
    }
    let config = read_config(path)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn read_config(path: &Path) -> anyhow::Result<LoonaConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &LoonaConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Some(value) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(value).join("loona"));
    }
    Ok(home_dir()?.join(".config").join("loona"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Some(value) = non_empty_env("XDG_DATA_HOME") {
        return Ok(PathBuf::from(value).join("loona"));
    }
    Ok(home_dir()?.join(".local").join("share").join("loona"))
}

pub fn xdg_runtime_dir() -> anyhow::Result<PathBuf> {
    if let Some(value) = non_empty_env("XDG_RUNTIME_DIR") {
        return Ok(PathBuf::from(value).join("loona"));
    }
    let user = non_empty_env("USER").unwrap_or_else(|| "default".to_string());
    Ok(std::env::temp_dir().join(format!("loona-{}", user)))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: LoonaConfig = toml::from_str("[store]\npath = \"/tmp/x.db\"\n").unwrap();
        assert_eq!(config.store.path.as_deref(), Some("/tmp/x.db"));
        assert!(!config.security.remember_unlock);
        assert_eq!(config.security.unlock_ttl_seconds, DEFAULT_UNLOCK_TTL_SECONDS);
        assert_eq!(config.security.hash_memory_kib, DEFAULT_MEMORY_KIB);
        assert!(config.ui.timezone.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_weak_hash_params() {
        let config: LoonaConfig = toml::from_str("[security]\nhash_memory_kib = 4\n").unwrap();
        assert!(config.validate().is_err());

        let config: LoonaConfig = toml::from_str("[security]\nhash_iterations = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let config: LoonaConfig = toml::from_str("[ui]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert!(config.validate().is_err());

        let config: LoonaConfig = toml::from_str("[ui]\ntimezone = \"Europe/Paris\"\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = LoonaConfig::new(dir.path().join("loona.db"), true, 60, None);

        write_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();

        assert!(loaded.security.remember_unlock);
        assert_eq!(loaded.security.unlock_ttl_seconds, 60);
        assert_eq!(
            loaded.store.path.as_deref(),
            Some(dir.path().join("loona.db").to_string_lossy().as_ref())
        );
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(config.store.path.is_none());
        assert!(!config.security.remember_unlock);
    }
}
