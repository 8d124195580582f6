use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: u64,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 編集が止まってから保存を発火するまでの待ち時間（ミリ秒）。
    pub debounce_ms: u64,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                request_timeout: 30,
                auth_token: None,
            },
            sync: SyncConfig {
                debounce_ms: 1000,
                page_size: 50,
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
            },
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("shukatsu"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .into_owned()
}

impl AppConfig {
    /// 既定値 → 設定ファイル → 環境変数 の順に上書きして読み込む。
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("SHUKATSU_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("SHUKATSU_API_TOKEN") {
            if !v.trim().is_empty() {
                self.api.auth_token = Some(v.trim().to_string());
            }
        }
        if let Ok(v) = std::env::var("SHUKATSU_REQUEST_TIMEOUT") {
            if let Some(value) = parse_u64(&v) {
                self.api.request_timeout = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("SHUKATSU_DEBOUNCE_MS") {
            if let Some(value) = parse_u64(&v) {
                self.sync.debounce_ms = value;
            }
        }
        if let Ok(v) = std::env::var("SHUKATSU_PAGE_SIZE") {
            if let Some(value) = parse_u64(&v) {
                self.sync.page_size = value.clamp(1, 500) as u32;
            }
        }
        if let Ok(v) = std::env::var("SHUKATSU_DATA_DIR") {
            if !v.trim().is_empty() {
                self.storage.data_dir = v.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api.base_url.trim().is_empty() {
            return Err("API base_url must not be empty".to_string());
        }
        if self.api.request_timeout == 0 {
            return Err("API request_timeout must be greater than 0".to_string());
        }
        if self.sync.page_size == 0 {
            return Err("Sync page_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        write!(
            file,
            r#"{{
                "api": {{ "base_url": "https://api.example.com", "request_timeout": 10 }},
                "sync": {{ "debounce_ms": 250, "page_size": 20 }},
                "storage": {{ "data_dir": "/tmp/shukatsu-test" }}
            }}"#
        )
        .expect("write config");

        let cfg = AppConfig::from_file(file.path()).expect("parse config");
        assert_eq!(cfg.api.base_url, "https://api.example.com");
        assert_eq!(cfg.sync.debounce_ms, 250);
        assert_eq!(cfg.sync.page_size, 20);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.sync.page_size = 0;
        assert!(cfg.validate().is_err());
    }
}
