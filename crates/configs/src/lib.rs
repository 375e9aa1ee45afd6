use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub records: RecordsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Which document store backs the record collection.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    File,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            "file" | "json" => Ok(Self::File),
            other => Err(anyhow!("unknown store backend `{other}` (expected mongodb or file)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    /// Database name; when empty the name embedded in `url` is used.
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: String::new(),
            name: String::new(),
            collection: default_collection(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: default_min_pool_size(),
            connect_timeout_secs: default_connect_timeout(),
            file_path: default_file_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RecordsConfig {
    /// Reject creates that omit scannerManufacturer, scannerModel or month.
    #[serde(default)]
    pub strict_create: bool,
}

fn default_collection() -> String { "patient_data".into() }
fn default_max_pool_size() -> u32 { 10 }
fn default_min_pool_size() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_file_path() -> String { "data/records.json".into() }

/// Read a TOML config file; a missing file is `Ok(None)`. Any other read
/// failure and every parse error is returned.
pub fn load_optional(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content)
            .map(Some)
            .map_err(|e| anyhow!("invalid config file {path}: {e}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow!("cannot read config file {path}: {e}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

fn env_bool(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to a pure environment
    /// configuration when the file is absent, then validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_and_validate_from(&path)
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = load_optional(path)?.unwrap_or_else(Self::from_env);
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build a configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Ok(name) = std::env::var("DATABASE_NAME") {
            cfg.database.name = name;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        if let Some(strict) = env_bool("RECORDS_STRICT_CREATE") {
            self.records.strict_create = strict;
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Fill unset values from `STORE_BACKEND`, `DATABASE_URL` and `STORE_FILE`.
    pub fn normalize_from_env(&mut self) {
        if let Some(backend) = std::env::var("STORE_BACKEND").ok().and_then(|b| b.parse().ok()) {
            self.backend = backend;
        }
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
        if let Ok(path) = std::env::var("STORE_FILE") {
            self.file_path = path;
        }
        if self.collection.trim().is_empty() {
            self.collection = default_collection();
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend {
            StoreBackend::File => {
                if self.file_path.trim().is_empty() {
                    return Err(anyhow!("database.file_path is empty; required for the file backend"));
                }
            }
            StoreBackend::Mongodb => {
                if self.url.trim().is_empty() {
                    return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
                }
                let lower = self.url.to_lowercase();
                if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
                    return Err(anyhow!("database.url must start with mongodb:// or mongodb+srv://"));
                }
                if self.max_pool_size < self.min_pool_size {
                    return Err(anyhow!("database.max_pool_size must be >= min_pool_size"));
                }
                if self.connect_timeout_secs == 0 {
                    return Err(anyhow!("database.connect_timeout_secs must be a positive number of seconds"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            backend = "mongodb"
            url = "mongodb://localhost:27017/wazen"
            collection = "doses"
            max_pool_size = 5

            [records]
            strict_create = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.backend, StoreBackend::Mongodb);
        assert_eq!(cfg.database.collection, "doses");
        assert_eq!(cfg.database.max_pool_size, 5);
        assert_eq!(cfg.database.min_pool_size, 1);
        assert!(cfg.records.strict_create);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.database.collection, "patient_data");
        assert_eq!(cfg.database.file_path, "data/records.json");
        assert!(!cfg.records.strict_create);
    }

    #[test]
    fn rejects_non_mongo_url() {
        let db = DatabaseConfig { url: "postgres://localhost/x".into(), ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let db = DatabaseConfig {
            url: "mongodb://localhost:27017".into(),
            max_pool_size: 1,
            min_pool_size: 4,
            ..Default::default()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn file_backend_ignores_url() {
        let db = DatabaseConfig { backend: StoreBackend::File, ..Default::default() };
        assert!(db.validate().is_ok());
        let empty = DatabaseConfig { backend: StoreBackend::File, file_path: " ".into(), ..Default::default() };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn zero_port_is_invalid() {
        let mut s = ServerConfig { port: 0, ..Default::default() };
        assert!(s.normalize().is_err());
    }

    #[test]
    fn backend_from_str() {
        assert_eq!("Mongo".parse::<StoreBackend>().unwrap(), StoreBackend::Mongodb);
        assert_eq!("file".parse::<StoreBackend>().unwrap(), StoreBackend::File);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    fn scratch_file(name: &str, content: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!("dose_cfg_{}_{nanos}_{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let path = scratch_file(
            "bad.toml",
            r#"
            [database]
            backend = "file"

            [records]
            strict_create = "yes"
            "#,
        );
        let path_str = path.to_str().unwrap();
        assert!(load_optional(path_str).is_err());
        let err = AppConfig::load_and_validate_from(path_str).unwrap_err();
        assert!(err.to_string().contains("invalid config file"), "{err}");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_means_env_only() {
        let path = std::env::temp_dir().join("dose_cfg_does_not_exist.toml");
        assert!(load_optional(path.to_str().unwrap()).unwrap().is_none());
    }

    #[test]
    fn valid_file_is_loaded() {
        let path = scratch_file(
            "good.toml",
            r#"
            [database]
            backend = "file"
            file_path = "data/test.json"

            [records]
            strict_create = true
            "#,
        );
        let cfg = load_optional(path.to_str().unwrap()).unwrap().unwrap();
        assert_eq!(cfg.database.backend, StoreBackend::File);
        assert!(cfg.records.strict_create);
        let _ = std::fs::remove_file(path);
    }
}
