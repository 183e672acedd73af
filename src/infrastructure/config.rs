use crate::domain::{
    config::MemctlConfig,
    error::{MemctlError, MemctlResult},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = ".memctl";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager using the standard locations
    pub fn new() -> Self {
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Self {
            global_config_path: Self::default_global_config_path(),
            project_config_path,
        }
    }

    /// Create a manager with explicit locations
    pub fn with_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> Self {
        Self {
            global_config_path: global,
            project_config_path: project,
        }
    }

    /// Load configuration: defaults, then global file, then project file
    pub fn load_config(&self) -> MemctlResult<MemctlConfig> {
        let mut config = MemctlConfig::default();

        if let Some(global_path) = &self.global_config_path {
            if global_path.exists() {
                debug!("Loading global config from {}", global_path.display());
                config = config.merge(self.load_config_from_path(global_path)?);
            }
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                debug!("Loading project config from {}", project_path.display());
                config = config.merge(self.load_config_from_path(project_path)?);
            }
        }

        Ok(config)
    }

    /// Global configuration path (`~/.config/memctl/config.toml`)
    fn default_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("memctl").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    pub fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> MemctlResult<MemctlConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            MemctlError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            MemctlError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &MemctlConfig) -> MemctlResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MemctlError::config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| MemctlError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            MemctlError::config(format!("Failed to write config file {}: {}", path.display(), e))
        })
    }

    /// Create a default project configuration under `dir/.memctl/`
    pub fn init_project_config(&self, dir: &Path) -> MemctlResult<PathBuf> {
        let config_file = dir.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_file.exists() {
            return Err(MemctlError::config(format!(
                "Project configuration already exists at {}",
                config_file.display()
            )));
        }

        self.save_config_to_path(&config_file, &MemctlConfig::default())?;
        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn project_config_path(&self) -> Option<&Path> {
        self.project_config_path.as_deref()
    }

    /// Get the global config path (if a home directory is known)
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_config_path.as_deref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config_when_no_files() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_paths(Some(temp_dir.path().join("missing.toml")), None);
        let config = manager.load_config().unwrap();

        assert_eq!(config.log.level, "warn");
        assert_eq!(config.api.timeout_ms, 30_000);
        assert!(config.defaults.namespace.is_none());
    }

    #[test]
    fn test_init_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_paths(None, None);

        let path = manager.init_project_config(temp_dir.path()).unwrap();
        assert_eq!(path, temp_dir.path().join(".memctl").join("config.toml"));
        assert!(path.exists());

        let content = fs::read_to_string(&path).unwrap();
        let config: MemctlConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.api.url, "http://localhost:8080");

        assert!(manager.init_project_config(temp_dir.path()).is_err());
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(
            &global,
            "[api]\nurl = \"https://mem.example\"\n[defaults]\nnamespace = \"global\"\n",
        )
        .unwrap();
        fs::write(&project, "[defaults]\nnamespace = \"project\"\nlimit = 25\n").unwrap();

        let manager = ConfigManager::with_paths(Some(global), Some(project));
        let config = manager.load_config().unwrap();

        assert_eq!(config.api.url, "https://mem.example");
        assert_eq!(config.defaults.namespace.as_deref(), Some("project"));
        assert_eq!(config.defaults.limit, Some(25));
    }

    #[test]
    fn test_find_project_config_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_paths(None, None);
        manager.init_project_config(temp_dir.path()).unwrap();

        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let found = ConfigManager::find_project_config_path(&nested).unwrap();
        assert_eq!(found, temp_dir.path().join(".memctl").join("config.toml"));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[api\nurl = ").unwrap();

        let manager = ConfigManager::with_paths(None, None);
        let err = manager.load_config_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
