//! Launcher settings
//!
//! Settings control how the launcher itself runs (log level, device
//! backend). They never feed into [`crate::ResolvedConfig`], which is built
//! from command tokens alone.
//!
//! Priority (highest to lowest):
//! 1. Environment variables (`OWL_LOG`, `OWL_DEVICE_BACKEND`, `OWL_FAKE_DEVICES`)
//! 2. Repo-local settings (`.owl.toml` in the current dir, up to the git root)
//! 3. Global settings (`~/.config/owl/config.toml`)
//! 4. Defaults
//!
//! Files are not merged: the most specific file found replaces the one
//! before it as a whole, then environment variables apply on top.

use crate::device::{DeviceBackend, NvidiaSmi, StaticDevices};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Settings error
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Complete launcher settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Device backend settings
    #[serde(default)]
    pub devices: DeviceSettings,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Which enumerator answers device queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Query `nvidia-smi`
    #[default]
    NvidiaSmi,
    /// Use the fixed `fake` list
    Fake,
}

impl BackendKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "nvidia-smi" | "nvidia" => Some(BackendKind::NvidiaSmi),
            "fake" | "static" => Some(BackendKind::Fake),
            _ => None,
        }
    }
}

/// Device backend settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Backend kind
    #[serde(default)]
    pub backend: BackendKind,
    /// Device names for the `fake` backend
    #[serde(default)]
    pub fake: Vec<String>,
    /// Alternative `nvidia-smi` executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nvidia_smi: Option<String>,
}

impl DeviceSettings {
    /// Build the configured device backend
    pub fn backend(&self) -> DeviceBackend {
        match self.backend {
            BackendKind::Fake => DeviceBackend::Static(StaticDevices::new(self.fake.clone())),
            BackendKind::NvidiaSmi => match &self.nvidia_smi {
                Some(program) => DeviceBackend::NvidiaSmi(NvidiaSmi::with_program(program.clone())),
                None => DeviceBackend::NvidiaSmi(NvidiaSmi::new()),
            },
        }
    }
}

/// Settings plus the warnings raised while loading them
///
/// Settings are loaded before logging exists, so warnings are held here and
/// replayed with [`LoadedSettings::log_warnings`] once the subscriber is up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSettings {
    /// Resolved settings
    pub settings: Settings,
    /// Skipped files and ignored overrides, in the order they were found
    pub warnings: Vec<String>,
}

impl LoadedSettings {
    /// Emit every held warning at `warn`
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{warning}");
        }
    }
}

/// Resolve launcher settings from all sources
pub fn resolve_settings(
    current_dir: &Path,
    home_dir: &Path,
) -> Result<LoadedSettings, SettingsError> {
    let mut loaded = LoadedSettings::default();

    // 3. Global settings
    let global_path = home_dir.join(".config/owl/config.toml");
    if global_path.exists() {
        match load_settings_file(&global_path) {
            Ok(file) => loaded.settings = file,
            Err(e) => loaded
                .warnings
                .push(format!("Failed to parse global settings at {global_path:?}: {e}")),
        }
    }

    // 2. Repo-local settings
    if let Some(local_path) = find_repo_local_settings(current_dir) {
        match load_settings_file(&local_path) {
            Ok(file) => loaded.settings = file,
            Err(e) => loaded
                .warnings
                .push(format!("Failed to parse repo settings at {local_path:?}: {e}")),
        }
    }

    // 1. Environment
    apply_env_overrides(&mut loaded);

    Ok(loaded)
}

/// Find `.owl.toml`, searching parents up to the git root
fn find_repo_local_settings(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let path = dir.join(".owl.toml");
        if path.exists() {
            return Some(path);
        }

        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

/// Load settings from a TOML file
pub fn load_settings_file(path: &Path) -> Result<Settings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

fn apply_env_overrides(loaded: &mut LoadedSettings) {
    let settings = &mut loaded.settings;
    if let Ok(level) = std::env::var("OWL_LOG") {
        settings.logging.level = level;
    }

    if let Ok(raw) = std::env::var("OWL_DEVICE_BACKEND") {
        match BackendKind::parse(&raw) {
            Some(kind) => settings.devices.backend = kind,
            None => loaded
                .warnings
                .push(format!("Ignoring unknown OWL_DEVICE_BACKEND '{raw}'")),
        }
    }

    // A fake list implies the fake backend
    if let Ok(raw) = std::env::var("OWL_FAKE_DEVICES") {
        settings.devices.backend = BackendKind::Fake;
        settings.devices.fake = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceEnumerator;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn clear_env() {
        unsafe {
            env::remove_var("OWL_LOG");
            env::remove_var("OWL_DEVICE_BACKEND");
            env::remove_var("OWL_FAKE_DEVICES");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let loaded = resolve_settings(temp.path(), temp.path()).unwrap();
        assert!(loaded.warnings.is_empty());
        let settings = loaded.settings;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.devices.backend, BackendKind::NvidiaSmi);
    }

    #[test]
    #[serial]
    fn test_global_then_repo_local() {
        clear_env();
        let home = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".config/owl")).unwrap();
        std::fs::write(
            home.path().join(".config/owl/config.toml"),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        std::fs::create_dir(repo.path().join(".git")).unwrap();
        let settings = resolve_settings(repo.path(), home.path()).unwrap().settings;
        assert_eq!(settings.logging.level, "debug");

        std::fs::write(
            repo.path().join(".owl.toml"),
            "[devices]\nbackend = \"fake\"\nfake = [\"gfx906\"]\n",
        )
        .unwrap();
        let nested = repo.path().join("runs/m1");
        std::fs::create_dir_all(&nested).unwrap();

        let settings = resolve_settings(&nested, home.path()).unwrap().settings;
        assert_eq!(settings.devices.backend, BackendKind::Fake);
        assert_eq!(settings.devices.fake, vec!["gfx906".to_string()]);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_unparseable_file_skipped() {
        clear_env();
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".config/owl")).unwrap();
        std::fs::write(home.path().join(".config/owl/config.toml"), "[logging\n").unwrap();
        std::fs::create_dir(home.path().join(".git")).unwrap();

        let loaded = resolve_settings(home.path(), home.path()).unwrap();
        assert_eq!(loaded.settings, Settings::default());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].starts_with("Failed to parse global settings"));
    }

    #[test]
    #[serial]
    fn test_unparseable_repo_file_keeps_global() {
        clear_env();
        let home = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".config/owl")).unwrap();
        std::fs::write(
            home.path().join(".config/owl/config.toml"),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        std::fs::create_dir(repo.path().join(".git")).unwrap();
        std::fs::write(repo.path().join(".owl.toml"), "[devices\n").unwrap();

        let loaded = resolve_settings(repo.path(), home.path()).unwrap();
        assert_eq!(loaded.settings.logging.level, "debug");
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].starts_with("Failed to parse repo settings"));
        assert!(loaded.warnings[0].contains(".owl.toml"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        unsafe {
            env::set_var("OWL_LOG", "warn");
            env::set_var("OWL_FAKE_DEVICES", "gpu-a, gpu-b");
        }

        let settings = resolve_settings(temp.path(), temp.path()).unwrap().settings;
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.devices.backend, BackendKind::Fake);
        assert_eq!(settings.devices.backend().count().unwrap(), 2);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_backend_ignored() {
        clear_env();
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        unsafe {
            env::set_var("OWL_DEVICE_BACKEND", "quantum");
        }
        let loaded = resolve_settings(temp.path(), temp.path()).unwrap();
        assert_eq!(loaded.settings.devices.backend, BackendKind::NvidiaSmi);
        assert_eq!(
            loaded.warnings,
            vec!["Ignoring unknown OWL_DEVICE_BACKEND 'quantum'".to_string()]
        );
        clear_env();
    }

    #[test]
    fn test_settings_file_parse() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("owl.toml");
        std::fs::write(
            &path,
            r#"
[logging]
level = "trace"

[devices]
backend = "nvidia-smi"
nvidia_smi = "/opt/nvidia/bin/nvidia-smi"
"#,
        )
        .unwrap();

        let settings = load_settings_file(&path).unwrap();
        assert_eq!(settings.logging.level, "trace");
        assert_eq!(
            settings.devices.nvidia_smi.as_deref(),
            Some("/opt/nvidia/bin/nvidia-smi")
        );
        assert!(matches!(
            settings.devices.backend(),
            DeviceBackend::NvidiaSmi(_)
        ));
    }
}
