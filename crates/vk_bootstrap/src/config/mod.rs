//! Configuration system
//!
//! The compiled-in defaults describe the whole bootstrap: window size, title,
//! application name and the validation layers requested in debug builds. A
//! TOML or RON file can override any of them.

pub use serde::{Deserialize, Serialize};

/// Validation layer requested when validation is enabled
pub const DEFAULT_VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value that Vulkan or GLFW would reject
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # Bootstrap Configuration
///
/// Window and Vulkan instance parameters. Every field has a compiled-in
/// default, so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Window title
    pub window_title: String,
    /// Application name reported to the Vulkan instance
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Engine name reported to the Vulkan instance
    pub engine_name: String,
    /// Validation layers requested when validation is enabled
    pub validation_layers: Vec<String>,
    /// Whether to enable Vulkan validation layers
    pub enable_validation: Option<bool>,
}

impl BootstrapConfig {
    /// Create a configuration with the given application name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            ..Self::default()
        }
    }

    /// Set the window size
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set the window title
    #[must_use]
    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    /// Force validation on or off
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Whether validation layers should be enabled
    ///
    /// Falls back to the build type when not set explicitly.
    pub fn validation_enabled(&self) -> bool {
        self.enable_validation.unwrap_or(cfg!(debug_assertions))
    }

    /// Check the configuration for values Vulkan or GLFW would reject
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        if let Some(name) = [&self.application_name, &self.engine_name, &self.window_title]
            .into_iter()
            .chain(self.validation_layers.iter())
            .find(|name| name.contains('\0'))
        {
            return Err(ConfigError::Invalid(format!("interior NUL byte in {name:?}")));
        }
        Ok(())
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            window_title: "Vulkan".to_string(),
            application_name: "Hello Triangle".to_string(),
            application_version: (1, 0, 0),
            engine_name: "No Engine".to_string(),
            validation_layers: vec![DEFAULT_VALIDATION_LAYER.to_string()],
            enable_validation: None,
        }
    }
}

impl Config for BootstrapConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("vk_bootstrap_{}_{name}", std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_defaults_match_compiled_in_constants() {
        let config = BootstrapConfig::default();
        assert_eq!((config.window_width, config.window_height), (800, 600));
        assert_eq!(config.validation_layers, vec![DEFAULT_VALIDATION_LAYER.to_string()]);
        assert_eq!(config.validation_enabled(), cfg!(debug_assertions));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_validation_overrides_build_type() {
        assert!(BootstrapConfig::default().with_validation(true).validation_enabled());
        assert!(!BootstrapConfig::default().with_validation(false).validation_enabled());
    }

    #[test]
    fn test_load_partial_toml_keeps_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "window_width = 1024\nwindow_title = \"Test\"\n").unwrap();

        let config = BootstrapConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.window_title, "Test");
        assert_eq!(config.application_name, "Hello Triangle");
    }

    #[test]
    fn test_ron_save_and_load() {
        let path = temp_path("saved.ron");
        let config = BootstrapConfig::new("Ron App").with_window_size(640, 480);
        config.save_to_file(&path).unwrap();

        let loaded = BootstrapConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_format() {
        let path = temp_path("config.json");
        std::fs::write(&path, "{\"window_width\": 1024}").unwrap();

        let result = BootstrapConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));

        let result = BootstrapConfig::default().save_to_file(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let config = BootstrapConfig::default().with_window_size(0, 600);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_nul_in_layer_name() {
        let mut config = BootstrapConfig::default();
        config.validation_layers.push("bad\0layer".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
