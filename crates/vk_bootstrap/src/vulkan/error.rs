//! Vulkan error types
//!
//! Every variant describes one initialization step that failed. None of them
//! are recoverable: they propagate to the top level and end the process.

use ash::vk;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// A Vulkan call returned an error code
    #[error("{step} failed: {result:?}")]
    Api {
        /// The Vulkan entry point that failed
        step: &'static str,
        /// The result code it returned
        result: vk::Result,
    },

    /// Vulkan context initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Validation was requested but some layers are not installed
    #[error("Validation layers requested, but not available: {}", missing.join(", "))]
    ValidationLayersUnavailable {
        /// Names of the layers the loader does not know about
        missing: Vec<String>,
    },

    /// No candidate device passed the capability gate
    #[error("Failed to find a suitable GPU ({candidates} candidate(s) rejected)")]
    NoSuitableDevice {
        /// Number of devices that were considered
        candidates: usize,
    },
}

impl VulkanError {
    /// Build a mapper for `map_err` that tags a raw `vk::Result` with its call
    pub fn api(step: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::Api { step, result }
    }
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_names_step() {
        let error = VulkanError::api("vkCreateDevice")(vk::Result::ERROR_INITIALIZATION_FAILED);
        let message = error.to_string();
        assert!(message.starts_with("vkCreateDevice failed"));
        assert!(message.contains("ERROR_INITIALIZATION_FAILED"));
    }

    #[test]
    fn test_missing_layers_listed() {
        let error = VulkanError::ValidationLayersUnavailable {
            missing: vec!["VK_LAYER_A".to_string(), "VK_LAYER_B".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Validation layers requested, but not available: VK_LAYER_A, VK_LAYER_B"
        );
    }
}
