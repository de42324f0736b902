//! Validation layer message forwarding
//!
//! Routes `VK_EXT_debug_utils` messages into the `log` facade.

use ash::vk;
use std::ffi::CStr;

/// Create info for the debug messenger: warnings and errors of every type
pub fn messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
        .build()
}

/// Log level used for a message of the given severity
pub fn log_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::Level::Error
    } else if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::Level::Warn
    } else {
        log::Level::Debug
    }
}

/// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();

    log::log!(
        log_level(message_severity),
        "validation layer: {:?} - {}",
        message_type,
        message
    );

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        use vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

        assert_eq!(log_level(Severity::ERROR), log::Level::Error);
        assert_eq!(log_level(Severity::WARNING), log::Level::Warn);
        assert_eq!(log_level(Severity::INFO), log::Level::Debug);
        assert_eq!(log_level(Severity::VERBOSE), log::Level::Debug);
    }

    #[test]
    fn test_create_info_filters_warnings_and_errors() {
        let info = messenger_create_info();
        assert!(info.message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
        assert!(info.message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
        assert!(!info.message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
        assert!(info.pfn_user_callback.is_some());
    }
}
