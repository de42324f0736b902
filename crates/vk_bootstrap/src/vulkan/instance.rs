//! Vulkan instance creation
//!
//! Checks the requested validation layers and extensions against what the
//! loader reports, then creates the instance. The returned instance is not
//! managed yet; the caller wraps it in a [`ManagedHandle`] straight away.

use crate::config::BootstrapConfig;
use crate::vulkan::{debug, ManagedHandle, VulkanError, VulkanResult};
use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};
use std::ffi::{c_char, CStr, CString};

/// Names from `requested` that are not in `available`, in request order
pub fn missing_names(requested: &[String], available: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !available.contains(name))
        .cloned()
        .collect()
}

/// Instance extensions to enable
///
/// The windowing library's list, plus debug utils when validating.
pub fn required_extensions(window_extensions: Vec<String>, enable_validation: bool) -> Vec<String> {
    let mut extensions = window_extensions;
    if enable_validation {
        let debug_utils = DebugUtils::name().to_string_lossy().into_owned();
        if !extensions.contains(&debug_utils) {
            extensions.push(debug_utils);
        }
    }
    extensions
}

/// Layer names the loader knows about
pub fn available_layers(entry: &Entry) -> VulkanResult<Vec<String>> {
    let layers = entry
        .enumerate_instance_layer_properties()
        .map_err(VulkanError::api("vkEnumerateInstanceLayerProperties"))?;

    Ok(layers
        .iter()
        .map(|layer| fixed_name(&layer.layer_name))
        .collect())
}

/// Instance extension names the loader knows about
pub fn available_extensions(entry: &Entry) -> VulkanResult<Vec<String>> {
    let extensions = entry
        .enumerate_instance_extension_properties(None)
        .map_err(VulkanError::api("vkEnumerateInstanceExtensionProperties"))?;

    Ok(extensions
        .iter()
        .map(|extension| fixed_name(&extension.extension_name))
        .collect())
}

/// Fail unless every requested validation layer is installed
pub fn check_validation_layer_support(entry: &Entry, requested: &[String]) -> VulkanResult<()> {
    let missing = missing_names(requested, &available_layers(entry)?);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(VulkanError::ValidationLayersUnavailable { missing })
    }
}

/// Create the Vulkan instance
pub fn create_instance(
    entry: &Entry,
    config: &BootstrapConfig,
    window_extensions: Vec<String>,
    enable_validation: bool,
) -> VulkanResult<Instance> {
    if enable_validation {
        check_validation_layer_support(entry, &config.validation_layers)?;
    }

    let extensions = required_extensions(window_extensions, enable_validation);
    let available = available_extensions(entry)?;
    log::debug!("Available instance extensions:");
    for extension in &available {
        log::debug!("\t{}", extension);
    }
    for extension in missing_names(&extensions, &available) {
        log::warn!("Required instance extension {} is not reported by the loader", extension);
    }

    let app_name = to_cstring(&config.application_name)?;
    let engine_name = to_cstring(&config.engine_name)?;
    let (major, minor, patch) = config.application_version;
    let app_info = vk::ApplicationInfo::builder()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(vk::API_VERSION_1_0);

    let extension_names = to_cstrings(&extensions)?;
    let extension_ptrs = as_ptrs(&extension_names);

    let layer_names = if enable_validation {
        to_cstrings(&config.validation_layers)?
    } else {
        Vec::new()
    };
    let layer_ptrs = as_ptrs(&layer_names);

    // Chained so instance creation and destruction are covered by validation too
    let mut debug_info = debug::messenger_create_info();
    let mut create_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_extension_names(&extension_ptrs)
        .enabled_layer_names(&layer_ptrs);
    if enable_validation {
        create_info = create_info.push_next(&mut debug_info);
    }

    let instance = unsafe { entry.create_instance(&create_info, None) }
        .map_err(VulkanError::api("vkCreateInstance"))?;

    log::info!(
        "Created Vulkan instance for \"{}\" ({} extension(s), validation {})",
        config.application_name,
        extensions.len(),
        if enable_validation { "on" } else { "off" }
    );
    Ok(instance)
}

/// Wrap a freshly created instance so it is destroyed exactly once
///
/// The entry is moved into the release action: the loader library has to
/// stay loaded until the instance is gone.
pub fn manage_instance(entry: Entry, instance: &Instance) -> ManagedHandle<vk::Instance> {
    let owner = (entry, instance.clone());
    let mut handle = ManagedHandle::new("instance", move |_raw: vk::Instance| {
        let (_entry, instance_fns) = &owner;
        unsafe { instance_fns.destroy_instance(None) };
    });
    handle.assign(instance.handle());
    handle
}

/// Convert the given strings to C strings
pub fn to_cstrings(names: &[String]) -> VulkanResult<Vec<CString>> {
    names.iter().map(|name| to_cstring(name)).collect()
}

/// Raw pointers to a list of C strings, valid while `names` lives
pub fn as_ptrs(names: &[CString]) -> Vec<*const c_char> {
    names.iter().map(|name| name.as_ptr()).collect()
}

fn to_cstring(name: &str) -> VulkanResult<CString> {
    CString::new(name)
        .map_err(|e| VulkanError::InitializationFailed(format!("Invalid name {name:?}: {e}")))
}

fn fixed_name(raw: &[c_char]) -> String {
    // SAFETY: Vulkan guarantees these fixed-size name arrays are NUL-terminated
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}
