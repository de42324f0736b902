//! Vulkan context management
//!
//! The context owns every handle created during setup. The instance is the
//! root of a [`HandleScope`]; the debug messenger, the surface and the logical
//! device are its dependents, so they are always released before it, whether
//! setup finished or bailed out half way.

use crate::config::BootstrapConfig;
use crate::vulkan::device::{self, LogicalDevice};
use crate::vulkan::handle::{Dependents, HandleScope};
use crate::vulkan::instance::{create_instance, manage_instance};
use crate::vulkan::ranker::SelectedDevice;
use crate::vulkan::{debug, ManagedHandle, VulkanError, VulkanResult};
use crate::window::Window;
use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::Surface;
use ash::{vk, Entry, Instance};

/// Handles created against the instance
pub struct InstanceDependents {
    /// Debug messenger, only live when validation is enabled
    pub debug_messenger: ManagedHandle<vk::DebugUtilsMessengerEXT>,
    /// Window surface
    pub surface: ManagedHandle<vk::SurfaceKHR>,
    /// Logical device, once created
    pub device: Option<LogicalDevice>,
}

impl InstanceDependents {
    fn new(
        instance: &ManagedHandle<vk::Instance>,
        debug_utils: DebugUtils,
        surface_loader: Surface,
    ) -> Self {
        Self {
            debug_messenger: ManagedHandle::with_parent(
                "debug messenger",
                instance,
                move |_instance: vk::Instance, messenger| unsafe {
                    debug_utils.destroy_debug_utils_messenger(messenger, None);
                },
            ),
            surface: ManagedHandle::with_parent(
                "surface",
                instance,
                move |_instance: vk::Instance, surface| unsafe {
                    surface_loader.destroy_surface(surface, None);
                },
            ),
            device: None,
        }
    }
}

impl Dependents for InstanceDependents {
    /// Reverse order of creation
    fn release_dependents(&mut self) {
        self.device.release_dependents();
        self.device = None;
        self.surface.release();
        self.debug_messenger.release();
    }
}

/// Main Vulkan context that owns all core Vulkan resources
pub struct VulkanContext {
    handles: HandleScope<vk::Instance, InstanceDependents>,
    instance: Instance,
    surface_loader: Surface,
    physical_device: SelectedDevice<vk::PhysicalDevice>,
    validation_enabled: bool,
}

impl VulkanContext {
    /// Create the instance, surface and logical device for `window`
    pub fn new(window: &mut Window, config: &BootstrapConfig) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::InitializationFailed(format!("Failed to load Vulkan: {e}")))?;

        let validation_enabled = config.validation_enabled();
        let window_extensions = window.get_required_instance_extensions().map_err(|e| {
            VulkanError::InitializationFailed(format!("Failed to get required extensions: {e}"))
        })?;

        let instance = create_instance(&entry, config, window_extensions, validation_enabled)?;
        let debug_utils = DebugUtils::new(&entry, &instance);
        let surface_loader = Surface::new(&entry, &instance);

        let instance_handle = manage_instance(entry, &instance);
        let loader = surface_loader.clone();
        let mut handles = HandleScope::new(instance_handle, |parent| {
            InstanceDependents::new(parent, debug_utils.clone(), loader)
        });

        if validation_enabled {
            let create_info = debug::messenger_create_info();
            let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
                .map_err(VulkanError::api("vkCreateDebugUtilsMessengerEXT"))?;
            handles.dependents_mut().debug_messenger.assign(messenger);
            log::debug!("Registered validation debug messenger");
        }

        *handles.dependents_mut().surface.replace() = window
            .create_vulkan_surface(instance.handle())
            .map_err(|e| VulkanError::InitializationFailed(format!("Surface creation: {e}")))?;

        let surface = handles.dependents().surface.raw();
        let physical_device = device::pick_physical_device(&instance, surface, &surface_loader)?;

        let layers: &[String] = if validation_enabled {
            &config.validation_layers
        } else {
            &[]
        };
        let logical_device =
            LogicalDevice::new(&instance, handles.parent(), &physical_device, layers)?;
        handles.dependents_mut().device = Some(logical_device);

        Ok(Self {
            handles,
            instance,
            surface_loader,
            physical_device,
            validation_enabled,
        })
    }

    /// Get a reference to the Vulkan instance
    pub const fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Get the surface handle
    pub fn surface(&self) -> vk::SurfaceKHR {
        self.handles.dependents().surface.raw()
    }

    /// Get the surface loader
    pub const fn surface_loader(&self) -> &Surface {
        &self.surface_loader
    }

    /// Get the selected physical device
    pub const fn physical_device(&self) -> &SelectedDevice<vk::PhysicalDevice> {
        &self.physical_device
    }

    /// Get the logical device
    pub fn device(&self) -> VulkanResult<&LogicalDevice> {
        self.handles.dependents().device.as_ref().ok_or_else(|| {
            VulkanError::InitializationFailed("Logical device already released".to_string())
        })
    }

    /// Get the graphics queue
    pub fn graphics_queue(&self) -> VulkanResult<vk::Queue> {
        self.device().map(LogicalDevice::queue)
    }

    /// Whether validation layers and the debug messenger are active
    pub const fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan context");
        self.handles.release();
    }
}
