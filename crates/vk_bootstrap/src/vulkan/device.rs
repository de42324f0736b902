//! Physical device selection and logical device creation

use crate::vulkan::handle::Dependents;
use crate::vulkan::instance::{as_ptrs, to_cstrings};
use crate::vulkan::ranker::{self, DeviceCandidate, DeviceCapabilities, SelectedDevice};
use crate::vulkan::{ManagedHandle, VulkanError, VulkanResult};
use ash::extensions::khr::Surface;
use ash::{vk, Device, Instance};
use std::ffi::CStr;

/// Query one physical device into a ranking candidate
pub fn describe_device(
    instance: &Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &Surface,
) -> VulkanResult<DeviceCandidate<vk::PhysicalDevice>> {
    let properties = unsafe { instance.get_physical_device_properties(device) };
    let features = unsafe { instance.get_physical_device_features(device) };
    let queue_families = unsafe { instance.get_physical_device_queue_family_properties(device) };

    let queue_families = ranker::find_queue_families(&queue_families, |index| unsafe {
        surface_loader
            .get_physical_device_surface_support(device, index, surface)
            .map_err(VulkanError::api("vkGetPhysicalDeviceSurfaceSupportKHR"))
    })?;

    let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    Ok(DeviceCandidate {
        handle: device,
        name,
        capabilities: DeviceCapabilities::from_vulkan(&properties, &features),
        queue_families,
    })
}

/// Enumerate, rank and pick a physical device that can present to `surface`
pub fn pick_physical_device(
    instance: &Instance,
    surface: vk::SurfaceKHR,
    surface_loader: &Surface,
) -> VulkanResult<SelectedDevice<vk::PhysicalDevice>> {
    let devices = unsafe { instance.enumerate_physical_devices() }
        .map_err(VulkanError::api("vkEnumeratePhysicalDevices"))?;
    log::info!("Found {} physical device(s)", devices.len());

    let candidates = devices
        .into_iter()
        .map(|device| describe_device(instance, device, surface, surface_loader))
        .collect::<VulkanResult<Vec<_>>>()?;

    ranker::select_device(candidates)
}

/// Logical device with its single graphics queue
pub struct LogicalDevice {
    /// Raw device handle, released against the instance
    handle: ManagedHandle<vk::Device>,
    /// Device-level function table
    device: Device,
    /// Queue used for graphics and presentation
    queue: vk::Queue,
    /// Family the queue belongs to
    queue_family: u32,
}

impl LogicalDevice {
    /// Create the logical device on the selected physical device
    ///
    /// `instance_handle` is the managed instance the device is released against.
    pub fn new(
        instance: &Instance,
        instance_handle: &ManagedHandle<vk::Instance>,
        physical_device: &SelectedDevice<vk::PhysicalDevice>,
        validation_layers: &[String],
    ) -> VulkanResult<Self> {
        let queue_priorities = [1.0_f32];
        let queue_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(physical_device.queue_family)
            .queue_priorities(&queue_priorities)
            .build()];

        let device_features = vk::PhysicalDeviceFeatures::default();

        // Device layers are ignored by current loaders but older ones still read them
        let layer_names = to_cstrings(validation_layers)?;
        let layer_ptrs = as_ptrs(&layer_names);

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_features(&device_features)
            .enabled_layer_names(&layer_ptrs);

        let device = unsafe { instance.create_device(physical_device.handle, &create_info, None) }
            .map_err(VulkanError::api("vkCreateDevice"))?;

        let device_fns = device.clone();
        let mut handle = ManagedHandle::with_parent(
            "logical device",
            instance_handle,
            move |_instance: vk::Instance, _device: vk::Device| unsafe {
                if let Err(e) = device_fns.device_wait_idle() {
                    log::warn!("vkDeviceWaitIdle failed before destroying device: {:?}", e);
                }
                device_fns.destroy_device(None);
            },
        );
        handle.assign(device.handle());

        let queue = unsafe { device.get_device_queue(physical_device.queue_family, 0) };

        log::info!(
            "Created logical device on \"{}\" with one queue from family {}",
            physical_device.name,
            physical_device.queue_family
        );

        Ok(Self {
            handle,
            device,
            queue,
            queue_family: physical_device.queue_family,
        })
    }

    /// The device-level function table
    pub const fn device(&self) -> &Device {
        &self.device
    }

    /// Raw device handle
    pub fn handle(&self) -> vk::Device {
        self.handle.raw()
    }

    /// The graphics queue
    pub const fn queue(&self) -> vk::Queue {
        self.queue
    }

    /// Family index of the graphics queue
    pub const fn queue_family(&self) -> u32 {
        self.queue_family
    }
}

impl Dependents for LogicalDevice {
    fn release_dependents(&mut self) {
        self.queue = vk::Queue::null();
        self.handle.release();
    }
}
