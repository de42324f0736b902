//! Physical device ranking
//!
//! Scores every candidate device and picks the best one that can actually be
//! used. Everything here works on plain data so it can be exercised without a
//! Vulkan driver; `device.rs` does the querying.
//!
//! Score: +1000 for a discrete GPU, plus the maximum 2D image dimension. A
//! device without geometry shader support scores 0 no matter what else it has.
//!
//! Selection excludes every candidate that scores 0 or lacks a queue family
//! able to do both graphics and presentation, then takes the highest score.
//! Among equal scores the first enumerated device wins.

use crate::vulkan::{VulkanError, VulkanResult};
use ash::vk;

/// Bonus awarded to discrete GPUs
pub const DISCRETE_GPU_BONUS: u64 = 1000;

/// The device properties that feed into the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Discrete, integrated, virtual, CPU...
    pub device_type: vk::PhysicalDeviceType,
    /// Whether the geometry shader stage is supported
    pub geometry_shader: bool,
    /// `maxImageDimension2D` limit
    pub max_image_dimension_2d: u32,
}

impl DeviceCapabilities {
    /// Extract the scoring inputs from queried properties and features
    pub fn from_vulkan(
        properties: &vk::PhysicalDeviceProperties,
        features: &vk::PhysicalDeviceFeatures,
    ) -> Self {
        Self {
            device_type: properties.device_type,
            geometry_shader: features.geometry_shader != vk::FALSE,
            max_image_dimension_2d: properties.limits.max_image_dimension2_d,
        }
    }

    /// Whether this is a discrete GPU
    pub fn is_discrete(&self) -> bool {
        self.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
    }
}

/// Compute the suitability score of a device
pub fn rate_device_suitability(capabilities: &DeviceCapabilities) -> u64 {
    if !capabilities.geometry_shader {
        return 0;
    }

    let mut score = 0;
    if capabilities.is_discrete() {
        score += DISCRETE_GPU_BONUS;
    }
    score + u64::from(capabilities.max_image_dimension_2d)
}

/// Queue family indices for the graphics and presentation roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Family used for graphics commands
    pub graphics_family: Option<u32>,
    /// Family used for presentation
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    /// Both roles have been found
    pub const fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// The family serving both roles, if the roles landed on the same one
    pub fn shared_family(&self) -> Option<u32> {
        match (self.graphics_family, self.present_family) {
            (Some(graphics), Some(present)) if graphics == present => Some(graphics),
            _ => None,
        }
    }
}

/// Scan queue families for the graphics and presentation roles
///
/// Records the first graphics-capable family and the first family that can
/// present. The scan stops at the first family that can do both, and that
/// family then fills both roles. Families exposing no queues are skipped.
pub fn find_queue_families<F>(
    families: &[vk::QueueFamilyProperties],
    mut supports_present: F,
) -> VulkanResult<QueueFamilyIndices>
where
    F: FnMut(u32) -> VulkanResult<bool>,
{
    let mut indices = QueueFamilyIndices::default();

    for (index, family) in (0u32..).zip(families) {
        if family.queue_count == 0 {
            continue;
        }

        let graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
        let present = supports_present(index)?;

        if graphics && present {
            indices.graphics_family = Some(index);
            indices.present_family = Some(index);
            break;
        }
        if graphics && indices.graphics_family.is_none() {
            indices.graphics_family = Some(index);
        }
        if present && indices.present_family.is_none() {
            indices.present_family = Some(index);
        }
    }

    Ok(indices)
}

/// One physical device under consideration
#[derive(Debug, Clone)]
pub struct DeviceCandidate<D> {
    /// Handle to the device
    pub handle: D,
    /// Human-readable device name
    pub name: String,
    /// Scoring inputs
    pub capabilities: DeviceCapabilities,
    /// Queue families found for this device
    pub queue_families: QueueFamilyIndices,
}

impl<D> DeviceCandidate<D> {
    /// Suitability score
    pub fn score(&self) -> u64 {
        rate_device_suitability(&self.capabilities)
    }

    /// Whether the device passes the hard capability gate
    pub fn is_usable(&self) -> bool {
        self.score() > 0 && self.queue_families.shared_family().is_some()
    }
}

/// The winner of device selection
#[derive(Debug, Clone)]
pub struct SelectedDevice<D> {
    /// Handle to the device
    pub handle: D,
    /// Human-readable device name
    pub name: String,
    /// Scoring inputs
    pub capabilities: DeviceCapabilities,
    /// Winning score, always greater than zero
    pub score: u64,
    /// Family used for both graphics and presentation
    pub queue_family: u32,
}

/// Pick the best usable device
///
/// Fails if there are no candidates at all, or if none of them passes the gate.
pub fn select_device<D>(
    candidates: impl IntoIterator<Item = DeviceCandidate<D>>,
) -> VulkanResult<SelectedDevice<D>> {
    let mut considered = 0;
    let mut best: Option<SelectedDevice<D>> = None;

    for candidate in candidates {
        considered += 1;
        let score = candidate.score();
        log::debug!(
            "Device candidate \"{}\": {:?}, score {}, queue families {:?}",
            candidate.name,
            candidate.capabilities,
            score,
            candidate.queue_families
        );

        if !candidate.is_usable() || best.as_ref().is_some_and(|best| best.score >= score) {
            continue;
        }
        let Some(queue_family) = candidate.queue_families.shared_family() else {
            continue;
        };
        best = Some(SelectedDevice {
            handle: candidate.handle,
            name: candidate.name,
            capabilities: candidate.capabilities,
            score,
            queue_family,
        });
    }

    if considered == 0 {
        return Err(VulkanError::InitializationFailed(
            "Failed to find GPUs with Vulkan support".to_string(),
        ));
    }

    let selected = best.ok_or(VulkanError::NoSuitableDevice {
        candidates: considered,
    })?;
    log::info!(
        "Selected GPU \"{}\" (score {}, queue family {})",
        selected.name,
        selected.score,
        selected.queue_family
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISCRETE: vk::PhysicalDeviceType = vk::PhysicalDeviceType::DISCRETE_GPU;
    const INTEGRATED: vk::PhysicalDeviceType = vk::PhysicalDeviceType::INTEGRATED_GPU;

    fn caps(
        device_type: vk::PhysicalDeviceType,
        geometry_shader: bool,
        max_dim: u32,
    ) -> DeviceCapabilities {
        DeviceCapabilities {
            device_type,
            geometry_shader,
            max_image_dimension_2d: max_dim,
        }
    }

    fn family(flags: vk::QueueFlags, queue_count: u32) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count,
            ..Default::default()
        }
    }

    fn shared(index: u32) -> QueueFamilyIndices {
        QueueFamilyIndices {
            graphics_family: Some(index),
            present_family: Some(index),
        }
    }

    fn candidate(
        id: u32,
        capabilities: DeviceCapabilities,
        queue_families: QueueFamilyIndices,
    ) -> DeviceCandidate<u32> {
        DeviceCandidate {
            handle: id,
            name: format!("gpu{id}"),
            capabilities,
            queue_families,
        }
    }

    const ALL_TYPES: [vk::PhysicalDeviceType; 5] = [
        vk::PhysicalDeviceType::OTHER,
        vk::PhysicalDeviceType::INTEGRATED_GPU,
        vk::PhysicalDeviceType::DISCRETE_GPU,
        vk::PhysicalDeviceType::VIRTUAL_GPU,
        vk::PhysicalDeviceType::CPU,
    ];

    #[test]
    fn test_no_geometry_shader_scores_zero() {
        for device_type in ALL_TYPES {
            for max_dim in [0, 1, 4096, 16384, u32::MAX] {
                assert_eq!(rate_device_suitability(&caps(device_type, false, max_dim)), 0);
            }
        }
    }

    #[test]
    fn test_discrete_bonus_is_exactly_1000() {
        for max_dim in [0, 4096, 8192, u32::MAX] {
            let discrete = rate_device_suitability(&caps(DISCRETE, true, max_dim));
            let integrated = rate_device_suitability(&caps(INTEGRATED, true, max_dim));
            assert_eq!(discrete, integrated + 1000);
        }
    }

    #[test]
    fn test_score_does_not_overflow() {
        let score = rate_device_suitability(&caps(DISCRETE, true, u32::MAX));
        assert_eq!(score, u64::from(u32::MAX) + 1000);
    }

    #[test]
    fn test_capabilities_from_vulkan() {
        let mut properties = vk::PhysicalDeviceProperties {
            device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
            ..Default::default()
        };
        properties.limits.max_image_dimension2_d = 8192;
        let features = vk::PhysicalDeviceFeatures {
            geometry_shader: vk::TRUE,
            ..Default::default()
        };

        let capabilities = DeviceCapabilities::from_vulkan(&properties, &features);
        assert_eq!(capabilities, caps(DISCRETE, true, 8192));
    }

    #[test]
    fn test_queue_search_stops_at_first_shared_family() {
        let families = [
            family(vk::QueueFlags::TRANSFER, 1),
            family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, 4),
            family(vk::QueueFlags::GRAPHICS, 1),
        ];
        let mut queried = Vec::new();
        let indices = find_queue_families(&families, |index| {
            queried.push(index);
            Ok(true)
        })
        .unwrap();

        assert_eq!(indices, shared(1));
        assert_eq!(indices.shared_family(), Some(1));
        assert_eq!(queried, vec![0, 1]);
    }

    #[test]
    fn test_queue_search_skips_empty_families() {
        let families = [
            family(vk::QueueFlags::GRAPHICS, 0),
            family(vk::QueueFlags::GRAPHICS, 2),
        ];
        let indices = find_queue_families(&families, |_| Ok(true)).unwrap();
        assert_eq!(indices.shared_family(), Some(1));
    }

    #[test]
    fn test_queue_search_split_roles() {
        let families = [
            family(vk::QueueFlags::GRAPHICS, 1),
            family(vk::QueueFlags::TRANSFER, 1),
        ];
        let indices = find_queue_families(&families, |index| Ok(index == 1)).unwrap();

        assert!(indices.is_complete());
        assert_eq!(indices.graphics_family, Some(0));
        assert_eq!(indices.present_family, Some(1));
        assert_eq!(indices.shared_family(), None);
    }

    #[test]
    fn test_queue_search_without_graphics() {
        let families = [family(vk::QueueFlags::COMPUTE, 1)];
        let indices = find_queue_families(&families, |_| Ok(true)).unwrap();
        assert!(!indices.is_complete());
        assert_eq!(indices.present_family, Some(0));
    }

    #[test]
    fn test_queue_search_propagates_query_error() {
        let families = [family(vk::QueueFlags::GRAPHICS, 1)];
        let result = find_queue_families(&families, |_| {
            let lost = VulkanError::api("vkGetPhysicalDeviceSurfaceSupportKHR");
            Err(lost(vk::Result::ERROR_SURFACE_LOST_KHR))
        });
        assert!(matches!(result, Err(VulkanError::Api { .. })));
    }

    #[test]
    fn test_no_devices_fails() {
        let result = select_device(Vec::<DeviceCandidate<u32>>::new());
        assert!(matches!(result, Err(VulkanError::InitializationFailed(_))));
    }

    #[test]
    fn test_zero_score_is_never_selected() {
        let candidates = vec![
            candidate(0, caps(DISCRETE, false, 16384), shared(0)),
            candidate(1, caps(INTEGRATED, false, 4096), shared(0)),
        ];
        let result = select_device(candidates);
        assert!(matches!(result, Err(VulkanError::NoSuitableDevice { candidates: 2 })));
    }

    #[test]
    fn test_device_without_shared_family_is_never_selected() {
        let split = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(1),
        };
        let candidates = vec![
            candidate(0, caps(DISCRETE, true, 16384), split),
            candidate(1, caps(INTEGRATED, true, 4096), shared(2)),
        ];

        let selected = select_device(candidates).unwrap();
        assert_eq!(selected.handle, 1);
        assert_eq!(selected.queue_family, 2);

        let lone = vec![candidate(0, caps(DISCRETE, true, 16384), split)];
        assert!(select_device(lone).is_err());
    }

    #[test]
    fn test_highest_score_wins() {
        // integrated without geometry shaders, discrete at 8192, integrated at 16384
        let candidates = vec![
            candidate(0, caps(INTEGRATED, false, 4096), shared(0)),
            candidate(1, caps(DISCRETE, true, 8192), shared(0)),
            candidate(2, caps(INTEGRATED, true, 16384), shared(0)),
        ];
        let scores: Vec<u64> = candidates.iter().map(DeviceCandidate::score).collect();
        assert_eq!(scores, vec![0, 9192, 16384]);

        let selected = select_device(candidates).unwrap();
        assert_eq!(selected.handle, 2);
        assert_eq!(selected.score, 16384);
    }

    #[test]
    fn test_discrete_wins_at_equal_dimension() {
        let candidates = vec![
            candidate(0, caps(INTEGRATED, true, 8192), shared(0)),
            candidate(1, caps(DISCRETE, true, 8192), shared(0)),
        ];
        assert_eq!(select_device(candidates).unwrap().handle, 1);
    }

    #[test]
    fn test_ties_keep_first_enumerated() {
        crate::foundation::logging::init_for_tests();
        let candidates = vec![
            candidate(7, caps(DISCRETE, true, 8192), shared(0)),
            candidate(8, caps(DISCRETE, true, 8192), shared(1)),
            candidate(9, caps(DISCRETE, true, 8192), shared(2)),
        ];
        let selected = select_device(candidates).unwrap();
        assert_eq!(selected.handle, 7);
        assert_eq!(selected.queue_family, 0);
    }
}
