//! Vulkan backend
//!
//! Instance creation, device ranking and the managed handles that keep
//! teardown ordered.

/// Error types shared by every setup step
pub mod error;

/// Managed handles and parent scopes
pub mod handle;

/// Device scoring and selection
pub mod ranker;

/// Validation message forwarding
pub mod debug;

/// Instance creation and layer/extension checks
pub mod instance;

/// Physical device querying and logical device creation
pub mod device;

/// The context owning all setup handles
pub mod context;

pub use context::{InstanceDependents, VulkanContext};
pub use device::LogicalDevice;
pub use error::{VulkanError, VulkanResult};
pub use handle::{Dependents, HandleScope, ManagedHandle, RawHandle};
pub use ranker::{DeviceCandidate, DeviceCapabilities, QueueFamilyIndices, SelectedDevice};
