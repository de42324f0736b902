//! # Vulkan Bootstrap
//!
//! Opens a window, creates a Vulkan instance, ranks the available physical
//! devices and opens a logical device with a single graphics queue.
//!
//! ## Features
//!
//! - **Device Ranking**: deterministic scoring with a hard capability gate
//! - **Managed Handles**: Vulkan handles released child-before-parent, on
//!   success and on early failure alike
//! - **Validation**: debug builds register a messenger that forwards to `log`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vk_bootstrap::prelude::*;
//!
//! fn main() -> Result<(), BootstrapError> {
//!     let config = BootstrapConfig::default();
//!     let mut app = HelloApplication::new(config)?;
//!     app.run();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod foundation;
pub mod vulkan;
pub mod window;

mod application;

pub use application::{BootstrapError, HelloApplication};

/// Common imports for bootstrap users
pub mod prelude {
    pub use crate::{
        config::{BootstrapConfig, Config, ConfigError},
        vulkan::{VulkanContext, VulkanError, VulkanResult},
        window::{Window, WindowError},
        BootstrapError, HelloApplication,
    };
}
