//! Application lifecycle: set up, idle in the event loop, tear down

use crate::config::{BootstrapConfig, ConfigError};
use crate::vulkan::{VulkanContext, VulkanError};
use crate::window::{Window, WindowError};
use thiserror::Error;

/// Any failure during startup
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Window could not be created
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// A Vulkan setup step failed
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),
}

/// Window plus the Vulkan context created for it
pub struct HelloApplication {
    context: Option<VulkanContext>,
    window: Window,
}

impl HelloApplication {
    /// Open the window and bring up Vulkan
    pub fn new(config: BootstrapConfig) -> Result<Self, BootstrapError> {
        config.validate()?;

        let mut window =
            Window::new(&config.window_title, config.window_width, config.window_height)?;
        let context = VulkanContext::new(&mut window, &config)?;

        Ok(Self {
            context: Some(context),
            window,
        })
    }

    /// Block on window events until the window is closed
    pub fn run(&mut self) {
        log::info!("Entering main loop");
        while !self.window.should_close() {
            self.window.wait_events();
            self.window.handle_events();
        }
        log::info!("Window closed");
    }

    /// The Vulkan context
    pub const fn context(&self) -> Option<&VulkanContext> {
        self.context.as_ref()
    }
}

impl Drop for HelloApplication {
    fn drop(&mut self) {
        // The surface belongs to the window, so Vulkan goes first
        self.context.take();
    }
}
