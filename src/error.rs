//! Error types for soup.
//!
//! Three kinds of failure reach callers:
//! - [`FluidError::Configuration`] - missing or invalid input at initialization
//! - [`FluidError::RenderResource`] - the renderer could not obtain a GPU resource
//! - [`FluidError::Lifecycle`] - an operation was called outside the `Ready` state
//!
//! Physical edge cases (zero particles, particles at rest, particles pinned to
//! a wall) are valid simulation states and never produce an error.

use thiserror::Error;

use crate::lifecycle::Lifecycle;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FluidError>;

/// Errors surfaced by the simulation engine and renderer.
#[derive(Debug, Error)]
pub enum FluidError {
    /// Missing particle source or invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A rendering resource (shading program, texture, buffer) is unavailable.
    #[error("render resource error: {0}")]
    RenderResource(String),

    /// Operation invoked while the component was not `Ready`.
    #[error("lifecycle error: `{operation}` called while {state}")]
    Lifecycle {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State the component was in.
        state: Lifecycle,
    },
}

impl FluidError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        FluidError::Configuration(msg.into())
    }

    pub(crate) fn render(msg: impl Into<String>) -> Self {
        FluidError::RenderResource(msg.into())
    }
}

/// Errors that can occur while bringing up the wgpu device.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a GPU with WebGPU/Vulkan/Metal/DX12 support is required")]
    NoAdapter,
    /// The surface is not compatible with the chosen adapter.
    #[error("surface reports no supported texture formats for this adapter")]
    NoSurfaceFormat,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The shader module failed validation.
    #[error("shader module `{label}` failed to compile: {message}")]
    ShaderCompilation {
        /// Debug label of the module.
        label: &'static str,
        /// Validation message reported by wgpu.
        message: String,
    },
}

impl From<GpuError> for FluidError {
    fn from(e: GpuError) -> Self {
        FluidError::RenderResource(e.to_string())
    }
}

/// Errors that end the windowed application.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to open the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// Bringing up the GPU failed.
    #[error(transparent)]
    Gpu(#[from] GpuError),
    /// The simulation or renderer failed.
    #[error(transparent)]
    Fluid(#[from] FluidError),
}
