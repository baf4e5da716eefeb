//! Error types for shoal.
//!
//! Parameter lookups, scene lifecycle, GPU presentation and the window host
//! each get their own error enum. Out-of-range parameter writes are clamped,
//! never reported, and teardown has no error path at all.

use std::fmt;

/// Errors from the parameter store and parameter definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// The key is not part of the preset's parameter definitions.
    UnknownParameter(String),
    /// A definition violates `min <= default <= max`, `step > 0`, or
    /// repeats a key.
    InvalidDefinition { key: String, reason: String },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::UnknownParameter(key) => write!(f, "Unknown parameter '{}'", key),
            ParameterError::InvalidDefinition { key, reason } => {
                write!(f, "Invalid definition for parameter '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ParameterError {}

/// Errors raised by a scene or its simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A parameter the scene reads is missing or malformed.
    Parameter(ParameterError),
    /// The scene was asked to bind a canvas slot it cannot use.
    InvalidCanvasTarget(String),
    /// The update step produced non-finite entity state.
    InvariantViolation { fish_id: u32, detail: String },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Parameter(e) => write!(f, "{}", e),
            SceneError::InvalidCanvasTarget(msg) => write!(f, "Invalid canvas target: {}", msg),
            SceneError::InvariantViolation { fish_id, detail } => {
                write!(f, "Invariant violated by fish {}: {}", fish_id, detail)
            }
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Parameter(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for SceneError {
    fn from(e: ParameterError) -> Self {
        SceneError::Parameter(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The canvas is larger than the device can render to.
    CanvasTooLarge { width: u32, height: u32, max: u32 },
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. \
                 Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::CanvasTooLarge { width, height, max } => write!(
                f,
                "Canvas {}x{} exceeds the GPU texture limit of {} pixels per side",
                width, height, max
            ),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter | GpuError::CanvasTooLarge { .. } => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors from writing a frame snapshot to disk.
#[derive(Debug)]
pub enum SnapshotError {
    /// Nothing has been drawn yet.
    NoFrame,
    /// Mapping the readback buffer failed.
    Readback(String),
    /// The pixel buffer does not match the canvas dimensions.
    BufferSize { expected: usize, actual: usize },
    /// Encoding or writing the image failed.
    Image(image::ImageError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::NoFrame => write!(f, "No frame has been drawn yet"),
            SnapshotError::Readback(msg) => write!(f, "Failed to read the frame back: {}", msg),
            SnapshotError::BufferSize { expected, actual } => write!(
                f,
                "Canvas buffer holds {} bytes, expected {}",
                actual, expected
            ),
            SnapshotError::Image(e) => write!(f, "Failed to write snapshot: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for SnapshotError {
    fn from(e: image::ImageError) -> Self {
        SnapshotError::Image(e)
    }
}

/// Errors that can occur when running the windowed host.
#[derive(Debug)]
pub enum RunError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The scene failed to start or hit a fatal invariant.
    Scene(SceneError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            RunError::Window(e) => write!(f, "Failed to create window: {}", e),
            RunError::Gpu(e) => write!(f, "GPU error: {}", e),
            RunError::Scene(e) => write!(f, "Scene error: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::EventLoop(e) => Some(e),
            RunError::Window(e) => Some(e),
            RunError::Gpu(e) => Some(e),
            RunError::Scene(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for RunError {
    fn from(e: winit::error::EventLoopError) -> Self {
        RunError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for RunError {
    fn from(e: winit::error::OsError) -> Self {
        RunError::Window(e)
    }
}

impl From<GpuError> for RunError {
    fn from(e: GpuError) -> Self {
        RunError::Gpu(e)
    }
}

impl From<SceneError> for RunError {
    fn from(e: SceneError) -> Self {
        RunError::Scene(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_parameter_converts_to_scene_error() {
        let err: SceneError = ParameterError::UnknownParameter("depth".into()).into();
        assert_eq!(
            err,
            SceneError::Parameter(ParameterError::UnknownParameter("depth".into()))
        );
    }

    #[test]
    fn test_display_messages() {
        let err = SceneError::InvariantViolation {
            fish_id: 3,
            detail: "position is NaN".into(),
        };
        assert_eq!(err.to_string(), "Invariant violated by fish 3: position is NaN");
        assert_eq!(
            ParameterError::UnknownParameter("speed".into()).to_string(),
            "Unknown parameter 'speed'"
        );
    }

    #[test]
    fn test_oversized_canvas_message() {
        let err: RunError = GpuError::CanvasTooLarge {
            width: 9000,
            height: 600,
            max: 8192,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "GPU error: Canvas 9000x600 exceeds the GPU texture limit of 8192 pixels per side"
        );
    }
}
