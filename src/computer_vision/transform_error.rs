//! Rejected inputs of the camera-to-arm transforms

#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Image width or height is zero.
    ZeroResolution { width: u32, height: u32 },
    /// Calibration scale must be finite and positive.
    InvalidScale(f64),
    /// The frame does not have the resolution it was announced with.
    FrameSizeMismatch { expected: (u32, u32), found: (u32, u32) },
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            TransformError::ZeroResolution { width, height } =>
                write!(f, "Image resolution {}x{} has a zero dimension", width, height),
            TransformError::InvalidScale(scale) =>
                write!(f, "Calibration scale {} is not a positive finite number", scale),
            TransformError::FrameSizeMismatch { expected, found } =>
                write!(f, "Frame is {}x{}, expected {}x{}", found.0, found.1, expected.0, expected.1),
        }
    }
}

impl std::error::Error for TransformError {}
