//! Camera pixels to arm coordinates
//!
//! The camera looks down at the table in front of the arm. Pixel coordinates are first
//! rescaled to the 640x480 reference resolution the calibration was made at, then
//! centered and multiplied by the calibration scale (cm per reference pixel). The image
//! center lies 20 cm in front of the arm base along Y.
//!
//! Detections are rotated rectangles as produced by a min-area-rectangle fit. Their
//! corners give a region of interest; the corner nearest the image center together with
//! the known side of the (square) object gives a better estimate of the object center
//! than the rectangle center, which is biased by perspective.

use image::{Rgb, RgbImage};
use nalgebra::Point2;

use crate::transform_error::TransformError;
use crate::utils::{le_map, round_to};

/// Resolution the calibration scale refers to.
pub const REFERENCE_WIDTH: f64 = 640.0;
pub const REFERENCE_HEIGHT: f64 = 480.0;

/// Distance from the arm base to the point under the image center, cm.
pub const IMAGE_CENTER_DISTANCE: f64 = 20.0;

/// Padding kept around the region of interest when masking, pixels.
pub const MASK_PADDING: i32 = 10;

/// Servo pulse units per degree of gripper rotation (1000 over 240°).
const PULSE_PER_DEGREE: f64 = 1000.0 / 240.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self, TransformError> {
        if width == 0 || height == 0 {
            return Err(TransformError::ZeroResolution { width, height });
        }
        Ok(ImageSize { width, height })
    }

    /// Size of the given frame.
    pub fn of(frame: &RgbImage) -> Result<Self, TransformError> {
        ImageSize::new(frame.width(), frame.height())
    }
}

/// Centimeters per pixel at the reference resolution, produced by camera calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationScale(f64);

impl CalibrationScale {
    pub fn new(cm_per_pixel: f64) -> Result<Self, TransformError> {
        if !cm_per_pixel.is_finite() || cm_per_pixel <= 0.0 {
            return Err(TransformError::InvalidScale(cm_per_pixel));
        }
        Ok(CalibrationScale(cm_per_pixel))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Axis aligned extents of a detection, pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

/// Extents of the four corners of a rotated rectangle.
pub fn get_roi(corners: &[Point2<i32>; 4]) -> Roi {
    let xs = || corners.iter().map(|p| p.x);
    let ys = || corners.iter().map(|p| p.y);
    Roi {
        x_min: xs().min().unwrap_or_default(),
        x_max: xs().max().unwrap_or_default(),
        y_min: ys().min().unwrap_or_default(),
        y_max: ys().max().unwrap_or_default(),
    }
}

/// Rotated rectangle of a detection: center and size in pixels, angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: Point2<f64>,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl RotatedRect {
    pub fn new(center: Point2<f64>, width: f64, height: f64, angle: f64) -> Self {
        RotatedRect { center, width, height, angle }
    }

    /// Corners, truncated to whole pixels. Opposite corners are at indices 0/2 and 1/3.
    pub fn box_points(&self) -> [Point2<i32>; 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (a, b) = (sin * 0.5, cos * 0.5);
        let (cx, cy) = (self.center.x, self.center.y);

        let p0 = Point2::new(cx - a * self.height - b * self.width, cy + b * self.height - a * self.width);
        let p1 = Point2::new(cx + a * self.height - b * self.width, cy - b * self.height - a * self.width);
        let p2 = Point2::new(2.0 * cx - p0.x, 2.0 * cy - p0.y);
        let p3 = Point2::new(2.0 * cx - p1.x, 2.0 * cy - p1.y);

        [p0, p1, p2, p3].map(|p| Point2::new(p.x.trunc() as i32, p.y.trunc() as i32))
    }

    pub fn roi(&self) -> Roi {
        get_roi(&self.box_points())
    }
}

/// Pixel/world conversions for one calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    scale: CalibrationScale,
}

impl CameraTransform {
    pub fn new(scale: CalibrationScale) -> Self {
        CameraTransform { scale }
    }

    pub fn scale(&self) -> CalibrationScale {
        self.scale
    }

    /// Pixel position to arm coordinates (cm), rounded to 2 decimals.
    pub fn pixel_to_world(&self, x: f64, y: f64, size: ImageSize) -> (f64, f64) {
        let x = le_map(x, 0.0, size.width as f64, 0.0, REFERENCE_WIDTH) - REFERENCE_WIDTH / 2.0;
        let y = REFERENCE_HEIGHT / 2.0 - le_map(y, 0.0, size.height as f64, 0.0, REFERENCE_HEIGHT);
        (
            round_to(x * self.scale.0, 2),
            round_to(y * self.scale.0 + IMAGE_CENTER_DISTANCE, 2),
        )
    }

    /// Arm coordinates (cm) to the pixel position they are seen at.
    pub fn world_to_pixel(&self, x: f64, y: f64, size: ImageSize) -> (f64, f64) {
        let x = x / self.scale.0 + REFERENCE_WIDTH / 2.0;
        let y = REFERENCE_HEIGHT / 2.0 - (y - IMAGE_CENTER_DISTANCE) / self.scale.0;
        (
            le_map(x, 0.0, REFERENCE_WIDTH, 0.0, size.width as f64),
            le_map(y, 0.0, REFERENCE_HEIGHT, 0.0, size.height as f64),
        )
    }

    /// Length on the table (cm) as a pixel span at the given resolution.
    pub fn length_to_pixels(&self, length: f64, size: ImageSize) -> f64 {
        let reference = round_to(length / self.scale.0, 2);
        le_map(reference, 0.0, REFERENCE_WIDTH, 0.0, size.width as f64)
    }

    /// Center of a square object of side `square_length` (cm), estimated from the corner
    /// of its region of interest nearest the image center. Rounded to 2 decimals.
    pub fn get_center(&self, rect: &RotatedRect, roi: &Roi, size: ImageSize, square_length: f64) -> (f64, f64) {
        let right = rect.center.x >= size.width as f64 / 2.0;
        let lower = rect.center.y >= size.height as f64 / 2.0;
        let x = (if right { roi.x_max } else { roi.x_min }) as f64;
        let y = (if lower { roi.y_max } else { roi.y_min }) as f64;

        let diagonal = square_length / std::f64::consts::FRAC_PI_4.cos();
        let half = self.length_to_pixels(diagonal, size) / 2.0;

        let rotation = rect.angle.abs();
        let dx = (45.0 - rotation).to_radians().cos().abs();
        let dy = (45.0 + rotation).to_radians().sin().abs();

        let x = if right { x - half * dx } else { x + half * dx };
        let y = if lower { y - half * dy } else { y + half * dy };
        (round_to(x, 2), round_to(y, 2))
    }
}

/// Copy of `frame` that is black outside the padded region of interest.
pub fn mask_roi(frame: &RgbImage, roi: &Roi, size: ImageSize) -> Result<RgbImage, TransformError> {
    if frame.dimensions() != (size.width, size.height) {
        return Err(TransformError::FrameSizeMismatch {
            expected: (size.width, size.height),
            found: frame.dimensions(),
        });
    }
    let x_min = (roi.x_min - MASK_PADDING).max(0) as u32;
    let y_min = (roi.y_min - MASK_PADDING).max(0) as u32;
    let x_max = (roi.x_max + MASK_PADDING).clamp(0, size.width as i32) as u32;
    let y_max = (roi.y_max + MASK_PADDING).clamp(0, size.height as i32) as u32;

    let mut masked = RgbImage::from_pixel(size.width, size.height, Rgb([0, 0, 0]));
    for y in y_min..y_max {
        for x in x_min..x_max {
            masked.put_pixel(x, y, *frame.get_pixel(x, y));
        }
    }
    Ok(masked)
}

/// Servo pulse for a gripper rotation in degrees: 500 at 0°, ±500 over ±120°, clamped to
/// the servo range.
pub fn angle_to_pulse(angle: f64) -> u16 {
    let pulse = 500.0 + (angle * PULSE_PER_DEGREE).round_ties_even();
    pulse.clamp(0.0, 1000.0) as u16
}

/// Gripper rotation pulse that aligns the gripper with an object at (x, y) (cm, arm
/// frame) whose detection is rotated by `angle` degrees.
///
/// The gripper is square to the object at two rotations 90° apart; the one needing less
/// rotation is chosen.
pub fn grasp_pulse(x: f64, y: f64, angle: f64) -> u16 {
    let bearing = round_to(x.abs().atan2(y.abs()).to_degrees(), 1);
    let angle = angle.abs();

    let first = match (x < 0.0, y < 0.0) {
        (true, true) => -(90.0 + bearing - angle),
        (true, false) => bearing - angle,
        (false, true) => bearing + angle,
        (false, false) => 90.0 - bearing - angle,
    };
    let second = if first > 0.0 { first - 90.0 } else { first + 90.0 };

    angle_to_pulse(if first.abs() < second.abs() { first } else { second })
}
