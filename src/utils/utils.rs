//! Helper functions

use crate::kinematic_traits::{Pose, Solution};

/// Rounds to the given number of decimal digits.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Maps a value from one numeric range into another (affine interpolation).
/// The value is not limited to the input range.
pub fn le_map(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Print joint values of the solution, or the reason why there is none.
pub fn dump_solution(solution: &Solution) {
    match solution {
        Solution::Found(angles) => {
            let row: Vec<String> = angles.named().iter()
                .map(|(name, value)| format!("{}: {:5.2}", name, value))
                .collect();
            println!("[{}]", row.join(", "));
        }
        Solution::NoSolution(reason) => println!("No solution: {}", reason),
    }
}

pub fn dump_pose(pose: &Pose) {
    println!(
        "x: {:.3}, y: {:.3}, z: {:.3}, pitch: {:.3}",
        pose.x, pose.y, pose.z, pose.pitch
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-6.100049, 4), -6.1);
        assert_eq!(round_to(2.0, 2), 2.0);
    }

    #[test]
    fn test_le_map() {
        assert_eq!(le_map(320.0, 0.0, 640.0, 0.0, 1280.0), 640.0);
        assert_eq!(le_map(0.0, 0.0, 480.0, 0.0, 240.0), 0.0);
        assert_eq!(le_map(5.0, 0.0, 10.0, 100.0, 200.0), 150.0);
        // Extrapolates outside the input range
        assert_eq!(le_map(20.0, 0.0, 10.0, 0.0, 1.0), 2.0);
    }
}
