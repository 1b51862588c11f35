//! Kinematics, bus servo protocol and camera-to-arm transforms for the Hiwonder ArmPi,
//! a desktop arm with four serial bus servos (base, shoulder, elbow, wrist) and a claw
//! or suction pump end effector.
//!
//! # Features
//!
//! - Geometric inverse kinematics for a target position and gripper pitch. Unreachable
//!   poses are reported as data with the reason (below the base, links too short,
//!   degenerate triangle), never as a panic or an error to log as fatal.
//! - Forward kinematics to cross-check solutions, and a search over a pitch range for the
//!   first reachable pitch.
//! - Pump geometry: the nozzle angle and the effective last link are derived from the
//!   nozzle dimensions and recomputed whenever lengths change.
//! - Bus servo protocol: frame encoding and parsing with checksum, the full command table,
//!   request/response exchange over a half-duplex single-wire link with bounded retries.
//!   Transport faults are classified, logged through `tracing` and turned into absent
//!   results.
//! - Camera transforms: pixel to arm coordinates, lengths to pixels, region of interest
//!   masking, center correction of square objects and the gripper rotation pulse.
//!
//! # Parameters
//!
//! Link lengths are in centimeters, counted from the base: `l1` base to shoulder, `l2`
//! shoulder to elbow, `l3` elbow to wrist, `l4` wrist to the tip of the claw. For the pump,
//! `l5` and `l6` describe the nozzle and `l4` is derived from them. Angles are degrees.
//!
//! ```
//! use armpi_kinematics::kinematic_traits::{Kinematics, Pose};
//! use armpi_kinematics::kinematics_impl::ArmKinematics;
//! use armpi_kinematics::parameters::armpi::LinkGeometry;
//!
//! let arm = ArmKinematics::new(LinkGeometry::claw());
//! let solution = arm.inverse(&Pose::new(0.0, 15.0, 5.0, -30.0));
//! assert!(solution.is_found());
//! ```
//!
//! Geometry and bus settings can be read from YAML (feature `allow_filesystem`, on by
//! default). GPIO direction control of the Raspberry Pi transceiver needs feature `rpi`.

pub mod parameters;
pub mod parameters_robots;
pub mod parameter_error;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod kinematic_traits;
pub mod kinematics_impl;

#[path = "bus_servo/frame.rs"]
pub mod servo_frame;

#[path = "bus_servo/bus_error.rs"]
pub mod bus_error;

#[path = "bus_servo/bus_config.rs"]
pub mod bus_config;

#[path = "bus_servo/port.rs"]
pub mod port;

#[path = "bus_servo/driver.rs"]
pub mod driver;

#[path = "bus_servo/commands.rs"]
pub mod commands;

#[path = "computer_vision/transform_error.rs"]
pub mod transform_error;

#[path = "computer_vision/coordinate_transform.rs"]
pub mod coordinate_transform;

#[path = "computer_vision/calibration_io.rs"]
pub mod calibration_io;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
