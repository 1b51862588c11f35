//! Public types shared by the solver and its callers

/// Most pitches a range search tries. One degree steps over a full turn stay well below.
pub const MAX_PITCH_STEPS: usize = 3600;

/// Target of the end effector in the arm base frame. Distances are centimeters,
/// `pitch` is degrees between the end effector and the horizontal plane.
///
/// ```
/// use armpi_kinematics::kinematic_traits::Pose;
///
/// let pose = Pose::new(0.0, 15.0, 5.0, -30.0);
/// assert_eq!(pose.horizontal_distance(), 15.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, pitch: f64) -> Self {
        Pose { x, y, z, pitch }
    }

    /// Same position with a different pitch.
    pub fn with_pitch(&self, pitch: f64) -> Self {
        Pose { pitch, ..*self }
    }

    /// Distance from the base rotation axis, projected on the ground.
    pub fn horizontal_distance(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Joint angles in degrees. Names follow the servo numbering of the arm:
/// servo 3 is the wrist, 4 the elbow, 5 the shoulder and 6 the base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    /// Wrist, relative to the forearm.
    pub theta3: f64,
    /// Elbow deflection from the straight arm. Zero when upper arm and forearm are aligned.
    pub theta4: f64,
    /// Shoulder, upper arm angle above the horizontal.
    pub theta5: f64,
    /// Base rotation, `atan2(y, x)`.
    pub theta6: f64,
}

impl JointAngles {
    /// Interior angle at the elbow between upper arm and forearm. 180° is a fully straight arm.
    pub fn elbow_interior_angle(&self) -> f64 {
        180.0 - self.theta4
    }

    /// Angles keyed by joint name, servo order.
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("theta3", self.theta3),
            ("theta4", self.theta4),
            ("theta5", self.theta5),
            ("theta6", self.theta6),
        ]
    }
}

/// Why a pose cannot be reached. All of these are normal outcomes while searching for a grasp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unreachable {
    /// The wrist would end up below the physical base (`cf < -l1`).
    BelowBase { cf: f64 },
    /// The diagonal between shoulder and wrist is longer than upper arm and forearm together.
    ChainOpen { ac: f64 },
    /// Law of cosines produced a value outside [-1, 1].
    DegenerateTriangle { cosine: f64 },
}

impl std::fmt::Display for Unreachable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Unreachable::BelowBase { cf } =>
                write!(f, "wrist below the base (CF = {:.4})", cf),
            Unreachable::ChainOpen { ac } =>
                write!(f, "links cannot close the chain (AC = {:.4})", ac),
            Unreachable::DegenerateTriangle { cosine } =>
                write!(f, "degenerate link triangle (cos = {:.4})", cosine),
        }
    }
}

/// Result of the inverse kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solution {
    Found(JointAngles),
    NoSolution(Unreachable),
}

impl Solution {
    pub fn is_found(&self) -> bool {
        matches!(self, Solution::Found(_))
    }

    pub fn angles(&self) -> Option<&JointAngles> {
        match self {
            Solution::Found(angles) => Some(angles),
            Solution::NoSolution(_) => None,
        }
    }

    pub fn into_option(self) -> Option<JointAngles> {
        match self {
            Solution::Found(angles) => Some(angles),
            Solution::NoSolution(_) => None,
        }
    }
}

pub trait Kinematics {
    /// Joint angles that place the end effector at the given pose, or the reason why
    /// there are none.
    fn inverse(&self, pose: &Pose) -> Solution;

    /// Pose of the end effector for the given joint angles.
    fn forward(&self, joints: &JointAngles) -> Pose;

    /// Tries pitches from `from` towards `to` in steps of `step` degrees and returns the
    /// first one that is reachable, together with its angles. A range that is not finite
    /// or needs more than [`MAX_PITCH_STEPS`] steps is not searched.
    fn inverse_with_pitch_range(&self, pose: &Pose, from: f64, to: f64, step: f64)
                                -> Option<(f64, JointAngles)> {
        if step <= 0.0 || !step.is_finite() || !from.is_finite() || !to.is_finite() {
            return None;
        }
        let direction = if to >= from { 1.0 } else { -1.0 };
        let steps = ((to - from).abs() / step).floor();
        if steps > MAX_PITCH_STEPS as f64 {
            return None;
        }
        let steps = steps as usize;
        (0..=steps)
            .map(|i| from + direction * step * i as f64)
            .find_map(|pitch| match self.inverse(&pose.with_pitch(pitch)) {
                Solution::Found(angles) => Some((pitch, angles)),
                Solution::NoSolution(_) => None,
            })
    }
}
