use crate::kinematic_traits::{JointAngles, Kinematics, Pose, Solution, Unreachable};
use crate::parameter_error::ParameterError;
use crate::parameters::armpi::{EndEffector, LinkGeometry, LinkLengths};
use crate::utils::round_to;
use tracing::debug;

/// Feasibility checks are done on values rounded to this many decimal digits.
const FEASIBILITY_DIGITS: i32 = 4;

/// Geometric solver for the 4 DOF arm: base rotation plus three pitch links in the
/// vertical plane that contains the target.
///
/// Points used in the derivation: `A` is the shoulder axis (servo 5), `B` the elbow
/// (servo 4), `C` the wrist (servo 3), `P` the tip of the end effector. `F` is the
/// projection of `C` on the horizontal through `A`.
#[derive(Debug, Clone)]
pub struct ArmKinematics {
    geometry: LinkGeometry,
}

impl ArmKinematics {
    /// Creates a new `ArmKinematics` instance with the given geometry.
    pub fn new(geometry: LinkGeometry) -> Self {
        ArmKinematics { geometry }
    }

    pub fn geometry(&self) -> &LinkGeometry {
        &self.geometry
    }

    pub fn end_effector(&self) -> EndEffector {
        self.geometry.end_effector()
    }

    /// Change link lengths of the same mechanism. Pump derived values are recomputed.
    pub fn set_link_lengths(&mut self, lengths: LinkLengths) -> Result<(), ParameterError> {
        self.geometry.reconfigure(lengths)
    }

    pub fn link_lengths(&self) -> LinkLengths {
        self.geometry.lengths()
    }

    /// Pitch of the last link after removing the pump nozzle offset.
    fn effective_pitch(&self, pitch: f64) -> f64 {
        match self.geometry.end_effector() {
            EndEffector::Pump => pitch - self.geometry.alpha(),
            EndEffector::Claw => pitch,
        }
    }
}

impl Kinematics for ArmKinematics {
    fn inverse(&self, pose: &Pose) -> Solution {
        let g = &self.geometry;
        let (l1, l2, l3, l4) = (g.l1(), g.l2(), g.l3(), g.l4());
        let pitch = self.effective_pitch(pose.pitch);

        let theta6 = pose.y.atan2(pose.x).to_degrees();

        let p_o = pose.horizontal_distance();
        let cd = l4 * pitch.to_radians().cos();
        // Positive for positive pitch, negative otherwise
        let pd = l4 * pitch.to_radians().sin();
        let af = p_o - cd;
        let cf = pose.z - l1 - pd;
        let ac = af.hypot(cf);

        if round_to(cf, FEASIBILITY_DIGITS) < -l1 {
            debug!("Wrist below the base, CF({}) < -l1({})", cf, -l1);
            return Solution::NoSolution(Unreachable::BelowBase { cf });
        }
        if l2 + l3 < round_to(ac, FEASIBILITY_DIGITS) {
            debug!("Cannot close the chain, l2({}) + l3({}) < AC({})", l2, l3, ac);
            return Solution::NoSolution(Unreachable::ChainOpen { ac });
        }

        // Elbow, law of cosines in ABC
        let cos_abc = round_to(-(ac * ac - l2 * l2 - l3 * l3) / (2.0 * l2 * l3), FEASIBILITY_DIGITS);
        if !(cos_abc.abs() <= 1.0) {
            debug!("Degenerate triangle, |cos ABC({})| > 1", cos_abc);
            return Solution::NoSolution(Unreachable::DegenerateTriangle { cosine: cos_abc });
        }
        let abc = cos_abc.acos();
        let theta4 = 180.0 - abc.to_degrees();

        // Shoulder, angle of AC over the horizontal plus the interior angle at A
        let caf = (af / ac).acos();
        let cos_bac = round_to((ac * ac + l2 * l2 - l3 * l3) / (2.0 * l2 * ac), FEASIBILITY_DIGITS);
        if !(cos_bac.abs() <= 1.0) {
            debug!("Degenerate triangle, |cos BAC({})| > 1", cos_bac);
            return Solution::NoSolution(Unreachable::DegenerateTriangle { cosine: cos_bac });
        }
        let zf_flag = if cf < 0.0 { -1.0 } else { 1.0 };
        let theta5 = (caf * zf_flag + cos_bac.acos()).to_degrees();

        let mut theta3 = pitch - theta5 + theta4;
        if g.end_effector() == EndEffector::Pump {
            theta3 += g.alpha();
        }

        Solution::Found(JointAngles { theta3, theta4, theta5, theta6 })
    }

    fn forward(&self, joints: &JointAngles) -> Pose {
        let g = &self.geometry;
        let pitch = joints.theta3 + joints.theta5 - joints.theta4;
        let last_link = self.effective_pitch(pitch).to_radians();
        let upper_arm = joints.theta5.to_radians();
        let forearm = (joints.theta5 - joints.theta4).to_radians();

        let reach = g.l2() * upper_arm.cos() + g.l3() * forearm.cos() + g.l4() * last_link.cos();
        let z = g.l1() + g.l2() * upper_arm.sin() + g.l3() * forearm.sin() + g.l4() * last_link.sin();
        let (sin6, cos6) = joints.theta6.to_radians().sin_cos();

        Pose::new(reach * cos6, reach * sin6, z, pitch)
    }
}
