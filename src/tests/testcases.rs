#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::Rng;

    use crate::kinematic_traits::{Kinematics, Pose, Solution, Unreachable};
    use crate::kinematics_impl::ArmKinematics;
    use crate::parameters::armpi::{EndEffector, LinkGeometry};
    use crate::tests::test_utils::{self, Expected};
    use crate::utils::{dump_pose, dump_solution};

    const CASES: &str = "src/tests/data/cases.yaml";

    /// Forward kinematics reproduces the target closely but not exactly, because the
    /// triangle cosines are rounded to 4 digits before use.
    const POSITION_TOLERANCE: f64 = 0.02;

    /// Near a straight elbow the rounded cosine moves the wrist by up to a couple of millimeters.
    const SAMPLED_TOLERANCE: f64 = 0.3;

    fn reason_name(reason: &Unreachable) -> &'static str {
        match reason {
            Unreachable::BelowBase { .. } => "below_base",
            Unreachable::ChainOpen { .. } => "chain_open",
            Unreachable::DegenerateTriangle { .. } => "degenerate_triangle",
        }
    }

    #[test]
    fn test_load_yaml() {
        let cases = test_utils::load_cases(CASES).expect("Failed to load or parse the YAML file");
        assert!(!cases.is_empty(), "No cases were loaded from the YAML file");
    }

    #[test]
    fn test_inverse_cases() {
        let cases = test_utils::load_cases(CASES).expect("Failed to load or parse the YAML file");
        println!("Inverse kinematics: {} test cases", cases.len());

        for case in cases.iter() {
            let kinematics = ArmKinematics::new(LinkGeometry::for_end_effector(case.end_effector));
            let solution = kinematics.inverse(&case.pose);
            dump_solution(&solution);

            match (&case.expected, solution) {
                (Expected::Angles(expected), Solution::Found(found)) => {
                    for ((name, e), (_, f)) in expected.named().iter().zip(found.named().iter()) {
                        assert!(
                            (e - f).abs() < 1e-3,
                            "Case {}: {} expected {:.4}, got {:.4}", case.id, name, e, f
                        );
                    }
                }
                (Expected::Unreachable(reason), Solution::NoSolution(found)) => {
                    assert_eq!(reason, reason_name(&found), "Case {}: wrong reason", case.id);
                }
                (expected, found) => {
                    panic!("Case {}: expected {:?}, got {:?}", case.id, expected, found);
                }
            }
        }
    }

    #[test]
    fn test_forward_matches_inverse() {
        let cases = test_utils::load_cases(CASES).expect("Failed to load or parse the YAML file");

        for case in cases.iter() {
            let kinematics = ArmKinematics::new(LinkGeometry::for_end_effector(case.end_effector));
            if let Solution::Found(angles) = kinematics.inverse(&case.pose) {
                let pose = kinematics.forward(&angles);
                dump_pose(&pose);
                assert_abs_diff_eq!(pose.x, case.pose.x, epsilon = POSITION_TOLERANCE);
                assert_abs_diff_eq!(pose.y, case.pose.y, epsilon = POSITION_TOLERANCE);
                assert_abs_diff_eq!(pose.z, case.pose.z, epsilon = POSITION_TOLERANCE);
                assert_abs_diff_eq!(pose.pitch, case.pose.pitch, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_fully_extended_vertical() {
        let geometry = LinkGeometry::claw();
        let kinematics = ArmKinematics::new(geometry);
        let top = geometry.l1() + geometry.l2() + geometry.l3() + geometry.l4();

        let angles = kinematics.inverse(&Pose::new(0.0, 0.0, top, 90.0))
            .into_option()
            .expect("Straight up must be reachable");
        assert_abs_diff_eq!(angles.elbow_interior_angle(), 180.0, epsilon = 1e-6);
        assert_abs_diff_eq!(angles.theta6, 0.0, epsilon = 1e-9);

        let beyond = kinematics.inverse(&Pose::new(0.0, 0.0, top + 1.0, 90.0));
        assert!(matches!(beyond, Solution::NoSolution(Unreachable::ChainOpen { .. })));
    }

    /// Random poses: whenever inverse finds angles, forward must bring back the pose.
    #[test]
    fn test_random_round_trip() {
        let mut rng = rand::thread_rng();
        for end_effector in [EndEffector::Claw, EndEffector::Pump] {
            let kinematics = ArmKinematics::new(LinkGeometry::for_end_effector(end_effector));
            let mut solved = 0;
            for _ in 0..500 {
                let pose = Pose::new(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(5.0..25.0),
                    rng.gen_range(-2.0..15.0),
                    rng.gen_range(-90.0..0.0),
                );
                if let Solution::Found(angles) = kinematics.inverse(&pose) {
                    solved += 1;
                    let back = kinematics.forward(&angles);
                    assert_abs_diff_eq!(back.x, pose.x, epsilon = SAMPLED_TOLERANCE);
                    assert_abs_diff_eq!(back.y, pose.y, epsilon = SAMPLED_TOLERANCE);
                    assert_abs_diff_eq!(back.z, pose.z, epsilon = SAMPLED_TOLERANCE);
                    assert_abs_diff_eq!(back.pitch, pose.pitch, epsilon = 1e-9);
                }
            }
            assert!(solved > 0, "No reachable pose sampled for {:?}", end_effector);
        }
    }
}
