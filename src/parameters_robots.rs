//! Hardcoded link geometry for the stock ArmPi end effectors

pub mod armpi {
    use crate::parameters::armpi::{EndEffector, LinkGeometry, LinkLengths};

    impl LinkGeometry {
        fn preset(end_effector: EndEffector) -> Self {
            let mut geometry = LinkGeometry {
                end_effector,
                lengths: LinkLengths::default(),
                alpha: 0.0,
            };
            geometry.derive();
            geometry
        }

        /// Mechanical claw. `l4` is measured to the tip of the fully closed claw.
        pub fn claw() -> Self {
            Self::preset(EndEffector::Claw)
        }

        /// Suction pump. `l4` and the nozzle angle come from `l5` and `l6`.
        pub fn pump() -> Self {
            Self::preset(EndEffector::Pump)
        }

        pub fn for_end_effector(end_effector: EndEffector) -> Self {
            Self::preset(end_effector)
        }
    }

    impl Default for LinkGeometry {
        fn default() -> Self {
            Self::claw()
        }
    }
}
