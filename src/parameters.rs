//! Defines the link geometry data structure

pub mod armpi {
    use crate::parameter_error::ParameterError;

    /// Gripper mounted after the wrist servo. The suction pump sits at an angle to the
    /// wrist link, so it shifts the pitch the solver works with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum EndEffector {
        /// Mechanical claw, the last link is straight.
        Claw,
        /// Suction nozzle, the last link is the hypotenuse of `l5` and `l6`.
        Pump,
    }

    impl EndEffector {
        pub fn name(&self) -> &'static str {
            match self {
                EndEffector::Claw => "claw",
                EndEffector::Pump => "pump",
            }
        }

        pub fn from_name(name: &str) -> Result<Self, ParameterError> {
            match name.trim().to_ascii_lowercase().as_str() {
                "claw" | "arm" => Ok(EndEffector::Claw),
                "pump" => Ok(EndEffector::Pump),
                other => Err(ParameterError::UnknownEndEffector(other.to_string())),
            }
        }
    }

    /// Raw link lengths in centimeters, counting servos from the base up.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct LinkLengths {
        /// From the chassis center to the axis of the second servo.
        pub l1: f64,

        /// From the second servo to the third servo.
        pub l2: f64,

        /// From the third servo to the fourth (wrist) servo.
        pub l3: f64,

        /// From the wrist servo to the tip of the end effector. Ignored for the pump,
        /// where it is derived from `l5` and `l6`.
        pub l4: f64,

        /// Pump only: from the wrist servo to the top of the nozzle.
        pub l5: f64,

        /// Pump only: from the top of the nozzle to its tip.
        pub l6: f64,
    }

    impl Default for LinkLengths {
        fn default() -> Self {
            LinkLengths {
                l1: 6.10,
                l2: 10.16,
                l3: 9.64,
                l4: 16.65,
                l5: 4.70,
                l6: 4.46,
            }
        }
    }

    impl LinkLengths {
        fn validate(&self) -> Result<(), ParameterError> {
            for (name, value) in [
                ("l1", self.l1), ("l2", self.l2), ("l3", self.l3),
                ("l4", self.l4), ("l5", self.l5), ("l6", self.l6),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ParameterError::NonPositiveLength { name, value });
                }
            }
            Ok(())
        }
    }

    /// Geometry of the arm as used by the solver. Derived quantities (pump `l4` and
    /// `alpha`) are recomputed every time the lengths change, so they never go stale.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct LinkGeometry {
        pub(crate) end_effector: EndEffector,
        pub(crate) lengths: LinkLengths,
        /// Angle between the pump nozzle and the wrist link, degrees. Zero for the claw.
        pub(crate) alpha: f64,
    }

    impl LinkGeometry {
        /// Builds geometry for the given end effector. All lengths must be positive.
        pub fn new(end_effector: EndEffector, lengths: LinkLengths) -> Result<Self, ParameterError> {
            lengths.validate()?;
            let mut geometry = LinkGeometry { end_effector, lengths, alpha: 0.0 };
            geometry.derive();
            Ok(geometry)
        }

        /// Replace the link lengths, keeping the end effector. Derived values follow.
        pub fn reconfigure(&mut self, lengths: LinkLengths) -> Result<(), ParameterError> {
            lengths.validate()?;
            self.lengths = lengths;
            self.derive();
            Ok(())
        }

        pub(crate) fn derive(&mut self) {
            match self.end_effector {
                EndEffector::Pump => {
                    let LinkLengths { l5, l6, .. } = self.lengths;
                    self.lengths.l4 = l5.hypot(l6);
                    self.alpha = (l6 / l5).atan().to_degrees();
                }
                EndEffector::Claw => {
                    self.alpha = 0.0;
                }
            }
        }

        pub fn end_effector(&self) -> EndEffector {
            self.end_effector
        }

        /// Currently active lengths, with `l4` as effectively used by the solver.
        pub fn lengths(&self) -> LinkLengths {
            self.lengths
        }

        pub fn l1(&self) -> f64 { self.lengths.l1 }
        pub fn l2(&self) -> f64 { self.lengths.l2 }
        pub fn l3(&self) -> f64 { self.lengths.l3 }
        pub fn l4(&self) -> f64 { self.lengths.l4 }

        /// Pump nozzle offset angle in degrees, zero for the claw.
        pub fn alpha(&self) -> f64 {
            self.alpha
        }

        /// Convert to string yaml representation (quick viewing, etc).
        pub fn to_yaml(&self) -> String {
            let l = &self.lengths;
            format!(
                "armpi_link_geometry:\n  \
              end_effector: {}\n  \
              l1: {}\n  \
              l2: {}\n  \
              l3: {}\n  \
              l4: {}\n  \
              l5: {}\n  \
              l6: {}\n",
                self.end_effector.name(),
                l.l1, l.l2, l.l3, l.l4, l.l5, l.l6
            )
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_pump_derives_l4_and_alpha() {
            let pump = LinkGeometry::new(EndEffector::Pump, LinkLengths::default()).unwrap();
            assert!((pump.l4() - 4.70_f64.hypot(4.46)).abs() < 1e-12);
            assert!((pump.alpha() - 43.4991).abs() < 1e-3);
        }

        #[test]
        fn test_reconfigure_recomputes_alpha() {
            let mut pump = LinkGeometry::new(EndEffector::Pump, LinkLengths::default()).unwrap();
            pump.reconfigure(LinkLengths { l5: 5.0, l6: 5.0, ..LinkLengths::default() }).unwrap();
            assert!((pump.alpha() - 45.0).abs() < 1e-9);
            assert!((pump.l4() - 50.0_f64.sqrt()).abs() < 1e-9);
        }

        #[test]
        fn test_claw_keeps_l4() {
            let claw = LinkGeometry::new(EndEffector::Claw, LinkLengths::default()).unwrap();
            assert_eq!(claw.l4(), 16.65);
            assert_eq!(claw.alpha(), 0.0);
        }

        #[test]
        fn test_non_positive_length_rejected() {
            let bad = LinkLengths { l2: 0.0, ..LinkLengths::default() };
            assert!(matches!(
                LinkGeometry::new(EndEffector::Claw, bad),
                Err(ParameterError::NonPositiveLength { name: "l2", .. })
            ));

            let mut claw = LinkGeometry::new(EndEffector::Claw, LinkLengths::default()).unwrap();
            let nan = LinkLengths { l3: f64::NAN, ..LinkLengths::default() };
            assert!(claw.reconfigure(nan).is_err());
            // Failed reconfiguration leaves the geometry untouched
            assert_eq!(claw.l3(), 9.64);
        }

        #[test]
        fn test_end_effector_names() {
            assert_eq!(EndEffector::from_name("Pump").unwrap(), EndEffector::Pump);
            assert_eq!(EndEffector::from_name("arm").unwrap(), EndEffector::Claw);
            assert!(EndEffector::from_name("magnet").is_err());
        }
    }
}
