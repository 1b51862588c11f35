#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::bus_config::{BusConfig, BusTiming};
    use crate::parameter_error::ParameterError;
    use crate::parameters::armpi::{EndEffector, LinkGeometry, LinkLengths};

    const READ_ERROR: &'static str = "Failed to load parameters from file";

    #[test]
    fn test_geometry_from_yaml() {
        let filename = "src/tests/data/armpi_pump.yaml";
        let loaded = LinkGeometry::from_yaml_file(filename).expect(READ_ERROR);

        assert_eq!(loaded, LinkGeometry::pump());
        assert_eq!(loaded.end_effector(), EndEffector::Pump);
        assert!((loaded.alpha() - 43.4991).abs() < 1e-3);
    }

    #[test]
    fn test_geometry_defaults_and_integers() {
        let filename = "src/tests/data/armpi_claw.yaml";
        let loaded = LinkGeometry::from_yaml_file(filename).expect(READ_ERROR);

        let expected = LinkLengths { l3: 10.0, ..LinkLengths::default() };
        assert_eq!(loaded.lengths(), expected);
        assert_eq!(loaded.alpha(), 0.0);
    }

    #[test]
    fn test_geometry_to_yaml_and_back() {
        let mut geometry = LinkGeometry::pump();
        geometry.reconfigure(LinkLengths { l5: 5.0, l6: 5.0, ..LinkLengths::default() }).unwrap();
        let loaded = LinkGeometry::from_yaml_str(&geometry.to_yaml()).expect(READ_ERROR);
        assert_eq!(loaded, geometry);
    }

    #[test]
    fn test_geometry_errors() {
        assert!(matches!(
            LinkGeometry::from_yaml_file("src/tests/data/bad_length.yaml"),
            Err(ParameterError::NonPositiveLength { name: "l2", .. })
        ));
        assert!(matches!(
            LinkGeometry::from_yaml_file("src/tests/data/missing.yaml"),
            Err(ParameterError::IoError(_))
        ));
        assert!(matches!(
            LinkGeometry::from_yaml_str("armpi_link_geometry:\n  l1: 6.1\n"),
            Err(ParameterError::MissingField(_))
        ));
        assert!(matches!(
            LinkGeometry::from_yaml_str("armpi_link_geometry:\n  end_effector: magnet\n"),
            Err(ParameterError::UnknownEndEffector(_))
        ));
        assert!(matches!(
            LinkGeometry::from_yaml_str("armpi_link_geometry:\n  end_effector: claw\n  l1: long\n"),
            Err(ParameterError::ParseError(_))
        ));
        assert!(matches!(
            LinkGeometry::from_yaml_str("bus_servo:\n  baud_rate: 9600\n"),
            Err(ParameterError::MissingField(_))
        ));
    }

    #[test]
    fn test_bus_config_from_yaml() {
        let filename = "src/tests/data/armpi_pump.yaml";
        let loaded = BusConfig::from_yaml_file(filename).expect(READ_ERROR);

        let expected = BusConfig {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(20),
            timing: BusTiming {
                request_gap: Duration::from_micros(500),
                settle_delay: Duration::from_millis(2),
                retry_limit: 20,
            },
            tx_pin: 17,
            rx_pin: 18,
        };
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_bus_config_defaults() {
        let loaded = BusConfig::from_yaml_str("bus_servo:\n  baud_rate: 9600\n").expect(READ_ERROR);
        assert_eq!(loaded, BusConfig { baud_rate: 9600, ..BusConfig::default() });
    }

    #[test]
    fn test_bus_config_errors() {
        assert!(matches!(
            BusConfig::from_yaml_str("bus_servo:\n  tx_pin: 4\n"),
            Err(ParameterError::InvalidBusSetting(_))
        ));
        assert!(matches!(
            BusConfig::from_yaml_str("bus_servo:\n  tx_pin: 300\n"),
            Err(ParameterError::ParseError(_))
        ));
        assert!(matches!(
            BusConfig::from_yaml_str("bus_servo:\n  retry_limit: -1\n"),
            Err(ParameterError::ParseError(_))
        ));
        assert!(matches!(
            BusConfig::from_yaml_file("src/tests/data/armpi_claw.yaml"),
            Err(ParameterError::MissingField(_))
        ));
    }
}
