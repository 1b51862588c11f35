//! Supports loading link geometry and bus settings from YAML file (optional)

use std::path::Path;
use std::time::Duration;

use yaml_rust2::{Yaml, YamlLoader};

use crate::bus_config::{BusConfig, BusTiming};
use crate::parameter_error::ParameterError;
use crate::parameters::armpi::{EndEffector, LinkGeometry, LinkLengths};

const GEOMETRY_KEY: &str = "armpi_link_geometry";
const BUS_KEY: &str = "bus_servo";

fn load_document(contents: &str) -> Result<Yaml, ParameterError> {
    let mut docs = YamlLoader::load_from_str(contents)
        .map_err(|e| ParameterError::ParseError(e.to_string()))?;
    if docs.is_empty() {
        return Err(ParameterError::ParseError("YAML document is empty".into()));
    }
    Ok(docs.swap_remove(0))
}

fn section<'a>(doc: &'a Yaml, key: &str) -> Result<&'a Yaml, ParameterError> {
    let section = &doc[key];
    if section.is_badvalue() {
        return Err(ParameterError::MissingField(key.to_string()));
    }
    Ok(section)
}

/// Number under `key`, `None` if absent. Integers are accepted where reals are expected.
fn read_f64(section: &Yaml, key: &str) -> Result<Option<f64>, ParameterError> {
    match &section[key] {
        Yaml::BadValue => Ok(None),
        Yaml::Real(s) => s.parse::<f64>().map(Some).map_err(|_| {
            ParameterError::ParseError(format!("'{}' is not a number: {}", key, s))
        }),
        Yaml::Integer(i) => Ok(Some(*i as f64)),
        other => Err(ParameterError::ParseError(format!("'{}' is not a number: {:?}", key, other))),
    }
}

fn read_u64(section: &Yaml, key: &str) -> Result<Option<u64>, ParameterError> {
    match &section[key] {
        Yaml::BadValue => Ok(None),
        Yaml::Integer(i) if *i >= 0 => Ok(Some(*i as u64)),
        other => Err(ParameterError::ParseError(format!(
            "'{}' must be a non-negative integer, got {:?}", key, other
        ))),
    }
}

fn read_narrow<T: TryFrom<u64>>(section: &Yaml, key: &str) -> Result<Option<T>, ParameterError> {
    match read_u64(section, key)? {
        None => Ok(None),
        Some(value) => T::try_from(value)
            .map(Some)
            .map_err(|_| ParameterError::ParseError(format!("'{}' is out of range: {}", key, value))),
    }
}

impl LinkGeometry {
    /// Read the arm geometry from YAML file. YAML file like this is supported:
    /// ```yaml
    /// armpi_link_geometry:
    ///   end_effector: pump
    ///   l1: 6.10
    ///   l2: 10.16
    ///   l3: 9.64
    ///   l4: 16.65
    ///   l5: 4.70
    ///   l6: 4.46
    /// ```
    /// `end_effector` is required, lengths that are not given keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let doc = load_document(contents)?;
        let section = section(&doc, GEOMETRY_KEY)?;

        let end_effector = section["end_effector"]
            .as_str()
            .ok_or_else(|| ParameterError::MissingField("end_effector".into()))
            .and_then(EndEffector::from_name)?;

        let defaults = LinkLengths::default();
        let lengths = LinkLengths {
            l1: read_f64(section, "l1")?.unwrap_or(defaults.l1),
            l2: read_f64(section, "l2")?.unwrap_or(defaults.l2),
            l3: read_f64(section, "l3")?.unwrap_or(defaults.l3),
            l4: read_f64(section, "l4")?.unwrap_or(defaults.l4),
            l5: read_f64(section, "l5")?.unwrap_or(defaults.l5),
            l6: read_f64(section, "l6")?.unwrap_or(defaults.l6),
        };
        LinkGeometry::new(end_effector, lengths)
    }
}

impl BusConfig {
    /// Read the bus settings from the `bus_servo` section of a YAML file:
    /// ```yaml
    /// bus_servo:
    ///   device: /dev/ttyAMA0
    ///   baud_rate: 115200
    ///   read_timeout_ms: 10
    ///   request_gap_us: 340
    ///   settle_delay_ms: 5
    ///   retry_limit: 50
    ///   tx_pin: 27
    ///   rx_pin: 4
    /// ```
    /// Every field is optional and defaults to the ArmPi board values. The result is validated.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let doc = load_document(contents)?;
        let section = section(&doc, BUS_KEY)?;
        let defaults = BusConfig::default();

        let device = match &section["device"] {
            Yaml::BadValue => defaults.device,
            Yaml::String(s) => s.clone(),
            other => {
                return Err(ParameterError::ParseError(format!("'device' must be a path, got {:?}", other)));
            }
        };

        let timing = BusTiming {
            request_gap: read_u64(section, "request_gap_us")?
                .map(Duration::from_micros)
                .unwrap_or(defaults.timing.request_gap),
            settle_delay: read_u64(section, "settle_delay_ms")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.timing.settle_delay),
            retry_limit: read_narrow(section, "retry_limit")?.unwrap_or(defaults.timing.retry_limit),
        };

        let config = BusConfig {
            device,
            baud_rate: read_narrow(section, "baud_rate")?.unwrap_or(defaults.baud_rate),
            read_timeout: read_u64(section, "read_timeout_ms")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.read_timeout),
            timing,
            tx_pin: read_narrow(section, "tx_pin")?.unwrap_or(defaults.tx_pin),
            rx_pin: read_narrow(section, "rx_pin")?.unwrap_or(defaults.rx_pin),
        };
        config.validate()?;
        Ok(config)
    }
}
