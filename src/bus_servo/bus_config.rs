//! Serial bus settings and half-duplex timing
//!
//! The defaults match the ArmPi expansion board. Timing was tuned for its transceiver;
//! other hardware may need different values, hence everything here is configurable.

use std::time::Duration;

use crate::parameter_error::ParameterError;

/// Timing of a read exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusTiming {
    /// Pause after sending a read request, before the line is turned around.
    pub request_gap: Duration,

    /// Wait after switching to receive, before looking at the input buffer.
    pub settle_delay: Duration,

    /// How many request/response exchanges a polling read makes before giving up.
    pub retry_limit: usize,
}

impl Default for BusTiming {
    fn default() -> Self {
        BusTiming {
            request_gap: Duration::from_micros(340),
            settle_delay: Duration::from_millis(5),
            retry_limit: 50,
        }
    }
}

impl BusTiming {
    /// No delays at all, for transports that do not need line turnaround (and for tests).
    pub fn immediate(retry_limit: usize) -> Self {
        BusTiming {
            request_gap: Duration::ZERO,
            settle_delay: Duration::ZERO,
            retry_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusConfig {
    /// Serial device, `/dev/ttyAMA0` on the Raspberry Pi.
    pub device: String,

    pub baud_rate: u32,

    /// Upper bound for a single read from the port.
    pub read_timeout: Duration,

    pub timing: BusTiming,

    /// BCM number of the TX_CON line (high while transmitting).
    pub tx_pin: u8,

    /// BCM number of the RX_CON line (high while receiving).
    pub rx_pin: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            device: "/dev/ttyAMA0".to_string(),
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(10),
            timing: BusTiming::default(),
            tx_pin: 27,
            rx_pin: 4,
        }
    }
}

impl BusConfig {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.device.trim().is_empty() {
            return Err(ParameterError::InvalidBusSetting("device path is empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(ParameterError::InvalidBusSetting("baud rate must be positive".into()));
        }
        if self.timing.retry_limit == 0 {
            return Err(ParameterError::InvalidBusSetting("retry limit must be at least 1".into()));
        }
        if self.tx_pin == self.rx_pin {
            return Err(ParameterError::InvalidBusSetting(format!(
                "TX_CON and RX_CON cannot share pin {}", self.tx_pin
            )));
        }
        Ok(())
    }
}
