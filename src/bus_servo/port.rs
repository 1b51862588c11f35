//! Half-duplex transport under the servo driver
//!
//! The servos share one signal wire for both directions. A transceiver in front of the
//! UART is switched between transmit and receive, on the ArmPi board through two GPIO
//! lines (TX_CON and RX_CON). USB adapters with automatic direction need no switching.

use std::io;
use std::time::Duration;

use serial2::SerialPort;

use crate::bus_config::BusConfig;

/// Which way the single wire is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusDirection {
    Transmit,
    Receive,
}

/// Byte level access to the bus, including the direction switch.
pub trait HalfDuplexPort {
    fn set_direction(&mut self, direction: BusDirection) -> io::Result<()>;

    /// Sends the whole frame.
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Drops everything already received (stale answers, echo of our own request).
    fn discard_input(&mut self) -> io::Result<()>;

    /// Reads what arrived, waiting no longer than the port read timeout. Returns `Ok(0)`
    /// or a `TimedOut` error when nothing came.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Switches the transceiver direction.
pub trait DirectionControl {
    fn set(&mut self, direction: BusDirection) -> io::Result<()>;
}

/// For transceivers that switch direction by themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoDirection;

impl DirectionControl for AutoDirection {
    fn set(&mut self, _direction: BusDirection) -> io::Result<()> {
        Ok(())
    }
}

/// Direction switching through the TX_CON / RX_CON GPIO lines of a Raspberry Pi.
#[cfg(feature = "rpi")]
pub struct GpioDirection {
    tx_con: rppal::gpio::OutputPin,
    rx_con: rppal::gpio::OutputPin,
}

#[cfg(feature = "rpi")]
impl GpioDirection {
    /// Pins use BCM numbering. The line starts in transmit mode.
    pub fn new(tx_pin: u8, rx_pin: u8) -> io::Result<Self> {
        let gpio = rppal::gpio::Gpio::new().map_err(io::Error::other)?;
        let mut rx_con = gpio.get(rx_pin).map_err(io::Error::other)?.into_output();
        rx_con.set_low();
        let mut tx_con = gpio.get(tx_pin).map_err(io::Error::other)?.into_output();
        tx_con.set_high();
        Ok(GpioDirection { tx_con, rx_con })
    }
}

#[cfg(feature = "rpi")]
impl DirectionControl for GpioDirection {
    fn set(&mut self, direction: BusDirection) -> io::Result<()> {
        match direction {
            BusDirection::Transmit => {
                self.tx_con.set_high();
                self.rx_con.set_low();
            }
            BusDirection::Receive => {
                self.rx_con.set_high();
                self.tx_con.set_low();
            }
        }
        Ok(())
    }
}

/// Serial port plus direction control.
pub struct SerialBus<D: DirectionControl> {
    port: SerialPort,
    direction: D,
}

impl<D: DirectionControl> SerialBus<D> {
    /// Opens the device named in the configuration, with its baud rate and read timeout.
    pub fn open(config: &BusConfig, mut direction: D) -> io::Result<Self> {
        let mut port = SerialPort::open(&config.device, config.baud_rate)?;
        port.set_read_timeout(config.read_timeout)?;
        direction.set(BusDirection::Transmit)?;
        Ok(SerialBus { port, direction })
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port.set_read_timeout(timeout)
    }
}

impl<D: DirectionControl> HalfDuplexPort for SerialBus<D> {
    fn set_direction(&mut self, direction: BusDirection) -> io::Result<()> {
        self.direction.set(direction)
    }

    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.port.discard_input_buffer()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}
