//! Request/response exchange with bus servos
//!
//! One frame is on the wire at a time. The driver owns the port, so exclusive access
//! follows from `&mut self`; threads share a driver through [`SharedBus`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::sleep;

use tracing::{debug, warn};

use crate::bus_config::BusTiming;
use crate::bus_error::BusError;
use crate::port::{BusDirection, HalfDuplexPort};
use crate::servo_frame::{CommandCode, FrameData, ReadValue, ServoFrame, ServoId, FRAME_HEADER};

/// Bytes collected while looking for a response before the attempt is abandoned.
const MAX_RESPONSE_BYTES: usize = 64;

/// Driver shared between threads. The mutex is the single critical section of the bus.
pub type SharedBus<P> = Arc<Mutex<BusServoDriver<P>>>;

/// Last move sent to a servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandedMove {
    pub pulse: u16,
    pub time_ms: u16,
}

/// Last telemetry received from a servo. Fields stay `None` until read successfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Telemetry {
    pub pulse: Option<i16>,
    pub temperature: Option<u8>,
    pub vin_mv: Option<u16>,
}

/// What the driver knows about the servos on its bus.
#[derive(Debug, Clone, Default)]
pub struct ServoBusState {
    commanded: HashMap<ServoId, CommandedMove>,
    telemetry: HashMap<ServoId, Telemetry>,
}

impl ServoBusState {
    pub fn commanded(&self, id: ServoId) -> Option<CommandedMove> {
        self.commanded.get(&id).copied()
    }

    pub fn telemetry(&self, id: ServoId) -> Telemetry {
        self.telemetry.get(&id).copied().unwrap_or_default()
    }

    pub(crate) fn record_move(&mut self, id: ServoId, pulse: u16, time_ms: u16) {
        self.commanded.insert(id, CommandedMove { pulse, time_ms });
    }

    pub(crate) fn telemetry_mut(&mut self, id: ServoId) -> &mut Telemetry {
        self.telemetry.entry(id).or_default()
    }
}

pub struct BusServoDriver<P: HalfDuplexPort> {
    port: P,
    timing: BusTiming,
    pub(crate) state: ServoBusState,
}

impl<P: HalfDuplexPort> BusServoDriver<P> {
    pub fn new(port: P, timing: BusTiming) -> Self {
        BusServoDriver { port, timing, state: ServoBusState::default() }
    }

    pub fn into_shared(self) -> SharedBus<P> {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &ServoBusState {
        &self.state
    }

    pub fn timing(&self) -> &BusTiming {
        &self.timing
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Sends a command frame. Transport faults are logged and dropped, the bus stays in
    /// transmit direction afterwards. A single word payload exists only in responses and
    /// is not sent.
    pub fn write_command(&mut self, id: ServoId, command: CommandCode, data: FrameData) {
        if !data.is_command_payload() {
            warn!("Not sending {:?} to servo {}: {:?} is a response payload", command, id, data);
            return;
        }
        let frame = ServoFrame::new(id, command, data);
        if let Err(err) = self.transmit(&frame) {
            debug!("Write of {:?} to servo {} failed: {}", command, id, BusError::classify(err));
        }
    }

    /// One request/response exchange. `None` when nothing usable came back.
    pub fn read_command(&mut self, id: ServoId, command: CommandCode) -> Option<ReadValue> {
        match self.exchange(id, command) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("Read of {:?} from servo {} gave no data: {}", command, id, err);
                None
            }
        }
    }

    /// Repeats [`read_command`](Self::read_command) up to the configured retry limit.
    /// Stops early on a fault that another attempt cannot fix.
    pub fn read_with_retry(&mut self, id: ServoId, command: CommandCode) -> Option<ReadValue> {
        for attempt in 1..=self.timing.retry_limit {
            match self.exchange(id, command) {
                Ok(value) => return Some(value),
                Err(err) if err.is_transient() => {
                    debug!("Read of {:?} from servo {} gave no data: {}", command, id, err);
                }
                Err(err) => {
                    warn!("Read of {:?} from servo {} abandoned after {} attempts: {}",
                          command, id, attempt, err);
                    return None;
                }
            }
        }
        warn!(
            "Servo {} did not answer {:?} after {} attempts",
            id, command, self.timing.retry_limit
        );
        None
    }

    fn transmit(&mut self, frame: &ServoFrame) -> std::io::Result<()> {
        self.port.set_direction(BusDirection::Transmit)?;
        self.port.write_frame(&frame.to_bytes())
    }

    fn exchange(&mut self, id: ServoId, command: CommandCode) -> Result<ReadValue, BusError> {
        self.transmit(&ServoFrame::read_request(id, command))?;
        pause(self.timing.request_gap);

        self.port.discard_input()?;
        self.port.set_direction(BusDirection::Receive)?;
        pause(self.timing.settle_delay);

        let mut received: Vec<u8> = Vec::with_capacity(MAX_RESPONSE_BYTES);
        let mut chunk = [0u8; 32];
        let mut last_error = BusError::Timeout;
        while received.len() < MAX_RESPONSE_BYTES {
            let n = match self.port.read_available(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => match BusError::classify(err) {
                    BusError::Timeout => break,
                    other => return Err(other),
                },
            };
            received.extend_from_slice(&chunk[..n]);
            match find_response(&received, id, command) {
                Ok(value) => return Ok(value),
                Err(err) => last_error = err,
            }
        }
        Err(last_error)
    }
}

fn pause(duration: std::time::Duration) {
    if !duration.is_zero() {
        sleep(duration);
    }
}

/// Looks for a frame answering `command` from `id` (any id when broadcast) anywhere in
/// the received bytes. Returns the most telling error when there is none.
fn find_response(received: &[u8], id: ServoId, command: CommandCode) -> Result<ReadValue, BusError> {
    let mut error = BusError::Truncated;
    let mut start = 0;
    while start + 1 < received.len() {
        if received[start] != FRAME_HEADER || received[start + 1] != FRAME_HEADER {
            start += 1;
            continue;
        }
        match ServoFrame::parse(&received[start..]) {
            Ok((frame, used)) => {
                let id_matches = id.is_broadcast() || frame.id == id;
                match frame.read_value() {
                    Some(value) if id_matches && frame.command == command => return Ok(value),
                    _ => {
                        error = BusError::Unmatched;
                        start += used;
                    }
                }
            }
            Err(BusError::Truncated) => break,
            Err(other) => {
                error = other;
                start += 1;
            }
        }
    }
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servo_frame::checksum;

    fn id(value: u8) -> ServoId {
        ServoId::new(value).unwrap()
    }

    fn response(id: u8, command: CommandCode, data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![FRAME_HEADER, FRAME_HEADER, id, 3 + data.len() as u8, command.code()];
        bytes.extend_from_slice(data);
        bytes.push(checksum(&bytes));
        bytes
    }

    #[test]
    fn test_find_response_skips_noise() {
        let mut received = vec![0x00, 0x55, 0x13];
        received.extend(response(2, CommandCode::TempRead, &[41]));
        assert_eq!(find_response(&received, id(2), CommandCode::TempRead).unwrap(), ReadValue::Byte(41));
    }

    #[test]
    fn test_find_response_ignores_other_servo() {
        let mut received = response(3, CommandCode::PosRead, &[0xF4, 0x01]);
        assert!(matches!(find_response(&received, id(2), CommandCode::PosRead), Err(BusError::Unmatched)));
        // Broadcast accepts whoever answers
        assert_eq!(
            find_response(&received, ServoId::BROADCAST, CommandCode::PosRead).unwrap(),
            ReadValue::Word(500)
        );
        received.extend(response(2, CommandCode::PosRead, &[0x2C, 0x01]));
        assert_eq!(find_response(&received, id(2), CommandCode::PosRead).unwrap(), ReadValue::Word(300));
    }

    #[test]
    fn test_find_response_ignores_request_echo() {
        let echo = ServoFrame::read_request(id(1), CommandCode::VinRead).to_bytes();
        assert!(matches!(find_response(&echo, id(1), CommandCode::VinRead), Err(BusError::Unmatched)));
    }

    #[test]
    fn test_find_response_reports_corruption() {
        let mut received = response(1, CommandCode::IdRead, &[1]);
        received[5] = 7;
        assert!(matches!(
            find_response(&received, id(1), CommandCode::IdRead),
            Err(BusError::ChecksumMismatch { .. })
        ));
        assert!(matches!(find_response(&received[..4], id(1), CommandCode::IdRead), Err(BusError::Truncated)));
    }
}
