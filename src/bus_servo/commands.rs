//! Servo operations built on the raw exchange
//!
//! Physical quantities are clamped to what the servo accepts before they reach the wire.
//! Reads poll up to the retry limit and give `None` when the servo stays silent.

use std::thread::sleep;
use std::time::Duration;

use tracing::debug;

use crate::bus_error::BusError;
use crate::driver::BusServoDriver;
use crate::port::HalfDuplexPort;
use crate::servo_frame::{CommandCode, FrameData, ServoId};

pub const PULSE_RANGE: (i32, i32) = (0, 1000);
pub const MOVE_TIME_RANGE: (i32, i32) = (0, 30_000);
pub const DEVIATION_RANGE: (i32, i32) = (-125, 125);
pub const VIN_RANGE_MV: (i32, i32) = (4500, 12_000);
pub const TEMP_LIMIT_RANGE: (i32, i32) = (50, 100);

/// Mid position, where [`reset`](BusServoDriver::reset) parks the servo.
pub const CENTER_PULSE: u16 = 500;

/// Wait between clearing the deviation and moving during a reset.
const RESET_PAUSE: Duration = Duration::from_millis(100);

fn clamp(value: i32, range: (i32, i32)) -> i32 {
    value.clamp(range.0, range.1)
}

/// Clamps both limits and puts them in ascending order.
fn ordered_limits(low: i32, high: i32, range: (i32, i32)) -> (u16, u16) {
    let (a, b) = (clamp(low, range) as u16, clamp(high, range) as u16);
    if a <= b { (a, b) } else { (b, a) }
}

impl<P: HalfDuplexPort> BusServoDriver<P> {
    /// Moves the servo to `pulse` (0..=1000) in `time_ms` (0..=30000). Returns the values
    /// actually sent.
    pub fn set_pulse(&mut self, id: ServoId, pulse: i32, time_ms: i32) -> (u16, u16) {
        let pulse = clamp(pulse, PULSE_RANGE) as u16;
        let time_ms = clamp(time_ms, MOVE_TIME_RANGE) as u16;
        self.write_command(id, CommandCode::MoveTimeWrite, FrameData::Pair(pulse, time_ms));
        self.state.record_move(id, pulse, time_ms);
        (pulse, time_ms)
    }

    pub fn stop(&mut self, id: ServoId) {
        self.write_command(id, CommandCode::MoveStop, FrameData::Empty);
    }

    /// Gives the servo at `old` the id `new`. The broadcast id cannot be assigned.
    pub fn set_id(&mut self, old: ServoId, new: ServoId) -> Result<(), BusError> {
        if new.is_broadcast() {
            return Err(BusError::InvalidServoId(new.value()));
        }
        self.write_command(old, CommandCode::IdWrite, FrameData::Byte(new.value()));
        Ok(())
    }

    /// Reads the id of a servo. Without an id the request is broadcast, which only makes
    /// sense with a single servo on the bus.
    pub fn read_id(&mut self, id: Option<ServoId>) -> Option<ServoId> {
        let target = id.unwrap_or(ServoId::BROADCAST);
        let value = self.read_with_retry(target, CommandCode::IdRead)?.as_byte()?;
        ServoId::new(value).ok()
    }

    /// Adjusts the zero offset (-125..=125), effective immediately but lost on power off
    /// unless saved.
    pub fn set_deviation(&mut self, id: ServoId, deviation: i32) -> i8 {
        let deviation = clamp(deviation, DEVIATION_RANGE) as i8;
        self.write_command(id, CommandCode::AngleOffsetAdjust, FrameData::signed_byte(deviation));
        deviation
    }

    pub fn save_deviation(&mut self, id: ServoId) {
        self.write_command(id, CommandCode::AngleOffsetWrite, FrameData::Empty);
    }

    pub fn read_deviation(&mut self, id: ServoId) -> Option<i8> {
        let value = self.read_with_retry(id, CommandCode::AngleOffsetRead)?.as_byte()?;
        Some(value as i8)
    }

    pub fn set_angle_limit(&mut self, id: ServoId, low: i32, high: i32) -> (u16, u16) {
        let (low, high) = ordered_limits(low, high, PULSE_RANGE);
        self.write_command(id, CommandCode::AngleLimitWrite, FrameData::Pair(low, high));
        (low, high)
    }

    pub fn read_angle_limit(&mut self, id: ServoId) -> Option<(i16, i16)> {
        self.read_with_retry(id, CommandCode::AngleLimitRead)?.as_pair()
    }

    /// Input voltage window in millivolts (4500..=12000).
    pub fn set_vin_limit(&mut self, id: ServoId, low_mv: i32, high_mv: i32) -> (u16, u16) {
        let (low, high) = ordered_limits(low_mv, high_mv, VIN_RANGE_MV);
        self.write_command(id, CommandCode::VinLimitWrite, FrameData::Pair(low, high));
        (low, high)
    }

    pub fn read_vin_limit(&mut self, id: ServoId) -> Option<(u16, u16)> {
        let (low, high) = self.read_with_retry(id, CommandCode::VinLimitRead)?.as_pair()?;
        Some((u16::try_from(low).ok()?, u16::try_from(high).ok()?))
    }

    /// Over-temperature alarm threshold in °C (50..=100).
    pub fn set_max_temp(&mut self, id: ServoId, celsius: i32) -> u8 {
        let celsius = clamp(celsius, TEMP_LIMIT_RANGE) as u8;
        self.write_command(id, CommandCode::TempMaxLimitWrite, FrameData::Byte(celsius));
        celsius
    }

    pub fn read_temp_limit(&mut self, id: ServoId) -> Option<u8> {
        self.read_with_retry(id, CommandCode::TempMaxLimitRead)?.as_byte()
    }

    /// Current position. May be slightly outside 0..=1000, hence signed.
    pub fn read_pulse(&mut self, id: ServoId) -> Option<i16> {
        let pulse = self.read_with_retry(id, CommandCode::PosRead)?.as_word()?;
        self.state.telemetry_mut(id).pulse = Some(pulse);
        Some(pulse)
    }

    pub fn read_temp(&mut self, id: ServoId) -> Option<u8> {
        let temperature = self.read_with_retry(id, CommandCode::TempRead)?.as_byte()?;
        self.state.telemetry_mut(id).temperature = Some(temperature);
        Some(temperature)
    }

    /// Supply voltage in millivolts.
    pub fn read_vin(&mut self, id: ServoId) -> Option<u16> {
        let word = self.read_with_retry(id, CommandCode::VinRead)?.as_word()?;
        let vin_mv = u16::try_from(word).ok()?;
        self.state.telemetry_mut(id).vin_mv = Some(vin_mv);
        Some(vin_mv)
    }

    /// Powers the motor down so the joint can be moved by hand.
    pub fn unload(&mut self, id: ServoId) {
        self.write_command(id, CommandCode::LoadOrUnloadWrite, FrameData::Byte(0));
    }

    /// `true` while the motor holds its position.
    pub fn read_load_status(&mut self, id: ServoId) -> Option<bool> {
        let flag = self.read_with_retry(id, CommandCode::LoadOrUnloadRead)?.as_byte()?;
        Some(flag != 0)
    }

    /// Last position and time the servo itself was commanded with.
    pub fn read_move_time(&mut self, id: ServoId) -> Option<(i16, i16)> {
        self.read_with_retry(id, CommandCode::MoveTimeRead)?.as_pair()
    }

    /// Clears the deviation, then moves to the mid position in 100 ms.
    pub fn reset(&mut self, id: ServoId) {
        debug!("Resetting servo {}", id);
        self.set_deviation(id, 0);
        sleep(RESET_PAUSE);
        self.set_pulse(id, CENTER_PULSE as i32, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_limits() {
        assert_eq!(ordered_limits(900, 100, PULSE_RANGE), (100, 900));
        assert_eq!(ordered_limits(-20, 2000, PULSE_RANGE), (0, 1000));
        assert_eq!(ordered_limits(3000, 13_000, VIN_RANGE_MV), (4500, 12_000));
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(-126, DEVIATION_RANGE), -125);
        assert_eq!(clamp(40, TEMP_LIMIT_RANGE), 50);
        assert_eq!(clamp(31_000, MOVE_TIME_RANGE), 30_000);
    }
}
