//! Binary frames of the bus servo protocol
//!
//! ```text
//! 0x55 0x55 | id | length | command | data (0, 1, 2 or 4 bytes) | checksum
//! ```
//! `length` counts itself, the command, the data and the checksum, so it is 3 plus the
//! number of data bytes. 16-bit words are little endian.

use crate::bus_error::BusError;

/// Both sync bytes of every frame.
pub const FRAME_HEADER: u8 = 0x55;

/// Smallest possible frame: header, id, length, command, checksum.
pub const MIN_FRAME_LEN: usize = 6;

/// Address of a servo on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServoId(u8);

impl ServoId {
    /// Highest id a servo can have.
    pub const MAX: u8 = 253;

    /// Addresses every servo. Only meaningful for writes, or for reads when a single servo
    /// is connected.
    pub const BROADCAST: ServoId = ServoId(254);

    /// Accepts 0..=253 and the broadcast id 254.
    pub fn new(id: u8) -> Result<Self, BusError> {
        if id <= Self::BROADCAST.0 {
            Ok(ServoId(id))
        } else {
            Err(BusError::InvalidServoId(id))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl TryFrom<u8> for ServoId {
    type Error = BusError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        ServoId::new(id)
    }
}

impl std::fmt::Display for ServoId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_broadcast() {
            write!(f, "broadcast")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Command codes of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    MoveTimeWrite = 1,
    MoveTimeRead = 2,
    MoveTimeWaitWrite = 7,
    MoveTimeWaitRead = 8,
    MoveStart = 11,
    MoveStop = 12,
    IdWrite = 13,
    IdRead = 14,
    AngleOffsetAdjust = 17,
    AngleOffsetWrite = 18,
    AngleOffsetRead = 19,
    AngleLimitWrite = 20,
    AngleLimitRead = 21,
    VinLimitWrite = 22,
    VinLimitRead = 23,
    TempMaxLimitWrite = 24,
    TempMaxLimitRead = 25,
    TempRead = 26,
    VinRead = 27,
    PosRead = 28,
    OrMotorModeWrite = 29,
    OrMotorModeRead = 30,
    LoadOrUnloadWrite = 31,
    LoadOrUnloadRead = 32,
    LedCtrlWrite = 33,
    LedCtrlRead = 34,
    LedErrorWrite = 35,
    LedErrorRead = 36,
}

impl CommandCode {
    const ALL: [CommandCode; 28] = [
        CommandCode::MoveTimeWrite, CommandCode::MoveTimeRead,
        CommandCode::MoveTimeWaitWrite, CommandCode::MoveTimeWaitRead,
        CommandCode::MoveStart, CommandCode::MoveStop,
        CommandCode::IdWrite, CommandCode::IdRead,
        CommandCode::AngleOffsetAdjust, CommandCode::AngleOffsetWrite, CommandCode::AngleOffsetRead,
        CommandCode::AngleLimitWrite, CommandCode::AngleLimitRead,
        CommandCode::VinLimitWrite, CommandCode::VinLimitRead,
        CommandCode::TempMaxLimitWrite, CommandCode::TempMaxLimitRead,
        CommandCode::TempRead, CommandCode::VinRead, CommandCode::PosRead,
        CommandCode::OrMotorModeWrite, CommandCode::OrMotorModeRead,
        CommandCode::LoadOrUnloadWrite, CommandCode::LoadOrUnloadRead,
        CommandCode::LedCtrlWrite, CommandCode::LedCtrlRead,
        CommandCode::LedErrorWrite, CommandCode::LedErrorRead,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

/// Payload carried after the command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameData {
    /// Read requests and argument-less writes.
    Empty,
    /// Single byte: new id, deviation, temperature limit, load flag.
    Byte(u8),
    /// Single word, only seen in responses (position, voltage). Commands never carry it,
    /// their length byte is 3, 4 or 7.
    Word(u16),
    /// Two words: position and time, or a low/high limit pair.
    Pair(u16, u16),
}

impl FrameData {
    fn len(&self) -> usize {
        match self {
            FrameData::Empty => 0,
            FrameData::Byte(_) => 1,
            FrameData::Word(_) => 2,
            FrameData::Pair(_, _) => 4,
        }
    }

    /// Whether a command frame may carry this payload.
    pub fn is_command_payload(&self) -> bool {
        !matches!(self, FrameData::Word(_))
    }

    /// Deviation in -125..=125 travels as a two's complement byte.
    pub fn signed_byte(value: i8) -> Self {
        FrameData::Byte(value as u8)
    }
}

/// Decoded value of a read response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadValue {
    Byte(u8),
    Word(i16),
    Pair(i16, i16),
}

impl ReadValue {
    pub fn as_byte(&self) -> Option<u8> {
        match *self {
            ReadValue::Byte(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<i16> {
        match *self {
            ReadValue::Word(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(i16, i16)> {
        match *self {
            ReadValue::Pair(a, b) => Some((a, b)),
            _ => None,
        }
    }
}

/// Checksum over a frame without its last byte: inverted sum of everything after the header.
pub fn checksum(frame: &[u8]) -> u8 {
    let sum: u32 = frame.iter().map(|&b| b as u32).sum();
    !((sum.wrapping_sub(2 * FRAME_HEADER as u32)) as u8)
}

/// A complete frame. The checksum is computed when encoding and verified when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoFrame {
    pub id: ServoId,
    pub command: CommandCode,
    pub data: FrameData,
}

impl ServoFrame {
    pub fn new(id: ServoId, command: CommandCode, data: FrameData) -> Self {
        ServoFrame { id, command, data }
    }

    /// Request frame for a read command.
    pub fn read_request(id: ServoId, command: CommandCode) -> Self {
        ServoFrame::new(id, command, FrameData::Empty)
    }

    /// Value of the length byte: 3, 4, 5 or 7.
    pub fn length_byte(&self) -> u8 {
        3 + self.data.len() as u8
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_FRAME_LEN + self.data.len());
        buf.extend_from_slice(&[FRAME_HEADER, FRAME_HEADER]);
        buf.push(self.id.value());
        buf.push(self.length_byte());
        buf.push(self.command.code());
        match self.data {
            FrameData::Empty => {}
            FrameData::Byte(b) => buf.push(b),
            FrameData::Word(w) => buf.extend_from_slice(&w.to_le_bytes()),
            FrameData::Pair(a, b) => {
                buf.extend_from_slice(&a.to_le_bytes());
                buf.extend_from_slice(&b.to_le_bytes());
            }
        }
        buf.push(checksum(&buf));
        buf
    }

    /// Parses one frame from the start of `bytes`, returning it with the number of bytes
    /// it occupied. Bytes beyond the frame are ignored.
    pub fn parse(bytes: &[u8]) -> Result<(ServoFrame, usize), BusError> {
        if bytes.len() < MIN_FRAME_LEN {
            return Err(BusError::Truncated);
        }
        if bytes[0] != FRAME_HEADER || bytes[1] != FRAME_HEADER {
            return Err(BusError::Malformed("missing frame header".into()));
        }
        let length = bytes[3];
        if !matches!(length, 3 | 4 | 5 | 7) {
            return Err(BusError::Malformed(format!("unexpected length byte {}", length)));
        }
        let total = length as usize + 3;
        if bytes.len() < total {
            return Err(BusError::Truncated);
        }
        let expected = checksum(&bytes[..total - 1]);
        if bytes[total - 1] != expected {
            return Err(BusError::ChecksumMismatch { expected, found: bytes[total - 1] });
        }
        let id = ServoId::new(bytes[2])?;
        let command = CommandCode::from_code(bytes[4])
            .ok_or_else(|| BusError::Malformed(format!("unknown command {}", bytes[4])))?;
        let word = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let data = match length {
            3 => FrameData::Empty,
            4 => FrameData::Byte(bytes[5]),
            5 => FrameData::Word(word(5)),
            _ => FrameData::Pair(word(5), word(7)),
        };
        Ok((ServoFrame { id, command, data }, total))
    }

    /// Payload of a response frame as signed values. Empty frames carry no value.
    pub fn read_value(&self) -> Option<ReadValue> {
        match self.data {
            FrameData::Empty => None,
            FrameData::Byte(b) => Some(ReadValue::Byte(b)),
            FrameData::Word(w) => Some(ReadValue::Word(w as i16)),
            FrameData::Pair(a, b) => Some(ReadValue::Pair(a as i16, b as i16)),
        }
    }
}
