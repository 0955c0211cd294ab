//! Modbus TCP pose readout
//!
//! The robot's Modbus server exposes the tool pose in holding registers
//! 400-405 as signed 16-bit values:
//!
//! ```text
//! ┌──────────┬──────┬─────────────┐
//! │ Register │ Axis │ Unit        │
//! ├──────────┼──────┼─────────────┤
//! │ 400-402  │ xyz  │ 0.1 mm      │
//! │ 403-405  │ rxyz │ mrad        │
//! └──────────┴──────┴─────────────┘
//! ```
//!
//! Frames are MBAP header (7 bytes) followed by the PDU. Multi-byte fields
//! are big-endian.

use core::fmt;

use heapless::Vec;
use mindlift_core::motion::Pose;

/// First pose register
pub const POSE_REGISTER_START: u16 = 400;

/// Registers covering x, y, z, rx, ry, rz
pub const POSE_REGISTER_COUNT: u16 = 6;

/// Read Holding Registers function code
pub const READ_HOLDING_REGISTERS: u8 = 0x03;

/// MBAP header length
pub const MBAP_LEN: usize = 7;

/// Request frame length (MBAP + function + start + count)
pub const REQUEST_LEN: usize = MBAP_LEN + 5;

/// Largest register block a single read returns
pub const MAX_REGISTERS: usize = 125;

/// Largest PDU after the MBAP header
pub const MAX_PDU_LEN: usize = 253;

const EXCEPTION_FLAG: u8 = 0x80;

/// Errors from decoding a Modbus response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModbusError {
    /// Frame shorter than its header claims
    Truncated,
    /// Protocol identifier is not zero
    BadProtocolId(u16),
    /// MBAP length field is out of range
    BadLength(u16),
    /// Response belongs to a different request
    TransactionMismatch { expected: u16, actual: u16 },
    /// Response function code was not the one requested
    UnexpectedFunction(u8),
    /// Server answered with an exception code
    Exception(u8),
    /// Byte count disagrees with the requested register count
    RegisterCount,
}

impl fmt::Display for ModbusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModbusError::Truncated => f.write_str("modbus frame truncated"),
            ModbusError::BadProtocolId(id) => write!(f, "modbus protocol id {} is not 0", id),
            ModbusError::BadLength(len) => write!(f, "modbus length field {} out of range", len),
            ModbusError::TransactionMismatch { expected, actual } => write!(
                f,
                "modbus transaction {} does not match request {}",
                actual, expected
            ),
            ModbusError::UnexpectedFunction(code) => {
                write!(f, "unexpected modbus function 0x{:02x}", code)
            }
            ModbusError::Exception(code) => write!(f, "modbus exception 0x{:02x}", code),
            ModbusError::RegisterCount => f.write_str("modbus register count mismatch"),
        }
    }
}

/// Parsed MBAP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MbapHeader {
    pub transaction_id: u16,
    pub unit_id: u8,
    /// Bytes in the PDU that follows the header
    pub pdu_len: usize,
}

impl MbapHeader {
    /// Parse the 7-byte header
    pub fn parse(bytes: &[u8]) -> Result<Self, ModbusError> {
        if bytes.len() < MBAP_LEN {
            return Err(ModbusError::Truncated);
        }
        let transaction_id = u16::from_be_bytes([bytes[0], bytes[1]]);
        let protocol_id = u16::from_be_bytes([bytes[2], bytes[3]]);
        let length = u16::from_be_bytes([bytes[4], bytes[5]]);

        if protocol_id != 0 {
            return Err(ModbusError::BadProtocolId(protocol_id));
        }
        // Length counts the unit id plus the PDU
        let pdu_len = usize::from(length).wrapping_sub(1);
        if length < 2 || pdu_len > MAX_PDU_LEN {
            return Err(ModbusError::BadLength(length));
        }

        Ok(Self {
            transaction_id,
            unit_id: bytes[6],
            pdu_len,
        })
    }
}

/// A pending read of the pose registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoseRequest {
    pub transaction_id: u16,
    pub unit_id: u8,
}

impl PoseRequest {
    pub fn new(transaction_id: u16, unit_id: u8) -> Self {
        Self {
            transaction_id,
            unit_id,
        }
    }

    /// Encode the Read Holding Registers request
    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        let mut frame = [0u8; REQUEST_LEN];
        frame[0..2].copy_from_slice(&self.transaction_id.to_be_bytes());
        // protocol id stays 0
        frame[4..6].copy_from_slice(&6u16.to_be_bytes());
        frame[6] = self.unit_id;
        frame[7] = READ_HOLDING_REGISTERS;
        frame[8..10].copy_from_slice(&POSE_REGISTER_START.to_be_bytes());
        frame[10..12].copy_from_slice(&POSE_REGISTER_COUNT.to_be_bytes());
        frame
    }

    /// Decode the response PDU for this request into a pose
    pub fn decode(&self, header: &MbapHeader, pdu: &[u8]) -> Result<Pose, ModbusError> {
        if header.transaction_id != self.transaction_id {
            return Err(ModbusError::TransactionMismatch {
                expected: self.transaction_id,
                actual: header.transaction_id,
            });
        }
        let registers = decode_read_holding(pdu, POSE_REGISTER_COUNT)?;
        pose_from_registers(&registers)
    }
}

/// Decode a Read Holding Registers response PDU
pub fn decode_read_holding(
    pdu: &[u8],
    expected_count: u16,
) -> Result<Vec<u16, MAX_REGISTERS>, ModbusError> {
    let (&function, rest) = pdu.split_first().ok_or(ModbusError::Truncated)?;

    if function == READ_HOLDING_REGISTERS | EXCEPTION_FLAG {
        let code = rest.first().copied().ok_or(ModbusError::Truncated)?;
        return Err(ModbusError::Exception(code));
    }
    if function != READ_HOLDING_REGISTERS {
        return Err(ModbusError::UnexpectedFunction(function));
    }

    let (&byte_count, data) = rest.split_first().ok_or(ModbusError::Truncated)?;
    if usize::from(byte_count) != usize::from(expected_count) * 2 {
        return Err(ModbusError::RegisterCount);
    }
    if data.len() < usize::from(byte_count) {
        return Err(ModbusError::Truncated);
    }

    let mut registers = Vec::new();
    for pair in data[..usize::from(byte_count)].chunks_exact(2) {
        registers
            .push(u16::from_be_bytes([pair[0], pair[1]]))
            .map_err(|_| ModbusError::RegisterCount)?;
    }
    Ok(registers)
}

/// Convert the six pose registers into a pose (mm, rad)
pub fn pose_from_registers(registers: &[u16]) -> Result<Pose, ModbusError> {
    if registers.len() != usize::from(POSE_REGISTER_COUNT) {
        return Err(ModbusError::RegisterCount);
    }
    // Registers hold two's complement values
    let signed = |index: usize| f64::from(registers[index] as i16);

    Ok(Pose::new(
        signed(0) / 10.0,
        signed(1) / 10.0,
        signed(2) / 10.0,
        signed(3) / 1000.0,
        signed(4) / 1000.0,
        signed(5) / 1000.0,
    ))
}
