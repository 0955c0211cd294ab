//! Universal Robots link
//!
//! Commands go out as URScript lines on the secondary interface. The tool
//! pose comes back from the Modbus server. Both sockets carry read/write
//! timeouts, so a dead controller surfaces as an error instead of a hang.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use thiserror::Error;
use tracing::{debug, trace};

use mindlift_core::motion::Pose;
use mindlift_core::traits::{MotionSink, PoseProvider};
use mindlift_protocol::modbus::{MbapHeader, PoseRequest, MAX_PDU_LEN, MBAP_LEN};
use mindlift_protocol::urscript::{self, Script};
use mindlift_protocol::{EncodeError, ModbusError};

use crate::config::LinkSettings;

/// Robot link errors
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("robot I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("pose read failed: {0}")]
    Modbus(ModbusError),
    #[error("command not encodable: {0}")]
    Encode(EncodeError),
}

impl From<ModbusError> for LinkError {
    fn from(e: ModbusError) -> Self {
        LinkError::Modbus(e)
    }
}

impl From<EncodeError> for LinkError {
    fn from(e: EncodeError) -> Self {
        LinkError::Encode(e)
    }
}

/// Link to a UR controller
///
/// Generic over the stream type so the link can be exercised against
/// in-memory streams.
pub struct UrRobot<S> {
    /// Secondary interface (URScript)
    script: S,
    /// Modbus TCP server (pose readout)
    modbus: S,
    unit_id: u8,
    next_transaction: u16,
}

/// Link over real TCP sockets
pub type UrLink = UrRobot<TcpStream>;

/// Late replies skipped before a pose read gives up
const MAX_STALE_REPLIES: usize = 4;

/// True if `actual` answers a request sent before `expected`
fn is_stale_reply(expected: u16, actual: u16) -> bool {
    let behind = expected.wrapping_sub(actual);
    behind != 0 && behind < 0x8000
}

impl UrRobot<TcpStream> {
    /// Open both sockets
    pub fn connect(settings: &LinkSettings) -> Result<Self, LinkError> {
        let host = settings.robot_host.as_str();
        let timeout = Some(settings.socket_timeout());

        let script = TcpStream::connect((host, settings.secondary_port))?;
        script.set_write_timeout(timeout)?;
        script.set_read_timeout(timeout)?;
        debug!(host, port = settings.secondary_port, "secondary interface connected");

        let modbus = TcpStream::connect((host, settings.modbus_port))?;
        modbus.set_write_timeout(timeout)?;
        modbus.set_read_timeout(timeout)?;
        modbus.set_nodelay(true)?;
        debug!(host, port = settings.modbus_port, "modbus connected");

        Ok(Self::new(script, modbus, settings.modbus_unit_id))
    }
}

impl<S: Read + Write> UrRobot<S> {
    pub fn new(script: S, modbus: S, unit_id: u8) -> Self {
        Self {
            script,
            modbus,
            unit_id,
            next_transaction: 1,
        }
    }

    fn send(&mut self, line: Script) -> Result<(), LinkError> {
        self.script.write_all(line.as_bytes())?;
        self.script.flush()?;
        trace!(script = line.trim_end(), "sent");
        Ok(())
    }

    fn next_request(&mut self) -> PoseRequest {
        let request = PoseRequest::new(self.next_transaction, self.unit_id);
        self.next_transaction = self.next_transaction.wrapping_add(1);
        request
    }

    /// Read one complete response and decode it against `request`
    fn read_reply(&mut self, request: &PoseRequest) -> Result<Pose, LinkError> {
        let mut header = [0u8; MBAP_LEN];
        self.modbus.read_exact(&mut header)?;
        let header = MbapHeader::parse(&header)?;

        let mut pdu = [0u8; MAX_PDU_LEN];
        let pdu = &mut pdu[..header.pdu_len];
        self.modbus.read_exact(pdu)?;

        Ok(request.decode(&header, pdu)?)
    }
}

impl<S: Read + Write> PoseProvider for UrRobot<S> {
    type Error = LinkError;

    fn get_pose(&mut self) -> Result<Pose, LinkError> {
        let request = self.next_request();
        self.modbus.write_all(&request.encode())?;
        self.modbus.flush()?;

        // A reply that arrives after its request timed out is still queued
        // ahead of ours; skip it instead of failing every later read.
        let mut skipped = 0;
        let pose = loop {
            match self.read_reply(&request) {
                Err(LinkError::Modbus(ModbusError::TransactionMismatch { expected, actual }))
                    if is_stale_reply(expected, actual) && skipped < MAX_STALE_REPLIES =>
                {
                    debug!(expected, actual, "discarding late modbus reply");
                    skipped += 1;
                }
                result => break result?,
            }
        };
        trace!(x = pose.x, y = pose.y, z = pose.z, "pose");
        Ok(pose)
    }
}

impl<S: Read + Write> MotionSink for UrRobot<S> {
    type Error = LinkError;

    fn move_linear(
        &mut self,
        target: Pose,
        acceleration: f64,
        velocity: f64,
    ) -> Result<(), LinkError> {
        self.send(urscript::movel(&target, acceleration, velocity)?)
    }

    fn stop(&mut self, deceleration: f64) -> Result<(), LinkError> {
        self.send(urscript::stopj(deceleration)?)
    }

    fn set_tool_offset(&mut self, offset: Pose) -> Result<(), LinkError> {
        self.send(urscript::set_tcp(&offset)?)
    }

    fn set_digital_output(&mut self, index: u8, on: bool) -> Result<(), LinkError> {
        self.send(urscript::set_digital_out(index, on)?)
    }
}
