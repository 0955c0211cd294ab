//! URScript command encoding
//!
//! Each command is one newline-terminated line written to the secondary
//! interface. Poses go out in meters and radians; the rest of the system
//! works in millimeters, so positions are scaled here.

use core::fmt::{self, Write};

use heapless::String;
use mindlift_core::motion::{Pose, MM_PER_M};

/// Longest script line produced
pub const MAX_SCRIPT_LEN: usize = 192;

/// One encoded script line
pub type Script = String<MAX_SCRIPT_LEN>;

/// Errors from encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// NaN or infinite value in the command
    NonFinite,
    /// Rendered line does not fit the buffer
    Overflow,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::NonFinite => f.write_str("command contains a non-finite value"),
            EncodeError::Overflow => f.write_str("script line exceeds buffer"),
        }
    }
}

impl From<fmt::Error> for EncodeError {
    fn from(_: fmt::Error) -> Self {
        EncodeError::Overflow
    }
}

fn check_finite(values: &[f64]) -> Result<(), EncodeError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(EncodeError::NonFinite)
    }
}

/// Write `p[x,y,z,rx,ry,rz]` with the position in meters
fn write_pose(out: &mut Script, pose: &Pose) -> Result<(), EncodeError> {
    check_finite(&[pose.x, pose.y, pose.z, pose.rx, pose.ry, pose.rz])?;
    write!(
        out,
        "p[{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}]",
        pose.x / MM_PER_M,
        pose.y / MM_PER_M,
        pose.z / MM_PER_M,
        pose.rx,
        pose.ry,
        pose.rz
    )?;
    Ok(())
}

/// `movel(p[...], a=A, v=V)`
pub fn movel(target: &Pose, acceleration: f64, velocity: f64) -> Result<Script, EncodeError> {
    check_finite(&[acceleration, velocity])?;
    let mut out = Script::new();
    out.push_str("movel(").map_err(|_| EncodeError::Overflow)?;
    write_pose(&mut out, target)?;
    writeln!(out, ", a={}, v={})", acceleration, velocity)?;
    Ok(out)
}

/// `stopj(A)`
pub fn stopj(deceleration: f64) -> Result<Script, EncodeError> {
    check_finite(&[deceleration])?;
    let mut out = Script::new();
    writeln!(out, "stopj({})", deceleration)?;
    Ok(out)
}

/// `set_tcp(p[...])`
pub fn set_tcp(offset: &Pose) -> Result<Script, EncodeError> {
    let mut out = Script::new();
    out.push_str("set_tcp(").map_err(|_| EncodeError::Overflow)?;
    write_pose(&mut out, offset)?;
    out.push_str(")\n").map_err(|_| EncodeError::Overflow)?;
    Ok(out)
}

/// `set_digital_out(N, True|False)`
pub fn set_digital_out(index: u8, on: bool) -> Result<Script, EncodeError> {
    let mut out = Script::new();
    let value = if on { "True" } else { "False" };
    writeln!(out, "set_digital_out({}, {})", index, value)?;
    Ok(out)
}
