//! ThinkGear connector records
//!
//! After the client sends [`HANDSHAKE`], the connector streams one JSON
//! object per line. Each object carries any subset of the fields below:
//!
//! ```text
//! {"eSense":{"attention":53,"meditation":61},"eegPower":{...},"poorSignalLevel":0}
//! {"blinkStrength":55}
//! {"status":"scanning","poorSignalLevel":200}
//! {"rawEeg":-112}
//! {"mentalEffort":0.52}
//! {"familiarity":0.31}
//! ```
//!
//! Unknown fields are ignored. A record with none of the known fields is
//! rejected. eSense levels above 100 are clamped to 100; blink strength
//! runs 1-255 and is passed through as is.

use core::fmt;

use heapless::{String, Vec};
use mindlift_core::input::sample::MAX_LEVEL;
use mindlift_core::input::BiometricSample;
use serde::Deserialize;

/// Handshake asking the connector for JSON without raw samples
pub const HANDSHAKE: &str = "{\"enableRawOutput\": false, \"format\": \"Json\"}";

/// Longest status word accepted ("notscanning" and friends)
pub const MAX_STATUS_LEN: usize = 16;

/// Poor signal level above which the headset fit is suspect
pub const POOR_SIGNAL_WARN_LEVEL: u8 = 50;

/// Errors from parsing one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Not a JSON object of the expected shape
    InvalidJson,
    /// Valid JSON but no known field present
    UnknownRecord,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidJson => f.write_str("record is not valid headset JSON"),
            ParseError::UnknownRecord => f.write_str("record carries no known field"),
        }
    }
}

/// Attention and meditation levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ESense {
    pub attention: u8,
    pub meditation: u8,
}

impl ESense {
    pub fn sample(&self) -> BiometricSample {
        BiometricSample::new(self.attention, self.meditation)
    }
}

/// Relative band powers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "camelCase")]
pub struct EegPower {
    pub delta: u32,
    pub theta: u32,
    pub low_alpha: u32,
    pub high_alpha: u32,
    pub low_beta: u32,
    pub high_beta: u32,
    pub low_gamma: u32,
    pub high_gamma: u32,
}

/// One parsed connector record
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadsetPacket {
    #[serde(rename = "eSense")]
    pub esense: Option<ESense>,
    pub eeg_power: Option<EegPower>,
    /// 0 is perfect contact, 200 is no contact
    pub poor_signal_level: Option<u8>,
    /// 1-255
    pub blink_strength: Option<u8>,
    /// Connector status word, e.g. "scanning"
    pub status: Option<String<MAX_STATUS_LEN>>,
    pub raw_eeg: Option<i32>,
    pub mental_effort: Option<f32>,
    pub familiarity: Option<f32>,
}

impl HeadsetPacket {
    fn is_empty(&self) -> bool {
        self.esense.is_none()
            && self.eeg_power.is_none()
            && self.poor_signal_level.is_none()
            && self.blink_strength.is_none()
            && self.status.is_none()
            && self.raw_eeg.is_none()
            && self.mental_effort.is_none()
            && self.familiarity.is_none()
    }

    /// Connector is still searching for the headset
    pub fn is_status(&self) -> bool {
        self.status.is_some()
    }

    /// Signal quality is bad enough to warrant a fit check
    pub fn has_poor_signal(&self) -> bool {
        self.poor_signal_level
            .is_some_and(|level| level > POOR_SIGNAL_WARN_LEVEL)
    }
}

/// Longest record accepted; longer ones are discarded whole
pub const MAX_RECORD_LEN: usize = 1024;

/// Splits the connector byte stream into records
///
/// Records end in `\r`, `\n` or `\r\n`. Empty records are skipped.
#[derive(Debug, Default)]
pub struct RecordFramer {
    buffer: Vec<u8, MAX_RECORD_LEN>,
    overflowed: bool,
}

impl RecordFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed received bytes, calling `on_record` for every complete record
    pub fn feed(&mut self, bytes: &[u8], mut on_record: impl FnMut(&[u8])) {
        for &byte in bytes {
            if byte == b'\r' || byte == b'\n' {
                if !self.overflowed && !self.buffer.is_empty() {
                    on_record(&self.buffer);
                }
                self.buffer.clear();
                self.overflowed = false;
            } else if self.buffer.push(byte).is_err() {
                self.overflowed = true;
            }
        }
    }

    /// Bytes of the incomplete record held so far
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Parse one line from the connector
pub fn parse_record(line: &str) -> Result<HeadsetPacket, ParseError> {
    let mut packet: HeadsetPacket =
        serde_json::from_str(line.trim()).map_err(|_| ParseError::InvalidJson)?;

    if packet.is_empty() {
        return Err(ParseError::UnknownRecord);
    }

    if let Some(esense) = packet.esense.as_mut() {
        esense.attention = esense.attention.min(MAX_LEVEL);
        esense.meditation = esense.meditation.min(MAX_LEVEL);
    }

    Ok(packet)
}
