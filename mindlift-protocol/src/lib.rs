//! Mindlift wire formats
//!
//! This crate covers the three byte streams the controller speaks:
//!
//! - **Headset**: the ThinkGear connector sends one JSON object per line
//!   after a JSON handshake. [`headset`] parses a line into a
//!   [`HeadsetPacket`].
//! - **URScript**: commands sent to the robot's secondary interface are
//!   single script lines. [`urscript`] renders them into fixed-size buffers.
//! - **Modbus TCP**: the tool pose is read from holding registers on the
//!   robot's Modbus server. [`modbus`] builds the request and decodes the
//!   response.
//!
//! ```text
//! ┌────────────────┬─────────┬───────────────────────────────────────┐
//! │ Stream         │ Port    │ Unit                                  │
//! ├────────────────┼─────────┼───────────────────────────────────────┤
//! │ ThinkGear JSON │ 13854   │ 0-100 levels                          │
//! │ URScript       │ 30002   │ m, rad                                │
//! │ Modbus TCP     │ 502     │ 0.1 mm, mrad (signed 16-bit registers)│
//! └────────────────┴─────────┴───────────────────────────────────────┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod headset;
pub mod modbus;
pub mod urscript;

pub use headset::{parse_record, EegPower, ESense, HeadsetPacket, ParseError, RecordFramer, HANDSHAKE};
pub use modbus::{MbapHeader, ModbusError, PoseRequest};
pub use urscript::{EncodeError, Script};
