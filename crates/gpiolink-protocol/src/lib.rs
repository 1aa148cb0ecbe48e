//! GPIO-Link Serial Command Protocol
//!
//! This crate provides types and utilities for communicating with GPIO-Link
//! firmware over a serial byte stream. The protocol uses framed binary
//! messages keyed by a 16-bit command identifier.
//!
//! # Protocol Overview
//!
//! The firmware exposes a serial interface that lets a host application drive
//! the device's pins and query firmware metadata. Every message on the wire
//! is a frame:
//!
//! ```text
//! +--------+---------+---------+------------------+----------+
//! | 0xAA   | cmd u16 | len u16 | payload[0..len]  | checksum |
//! +--------+---------+---------+------------------+----------+
//! ```
//!
//! Multi-byte fields are little-endian. The checksum is the low byte of
//! `cmd + len + sum(payload)`.
//!
//! Command identifiers are partitioned by convention: GPIO operations live in
//! `0x0000..=0x00FF` and firmware metadata in `0xFFFD..=0xFFFF`. Responses
//! from the device reuse the same frame layout.
//!
//! # Example
//!
//! ```rust,ignore
//! use gpiolink_protocol::{Command, HostSession};
//!
//! let mut session = HostSession::new();
//! let bytes = session.encode_command(&Command::DigitalWrite { pin: 5, value: true });
//! // write `bytes` to the serial port, feed whatever comes back:
//! session.feed(&received);
//! let response = session.try_decode()?;
//! ```

mod commands;
mod constants;
mod error;
mod frame;
mod responses;

pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use responses::*;
