//! # gpiolink-firmware
//!
//! Device-side implementation of the GPIO-Link serial protocol: a command
//! dispatcher that frames an incoming byte stream, validates checksums, and
//! routes commands to handler modules registered over disjoint id ranges.
//!
//! The design mirrors a polled microcontroller main loop: the caller feeds
//! whatever bytes arrived since the last poll into [`Device::process_bytes`],
//! and handlers write response frames to the outbound [`SerialSink`]
//! immediately. Nothing blocks; partial frames simply wait in the bounded
//! accumulator until more bytes arrive.
//!
//! ## Usage
//!
//! ```rust
//! use gpiolink_firmware::{Device, MockGpio};
//!
//! let mut device = Device::new(Vec::new(), MockGpio::new());
//! // feed serial bytes as they arrive:
//! device.process_bytes(&[0x01, 0x02]);
//! // responses accumulate in the sink (here a Vec<u8>).
//! let outbound = device.sink();
//! ```

mod device;
mod dispatch;
mod firmware_info;
mod gpio;
mod modules;

pub use device::*;
pub use dispatch::*;
pub use firmware_info::*;
pub use gpio::*;
pub use modules::*;
