//! Responses received from GPIO-Link firmware.

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::Frame;

/// Responses received from the firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Generic OK response.
    Ok,

    /// Generic error response (unknown command or handler failure).
    Error,

    /// Digital read result.
    DigitalRead {
        /// Pin number (low byte, as reported by the firmware).
        pin: u8,
        /// Level read.
        value: bool,
    },

    /// Analog read result.
    AnalogRead {
        /// Pin number.
        pin: u16,
        /// Value read.
        value: u16,
    },

    /// Firmware name.
    FirmwareInfo {
        /// Human-readable firmware name.
        name: String,
    },

    /// Firmware version triple.
    FirmwareVersion {
        /// Major version.
        major: u8,
        /// Minor version.
        minor: u8,
        /// Patch version.
        patch: u8,
    },

    /// Sanitized build-flag string.
    BuildFlags {
        /// Space-separated flag tokens.
        flags: String,
    },

    /// A response code this crate does not know about (custom modules).
    Other {
        /// Response identifier.
        command: u16,
        /// Raw payload bytes.
        payload: Vec<u8>,
    },
}

impl Response {
    /// Decode a response from a frame.
    pub fn decode(frame: &Frame) -> Result<Self, ProtocolError> {
        let payload = &frame.payload;

        match frame.command {
            RESP_OK => Ok(Response::Ok),

            RESP_ERROR => Ok(Response::Error),

            RESP_DIGITAL_READ => {
                if payload.len() < 2 {
                    return Err(ProtocolError::FrameTooShort {
                        expected: 2,
                        actual: payload.len(),
                    });
                }
                Ok(Response::DigitalRead {
                    pin: payload[0],
                    value: payload[1] != 0,
                })
            }

            RESP_ANALOG_READ => {
                if payload.len() < 4 {
                    return Err(ProtocolError::FrameTooShort {
                        expected: 4,
                        actual: payload.len(),
                    });
                }
                Ok(Response::AnalogRead {
                    pin: u16::from_le_bytes([payload[0], payload[1]]),
                    value: u16::from_le_bytes([payload[2], payload[3]]),
                })
            }

            CMD_FIRMWARE_INFO => Ok(Response::FirmwareInfo {
                name: decode_string(payload)?,
            }),

            CMD_FIRMWARE_VERSION => {
                if payload.len() < 3 {
                    return Err(ProtocolError::FrameTooShort {
                        expected: 3,
                        actual: payload.len(),
                    });
                }
                Ok(Response::FirmwareVersion {
                    major: payload[0],
                    minor: payload[1],
                    patch: payload[2],
                })
            }

            CMD_FIRMWARE_BUILD_FLAGS => Ok(Response::BuildFlags {
                flags: decode_string(payload)?,
            }),

            command => Ok(Response::Other {
                command,
                payload: payload.clone(),
            }),
        }
    }
}

/// Decode a UTF-8 string payload.
fn decode_string(payload: &[u8]) -> Result<String, ProtocolError> {
    String::from_utf8(payload.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
}
