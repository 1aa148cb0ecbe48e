//! Firmware metadata handler module.
//!
//! Answers the reserved top-of-namespace command range with the firmware
//! name, version triple, and the sanitized build-flag string.

use gpiolink_protocol::{CMD_FIRMWARE_BUILD_FLAGS, CMD_FIRMWARE_INFO, CMD_FIRMWARE_VERSION};

use crate::dispatch::{CommandHandler, Responder};
use crate::modules::ModuleFlags;

/// Default firmware name reported by the simulator.
pub const FIRMWARE_NAME: &str = "GPIO_Link_Firmware_Sim";
/// Firmware version triple reported to the host.
pub const FIRMWARE_VERSION: (u8, u8, u8) = (1, 0, 0);
/// Build-flag token registered by the firmware module itself.
pub const FIRMWARE_FLAG: &str = "FIRMWARE=1.0";

/// Handler for the firmware metadata command range.
pub struct FirmwareInfoHandler {
    name: String,
    version: (u8, u8, u8),
    flags: ModuleFlags,
}

impl FirmwareInfoHandler {
    /// Create a handler reporting the given identity.
    pub fn new(name: impl Into<String>, version: (u8, u8, u8), flags: ModuleFlags) -> Self {
        FirmwareInfoHandler {
            name: name.into(),
            version,
            flags,
        }
    }
}

/// Restrict a flag string to safe tokens.
///
/// Keeps ASCII alphanumerics and `- _ = . / +`; any run of other characters
/// collapses to a single space, and a trailing space is trimmed.
pub fn sanitize_flags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_space = false;
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '=' | '.' | '/' | '+');
        if ok {
            out.push(ch);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

impl CommandHandler for FirmwareInfoHandler {
    fn handle(&mut self, command: u16, _payload: &[u8], responder: &mut Responder<'_>) -> bool {
        match command {
            CMD_FIRMWARE_INFO => {
                responder.send_response(CMD_FIRMWARE_INFO, self.name.as_bytes());
                true
            }

            CMD_FIRMWARE_VERSION => {
                let (major, minor, patch) = self.version;
                responder.send_response(CMD_FIRMWARE_VERSION, &[major, minor, patch]);
                true
            }

            CMD_FIRMWARE_BUILD_FLAGS => {
                let flags = sanitize_flags(&self.flags.joined());
                if flags.is_empty() {
                    responder.send_error();
                } else {
                    responder.send_response(CMD_FIRMWARE_BUILD_FLAGS, flags.as_bytes());
                }
                true
            }

            _ => false,
        }
    }
}
