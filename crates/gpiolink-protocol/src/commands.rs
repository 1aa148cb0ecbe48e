//! Commands that can be sent to GPIO-Link firmware.

use crate::constants::*;
use crate::frame::Frame;

/// Pull resistor configuration for an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullMode {
    /// No pull resistor.
    None,
    /// Pull-up resistor.
    Up,
    /// Pull-down resistor (falls back to floating input on boards without one).
    Down,
}

impl From<PullMode> for u8 {
    fn from(mode: PullMode) -> Self {
        match mode {
            PullMode::None => 0,
            PullMode::Up => 1,
            PullMode::Down => 2,
        }
    }
}

impl From<u8> for PullMode {
    fn from(value: u8) -> Self {
        match value {
            1 => PullMode::Up,
            2 => PullMode::Down,
            _ => PullMode::None,
        }
    }
}

/// Commands that can be sent to the firmware.
///
/// Pin numbers are always encoded as little-endian `u16` on the wire; the
/// firmware also accepts single-byte pins from older hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Configure a pin as a digital output.
    PinModeOutput {
        /// Pin number.
        pin: u16,
    },

    /// Configure a pin as a digital input.
    PinModeInput {
        /// Pin number.
        pin: u16,
    },

    /// Configure a pin's pull resistor.
    SetPull {
        /// Pin number.
        pin: u16,
        /// Pull mode.
        pull: PullMode,
    },

    /// Read a digital pin. The device answers with a digital-read response.
    DigitalRead {
        /// Pin number.
        pin: u16,
    },

    /// Write a digital pin.
    DigitalWrite {
        /// Pin number.
        pin: u16,
        /// Level to drive.
        value: bool,
    },

    /// Read an analog pin. The device answers with an analog-read response.
    AnalogRead {
        /// Pin number.
        pin: u16,
    },

    /// Write an analog (PWM) value to a pin.
    AnalogWrite {
        /// Pin number.
        pin: u16,
        /// Duty value.
        value: u16,
    },

    /// Attach a servo slot to a pin.
    ServoAttach {
        /// Pin number.
        pin: u16,
        /// Servo slot index.
        index: u8,
    },

    /// Request the sanitized build-flag string.
    FirmwareBuildFlags,

    /// Request the firmware name.
    FirmwareInfo,

    /// Request the firmware version triple.
    FirmwareVersion,

    /// Raw escape hatch for command ranges registered by custom modules.
    Raw {
        /// Command identifier.
        command: u16,
        /// Raw payload bytes.
        payload: Vec<u8>,
    },
}

impl Command {
    /// The command identifier this encodes to.
    pub fn command_id(&self) -> u16 {
        match self {
            Command::PinModeOutput { .. } => CMD_PIN_MODE_OUTPUT,
            Command::PinModeInput { .. } => CMD_PIN_MODE_INPUT,
            Command::SetPull { .. } => CMD_PIN_SET_PULL,
            Command::DigitalRead { .. } => CMD_DIGITAL_READ,
            Command::DigitalWrite { .. } => CMD_DIGITAL_WRITE,
            Command::AnalogRead { .. } => CMD_ANALOG_READ,
            Command::AnalogWrite { .. } => CMD_ANALOG_WRITE,
            Command::ServoAttach { .. } => CMD_SERVO_ATTACH,
            Command::FirmwareBuildFlags => CMD_FIRMWARE_BUILD_FLAGS,
            Command::FirmwareInfo => CMD_FIRMWARE_INFO,
            Command::FirmwareVersion => CMD_FIRMWARE_VERSION,
            Command::Raw { command, .. } => *command,
        }
    }

    /// Encode this command as a frame.
    pub fn encode(&self) -> Frame {
        let mut payload = Vec::new();

        match self {
            Command::PinModeOutput { pin }
            | Command::PinModeInput { pin }
            | Command::DigitalRead { pin }
            | Command::AnalogRead { pin } => {
                payload.extend_from_slice(&pin.to_le_bytes());
            }

            Command::SetPull { pin, pull } => {
                payload.extend_from_slice(&pin.to_le_bytes());
                payload.push((*pull).into());
            }

            Command::DigitalWrite { pin, value } => {
                payload.extend_from_slice(&pin.to_le_bytes());
                payload.push(u8::from(*value));
            }

            Command::AnalogWrite { pin, value } => {
                payload.extend_from_slice(&pin.to_le_bytes());
                payload.extend_from_slice(&value.to_le_bytes());
            }

            Command::ServoAttach { pin, index } => {
                payload.extend_from_slice(&pin.to_le_bytes());
                payload.push(*index);
            }

            Command::FirmwareBuildFlags | Command::FirmwareInfo | Command::FirmwareVersion => {}

            Command::Raw { payload: raw, .. } => {
                payload.extend_from_slice(raw);
            }
        }

        Frame {
            command: self.command_id(),
            payload,
        }
    }
}
