//! Protocol constants
//!
//! These constants define the command codes, response codes, and framing
//! values used on the GPIO-Link serial protocol.

// ============================================================================
// Framing
// ============================================================================

/// Marker byte starting every frame.
pub const FRAME_MARKER: u8 = 0xAA;
/// Bytes before the payload: marker + command (2) + payload length (2).
pub const FRAME_HEADER_SIZE: usize = 5;
/// Smallest possible frame: header plus checksum, zero-length payload.
pub const MIN_FRAME_SIZE: usize = FRAME_HEADER_SIZE + 1;
/// Largest payload expressible in the 16-bit length field.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;
/// Default capacity of the receive accumulator.
pub const DEFAULT_ACCUMULATOR_CAPACITY: usize = 512;

// ============================================================================
// GPIO command codes (host → device, 0x0000..=0x00FF by convention)
// ============================================================================

/// First command id of the GPIO range.
pub const GPIO_CMD_START: u16 = 0x0000;
/// Last command id of the GPIO range (inclusive).
pub const GPIO_CMD_END: u16 = 0x00FF;

/// Configure a pin as a digital output.
pub const CMD_PIN_MODE_OUTPUT: u16 = 0x0000;
/// Configure a pin as a digital input.
pub const CMD_PIN_MODE_INPUT: u16 = 0x0001;
/// Configure a pin's pull resistor (none / up / down).
pub const CMD_PIN_SET_PULL: u16 = 0x0002;
/// Read a digital pin.
pub const CMD_DIGITAL_READ: u16 = 0x0010;
/// Write a digital pin.
pub const CMD_DIGITAL_WRITE: u16 = 0x0011;
/// Read an analog pin.
pub const CMD_ANALOG_READ: u16 = 0x0012;
/// Write an analog (PWM) value to a pin.
pub const CMD_ANALOG_WRITE: u16 = 0x0013;
/// Attach a servo slot to a pin.
pub const CMD_SERVO_ATTACH: u16 = 0x0020;

// ============================================================================
// Firmware metadata command codes (host → device, 0xFFFD..=0xFFFF)
// ============================================================================

/// First command id of the firmware metadata range.
pub const FIRMWARE_CMD_START: u16 = 0xFFFD;
/// Last command id of the firmware metadata range (inclusive).
pub const FIRMWARE_CMD_END: u16 = 0xFFFF;

/// Request the sanitized build-flag string.
pub const CMD_FIRMWARE_BUILD_FLAGS: u16 = 0xFFFD;
/// Request the firmware name.
pub const CMD_FIRMWARE_INFO: u16 = 0xFFFE;
/// Request the firmware version triple.
pub const CMD_FIRMWARE_VERSION: u16 = 0xFFFF;

// ============================================================================
// Response codes (device → host)
// ============================================================================

/// Command succeeded; empty payload.
pub const RESP_OK: u16 = 0x1000;
/// Command failed or was not recognized; empty payload.
pub const RESP_ERROR: u16 = 0x1001;
/// Digital read result: `[pin, value]`.
pub const RESP_DIGITAL_READ: u16 = 0x1010;
/// Analog read result: `[pin_lo, pin_hi, value_lo, value_hi]`.
pub const RESP_ANALOG_READ: u16 = 0x1012;
