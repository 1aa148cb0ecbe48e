//! GPIO handler module.
//!
//! Parses the GPIO command range and drives a [`GpioBackend`], the hardware
//! seam. Real firmware maps the backend onto pin registers; the simulator and
//! the tests use [`MockGpio`], an in-memory pin table.
//!
//! Payload conventions follow the original wire users: pins arrive as
//! little-endian `u16`, but a single-byte pin from an older host is accepted
//! everywhere. Commands carrying a value put it after the pin bytes.

use std::collections::HashMap;

use gpiolink_protocol::{
    PullMode, CMD_ANALOG_READ, CMD_ANALOG_WRITE, CMD_DIGITAL_READ, CMD_DIGITAL_WRITE,
    CMD_PIN_MODE_INPUT, CMD_PIN_MODE_OUTPUT, CMD_PIN_SET_PULL, CMD_SERVO_ATTACH,
    RESP_ANALOG_READ, RESP_DIGITAL_READ,
};

use crate::dispatch::{CommandHandler, Responder};

/// Build-flag token registered by the GPIO module.
pub const GPIO_MODULE_FLAG: &str = "GPIO_MODULE=1.0";

/// Hardware seam for pin operations.
pub trait GpioBackend {
    /// Configure a pin direction. `output == false` means input.
    fn pin_mode(&mut self, pin: u16, output: bool);
    /// Configure a pin's pull resistor.
    fn set_pull(&mut self, pin: u16, pull: PullMode);
    /// Drive a digital pin.
    fn digital_write(&mut self, pin: u16, value: bool);
    /// Read a digital pin.
    fn digital_read(&mut self, pin: u16) -> bool;
    /// Write an analog (PWM) duty value.
    fn analog_write(&mut self, pin: u16, value: u16);
    /// Read an analog pin.
    fn analog_read(&mut self, pin: u16) -> u16;
    /// Attach a servo slot to a pin.
    fn attach_servo(&mut self, pin: u16, index: u8);
}

/// State of one simulated pin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    /// True when configured as output.
    pub output: bool,
    /// Pull resistor configuration.
    pub pull: Option<PullMode>,
    /// Digital level.
    pub digital: bool,
    /// Analog value.
    pub analog: u16,
    /// Attached servo slot, if any.
    pub servo: Option<u8>,
}

/// In-memory GPIO backend for the simulator and tests.
#[derive(Debug, Default)]
pub struct MockGpio {
    pins: HashMap<u16, PinState>,
}

impl MockGpio {
    /// Create a mock with all pins floating low.
    pub fn new() -> Self {
        MockGpio::default()
    }

    /// Inspect a pin's state. Untouched pins read as default.
    pub fn pin(&self, pin: u16) -> PinState {
        self.pins.get(&pin).copied().unwrap_or_default()
    }

    /// Preset a digital input level, as if driven externally.
    pub fn set_input(&mut self, pin: u16, value: bool) {
        self.pins.entry(pin).or_default().digital = value;
    }

    /// Preset an analog input value, as if sampled externally.
    pub fn set_analog_input(&mut self, pin: u16, value: u16) {
        self.pins.entry(pin).or_default().analog = value;
    }
}

impl GpioBackend for MockGpio {
    fn pin_mode(&mut self, pin: u16, output: bool) {
        self.pins.entry(pin).or_default().output = output;
        log::debug!("gpio: set pin {} mode={}", pin, if output { "output" } else { "input" });
    }

    fn set_pull(&mut self, pin: u16, pull: PullMode) {
        let state = self.pins.entry(pin).or_default();
        state.output = false;
        state.pull = Some(pull);
        log::debug!("gpio: set pin {} pull={:?}", pin, pull);
    }

    fn digital_write(&mut self, pin: u16, value: bool) {
        self.pins.entry(pin).or_default().digital = value;
        log::debug!("gpio: digital_write pin={} val={}", pin, u8::from(value));
    }

    fn digital_read(&mut self, pin: u16) -> bool {
        let value = self.pin(pin).digital;
        log::debug!("gpio: digital_read pin={} val={}", pin, u8::from(value));
        value
    }

    fn analog_write(&mut self, pin: u16, value: u16) {
        self.pins.entry(pin).or_default().analog = value;
        log::debug!("gpio: analog_write pin={} val={}", pin, value);
    }

    fn analog_read(&mut self, pin: u16) -> u16 {
        let value = self.pin(pin).analog;
        log::debug!("gpio: analog_read pin={} val={}", pin, value);
        value
    }

    fn attach_servo(&mut self, pin: u16, index: u8) {
        let state = self.pins.entry(pin).or_default();
        state.output = true;
        state.servo = Some(index);
        log::debug!("gpio: attach servo idx={} pin={}", index, pin);
    }
}

/// Handler for the GPIO command range.
pub struct GpioHandler<B: GpioBackend> {
    backend: B,
}

impl<B: GpioBackend> GpioHandler<B> {
    /// Create a handler over the given backend.
    pub fn new(backend: B) -> Self {
        GpioHandler { backend }
    }

    /// Access the backend (tests inspect the mock through this).
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Decode a pin number from one or two leading payload bytes.
fn parse_pin(bytes: &[u8]) -> Option<u16> {
    match bytes.len() {
        0 => None,
        1 => Some(u16::from(bytes[0])),
        _ => Some(u16::from_le_bytes([bytes[0], bytes[1]])),
    }
}

impl<B: GpioBackend> CommandHandler for GpioHandler<B> {
    fn handle(&mut self, command: u16, payload: &[u8], responder: &mut Responder<'_>) -> bool {
        match command {
            CMD_PIN_MODE_OUTPUT => {
                if let Some(pin) = parse_pin(payload) {
                    self.backend.pin_mode(pin, true);
                }
                responder.send_ok();
                true
            }

            CMD_PIN_MODE_INPUT => {
                if let Some(pin) = parse_pin(payload) {
                    self.backend.pin_mode(pin, false);
                }
                responder.send_ok();
                true
            }

            CMD_PIN_SET_PULL => {
                // Pull byte last, pin in the leading bytes.
                if payload.len() < 2 {
                    responder.send_error();
                    return true;
                }
                let (pin_bytes, pull) = payload.split_at(payload.len() - 1);
                match parse_pin(pin_bytes) {
                    Some(pin) => {
                        self.backend.set_pull(pin, PullMode::from(pull[0]));
                        responder.send_ok();
                    }
                    None => responder.send_error(),
                }
                true
            }

            CMD_DIGITAL_WRITE => {
                if payload.len() < 2 {
                    responder.send_error();
                    return true;
                }
                let (pin_bytes, value) = payload.split_at(payload.len() - 1);
                match parse_pin(pin_bytes) {
                    Some(pin) => {
                        self.backend.digital_write(pin, value[0] != 0);
                        responder.send_ok();
                    }
                    None => responder.send_error(),
                }
                true
            }

            CMD_DIGITAL_READ => {
                match parse_pin(payload) {
                    Some(pin) => {
                        let value = self.backend.digital_read(pin);
                        let resp = [(pin & 0xFF) as u8, u8::from(value)];
                        responder.send_response(RESP_DIGITAL_READ, &resp);
                    }
                    None => responder.send_error(),
                }
                true
            }

            CMD_ANALOG_WRITE => {
                // Value is the trailing little-endian u16.
                if payload.len() < 3 {
                    responder.send_error();
                    return true;
                }
                let (pin_bytes, value) = payload.split_at(payload.len() - 2);
                match parse_pin(pin_bytes) {
                    Some(pin) => {
                        self.backend
                            .analog_write(pin, u16::from_le_bytes([value[0], value[1]]));
                        responder.send_ok();
                    }
                    None => responder.send_error(),
                }
                true
            }

            CMD_ANALOG_READ => {
                match parse_pin(payload) {
                    Some(pin) => {
                        let value = self.backend.analog_read(pin);
                        let mut resp = [0u8; 4];
                        resp[..2].copy_from_slice(&pin.to_le_bytes());
                        resp[2..].copy_from_slice(&value.to_le_bytes());
                        responder.send_response(RESP_ANALOG_READ, &resp);
                    }
                    None => responder.send_error(),
                }
                true
            }

            CMD_SERVO_ATTACH => {
                if payload.len() < 2 {
                    responder.send_error();
                    return true;
                }
                let (pin_bytes, index) = payload.split_at(payload.len() - 1);
                match parse_pin(pin_bytes) {
                    Some(pin) => {
                        self.backend.attach_servo(pin, index[0]);
                        responder.send_ok();
                    }
                    None => responder.send_error(),
                }
                true
            }

            // Unassigned ids inside the GPIO range: not handled, the
            // dispatcher answers with the error response.
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpiolink_protocol::{Command, FrameCodec, Response};

    fn run(handler: &mut GpioHandler<MockGpio>, command: &Command) -> Vec<Response> {
        let mut sink = Vec::new();
        let frame = command.encode();
        let mut responder = Responder::new(&mut sink);
        assert!(handler.handle(frame.command, &frame.payload, &mut responder));

        let mut codec = FrameCodec::new();
        codec.push(&sink);
        let mut responses = Vec::new();
        while let Some(frame) = codec.decode() {
            responses.push(Response::decode(&frame).unwrap());
        }
        responses
    }

    #[test]
    fn test_digital_write_updates_backend_and_acks() {
        let mut handler = GpioHandler::new(MockGpio::new());
        let responses = run(&mut handler, &Command::DigitalWrite { pin: 5, value: true });

        assert_eq!(responses, vec![Response::Ok]);
        assert!(handler.backend().pin(5).digital);
    }

    #[test]
    fn test_digital_write_single_byte_pin() {
        let mut handler = GpioHandler::new(MockGpio::new());
        let mut sink = Vec::new();
        let mut responder = Responder::new(&mut sink);
        // Older hosts send [pin, value] with a one-byte pin.
        assert!(handler.handle(CMD_DIGITAL_WRITE, &[13, 1], &mut responder));
        assert!(handler.backend().pin(13).digital);
    }

    #[test]
    fn test_digital_write_short_payload_is_rejected() {
        let mut handler = GpioHandler::new(MockGpio::new());
        let mut sink = Vec::new();
        let mut responder = Responder::new(&mut sink);
        // One byte cannot carry pin and value: handled, but with an error.
        assert!(handler.handle(CMD_DIGITAL_WRITE, &[5], &mut responder));

        let mut codec = FrameCodec::new();
        codec.push(&sink);
        let frame = codec.decode().unwrap();
        assert_eq!(Response::decode(&frame).unwrap(), Response::Error);
    }

    #[test]
    fn test_digital_read_reports_pin_and_value() {
        let mut gpio = MockGpio::new();
        gpio.set_input(7, true);
        let mut handler = GpioHandler::new(gpio);

        let responses = run(&mut handler, &Command::DigitalRead { pin: 7 });
        assert_eq!(
            responses,
            vec![Response::DigitalRead {
                pin: 7,
                value: true
            }]
        );
    }

    #[test]
    fn test_analog_roundtrip_through_backend() {
        let mut gpio = MockGpio::new();
        gpio.set_analog_input(3, 1023);
        let mut handler = GpioHandler::new(gpio);

        let responses = run(&mut handler, &Command::AnalogRead { pin: 3 });
        assert_eq!(
            responses,
            vec![Response::AnalogRead {
                pin: 3,
                value: 1023
            }]
        );

        let responses = run(&mut handler, &Command::AnalogWrite { pin: 9, value: 512 });
        assert_eq!(responses, vec![Response::Ok]);
        assert_eq!(handler.backend().pin(9).analog, 512);
    }

    #[test]
    fn test_pin_modes_and_pull() {
        let mut handler = GpioHandler::new(MockGpio::new());

        run(&mut handler, &Command::PinModeOutput { pin: 2 });
        assert!(handler.backend().pin(2).output);

        run(&mut handler, &Command::PinModeInput { pin: 2 });
        assert!(!handler.backend().pin(2).output);

        run(&mut handler, &Command::SetPull { pin: 2, pull: PullMode::Up });
        assert_eq!(handler.backend().pin(2).pull, Some(PullMode::Up));
    }

    #[test]
    fn test_servo_attach() {
        let mut handler = GpioHandler::new(MockGpio::new());
        let responses = run(&mut handler, &Command::ServoAttach { pin: 11, index: 2 });

        assert_eq!(responses, vec![Response::Ok]);
        let state = handler.backend().pin(11);
        assert_eq!(state.servo, Some(2));
        assert!(state.output);
    }

    #[test]
    fn test_unassigned_gpio_command_is_rejected() {
        let mut handler = GpioHandler::new(MockGpio::new());
        let mut sink = Vec::new();
        let mut responder = Responder::new(&mut sink);
        assert!(!handler.handle(0x00F0, &[], &mut responder));
        assert!(sink.is_empty());
    }
}
