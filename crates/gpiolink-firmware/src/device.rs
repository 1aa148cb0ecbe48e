//! Device wiring: dispatcher construction and startup registration.

use gpiolink_protocol::{FIRMWARE_CMD_END, FIRMWARE_CMD_START, GPIO_CMD_END, GPIO_CMD_START};

use crate::dispatch::{CommandHandler, Dispatcher, SerialSink};
use crate::firmware_info::{FirmwareInfoHandler, FIRMWARE_FLAG, FIRMWARE_NAME, FIRMWARE_VERSION};
use crate::gpio::{GpioBackend, GpioHandler, GPIO_MODULE_FLAG};
use crate::modules::{board_flags, ModuleFlags};

/// Banner emitted at startup so the host can handshake past bootloader noise.
pub const READY_BANNER: &[u8] = b"GPIO_READY\r\n";

/// A complete simulated GPIO-Link device.
///
/// Owns the dispatcher and performs the startup sequence real firmware does
/// in `setup()`: register the GPIO handler and the firmware-info handler over
/// their conventional ranges, collect module build flags, and emit the ready
/// banner.
pub struct Device<S: SerialSink> {
    dispatcher: Dispatcher<S>,
}

impl<S: SerialSink> Device<S> {
    /// Create a device with the default accumulator capacity.
    pub fn new<B: GpioBackend + 'static>(sink: S, backend: B) -> Self {
        Self::with_capacity(sink, backend, gpiolink_protocol::DEFAULT_ACCUMULATOR_CAPACITY)
    }

    /// Create a device with an explicit accumulator capacity.
    pub fn with_capacity<B: GpioBackend + 'static>(
        mut sink: S,
        backend: B,
        capacity: usize,
    ) -> Self {
        sink.write(READY_BANNER);

        let mut flags = ModuleFlags::new();
        flags.add(FIRMWARE_FLAG);
        flags.add(GPIO_MODULE_FLAG);
        flags.add(&board_flags());

        let mut dispatcher = Dispatcher::with_capacity(sink, capacity);
        dispatcher.register(GPIO_CMD_START, GPIO_CMD_END, Box::new(GpioHandler::new(backend)));
        dispatcher.register(
            FIRMWARE_CMD_START,
            FIRMWARE_CMD_END,
            Box::new(FirmwareInfoHandler::new(
                FIRMWARE_NAME,
                FIRMWARE_VERSION,
                flags,
            )),
        );

        Device { dispatcher }
    }

    /// Register an additional handler module.
    ///
    /// Returns `false` when the handler table is full. Ranges registered here
    /// come after the built-in GPIO and firmware handlers in precedence.
    pub fn register(&mut self, start: u16, end: u16, handler: Box<dyn CommandHandler>) -> bool {
        self.dispatcher.register(start, end, handler)
    }

    /// Feed incoming serial bytes; complete frames dispatch immediately.
    pub fn process_bytes(&mut self, data: &[u8]) {
        self.dispatcher.process_bytes(data);
    }

    /// Access the outbound sink.
    pub fn sink(&self) -> &S {
        self.dispatcher.sink()
    }

    /// Mutable access to the outbound sink.
    pub fn sink_mut(&mut self) -> &mut S {
        self.dispatcher.sink_mut()
    }
}
