//! Command dispatcher: handler registry, dispatch loop, and response encoder.
//!
//! Handlers register over closed command-id intervals. Dispatch is a linear
//! scan in registration order; the first entry whose range contains the
//! command id is invoked and terminates the search regardless of whether it
//! accepted the command. An unmatched or rejected command produces the
//! reserved error response.

use gpiolink_protocol::{Frame, FrameCodec, FRAME_MARKER, MAX_PAYLOAD_SIZE, RESP_ERROR, RESP_OK};

/// Maximum number of handler registrations.
pub const MAX_HANDLERS: usize = 12;

/// Outbound transport boundary: an ordered byte sink.
///
/// Writes are immediate; any buffering or backpressure is the transport's
/// concern, not the dispatcher's.
pub trait SerialSink {
    /// Write bytes to the transport.
    fn write(&mut self, bytes: &[u8]);
}

/// `Vec<u8>` collects written bytes, which is what tests want.
impl SerialSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Response encoder bound to a sink for the duration of one dispatch.
///
/// Handlers use this to emit response frames in the same wire format as
/// incoming commands.
pub struct Responder<'a> {
    sink: &'a mut dyn SerialSink,
}

impl<'a> Responder<'a> {
    /// Create a responder writing to the given sink.
    pub fn new(sink: &'a mut dyn SerialSink) -> Self {
        Responder { sink }
    }

    /// Encode and send a response frame.
    pub fn send_response(&mut self, command: u16, payload: &[u8]) {
        // The length field is 16 bits; anything longer cannot be framed.
        let payload = &payload[..payload.len().min(MAX_PAYLOAD_SIZE)];
        let len = payload.len() as u16;
        let mut buf = Vec::with_capacity(6 + payload.len());
        buf.push(FRAME_MARKER);
        buf.extend_from_slice(&command.to_le_bytes());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(payload);
        buf.push(Frame::checksum(command, len, payload));
        self.sink.write(&buf);
    }

    /// Send the reserved OK response (empty payload).
    pub fn send_ok(&mut self) {
        self.send_response(RESP_OK, &[]);
    }

    /// Send the reserved error response (empty payload).
    pub fn send_error(&mut self) {
        self.send_response(RESP_ERROR, &[]);
    }
}

/// A module that handles commands from some id range.
///
/// Returns `true` when the command was handled (including handled-by-sending-
/// an-error), `false` to signal rejection. Handlers are expected to be short
/// and non-blocking; the dispatcher offers no timeout for a misbehaving one.
pub trait CommandHandler {
    /// Handle one command.
    fn handle(&mut self, command: u16, payload: &[u8], responder: &mut Responder<'_>) -> bool;
}

struct HandlerEntry {
    start: u16,
    end: u16,
    handler: Box<dyn CommandHandler>,
}

/// Owns the receive accumulator, the handler table, and the outbound sink.
pub struct Dispatcher<S: SerialSink> {
    codec: FrameCodec,
    handlers: Vec<HandlerEntry>,
    sink: S,
}

impl<S: SerialSink> Dispatcher<S> {
    /// Create a dispatcher with the default accumulator capacity.
    pub fn new(sink: S) -> Self {
        Dispatcher {
            codec: FrameCodec::new(),
            handlers: Vec::with_capacity(MAX_HANDLERS),
            sink,
        }
    }

    /// Create a dispatcher with an explicit accumulator capacity.
    pub fn with_capacity(sink: S, capacity: usize) -> Self {
        Dispatcher {
            codec: FrameCodec::with_capacity(capacity),
            handlers: Vec::with_capacity(MAX_HANDLERS),
            sink,
        }
    }

    /// Register a handler for the closed interval `[start, end]`.
    ///
    /// Returns `false` without inserting when the table is full. Overlapping
    /// ranges are not rejected; registration order decides precedence.
    pub fn register(&mut self, start: u16, end: u16, handler: Box<dyn CommandHandler>) -> bool {
        if self.handlers.len() >= MAX_HANDLERS {
            return false;
        }
        self.handlers.push(HandlerEntry {
            start,
            end,
            handler,
        });
        true
    }

    /// Feed incoming serial bytes and dispatch every complete frame found.
    ///
    /// Frames are dispatched in the exact order their bytes arrived. Garbage
    /// bytes and checksum failures are consumed silently by the codec.
    pub fn process_bytes(&mut self, data: &[u8]) {
        self.codec.push(data);
        while let Some(frame) = self.codec.decode() {
            self.dispatch(&frame);
        }
    }

    /// Route one frame to the first handler whose range contains its command.
    fn dispatch(&mut self, frame: &Frame) {
        let mut responder = Responder::new(&mut self.sink);
        let mut handled = false;
        for entry in self.handlers.iter_mut() {
            if frame.command >= entry.start && frame.command <= entry.end {
                handled = entry
                    .handler
                    .handle(frame.command, &frame.payload, &mut responder);
                // First match terminates the scan, even when the handler
                // rejected the command.
                break;
            }
        }
        if !handled {
            log::debug!("command 0x{:04X} not handled, answering error", frame.command);
            responder.send_error();
        }
    }

    /// Access the outbound sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the outbound sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Number of bytes waiting in the receive accumulator.
    pub fn buffered_len(&self) -> usize {
        self.codec.buffered_len()
    }
}
