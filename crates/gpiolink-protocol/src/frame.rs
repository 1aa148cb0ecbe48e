//! Frame encoding/decoding utilities.
//!
//! Every protocol message is carried in a single frame:
//!
//! ```text
//! +--------+--------+--------+--------+--------+------------------+----------+
//! | 0xAA   | cmd_lo | cmd_hi | len_lo | len_hi | payload[0..len]  | checksum |
//! +--------+--------+--------+--------+--------+------------------+----------+
//! ```
//!
//! The checksum is the low byte of `cmd + len + sum(payload)`. Incoming bytes
//! are collected in a bounded accumulator and scanned incrementally, so the
//! reader never blocks on a full packet: partial frames stay buffered, stray
//! bytes are discarded one at a time until a valid frame start is found.

use bytes::{Buf, BufMut, BytesMut};

use crate::constants::*;
use crate::error::ProtocolError;

/// A parsed or constructed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command or response identifier.
    pub command: u16,
    /// Payload data.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame, validating the payload length.
    pub fn new(command: u16, payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                max: MAX_PAYLOAD_SIZE,
                actual: payload.len(),
            });
        }
        Ok(Frame {
            command,
            payload: payload.to_vec(),
        })
    }

    /// Create a frame with no payload.
    pub fn empty(command: u16) -> Self {
        Frame {
            command,
            payload: Vec::new(),
        }
    }

    /// Compute the additive checksum over the command, length, and payload.
    pub fn checksum(command: u16, payload_len: u16, payload: &[u8]) -> u8 {
        let mut sum = u32::from(command) + u32::from(payload_len);
        for &byte in payload {
            sum = sum.wrapping_add(u32::from(byte));
        }
        (sum & 0xFF) as u8
    }

    /// Encode this frame into wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let len = self.payload.len() as u16;
        let mut buf = Vec::with_capacity(MIN_FRAME_SIZE + self.payload.len());
        buf.push(FRAME_MARKER);
        buf.put_u16_le(self.command);
        buf.put_u16_le(len);
        buf.extend_from_slice(&self.payload);
        buf.push(Self::checksum(self.command, len, &self.payload));
        buf
    }
}

/// A codec for extracting frames from a raw byte stream.
///
/// The codec owns a bounded accumulator with drop-oldest overflow semantics:
/// when incoming bytes would exceed the capacity, the oldest buffered bytes
/// are silently discarded first. This matches a best-effort polled serial
/// link where the far end has no flow control.
#[derive(Debug)]
pub struct FrameCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
    /// Fixed accumulator capacity.
    capacity: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    /// Create a codec with the default accumulator capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ACCUMULATOR_CAPACITY)
    }

    /// Create a codec with an explicit accumulator capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        FrameCodec {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Add received data to the accumulator.
    ///
    /// Overflow is lossy by design: the oldest bytes are dropped to make
    /// room, and a chunk larger than the whole capacity clears the buffer
    /// and keeps only the tail that fits. No error is reported.
    pub fn push(&mut self, data: &[u8]) {
        let data = if data.len() > self.capacity {
            log::warn!(
                "accumulator overflow: chunk of {} bytes exceeds capacity {}",
                data.len(),
                self.capacity
            );
            self.buffer.clear();
            &data[data.len() - self.capacity..]
        } else {
            data
        };
        let total = self.buffer.len() + data.len();
        if total > self.capacity {
            let drop = total - self.capacity;
            log::warn!("accumulator overflow: dropping {} oldest bytes", drop);
            self.buffer.advance(drop);
        }
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete, checksum-valid frame.
    ///
    /// Scans from the front of the accumulator, discarding one byte at a
    /// time until a marker with a valid checksum is found (resync). Returns
    /// `None` when the buffered bytes cannot yet contain a complete frame;
    /// everything from the candidate marker onward stays buffered for the
    /// next call. Repeated calls drain all complete frames in arrival order.
    pub fn decode(&mut self) -> Option<Frame> {
        loop {
            // Resynchronize: skip anything before a marker byte.
            while !self.buffer.is_empty() && self.buffer[0] != FRAME_MARKER {
                self.buffer.advance(1);
            }

            if self.buffer.len() < MIN_FRAME_SIZE {
                return None;
            }

            let command = u16::from_le_bytes([self.buffer[1], self.buffer[2]]);
            let payload_len = u16::from_le_bytes([self.buffer[3], self.buffer[4]]) as usize;
            let total_len = FRAME_HEADER_SIZE + payload_len + 1;

            // Partial frame: wait for more bytes.
            if self.buffer.len() < total_len {
                return None;
            }

            let payload = &self.buffer[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + payload_len];
            let expected = Frame::checksum(command, payload_len as u16, payload);
            if self.buffer[total_len - 1] != expected {
                // Spurious marker. Advance a single byte, not the whole
                // candidate frame: a byte inside it may start the next
                // real frame.
                log::trace!("checksum mismatch at marker, resyncing");
                self.buffer.advance(1);
                continue;
            }

            let payload = payload.to_vec();
            self.buffer.advance(total_len);
            return Some(Frame { command, payload });
        }
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Get the accumulator capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the accumulator.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// A simple synchronous host-side session.
///
/// This can be used with any ordered byte stream (serial port, TCP socket,
/// etc.): encode typed commands for transmission, feed whatever bytes arrive,
/// and poll for decoded responses.
#[derive(Debug, Default)]
pub struct HostSession {
    codec: FrameCodec,
}

impl HostSession {
    /// Create a new session.
    pub fn new() -> Self {
        HostSession {
            codec: FrameCodec::new(),
        }
    }

    /// Encode a command for transmission.
    pub fn encode_command(&self, command: &crate::Command) -> Vec<u8> {
        command.encode().encode()
    }

    /// Feed received data into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        self.codec.push(data);
    }

    /// Try to decode the next response.
    ///
    /// Returns `Ok(Some(response))` if a complete frame was decoded,
    /// `Ok(None)` if more data is needed, or `Err` if the frame's payload
    /// did not match its response code.
    pub fn try_decode(&mut self) -> Result<Option<crate::Response>, ProtocolError> {
        match self.codec.decode() {
            Some(frame) => Ok(Some(crate::Response::decode(&frame)?)),
            None => Ok(None),
        }
    }

    /// Reset the session state.
    pub fn reset(&mut self) {
        self.codec.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_matches_definition() {
        let payload = [5u8, 1, 200];
        let expected = ((0x0011u32 + 3 + 5 + 1 + 200) % 256) as u8;
        assert_eq!(Frame::checksum(0x0011, 3, &payload), expected);
    }

    #[test]
    fn test_encode_layout() {
        let frame = Frame::new(0x0011, &[5, 1]).unwrap();
        let bytes = frame.encode();

        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[0], FRAME_MARKER);
        assert_eq!(bytes[1], 0x11); // command low byte
        assert_eq!(bytes[2], 0x00); // command high byte
        assert_eq!(bytes[3], 2); // length low byte
        assert_eq!(bytes[4], 0); // length high byte
        assert_eq!(bytes[5], 5);
        assert_eq!(bytes[6], 1);
        assert_eq!(bytes[7], Frame::checksum(0x0011, 2, &[5, 1]));
    }

    #[test]
    fn test_roundtrip() {
        let original = Frame::new(0xFFFF, &[1, 2, 3, 4, 5]).unwrap();
        let mut codec = FrameCodec::new();
        codec.push(&original.encode());

        let decoded = codec.decode().expect("should decode frame");
        assert_eq!(decoded, original);
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let original = Frame::empty(0x1000);
        let mut codec = FrameCodec::new();
        codec.push(&original.encode());

        let decoded = codec.decode().expect("should decode frame");
        assert_eq!(decoded.command, 0x1000);
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_partial_frame_waits() {
        let encoded = Frame::new(0x0010, &[7, 0]).unwrap().encode();
        let mut codec = FrameCodec::new();

        // Feed everything but the checksum byte.
        codec.push(&encoded[..encoded.len() - 1]);
        assert!(codec.decode().is_none());
        // The candidate frame must stay buffered.
        assert_eq!(codec.buffered_len(), encoded.len() - 1);

        codec.push(&encoded[encoded.len() - 1..]);
        let decoded = codec.decode().expect("should decode after completion");
        assert_eq!(decoded.command, 0x0010);
    }

    #[test]
    fn test_multiple_frames_one_push() {
        let first = Frame::new(0x0011, &[5, 1]).unwrap();
        let second = Frame::empty(0xFFFF);
        let mut data = first.encode();
        data.extend_from_slice(&second.encode());

        let mut codec = FrameCodec::new();
        codec.push(&data);

        assert_eq!(codec.decode().unwrap(), first);
        assert_eq!(codec.decode().unwrap(), second);
        assert!(codec.decode().is_none());
    }

    #[test]
    fn test_resync_discards_exactly_garbage_prefix() {
        let frame = Frame::empty(0xFFFF);
        let garbage = [0x01u8, 0x02, 0x03, 0x04, 0x05];
        let mut data = garbage.to_vec();
        data.extend_from_slice(&frame.encode());

        let mut codec = FrameCodec::new();
        codec.push(&data);

        let decoded = codec.decode().expect("should find frame after garbage");
        assert_eq!(decoded.command, 0xFFFF);
        // Exactly the garbage and the frame are gone, nothing else.
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_corrupt_byte_rejected_then_resync() {
        let frame = Frame::new(0x0011, &[5, 1]).unwrap();
        let encoded = frame.encode();

        // Corrupt the marker, command low byte, payload, and checksum bytes
        // in turn; the damaged frame must never dispatch, and a clean copy
        // following it must still be recognized. (Length-field corruption is
        // covered separately: the parser cannot detect it until the claimed
        // length worth of bytes has arrived. The command high byte is also
        // separate: the additive checksum cannot see it.)
        for i in [0usize, 1, 5, 6, 7] {
            let mut corrupted = encoded.clone();
            corrupted[i] ^= 0xFF;

            let mut codec = FrameCodec::new();
            codec.push(&corrupted);
            codec.push(&encoded);

            let decoded = codec.decode().expect("clean frame should decode");
            assert_eq!(decoded, frame);
            assert!(codec.decode().is_none());
        }
    }

    #[test]
    fn test_command_high_byte_corruption_is_undetectable() {
        // The checksum is the low byte of cmd + len + sum(payload), so the
        // high bytes of the command and length fields never affect it.
        // Flipping the command high byte yields a frame the codec must
        // accept, just with a different command id. Known limitation of the
        // wire format, recorded here on purpose.
        let mut corrupted = Frame::new(0x0011, &[5, 1]).unwrap().encode();
        corrupted[2] ^= 0xFF;

        let mut codec = FrameCodec::new();
        codec.push(&corrupted);

        let decoded = codec.decode().expect("checksum cannot catch this");
        assert_eq!(decoded.command, 0xFF11);
        assert_eq!(decoded.payload, vec![5, 1]);
    }

    #[test]
    fn test_corrupt_length_never_dispatches() {
        let frame = Frame::new(0x0011, &[5, 1]).unwrap();
        let mut corrupted = frame.encode();
        corrupted[3] ^= 0xFF; // inflate the claimed payload length

        let mut codec = FrameCodec::new();
        codec.push(&corrupted);

        // The candidate now claims more bytes than arrived: parse must stall
        // rather than dispatch garbage.
        assert!(codec.decode().is_none());
        assert_eq!(codec.buffered_len(), corrupted.len());
    }

    #[test]
    fn test_marker_inside_rejected_candidate_is_rescanned() {
        // A bogus marker whose claimed 6-byte span overlaps the start of the
        // real frame. Rejecting it must advance a single byte, not the whole
        // candidate, or the real frame would be swallowed with it.
        let frame = Frame::new(0x0011, &[5, 1]).unwrap();
        let mut data = vec![FRAME_MARKER, 0x05, 0x00, 0x07, 0x00];
        data.extend_from_slice(&frame.encode());

        let mut codec = FrameCodec::new();
        codec.push(&data);

        let decoded = codec.decode().expect("overlapped frame should decode");
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut codec = FrameCodec::with_capacity(8);
        codec.push(&[1, 2, 3, 4, 5, 6]);
        codec.push(&[7, 8, 9, 10]);

        // Capacity 8: bytes 1 and 2 were dropped.
        assert_eq!(codec.buffered_len(), 8);
        assert!(codec.decode().is_none());
        assert_eq!(codec.buffered_len(), 0); // all garbage skipped
    }

    #[test]
    fn test_overflow_retains_most_recent_capacity_bytes() {
        // A frame pushed after an oversized chunk must still decode once the
        // garbage is scanned away.
        let mut codec = FrameCodec::with_capacity(16);
        codec.push(&[0u8; 64]); // clears, keeps tail of zeros
        let frame = Frame::empty(0x1000);
        codec.push(&frame.encode());

        let decoded = codec.decode().expect("frame after overflow");
        assert_eq!(decoded.command, 0x1000);
    }

    #[test]
    fn test_overflow_drops_exactly_the_oldest_bytes() {
        // Capacity sized to one frame: pushing garbage first, then the
        // frame, must push out exactly the garbage and leave the frame
        // intact and decodable.
        let frame = Frame::new(0x0011, &[5, 0, 1]).unwrap();
        let encoded = frame.encode();

        let mut codec = FrameCodec::with_capacity(encoded.len());
        codec.push(&[0xDE, 0xAD, 0xBE]);
        codec.push(&encoded);

        let decoded = codec.decode().expect("frame should survive overflow");
        assert_eq!(decoded, frame);
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_oversized_chunk_keeps_tail() {
        let mut codec = FrameCodec::with_capacity(4);
        codec.push(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(codec.buffered_len(), 4);
    }

    #[test]
    fn test_frame_split_by_overflow_is_lost_silently() {
        // Overflow across a frame boundary corrupts it; the parser just
        // resyncs, it never dispatches the damaged frame.
        let frame = Frame::new(0x0011, &[1, 2, 3, 4]).unwrap();
        let encoded = frame.encode();
        let mut codec = FrameCodec::with_capacity(encoded.len());
        codec.push(&encoded);
        // Two more bytes push the marker and command low byte out.
        codec.push(&[0xEE; 2]);

        assert!(codec.decode().is_none());
    }

    #[test]
    fn test_payload_too_large() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        let err = Frame::new(0x0001, &payload).unwrap_err();
        assert!(matches!(err, ProtocolError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_host_session_roundtrip() {
        let mut session = HostSession::new();
        let bytes = session.encode_command(&crate::Command::FirmwareVersion);

        // Pretend the device echoed a version response.
        let response = Frame::new(CMD_FIRMWARE_VERSION, &[1, 0, 0]).unwrap();
        session.feed(&response.encode());

        assert_eq!(bytes[0], FRAME_MARKER);
        match session.try_decode().unwrap() {
            Some(crate::Response::FirmwareVersion {
                major,
                minor,
                patch,
            }) => {
                assert_eq!((major, minor, patch), (1, 0, 0));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
