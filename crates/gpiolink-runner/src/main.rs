//! GPIO-Link device simulator.
//!
//! Exposes a simulated device's serial interface on a TCP port: connect with
//! anything that can speak the wire protocol and drive the mock pins. One
//! client at a time; each connection gets a fresh device, matching a
//! power-cycled board (the ready banner is the first thing a client sees).

use std::io;

use clap::Parser;
use gpiolink_firmware::{Device, MockGpio, SerialSink};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gpiolink-sim", about = "Serve a simulated GPIO-Link device over TCP")]
struct Args {
    /// TCP port to listen on.
    #[arg(long, default_value_t = 4330)]
    port: u16,

    /// Receive accumulator capacity in bytes.
    #[arg(long, default_value_t = 512)]
    capacity: usize,
}

/// Sink that forwards device output into the connection writer task.
struct ChannelSink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl SerialSink for ChannelSink {
    fn write(&mut self, bytes: &[u8]) {
        // A closed channel means the client is gone; output is dropped the
        // same way a disconnected serial line drops it.
        let _ = self.tx.send(bytes.to_vec());
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(port = args.port, "gpiolink-sim listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::info!(%peer, "client connected");
        if let Err(e) = handle_connection(stream, args.capacity).await {
            tracing::warn!(%peer, "connection error: {}", e);
        }
        tracing::info!(%peer, "client disconnected");
    }
}

/// Shuttle bytes between one TCP client and a fresh device instance.
async fn handle_connection(mut stream: TcpStream, capacity: usize) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let mut device = Device::with_capacity(ChannelSink { tx }, MockGpio::new(), capacity);

    let (mut reader, mut writer) = stream.split();
    let mut read_buf = [0u8; 1024];

    loop {
        tokio::select! {
            result = reader.read(&mut read_buf) => {
                match result {
                    Ok(0) => return Ok(()),
                    Ok(n) => device.process_bytes(&read_buf[..n]),
                    Err(e) => return Err(e),
                }
            }

            Some(data) = rx.recv() => {
                writer.write_all(&data).await?;
                writer.flush().await?;
            }
        }
    }
}
