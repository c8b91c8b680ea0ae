//! Line transports
//!
//! A transport moves complete lines between the client and the authority.
//! The game loop only ever sees whole lines; partial reads stay inside the
//! transport's reader thread.

use super::NetworkError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Reliable, ordered, line-delimited link to one remote endpoint
pub trait Transport: Send {
    /// Queue one line. The newline is added by the transport.
    fn send(&mut self, line: &str) -> Result<(), NetworkError>;

    /// Next complete inbound line, if one is buffered. Never blocks.
    fn try_receive(&mut self) -> Option<String>;

    fn connected(&self) -> bool;
}

// ============================================================================
// TCP
// ============================================================================

/// TCP link with one reader and one writer thread
pub struct TcpTransport {
    outbound: Sender<String>,
    inbound: Receiver<String>,
    connected: Arc<AtomicBool>,
    stream: TcpStream,
}

impl TcpTransport {
    pub fn connect(addr: &str) -> Result<Self, NetworkError> {
        let stream = TcpStream::connect(addr).map_err(|e| NetworkError::ConnectionFailed {
            addr: addr.to_string(),
            error: e.to_string(),
        })?;
        stream.set_nodelay(true)?;

        let connected = Arc::new(AtomicBool::new(true));
        let (outbound, outbound_rx) = unbounded::<String>();
        let (inbound_tx, inbound) = unbounded::<String>();

        let reader = stream.try_clone()?;
        let reader_flag = Arc::clone(&connected);
        thread::Builder::new()
            .name("cubious-net-reader".to_string())
            .spawn(move || read_loop(reader, inbound_tx, reader_flag))?;

        let writer = stream.try_clone()?;
        let writer_flag = Arc::clone(&connected);
        thread::Builder::new()
            .name("cubious-net-writer".to_string())
            .spawn(move || write_loop(writer, outbound_rx, writer_flag))?;

        log::info!("[Transport] Connected to {}", addr);
        Ok(Self {
            outbound,
            inbound,
            connected,
            stream,
        })
    }
}

/// Lines are split on raw bytes so a non-UTF-8 line only damages itself.
/// Invalid sequences become U+FFFD and the decoder treats the line as data.
fn read_loop(stream: TcpStream, inbound: Sender<String>, connected: Arc<AtomicBool>) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                log::info!("[Transport] Authority closed the connection");
                break;
            }
            Ok(_) if buf.last() != Some(&b'\n') => {
                log::debug!(
                    "[Transport] Dropping {} bytes of unterminated line at close",
                    buf.len()
                );
                log::info!("[Transport] Authority closed the connection");
                break;
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if inbound.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                log::warn!("[Transport] Read failed: {}", e);
                break;
            }
        }
    }
    connected.store(false, Ordering::Release);
}

fn write_loop(mut stream: TcpStream, outbound: Receiver<String>, connected: Arc<AtomicBool>) {
    for line in outbound.iter() {
        let framed = format!("{}\n", line);
        if let Err(e) = stream.write_all(framed.as_bytes()) {
            log::warn!("[Transport] Write failed: {}", e);
            connected.store(false, Ordering::Release);
            break;
        }
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, line: &str) -> Result<(), NetworkError> {
        if !self.connected() {
            return Err(NetworkError::Disconnected);
        }
        self.outbound
            .send(line.to_string())
            .map_err(|_| NetworkError::Disconnected)
    }

    fn try_receive(&mut self) -> Option<String> {
        self.inbound.try_recv().ok()
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        // Unblocks the reader; the writer exits once `outbound` is dropped
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

// ============================================================================
// LOOPBACK
// ============================================================================

/// In-process transport. Lines sent on one end arrive on the other.
pub struct LoopbackTransport {
    outbound: Sender<String>,
    inbound: Receiver<String>,
    connected: Arc<AtomicBool>,
}

impl LoopbackTransport {
    /// Two connected ends sharing one connection flag
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = unbounded();
        let (b_tx, b_rx) = unbounded();
        let connected = Arc::new(AtomicBool::new(true));
        (
            Self {
                outbound: a_tx,
                inbound: b_rx,
                connected: Arc::clone(&connected),
            },
            Self {
                outbound: b_tx,
                inbound: a_rx,
                connected,
            },
        )
    }

    /// Cut the link for both ends. Lines already delivered stay readable.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, line: &str) -> Result<(), NetworkError> {
        if !self.connected() {
            return Err(NetworkError::Disconnected);
        }
        self.outbound
            .send(line.to_string())
            .map_err(|_| NetworkError::Disconnected)
    }

    fn try_receive(&mut self) -> Option<String> {
        self.inbound.try_recv().ok()
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
