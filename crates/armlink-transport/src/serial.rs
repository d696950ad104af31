use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info, trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::{ClosedHandler, Connection, LinkSignals, ReceiveHandler};
use crate::url::LinkTarget;

/// How long a blocking read waits before re-checking for shutdown.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

const READ_CHUNK_SIZE: usize = 256;

/// A serial port opened 8N1 without flow control.
///
/// A background thread reads the port and hands every chunk to the registered
/// receive handlers. Dropping the connection stops and joins that thread.
pub struct SerialConnection {
    writer: Mutex<Box<dyn SerialPort>>,
    signals: Arc<LinkSignals>,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    target: LinkTarget,
}

impl SerialConnection {
    /// Open `path` at `baud_rate` with the default read timeout.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        Self::open_target(
            LinkTarget {
                path: path.to_string(),
                baud_rate,
            },
            DEFAULT_READ_TIMEOUT,
        )
    }

    /// Open a plain device path or `serial://` URL.
    ///
    /// The URL may carry its own baud rate, which wins over `baud_rate`.
    pub fn open_url(url: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        let target = LinkTarget::parse(url, baud_rate)?;
        Self::open_target(target, read_timeout)
    }

    fn open_target(target: LinkTarget, read_timeout: Duration) -> Result<Self> {
        let open_err = |source: serialport::Error| TransportError::Open {
            path: target.path.clone(),
            source,
        };

        let port = serialport::new(target.path.as_str(), target.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(read_timeout)
            .open()
            .map_err(open_err)?;
        let reader_port = port.try_clone().map_err(open_err)?;

        let signals = Arc::new(LinkSignals::new_open());
        let shutdown = Arc::new(AtomicBool::new(false));

        let reader = std::thread::Builder::new()
            .name("armlink-serial-rx".to_string())
            .spawn({
                let signals = Arc::clone(&signals);
                let shutdown = Arc::clone(&shutdown);
                move || read_loop(reader_port, &signals, &shutdown)
            })?;

        info!(path = %target.path, baud = target.baud_rate, "opened serial port");

        Ok(Self {
            writer: Mutex::new(port),
            signals,
            shutdown,
            reader: Some(reader),
            target,
        })
    }
}

impl Connection for SerialConnection {
    fn send_bytes(&self, bytes: &[u8]) -> Result<()> {
        if !self.signals.is_open() {
            return Err(TransportError::NotConnected);
        }

        let mut port = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        port.write_all(bytes)?;
        port.flush()?;
        trace!(len = bytes.len(), "wrote bytes to serial port");
        Ok(())
    }

    fn on_receive(&self, handler: ReceiveHandler) {
        self.signals.add_receive(handler);
    }

    fn on_closed(&self, handler: ClosedHandler) {
        self.signals.add_closed(handler);
    }

    fn is_open(&self) -> bool {
        self.signals.is_open()
    }

    fn describe(&self) -> String {
        self.target.to_string()
    }
}

impl Drop for SerialConnection {
    fn drop(&mut self) {
        self.signals.shut();
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!(path = %self.target.path, "serial reader thread panicked");
            }
        }
        debug!(path = %self.target.path, "closed serial port");
    }
}

impl std::fmt::Debug for SerialConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialConnection")
            .field("target", &self.target)
            .field("open", &self.signals.is_open())
            .finish()
    }
}

/// Pump chunks from `port` into the receive handlers until shutdown or until
/// the device goes away.
fn read_loop<R: Read>(mut port: R, signals: &LinkSignals, shutdown: &AtomicBool) {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    while !shutdown.load(Ordering::SeqCst) {
        match port.read(&mut chunk) {
            Ok(0) => {
                debug!("serial port reached end of stream");
                break;
            }
            Ok(n) => {
                if !signals.deliver(&chunk[..n]) {
                    trace!(len = n, "no receive handler; dropping chunk");
                }
            }
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::TimedOut | ErrorKind::Interrupted | ErrorKind::WouldBlock
                ) =>
            {
                continue
            }
            Err(err) => {
                warn!(error = %err, "serial read failed");
                break;
            }
        }
    }

    if signals.mark_closed() {
        info!("serial link closed");
    }
}

/// A serial device present on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    pub name: String,
    pub kind: &'static str,
    pub description: Option<String>,
}

/// Enumerate the serial devices on this host.
pub fn available_ports() -> Result<Vec<PortSummary>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, description) = match port.port_type {
                SerialPortType::UsbPort(usb) => (
                    "usb",
                    Some(match usb.product {
                        Some(product) => format!("{:04x}:{:04x} {product}", usb.vid, usb.pid),
                        None => format!("{:04x}:{:04x}", usb.vid, usb.pid),
                    }),
                ),
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortSummary {
                name: port.port_name,
                kind,
                description,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn collecting_signals() -> (Arc<LinkSignals>, Arc<Mutex<Vec<u8>>>, Arc<AtomicUsize>) {
        let signals = Arc::new(LinkSignals::new_open());
        let received = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicUsize::new(0));

        let sink = Arc::clone(&received);
        signals.add_receive(Box::new(move |chunk| {
            sink.lock().unwrap().extend_from_slice(chunk);
        }));
        let counter = Arc::clone(&closed);
        signals.add_closed(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        (signals, received, closed)
    }

    #[test]
    fn open_missing_device_fails() {
        let result = SerialConnection::open("/dev/armlink-does-not-exist", 9600);
        assert!(matches!(result, Err(TransportError::Open { .. })));
    }

    #[test]
    fn open_url_rejects_bad_scheme_before_touching_hardware() {
        let result = SerialConnection::open_url("udp://:14550", 9600, DEFAULT_READ_TIMEOUT);
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn read_loop_delivers_then_reports_close_on_eof() {
        let (signals, received, closed) = collecting_signals();
        let shutdown = AtomicBool::new(false);

        read_loop(Cursor::new(b"OK\r\nREADY\r\n".to_vec()), &signals, &shutdown);

        assert_eq!(received.lock().unwrap().as_slice(), b"OK\r\nREADY\r\n");
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(!signals.is_open());
    }

    #[test]
    fn read_loop_rides_through_timeouts() {
        let (signals, received, closed) = collecting_signals();
        let shutdown = AtomicBool::new(false);
        let port = TimeoutThenData {
            timeouts: 3,
            bytes: b"pong".to_vec(),
            pos: 0,
        };

        read_loop(port, &signals, &shutdown);

        assert_eq!(received.lock().unwrap().as_slice(), b"pong");
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn read_loop_stops_on_hard_error() {
        let (signals, received, closed) = collecting_signals();
        let shutdown = AtomicBool::new(false);

        read_loop(BrokenPort, &signals, &shutdown);

        assert!(received.lock().unwrap().is_empty());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn read_loop_honours_shutdown_without_close_notification() {
        let (signals, _received, closed) = collecting_signals();
        let shutdown = AtomicBool::new(true);
        signals.shut();

        read_loop(Cursor::new(b"ignored".to_vec()), &signals, &shutdown);

        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }

    #[cfg(unix)]
    #[test]
    fn pty_link_delivers_chunks_and_joins_reader_on_drop() {
        use std::time::Instant;

        use serialport::TTYPort;

        let (mut master, slave) = TTYPort::pair().expect("pty pair should open");
        let name = slave.name().expect("pty slave should have a name");

        let link = SerialConnection::open(&name, 115_200).expect("pty slave should open");
        assert!(link.is_open());
        assert_eq!(link.describe(), format!("serial://{name}:115200"));

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        link.on_receive(Box::new(move |chunk| {
            sink.lock().unwrap().extend_from_slice(chunk);
        }));

        master.write_all(b"ARM ").unwrap();
        master.write_all(b"READY\r\n").unwrap();
        master.flush().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while received.lock().unwrap().len() < 11 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(received.lock().unwrap().as_slice(), b"ARM READY\r\n");

        link.send_bytes(&[0xEA, 0xE3, 1, 0, 2, 0]).unwrap();
        let mut frame = [0u8; 6];
        master.set_timeout(Duration::from_secs(5)).unwrap();
        master.read_exact(&mut frame).unwrap();
        assert_eq!(frame, [0xEA, 0xE3, 1, 0, 2, 0]);

        let started = Instant::now();
        drop(link);
        assert!(started.elapsed() < DEFAULT_READ_TIMEOUT * 10);
        drop(slave);
    }

    struct TimeoutThenData {
        timeouts: usize,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for TimeoutThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.timeouts > 0 {
                self.timeouts -= 1;
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            let remaining = &self.bytes[self.pos..];
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct BrokenPort;

    impl Read for BrokenPort {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }
}
