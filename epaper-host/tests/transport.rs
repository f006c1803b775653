//! Transport tests: frames through `StreamTx` and `SerialPort` on plain files.

use std::fs::{self, File};
use std::io::{self, Write};
use std::os::fd::AsFd;
use std::path::PathBuf;

use epaper_drivers::Epd;
use epaper_hal::UartConfig;
use epaper_host::{Error, SerialPort, StreamTx};
use epaper_protocol::{FrameParser, Opcode};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("epaper-{}-{name}", std::process::id()))
}

/// Accepts at most `limit` bytes per write
struct Trickle {
    data: Vec<u8>,
    limit: usize,
}

impl Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.limit);
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fails with EINTR before every successful write
struct Interrupting {
    data: Vec<u8>,
    interrupted: usize,
    pending: bool,
}

impl Write for Interrupting {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending = !self.pending;
        if self.pending {
            self.interrupted += 1;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn opcodes(bytes: &[u8]) -> Vec<Opcode> {
    let mut parser = FrameParser::new();
    bytes
        .iter()
        .filter_map(|&b| parser.feed(b).unwrap())
        .filter_map(|frame| frame.opcode())
        .collect()
}

// ---------------------------------------------------------------------------
// StreamTx
// ---------------------------------------------------------------------------

#[test]
fn test_session_is_back_to_back_frames() {
    let mut epd = Epd::new(StreamTx::new(Vec::new()));
    epd.handshake().unwrap();
    epd.clear().unwrap();
    epd.draw_string(10, 20, "Hi").unwrap();
    epd.update().unwrap();

    let bytes = epd.release().into_inner();
    assert_eq!(bytes.len(), 9 + 9 + 16 + 9);
    assert_eq!(&bytes[9..18], &[0xA5, 0x00, 0x09, 0x2E, 0xCC, 0x33, 0xC3, 0x3C, 0x82]);
    assert_eq!(
        opcodes(&bytes),
        vec![Opcode::Handshake, Opcode::Clear, Opcode::DrawString, Opcode::Update]
    );
}

#[test]
fn test_short_write_reported() {
    let mut epd = Epd::new(StreamTx::new(Trickle {
        data: Vec::new(),
        limit: 4,
    }));

    let err: Error = epd.clear().unwrap_err().into();
    assert!(matches!(
        err,
        Error::ShortWrite {
            written: 4,
            expected: 9
        }
    ));
    // No retry: only the first chunk reached the sink
    assert_eq!(epd.release().into_inner().data.len(), 4);
}

#[test]
fn test_interrupted_write_is_retried() {
    let mut epd = Epd::new(StreamTx::new(Interrupting {
        data: Vec::new(),
        interrupted: 0,
        pending: false,
    }));
    epd.update().unwrap();

    let sink = epd.release().into_inner();
    assert_eq!(sink.interrupted, 1);
    assert_eq!(sink.data, [0xA5, 0x00, 0x09, 0x0A, 0xCC, 0x33, 0xC3, 0x3C, 0xA6]);
}

#[test]
fn test_encode_error_sends_nothing() {
    let mut epd = Epd::new(StreamTx::new(Vec::new()));
    let err: Error = epd.draw_string(0, 0, "a\0b").unwrap_err().into();
    assert!(matches!(err, Error::InvalidText(_)));
    assert!(epd.release().into_inner().is_empty());
}

#[test]
fn test_descriptor_stream_is_unbuffered() {
    let path = temp_path("dup-fd");
    let file = File::create(&path).unwrap();

    let mut epd = Epd::new(StreamTx::from_fd(file.as_fd()).unwrap());
    epd.draw_pixel(10, 10).unwrap();
    epd.update().unwrap();

    // No flush: both frames must already be on the descriptor, whole
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 13 + 9);
    assert_eq!(opcodes(&bytes), vec![Opcode::DrawPixel, Opcode::Update]);

    drop(epd);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_stdout_stream_opens() {
    // Only duplicates fd 1; nothing is written
    let tx = StreamTx::stdout().unwrap();
    assert!(tx.get_ref().metadata().is_ok());
}

// ---------------------------------------------------------------------------
// SerialPort
// ---------------------------------------------------------------------------

#[test]
fn test_open_missing_device() {
    let err = SerialPort::open(temp_path("does-not-exist/ttyUSB9")).unwrap_err();
    assert!(matches!(err, Error::DeviceUnavailable { .. }));
    assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
}

#[test]
fn test_configure_rejects_non_tty() {
    let path = temp_path("not-a-tty");
    File::create(&path).unwrap();

    let port = SerialPort::open(&path).unwrap();
    let err = port.configure(&UartConfig::default()).unwrap_err();
    assert!(matches!(err, Error::DeviceUnavailable { .. }));

    port.close().unwrap();
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_configure_rejects_unsupported_baud() {
    let path = temp_path("bad-baud");
    File::create(&path).unwrap();

    let port = SerialPort::open(&path).unwrap();
    let err = port
        .configure(&UartConfig::default().with_baudrate(250_000))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedBaud(250_000)));

    port.close().unwrap();
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_frames_written_to_file() {
    let path = temp_path("capture");
    File::create(&path).unwrap();

    let mut port = SerialPort::open(&path).unwrap();
    assert_eq!(port.path(), path.as_path());
    {
        let mut epd = Epd::new(&mut port);
        epd.draw_pixel(100, 200).unwrap();
        epd.flush().unwrap();
    }
    port.close().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 13);
    assert_eq!(bytes[12], 0x24);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_adopt_open_file() {
    let path = temp_path("adopted");
    let file = File::create(&path).unwrap();

    let mut epd = Epd::new(SerialPort::from_file(file));
    epd.handshake().unwrap();
    epd.release().close().unwrap();

    assert_eq!(
        fs::read(&path).unwrap(),
        [0xA5, 0x00, 0x09, 0x00, 0xCC, 0x33, 0xC3, 0x3C, 0xAC]
    );
    fs::remove_file(&path).unwrap();
}
