//! Headset reader thread
//!
//! Connects to the ThinkGear connector, sends the handshake, and forwards
//! every framed record into [`RECORDS`]. The socket read blocks, so this
//! runs on a plain std thread rather than inside the executor.

use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::thread::{self, JoinHandle};

use embassy_futures::block_on;
use tracing::{debug, error, info, warn};

use mindlift_protocol::headset::{RecordFramer, HANDSHAKE};

use crate::channels::{SourceEvent, RECORDS};

const READ_CHUNK: usize = 512;

/// Start the reader thread for the connector at `addr`
pub fn spawn_headset_reader(addr: String) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("headset".into())
        .spawn(move || {
            match TcpStream::connect(addr.as_str()) {
                Ok(mut stream) => {
                    info!(addr = %addr, "headset connector connected");
                    if let Err(e) = stream.write_all(HANDSHAKE.as_bytes()) {
                        error!(error = %e, "headset handshake failed");
                    } else if let Err(e) = pump(stream, forward) {
                        warn!(error = %e, "headset read failed");
                    }
                }
                Err(e) => error!(addr = %addr, error = %e, "headset connect failed"),
            }
            forward(SourceEvent::Closed);
        })
}

fn forward(event: SourceEvent) {
    block_on(RECORDS.send(event));
}

/// Read `reader` to the end, emitting one event per record
///
/// Returns when the stream ends; the caller sends [`SourceEvent::Closed`].
pub fn pump<R: Read>(mut reader: R, mut emit: impl FnMut(SourceEvent)) -> io::Result<()> {
    let mut framer = RecordFramer::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => {
                if framer.pending() > 0 {
                    debug!(bytes = framer.pending(), "discarding unterminated record");
                }
                info!("headset stream ended");
                return Ok(());
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        framer.feed(&chunk[..n], |record| {
            emit(SourceEvent::Record(
                String::from_utf8_lossy(record).into_owned(),
            ))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    /// Hands out the input a few bytes at a time
    struct Trickle {
        data: Cursor<Vec<u8>>,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(self.step);
            self.data.read(&mut buf[..len])
        }
    }

    fn records(events: Vec<SourceEvent>) -> Vec<String> {
        events
            .into_iter()
            .map(|event| match event {
                SourceEvent::Record(line) => line,
                SourceEvent::Closed => panic!("pump never closes"),
            })
            .collect()
    }

    #[test]
    fn test_pump_splits_records() {
        let input = b"{\"blinkStrength\":55}\r{\"eSense\":{\"attention\":1,\"meditation\":2}}\r".to_vec();
        let mut events = Vec::new();

        pump(Cursor::new(input), |event| events.push(event)).unwrap();

        assert_eq!(
            records(events),
            [
                "{\"blinkStrength\":55}",
                "{\"eSense\":{\"attention\":1,\"meditation\":2}}"
            ]
        );
    }

    #[test]
    fn test_pump_reassembles_split_reads() {
        let reader = Trickle {
            data: Cursor::new(b"{\"rawEeg\":12}\r\n{\"rawEeg\":-7}\r\n".to_vec()),
            step: 3,
        };
        let mut events = Vec::new();

        pump(reader, |event| events.push(event)).unwrap();

        assert_eq!(records(events), ["{\"rawEeg\":12}", "{\"rawEeg\":-7}"]);
    }

    #[test]
    fn test_pump_drops_unterminated_tail() {
        let mut events = Vec::new();
        pump(Cursor::new(b"{\"rawEeg\":1}\r{\"raw".to_vec()), |event| {
            events.push(event)
        })
        .unwrap();
        assert_eq!(records(events), ["{\"rawEeg\":1}"]);
    }

    #[test]
    fn test_pump_passes_invalid_utf8_through() {
        let mut events = Vec::new();
        pump(Cursor::new(vec![0xff, b'{', b'}', b'\n']), |event| {
            events.push(event)
        })
        .unwrap();
        assert_eq!(records(events), ["\u{fffd}{}"]);
    }
}
