
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::UbxErr;
use crate::ubx::Packet;
use crate::ubx::frame_sync::{FrameEvent, FrameSync};

pub mod serial;

pub const READ_CHUNK_SIZE:usize = 1024;

/// A byte stream carrying UBX. Reads are chunked and framed by a `FrameSync`, so
/// the stream may deliver frames split or merged arbitrarily.
pub struct UbxPort<S> {
	stream:S,
	sync:FrameSync,
	buffer:[u8; READ_CHUNK_SIZE],
	eof:bool,
}

impl<S> UbxPort<S> {

	pub fn new(stream:S) -> Result<Self, UbxErr> {
		Ok(Self{ stream, sync: FrameSync::new()?, buffer: [0u8; READ_CHUNK_SIZE], eof: false })
	}

	pub fn is_eof(&self) -> bool { self.eof }

	pub fn get_ref(&self) -> &S { &self.stream }
	pub fn get_mut(&mut self) -> &mut S { &mut self.stream }
	pub fn into_inner(self) -> S { self.stream }

}

impl<S: Read> UbxPort<S> {

	/// Reads until one event is framed. Returns `Ok(None)` when the deadline passes
	/// or the stream ends; `is_eof` tells the two apart. Without a deadline, read
	/// timeouts of the underlying stream are retried indefinitely.
	pub fn read_event(&mut self, deadline:Option<Instant>) -> Result<Option<FrameEvent>, UbxErr> {
		loop {
			if let Some(event) = self.sync.next_event() {
				return Ok(Some(event));
			}

			if self.eof { return Ok(None); }

			if let Some(t) = deadline {
				if Instant::now() >= t { return Ok(None); }
			}

			match self.stream.read(&mut self.buffer) {
				Ok(0) => {
					debug!("End of stream with {} bytes buffered", self.sync.buffered_len());
					self.eof = true;
					self.sync.finish();
				},
				Ok(n) => {
					trace!("Read {} bytes", n);
					self.sync.push(&self.buffer[..n]);
				},
				Err(e) => match e.kind() {
					ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => (),
					_ => return Err(e.into()),
				}
			}
		}
	}

	/// Waits for the next complete packet, skipping NMEA and discarded bytes
	pub fn read_packet(&mut self, timeout:Duration) -> Result<Option<Packet>, UbxErr> {
		let deadline = Instant::now() + timeout;
		while let Some(event) = self.read_event(Some(deadline))? {
			if let FrameEvent::Packet(p) = event {
				return Ok(Some(p));
			}
		}
		Ok(None)
	}

}

impl<S: Write> UbxPort<S> {

	pub fn write_packet(&mut self, packet:&Packet) -> Result<(), UbxErr> {
		let frame = packet.encode()?;
		self.stream.write_all(&frame)?;
		self.stream.flush()?;
		debug!("Sent {} ({} bytes)", packet.name(), frame.len());
		Ok(())
	}

}

#[cfg(test)]
pub(crate) mod tests {

	use std::io::{self, Cursor, Read, Write};

	use super::*;
	use crate::ubx::{class, id};

	/// A receiver stand-in: reads come from a canned byte string, writes are recorded
	pub struct MockDevice {
		pub rx:Cursor<Vec<u8>>,
		pub tx:Vec<u8>,
		pub chunk:usize,
	}

	impl MockDevice {
		pub fn new(rx:Vec<u8>) -> Self { Self{ rx: Cursor::new(rx), tx: vec![], chunk: 3 } }
	}

	impl Read for MockDevice {
		fn read(&mut self, buf:&mut [u8]) -> io::Result<usize> {
			// Short reads exercise reassembly
			let n = buf.len().min(self.chunk);
			self.rx.read(&mut buf[..n])
		}
	}

	impl Write for MockDevice {
		fn write(&mut self, buf:&[u8]) -> io::Result<usize> { self.tx.write(buf) }
		fn flush(&mut self) -> io::Result<()> { Ok(()) }
	}

	/// Reports a timeout once before handing out each byte
	struct SlowDevice {
		data:Vec<u8>,
		timed_out:bool,
	}

	impl Read for SlowDevice {
		fn read(&mut self, buf:&mut [u8]) -> io::Result<usize> {
			if self.data.is_empty() { return Ok(0); }
			self.timed_out = !self.timed_out;
			if self.timed_out {
				return Err(io::Error::new(ErrorKind::TimedOut, "no data"));
			}
			buf[0] = self.data.remove(0);
			Ok(1)
		}
	}

	#[test]
	fn reads_packets_across_short_reads() {
		let mut rx = Packet::new(class::ACK, id::ACK_ACK, vec![0x06, 0x31]).encode().unwrap();
		rx.extend(b"$GNGLL,4807.038,N*2C\r\n");
		rx.extend(Packet::new(class::ACK, id::ACK_NAK, vec![0x06, 0x31]).encode().unwrap());

		let mut port = UbxPort::new(MockDevice::new(rx)).unwrap();
		let first = port.read_packet(Duration::from_secs(1)).unwrap().unwrap();
		assert_eq!(first.id, id::ACK_ACK);
		let second = port.read_packet(Duration::from_secs(1)).unwrap().unwrap();
		assert_eq!(second.id, id::ACK_NAK);
		assert_eq!(port.read_packet(Duration::from_secs(1)).unwrap(), None);
		assert!(port.is_eof());
	}

	#[test]
	fn read_timeouts_are_retried() {
		let data = Packet::new(class::ACK, id::ACK_ACK, vec![0x06, 0x31]).encode().unwrap();
		let mut port = UbxPort::new(SlowDevice{ data, timed_out: false }).unwrap();
		match port.read_event(None).unwrap() {
			Some(FrameEvent::Packet(p)) => assert_eq!(p.payload, vec![0x06, 0x31]),
			other => panic!("unexpected event {:?}", other),
		}
	}

	#[test]
	fn expired_deadline_returns_none() {
		let mut port = UbxPort::new(MockDevice::new(vec![0xB5, 0x62])).unwrap();
		assert_eq!(port.read_event(Some(Instant::now())).unwrap(), None);
		assert!(!port.is_eof());
	}

	#[test]
	fn writes_whole_frames() {
		let mut port = UbxPort::new(MockDevice::new(vec![])).unwrap();
		port.write_packet(&Packet::new(class::CFG, id::CFG_TP5, vec![0x00])).unwrap();
		assert_eq!(port.get_ref().tx, vec![0xB5, 0x62, 0x06, 0x31, 0x01, 0x00, 0x00, 0x38, 0xE5]);
	}

}
