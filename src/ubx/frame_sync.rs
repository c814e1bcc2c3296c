
use std::collections::VecDeque;

use log::{debug, trace};
use regex::bytes::Regex;

use crate::UbxErr;
use super::{Packet, SYNC_CHAR_1, SYNC_CHAR_2, MIN_FRAME_LEN, MAX_PAYLOAD_LEN};

// Unsynchronized bytes held before the buffer is dropped
pub const MAX_UNSYNCED_LEN:usize = 1024;

const NMEA_PATTERN:&str = r"\$[A-Z][A-Z0-9]{2,},";

#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
	Packet(Packet),
	Nmea(String),
	Discarded(usize),
}

/// Turns an arbitrarily chunked byte stream into UBX packets. Text found between
/// frames is reported as NMEA when it looks like a sentence; anything else is
/// dropped and counted. A frame with a bad checksum or an impossible length gives
/// up exactly one byte and the search for the next sync pair starts over.
#[derive(Debug)]
pub struct FrameSync {
	buffer:Vec<u8>,
	pending:VecDeque<FrameEvent>,
	nmea:Regex,
	flushing:bool,
}

impl FrameSync {

	pub fn new() -> Result<Self, UbxErr> {
		Ok(Self{ buffer: vec![], pending: VecDeque::new(), nmea: Regex::new(NMEA_PATTERN)?, flushing: false })
	}

	pub fn buffered_len(&self) -> usize { self.buffer.len() }

	pub fn push(&mut self, data:&[u8]) {
		self.buffer.extend_from_slice(data);
	}

	/// Convenience for callers that already hold a whole chunk
	pub fn apply(&mut self, data:&[u8]) -> Vec<FrameEvent> {
		self.push(data);
		let mut events:Vec<FrameEvent> = vec![];
		while let Some(event) = self.next_event() { events.push(event); }
		events
	}

	/// Marks end of input. Partial frames can no longer complete, so the rest of
	/// the buffer is resynced byte by byte until it is empty.
	pub fn finish(&mut self) {
		self.flushing = true;
	}

	pub fn next_event(&mut self) -> Option<FrameEvent> {
		loop {
			if let Some(event) = self.pending.pop_front() {
				return Some(event);
			}

			match find_sync(&self.buffer) {
				None => {
					if self.buffer.len() > MAX_UNSYNCED_LEN {
						// A trailing first sync character may be completed by the next chunk
						let keep = if self.buffer.last() == Some(&SYNC_CHAR_1) { 1 } else { 0 };
						let n = self.buffer.len() - keep;
						let dropped:Vec<u8> = self.buffer.drain(..n).collect();
						debug!("No sync characters in {} bytes, dropping them", n);
						self.scan_unframed(&dropped);
						continue;
					}
					if self.flushing && !self.buffer.is_empty() {
						let rest:Vec<u8> = self.buffer.drain(..).collect();
						self.scan_unframed(&rest);
						continue;
					}
					return None;
				},
				Some(pos) if pos > 0 => {
					let leading:Vec<u8> = self.buffer.drain(..pos).collect();
					self.scan_unframed(&leading);
					continue;
				},
				Some(_) => {}
			}

			// The buffer now starts with a sync pair
			if self.buffer.len() < MIN_FRAME_LEN {
				if self.flushing { self.resync(); continue; }
				return None;
			}

			let length = super::payload_len(&self.buffer);
			if length > MAX_PAYLOAD_LEN {
				debug!("Length field {} exceeds {}, treating sync as false", length, MAX_PAYLOAD_LEN);
				self.resync();
				continue;
			}

			let frame_len = MIN_FRAME_LEN + length;
			if self.buffer.len() < frame_len {
				if self.flushing { self.resync(); continue; }
				return None;
			}

			match Packet::decode(&self.buffer[..frame_len]) {
				Ok(packet) => {
					self.buffer.drain(..frame_len);
					trace!("Framed {} with {} byte payload", packet.name(), length);
					return Some(FrameEvent::Packet(packet));
				},
				Err(e) => {
					debug!("Rejecting candidate frame: {}", e);
					self.resync();
				}
			}
		}
	}

	fn resync(&mut self) {
		self.buffer.drain(..1);
		self.pending.push_back(FrameEvent::Discarded(1));
	}

	/// Reports NMEA sentences found anywhere in a line and counts the bytes around
	/// them as discarded. Line breaks next to a sentence aren't counted.
	fn scan_unframed(&mut self, data:&[u8]) {
		let mut junk:usize = 0;
		let mut found_nmea = false;

		for line in data.split(|b| *b == b'\r' || *b == b'\n') {
			let start = match self.nmea.find(line) {
				Some(m) => m.start(),
				None => {
					junk += line.len();
					continue;
				}
			};

			let mut end = line.len();
			while end > start && line[end - 1].is_ascii_whitespace() { end -= 1; }

			junk += start;
			if junk > 0 {
				self.pending.push_back(FrameEvent::Discarded(junk));
			}
			junk = line.len() - end;

			found_nmea = true;
			self.pending.push_back(FrameEvent::Nmea(String::from_utf8_lossy(&line[start..end]).into_owned()));
		}

		if !found_nmea { junk = data.len(); }
		if junk > 0 {
			self.pending.push_back(FrameEvent::Discarded(junk));
		}
	}

}

fn find_sync(buffer:&[u8]) -> Option<usize> {
	buffer.windows(2).position(|w| w[0] == SYNC_CHAR_1 && w[1] == SYNC_CHAR_2)
}
