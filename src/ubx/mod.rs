
use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Deserialize};

use crate::UbxErr;

pub mod checksum;
pub mod frame_sync;
pub mod messages;
pub mod names;

#[cfg(test)]
mod tests;

pub const SYNC_CHAR_1:u8 = 0xB5;
pub const SYNC_CHAR_2:u8 = 0x62;

// sync(2) + class(1) + id(1) + length(2)
pub const HEADER_LEN:usize = 6;
pub const CHECKSUM_LEN:usize = 2;
pub const MIN_FRAME_LEN:usize = HEADER_LEN + CHECKSUM_LEN;

// Longer length fields are treated as a false sync by the frame synchronizer
pub const MAX_PAYLOAD_LEN:usize = 4096;

pub mod class {
	pub const NAV:u8 = 0x01;
	pub const RXM:u8 = 0x02;
	pub const INF:u8 = 0x04;
	pub const ACK:u8 = 0x05;
	pub const CFG:u8 = 0x06;
	pub const MON:u8 = 0x0A;
	pub const TIM:u8 = 0x0D;
	pub const ESF:u8 = 0x10;
	pub const LOG:u8 = 0x21;
	pub const SEC:u8 = 0x27;
	pub const HNR:u8 = 0x28;
}

pub mod id {
	pub const ACK_NAK:u8    = 0x00;
	pub const ACK_ACK:u8    = 0x01;
	pub const CFG_TP5:u8    = 0x31;
	pub const CFG_VALSET:u8 = 0x8A;
	pub const CFG_VALGET:u8 = 0x8B;
	pub const NAV_PVT:u8    = 0x07;
	pub const TIM_TP:u8     = 0x01;
}

/// A single UBX message: class, id and payload. Sync characters, the length
/// field and the checksum only exist on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
	pub class:u8,
	pub id:u8,
	pub payload:Vec<u8>,
}

impl Packet {

	pub fn new(class:u8, id:u8, payload:Vec<u8>) -> Self {
		Self{ class, id, payload }
	}

	pub fn frame_len(&self) -> usize { MIN_FRAME_LEN + self.payload.len() }

	pub fn name(&self) -> names::MessageName { names::message_name(self.class, self.id) }

	pub fn is(&self, class:u8, id:u8) -> bool { self.class == class && self.id == id }

	pub fn encode(&self) -> Result<Vec<u8>, UbxErr> {
		let n = self.payload.len();
		if n > u16::MAX as usize {
			return Err(UbxErr::PayloadTooLong(n));
		}

		let mut frame:Vec<u8> = Vec::with_capacity(self.frame_len());
		frame.extend_from_slice(&[SYNC_CHAR_1, SYNC_CHAR_2, self.class, self.id, 0, 0]);
		LittleEndian::write_u16(&mut frame[4..6], n as u16);
		frame.extend_from_slice(&self.payload);

		let (ck_a, ck_b) = checksum::checksum(&frame[2..]);
		frame.push(ck_a);
		frame.push(ck_b);
		Ok(frame)
	}

	/// Decodes one frame starting at `frame[0]`. Bytes past the end of the frame
	/// named by the length field are ignored.
	pub fn decode(frame:&[u8]) -> Result<Packet, UbxErr> {
		if frame.len() < MIN_FRAME_LEN {
			return Err(UbxErr::Truncated{ needed: MIN_FRAME_LEN, available: frame.len() });
		}
		if frame[0] != SYNC_CHAR_1 || frame[1] != SYNC_CHAR_2 {
			return Err(UbxErr::BadSync);
		}

		let length = payload_len(frame);
		let needed = MIN_FRAME_LEN + length;
		if frame.len() < needed {
			return Err(UbxErr::Truncated{ needed, available: frame.len() });
		}

		let expected = checksum::checksum(&frame[2..HEADER_LEN + length]);
		let found = (frame[HEADER_LEN + length], frame[HEADER_LEN + length + 1]);
		if expected != found {
			return Err(UbxErr::ChecksumMismatch{ expected, found });
		}

		Ok(Packet{ class: frame[2], id: frame[3], payload: frame[HEADER_LEN..HEADER_LEN + length].to_vec() })
	}

}

// Caller guarantees at least HEADER_LEN bytes
pub(crate) fn payload_len(frame:&[u8]) -> usize { LittleEndian::read_u16(&frame[4..6]) as usize }
