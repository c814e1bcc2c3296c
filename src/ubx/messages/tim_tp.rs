
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::UbxErr;

pub const PAYLOAD_LEN:usize = 16;

/// TIM-TP: the time of the next time pulse and its quantization error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimTp {
	pub tow_ms:u32,
	// Units of 2^-32 ms
	pub tow_sub_ms:u32,
	pub q_err_ps:i32,
	pub week:u16,
	pub flags:u8,
	pub ref_info:u8,
}

impl TimTp {

	pub fn from_payload(payload:&[u8]) -> Result<Self, UbxErr> {
		if payload.len() < PAYLOAD_LEN {
			return Err(UbxErr::Truncated{ needed: PAYLOAD_LEN, available: payload.len() });
		}

		Ok(Self{
			tow_ms:     LittleEndian::read_u32(&payload[0..4]),
			tow_sub_ms: LittleEndian::read_u32(&payload[4..8]),
			q_err_ps:   LittleEndian::read_i32(&payload[8..12]),
			week:       LittleEndian::read_u16(&payload[12..14]),
			flags:      payload[14],
			ref_info:   payload[15],
		})
	}

	pub fn time_of_week(&self) -> f64 {
		((self.tow_ms as f64) + (self.tow_sub_ms as f64) * (2.0_f64).powi(-32)) / 1000.0
	}

	pub fn is_utc_base(&self) -> bool { self.flags & 0x01 != 0 }
	pub fn utc_available(&self) -> bool { self.flags & 0x02 != 0 }

}

#[test]
fn test_tim_tp() {
	let mut p = [0u8; PAYLOAD_LEN];
	LittleEndian::write_u32(&mut p[0..4], 345_600_000);
	LittleEndian::write_u32(&mut p[4..8], 1 << 31);
	LittleEndian::write_i32(&mut p[8..12], -1234);
	LittleEndian::write_u16(&mut p[12..14], 2350);
	p[14] = 0x03;

	let tp = TimTp::from_payload(&p).unwrap();
	assert_eq!(tp.week, 2350);
	assert_eq!(tp.q_err_ps, -1234);
	assert!(tp.is_utc_base() && tp.utc_available());
	assert!((tp.time_of_week() - 345_600.0005).abs() < 1e-9);

	assert!(TimTp::from_payload(&p[..15]).is_err());
}
