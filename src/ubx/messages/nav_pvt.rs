
use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::UbxErr;

pub const MIN_PAYLOAD_LEN:usize = 92;

pub const VALID_DATE:u8           = 0x01;
pub const VALID_TIME:u8           = 0x02;
pub const VALID_FULLY_RESOLVED:u8 = 0x04;

const MAX_NANO:i32 = 999_999_999;

/// The UTC date and time fields of NAV-PVT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavPvtTime {
	pub itow_ms:u32,
	pub year:u16,
	pub month:u8,
	pub day:u8,
	pub hour:u8,
	pub min:u8,
	pub sec:u8,
	pub valid:u8,
	pub nano:i32,
}

impl NavPvtTime {

	pub fn from_payload(payload:&[u8]) -> Result<Self, UbxErr> {
		if payload.len() < MIN_PAYLOAD_LEN {
			return Err(UbxErr::Truncated{ needed: MIN_PAYLOAD_LEN, available: payload.len() });
		}

		Ok(Self{
			itow_ms: LittleEndian::read_u32(&payload[0..4]),
			year:    LittleEndian::read_u16(&payload[4..6]),
			month:   payload[6],
			day:     payload[7],
			hour:    payload[8],
			min:     payload[9],
			sec:     payload[10],
			valid:   payload[11],
			nano:    LittleEndian::read_i32(&payload[16..20]),
		})
	}

	pub fn valid_date(&self)     -> bool { self.valid & VALID_DATE != 0 }
	pub fn valid_time(&self)     -> bool { self.valid & VALID_TIME != 0 }
	pub fn fully_resolved(&self) -> bool { self.valid & VALID_FULLY_RESOLVED != 0 }

	/// The receiver's UTC time, if it claims a valid time of day. The nanosecond
	/// field is signed and may fall outside a second; it's clamped into one.
	pub fn utc(&self) -> Option<DateTime<Utc>> {
		if !self.valid_time() { return None; }

		let nano = self.nano.max(0).min(MAX_NANO) as u32;

		// chrono represents a leap second as second 59 with an extra second of nanos
		let (sec, nano) = if self.sec == 60 { (59, nano + 1_000_000_000) } else { (self.sec as u32, nano) };

		let naive = NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
			.and_hms_nano_opt(self.hour as u32, self.min as u32, sec, nano)?;
		Some(Utc.from_utc_datetime(&naive))
	}

}

#[cfg(test)]
mod tests {

	use chrono::Timelike;

	use super::*;

	fn make_payload(valid:u8, year:u16, month:u8, day:u8, hour:u8, min:u8, sec:u8, nano:i32) -> Vec<u8> {
		let mut p = vec![0u8; MIN_PAYLOAD_LEN];
		LittleEndian::write_u16(&mut p[4..6], year);
		p[6] = month;
		p[7] = day;
		p[8] = hour;
		p[9] = min;
		p[10] = sec;
		p[11] = valid;
		LittleEndian::write_i32(&mut p[16..20], nano);
		p
	}

	#[test]
	fn valid_time() {
		let p = make_payload(VALID_TIME, 2025, 1, 15, 12, 30, 45, 123_456_789);
		let utc = NavPvtTime::from_payload(&p).unwrap().utc().unwrap();
		assert_eq!(utc, Utc.from_utc_datetime(&NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_nano_opt(12, 30, 45, 123_456_789).unwrap()));
	}

	#[test]
	fn no_valid_time_flag() {
		let p = make_payload(VALID_DATE, 2025, 1, 15, 12, 30, 45, 0);
		let t = NavPvtTime::from_payload(&p).unwrap();
		assert!(t.valid_date() && !t.valid_time());
		assert_eq!(t.utc(), None);
	}

	#[test]
	fn short_payload() {
		assert!(NavPvtTime::from_payload(&[0u8; 50]).is_err());
	}

	#[test]
	fn nano_is_clamped() {
		let p = make_payload(VALID_TIME, 2025, 1, 1, 0, 0, 0, -1);
		assert_eq!(NavPvtTime::from_payload(&p).unwrap().utc().unwrap().nanosecond(), 0);

		let p = make_payload(VALID_TIME, 2025, 1, 1, 0, 0, 0, 2_000_000_000);
		assert_eq!(NavPvtTime::from_payload(&p).unwrap().utc().unwrap().nanosecond(), 999_999_999);
	}

	#[test]
	fn leap_second() {
		let p = make_payload(VALID_TIME | VALID_DATE, 2016, 12, 31, 23, 59, 60, 500);
		let utc = NavPvtTime::from_payload(&p).unwrap().utc().unwrap();
		assert_eq!(utc.second(), 59);
		assert_eq!(utc.nanosecond(), 1_000_000_500);
	}

	#[test]
	fn impossible_date_has_no_time() {
		let p = make_payload(VALID_TIME, 2025, 2, 30, 0, 0, 0, 0);
		assert_eq!(NavPvtTime::from_payload(&p).unwrap().utc(), None);
	}

}
