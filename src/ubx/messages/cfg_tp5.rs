
use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Deserialize};

use crate::UbxErr;
use crate::ubx::{class, id, Packet};

pub const PAYLOAD_LEN:usize = 32;

pub const FLAG_ACTIVE:u32           = 0x01;
pub const FLAG_LOCK_GNSS_FREQ:u32   = 0x02;
pub const FLAG_LOCKED_OTHER_SET:u32 = 0x04;
pub const FLAG_IS_FREQ:u32          = 0x08;
pub const FLAG_IS_LENGTH:u32        = 0x10;
pub const FLAG_ALIGN_TO_TOW:u32     = 0x20;
pub const FLAG_POLARITY:u32         = 0x40;

// 1 Hz expressed as a period in microseconds
pub const DEFAULT_PERIOD_US:u32 = 1_000_000;
pub const DEFAULT_PULSE_WIDTH_NS:u32 = 5_000_000;

/// Time pulse parameters carried by CFG-TP5.
///
/// `freq_period` is a period in microseconds unless `is_freq` is set, in which case
/// it's a frequency in Hz. `pulse_len_ratio` is a length in nanoseconds when
/// `is_length` is set, otherwise a duty cycle in units of 2^-32. The `_lock`
/// variants apply once the receiver has a GNSS time lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tp5Config {
	pub tp_idx:u8,
	pub version:u8,
	pub ant_cable_delay_ns:i16,
	pub rf_group_delay_ns:i16,
	pub freq_period:u32,
	pub freq_period_lock:u32,
	pub pulse_len_ratio:u32,
	pub pulse_len_ratio_lock:u32,
	pub user_config_delay_ns:i32,
	pub active:bool,
	pub lock_gnss_freq:bool,
	pub locked_other_set:bool,
	pub is_freq:bool,
	pub is_length:bool,
	pub align_to_tow:bool,
	pub polarity:bool,
}

impl Default for Tp5Config {
	fn default() -> Self {
		Self{
			tp_idx: 0,
			version: 0,
			ant_cable_delay_ns: 0,
			rf_group_delay_ns: 0,
			freq_period: DEFAULT_PERIOD_US,
			freq_period_lock: DEFAULT_PERIOD_US,
			pulse_len_ratio: DEFAULT_PULSE_WIDTH_NS,
			pulse_len_ratio_lock: DEFAULT_PULSE_WIDTH_NS,
			user_config_delay_ns: 0,
			active: true,
			lock_gnss_freq: true,
			locked_other_set: true,
			is_freq: false,
			is_length: true,
			align_to_tow: true,
			polarity: false,
		}
	}
}

impl Tp5Config {

	/// Sets the pulse width on both the free-running and the locked parameter sets.
	/// Milliseconds convert to nanoseconds by truncation. Unless `is_freq` is set the
	/// width may not exceed either period.
	pub fn with_pulse_width_ms(mut self, ms:f64) -> Result<Self, UbxErr> {
		if !ms.is_finite() || ms < 0.0 {
			return Err(UbxErr::InvalidArgument(format!("pulse width must be a non-negative number of ms, got {}", ms)));
		}

		let ns = (ms * 1.0e6) as u64;
		if ns > u32::MAX as u64 {
			return Err(UbxErr::InvalidArgument(format!("pulse width of {} ms is too long", ms)));
		}

		if !self.is_freq {
			for period in &[self.freq_period, self.freq_period_lock] {
				if ns > (*period as u64) * 1000 {
					return Err(UbxErr::InvalidArgument(format!("pulse width of {} ms exceeds the period of {} us", ms, period)));
				}
			}
		}

		self.is_length = true;
		self.pulse_len_ratio = ns as u32;
		self.pulse_len_ratio_lock = ns as u32;
		Ok(self)
	}

	pub fn with_period_us(mut self, period_us:u32) -> Self {
		self.is_freq = false;
		self.freq_period = period_us;
		self.freq_period_lock = period_us;
		self
	}

	/// Checks what the receiver would reject or silently misinterpret
	pub fn validate(&self) -> Result<(), UbxErr> {
		if self.tp_idx > 1 {
			return Err(UbxErr::InvalidArgument(format!("time pulse index must be 0 or 1, got {}", self.tp_idx)));
		}

		if self.is_length && !self.is_freq {
			for (width, period) in &[(self.pulse_len_ratio, self.freq_period), (self.pulse_len_ratio_lock, self.freq_period_lock)] {
				if (*width as u64) > (*period as u64) * 1000 {
					return Err(UbxErr::InvalidArgument(format!("pulse width of {} ns exceeds the period of {} us", width, period)));
				}
			}
		}

		Ok(())
	}

	pub fn flags(&self) -> u32 {
		[
			(self.active,           FLAG_ACTIVE),
			(self.lock_gnss_freq,   FLAG_LOCK_GNSS_FREQ),
			(self.locked_other_set, FLAG_LOCKED_OTHER_SET),
			(self.is_freq,          FLAG_IS_FREQ),
			(self.is_length,        FLAG_IS_LENGTH),
			(self.align_to_tow,     FLAG_ALIGN_TO_TOW),
			(self.polarity,         FLAG_POLARITY),
		].iter().filter(|(set, _)| *set).fold(0u32, |acc, (_, flag)| acc | flag)
	}

	pub fn pulse_width_ns(&self) -> Option<u32> {
		if self.is_length { Some(self.pulse_len_ratio) } else { None }
	}

	pub fn pulse_width_ms(&self) -> Option<f64> {
		self.pulse_width_ns().map(|ns| (ns as f64) / 1.0e6)
	}

	pub fn to_payload(&self) -> [u8; PAYLOAD_LEN] {
		let mut payload = [0u8; PAYLOAD_LEN];
		payload[0] = self.tp_idx;
		payload[1] = self.version;
		// 2..4 reserved
		LittleEndian::write_i16(&mut payload[4..6],   self.ant_cable_delay_ns);
		LittleEndian::write_i16(&mut payload[6..8],   self.rf_group_delay_ns);
		LittleEndian::write_u32(&mut payload[8..12],  self.freq_period);
		LittleEndian::write_u32(&mut payload[12..16], self.freq_period_lock);
		LittleEndian::write_u32(&mut payload[16..20], self.pulse_len_ratio);
		LittleEndian::write_u32(&mut payload[20..24], self.pulse_len_ratio_lock);
		LittleEndian::write_i32(&mut payload[24..28], self.user_config_delay_ns);
		LittleEndian::write_u32(&mut payload[28..32], self.flags());
		payload
	}

	pub fn from_payload(payload:&[u8]) -> Result<Self, UbxErr> {
		if payload.len() < PAYLOAD_LEN {
			return Err(UbxErr::Truncated{ needed: PAYLOAD_LEN, available: payload.len() });
		}

		let flags = LittleEndian::read_u32(&payload[28..32]);
		Ok(Self{
			tp_idx:               payload[0],
			version:              payload[1],
			ant_cable_delay_ns:   LittleEndian::read_i16(&payload[4..6]),
			rf_group_delay_ns:    LittleEndian::read_i16(&payload[6..8]),
			freq_period:          LittleEndian::read_u32(&payload[8..12]),
			freq_period_lock:     LittleEndian::read_u32(&payload[12..16]),
			pulse_len_ratio:      LittleEndian::read_u32(&payload[16..20]),
			pulse_len_ratio_lock: LittleEndian::read_u32(&payload[20..24]),
			user_config_delay_ns: LittleEndian::read_i32(&payload[24..28]),
			active:           flags & FLAG_ACTIVE != 0,
			lock_gnss_freq:   flags & FLAG_LOCK_GNSS_FREQ != 0,
			locked_other_set: flags & FLAG_LOCKED_OTHER_SET != 0,
			is_freq:          flags & FLAG_IS_FREQ != 0,
			is_length:        flags & FLAG_IS_LENGTH != 0,
			align_to_tow:     flags & FLAG_ALIGN_TO_TOW != 0,
			polarity:         flags & FLAG_POLARITY != 0,
		})
	}

	pub fn to_packet(&self) -> Packet {
		Packet::new(class::CFG, id::CFG_TP5, self.to_payload().to_vec())
	}

	/// Asks the receiver to report its current settings for one time pulse
	pub fn poll_packet(tp_idx:u8) -> Packet {
		Packet::new(class::CFG, id::CFG_TP5, vec![tp_idx])
	}

}
