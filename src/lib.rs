
pub mod io;
pub mod monitor;
pub mod timepulse;
pub mod ubx;

pub mod utils;

#[derive(Debug, thiserror::Error)]
pub enum UbxErr {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("serial port error: {0}")]
	Serial(#[from] serialport::Error),
	#[error("frame truncated: need {needed} bytes, have {available}")]
	Truncated{ needed:usize, available:usize },
	#[error("frame does not start with sync characters 0xB5 0x62")]
	BadSync,
	#[error("checksum mismatch: expected {expected:02X?}, found {found:02X?}")]
	ChecksumMismatch{ expected:(u8, u8), found:(u8, u8) },
	#[error("payload of {0} bytes does not fit the UBX length field")]
	PayloadTooLong(usize),
	#[error("invalid argument: {0}")]
	InvalidArgument(String),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
	#[error("NMEA pattern: {0}")]
	Pattern(#[from] regex::Error),
}
