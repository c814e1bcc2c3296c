
use std::fmt;

use serde::Serialize;

use super::class;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageName {
	pub class_name:String,
	pub msg_name:String,
}

impl MessageName {

	pub fn full_name(&self) -> String { format!("{}-{}", self.class_name, self.msg_name) }

}

impl fmt::Display for MessageName {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}-{}", self.class_name, self.msg_name)
	}
}

pub fn class_name(class:u8) -> Option<&'static str> {
	match class {
		class::NAV => Some("NAV"),
		class::RXM => Some("RXM"),
		class::INF => Some("INF"),
		class::ACK => Some("ACK"),
		class::CFG => Some("CFG"),
		class::MON => Some("MON"),
		class::TIM => Some("TIM"),
		class::ESF => Some("ESF"),
		class::LOG => Some("LOG"),
		class::SEC => Some("SEC"),
		class::HNR => Some("HNR"),
		_ => None,
	}
}

fn ack_msg_name(id:u8) -> Option<&'static str> {
	match id {
		0x00 => Some("NAK"),
		0x01 => Some("ACK"),
		_ => None,
	}
}

fn cfg_msg_name(id:u8) -> Option<&'static str> {
	match id {
		0x00 => Some("PRT"),
		0x01 => Some("MSG"),
		0x02 => Some("INF"),
		0x04 => Some("RST"),
		0x06 => Some("DAT"),
		0x08 => Some("RATE"),
		0x09 => Some("CFG"),
		0x11 => Some("RXM"),
		0x13 => Some("ANT"),
		0x16 => Some("SBAS"),
		0x17 => Some("NMEA"),
		0x1B => Some("USB"),
		0x1E => Some("ODO"),
		0x23 => Some("NAVX5"),
		0x24 => Some("NAV5"),
		0x31 => Some("TP5"),
		0x34 => Some("RINV"),
		0x39 => Some("ITFM"),
		0x3B => Some("PM2"),
		0x3D => Some("TMODE2"),
		0x3E => Some("GNSS"),
		0x47 => Some("LOGFILTER"),
		0x53 => Some("TXSLOT"),
		0x57 => Some("PWR"),
		0x5C => Some("HNR"),
		0x60 => Some("ESRC"),
		0x61 => Some("DOSC"),
		0x62 => Some("SMGR"),
		0x69 => Some("GEOFENCE"),
		0x70 => Some("DGNSS"),
		0x71 => Some("TMODE3"),
		0x86 => Some("PMS"),
		0x8A => Some("VALSET"),
		0x8B => Some("VALGET"),
		0x8C => Some("VALDEL"),
		0x93 => Some("BATCH"),
		_ => None,
	}
}

fn mon_msg_name(id:u8) -> Option<&'static str> {
	match id {
		0x02 => Some("IO"),
		0x04 => Some("VER"),
		0x06 => Some("MSGPP"),
		0x07 => Some("RXBUF"),
		0x08 => Some("TXBUF"),
		0x09 => Some("HW"),
		0x0B => Some("HW2"),
		0x28 => Some("GNSS"),
		0x36 => Some("COMMS"),
		0x38 => Some("RF"),
		_ => None,
	}
}

fn nav_msg_name(id:u8) -> Option<&'static str> {
	match id {
		0x01 => Some("POSECEF"),
		0x02 => Some("POSLLH"),
		0x03 => Some("STATUS"),
		0x04 => Some("DOP"),
		0x07 => Some("PVT"),
		0x11 => Some("VELECEF"),
		0x12 => Some("VELNED"),
		0x20 => Some("TIMEGPS"),
		0x21 => Some("TIMEUTC"),
		0x22 => Some("CLOCK"),
		0x26 => Some("TIMELS"),
		0x35 => Some("SAT"),
		0x61 => Some("EOE"),
		_ => None,
	}
}

fn tim_msg_name(id:u8) -> Option<&'static str> {
	match id {
		0x01 => Some("TP"),
		0x03 => Some("TM2"),
		0x04 => Some("SVIN"),
		0x06 => Some("VRFY"),
		0x11 => Some("DOSC"),
		0x12 => Some("TOS"),
		0x13 => Some("SMEAS"),
		0x15 => Some("VCOCAL"),
		0x16 => Some("FCHG"),
		0x17 => Some("HOC"),
		_ => None,
	}
}

pub fn message_name(class:u8, id:u8) -> MessageName {
	let class_name = match class_name(class) {
		Some(name) => name.to_string(),
		None       => format!("CLASS_{:02X}", class),
	};

	let table:Option<fn(u8) -> Option<&'static str>> = match class {
		class::ACK => Some(ack_msg_name),
		class::CFG => Some(cfg_msg_name),
		class::MON => Some(mon_msg_name),
		class::NAV => Some(nav_msg_name),
		class::TIM => Some(tim_msg_name),
		_ => None,
	};

	let msg_name = match table {
		Some(lookup) => match lookup(id) {
			Some(name) => name.to_string(),
			None       => format!("ID_{:02X}", id),
		},
		None => "UNKNOWN".to_string(),
	};

	MessageName{ class_name, msg_name }
}

#[test]
fn test_known_names() {
	assert_eq!(message_name(0x06, 0x31).full_name(), "CFG-TP5");
	assert_eq!(message_name(0x05, 0x00).full_name(), "ACK-NAK");
	assert_eq!(message_name(0x0D, 0x01).full_name(), "TIM-TP");
	assert_eq!(message_name(0x01, 0x07).to_string(), "NAV-PVT");
}

#[test]
fn test_unknown_names() {
	assert_eq!(message_name(0x06, 0xF0).full_name(), "CFG-ID_F0");
	assert_eq!(message_name(0x7F, 0x01).full_name(), "CLASS_7F-UNKNOWN");
	// Known class without an id table
	assert_eq!(message_name(0x27, 0x03).full_name(), "SEC-UNKNOWN");
}
