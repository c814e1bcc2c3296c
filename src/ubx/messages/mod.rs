
use serde::Serialize;

use crate::UbxErr;
use super::{class, id, Packet};

pub mod ack;
pub mod cfg_tp5;
pub mod nav_pvt;
pub mod tim_tp;

pub use self::ack::Ack;
pub use self::cfg_tp5::Tp5Config;
pub use self::nav_pvt::NavPvtTime;
pub use self::tim_tp::TimTp;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Message {
	TimePulse(Tp5Config),
	TimePulsePoll{ tp_idx:Option<u8> },
	Ack(Ack),
	NavPvt(NavPvtTime),
	TimTp(TimTp),
}

/// Decodes the payload of the messages this crate understands. Packets of any
/// other type give `Ok(None)`; a known type with a malformed payload is an error.
pub fn decode(packet:&Packet) -> Result<Option<Message>, UbxErr> {
	let msg = match (packet.class, packet.id) {
		(class::CFG, id::CFG_TP5) => match packet.payload.len() {
			0 => Message::TimePulsePoll{ tp_idx: None },
			1 => Message::TimePulsePoll{ tp_idx: Some(packet.payload[0]) },
			_ => Message::TimePulse(Tp5Config::from_payload(&packet.payload)?),
		},
		(class::ACK, _) => match Ack::from_packet(packet) {
			Some(ack) => Message::Ack(ack),
			None => return Ok(None),
		},
		(class::NAV, id::NAV_PVT) => Message::NavPvt(NavPvtTime::from_payload(&packet.payload)?),
		(class::TIM, id::TIM_TP)  => Message::TimTp(TimTp::from_payload(&packet.payload)?),
		_ => return Ok(None),
	};

	Ok(Some(msg))
}

#[test]
fn test_decode_dispatch() {
	let poll = Tp5Config::poll_packet(1);
	assert_eq!(decode(&poll).unwrap(), Some(Message::TimePulsePoll{ tp_idx: Some(1) }));

	let tp5 = Tp5Config::default().to_packet();
	match decode(&tp5).unwrap() {
		Some(Message::TimePulse(c)) => assert_eq!(c, Tp5Config::default()),
		other => panic!("unexpected message {:?}", other),
	}

	let unknown = Packet::new(class::MON, 0x04, vec![]);
	assert_eq!(decode(&unknown).unwrap(), None);

	// A TP5 reply cut short is malformed rather than unknown
	let short = Packet::new(class::CFG, id::CFG_TP5, vec![0; 20]);
	assert!(decode(&short).is_err());
}
