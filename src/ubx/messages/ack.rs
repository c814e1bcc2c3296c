
use serde::Serialize;

use crate::ubx::{class, id, names, Packet};

/// ACK-ACK or ACK-NAK naming the message it answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
	pub accepted:bool,
	pub class:u8,
	pub id:u8,
}

impl Ack {

	pub fn from_packet(packet:&Packet) -> Option<Ack> {
		if packet.class != class::ACK || packet.payload.len() < 2 {
			return None;
		}

		let accepted = match packet.id {
			id::ACK_ACK => true,
			id::ACK_NAK => false,
			_ => return None,
		};

		Some(Ack{ accepted, class: packet.payload[0], id: packet.payload[1] })
	}

	pub fn acknowledges(&self, class:u8, id:u8) -> bool { self.class == class && self.id == id }

	pub fn target_name(&self) -> names::MessageName { names::message_name(self.class, self.id) }

}

#[test]
fn test_ack_and_nak() {
	let ack = Ack::from_packet(&Packet::new(class::ACK, id::ACK_ACK, vec![0x06, 0x31])).unwrap();
	assert!(ack.accepted);
	assert!(ack.acknowledges(class::CFG, id::CFG_TP5));
	assert!(!ack.acknowledges(class::CFG, id::CFG_VALSET));
	assert_eq!(ack.target_name().full_name(), "CFG-TP5");

	let nak = Ack::from_packet(&Packet::new(class::ACK, id::ACK_NAK, vec![0x06, 0x8A])).unwrap();
	assert!(!nak.accepted);
	assert!(nak.acknowledges(class::CFG, id::CFG_VALSET));
}

#[test]
fn test_not_an_ack() {
	assert_eq!(Ack::from_packet(&Packet::new(class::CFG, id::CFG_TP5, vec![0x06, 0x31])), None);
	assert_eq!(Ack::from_packet(&Packet::new(class::ACK, 0x02, vec![0x06, 0x31])), None);
	assert_eq!(Ack::from_packet(&Packet::new(class::ACK, id::ACK_ACK, vec![0x06])), None);
}
