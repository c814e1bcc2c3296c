
use crate::UbxErr;
use super::*;
use crate::utils::parse_hex as hex;


#[test]
fn encode_ack() {
	let p = Packet::new(class::ACK, id::ACK_ACK, vec![0x06, 0x31]);
	assert_eq!(p.encode().unwrap(), hex("b5620501020006313f68"));
	assert_eq!(p.frame_len(), 10);
}

#[test]
fn encode_empty_payload() {
	let p = Packet::new(class::MON, 0x04, vec![]);
	assert_eq!(p.encode().unwrap(), hex("b5620a0400000e34"));
}

#[test]
fn encode_rejects_oversized_payload() {
	let p = Packet::new(class::CFG, id::CFG_VALSET, vec![0; 70000]);
	match p.encode() {
		Err(UbxErr::PayloadTooLong(70000)) => {},
		other => panic!("unexpected result {:?}", other),
	}
}

#[test]
fn decode_nak() {
	let p = Packet::decode(&hex("b5620500020006313e63")).unwrap();
	assert_eq!(p, Packet::new(class::ACK, id::ACK_NAK, vec![0x06, 0x31]));
	assert_eq!(p.name().full_name(), "ACK-NAK");
	assert!(p.is(class::ACK, id::ACK_NAK));
}

#[test]
fn decode_ignores_trailing_bytes() {
	let mut frame = hex("b562063101000038e5");
	frame.extend(&[0xB5, 0x62]);
	let p = Packet::decode(&frame).unwrap();
	assert_eq!(p.payload, vec![0x00]);
}

#[test]
fn decode_errors() {
	match Packet::decode(&[0xB5, 0x62, 0x05]) {
		Err(UbxErr::Truncated{ needed: 8, available: 3 }) => {},
		other => panic!("unexpected result {:?}", other),
	}

	match Packet::decode(&hex("b5630501020006313f68")) {
		Err(UbxErr::BadSync) => {},
		other => panic!("unexpected result {:?}", other),
	}

	// Length field claims more payload than the frame holds
	match Packet::decode(&hex("b56205010400063100")) {
		Err(UbxErr::Truncated{ needed: 12, available: 9 }) => {},
		other => panic!("unexpected result {:?}", other),
	}

	match Packet::decode(&hex("b5620501020006313f69")) {
		Err(UbxErr::ChecksumMismatch{ expected: (0x3F, 0x68), found: (0x3F, 0x69) }) => {},
		other => panic!("unexpected result {:?}", other),
	}
}

#[test]
fn decode_long_payload() {
	// Length above 255 exercises the high byte of the length field
	let payload:Vec<u8> = (0..1000usize).map(|i| (i * 7) as u8).collect();
	let frame = Packet::new(class::CFG, id::CFG_VALSET, payload.clone()).encode().unwrap();
	assert_eq!(&frame[4..6], &[0xE8, 0x03]);
	assert_eq!(Packet::decode(&frame).unwrap().payload, payload);
}

#[test]
fn largest_payload_survives_encode_and_decode() {
	let payload:Vec<u8> = (0..u16::MAX as usize).map(|i| (i % 251) as u8).collect();
	let p = Packet::new(class::LOG, 0x0B, payload);
	let frame = p.encode().unwrap();
	assert_eq!(&frame[4..6], &[0xFF, 0xFF]);
	assert_eq!(frame.len(), MIN_FRAME_LEN + 65535);
	assert_eq!(Packet::decode(&frame).unwrap(), p);

	let one_more = Packet::new(class::LOG, 0x0B, vec![0; u16::MAX as usize + 1]);
	assert!(one_more.encode().is_err());
}
