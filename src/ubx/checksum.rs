
use super::{HEADER_LEN, MIN_FRAME_LEN};

// 8-bit Fletcher over class, id, length and payload
pub fn checksum(data:&[u8]) -> (u8, u8) {
	data.iter().fold((0u8, 0u8), |(ck_a, ck_b), b| {
		let ck_a = ck_a.wrapping_add(*b);
		(ck_a, ck_b.wrapping_add(ck_a))
	})
}

/// True if `frame` is exactly one complete frame whose trailing two bytes match the
/// checksum of everything between the sync characters and the checksum itself.
pub fn is_frame_checksum_ok(frame:&[u8]) -> bool {
	if frame.len() < MIN_FRAME_LEN { return false; }
	let n = frame.len();
	let (ck_a, ck_b) = checksum(&frame[2..n-2]);
	frame[n-2] == ck_a && frame[n-1] == ck_b && n - MIN_FRAME_LEN == super::payload_len(&frame[..HEADER_LEN])
}

#[test]
fn test_checksum_known_frames() {
	// ACK-ACK for CFG-TP5
	assert_eq!(checksum(&[0x05, 0x01, 0x02, 0x00, 0x06, 0x31]), (0x3F, 0x68));
	// MON-VER poll
	assert_eq!(checksum(&[0x0A, 0x04, 0x00, 0x00]), (0x0E, 0x34));
	assert_eq!(checksum(&[]), (0, 0));
}

#[test]
fn test_checksum_wraps() {
	let data:Vec<u8> = (0..3).flat_map(|_| 0..=255u8).collect();
	assert_eq!(checksum(&data), (128, 128));
}

#[test]
fn test_frame_checksum() {
	let frame = [0xB5, 0x62, 0x05, 0x00, 0x02, 0x00, 0x06, 0x31, 0x3E, 0x63];
	assert!(is_frame_checksum_ok(&frame));

	let mut corrupted = frame;
	corrupted[7] = 0x32;
	assert!(!is_frame_checksum_ok(&corrupted));

	assert!(!is_frame_checksum_ok(&frame[..7]));
}
