
use std::fmt::Write;

pub const HEX_DISPLAY_LIMIT:usize = 32;

/// Lower-case hex of at most `max_len` bytes, noting how many were left out
pub fn format_hex(data:&[u8], max_len:usize) -> String {
	let shown = &data[..data.len().min(max_len)];
	let mut ans = String::with_capacity(2 * shown.len() + 24);
	for b in shown {
		let _ = write!(ans, "{:02x}", b);
	}
	if data.len() > max_len {
		let _ = write!(ans, " ... (+{} bytes)", data.len() - max_len);
	}
	ans
}

/// Inverse of `format_hex` for test vectors written as hex strings
#[cfg(test)]
pub(crate) fn parse_hex(s:&str) -> Vec<u8> {
	(0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i+2], 16).unwrap()).collect()
}

#[test]
fn test_format_hex() {
	assert_eq!(format_hex(&[0x00, 0xAB, 0x10], 32), "00ab10");
	assert_eq!(format_hex(&[], 32), "");
	assert_eq!(format_hex(&[0xFF; 40], 32), format!("{} ... (+8 bytes)", "ff".repeat(32)));
	assert_eq!(format_hex(&[0x01; 4], 4), "01010101");
}

#[test]
fn test_parse_hex() {
	assert_eq!(parse_hex("b562003f"), vec![0xB5, 0x62, 0x00, 0x3F]);
	assert_eq!(format_hex(&parse_hex("0a0b0c"), HEX_DISPLAY_LIMIT), "0a0b0c");
}
