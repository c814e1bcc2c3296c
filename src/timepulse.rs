
use std::io::{Read, Write};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::Serialize;

use crate::UbxErr;
use crate::io::UbxPort;
use crate::ubx::{class, id};
use crate::ubx::frame_sync::FrameEvent;
use crate::ubx::messages::{cfg_tp5, Ack, Tp5Config};

pub const DEFAULT_TIMEOUT:Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigOutcome {
	Acknowledged,
	Rejected,
	NoResponse,
}

/// Sends CFG-TP5 and waits for the receiver to acknowledge it
pub fn configure<S: Read + Write>(port:&mut UbxPort<S>, config:&Tp5Config, timeout:Duration) -> Result<ConfigOutcome, UbxErr> {
	config.validate()?;
	port.write_packet(&config.to_packet())?;
	await_ack(port, class::CFG, id::CFG_TP5, timeout)
}

/// Waits for an ACK-ACK or ACK-NAK answering `class`/`id`. Everything else the
/// receiver sends meanwhile, including acknowledgements of other messages, is skipped.
pub fn await_ack<S: Read>(port:&mut UbxPort<S>, class:u8, id:u8, timeout:Duration) -> Result<ConfigOutcome, UbxErr> {
	let deadline = Instant::now() + timeout;

	while let Some(event) = port.read_event(Some(deadline))? {
		let packet = match event {
			FrameEvent::Packet(p) => p,
			_ => continue,
		};

		match Ack::from_packet(&packet) {
			Some(ack) if ack.acknowledges(class, id) => {
				return Ok(if ack.accepted { ConfigOutcome::Acknowledged } else { ConfigOutcome::Rejected });
			},
			Some(ack) => debug!("Ignoring acknowledgement for {}", ack.target_name()),
			None      => debug!("Skipping {} while waiting for acknowledgement", packet.name()),
		}
	}

	warn!("No acknowledgement within {:?}", timeout);
	Ok(ConfigOutcome::NoResponse)
}

/// Polls the receiver for the current settings of one time pulse. `Ok(None)` if the
/// receiver refuses the poll or doesn't answer in time.
pub fn query<S: Read + Write>(port:&mut UbxPort<S>, tp_idx:u8, timeout:Duration) -> Result<Option<Tp5Config>, UbxErr> {
	port.write_packet(&Tp5Config::poll_packet(tp_idx))?;
	let deadline = Instant::now() + timeout;

	while let Some(event) = port.read_event(Some(deadline))? {
		let packet = match event {
			FrameEvent::Packet(p) => p,
			_ => continue,
		};

		if packet.is(class::CFG, id::CFG_TP5) && packet.payload.len() >= cfg_tp5::PAYLOAD_LEN {
			let config = Tp5Config::from_payload(&packet.payload)?;
			if config.tp_idx == tp_idx { return Ok(Some(config)); }
		} else if let Some(ack) = Ack::from_packet(&packet) {
			if !ack.accepted && ack.acknowledges(class::CFG, id::CFG_TP5) {
				warn!("Receiver rejected the CFG-TP5 poll");
				return Ok(None);
			}
		}
	}

	Ok(None)
}

#[cfg(test)]
mod tests {

	use super::*;
	use crate::io::tests::MockDevice;
	use crate::ubx::Packet;

	fn frame(class:u8, id:u8, payload:&[u8]) -> Vec<u8> {
		Packet::new(class, id, payload.to_vec()).encode().unwrap()
	}

	fn port_with(rx:Vec<u8>) -> UbxPort<MockDevice> {
		UbxPort::new(MockDevice::new(rx)).unwrap()
	}

	#[test]
	fn acknowledged() {
		let mut port = port_with(frame(class::ACK, id::ACK_ACK, &[0x06, 0x31]));
		let config = Tp5Config::default();
		assert_eq!(configure(&mut port, &config, DEFAULT_TIMEOUT).unwrap(), ConfigOutcome::Acknowledged);
		assert_eq!(port.get_ref().tx, config.to_packet().encode().unwrap());
	}

	#[test]
	fn rejected() {
		let mut port = port_with(frame(class::ACK, id::ACK_NAK, &[0x06, 0x31]));
		assert_eq!(configure(&mut port, &Tp5Config::default(), DEFAULT_TIMEOUT).unwrap(), ConfigOutcome::Rejected);
	}

	#[test]
	fn unrelated_traffic_is_skipped() {
		let mut rx = b"$GNZDA,201530.00,04,07,2024,00,00*7B\r\n".to_vec();
		rx.extend(frame(class::NAV, id::NAV_PVT, &[0u8; 92]));
		rx.extend(frame(class::ACK, id::ACK_NAK, &[0x06, 0x8A]));
		rx.extend(frame(class::ACK, id::ACK_ACK, &[0x06, 0x31]));

		let mut port = port_with(rx);
		assert_eq!(configure(&mut port, &Tp5Config::default(), DEFAULT_TIMEOUT).unwrap(), ConfigOutcome::Acknowledged);
	}

	#[test]
	fn silence_is_no_response() {
		let mut port = port_with(vec![]);
		assert_eq!(configure(&mut port, &Tp5Config::default(), Duration::from_millis(50)).unwrap(), ConfigOutcome::NoResponse);
	}

	#[test]
	fn invalid_config_is_not_sent() {
		let mut port = port_with(vec![]);
		let config = Tp5Config{ tp_idx: 3, ..Tp5Config::default() };
		assert!(configure(&mut port, &config, DEFAULT_TIMEOUT).is_err());
		assert!(port.get_ref().tx.is_empty());
	}

	#[test]
	fn query_returns_matching_time_pulse() {
		let tp0 = Tp5Config::default();
		let tp1 = Tp5Config{ tp_idx: 1, polarity: true, ..Tp5Config::default() }.with_pulse_width_ms(100.0).unwrap();

		let mut rx = frame(class::CFG, id::CFG_TP5, &tp0.to_payload());
		rx.extend(frame(class::CFG, id::CFG_TP5, &tp1.to_payload()));
		rx.extend(frame(class::ACK, id::ACK_ACK, &[0x06, 0x31]));

		let mut port = port_with(rx);
		assert_eq!(query(&mut port, 1, DEFAULT_TIMEOUT).unwrap(), Some(tp1));
		assert_eq!(port.get_ref().tx, Tp5Config::poll_packet(1).encode().unwrap());
	}

	#[test]
	fn query_rejected() {
		let mut port = port_with(frame(class::ACK, id::ACK_NAK, &[0x06, 0x31]));
		assert_eq!(query(&mut port, 0, DEFAULT_TIMEOUT).unwrap(), None);
	}

}
