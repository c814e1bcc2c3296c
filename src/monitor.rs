
use std::fmt;
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use colored::*;
use log::{debug, info};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::UbxErr;
use crate::io::UbxPort;
use crate::ubx::Packet;
use crate::ubx::frame_sync::FrameEvent;
use crate::ubx::messages::{self, Message};
use crate::utils::{format_hex, HEX_DISPLAY_LIMIT};

pub const DEFAULT_EXPECTED_WIDTH_MS:f64 = 5.0;

// How often the reader checks whether it has been asked to stop
const POLL_INTERVAL:Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorOptions {
	pub expected_width_ms:f64,
	pub json:bool,
}

impl Default for MonitorOptions {
	fn default() -> Self { Self{ expected_width_ms: DEFAULT_EXPECTED_WIDTH_MS, json: false } }
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketReport {
	pub seq:usize,
	pub timestamp:DateTime<Local>,
	pub name:String,
	pub class:u8,
	pub id:u8,
	pub length:usize,
	pub payload_hex:String,
	pub message:Option<Message>,
	pub warnings:Vec<String>,
}

impl PacketReport {

	pub fn from_packet(seq:usize, timestamp:DateTime<Local>, packet:&Packet, expected_width_ms:f64) -> Self {
		let mut warnings:Vec<String> = vec![];

		let message = match messages::decode(packet) {
			Ok(m) => m,
			Err(e) => {
				warnings.push(format!("malformed payload: {}", e));
				None
			}
		};

		if let Some(Message::TimePulse(config)) = &message {
			if let Some(ms) = config.pulse_width_ms() {
				if (ms - expected_width_ms).abs() > 1e-9 {
					warnings.push(format!("pulse width is {:.1} ms, expected {:.1} ms", ms, expected_width_ms));
				}
			}
		}

		Self{
			seq,
			timestamp,
			name: packet.name().full_name(),
			class: packet.class,
			id: packet.id,
			length: packet.payload.len(),
			payload_hex: format_hex(&packet.payload, HEX_DISPLAY_LIMIT),
			message,
			warnings,
		}
	}

	pub fn header(&self) -> String {
		format!("[{}] UBX packet #{}", self.timestamp.format("%H:%M:%S%.3f"), self.seq)
	}

	pub fn body(&self) -> Vec<String> {
		let mut lines:Vec<String> = vec![
			format!("  Message: {}", self.name),
			format!("  Class: 0x{:02X}, ID: 0x{:02X}", self.class, self.id),
			format!("  Payload length: {} bytes", self.length),
		];

		match &self.message {
			Some(Message::TimePulse(c)) => {
				lines.push("  Time pulse configuration:".to_string());
				lines.push(format!("     TP index: {}", c.tp_idx));
				lines.push(format!("     Active: {}", c.active));
				lines.push(match (c.pulse_width_ms(), c.pulse_width_ns()) {
					(Some(ms), Some(ns)) => format!("     Pulse width: {:.3} ms ({} ns)", ms, ns),
					_ => "     Pulse width: N/A".to_string(),
				});
				lines.push(format!("     Frequency/period: {}", c.freq_period));
				lines.push(format!("     isLength: {}, isFreq: {}", c.is_length, c.is_freq));
				lines.push(format!("     Polarity: {}", if c.polarity { "HIGH" } else { "LOW" }));
				lines.push(format!("     Align to TOW: {}", c.align_to_tow));
				lines.push(format!("     Antenna cable delay: {} ns", c.ant_cable_delay_ns));
				lines.push(format!("     RF group delay: {} ns", c.rf_group_delay_ns));
			},
			Some(Message::TimePulsePoll{ tp_idx: Some(idx) }) => lines.push(format!("  Time pulse poll for TP index {}", idx)),
			Some(Message::TimePulsePoll{ tp_idx: None })      => lines.push("  Time pulse poll".to_string()),
			Some(Message::Ack(ack)) => {
				let verdict = if ack.accepted { "Acknowledged" } else { "Rejected" };
				lines.push(format!("  {}: {}", verdict, ack.target_name()));
			},
			Some(Message::NavPvt(t)) => lines.push(match t.utc() {
				Some(utc) => format!("  UTC time: {} (date valid: {}, fully resolved: {})",
					utc.format("%Y-%m-%d %H:%M:%S%.9f"), t.valid_date(), t.fully_resolved()),
				None => "  UTC time: not valid".to_string(),
			}),
			Some(Message::TimTp(tp)) => {
				let base = if tp.is_utc_base() { "UTC" } else { "GNSS" };
				lines.push(format!("  Next pulse: week {}, TOW {:.9} s ({}), qErr {} ps", tp.week, tp.time_of_week(), base, tp.q_err_ps));
			},
			None => {}
		}

		for w in &self.warnings {
			lines.push(format!("  WARNING: {}", w));
		}

		lines.push(format!("  Payload (hex): {}", self.payload_hex));
		lines
	}

}

impl fmt::Display for PacketReport {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.header())?;
		for line in self.body() {
			write!(f, "\n{}", line)?;
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
	Packet(PacketReport),
	Nmea{ timestamp:DateTime<Local>, sentence:String },
}

impl Record {

	pub fn render(&self, json:bool) -> Result<String, UbxErr> {
		if json {
			return Ok(serde_json::to_string(self)?);
		}
		Ok(match self {
			Record::Packet(report) => format!("{}\n", report),
			Record::Nmea{ sentence, .. } => format!("[NMEA] {}", sentence),
		})
	}

	pub fn print(&self, json:bool) -> Result<(), UbxErr> {
		if json {
			println!("{}", self.render(true)?);
			return Ok(());
		}

		match self {
			Record::Packet(report) => {
				println!("{}", report.header().cyan().bold());
				for line in report.body() {
					if line.trim_start().starts_with("WARNING") { println!("{}", line.yellow()); }
					else                                        { println!("{}", line);          }
				}
				println!();
			},
			Record::Nmea{ sentence, .. } => println!("{}", format!("[NMEA] {}", sentence).dimmed()),
		}
		Ok(())
	}

}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
	pub packets:usize,
	pub nmea_sentences:usize,
	pub discarded_bytes:usize,
	pub interrupted:bool,
}

pub struct Monitor {
	options:MonitorOptions,
	summary:Summary,
}

impl Monitor {

	pub fn new(options:MonitorOptions) -> Self {
		Self{ options, summary: Summary::default() }
	}

	pub fn summary(&self) -> Summary { self.summary }

	pub fn handle(&mut self, event:FrameEvent, timestamp:DateTime<Local>) -> Option<Record> {
		match event {
			FrameEvent::Packet(packet) => {
				self.summary.packets += 1;
				Some(Record::Packet(PacketReport::from_packet(self.summary.packets, timestamp, &packet, self.options.expected_width_ms)))
			},
			FrameEvent::Nmea(sentence) => {
				self.summary.nmea_sentences += 1;
				Some(Record::Nmea{ timestamp, sentence })
			},
			FrameEvent::Discarded(n) => {
				self.summary.discarded_bytes += n;
				debug!("Discarded {} bytes, {} so far", n, self.summary.discarded_bytes);
				None
			}
		}
	}

}

/// Frames `source` on a blocking reader task and hands every record to `on_record`
/// until the source ends or Ctrl-C is pressed.
pub async fn run<S, F>(source:S, options:MonitorOptions, mut on_record:F) -> Result<Summary, UbxErr>
	where S: Read + Send + 'static, F: FnMut(&Record) -> Result<(), UbxErr> {

	let (tx, mut rx) = mpsc::channel::<FrameEvent>(64);
	let stop = Arc::new(AtomicBool::new(false));
	let reader_stop = stop.clone();

	let reader:JoinHandle<Result<(), UbxErr>> = tokio::task::spawn_blocking(move || {
		let mut port = UbxPort::new(source)?;
		while !reader_stop.load(Ordering::Relaxed) {
			match port.read_event(Some(Instant::now() + POLL_INTERVAL))? {
				Some(event) => if tx.blocking_send(event).is_err() { break; },
				None if port.is_eof() => break,
				None => (),
			}
		}
		Ok(())
	});

	let mut monitor = Monitor::new(options);
	let outcome:Result<(), UbxErr> = async {
		let ctrl_c = tokio::signal::ctrl_c();
		tokio::pin!(ctrl_c);

		loop {
			tokio::select! {
				event = rx.recv() => match event {
					Some(event) => if let Some(record) = monitor.handle(event, Local::now()) {
						on_record(&record)?;
					},
					None => return Ok(()),
				},
				_ = &mut ctrl_c => {
					info!("Interrupted");
					monitor.summary.interrupted = true;
					return Ok(());
				}
			}
		}
	}.await;

	// The reader sees either the flag or a closed channel within one poll interval
	stop.store(true, Ordering::Relaxed);
	drop(rx);
	match reader.await {
		Ok(result) => result?,
		Err(e) => return Err(UbxErr::Io(std::io::Error::new(ErrorKind::Other, e))),
	}

	outcome?;
	Ok(monitor.summary())
}

#[cfg(test)]
mod tests {

	use std::io::Cursor;

	use chrono::TimeZone;

	use super::*;
	use crate::ubx::{class, id};
	use crate::ubx::messages::Tp5Config;

	fn at_noon() -> DateTime<Local> { Local.ymd(2025, 3, 1).and_hms_milli(12, 0, 1, 250) }

	fn hex_of(data:&[u8]) -> String { data.iter().map(|b| format!("{:02x}", b)).collect() }

	#[test]
	fn tp5_report_warns_about_width() {
		let config = Tp5Config::default().with_pulse_width_ms(100.0).unwrap();
		let report = PacketReport::from_packet(3, at_noon(), &config.to_packet(), DEFAULT_EXPECTED_WIDTH_MS);

		assert_eq!(report.name, "CFG-TP5");
		assert_eq!(report.header(), "[12:00:01.250] UBX packet #3");
		let text = report.to_string();
		assert!(text.contains("  Class: 0x06, ID: 0x31"));
		assert!(text.contains("     Pulse width: 100.000 ms (100000000 ns)"));
		assert!(text.contains("     Polarity: LOW"));
		assert!(text.contains("  WARNING: pulse width is 100.0 ms, expected 5.0 ms"));
		assert!(text.ends_with(&format!("  Payload (hex): {}", hex_of(&config.to_payload()))));
	}

	#[test]
	fn tp5_report_at_expected_width_has_no_warning() {
		let report = PacketReport::from_packet(1, at_noon(), &Tp5Config::default().to_packet(), 5.0);
		assert!(report.warnings.is_empty());
		assert!(report.to_string().contains("     Pulse width: 5.000 ms (5000000 ns)"));
	}

	#[test]
	fn duty_cycle_report_has_no_width() {
		let config = Tp5Config{ is_length: false, ..Tp5Config::default() };
		let report = PacketReport::from_packet(1, at_noon(), &config.to_packet(), 5.0);
		assert!(report.warnings.is_empty());
		assert!(report.to_string().contains("     Pulse width: N/A"));
	}

	#[test]
	fn malformed_payload_is_a_warning() {
		let packet = Packet::new(class::NAV, id::NAV_PVT, vec![0u8; 40]);
		let report = PacketReport::from_packet(1, at_noon(), &packet, 5.0);
		assert!(report.message.is_none());
		assert_eq!(report.warnings.len(), 1);
		assert!(report.payload_hex.ends_with(" ... (+8 bytes)"));
	}

	#[test]
	fn ack_report_names_target() {
		let packet = Packet::new(class::ACK, id::ACK_NAK, vec![0x06, 0x31]);
		let report = PacketReport::from_packet(1, at_noon(), &packet, 5.0);
		assert!(report.to_string().contains("  Rejected: CFG-TP5"));
	}

	#[test]
	fn json_record() {
		let packet = Packet::new(class::ACK, id::ACK_ACK, vec![0x06, 0x31]);
		let record = Record::Packet(PacketReport::from_packet(1, at_noon(), &packet, 5.0));
		let value:serde_json::Value = serde_json::from_str(&record.render(true).unwrap()).unwrap();
		assert_eq!(value["kind"], "packet");
		assert_eq!(value["name"], "ACK-ACK");
		assert_eq!(value["message"]["type"], "Ack");
		assert_eq!(value["message"]["accepted"], true);

		let nmea = Record::Nmea{ timestamp: at_noon(), sentence: "$GNGLL,1*00".to_string() };
		assert_eq!(nmea.render(false).unwrap(), "[NMEA] $GNGLL,1*00");
	}

	#[test]
	fn monitor_counts_events() {
		let mut monitor = Monitor::new(MonitorOptions::default());
		assert!(monitor.handle(FrameEvent::Discarded(5), at_noon()).is_none());
		assert!(monitor.handle(FrameEvent::Nmea("$GPTXT,01*00".to_string()), at_noon()).is_some());
		match monitor.handle(FrameEvent::Packet(Tp5Config::poll_packet(0)), at_noon()) {
			Some(Record::Packet(report)) => {
				assert_eq!(report.seq, 1);
				assert!(report.to_string().contains("  Time pulse poll for TP index 0"));
			},
			other => panic!("unexpected record {:?}", other),
		}
		assert_eq!(monitor.summary(), Summary{ packets: 1, nmea_sentences: 1, discarded_bytes: 5, interrupted: false });
	}

	#[tokio::test]
	async fn run_until_end_of_capture() {
		let mut capture = b"$GNRMC,001,A*1F\r\n".to_vec();
		capture.extend(Tp5Config::default().to_packet().encode().unwrap());
		capture.extend(&[0x00, 0x01, 0x02]);
		capture.extend(Packet::new(class::ACK, id::ACK_ACK, vec![0x06, 0x31]).encode().unwrap());

		let mut names:Vec<String> = vec![];
		let summary = run(Cursor::new(capture), MonitorOptions::default(), |record| {
			if let Record::Packet(report) = record { names.push(report.name.clone()); }
			Ok(())
		}).await.unwrap();

		assert_eq!(names, vec!["CFG-TP5".to_string(), "ACK-ACK".to_string()]);
		assert_eq!(summary, Summary{ packets: 2, nmea_sentences: 1, discarded_bytes: 3, interrupted: false });
	}

}
