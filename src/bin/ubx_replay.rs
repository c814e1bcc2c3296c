
extern crate clap;
extern crate colored;
extern crate ubx_pps;

use std::fs::File;
use std::io::BufReader;

use chrono::Local;
use clap::{Arg, App, ArgMatches};
use colored::*;
use ubx_pps::UbxErr;
use ubx_pps::io::UbxPort;
use ubx_pps::monitor::{Monitor, MonitorOptions};

fn replay(path:&str, options:MonitorOptions) -> Result<(), UbxErr> {
	let mut port = UbxPort::new(BufReader::new(File::open(path)?))?;
	let mut monitor = Monitor::new(options);

	while let Some(event) = port.read_event(None)? {
		if let Some(record) = monitor.handle(event, Local::now()) {
			record.print(options.json)?;
		}
	}

	let summary = monitor.summary();
	if !options.json {
		eprintln!("{}", "=".repeat(80));
		eprintln!("{}", format!("{}: {} UBX packets, {} NMEA sentences, {} bytes discarded",
			path, summary.packets, summary.nmea_sentences, summary.discarded_bytes).bold());
	}
	Ok(())
}

fn app() -> App<'static, 'static> {
	App::new("UBX Replay")
		.version("0.1.0")
		.about("Decodes a raw capture of receiver output offline")
		.arg(Arg::with_name("filename")
			.help("Capture file")
			.required(true).index(1))
		.arg(Arg::with_name("expected_width_ms")
			.long("expected-width-ms").takes_value(true))
		.arg(Arg::with_name("json").long("json"))
}

fn options_from(matches:&ArgMatches) -> Result<MonitorOptions, UbxErr> {
	let mut options = MonitorOptions::default();
	options.json = matches.is_present("json");
	if let Some(s) = matches.value_of("expected_width_ms") {
		options.expected_width_ms = s.parse()
			.map_err(|_| UbxErr::InvalidArgument(format!("can't parse expected width '{}'", s)))?;
	}
	Ok(options)
}

fn main() {
	env_logger::init();

	let matches = app().get_matches();
	let fname:&str = matches.value_of("filename").unwrap_or_default();

	let result = options_from(&matches).and_then(|options| replay(fname, options));
	if let Err(e) = result {
		eprintln!("{}", format!("Error: {}", e).red());
		std::process::exit(1);
	}
}
