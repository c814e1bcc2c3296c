
extern crate clap;
extern crate colored;
extern crate ubx_pps;

use clap::{Arg, App, ArgMatches};
use colored::*;
use ubx_pps::UbxErr;
use ubx_pps::io::serial;
use ubx_pps::monitor::{self, MonitorOptions, Summary};

fn print_summary(summary:&Summary) {
	eprintln!("{}", "=".repeat(80));
	if summary.interrupted { eprintln!("Monitoring stopped by user"); }
	eprintln!("{}", format!("Total UBX packets processed: {}", summary.packets).bold());
	eprintln!("NMEA sentences: {}, discarded bytes: {}", summary.nmea_sentences, summary.discarded_bytes);
}

async fn run(matches:&ArgMatches<'_>) -> Result<Summary, UbxErr> {
	let port_name:&str = matches.value_of("port").unwrap_or_default();
	let baud:u32 = matches.value_of("baudrate").unwrap_or_default().parse()
		.map_err(|_| UbxErr::InvalidArgument("baud rate must be an integer".to_string()))?;

	let mut options = MonitorOptions::default();
	options.json = matches.is_present("json");
	if let Some(s) = matches.value_of("expected_width_ms") {
		options.expected_width_ms = s.parse()
			.map_err(|_| UbxErr::InvalidArgument(format!("can't parse expected width '{}'", s)))?;
	}

	let port = serial::open(port_name, baud, serial::DEFAULT_READ_TIMEOUT)?;
	if !options.json {
		eprintln!("Monitoring UBX packets on {} at {} baud (Ctrl-C to stop)", port_name, baud);
		eprintln!("{}", "=".repeat(80));
	}

	let json = options.json;
	monitor::run(port.into_inner(), options, |record| record.print(json)).await
}

#[tokio::main]
async fn main() {
	env_logger::init();

	let matches = App::new("UBX Monitor")
		.version("0.1.0")
		.about("Prints every UBX packet a u-blox receiver sends, with CFG-TP5 and time messages decoded")
		.arg(Arg::with_name("port")
			.help("Serial device, e.g. /dev/ttyACM0")
			.required(true).index(1))
		.arg(Arg::with_name("baudrate")
			.help("Baud rate, e.g. 9600")
			.required(true).index(2))
		.arg(Arg::with_name("expected_width_ms")
			.long("expected-width-ms").takes_value(true)
			.help("Pulse width CFG-TP5 reports are checked against, default 5.0"))
		.arg(Arg::with_name("json").long("json")
			.help("One JSON object per line instead of text"))
		.get_matches();

	match run(&matches).await {
		Ok(summary) => print_summary(&summary),
		Err(e) => {
			eprintln!("{}", format!("Error: {}", e).red());
			std::process::exit(1);
		}
	}
}
