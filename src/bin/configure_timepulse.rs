
extern crate clap;
extern crate colored;
extern crate ubx_pps;

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use clap::{Arg, App, ArgMatches};
use colored::*;
use ubx_pps::UbxErr;
use ubx_pps::io::serial;
use ubx_pps::timepulse::{self, ConfigOutcome};
use ubx_pps::ubx::messages::Tp5Config;

// Lets the receiver finish whatever it was sending when the port opened
const SETTLE_TIME:Duration = Duration::from_millis(500);

fn parse_arg<T: std::str::FromStr>(matches:&ArgMatches, name:&str) -> Result<Option<T>, UbxErr> {
	match matches.value_of(name) {
		Some(s) => s.parse::<T>().map(Some).map_err(|_| UbxErr::InvalidArgument(format!("can't parse {} '{}'", name, s))),
		None => Ok(None),
	}
}

fn build_config(matches:&ArgMatches) -> Result<Tp5Config, UbxErr> {
	let mut config:Tp5Config = match matches.value_of("config") {
		Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
		None => Tp5Config::default(),
	};

	if let Some(idx) = parse_arg(matches, "tp_idx")?            { config.tp_idx = idx; }
	if let Some(ns)  = parse_arg(matches, "ant_cable_delay_ns")? { config.ant_cable_delay_ns = ns; }
	if let Some(ns)  = parse_arg(matches, "rf_group_delay_ns")?  { config.rf_group_delay_ns = ns; }
	if let Some(ns)  = parse_arg(matches, "user_delay_ns")?      { config.user_config_delay_ns = ns; }
	if let Some(us)  = parse_arg(matches, "period_us")?          { config = config.with_period_us(us); }
	if let Some(ms)  = parse_arg(matches, "pulse_width_ms")?     { config = config.with_pulse_width_ms(ms)?; }
	if matches.is_present("polarity_high")   { config.polarity = true; }
	if matches.is_present("no_align_to_tow") { config.align_to_tow = false; }

	config.validate()?;
	Ok(config)
}

fn run(matches:&ArgMatches) -> Result<bool, UbxErr> {
	let port_name:&str = matches.value_of("port").unwrap_or_default();
	let baud:u32 = parse_arg(matches, "baudrate")?.unwrap_or(9600);
	let timeout = parse_arg::<u64>(matches, "timeout_ms")?.map(Duration::from_millis).unwrap_or(timepulse::DEFAULT_TIMEOUT);
	let quiet = matches.is_present("quiet");

	let config = build_config(matches)?;
	let mut port = serial::open(port_name, baud, serial::DEFAULT_READ_TIMEOUT)?;
	std::thread::sleep(SETTLE_TIME);

	if matches.is_present("query") {
		return match timepulse::query(&mut port, config.tp_idx, timeout)? {
			Some(current) => {
				println!("{}", serde_json::to_string_pretty(&current)?);
				Ok(true)
			},
			None => {
				eprintln!("{}", format!("No CFG-TP5 reply for time pulse {}", config.tp_idx).red());
				Ok(false)
			}
		};
	}

	if !quiet {
		let width = config.pulse_width_ms().map(|ms| format!("{:.3} ms", ms)).unwrap_or_else(|| "duty cycle".to_string());
		eprintln!("Configuring time pulse {} on {} at {} baud: width {}, period {} us, flags 0x{:02X}",
			config.tp_idx, port_name, baud, width, config.freq_period, config.flags());
	}

	let outcome = timepulse::configure(&mut port, &config, timeout)?;
	if !quiet {
		match outcome {
			ConfigOutcome::Acknowledged => eprintln!("{}", "Receiver acknowledged CFG-TP5".green().bold()),
			ConfigOutcome::Rejected     => eprintln!("{}", "Receiver rejected CFG-TP5 (ACK-NAK)".red()),
			ConfigOutcome::NoResponse   => eprintln!("{}", format!("No acknowledgement within {:?}", timeout).yellow()),
		}
	}

	Ok(outcome == ConfigOutcome::Acknowledged)
}

fn main() {
	env_logger::init();

	let matches = App::new("UBX Time Pulse Configuration")
		.version("0.1.0")
		.about("Sends CFG-TP5 to a u-blox receiver and waits for the acknowledgement")
		.arg(Arg::with_name("port")
			.help("Serial device, e.g. /dev/ttyACM0")
			.required(true).index(1))
		.arg(Arg::with_name("baudrate")
			.help("Baud rate, e.g. 9600")
			.required(true).index(2))
		.arg(Arg::with_name("pulse_width_ms")
			.long("pulse-width-ms").takes_value(true)
			.help("Pulse width in milliseconds, default 5.0"))
		.arg(Arg::with_name("tp_idx")
			.long("tp-idx").takes_value(true)
			.possible_values(&["0", "1"])
			.help("Time pulse index, default 0"))
		.arg(Arg::with_name("ant_cable_delay_ns").long("ant-cable-delay-ns").takes_value(true).allow_hyphen_values(true))
		.arg(Arg::with_name("rf_group_delay_ns").long("rf-group-delay-ns").takes_value(true).allow_hyphen_values(true))
		.arg(Arg::with_name("user_delay_ns").long("user-delay-ns").takes_value(true).allow_hyphen_values(true))
		.arg(Arg::with_name("period_us")
			.long("period-us").takes_value(true)
			.help("Pulse period in microseconds, default 1000000"))
		.arg(Arg::with_name("polarity_high").long("polarity-high")
			.help("Rising edge at the top of the second"))
		.arg(Arg::with_name("no_align_to_tow").long("no-align-to-tow"))
		.arg(Arg::with_name("config")
			.long("config").takes_value(true)
			.help("JSON file with CFG-TP5 fields; command line flags take precedence"))
		.arg(Arg::with_name("timeout_ms")
			.long("timeout-ms").takes_value(true)
			.help("How long to wait for ACK-ACK/ACK-NAK, default 2000"))
		.arg(Arg::with_name("query").long("query")
			.help("Print the receiver's current configuration instead of changing it"))
		.arg(Arg::with_name("quiet").short("q").long("quiet"))
		.get_matches();

	match run(&matches) {
		Ok(true) => {},
		Ok(false) => std::process::exit(1),
		Err(e) => {
			eprintln!("{}", format!("Error: {}", e).red());
			std::process::exit(1);
		}
	}
}
