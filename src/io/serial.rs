
use std::time::Duration;

use log::info;

use crate::UbxErr;
use super::UbxPort;

pub type SerialStream = Box<dyn serialport::SerialPort>;

// Matches the one second read timeout the receivers are usually polled with
pub const DEFAULT_READ_TIMEOUT:Duration = Duration::from_secs(1);

/// Opens a tty at the given baud rate, 8N1 without flow control
pub fn open(path:&str, baud_rate:u32, read_timeout:Duration) -> Result<UbxPort<SerialStream>, UbxErr> {
	let stream = serialport::new(path, baud_rate)
		.data_bits(serialport::DataBits::Eight)
		.parity(serialport::Parity::None)
		.stop_bits(serialport::StopBits::One)
		.flow_control(serialport::FlowControl::None)
		.timeout(read_timeout)
		.open()?;

	info!("Opened {} at {} baud", path, baud_rate);
	UbxPort::new(stream)
}
