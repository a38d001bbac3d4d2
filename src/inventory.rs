use serialport::{SerialPortType, UsbPortInfo};
use tracing::{debug, info};

use crate::constants::DEFAULT_PORT_DESCRIPTION;
use crate::error::{StLinkError, StLinkResult};

/// A serial device attached to an ST-LINK probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRecord {
    pub serial_number: String,
    /// OS port name, e.g. COM30 or /dev/ttyACM0
    pub port: String,
}

pub trait DeviceInventory {
    /// Serial devices belonging to ST-LINK probes
    fn ports(&self) -> StLinkResult<Vec<PortRecord>>;
}

/// Device inventory backed by the OS serial port enumeration
pub struct SerialPortInventory {
    description: String,
}

impl SerialPortInventory {
    pub fn new() -> Self {
        Self::with_description(DEFAULT_PORT_DESCRIPTION)
    }

    /// Only keep ports whose USB description contains `description`
    pub fn with_description(description: &str) -> Self {
        SerialPortInventory {
            description: description.to_owned(),
        }
    }

    fn matches(&self, usb: &UsbPortInfo) -> bool {
        let description = match (&usb.manufacturer, &usb.product) {
            (Some(manufacturer), Some(product)) => format!("{} {}", manufacturer, product),
            (None, Some(product)) => product.clone(),
            (Some(manufacturer), None) => manufacturer.clone(),
            (None, None) => return false,
        };

        description.contains(&self.description)
    }

    fn port_record(&self, port_name: String, port_type: &SerialPortType) -> Option<PortRecord> {
        let SerialPortType::UsbPort(usb) = port_type else {
            return None;
        };

        if !self.matches(usb) {
            return None;
        }

        match &usb.serial_number {
            Some(serial_number) => Some(PortRecord {
                serial_number: serial_number.clone(),
                port: port_name,
            }),
            None => {
                debug!("{} has no USB serial number, skipping", port_name);
                None
            }
        }
    }
}

impl Default for SerialPortInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceInventory for SerialPortInventory {
    fn ports(&self) -> StLinkResult<Vec<PortRecord>> {
        let ports = serialport::available_ports().map_err(|e| {
            StLinkError::Enumeration(format!("Could not get available ports. Err {:?}", e))
        })?;

        let records: Vec<PortRecord> = ports
            .into_iter()
            .filter_map(|p| self.port_record(p.port_name, &p.port_type))
            .collect();

        info!("Found {} ST-LINK serial port(s)", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb(
        manufacturer: Option<&str>,
        product: Option<&str>,
        serial: Option<&str>,
    ) -> SerialPortType {
        SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x0483,
            pid: 0x374b,
            serial_number: serial.map(str::to_owned),
            manufacturer: manufacturer.map(str::to_owned),
            product: product.map(str::to_owned),
        })
    }

    #[test]
    fn test_windows_description_matches() {
        let inventory = SerialPortInventory::new();
        let port_type = usb(
            None,
            Some("STMicroelectronics STLink Virtual COM Port (COM30)"),
            Some("066DFF485750717867174227"),
        );

        assert_eq!(
            inventory.port_record("COM30".to_string(), &port_type),
            Some(PortRecord {
                serial_number: "066DFF485750717867174227".to_string(),
                port: "COM30".to_string(),
            })
        );
    }

    #[test]
    fn test_linux_description_matches() {
        let inventory = SerialPortInventory::new();
        let port_type = usb(
            Some("STMicroelectronics"),
            Some("STM32 STLink"),
            Some("0670FF555051897267063341"),
        );

        let record = inventory
            .port_record("/dev/ttyACM0".to_string(), &port_type)
            .unwrap();
        assert_eq!(record.port, "/dev/ttyACM0");
    }

    #[test]
    fn test_other_devices_are_ignored() {
        let inventory = SerialPortInventory::new();

        let ftdi = usb(Some("FTDI"), Some("FT232R USB UART"), Some("A50285BI"));
        assert_eq!(inventory.port_record("COM3".to_string(), &ftdi), None);

        let no_serial = usb(None, Some("STM32 STLink"), None);
        assert_eq!(inventory.port_record("COM4".to_string(), &no_serial), None);

        assert_eq!(
            inventory.port_record("COM1".to_string(), &SerialPortType::Unknown),
            None
        );
    }

    #[test]
    fn test_custom_description() {
        let inventory = SerialPortInventory::with_description("Virtual COM Port");
        let port_type = usb(None, Some("STM32 STLink"), Some("48FF6E066772"));
        assert_eq!(inventory.port_record("COM5".to_string(), &port_type), None);
    }
}
