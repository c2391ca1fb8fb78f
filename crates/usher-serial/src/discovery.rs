//! Controller port auto-discovery
//!
//! Heuristic only: the first device whose description or hardware id carries
//! a known controller marker wins, with the first enumerated device as a
//! fallback guess. With several serial devices attached this can pick the
//! wrong one; the resolved port is persisted to config so a user can correct
//! it once and keep it.

use serialport::SerialPortType;
use tracing::debug;

/// Descriptor/hardware-id substrings of the usual controller boards
/// (Arduino, WCH CH340 clones, generic USB-serial bridges)
const CONTROLLER_MARKERS: &[&str] = &["arduino", "wch", "usb serial"];

/// One enumerated serial-capable device
#[derive(Debug, Clone)]
pub struct PortCandidate {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`
    pub name: String,
    /// Human-readable product description
    pub description: String,
    /// Hardware identifier (VID:PID plus manufacturer, when known)
    pub hardware_id: String,
}

/// Pick the most likely controller port from enumerated candidates.
///
/// Matching is case-insensitive over description and hardware id, plus a
/// USB-CDC-looking device name (`acm` / `usbmodem`). Falls back to the first
/// candidate; `None` when the list is empty.
pub fn pick_controller_port(candidates: &[PortCandidate]) -> Option<String> {
    for c in candidates {
        let desc = c.description.to_lowercase();
        let hwid = c.hardware_id.to_lowercase();
        let name = c.name.to_lowercase();

        let marker_hit = CONTROLLER_MARKERS
            .iter()
            .any(|m| desc.contains(m) || hwid.contains(m));
        if marker_hit || name.contains("acm") || name.contains("usbmodem") {
            return Some(c.name.clone());
        }
    }
    candidates.first().map(|c| c.name.clone())
}

/// Enumerate the host's serial devices and pick the controller
pub fn discover() -> Option<String> {
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            debug!(error = %e, "Port enumeration failed");
            return None;
        }
    };

    let candidates: Vec<PortCandidate> = ports.into_iter().map(candidate_from).collect();
    debug!(count = candidates.len(), "Enumerated serial ports");
    pick_controller_port(&candidates)
}

fn candidate_from(info: serialport::SerialPortInfo) -> PortCandidate {
    match info.port_type {
        SerialPortType::UsbPort(usb) => PortCandidate {
            name: info.port_name,
            description: usb.product.unwrap_or_default(),
            hardware_id: format!(
                "USB VID:PID={:04X}:{:04X} {}",
                usb.vid,
                usb.pid,
                usb.manufacturer.unwrap_or_default()
            ),
        },
        _ => PortCandidate {
            name: info.port_name,
            description: String::new(),
            hardware_id: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, description: &str, hwid: &str) -> PortCandidate {
        PortCandidate {
            name: name.to_string(),
            description: description.to_string(),
            hardware_id: hwid.to_string(),
        }
    }

    #[test]
    fn picks_usb_serial_over_bluetooth() {
        let candidates = [
            candidate("/dev/cu.Bluetooth", "Bluetooth", ""),
            candidate("/dev/cu.usbserial-0001", "USB Serial Device", ""),
        ];
        assert_eq!(
            pick_controller_port(&candidates).as_deref(),
            Some("/dev/cu.usbserial-0001")
        );
    }

    #[test]
    fn matches_arduino_description_case_insensitively() {
        let candidates = [
            candidate("/dev/ttyS0", "PCI Serial", ""),
            candidate("/dev/ttyUSB0", "Arduino Uno", "USB VID:PID=2341:0043"),
        ];
        assert_eq!(
            pick_controller_port(&candidates).as_deref(),
            Some("/dev/ttyUSB0")
        );
    }

    #[test]
    fn matches_wch_in_hardware_id() {
        let candidates = [candidate(
            "/dev/ttyUSB1",
            "Generic UART",
            "USB VID:PID=1A86:7523 WCH.CN",
        )];
        assert_eq!(
            pick_controller_port(&candidates).as_deref(),
            Some("/dev/ttyUSB1")
        );
    }

    #[test]
    fn matches_cdc_acm_device_name() {
        let candidates = [
            candidate("/dev/ttyS0", "PCI Serial", ""),
            candidate("/dev/ttyACM0", "", ""),
        ];
        assert_eq!(
            pick_controller_port(&candidates).as_deref(),
            Some("/dev/ttyACM0")
        );
    }

    #[test]
    fn falls_back_to_first_candidate() {
        let candidates = [
            candidate("/dev/ttyS0", "PCI Serial", ""),
            candidate("/dev/ttyS1", "PCI Serial", ""),
        ];
        assert_eq!(pick_controller_port(&candidates).as_deref(), Some("/dev/ttyS0"));
    }

    #[test]
    fn empty_list_yields_none() {
        assert_eq!(pick_controller_port(&[]), None);
    }
}
