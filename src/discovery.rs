//! Probe discovery: list probes through the vendor tool and find the serial
//! port each one exposes.

use tracing::{error, info, warn};

use crate::error::{StLinkError, StLinkResult};
use crate::inventory::{DeviceInventory, PortRecord};
use crate::parse::{ProbeRecord, parse_probe_list, reports_no_devices};
use crate::tool::{CommandRunner, list_args};

/// A probe index paired with its serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePort {
    pub probe: u32,
    pub port: String,
}

/// Join probes and ports on the serial number. Order follows `probes`;
/// probes without a port and ports without a probe are dropped.
pub fn correlate(probes: &[ProbeRecord], ports: &[PortRecord]) -> Vec<ProbePort> {
    probes
        .iter()
        .filter_map(|probe| {
            ports
                .iter()
                .find(|port| port.serial_number == probe.serial_number)
                .map(|port| ProbePort {
                    probe: probe.probe,
                    port: port.port.clone(),
                })
        })
        .collect()
}

/// Probes reported by `-List`, without touching the device inventory
pub fn list_probes(runner: &dyn CommandRunner) -> StLinkResult<Vec<ProbeRecord>> {
    let output = runner.run(&list_args())?;

    if reports_no_devices(&output.lines) {
        return Err(StLinkError::NoDevices);
    }

    let probes = parse_probe_list(&output.lines);
    if probes.is_empty() {
        return Err(StLinkError::NoDevices);
    }

    info!("Vendor tool lists {} probe(s)", probes.len());
    Ok(probes)
}

pub fn discover(
    runner: &dyn CommandRunner,
    inventory: &dyn DeviceInventory,
) -> StLinkResult<Vec<ProbePort>> {
    let probes = list_probes(runner)?;
    let ports = inventory.ports()?;
    let pairs = correlate(&probes, &ports);

    for pair in &pairs {
        info!("Probe {} is on {}", pair.probe, pair.port);
    }

    Ok(pairs)
}

/// Like [`discover`] but never fails: a missing tool, no attached probes or
/// an enumeration error are logged and give an empty list.
pub fn find_all(runner: &dyn CommandRunner, inventory: &dyn DeviceInventory) -> Vec<ProbePort> {
    match discover(runner, inventory) {
        Ok(pairs) => pairs,
        Err(e @ (StLinkError::ToolNotFound(_) | StLinkError::NoDevices)) => {
            warn!("{}", e);
            Vec::new()
        }
        Err(e) => {
            error!("Probe discovery failed: {}", e);
            Vec::new()
        }
    }
}
