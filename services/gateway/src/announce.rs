//! LAN announcement
//!
//! Registers `_clubscore._tcp.local.` so scorer and display clients resolve
//! the authority by name; entering an address manually stays the client-side
//! fallback.

use mdns_sd::{ServiceDaemon, ServiceInfo};

pub const SERVICE_TYPE: &str = "_clubscore._tcp.local.";

/// Announce the gateway on the LAN. The returned daemon must be kept alive;
/// dropping it withdraws the record.
pub fn announce(instance: &str, port: u16) -> Result<ServiceDaemon, mdns_sd::Error> {
    let mdns = ServiceDaemon::new()?;
    let host_name = format!("{}.local.", instance);
    let properties = [("role", "authority")];

    let info = ServiceInfo::new(SERVICE_TYPE, instance, &host_name, "", port, &properties[..])?
        .enable_addr_auto();
    mdns.register(info)?;
    tracing::info!(service = SERVICE_TYPE, instance, port, "announced on LAN");
    Ok(mdns)
}
