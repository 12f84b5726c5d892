use crate::error::Error;

/// Debug probe found on the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Probe {
    pub port: String,
}

/// Looks for an attached programming probe.
pub trait Discover {
    /// `Ok(None)` means enumeration worked but nothing matched.
    fn discover(&self) -> Result<Option<Probe>, Error>;
}

/// STLink V3 identified by its USB VID/PID.
#[cfg(feature = "probe")]
#[derive(Clone, Copy, Debug, Default)]
pub struct StLink;

#[cfg(feature = "probe")]
impl Discover for StLink {
    fn discover(&self) -> Result<Option<Probe>, Error> {
        use crate::config::{PROBE_USB_PID, PROBE_USB_VID};
        use tokio_serial::{SerialPortType, UsbPortInfo};

        let found = tokio_serial::available_ports()?.into_iter().find(|info| {
            matches!(
                &info.port_type,
                SerialPortType::UsbPort(UsbPortInfo { vid, pid, .. })
                    if *vid == PROBE_USB_VID && *pid == PROBE_USB_PID
            )
        });
        match &found {
            Some(info) => log::info!("STLink found at {}", info.port_name),
            None => log::debug!("No STLink among USB ports"),
        }
        Ok(found.map(|info| Probe {
            port: info.port_name,
        }))
    }
}

/// Discovery with a fixed answer.
impl Discover for Option<Probe> {
    fn discover(&self) -> Result<Option<Probe>, Error> {
        Ok(self.clone())
    }
}
