use crate::report::{IDEVICECHEMISTRY, IMANUFACTURER, IOEMVENDOR, IPRODUCT, ISERIAL};

/// Identity strings, fixed for the lifetime of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub manufacturer: &'static str,
    pub product: &'static str,
    pub serial_number: &'static str,
    pub chemistry: &'static str,
    pub oem_vendor: &'static str,
}

impl Default for Identity {
    fn default() -> Self {
        Identity {
            manufacturer: "hacknus",
            product: "UPS",
            serial_number: "UPS10",
            chemistry: "Li-ion",
            oem_vendor: "hacknus",
        }
    }
}

impl Identity {
    pub fn get(&self, index: u8) -> Option<&'static str> {
        match index {
            IMANUFACTURER => Some(self.manufacturer),
            IPRODUCT => Some(self.product),
            ISERIAL => Some(self.serial_number),
            IDEVICECHEMISTRY => Some(self.chemistry),
            IOEMVENDOR => Some(self.oem_vendor),
            _ => None,
        }
    }
}
