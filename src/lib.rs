//! USB HID Power Device (UPS) report model.
//!
//! The descriptor, the report codec and the simulated power state of a UPS that
//! Windows, NAS systems and NUT `usbhid-ups` recognise as a battery backup.
//! [`device::UpsDevice`] owns the state and exposes the two hooks a USB stack
//! needs; [`usb_class::PowerDeviceClass`] wires them into `usb-device`.

#![cfg_attr(not(test), no_std)]

pub mod changes;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod layout;
pub mod profile;
pub mod report;
pub mod simulation;
pub mod state;
pub mod status;
pub mod strings;
pub mod usage;
pub mod usb_class;

pub use config::Config;
pub use device::UpsDevice;
pub use error::{ConfigError, ReportError};
pub use profile::HostProfile;
pub use report::{ReportFrame, ReportType};
pub use simulation::{PowerSource, Simulator};
pub use state::PowerState;
pub use status::{PresentStatus, StatusFlag};
