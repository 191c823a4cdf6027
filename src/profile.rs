//! Host compatibility profiles.
//!
//! Hosts disagree on what they accept. Rather than keeping one descriptor per
//! host, a profile patches the base table.

use crate::layout::{base_spec, Field, ReportSpec};

/// Design capacity reported by [`HostProfile::Windows`], in mWh.
pub const WINDOWS_DESIGN_CAPACITY_MWH: u16 = 60000;

/// HID CapacityMode values.
pub const CAPACITY_MODE_MWH: u8 = 1;
pub const CAPACITY_MODE_PERCENT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostProfile {
    /// NUT `usbhid-ups`, Linux and Synology.
    Nut,
    /// QNAP rejects the PowerSummary usage on the inner collection.
    Qnap,
    /// Absolute capacity in mWh.
    Windows,
}

impl Default for HostProfile {
    fn default() -> Self {
        if cfg!(feature = "windows") {
            HostProfile::Windows
        } else if cfg!(feature = "qnap") {
            HostProfile::Qnap
        } else {
            HostProfile::Nut
        }
    }
}

impl HostProfile {
    pub const ALL: [HostProfile; 3] = [HostProfile::Nut, HostProfile::Qnap, HostProfile::Windows];

    pub fn spec(self, field: Field) -> ReportSpec {
        let spec = base_spec(field);
        match self {
            HostProfile::Windows if field.is_capacity() => ReportSpec {
                bits: 16,
                logical_max: i32::from(WINDOWS_DESIGN_CAPACITY_MWH),
                ..spec
            },
            _ => spec,
        }
    }

    pub fn lookup(self, id: u8) -> Option<ReportSpec> {
        self.reports().find(|spec| spec.id == id)
    }

    /// All reports, in descriptor order.
    pub fn reports(self) -> impl Iterator<Item = ReportSpec> {
        Field::ALL.into_iter().map(move |field| self.spec(field))
    }

    pub fn power_summary_usage(self) -> bool {
        self != HostProfile::Qnap
    }

    pub fn capacity_mode(self) -> u8 {
        match self {
            HostProfile::Windows => CAPACITY_MODE_MWH,
            _ => CAPACITY_MODE_PERCENT,
        }
    }

    pub fn reports_mwh(self) -> bool {
        self.capacity_mode() == CAPACITY_MODE_MWH
    }
}
