//! Report IDs, string indices and report frames.
//!
//! Payloads handed to and produced by the codec never contain the report ID.
//! A [`ReportFrame`] is the on-the-wire form: report ID followed by payload,
//! which is what goes out of the interrupt endpoint and the control pipe.

use core::fmt;

pub const HID_PD_IPRODUCT: u8 = 0x01;               // FEATURE ONLY
pub const HID_PD_SERIAL: u8 = 0x02;                 // FEATURE ONLY
pub const HID_PD_MANUFACTURER: u8 = 0x03;           // FEATURE ONLY
pub const HID_PD_RECHARGEABLE: u8 = 0x06;           // FEATURE ONLY
pub const HID_PD_PRESENTSTATUS: u8 = 0x07;          // INPUT OR FEATURE(required by Windows)
pub const HID_PD_REMAINTIMELIMIT: u8 = 0x08;
pub const HID_PD_MANUFACTUREDATE: u8 = 0x09;
pub const HID_PD_CONFIGVOLTAGE: u8 = 0x0A;          // FEATURE ONLY
pub const HID_PD_VOLTAGE: u8 = 0x0B;                // INPUT OR FEATURE
pub const HID_PD_REMAININGCAPACITY: u8 = 0x0C;      // INPUT OR FEATURE(required by Windows)
pub const HID_PD_RUNTIMETOEMPTY: u8 = 0x0D;
pub const HID_PD_FULLCHRGECAPACITY: u8 = 0x0E;      // FEATURE ONLY. Last Full Charge Capacity
pub const HID_PD_WARNCAPACITYLIMIT: u8 = 0x0F;
pub const HID_PD_CPCTYGRANULARITY1: u8 = 0x10;
pub const HID_PD_REMNCAPACITYLIMIT: u8 = 0x11;
pub const HID_PD_DELAYBE4SHUTDOWN: u8 = 0x12;       // FEATURE ONLY
pub const HID_PD_DELAYBE4REBOOT: u8 = 0x13;
pub const HID_PD_AUDIBLEALARMCTRL: u8 = 0x14;       // INPUT OR FEATURE
pub const HID_PD_CAPACITYMODE: u8 = 0x16;
pub const HID_PD_DESIGNCAPACITY: u8 = 0x17;
pub const HID_PD_CPCTYGRANULARITY2: u8 = 0x18;
pub const HID_PD_AVERAGETIME2FULL: u8 = 0x1A;
pub const HID_PD_AVERAGETIME2EMPTY: u8 = 0x1C;
pub const HID_PD_IDEVICECHEMISTRY: u8 = 0x1F;       // Feature
pub const HID_PD_IOEMINFORMATION: u8 = 0x20;        // Feature

pub const IMANUFACTURER: u8 = 0x01;
pub const IPRODUCT: u8 = 0x02;
pub const ISERIAL: u8 = 0x03;
pub const IDEVICECHEMISTRY: u8 = 0x04;
pub const IOEMVENDOR: u8 = 0x05;

/// Largest payload of any report, without the leading report ID.
pub const MAX_PAYLOAD_LEN: usize = 2;

static_assertions::const_assert!(MAX_PAYLOAD_LEN + 1 <= 8);

/// HID report type, as carried in the high byte of `wValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Input = 1,
    Output = 2,
    Feature = 3,
}

impl TryFrom<u8> for ReportType {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ReportType::Input),
            2 => Ok(ReportType::Output),
            3 => Ok(ReportType::Feature),
            other => Err(other),
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Input => f.write_str("input"),
            ReportType::Output => f.write_str("output"),
            ReportType::Feature => f.write_str("feature"),
        }
    }
}

/// A report as it travels over USB.
///
/// Bytes usage:
/// byte 0: report ID
/// byte 1..: payload, little-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFrame {
    bytes: [u8; MAX_PAYLOAD_LEN + 1],
    len: usize,
}

impl ReportFrame {
    /// Returns `None` if the payload does not fit any report of this device.
    pub fn new(id: u8, payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return None;
        }
        let mut bytes = [0; MAX_PAYLOAD_LEN + 1];
        bytes[0] = id;
        bytes[1..=payload.len()].copy_from_slice(payload);
        Some(ReportFrame {
            bytes,
            len: payload.len() + 1,
        })
    }

    pub fn id(&self) -> u8 {
        self.bytes[0]
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..self.len]
    }
}

impl AsRef<[u8]> for ReportFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}
