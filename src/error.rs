use core::fmt;

use crate::descriptor::item::DescriptorOverflow;
use crate::report::ReportType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    UnknownReportId(u8),
    UnsupportedReportType { id: u8, kind: ReportType },
    BufferTooSmall { id: u8, needed: usize, available: usize },
    LengthMismatch { id: u8, expected: usize, actual: usize },
    ReadOnly(u8),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::UnknownReportId(id) => write!(f, "unknown report id {:#04x}", id),
            ReportError::UnsupportedReportType { id, kind } => {
                write!(f, "report {:#04x} has no {} form", id, kind)
            }
            ReportError::BufferTooSmall {
                id,
                needed,
                available,
            } => write!(
                f,
                "report {:#04x} needs {} bytes, buffer holds {}",
                id, needed, available
            ),
            ReportError::LengthMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "report {:#04x} expects {} bytes, got {}",
                id, expected, actual
            ),
            ReportError::ReadOnly(id) => write!(f, "report {:#04x} is read-only", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    CapacityOutOfRange(u8),
    LimitOutOfRange(&'static str),
    VoltageWindow { empty: u16, full: u16 },
    ZeroPeriod(&'static str),
    DwellShorterThanTick,
    DescriptorOverflow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::CapacityOutOfRange(value) => {
                write!(f, "initial capacity {}% out of range", value)
            }
            ConfigError::LimitOutOfRange(name) => write!(f, "{} out of range", name),
            ConfigError::VoltageWindow { empty, full } => {
                write!(f, "empty voltage {} not below full voltage {}", empty, full)
            }
            ConfigError::ZeroPeriod(name) => write!(f, "{} must not be zero", name),
            ConfigError::DwellShorterThanTick => {
                write!(f, "AC dwell time shorter than the simulation tick")
            }
            ConfigError::DescriptorOverflow => write!(f, "report descriptor does not fit"),
        }
    }
}

impl From<DescriptorOverflow> for ConfigError {
    fn from(_: DescriptorOverflow) -> Self {
        ConfigError::DescriptorOverflow
    }
}
