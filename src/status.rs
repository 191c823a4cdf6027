//! PresentStatus bitfield.
//!
//! The two bytes of report 7 in the order the descriptor declares them, least
//! significant bit first. [`StatusFlag`] is the named bit table the rest of
//! the crate and the descriptor generator go through; the `#[bitfield]`
//! struct only provides storage and typed accessors.

use modular_bitfield::prelude::*;

use crate::usage::{self, UsagePage};

#[bitfield]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresentStatus {
    pub charging: bool,
    pub discharging: bool,
    pub ac_present: bool,
    pub battery_present: bool,
    pub below_remaining_capacity_limit: bool,
    pub remaining_time_limit_expired: bool,
    pub need_replacement: bool,
    pub voltage_not_regulated: bool,
    pub fully_charged: bool,
    pub fully_discharged: bool,
    pub shutdown_requested: bool,
    pub shutdown_imminent: bool,
    pub communication_lost: bool,
    pub overload: bool,
    #[skip]
    __: B2,
}

static_assertions::const_assert_eq!(core::mem::size_of::<PresentStatus>(), 2);

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    Charging = 0,
    Discharging = 1,
    AcPresent = 2,
    BatteryPresent = 3,
    BelowRemainingCapacityLimit = 4,
    RemainingTimeLimitExpired = 5,
    NeedReplacement = 6,
    VoltageNotRegulated = 7,
    FullyCharged = 8,
    FullyDischarged = 9,
    ShutdownRequested = 10,
    ShutdownImminent = 11,
    CommunicationLost = 12,
    Overload = 13,
}

impl StatusFlag {
    /// Every flag, in wire bit order.
    pub const ALL: [StatusFlag; 14] = [
        StatusFlag::Charging,
        StatusFlag::Discharging,
        StatusFlag::AcPresent,
        StatusFlag::BatteryPresent,
        StatusFlag::BelowRemainingCapacityLimit,
        StatusFlag::RemainingTimeLimitExpired,
        StatusFlag::NeedReplacement,
        StatusFlag::VoltageNotRegulated,
        StatusFlag::FullyCharged,
        StatusFlag::FullyDischarged,
        StatusFlag::ShutdownRequested,
        StatusFlag::ShutdownImminent,
        StatusFlag::CommunicationLost,
        StatusFlag::Overload,
    ];

    /// Reserved bits after the last flag.
    pub const PADDING_BITS: u8 = 2;

    pub const fn bit(self) -> u8 {
        self as u8
    }

    pub const fn mask(self) -> u16 {
        1 << self as u8
    }

    pub const fn page(self) -> UsagePage {
        match self {
            StatusFlag::ShutdownRequested
            | StatusFlag::ShutdownImminent
            | StatusFlag::CommunicationLost
            | StatusFlag::Overload => UsagePage::PowerDevice,
            _ => UsagePage::BatterySystem,
        }
    }

    pub const fn usage(self) -> u16 {
        match self {
            StatusFlag::Charging => usage::BS_CHARGING,
            StatusFlag::Discharging => usage::BS_DISCHARGING,
            StatusFlag::AcPresent => usage::BS_AC_PRESENT,
            StatusFlag::BatteryPresent => usage::BS_BATTERY_PRESENT,
            StatusFlag::BelowRemainingCapacityLimit => usage::BS_BELOW_REMAINING_CAPACITY_LIMIT,
            StatusFlag::RemainingTimeLimitExpired => usage::BS_REMAINING_TIME_LIMIT_EXPIRED,
            StatusFlag::NeedReplacement => usage::BS_NEED_REPLACEMENT,
            StatusFlag::VoltageNotRegulated => usage::BS_VOLTAGE_NOT_REGULATED,
            StatusFlag::FullyCharged => usage::BS_FULLY_CHARGED,
            StatusFlag::FullyDischarged => usage::BS_FULLY_DISCHARGED,
            StatusFlag::ShutdownRequested => usage::PD_SHUTDOWN_REQUESTED,
            StatusFlag::ShutdownImminent => usage::PD_SHUTDOWN_IMMINENT,
            StatusFlag::CommunicationLost => usage::PD_COMMUNICATION_LOST,
            StatusFlag::Overload => usage::PD_OVERLOAD,
        }
    }

    /// Flags declared as Data in the descriptor; the host may write them.
    pub const fn host_writable(self) -> bool {
        matches!(
            self,
            StatusFlag::RemainingTimeLimitExpired | StatusFlag::ShutdownRequested
        )
    }
}

impl PresentStatus {
    pub const HOST_WRITABLE_MASK: u16 =
        StatusFlag::RemainingTimeLimitExpired.mask() | StatusFlag::ShutdownRequested.mask();

    pub fn bits(&self) -> u16 {
        u16::from_le_bytes(self.into_bytes())
    }

    pub fn from_bits(bits: u16) -> Self {
        Self::from_bytes(bits.to_le_bytes())
    }

    pub fn flag(&self, flag: StatusFlag) -> bool {
        self.bits() & flag.mask() != 0
    }
}
