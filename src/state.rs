//! In-memory UPS attributes and the rules that keep them consistent.
//!
//! Charging and Discharging are only ever changed here, by
//! [`PowerState::apply_ac_transition`] and by [`PowerState::tick_capacity`]
//! reaching full charge. Everything derived from the remaining capacity is
//! recomputed in one place after every mutation.

use core::ops::RangeInclusive;

use log::{debug, warn};

use crate::status::{PresentStatus, StatusFlag};

pub const CAPACITY_RANGE: RangeInclusive<i32> = 0..=100;
pub const REMAINING_TIME_LIMIT_RANGE: RangeInclusive<i32> = 120..=1380;
pub const DELAY_RANGE: RangeInclusive<i32> = (i16::MIN as i32)..=(i16::MAX as i32);
pub const AUDIBLE_ALARM_RANGE: RangeInclusive<i32> = 1..=3;

/// Largest time value ever reported. Windows rejects 65535.
pub const TIME_MAX: u16 = 65534;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudibleAlarm {
    Disabled = 1,
    Enabled = 2,
    Muted = 3,
}

impl AudibleAlarm {
    pub const fn code(self) -> u8 {
        self as u8
    }

    fn from_clamped(code: i32) -> Self {
        match code {
            i32::MIN..=1 => AudibleAlarm::Disabled,
            2 => AudibleAlarm::Enabled,
            _ => AudibleAlarm::Muted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmThreshold {
    WarningCapacity,
    RemainingCapacity,
    RemainingTime,
}

impl AlarmThreshold {
    pub const fn range(self) -> RangeInclusive<i32> {
        match self {
            AlarmThreshold::WarningCapacity | AlarmThreshold::RemainingCapacity => CAPACITY_RANGE,
            AlarmThreshold::RemainingTime => REMAINING_TIME_LIMIT_RANGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayKind {
    Shutdown,
    Reboot,
}

/// Parameters the derived readings are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryModel {
    /// Voltage at 0 %, in centivolts.
    pub empty_voltage: u16,
    /// Voltage at 100 %, in centivolts.
    pub full_voltage: u16,
    /// Seconds of runtime per percent of remaining capacity.
    pub runtime_per_percent: u16,
    /// Seconds of charging per missing percent.
    pub charge_time_per_percent: u16,
}

impl Default for BatteryModel {
    fn default() -> Self {
        BatteryModel {
            empty_voltage: 11400,
            full_voltage: 12150,
            runtime_per_percent: 72,
            charge_time_per_percent: 180,
        }
    }
}

/// Values the state starts from at power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialState {
    pub remaining_capacity: u8,
    pub config_voltage: u16,
    /// Days since 1990-01-01.
    pub manufacture_date: u16,
    pub remaining_time_limit: u16,
    pub delay_before_shutdown: i16,
    pub delay_before_reboot: i16,
    pub design_capacity: u8,
    pub full_charge_capacity: u8,
    pub warning_capacity_limit: u8,
    pub remaining_capacity_limit: u8,
    pub capacity_granularity_1: u8,
    pub capacity_granularity_2: u8,
    pub audible_alarm: AudibleAlarm,
}

impl Default for InitialState {
    fn default() -> Self {
        InitialState {
            remaining_capacity: 60,
            config_voltage: 12000,
            manufacture_date: 12345,
            remaining_time_limit: 600,
            delay_before_shutdown: 300,
            delay_before_reboot: 60,
            design_capacity: 100,
            full_charge_capacity: 100,
            warning_capacity_limit: 20,
            remaining_capacity_limit: 10,
            capacity_granularity_1: 1,
            capacity_granularity_2: 1,
            audible_alarm: AudibleAlarm::Enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerState {
    status: PresentStatus,
    remaining_capacity: u8,
    voltage: u16,
    config_voltage: u16,
    run_time_to_empty: u16,
    average_time_to_full: u16,
    average_time_to_empty: u16,
    remaining_time_limit: u16,
    delay_before_shutdown: i16,
    delay_before_reboot: i16,
    design_capacity: u8,
    full_charge_capacity: u8,
    warning_capacity_limit: u8,
    remaining_capacity_limit: u8,
    capacity_granularity_1: u8,
    capacity_granularity_2: u8,
    manufacture_date: u16,
    audible_alarm: AudibleAlarm,
    battery: BatteryModel,
}

impl PowerState {
    /// Starts on mains with the battery present.
    pub fn new(initial: &InitialState, battery: BatteryModel) -> Self {
        let mut state = PowerState {
            status: PresentStatus::new().with_battery_present(true),
            remaining_capacity: initial.remaining_capacity.min(100),
            voltage: 0,
            config_voltage: initial.config_voltage,
            run_time_to_empty: 0,
            average_time_to_full: 0,
            average_time_to_empty: 0,
            remaining_time_limit: initial.remaining_time_limit,
            delay_before_shutdown: initial.delay_before_shutdown,
            delay_before_reboot: initial.delay_before_reboot,
            design_capacity: initial.design_capacity,
            full_charge_capacity: initial.full_charge_capacity,
            warning_capacity_limit: initial.warning_capacity_limit,
            remaining_capacity_limit: initial.remaining_capacity_limit,
            capacity_granularity_1: initial.capacity_granularity_1,
            capacity_granularity_2: initial.capacity_granularity_2,
            manufacture_date: initial.manufacture_date,
            audible_alarm: initial.audible_alarm,
            battery,
        };
        state.apply_ac_transition(true);
        state
    }

    pub fn status(&self) -> PresentStatus {
        self.status
    }

    pub fn flag(&self, flag: StatusFlag) -> bool {
        self.status.flag(flag)
    }

    pub fn remaining_capacity(&self) -> u8 {
        self.remaining_capacity
    }

    pub fn voltage(&self) -> u16 {
        self.voltage
    }

    pub fn config_voltage(&self) -> u16 {
        self.config_voltage
    }

    pub fn run_time_to_empty(&self) -> u16 {
        self.run_time_to_empty
    }

    pub fn average_time_to_full(&self) -> u16 {
        self.average_time_to_full
    }

    pub fn average_time_to_empty(&self) -> u16 {
        self.average_time_to_empty
    }

    pub fn remaining_time_limit(&self) -> u16 {
        self.remaining_time_limit
    }

    pub fn delay(&self, kind: DelayKind) -> i16 {
        match kind {
            DelayKind::Shutdown => self.delay_before_shutdown,
            DelayKind::Reboot => self.delay_before_reboot,
        }
    }

    pub fn design_capacity(&self) -> u8 {
        self.design_capacity
    }

    pub fn full_charge_capacity(&self) -> u8 {
        self.full_charge_capacity
    }

    pub fn alarm_threshold(&self, kind: AlarmThreshold) -> u16 {
        match kind {
            AlarmThreshold::WarningCapacity => u16::from(self.warning_capacity_limit),
            AlarmThreshold::RemainingCapacity => u16::from(self.remaining_capacity_limit),
            AlarmThreshold::RemainingTime => self.remaining_time_limit,
        }
    }

    pub fn capacity_granularity_1(&self) -> u8 {
        self.capacity_granularity_1
    }

    pub fn capacity_granularity_2(&self) -> u8 {
        self.capacity_granularity_2
    }

    pub fn manufacture_date(&self) -> u16 {
        self.manufacture_date
    }

    pub fn audible_alarm(&self) -> AudibleAlarm {
        self.audible_alarm
    }

    /// Mains appeared or went away. Sets the Charging/Discharging pair as one.
    pub fn apply_ac_transition(&mut self, present: bool) {
        let full = self.remaining_capacity >= 100;
        let status = &mut self.status;
        status.set_ac_present(present);
        status.set_charging(present && !full);
        status.set_discharging(!present);
        self.refresh_derived();
    }

    /// One simulation step: one percent towards full or empty.
    pub fn tick_capacity(&mut self) {
        if self.status.charging() {
            self.remaining_capacity = self.remaining_capacity.saturating_add(1).min(100);
            if self.remaining_capacity == 100 {
                self.status.set_charging(false);
            }
        } else if self.status.discharging() {
            self.remaining_capacity = self.remaining_capacity.saturating_sub(1);
        }
        self.refresh_derived();
        debug!(
            "tick: capacity {}% runtime {}s status {:#06x}",
            self.remaining_capacity,
            self.run_time_to_empty,
            self.status.bits()
        );
    }

    /// Host write of a warning/remaining limit. Returns the value applied.
    pub fn set_alarm_threshold(&mut self, kind: AlarmThreshold, value: i32) -> u16 {
        let applied = clamp_logged("alarm threshold", value, kind.range());
        match kind {
            AlarmThreshold::WarningCapacity => self.warning_capacity_limit = applied as u8,
            AlarmThreshold::RemainingCapacity => self.remaining_capacity_limit = applied as u8,
            AlarmThreshold::RemainingTime => self.remaining_time_limit = applied as u16,
        }
        self.refresh_derived();
        applied as u16
    }

    pub fn set_delay(&mut self, kind: DelayKind, seconds: i32) -> i16 {
        let applied = clamp_logged("delay", seconds, DELAY_RANGE) as i16;
        match kind {
            DelayKind::Shutdown => self.delay_before_shutdown = applied,
            DelayKind::Reboot => self.delay_before_reboot = applied,
        }
        applied
    }

    pub fn set_audible_alarm(&mut self, code: i32) -> AudibleAlarm {
        let control = AudibleAlarm::from_clamped(clamp_logged(
            "audible alarm",
            code,
            AUDIBLE_ALARM_RANGE,
        ));
        self.audible_alarm = control;
        control
    }

    pub fn set_capacity_granularity(&mut self, value: i32) -> u8 {
        let applied = clamp_logged("capacity granularity", value, CAPACITY_RANGE) as u8;
        self.capacity_granularity_1 = applied;
        applied
    }

    /// Host write of the PresentStatus feature report. Only the Data bits are taken.
    pub fn apply_host_status(&mut self, bits: u16) {
        let ignored = bits & !PresentStatus::HOST_WRITABLE_MASK & 0x3FFF;
        if ignored != 0 {
            debug!("status write: ignoring read-only bits {:#06x}", ignored);
        }
        let kept = self.status.bits() & !PresentStatus::HOST_WRITABLE_MASK;
        self.status =
            PresentStatus::from_bits(kept | (bits & PresentStatus::HOST_WRITABLE_MASK));
    }

    fn refresh_derived(&mut self) {
        let capacity = self.remaining_capacity;
        let model = self.battery;

        let runtime = u32::from(capacity) * u32::from(model.runtime_per_percent);
        self.run_time_to_empty = runtime.min(u32::from(TIME_MAX)) as u16;
        self.average_time_to_empty = self.run_time_to_empty;
        self.average_time_to_full = if self.status.charging() {
            let missing = u32::from(100 - capacity);
            (missing * u32::from(model.charge_time_per_percent)).min(u32::from(TIME_MAX)) as u16
        } else {
            0
        };

        let span = u32::from(model.full_voltage.saturating_sub(model.empty_voltage));
        self.voltage = model.empty_voltage + (span * u32::from(capacity) / 100) as u16;

        let on_battery = self.status.discharging();
        let status = &mut self.status;
        status.set_fully_charged(capacity == 100 && !status.charging());
        status.set_fully_discharged(capacity == 0);
        status.set_below_remaining_capacity_limit(capacity < self.remaining_capacity_limit);
        status.set_remaining_time_limit_expired(
            on_battery && self.run_time_to_empty < self.remaining_time_limit,
        );
        status.set_shutdown_imminent(on_battery && capacity == 0);
    }
}

fn clamp_logged(what: &str, value: i32, range: RangeInclusive<i32>) -> i32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!("{} {} out of range, clamped to {}", what, value, clamped);
    }
    clamped
}
