//! Device configuration.
//!
//! Defaults reproduce a 12 V Li-ion UPS that starts at 60 % on mains.

use crate::error::ConfigError;
use crate::profile::HostProfile;
use crate::state::{
    BatteryModel, InitialState, CAPACITY_RANGE, REMAINING_TIME_LIMIT_RANGE,
};
use crate::strings::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbConfig {
    pub vid: u16,
    pub pid: u16,
    /// Interrupt IN polling interval.
    pub poll_ms: u8,
}

impl Default for UsbConfig {
    fn default() -> Self {
        UsbConfig {
            vid: 0x04D8,
            pid: 0xD005,
            poll_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub tick_ms: u32,
    /// Time between AC transitions.
    pub ac_dwell_ms: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_ms: 2000,
            ac_dwell_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub profile: HostProfile,
    pub identity: Identity,
    pub usb: UsbConfig,
    pub initial: InitialState,
    pub battery: BatteryModel,
    pub simulation: SimulationConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let initial = &self.initial;
        if !CAPACITY_RANGE.contains(&i32::from(initial.remaining_capacity)) {
            return Err(ConfigError::CapacityOutOfRange(initial.remaining_capacity));
        }
        let percents = [
            ("design capacity", initial.design_capacity),
            ("full charge capacity", initial.full_charge_capacity),
            ("warning capacity limit", initial.warning_capacity_limit),
            ("remaining capacity limit", initial.remaining_capacity_limit),
            ("capacity granularity 1", initial.capacity_granularity_1),
            ("capacity granularity 2", initial.capacity_granularity_2),
        ];
        for (name, value) in percents {
            if !CAPACITY_RANGE.contains(&i32::from(value)) {
                return Err(ConfigError::LimitOutOfRange(name));
            }
        }
        if !REMAINING_TIME_LIMIT_RANGE.contains(&i32::from(initial.remaining_time_limit)) {
            return Err(ConfigError::LimitOutOfRange("remaining time limit"));
        }

        let battery = &self.battery;
        if battery.empty_voltage >= battery.full_voltage {
            return Err(ConfigError::VoltageWindow {
                empty: battery.empty_voltage,
                full: battery.full_voltage,
            });
        }

        if self.usb.poll_ms == 0 {
            return Err(ConfigError::ZeroPeriod("usb poll interval"));
        }
        if self.simulation.tick_ms == 0 {
            return Err(ConfigError::ZeroPeriod("simulation tick"));
        }
        if self.simulation.ac_dwell_ms < self.simulation.tick_ms {
            return Err(ConfigError::DwellShorterThanTick);
        }
        Ok(())
    }
}
