//! Usage pages, usages and units from the HID Power Device class definition.

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsagePage {
    PowerDevice = 0x84,
    BatterySystem = 0x85,
}

impl UsagePage {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

// Power Device page (0x84)
pub const PD_UPS: u16 = 0x04;
pub const PD_PRESENT_STATUS: u16 = 0x02;
pub const PD_POWER_SUMMARY: u16 = 0x24;
pub const PD_VOLTAGE: u16 = 0x30;
pub const PD_CONFIG_VOLTAGE: u16 = 0x40;
pub const PD_DELAY_BEFORE_REBOOT: u16 = 0x55;
pub const PD_DELAY_BEFORE_SHUTDOWN: u16 = 0x57;
pub const PD_AUDIBLE_ALARM_CONTROL: u16 = 0x5A;
pub const PD_OVERLOAD: u16 = 0x65;
pub const PD_SHUTDOWN_REQUESTED: u16 = 0x68;
pub const PD_SHUTDOWN_IMMINENT: u16 = 0x69;
pub const PD_COMMUNICATION_LOST: u16 = 0x73;
pub const PD_I_MANUFACTURER: u16 = 0xFD;
pub const PD_I_PRODUCT: u16 = 0xFE;
pub const PD_I_SERIAL_NUMBER: u16 = 0xFF;

// Battery System page (0x85)
pub const BS_REMAINING_CAPACITY_LIMIT: u16 = 0x29;
pub const BS_REMAINING_TIME_LIMIT: u16 = 0x2A;
pub const BS_CAPACITY_MODE: u16 = 0x2C;
pub const BS_BELOW_REMAINING_CAPACITY_LIMIT: u16 = 0x42;
pub const BS_REMAINING_TIME_LIMIT_EXPIRED: u16 = 0x43;
pub const BS_CHARGING: u16 = 0x44;
pub const BS_DISCHARGING: u16 = 0x45;
pub const BS_FULLY_CHARGED: u16 = 0x46;
pub const BS_FULLY_DISCHARGED: u16 = 0x47;
pub const BS_NEED_REPLACEMENT: u16 = 0x4B;
pub const BS_REMAINING_CAPACITY: u16 = 0x66;
pub const BS_FULL_CHARGE_CAPACITY: u16 = 0x67;
pub const BS_RUN_TIME_TO_EMPTY: u16 = 0x68;
pub const BS_AVERAGE_TIME_TO_EMPTY: u16 = 0x69;
pub const BS_AVERAGE_TIME_TO_FULL: u16 = 0x6A;
pub const BS_DESIGN_CAPACITY: u16 = 0x83;
pub const BS_MANUFACTURE_DATE: u16 = 0x85;
pub const BS_I_DEVICE_CHEMISTRY: u16 = 0x89;
pub const BS_RECHARGEABLE: u16 = 0x8B;
pub const BS_WARNING_CAPACITY_LIMIT: u16 = 0x8C;
pub const BS_CAPACITY_GRANULARITY_1: u16 = 0x8D;
pub const BS_CAPACITY_GRANULARITY_2: u16 = 0x8E;
pub const BS_I_OEM_INFORMATION: u16 = 0x8F;
pub const BS_AC_PRESENT: u16 = 0xD0;
pub const BS_BATTERY_PRESENT: u16 = 0xD1;
pub const BS_VOLTAGE_NOT_REGULATED: u16 = 0xDB;

/// Unit item values (HID 1.11, 6.2.2.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    /// SI linear, time^1.
    Seconds,
    /// SI linear, cm^2 g s^-3 A^-1. Base is 1e-7 V, so exponent 5 means centivolts.
    Volt,
}

impl Unit {
    pub const fn code(self) -> u32 {
        match self {
            Unit::None => 0,
            Unit::Seconds => 0x0000_1001,
            Unit::Volt => 0x00F0_D121,
        }
    }
}
