//! The report map: one [`ReportSpec`] per report ID.
//!
//! This table is the single source both the descriptor generator and the codec
//! read from, so field sizes and declared ranges cannot drift apart.

use crate::report::*;
use crate::state::{AUDIBLE_ALARM_RANGE, CAPACITY_RANGE, REMAINING_TIME_LIMIT_RANGE, TIME_MAX};
use crate::usage::{self, Unit, UsagePage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Product,
    SerialNumber,
    Manufacturer,
    Rechargeable,
    DeviceChemistry,
    OemInformation,
    CapacityMode,
    CapacityGranularity1,
    CapacityGranularity2,
    FullChargeCapacity,
    DesignCapacity,
    RemainingCapacity,
    WarningCapacityLimit,
    RemainingCapacityLimit,
    ManufactureDate,
    AverageTimeToFull,
    AverageTimeToEmpty,
    RunTimeToEmpty,
    RemainingTimeLimit,
    DelayBeforeShutdown,
    DelayBeforeReboot,
    ConfigVoltage,
    Voltage,
    AudibleAlarmControl,
    PresentStatus,
}

impl Field {
    /// Every field, in descriptor order.
    pub const ALL: [Field; 25] = [
        Field::Product,
        Field::SerialNumber,
        Field::Manufacturer,
        Field::Rechargeable,
        Field::DeviceChemistry,
        Field::OemInformation,
        Field::CapacityMode,
        Field::CapacityGranularity1,
        Field::CapacityGranularity2,
        Field::FullChargeCapacity,
        Field::DesignCapacity,
        Field::RemainingCapacity,
        Field::WarningCapacityLimit,
        Field::RemainingCapacityLimit,
        Field::ManufactureDate,
        Field::AverageTimeToFull,
        Field::AverageTimeToEmpty,
        Field::RunTimeToEmpty,
        Field::RemainingTimeLimit,
        Field::DelayBeforeShutdown,
        Field::DelayBeforeReboot,
        Field::ConfigVoltage,
        Field::Voltage,
        Field::AudibleAlarmControl,
        Field::PresentStatus,
    ];

    /// Capacity family, reported in mWh instead of percent by some hosts.
    pub const fn is_capacity(self) -> bool {
        matches!(
            self,
            Field::FullChargeCapacity
                | Field::DesignCapacity
                | Field::RemainingCapacity
                | Field::WarningCapacityLimit
                | Field::RemainingCapacityLimit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Feature,
    InputFeature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSpec {
    pub id: u8,
    pub field: Field,
    pub page: UsagePage,
    pub usage: u16,
    pub bits: u16,
    pub logical_min: i32,
    pub logical_max: i32,
    pub unit: Unit,
    pub exponent: i8,
    pub string_index: Option<u8>,
    pub access: Access,
    /// Host may write it.
    pub data: bool,
    pub volatile: bool,
}

impl ReportSpec {
    /// Payload length in bytes.
    pub const fn len(&self) -> usize {
        (self.bits / 8) as usize
    }

    pub const fn signed(&self) -> bool {
        self.logical_min < 0
    }

    pub fn supports(&self, kind: ReportType) -> bool {
        match kind {
            ReportType::Feature => true,
            ReportType::Input => self.access == Access::InputFeature,
            ReportType::Output => false,
        }
    }

    /// Main item flags for the Input and Feature items of this field.
    pub const fn main_flags(&self) -> u8 {
        main_flags(self.data, self.volatile)
    }
}

/// Bit 0 Constant, bit 1 Variable, bit 5 No Preferred, bit 7 Volatile.
pub const fn main_flags(data: bool, volatile: bool) -> u8 {
    let mut flags = 0x02 | 0x20;
    if !data {
        flags |= 0x01;
    }
    if volatile {
        flags |= 0x80;
    }
    flags
}

const fn range_start(range: &core::ops::RangeInclusive<i32>) -> i32 {
    *range.start()
}

const fn range_end(range: &core::ops::RangeInclusive<i32>) -> i32 {
    *range.end()
}

const fn plain(id: u8, field: Field, page: UsagePage, usage: u16, bits: u16, max: i32) -> ReportSpec {
    ReportSpec {
        id,
        field,
        page,
        usage,
        bits,
        logical_min: 0,
        logical_max: max,
        unit: Unit::None,
        exponent: 0,
        string_index: None,
        access: Access::Feature,
        data: false,
        volatile: false,
    }
}

const fn string(id: u8, field: Field, page: UsagePage, usage: u16, index: u8) -> ReportSpec {
    ReportSpec {
        string_index: Some(index),
        ..plain(id, field, page, usage, 8, 255)
    }
}

const fn seconds(spec: ReportSpec) -> ReportSpec {
    ReportSpec {
        unit: Unit::Seconds,
        ..spec
    }
}

const fn centivolts(spec: ReportSpec) -> ReportSpec {
    ReportSpec {
        unit: Unit::Volt,
        exponent: 5,
        ..spec
    }
}

const fn volatile(spec: ReportSpec) -> ReportSpec {
    ReportSpec {
        volatile: true,
        ..spec
    }
}

const fn data(spec: ReportSpec) -> ReportSpec {
    ReportSpec { data: true, ..spec }
}

const fn input(spec: ReportSpec) -> ReportSpec {
    ReportSpec {
        access: Access::InputFeature,
        ..spec
    }
}

use Field::*;
use UsagePage::{BatterySystem as BS, PowerDevice as PD};

const CAPACITY_MAX: i32 = range_end(&CAPACITY_RANGE);
const TIME: i32 = TIME_MAX as i32;

/// Percent-based layout every profile starts from.
pub const fn base_spec(field: Field) -> ReportSpec {
    match field {
        Product => string(HID_PD_IPRODUCT, field, PD, usage::PD_I_PRODUCT, IPRODUCT),
        SerialNumber => string(HID_PD_SERIAL, field, PD, usage::PD_I_SERIAL_NUMBER, ISERIAL),
        Manufacturer => string(HID_PD_MANUFACTURER, field, PD, usage::PD_I_MANUFACTURER, IMANUFACTURER),
        Rechargeable => plain(HID_PD_RECHARGEABLE, field, BS, usage::BS_RECHARGEABLE, 8, 255),
        DeviceChemistry => string(
            HID_PD_IDEVICECHEMISTRY,
            field,
            BS,
            usage::BS_I_DEVICE_CHEMISTRY,
            IDEVICECHEMISTRY,
        ),
        OemInformation => string(
            HID_PD_IOEMINFORMATION,
            field,
            BS,
            usage::BS_I_OEM_INFORMATION,
            IOEMVENDOR,
        ),
        CapacityMode => plain(HID_PD_CAPACITYMODE, field, BS, usage::BS_CAPACITY_MODE, 8, 255),
        CapacityGranularity1 => data(plain(
            HID_PD_CPCTYGRANULARITY1,
            field,
            BS,
            usage::BS_CAPACITY_GRANULARITY_1,
            8,
            CAPACITY_MAX,
        )),
        CapacityGranularity2 => plain(
            HID_PD_CPCTYGRANULARITY2,
            field,
            BS,
            usage::BS_CAPACITY_GRANULARITY_2,
            8,
            CAPACITY_MAX,
        ),
        FullChargeCapacity => volatile(plain(
            HID_PD_FULLCHRGECAPACITY,
            field,
            BS,
            usage::BS_FULL_CHARGE_CAPACITY,
            8,
            CAPACITY_MAX,
        )),
        DesignCapacity => volatile(plain(
            HID_PD_DESIGNCAPACITY,
            field,
            BS,
            usage::BS_DESIGN_CAPACITY,
            8,
            CAPACITY_MAX,
        )),
        RemainingCapacity => input(volatile(plain(
            HID_PD_REMAININGCAPACITY,
            field,
            BS,
            usage::BS_REMAINING_CAPACITY,
            8,
            CAPACITY_MAX,
        ))),
        WarningCapacityLimit => data(volatile(plain(
            HID_PD_WARNCAPACITYLIMIT,
            field,
            BS,
            usage::BS_WARNING_CAPACITY_LIMIT,
            8,
            CAPACITY_MAX,
        ))),
        RemainingCapacityLimit => data(volatile(plain(
            HID_PD_REMNCAPACITYLIMIT,
            field,
            BS,
            usage::BS_REMAINING_CAPACITY_LIMIT,
            8,
            CAPACITY_MAX,
        ))),
        ManufactureDate => volatile(plain(
            HID_PD_MANUFACTUREDATE,
            field,
            BS,
            usage::BS_MANUFACTURE_DATE,
            16,
            u16::MAX as i32,
        )),
        AverageTimeToFull => seconds(volatile(plain(
            HID_PD_AVERAGETIME2FULL,
            field,
            BS,
            usage::BS_AVERAGE_TIME_TO_FULL,
            16,
            TIME,
        ))),
        AverageTimeToEmpty => input(seconds(volatile(plain(
            HID_PD_AVERAGETIME2EMPTY,
            field,
            BS,
            usage::BS_AVERAGE_TIME_TO_EMPTY,
            16,
            TIME,
        )))),
        RunTimeToEmpty => input(seconds(volatile(plain(
            HID_PD_RUNTIMETOEMPTY,
            field,
            BS,
            usage::BS_RUN_TIME_TO_EMPTY,
            16,
            TIME,
        )))),
        RemainingTimeLimit => ReportSpec {
            logical_min: range_start(&REMAINING_TIME_LIMIT_RANGE),
            ..input(seconds(volatile(data(plain(
                HID_PD_REMAINTIMELIMIT,
                field,
                BS,
                usage::BS_REMAINING_TIME_LIMIT,
                16,
                range_end(&REMAINING_TIME_LIMIT_RANGE),
            )))))
        },
        DelayBeforeShutdown => ReportSpec {
            logical_min: i16::MIN as i32,
            ..seconds(volatile(data(plain(
                HID_PD_DELAYBE4SHUTDOWN,
                field,
                PD,
                usage::PD_DELAY_BEFORE_SHUTDOWN,
                16,
                i16::MAX as i32,
            ))))
        },
        DelayBeforeReboot => ReportSpec {
            logical_min: i16::MIN as i32,
            ..seconds(volatile(data(plain(
                HID_PD_DELAYBE4REBOOT,
                field,
                PD,
                usage::PD_DELAY_BEFORE_REBOOT,
                16,
                i16::MAX as i32,
            ))))
        },
        ConfigVoltage => centivolts(plain(
            HID_PD_CONFIGVOLTAGE,
            field,
            PD,
            usage::PD_CONFIG_VOLTAGE,
            16,
            u16::MAX as i32,
        )),
        Voltage => input(centivolts(volatile(plain(
            HID_PD_VOLTAGE,
            field,
            PD,
            usage::PD_VOLTAGE,
            16,
            u16::MAX as i32,
        )))),
        AudibleAlarmControl => ReportSpec {
            logical_min: range_start(&AUDIBLE_ALARM_RANGE),
            ..input(volatile(data(plain(
                HID_PD_AUDIBLEALARMCTRL,
                field,
                PD,
                usage::PD_AUDIBLE_ALARM_CONTROL,
                8,
                range_end(&AUDIBLE_ALARM_RANGE),
            ))))
        },
        PresentStatus => input(volatile(data(plain(
            HID_PD_PRESENTSTATUS,
            field,
            PD,
            usage::PD_PRESENT_STATUS,
            16,
            1,
        )))),
    }
}
