//! Report codec.
//!
//! Fixed layout per report ID, little-endian, no report ID byte. The layout is
//! whatever [`HostProfile::spec`] declares, so the codec and the descriptor
//! read the same numbers.

use log::{debug, warn};

use crate::error::ReportError;
use crate::layout::{Field, ReportSpec};
use crate::profile::{HostProfile, WINDOWS_DESIGN_CAPACITY_MWH};
use crate::report::ReportType;
use crate::state::{AlarmThreshold, DelayKind, PowerState};

/// The layout of `id`, if it exists in the given report type.
pub fn spec_for(profile: HostProfile, id: u8, kind: ReportType) -> Result<ReportSpec, ReportError> {
    let spec = profile.lookup(id).ok_or(ReportError::UnknownReportId(id))?;
    if !spec.supports(kind) {
        return Err(ReportError::UnsupportedReportType { id, kind });
    }
    Ok(spec)
}

/// Writes the payload of report `id` into `buf` and returns its length.
pub fn encode(
    profile: HostProfile,
    state: &PowerState,
    id: u8,
    kind: ReportType,
    buf: &mut [u8],
) -> Result<usize, ReportError> {
    let spec = spec_for(profile, id, kind)?;
    let len = spec.len();
    let available = buf.len();
    let out = buf.get_mut(..len).ok_or(ReportError::BufferTooSmall {
        id,
        needed: len,
        available,
    })?;
    let raw = read_field(profile, state, &spec);
    out.copy_from_slice(&raw.to_le_bytes()[..len]);
    Ok(len)
}

/// Applies a host write of report `id`. Bytes past the layout are ignored.
pub fn decode(
    profile: HostProfile,
    state: &mut PowerState,
    id: u8,
    kind: ReportType,
    payload: &[u8],
) -> Result<(), ReportError> {
    let spec = spec_for(profile, id, kind)?;
    let len = spec.len();
    let bytes = payload.get(..len).ok_or(ReportError::LengthMismatch {
        id,
        expected: len,
        actual: payload.len(),
    })?;
    if !spec.data {
        return Err(ReportError::ReadOnly(id));
    }
    let raw = read_le(bytes, spec.signed());
    debug!("report {:#04x} {} write: {}", id, kind, raw);
    write_field(profile, state, &spec, raw)
}

fn read_le(bytes: &[u8], signed: bool) -> i32 {
    match (bytes, signed) {
        (&[b], false) => i32::from(b),
        (&[b], true) => i32::from(b as i8),
        (&[lo, hi], false) => i32::from(u16::from_le_bytes([lo, hi])),
        (&[lo, hi], true) => i32::from(i16::from_le_bytes([lo, hi])),
        _ => 0,
    }
}

fn capacity_to_wire(profile: HostProfile, percent: u16) -> i32 {
    if profile.reports_mwh() {
        i32::from(percent) * i32::from(WINDOWS_DESIGN_CAPACITY_MWH) / 100
    } else {
        i32::from(percent)
    }
}

fn capacity_from_wire(profile: HostProfile, raw: i32) -> i32 {
    if !profile.reports_mwh() {
        return raw;
    }
    let design = i32::from(WINDOWS_DESIGN_CAPACITY_MWH);
    let mwh = raw.clamp(0, design);
    if mwh != raw {
        warn!("capacity {} mWh out of range, clamped to {}", raw, mwh);
    }
    (mwh * 100 + design / 2) / design
}

fn read_field(profile: HostProfile, state: &PowerState, spec: &ReportSpec) -> i32 {
    let capacity = |percent: u8| capacity_to_wire(profile, u16::from(percent));
    let threshold = |kind| capacity_to_wire(profile, state.alarm_threshold(kind));
    match spec.field {
        Field::Product
        | Field::SerialNumber
        | Field::Manufacturer
        | Field::DeviceChemistry
        | Field::OemInformation => i32::from(spec.string_index.unwrap_or(0)),
        Field::Rechargeable => 1,
        Field::CapacityMode => i32::from(profile.capacity_mode()),
        Field::CapacityGranularity1 => i32::from(state.capacity_granularity_1()),
        Field::CapacityGranularity2 => i32::from(state.capacity_granularity_2()),
        Field::FullChargeCapacity => capacity(state.full_charge_capacity()),
        Field::DesignCapacity => capacity(state.design_capacity()),
        Field::RemainingCapacity => capacity(state.remaining_capacity()),
        Field::WarningCapacityLimit => threshold(AlarmThreshold::WarningCapacity),
        Field::RemainingCapacityLimit => threshold(AlarmThreshold::RemainingCapacity),
        Field::ManufactureDate => i32::from(state.manufacture_date()),
        Field::AverageTimeToFull => i32::from(state.average_time_to_full()),
        Field::AverageTimeToEmpty => i32::from(state.average_time_to_empty()),
        Field::RunTimeToEmpty => i32::from(state.run_time_to_empty()),
        Field::RemainingTimeLimit => i32::from(state.remaining_time_limit()),
        Field::DelayBeforeShutdown => i32::from(state.delay(DelayKind::Shutdown)),
        Field::DelayBeforeReboot => i32::from(state.delay(DelayKind::Reboot)),
        Field::ConfigVoltage => i32::from(state.config_voltage()),
        Field::Voltage => i32::from(state.voltage()),
        Field::AudibleAlarmControl => i32::from(state.audible_alarm().code()),
        Field::PresentStatus => i32::from(state.status().bits()),
    }
}

fn write_field(
    profile: HostProfile,
    state: &mut PowerState,
    spec: &ReportSpec,
    raw: i32,
) -> Result<(), ReportError> {
    match spec.field {
        Field::WarningCapacityLimit => {
            let percent = capacity_from_wire(profile, raw);
            state.set_alarm_threshold(AlarmThreshold::WarningCapacity, percent);
        }
        Field::RemainingCapacityLimit => {
            let percent = capacity_from_wire(profile, raw);
            state.set_alarm_threshold(AlarmThreshold::RemainingCapacity, percent);
        }
        Field::RemainingTimeLimit => {
            state.set_alarm_threshold(AlarmThreshold::RemainingTime, raw);
        }
        Field::DelayBeforeShutdown => {
            state.set_delay(DelayKind::Shutdown, raw);
        }
        Field::DelayBeforeReboot => {
            state.set_delay(DelayKind::Reboot, raw);
        }
        Field::AudibleAlarmControl => {
            state.set_audible_alarm(raw);
        }
        Field::CapacityGranularity1 => {
            state.set_capacity_granularity(raw);
        }
        Field::PresentStatus => state.apply_host_status(raw as u16),
        _ => return Err(ReportError::ReadOnly(spec.id)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::*;
    use crate::state::{BatteryModel, InitialState};

    fn state() -> PowerState {
        PowerState::new(&InitialState::default(), BatteryModel::default())
    }

    fn get(profile: HostProfile, state: &PowerState, id: u8) -> Vec<u8> {
        let mut buf = [0u8; 8];
        let len = encode(profile, state, id, ReportType::Feature, &mut buf).unwrap();
        buf[..len].to_vec()
    }

    #[test]
    fn status_while_charging_on_mains() {
        assert_eq!(get(HostProfile::Nut, &state(), HID_PD_PRESENTSTATUS), [0x0D, 0x00]);
    }

    #[test]
    fn little_endian_numerics() {
        let state = state();
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_VOLTAGE), [0x4A, 0x2E]);
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_CONFIGVOLTAGE), [0xE0, 0x2E]);
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_REMAININGCAPACITY), [60]);
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_RUNTIMETOEMPTY), [0xE0, 0x10]);
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_IDEVICECHEMISTRY), [IDEVICECHEMISTRY]);
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_CAPACITYMODE), [2]);
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_RECHARGEABLE), [1]);
    }

    #[test]
    fn negative_delay_is_twos_complement() {
        let mut state = state();
        decode(
            HostProfile::Nut,
            &mut state,
            HID_PD_DELAYBE4SHUTDOWN,
            ReportType::Feature,
            &[0xFF, 0xFF],
        )
        .unwrap();
        assert_eq!(state.delay(DelayKind::Shutdown), -1);
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_DELAYBE4SHUTDOWN), [0xFF, 0xFF]);
    }

    #[test]
    fn zero_length_buffer() {
        let state = state();
        let mut buf = [0u8; 0];
        for profile in HostProfile::ALL {
            for spec in profile.reports() {
                for kind in [ReportType::Input, ReportType::Feature] {
                    if !spec.supports(kind) {
                        continue;
                    }
                    assert_eq!(
                        encode(profile, &state, spec.id, kind, &mut buf),
                        Err(ReportError::BufferTooSmall {
                            id: spec.id,
                            needed: spec.len(),
                            available: 0
                        })
                    );
                }
            }
        }
    }

    #[test]
    fn one_byte_buffer_for_wide_reports() {
        let state = state();
        for profile in HostProfile::ALL {
            for spec in profile.reports().filter(|spec| spec.len() == 2) {
                for kind in [ReportType::Input, ReportType::Feature] {
                    if !spec.supports(kind) {
                        continue;
                    }
                    let mut buf = [0xAA];
                    assert_eq!(
                        encode(profile, &state, spec.id, kind, &mut buf),
                        Err(ReportError::BufferTooSmall {
                            id: spec.id,
                            needed: 2,
                            available: 1
                        })
                    );
                    assert_eq!(buf, [0xAA]);
                }
            }
        }
    }

    #[test]
    fn rejects_unknown_and_unsupported() {
        let mut state = state();
        let mut buf = [0u8; 8];
        assert_eq!(
            encode(HostProfile::Nut, &state, 0x30, ReportType::Feature, &mut buf),
            Err(ReportError::UnknownReportId(0x30))
        );
        assert_eq!(
            encode(HostProfile::Nut, &state, HID_PD_MANUFACTUREDATE, ReportType::Input, &mut buf),
            Err(ReportError::UnsupportedReportType {
                id: HID_PD_MANUFACTUREDATE,
                kind: ReportType::Input
            })
        );
        assert_eq!(
            encode(HostProfile::Nut, &state, HID_PD_VOLTAGE, ReportType::Output, &mut buf),
            Err(ReportError::UnsupportedReportType {
                id: HID_PD_VOLTAGE,
                kind: ReportType::Output
            })
        );
        let before = state;
        assert_eq!(
            decode(HostProfile::Nut, &mut state, 0x30, ReportType::Feature, &[1]),
            Err(ReportError::UnknownReportId(0x30))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn read_only_write_is_ignored() {
        let mut state = state();
        let before = state;
        assert_eq!(
            decode(HostProfile::Nut, &mut state, HID_PD_VOLTAGE, ReportType::Feature, &[0, 0]),
            Err(ReportError::ReadOnly(HID_PD_VOLTAGE))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn payload_length() {
        let mut state = state();
        assert_eq!(
            decode(HostProfile::Nut, &mut state, HID_PD_DELAYBE4REBOOT, ReportType::Feature, &[5]),
            Err(ReportError::LengthMismatch {
                id: HID_PD_DELAYBE4REBOOT,
                expected: 2,
                actual: 1
            })
        );
        decode(
            HostProfile::Nut,
            &mut state,
            HID_PD_DELAYBE4REBOOT,
            ReportType::Feature,
            &[0x78, 0x00, 0xAA],
        )
        .unwrap();
        assert_eq!(state.delay(DelayKind::Reboot), 120);
    }

    #[test]
    fn warning_limit_is_clamped() {
        let mut state = state();
        decode(HostProfile::Nut, &mut state, HID_PD_WARNCAPACITYLIMIT, ReportType::Feature, &[200])
            .unwrap();
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_WARNCAPACITYLIMIT), [100]);
    }

    #[test]
    fn input_write_only_for_input_reports() {
        let mut state = state();
        decode(
            HostProfile::Nut,
            &mut state,
            HID_PD_AUDIBLEALARMCTRL,
            ReportType::Input,
            &[3],
        )
        .unwrap();
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_AUDIBLEALARMCTRL), [3]);
        assert!(decode(
            HostProfile::Nut,
            &mut state,
            HID_PD_WARNCAPACITYLIMIT,
            ReportType::Input,
            &[30],
        )
        .is_err());
    }

    #[test]
    fn windows_reports_milliwatt_hours() {
        let mut state = state();
        assert_eq!(get(HostProfile::Windows, &state, HID_PD_REMAININGCAPACITY), [0xA0, 0x8C]);
        assert_eq!(get(HostProfile::Windows, &state, HID_PD_DESIGNCAPACITY), [0x60, 0xEA]);
        assert_eq!(get(HostProfile::Windows, &state, HID_PD_CAPACITYMODE), [1]);

        // 9000 mWh of 60000 is 15 %
        decode(
            HostProfile::Windows,
            &mut state,
            HID_PD_REMNCAPACITYLIMIT,
            ReportType::Feature,
            &9000u16.to_le_bytes(),
        )
        .unwrap();
        assert_eq!(state.alarm_threshold(AlarmThreshold::RemainingCapacity), 15);
        assert_eq!(
            get(HostProfile::Windows, &state, HID_PD_REMNCAPACITYLIMIT),
            9000u16.to_le_bytes()
        );

        decode(
            HostProfile::Windows,
            &mut state,
            HID_PD_WARNCAPACITYLIMIT,
            ReportType::Feature,
            &65000u16.to_le_bytes(),
        )
        .unwrap();
        assert_eq!(state.alarm_threshold(AlarmThreshold::WarningCapacity), 100);
    }

    #[test]
    fn status_write_keeps_device_bits() {
        let mut state = state();
        decode(
            HostProfile::Nut,
            &mut state,
            HID_PD_PRESENTSTATUS,
            ReportType::Feature,
            &[0x00, 0x04],
        )
        .unwrap();
        assert!(state.status().shutdown_requested());
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_PRESENTSTATUS), [0x0D, 0x04]);

        decode(
            HostProfile::Nut,
            &mut state,
            HID_PD_PRESENTSTATUS,
            ReportType::Feature,
            &[0x00, 0x00],
        )
        .unwrap();
        assert_eq!(get(HostProfile::Nut, &state, HID_PD_PRESENTSTATUS), [0x0D, 0x00]);
    }
}
