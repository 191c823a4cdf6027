//! The report surface as a host sees it: descriptor, Get/Set-Report and
//! Input frames, per host profile.

use hid_ups::changes::{ChangeTracker, InputQueue, MAX_INPUT_REPORTS};
use hid_ups::config::SimulationConfig;
use hid_ups::descriptor::{self, parse};
use hid_ups::layout::{Access, Field};
use hid_ups::report::*;
use hid_ups::state::AlarmThreshold;
use hid_ups::{Config, HostProfile, PowerSource, PowerState, Simulator, StatusFlag, UpsDevice};

fn device(profile: HostProfile) -> UpsDevice {
    let config = Config {
        profile,
        ..Config::default()
    };
    UpsDevice::new(&config).unwrap()
}

fn feature(device: &UpsDevice, id: u8) -> Vec<u8> {
    let mut buf = [0u8; 8];
    let len = device.get_report(id, ReportType::Feature, &mut buf);
    buf[..len].to_vec()
}

fn check_invariants(state: &PowerState) {
    let status = state.status();
    assert!(state.remaining_capacity() <= 100);
    assert!(!(status.charging() && status.discharging()));
    assert_eq!(status.discharging(), !status.ac_present());
    assert_eq!(status.fully_discharged(), state.remaining_capacity() == 0);
    assert!(state.run_time_to_empty() <= 65534);
    assert!(state.average_time_to_full() <= 65534);
    if status.shutdown_imminent() {
        assert!(status.discharging());
    }
}

#[test]
fn descriptor_declares_what_the_codec_sends() {
    for profile in HostProfile::ALL {
        let device = device(profile);
        let layout = parse::parse(device.report_descriptor()).unwrap();
        for spec in profile.reports() {
            for kind in [ReportType::Input, ReportType::Feature] {
                let mut buf = [0u8; 8];
                let len = device.get_report(spec.id, kind, &mut buf);
                if spec.supports(kind) {
                    assert_eq!(len, spec.len(), "{:?} {:?}", profile, spec.field);
                    assert_eq!(
                        layout.report_bits(spec.id, kind),
                        spec.len() as u32 * 8,
                        "{:?} {:?} {}",
                        profile,
                        spec.field,
                        kind
                    );
                } else {
                    assert_eq!(len, 0);
                    assert_eq!(layout.report_bits(spec.id, kind), 0);
                }
            }
        }
    }
}

#[test]
fn declared_ranges_match_layout() {
    for profile in HostProfile::ALL {
        let bytes = descriptor::build(profile).unwrap();
        let layout = parse::parse(&bytes).unwrap();
        for spec in profile.reports() {
            if spec.field == Field::PresentStatus {
                continue;
            }
            let fields: Vec<_> = layout.report(spec.id, ReportType::Feature).collect();
            assert_eq!(fields.len(), 1, "{:?}", spec.field);
            let field = fields[0];
            assert_eq!(field.logical_min, spec.logical_min, "{:?}", spec.field);
            assert_eq!(field.logical_max, spec.logical_max, "{:?}", spec.field);
            assert_eq!(field.usage, Some(spec.usage));
            assert_eq!(field.page, u16::from(spec.page.code()));
            assert_eq!(field.string_index, spec.string_index);
            assert_eq!(field.constant(), !spec.data);
        }
    }
}

#[test]
fn writable_fields_round_trip() {
    for profile in HostProfile::ALL {
        let device = device(profile);
        for spec in profile.reports() {
            if !spec.data || spec.field == Field::PresentStatus {
                continue;
            }
            let value = match spec.field {
                Field::DelayBeforeShutdown | Field::DelayBeforeReboot => -5,
                _ => (spec.logical_min + spec.logical_max) / 2,
            };
            let written = &value.to_le_bytes()[..spec.len()];
            device.set_report(spec.id, ReportType::Feature, written);
            assert_eq!(feature(&device, spec.id), written, "{:?} {:?}", profile, spec.field);
        }
    }
}

#[test]
fn read_only_reports_ignore_writes() {
    let device = device(HostProfile::Nut);
    let before = device.snapshot();
    device.set_report(HID_PD_VOLTAGE, ReportType::Feature, &[0x00, 0x00]);
    device.set_report(HID_PD_REMAININGCAPACITY, ReportType::Feature, &[5]);
    device.set_report(HID_PD_IPRODUCT, ReportType::Feature, &[9]);
    assert_eq!(device.snapshot(), before);
}

#[test]
fn short_or_unknown_requests_are_empty() {
    let device = device(HostProfile::Nut);
    let mut empty = [0u8; 0];
    assert_eq!(device.get_report(HID_PD_VOLTAGE, ReportType::Feature, &mut empty), 0);
    assert_eq!(device.get_report(HID_PD_VOLTAGE, ReportType::Input, &mut empty), 0);
    let mut short = [0xAAu8; 1];
    assert_eq!(device.get_report(HID_PD_VOLTAGE, ReportType::Feature, &mut short), 0);
    assert_eq!(device.get_report(HID_PD_PRESENTSTATUS, ReportType::Input, &mut short), 0);
    assert_eq!(short, [0xAA]);

    let mut buf = [0u8; 8];
    assert_eq!(device.get_report(0x42, ReportType::Feature, &mut buf), 0);
    assert_eq!(device.get_report(HID_PD_VOLTAGE, ReportType::Output, &mut buf), 0);
    assert_eq!(device.get_report(HID_PD_CONFIGVOLTAGE, ReportType::Input, &mut buf), 0);

    let before = device.snapshot();
    device.set_report(HID_PD_DELAYBE4SHUTDOWN, ReportType::Feature, &[0x10]);
    device.set_report(0x42, ReportType::Feature, &[0x10]);
    assert_eq!(device.snapshot(), before);
}

#[test]
fn status_on_mains_while_charging() {
    let device = device(HostProfile::Nut);
    assert_eq!(feature(&device, HID_PD_PRESENTSTATUS), [0x0D, 0x00]);
    let frame = device.input_frame(HID_PD_PRESENTSTATUS).unwrap();
    assert_eq!(frame.as_ref(), &[HID_PD_PRESENTSTATUS, 0x0D, 0x00]);
}

#[test]
fn out_of_range_limit_is_clamped() {
    let device = device(HostProfile::Nut);
    device.set_report(HID_PD_WARNCAPACITYLIMIT, ReportType::Feature, &[200]);
    assert_eq!(feature(&device, HID_PD_WARNCAPACITYLIMIT), [100]);

    device.set_report(HID_PD_REMAINTIMELIMIT, ReportType::Feature, &[0x10, 0x00]);
    assert_eq!(feature(&device, HID_PD_REMAINTIMELIMIT), 120u16.to_le_bytes());
}

#[test]
fn windows_reports_capacity_in_mwh() {
    let device = device(HostProfile::Windows);
    assert_eq!(feature(&device, HID_PD_CAPACITYMODE), [1]);
    assert_eq!(feature(&device, HID_PD_REMAININGCAPACITY), 36000u16.to_le_bytes());
    assert_eq!(feature(&device, HID_PD_DESIGNCAPACITY), 60000u16.to_le_bytes());

    device.set_report(HID_PD_WARNCAPACITYLIMIT, ReportType::Feature, &9000u16.to_le_bytes());
    assert_eq!(
        device.snapshot().alarm_threshold(AlarmThreshold::WarningCapacity),
        15
    );
}

#[test]
fn charges_to_full_on_mains() {
    let device = device(HostProfile::Nut);
    for _ in 0..40 {
        device.update(|state| state.tick_capacity());
    }
    let state = device.snapshot();
    assert_eq!(state.remaining_capacity(), 100);
    assert!(!state.status().charging());
    assert!(state.status().fully_charged());
    assert!(state.status().ac_present());
    check_invariants(&state);

    device.update(|state| state.tick_capacity());
    assert_eq!(device.snapshot(), state);
}

#[test]
fn losing_mains_discharges() {
    let device = device(HostProfile::Nut);
    device.update(|state| {
        state.apply_ac_transition(false);
        state.tick_capacity();
    });
    let state = device.snapshot();
    assert_eq!(state.remaining_capacity(), 59);
    assert!(state.status().discharging());
    assert!(!state.status().ac_present());
    assert!(!state.status().charging());
    check_invariants(&state);
}

#[test]
fn invariants_hold_under_mixed_traffic() {
    let device = device(HostProfile::Nut);
    let mut seed: u32 = 0x2545_F491;
    for _ in 0..2000 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
        let pick = (seed >> 16) % 8;
        match pick {
            0 => device.update(|state| state.apply_ac_transition(seed & 1 == 0)),
            1 => {
                let bits = (seed >> 8) as u16;
                device.set_report(HID_PD_PRESENTSTATUS, ReportType::Feature, &bits.to_le_bytes());
            }
            2 => {
                let limit = ((seed >> 4) % 130) as u8;
                device.set_report(HID_PD_REMNCAPACITYLIMIT, ReportType::Feature, &[limit]);
            }
            3 => {
                let limit = ((seed >> 4) % 2000) as u16;
                device.set_report(HID_PD_REMAINTIMELIMIT, ReportType::Feature, &limit.to_le_bytes());
            }
            _ => device.update(|state| state.tick_capacity()),
        }
        check_invariants(&device.snapshot());
    }
}

#[test]
fn tracker_pushes_status_after_mains_loss() {
    let device = device(HostProfile::Nut);
    let config = SimulationConfig {
        tick_ms: 1000,
        ac_dwell_ms: 5000,
    };
    let mut source = Simulator::new(&config, 0);
    let mut tracker = ChangeTracker::new();
    tracker.changed(&device);

    let mut now = 0;
    for _ in 0..4 {
        now += config.tick_ms;
        source.poll(&device, now);
        let ids: Vec<_> = tracker.changed(&device).iter().map(|f| f.id()).collect();
        assert!(!ids.contains(&HID_PD_PRESENTSTATUS));
    }

    now += config.tick_ms;
    source.poll(&device, now);
    let frames = tracker.changed(&device);
    let status = frames
        .iter()
        .find(|f| f.id() == HID_PD_PRESENTSTATUS)
        .unwrap();
    let bits = u16::from_le_bytes([status.payload()[0], status.payload()[1]]);
    assert!(bits & StatusFlag::Discharging.mask() != 0);
    assert!(bits & StatusFlag::AcPresent.mask() == 0);
}

#[test]
fn mains_loss_reaches_a_one_packet_endpoint() {
    let device = device(HostProfile::Nut);
    let config = Config::default().simulation;
    let mut source = Simulator::new(&config, 0);
    let mut tracker = ChangeTracker::new();
    let mut queue = InputQueue::new();
    let mut delivered: Vec<(u32, ReportFrame)> = Vec::new();
    let mut lost_at = None;

    let mut now = 0;
    for tick in 0..80u32 {
        now += config.tick_ms;
        source.poll(&device, now);
        if lost_at.is_none() && !device.snapshot().status().ac_present() {
            lost_at = Some(tick);
        }
        for frame in tracker.changed(&device) {
            if !queue.push(frame) {
                tracker.invalidate(frame.id());
            }
        }
        // the host collects one packet per tick
        if let Some(frame) = queue.pop() {
            delivered.push((tick, frame));
        }
    }

    let lost_at = lost_at.unwrap();
    let reported_at = delivered
        .iter()
        .find(|(_, frame)| {
            frame.id() == HID_PD_PRESENTSTATUS
                && frame.payload()[0] & StatusFlag::AcPresent.mask() as u8 == 0
        })
        .map(|(tick, _)| *tick)
        .unwrap();
    assert!(reported_at >= lost_at);
    assert!(reported_at <= lost_at + MAX_INPUT_REPORTS as u32);

    for spec in HostProfile::Nut.reports().filter(|spec| spec.access == Access::InputFeature) {
        assert!(
            delivered.iter().any(|(_, frame)| frame.id() == spec.id),
            "{:?} never sent",
            spec.field
        );
    }
}
