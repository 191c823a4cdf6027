//! The shared device handle.
//!
//! Owns the power state behind a critical section so the simulation task and
//! the USB interrupt can both reach it. Every hook degrades errors to an empty
//! reply or a no-op and logs them.

use core::cell::RefCell;

use critical_section::Mutex;
use log::warn;

use crate::codec;
use crate::config::Config;
use crate::descriptor::{self, ReportDescriptor};
use crate::error::ConfigError;
use crate::profile::HostProfile;
use crate::report::{ReportFrame, ReportType, MAX_PAYLOAD_LEN};
use crate::state::PowerState;
use crate::strings::Identity;

pub struct UpsDevice {
    state: Mutex<RefCell<PowerState>>,
    profile: HostProfile,
    descriptor: ReportDescriptor,
    identity: Identity,
}

impl UpsDevice {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let descriptor = descriptor::build(config.profile)?;
        Ok(UpsDevice {
            state: Mutex::new(RefCell::new(PowerState::new(&config.initial, config.battery))),
            profile: config.profile,
            descriptor,
            identity: config.identity,
        })
    }

    pub fn profile(&self) -> HostProfile {
        self.profile
    }

    pub fn report_descriptor(&self) -> &[u8] {
        &self.descriptor
    }

    pub fn string(&self, index: u8) -> Option<&'static str> {
        self.identity.get(index)
    }

    /// Get-Report hook. Returns the payload length, 0 if there is nothing to send.
    pub fn get_report(&self, id: u8, kind: ReportType, buf: &mut [u8]) -> usize {
        let result = critical_section::with(|cs| {
            let state = self.state.borrow(cs).borrow();
            codec::encode(self.profile, &state, id, kind, buf)
        });
        result.unwrap_or_else(|err| {
            warn!("get report: {}", err);
            0
        })
    }

    /// Set-Report hook. False if the write was refused and nothing changed.
    pub fn set_report(&self, id: u8, kind: ReportType, payload: &[u8]) -> bool {
        let result = critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            codec::decode(self.profile, &mut state, id, kind, payload)
        });
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("set report: {}", err);
                false
            }
        }
    }

    /// The Input report `id` as it would go out of the interrupt endpoint.
    pub fn input_frame(&self, id: u8) -> Option<ReportFrame> {
        let mut payload = [0u8; MAX_PAYLOAD_LEN];
        match self.get_report(id, ReportType::Input, &mut payload) {
            0 => None,
            len => ReportFrame::new(id, &payload[..len]),
        }
    }

    /// A consistent copy of the current state.
    pub fn snapshot(&self) -> PowerState {
        critical_section::with(|cs| *self.state.borrow(cs).borrow())
    }

    /// Runs `f` with exclusive access to the state.
    pub fn update<R>(&self, f: impl FnOnce(&mut PowerState) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow(cs).borrow_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{HID_PD_MANUFACTUREDATE, HID_PD_REMAININGCAPACITY, HID_PD_WARNCAPACITYLIMIT};

    fn device() -> UpsDevice {
        UpsDevice::new(&Config::default()).unwrap()
    }

    #[test]
    fn hooks_degrade_errors() {
        let device = device();
        let mut buf = [0u8; 4];
        assert_eq!(device.get_report(0x7F, ReportType::Feature, &mut buf), 0);
        assert_eq!(device.get_report(HID_PD_REMAININGCAPACITY, ReportType::Feature, &mut buf[..0]), 0);
        assert_eq!(device.get_report(HID_PD_REMAININGCAPACITY, ReportType::Feature, &mut buf), 1);
        assert_eq!(buf[0], 60);

        let before = device.snapshot();
        assert!(!device.set_report(0x7F, ReportType::Feature, &[1, 2]));
        assert!(!device.set_report(HID_PD_MANUFACTUREDATE, ReportType::Feature, &[1, 2]));
        assert!(!device.set_report(HID_PD_WARNCAPACITYLIMIT, ReportType::Output, &[1]));
        assert_eq!(device.snapshot(), before);
    }

    #[test]
    fn set_then_get() {
        let device = device();
        assert!(device.set_report(HID_PD_WARNCAPACITYLIMIT, ReportType::Feature, &[35]));
        let mut buf = [0u8; 1];
        assert_eq!(device.get_report(HID_PD_WARNCAPACITYLIMIT, ReportType::Feature, &mut buf), 1);
        assert_eq!(buf, [35]);
    }

    #[test]
    fn input_frames_carry_report_id() {
        let device = device();
        let frame = device.input_frame(HID_PD_REMAININGCAPACITY).unwrap();
        assert_eq!(frame.as_ref(), &[HID_PD_REMAININGCAPACITY, 60]);
        assert!(device.input_frame(HID_PD_MANUFACTUREDATE).is_none());
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = Config::default();
        config.initial.remaining_capacity = 120;
        assert!(UpsDevice::new(&config).is_err());
    }

    #[test]
    fn update_is_exclusive() {
        let device = device();
        let capacity = device.update(|state| {
            state.apply_ac_transition(false);
            state.tick_capacity();
            state.remaining_capacity()
        });
        assert_eq!(capacity, 59);
        assert!(device.snapshot().status().discharging());
    }
}
