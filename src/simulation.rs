//! Simulated power source.
//!
//! Flips mains every `ac_dwell_ms` and moves the charge one percent per tick.
//! Time comes in as a wrapping millisecond counter, the RTOS tick count on the
//! board.

use log::info;

use crate::config::SimulationConfig;
use crate::device::UpsDevice;
use crate::state::PowerState;

/// Something that drives the power state from the outside world.
pub trait PowerSource {
    /// Called once per period with the current time in milliseconds.
    fn poll(&mut self, device: &UpsDevice, now_ms: u32);
}

pub struct Simulator {
    ac_dwell_ms: u32,
    last_transition_ms: u32,
}

impl Simulator {
    pub fn new(config: &SimulationConfig, now_ms: u32) -> Self {
        Simulator {
            ac_dwell_ms: config.ac_dwell_ms,
            last_transition_ms: now_ms,
        }
    }

    /// One tick. Returns the new AC state if mains flipped.
    pub fn step(&mut self, state: &mut PowerState, now_ms: u32) -> Option<bool> {
        let mut flipped = None;
        if now_ms.wrapping_sub(self.last_transition_ms) >= self.ac_dwell_ms {
            let present = !state.status().ac_present();
            state.apply_ac_transition(present);
            self.last_transition_ms = now_ms;
            flipped = Some(present);
        }
        state.tick_capacity();
        flipped
    }
}

impl PowerSource for Simulator {
    fn poll(&mut self, device: &UpsDevice, now_ms: u32) {
        if let Some(present) = device.update(|state| self.step(state, now_ms)) {
            if present {
                info!("AC connected, charging");
            } else {
                info!("AC disconnected, discharging");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn flips_after_dwell() {
        let config = Config::default();
        let device = UpsDevice::new(&config).unwrap();
        let mut sim = Simulator::new(&config.simulation, 0);

        let mut now = 0;
        for _ in 0..29 {
            now += config.simulation.tick_ms;
            sim.poll(&device, now);
        }
        assert!(device.snapshot().status().ac_present());

        now += config.simulation.tick_ms;
        sim.poll(&device, now);
        let state = device.snapshot();
        assert!(!state.status().ac_present());
        assert!(state.status().discharging());
    }

    #[test]
    fn tick_counter_wraps() {
        let config = Config::default();
        let initial = config.initial;
        let mut state = PowerState::new(&initial, config.battery);
        let start = u32::MAX - 1000;
        let mut sim = Simulator::new(&config.simulation, start);

        assert_eq!(sim.step(&mut state, start.wrapping_add(2000)), None);
        assert_eq!(sim.step(&mut state, start.wrapping_add(60_000)), Some(false));
        assert_eq!(sim.step(&mut state, start.wrapping_add(62_000)), None);
    }
}
