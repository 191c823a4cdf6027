//! Tracks which Input reports changed since they were last sent, and queues
//! them for an interrupt endpoint that takes one packet at a time.

use arrayvec::ArrayVec;

use crate::codec;
use crate::device::UpsDevice;
use crate::layout::{Access, Field};
use crate::report::{ReportFrame, ReportType, MAX_PAYLOAD_LEN};

/// Upper bound on Input reports in any profile.
pub const MAX_INPUT_REPORTS: usize = 8;

pub type Frames = ArrayVec<ReportFrame, MAX_INPUT_REPORTS>;

#[derive(Debug, Default)]
pub struct ChangeTracker {
    sent: Frames,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input frames that differ from what was last recorded as sent,
    /// PresentStatus first.
    ///
    /// All frames are encoded from one snapshot, so they agree with each other.
    pub fn changed(&mut self, device: &UpsDevice) -> Frames {
        let profile = device.profile();
        let state = device.snapshot();
        let mut out = Frames::new();

        let inputs = profile
            .reports()
            .filter(|spec| spec.access == Access::InputFeature && spec.field != Field::PresentStatus);
        for spec in core::iter::once(profile.spec(Field::PresentStatus)).chain(inputs) {
            let mut payload = [0u8; MAX_PAYLOAD_LEN];
            let Ok(len) = codec::encode(profile, &state, spec.id, ReportType::Input, &mut payload)
            else {
                continue;
            };
            let Some(frame) = ReportFrame::new(spec.id, &payload[..len]) else {
                continue;
            };
            match self.sent.iter_mut().find(|sent| sent.id() == frame.id()) {
                Some(sent) if *sent == frame => continue,
                Some(sent) => *sent = frame,
                None => {
                    if self.sent.try_push(frame).is_err() {
                        continue;
                    }
                }
            }
            let _ = out.try_push(frame);
        }
        out
    }

    /// Forgets report `id`, so it is reported again on the next call.
    pub fn invalidate(&mut self, id: u8) {
        self.sent.retain(|sent| sent.id() != id);
    }
}

/// Frames waiting for the interrupt endpoint, oldest first.
///
/// At most one frame per report ID is held. A newer frame for a queued ID
/// replaces the stale one in place, so every ID is reached within one pass
/// of the queue no matter how often the others change.
#[derive(Debug, Default)]
pub struct InputQueue {
    frames: Frames,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// False only if the queue is full of other report IDs.
    pub fn push(&mut self, frame: ReportFrame) -> bool {
        match self.frames.iter_mut().find(|queued| queued.id() == frame.id()) {
            Some(queued) => {
                *queued = frame;
                true
            }
            None => self.frames.try_push(frame).is_ok(),
        }
    }

    pub fn peek(&self) -> Option<&ReportFrame> {
        self.frames.first()
    }

    pub fn pop(&mut self) -> Option<ReportFrame> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::profile::HostProfile;
    use crate::report::*;

    #[test]
    fn first_call_reports_every_input() {
        let device = UpsDevice::new(&Config::default()).unwrap();
        let mut tracker = ChangeTracker::new();
        let frames = tracker.changed(&device);
        let ids: Vec<u8> = frames.iter().map(ReportFrame::id).collect();
        assert_eq!(
            ids,
            [
                HID_PD_PRESENTSTATUS,
                HID_PD_REMAININGCAPACITY,
                HID_PD_AVERAGETIME2EMPTY,
                HID_PD_RUNTIMETOEMPTY,
                HID_PD_REMAINTIMELIMIT,
                HID_PD_VOLTAGE,
                HID_PD_AUDIBLEALARMCTRL,
            ]
        );
        assert!(tracker.changed(&device).is_empty());
    }

    #[test]
    fn only_changed_reports_after_tick() {
        let device = UpsDevice::new(&Config::default()).unwrap();
        let mut tracker = ChangeTracker::new();
        tracker.changed(&device);

        device.update(|state| state.tick_capacity());
        let ids: Vec<u8> = tracker.changed(&device).iter().map(ReportFrame::id).collect();
        assert_eq!(
            ids,
            [
                HID_PD_REMAININGCAPACITY,
                HID_PD_AVERAGETIME2EMPTY,
                HID_PD_RUNTIMETOEMPTY,
                HID_PD_VOLTAGE,
            ]
        );
    }

    #[test]
    fn invalidated_report_is_resent() {
        let device = UpsDevice::new(&Config::default()).unwrap();
        let mut tracker = ChangeTracker::new();
        tracker.changed(&device);
        tracker.invalidate(HID_PD_PRESENTSTATUS);
        let frames = tracker.changed(&device);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &[HID_PD_PRESENTSTATUS, 0x0D, 0x00]);
    }

    #[test]
    fn status_leads_after_mains_loss() {
        let device = UpsDevice::new(&Config::default()).unwrap();
        let mut tracker = ChangeTracker::new();
        tracker.changed(&device);

        device.update(|state| {
            state.apply_ac_transition(false);
            state.tick_capacity();
        });
        let frames = tracker.changed(&device);
        assert_eq!(frames[0].id(), HID_PD_PRESENTSTATUS);
        assert_eq!(frames[0].payload(), &[0x0A, 0x00]);
    }

    #[test]
    fn queue_replaces_stale_frames_in_place() {
        let mut queue = InputQueue::new();
        assert!(queue.push(ReportFrame::new(HID_PD_REMAININGCAPACITY, &[60]).unwrap()));
        assert!(queue.push(ReportFrame::new(HID_PD_PRESENTSTATUS, &[0x0D, 0x00]).unwrap()));
        assert!(queue.push(ReportFrame::new(HID_PD_REMAININGCAPACITY, &[61]).unwrap()));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop().unwrap().as_ref(), &[HID_PD_REMAININGCAPACITY, 61]);
        assert_eq!(queue.peek().unwrap().id(), HID_PD_PRESENTSTATUS);
        assert_eq!(queue.pop().unwrap().id(), HID_PD_PRESENTSTATUS);
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_holds_one_frame_per_input_report() {
        let mut queue = InputQueue::new();
        for id in 1..=MAX_INPUT_REPORTS as u8 {
            assert!(queue.push(ReportFrame::new(id, &[0]).unwrap()));
        }
        assert!(!queue.push(ReportFrame::new(0x40, &[0]).unwrap()));
        assert!(queue.push(ReportFrame::new(1, &[1]).unwrap()));
    }

    #[test]
    fn bound_covers_every_profile() {
        for profile in HostProfile::ALL {
            let inputs = profile
                .reports()
                .filter(|spec| spec.access == Access::InputFeature)
                .count();
            assert!(inputs <= MAX_INPUT_REPORTS);
        }
    }
}
