//! `usb-device` class for the power device interface.
//!
//! Plugs the [`UpsDevice`] hooks into the control pipe and owns the interrupt
//! IN endpoint. The report ID byte is added here on the way out and checked and
//! stripped here on the way in; the codec never sees it.
//!
//! The endpoint holds one packet. Input frames wait in an [`InputQueue`] and
//! the next one is written when the host collects the previous one.

use log::{debug, warn};
use usb_device::class_prelude::*;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::{LangID, UsbError};

use crate::changes::InputQueue;
use crate::device::UpsDevice;
use crate::report::{ReportFrame, ReportType, IDEVICECHEMISTRY, IOEMVENDOR, MAX_PAYLOAD_LEN};

pub const USB_CLASS_HID: u8 = 0x03;
pub const HID_DESCRIPTOR_TYPE: u8 = 0x21;
pub const REPORT_DESCRIPTOR_TYPE: u8 = 0x22;

pub const HID_GET_REPORT: u8 = 0x01;
pub const HID_GET_IDLE: u8 = 0x02;
pub const HID_GET_PROTOCOL: u8 = 0x03;
pub const HID_SET_REPORT: u8 = 0x09;
pub const HID_SET_IDLE: u8 = 0x0A;
pub const HID_SET_PROTOCOL: u8 = 0x0B;

/// Report protocol, as opposed to boot protocol.
pub const PROTOCOL_REPORT: u8 = 0x01;

const MAX_PACKET_SIZE: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidRequest {
    GetDescriptor(u8),
    GetReport { id: u8, kind: ReportType, length: u16 },
    SetReport { id: u8, kind: ReportType },
    GetIdle,
    SetIdle(u8),
    GetProtocol,
    SetProtocol(u8),
}

impl HidRequest {
    /// `None` if the request is not addressed to this interface or not a HID request.
    pub fn parse(req: &Request, interface: u8) -> Option<Self> {
        if req.recipient != Recipient::Interface || req.index != u16::from(interface) {
            return None;
        }
        let [value_lo, value_hi] = req.value.to_le_bytes();
        match (req.request_type, req.request) {
            (RequestType::Standard, Request::GET_DESCRIPTOR) => {
                Some(HidRequest::GetDescriptor(value_hi))
            }
            (RequestType::Class, HID_GET_REPORT) => {
                ReportType::try_from(value_hi)
                    .ok()
                    .map(|kind| HidRequest::GetReport {
                        id: value_lo,
                        kind,
                        length: req.length,
                    })
            }
            (RequestType::Class, HID_SET_REPORT) => ReportType::try_from(value_hi)
                .ok()
                .map(|kind| HidRequest::SetReport { id: value_lo, kind }),
            (RequestType::Class, HID_GET_IDLE) => Some(HidRequest::GetIdle),
            (RequestType::Class, HID_SET_IDLE) => Some(HidRequest::SetIdle(value_hi)),
            (RequestType::Class, HID_GET_PROTOCOL) => Some(HidRequest::GetProtocol),
            (RequestType::Class, HID_SET_PROTOCOL) => Some(HidRequest::SetProtocol(value_lo)),
            _ => None,
        }
    }
}

/// Checks and removes the leading report ID of a Set-Report payload.
pub fn strip_report_id(id: u8, data: &[u8]) -> Option<&[u8]> {
    if id == 0 {
        return Some(data);
    }
    match data.split_first() {
        Some((&first, rest)) if first == id => Some(rest),
        _ => None,
    }
}

/// GET_REPORT reply: the report ID followed by the payload, or `None` if the
/// report is unknown or does not fit in `length` bytes.
pub fn report_frame(device: &UpsDevice, id: u8, kind: ReportType, length: u16) -> Option<ReportFrame> {
    let mut payload = [0u8; MAX_PAYLOAD_LEN];
    let room = usize::from(length).saturating_sub(1).min(MAX_PAYLOAD_LEN);
    match device.get_report(id, kind, &mut payload[..room]) {
        0 => None,
        len => ReportFrame::new(id, &payload[..len]),
    }
}

/// HID class descriptor, HID 1.11, one report descriptor.
pub fn hid_descriptor(report_descriptor_len: usize) -> [u8; 7] {
    let [len_lo, len_hi] = (report_descriptor_len as u16).to_le_bytes();
    [0x11, 0x01, 0x00, 0x01, REPORT_DESCRIPTOR_TYPE, len_lo, len_hi]
}

pub struct PowerDeviceClass<'a, B: UsbBus> {
    device: &'static UpsDevice,
    interface: InterfaceNumber,
    endpoint: EndpointIn<'a, B>,
    chemistry: StringIndex,
    oem_vendor: StringIndex,
    queue: InputQueue,
    in_flight: bool,
    idle: u8,
    protocol: u8,
}

impl<'a, B: UsbBus> PowerDeviceClass<'a, B> {
    pub fn new(alloc: &'a UsbBusAllocator<B>, device: &'static UpsDevice, poll_ms: u8) -> Self {
        let interface = alloc.interface();
        let endpoint = alloc.interrupt(MAX_PACKET_SIZE, poll_ms);
        let chemistry = alloc.string();
        let oem_vendor = alloc.string();
        if u8::from(chemistry) != IDEVICECHEMISTRY || u8::from(oem_vendor) != IOEMVENDOR {
            warn!(
                "string indices {} / {} differ from the report descriptor",
                u8::from(chemistry),
                u8::from(oem_vendor)
            );
        }
        PowerDeviceClass {
            device,
            interface,
            endpoint,
            chemistry,
            oem_vendor,
            queue: InputQueue::new(),
            in_flight: false,
            idle: 0,
            protocol: PROTOCOL_REPORT,
        }
    }

    /// Queues an Input report for the interrupt endpoint. False if the queue
    /// is full.
    pub fn push_input(&mut self, frame: &ReportFrame) -> bool {
        let queued = self.queue.push(*frame);
        self.send_next();
        queued
    }

    fn send_next(&mut self) {
        if self.in_flight {
            return;
        }
        let Some(frame) = self.queue.peek() else {
            return;
        };
        match self.endpoint.write(frame.as_ref()) {
            Ok(_) => {
                self.queue.pop();
                self.in_flight = true;
            }
            Err(UsbError::WouldBlock) => {}
            Err(err) => {
                warn!("input report {:#04x} dropped: {:?}", frame.id(), err);
                self.queue.pop();
            }
        }
    }
}

impl<B: UsbBus> UsbClass<B> for PowerDeviceClass<'_, B> {
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> usb_device::Result<()> {
        writer.interface(self.interface, USB_CLASS_HID, 0x00, 0x00)?;
        writer.write(
            HID_DESCRIPTOR_TYPE,
            &hid_descriptor(self.device.report_descriptor().len()),
        )?;
        writer.endpoint(&self.endpoint)?;
        Ok(())
    }

    fn get_string(&self, index: StringIndex, _lang_id: LangID) -> Option<&str> {
        if index == self.chemistry {
            self.device.string(IDEVICECHEMISTRY)
        } else if index == self.oem_vendor {
            self.device.string(IOEMVENDOR)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.idle = 0;
        self.protocol = PROTOCOL_REPORT;
        self.in_flight = false;
    }

    fn endpoint_in_complete(&mut self, addr: EndpointAddress) {
        if addr == self.endpoint.address() {
            self.in_flight = false;
            self.send_next();
        }
    }

    fn control_in(&mut self, xfer: ControlIn<B>) {
        let Some(request) = HidRequest::parse(xfer.request(), u8::from(self.interface)) else {
            return;
        };
        match request {
            HidRequest::GetDescriptor(HID_DESCRIPTOR_TYPE) => {
                let body = hid_descriptor(self.device.report_descriptor().len());
                let mut descriptor = [0u8; 9];
                descriptor[0] = descriptor.len() as u8;
                descriptor[1] = HID_DESCRIPTOR_TYPE;
                descriptor[2..].copy_from_slice(&body);
                xfer.accept_with(&descriptor).ok();
            }
            HidRequest::GetDescriptor(REPORT_DESCRIPTOR_TYPE) => {
                xfer.accept_with_static(self.device.report_descriptor()).ok();
            }
            HidRequest::GetReport { id, kind, length } => match report_frame(self.device, id, kind, length) {
                Some(frame) => {
                    xfer.accept_with(frame.as_ref()).ok();
                }
                None => {
                    xfer.reject().ok();
                }
            },
            HidRequest::GetIdle => {
                xfer.accept_with(&[self.idle]).ok();
            }
            HidRequest::GetProtocol => {
                xfer.accept_with(&[self.protocol]).ok();
            }
            _ => {
                xfer.reject().ok();
            }
        }
    }

    fn control_out(&mut self, xfer: ControlOut<B>) {
        let Some(request) = HidRequest::parse(xfer.request(), u8::from(self.interface)) else {
            return;
        };
        match request {
            HidRequest::SetReport { id, kind } => match strip_report_id(id, xfer.data()) {
                Some(payload) => {
                    debug!("set report {:#04x} {}: {:02x?}", id, kind, payload);
                    if self.device.set_report(id, kind, payload) {
                        xfer.accept().ok();
                    } else {
                        xfer.reject().ok();
                    }
                }
                None => {
                    warn!("set report {:#04x}: payload does not start with its id", id);
                    xfer.reject().ok();
                }
            },
            HidRequest::SetIdle(duration) => {
                self.idle = duration;
                xfer.accept().ok();
            }
            HidRequest::SetProtocol(protocol) => {
                self.protocol = protocol;
                xfer.accept().ok();
            }
            _ => {
                xfer.reject().ok();
            }
        }
    }
}
