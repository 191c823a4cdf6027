use core::cell::RefCell;
use cortex_m::interrupt::Mutex;
use hid_ups::usb_class::PowerDeviceClass;
use hid_ups::{Config, ReportFrame, UpsDevice};
use stm32f4xx_hal::otg_fs::{UsbBus, USB, UsbBusType};
use stm32f4xx_hal::pac::interrupt;
use usb_device::bus::UsbBusAllocator;
use usb_device::device::{StringDescriptors, UsbDevice, UsbDeviceBuilder, UsbVidPid};

// Make the power device class globally available
pub static G_USB_HID: Mutex<RefCell<Option<PowerDeviceClass<'static, UsbBus<USB>>>>> =
    Mutex::new(RefCell::new(None));

// Make USB device globally available
pub static G_USB_DEVICE: Mutex<RefCell<Option<UsbDevice<'static, UsbBus<USB>>>>> =
    Mutex::new(RefCell::new(None));

pub unsafe fn usb_init(usb: USB, device: &'static UpsDevice, config: &Config) {
    static mut EP_MEMORY: [u32; 1024] = [0; 1024];
    static mut USB_BUS: Option<UsbBusAllocator<UsbBusType>> = None;
    USB_BUS = Some(UsbBusType::new(usb, &mut EP_MEMORY));
    let usb_bus = USB_BUS.as_ref().unwrap();
    let hid = PowerDeviceClass::new(usb_bus, device, config.usb.poll_ms);
    let identity = &config.identity;
    let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(config.usb.vid, config.usb.pid))
        .strings(&[StringDescriptors::default()
            .manufacturer(identity.manufacturer)
            .product(identity.product)
            .serial_number(identity.serial_number)])
        .unwrap()
        .build();
    cortex_m::interrupt::free(|cs| {
        *G_USB_HID.borrow(cs).borrow_mut() = Some(hid);
        *G_USB_DEVICE.borrow(cs).borrow_mut() = Some(usb_dev);
    });
}

/// Queues an Input report. False if the queue is full or USB is not up yet.
pub fn push_input(frame: &ReportFrame) -> bool {
    cortex_m::interrupt::free(|cs| match G_USB_HID.borrow(cs).borrow_mut().as_mut() {
        None => false,
        Some(hid) => hid.push_input(frame),
    })
}

#[interrupt]
#[allow(non_snake_case)]
fn OTG_FS() {
    cortex_m::interrupt::free(|cs| {
        match G_USB_DEVICE.borrow(cs).borrow_mut().as_mut() {
            None => {}
            Some(usb_dev) => match G_USB_HID.borrow(cs).borrow_mut().as_mut() {
                None => {}
                Some(hid) => {
                    // do this regularly to keep connection to USB host
                    usb_dev.poll(&mut [hid]);
                }
            },
        }
    });
}
