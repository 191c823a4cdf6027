//#![deny(unsafe_code)]
#![no_main]
#![no_std]
// For allocator
#![feature(lang_items)]
#![feature(alloc_error_handler)]

extern crate alloc;

use cortex_m::asm;
use cortex_m_rt::exception;
use cortex_m_rt::{entry, ExceptionFrame};
use panic_halt as _;
use stm32f4xx_hal::otg_fs::USB;
use stm32f4xx_hal::{
    pac::{self, Interrupt},
    prelude::*,
};
use crate::devices::led::LED;

use freertos_rust::*;
use core::alloc::Layout;
use hid_ups::changes::ChangeTracker;
use hid_ups::{Config, PowerSource, Simulator, UpsDevice};
use log::{info, LevelFilter};

mod devices;
mod logger;
mod usb;

#[global_allocator]
static GLOBAL: FreeRtosAllocator = FreeRtosAllocator;


use crate::usb::{push_input, usb_init};


#[entry]
fn main() -> ! {
    logger::init(LevelFilter::Info);

    let dp = pac::Peripherals::take().unwrap();

    let rcc = dp.RCC.constrain();

    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(48.MHz())
        .hclk(48.MHz())
        .require_pll48clk()
        .pclk1(24.MHz())
        .pclk2(24.MHz())
        .freeze();

    let mut delay = dp.TIM1.delay_us(&clocks);
    delay.delay(100.millis());  // apparently required for USB to set up properly...

    // initialize ports
    let gpioa = dp.GPIOA.split();
    let gpiob = dp.GPIOB.split();
    let gpioc = dp.GPIOC.split();

    // initialize leds
    let mut stat_led = LED::new(gpiob.pb1.into_push_pull_output());
    let mut usb_led1 = LED::new(gpioc.pc13.into_push_pull_output());

    let config = Config::default();
    let device = cortex_m::singleton!(: UpsDevice = UpsDevice::new(&config).unwrap()).unwrap();
    info!(
        "{:?} profile, report descriptor {} bytes",
        device.profile(),
        device.report_descriptor().len()
    );

    // initialize usb
    let usb = USB {
        usb_global: dp.OTG_FS_GLOBAL,
        usb_device: dp.OTG_FS_DEVICE,
        usb_pwrclk: dp.OTG_FS_PWRCLK,
        pin_dm: stm32f4xx_hal::gpio::alt::otg_fs::Dm::PA11(gpioa.pa11.into_alternate()),
        pin_dp: stm32f4xx_hal::gpio::alt::otg_fs::Dp::PA12(gpioa.pa12.into_alternate()),
        hclk: clocks.hclk(),
    };
    delay.delay(100.millis());

    unsafe {
        usb_init(usb, device, &config);
        cortex_m::peripheral::NVIC::unmask(Interrupt::OTG_FS);
    }

    stat_led.on();

    for i in 0..=3 {
        delay.delay(1000.millis());
        match i {
            0 => { stat_led.on() }
            1 => { usb_led1.on() }
            _ => {
                stat_led.off();
                usb_led1.off();
            }
        }
    }

    for _ in 0..=4 {
        delay.delay(200.millis());
        stat_led.toggle();
    }

    let simulation = config.simulation;

    Task::new()
        .name("SIM TASK")
        .stack_size(1024)
        .priority(TaskPriority(3))
        .start(move || {
            let now = || FreeRtosUtils::get_tick_count_duration().to_ms();
            let mut source = Simulator::new(&simulation, now());
            let mut tracker = ChangeTracker::new();
            loop {
                CurrentTask::delay(Duration::ms(simulation.tick_ms));
                source.poll(device, now());

                for frame in tracker.changed(device) {
                    if !push_input(&frame) {
                        // retry on the next tick
                        tracker.invalidate(frame.id());
                    }
                }
                stat_led.toggle();
            }
        }).unwrap();

    Task::new()
        .name("BLINK TASK")
        .stack_size(256)
        .priority(TaskPriority(2))
        .start(move || {
            loop {
                CurrentTask::delay(Duration::ms(500));
                usb_led1.toggle();
            }
        }).unwrap();

    FreeRtosUtils::start_scheduler();
}


#[exception]
#[allow(non_snake_case)]
unsafe fn DefaultHandler(_irqn: i16) {
    // irqn is negative for Cortex-M exceptions
    // irqn is positive for device specific (line IRQ)
}

#[exception]
#[allow(non_snake_case)]
unsafe fn HardFault(_ef: &ExceptionFrame) -> ! {
    loop {}
}

// define what happens in an Out Of Memory (OOM) condition
#[alloc_error_handler]
fn alloc_error(_layout: Layout) -> ! {
    asm::bkpt();
    loop {}
}

#[no_mangle]
#[allow(non_snake_case, unused_variables)]
fn vApplicationStackOverflowHook(pxTask: FreeRtosTaskHandle, pcTaskName: FreeRtosCharPtr) {
    asm::bkpt();
}
