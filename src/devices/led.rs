use embedded_hal::digital::v2::OutputPin;

/// Status LED on any push-pull output.
pub struct LED<P: OutputPin> {
    pin: P,
    state: bool,
}

impl<P: OutputPin> LED<P> {
    pub fn new(pin: P) -> Self {
        LED { pin, state: false }
    }

    pub fn set(&mut self, on: bool) {
        if on {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.state = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.state);
    }

    pub fn on(&mut self) {
        self.set(true);
    }

    pub fn off(&mut self) {
        self.set(false);
    }
}
