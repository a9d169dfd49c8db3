//! Sharing the radio between interrupt handlers and the application.
//!
//! The radio lives in a [`GlobalRadio`], a `critical_section::Mutex` that
//! every access goes through. This keeps the IRQ, bus-complete and timer
//! handlers from interleaving with each other or with the application.
//!
//! ```ignore
//! use rf24_irq::radio::{isr::*, prelude::*, PayloadChannel};
//!
//! static RADIO: GlobalRadio<MyRadio> = global_radio_init();
//!
//! fn main() {
//!     global_radio_setup(&RADIO, Nrf24::new(spi, pins, intc, counter, delay));
//!     let channel = with_global_radio(&RADIO, |radio| {
//!         radio.configure_transmitter(&TransmitterConfig::default())
//!     });
//! }
//!
//! #[interrupt]
//! fn EXTI1() {
//!     let _ = global_radio_irq(&RADIO);
//! }
//!
//! #[interrupt]
//! fn SPI1() {
//!     let _ = global_radio_bus_complete(&RADIO);
//! }
//!
//! #[interrupt]
//! fn TIM2() {
//!     let _ = global_radio_tick(&RADIO);
//! }
//! ```
use core::cell::RefCell;
use critical_section::Mutex;

use super::prelude::EsbEvents;

/// A radio shared through a critical section.
pub type GlobalRadio<T> = Mutex<RefCell<Option<T>>>;

/// Used to initialize a global static [`GlobalRadio`] with no radio in it.
pub const fn global_radio_init<T>() -> GlobalRadio<T> {
    Mutex::new(RefCell::new(None))
}

/// Place the `radio` in `global`, dropping any radio already there.
pub fn global_radio_setup<T>(global: &GlobalRadio<T>, radio: T) {
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(radio));
    });
}

/// Take the radio back out of `global`.
pub fn global_radio_release<T>(global: &GlobalRadio<T>) -> Option<T> {
    critical_section::with(|cs| global.borrow(cs).take())
}

/// Run `f` on the radio inside a critical section.
///
/// Returns `None` if no radio was set up.
pub fn with_global_radio<T, R>(global: &GlobalRadio<T>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
    critical_section::with(|cs| global.borrow(cs).borrow_mut().as_mut().map(f))
}

/// Call from the external interrupt handler of the radio's IRQ line.
pub fn global_radio_irq<T: EsbEvents>(global: &GlobalRadio<T>) -> Result<(), T::EventErrorType> {
    with_global_radio(global, |radio| radio.on_irq()).unwrap_or(Ok(()))
}

/// Call from the SPI (or DMA) transfer-complete interrupt handler.
pub fn global_radio_bus_complete<T: EsbEvents>(
    global: &GlobalRadio<T>,
) -> Result<(), T::EventErrorType> {
    with_global_radio(global, |radio| radio.on_bus_complete()).unwrap_or(Ok(()))
}

/// Call from the periodic (~1 ms) timer interrupt handler.
pub fn global_radio_tick<T: EsbEvents>(global: &GlobalRadio<T>) -> Result<(), T::EventErrorType> {
    with_global_radio(global, |radio| radio.on_tick()).unwrap_or(Ok(()))
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{
        global_radio_bus_complete, global_radio_init, global_radio_irq, global_radio_release,
        global_radio_setup, global_radio_tick, with_global_radio, GlobalRadio,
    };
    use crate::{
        radio::prelude::*,
        test::{mk_radio, TestRadio},
        DeviceRole, ExternalLine, StatusFlag,
    };

    #[test]
    fn empty_global() {
        let global: GlobalRadio<TestRadio> = global_radio_init();
        assert_eq!(global_radio_irq(&global), Ok(()));
        assert_eq!(global_radio_bus_complete(&global), Ok(()));
        assert_eq!(global_radio_tick(&global), Ok(()));
        assert!(with_global_radio(&global, |radio| radio.role()).is_none());
        assert!(global_radio_release(&global).is_none());
    }

    #[test]
    fn shared_radio() {
        let mocks = mk_radio(&[], &[], &[], &[]);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin, mut intc) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4, mocks.5);
        radio.assume_configured(DeviceRole::Receiver, ExternalLine::Int1, [0; 6]);
        let global = global_radio_init();
        global_radio_setup(&global, radio);

        // a stray IRQ is acknowledged through the global
        intc.enable(ExternalLine::Int1);
        intc.pend(ExternalLine::Int1);
        global_radio_irq(&global).unwrap();
        assert!(!intc.state(ExternalLine::Int1).pending);
        global_radio_tick(&global).unwrap();
        global_radio_bus_complete(&global).unwrap();

        let status = with_global_radio(&global, |radio| radio.read_status());
        assert_eq!(status, Some(StatusFlag::NoStatus));
        let radio = global_radio_release(&global).unwrap();
        assert_eq!(radio.role(), Some(DeviceRole::Receiver));
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }
}
