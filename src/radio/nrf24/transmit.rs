use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, InputPin, OutputPin},
};

use super::{
    commands,
    context::{BusStep, IrqHandler},
    registers, BusError, Nrf24, SendError,
};
use crate::{
    radio::{
        prelude::{EsbTransmit, FreeRunningCounter, InterruptController, SpiCompletion},
        PayloadChannel,
    },
    CallbackSlot, DeviceRole, ExternalLine, Payload, StatusFlag,
};

/// How long [`EsbTransmit::send_blocking()`] waits for the IRQ pin.
const TX_TIMEOUT_MS: u32 = 30;

impl<SPI, CE, CS, IRQ, INTC, CNT, DELAY> Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY>
where
    SPI: SpiCompletion,
    CE: OutputPin,
    CS: OutputPin,
    IRQ: InputPin,
    INTC: InterruptController,
    CNT: FreeRunningCounter,
    DELAY: DelayNs,
{
    fn check_transmitter(
        &self,
        channel: &PayloadChannel,
    ) -> Result<ExternalLine, SendError<SPI::Error>> {
        match self.line {
            Some(line)
                if self.role == Some(DeviceRole::Transmitter)
                    && channel.role() == DeviceRole::Transmitter =>
            {
                if self.ctx.is_busy() {
                    return Err(SendError::Busy);
                }
                Ok(line)
            }
            _ => Err(SendError::NotTransmitter),
        }
    }

    /// Flush both FIFOs, clear the IRQ flags and point the TX address
    /// (and pipe 0, to receive the ACK) at `peer_address`.
    fn prepare_transmission(&mut self, peer_address: u64) -> Result<(), BusError<SPI::Error>> {
        self.spi_read(0, commands::FLUSH_TX)?;
        self.spi_read(0, commands::FLUSH_RX)?;
        self.clear_status()?;
        self.write_address(registers::RX_ADDR_P0, peer_address, 5)?;
        self.write_address(registers::TX_ADDR, peer_address, 5)
    }

    /// Poll the IRQ pin until it is asserted or the time budget is spent.
    ///
    /// Returns `false` if the budget was spent.
    fn wait_for_irq(&mut self) -> Result<bool, BusError<SPI::Error>> {
        let budget = self._counter.frequency_hz() / 1000 * TX_TIMEOUT_MS;
        let start = self._counter.ticks();
        loop {
            if self
                .pins
                .irq
                .is_low()
                .map_err(|e| BusError::Pin(e.kind()))?
            {
                return Ok(true);
            }
            if self._counter.ticks().wrapping_sub(start) > budget {
                return Ok(false);
            }
        }
    }

    fn exchange_blocking(
        &mut self,
        peer_address: u64,
        payload: &[u8],
    ) -> Result<Payload, SendError<SPI::Error>> {
        self.prepare_transmission(peer_address)?;
        self.spi_write_buf(commands::W_TX_PAYLOAD, payload)?;
        self.pulse_ce()?;
        if !self.wait_for_irq()? {
            self.ctx.status = StatusFlag::NoResponse;
            return Err(SendError::NoResponse);
        }
        self.spi_read(0, commands::NOP)?;
        let flag = StatusFlag::from_status(self._status.into_bits());
        self.ctx.status = flag;
        if flag.carries_payload() {
            let width = self.read_payload_width()?;
            self.spi_read(width as usize, commands::R_RX_PAYLOAD)?;
            let mut ack = Payload::new();
            // width never exceeds the capacity
            let _ = ack.extend_from_slice(&self._buf[1..=width as usize]);
            Ok(ack)
        } else if flag == StatusFlag::SendComplete {
            Ok(Payload::new())
        } else {
            Err(SendError::LinkFailed)
        }
    }

    /// Prepare the radio, then load the TX payload in the background.
    fn stage_transmission(
        &mut self,
        peer_address: u64,
        payload: &[u8],
    ) -> Result<(), BusError<SPI::Error>> {
        self.prepare_transmission(peer_address)?;
        let len = self.load_buf(commands::W_TX_PAYLOAD, payload);
        self.spi_start(len, BusStep::StartTransmission)
    }

    /// Bus completion of the TX payload write.
    pub(super) fn start_transmission(
        &mut self,
        line: ExternalLine,
    ) -> Result<(), BusError<SPI::Error>> {
        self.pulse_ce()?;
        self.ctx.timeout.arm();
        self._intc.clear_pending(line);
        self._intc.enable(line);
        #[cfg(feature = "defmt")]
        defmt::trace!("transmission started");
        self.callbacks.dispatch(CallbackSlot::TxStarted);
        Ok(())
    }

    /// IRQ continuation of an asynchronous transmission.
    pub(super) fn finish_transmission(
        &mut self,
        line: ExternalLine,
    ) -> Result<(), BusError<SPI::Error>> {
        self.ctx.timeout.disarm();
        self.ctx.irq_handler = IrqHandler::None;
        self._intc.clear_pending(line);
        self.clear_status()?;
        let flag = StatusFlag::from_status(self._status.into_bits());
        self.ctx.status = flag;
        #[cfg(feature = "defmt")]
        defmt::trace!("transmission finished: {}", flag);
        if flag.carries_payload() {
            let width = self.read_payload_width()?;
            self._buf[0] = commands::R_RX_PAYLOAD;
            self._buf[1..=width as usize].fill(0);
            return self.spi_start(width as usize + 1, BusStep::ReadAckPayload(width));
        }
        self._intc.disable(line);
        self.cs_release()?;
        self.callbacks.dispatch(CallbackSlot::TxAckPayloadReceived);
        Ok(())
    }

    /// Bus completion of the ACK payload read.
    pub(super) fn store_ack(
        &mut self,
        line: ExternalLine,
        width: u8,
    ) -> Result<(), BusError<SPI::Error>> {
        let len = width as usize + 1;
        self.spi_finish(len)?;
        self._intc.disable(line);
        self.cs_release()?;
        let mut ack = Payload::new();
        let _ = ack.extend_from_slice(&self._buf[1..len]);
        self.ctx.payload = Some(ack);
        self.callbacks.dispatch(CallbackSlot::TxAckPayloadReceived);
        Ok(())
    }

    /// Abort a transmission whose IRQ never came.
    pub(super) fn abort_transmission(&mut self) -> Result<(), BusError<SPI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::warn!("transmission timed out");
        self.ctx.status = StatusFlag::NoResponse;
        self.ctx.irq_handler = IrqHandler::None;
        if let Some(line) = self.line {
            self._intc.disable(line);
            self._intc.clear_pending(line);
        }
        let cleared = self.clear_status();
        let released = self.cs_release();
        self.callbacks.dispatch(CallbackSlot::TxTimeout);
        cleared?;
        released
    }
}

impl<SPI, CE, CS, IRQ, INTC, CNT, DELAY> EsbTransmit for Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY>
where
    SPI: SpiCompletion,
    CE: OutputPin,
    CS: OutputPin,
    IRQ: InputPin,
    INTC: InterruptController,
    CNT: FreeRunningCounter,
    DELAY: DelayNs,
{
    type TransmitErrorType = SendError<SPI::Error>;

    fn send_blocking(
        &mut self,
        channel: &PayloadChannel,
        payload: &[u8],
    ) -> Result<Payload, Self::TransmitErrorType> {
        self.check_transmitter(channel)?;
        self.ctx.status = StatusFlag::NoStatus;
        self.cs_assert()?;
        let result = self.exchange_blocking(channel.peer_address(), payload);
        let cleared = self.clear_status();
        let released = self.cs_release();
        let ack = result?;
        cleared?;
        released?;
        Ok(ack)
    }

    fn send_async(
        &mut self,
        channel: &PayloadChannel,
        payload: &[u8],
    ) -> Result<(), Self::TransmitErrorType> {
        self.check_transmitter(channel)?;
        self.ctx.status = StatusFlag::NoStatus;
        self.ctx.payload = None;
        self.cs_assert()?;
        self.ctx.irq_handler = IrqHandler::Transmit;
        if let Err(err) = self.stage_transmission(channel.peer_address(), payload) {
            self.ctx.irq_handler = IrqHandler::None;
            if self.cs_release().is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("failed to release CS after a failed send");
            }
            return Err(err.into());
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("payload loading");
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{commands, registers, BusError, SendError};
    use crate::{
        radio::{prelude::*, Nrf24, PayloadChannel, PinBinding},
        spi_test_expects,
        test::{mk_radio, FakeCounter, FakeIntc, MockRadio, IRQ_PIN_CODE},
        CallbackSlot, DeviceRole, ExternalLine, StatusFlag,
    };
    use core::sync::atomic::{AtomicUsize, Ordering};
    use embedded_hal::spi::{ErrorKind as SpiErrorKind, ErrorType, SpiBus};
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
        spi::Transaction as SpiTransaction,
        MockError,
    };
    use std::{io, vec, vec::Vec};

    const PEER: u64 = 0xB1B2B3B4B5;
    const LINE: ExternalLine = ExternalLine::Int1;

    fn channel() -> PayloadChannel {
        PayloadChannel::new(DeviceRole::Transmitter, PEER)
    }

    fn transmitter(
        ce_expectations: &[PinTransaction],
        cs_expectations: &[PinTransaction],
        irq_expectations: &[PinTransaction],
        spi_expectations: &[SpiTransaction<u8>],
    ) -> MockRadio {
        let mut mocks = mk_radio(
            ce_expectations,
            cs_expectations,
            irq_expectations,
            spi_expectations,
        );
        mocks
            .0
            .assume_configured(DeviceRole::Transmitter, LINE, [0; 6]);
        mocks
    }

    /// Expectations common to both send paths, up to (and including) the payload write.
    fn staging_expectations(payload: &[u8]) -> Vec<SpiTransaction<u8>> {
        let mut tx = vec![commands::W_TX_PAYLOAD];
        tx.extend_from_slice(payload);
        let mut expectations = spi_test_expects![
            (vec![commands::FLUSH_TX], vec![0x0Eu8]),
            (vec![commands::FLUSH_RX], vec![0x0Eu8]),
            (
                vec![commands::write_register(registers::STATUS), 0x70u8],
                vec![0x0Eu8, 0u8],
            ),
            (
                vec![
                    commands::write_register(registers::RX_ADDR_P0),
                    0xB5u8,
                    0xB4,
                    0xB3,
                    0xB2,
                    0xB1,
                ],
                vec![0x0Eu8, 0, 0, 0, 0, 0],
            ),
            (
                vec![
                    commands::write_register(registers::TX_ADDR),
                    0xB5u8,
                    0xB4,
                    0xB3,
                    0xB2,
                    0xB1,
                ],
                vec![0x0Eu8, 0, 0, 0, 0, 0],
            ),
        ]
        .to_vec();
        let response = vec![0x0Eu8; tx.len()];
        expectations.extend(spi_test_expects![(tx, response),]);
        expectations
    }

    fn ce_pulse() -> [PinTransaction; 3] {
        [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]
    }

    fn cs_cycle() -> [PinTransaction; 2] {
        [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]
    }

    #[test]
    fn blocking_send_complete() {
        let mut spi_expectations = staging_expectations(b"hi");
        spi_expectations.extend(spi_test_expects![
            // read status
            (vec![commands::NOP], vec![0x2Eu8]),
            // clear status
            (
                vec![commands::write_register(registers::STATUS), 0x70u8],
                vec![0x2Eu8, 0u8],
            ),
        ]);
        let irq_expectations = [PinTransaction::get(PinState::Low)];
        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &irq_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4);
        let ack = radio.send_blocking(&channel(), b"hi").unwrap();
        assert!(ack.is_empty());
        assert_eq!(radio.read_status(), StatusFlag::SendComplete);
        assert_eq!(radio.read_status(), StatusFlag::NoStatus);
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    #[test]
    fn blocking_ack_payload() {
        let mut spi_expectations = staging_expectations(&[1, 2, 3, 4]);
        spi_expectations.extend(spi_test_expects![
            (vec![commands::NOP], vec![0x60u8]),
            // payload width
            (vec![commands::R_RX_PL_WID, 0u8], vec![0x60u8, 3u8]),
            (
                vec![commands::R_RX_PAYLOAD, 0u8, 0u8, 0u8],
                vec![0x60u8, 7u8, 8u8, 9u8],
            ),
            (
                vec![commands::write_register(registers::STATUS), 0x70u8],
                vec![0x60u8, 0u8],
            ),
        ]);
        let irq_expectations = [PinTransaction::get(PinState::Low)];
        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &irq_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4);
        let ack = radio.send_blocking(&channel(), &[1, 2, 3, 4]).unwrap();
        assert_eq!(ack.as_slice(), &[7, 8, 9]);
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    #[test]
    fn blocking_link_failed() {
        let mut spi_expectations = staging_expectations(&[0x55]);
        spi_expectations.extend(spi_test_expects![
            (vec![commands::NOP], vec![0x1Eu8]),
            (
                vec![commands::write_register(registers::STATUS), 0x70u8],
                vec![0x1Eu8, 0u8],
            ),
        ]);
        let irq_expectations = [
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::Low),
        ];
        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &irq_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4);
        assert_eq!(
            radio.send_blocking(&channel(), &[0x55]),
            Err(SendError::LinkFailed)
        );
        assert_eq!(radio.read_status(), StatusFlag::MaxRetransmits);
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    #[test]
    fn blocking_no_response() {
        let mut spi_expectations = staging_expectations(&[0x55]);
        // no status read; only the final clear
        spi_expectations.extend(spi_test_expects![(
            vec![commands::write_register(registers::STATUS), 0x70u8],
            vec![0x0Eu8, 0u8],
        ),]);
        // the counter advances 10 ticks per read and the budget is 30 ticks
        let irq_expectations = [
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
        ];
        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &irq_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4);
        assert_eq!(
            radio.send_blocking(&channel(), &[0x55]),
            Err(SendError::NoResponse)
        );
        assert_eq!(radio.read_status(), StatusFlag::NoResponse);
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    #[test]
    fn wrong_role() {
        let mocks = mk_radio(&[], &[], &[], &[]);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4);
        // not configured
        assert_eq!(
            radio.send_blocking(&channel(), &[1]),
            Err(SendError::NotTransmitter)
        );
        radio.assume_configured(DeviceRole::Receiver, LINE, [0; 6]);
        assert_eq!(
            radio.send_async(&channel(), &[1]),
            Err(SendError::NotTransmitter)
        );
        radio.assume_configured(DeviceRole::Transmitter, LINE, [0; 6]);
        let rx_channel = PayloadChannel::new(DeviceRole::Receiver, 0);
        assert_eq!(
            radio.send_async(&rx_channel, &[1]),
            Err(SendError::NotTransmitter)
        );
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    /// A bus on which every transfer fails.
    struct DeadBus;

    impl ErrorType for DeadBus {
        type Error = SpiErrorKind;
    }

    impl SpiBus<u8> for DeadBus {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Err(SpiErrorKind::Other)
        }

        fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> {
            Err(SpiErrorKind::Other)
        }

        fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
            Err(SpiErrorKind::Other)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Err(SpiErrorKind::Other)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl SpiCompletion for DeadBus {
        fn start_transfer(&mut self, _words: &[u8]) -> Result<(), Self::Error> {
            Err(SpiErrorKind::Other)
        }

        fn read_completed(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Err(SpiErrorKind::Other)
        }
    }

    #[test]
    fn bus_error_outranks_cs_release() {
        let cs_expectations = [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High).with_error(MockError::Io(io::ErrorKind::Other)),
        ];
        let mut ce_pin = PinMock::new(&[]);
        let mut cs_pin = PinMock::new(&cs_expectations);
        let mut irq_pin = PinMock::new(&[]);
        let intc = FakeIntc::default();
        let counter = FakeCounter {
            now: 0,
            step: 10,
            frequency: 1000,
        };
        let mut radio = Nrf24::new(
            DeadBus,
            PinBinding::new(ce_pin.clone(), cs_pin.clone(), irq_pin.clone(), IRQ_PIN_CODE),
            intc.clone(),
            counter,
            NoopDelay,
        );
        radio.assume_configured(DeviceRole::Transmitter, LINE, [0; 6]);
        // the failed release is only logged
        assert_eq!(
            radio.send_async(&channel(), &[1]),
            Err(SendError::Bus(BusError::Spi(SpiErrorKind::Other)))
        );
        assert!(!radio.ctx.is_busy());
        assert!(!intc.state(LINE).enabled);
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    static STARTED: AtomicUsize = AtomicUsize::new(0);
    static FINISHED: AtomicUsize = AtomicUsize::new(0);
    static TIMED_OUT: AtomicUsize = AtomicUsize::new(0);

    fn started() {
        STARTED.fetch_add(1, Ordering::Relaxed);
    }

    fn finished() {
        FINISHED.fetch_add(1, Ordering::Relaxed);
    }

    fn timed_out() {
        TIMED_OUT.fetch_add(1, Ordering::Relaxed);
    }

    static ON_STARTED: fn() = started;
    static ON_FINISHED: fn() = finished;
    static ON_TIMED_OUT: fn() = timed_out;

    #[test]
    fn async_ack_payload() {
        let mut spi_expectations = staging_expectations(b"ping");
        // the payload write happens in the background
        let staged = spi_expectations.len() - 2;
        spi_expectations.truncate(staged);
        spi_expectations.push(SpiTransaction::write_vec(vec![
            commands::W_TX_PAYLOAD,
            b'p',
            b'i',
            b'n',
            b'g',
        ]));
        // IRQ: read + clear status, then the payload width
        spi_expectations.extend(spi_test_expects![
            (
                vec![commands::write_register(registers::STATUS), 0x70u8],
                vec![0x60u8, 0u8],
            ),
            (vec![commands::R_RX_PL_WID, 0u8], vec![0x0Eu8, 2u8]),
        ]);
        spi_expectations.push(SpiTransaction::write_vec(vec![
            commands::R_RX_PAYLOAD,
            0,
            0,
        ]));
        spi_expectations.push(SpiTransaction::read_vec(vec![0x0E, b'o', b'k']));

        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin, intc) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4, mocks.5);
        radio.set_callback(CallbackSlot::TxStarted, &ON_STARTED);
        radio.set_callback(CallbackSlot::TxAckPayloadReceived, &ON_FINISHED);

        radio.send_async(&channel(), b"ping").unwrap();
        assert_eq!(
            radio.send_async(&channel(), b"ping"),
            Err(SendError::Busy)
        );
        // stage B
        radio.on_bus_complete().unwrap();
        assert_eq!(STARTED.load(Ordering::Relaxed), 1);
        assert!(intc.state(LINE).enabled);
        assert!(radio.ctx.timeout.is_armed());
        // a few ticks pass before the IRQ
        for _ in 0..5 {
            radio.on_tick().unwrap();
        }
        // stage C
        intc.pend(LINE);
        radio.on_irq().unwrap();
        assert!(!radio.ctx.timeout.is_armed());
        assert_eq!(FINISHED.load(Ordering::Relaxed), 0);
        radio.on_bus_complete().unwrap();
        assert_eq!(FINISHED.load(Ordering::Relaxed), 1);
        assert!(!intc.state(LINE).enabled);
        assert_eq!(radio.take_payload().unwrap().as_slice(), b"ok");
        assert_eq!(radio.read_status(), StatusFlag::DataReady);
        assert!(!radio.ctx.is_busy());
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    /// Background staging of `payload`, then the IRQ's status read answered with `status`.
    fn async_outcome_expectations(payload: &[u8], status: u8) -> Vec<SpiTransaction<u8>> {
        let mut spi_expectations = staging_expectations(payload);
        let staged = spi_expectations.len() - 2;
        spi_expectations.truncate(staged);
        let mut tx = vec![commands::W_TX_PAYLOAD];
        tx.extend_from_slice(payload);
        spi_expectations.push(SpiTransaction::write_vec(tx));
        spi_expectations.extend(spi_test_expects![(
            vec![commands::write_register(registers::STATUS), 0x70u8],
            vec![status, 0u8],
        ),]);
        spi_expectations
    }

    static COMPLETED: AtomicUsize = AtomicUsize::new(0);
    static LINK_FAILED: AtomicUsize = AtomicUsize::new(0);

    fn completed() {
        COMPLETED.fetch_add(1, Ordering::Relaxed);
    }

    fn link_failed() {
        LINK_FAILED.fetch_add(1, Ordering::Relaxed);
    }

    static ON_COMPLETED: fn() = completed;
    static ON_LINK_FAILED: fn() = link_failed;

    #[test]
    fn async_send_complete() {
        let spi_expectations = async_outcome_expectations(&[5, 6], 0x2E);
        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin, intc) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4, mocks.5);
        radio.set_callback(CallbackSlot::TxAckPayloadReceived, &ON_COMPLETED);

        radio.send_async(&channel(), &[5, 6]).unwrap();
        radio.on_bus_complete().unwrap();
        intc.pend(LINE);
        radio.on_irq().unwrap();
        // no payload to read, so the send ends right here
        assert_eq!(COMPLETED.load(Ordering::Relaxed), 1);
        let state = intc.state(LINE);
        assert!(!state.enabled);
        assert!(!state.pending);
        assert!(radio.take_payload().is_none());
        assert_eq!(radio.read_status(), StatusFlag::SendComplete);
        assert!(!radio.ctx.is_busy());
        assert!(!radio.ctx.timeout.is_armed());
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    #[test]
    fn async_link_failed() {
        let spi_expectations = async_outcome_expectations(&[7], 0x1E);
        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin, intc) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4, mocks.5);
        radio.set_callback(CallbackSlot::TxAckPayloadReceived, &ON_LINK_FAILED);

        radio.send_async(&channel(), &[7]).unwrap();
        radio.on_bus_complete().unwrap();
        intc.pend(LINE);
        radio.on_irq().unwrap();
        assert_eq!(LINK_FAILED.load(Ordering::Relaxed), 1);
        assert!(!intc.state(LINE).enabled);
        assert!(radio.take_payload().is_none());
        assert_eq!(radio.read_status(), StatusFlag::MaxRetransmits);
        assert!(!radio.ctx.is_busy());
        // the timeout no longer fires
        for _ in 0..40 {
            radio.on_tick().unwrap();
        }
        assert_eq!(radio.read_status(), StatusFlag::NoStatus);
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }

    #[test]
    fn async_timeout() {
        let mut spi_expectations = staging_expectations(&[9]);
        let staged = spi_expectations.len() - 2;
        spi_expectations.truncate(staged);
        spi_expectations.push(SpiTransaction::write_vec(vec![commands::W_TX_PAYLOAD, 9]));
        // abort: clear status
        spi_expectations.extend(spi_test_expects![(
            vec![commands::write_register(registers::STATUS), 0x70u8],
            vec![0x0Eu8, 0u8],
        ),]);

        let mocks = transmitter(&ce_pulse(), &cs_cycle(), &[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin, mut cs_pin, mut irq_pin, intc) =
            (mocks.0, mocks.1, mocks.2, mocks.3, mocks.4, mocks.5);
        radio.set_callback(CallbackSlot::TxTimeout, &ON_TIMED_OUT);

        radio.send_async(&channel(), &[9]).unwrap();
        radio.on_bus_complete().unwrap();
        for _ in 0..30 {
            radio.on_tick().unwrap();
        }
        assert_eq!(TIMED_OUT.load(Ordering::Relaxed), 0);
        assert_eq!(radio.read_status(), StatusFlag::NoStatus);
        radio.on_tick().unwrap();
        assert_eq!(TIMED_OUT.load(Ordering::Relaxed), 1);
        assert_eq!(radio.read_status(), StatusFlag::NoResponse);
        assert!(!intc.state(LINE).enabled);
        // a late IRQ is ignored
        intc.pend(LINE);
        radio.on_irq().unwrap();
        radio.on_tick().unwrap();
        assert_eq!(TIMED_OUT.load(Ordering::Relaxed), 1);
        assert!(!radio.ctx.is_busy());
        spi.done();
        ce_pin.done();
        cs_pin.done();
        irq_pin.done();
    }
}
