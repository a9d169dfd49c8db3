use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use super::{
    context::{BusStep, IrqHandler},
    BusError, Nrf24,
};
use crate::{
    radio::prelude::{
        Callback, EsbEvents, FreeRunningCounter, InterruptController, SpiCompletion,
    },
    CallbackSlot, ExternalLine, StatusFlag,
};

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
    /// Give up on a background transfer that never completed.
    fn abandon_bus_step(&mut self) -> Result<(), BusError<SPI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::warn!("SPI transfer never completed");
        self.ctx.abandon();
        self.ctx.status = StatusFlag::NoResponse;
        if let Some(line) = self.line {
            self._intc.disable(line);
            self._intc.clear_pending(line);
        }
        let ce = self.ce(false);
        let released = self.cs_release();
        ce?;
        released
    }

    /// Run the continuation installed for the IRQ line.
    fn service_irq(&mut self, line: ExternalLine) -> Result<(), BusError<SPI::Error>> {
        match self.ctx.irq_handler {
            IrqHandler::Transmit => self.finish_transmission(line),
            IrqHandler::Receive => self.service_reception(line),
            IrqHandler::None => {
                self._intc.clear_pending(line);
                Ok(())
            }
        }
    }

    /// Work that waited for the bus, in order of precedence.
    fn resume_after_transfer(&mut self, line: ExternalLine) -> Result<(), BusError<SPI::Error>> {
        if let Some((pipe, payload)) = self.ctx.queued_ack.take() {
            return self.begin_ack_store(pipe, &payload);
        }
        if self.ctx.stop_pending {
            return self.complete_stop();
        }
        if self.ctx.deferred_reception {
            self.ctx.deferred_reception = false;
            return self.start_reception(line);
        }
        let deferred = core::mem::take(&mut self.ctx.irq_deferred);
        if deferred && self.ctx.irq_handler != IrqHandler::None {
            self._intc.clear_pending(line);
            self._intc.enable(line);
            return self.service_irq(line);
        }
        // an IRQ may have been latched during the transfer
        self.on_irq()
    }
}

impl<SPI, CE, CS, IRQ, INTC, CNT, DELAY> EsbEvents for Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY>
where
    SPI: SpiCompletion,
    CE: OutputPin,
    CS: OutputPin,
    IRQ: InputPin,
    INTC: InterruptController,
    CNT: FreeRunningCounter,
    DELAY: DelayNs,
{
    type EventErrorType = BusError<SPI::Error>;

    fn on_irq(&mut self) -> Result<(), Self::EventErrorType> {
        let Some(line) = self.line else {
            return Ok(());
        };
        if !(self._intc.is_enabled(line) && self._intc.is_pending(line)) {
            return Ok(());
        }
        if self.ctx.bus_busy() {
            // masked until the transfer in flight completes
            self._intc.disable(line);
            self._intc.clear_pending(line);
            self.ctx.irq_deferred = true;
            #[cfg(feature = "defmt")]
            defmt::trace!("IRQ deferred");
            return Ok(());
        }
        self.service_irq(line)
    }

    fn on_bus_complete(&mut self) -> Result<(), Self::EventErrorType> {
        let Some(line) = self.line else {
            return Ok(());
        };
        let step = core::mem::replace(&mut self.ctx.bus_step, BusStep::Idle);
        self.ctx.bus_watchdog = 0;
        match step {
            BusStep::Idle => return Ok(()),
            BusStep::StartTransmission => self.start_transmission(line)?,
            BusStep::ReadAckPayload(width) => self.store_ack(line, width)?,
            BusStep::ReadRxPayload(width) => self.store_rx_payload(line, width)?,
            BusStep::StoreAckPayload => self.finish_ack_store()?,
        }
        if self.ctx.bus_busy() {
            return Ok(());
        }
        self.resume_after_transfer(line)
    }

    fn on_tick(&mut self) -> Result<(), Self::EventErrorType> {
        if self.ctx.timeout.tick() {
            self.abort_transmission()?;
        }
        if self.ctx.watchdog_tick() {
            self.abandon_bus_step()?;
        }
        Ok(())
    }

    fn set_callback(&mut self, slot: CallbackSlot, handler: Callback) {
        self.callbacks.set(slot, handler);
    }

    fn clear_callback(&mut self, slot: CallbackSlot) {
        self.callbacks.clear(slot);
    }
}
