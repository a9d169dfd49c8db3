use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use super::{
    commands,
    context::{BusStep, IrqHandler},
    BusError, Nrf24, ReceiveError, StoreError,
};
use crate::{
    radio::{
        prelude::{EsbReceive, FreeRunningCounter, InterruptController, SpiCompletion},
        PayloadChannel,
    },
    CallbackSlot, DeviceRole, ExternalLine, Payload, StatusFlag,
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
    /// The IRQ line of a radio configured as receiver, if the channel is a receiver's.
    fn receiver_line(&self, channel: &PayloadChannel) -> Option<ExternalLine> {
        match self.line {
            Some(line)
                if self.role == Some(DeviceRole::Receiver)
                    && channel.role() == DeviceRole::Receiver =>
            {
                Some(line)
            }
            _ => None,
        }
    }

    /// Is the radio listening (its IRQ continuation installed)?
    fn is_listening(&self) -> bool {
        self.ctx.irq_handler == IrqHandler::Receive
    }

    /// Enter RX mode and wait for the IRQ.
    pub(super) fn start_reception(
        &mut self,
        line: ExternalLine,
    ) -> Result<(), BusError<SPI::Error>> {
        self.cs_assert()?;
        self.ctx.irq_handler = IrqHandler::Receive;
        self.spi_read(0, commands::FLUSH_RX)?;
        self.clear_status()?;
        self._intc.clear_pending(line);
        self._intc.enable(line);
        #[cfg(feature = "defmt")]
        defmt::trace!("listening");
        self.ce(true)
    }

    /// IRQ continuation while listening.
    pub(super) fn service_reception(
        &mut self,
        line: ExternalLine,
    ) -> Result<(), BusError<SPI::Error>> {
        self.clear_status()?;
        let flag = StatusFlag::from_status(self._status.into_bits());
        self.ctx.status = flag;
        if !flag.carries_payload() {
            // false trigger; keep listening
            self._intc.clear_pending(line);
            return Ok(());
        }
        self.ctx.rx_pipe = self._status.rx_pipe_index();
        #[cfg(feature = "defmt")]
        defmt::trace!("payload on pipe {}", self._status.rx_pipe());
        self.ce(false)?;
        let width = self.read_payload_width()?;
        self._buf[0] = commands::R_RX_PAYLOAD;
        self._buf[1..=width as usize].fill(0);
        self.spi_start(width as usize + 1, BusStep::ReadRxPayload(width))
    }

    /// Bus completion of the RX payload read.
    pub(super) fn store_rx_payload(
        &mut self,
        line: ExternalLine,
        width: u8,
    ) -> Result<(), BusError<SPI::Error>> {
        let len = width as usize + 1;
        self.spi_finish(len)?;
        let mut payload = Payload::new();
        let _ = payload.extend_from_slice(&self._buf[1..len]);
        self.ctx.payload = Some(payload);
        self._intc.clear_pending(line);
        if self.is_listening() {
            self.ce(true)?;
        }
        self.callbacks.dispatch(CallbackSlot::RxPayloadReceived);
        Ok(())
    }

    /// Pause RX mode and load an ACK payload in the background.
    pub(super) fn begin_ack_store(
        &mut self,
        pipe: u8,
        payload: &[u8],
    ) -> Result<(), BusError<SPI::Error>> {
        self.ce(false)?;
        self.cs_assert()?;
        self.ctx.rx_fifo_busy = true;
        let len = self.load_buf(commands::write_ack_payload(pipe), payload);
        if let Err(err) = self.spi_start(len, BusStep::StoreAckPayload) {
            self.ctx.rx_fifo_busy = false;
            if self.is_listening() && self.ce(true).is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("failed to resume listening after a failed ACK payload store");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Bus completion of an ACK payload write.
    pub(super) fn finish_ack_store(&mut self) -> Result<(), BusError<SPI::Error>> {
        self.ctx.rx_fifo_busy = false;
        // the next store, or a pending stop, takes over CE and CS
        if self.ctx.queued_ack.is_some() || self.ctx.stop_pending {
            return Ok(());
        }
        if self.is_listening() {
            self.ce(true)
        } else {
            self.cs_release()
        }
    }

    /// The bus-dependent half of [`EsbReceive::stop_receiving()`].
    pub(super) fn complete_stop(&mut self) -> Result<(), BusError<SPI::Error>> {
        self.ctx.stop_pending = false;
        self.clear_status()?;
        self.cs_release()
    }
}

impl<SPI, CE, CS, IRQ, INTC, CNT, DELAY> EsbReceive for Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY>
where
    SPI: SpiCompletion,
    CE: OutputPin,
    CS: OutputPin,
    IRQ: InputPin,
    INTC: InterruptController,
    CNT: FreeRunningCounter,
    DELAY: DelayNs,
{
    type ReceiveErrorType = ReceiveError<SPI::Error>;
    type StoreErrorType = StoreError<SPI::Error>;

    fn receive_async(&mut self, channel: &PayloadChannel) -> Result<(), Self::ReceiveErrorType> {
        let line = self
            .receiver_line(channel)
            .ok_or(ReceiveError::NotReceiver)?;
        if self.is_listening() || self.ctx.deferred_reception {
            return Ok(());
        }
        self.ctx.payload = None;
        if self.ctx.bus_busy() {
            #[cfg(feature = "defmt")]
            defmt::trace!("listening deferred until the bus is idle");
            self.ctx.stop_pending = false;
            self.ctx.deferred_reception = true;
            return Ok(());
        }
        self.start_reception(line)?;
        Ok(())
    }

    fn stop_receiving(&mut self, channel: &PayloadChannel) -> Result<(), Self::ReceiveErrorType> {
        let line = self
            .receiver_line(channel)
            .ok_or(ReceiveError::NotReceiver)?;
        self._intc.disable(line);
        self._intc.clear_pending(line);
        self.ctx.irq_handler = IrqHandler::None;
        self.ctx.deferred_reception = false;
        self.ctx.irq_deferred = false;
        self.ce(false)?;
        if self.ctx.bus_busy() {
            // finished from on_bus_complete()
            self.ctx.stop_pending = true;
            return Ok(());
        }
        self.complete_stop()?;
        Ok(())
    }

    fn store_ack_payload(
        &mut self,
        channel: &PayloadChannel,
        pipe: u8,
        payload: &[u8],
    ) -> Result<(), Self::StoreErrorType> {
        self.receiver_line(channel)
            .ok_or(StoreError::NotReceiver)?;
        if pipe > 5 {
            return Err(StoreError::InvalidPipe);
        }
        if self.ctx.bus_busy() {
            if self.ctx.queued_ack.is_some() {
                return Err(StoreError::Busy);
            }
            let mut queued = Payload::new();
            let len = payload.len().min(queued.capacity());
            let _ = queued.extend_from_slice(&payload[..len]);
            self.ctx.queued_ack = Some((pipe, queued));
            return Ok(());
        }
        self.begin_ack_store(pipe, payload)?;
        Ok(())
    }

    fn is_rx_fifo_loading(&self) -> bool {
        self.ctx.rx_fifo_busy || self.ctx.queued_ack.is_some()
    }
}
