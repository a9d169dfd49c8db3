use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use super::Nrf24;
use crate::{
    radio::prelude::{EsbStatus, FreeRunningCounter, InterruptController, SpiCompletion},
    Payload, StatusFlag,
};

impl<SPI, CE, CS, IRQ, INTC, CNT, DELAY> EsbStatus for Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY>
where
    SPI: SpiCompletion,
    CE: OutputPin,
    CS: OutputPin,
    IRQ: InputPin,
    INTC: InterruptController,
    CNT: FreeRunningCounter,
    DELAY: DelayNs,
{
    fn read_status(&mut self) -> StatusFlag {
        if self.ctx.irq_deferred {
            return StatusFlag::NoStatus;
        }
        if let Some(line) = self.line {
            if self._intc.is_enabled(line) && self._intc.is_pending(line) {
                return StatusFlag::NoStatus;
            }
        }
        core::mem::replace(&mut self.ctx.status, StatusFlag::NoStatus)
    }

    fn last_received_pipe_address(&mut self) -> Option<u64> {
        self.ctx
            .rx_pipe
            .take()
            .map(|pipe| self.pipe_addresses[pipe as usize])
    }

    fn take_payload(&mut self) -> Option<Payload> {
        self.ctx.payload.take()
    }
}
