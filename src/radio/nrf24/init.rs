use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use super::{
    commands, mnemonics, register_map::RegisterMap, registers, BusError, ConfigError, Nrf24,
};
use crate::{
    radio::{
        config::ADDRESS_MASK,
        prelude::{EsbConfigure, FreeRunningCounter, InterruptController, SpiCompletion},
        PayloadChannel, ReceiverConfig, TransmitterConfig,
    },
    DeviceRole, Edge, ExternalLine,
};

/// The time the radio needs to settle after powering up.
const POWER_UP_DELAY_US: u32 = 1500;

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
    /// Checks shared by both roles, done before touching the bus.
    fn prepare_configure(&mut self) -> Result<ExternalLine, ConfigError<SPI::Error>> {
        if self.ctx.is_busy() {
            return Err(ConfigError::OperationInProgress);
        }
        ExternalLine::from_pin_code(self.pins.irq_pin_code)
            .ok_or(ConfigError::UnrecognizedInterruptPin)
    }

    /// Power up the radio and make sure it answers.
    fn power_up(&mut self) -> Result<(), ConfigError<SPI::Error>> {
        self.spi_write_byte(registers::CONFIG, mnemonics::PWR_UP)?;
        self._delay_impl.delay_us(POWER_UP_DELAY_US);
        // MISO stuck low (or floating high) means nothing is listening
        match self._status.into_bits() {
            0x00 | 0xFF => Err(ConfigError::DeviceUnresponsive),
            _ => Ok(()),
        }
    }

    /// Flush both FIFOs, then write the register map in order.
    fn apply_register_map(&mut self, map: &RegisterMap) -> Result<(), BusError<SPI::Error>> {
        self.spi_read(0, commands::FLUSH_RX)?;
        self.spi_read(0, commands::FLUSH_TX)?;
        for (register, value) in map.pairs() {
            self.spi_write_byte(register, value)?;
        }
        Ok(())
    }

    /// Route the IRQ pin's falling edge to `line`, leaving the line disabled.
    fn setup_line(&mut self, line: ExternalLine, (priority, sub_priority): (u8, u8)) {
        self._intc.disable(line);
        self._intc.set_priority(line, priority, sub_priority);
        self._intc.set_edge(line, Edge::Falling);
        self._intc.clear_pending(line);
    }

    fn configure_transmitter_with_cs(
        &mut self,
        config: &TransmitterConfig,
    ) -> Result<(), ConfigError<SPI::Error>> {
        self.power_up()?;
        self.apply_register_map(&RegisterMap::for_transmitter(config))?;
        Ok(())
    }

    fn configure_receiver_with_cs(
        &mut self,
        config: &ReceiverConfig,
    ) -> Result<(), ConfigError<SPI::Error>> {
        self.power_up()?;
        let pipes = config.pipes();
        let mask = pipes.enabled_mask();
        if mask == 0 {
            return Err(ConfigError::NoPipesEnabled);
        }
        self.apply_register_map(&RegisterMap::for_receiver(config, mask))?;
        for pipe in 0..6u8 {
            if pipes.is_enabled(pipe) {
                let width = if pipe < 2 { 5 } else { 1 };
                self.write_address(registers::rx_addr(pipe), pipes.address(pipe), width)?;
            }
        }
        Ok(())
    }
}

impl<SPI, CE, CS, IRQ, INTC, CNT, DELAY> EsbConfigure for Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY>
where
    SPI: SpiCompletion,
    CE: OutputPin,
    CS: OutputPin,
    IRQ: InputPin,
    INTC: InterruptController,
    CNT: FreeRunningCounter,
    DELAY: DelayNs,
{
    type ConfigErrorType = ConfigError<SPI::Error>;

    fn configure_transmitter(
        &mut self,
        config: &TransmitterConfig,
    ) -> Result<PayloadChannel, Self::ConfigErrorType> {
        let line = self.prepare_configure()?;
        let peer_address = config.peer_address();
        if peer_address == 0 || peer_address > ADDRESS_MASK {
            return Err(ConfigError::InvalidPeerAddress);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("configuring transmitter on {}", line);

        self.role = None;
        self.ce(false)?;
        self.cs_assert()?;
        let result = self.configure_transmitter_with_cs(config);
        let released = self.cs_release();
        result?;
        released?;

        self.setup_line(line, config.irq_priority());
        self.role = Some(DeviceRole::Transmitter);
        self.line = Some(line);
        self.pipe_addresses = [0; 6];
        Ok(PayloadChannel::new(DeviceRole::Transmitter, peer_address))
    }

    fn configure_receiver(
        &mut self,
        config: &ReceiverConfig,
    ) -> Result<PayloadChannel, Self::ConfigErrorType> {
        let line = self.prepare_configure()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("configuring receiver on {}", line);

        self.role = None;
        self.ce(false)?;
        self.cs_assert()?;
        let result = self.configure_receiver_with_cs(config);
        let released = self.cs_release();
        result?;
        released?;

        self.setup_line(line, config.irq_priority());
        self.role = Some(DeviceRole::Receiver);
        self.line = Some(line);
        for (pipe, address) in self.pipe_addresses.iter_mut().enumerate() {
            *address = config.pipes().effective_address(pipe as u8);
        }
        Ok(PayloadChannel::new(DeviceRole::Receiver, 0))
    }
}
