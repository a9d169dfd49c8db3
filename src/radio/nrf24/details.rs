use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use super::{
    commands,
    register_map::{RegisterMap, REGISTER_ORDER},
    BusError, Nrf24,
};
use crate::radio::prelude::{FreeRunningCounter, InterruptController, SpiCompletion};

#[cfg(feature = "std")]
extern crate std;

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
    /// Read back the configuration registers in the order they are written.
    ///
    /// The `STATUS` value is the radio's status byte, so its IRQ flags
    /// reflect any event not yet serviced.
    pub fn read_register_map(&mut self) -> Result<RegisterMap, BusError<SPI::Error>> {
        let mut values = [0u8; RegisterMap::LEN];
        for (value, register) in values.iter_mut().zip(REGISTER_ORDER) {
            self.spi_read(1, commands::read_register(register))?;
            *value = self._buf[1];
        }
        Ok(RegisterMap::from_values(values))
    }

    /// Print the radio's configuration for debugging.
    ///
    /// Output goes through `defmt::println` with the `defmt` feature,
    /// `std::println` with the `std` feature, and nowhere otherwise.
    #[cfg(feature = "defmt")]
    pub fn print_details(&mut self) -> Result<(), BusError<SPI::Error>> {
        let map = self.read_register_map()?;
        defmt::println!("Status____________________{}", self._status);
        defmt::println!("Primary Mode______________{}", map.role());
        let channel = map.channel();
        defmt::println!(
            "Channel___________________{=u8} ~ {=u16} MHz",
            channel,
            channel as u16 + 2400u16
        );
        defmt::println!("RF Data Rate______________{}", map.data_rate());
        defmt::println!("RF Power Amplifier________{}", map.pa_level());
        let (delay, count) = map.auto_retries();
        defmt::println!(
            "Auto retry delay__________{=u16} microseconds",
            delay as u16 * 250 + 250
        );
        defmt::println!("Auto retry attempts_______{=u8} maximum", count);
        defmt::println!("ACK Payload enabled_______{=bool}", map.auto_ack());
        defmt::println!("Enabled pipes_____________0b{=0..8}", map.enabled_pipes());
        if let Some(line) = self.line {
            defmt::println!("IRQ line__________________{}", line);
        }
        Ok(())
    }

    /// Print the radio's configuration for debugging.
    ///
    /// Output goes through `defmt::println` with the `defmt` feature,
    /// `std::println` with the `std` feature, and nowhere otherwise.
    #[cfg(all(feature = "std", not(feature = "defmt")))]
    pub fn print_details(&mut self) -> Result<(), BusError<SPI::Error>> {
        let map = self.read_register_map()?;
        std::println!("Status____________________{}", self._status);
        std::println!("Primary Mode______________{}", map.role());
        let channel = map.channel();
        std::println!(
            "Channel___________________{channel} ~ {} MHz",
            channel as u16 + 2400u16
        );
        std::println!("RF Data Rate______________{}", map.data_rate());
        std::println!("RF Power Amplifier________{}", map.pa_level());
        let (delay, count) = map.auto_retries();
        std::println!(
            "Auto retry delay__________{} microseconds",
            delay as u16 * 250 + 250
        );
        std::println!("Auto retry attempts_______{count} maximum");
        std::println!("ACK Payload enabled_______{}", map.auto_ack());
        std::println!("Enabled pipes_____________{:#010b}", map.enabled_pipes());
        if let Some(line) = self.line {
            std::println!("IRQ line__________________{line}");
        }
        Ok(())
    }

    /// Print the radio's configuration for debugging.
    ///
    /// Output goes through `defmt::println` with the `defmt` feature,
    /// `std::println` with the `std` feature, and nowhere otherwise.
    #[cfg(not(any(feature = "defmt", feature = "std")))]
    pub fn print_details(&mut self) -> Result<(), BusError<SPI::Error>> {
        Ok(())
    }
}
