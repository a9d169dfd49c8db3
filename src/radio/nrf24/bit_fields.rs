use bitfield_struct::bitfield;

use crate::{DataRate, PaLevel};

#[bitfield(u8, order = Msb)]
pub(crate) struct Config {
    #[bits(1)]
    _padding: u8,

    /// Mask the "RX Data Ready" event from the IRQ pin.
    pub mask_rx_dr: bool,

    /// Mask the "TX Data Sent" event from the IRQ pin.
    pub mask_tx_ds: bool,

    /// Mask the "max retransmits" event from the IRQ pin.
    pub mask_max_rt: bool,

    pub en_crc: bool,

    /// `true` for a 2 byte CRC.
    pub crc_2_bytes: bool,

    pub power: bool,

    pub is_rx: bool,
}

impl Config {
    /// Powered, 16 bit CRC, all IRQ events routed to the IRQ pin.
    pub(crate) const fn operational(is_rx: bool) -> Self {
        Self::new()
            .with_en_crc(true)
            .with_crc_2_bytes(true)
            .with_power(true)
            .with_is_rx(is_rx)
    }
}

#[bitfield(u8, order = Msb)]
pub(crate) struct SetupRetry {
    /// The auto-retry feature's `delay` (in steps of 250 us).
    #[bits(4)]
    pub ard: u8,

    /// The auto-retry feature's `count`.
    #[bits(4)]
    pub arc: u8,
}

#[bitfield(u8, order = Msb)]
pub(crate) struct RfSetup {
    #[bits(2)]
    _test_bits: u8,

    #[bits(1, access = None)]
    dr_low: bool,

    #[bits(1)]
    _pll_lock: u8,

    #[bits(1, access = None)]
    dr_high: bool,

    #[bits(2, access = None)]
    pa_level: u8,

    #[bits(1)]
    _obsolete: u8,
}

impl RfSetup {
    pub const fn data_rate(&self) -> DataRate {
        DataRate::from_bits(self.into_bits() & DataRate::MASK)
    }

    pub const fn with_data_rate(self, data_rate: DataRate) -> Self {
        let new_val = self.into_bits() & !DataRate::MASK;
        Self::from_bits(new_val | data_rate.into_bits())
    }

    pub const fn pa_level(&self) -> PaLevel {
        PaLevel::from_bits(self.into_bits() & PaLevel::MASK)
    }

    pub const fn with_pa_level(self, level: PaLevel) -> Self {
        let new_val = self.into_bits() & !PaLevel::MASK;
        Self::from_bits(new_val | level.into_bits())
    }
}

#[bitfield(u8, order = Msb)]
pub(crate) struct Feature {
    #[bits(5)]
    _padding: u8,

    pub dynamic_payloads: bool,

    pub ack_payloads: bool,

    #[bits(1)]
    _dynamic_ack: u8,
}
