use super::bit_fields::{Config, Feature, RfSetup, SetupRetry};
use super::{mnemonics, registers};
use crate::{
    radio::{ReceiverConfig, TransmitterConfig},
    DataRate, DeviceRole, PaLevel, StatusFlags,
};

/// The order in which the configuration registers are written.
pub(crate) const REGISTER_ORDER: [u8; RegisterMap::LEN] = [
    registers::STATUS,
    registers::CONFIG,
    registers::EN_AA,
    registers::EN_RXADDR,
    registers::SETUP_AW,
    registers::SETUP_RETR,
    registers::RF_CH,
    registers::RF_SETUP,
    registers::DYNPD,
    registers::FEATURE,
];

/// The ordered `(register, value)` pairs that put the radio in a role.
///
/// The pairs are written in this order:
/// `STATUS`, `CONFIG`, `EN_AA`, `EN_RXADDR`, `SETUP_AW`, `SETUP_RETR`, `RF_CH`,
/// `RF_SETUP`, `DYNPD`, `FEATURE`.
/// ```
/// use rf24_irq::radio::{RegisterMap, TransmitterConfig};
///
/// let map = RegisterMap::for_transmitter(&TransmitterConfig::default().with_channel(9));
/// let pairs: Vec<(u8, u8)> = map.pairs().collect();
/// let decoded = RegisterMap::from_pairs(&pairs).unwrap();
/// assert_eq!(decoded.channel(), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisterMap {
    values: [u8; RegisterMap::LEN],
}

impl RegisterMap {
    pub const LEN: usize = 10;

    pub fn for_transmitter(config: &TransmitterConfig) -> Self {
        let auto_ack = config.auto_ack();
        Self {
            values: [
                StatusFlags::IRQ_MASK,
                Config::operational(false).into_bits(),
                auto_ack as u8,
                1,
                mnemonics::ADDRESS_WIDTH_5,
                SetupRetry::new()
                    .with_ard(config.retry_delay())
                    .with_arc(config.retry_count())
                    .into_bits(),
                config.channel(),
                RfSetup::new()
                    .with_pa_level(config.pa_level())
                    .with_data_rate(config.data_rate())
                    .into_bits(),
                1,
                Feature::new()
                    .with_dynamic_payloads(true)
                    .with_ack_payloads(auto_ack)
                    .into_bits(),
            ],
        }
    }

    /// `pipes` is the mask of enabled pipes.
    pub fn for_receiver(config: &ReceiverConfig, pipes: u8) -> Self {
        let auto_ack = config.auto_ack();
        Self {
            values: [
                StatusFlags::IRQ_MASK,
                Config::operational(true).into_bits(),
                if auto_ack { pipes } else { 0 },
                pipes,
                mnemonics::ADDRESS_WIDTH_5,
                0,
                config.channel(),
                RfSetup::new()
                    .with_pa_level(config.pa_level())
                    .with_data_rate(config.data_rate())
                    .into_bits(),
                pipes,
                Feature::new()
                    .with_dynamic_payloads(true)
                    .with_ack_payloads(auto_ack)
                    .into_bits(),
            ],
        }
    }

    /// Rebuild a map from pairs in the order they are written.
    ///
    /// Returns `None` if a register is missing or out of order.
    pub fn from_pairs(pairs: &[(u8, u8)]) -> Option<Self> {
        if pairs.len() != Self::LEN {
            return None;
        }
        let mut values = [0u8; Self::LEN];
        for (i, (register, value)) in pairs.iter().enumerate() {
            if *register != REGISTER_ORDER[i] {
                return None;
            }
            values[i] = *value;
        }
        Some(Self { values })
    }

    /// Values in [`REGISTER_ORDER`].
    pub(crate) fn from_values(values: [u8; Self::LEN]) -> Self {
        Self { values }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        REGISTER_ORDER.iter().copied().zip(self.values.iter().copied())
    }

    fn value(&self, register: u8) -> u8 {
        REGISTER_ORDER
            .iter()
            .position(|r| *r == register)
            .map(|i| self.values[i])
            .unwrap_or_default()
    }

    pub fn role(&self) -> DeviceRole {
        if Config::from_bits(self.value(registers::CONFIG)).is_rx() {
            DeviceRole::Receiver
        } else {
            DeviceRole::Transmitter
        }
    }

    pub fn channel(&self) -> u8 {
        self.value(registers::RF_CH)
    }

    pub fn pa_level(&self) -> PaLevel {
        RfSetup::from_bits(self.value(registers::RF_SETUP)).pa_level()
    }

    pub fn data_rate(&self) -> DataRate {
        RfSetup::from_bits(self.value(registers::RF_SETUP)).data_rate()
    }

    /// The auto-retry `(delay, count)`.
    pub fn auto_retries(&self) -> (u8, u8) {
        let retry = SetupRetry::from_bits(self.value(registers::SETUP_RETR));
        (retry.ard(), retry.arc())
    }

    pub fn auto_ack(&self) -> bool {
        Feature::from_bits(self.value(registers::FEATURE)).ack_payloads()
    }

    pub fn enabled_pipes(&self) -> u8 {
        self.value(registers::EN_RXADDR)
    }
}
