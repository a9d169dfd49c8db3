use crate::{DataRate, DeviceRole, PaLevel};

/// The largest address a 5 byte (40 bit) pipe can hold.
pub(crate) const ADDRESS_MASK: u64 = 0xFF_FFFF_FFFF;

/// The pins wired to the radio, plus the platform's code for the IRQ pin.
///
/// The `irq_pin_code` is used to find the external interrupt line the IRQ pin is
/// routed to (see [`ExternalLine::from_pin_code()`](fn@crate::ExternalLine::from_pin_code)).
pub struct PinBinding<CE, CS, IRQ> {
    /// The radio's Chip Enable pin.
    pub ce: CE,
    /// The radio's Chip Select (CSN) pin. Active low.
    pub cs: CS,
    /// The radio's IRQ pin. Active low.
    pub irq: IRQ,
    pub irq_pin_code: u32,
}

impl<CE, CS, IRQ> PinBinding<CE, CS, IRQ> {
    pub fn new(ce: CE, cs: CS, irq: IRQ, irq_pin_code: u32) -> Self {
        Self {
            ce,
            cs,
            irq,
            irq_pin_code,
        }
    }
}

/// A handle describing who a payload is exchanged with.
///
/// Only a configured radio hands these out
/// (see [`EsbConfigure`](trait@crate::radio::prelude::EsbConfigure)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadChannel {
    role: DeviceRole,
    peer_address: u64,
}

impl PayloadChannel {
    pub(crate) const fn new(role: DeviceRole, peer_address: u64) -> Self {
        Self { role, peer_address }
    }

    pub const fn role(&self) -> DeviceRole {
        self.role
    }

    /// The address of the receiving node. This is `0` for a [`DeviceRole::Receiver`].
    pub const fn peer_address(&self) -> u64 {
        self.peer_address
    }

    /// Retarget a transmitter's channel at a different receiving node.
    ///
    /// Returns `None` for a receiver's channel or for an address that is zero or
    /// wider than 40 bits.
    pub fn with_peer_address(self, address: u64) -> Option<Self> {
        if self.role != DeviceRole::Transmitter || address == 0 || address > ADDRESS_MASK {
            return None;
        }
        Some(Self {
            peer_address: address,
            ..self
        })
    }
}

/// The RX addresses of the 6 data pipes.
///
/// A pipe is enabled when its address is not `0`.
/// Pipes 0 and 1 take a full 5 byte address. Pipes 2 - 5 only take a single byte;
/// the other 4 bytes are borrowed from pipe 1.
/// ```
/// use rf24_irq::radio::PipeTable;
///
/// let pipes = PipeTable::default()
///     .with_address(1, 0xC2C2C2C2C2)
///     .with_address(2, 0xC3);
/// assert_eq!(pipes.effective_address(2), 0xC2C2C2C2C3);
/// assert_eq!(pipes.enabled_mask(), 0b110);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipeTable {
    addresses: [u64; 6],
}

impl PipeTable {
    /// Set the address of a `pipe`. Out of range pipes are ignored.
    ///
    /// Use `0` to disable a pipe.
    pub fn with_address(self, pipe: u8, address: u64) -> Self {
        let mut addresses = self.addresses;
        match pipe {
            0 | 1 => addresses[pipe as usize] = address & ADDRESS_MASK,
            2..=5 => addresses[pipe as usize] = address & 0xFF,
            _ => (),
        }
        Self { addresses }
    }

    /// The address as it was set with [`PipeTable::with_address()`].
    pub fn address(&self, pipe: u8) -> u64 {
        self.addresses.get(pipe as usize).copied().unwrap_or_default()
    }

    /// The 40 bit address a pipe will actually answer to.
    pub fn effective_address(&self, pipe: u8) -> u64 {
        match pipe {
            0 | 1 => self.addresses[pipe as usize],
            2..=5 => (self.addresses[1] & !0xFF) | self.addresses[pipe as usize],
            _ => 0,
        }
    }

    /// A bit mask of pipes whose address is not zero.
    pub fn enabled_mask(&self) -> u8 {
        self.addresses
            .iter()
            .enumerate()
            .filter(|(_, address)| **address != 0)
            .fold(0, |mask, (pipe, _)| mask | (1 << pipe))
    }

    pub fn is_enabled(&self, pipe: u8) -> bool {
        self.address(pipe) != 0
    }
}

/// The RF settings common to both roles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RfSettings {
    pub(crate) channel: u8,
    pub(crate) pa_level: PaLevel,
    pub(crate) data_rate: DataRate,
    pub(crate) auto_ack: bool,
    pub(crate) irq_priority: u8,
    pub(crate) irq_sub_priority: u8,
}

impl Default for RfSettings {
    fn default() -> Self {
        Self {
            channel: 76,
            pa_level: PaLevel::Max,
            data_rate: DataRate::Mbps1,
            auto_ack: true,
            irq_priority: 1,
            irq_sub_priority: 1,
        }
    }
}

impl RfSettings {
    const MAX_CHANNEL: u8 = 125;

    fn with_channel(self, channel: u8) -> Self {
        Self {
            channel: channel.min(Self::MAX_CHANNEL),
            ..self
        }
    }
}

/// An object to configure the radio as a primary transmitter.
///
/// This struct follows a builder pattern. Start with [`TransmitterConfig::default()`]
/// and mutate the object accordingly.
/// ```
/// use rf24_irq::{radio::TransmitterConfig, DataRate};
///
/// let config = TransmitterConfig::default()
///     .with_channel(42)
///     .with_data_rate(DataRate::Mbps2)
///     .with_peer_address(0xB3B4B5B601);
/// assert_eq!(config.channel(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransmitterConfig {
    pub(crate) rf: RfSettings,
    retry_delay: u8,
    retry_count: u8,
    peer_address: u64,
}

impl Default for TransmitterConfig {
    /// Instantiate a [`TransmitterConfig`] object with library defaults.
    ///
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`TransmitterConfig::channel()`] | `76` |
    /// | [`TransmitterConfig::pa_level()`] | [`PaLevel::Max`] |
    /// | [`TransmitterConfig::data_rate()`] | [`DataRate::Mbps1`] |
    /// | [`TransmitterConfig::auto_ack()`] | `true` |
    /// | [`TransmitterConfig::retry_delay()`] | `5` |
    /// | [`TransmitterConfig::retry_count()`] | `15` |
    /// | [`TransmitterConfig::peer_address()`] | `0xE7E7E7E7E7` |
    /// | [`TransmitterConfig::irq_priority()`] | `(1, 1)` |
    fn default() -> Self {
        Self {
            rf: RfSettings::default(),
            retry_delay: 5,
            retry_count: 15,
            peer_address: 0xE7E7E7E7E7,
        }
    }
}

impl TransmitterConfig {
    pub const fn channel(&self) -> u8 {
        self.rf.channel
    }

    /// Set the RF channel. Values over 125 are clamped to 125.
    pub fn with_channel(self, channel: u8) -> Self {
        Self {
            rf: self.rf.with_channel(channel),
            ..self
        }
    }

    pub const fn pa_level(&self) -> PaLevel {
        self.rf.pa_level
    }

    pub fn with_pa_level(self, pa_level: PaLevel) -> Self {
        Self {
            rf: RfSettings {
                pa_level,
                ..self.rf
            },
            ..self
        }
    }

    pub const fn data_rate(&self) -> DataRate {
        self.rf.data_rate
    }

    pub fn with_data_rate(self, data_rate: DataRate) -> Self {
        Self {
            rf: RfSettings {
                data_rate,
                ..self.rf
            },
            ..self
        }
    }

    /// Is auto-acknowledgement (with ACK payloads) enabled?
    pub const fn auto_ack(&self) -> bool {
        self.rf.auto_ack
    }

    pub fn with_auto_ack(self, auto_ack: bool) -> Self {
        Self {
            rf: RfSettings {
                auto_ack,
                ..self.rf
            },
            ..self
        }
    }

    /// The auto-retry delay in steps of 250 microseconds.
    pub const fn retry_delay(&self) -> u8 {
        self.retry_delay
    }

    pub const fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Set the auto-retry `delay` and `count`. Both are clamped to 15.
    pub fn with_auto_retries(self, delay: u8, count: u8) -> Self {
        Self {
            retry_delay: delay.min(15),
            retry_count: count.min(15),
            ..self
        }
    }

    pub const fn peer_address(&self) -> u64 {
        self.peer_address
    }

    /// Set the address of the receiving node.
    ///
    /// This must be non-zero and fit in 40 bits, otherwise configuration fails.
    pub fn with_peer_address(self, peer_address: u64) -> Self {
        Self {
            peer_address,
            ..self
        }
    }

    /// The interrupt controller's `(priority, sub_priority)` for the IRQ line.
    pub const fn irq_priority(&self) -> (u8, u8) {
        (self.rf.irq_priority, self.rf.irq_sub_priority)
    }

    pub fn with_irq_priority(self, priority: u8, sub_priority: u8) -> Self {
        Self {
            rf: RfSettings {
                irq_priority: priority,
                irq_sub_priority: sub_priority,
                ..self.rf
            },
            ..self
        }
    }
}

/// An object to configure the radio as a primary receiver.
///
/// ```
/// use rf24_irq::radio::{PipeTable, ReceiverConfig};
///
/// let config = ReceiverConfig::default().with_pipes(
///     PipeTable::default()
///         .with_address(0, 0xE7E7E7E7E7)
///         .with_address(3, 0xC4),
/// );
/// assert_eq!(config.pipes().enabled_mask(), 0b1001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiverConfig {
    pub(crate) rf: RfSettings,
    pipes: PipeTable,
}

impl Default for ReceiverConfig {
    /// Instantiate a [`ReceiverConfig`] object with library defaults.
    ///
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`ReceiverConfig::channel()`] | `76` |
    /// | [`ReceiverConfig::pa_level()`] | [`PaLevel::Max`] |
    /// | [`ReceiverConfig::data_rate()`] | [`DataRate::Mbps1`] |
    /// | [`ReceiverConfig::auto_ack()`] | `true` |
    /// | [`ReceiverConfig::pipes()`] | pipe 0 open at `0xE7E7E7E7E7` |
    /// | [`ReceiverConfig::irq_priority()`] | `(1, 1)` |
    fn default() -> Self {
        Self {
            rf: RfSettings::default(),
            pipes: PipeTable::default().with_address(0, 0xE7E7E7E7E7),
        }
    }
}

impl ReceiverConfig {
    pub const fn channel(&self) -> u8 {
        self.rf.channel
    }

    /// Set the RF channel. Values over 125 are clamped to 125.
    pub fn with_channel(self, channel: u8) -> Self {
        Self {
            rf: self.rf.with_channel(channel),
            ..self
        }
    }

    pub const fn pa_level(&self) -> PaLevel {
        self.rf.pa_level
    }

    pub fn with_pa_level(self, pa_level: PaLevel) -> Self {
        Self {
            rf: RfSettings {
                pa_level,
                ..self.rf
            },
            ..self
        }
    }

    pub const fn data_rate(&self) -> DataRate {
        self.rf.data_rate
    }

    pub fn with_data_rate(self, data_rate: DataRate) -> Self {
        Self {
            rf: RfSettings {
                data_rate,
                ..self.rf
            },
            ..self
        }
    }

    pub const fn auto_ack(&self) -> bool {
        self.rf.auto_ack
    }

    /// Enable auto-acknowledgement (with ACK payloads) on all enabled pipes.
    pub fn with_auto_ack(self, auto_ack: bool) -> Self {
        Self {
            rf: RfSettings {
                auto_ack,
                ..self.rf
            },
            ..self
        }
    }

    pub const fn pipes(&self) -> &PipeTable {
        &self.pipes
    }

    pub fn with_pipes(self, pipes: PipeTable) -> Self {
        Self { pipes, ..self }
    }

    pub const fn irq_priority(&self) -> (u8, u8) {
        (self.rf.irq_priority, self.rf.irq_sub_priority)
    }

    pub fn with_irq_priority(self, priority: u8, sub_priority: u8) -> Self {
        Self {
            rf: RfSettings {
                irq_priority: priority,
                irq_sub_priority: sub_priority,
                ..self.rf
            },
            ..self
        }
    }
}
