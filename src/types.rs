//! This module defines types used by various traits.
//! These types are meant to be agnostic of the trait implementation.

use core::{
    fmt::{Display, Formatter, Result},
    write,
};

use bitfield_struct::bitfield;

/// The largest payload (in bytes) the transceiver can carry in one packet.
pub const MAX_PAYLOAD_LEN: usize = 32;

/// A payload received from the air (either as ACK payload or as RX payload).
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD_LEN>;

/// The role a radio takes on when it is configured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceRole {
    /// Primary transmitter (PTX).
    Transmitter,
    /// Primary receiver (PRX).
    Receiver,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceRole {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DeviceRole::Transmitter => defmt::write!(fmt, "Transmitter"),
            DeviceRole::Receiver => defmt::write!(fmt, "Receiver"),
        }
    }
}

impl Display for DeviceRole {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            DeviceRole::Transmitter => write!(f, "Transmitter"),
            DeviceRole::Receiver => write!(f, "Receiver"),
        }
    }
}

/// Power Amplifier level. The units dBm (decibel-milliwatts or dB<sub>mW</sub>)
/// represents a logarithmic signal loss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaLevel {
    /// -18 dBm
    Min,
    /// -12 dBm
    Low,
    /// -6 dBm
    High,
    /// 0 dBm
    Max,
}

#[cfg(feature = "defmt")]
impl defmt::Format for PaLevel {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PaLevel::Min => defmt::write!(fmt, "Min"),
            PaLevel::Low => defmt::write!(fmt, "Low"),
            PaLevel::High => defmt::write!(fmt, "High"),
            PaLevel::Max => defmt::write!(fmt, "Max"),
        }
    }
}

impl PaLevel {
    pub(crate) const MASK: u8 = 6;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            PaLevel::Min => 0,
            PaLevel::Low => 2,
            PaLevel::High => 4,
            PaLevel::Max => 6,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0 => PaLevel::Min,
            2 => PaLevel::Low,
            4 => PaLevel::High,
            _ => PaLevel::Max,
        }
    }
}

impl Display for PaLevel {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            PaLevel::Min => write!(f, "Min"),
            PaLevel::Low => write!(f, "Low"),
            PaLevel::High => write!(f, "High"),
            PaLevel::Max => write!(f, "Max"),
        }
    }
}

/// How fast data moves through the air. Units are in bits per second (bps).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DataRate {
    /// represents 1 Mbps
    Mbps1,
    /// represents 2 Mbps
    Mbps2,
    /// represents 250 Kbps
    Kbps250,
}

impl DataRate {
    pub(crate) const MASK: u8 = 0x28;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            DataRate::Mbps1 => 0,
            DataRate::Mbps2 => 0x8,
            DataRate::Kbps250 => 0x20,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0x8 => DataRate::Mbps2,
            0x20 => DataRate::Kbps250,
            _ => DataRate::Mbps1,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DataRate {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DataRate::Mbps1 => defmt::write!(fmt, "1 Mbps"),
            DataRate::Mbps2 => defmt::write!(fmt, "2 Mbps"),
            DataRate::Kbps250 => defmt::write!(fmt, "250 Kbps"),
        }
    }
}

impl Display for DataRate {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            DataRate::Mbps1 => write!(f, "1 Mbps"),
            DataRate::Mbps2 => write!(f, "2 Mbps"),
            DataRate::Kbps250 => write!(f, "250 Kbps"),
        }
    }
}

/// The raw STATUS byte as returned with every SPI transaction.
///
/// Use [`StatusFlags::default`] to instantiate all flags set to false.
#[bitfield(u8, new = false, order = Msb)]
pub struct StatusFlags {
    #[bits(1)]
    _padding: u8,

    /// A flag to describe if RX Data Ready to read.
    #[bits(1, access = RO)]
    pub rx_dr: bool,

    /// A flag to describe if TX Data Sent.
    #[bits(1, access = RO)]
    pub tx_ds: bool,

    /// A flag to describe if the maximum number of retransmits was reached.
    #[bits(1, access = RO)]
    pub max_rt: bool,

    /// The pipe number of the payload at the top of the RX FIFO.
    ///
    /// `6` is unused and `7` means the RX FIFO is empty.
    #[bits(3, access = RO)]
    pub rx_pipe: u8,

    /// A flag to describe if the TX FIFO is full.
    #[bits(1, access = RO)]
    pub tx_full: bool,
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "StatusFlags rx_dr: {}, tx_ds: {}, max_rt: {}, rx_pipe: {}",
            self.rx_dr(),
            self.tx_ds(),
            self.max_rt(),
            self.rx_pipe()
        )
    }
}

impl StatusFlags {
    /// A mask to isolate only the IRQ flags. Writing it to STATUS clears them all.
    pub(crate) const IRQ_MASK: u8 = 0x70;

    /// The pipe index of the payload that raised the IRQ, if any.
    pub fn rx_pipe_index(&self) -> Option<u8> {
        match self.rx_pipe() {
            pipe @ 0..=5 => Some(pipe),
            _ => None,
        }
    }
}

impl Display for StatusFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "StatusFlags rx_dr: {}, tx_ds: {}, max_rt: {}, rx_pipe: {}",
            self.rx_dr(),
            self.tx_ds(),
            self.max_rt(),
            self.rx_pipe()
        )
    }
}

/// The outcome of the last operation, as derived from the IRQ bits of the STATUS byte.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusFlag {
    /// Nothing was captured (or it was already read).
    NoStatus,
    /// No IRQ flag was set, or the transmission timed out.
    NoResponse,
    /// The packet was retransmitted the maximum number of times without an ACK.
    MaxRetransmits,
    /// The packet was sent (and acknowledged, if auto-ack is enabled).
    SendComplete,
    /// A payload is waiting in the RX FIFO.
    DataReady,
    /// A payload is waiting in the RX FIFO and the TX FIFO was sent.
    AckPayloadReady,
}

impl StatusFlag {
    /// Decode a raw STATUS byte.
    ///
    /// Only bits 4 - 6 are considered. A set MAX_RT bit together with
    /// both RX_DR and TX_DS (`0x70`) decodes as [`StatusFlag::AckPayloadReady`].
    pub const fn from_status(status: u8) -> Self {
        match status & StatusFlags::IRQ_MASK {
            0x70 => StatusFlag::AckPayloadReady,
            0x40 | 0x50 | 0x60 => StatusFlag::DataReady,
            0x20 | 0x30 => StatusFlag::SendComplete,
            0x10 => StatusFlag::MaxRetransmits,
            _ => StatusFlag::NoResponse,
        }
    }

    /// Is there a payload waiting to be read from the RX FIFO?
    ///
    /// A transmitter only gets RX_DR asserted by an ACK payload, so
    /// [`StatusFlag::DataReady`] counts here as well.
    pub const fn carries_payload(&self) -> bool {
        matches!(self, StatusFlag::DataReady | StatusFlag::AckPayloadReady)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlag {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            StatusFlag::NoStatus => defmt::write!(fmt, "NoStatus"),
            StatusFlag::NoResponse => defmt::write!(fmt, "NoResponse"),
            StatusFlag::MaxRetransmits => defmt::write!(fmt, "MaxRetransmits"),
            StatusFlag::SendComplete => defmt::write!(fmt, "SendComplete"),
            StatusFlag::DataReady => defmt::write!(fmt, "DataReady"),
            StatusFlag::AckPayloadReady => defmt::write!(fmt, "AckPayloadReady"),
        }
    }
}

impl Display for StatusFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            StatusFlag::NoStatus => write!(f, "NoStatus"),
            StatusFlag::NoResponse => write!(f, "NoResponse"),
            StatusFlag::MaxRetransmits => write!(f, "MaxRetransmits"),
            StatusFlag::SendComplete => write!(f, "SendComplete"),
            StatusFlag::DataReady => write!(f, "DataReady"),
            StatusFlag::AckPayloadReady => write!(f, "AckPayloadReady"),
        }
    }
}

/// The points at which a user handler may be invoked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CallbackSlot {
    /// A payload was copied into the payload buffer while listening.
    RxPayloadReceived,
    /// A transmission finished (with or without an ACK payload).
    TxAckPayloadReceived,
    /// The payload was loaded and CE was pulsed.
    TxStarted,
    /// An asynchronous transmission got no IRQ within its time budget.
    TxTimeout,
}

impl CallbackSlot {
    pub(crate) const COUNT: usize = 4;

    pub(crate) const fn index(self) -> usize {
        match self {
            CallbackSlot::RxPayloadReceived => 0,
            CallbackSlot::TxAckPayloadReceived => 1,
            CallbackSlot::TxStarted => 2,
            CallbackSlot::TxTimeout => 3,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CallbackSlot {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CallbackSlot::RxPayloadReceived => defmt::write!(fmt, "RxPayloadReceived"),
            CallbackSlot::TxAckPayloadReceived => defmt::write!(fmt, "TxAckPayloadReceived"),
            CallbackSlot::TxStarted => defmt::write!(fmt, "TxStarted"),
            CallbackSlot::TxTimeout => defmt::write!(fmt, "TxTimeout"),
        }
    }
}

/// The external interrupt lines an IRQ pin can be routed to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExternalLine {
    Int0,
    Int1,
    Int2,
    Int3,
    Int4,
}

impl ExternalLine {
    /// Find the external interrupt line wired to the given platform pin code.
    ///
    /// Only the low byte of `pin_code` is significant.
    pub const fn from_pin_code(pin_code: u32) -> Option<Self> {
        match pin_code & 0xFF {
            0xFF => Some(ExternalLine::Int0),
            0x04 => Some(ExternalLine::Int1),
            0x08 => Some(ExternalLine::Int2),
            0x0C => Some(ExternalLine::Int3),
            0x10 => Some(ExternalLine::Int4),
            _ => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ExternalLine {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ExternalLine::Int0 => defmt::write!(fmt, "INT0"),
            ExternalLine::Int1 => defmt::write!(fmt, "INT1"),
            ExternalLine::Int2 => defmt::write!(fmt, "INT2"),
            ExternalLine::Int3 => defmt::write!(fmt, "INT3"),
            ExternalLine::Int4 => defmt::write!(fmt, "INT4"),
        }
    }
}

impl Display for ExternalLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ExternalLine::Int0 => write!(f, "INT0"),
            ExternalLine::Int1 => write!(f, "INT1"),
            ExternalLine::Int2 => write!(f, "INT2"),
            ExternalLine::Int3 => write!(f, "INT3"),
            ExternalLine::Int4 => write!(f, "INT4"),
        }
    }
}

/// The signal edge that triggers an external interrupt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Rising,
    Falling,
}

#[cfg(test)]
mod test {
    use super::{DataRate, DeviceRole, ExternalLine, PaLevel, StatusFlag, StatusFlags};
    extern crate std;
    use std::{format, string::String};

    #[test]
    fn status_masking() {
        assert_eq!(StatusFlag::from_status(0x70), StatusFlag::AckPayloadReady);
        assert_eq!(StatusFlag::from_status(0x60), StatusFlag::DataReady);
        assert_eq!(StatusFlag::from_status(0x20), StatusFlag::SendComplete);
        assert_eq!(StatusFlag::from_status(0x10), StatusFlag::MaxRetransmits);
        assert_eq!(StatusFlag::from_status(0x00), StatusFlag::NoResponse);
        // pipe number and TX_FULL bits are ignored
        assert_eq!(StatusFlag::from_status(0x2F), StatusFlag::SendComplete);
        assert_eq!(StatusFlag::from_status(0x4E), StatusFlag::DataReady);
    }

    #[test]
    fn payload_carrying_flags() {
        assert!(StatusFlag::AckPayloadReady.carries_payload());
        assert!(StatusFlag::DataReady.carries_payload());
        assert!(!StatusFlag::SendComplete.carries_payload());
        assert!(!StatusFlag::NoStatus.carries_payload());
    }

    #[test]
    fn status_rx_pipe() {
        let flags = StatusFlags::from_bits(0x46);
        assert!(flags.rx_dr());
        assert!(!flags.tx_ds());
        assert_eq!(flags.rx_pipe(), 3);
        assert_eq!(flags.rx_pipe_index(), Some(3));
        assert_eq!(StatusFlags::from_bits(0x0E).rx_pipe_index(), None);
        assert!(StatusFlags::from_bits(0x01).tx_full());
    }

    #[test]
    fn display_status_flags() {
        let flags = StatusFlags::from_bits(0x32);
        assert_eq!(
            format!("{flags}"),
            String::from("StatusFlags rx_dr: false, tx_ds: true, max_rt: true, rx_pipe: 1")
        );
    }

    #[test]
    fn interrupt_lines() {
        assert_eq!(ExternalLine::from_pin_code(0xFF), Some(ExternalLine::Int0));
        assert_eq!(ExternalLine::from_pin_code(0x0304), Some(ExternalLine::Int1));
        assert_eq!(ExternalLine::from_pin_code(0x08), Some(ExternalLine::Int2));
        assert_eq!(ExternalLine::from_pin_code(0x0C), Some(ExternalLine::Int3));
        assert_eq!(ExternalLine::from_pin_code(0x10), Some(ExternalLine::Int4));
        assert_eq!(ExternalLine::from_pin_code(0x05), None);
        assert_eq!(format!("{}", ExternalLine::Int3), String::from("INT3"));
    }

    #[test]
    fn pa_level_bits() {
        for level in [PaLevel::Min, PaLevel::Low, PaLevel::High, PaLevel::Max] {
            assert_eq!(PaLevel::from_bits(level.into_bits()), level);
        }
        assert_eq!(format!("{}", PaLevel::High), String::from("High"));
    }

    #[test]
    fn data_rate_bits() {
        for rate in [DataRate::Mbps1, DataRate::Mbps2, DataRate::Kbps250] {
            assert_eq!(DataRate::from_bits(rate.into_bits()), rate);
        }
        assert_eq!(format!("{}", DataRate::Kbps250), String::from("250 Kbps"));
    }

    #[test]
    fn display_role() {
        assert_eq!(
            format!("{}", DeviceRole::Transmitter),
            String::from("Transmitter")
        );
        assert_eq!(format!("{}", DeviceRole::Receiver), String::from("Receiver"));
    }
}
