use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, ErrorKind, InputPin, OutputPin},
};

pub(crate) mod bit_fields;
mod callbacks;
mod constants;
mod context;
mod details;
mod events;
mod init;
mod receive;
pub(crate) mod register_map;
mod status;
mod transmit;
pub use constants::{commands, mnemonics, registers};

use super::{
    prelude::{FreeRunningCounter, InterruptController, SpiCompletion},
    PinBinding,
};
use crate::{DeviceRole, ExternalLine, StatusFlags, MAX_PAYLOAD_LEN};
use callbacks::CallbackTable;
use context::{BusStep, OperationContext};

/// A transient failure of the SPI bus or of one of the pins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusError<SPI> {
    /// Represents a SPI transaction error.
    Spi(SPI),
    /// Represents an error driving (or sampling) one of the radio's pins.
    Pin(ErrorKind),
}

#[cfg(feature = "defmt")]
impl<SPI: defmt::Format> defmt::Format for BusError<SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            BusError::Spi(err) => defmt::write!(fmt, "Spi({})", err),
            BusError::Pin(kind) => defmt::write!(fmt, "Pin({})", defmt::Debug2Format(kind)),
        }
    }
}

/// Errors returned when configuring the radio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError<SPI> {
    Bus(BusError<SPI>),
    /// The radio answered the power-up command with an empty (or floating) STATUS byte.
    DeviceUnresponsive,
    /// A receiver needs at least one pipe with a non-zero address.
    NoPipesEnabled,
    /// The IRQ pin code does not map to an external interrupt line.
    UnrecognizedInterruptPin,
    /// The transmitter's peer address is zero or wider than 40 bits.
    InvalidPeerAddress,
    /// An asynchronous operation has not completed yet.
    OperationInProgress,
}

#[cfg(feature = "defmt")]
impl<SPI: defmt::Format> defmt::Format for ConfigError<SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ConfigError::Bus(err) => defmt::write!(fmt, "Bus({})", err),
            ConfigError::DeviceUnresponsive => defmt::write!(fmt, "DeviceUnresponsive"),
            ConfigError::NoPipesEnabled => defmt::write!(fmt, "NoPipesEnabled"),
            ConfigError::UnrecognizedInterruptPin => {
                defmt::write!(fmt, "UnrecognizedInterruptPin")
            }
            ConfigError::InvalidPeerAddress => defmt::write!(fmt, "InvalidPeerAddress"),
            ConfigError::OperationInProgress => defmt::write!(fmt, "OperationInProgress"),
        }
    }
}

impl<SPI> From<BusError<SPI>> for ConfigError<SPI> {
    fn from(err: BusError<SPI>) -> Self {
        ConfigError::Bus(err)
    }
}

/// Errors returned when sending a payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SendError<SPI> {
    Bus(BusError<SPI>),
    /// The radio did not assert its IRQ pin within 30 milliseconds.
    NoResponse,
    /// The payload was not acknowledged (maximum retransmits reached).
    LinkFailed,
    /// The radio (or the channel) is not configured as transmitter.
    NotTransmitter,
    /// An asynchronous operation has not completed yet.
    Busy,
}

#[cfg(feature = "defmt")]
impl<SPI: defmt::Format> defmt::Format for SendError<SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SendError::Bus(err) => defmt::write!(fmt, "Bus({})", err),
            SendError::NoResponse => defmt::write!(fmt, "NoResponse"),
            SendError::LinkFailed => defmt::write!(fmt, "LinkFailed"),
            SendError::NotTransmitter => defmt::write!(fmt, "NotTransmitter"),
            SendError::Busy => defmt::write!(fmt, "Busy"),
        }
    }
}

impl<SPI> From<BusError<SPI>> for SendError<SPI> {
    fn from(err: BusError<SPI>) -> Self {
        SendError::Bus(err)
    }
}

/// Errors returned when loading an ACK payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StoreError<SPI> {
    Bus(BusError<SPI>),
    /// Only pipes 0 - 5 exist.
    InvalidPipe,
    /// The radio (or the channel) is not configured as receiver.
    NotReceiver,
    /// The previous ACK payload is still being loaded.
    Busy,
}

#[cfg(feature = "defmt")]
impl<SPI: defmt::Format> defmt::Format for StoreError<SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            StoreError::Bus(err) => defmt::write!(fmt, "Bus({})", err),
            StoreError::InvalidPipe => defmt::write!(fmt, "InvalidPipe"),
            StoreError::NotReceiver => defmt::write!(fmt, "NotReceiver"),
            StoreError::Busy => defmt::write!(fmt, "Busy"),
        }
    }
}

impl<SPI> From<BusError<SPI>> for StoreError<SPI> {
    fn from(err: BusError<SPI>) -> Self {
        StoreError::Bus(err)
    }
}

/// Errors returned when starting or stopping reception.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReceiveError<SPI> {
    Bus(BusError<SPI>),
    /// The radio (or the channel) is not configured as receiver.
    NotReceiver,
}

#[cfg(feature = "defmt")]
impl<SPI: defmt::Format> defmt::Format for ReceiveError<SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ReceiveError::Bus(err) => defmt::write!(fmt, "Bus({})", err),
            ReceiveError::NotReceiver => defmt::write!(fmt, "NotReceiver"),
        }
    }
}

impl<SPI> From<BusError<SPI>> for ReceiveError<SPI> {
    fn from(err: BusError<SPI>) -> Self {
        ReceiveError::Bus(err)
    }
}

/// This struct implements the [`Esb*` traits](mod@crate::radio::prelude)
/// for the nRF24L01+ transceiver.
///
/// The radio owns its SPI bus, its pins, the interrupt controller (to manage
/// the IRQ pin's external interrupt line), a free-running counter (to time
/// [`send_blocking()`](fn@crate::radio::prelude::EsbTransmit::send_blocking))
/// and a delay implementation.
pub struct Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY> {
    _spi: SPI,
    pins: PinBinding<CE, CS, IRQ>,
    _intc: INTC,
    _counter: CNT,
    _delay_impl: DELAY,
    _buf: [u8; MAX_PAYLOAD_LEN + 1],
    _status: StatusFlags,
    role: Option<DeviceRole>,
    line: Option<ExternalLine>,
    /// The effective address of each pipe (receiver only).
    pipe_addresses: [u64; 6],
    ctx: OperationContext,
    callbacks: CallbackTable,
}

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
    /// Instantiate an [`Nrf24`] object for use on the specified `spi` bus
    /// with the given `pins`.
    ///
    /// Nothing is sent to the radio until it is configured
    /// (see [`EsbConfigure`](trait@crate::radio::prelude::EsbConfigure)).
    pub fn new(
        spi: SPI,
        pins: PinBinding<CE, CS, IRQ>,
        intc: INTC,
        counter: CNT,
        delay_impl: DELAY,
    ) -> Nrf24<SPI, CE, CS, IRQ, INTC, CNT, DELAY> {
        Nrf24 {
            _spi: spi,
            pins,
            _intc: intc,
            _counter: counter,
            _delay_impl: delay_impl,
            _buf: [0u8; MAX_PAYLOAD_LEN + 1],
            _status: StatusFlags::from_bits(0),
            role: None,
            line: None,
            pipe_addresses: [0; 6],
            ctx: OperationContext::default(),
            callbacks: CallbackTable::default(),
        }
    }

    /// The role the radio was last configured for.
    pub fn role(&self) -> Option<DeviceRole> {
        self.role
    }

    /// Release the bus, pins and other peripherals.
    pub fn free(self) -> (SPI, PinBinding<CE, CS, IRQ>, INTC, CNT, DELAY) {
        (
            self._spi,
            self.pins,
            self._intc,
            self._counter,
            self._delay_impl,
        )
    }

    fn spi_transfer(&mut self, len: usize) -> Result<(), BusError<SPI::Error>> {
        self._spi
            .transfer_in_place(&mut self._buf[..len])
            .map_err(BusError::Spi)?;
        self._spi.flush().map_err(BusError::Spi)?;
        self._status = StatusFlags::from_bits(self._buf[0]);
        Ok(())
    }

    /// This is also used to write SPI commands that consist of 1 byte:
    /// ```ignore
    /// self.spi_read(0, commands::NOP)?;
    /// // STATUS register is now stored in self._status
    /// ```
    fn spi_read(&mut self, len: usize, command: u8) -> Result<(), BusError<SPI::Error>> {
        self._buf[0] = command;
        self._buf[1..=len].fill(0);
        self.spi_transfer(len + 1)
    }

    fn spi_write_byte(&mut self, register: u8, byte: u8) -> Result<(), BusError<SPI::Error>> {
        self._buf[0] = commands::write_register(register);
        self._buf[1] = byte;
        self.spi_transfer(2)
    }

    /// Unlike [`Nrf24::spi_write_byte()`], `command` is sent as is.
    fn spi_write_buf(&mut self, command: u8, buf: &[u8]) -> Result<(), BusError<SPI::Error>> {
        let len = self.load_buf(command, buf);
        self.spi_transfer(len)
    }

    /// Put `command` and `buf` (truncated to 32 bytes) in the transfer buffer.
    /// Returns the number of bytes to transfer.
    fn load_buf(&mut self, command: u8, buf: &[u8]) -> usize {
        let len = buf.len().min(MAX_PAYLOAD_LEN);
        self._buf[0] = command;
        self._buf[1..=len].copy_from_slice(&buf[..len]);
        len + 1
    }

    /// Start a background transfer of the first `len` bytes in the transfer buffer.
    /// `step` runs when [`EsbEvents::on_bus_complete()`] is called.
    ///
    /// [`EsbEvents::on_bus_complete()`]: fn@crate::radio::prelude::EsbEvents::on_bus_complete
    fn spi_start(&mut self, len: usize, step: BusStep) -> Result<(), BusError<SPI::Error>> {
        self._spi
            .start_transfer(&self._buf[..len])
            .map_err(BusError::Spi)?;
        self.ctx.bus_step = step;
        self.ctx.bus_watchdog = 0;
        Ok(())
    }

    /// Fetch the result of a background transfer of `len` bytes.
    fn spi_finish(&mut self, len: usize) -> Result<(), BusError<SPI::Error>> {
        self._spi
            .read_completed(&mut self._buf[..len])
            .map_err(BusError::Spi)?;
        self._status = StatusFlags::from_bits(self._buf[0]);
        Ok(())
    }

    /// Write `width` bytes of `address` (LSB first) to `register`.
    fn write_address(
        &mut self,
        register: u8,
        address: u64,
        width: usize,
    ) -> Result<(), BusError<SPI::Error>> {
        let bytes = address.to_le_bytes();
        self.spi_write_buf(commands::write_register(register), &bytes[..width])
    }

    /// Clear all IRQ flags.
    ///
    /// The STATUS byte as it was before clearing is left in `self._status`.
    fn clear_status(&mut self) -> Result<(), BusError<SPI::Error>> {
        self.spi_write_byte(registers::STATUS, StatusFlags::IRQ_MASK)
    }

    fn read_payload_width(&mut self) -> Result<u8, BusError<SPI::Error>> {
        self.spi_read(1, commands::R_RX_PL_WID)?;
        Ok(self._buf[1].min(MAX_PAYLOAD_LEN as u8))
    }

    fn cs_assert(&mut self) -> Result<(), BusError<SPI::Error>> {
        self.pins.cs.set_low().map_err(|e| BusError::Pin(e.kind()))
    }

    fn cs_release(&mut self) -> Result<(), BusError<SPI::Error>> {
        self.pins.cs.set_high().map_err(|e| BusError::Pin(e.kind()))
    }

    fn ce(&mut self, high: bool) -> Result<(), BusError<SPI::Error>> {
        let result = if high {
            self.pins.ce.set_high()
        } else {
            self.pins.ce.set_low()
        };
        result.map_err(|e| BusError::Pin(e.kind()))
    }

    /// Trigger one transmission of the TX FIFO's top payload.
    fn pulse_ce(&mut self) -> Result<(), BusError<SPI::Error>> {
        self.ce(false)?;
        self.ce(true)?;
        // a minimum of 10 us
        self._delay_impl.delay_us(15);
        self.ce(false)
    }

    /// Flush the RX FIFO.
    ///
    /// This is meant for a receiver that wants to discard
    /// payloads it has not read yet.
    pub fn flush_rx(&mut self) -> Result<(), BusError<SPI::Error>> {
        self.spi_read(0, commands::FLUSH_RX)
    }

    /// Read the value of any `register` (for diagnostics).
    pub fn read_register(&mut self, register: u8) -> Result<u8, BusError<SPI::Error>> {
        self.spi_read(1, commands::read_register(register))?;
        Ok(self._buf[1])
    }

    /// Skip configuration in unit tests.
    #[cfg(test)]
    pub(crate) fn assume_configured(
        &mut self,
        role: DeviceRole,
        line: ExternalLine,
        pipe_addresses: [u64; 6],
    ) {
        self.role = Some(role);
        self.line = Some(line);
        self.pipe_addresses = pipe_addresses;
    }
}
