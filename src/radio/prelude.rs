//! This module defines the generic traits that may
//! need to imported to use radio implementations.
//!
//! Since rustc only compiles objects that are used,
//! it is convenient to import these traits with the `*` syntax.
//!
//! ```
//! use rf24_irq::radio::prelude::*;
//! ```
//!
//! The traits come in two groups:
//!
//! - Collaborators the platform provides: [`SpiCompletion`],
//!   [`InterruptController`] and [`FreeRunningCounter`].
//! - Operations the radio provides: [`EsbConfigure`], [`EsbTransmit`], [`EsbReceive`],
//!   [`EsbStatus`] and [`EsbEvents`].

use embedded_hal::spi::SpiBus;

use super::{PayloadChannel, ReceiverConfig, TransmitterConfig};
use crate::types::{CallbackSlot, Edge, ExternalLine, Payload, StatusFlag};

/// A SPI bus that can also run a transfer in the background.
///
/// The platform signals the end of a transfer started with
/// [`SpiCompletion::start_transfer()`] by calling
/// [`EsbEvents::on_bus_complete()`] (usually from the SPI/DMA interrupt).
pub trait SpiCompletion: SpiBus<u8> {
    /// Start clocking out `words` and return immediately.
    fn start_transfer(&mut self, words: &[u8]) -> Result<(), Self::Error>;

    /// Fetch the bytes clocked in during the last completed transfer.
    fn read_completed(&mut self, words: &mut [u8]) -> Result<(), Self::Error>;
}

/// The platform's external interrupt controller.
pub trait InterruptController {
    fn set_priority(&mut self, line: ExternalLine, priority: u8, sub_priority: u8);

    fn set_edge(&mut self, line: ExternalLine, edge: Edge);

    fn enable(&mut self, line: ExternalLine);

    fn disable(&mut self, line: ExternalLine);

    fn clear_pending(&mut self, line: ExternalLine);

    fn is_enabled(&self, line: ExternalLine) -> bool;

    fn is_pending(&self, line: ExternalLine) -> bool;
}

/// A hardware counter that keeps counting (and wraps around) on its own.
pub trait FreeRunningCounter {
    /// The current count.
    fn ticks(&mut self) -> u32;

    /// How many times per second [`FreeRunningCounter::ticks()`] increments.
    fn frequency_hz(&self) -> u32;
}

/// A trait to represent putting an ESB capable transceiver in a role.
pub trait EsbConfigure {
    type ConfigErrorType;

    /// Configure the radio as a primary transmitter.
    ///
    /// The returned [`PayloadChannel`] targets
    /// [`TransmitterConfig::peer_address()`].
    fn configure_transmitter(
        &mut self,
        config: &TransmitterConfig,
    ) -> Result<PayloadChannel, Self::ConfigErrorType>;

    /// Configure the radio as a primary receiver listening on the
    /// pipes enabled in [`ReceiverConfig::pipes()`].
    fn configure_receiver(
        &mut self,
        config: &ReceiverConfig,
    ) -> Result<PayloadChannel, Self::ConfigErrorType>;
}

/// A trait to represent transmitting payloads with an ESB capable transceiver.
pub trait EsbTransmit {
    type TransmitErrorType;

    /// Send a payload (truncated to 32 bytes) and wait for the outcome.
    ///
    /// This blocks for at most 30 milliseconds. The ACK payload is returned
    /// (empty if the receiver did not attach one).
    fn send_blocking(
        &mut self,
        channel: &PayloadChannel,
        payload: &[u8],
    ) -> Result<Payload, Self::TransmitErrorType>;

    /// Start sending a payload (truncated to 32 bytes) and return immediately.
    ///
    /// The outcome is available from [`EsbStatus::read_status()`] and the
    /// ACK payload (if any) from [`EsbStatus::take_payload()`] once the
    /// [`CallbackSlot::TxAckPayloadReceived`] (or [`CallbackSlot::TxTimeout`])
    /// callback was invoked.
    fn send_async(
        &mut self,
        channel: &PayloadChannel,
        payload: &[u8],
    ) -> Result<(), Self::TransmitErrorType>;
}

/// A trait to represent receiving payloads with an ESB capable transceiver.
pub trait EsbReceive {
    type ReceiveErrorType;
    type StoreErrorType;

    /// Start listening.
    ///
    /// If an ACK payload is still being loaded, listening starts as soon
    /// as loading completes.
    fn receive_async(&mut self, channel: &PayloadChannel) -> Result<(), Self::ReceiveErrorType>;

    /// Stop listening. Calling this when not listening is harmless.
    fn stop_receiving(&mut self, channel: &PayloadChannel) -> Result<(), Self::ReceiveErrorType>;

    /// Load a payload (truncated to 32 bytes) to be attached to the next ACK on `pipe`.
    fn store_ack_payload(
        &mut self,
        channel: &PayloadChannel,
        pipe: u8,
        payload: &[u8],
    ) -> Result<(), Self::StoreErrorType>;

    /// Is an ACK payload currently being loaded?
    fn is_rx_fifo_loading(&self) -> bool;
}

/// A trait to represent querying the outcome of operations.
pub trait EsbStatus {
    /// Get (and reset) the status captured by the last operation.
    ///
    /// This is [`StatusFlag::NoStatus`] while the radio's IRQ is still
    /// waiting to be serviced.
    fn read_status(&mut self) -> StatusFlag;

    /// Get (and forget) the address of the pipe that received the last payload.
    fn last_received_pipe_address(&mut self) -> Option<u64>;

    /// Take the payload received by the last asynchronous operation.
    fn take_payload(&mut self) -> Option<Payload>;
}

/// A trait to represent the events that drive asynchronous operations.
///
/// The platform forwards its interrupts to these functions.
pub trait EsbEvents {
    type EventErrorType;

    /// Call this when the IRQ pin's external interrupt fires.
    fn on_irq(&mut self) -> Result<(), Self::EventErrorType>;

    /// Call this when a transfer started with [`SpiCompletion::start_transfer()`] is done.
    fn on_bus_complete(&mut self) -> Result<(), Self::EventErrorType>;

    /// Call this from a periodic timer (about once every millisecond).
    fn on_tick(&mut self) -> Result<(), Self::EventErrorType>;

    /// Install a `handler` for the given `slot`, replacing any previous one.
    fn set_callback(&mut self, slot: CallbackSlot, handler: Callback);

    fn clear_callback(&mut self, slot: CallbackSlot);
}

/// A user handler. Handlers run in interrupt context.
pub type Callback = &'static (dyn Fn() + Sync);
