//! An interrupt-driven driver for the nRF24L01+ transceiver.
//!
//! The radio is configured once, either as primary transmitter or as primary
//! receiver, with dynamic payloads and (optionally) auto-acknowledgement with
//! ACK payloads. After that, every operation runs to completion in the background:
//! the platform forwards three interrupts to the driver and the driver chains
//! non-blocking SPI transfers from them.
//!
//! | platform interrupt | forward to |
//! |--------------------|------------|
//! | external interrupt of the radio's IRQ pin | [`EsbEvents::on_irq()`](fn@crate::radio::prelude::EsbEvents::on_irq) |
//! | SPI (or DMA) transfer complete | [`EsbEvents::on_bus_complete()`](fn@crate::radio::prelude::EsbEvents::on_bus_complete) |
//! | periodic timer (~1 ms) | [`EsbEvents::on_tick()`](fn@crate::radio::prelude::EsbEvents::on_tick) |
//!
//! With the `isr` feature (enabled by default), the [`radio::isr`] module keeps the radio in a
//! `critical_section::Mutex` so these handlers and the application can share it.
//!
//! ## Configuration API
//!
//! - [`Nrf24::new()`](fn@crate::radio::Nrf24::new)
//! - [`Nrf24::configure_transmitter()`](radio/struct.Nrf24.html#method.configure_transmitter)
//! - [`Nrf24::configure_receiver()`](radio/struct.Nrf24.html#method.configure_receiver)
//! - [`TransmitterConfig`](struct@crate::radio::TransmitterConfig)
//! - [`ReceiverConfig`](struct@crate::radio::ReceiverConfig)
//! - [`PipeTable`](struct@crate::radio::PipeTable)
//!
//! ## Basic API
//!
//! - [`Nrf24::send_blocking()`](radio/struct.Nrf24.html#method.send_blocking)
//! - [`Nrf24::send_async()`](radio/struct.Nrf24.html#method.send_async)
//! - [`Nrf24::receive_async()`](radio/struct.Nrf24.html#method.receive_async)
//! - [`Nrf24::stop_receiving()`](radio/struct.Nrf24.html#method.stop_receiving)
//! - [`Nrf24::store_ack_payload()`](radio/struct.Nrf24.html#method.store_ack_payload)
//! - [`Nrf24::read_status()`](radio/struct.Nrf24.html#method.read_status)
//! - [`Nrf24::take_payload()`](radio/struct.Nrf24.html#method.take_payload)
//! - [`Nrf24::last_received_pipe_address()`](radio/struct.Nrf24.html#method.last_received_pipe_address)
//! - [`Nrf24::set_callback()`](radio/struct.Nrf24.html#method.set_callback)
//!
//! ## Advanced API
//!
//! - [`Nrf24::is_rx_fifo_loading()`](radio/struct.Nrf24.html#method.is_rx_fifo_loading)
//! - [`Nrf24::flush_rx()`](fn@crate::radio::Nrf24::flush_rx)
//! - [`Nrf24::read_register()`](fn@crate::radio::Nrf24::read_register)
//! - [`Nrf24::read_register_map()`](fn@crate::radio::Nrf24::read_register_map)
//! - [`Nrf24::print_details()`](fn@crate::radio::Nrf24::print_details)
//! - [`Nrf24::free()`](fn@crate::radio::Nrf24::free)
//! - [`RegisterMap`](struct@crate::radio::RegisterMap)
//!
#![no_std]

mod types;
pub use types::{
    CallbackSlot, DataRate, DeviceRole, Edge, ExternalLine, PaLevel, Payload, StatusFlag,
    StatusFlags, MAX_PAYLOAD_LEN,
};
pub mod radio;
