//! A module to encapsulate all things related to radio operation.
pub mod prelude;

mod nrf24;
pub use nrf24::{
    commands, mnemonics, register_map::RegisterMap, registers, BusError, ConfigError, Nrf24,
    ReceiveError, SendError, StoreError,
};

mod config;
pub use config::{PayloadChannel, PinBinding, PipeTable, ReceiverConfig, TransmitterConfig};

#[cfg(feature = "isr")]
pub mod isr;
