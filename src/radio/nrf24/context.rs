use crate::{Payload, StatusFlag};

/// The number of timer ticks an asynchronous transmission may take.
pub(crate) const TX_TIMEOUT_TICKS: u8 = 30;

/// The number of timer ticks a background SPI transfer may take.
pub(crate) const BUS_WATCHDOG_TICKS: u8 = 30;

/// What to do when a background SPI transfer completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BusStep {
    Idle,
    /// The TX payload was loaded; pulse CE next.
    StartTransmission,
    /// Reading an ACK payload of the given width.
    ReadAckPayload(u8),
    /// Reading an RX payload of the given width.
    ReadRxPayload(u8),
    /// An ACK payload was loaded.
    StoreAckPayload,
}

/// Which continuation runs when the IRQ line fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum IrqHandler {
    None,
    Transmit,
    Receive,
}

/// Counts timer ticks while an asynchronous transmission waits for its IRQ.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct TimeoutSupervisor {
    armed: bool,
    count: u8,
}

impl TimeoutSupervisor {
    pub fn arm(&mut self) {
        self.armed = true;
        self.count = 0;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Count one tick. Returns `true` once the budget is exceeded,
    /// after which the supervisor is disarmed.
    pub fn tick(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.count = self.count.saturating_add(1);
        if self.count > TX_TIMEOUT_TICKS {
            self.armed = false;
            return true;
        }
        false
    }
}

/// The state shared by all execution contexts that touch the radio.
pub(crate) struct OperationContext {
    pub status: StatusFlag,
    /// Pipe index of the last reception, until it is read back.
    pub rx_pipe: Option<u8>,
    pub payload: Option<Payload>,
    pub bus_step: BusStep,
    pub irq_handler: IrqHandler,
    pub timeout: TimeoutSupervisor,
    pub bus_watchdog: u8,
    /// An ACK payload is being loaded.
    pub rx_fifo_busy: bool,
    /// Listening should start once the bus is idle.
    pub deferred_reception: bool,
    /// An ACK payload `(pipe, bytes)` waiting for the bus.
    pub queued_ack: Option<(u8, Payload)>,
    /// `stop_receiving()` was called with a transfer in flight.
    pub stop_pending: bool,
    /// The IRQ fired with a transfer in flight; its line is disabled until serviced.
    pub irq_deferred: bool,
}

impl Default for OperationContext {
    fn default() -> Self {
        Self {
            status: StatusFlag::NoStatus,
            rx_pipe: None,
            payload: None,
            bus_step: BusStep::Idle,
            irq_handler: IrqHandler::None,
            timeout: TimeoutSupervisor::default(),
            bus_watchdog: 0,
            rx_fifo_busy: false,
            deferred_reception: false,
            queued_ack: None,
            stop_pending: false,
            irq_deferred: false,
        }
    }
}

impl OperationContext {
    /// Is a background transfer in flight?
    pub fn bus_busy(&self) -> bool {
        self.bus_step != BusStep::Idle
    }

    /// Is any asynchronous operation outstanding?
    pub fn is_busy(&self) -> bool {
        self.bus_busy()
            || self.irq_handler != IrqHandler::None
            || self.rx_fifo_busy
            || self.deferred_reception
            || self.queued_ack.is_some()
            || self.stop_pending
            || self.irq_deferred
    }

    /// Count a tick against the in-flight transfer.
    /// Returns `true` once the transfer is considered lost.
    pub fn watchdog_tick(&mut self) -> bool {
        if !self.bus_busy() {
            self.bus_watchdog = 0;
            return false;
        }
        self.bus_watchdog = self.bus_watchdog.saturating_add(1);
        self.bus_watchdog > BUS_WATCHDOG_TICKS
    }

    /// Forget every outstanding operation.
    pub fn abandon(&mut self) {
        self.bus_step = BusStep::Idle;
        self.bus_watchdog = 0;
        self.irq_handler = IrqHandler::None;
        self.timeout.disarm();
        self.rx_fifo_busy = false;
        self.deferred_reception = false;
        self.queued_ack = None;
        self.stop_pending = false;
        self.irq_deferred = false;
    }
}
