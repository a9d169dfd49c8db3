use crate::{radio::prelude::Callback, CallbackSlot};

/// One optional handler per [`CallbackSlot`].
#[derive(Default)]
pub(crate) struct CallbackTable {
    handlers: [Option<Callback>; CallbackSlot::COUNT],
}

impl CallbackTable {
    pub fn set(&mut self, slot: CallbackSlot, handler: Callback) {
        self.handlers[slot.index()] = Some(handler);
    }

    pub fn clear(&mut self, slot: CallbackSlot) {
        self.handlers[slot.index()] = None;
    }

    /// Invoke the handler in `slot`. An empty slot is a no-op.
    pub fn dispatch(&self, slot: CallbackSlot) {
        #[cfg(feature = "defmt")]
        defmt::trace!("dispatching {}", slot);
        if let Some(handler) = self.handlers[slot.index()] {
            handler();
        }
    }
}
