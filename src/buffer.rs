//! Named buffers: the single-slot holders modules write their results
//! into. Only GOAL and RETRIEVAL are defined, but lookup is by table so
//! adding a module's buffer later is additive.

use crate::chunk::SlotValue;
use crate::value::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStatus {
    Free,
    Busy,
    Error,
}

#[derive(Debug, Clone)]
pub struct Buffer {
    pub name: Symbol,
    pub contents: Option<Vec<SlotValue>>,
    pub status: BufferStatus,
}

impl Buffer {
    pub fn new(name: Symbol) -> Self {
        Buffer {
            name,
            contents: None,
            status: BufferStatus::Free,
        }
    }

    pub fn clear(&mut self) {
        self.contents = None;
    }

    pub fn set(&mut self, slots: Vec<SlotValue>) {
        self.contents = Some(slots);
    }

    /// Replace an existing slot's value, else append.
    pub fn upsert(&mut self, slot: Symbol, value: crate::value::Value) {
        let slots = self.contents.get_or_insert_with(Vec::new);
        if let Some(existing) = slots.iter_mut().find(|sv| sv.slot == slot) {
            existing.value = value;
        } else {
            slots.push(SlotValue { slot, value });
        }
    }

    pub fn get(&self, slot: Symbol) -> Option<&crate::value::Value> {
        self.contents
            .as_ref()?
            .iter()
            .find(|sv| sv.slot == slot)
            .map(|sv| &sv.value)
    }
}

/// The fixed set of buffers the simulator knows about. Extension is by
/// table lookup on the buffer symbol, not by adding enum variants, so a
/// third module's buffer is a registration, not a recompile of the
/// matcher.
#[derive(Debug, Default)]
pub struct BufferTable {
    buffers: Vec<Buffer>,
}

impl BufferTable {
    pub fn new(goal: Symbol, retrieval: Symbol) -> Self {
        BufferTable {
            buffers: vec![Buffer::new(goal), Buffer::new(retrieval)],
        }
    }

    pub fn get(&self, name: Symbol) -> Option<&Buffer> {
        self.buffers.iter().find(|b| b.name == name)
    }

    pub fn get_mut(&mut self, name: Symbol) -> Option<&mut Buffer> {
        self.buffers.iter_mut().find(|b| b.name == name)
    }
}
