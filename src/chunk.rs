//! Chunk representation and the declarative chunk store (DM).
//!
//! A chunk is a named, ordered slot/value sequence. `ChunkType` records
//! the declared slot names of a `CHUNK-TYPE` form (kept for model-loader
//! validation; the matcher itself does not require a chunk to declare
//! its type — it is a purely structural match).

use crate::value::Symbol;

/// One `(slot, value)` pair inside a chunk or buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotValue {
    pub slot: Symbol,
    pub value: crate::value::Value,
}

/// A declarative memory chunk: a name plus an ordered slot/value
/// sequence.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub name: Symbol,
    pub slots: Vec<SlotValue>,
}

impl Chunk {
    pub fn new(name: Symbol, slots: Vec<SlotValue>) -> Self {
        Chunk { name, slots }
    }

    pub fn get(&self, slot: Symbol) -> Option<&crate::value::Value> {
        self.slots
            .iter()
            .find(|sv| sv.slot == slot)
            .map(|sv| &sv.value)
    }

    /// The buffer-facing projection of a chunk: its slot/value tail with
    /// the name stripped, since a buffer holds only slot/value pairs.
    pub fn tail(&self) -> Vec<SlotValue> {
        self.slots.clone()
    }
}

/// A `CHUNK-TYPE` declaration: name plus its declared slot names.
#[derive(Debug, Clone)]
pub struct ChunkType {
    pub name: Symbol,
    pub slots: Vec<Symbol>,
}

/// Declarative memory: an insertion-ordered list of chunks, scanned
/// linearly on retrieval. A deliberately simple content-addressed
/// match; no activation ranking.
#[derive(Debug, Default)]
pub struct DeclarativeMemory {
    chunks: Vec<Chunk>,
    types: Vec<ChunkType>,
}

impl DeclarativeMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_type(&mut self, ty: ChunkType) {
        self.types.push(ty);
    }

    pub fn add(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    pub fn find_by_name(&self, name: Symbol) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.types.clear();
    }

    /// Scan chunks in insertion order, returning the first whose slots
    /// are a superset of `pattern` under `eql` (after the caller has
    /// already dereferenced any bound variables in `pattern`). The
    /// ordering heuristic that advances the chunk cursor when a pattern
    /// slot matches the chunk's *leading* slot lives in
    /// `matcher::satisfies`, which this delegates to.
    pub fn retrieve(&self, pattern: &[SlotValue]) -> Option<&Chunk> {
        self.chunks
            .iter()
            .find(|chunk| crate::matcher::satisfies(chunk, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{SymbolTable, Value};

    fn sv(table: &mut SymbolTable, slot: &str, value: Value) -> SlotValue {
        SlotValue {
            slot: table.intern(slot),
            value,
        }
    }

    #[test]
    fn insertion_order_preserved() {
        let mut table = SymbolTable::new();
        let mut dm = DeclarativeMemory::new();
        let a = table.intern("a");
        let b = table.intern("b");
        dm.add(Chunk::new(a, vec![]));
        dm.add(Chunk::new(b, vec![]));
        let names: Vec<_> = dm.iter().map(|c| c.name).collect();
        assert_eq!(names, vec![a, b]);
    }

    #[test]
    fn get_slot_value() {
        let mut table = SymbolTable::new();
        let name = table.intern("a");
        let slots = vec![sv(&mut table, "first", Value::Number(1.0))];
        let chunk = Chunk::new(name, slots);
        let first = table.intern("first");
        assert_eq!(chunk.get(first), Some(&Value::Number(1.0)));
    }
}
