//! Productions: the parsed `(name, LHS, RHS, vars)` tuples that make up
//! procedural memory, plus their condition/action shapes.

use crate::cell::{CellId, VarTable};
use crate::value::Symbol;

/// A value slot-test or action slot may reference an already-bound
/// variable cell, a still-to-be-bound one, or a plain literal. Resolved
/// once at parse time into this closed shape so the matcher never has
/// to re-walk S-expressions mid-cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Literal(crate::value::Symbol),
    Number(f64),
    Nil,
    Variable(CellId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Eq,
    NotEq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl Modifier {
    /// `">"` and `">="` map to `Gt`/`Geq` as their symbols suggest.
    pub fn from_token(token: &str) -> Option<Modifier> {
        match token {
            "=" => Some(Modifier::Eq),
            "-" => Some(Modifier::NotEq),
            "<" => Some(Modifier::Lt),
            "<=" => Some(Modifier::Leq),
            ">" => Some(Modifier::Gt),
            ">=" => Some(Modifier::Geq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SlotTest {
    pub modifier: Modifier,
    pub slot: Symbol,
    pub value: Operand,
}

#[derive(Debug, Clone)]
pub enum Condition {
    BufferTest {
        buffer: Symbol,
        tests: Vec<SlotTest>,
    },
    /// Reserved: always fails, with a logged diagnostic.
    BufferQuery { buffer: Symbol },
    /// `!eval!`/`!bind!`/`!safe-eval!`/`!safe-bind!`/`!mv-bind!`: reserved,
    /// rejected at match time.
    ReservedOp { op: Symbol },
}

#[derive(Debug, Clone)]
pub struct SlotWrite {
    pub slot: Symbol,
    pub value: Operand,
}

#[derive(Debug, Clone)]
pub enum Action {
    ModBufferChunk {
        buffer: Symbol,
        writes: Vec<SlotWrite>,
    },
    ModuleRequest {
        buffer: Symbol,
        writes: Vec<SlotWrite>,
    },
    ClearBuffer {
        buffer: Symbol,
    },
    Output {
        form: crate::value::Value,
    },
    /// Reserved: logged "not implemented" and skipped.
    Eval {
        form: crate::value::Value,
    },
}

#[derive(Debug, Clone)]
pub struct Production {
    pub name: Symbol,
    pub lhs: Vec<Condition>,
    pub rhs: Vec<Action>,
    pub vars: VarTable,
}

impl Production {
    pub fn new(name: Symbol, lhs: Vec<Condition>, rhs: Vec<Action>, vars: VarTable) -> Self {
        Production {
            name,
            lhs,
            rhs,
            vars,
        }
    }
}

/// Procedural memory: an insertion-ordered list of productions.
/// Conflict resolution scans this list in strict textual order and
/// fires the first match — no utility computation, no noise.
#[derive(Debug, Default)]
pub struct ProductionMemory {
    productions: Vec<Production>,
}

impl ProductionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, production: Production) {
        self.productions.push(production);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Production> {
        self.productions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Production> {
        self.productions.iter_mut()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Production> {
        self.productions.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    pub fn clear(&mut self) {
        self.productions.clear();
    }
}
