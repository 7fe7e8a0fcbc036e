//! Variable binding cells.
//!
//! Every occurrence of `=x` in one production must see the same
//! binding, so a variable is an index into a per-production vector of
//! cells, zeroed at the start of every matching cycle.

use crate::value::{Symbol, Value};

/// A single variable's binding slot. `None` means unbound.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub value: Option<Value>,
}

impl Cell {
    pub fn unbound() -> Self {
        Cell { value: None }
    }

    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// The binding vector for one production: one `Cell` per distinct
/// variable name, looked up by index. `CellId` is that index, resolved
/// once at parse time so matching and the RHS interpreter never do name
/// lookups mid-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellId(pub usize);

/// Association of variable name -> `CellId`, plus the storage the
/// `CellId`s index into. Built once when a production is parsed; reused
/// (and reset) on every firing cycle.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    names: Vec<Symbol>,
    cells: Vec<Cell>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the `CellId` for `name`, allocating a fresh cell the first
    /// time this variable name is seen within the production.
    pub fn intern(&mut self, name: Symbol) -> CellId {
        if let Some(pos) = self.names.iter().position(|&n| n == name) {
            return CellId(pos);
        }
        let id = CellId(self.names.len());
        self.names.push(name);
        self.cells.push(Cell::unbound());
        id
    }

    /// Look up the `CellId` already allocated for `name`, without
    /// allocating a new one. Used by the RHS interpreter when
    /// substituting variable occurrences inside a raw `!OUTPUT!` form.
    pub fn lookup(&self, name: Symbol) -> Option<CellId> {
        self.names.iter().position(|&n| n == name).map(CellId)
    }

    pub fn get(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    pub fn bind(&mut self, id: CellId, value: Value) {
        self.cells[id.0].value = Some(value);
    }

    /// Reset every cell to unbound. Called at the start of LHS matching
    /// for each production on each conflict-resolution pass.
    pub fn reset_all(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SymbolTable;

    #[test]
    fn same_name_shares_one_cell() {
        let mut table = SymbolTable::new();
        let x = table.intern("=x");
        let mut vars = VarTable::new();
        let id1 = vars.intern(x);
        let id2 = vars.intern(x);
        assert_eq!(id1, id2);
        vars.bind(id1, Value::Number(4.0));
        assert_eq!(vars.get(id2).value, Some(Value::Number(4.0)));
    }

    #[test]
    fn reset_clears_all_bindings() {
        let mut table = SymbolTable::new();
        let x = table.intern("=x");
        let y = table.intern("=y");
        let mut vars = VarTable::new();
        let ix = vars.intern(x);
        let iy = vars.intern(y);
        vars.bind(ix, Value::Number(1.0));
        vars.bind(iy, Value::Number(2.0));
        vars.reset_all();
        assert!(!vars.get(ix).is_bound());
        assert!(!vars.get(iy).is_bound());
    }
}
