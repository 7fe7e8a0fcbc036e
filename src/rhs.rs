//! The RHS interpreter: translates a fired production's actions into
//! scheduled events or immediate effects.

use crate::cell::VarTable;
use crate::event::{priority, EventKind, EventQueue};
use crate::production::{Action, Operand, SlotWrite};
use crate::value::{Symbol, SymbolTable, Value};
use std::io::Write as _;

fn resolve_writes(writes: &[SlotWrite], vars: &VarTable) -> Vec<(Symbol, Value)> {
    writes
        .iter()
        .map(|w| {
            let value = match w.value {
                Operand::Literal(s) => Value::Symbol(s),
                Operand::Number(n) => Value::Number(n),
                Operand::Nil => Value::Nil,
                Operand::Variable(id) => vars.get(id).value.clone().unwrap_or(Value::Nil),
            };
            (w.slot, value)
        })
        .collect()
}

/// Recursively substitute every variable occurrence in `form` with its
/// current binding, for `!OUTPUT!`. An atom variable reference evaluates
/// to the cell's binding; unbound variables substitute as `NIL`.
pub fn substitute(form: &Value, vars: &VarTable, table: &SymbolTable) -> Value {
    match form {
        Value::Symbol(s) => {
            if table.name(*s).starts_with('=') {
                match vars.lookup(*s) {
                    Some(id) => vars.get(id).value.clone().unwrap_or(Value::Nil),
                    None => Value::Symbol(*s),
                }
            } else {
                Value::Symbol(*s)
            }
        }
        Value::Pair(head, tail) => Value::cons(
            substitute(head, vars, table),
            substitute(tail, vars, table),
        ),
        other => other.clone(),
    }
}

/// `princ`-style rendering for `!OUTPUT!`: like `value::print`, except a
/// string element renders as its bare contents rather than `"quoted"` —
/// `!OUTPUT! ("sum is" =n)` prints `sum is 4`, not `"sum is" 4`.
fn print_for_output(value: &Value, table: &SymbolTable, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        other => {
            let _ = crate::value::print(other, table, out);
        }
    }
}

/// Process one fired production's RHS in order, scheduling events for
/// buffer mutation / module requests / clears, and performing `!OUTPUT!`
/// immediately. Called from `Model` when a `PRODUCTION-FIRED` event
/// dispatches.
pub fn fire(
    rhs: &[Action],
    vars: &VarTable,
    queue: &mut EventQueue,
    table: &SymbolTable,
    out: &mut dyn std::io::Write,
    now: f64,
) {
    for action in rhs {
        match action {
            Action::ModBufferChunk { buffer, writes } => {
                queue.schedule(
                    now,
                    priority::MOD_BUFFER_CHUNK,
                    EventKind::ModBufferChunk {
                        buffer: *buffer,
                        writes: resolve_writes(writes, vars),
                    },
                );
            }
            Action::ModuleRequest { buffer, writes } => {
                queue.schedule(
                    now,
                    priority::MODULE_REQUEST,
                    EventKind::ModuleRequest {
                        buffer: *buffer,
                        pattern: resolve_writes(writes, vars),
                    },
                );
                queue.schedule(
                    now,
                    priority::CLEAR_BUFFER,
                    EventKind::ClearBuffer { buffer: *buffer },
                );
            }
            Action::ClearBuffer { buffer } => {
                queue.schedule(now, priority::CLEAR_BUFFER, EventKind::ClearBuffer { buffer: *buffer });
            }
            Action::Output { form } => {
                let substituted = substitute(form, vars, table);
                let mut line = String::new();
                for (i, element) in substituted.iter().enumerate() {
                    if i > 0 {
                        line.push(' ');
                    }
                    print_for_output(element, table, &mut line);
                }
                let _ = writeln!(out, "{}", line);
            }
            Action::Eval { .. } => {
                log::warn!(
                    "{}",
                    crate::error::ModelError::UnsupportedAction("!EVAL!".to_string())
                );
            }
        }
    }
}
