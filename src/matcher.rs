//! The LHS matcher: tests buffer contents against a production's
//! conditions, binding variables along the way.

use crate::buffer::BufferTable;
use crate::cell::VarTable;
use crate::chunk::{Chunk, SlotValue};
use crate::production::{Condition, Modifier, Operand, SlotTest};
use crate::value::{Symbol, SymbolTable, Value};

/// Dereference an `Operand` to a concrete `Value`, following a bound
/// variable cell to its binding. A still-unbound variable dereferences
/// to `None` (the caller decides whether that's a bind site or a
/// failure).
fn deref(operand: Operand, vars: &VarTable) -> Option<Value> {
    match operand {
        Operand::Literal(s) => Some(Value::Symbol(s)),
        Operand::Number(n) => Some(Value::Number(n)),
        Operand::Nil => Some(Value::Nil),
        Operand::Variable(id) => vars.get(id).value.clone(),
    }
}

/// Apply one slot-test against a chunk/buffer's slot list. Returns
/// whether it matched, mutating `vars` if the test binds an unbound
/// variable.
fn apply_slot_test(slots: &[SlotValue], test: &SlotTest, vars: &mut VarTable) -> bool {
    let found = slots.iter().find(|sv| sv.slot == test.slot);

    match test.modifier {
        Modifier::Eq => match found {
            None => match test.value {
                // A missing slot is treated as if it held NIL.
                Operand::Nil => true,
                // Absent slot + unbound variable binds the variable to
                // NIL and matches; a variable already bound to NIL also
                // matches.
                Operand::Variable(id) => {
                    if vars.get(id).is_bound() {
                        vars.get(id).value == Some(Value::Nil)
                    } else {
                        vars.bind(id, Value::Nil);
                        true
                    }
                }
                Operand::Literal(_) | Operand::Number(_) => false,
            },
            Some(sv) => {
                if sv.value == Value::Nil {
                    return false;
                }
                if let Operand::Variable(id) = test.value {
                    if vars.get(id).is_bound() {
                        let bound = vars.get(id).value.clone().unwrap();
                        bound.eql(&sv.value)
                    } else {
                        vars.bind(id, sv.value.clone());
                        true
                    }
                } else {
                    let want = deref(test.value, vars).unwrap();
                    want.eql(&sv.value)
                }
            }
        },
        Modifier::NotEq => {
            let slot_value = found.map(|sv| sv.value.clone()).unwrap_or(Value::Nil);
            match deref(test.value, vars) {
                Some(want) => !want.eql(&slot_value),
                None => true, // unbound variable can never equal a concrete value
            }
        }
        Modifier::Lt | Modifier::Leq | Modifier::Gt | Modifier::Geq => {
            let slot_value = match found {
                Some(sv) => sv.value.as_number(),
                None => None,
            };
            let want = deref(test.value, vars).and_then(|v| v.as_number());
            match (slot_value, want) {
                (Some(lhs), Some(rhs)) => match test.modifier {
                    Modifier::Lt => lhs < rhs,
                    Modifier::Leq => lhs <= rhs,
                    Modifier::Gt => lhs > rhs,
                    Modifier::Geq => lhs >= rhs,
                    _ => unreachable!(),
                },
                _ => false,
            }
        }
    }
}

/// Evaluate one condition against the current buffer state. Returns
/// `true` on match. Unsupported condition shapes (`BUFFER-QUERY`,
/// reserved `!op!`s) always fail and log a one-line diagnostic.
pub fn eval_condition(
    condition: &Condition,
    buffers: &BufferTable,
    vars: &mut VarTable,
    table: &SymbolTable,
) -> bool {
    match condition {
        Condition::BufferTest { buffer, tests } => {
            let Some(buf) = buffers.get(*buffer) else {
                log::error!(
                    "{}",
                    crate::error::ModelError::UnknownBuffer(table.name(*buffer).to_string())
                );
                return false;
            };
            let slots: &[SlotValue] = buf.contents.as_deref().unwrap_or(&[]);
            tests.iter().all(|test| apply_slot_test(slots, test, vars))
        }
        Condition::BufferQuery { buffer } => {
            log::warn!(
                "{}",
                crate::error::ModelError::UnsupportedCondition(format!(
                    "BUFFER-QUERY on {}",
                    table.name(*buffer)
                ))
            );
            false
        }
        Condition::ReservedOp { op } => {
            log::warn!(
                "{}",
                crate::error::ModelError::UnsupportedCondition(table.name(*op).to_string())
            );
            false
        }
    }
}

/// Reset every variable cell, then evaluate each condition of `lhs` in
/// order. The first failure fails the whole LHS.
pub fn match_lhs(
    lhs: &[Condition],
    buffers: &BufferTable,
    vars: &mut VarTable,
    table: &SymbolTable,
) -> bool {
    vars.reset_all();
    for condition in lhs {
        if !eval_condition(condition, buffers, vars, table) {
            return false;
        }
    }
    true
}

/// Whether `chunk` satisfies a dereferenced retrieval `pattern`: every
/// `(slot, value)` pair must be present in the chunk under `eql`.
/// Patterns are consumed in order; when a pattern slot name matches the
/// chunk's *leading* (remaining) slot, the matcher advances its cursor
/// into the chunk tail — an ordering heuristic preserving the intent
/// that early pattern slots line up with early chunk slots.
pub fn satisfies(chunk: &Chunk, pattern: &[SlotValue]) -> bool {
    let mut cursor = 0usize;
    for want in pattern {
        let rest = &chunk.slots[cursor..];
        match rest.iter().position(|sv| sv.slot == want.slot) {
            None => return false,
            Some(offset) => {
                if !rest[offset].value.eql(&want.value) {
                    return false;
                }
                if offset == 0 {
                    cursor += 1;
                }
            }
        }
    }
    true
}

/// Resolve the buffer symbol referenced by `spec` (e.g. `=goal>`,
/// `+retrieval>`) against the interner, used by the loader when building
/// `Condition`/`Action` values. Kept here because it's purely a matcher-
/// side concern: only conditions/actions carry buffer-specs.
pub fn buffer_name_of(spec: Symbol, table: &mut SymbolTable) -> Symbol {
    spec.buffer_name(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferTable;
    use crate::cell::VarTable;

    fn setup() -> (SymbolTable, BufferTable) {
        let mut table = SymbolTable::new();
        let goal = table.intern("goal");
        let retrieval = table.intern("retrieval");
        (table, BufferTable::new(goal, retrieval))
    }

    #[test]
    fn eq_literal_match() {
        let (mut table, mut buffers) = setup();
        let goal = table.intern("goal");
        let start = table.intern("start");
        buffers.get_mut(goal).unwrap().upsert(start, Value::Number(1.0));

        let mut vars = VarTable::new();
        let test = SlotTest {
            modifier: Modifier::Eq,
            slot: start,
            value: Operand::Number(1.0),
        };
        assert!(apply_slot_test(
            buffers.get(goal).unwrap().contents.as_ref().unwrap(),
            &test,
            &mut vars
        ));
    }

    #[test]
    fn eq_unbound_variable_binds() {
        let (mut table, mut buffers) = setup();
        let goal = table.intern("goal");
        let start = table.intern("start");
        buffers.get_mut(goal).unwrap().upsert(start, Value::Number(7.0));

        let mut vars = VarTable::new();
        let x = vars.intern(table.intern("=x"));
        let test = SlotTest {
            modifier: Modifier::Eq,
            slot: start,
            value: Operand::Variable(x),
        };
        let slots = buffers.get(goal).unwrap().contents.clone().unwrap();
        assert!(apply_slot_test(&slots, &test, &mut vars));
        assert_eq!(vars.get(x).value, Some(Value::Number(7.0)));
    }

    #[test]
    fn absent_slot_with_nil_test_matches() {
        let (mut table, buffers) = setup();
        let goal = table.intern("goal");
        let missing = table.intern("missing");
        let mut vars = VarTable::new();
        let test = SlotTest {
            modifier: Modifier::Eq,
            slot: missing,
            value: Operand::Nil,
        };
        let slots = buffers.get(goal).unwrap().contents.clone().unwrap_or_default();
        assert!(apply_slot_test(&slots, &test, &mut vars));
    }

    #[test]
    fn absent_slot_unbound_variable_binds_to_nil_and_matches() {
        let (mut table, _buffers) = setup();
        let missing = table.intern("missing");
        let mut vars = VarTable::new();
        let x = vars.intern(table.intern("=x"));
        let test = SlotTest {
            modifier: Modifier::Eq,
            slot: missing,
            value: Operand::Variable(x),
        };
        assert!(apply_slot_test(&[], &test, &mut vars));
    }

    #[test]
    fn numeric_comparison() {
        let mut table = SymbolTable::new();
        let end = table.intern("end");
        let mut vars = VarTable::new();
        let slots = vec![SlotValue {
            slot: end,
            value: Value::Number(3.0),
        }];
        let test = SlotTest {
            modifier: Modifier::Lt,
            slot: end,
            value: Operand::Number(5.0),
        };
        assert!(apply_slot_test(&slots, &test, &mut vars));
    }

    #[test]
    fn retrieval_pattern_match_with_leading_slot_cursor() {
        let mut table = SymbolTable::new();
        let name = table.intern("a");
        let isa = table.intern("isa");
        let count_order = table.intern("count-order");
        let first = table.intern("first");
        let second = table.intern("second");
        let chunk = Chunk::new(
            name,
            vec![
                SlotValue { slot: isa, value: Value::Symbol(count_order) },
                SlotValue { slot: first, value: Value::Number(1.0) },
                SlotValue { slot: second, value: Value::Number(2.0) },
            ],
        );
        let pattern = vec![
            SlotValue { slot: isa, value: Value::Symbol(count_order) },
            SlotValue { slot: first, value: Value::Number(1.0) },
        ];
        assert!(satisfies(&chunk, &pattern));
    }

    #[test]
    fn retrieval_pattern_fails_on_missing_slot() {
        let mut table = SymbolTable::new();
        let name = table.intern("a");
        let first = table.intern("first");
        let missing = table.intern("missing");
        let chunk = Chunk::new(
            name,
            vec![SlotValue { slot: first, value: Value::Number(1.0) }],
        );
        let pattern = vec![SlotValue { slot: missing, value: Value::Number(9.0) }];
        assert!(!satisfies(&chunk, &pattern));
    }
}
