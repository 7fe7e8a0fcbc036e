//! Model loader: translates parsed S-expression forms into calls on the
//! `Model` core API — `DEFINE-MODEL`'s `CHUNK-TYPE` / `ADD-DM` / `P` /
//! `GOAL-FOCUS` clauses, plus the outer `CLEAR-ALL` and `RUN` forms.

use crate::cell::VarTable;
use crate::chunk::{Chunk, ChunkType, SlotValue};
use crate::model::Model;
use crate::production::{Action, Condition, Modifier, Operand, Production, SlotTest, SlotWrite};
use crate::reader::Reader;
use crate::value::{Symbol, SymbolTable, Value};
use std::io::Write as _;

fn is_modifier_token(name: &str) -> bool {
    matches!(name, "-" | "<" | "<=" | ">" | ">=")
}

/// Read and evaluate every top-level form in `source`, driving `model`.
/// Echoes each raw read and its evaluation result to the model's output
/// stream; stops when the reader yields `NIL` (end of input).
pub fn load(model: &mut Model, source: &str) {
    let mut reader = Reader::new(source);
    let _ = writeln!(model.out, "** Loading Model");
    loop {
        let form = reader.read(&mut model.symbols);
        let mut read_line = String::new();
        let _ = crate::value::print(&form, &model.symbols, &mut read_line);
        let _ = writeln!(model.out, "lisp_read => {read_line}");
        if form.is_nil() {
            break;
        }
        let result = eval_top_level(model, &form);
        let mut eval_line = String::new();
        let _ = crate::value::print(&result, &model.symbols, &mut eval_line);
        let _ = writeln!(model.out, "lisp_eval => {eval_line}");
    }
    let _ = writeln!(model.out, "** End Model");
    let _ = writeln!(model.out, "---------------------");
}

fn eval_top_level(model: &mut Model, form: &Value) -> Value {
    let Some(head) = form.car().as_symbol() else {
        return Value::Nil;
    };
    let name = model.symbols.name(head).to_string();
    let args: Vec<Value> = form.cdr().iter().cloned().collect();
    match name.as_str() {
        "DEFINE-MODEL" => eval_define_model(model, &args),
        "CLEAR-ALL" => {
            model.clear_all();
            Value::Nil
        }
        "RUN" => {
            let duration = args.first().and_then(Value::as_number).unwrap_or(0.0);
            model.run(duration);
            Value::Symbol(head)
        }
        other => {
            log::error!("unrecognized top-level form: {other}");
            Value::Nil
        }
    }
}

fn eval_define_model(model: &mut Model, args: &[Value]) -> Value {
    let Some((model_name, clauses)) = args.split_first() else {
        log::error!("DEFINE-MODEL has no name");
        return Value::Nil;
    };
    for clause in clauses {
        let Some(verb_sym) = clause.car().as_symbol() else {
            continue;
        };
        let verb = model.symbols.name(verb_sym).to_string();
        let clause_args: Vec<Value> = clause.cdr().iter().cloned().collect();
        match verb.as_str() {
            "SGP" => log::debug!("SGP parameters ignored"),
            "CHUNK-TYPE" => eval_chunk_type(model, &clause_args),
            "ADD-DM" => eval_add_dm(model, &clause_args),
            "P" => eval_production(model, &clause_args),
            "GOAL-FOCUS" => eval_goal_focus(model, &clause_args),
            other => {
                log::error!("unrecognized verb in model: {other}");
                break;
            }
        }
    }
    model_name.clone()
}

fn eval_chunk_type(model: &mut Model, args: &[Value]) {
    let Some(name) = args.first().and_then(Value::as_symbol) else {
        log::error!("CHUNK-TYPE missing a name");
        return;
    };
    let slots = args[1..].iter().filter_map(Value::as_symbol).collect();
    model.define_chunk_type(ChunkType { name, slots });
}

fn eval_add_dm(model: &mut Model, args: &[Value]) {
    for chunk_form in args {
        let Some(name) = chunk_form.car().as_symbol() else {
            log::error!("ADD-DM chunk is missing a name");
            continue;
        };
        let rest: Vec<Value> = chunk_form.cdr().iter().cloned().collect();
        let mut slots = Vec::new();
        let mut i = 0;
        while i + 1 < rest.len() {
            match rest[i].as_symbol() {
                Some(slot) => slots.push(SlotValue {
                    slot,
                    value: rest[i + 1].clone(),
                }),
                None => log::error!("ADD-DM chunk slot name is not a symbol"),
            }
            i += 2;
        }
        model.add_dm(Chunk::new(name, slots));
    }
}

fn eval_goal_focus(model: &mut Model, args: &[Value]) {
    match args.first().and_then(Value::as_symbol) {
        Some(name) => model.set_goal_focus(name),
        None => log::error!("argument-1 to GOAL-FOCUS is not a symbol"),
    }
}

fn eval_production(model: &mut Model, args: &[Value]) {
    let Some((name_val, body)) = args.split_first() else {
        log::error!(
            "{}",
            crate::error::ModelError::MalformedProduction("P form is missing a name".into())
        );
        return;
    };
    let Some(name) = name_val.as_symbol() else {
        log::error!(
            "{}",
            crate::error::ModelError::MalformedProduction("P form name is not a symbol".into())
        );
        return;
    };
    let sep = body.iter().position(|v| {
        v.as_symbol()
            .map(|s| model.symbols.name(s) == "==>")
            .unwrap_or(false)
    });
    let Some(sep) = sep else {
        log::error!(
            "{}",
            crate::error::ModelError::MalformedProduction(format!(
                "production {} is missing ==>",
                model.symbols.name(name)
            ))
        );
        return;
    };
    let (lhs_tokens, rest) = body.split_at(sep);
    let rhs_tokens = &rest[1..];

    let mut vars = VarTable::new();
    let lhs = parse_lhs_clauses(lhs_tokens, &mut vars, &mut model.symbols);
    let rhs = parse_rhs_clauses(rhs_tokens, &mut vars, &mut model.symbols);
    model.add_production(Production::new(name, lhs, rhs, vars));
}

/// Group a flat clause-body token stream into `(starter, body)` pairs,
/// splitting at each clause-starter symbol (`=buf>`/`+buf>`/`-buf>`/
/// `?buf>`/`!op!` tokens). A bare modifier token (`-`, `<`, `<=`, `>`,
/// `>=`) ends with `>` the same way a buffer-spec does, so it is
/// explicitly excluded here — otherwise a numeric `> end 3` slot-test
/// would be mis-split as a new clause.
fn split_clauses(items: &[Value], table: &SymbolTable) -> Vec<(Symbol, Vec<Value>)> {
    let mut clauses = Vec::new();
    let mut current: Option<(Symbol, Vec<Value>)> = None;
    for item in items {
        if let Some(sym) = item.as_symbol() {
            let name = table.name(sym);
            if !is_modifier_token(name) && sym.is_clause_starter(table) {
                if let Some(c) = current.take() {
                    clauses.push(c);
                }
                current = Some((sym, Vec::new()));
                continue;
            }
        }
        match current.as_mut() {
            Some((_, body)) => body.push(item.clone()),
            None => log::error!("token outside any clause in production body"),
        }
    }
    if let Some(c) = current.take() {
        clauses.push(c);
    }
    clauses
}

fn operand_of(value: &Value, vars: &mut VarTable, table: &SymbolTable) -> Operand {
    match value {
        Value::Number(n) => Operand::Number(*n),
        Value::Nil => Operand::Nil,
        Value::Symbol(s) => {
            if s.is_variable(table) {
                Operand::Variable(vars.intern(*s))
            } else {
                Operand::Literal(*s)
            }
        }
        _ => Operand::Nil,
    }
}

/// Parse `(modifier?) slot value` triples/pairs into slot-tests. A
/// leading modifier token applies to the test that follows it;
/// otherwise the modifier defaults to `=`.
fn parse_slot_tests(body: &[Value], vars: &mut VarTable, table: &mut SymbolTable) -> Vec<SlotTest> {
    let mut tests = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let modifier = body[i]
            .as_symbol()
            .and_then(|s| Modifier::from_token(table.name(s)));
        let (modifier, slot_pos) = match modifier {
            Some(m) => (m, i + 1),
            None => (Modifier::Eq, i),
        };
        let Some(slot) = body.get(slot_pos).and_then(Value::as_symbol) else {
            log::error!("malformed slot-test: expected a slot name");
            break;
        };
        let Some(value_form) = body.get(slot_pos + 1) else {
            log::error!("malformed slot-test: missing value for slot {}", table.name(slot));
            break;
        };
        let value = operand_of(value_form, vars, table);
        tests.push(SlotTest { modifier, slot, value });
        i = slot_pos + 2;
    }
    tests
}

fn parse_slot_writes(body: &[Value], vars: &mut VarTable, table: &SymbolTable) -> Vec<SlotWrite> {
    let mut writes = Vec::new();
    let mut i = 0;
    while i + 1 < body.len() {
        match body[i].as_symbol() {
            Some(slot) => {
                let value = operand_of(&body[i + 1], vars, table);
                writes.push(SlotWrite { slot, value });
            }
            None => log::error!("malformed slot-write: expected a slot name"),
        }
        i += 2;
    }
    writes
}

fn parse_lhs_clauses(items: &[Value], vars: &mut VarTable, table: &mut SymbolTable) -> Vec<Condition> {
    split_clauses(items, table)
        .into_iter()
        .map(|(starter, body)| {
            let name = table.name(starter).to_string();
            if name.starts_with('!') {
                Condition::ReservedOp { op: starter }
            } else {
                let buffer = starter.buffer_name(table);
                match name.chars().next() {
                    Some('?') => Condition::BufferQuery { buffer },
                    _ => Condition::BufferTest {
                        buffer,
                        tests: parse_slot_tests(&body, vars, table),
                    },
                }
            }
        })
        .collect()
}

fn parse_rhs_clauses(items: &[Value], vars: &mut VarTable, table: &mut SymbolTable) -> Vec<Action> {
    split_clauses(items, table)
        .into_iter()
        .map(|(starter, body)| {
            let name = table.name(starter).to_string();
            if name.starts_with('!') {
                match name.as_str() {
                    "!OUTPUT!" => Action::Output {
                        form: body.first().cloned().unwrap_or(Value::Nil),
                    },
                    "!EVAL!" => Action::Eval {
                        form: body.first().cloned().unwrap_or(Value::Nil),
                    },
                    other => {
                        log::warn!("{other} is not implemented; action skipped");
                        Action::Eval {
                            form: body.first().cloned().unwrap_or(Value::Nil),
                        }
                    }
                }
            } else {
                let buffer = starter.buffer_name(table);
                match name.chars().next() {
                    Some('+') => Action::ModuleRequest {
                        buffer,
                        writes: parse_slot_writes(&body, vars, table),
                    },
                    Some('-') => Action::ClearBuffer { buffer },
                    _ => Action::ModBufferChunk {
                        buffer,
                        writes: parse_slot_writes(&body, vars, table),
                    },
                }
            }
        })
        .collect()
}
