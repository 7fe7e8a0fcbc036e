//! The `Model`: the single cognitive instance per process, owned by
//! `main` and threaded through the dispatcher explicitly rather than
//! kept as process-wide state.

use crate::buffer::BufferTable;
use crate::chunk::{Chunk, ChunkType, DeclarativeMemory, SlotValue};
use crate::event::{priority, EventKind, EventQueue, PRIORITY_MAX, PRIORITY_MIN};
use crate::matcher;
use crate::production::{Production, ProductionMemory};
use crate::rhs;
use crate::trace;
use crate::value::{Symbol, SymbolTable, Value};
use std::io::Write;

/// Procedural firing latency: the time between PRODUCTION-SELECTED and
/// PRODUCTION-FIRED.
pub const PROCEDURAL_LATENCY: f64 = 0.050;
/// Declarative retrieval latency: time from START-RETRIEVAL to
/// RETRIEVED-CHUNK / RETRIEVAL-FAILURE.
pub const RETRIEVAL_LATENCY: f64 = 0.050;

pub enum StopReason {
    NoEventsLeft,
    TimeLimitReached,
}

pub struct Model {
    pub symbols: SymbolTable,
    pub dm: DeclarativeMemory,
    pub pm: ProductionMemory,
    pub buffers: BufferTable,
    pub queue: EventQueue,
    pub time: f64,
    pub out: Box<dyn Write>,
    pub goal: Symbol,
    pub retrieval: Symbol,
}

impl Model {
    pub fn new(out: Box<dyn Write>) -> Self {
        let mut symbols = SymbolTable::new();
        let goal = symbols.intern("GOAL");
        let retrieval = symbols.intern("RETRIEVAL");
        let buffers = BufferTable::new(goal, retrieval);
        Model {
            symbols,
            dm: DeclarativeMemory::new(),
            pm: ProductionMemory::new(),
            buffers,
            queue: EventQueue::new(),
            time: 0.0,
            out,
            goal,
            retrieval,
        }
    }

    fn emit(&mut self, module: &str, event: &str) {
        let _ = trace::emit(&mut *self.out, self.time, module, event);
    }

    // ---- core API ----------------------------------------------------

    pub fn define_chunk_type(&mut self, ty: ChunkType) {
        self.dm.define_type(ty);
    }

    pub fn add_dm(&mut self, chunk: Chunk) {
        self.dm.add(chunk);
    }

    pub fn add_production(&mut self, production: Production) {
        self.pm.add(production);
    }

    /// Reset DM, PM, and buffer contents.
    pub fn clear_all(&mut self) {
        self.dm.clear();
        self.pm.clear();
        let goal = self.goal;
        let retrieval = self.retrieval;
        if let Some(buf) = self.buffers.get_mut(goal) {
            buf.clear();
        }
        if let Some(buf) = self.buffers.get_mut(retrieval) {
            buf.clear();
        }
    }

    /// Schedule a SET-BUFFER-CHUNK at `now`, priority MAX, `requested =
    /// false`, for the GOAL buffer, fetching `chunk_name` from DM.
    pub fn set_goal_focus(&mut self, chunk_name: Symbol) {
        let goal = self.goal;
        self.queue.schedule(
            self.time,
            PRIORITY_MAX,
            EventKind::SetBufferChunk {
                buffer: goal,
                chunk: chunk_name,
                requested: false,
            },
        );
    }

    /// Run the model for up to `duration` seconds. Thin wrapper around
    /// `dispatcher::run`, which owns the drain loop.
    ///
    /// Does not itself seed a `CONFLICT-RESOLUTION`: the cycle is already
    /// bootstrapped by whatever state-changing event put something in the
    /// queue before `run` was called — typically `set_goal_focus`'s
    /// `SET-BUFFER-CHUNK`, whose handler schedules the first
    /// `CONFLICT-RESOLUTION` once the goal buffer is populated. Scheduling
    /// one here unconditionally would race that one and double-fire the
    /// first production.
    pub fn run(&mut self, duration: f64) -> StopReason {
        crate::dispatcher::run(self, duration)
    }

    pub(crate) fn emit_stop(&mut self, message: &str) {
        self.emit(trace::NONE, message);
    }

    pub(crate) fn advance_time(&mut self, time: f64) {
        self.time = time;
    }

    // ---- event-kind handlers ------------------------------------------

    pub fn dispatch(&mut self, kind: EventKind) {
        match kind {
            EventKind::ConflictResolution => self.on_conflict_resolution(),
            EventKind::ProductionSelected { production } => {
                self.on_production_selected(production)
            }
            EventKind::ProductionFired { production } => self.on_production_fired(production),
            EventKind::ModBufferChunk { buffer, writes } => {
                self.on_mod_buffer_chunk(buffer, writes)
            }
            EventKind::ModuleRequest { buffer, pattern } => {
                self.on_module_request(buffer, pattern)
            }
            EventKind::ClearBuffer { buffer } => self.on_clear_buffer(buffer),
            EventKind::StartRetrieval { pattern } => self.on_start_retrieval(pattern),
            EventKind::Retrieved { chunk } => self.on_retrieved(chunk),
            EventKind::RetrievalFailure => self.on_retrieval_failure(),
            EventKind::SetBufferChunk {
                buffer,
                chunk,
                requested,
            } => self.on_set_buffer_chunk(buffer, chunk, requested),
            EventKind::BufferReadAction { buffer } => {
                let name = self.symbols.name(buffer).to_string();
                self.emit(trace::PROCEDURAL, &format!("BUFFER-READ-ACTION {name}"));
            }
        }
    }

    fn on_conflict_resolution(&mut self) {
        self.emit(trace::PROCEDURAL, "CONFLICT-RESOLUTION");
        let mut selected = None;
        for idx in 0..self.pm.len() {
            let production = self.pm.get_mut(idx).unwrap();
            if matcher::match_lhs(
                &production.lhs,
                &self.buffers,
                &mut production.vars,
                &self.symbols,
            ) {
                selected = Some(idx);
                break;
            }
        }
        if let Some(idx) = selected {
            self.queue.schedule(
                self.time,
                PRIORITY_MAX,
                EventKind::ProductionSelected { production: idx },
            );
        }
    }

    fn on_production_selected(&mut self, production: usize) {
        let name = self.symbols.name(self.pm.get_mut(production).unwrap().name).to_string();
        self.emit(trace::PROCEDURAL, &format!("PRODUCTION-SELECTED {name}"));

        let buffer_conditions: Vec<Symbol> = self
            .pm
            .get_mut(production)
            .unwrap()
            .lhs
            .iter()
            .filter_map(|c| match c {
                crate::production::Condition::BufferTest { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect();
        for buffer in buffer_conditions {
            self.queue
                .schedule(self.time, 0.0, EventKind::BufferReadAction { buffer });
        }

        self.queue.schedule(
            self.time + PROCEDURAL_LATENCY,
            0.0,
            EventKind::ProductionFired { production },
        );
    }

    fn on_production_fired(&mut self, production: usize) {
        let name = self.symbols.name(self.pm.get_mut(production).unwrap().name).to_string();
        self.emit(trace::PROCEDURAL, &format!("PRODUCTION-FIRED {name}"));

        let prod = self.pm.get_mut(production).unwrap();
        rhs::fire(
            &prod.rhs,
            &prod.vars,
            &mut self.queue,
            &self.symbols,
            &mut *self.out,
            self.time,
        );

        self.queue
            .schedule(self.time, PRIORITY_MIN, EventKind::ConflictResolution);
    }

    fn on_mod_buffer_chunk(&mut self, buffer: Symbol, writes: Vec<(Symbol, Value)>) {
        let name = self.symbols.name(buffer).to_string();
        self.emit(trace::PROCEDURAL, &format!("MOD-BUFFER-CHUNK {name}"));
        match self.buffers.get_mut(buffer) {
            Some(buf) => {
                for (slot, value) in writes {
                    buf.upsert(slot, value);
                }
            }
            None => log::error!("MOD-BUFFER-CHUNK on unknown buffer {name}"),
        }
        self.queue
            .schedule(self.time, PRIORITY_MIN, EventKind::ConflictResolution);
    }

    pub fn on_module_request(&mut self, buffer: Symbol, pattern: Vec<(Symbol, Value)>) {
        let name = self.symbols.name(buffer).to_string();
        self.emit(trace::PROCEDURAL, &format!("MODULE-REQUEST {name}"));

        if buffer != self.retrieval {
            log::warn!("MODULE-REQUEST to {name} has no declarative module; ignored");
            return;
        }

        let Some(buf) = self.buffers.get_mut(buffer) else {
            log::error!("MODULE-REQUEST on unknown buffer {name}");
            return;
        };
        if buf.status == crate::buffer::BufferStatus::Busy {
            let aborted = self
                .queue
                .delete_first(|k| matches!(k, EventKind::StartRetrieval { .. }));
            if aborted {
                log::warn!("#|Warning: A retrieval event has been aborted|#");
            }
        }
        let buf = self.buffers.get_mut(buffer).unwrap();
        buf.status = crate::buffer::BufferStatus::Free;
        self.queue.schedule(
            self.time,
            priority::START_RETRIEVAL,
            EventKind::StartRetrieval { pattern },
        );
        self.buffers.get_mut(buffer).unwrap().status = crate::buffer::BufferStatus::Busy;
    }

    fn on_clear_buffer(&mut self, buffer: Symbol) {
        let name = self.symbols.name(buffer).to_string();
        self.emit(trace::PROCEDURAL, &format!("CLEAR-BUFFER {name}"));
        if let Some(buf) = self.buffers.get_mut(buffer) {
            buf.clear();
        } else {
            log::error!("CLEAR-BUFFER on unknown buffer {name}");
        }
        self.queue
            .schedule(self.time, PRIORITY_MIN, EventKind::ConflictResolution);
    }

    fn on_start_retrieval(&mut self, pattern: Vec<(Symbol, Value)>) {
        self.emit(trace::DECLARATIVE, "START-RETRIEVAL");
        let slots: Vec<SlotValue> = pattern
            .into_iter()
            .map(|(slot, value)| SlotValue { slot, value })
            .collect();
        let found = self.dm.retrieve(&slots).map(|chunk| chunk.name);
        let fire_time = self.time + RETRIEVAL_LATENCY;
        match found {
            Some(chunk_name) => {
                self.queue.schedule(
                    fire_time,
                    0.0,
                    EventKind::Retrieved { chunk: chunk_name },
                );
                // Scheduled at the same instant as `retrieved`, at MAX
                // priority, so the buffer's status transition and its
                // content population land in the same tick.
                self.queue.schedule(
                    fire_time,
                    PRIORITY_MAX,
                    EventKind::SetBufferChunk {
                        buffer: self.retrieval,
                        chunk: chunk_name,
                        requested: true,
                    },
                );
            }
            None => {
                self.queue
                    .schedule(fire_time, 0.0, EventKind::RetrievalFailure);
            }
        }
    }

    fn on_retrieved(&mut self, chunk: Symbol) {
        let name = self.symbols.name(chunk).to_string();
        self.emit(trace::DECLARATIVE, &format!("RETRIEVED-CHUNK {name}"));
        let retrieval = self.retrieval;
        if let Some(buf) = self.buffers.get_mut(retrieval) {
            buf.status = crate::buffer::BufferStatus::Free;
        }
    }

    fn on_retrieval_failure(&mut self) {
        self.emit(trace::DECLARATIVE, "RETRIEVAL-FAILURE");
        let retrieval = self.retrieval;
        if let Some(buf) = self.buffers.get_mut(retrieval) {
            buf.status = crate::buffer::BufferStatus::Error;
        }
    }

    fn on_set_buffer_chunk(&mut self, buffer: Symbol, chunk: Symbol, requested: bool) {
        let buffer_name = self.symbols.name(buffer).to_string();
        let chunk_name = self.symbols.name(chunk).to_string();
        let module = if buffer == self.goal {
            trace::GOAL
        } else if buffer == self.retrieval {
            trace::DECLARATIVE
        } else {
            trace::NONE
        };
        if requested {
            self.emit(
                module,
                &format!("SET-BUFFER-CHUNK {buffer_name} {chunk_name}"),
            );
        } else {
            self.emit(
                module,
                &format!("SET-BUFFER-CHUNK {buffer_name} {chunk_name} REQUESTED NIL"),
            );
        }
        let tail = self.dm.find_by_name(chunk).map(Chunk::tail).unwrap_or_default();
        if let Some(buf) = self.buffers.get_mut(buffer) {
            buf.set(tail);
        } else {
            log::error!("SET-BUFFER-CHUNK on unknown buffer {buffer_name}");
        }
        self.queue
            .schedule(self.time, PRIORITY_MIN, EventKind::ConflictResolution);
    }
}
