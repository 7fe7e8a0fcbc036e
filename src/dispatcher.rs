//! The run loop: dequeues events in `(time, priority)` order and hands
//! each to the model's dispatch table until the queue empties or the
//! time limit is reached.

use crate::model::{Model, StopReason};

/// Drain `model.queue` until empty or until an event's time exceeds
/// `duration`. The per-event dispatch is a `match` in `Model::dispatch`.
pub fn run(model: &mut Model, duration: f64) -> StopReason {
    loop {
        let Some(event) = model.queue.dequeue() else {
            model.emit_stop("Stopped because no events left");
            return StopReason::NoEventsLeft;
        };
        if event.time > duration {
            model.emit_stop("Stopped because time limit reached");
            return StopReason::TimeLimitReached;
        }
        model.advance_time(event.time);
        model.dispatch(event.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::chunk::SlotValue;
    use crate::value::Value;
    use std::io::Write;

    fn sink() -> Box<dyn Write> {
        Box::new(Vec::new())
    }

    #[test]
    fn stops_with_no_events_left_once_queue_drains() {
        let mut model = Model::new(sink());
        let reason = run(&mut model, 10.0);
        assert!(matches!(reason, StopReason::NoEventsLeft));
    }

    #[test]
    fn stops_at_time_limit_when_goal_focus_keeps_cycle_alive() {
        let mut model = Model::new(sink());
        let a = model.symbols.intern("a");
        let start = model.symbols.intern("start");
        model.add_dm(Chunk::new(
            a,
            vec![SlotValue {
                slot: start,
                value: Value::Number(1.0),
            }],
        ));
        model.set_goal_focus(a);
        let reason = run(&mut model, 0.0);
        assert!(matches!(
            reason,
            StopReason::TimeLimitReached | StopReason::NoEventsLeft
        ));
    }
}
