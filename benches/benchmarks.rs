criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(20)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        matching_lhs_against_goal_buffer,
        scheduling_events_into_the_queue,
        dequeuing_a_full_queue,
        retrieving_from_a_populated_dm,
        running_the_counting_model,
}

fn matching_lhs_against_goal_buffer(c: &mut criterion::Criterion) {
    let mut table = SymbolTable::new();
    let goal = table.intern("GOAL");
    let retrieval = table.intern("RETRIEVAL");
    let start = table.intern("START");
    let end = table.intern("END");
    let mut buffers = BufferTable::new(goal, retrieval);
    buffers.get_mut(goal).unwrap().upsert(start, Value::Number(1.0));
    buffers.get_mut(goal).unwrap().upsert(end, Value::Number(3.0));

    let mut vars = VarTable::new();
    let x = vars.intern(table.intern("=X"));
    let lhs = vec![Condition::BufferTest {
        buffer: goal,
        tests: vec![
            SlotTest { modifier: Modifier::Eq, slot: start, value: Operand::Variable(x) },
            SlotTest { modifier: Modifier::Lt, slot: end, value: Operand::Number(10.0) },
        ],
    }];

    c.bench_function("match a two-condition LHS against the goal buffer", |b| {
        b.iter(|| match_lhs(&lhs, &buffers, &mut vars, &table))
    });
}

fn scheduling_events_into_the_queue(c: &mut criterion::Criterion) {
    c.bench_function("schedule 1000 events into an empty queue", |b| {
        b.iter(|| {
            let mut queue = EventQueue::new();
            for i in 0..1000 {
                queue.schedule(i as f64 * 0.01, 50.0, EventKind::ConflictResolution);
            }
            queue
        })
    });
}

fn dequeuing_a_full_queue(c: &mut criterion::Criterion) {
    c.bench_function("drain a 1000-event queue", |b| {
        b.iter_batched(
            || {
                let mut queue = EventQueue::new();
                for i in 0..1000 {
                    queue.schedule(i as f64 * 0.01, 50.0, EventKind::ConflictResolution);
                }
                queue
            },
            |mut queue| while queue.dequeue().is_some() {},
            criterion::BatchSize::SmallInput,
        )
    });
}

fn retrieving_from_a_populated_dm(c: &mut criterion::Criterion) {
    let mut table = SymbolTable::new();
    let isa = table.intern("ISA");
    let count_order = table.intern("COUNT-ORDER");
    let first = table.intern("FIRST");
    let second = table.intern("SECOND");
    let mut dm = DeclarativeMemory::new();
    for i in 0..200 {
        let name = table.intern(&format!("C{i}"));
        dm.add(Chunk::new(
            name,
            vec![
                SlotValue { slot: isa, value: Value::Symbol(count_order) },
                SlotValue { slot: first, value: Value::Number(i as f64) },
                SlotValue { slot: second, value: Value::Number((i + 1) as f64) },
            ],
        ));
    }
    let pattern = vec![
        SlotValue { slot: isa, value: Value::Symbol(count_order) },
        SlotValue { slot: first, value: Value::Number(150.0) },
    ];

    c.bench_function("retrieve a late chunk from a 200-chunk DM", |b| {
        b.iter(|| dm.retrieve(&pattern))
    });
}

fn running_the_counting_model(c: &mut criterion::Criterion) {
    const MODEL: &str = r#"
        (DEFINE-MODEL COUNTING
            (CHUNK-TYPE COUNT-ORDER FIRST SECOND)
            (CHUNK-TYPE COUNT GOAL START END)
            (ADD-DM
                (A ISA COUNT-ORDER FIRST 1 SECOND 2)
                (B ISA COUNT-ORDER FIRST 2 SECOND 3)
                (G ISA COUNT GOAL START 1 END 3))
            (P START
                =GOAL>
                    ISA COUNT
                    START =X
                    - END =X
                ==>
                +RETRIEVAL>
                    ISA COUNT-ORDER
                    FIRST =X)
            (P INCREMENT
                =GOAL>
                    ISA COUNT
                    START =X
                =RETRIEVAL>
                    ISA COUNT-ORDER
                    FIRST =X
                    SECOND =Y
                ==>
                =GOAL>
                    START =Y
                -RETRIEVAL>)
            (GOAL-FOCUS G))
    "#;

    c.bench_function("load and run the counting model to quiescence", |b| {
        b.iter(|| {
            let mut model = Model::new(Box::new(Vec::new()));
            isactr::loader::load(&mut model, MODEL);
            model.run(1.0);
        })
    });
}

use isactr::buffer::BufferTable;
use isactr::cell::VarTable;
use isactr::chunk::{Chunk, DeclarativeMemory, SlotValue};
use isactr::event::{EventKind, EventQueue};
use isactr::matcher::match_lhs;
use isactr::model::Model;
use isactr::production::{Condition, Modifier, Operand, SlotTest};
use isactr::value::{SymbolTable, Value};
