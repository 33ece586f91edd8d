#![no_main]

use cordyceps_avl::model::{run_queue_equivalence, QueueOp};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|ops: Vec<QueueOp>| { run_queue_equivalence(ops) });
