/*!
cpu - the 2A03's 6502 core.

Layout
======
```text
state.rs      - registers, status flags, stack helpers
table.rs      - 256-entry opcode table (mnemonic, mode, base cycles, legality)
addressing.rs - operand resolution without touching the effective address
execute.rs    - ALU, shift and load/store helpers
dispatch/     - instruction semantics grouped by family
core.rs       - `Cpu`: cycle stepping, DMA, interrupts, tracing
trace.rs      - `TraceLine`, one nestest-format log record per instruction
```

The CPU does not own the bus. The `Nes` root owns both and lends `&mut Bus` to every
`Cpu::clock` call.

```no_run
use nescore::bus::Bus;
use nescore::cpu::Cpu;

let mut bus = Bus::new();
let mut cpu = Cpu::new();
cpu.reset(&mut bus);
cpu.clock(&mut bus);
```
*/

pub mod addressing;
pub mod core;
pub(crate) mod dispatch;
pub(crate) mod execute;
pub mod state;
pub mod table;
pub mod trace;

pub use crate::cpu::core::{Cpu, Dispatch, Tracer};
pub use crate::cpu::state::{CpuState, Status};
pub use crate::cpu::trace::TraceLine;
