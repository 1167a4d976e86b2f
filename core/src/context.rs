//! [`Context`]: the aggregate host entry point. Owns WRAM, borrows cartridge
//! ROM/RAM from the host, nests the [`Cpu`], and drives the FETCH16/FETCH32/
//! EXECUTE/INTERRUPT pipeline one `emulate` budget at a time. Mirrors the
//! donor's `Machine` trait's `run_frame` entry point, collapsed to a single
//! concrete type since this crate emulates one fixed CPU, not a family.

use crate::bus::{self, BusAccess, BusMemories, FORMAT_32, FORMAT_U16};
use crate::condition::evaluate_condition;
use crate::cpu::{self, Cpu, Stage};
use crate::decode::{self, Instruction, InstructionId};
use crate::error::ContextError;
use crate::psw::Psw;

/// CPU-internal read hook: when installed, replaces the bus read entirely
/// (mirrors `original_source/cpu.c`'s `cpuRead`, which returns the hook's
/// result directly and only falls through to `busRead` when no hook is
/// installed). The hook writes the replacement value through `value_out`;
/// its own return is a break code, latched the same way a non-zero return
/// from any other debug hook is.
type ReadHook<'a> = Box<dyn FnMut(&mut Context<'a>, BusAccess, &mut i32) -> i32 + 'a>;
/// CPU-internal write hook: when installed, replaces the bus write entirely
/// (mirrors `cpuWrite`); the hook receives the value being written and is
/// responsible for applying it, and its return is a break code.
type WriteHook<'a> = Box<dyn FnMut(&mut Context<'a>, BusAccess, i32) -> i32 + 'a>;
/// Execute-phase debug hook: a non-zero return aborts dispatch for this step.
type ExecuteHook<'a> = Box<dyn FnMut(&mut Context<'a>) -> i32 + 'a>;
/// Exception-entry debug hook: a non-zero return aborts applying the
/// exception for this call.
type ExceptionHook<'a> = Box<dyn FnMut(&mut Context<'a>, u16) -> i32 + 'a>;

#[derive(Default)]
struct Debug<'a> {
    onread: Option<ReadHook<'a>>,
    onwrite: Option<WriteHook<'a>>,
    onexecute: Option<ExecuteHook<'a>>,
    onexception: Option<ExceptionHook<'a>>,
}

/// Buffers supplied at construction, per spec.md §6's "Configuration" table.
pub struct ContextConfig<'a> {
    pub rom: &'a [u8],
    pub sram: Option<&'a mut [u8]>,
}

/// The entire emulated machine: WRAM, borrowed cartridge buffers, CPU state,
/// elapsed-cycle accumulator, and debug hooks. No hidden globals.
pub struct Context<'a> {
    wram: Box<[u8; 0x1_0000]>,
    cart_rom: &'a [u8],
    cart_ram: Option<&'a mut [u8]>,
    pub(crate) cpu: Cpu,
    /// Accumulator for cycles elapsed in the current `emulate` call.
    pub(crate) cycles: i64,
    /// PC captured at FETCH16 entry, before any advance this instruction.
    /// Branch/jump/load-store address precomputation uses this value, not
    /// `cpu.pc`, which is already advanced by the time EXECUTE dispatches.
    fetch_pc: u32,
    pending_break: Option<i32>,
    debug: Debug<'a>,
}

fn is_power_of_two_len(len: usize) -> bool {
    len.is_power_of_two()
}

impl<'a> Context<'a> {
    /// Construct a context from a ROM (required) and optional save RAM.
    /// Rejects a ROM that's empty, smaller than 1024 bytes, or not a power
    /// of two, and save RAM that's non-empty and not a power of two.
    pub fn new(config: ContextConfig<'a>) -> Result<Self, ContextError> {
        if config.rom.is_empty() || config.rom.len() < 1024 || !is_power_of_two_len(config.rom.len()) {
            return Err(ContextError::InvalidArgument(
                "rom must be a power-of-two size of at least 1024 bytes",
            ));
        }
        if let Some(sram) = &config.sram
            && !sram.is_empty()
            && !is_power_of_two_len(sram.len())
        {
            return Err(ContextError::InvalidArgument(
                "sram must be empty or a power-of-two size",
            ));
        }

        Ok(Self {
            wram: Box::new([0u8; 0x1_0000]),
            cart_rom: config.rom,
            cart_ram: config.sram,
            cpu: Cpu::default(),
            cycles: 0,
            fetch_pc: 0,
            pending_break: None,
            debug: Debug::default(),
        })
    }

    /// Zero all CPU state and re-establish the post-reset vector
    /// (`pc=0xFFFFFFF0`, `psw.np=1`, `ecr=0xFFF0`); lent buffers and debug
    /// hooks are untouched.
    pub fn reset(&mut self) {
        self.cpu = Cpu::default();
        self.cycles = 0;
        self.fetch_pc = 0;
        self.pending_break = None;
    }

    fn memories(&mut self) -> BusMemories<'_> {
        BusMemories {
            wram: &mut self.wram,
            cart_rom: self.cart_rom,
            cart_ram: self.cart_ram.as_deref_mut(),
        }
    }

    /// Perform a single host-facing bus read (spec.md §6). Invalid formats
    /// read as 0. Matches `original_source/vue.c`'s `vueRead`: goes straight
    /// to the bus router and never consults the CPU-internal debug hooks
    /// (those only run on bus traffic the pipeline itself generates; see
    /// `cpu_read`).
    pub fn read(&mut self, access: BusAccess) -> i32 {
        if !access.is_valid_format() {
            return 0;
        }
        let access = BusAccess::new(access.aligned_address(), access.format);
        let memories = self.memories();
        bus::read(&memories, access)
    }

    /// Perform a single host-facing bus write (spec.md §6). Invalid formats
    /// are ignored. Matches `vueWrite`: no debug hook involved.
    pub fn write(&mut self, access: BusAccess, value: i32) {
        if !access.is_valid_format() {
            return;
        }
        let access = BusAccess::new(access.aligned_address(), access.format);
        let mut memories = self.memories();
        bus::write(&mut memories, access, value);
    }

    /// Perform a bus read on behalf of the CPU pipeline or an executor.
    /// Matches `cpuRead`: when `onread` is installed it replaces the real
    /// bus read, supplying the value and a break code itself; `bus::read`
    /// only runs when no hook is installed.
    pub(crate) fn cpu_read(&mut self, access: BusAccess) -> i32 {
        if !access.is_valid_format() {
            return 0;
        }
        let access = BusAccess::new(access.aligned_address(), access.format);
        if let Some(mut hook) = self.debug.onread.take() {
            let mut value = 0;
            let code = hook(self, access, &mut value);
            self.debug.onread = Some(hook);
            if code != 0 {
                self.pending_break.get_or_insert(code);
            }
            return value;
        }
        let memories = self.memories();
        bus::read(&memories, access)
    }

    /// Perform a bus write on behalf of the CPU pipeline or an executor.
    /// Matches `cpuWrite`: when `onwrite` is installed it replaces the real
    /// bus write; `bus::write` only runs when no hook is installed.
    pub(crate) fn cpu_write(&mut self, access: BusAccess, value: i32) {
        if !access.is_valid_format() {
            return;
        }
        let access = BusAccess::new(access.aligned_address(), access.format);
        if let Some(mut hook) = self.debug.onwrite.take() {
            let code = hook(self, access, value);
            self.debug.onwrite = Some(hook);
            if code != 0 {
                self.pending_break.get_or_insert(code);
            }
            return;
        }
        let mut memories = self.memories();
        bus::write(&mut memories, access, value);
    }

    /// Decode a single instruction at `address` without executing it or
    /// touching `pc`/`cycles`/the pipeline stage. Used by disassemblers.
    pub fn fetch(&self, address: u32) -> Instruction {
        let cart_ram = self.cart_ram.as_deref();
        let first = bus::peek(&self.wram, self.cart_rom, cart_ram, address, FORMAT_U16) as u16;
        let mut instr = decode::decode_first_half(first);
        if instr.size == 4 {
            let second = bus::peek(&self.wram, self.cart_rom, cart_ram, address.wrapping_add(2), FORMAT_U16) as u16;
            decode::decode_second_half(&mut instr, second);
        }
        finalize_fields(&mut instr, address, &self.cpu.psw, &self.cpu.registers);
        instr
    }

    /// Evaluate a 4-bit condition code against the current PSW.
    pub fn check_condition(&self, condition: u8) -> bool {
        evaluate_condition(condition, &self.cpu.psw)
    }

    /// Read a system register by ID.
    pub fn get_system_register(&self, id: u8) -> u32 {
        self.cpu.system_register(id)
    }

    /// Write a system register by ID through the host direct-poke entry
    /// point, which (unlike LDSR) may overwrite ECR wholesale.
    pub fn set_system_register(&mut self, id: u8, value: u32) {
        cpu::system::write_system_register(self, id, value, true);
    }

    /// Latch a pending interrupt at `level` (0..4); cleared when taken.
    pub fn raise_irq(&mut self, level: u8) {
        if let Some(slot) = self.cpu.irq.get_mut(level as usize) {
            *slot = true;
        }
    }

    /// Current program counter. Not one of spec.md §6's enumerated entry
    /// points, but a host debugging a guest (or a test observing pipeline
    /// effects) has no other way to see it: debug hooks run inside this
    /// crate and can't reach a `pub(crate)` field, and `pc` isn't a system
    /// register reachable through `get_system_register`.
    pub fn pc(&self) -> u32 {
        self.cpu.pc
    }

    /// Current value of general register `index & 0x1F` (`r0` always 0).
    pub fn register(&self, index: u8) -> i32 {
        self.cpu.reg(index)
    }

    /// Whether the CPU is halted (entered via `HALT` or a fatal exception).
    pub fn halted(&self) -> bool {
        self.cpu.halt
    }

    /// Install the CPU-internal read hook. Called in place of `bus::read`
    /// for every bus access the pipeline itself generates; the closure
    /// writes the replacement value through its third argument and returns
    /// a break code.
    pub fn set_debug_on_read<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Context<'a>, BusAccess, &mut i32) -> i32 + 'a,
    {
        self.debug.onread = Some(Box::new(hook));
    }

    /// Install the CPU-internal write hook. Called in place of `bus::write`
    /// for every bus access the pipeline itself generates; the closure
    /// receives the value being written and returns a break code.
    pub fn set_debug_on_write<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Context<'a>, BusAccess, i32) -> i32 + 'a,
    {
        self.debug.onwrite = Some(Box::new(hook));
    }

    pub fn set_debug_on_execute<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Context<'a>) -> i32 + 'a,
    {
        self.debug.onexecute = Some(Box::new(hook));
    }

    pub fn set_debug_on_exception<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Context<'a>, u16) -> i32 + 'a,
    {
        self.debug.onexception = Some(Box::new(hook));
    }

    /// Enter the exception-entry routine for `cause` (spec.md §4.8): a
    /// fatal/duplexed/regular three-way branch on the current PSW state.
    /// Calls the `onexception` hook first; a non-zero return aborts
    /// applying the exception and is returned directly.
    pub(crate) fn raise_exception(&mut self, cause: u16) -> i32 {
        if let Some(mut hook) = self.debug.onexception.take() {
            let code = hook(self, cause);
            self.debug.onexception = Some(hook);
            if code != 0 {
                self.pending_break.get_or_insert(code);
                return code;
            }
        }

        if self.cpu.psw.np {
            let burst = 0xFFFF_0000u32 | cause as u32;
            self.cpu_write(BusAccess::new(0x0000_0000, FORMAT_32), burst as i32);
            self.cpu_write(BusAccess::new(0x0000_0004, FORMAT_32), self.cpu.psw.pack() as i32);
            self.cpu_write(BusAccess::new(0x0000_0008, FORMAT_32), self.cpu.pc as i32);
            self.cpu.halt = true;
            return 0;
        }

        if self.cpu.psw.ep {
            self.cpu.fepc = self.cpu.pc;
            self.cpu.fepsw = self.cpu.psw.pack();
            self.cpu.ecr = (self.cpu.ecr & 0x0000_FFFF) | ((cause as u32) << 16);
            self.cpu.psw.np = true;
            self.cpu.pc = 0xFFFF_FFD0;
        } else {
            self.cpu.eipc = self.cpu.pc;
            self.cpu.eipsw = self.cpu.psw.pack();
            self.cpu.ecr = (self.cpu.ecr & 0xFFFF_0000) | cause as u32;
            self.cpu.psw.ep = true;
            let vector = if cause == 0xFF70 { 0xFF60 } else { cause & 0xFFF0 };
            self.cpu.pc = 0xFFFF_0000 | vector as u32;
        }

        self.cpu.psw.id = true;
        self.cpu.psw.ae = false;
        if (0xFE00..=0xFEFF).contains(&cause) {
            self.cpu.psw.i = (((cause >> 4) & 0xF) + 1) as u8;
            self.cpu.halt = false;
        }
        0
    }

    /// Advance the pipeline until `cycles` is exhausted or a debug callback
    /// requests a break; returns 0 or that break code.
    pub fn emulate(&mut self, cycles: &mut i64) -> i32 {
        while *cycles > 0 {
            let before = self.cycles;
            let code = self.step();
            *cycles -= self.cycles - before;
            if code != 0 {
                return code;
            }
        }
        0
    }

    fn step(&mut self) -> i32 {
        match self.cpu.stage {
            Stage::Fetch16 => self.do_fetch16(),
            Stage::Fetch32 => self.do_fetch32(),
            Stage::Execute => self.do_execute(),
            Stage::Interrupt => self.do_interrupt(),
        }
    }

    fn do_fetch16(&mut self) -> i32 {
        let fetch_pc = self.cpu.pc;
        let half = self.cpu_read(BusAccess::new(fetch_pc, FORMAT_U16)) as u16;
        let mut instr = decode::decode_first_half(half);
        if instr.size == 2 {
            finalize_fields(&mut instr, fetch_pc, &self.cpu.psw, &self.cpu.registers);
            self.cpu.instruction = instr;
            self.cpu.pc = fetch_pc.wrapping_add(2) & !1;
            self.cpu.stage = Stage::Execute;
        } else {
            self.cpu.instruction = instr;
            self.fetch_pc = fetch_pc;
            self.cpu.stage = Stage::Fetch32;
        }
        self.pending_break.take().unwrap_or(0)
    }

    fn do_fetch32(&mut self) -> i32 {
        let second_pc = self.fetch_pc.wrapping_add(2);
        let second_half = self.cpu_read(BusAccess::new(second_pc, FORMAT_U16)) as u16;
        let mut instr = self.cpu.instruction;
        decode::decode_second_half(&mut instr, second_half);
        finalize_fields(&mut instr, self.fetch_pc, &self.cpu.psw, &self.cpu.registers);
        self.cpu.instruction = instr;
        self.cpu.pc = self.fetch_pc.wrapping_add(instr.size) & !1;
        self.cpu.stage = Stage::Execute;
        self.pending_break.take().unwrap_or(0)
    }

    fn do_execute(&mut self) -> i32 {
        if let Some(mut hook) = self.debug.onexecute.take() {
            let code = hook(self);
            self.debug.onexecute = Some(hook);
            if code != 0 {
                return code;
            }
        }

        let id = self.cpu.instruction.id();
        dispatch(self, id);
        self.cpu.pin_register_zero();
        self.cycles += cpu::pipeline::cycle_cost(id, self.cpu.instruction.is_true);
        self.cpu.stage = Stage::Interrupt;
        self.pending_break.take().unwrap_or(0)
    }

    fn do_interrupt(&mut self) -> i32 {
        for level in (0..=4u8).rev() {
            let pending = self.cpu.irq[level as usize];
            let maskable =
                !self.cpu.psw.np && !self.cpu.psw.ep && !self.cpu.psw.id && self.cpu.psw.i <= level;
            if pending && maskable {
                let cause = 0xFE00u16 | ((level as u16) << 4);
                if self.raise_exception(cause) == 0 {
                    self.cpu.irq[level as usize] = false;
                }
                break;
            }
        }
        if !self.cpu.halt {
            self.cpu.stage = Stage::Fetch16;
        }
        self.pending_break.take().unwrap_or(0)
    }
}

/// Precompute the fields the decoder can't fill in without CPU context:
/// Bcond's taken/target, JR/JAL's target, and load/store/CAXI's effective
/// address. `fetch_pc` is the instruction's own (pre-advance) address.
fn finalize_fields(instr: &mut Instruction, fetch_pc: u32, psw: &Psw, registers: &[i32; 32]) {
    use InstructionId::*;
    match instr.id() {
        Bcond => {
            instr.address = (fetch_pc as i64 + instr.imm_or_disp as i64) as u32 & !1;
            instr.is_true = evaluate_condition(instr.condition, psw);
        }
        Jr | Jal => {
            instr.address = (fetch_pc as i64 + instr.imm_or_disp as i64) as u32 & !1;
        }
        LdB | LdH | LdW | StB | StH | StW | InB | InH | InW | OutB | OutH | OutW | Caxi => {
            let base = registers[instr.reg1 as usize & 0x1F];
            instr.address = instr.imm_or_disp.wrapping_add(base) as u32;
        }
        _ => {}
    }
}

/// Dispatch one instruction to its executor, grouped by family per
/// `cpu::{alu,shift,branch,load_store,bitstring,system}`.
fn dispatch(ctx: &mut Context<'_>, id: InstructionId) {
    use InstructionId::*;
    match id {
        MovReg => cpu::alu::mov_reg(ctx),
        MovImm => cpu::alu::mov_imm(ctx),
        AddReg => cpu::alu::add_reg(ctx),
        AddImm => cpu::alu::add_imm(ctx),
        AddI => cpu::alu::addi(ctx),
        Sub => cpu::alu::sub(ctx),
        CmpReg => cpu::alu::cmp_reg(ctx),
        CmpImm => cpu::alu::cmp_imm(ctx),
        ShlReg => cpu::shift::shl_reg(ctx),
        ShlImm => cpu::shift::shl_imm(ctx),
        ShrReg => cpu::shift::shr_reg(ctx),
        ShrImm => cpu::shift::shr_imm(ctx),
        SarReg => cpu::shift::sar_reg(ctx),
        SarImm => cpu::shift::sar_imm(ctx),
        Jmp => cpu::branch::jmp(ctx),
        Mul => cpu::alu::mul(ctx),
        Mulu => cpu::alu::mulu(ctx),
        Div => cpu::alu::div(ctx),
        Divu => cpu::alu::divu(ctx),
        Or => cpu::alu::or_reg(ctx),
        Ori => cpu::alu::ori(ctx),
        And => cpu::alu::and_reg(ctx),
        Andi => cpu::alu::andi(ctx),
        Xor => cpu::alu::xor_reg(ctx),
        Xori => cpu::alu::xori(ctx),
        Not => cpu::alu::not(ctx),
        Setf => cpu::alu::setf(ctx),
        Cli => cpu::system::cli(ctx),
        Sei => cpu::system::sei(ctx),
        Trap => cpu::system::trap(ctx),
        Reti => cpu::system::reti(ctx),
        Halt => cpu::system::halt(ctx),
        Ldsr => cpu::system::ldsr(ctx),
        Stsr => cpu::system::stsr(ctx),
        Bcond => cpu::branch::bcond(ctx),
        Movea => cpu::alu::movea(ctx),
        Movhi => cpu::alu::movhi(ctx),
        Jr => cpu::branch::jr(ctx),
        Jal => cpu::branch::jal(ctx),
        LdB => cpu::load_store::ld_b(ctx),
        LdH => cpu::load_store::ld_h(ctx),
        LdW => cpu::load_store::ld_w(ctx),
        StB => cpu::load_store::st_b(ctx),
        StH => cpu::load_store::st_h(ctx),
        StW => cpu::load_store::st_w(ctx),
        InB => cpu::load_store::in_b(ctx),
        InH => cpu::load_store::in_h(ctx),
        InW => cpu::load_store::in_w(ctx),
        OutB => cpu::load_store::out_b(ctx),
        OutH => cpu::load_store::out_h(ctx),
        OutW => cpu::load_store::out_w(ctx),
        Caxi => cpu::load_store::caxi(ctx),
        Mpyhw => cpu::alu::mpyhw(ctx),
        Rev => cpu::system::rev(ctx),
        Xb => cpu::system::xb(ctx),
        Xh => cpu::system::xh(ctx),
        BitString { sub } => cpu::bitstring::execute(ctx, sub),
        Illegal => cpu::system::illegal(ctx),
    }
}
