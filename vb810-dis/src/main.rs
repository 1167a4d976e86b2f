//! Flat-binary disassembler: walks a V810 image instruction by instruction
//! using [`vb810_core::Context::fetch`] and prints a mnemonic listing.
//! Grounded in the donor's `phosphor-frontend` binary crate (argument
//! parsing with `clap`'s derive macros); carries no CPU logic of its own
//! beyond the mnemonic formatter below.

use std::path::PathBuf;

use clap::Parser;
use vb810_core::{Context, ContextConfig, Instruction, InstructionId};

/// Base address of the cart ROM bus region (`(address >> 24) & 7 == 7`);
/// the natural default starting point for disassembling a flat ROM image.
const CART_ROM_BASE: u32 = 0x0700_0000;

#[derive(Parser)]
#[command(about = "Disassemble a flat V810 binary image")]
struct Args {
    /// Path to the flat binary ROM image.
    image: PathBuf,

    /// Address of the first instruction to disassemble, e.g. `0x07000100`.
    #[arg(long, value_parser = parse_address, default_value_t = CART_ROM_BASE)]
    start: u32,

    /// Number of instructions to print (defaults to the rest of the image).
    #[arg(long)]
    count: Option<usize>,
}

fn parse_address(raw: &str) -> Result<u32, std::num::ParseIntError> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    }
}

/// Round `len` up to the next power of two, at least 1024 bytes, matching
/// the minimum [`ContextConfig`] ROM size `Context::new` requires. A flat
/// image rarely comes pre-sized this way; the padding is zero-filled and
/// read back as the mirrored tail of the ROM, consistent with how the bus
/// router masks addresses against a power-of-two buffer.
fn padded_rom(mut image: Vec<u8>) -> Vec<u8> {
    let target = image.len().max(1024).next_power_of_two();
    image.resize(target, 0);
    image
}

fn main() {
    let args = Args::parse();

    let raw = std::fs::read(&args.image).unwrap_or_else(|err| {
        eprintln!("failed to read {}: {err}", args.image.display());
        std::process::exit(1);
    });
    let rom = padded_rom(raw);

    let ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap_or_else(|err| {
        eprintln!("failed to construct context: {err}");
        std::process::exit(1);
    });

    let mut address = args.start;
    let mut printed = 0usize;
    loop {
        if let Some(count) = args.count
            && printed >= count
        {
            break;
        }
        let instr = ctx.fetch(address);
        println!("{address:08x}: {}", mnemonic(&instr));
        address = address.wrapping_add(instr.size);
        printed += 1;
        if args.count.is_none() && printed >= rom.len() {
            break;
        }
    }
}

fn reg(n: u8) -> String {
    format!("r{n}")
}

/// Render one [`Instruction`] as a plausible assembler mnemonic. Not a
/// faithful reproduction of the official V810 assembler's syntax in every
/// corner case (e.g. pseudo-op aliasing); good enough to read a listing by.
fn mnemonic(instr: &Instruction) -> String {
    use InstructionId::*;
    let r1 = reg(instr.reg1);
    let r2 = reg(instr.reg2);
    let imm = instr.imm_or_disp;
    match instr.id() {
        MovReg => format!("mov {r1}, {r2}"),
        MovImm => format!("mov {imm}, {r2}"),
        AddReg => format!("add {r1}, {r2}"),
        AddImm => format!("add {imm}, {r2}"),
        AddI => format!("addi {imm}, {r1}, {r2}"),
        Sub => format!("sub {r1}, {r2}"),
        CmpReg => format!("cmp {r1}, {r2}"),
        CmpImm => format!("cmp {imm}, {r2}"),
        ShlReg => format!("shl {r1}, {r2}"),
        ShlImm => format!("shl {imm}, {r2}"),
        ShrReg => format!("shr {r1}, {r2}"),
        ShrImm => format!("shr {imm}, {r2}"),
        SarReg => format!("sar {r1}, {r2}"),
        SarImm => format!("sar {imm}, {r2}"),
        Jmp => format!("jmp [{r1}]"),
        Mul => format!("mul {r1}, {r2}"),
        Mulu => format!("mulu {r1}, {r2}"),
        Div => format!("div {r1}, {r2}"),
        Divu => format!("divu {r1}, {r2}"),
        Or => format!("or {r1}, {r2}"),
        Ori => format!("ori {imm}, {r1}, {r2}"),
        And => format!("and {r1}, {r2}"),
        Andi => format!("andi {imm}, {r1}, {r2}"),
        Xor => format!("xor {r1}, {r2}"),
        Xori => format!("xori {imm}, {r1}, {r2}"),
        Not => format!("not {r1}, {r2}"),
        Setf => format!("setf {}, {r2}", instr.condition),
        Cli => "cli".to_string(),
        Sei => "sei".to_string(),
        Trap => format!("trap {imm}"),
        Reti => "reti".to_string(),
        Halt => "halt".to_string(),
        Ldsr => format!("ldsr {r2}, {}", imm & 0x1F),
        Stsr => format!("stsr {}, {r2}", imm & 0x1F),
        Bcond => format!("b{} 0x{:08x}", instr.condition, instr.address),
        Movea => format!("movea {imm}, {r1}, {r2}"),
        Movhi => format!("movhi {imm}, {r1}, {r2}"),
        Jr => format!("jr 0x{:08x}", instr.address),
        Jal => format!("jal 0x{:08x}", instr.address),
        LdB => format!("ld.b {imm}[{r1}], {r2}"),
        LdH => format!("ld.h {imm}[{r1}], {r2}"),
        LdW => format!("ld.w {imm}[{r1}], {r2}"),
        StB => format!("st.b {r2}, {imm}[{r1}]"),
        StH => format!("st.h {r2}, {imm}[{r1}]"),
        StW => format!("st.w {r2}, {imm}[{r1}]"),
        InB => format!("in.b {imm}[{r1}], {r2}"),
        InH => format!("in.h {imm}[{r1}], {r2}"),
        InW => format!("in.w {imm}[{r1}], {r2}"),
        OutB => format!("out.b {r2}, {imm}[{r1}]"),
        OutH => format!("out.h {r2}, {imm}[{r1}]"),
        OutW => format!("out.w {r2}, {imm}[{r1}]"),
        Caxi => format!("caxi {imm}[{r1}], {r2}"),
        Mpyhw => format!("mpyhw {r1}, {r2}"),
        Rev => format!("rev {r1}, {r2}"),
        Xb => format!("xb {r2}"),
        Xh => format!("xh {r2}"),
        BitString { sub } => bitstring_mnemonic(sub),
        Illegal => format!("illegal (0x{:04x})", instr.bits),
    }
}

fn bitstring_mnemonic(sub: u8) -> String {
    match sub {
        0 => "sch0bsu".to_string(),
        1 => "sch0bsd".to_string(),
        2 => "sch1bsu".to_string(),
        3 => "sch1bsd".to_string(),
        8 => "orbsu".to_string(),
        9 => "andbsu".to_string(),
        10 => "xorbsu".to_string(),
        11 => "movbsu".to_string(),
        12 => "ornbsu".to_string(),
        13 => "andnbsu".to_string(),
        14 => "xornbsu".to_string(),
        15 => "notbsu".to_string(),
        other => format!("reserved-bitstring-{other}"),
    }
}
