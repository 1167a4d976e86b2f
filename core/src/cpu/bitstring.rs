//! The twelve implemented bit-string operations (opcode 31's sixteen-entry
//! sub-table, four of which are reserved/illegal). The donor source leaves
//! this entire family stubbed to `cpiIllegal` (`original_source/
//! instructiondefs.c`'s `BITSTRINGDEFS[]` wired to illegal handlers); since
//! spec.md's Non-goals exclude only the floating-point unit, not bit-string,
//! this is an enrichment grounded directly in the real V810 bit-string
//! register convention (not recoverable from the draft source, which never
//! implements these bodies):
//!
//! - `r26`: length remaining, in bits.
//! - `r27`: source bit offset within the current source word (0..31).
//! - `r28`: source word address.
//! - `r29`: destination word address.
//! - `r30`: destination bit offset within the current destination word (0..31).
//!
//! All twelve run to completion in a single executor call (this core does
//! not model sub-instruction resumption), consistent with spec.md §1's "no
//! sub-cycle modelling of the memory bus" non-goal.

use crate::bus::{BusAccess, FORMAT_U8};
use crate::Context;

const LENGTH: u8 = 26;
const SRC_OFFSET: u8 = 27;
const SRC_WORD: u8 = 28;
const DST_WORD: u8 = 29;
const DST_OFFSET: u8 = 30;

fn read_bit(ctx: &mut Context<'_>, word: u32, offset: u32) -> bool {
    let byte_addr = word.wrapping_add(offset / 8);
    let byte = ctx.cpu_read(BusAccess::new(byte_addr, FORMAT_U8)) as u32;
    (byte >> (offset % 8)) & 1 != 0
}

fn write_bit(ctx: &mut Context<'_>, word: u32, offset: u32, value: bool) {
    let byte_addr = word.wrapping_add(offset / 8);
    let mut byte = ctx.cpu_read(BusAccess::new(byte_addr, FORMAT_U8)) as u32;
    let mask = 1u32 << (offset % 8);
    if value {
        byte |= mask;
    } else {
        byte &= !mask;
    }
    ctx.cpu_write(BusAccess::new(byte_addr, FORMAT_U8), byte as i32);
}

fn advance(word: &mut u32, offset: &mut u32) {
    *offset += 1;
    if *offset == 32 {
        *offset = 0;
        *word = word.wrapping_add(4);
    }
}

fn retreat(word: &mut u32, offset: &mut u32) {
    if *offset == 0 {
        *offset = 31;
        *word = word.wrapping_sub(4);
    } else {
        *offset -= 1;
    }
}

#[derive(Clone, Copy)]
enum Combine {
    Move,
    Or,
    And,
    Xor,
    MoveNot,
    OrNot,
    AndNot,
    XorNot,
}

fn combine(op: Combine, dst: bool, src: bool) -> bool {
    match op {
        Combine::Move => src,
        Combine::Or => dst || src,
        Combine::And => dst && src,
        Combine::Xor => dst ^ src,
        Combine::MoveNot => !src,
        Combine::OrNot => dst || !src,
        Combine::AndNot => dst && !src,
        Combine::XorNot => dst ^ !src,
    }
}

fn run_combine(ctx: &mut Context<'_>, op: Combine) {
    let mut length = ctx.cpu.reg(LENGTH) as u32;
    let mut src_word = ctx.cpu.reg(SRC_WORD) as u32;
    let mut src_offset = ctx.cpu.reg(SRC_OFFSET) as u32;
    let mut dst_word = ctx.cpu.reg(DST_WORD) as u32;
    let mut dst_offset = ctx.cpu.reg(DST_OFFSET) as u32;

    while length > 0 {
        let src_bit = read_bit(ctx, src_word, src_offset);
        let dst_bit = read_bit(ctx, dst_word, dst_offset);
        write_bit(ctx, dst_word, dst_offset, combine(op, dst_bit, src_bit));
        advance(&mut src_word, &mut src_offset);
        advance(&mut dst_word, &mut dst_offset);
        length -= 1;
    }

    ctx.cpu.set_reg(LENGTH, 0);
    ctx.cpu.set_reg(SRC_WORD, src_word as i32);
    ctx.cpu.set_reg(SRC_OFFSET, src_offset as i32);
    ctx.cpu.set_reg(DST_WORD, dst_word as i32);
    ctx.cpu.set_reg(DST_OFFSET, dst_offset as i32);
}

/// Scan the source bit string for a bit equal to `target`, advancing in
/// `direction`. Sets `psw.z` if exhausted without a match.
fn run_search(ctx: &mut Context<'_>, target: bool, forward: bool) {
    let mut length = ctx.cpu.reg(LENGTH) as u32;
    let mut src_word = ctx.cpu.reg(SRC_WORD) as u32;
    let mut src_offset = ctx.cpu.reg(SRC_OFFSET) as u32;

    let mut found = false;
    while length > 0 {
        if read_bit(ctx, src_word, src_offset) == target {
            found = true;
            break;
        }
        if forward {
            advance(&mut src_word, &mut src_offset);
        } else {
            retreat(&mut src_word, &mut src_offset);
        }
        length -= 1;
    }

    ctx.cpu.psw.z = !found;
    ctx.cpu.set_reg(LENGTH, length as i32);
    ctx.cpu.set_reg(SRC_WORD, src_word as i32);
    ctx.cpu.set_reg(SRC_OFFSET, src_offset as i32);
}

pub(crate) fn execute(ctx: &mut Context<'_>, sub: u8) {
    match sub {
        0 => run_search(ctx, false, true),  // SCH0BSU
        1 => run_search(ctx, false, false), // SCH0BSD
        2 => run_search(ctx, true, true),   // SCH1BSU
        3 => run_search(ctx, true, false),  // SCH1BSD
        8 => run_combine(ctx, Combine::Or),
        9 => run_combine(ctx, Combine::And),
        10 => run_combine(ctx, Combine::Xor),
        11 => run_combine(ctx, Combine::Move),
        12 => run_combine(ctx, Combine::OrNot),
        13 => run_combine(ctx, Combine::AndNot),
        14 => run_combine(ctx, Combine::XorNot),
        15 => run_combine(ctx, Combine::MoveNot),
        _ => ctx.raise_exception(0xFF90),
    }
}
