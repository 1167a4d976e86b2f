//! Bcond/JR/JAL/JMP. Bcond/JR/JAL consume the `is_true`/`address` fields the
//! decode stage precomputed (spec.md §4.4); JMP reads `registers[reg1]`
//! directly since it carries no displacement to precompute.

use crate::Context;

pub(crate) fn bcond(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    if i.is_true {
        ctx.cpu.pc = i.address;
    }
}

pub(crate) fn jr(ctx: &mut Context<'_>) {
    ctx.cpu.pc = ctx.cpu.instruction.address;
}

pub(crate) fn jal(ctx: &mut Context<'_>) {
    let return_address = ctx.cpu.pc;
    ctx.cpu.set_reg(31, return_address as i32);
    ctx.cpu.pc = ctx.cpu.instruction.address;
}

pub(crate) fn jmp(ctx: &mut Context<'_>) {
    let target = (ctx.cpu.reg(ctx.cpu.instruction.reg1) as u32) & !1;
    ctx.cpu.pc = target;
}
