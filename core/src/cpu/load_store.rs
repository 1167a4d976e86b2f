//! LD/ST/IN/OUT and CAXI. Addresses are the `address` field the decode
//! stage precomputed as `displacement + registers[reg1]` (spec.md §4.4).
//! LD sign-extends on read; IN zero-extends; ST/OUT never sign-extend.

use crate::bus::{BusAccess, FORMAT_32, FORMAT_S8, FORMAT_S16, FORMAT_U8, FORMAT_U16};
use crate::Context;

fn load(ctx: &mut Context<'_>, format: u8) {
    let i = ctx.cpu.instruction;
    let value = ctx.cpu_read(BusAccess::new(i.address, format));
    ctx.cpu.set_reg(i.reg2, value);
}

fn store(ctx: &mut Context<'_>, format: u8) {
    let i = ctx.cpu.instruction;
    let value = ctx.cpu.reg(i.reg2);
    ctx.cpu_write(BusAccess::new(i.address, format), value);
}

pub(crate) fn ld_b(ctx: &mut Context<'_>) {
    load(ctx, FORMAT_S8);
}
pub(crate) fn ld_h(ctx: &mut Context<'_>) {
    load(ctx, FORMAT_S16);
}
pub(crate) fn ld_w(ctx: &mut Context<'_>) {
    load(ctx, FORMAT_32);
}
pub(crate) fn st_b(ctx: &mut Context<'_>) {
    store(ctx, FORMAT_U8);
}
pub(crate) fn st_h(ctx: &mut Context<'_>) {
    store(ctx, FORMAT_U16);
}
pub(crate) fn st_w(ctx: &mut Context<'_>) {
    store(ctx, FORMAT_32);
}
pub(crate) fn in_b(ctx: &mut Context<'_>) {
    load(ctx, FORMAT_U8);
}
pub(crate) fn in_h(ctx: &mut Context<'_>) {
    load(ctx, FORMAT_U16);
}
pub(crate) fn in_w(ctx: &mut Context<'_>) {
    load(ctx, FORMAT_32);
}
pub(crate) fn out_b(ctx: &mut Context<'_>) {
    store(ctx, FORMAT_U8);
}
pub(crate) fn out_h(ctx: &mut Context<'_>) {
    store(ctx, FORMAT_U16);
}
pub(crate) fn out_w(ctx: &mut Context<'_>) {
    store(ctx, FORMAT_32);
}

/// CAXI: atomic compare-and-exchange-interlocked. Reads the word at
/// `address`, compares it against `reg2` (updating flags the way SUB
/// does), then always writes back: `registers[30]` on a match, the
/// original value otherwise.
pub(crate) fn caxi(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let original = ctx.cpu_read(BusAccess::new(i.address, FORMAT_32));
    let compare = ctx.cpu.reg(i.reg2);

    let result = original.wrapping_sub(compare);
    ctx.cpu.psw.cy = (compare as u32) > (original as u32);
    ctx.cpu.psw.ov = ((original ^ compare) & (original ^ result)) < 0;
    ctx.cpu.psw.set_zs(result as u32);

    let matched = original == compare;
    let write_value = if matched { ctx.cpu.registers[30] } else { original };
    ctx.cpu_write(BusAccess::new(i.address, FORMAT_32), write_value);
    ctx.cpu.set_reg(i.reg2, original);
}
