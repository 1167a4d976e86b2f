//! LDSR/STSR/TRAP/RETI/HALT/SEI/CLI/ILLEGAL, the cache-control command
//! processor, and the miscellaneous bit ops REV/XB/XH — grouped here as
//! "doesn't fit ALU/shift/branch/load-store" per SPEC_FULL.md §4.7 (donor
//! precedent: `m6809/transfer.rs` groups EXG/TFR the same way).

use super::{chcw_bits, sysreg, CacheEntry};
use crate::bus::{BusAccess, FORMAT_32, FORMAT_U16};
use crate::primitives::bit_reverse;
use crate::psw::Psw;
use crate::Context;

/// The single system-register write path (spec.md §4.2). `allow_ecr`
/// distinguishes LDSR (false) from the host direct-poke entry point (true),
/// which is the only difference between the two entry points this spec
/// describes.
pub(crate) fn write_system_register(ctx: &mut Context<'_>, id: u8, value: u32, allow_ecr: bool) {
    match id {
        sysreg::EIPC => ctx.cpu.eipc = value & !1,
        sysreg::FEPC => ctx.cpu.fepc = value & !1,
        sysreg::ADTRE => ctx.cpu.adtre = value & !1,
        sysreg::SR31 => ctx.cpu.sr31 = value & 1,
        sysreg::EIPSW => ctx.cpu.eipsw = value,
        sysreg::FEPSW => ctx.cpu.fepsw = value,
        sysreg::PSW => ctx.cpu.psw = Psw::unpack(value),
        sysreg::CHCW => cache_control(ctx, value),
        sysreg::SR29 => ctx.cpu.sr29 = value,
        sysreg::ECR if allow_ecr => ctx.cpu.ecr = value,
        sysreg::PIR | sysreg::TKCW | sysreg::SR30 | sysreg::ECR => {}
        _ => {}
    }
}

/// Process a `chcw` command write: ICC clears a directory range (only when
/// `start < 128` and `count > 0`; a range running past the end of the
/// 128-entry directory is truncated there, never wrapped), ICD dumps the
/// directory to memory, ICR restores it — ICD/ICR are mutually exclusive
/// (see DESIGN.md's Open Question resolution). `chcw` retains only the ICE
/// bit of the written value afterwards.
fn cache_control(ctx: &mut Context<'_>, value: u32) {
    if value & chcw_bits::ICC != 0 {
        let start = ((value >> 20) & 0xFFF) as usize;
        let mut count = ((value >> 8) & 0xFFF) as usize;
        if start < 128 && count > 0 {
            if start + count > 128 {
                count = 128 - start;
            }
            for idx in start..start + count {
                ctx.cpu.cache.entries[idx] = CacheEntry::default();
            }
        }
    }

    let dump = value & chcw_bits::ICD != 0;
    let restore = value & chcw_bits::ICR != 0;
    if dump && !restore {
        let base = value & 0xFFFF_FF00;
        let entries = *ctx.cpu.cache.entries;
        for (idx, entry) in entries.iter().enumerate() {
            let addr = base.wrapping_add((idx as u32) * 8);
            ctx.cpu_write(BusAccess::new(addr, FORMAT_32), entry.tag as i32);
            ctx.cpu_write(BusAccess::new(addr + 4, FORMAT_U16), entry.words[0] as i32);
            ctx.cpu_write(BusAccess::new(addr + 6, FORMAT_U16), entry.words[1] as i32);
        }
    } else if restore && !dump {
        let base = value & 0xFFFF_FF00;
        for idx in 0..128 {
            let addr = base.wrapping_add((idx as u32) * 8);
            let tag = ctx.cpu_read(BusAccess::new(addr, FORMAT_32)) as u32;
            let word0 = ctx.cpu_read(BusAccess::new(addr + 4, FORMAT_U16)) as u16;
            let word1 = ctx.cpu_read(BusAccess::new(addr + 6, FORMAT_U16)) as u16;
            ctx.cpu.cache.entries[idx] = CacheEntry {
                tag,
                words: [word0, word1],
            };
        }
    }

    ctx.cpu.chcw = value & chcw_bits::ICE;
}

pub(crate) fn ldsr(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let id = (i.imm_or_disp & 0x1F) as u8;
    let value = ctx.cpu.reg(i.reg2) as u32;
    write_system_register(ctx, id, value, false);
}

pub(crate) fn stsr(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let id = (i.imm_or_disp & 0x1F) as u8;
    let value = ctx.cpu.system_register(id);
    ctx.cpu.set_reg(i.reg2, value as i32);
}

pub(crate) fn trap(ctx: &mut Context<'_>) {
    let vector = (ctx.cpu.instruction.imm_or_disp & 0xF) as u16;
    ctx.raise_exception(0xFFA0 | vector);
}

pub(crate) fn reti(ctx: &mut Context<'_>) {
    let (pc, psw_word) = if ctx.cpu.psw.np {
        (ctx.cpu.fepc, ctx.cpu.fepsw)
    } else {
        (ctx.cpu.eipc, ctx.cpu.eipsw)
    };
    ctx.cpu.pc = pc & !1;
    ctx.cpu.psw = Psw::unpack(psw_word);
}

pub(crate) fn halt(ctx: &mut Context<'_>) {
    ctx.cpu.halt = true;
}

pub(crate) fn sei(ctx: &mut Context<'_>) {
    ctx.cpu.psw.id = true;
}

pub(crate) fn cli(ctx: &mut Context<'_>) {
    ctx.cpu.psw.id = false;
}

pub(crate) fn illegal(ctx: &mut Context<'_>) {
    ctx.raise_exception(0xFF90);
}

pub(crate) fn rev(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let value = bit_reverse(ctx.cpu.reg(i.reg1) as u32);
    ctx.cpu.set_reg(i.reg2, value as i32);
}

/// Swap the two low bytes of reg2; the upper halfword is untouched.
pub(crate) fn xb(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let value = ctx.cpu.reg(i.reg2) as u32;
    let low = value & 0xFFFF;
    let swapped = ((low << 8) | (low >> 8)) & 0xFFFF;
    ctx.cpu.set_reg(i.reg2, ((value & 0xFFFF_0000) | swapped) as i32);
}

/// Swap the two halfwords of reg2.
pub(crate) fn xh(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let value = ctx.cpu.reg(i.reg2) as u32;
    ctx.cpu.set_reg(i.reg2, value.rotate_left(16) as i32);
}
