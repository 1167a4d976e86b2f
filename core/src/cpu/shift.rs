//! SHL/SHR/SAR, register and immediate forms. Shift amount is always the
//! low 5 bits of the right operand (spec.md §4.7); zero-shift is a special
//! case that clears carry and passes the input through unchanged.

use crate::Context;

fn shl(ctx: &mut Context<'_>, left: i32, amount: u32) -> i32 {
    let n = amount & 0x1F;
    let (result, cy) = if n == 0 {
        (left, false)
    } else {
        let result = ((left as u32) << n) as i32;
        let cy = (left as u32 >> (32 - n)) & 1 != 0;
        (result, cy)
    };
    ctx.cpu.psw.cy = cy;
    ctx.cpu.psw.ov = false;
    ctx.cpu.psw.set_zs(result as u32);
    result
}

fn shr(ctx: &mut Context<'_>, left: i32, amount: u32) -> i32 {
    let n = amount & 0x1F;
    let (result, cy) = if n == 0 {
        (left, false)
    } else {
        let result = ((left as u32) >> n) as i32;
        let cy = (left as u32 >> (n - 1)) & 1 != 0;
        (result, cy)
    };
    ctx.cpu.psw.cy = cy;
    ctx.cpu.psw.ov = false;
    ctx.cpu.psw.set_zs(result as u32);
    result
}

fn sar(ctx: &mut Context<'_>, left: i32, amount: u32) -> i32 {
    let n = amount & 0x1F;
    let (result, cy) = if n == 0 {
        (left, false)
    } else {
        let result = left >> n;
        let cy = (left as u32 >> (n - 1)) & 1 != 0;
        (result, cy)
    };
    ctx.cpu.psw.cy = cy;
    ctx.cpu.psw.ov = false;
    ctx.cpu.psw.set_zs(result as u32);
    result
}

pub(crate) fn shl_reg(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let left = ctx.cpu.reg(i.reg2);
    let amount = ctx.cpu.reg(i.reg1) as u32;
    let result = shl(ctx, left, amount);
    ctx.cpu.set_reg(i.reg2, result);
}

pub(crate) fn shl_imm(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let left = ctx.cpu.reg(i.reg2);
    let amount = i.imm_or_disp as u32;
    let result = shl(ctx, left, amount);
    ctx.cpu.set_reg(i.reg2, result);
}

pub(crate) fn shr_reg(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let left = ctx.cpu.reg(i.reg2);
    let amount = ctx.cpu.reg(i.reg1) as u32;
    let result = shr(ctx, left, amount);
    ctx.cpu.set_reg(i.reg2, result);
}

pub(crate) fn shr_imm(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let left = ctx.cpu.reg(i.reg2);
    let amount = i.imm_or_disp as u32;
    let result = shr(ctx, left, amount);
    ctx.cpu.set_reg(i.reg2, result);
}

pub(crate) fn sar_reg(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let left = ctx.cpu.reg(i.reg2);
    let amount = ctx.cpu.reg(i.reg1) as u32;
    let result = sar(ctx, left, amount);
    ctx.cpu.set_reg(i.reg2, result);
}

pub(crate) fn sar_imm(ctx: &mut Context<'_>) {
    let i = ctx.cpu.instruction;
    let left = ctx.cpu.reg(i.reg2);
    let amount = i.imm_or_disp as u32;
    let result = sar(ctx, left, amount);
    ctx.cpu.set_reg(i.reg2, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContextConfig;

    fn test_context(rom: &[u8]) -> Context<'_> {
        Context::new(ContextConfig { rom, sram: None }).unwrap()
    }

    #[test]
    fn shl_by_zero_clears_carry() {
        let rom = [0u8; 1024];
        let mut ctx = test_context(&rom);
        ctx.cpu.registers[2] = 0x1234;
        ctx.cpu.instruction.reg2 = 2;
        ctx.cpu.instruction.imm_or_disp = 0;
        shl_imm(&mut ctx);
        assert!(!ctx.cpu.psw.cy);
        assert_eq!(ctx.cpu.registers[2], 0x1234);
    }

    #[test]
    fn shl_by_one_of_sign_bit_sets_carry_and_zeroes() {
        let rom = [0u8; 1024];
        let mut ctx = test_context(&rom);
        ctx.cpu.registers[2] = 0x8000_0000u32 as i32;
        ctx.cpu.instruction.reg2 = 2;
        ctx.cpu.instruction.imm_or_disp = 1;
        shl_imm(&mut ctx);
        assert!(ctx.cpu.psw.cy);
        assert_eq!(ctx.cpu.registers[2], 0);
        assert!(ctx.cpu.psw.z);
    }

    #[test]
    fn sar_preserves_sign() {
        let rom = [0u8; 1024];
        let mut ctx = test_context(&rom);
        ctx.cpu.registers[2] = -8;
        ctx.cpu.instruction.reg2 = 2;
        ctx.cpu.instruction.imm_or_disp = 1;
        sar_imm(&mut ctx);
        assert_eq!(ctx.cpu.registers[2], -4);
    }
}
