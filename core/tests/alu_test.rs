//! ALU boundary behaviors (ADD/SUB/MUL/DIV overflow, carry, and the signed
//! divide-by-`i32::MIN` special case), driven end to end through
//! `Context::emulate`. Programs are seeded directly into the ROM buffer at
//! the post-reset vector, since `pc` has no external setter and the reset
//! vector's bus region is read-only at runtime (see the div-by-zero test
//! in `context.rs` for the same technique).

use vb810_core::{Context, ContextConfig};

const RESET_VECTOR: u32 = 0xFFFF_FFF0;

fn seed(rom: &mut [u8], halfwords: &[u16]) {
    let base = (RESET_VECTOR & (rom.len() as u32 - 1)) as usize;
    for (i, hw) in halfwords.iter().enumerate() {
        let offset = base + i * 2;
        rom[offset] = (*hw & 0xFF) as u8;
        rom[offset + 1] = (*hw >> 8) as u8;
    }
}

fn run_program(ctx: &mut Context<'_>, costs: &[i64]) {
    // Clear the power-on duplexed-exception flag so later tests in the
    // program take the regular (non-fatal) exception entry path.
    ctx.set_system_register(6, 0); // PSW
    for &cost in costs {
        let mut budget = cost;
        ctx.emulate(&mut budget);
    }
}

fn movhi(reg1: u8, reg2: u8, imm: u16) -> (u16, u16) {
    ((47u16 << 10) | ((reg2 as u16) << 5) | reg1 as u16, imm)
}

fn ori(reg1: u8, reg2: u8, imm: u16) -> (u16, u16) {
    ((44u16 << 10) | ((reg2 as u16) << 5) | reg1 as u16, imm)
}

fn mov_imm(reg2: u8, imm5: u16) -> u16 {
    (16u16 << 10) | ((reg2 as u16) << 5) | (imm5 & 0x1F)
}

fn add_reg(reg1: u8, reg2: u8) -> u16 {
    (1u16 << 10) | ((reg2 as u16) << 5) | reg1 as u16
}

fn sub(reg1: u8, reg2: u8) -> u16 {
    (2u16 << 10) | ((reg2 as u16) << 5) | reg1 as u16
}

fn mul(reg1: u8, reg2: u8) -> u16 {
    (8u16 << 10) | ((reg2 as u16) << 5) | reg1 as u16
}

fn div(reg1: u8, reg2: u8) -> u16 {
    (9u16 << 10) | ((reg2 as u16) << 5) | reg1 as u16
}

#[test]
fn add_overflow_flips_sign_without_carry() {
    let mut rom = [0u8; 1024];
    // r1 = 0x7FFFFFFF via MOVHI 0x7FFF, r0, r1 / ORI 0xFFFF, r1, r1.
    let (mh1, mh2) = movhi(0, 1, 0x7FFF);
    let (or1, or2) = ori(1, 1, 0xFFFF);
    seed(
        &mut rom,
        &[
            mh1,
            mh2,
            or1,
            or2,
            mov_imm(2, 1),   // r2 = 1
            add_reg(1, 2),   // r2 = r2 + r1
        ],
    );
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    run_program(&mut ctx, &[1, 1, 1, 1]);

    assert_eq!(ctx.register(2) as u32, 0x8000_0000);
    let psw = ctx.get_system_register(6);
    assert_eq!(psw & 0b1111, 0b0110); // s=1, ov=1, z=0, cy=0
}

#[test]
fn sub_zero_minus_one_sets_carry_without_overflow() {
    let mut rom = [0u8; 1024];
    seed(
        &mut rom,
        &[
            mov_imm(1, 0), // r1 = 0
            mov_imm(2, 1), // r2 = 1
            sub(2, 1),     // r1 = r1 - r2
        ],
    );
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    run_program(&mut ctx, &[1, 1, 1]);

    assert_eq!(ctx.register(1) as u32, 0xFFFF_FFFF);
    let psw = ctx.get_system_register(6);
    assert_eq!(psw & 0b1111, 0b1010); // s=1, cy=1, ov=0, z=0
}

#[test]
fn mul_overflow_spills_into_register_thirty() {
    let mut rom = [0u8; 1024];
    let (mh1a, mh1b) = movhi(0, 1, 1); // r1 = 0x10000
    let (mh2a, mh2b) = movhi(0, 2, 1); // r2 = 0x10000
    seed(&mut rom, &[mh1a, mh1b, mh2a, mh2b, mul(1, 2)]);
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    run_program(&mut ctx, &[1, 1, 13]);

    assert_eq!(ctx.register(2), 0); // low 32 bits of 2^32
    assert_eq!(ctx.register(30), 1); // high 32 bits
    assert_ne!(ctx.get_system_register(6) & 0b100, 0); // ov
}

#[test]
fn div_min_by_negative_one_is_the_documented_special_case() {
    let mut rom = [0u8; 1024];
    let (mh1, mh2) = movhi(0, 2, 0x8000); // r2 = i32::MIN
    seed(&mut rom, &[mh1, mh2, mov_imm(1, 0b11111), div(1, 2)]); // r1 = -1
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    run_program(&mut ctx, &[1, 1, 38]);

    assert_eq!(ctx.register(2), i32::MIN);
    assert_eq!(ctx.register(30), 0);
    assert_ne!(ctx.get_system_register(6) & 0b100, 0); // ov
}

#[test]
fn div_by_zero_enters_the_regular_exception_vector() {
    let mut rom = [0u8; 1024];
    // r4 = 100 (dividend); r3 stays 0 (divisor) for DIV r3, r4.
    seed(&mut rom, &[mov_imm(4, 100), div(3, 4)]);
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    run_program(&mut ctx, &[1, 38]);

    assert_eq!(ctx.get_system_register(5) & 0xFFFF, 0xFF80); // ECR
    assert_eq!(ctx.pc(), 0xFFFF_FF80);
    assert!(!ctx.halted());
}
