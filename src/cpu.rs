use bitflags::bitflags;

use crate::grid::Grid;
use crate::isa::{AddressingMode, MoveVariant, OPCODES, OpSpec};

// Register file indices. R6 and R7 double as the program counter and the
// stack pointer.
pub const PC: usize = 6;
pub const SP: usize = 7;

// Interrupt vectors live in the fixed low-memory region; each holds the
// single-byte entry address for its interrupt.
pub const ILLEGAL_VECTOR: u16 = 0x02;
pub const TIMER_VECTOR: u16 = 0x03;
pub const TRAP_VECTOR: u16 = 0x04;

// Timer control cells.
pub const TIMER_TARGET: usize = 0x0a; // fires when the tick count reaches this
pub const TIMER_TICKS: usize = 0x0b; // ticks accumulated so far
pub const TIMER_DIVISOR: usize = 0x0c; // cycles per tick
pub const TIMER_MODE: usize = 0x0d; // 0 off, 1 one-shot, 2 repeating

// Programs are loaded here and the PC starts here; everything below is the
// color signature, the vectors and the timer cells.
pub const LOAD_OFFSET: usize = 0x10;

bitflags! {
    /// Condition codes, kept in a 16-bit word so the whole register can be
    /// pushed and popped around interrupts.
    pub struct CpuFlags: u16 {
        const C = 0b001; // carry / borrow
        const Z = 0b010; // zero
        const N = 0b100; // negative (bit 15 of the result)
    }
}

impl CpuFlags {
    // The setters only ever OR their bit in; an operation that wants a
    // fresh set must call reset() itself. Data-movement instructions and
    // interrupt entry deliberately skip the reset and accumulate.
    pub fn set_c(&mut self, value: bool) {
        if value {
            self.insert(CpuFlags::C);
        }
    }

    pub fn set_z(&mut self, value: bool) {
        if value {
            self.insert(CpuFlags::Z);
        }
    }

    pub fn set_n(&mut self, value: bool) {
        if value {
            self.insert(CpuFlags::N);
        }
    }

    pub fn carry(&self) -> bool {
        self.contains(CpuFlags::C)
    }

    pub fn zero(&self) -> bool {
        self.contains(CpuFlags::Z)
    }

    pub fn negative(&self) -> bool {
        self.contains(CpuFlags::N)
    }

    pub fn reset(&mut self) {
        *self = CpuFlags::empty();
    }
}

/// Everything that can go wrong while decoding or executing one
/// instruction. The executive routes the first three to the ILLEGAL vector
/// and swallows the rest: guest programs are adversarial and must never
/// take the host loop down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Unknown opcode or an undecodable operand-mode bit pattern.
    IllegalInstruction,
    /// An immediate operand used as a store destination.
    IllegalOperand,
    /// A cross-CPU delta that escapes the 16x16 board.
    OutOfBounds,
    /// A register number >= 8 reached through an operand value field.
    BadRegister,
}

/// Decoded operand payload. The shape always matches the table arity for
/// the opcode that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    One {
        mode: AddressingMode,
        value: u8,
    },
    Two {
        mode: AddressingMode,
        value: u8,
        register: u8,
    },
    Move {
        variant: MoveVariant,
        src_mode: AddressingMode,
        dst_mode: AddressingMode,
        // Three-bit field of the first word: the register-numbered side.
        small: u8,
        // Trailing 16-bit field: the immediate/absolute side, or the
        // destination register number when neither side is wide.
        wide: u16,
    },
}

impl Operands {
    pub fn one(&self) -> Result<(AddressingMode, u8), Fault> {
        match *self {
            Operands::One { mode, value } => Ok((mode, value)),
            _ => Err(Fault::IllegalInstruction),
        }
    }

    pub fn two(&self) -> Result<(AddressingMode, u8, u8), Fault> {
        match *self {
            Operands::Two { mode, value, register } => Ok((mode, value, register)),
            _ => Err(Fault::IllegalInstruction),
        }
    }

    pub fn mv(&self) -> Result<(MoveVariant, AddressingMode, AddressingMode, u8, u16), Fault> {
        match *self {
            Operands::Move { variant, src_mode, dst_mode, small, wide } => {
                Ok((variant, src_mode, dst_mode, small, wide))
            }
            _ => Err(Fault::IllegalInstruction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub spec: &'static OpSpec,
    pub operands: Operands,
    pub length: u16,
}

/// Decode the instruction starting at `pc`. Short instructions are the
/// 16-bit `opcode:5 | a:3 | b:8` word; move re-reads a 32-bit word. A
/// window that escapes the buffer is undecodable, same as a bad opcode.
pub fn decode(memory: &[u8], pc: u16) -> Result<Decoded, Fault> {
    let pc = pc as usize;
    if pc + 2 > memory.len() {
        return Err(Fault::IllegalInstruction);
    }
    let byte0 = memory[pc];
    let byte1 = memory[pc + 1];
    let opcode = byte0 >> 3;
    let spec = OPCODES.get(&opcode).ok_or(Fault::IllegalInstruction)?;

    if spec.length == 4 {
        // 32-bit move: opcode:5 | variant:2 | src:3 | dst:3 | small:3 | wide:16.
        if pc + 4 > memory.len() {
            return Err(Fault::IllegalInstruction);
        }
        let variant = MoveVariant::from_bits((byte0 >> 1) & 0b11)?;
        let src_mode = AddressingMode::from_bits((byte0 & 0b1) << 2 | byte1 >> 6)?;
        let dst_mode = AddressingMode::from_bits((byte1 >> 3) & 0b111)?;
        let small = byte1 & 0b111;
        let wide = (memory[pc + 2] as u16) << 8 | memory[pc + 3] as u16;
        return Ok(Decoded {
            spec,
            operands: Operands::Move { variant, src_mode, dst_mode, small, wide },
            length: 4,
        });
    }

    let operands = match spec.arity {
        0 => Operands::None,
        1 => Operands::One {
            // Single operand: mode in the low three bits of byte 0, value
            // is the whole second byte.
            mode: AddressingMode::from_bits(byte0 & 0b111)?,
            value: byte1,
        },
        _ => Operands::Two {
            // Destination register in byte 0; source mode and five-bit
            // value packed into byte 1.
            mode: AddressingMode::from_bits(byte1 >> 5)?,
            value: byte1 & 0b11111,
            register: byte0 & 0b111,
        },
    };
    Ok(Decoded { spec, operands, length: 2 })
}

/// A resolved store destination: a register or a local memory cell.
pub(crate) enum Slot {
    Reg(usize),
    Mem(u8),
}

pub struct Cpu {
    // 256 bytes, byte-addressed. 0x00-0x01 color signature, 0x02-0x04
    // interrupt vectors, 0x0a-0x0d timer cells, 0x10.. program.
    pub memory: [u8; 256],
    // Eight 16-bit registers; R6 = PC, R7 = SP.
    pub registers: [u16; 8],
    pub flags: CpuFlags,
    // Board coordinates, fixed once the cell is placed.
    pub pos_x: usize,
    pub pos_y: usize,
    // Timer subcounter; counts execute() calls up to the divisor.
    current_cycle: u32,
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            memory: [0; 256],
            registers: [0; 8],
            flags: CpuFlags::empty(),
            pos_x: 0,
            pos_y: 0,
            current_cycle: 0,
        }
    }

    /// Copy a program image to the load offset and point the PC at it.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), String> {
        if program.len() > self.memory.len() - LOAD_OFFSET {
            return Err(format!(
                "program is {} bytes, at most {} fit",
                program.len(),
                self.memory.len() - LOAD_OFFSET
            ));
        }
        self.memory[LOAD_OFFSET..LOAD_OFFSET + program.len()].copy_from_slice(program);
        self.registers[PC] = LOAD_OFFSET as u16;
        Ok(())
    }

    /// The 16-bit color signature at 0x00-0x01; this is what the
    /// tournament scores.
    pub fn color(&self) -> u16 {
        (self.memory[0] as u16) << 8 | self.memory[1] as u16
    }

    pub fn set_color(&mut self, color: u16) {
        self.memory[0] = (color >> 8) as u8;
        self.memory[1] = (color & 0xff) as u8;
    }

    // Data addresses are 8-bit by construction: every access masks, so a
    // wrapped stack pointer lands back inside the 256-byte window.
    pub(crate) fn read_u8(&self, addr: u16) -> u8 {
        self.memory[(addr & 0x00ff) as usize]
    }

    pub(crate) fn write_u8(&mut self, addr: u16, value: u8) {
        self.memory[(addr & 0x00ff) as usize] = value;
    }

    /// Push a word: SP moves down by two, high byte at the lower address.
    /// N and Z of the pushed value accumulate into the flags.
    pub(crate) fn push_u16(&mut self, value: u16) {
        self.registers[SP] = self.registers[SP].wrapping_sub(2);
        let sp = self.registers[SP];
        self.write_u8(sp, (value >> 8) as u8);
        self.write_u8(sp.wrapping_add(1), (value & 0xff) as u8);
        self.flags.set_n(value & 0x8000 != 0);
        self.flags.set_z(value == 0);
    }

    /// Pop a word: read at SP, SP moves up by two. Same flag accumulation
    /// as push.
    pub(crate) fn pop_u16(&mut self) -> u16 {
        let sp = self.registers[SP];
        let value = (self.read_u8(sp) as u16) << 8 | self.read_u8(sp.wrapping_add(1)) as u16;
        self.registers[SP] = self.registers[SP].wrapping_add(2);
        self.flags.set_n(value & 0x8000 != 0);
        self.flags.set_z(value == 0);
        value
    }

    fn reg_index(value: u8) -> Result<usize, Fault> {
        if value < 8 {
            Ok(value as usize)
        } else {
            Err(Fault::BadRegister)
        }
    }

    /// Read path of the addressing unit: resolve (mode, value) to a value.
    /// Memory-backed modes yield one byte of local memory; `step` is the
    /// register stride (2 for words, 1 for move.h/move.l).
    pub(crate) fn operand_value(
        &mut self,
        mode: AddressingMode,
        value: u8,
        step: u16,
    ) -> Result<u16, Fault> {
        match mode {
            AddressingMode::Register => Ok(self.registers[Self::reg_index(value)?]),
            AddressingMode::PreDecrement => {
                let r = Self::reg_index(value)?;
                self.registers[r] = self.registers[r].wrapping_sub(step);
                Ok(self.read_u8(self.registers[r]) as u16)
            }
            AddressingMode::Indirect => {
                let r = Self::reg_index(value)?;
                Ok(self.read_u8(self.registers[r]) as u16)
            }
            AddressingMode::PostIncrement => {
                let r = Self::reg_index(value)?;
                let byte = self.read_u8(self.registers[r]) as u16;
                self.registers[r] = self.registers[r].wrapping_add(step);
                Ok(byte)
            }
            AddressingMode::Immediate => Ok(value as u16),
            AddressingMode::Absolute => Ok(self.read_u8(value as u16) as u16),
        }
    }

    /// Write path of the addressing unit: resolve (mode, value) to a
    /// storable location. Immediates cannot be written.
    pub(crate) fn operand_slot(
        &mut self,
        mode: AddressingMode,
        value: u8,
        step: u16,
    ) -> Result<Slot, Fault> {
        match mode {
            AddressingMode::Register => Ok(Slot::Reg(Self::reg_index(value)?)),
            AddressingMode::PreDecrement => {
                let r = Self::reg_index(value)?;
                self.registers[r] = self.registers[r].wrapping_sub(step);
                Ok(Slot::Mem((self.registers[r] & 0xff) as u8))
            }
            AddressingMode::Indirect => {
                let r = Self::reg_index(value)?;
                Ok(Slot::Mem((self.registers[r] & 0xff) as u8))
            }
            AddressingMode::PostIncrement => {
                let r = Self::reg_index(value)?;
                let addr = (self.registers[r] & 0xff) as u8;
                self.registers[r] = self.registers[r].wrapping_add(step);
                Ok(Slot::Mem(addr))
            }
            AddressingMode::Immediate => Err(Fault::IllegalOperand),
            AddressingMode::Absolute => Ok(Slot::Mem(value)),
        }
    }

    /// Resolve a packed delta byte (dx in the low nibble, dy in the high,
    /// each 4-bit two's-complement) to the CPU it names. Delta (0,0) is
    /// the executing CPU itself, which the grid currently has moved out.
    pub(crate) fn relative_cpu<'a>(
        &'a mut self,
        grid: &'a mut Grid,
        delta: u8,
    ) -> Result<&'a mut Cpu, Fault> {
        fn nibble(bits: u8) -> i32 {
            (((bits << 4) as i8) >> 4) as i32
        }
        let x = self.pos_x as i32 + nibble(delta & 0x0f);
        let y = self.pos_y as i32 + nibble(delta >> 4);
        if x < 0 || x >= Grid::WIDTH as i32 || y < 0 || y >= Grid::HEIGHT as i32 {
            return Err(Fault::OutOfBounds);
        }
        if (x as usize, y as usize) == (self.pos_x, self.pos_y) {
            Ok(self)
        } else {
            Ok(&mut grid.cells[y as usize][x as usize])
        }
    }

    /// Shared branch tail: the operand is resolved only when the branch is
    /// taken, then added to the PC (which already points past the
    /// instruction).
    pub(crate) fn branch_if(
        &mut self,
        taken: bool,
        mode: AddressingMode,
        value: u8,
    ) -> Result<(), Fault> {
        if taken {
            let offset = self.operand_value(mode, value, 2)?;
            self.registers[PC] = self.registers[PC].wrapping_add(offset);
        }
        Ok(())
    }

    /// Shared jump tail: the operand is always resolved (its side effects
    /// happen even on a failed predicate), the PC is assigned only when
    /// taken.
    pub(crate) fn jump_if(
        &mut self,
        taken: bool,
        mode: AddressingMode,
        value: u8,
    ) -> Result<(), Fault> {
        let target = self.operand_value(mode, value, 2)?;
        if taken {
            self.registers[PC] = target;
        }
        Ok(())
    }

    /// Enter an interrupt: push the PC, load the PC from the vector cell,
    /// push the flags word. Uses the ordinary word push, so the pushes'
    /// N/Z side effects land in the flags before they are saved.
    pub(crate) fn interrupt(&mut self, vector: u16) {
        self.push_u16(self.registers[PC]);
        self.registers[PC] = self.read_u8(vector) as u16;
        let flags = self.flags.bits();
        self.push_u16(flags);
    }

    /// Count one executed instruction against the programmable timer.
    /// Every `memory[0x0c]` cycles one tick accumulates in 0x0b; when the
    /// ticks reach the target in 0x0a the TIMER interrupt fires. One-shot
    /// mode disarms itself, repeating mode starts the next period.
    fn tick_timer(&mut self) {
        let mode = self.memory[TIMER_MODE];
        if mode != 1 && mode != 2 {
            return;
        }
        self.current_cycle += 1;
        if self.current_cycle == self.memory[TIMER_DIVISOR] as u32 {
            self.current_cycle = 0;
            self.memory[TIMER_TICKS] = self.memory[TIMER_TICKS].wrapping_add(1);
            if self.memory[TIMER_TICKS] == self.memory[TIMER_TARGET] {
                self.memory[TIMER_TICKS] = 0;
                self.memory[TIMER_MODE] = if mode == 1 { 0 } else { 2 };
                self.interrupt(TIMER_VECTOR);
            }
        }
    }

    /// Run the instruction at the PC: fetch, decode, advance the PC past
    /// the instruction, dispatch, then tick the timer. Undecodable fetches
    /// enter the ILLEGAL vector immediately; faults from the handler
    /// either enter ILLEGAL or are swallowed, and the loop always returns
    /// normally.
    pub fn execute(&mut self, grid: &mut Grid) {
        let decoded = match decode(&self.memory, self.registers[PC]) {
            Ok(decoded) => decoded,
            Err(_) => {
                self.interrupt(ILLEGAL_VECTOR);
                return;
            }
        };
        self.registers[PC] = self.registers[PC].wrapping_add(decoded.length);
        match (decoded.spec.handler)(self, grid, &decoded.operands) {
            Ok(()) => {}
            Err(Fault::IllegalInstruction) | Err(Fault::IllegalOperand) | Err(Fault::OutOfBounds) => {
                self.interrupt(ILLEGAL_VECTOR)
            }
            Err(Fault::BadRegister) => {}
        }
        self.tick_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_cpu_init() {
        let cpu = Cpu::new();
        assert_eq!(cpu.registers, [0; 8]);
        assert_eq!(cpu.flags, CpuFlags::empty());
        assert!(cpu.memory.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_load_program() {
        let mut cpu = Cpu::new();
        cpu.load_program(&[0x19, 0x00, 0xd0, 0x00]).unwrap();
        assert_eq!(cpu.memory[LOAD_OFFSET], 0x19);
        assert_eq!(cpu.memory[LOAD_OFFSET + 3], 0x00);
        assert_eq!(cpu.registers[PC], LOAD_OFFSET as u16);
    }

    #[test]
    fn test_load_program_too_large() {
        let mut cpu = Cpu::new();
        let image = vec![0u8; 241];
        assert!(cpu.load_program(&image).is_err());
    }

    #[test]
    fn test_color_round_trip() {
        let mut cpu = Cpu::new();
        cpu.set_color(0x7fff);
        assert_eq!(cpu.memory[0], 0x7f);
        assert_eq!(cpu.memory[1], 0xff);
        assert_eq!(cpu.color(), 0x7fff);
    }

    #[test]
    fn test_memory_access_masks_to_eight_bits() {
        let mut cpu = Cpu::new();
        cpu.write_u8(0xfffe, 0xab);
        assert_eq!(cpu.memory[0xfe], 0xab);
        assert_eq!(cpu.read_u8(0x01fe), 0xab);
    }

    #[test]
    fn test_stack_push_pop_u16() {
        let mut cpu = Cpu::new();
        cpu.registers[SP] = 0x80;
        cpu.push_u16(0x1234);
        assert_eq!(cpu.registers[SP], 0x7e);
        assert_eq!(cpu.memory[0x7e], 0x12);
        assert_eq!(cpu.memory[0x7f], 0x34);
        assert_eq!(cpu.pop_u16(), 0x1234);
        assert_eq!(cpu.registers[SP], 0x80);
    }

    #[test]
    fn test_stack_wraps_below_zero() {
        let mut cpu = Cpu::new();
        cpu.registers[SP] = 0;
        cpu.push_u16(0x0096);
        // SP went to 0xfffe; the store masks back into the window.
        assert_eq!(cpu.memory[0xfe], 0x00);
        assert_eq!(cpu.memory[0xff], 0x96);
    }

    #[test]
    fn test_decode_two_operand() {
        // add r0, r1: opcode 0x03, destination r1, source mode register.
        let decoded = decode(&[0x19, 0x00], 0).unwrap();
        assert_eq!(decoded.spec.mnemonic, "add");
        assert_eq!(decoded.length, 2);
        assert_eq!(
            decoded.operands,
            Operands::Two { mode: AddressingMode::Register, value: 0, register: 1 }
        );
    }

    #[test]
    fn test_decode_one_operand() {
        // push #2a: opcode 0x01, immediate mode in byte 0, value in byte 1.
        let decoded = decode(&[0x01 << 3 | 0b100, 0x2a], 0).unwrap();
        assert_eq!(decoded.spec.mnemonic, "push");
        assert_eq!(
            decoded.operands,
            Operands::One { mode: AddressingMode::Immediate, value: 0x2a }
        );
    }

    #[test]
    fn test_decode_zero_operand() {
        let decoded = decode(&[0x1c << 3, 0x00], 0).unwrap();
        assert_eq!(decoded.spec.mnemonic, "rts");
        assert_eq!(decoded.operands, Operands::None);
    }

    #[test]
    fn test_decode_move() {
        // move r0, @0100: variant word, source register, destination
        // absolute, wide field 0x0100.
        let decoded = decode(&[0x06, 0x28, 0x01, 0x00], 0).unwrap();
        assert_eq!(decoded.spec.mnemonic, "move");
        assert_eq!(decoded.length, 4);
        assert_eq!(
            decoded.operands,
            Operands::Move {
                variant: MoveVariant::Word,
                src_mode: AddressingMode::Register,
                dst_mode: AddressingMode::Absolute,
                small: 0,
                wide: 0x0100,
            }
        );
    }

    #[test]
    fn test_decode_unknown_opcode() {
        // 0x1f is past the last opcode.
        assert_eq!(decode(&[0xf8, 0x00], 0), Err(Fault::IllegalInstruction));
    }

    #[test]
    fn test_decode_bad_operand_mode() {
        // Single-operand with mode bits 0b111.
        assert_eq!(decode(&[0x01 << 3 | 0b111, 0x00], 0), Err(Fault::IllegalInstruction));
        // Move with variant bits 0b00.
        assert_eq!(decode(&[0x00, 0x00, 0x00, 0x00], 0), Err(Fault::IllegalInstruction));
    }

    #[test]
    fn test_decode_window_past_end() {
        let memory = [0u8; 256];
        assert_eq!(decode(&memory, 255), Err(Fault::IllegalInstruction));
        // A move at 254 needs four bytes it does not have.
        let mut memory = [0u8; 256];
        memory[254] = 0x06; // move, word variant
        assert_eq!(decode(&memory, 254), Err(Fault::IllegalInstruction));
    }

    #[test]
    fn test_execute_advances_pc_by_two() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.memory[0] = 0x19; // add r0, r1
        cpu.memory[1] = 0x00;
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 2);
    }

    #[test]
    fn test_execute_advances_pc_by_four_for_move() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        // move r0, r1: word variant, src register, dst register, wide = 1.
        cpu.memory[0] = 0x06;
        cpu.memory[1] = 0x00;
        cpu.memory[2] = 0x00;
        cpu.memory[3] = 0x01;
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 4);
    }

    #[test]
    fn test_execute_illegal_opcode_enters_vector() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.memory[ILLEGAL_VECTOR as usize] = 0x42;
        cpu.memory[0] = 0xf8; // opcode 0x1f: unknown
        cpu.registers[SP] = 0x80;
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 0x42);
        // Old PC then the flags word were pushed.
        assert_eq!(cpu.registers[SP], 0x7c);
        assert_eq!(cpu.memory[0x7e], 0x00);
        assert_eq!(cpu.memory[0x7f], 0x00);
    }

    #[test]
    fn test_interrupt_and_rte_round_trip() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.registers[SP] = 0x80;
        cpu.registers[PC] = 0x30;
        cpu.flags.set_c(true);
        cpu.memory[TRAP_VECTOR as usize] = 0x20;
        cpu.interrupt(TRAP_VECTOR);
        assert_eq!(cpu.registers[PC], 0x20);

        // rte at 0x20 restores the saved flags and the saved PC.
        cpu.memory[0x20] = 0x1e << 3;
        let saved = cpu.flags;
        cpu.flags.reset();
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 0x30);
        assert_eq!(cpu.flags.carry(), saved.carry());
        assert_eq!(cpu.registers[SP], 0x80);
    }

    #[test]
    fn test_timer_one_shot_fires_after_divisor_times_target() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.memory[TIMER_MODE] = 1;
        cpu.memory[TIMER_DIVISOR] = 4;
        cpu.memory[TIMER_TARGET] = 4;
        cpu.memory[TIMER_VECTOR as usize] = 0x80;
        cpu.registers[SP] = 0x60;
        // The whole program is harmless zero-advance instructions: rts pops
        // garbage but the PC is rewritten below each round.
        for tick in 1..=16u32 {
            cpu.registers[PC] = 0xf0;
            cpu.memory[0xf0] = 0x1c << 3; // rts
            cpu.execute(&mut grid);
            if tick < 16 {
                assert_ne!(cpu.registers[PC], 0x80, "fired early at tick {}", tick);
            }
        }
        assert_eq!(cpu.registers[PC], 0x80);
        assert_eq!(cpu.memory[TIMER_MODE], 0, "one-shot disarms after firing");
        assert_eq!(cpu.memory[TIMER_TICKS], 0);
    }

    #[test]
    fn test_timer_repeating_stays_armed() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.memory[TIMER_MODE] = 2;
        cpu.memory[TIMER_DIVISOR] = 1;
        cpu.memory[TIMER_TARGET] = 2;
        cpu.memory[TIMER_VECTOR as usize] = 0x80;
        cpu.registers[SP] = 0x60;
        let mut fires = 0;
        for _ in 0..6 {
            cpu.registers[PC] = 0xf0;
            cpu.memory[0xf0] = 0x1c << 3; // rts
            cpu.execute(&mut grid);
            if cpu.registers[PC] == 0x80 {
                fires += 1;
            }
        }
        assert_eq!(fires, 3, "repeating mode fires every divisor*target ticks");
        assert_eq!(cpu.memory[TIMER_MODE], 2);
    }

    #[test]
    fn test_timer_disabled_never_counts() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.memory[TIMER_DIVISOR] = 1;
        cpu.memory[TIMER_TARGET] = 1;
        for _ in 0..8 {
            cpu.registers[PC] = 0xf0;
            cpu.memory[0xf0] = 0x1c << 3;
            cpu.execute(&mut grid);
        }
        assert_eq!(cpu.memory[TIMER_TICKS], 0);
    }

    #[test]
    fn test_relative_cpu_sign_extension() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.pos_x = 8;
        cpu.pos_y = 8;
        // 0xf is -1, 0x8 is -8, 0x7 is +7.
        {
            let target = cpu.relative_cpu(&mut grid, 0xff).unwrap();
            assert_eq!((target.pos_x, target.pos_y), (7, 7));
        }
        {
            let target = cpu.relative_cpu(&mut grid, 0x88).unwrap();
            assert_eq!((target.pos_x, target.pos_y), (0, 0));
        }
        {
            let target = cpu.relative_cpu(&mut grid, 0x07).unwrap();
            assert_eq!((target.pos_x, target.pos_y), (15, 8));
        }
    }

    #[test]
    fn test_relative_cpu_out_of_bounds() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.pos_x = 0;
        cpu.pos_y = 0;
        assert_eq!(cpu.relative_cpu(&mut grid, 0xff).err(), Some(Fault::OutOfBounds));
        let mut corner = Cpu::new();
        corner.pos_x = 15;
        corner.pos_y = 15;
        assert_eq!(corner.relative_cpu(&mut grid, 0x11).err(), Some(Fault::OutOfBounds));
    }

    #[test]
    fn test_relative_cpu_zero_delta_is_self() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.pos_x = 3;
        cpu.pos_y = 4;
        cpu.memory[0x55] = 0x99;
        let target = cpu.relative_cpu(&mut grid, 0x00).unwrap();
        assert_eq!(target.memory[0x55], 0x99);
    }
}
