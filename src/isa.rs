use phf::phf_map;

use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

/// Handler routine for one instruction. Operand shape is guaranteed by the
/// decoder to match the table arity, so handlers only destructure.
pub type Handler = fn(&mut Cpu, &mut Grid, &Operands) -> Result<(), Fault>;

// The six ways an operand can name a value or a location.
// The three bit patterns 0b110 and 0b111 are undecodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Register = 0b000,      // rN           the register itself
    PreDecrement = 0b001,  // -(rN)        rN -= step, then memory[rN]
    Indirect = 0b010,      // (rN)         memory[rN]
    PostIncrement = 0b011, // (rN)+        memory[rN], then rN += step
    Immediate = 0b100,     // #HHHH        the literal value
    Absolute = 0b101,      // @HHHH        address, possibly in a neighbor CPU
}

impl AddressingMode {
    pub fn from_bits(bits: u8) -> Result<AddressingMode, Fault> {
        match bits {
            0b000 => Ok(AddressingMode::Register),
            0b001 => Ok(AddressingMode::PreDecrement),
            0b010 => Ok(AddressingMode::Indirect),
            0b011 => Ok(AddressingMode::PostIncrement),
            0b100 => Ok(AddressingMode::Immediate),
            0b101 => Ok(AddressingMode::Absolute),
            _ => Err(Fault::IllegalInstruction),
        }
    }
}

// Width variant of the 32-bit move encoding. 0b00 is undecodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveVariant {
    Word = 0b11, // move    full 16-bit word
    High = 0b10, // move.h  high byte
    Low = 0b01,  // move.l  low byte
}

impl MoveVariant {
    pub fn from_bits(bits: u8) -> Result<MoveVariant, Fault> {
        match bits {
            0b11 => Ok(MoveVariant::Word),
            0b10 => Ok(MoveVariant::High),
            0b01 => Ok(MoveVariant::Low),
            _ => Err(Fault::IllegalInstruction),
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Registers step by 2 for word transfers, by 1 for byte transfers.
    pub fn step(self) -> u16 {
        match self {
            MoveVariant::Word => 2,
            MoveVariant::High | MoveVariant::Low => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpSpec {
    pub opcode: u8,
    pub mnemonic: &'static str,
    // Operand count is data, not derived from the handler signature.
    pub arity: u8,
    // Encoded length in bytes. Only move is 4.
    pub length: u16,
    pub handler: Handler,
}

// Every opcode of the machine. The decoder takes the top five bits of the
// first instruction byte and looks them up here; anything absent is an
// illegal instruction.
pub static OPCODES: phf::Map<u8, OpSpec> = phf_map! {
    0x00u8 => OpSpec { opcode: 0x00, mnemonic: "move", arity: 2, length: 4, handler: Cpu::handle_move },
    0x01u8 => OpSpec { opcode: 0x01, mnemonic: "push", arity: 1, length: 2, handler: Cpu::handle_push },
    0x02u8 => OpSpec { opcode: 0x02, mnemonic: "pop", arity: 1, length: 2, handler: Cpu::handle_pop },
    0x03u8 => OpSpec { opcode: 0x03, mnemonic: "add", arity: 2, length: 2, handler: Cpu::handle_add },
    0x04u8 => OpSpec { opcode: 0x04, mnemonic: "cmp", arity: 2, length: 2, handler: Cpu::handle_cmp },
    0x05u8 => OpSpec { opcode: 0x05, mnemonic: "sub", arity: 2, length: 2, handler: Cpu::handle_sub },
    0x06u8 => OpSpec { opcode: 0x06, mnemonic: "lsl", arity: 2, length: 2, handler: Cpu::handle_lsl },
    0x07u8 => OpSpec { opcode: 0x07, mnemonic: "lsr", arity: 2, length: 2, handler: Cpu::handle_lsr },
    0x08u8 => OpSpec { opcode: 0x08, mnemonic: "and", arity: 2, length: 2, handler: Cpu::handle_and },
    0x09u8 => OpSpec { opcode: 0x09, mnemonic: "or", arity: 2, length: 2, handler: Cpu::handle_or },
    0x0au8 => OpSpec { opcode: 0x0a, mnemonic: "xor", arity: 2, length: 2, handler: Cpu::handle_xor },
    0x0bu8 => OpSpec { opcode: 0x0b, mnemonic: "not", arity: 1, length: 2, handler: Cpu::handle_not },
    0x0cu8 => OpSpec { opcode: 0x0c, mnemonic: "bcc", arity: 1, length: 2, handler: Cpu::handle_bcc },
    0x0du8 => OpSpec { opcode: 0x0d, mnemonic: "bcs", arity: 1, length: 2, handler: Cpu::handle_bcs },
    0x0eu8 => OpSpec { opcode: 0x0e, mnemonic: "beq", arity: 1, length: 2, handler: Cpu::handle_beq },
    0x0fu8 => OpSpec { opcode: 0x0f, mnemonic: "bne", arity: 1, length: 2, handler: Cpu::handle_bne },
    0x10u8 => OpSpec { opcode: 0x10, mnemonic: "ble", arity: 1, length: 2, handler: Cpu::handle_ble },
    0x11u8 => OpSpec { opcode: 0x11, mnemonic: "bge", arity: 1, length: 2, handler: Cpu::handle_bge },
    0x12u8 => OpSpec { opcode: 0x12, mnemonic: "bra", arity: 1, length: 2, handler: Cpu::handle_bra },
    0x13u8 => OpSpec { opcode: 0x13, mnemonic: "bsr", arity: 1, length: 2, handler: Cpu::handle_bsr },
    0x14u8 => OpSpec { opcode: 0x14, mnemonic: "jcc", arity: 1, length: 2, handler: Cpu::handle_jcc },
    0x15u8 => OpSpec { opcode: 0x15, mnemonic: "jcs", arity: 1, length: 2, handler: Cpu::handle_jcs },
    0x16u8 => OpSpec { opcode: 0x16, mnemonic: "jeq", arity: 1, length: 2, handler: Cpu::handle_jeq },
    0x17u8 => OpSpec { opcode: 0x17, mnemonic: "jne", arity: 1, length: 2, handler: Cpu::handle_jne },
    0x18u8 => OpSpec { opcode: 0x18, mnemonic: "jle", arity: 1, length: 2, handler: Cpu::handle_jle },
    0x19u8 => OpSpec { opcode: 0x19, mnemonic: "jge", arity: 1, length: 2, handler: Cpu::handle_jge },
    0x1au8 => OpSpec { opcode: 0x1a, mnemonic: "jmp", arity: 1, length: 2, handler: Cpu::handle_jmp },
    0x1bu8 => OpSpec { opcode: 0x1b, mnemonic: "jsr", arity: 1, length: 2, handler: Cpu::handle_jsr },
    0x1cu8 => OpSpec { opcode: 0x1c, mnemonic: "rts", arity: 0, length: 2, handler: Cpu::handle_rts },
    0x1du8 => OpSpec { opcode: 0x1d, mnemonic: "trap", arity: 1, length: 2, handler: Cpu::handle_trap },
    0x1eu8 => OpSpec { opcode: 0x1e, mnemonic: "rte", arity: 0, length: 2, handler: Cpu::handle_rte },
};

// Assembler-side view of the same table: mnemonic text to opcode.
pub static MNEMONICS: phf::Map<&'static str, u8> = phf_map! {
    "move" => 0x00,
    "push" => 0x01,
    "pop" => 0x02,
    "add" => 0x03,
    "cmp" => 0x04,
    "sub" => 0x05,
    "lsl" => 0x06,
    "lsr" => 0x07,
    "and" => 0x08,
    "or" => 0x09,
    "xor" => 0x0a,
    "not" => 0x0b,
    "bcc" => 0x0c,
    "bcs" => 0x0d,
    "beq" => 0x0e,
    "bne" => 0x0f,
    "ble" => 0x10,
    "bge" => 0x11,
    "bra" => 0x12,
    "bsr" => 0x13,
    "jcc" => 0x14,
    "jcs" => 0x15,
    "jeq" => 0x16,
    "jne" => 0x17,
    "jle" => 0x18,
    "jge" => 0x19,
    "jmp" => 0x1a,
    "jsr" => 0x1b,
    "rts" => 0x1c,
    "trap" => 0x1d,
    "rte" => 0x1e,
};
