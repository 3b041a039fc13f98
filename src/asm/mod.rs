pub mod operand;

use std::fmt::{Display, Error, Formatter};

use byteorder::{BigEndian, WriteBytesExt};

use crate::isa::{AddressingMode, MNEMONICS, MoveVariant, OPCODES};

use self::operand::{Operand, parse_operand};

/// Everything the assembler can reject. The CLI prefixes the file and
/// line before printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    UnknownMnemonic(String),
    ArityMismatch { mnemonic: String, expected: u8, found: usize },
    MalformedOperand(String),
    BadLiteral(String),
}

impl Display for AsmError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            AsmError::UnknownMnemonic(name) => write!(f, "unknown mnemonic `{}`", name),
            AsmError::ArityMismatch { mnemonic, expected, found } => {
                write!(f, "`{}` takes {} operand(s), found {}", mnemonic, expected, found)
            }
            AsmError::MalformedOperand(token) => write!(f, "malformed operand `{}`", token),
            AsmError::BadLiteral(token) => write!(f, "bad literal `{}`", token),
        }
    }
}

impl std::error::Error for AsmError {}

/// An assembler error located on its source line (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line: usize,
    pub error: AsmError,
}

impl Display for LineError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}: {}", self.line, self.error)
    }
}

impl std::error::Error for LineError {}

/// Assemble a whole source text: one instruction per line, empty lines
/// and `#` comments skipped, output big-endian with no padding.
pub fn assemble(source: &str) -> Result<Vec<u8>, LineError> {
    let mut binary = Vec::new();
    for (index, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(mnemonic) = tokens.next() else {
            continue;
        };
        let operands: Vec<&str> = tokens.collect();
        let bytes = encode_instruction(mnemonic, &operands)
            .map_err(|error| LineError { line: index + 1, error })?;
        binary.extend_from_slice(&bytes);
    }
    Ok(binary)
}

/// Encode one instruction to its 2 or 4 bytes.
pub fn encode_instruction(mnemonic: &str, operands: &[&str]) -> Result<Vec<u8>, AsmError> {
    let lowered = mnemonic.to_ascii_lowercase();
    let (base, suffix) = match lowered.split_once('.') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (lowered.as_str(), None),
    };

    let opcode = *MNEMONICS
        .get(base)
        .ok_or_else(|| AsmError::UnknownMnemonic(lowered.clone()))?;
    let spec = OPCODES
        .get(&opcode)
        .ok_or_else(|| AsmError::UnknownMnemonic(lowered.clone()))?;

    // Width suffixes belong to move alone.
    let variant = match suffix {
        None => MoveVariant::Word,
        Some("h") if base == "move" => MoveVariant::High,
        Some("l") if base == "move" => MoveVariant::Low,
        Some(_) => return Err(AsmError::UnknownMnemonic(lowered.clone())),
    };

    if operands.len() != spec.arity as usize {
        return Err(AsmError::ArityMismatch {
            mnemonic: lowered.clone(),
            expected: spec.arity,
            found: operands.len(),
        });
    }

    let parsed = operands
        .iter()
        .map(|token| parse_operand(&token.to_ascii_lowercase()))
        .collect::<Result<Vec<Operand>, AsmError>>()?;

    if base == "move" {
        return encode_move(opcode, variant, &parsed[0], &parsed[1], operands);
    }

    let mut bytes = Vec::with_capacity(2);
    match spec.arity {
        0 => {
            bytes.write_u16::<BigEndian>((opcode as u16) << 11).unwrap();
        }
        1 => {
            // opcode:5 | mode:3 | value:8
            let op = &parsed[0];
            if op.value > 0xff {
                return Err(AsmError::BadLiteral(operands[0].to_string()));
            }
            let word = (opcode as u16) << 11 | (op.mode as u16) << 8 | op.value;
            bytes.write_u16::<BigEndian>(word).unwrap();
        }
        _ => {
            // opcode:5 | dst_reg:3 | src_mode:3 | src_value:5
            let source = &parsed[0];
            let destination = &parsed[1];
            if destination.mode != AddressingMode::Register {
                return Err(AsmError::MalformedOperand(operands[1].to_string()));
            }
            if source.value > 0b11111 {
                return Err(AsmError::BadLiteral(operands[0].to_string()));
            }
            let word = (opcode as u16) << 11
                | destination.value << 8
                | (source.mode as u16) << 5
                | source.value;
            bytes.write_u16::<BigEndian>(word).unwrap();
        }
    }
    Ok(bytes)
}

fn is_wide_mode(mode: AddressingMode) -> bool {
    mode == AddressingMode::Immediate || mode == AddressingMode::Absolute
}

/// The 32-bit move word: opcode:5 | variant:2 | src:3 | dst:3 | small:3 |
/// wide:16. The wide field goes to an immediate/absolute source when there
/// is one, to the destination otherwise; the other side must fit the
/// three-bit field.
fn encode_move(
    opcode: u8,
    variant: MoveVariant,
    source: &Operand,
    destination: &Operand,
    tokens: &[&str],
) -> Result<Vec<u8>, AsmError> {
    if destination.mode == AddressingMode::Immediate {
        // A literal is not a place.
        return Err(AsmError::MalformedOperand(tokens[1].to_string()));
    }

    let (small, wide) = if is_wide_mode(source.mode) {
        if destination.mode == AddressingMode::Absolute {
            // Both sides would need the 16-bit field.
            return Err(AsmError::MalformedOperand(tokens[1].to_string()));
        }
        (destination.value, source.value)
    } else {
        (source.value, destination.value)
    };

    let word: u32 = (opcode as u32) << 27
        | (variant.bits() as u32) << 25
        | (source.mode as u32) << 22
        | (destination.mode as u32) << 19
        | (small as u32) << 16
        | wide as u32;
    let mut bytes = Vec::with_capacity(4);
    bytes.write_u32::<BigEndian>(word).unwrap();
    Ok(bytes)
}
