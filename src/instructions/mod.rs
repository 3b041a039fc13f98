// One module per mnemonic; each adds its handler to Cpu and carries its
// own tests. The opcode table in isa.rs is the only dispatch point.

mod add;
mod and;
mod bcc;
mod bcs;
mod beq;
mod bge;
mod ble;
mod bne;
mod bra;
mod bsr;
mod cmp;
mod jcc;
mod jcs;
mod jeq;
mod jge;
mod jle;
mod jmp;
mod jne;
mod jsr;
mod lsl;
mod lsr;
mod mov;
mod not;
mod or;
mod pop;
mod push;
mod rte;
mod rts;
mod sub;
mod trap;
mod xor;
