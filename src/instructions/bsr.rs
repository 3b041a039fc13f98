use crate::cpu::{Cpu, Fault, Operands, PC};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_bsr(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        let offset = self.operand_value(mode, value, 2)?;
        // The pushed PC already points past the bsr; rts comes straight
        // back to the next instruction.
        let return_pc = self.registers[PC];
        self.push_u16(return_pc);
        self.registers[PC] = return_pc.wrapping_add(offset);
        Ok(())
    }
}
