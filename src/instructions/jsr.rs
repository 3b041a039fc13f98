use crate::cpu::{Cpu, Fault, Operands, PC};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_jsr(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        let target = self.operand_value(mode, value, 2)?;
        let return_pc = self.registers[PC];
        self.push_u16(return_pc);
        self.registers[PC] = target;
        Ok(())
    }
}
