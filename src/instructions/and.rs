use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_and(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value, register) = ops.two()?;
        let src_value = self.operand_value(mode, value, 2)?;
        let result = self.registers[register as usize] & src_value;
        self.registers[register as usize] = result;

        self.flags.reset();
        self.flags.set_z(result == 0);
        self.flags.set_n(result & 0x8000 != 0);
        Ok(())
    }
}
