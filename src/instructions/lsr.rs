use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_lsr(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value, register) = ops.two()?;
        let dst_value = self.registers[register as usize];
        let shift = self.operand_value(mode, value, 2)?;

        let result = dst_value.checked_shr(shift as u32).unwrap_or(0);
        self.registers[register as usize] = result;

        self.flags.reset();
        // Carry is bit 0 of the shifted value.
        self.flags.set_c(result & 0b1 != 0);
        self.flags.set_n(result & 0x8000 != 0);
        self.flags.set_z(result == 0);
        Ok(())
    }
}
