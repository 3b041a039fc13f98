use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_add(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value, register) = ops.two()?;
        let dst_value = self.registers[register as usize];
        let src_value = self.operand_value(mode, value, 2)?;

        // Widen so the carry out of bit 15 is observable.
        let sum = dst_value as u32 + src_value as u32;
        let result = sum as u16;
        self.registers[register as usize] = result;

        self.flags.reset();
        self.flags.set_c(sum > 0xffff);
        self.flags.set_z(result == 0);
        self.flags.set_n(result & 0x8000 != 0);
        Ok(())
    }
}
