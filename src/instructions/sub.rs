use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_sub(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value, register) = ops.two()?;
        let dst_value = self.registers[register as usize];
        let src_value = self.operand_value(mode, value, 2)?;

        let result = dst_value.wrapping_sub(src_value);
        self.registers[register as usize] = result;

        self.flags.reset();
        // Borrow: the difference wrapped past zero.
        self.flags.set_c(result > dst_value);
        self.flags.set_z(result == 0);
        self.flags.set_n(result & 0x8000 != 0);
        Ok(())
    }
}
