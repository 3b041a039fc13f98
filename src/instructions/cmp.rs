use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_cmp(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value, register) = ops.two()?;
        let dst_value = self.registers[register as usize];
        let src_value = self.operand_value(mode, value, 2)?;

        // The difference is observed for the flags and discarded.
        let observable = dst_value as i32 - src_value as i32;
        self.flags.reset();
        self.flags.set_n(observable < 0);
        self.flags.set_z(observable == 0);
        self.flags.set_c(dst_value < src_value);
        Ok(())
    }
}
