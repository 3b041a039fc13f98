use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_lsl(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value, register) = ops.two()?;
        let dst_value = self.registers[register as usize];
        let shift = self.operand_value(mode, value, 2)?;

        // Shift in a wide register; amounts of 16 or more drain to zero.
        let wide = (dst_value as u64).checked_shl(shift as u32).unwrap_or(0);
        let result = (wide & 0xffff) as u16;
        self.registers[register as usize] = result;

        self.flags.reset();
        // Carry is bit 15 of the shifted value.
        self.flags.set_c(wide & 0x8000 != 0);
        self.flags.set_n(result & 0x8000 != 0);
        self.flags.set_z(result == 0);
        Ok(())
    }
}
