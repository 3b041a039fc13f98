use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_not(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        let src_value = self.operand_value(mode, value, 2)?;
        let result = !src_value;

        // The complement lands back in the register named by the operand's
        // value field.
        if value >= 8 {
            return Err(Fault::BadRegister);
        }
        self.registers[value as usize] = result;

        self.flags.reset();
        self.flags.set_n(result & 0x8000 != 0);
        self.flags.set_z(result == 0);
        Ok(())
    }
}
