use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_beq(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        self.branch_if(self.flags.zero(), mode, value)
    }
}
