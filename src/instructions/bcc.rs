use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_bcc(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        self.branch_if(!self.flags.carry(), mode, value)
    }
}
