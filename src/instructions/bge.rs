use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_bge(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        let taken = self.flags.zero() || !self.flags.carry();
        self.branch_if(taken, mode, value)
    }
}
