use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_jge(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        let taken = self.flags.zero() || !self.flags.carry();
        self.jump_if(taken, mode, value)
    }
}
