use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_jcs(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        self.jump_if(self.flags.carry(), mode, value)
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::{Cpu, PC};
    use crate::grid::Grid;

    #[test]
    fn test_jcs_taken_only_on_carry() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        // jcs r0
        cpu.memory[0] = 0x15 << 3;
        cpu.memory[1] = 0x00;
        cpu.registers[0] = 10;
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 2);

        cpu.registers[PC] = 0;
        cpu.flags.set_c(true);
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 10);
    }
}
