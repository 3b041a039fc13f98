use crate::cpu::{Cpu, Fault, Operands};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_bra(
        &mut self,
        _grid: &mut Grid,
        ops: &Operands,
    ) -> Result<(), Fault> {
        let (mode, value) = ops.one()?;
        self.branch_if(true, mode, value)
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::{Cpu, PC};
    use crate::grid::Grid;

    #[test]
    fn test_bra_always_taken() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        // bra r0
        cpu.memory[0] = 0x12 << 3;
        cpu.memory[1] = 0x00;
        cpu.registers[0] = 10;
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 12);
    }

    #[test]
    fn test_bra_backwards_through_wrap() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        // A register can carry a full 16-bit two's-complement offset, so
        // 0xfffc steps the PC back by four.
        cpu.memory[0x20] = 0x12 << 3;
        cpu.memory[0x21] = 0x00;
        cpu.registers[0] = 0xfffc; // -4
        cpu.registers[PC] = 0x20;
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 0x1e);
    }
}
