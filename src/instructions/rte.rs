use crate::cpu::{Cpu, CpuFlags, Fault, Operands, PC};
use crate::grid::Grid;

impl Cpu {
    pub(crate) fn handle_rte(
        &mut self,
        _grid: &mut Grid,
        _ops: &Operands,
    ) -> Result<(), Fault> {
        // Interrupt entry pushed the PC first and the flags word on top.
        // The restored word replaces the flags wholesale; the PC pop that
        // follows then accumulates its own N/Z into the restored set.
        let saved = self.pop_u16();
        self.flags = CpuFlags::from_bits_truncate(saved);
        let return_pc = self.pop_u16();
        self.registers[PC] = return_pc;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::{Cpu, PC, SP, TRAP_VECTOR};
    use crate::grid::Grid;

    #[test]
    fn test_rte_restores_flags_and_pc() {
        let mut grid = Grid::new();
        let mut cpu = Cpu::new();
        cpu.registers[SP] = 0x80;
        cpu.registers[PC] = 0x36;
        cpu.flags.set_c(true);
        cpu.flags.set_n(true);
        cpu.memory[TRAP_VECTOR as usize] = 0x20;
        cpu.interrupt(TRAP_VECTOR);
        assert_eq!(cpu.registers[PC], 0x20);

        cpu.flags.reset();
        cpu.memory[0x20] = 0x1e << 3; // rte
        cpu.execute(&mut grid);
        assert_eq!(cpu.registers[PC], 0x36);
        assert_eq!(cpu.registers[SP], 0x80);
        assert!(cpu.flags.carry());
        assert!(cpu.flags.negative());
        assert!(!cpu.flags.zero());
    }
}
