use std::mem;

use crate::cpu::Cpu;

/// The 16x16 board of CPUs, addressed as `cells[y][x]`. Topology is fixed
/// once the tournament starts; cells only ever change through their own
/// execution or a neighbor's cross-CPU write.
pub struct Grid {
    pub cells: Vec<Vec<Cpu>>,
}

impl Default for Grid {
    fn default() -> Grid {
        Grid::new()
    }
}

impl Grid {
    pub const WIDTH: usize = 16;
    pub const HEIGHT: usize = 16;

    /// A board of blank cells: zeroed memory, color 0x0000, coordinates
    /// fixed at construction.
    pub fn new() -> Grid {
        let mut cells = Vec::with_capacity(Grid::HEIGHT);
        for y in 0..Grid::HEIGHT {
            let mut row = Vec::with_capacity(Grid::WIDTH);
            for x in 0..Grid::WIDTH {
                let mut cpu = Cpu::new();
                cpu.pos_x = x;
                cpu.pos_y = y;
                row.push(cpu);
            }
            cells.push(row);
        }
        Grid { cells }
    }

    /// Drop a CPU onto the board, fixing its coordinates.
    pub fn place(&mut self, x: usize, y: usize, mut cpu: Cpu) {
        cpu.pos_x = x;
        cpu.pos_y = y;
        self.cells[y][x] = cpu;
    }

    /// One tick: every cell executes exactly one instruction, in row-major
    /// order. The running cell is moved out of the board for the duration
    /// of its instruction so cross-CPU operands can borrow the rest; a
    /// zero-delta access resolves to the running CPU itself.
    pub fn step(&mut self) {
        for y in 0..Grid::HEIGHT {
            for x in 0..Grid::WIDTH {
                let mut cpu = mem::take(&mut self.cells[y][x]);
                cpu.execute(self);
                self.cells[y][x] = cpu;
            }
        }
    }

    /// The single color covering the whole board, if the board is uniform.
    /// This is the early-victory check.
    pub fn uniform_color(&self) -> Option<u16> {
        let first = self.cells[0][0].color();
        for row in &self.cells {
            for cpu in row {
                if cpu.color() != first {
                    return None;
                }
            }
        }
        Some(first)
    }

    /// How many cells currently carry `color`; final scoring.
    pub fn count_color(&self, color: u16) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cpu| cpu.color() == color)
            .count()
    }
}
