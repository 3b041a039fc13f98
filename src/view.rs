use colored::Colorize;

use crate::grid::Grid;

/// Widen one 5-bit channel to 8 bits, replicating the top bits into the
/// bottom so 0x1f maps to a full 0xff.
pub fn expand_channel(channel: u8) -> u8 {
    (channel << 3) | (channel >> 2)
}

/// Split a 5-5-5 color signature into 8-bit RGB. The top bit of the word
/// is unused.
pub fn rgb(color: u16) -> (u8, u8, u8) {
    let red = ((color >> 10) & 0b11111) as u8;
    let green = ((color >> 5) & 0b11111) as u8;
    let blue = (color & 0b11111) as u8;
    (expand_channel(red), expand_channel(green), expand_channel(blue))
}

/// Print the whole board, one truecolor block pair per cell.
pub fn print_board(grid: &Grid) {
    println!("+{}+", "-".repeat(Grid::WIDTH * 2));
    for row in &grid.cells {
        print!("|");
        for cpu in row {
            let (red, green, blue) = rgb(cpu.color());
            print!("{}", "██".truecolor(red, green, blue));
        }
        println!("|");
    }
    println!("+{}+", "-".repeat(Grid::WIDTH * 2));
}

/// The legend under the board: each player's name in their own color.
pub fn print_players(player1: u16, player2: u16) {
    let (red, green, blue) = rgb(player1);
    println!("{}", "Player 1".truecolor(red, green, blue));
    let (red, green, blue) = rgb(player2);
    println!("{}", "Player 2".truecolor(red, green, blue));
}
