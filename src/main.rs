use std::fs;
use std::io::{self, Write};
use std::process;

use clap::{App, Arg};
use rand::Rng;

use codewar::cpu::Cpu;
use codewar::grid::Grid;
use codewar::view;

fn main() {
    let matches = App::new("codewar")
        .about("A 16x16 grid of CPUs painting each other's memory; the color holding the most cells wins.")
        .arg(
            Arg::with_name("cycles")
                .long("cycles")
                .takes_value(true)
                .default_value("1000")
                .help("Number of ticks to run before scoring"),
        )
        .get_matches();

    let max_cycles: u64 = match matches.value_of("cycles").unwrap().parse() {
        Ok(cycles) => cycles,
        Err(_) => {
            eprintln!("--cycles takes a number");
            process::exit(2);
        }
    };

    let mut rng = rand::thread_rng();
    let mut grid = Grid::new();

    let (player1, color1) = prompt_player("Player 1", &mut rng);
    let (player2, color2) = prompt_player("Player 2", &mut rng);

    let x1 = rng.gen_range(0, Grid::WIDTH);
    let y1 = rng.gen_range(0, Grid::HEIGHT);
    grid.place(x1, y1, player1);
    // Keep re-rolling until player 2 lands on a free cell.
    let (x2, y2) = loop {
        let x2 = rng.gen_range(0, Grid::WIDTH);
        let y2 = rng.gen_range(0, Grid::HEIGHT);
        if (x2, y2) != (x1, y1) {
            break (x2, y2);
        }
    };
    grid.place(x2, y2, player2);

    view::print_board(&grid);
    view::print_players(color1, color2);

    for _ in 0..max_cycles {
        grid.step();
        view::print_board(&grid);
        view::print_players(color1, color2);
        if let Some(winner) = grid.uniform_color() {
            if winner == color1 {
                println!("Player 1 wins");
            } else if winner == color2 {
                println!("Player 2 wins");
            } else {
                println!("The board settled on a color neither player owns");
            }
            return;
        }
    }

    let count1 = grid.count_color(color1);
    let count2 = grid.count_color(color2);
    println!("Player 1 holds {} cells, Player 2 holds {}", count1, count2);
    if count1 > count2 {
        println!("Player 1 wins");
    } else if count2 > count1 {
        println!("Player 2 wins");
    } else {
        println!("Draw");
    }
}

/// Ask for a program path until one loads; a random 5-5-5 color becomes
/// the player's signature. EOF on stdin aborts the tournament.
fn prompt_player(label: &str, rng: &mut impl Rng) -> (Cpu, u16) {
    loop {
        print!("{}, path to your program: ", label);
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                process::exit(1);
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("stdin: {}", err);
                process::exit(1);
            }
        }
        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("{}: {}", path, err);
                continue;
            }
        };
        let mut cpu = Cpu::new();
        if let Err(err) = cpu.load_program(&bytes) {
            eprintln!("{}: {}", path, err);
            continue;
        }
        let color = random_color(rng);
        cpu.set_color(color);
        return (cpu, color);
    }
}

fn random_color(rng: &mut impl Rng) -> u16 {
    let red: u16 = rng.gen_range(0, 32);
    let green: u16 = rng.gen_range(0, 32);
    let blue: u16 = rng.gen_range(0, 32);
    red << 10 | green << 5 | blue
}
