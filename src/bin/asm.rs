use std::fs;
use std::process;

use clap::{App, Arg};

use codewar::asm;

fn main() {
    let matches = App::new("asm")
        .about("Assemble a codewar source file; the binary lands next to it as <file>.bin")
        .arg(
            Arg::with_name("file")
                .required(true)
                .help("Path to the assembly source"),
        )
        .get_matches();
    let path = matches.value_of("file").unwrap();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}: {}", path, err);
            process::exit(1);
        }
    };

    let binary = match asm::assemble(&source) {
        Ok(binary) => binary,
        Err(err) => {
            // LineError renders as "line: message".
            eprintln!("{}:{}", path, err);
            process::exit(1);
        }
    };

    let out_path = format!("{}.bin", path);
    if let Err(err) = fs::write(&out_path, &binary) {
        eprintln!("{}: {}", out_path, err);
        process::exit(1);
    }
    println!("wrote {} bytes to {}", binary.len(), out_path);
}
