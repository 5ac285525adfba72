//! `mote capture`: pipe stdin through an external program.

use std::io::Read;

use crate::runner::{Command, ProgramRunner, RunnerError};

/// Read all of stdin, run `program args...` on it, and print what it wrote.
pub fn run_capture(runner: &impl ProgramRunner, program: &str, args: &[String]) -> i32 {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("error: failed to read stdin: {e}");
        return 1;
    }

    let command = Command::new(program).args(args);
    match runner.run(&command, &input) {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            if let RunnerError::Failed { stderr, .. } = &err {
                if !stderr.is_empty() {
                    eprint!("{stderr}");
                }
            }
            1
        }
    }
}
