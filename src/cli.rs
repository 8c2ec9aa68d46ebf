//! Interactive console - the stand-in for an external UI layer.
//!
//! Runs a blocking readline loop on its own thread and forwards parsed
//! commands to the event loop; the loop owns all state, the console owns
//! none.

use rustyline::DefaultEditor;
use tokio::sync::mpsc;

/// Commands the console can issue to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ListDevices,
    Start(usize),
    Stop,
    Status,
    Quit,
}

/// Parse one console line into a command. `None` means "print usage".
fn parse_line(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "devices" | "list" => Some(Command::ListDevices),
        "start" => parts.next()?.parse().ok().map(Command::Start),
        "stop" => Some(Command::Stop),
        "status" => Some(Command::Status),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

fn print_usage() {
    println!("commands: devices | start <n> | stop | status | quit");
}

/// Run the blocking readline loop, forwarding parsed commands until quit
/// or EOF.
pub fn run_repl(tx: mpsc::Sender<Command>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("console unavailable: {}", e);
            return;
        }
    };

    print_usage();
    loop {
        match rl.readline("pedalflip> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match parse_line(line) {
                    Some(command) => {
                        let quit = command == Command::Quit;
                        if tx.blocking_send(command).is_err() || quit {
                            break;
                        }
                    }
                    None => print_usage(),
                }
            }
            // Ctrl-C / Ctrl-D ends the console and the app with it.
            Err(_) => {
                let _ = tx.blocking_send(Command::Quit);
                break;
            }
        }
    }
}
