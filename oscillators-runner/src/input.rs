//! Operator commands read from stdin and forwarded to the controller.

use std::io::BufRead;
use std::process;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use log::{error, info, warn};
use oscillators_config::{ConfigError, ParameterInput};
use oscillators_simulation::ControlSignal;
use thiserror::Error;

pub const USAGE: &str = "\
To pause or resume the simulation, enter 'p' (or 'space' / 'click').
To terminate the simulation, so you can start again with new parameters, enter 'q'.
To start a new simulation, enter 'r', optionally followed by edits such as 'r m1=0.5 k2=8'.
To change a parameter for the next run without starting, enter 'set key=value'.
To show these instructions again, enter 'h'.
To exit the application, enter 'esc' (or press Ctrl-C).";

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command '{0}', enter 'h' for help")]
    Unknown(String),

    #[error(transparent)]
    Override(#[from] ConfigError),
}

/// One line of operator input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePause,
    Terminate,
    Start(Vec<String>),
    Set(Vec<String>),
    Usage,
    Exit,
    Nothing,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        // A line of only spaces is the space bar.
        if !line.is_empty() && line.chars().all(|c| c == ' ') {
            return Ok(Command::TogglePause);
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Nothing);
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        let rest: Vec<String> = words.map(str::to_string).collect();

        let command = match head.as_str() {
            "p" | "pause" | "space" | "click" => Command::TogglePause,
            "q" | "quit" | "terminate" => Command::Terminate,
            "r" | "run" | "start" => Command::Start(rest),
            "set" => Command::Set(rest),
            "h" | "help" | "?" => Command::Usage,
            "esc" | "exit" => Command::Exit,
            _ => return Err(CommandError::Unknown(head)),
        };
        Ok(command)
    }
}

/// Holds the operator's current field values between runs, like the input sliders.
pub struct OperatorInput {
    input: ParameterInput,
    clamp: bool,
}

impl OperatorInput {
    pub fn new(input: ParameterInput, clamp: bool) -> Self {
        Self { input, clamp }
    }

    /// Applies every assignment or none of them.
    pub fn apply(&mut self, assignments: &[String]) -> Result<(), CommandError> {
        let mut edited = self.input.clone();
        for assignment in assignments {
            edited.apply_override(assignment)?;
        }
        self.input = edited;
        Ok(())
    }

    /// Turns one command into the signal for the controller, if any.
    pub fn handle(&mut self, command: Command) -> Result<Option<ControlSignal>, CommandError> {
        let signal = match command {
            Command::TogglePause => Some(ControlSignal::TogglePause),
            Command::Terminate => Some(ControlSignal::Terminate),
            Command::Start(assignments) => {
                self.apply(&assignments)?;
                let params = self.input.to_parameter_set(self.clamp)?;
                Some(ControlSignal::Start(params))
            }
            Command::Set(assignments) => {
                self.apply(&assignments)?;
                None
            }
            Command::Usage => {
                eprintln!("{}", USAGE);
                None
            }
            Command::Exit => {
                info!("Exit requested, stopping immediately");
                process::exit(0);
            }
            Command::Nothing => None,
        };
        Ok(signal)
    }
}

/// Reads stdin until EOF, forwarding signals over `signals`.
///
/// This thread never touches simulation state. Configuration errors are
/// reported back to the operator here and never reach the controller.
pub fn spawn_reader(mut operator: OperatorInput, signals: Sender<ControlSignal>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read operator input: {}", e);
                    break;
                }
            };

            match Command::parse(&line).and_then(|command| operator.handle(command)) {
                Ok(Some(signal)) => {
                    if signals.send(signal).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }
        info!("Operator input closed");
    })
}
