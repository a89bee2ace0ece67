pub mod command;
pub mod runner;

pub use command::Command;
pub use runner::{
    CommandOutput, CommandRunner, Invocation, SystemRunner, run_checked, run_status, spawn,
};
