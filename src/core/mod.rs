pub mod cli;
pub mod commands;
pub mod context;
pub mod dashboard;
pub mod dispatcher;
pub mod paths;
pub mod settings;
