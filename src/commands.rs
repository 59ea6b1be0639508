//! REPL command table
//!
//! Maps the first word of an input line to a command, and carries the help text
//! and argument requirements for each one.

use thiserror::Error;

use crate::data::PokeApiError;

/// Error types for running a command
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command needs an argument that was not given
    #[error("Missing argument. Usage: {command} <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    /// No location area with that name exists
    #[error("Unknown location area: '{0}'")]
    UnknownArea(String),

    /// No Pokemon with that name exists
    #[error("Unknown Pokemon: '{0}'. Make sure it exists")]
    UnknownPokemon(String),

    /// Fetching from PokeAPI failed
    #[error(transparent)]
    Api(#[from] PokeApiError),

    /// Writing output failed
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// The commands understood by the REPL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Help,
    Exit,
    Map,
    MapBack,
    Explore,
    Catch,
    Inspect,
    Pokedex,
}

impl Command {
    /// Every command, in the order help lists them
    pub const ALL: [Command; 8] = [
        Command::Help,
        Command::Exit,
        Command::Map,
        Command::MapBack,
        Command::Explore,
        Command::Catch,
        Command::Inspect,
        Command::Pokedex,
    ];

    /// Looks up a command by the name typed at the prompt
    ///
    /// Returns `None` if the name doesn't match any command.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Command> {
        let name = s.trim().to_lowercase();
        Command::ALL.into_iter().find(|command| command.name() == name)
    }

    /// Name typed at the prompt
    pub fn name(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Exit => "exit",
            Command::Map => "map",
            Command::MapBack => "mapb",
            Command::Explore => "explore",
            Command::Catch => "catch",
            Command::Inspect => "inspect",
            Command::Pokedex => "pokedex",
        }
    }

    /// One-line description shown by help
    pub fn description(self) -> &'static str {
        match self {
            Command::Help => "Displays a help message",
            Command::Exit => "Exit the Pokedex",
            Command::Map => "Displays the next 20 location areas",
            Command::MapBack => "Displays the previous 20 location areas",
            Command::Explore => "Lists the Pokemon found in a location area",
            Command::Catch => "Throws a Pokeball at a Pokemon",
            Command::Inspect => "Shows details of a caught Pokemon",
            Command::Pokedex => "Lists the Pokemon you have caught",
        }
    }

    /// Placeholder for the required argument, if the command takes one
    pub fn argument(self) -> Option<&'static str> {
        match self {
            Command::Explore => Some("area"),
            Command::Catch | Command::Inspect => Some("pokemon"),
            _ => None,
        }
    }

    /// Usage string such as `explore <area>`
    pub fn usage(self) -> String {
        match self.argument() {
            Some(argument) => format!("{} <{}>", self.name(), argument),
            None => self.name().to_string(),
        }
    }

    /// Returns the argument, or a `MissingArgument` error if the command needs one
    pub fn require_argument(self, arg: Option<&str>) -> Result<&str, CommandError> {
        match (self.argument(), arg) {
            (_, Some(arg)) => Ok(arg),
            (Some(argument), None) => Err(CommandError::MissingArgument {
                command: self.name(),
                argument,
            }),
            (None, None) => Ok(""),
        }
    }
}
