//! Session state for Pokedex CLI
//!
//! This module holds everything a REPL session carries between commands: the
//! API client (and through it the response cache), the location-area page
//! cursor, the caught Pokemon, and the RNG used for catch rolls.

use std::io::Write;

use chrono::SecondsFormat;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use crate::catch::attempt_catch;
use crate::commands::{Command, CommandError};
use crate::data::{PokeApiClient, PokeApiError};
use crate::pokedex::{CaughtPokemon, Pokedex};

/// Where the session is in the location-area listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    /// URL `map` will fetch next; `None` before the first page or after the last
    pub next: Option<String>,
    /// URL `mapb` will fetch; `None` on the first page
    pub previous: Option<String>,
    /// Whether any page has been shown yet
    pub started: bool,
}

/// Main application struct managing session state
pub struct App {
    /// Location-area pagination
    pub cursor: PageCursor,
    /// Caught Pokemon
    pub pokedex: Pokedex,
    /// Flag indicating the REPL should stop
    pub should_quit: bool,
    client: PokeApiClient,
    rng: Box<dyn RngCore + Send>,
}

impl App {
    /// Creates a new App with an entropy-seeded RNG
    pub fn new(client: PokeApiClient) -> Self {
        Self::with_rng(client, StdRng::from_entropy())
    }

    /// Creates a new App with a specific RNG (for reproducible catches)
    pub fn with_rng(client: PokeApiClient, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            cursor: PageCursor::default(),
            pokedex: Pokedex::new(),
            should_quit: false,
            client,
            rng: Box::new(rng),
        }
    }

    /// The API client used by this session
    pub fn client(&self) -> &PokeApiClient {
        &self.client
    }

    /// Ends the session, stopping the cache sweeper
    pub async fn shutdown(self) {
        self.client.into_cache().shutdown().await;
    }

    /// Runs a single command, writing its output to `out`
    ///
    /// # Arguments
    /// * `command` - The command to run
    /// * `arg` - The word following the command name, if any
    /// * `out` - Where command output is written
    pub async fn execute<W: Write>(
        &mut self,
        command: Command,
        arg: Option<&str>,
        out: &mut W,
    ) -> Result<(), CommandError> {
        debug!(command = command.name(), arg, "Running command");

        match command {
            Command::Help => self.help(out),
            Command::Exit => self.exit(out),
            Command::Map => self.map_forward(out).await,
            Command::MapBack => self.map_back(out).await,
            Command::Explore => {
                let area = command.require_argument(arg)?;
                self.explore(area, out).await
            }
            Command::Catch => {
                let name = command.require_argument(arg)?;
                self.catch(name, out).await
            }
            Command::Inspect => {
                let name = command.require_argument(arg)?;
                self.inspect(name, out)
            }
            Command::Pokedex => self.list_pokedex(out),
        }
    }

    fn help<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Welcome to the Pokedex!")?;
        writeln!(out, "Usage:")?;
        writeln!(out)?;
        for command in Command::ALL {
            writeln!(out, "{}: {}", command.usage(), command.description())?;
        }
        Ok(())
    }

    fn exit<W: Write>(&mut self, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Closing the Pokedex... Goodbye!")?;
        self.should_quit = true;
        Ok(())
    }

    async fn map_forward<W: Write>(&mut self, out: &mut W) -> Result<(), CommandError> {
        if self.cursor.started && self.cursor.next.is_none() {
            writeln!(out, "you're on the last page")?;
            return Ok(());
        }
        let url = self.cursor.next.clone();
        self.show_page(url.as_deref(), out).await
    }

    async fn map_back<W: Write>(&mut self, out: &mut W) -> Result<(), CommandError> {
        let Some(url) = self.cursor.previous.clone() else {
            writeln!(out, "you're on the first page")?;
            return Ok(());
        };
        self.show_page(Some(&url), out).await
    }

    async fn show_page<W: Write>(
        &mut self,
        url: Option<&str>,
        out: &mut W,
    ) -> Result<(), CommandError> {
        let page = self.client.location_areas(url).await?;

        for area in &page.results {
            writeln!(out, "{}", area.name)?;
        }

        self.cursor = PageCursor {
            next: page.next,
            previous: page.previous,
            started: true,
        };
        Ok(())
    }

    async fn explore<W: Write>(&mut self, area: &str, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Exploring {}...", area)?;

        let location = match self.client.location_area(area).await {
            Ok(location) => location,
            Err(PokeApiError::NotFound { .. } | PokeApiError::InvalidName(_)) => {
                return Err(CommandError::UnknownArea(area.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        writeln!(out, "Found Pokemon:")?;
        for encounter in &location.pokemon_encounters {
            writeln!(out, " - {}", encounter.pokemon.name)?;
        }
        Ok(())
    }

    async fn catch<W: Write>(&mut self, name: &str, out: &mut W) -> Result<(), CommandError> {
        let name = name.to_lowercase();
        writeln!(out, "Throwing a Pokeball at {}...", name)?;

        let pokemon = match self.client.pokemon(&name).await {
            Ok(pokemon) => pokemon,
            Err(PokeApiError::NotFound { .. } | PokeApiError::InvalidName(_)) => {
                return Err(CommandError::UnknownPokemon(name))
            }
            Err(e) => return Err(e.into()),
        };

        if attempt_catch(pokemon.base_experience, &mut *self.rng) {
            info!(pokemon = %name, "Caught");
            writeln!(out, "{} was caught!", name)?;
            writeln!(out, "You may now inspect it with the inspect command.")?;
            self.pokedex.add(CaughtPokemon::from_pokemon(&pokemon));
        } else {
            writeln!(out, "{} escaped!", name)?;
        }
        Ok(())
    }

    fn inspect<W: Write>(&self, name: &str, out: &mut W) -> Result<(), CommandError> {
        let Some(pokemon) = self.pokedex.get(name) else {
            writeln!(out, "you have not caught that pokemon")?;
            return Ok(());
        };

        writeln!(out, "Name: {}", pokemon.name)?;
        writeln!(out, "Height: {}", pokemon.height)?;
        writeln!(out, "Weight: {}", pokemon.weight)?;
        writeln!(out, "Stats:")?;
        for (stat, value) in &pokemon.stats {
            writeln!(out, "  -{}: {}", stat, value)?;
        }
        writeln!(out, "Types:")?;
        for type_name in &pokemon.types {
            writeln!(out, "  - {}", type_name)?;
        }
        writeln!(
            out,
            "Caught: {}",
            pokemon.caught_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        Ok(())
    }

    fn list_pokedex<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Your Pokedex:")?;
        if self.pokedex.is_empty() {
            writeln!(out, " - (no Pokemon caught yet)")?;
            return Ok(());
        }
        for pokemon in self.pokedex.iter() {
            writeln!(out, " - {}", pokemon.name)?;
        }
        Ok(())
    }
}
