//! In-memory collection of caught Pokemon
//!
//! Entries are keyed by lowercased name and kept sorted so listings are stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::data::Pokemon;

/// The parts of a Pokemon worth keeping once it has been caught
#[derive(Debug, Clone, PartialEq)]
pub struct CaughtPokemon {
    pub name: String,
    pub height: u32,
    pub weight: u32,
    /// (stat name, base value) in API order
    pub stats: Vec<(String, u32)>,
    /// Type names in slot order
    pub types: Vec<String>,
    pub caught_at: DateTime<Utc>,
}

impl CaughtPokemon {
    /// Extracts the kept fields from a full API response
    pub fn from_pokemon(pokemon: &Pokemon) -> Self {
        let stats = pokemon
            .stats
            .iter()
            .map(|s| (s.stat.name.clone(), s.base_stat))
            .collect();

        let mut types: Vec<_> = pokemon.types.iter().collect();
        types.sort_by_key(|t| t.slot);

        Self {
            name: pokemon.name.to_lowercase(),
            height: pokemon.height,
            weight: pokemon.weight,
            stats,
            types: types.into_iter().map(|t| t.type_.name.clone()).collect(),
            caught_at: Utc::now(),
        }
    }
}

/// The user's caught Pokemon
#[derive(Debug, Default)]
pub struct Pokedex {
    caught: BTreeMap<String, CaughtPokemon>,
}

impl Pokedex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a catch, replacing any earlier catch of the same Pokemon
    pub fn add(&mut self, pokemon: CaughtPokemon) {
        self.caught.insert(pokemon.name.clone(), pokemon);
    }

    /// Looks up a caught Pokemon by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&CaughtPokemon> {
        self.caught.get(&name.to_lowercase())
    }

    /// Caught Pokemon in alphabetical order
    pub fn iter(&self) -> impl Iterator<Item = &CaughtPokemon> {
        self.caught.values()
    }

    pub fn len(&self) -> usize {
        self.caught.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caught.is_empty()
    }
}
