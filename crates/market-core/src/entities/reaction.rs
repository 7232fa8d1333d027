//! Reaction types - the fixed emoji set, per-post tallies, and the
//! single-slot transition rules for the current user's reaction

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::DomainError;

/// Emoji a user can react to a post with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionSymbol {
    ThumbsUp,
    Heart,
    Laugh,
    Wow,
    Sad,
    Angry,
}

impl ReactionSymbol {
    /// Every selectable symbol, in picker order
    pub const ALL: [Self; 6] = [
        Self::ThumbsUp,
        Self::Heart,
        Self::Laugh,
        Self::Wow,
        Self::Sad,
        Self::Angry,
    ];

    /// The emoji as sent on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::Heart => "❤️",
            Self::Laugh => "😂",
            Self::Wow => "😮",
            Self::Sad => "😢",
            Self::Angry => "😡",
        }
    }

    /// Parse an emoji string
    ///
    /// The heart is accepted with or without the emoji variation selector.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim() {
            "👍" => Ok(Self::ThumbsUp),
            "❤️" | "❤" => Ok(Self::Heart),
            "😂" => Ok(Self::Laugh),
            "😮" => Ok(Self::Wow),
            "😢" => Ok(Self::Sad),
            "😡" => Ok(Self::Angry),
            other => Err(DomainError::UnknownReaction(other.to_string())),
        }
    }
}

impl fmt::Display for ReactionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReactionSymbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReactionSymbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Count for a single symbol on a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionCount {
    pub symbol: ReactionSymbol,
    pub count: u32,
}

impl ReactionCount {
    /// Create a new ReactionCount
    pub fn new(symbol: ReactionSymbol, count: u32) -> Self {
        Self { symbol, count }
    }
}

/// Per-post reaction tally
///
/// Symbols are unique and keep first-seen order, which is display order.
/// Entries never hold a zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionTally {
    entries: Vec<ReactionCount>,
}

impl ReactionTally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tally from server counts, merging duplicates and dropping zeros
    pub fn from_counts(counts: impl IntoIterator<Item = ReactionCount>) -> Self {
        let mut tally = Self::new();
        for entry in counts {
            if entry.count == 0 {
                continue;
            }
            match tally.position(entry.symbol) {
                Some(idx) => tally.entries[idx].count += entry.count,
                None => tally.entries.push(entry),
            }
        }
        tally
    }

    fn position(&self, symbol: ReactionSymbol) -> Option<usize> {
        self.entries.iter().position(|e| e.symbol == symbol)
    }

    /// Current count for a symbol (0 if absent)
    pub fn count_of(&self, symbol: ReactionSymbol) -> u32 {
        self.position(symbol).map_or(0, |idx| self.entries[idx].count)
    }

    /// Add one to a symbol, appending a new entry if absent
    pub fn increment(&mut self, symbol: ReactionSymbol) {
        match self.position(symbol) {
            Some(idx) => self.entries[idx].count += 1,
            None => self.entries.push(ReactionCount::new(symbol, 1)),
        }
    }

    /// Remove one from a symbol, dropping the entry when it reaches zero
    ///
    /// Returns false if the symbol had no entry.
    pub fn decrement(&mut self, symbol: ReactionSymbol) -> bool {
        let Some(idx) = self.position(symbol) else {
            return false;
        };
        if self.entries[idx].count <= 1 {
            self.entries.remove(idx);
        } else {
            self.entries[idx].count -= 1;
        }
        true
    }

    /// Iterate entries in display order
    pub fn iter(&self) -> impl Iterator<Item = &ReactionCount> {
        self.entries.iter()
    }

    /// Entries as a slice
    pub fn as_slice(&self) -> &[ReactionCount] {
        &self.entries
    }

    /// Sum of all counts
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Change to the current user's reaction slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTransition {
    /// No reaction before, `0` after
    Added(ReactionSymbol),
    /// Swapped one symbol for another
    Replaced {
        from: ReactionSymbol,
        to: ReactionSymbol,
    },
    /// Reaction `0` cleared
    Removed(ReactionSymbol),
}

impl ReactionTransition {
    /// Plan the transition for a user picking `target` while holding `current`
    ///
    /// Picking the held symbol again removes it.
    pub fn plan(current: Option<ReactionSymbol>, target: ReactionSymbol) -> Self {
        match current {
            None => Self::Added(target),
            Some(held) if held == target => Self::Removed(held),
            Some(held) => Self::Replaced {
                from: held,
                to: target,
            },
        }
    }

    /// Transition that moves the slot from `from` to `to`, if they differ
    pub fn between(from: Option<ReactionSymbol>, to: Option<ReactionSymbol>) -> Option<Self> {
        match (from, to) {
            (None, None) => None,
            (None, Some(to)) => Some(Self::Added(to)),
            (Some(from), None) => Some(Self::Removed(from)),
            (Some(from), Some(to)) if from == to => None,
            (Some(from), Some(to)) => Some(Self::Replaced { from, to }),
        }
    }

    /// Slot value before the transition
    pub fn previous(&self) -> Option<ReactionSymbol> {
        match *self {
            Self::Added(_) => None,
            Self::Replaced { from, .. } | Self::Removed(from) => Some(from),
        }
    }

    /// Slot value after the transition
    pub fn resulting(&self) -> Option<ReactionSymbol> {
        match *self {
            Self::Added(to) | Self::Replaced { to, .. } => Some(to),
            Self::Removed(_) => None,
        }
    }

    /// Symbol sent to the server for this transition
    ///
    /// The server toggles: sending the held symbol removes it, so a removal
    /// carries the symbol being removed.
    pub fn requested(&self) -> ReactionSymbol {
        match *self {
            Self::Added(symbol) | Self::Removed(symbol) => symbol,
            Self::Replaced { to, .. } => to,
        }
    }

    /// Apply to a reaction slot and its tally
    pub fn apply(&self, slot: &mut Option<ReactionSymbol>, tally: &mut ReactionTally) {
        if let Some(previous) = self.previous() {
            tally.decrement(previous);
        }
        if let Some(resulting) = self.resulting() {
            tally.increment(resulting);
        }
        *slot = self.resulting();
    }
}
