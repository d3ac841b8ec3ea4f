//! Core domain types for card tic-tac-toe: colors, cards and decks.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Lowest card rank.
pub const MIN_RANK: u8 = 1;

/// Highest card rank.
pub const MAX_RANK: u8 = 5;

/// Copies of each rank dealt to a color.
pub const COPIES_PER_RANK: u8 = 2;

/// Cards per color per game.
pub const DECK_SIZE: usize = (MAX_RANK as usize) * (COPIES_PER_RANK as usize);

/// Unique card identity, e.g. `"green-3-2"`.
pub type CardId = String;

/// One of the two sides.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Green side (room host, "player 1").
    #[display("green")]
    Green,
    /// Red side (room guest, "player 2").
    #[display("red")]
    Red,
}

impl Color {
    /// Returns the other color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Green => Color::Red,
            Color::Red => Color::Green,
        }
    }
}

/// A numbered card.
///
/// Field names on the wire follow the shared room document
/// (`number`, `color`, `used`, `id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Strength, 1 through 5.
    #[serde(rename = "number")]
    pub rank: u8,
    /// Side the card belongs to.
    #[serde(rename = "color")]
    pub owner: Color,
    /// Set once the card has been placed. Never cleared within a game.
    pub used: bool,
    /// Distinguishes the two copies of a rank.
    pub id: CardId,
}

impl Card {
    /// Creates an unused card.
    pub fn new(rank: u8, owner: Color, copy: u8) -> Self {
        Self {
            rank,
            owner,
            used: false,
            id: format!("{}-{}-{}", owner, rank, copy),
        }
    }

    /// Returns true if this card can overwrite a cell holding `rank`.
    pub fn outranks(&self, rank: u8) -> bool {
        self.rank > rank
    }
}

/// The ordered hand of one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Deals a fresh deck: ranks 1..=5, two copies each, all unused.
    #[instrument]
    pub fn build(color: Color) -> Self {
        let cards = (MIN_RANK..=MAX_RANK)
            .flat_map(|rank| (1..=COPIES_PER_RANK).map(move |copy| Card::new(rank, color, copy)))
            .collect();
        Self { cards }
    }

    /// Wraps an existing card list (used when restoring snapshots).
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// All cards in deck order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Cards not yet placed, in deck order.
    pub fn unused(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| !c.used)
    }

    /// Clones of the unused cards, in deck order.
    pub fn unused_cards(&self) -> Vec<Card> {
        self.unused().cloned().collect()
    }

    /// Number of cards not yet placed.
    pub fn unused_count(&self) -> usize {
        self.unused().count()
    }

    /// Looks up a card by identity.
    pub fn find(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Mutable lookup by identity.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// Marks a card as played. Returns false if the id is not in this deck.
    pub fn mark_used(&mut self, id: &str) -> bool {
        match self.find_mut(id) {
            Some(card) => {
                card.used = true;
                true
            }
            None => false,
        }
    }
}

/// Both decks of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decks {
    /// Green's hand.
    pub green: Deck,
    /// Red's hand.
    pub red: Deck,
}

impl Decks {
    /// Deals fresh decks for both colors.
    pub fn new() -> Self {
        Self {
            green: Deck::build(Color::Green),
            red: Deck::build(Color::Red),
        }
    }

    /// Returns the deck of `color`.
    pub fn get(&self, color: Color) -> &Deck {
        match color {
            Color::Green => &self.green,
            Color::Red => &self.red,
        }
    }

    /// Returns the deck of `color` mutably.
    pub fn get_mut(&mut self, color: Color) -> &mut Deck {
        match color {
            Color::Green => &mut self.green,
            Color::Red => &mut self.red,
        }
    }

    /// Finds a card by identity in either deck.
    ///
    /// Absence is a normal outcome ("no legal card"), not an error.
    #[instrument(skip(self))]
    pub fn find_card(&self, id: &str) -> Option<&Card> {
        let card = self.green.find(id).or_else(|| self.red.find(id));
        if card.is_none() {
            debug!(card_id = id, "Card not found");
        }
        card
    }

    /// Mutable lookup by identity in either deck.
    pub fn find_card_mut(&mut self, id: &str) -> Option<&mut Card> {
        if self.green.find(id).is_some() {
            self.green.find_mut(id)
        } else {
            self.red.find_mut(id)
        }
    }
}

impl Default for Decks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_deck_has_two_of_each_rank() {
        let deck = Deck::build(Color::Red);
        assert_eq!(deck.cards().len(), DECK_SIZE);
        for rank in MIN_RANK..=MAX_RANK {
            assert_eq!(deck.cards().iter().filter(|c| c.rank == rank).count(), 2);
        }
        assert!(deck.cards().iter().all(|c| !c.used && c.owner == Color::Red));
    }

    #[test]
    fn test_build_deck_is_deterministic() {
        assert_eq!(Deck::build(Color::Green), Deck::build(Color::Green));
        let ids: Vec<_> = Deck::build(Color::Green)
            .cards()
            .iter()
            .map(|c| c.id.clone())
            .take(3)
            .collect();
        assert_eq!(ids, vec!["green-1-1", "green-1-2", "green-2-1"]);
    }

    #[test]
    fn test_mark_used_only_touches_named_card() {
        let mut deck = Deck::build(Color::Green);
        assert!(deck.mark_used("green-3-2"));
        assert!(!deck.mark_used("red-3-2"));
        assert_eq!(deck.unused_count(), DECK_SIZE - 1);
        assert!(deck.find("green-3-1").is_some_and(|c| !c.used));
    }

    #[test]
    fn test_find_card_absent_is_none() {
        let decks = Decks::new();
        assert!(decks.find_card("red-5-2").is_some());
        assert!(decks.find_card("blue-1-1").is_none());
    }

    #[test]
    fn test_card_serializes_with_document_field_names() {
        let card = Card::new(4, Color::Green, 1);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["number"], 4);
        assert_eq!(json["color"], "green");
        assert_eq!(json["id"], "green-4-1");
    }
}
