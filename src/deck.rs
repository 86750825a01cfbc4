use rand::seq::SliceRandom;
use rand::Rng;
use crate::error::CoupError;
use crate::{Character, CHARACTER_VARIANTS, COPIES_PER_CHARACTER};

/// The court deck. Cards carry no identity beyond their character, so a card
/// that goes back in and comes out again is just another card of that role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Character>,
}

impl Deck {
    pub fn new<R: Rng + Sized>(rng: &mut R) -> Self {
        let mut cards: Vec<Character> = CHARACTER_VARIANTS.iter()
            .flat_map(|&card| std::iter::repeat(card).take(COPIES_PER_CHARACTER))
            .collect();

        cards.shuffle(rng);

        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn count(&self, character: Character) -> usize {
        self.cards.iter().filter(|&&card| card == character).count()
    }

    pub fn draw(&mut self, n: usize) -> Result<Vec<Character>, CoupError> {
        if n > self.cards.len() {
            return Err(CoupError::DeckUnderflow {
                requested: n,
                remaining: self.cards.len(),
            });
        }

        Ok(self.cards.drain(..n).collect())
    }

    pub fn return_cards<R, I>(&mut self, cards: I, rng: &mut R)
    where
        R: Rng + Sized,
        I: IntoIterator<Item = Character>,
    {
        self.cards.extend(cards);
        self.cards.shuffle(rng);
    }

    // pulls a specific card out of the deck, used to rig hands in tests
    #[cfg(test)]
    pub(crate) fn take(&mut self, character: Character) -> Option<Character> {
        let idx = self.cards.iter().position(|&card| card == character)?;
        Some(self.cards.remove(idx))
    }
}
