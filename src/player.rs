use crate::error::CoupError;
use crate::{Character, STARTING_COINS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub(crate) name: String,
    pub(crate) coins: u8,
    // face down, in the order the player sees them
    pub(crate) hand: Vec<Character>,
    // face up, lost influence
    pub(crate) revealed: Vec<Character>,
}

impl Player {
    pub fn new(name: impl Into<String>, hand: Vec<Character>) -> Self {
        Self {
            name: name.into(),
            coins: STARTING_COINS,
            hand,
            revealed: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coins(&self) -> u8 {
        self.coins
    }

    pub fn hand(&self) -> &[Character] {
        &self.hand
    }

    pub fn revealed(&self) -> &[Character] {
        &self.revealed
    }

    /// A player is in the game exactly as long as they hold a face down card.
    pub fn is_active(&self) -> bool {
        !self.hand.is_empty()
    }

    pub fn influence(&self) -> usize {
        self.hand.len()
    }

    pub fn holds(&self, character: Character) -> Option<usize> {
        self.hand.iter().position(|&card| card == character)
    }

    pub(crate) fn gain(&mut self, amount: u8) {
        self.coins = self.coins.saturating_add(amount);
    }

    // takes up to `amount`, returns what was actually taken
    pub(crate) fn pay(&mut self, amount: u8) -> u8 {
        let paid = amount.min(self.coins);
        self.coins -= paid;
        paid
    }

    /// Flips one card face up. Losing the last card eliminates the player and
    /// their coins go back to the treasury.
    pub(crate) fn lose_influence(&mut self, card_idx: usize) -> Result<Character, CoupError> {
        if card_idx >= self.hand.len() {
            return Err(CoupError::IllegalCardIndex(card_idx));
        }

        let card = self.hand.remove(card_idx);
        self.revealed.push(card);

        if self.hand.is_empty() {
            self.coins = 0;
        }

        Ok(card)
    }
}

/// Seats still in the game, clockwise starting after `exclude_idx`.
pub(crate) fn other_player_indexes(players: &[Player], exclude_idx: usize) -> Vec<usize> {
    (1..players.len())
        .map(|n| (exclude_idx + n) % players.len())
        .filter(|&player_idx| players[player_idx].is_active())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::player::other_player_indexes;
    use crate::Character::{Assassin, Captain, Duke};
    use crate::{CoupError, Player};

    #[test]
    fn starting_state() {
        let player = Player::new("P1", vec![Duke, Assassin]);
        assert_eq!(player.coins(), 2);
        assert_eq!(player.influence(), 2);
        assert!(player.revealed().is_empty());
        assert!(player.is_active());
        assert_eq!(player.holds(Assassin), Some(1));
        assert_eq!(player.holds(Duke), Some(0));
    }

    #[test]
    fn losing_last_card_eliminates() {
        let mut player = Player::new("P1", vec![Duke, Assassin]);
        player.gain(5);

        assert_eq!(player.lose_influence(1), Ok(Assassin));
        assert!(player.is_active());
        assert_eq!(player.coins(), 7);

        assert_eq!(player.lose_influence(0), Ok(Duke));
        assert!(!player.is_active());
        assert_eq!(player.coins(), 0);
        assert_eq!(player.revealed(), &[Assassin, Duke]);
    }

    #[test]
    fn bad_index() {
        let mut player = Player::new("P1", vec![Duke]);
        assert_eq!(player.lose_influence(1), Err(CoupError::IllegalCardIndex(1)));
        assert_eq!(player.hand(), &[Duke]);
    }

    #[test]
    fn pay_is_floored() {
        let mut player = Player::new("P1", vec![Duke]);
        assert_eq!(player.pay(3), 2);
        assert_eq!(player.coins(), 0);
    }

    #[test]
    fn other_players() {
        let players: Vec<Player> = (1..=4).map(|n| Player::new(format!("P{n}"), vec![Captain])).collect();
        assert_eq!(other_player_indexes(&players, 0), vec![1, 2, 3]);
        assert_eq!(other_player_indexes(&players, 1), vec![2, 3, 0]);

        let mut players = players;
        players[2].lose_influence(0).unwrap();
        assert_eq!(other_player_indexes(&players, 1), vec![3, 0]);
        // an eliminated seat still has neighbours
        assert_eq!(other_player_indexes(&players, 2), vec![3, 0, 1]);
    }
}
