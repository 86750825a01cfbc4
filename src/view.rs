use std::fmt::{Display, Formatter};
use serde::{Serialize, Serializer};
use crate::player::Player;
use crate::Character;

/// What one card slot looks like to whoever is looking at the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CardMarker {
    Role(Character),
    Secret,
    Eliminated,
}

impl Display for CardMarker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CardMarker::Role(character) => Display::fmt(character, f),
            CardMarker::Secret => f.write_str("secret"),
            CardMarker::Eliminated => f.write_str("eliminated"),
        }
    }
}

impl Serialize for CardMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub coin_count: u8,
    pub is_current_turn: bool,
    pub is_eliminated: bool,
    pub cards: Vec<CardMarker>,
    // face up cards are public
    pub revealed: Vec<Character>,
}

/// Redacted snapshot of the table. Only the viewer's own face down cards
/// are shown; a spectator (`viewer == None`) sees none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub deck_size: usize,
    pub current_player: String,
    pub players: Vec<PlayerView>,
}

impl GameView {
    pub fn project(players: &[Player], deck_size: usize, current_player_idx: usize, viewer: Option<usize>) -> Self {
        let current_player = players
            .get(current_player_idx)
            .map(|player| player.name().to_string())
            .unwrap_or_default();

        let players = players
            .iter()
            .enumerate()
            .map(|(player_idx, player)| {
                let cards = if !player.is_active() {
                    vec![CardMarker::Eliminated]
                } else if viewer == Some(player_idx) {
                    player.hand().iter().map(|&card| CardMarker::Role(card)).collect()
                } else {
                    vec![CardMarker::Secret; player.influence()]
                };

                PlayerView {
                    name: player.name().to_string(),
                    coin_count: player.coins(),
                    is_current_turn: player_idx == current_player_idx,
                    is_eliminated: !player.is_active(),
                    cards,
                    revealed: player.revealed().to_vec(),
                }
            })
            .collect();

        Self {
            deck_size,
            current_player,
            players,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::Character::{Assassin, Captain, Contessa, Duke};
    use crate::{CardMarker, GameView, Player};

    fn table() -> Vec<Player> {
        let mut eliminated = Player::new("P3", vec![Contessa]);
        eliminated.lose_influence(0).unwrap();
        vec![
            Player::new("P1", vec![Duke, Assassin]),
            Player::new("P2", vec![Captain, Duke]),
            eliminated,
        ]
    }

    #[test]
    fn viewer_sees_only_own_hand() {
        let view = GameView::project(&table(), 9, 1, Some(0));

        assert_eq!(view.current_player, "P2");
        assert_eq!(view.players[0].cards, vec![CardMarker::Role(Duke), CardMarker::Role(Assassin)]);
        assert_eq!(view.players[1].cards, vec![CardMarker::Secret, CardMarker::Secret]);
        assert_eq!(view.players[2].cards, vec![CardMarker::Eliminated]);
        assert_eq!(view.players[2].revealed, vec![Contessa]);
        assert!(view.players[1].is_current_turn);
        assert!(view.players[2].is_eliminated);
    }

    #[test]
    fn spectator_sees_no_hands() {
        let view = GameView::project(&table(), 9, 0, None);
        assert!(view.players[0].cards.iter().all(|card| *card == CardMarker::Secret));
    }

    #[test]
    fn json_shape() {
        let view = GameView::project(&table()[..2], 11, 0, Some(1));
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value, json!({
            "deckSize": 11,
            "currentPlayer": "P1",
            "players": [
                { "name": "P1", "coinCount": 2, "isCurrentTurn": true, "isEliminated": false, "cards": ["secret", "secret"], "revealed": [] },
                { "name": "P2", "coinCount": 2, "isCurrentTurn": false, "isEliminated": false, "cards": ["Captain", "Duke"], "revealed": [] }
            ]
        }));
    }
}
