pub mod action;
pub mod ai;
pub mod config;
pub mod coup;
pub mod deck;
pub mod decision;
mod dispatch;
pub mod error;
pub mod history;
pub mod player;
pub mod turn;
pub mod view;

#[cfg(test)]
mod testing;

pub use action::{available_actions, Action, ActionKind};
pub use ai::{HonestAi, RandomAi};
pub use config::Config;
pub use coup::{Coup, GameOutcome};
pub use deck::Deck;
pub use decision::{Claim, Context, Decider};
pub use error::CoupError;
pub use history::{RoundConclusion, RoundHistory};
pub use player::Player;
pub use turn::{ChallengeResult, Phase, TurnOutcome, TurnReport};
pub use view::{CardMarker, GameView, PlayerView};

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

pub const COPIES_PER_CHARACTER: usize = 3;
pub const DECK_SIZE: usize = COPIES_PER_CHARACTER * 5;
pub const STARTING_COINS: u8 = 2;
pub const STARTING_HAND: usize = 2;
pub const MIN_PLAYERS: usize = 2;
// an exchange has to be able to draw 2 from what is left after dealing
pub const MAX_PLAYERS: usize = 6;
pub const FORCED_COUP_COINS: u8 = 10;
pub const EXCHANGE_DRAW: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
];

impl Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Duke => "Duke",
            Assassin => "Assassin",
            Captain => "Captain",
            Ambassador => "Ambassador",
            Contessa => "Contessa",
        };
        f.write_str(name)
    }
}
