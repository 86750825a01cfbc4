use std::fmt::{Debug, Formatter};
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use crate::config::Config;
use crate::deck::Deck;
use crate::decision::Decider;
use crate::dispatch::Dispatch;
use crate::error::CoupError;
use crate::history::RoundHistory;
use crate::player::Player;
use crate::turn::{Transitions, Turn, TurnReport};
use crate::view::GameView;
use crate::{MAX_PLAYERS, MIN_PLAYERS, STARTING_HAND};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(usize),
    // nobody left standing, the rules should never get here
    Draw,
    TurnLimit,
}

type Observer = Box<dyn FnMut(&TurnReport, &GameView)>;

/// Owns the table (deck, players, history) and runs turns in seat order
/// until one player is left.
pub struct Coup {
    pub(crate) turn: usize,
    pub(crate) current_player_idx: usize,
    pub(crate) deck: Deck,
    pub(crate) players: Vec<Player>,
    pub(crate) history: RoundHistory,
    pub(crate) deciders: Dispatch,
    pub(crate) rng: Pcg64,
    pub(crate) config: Config,
    pub(crate) transitions: Transitions,

    acted_this_round: Vec<bool>,
    observer: Option<Observer>,
    outcome: Option<GameOutcome>,
}

impl Debug for Coup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("T {} | P {} | deck {}\n", self.turn, self.current_player_idx, self.deck.len()).as_str())?;
        for (player_idx, player) in self.players.iter().enumerate() {
            f.write_str(format!("\tP {player_idx}: ${} | {:?} | revealed {:?}\n", player.coins, player.hand, player.revealed).as_str())?;
        }
        Ok(())
    }
}

impl Coup {
    /// Shuffles a fresh deck and deals two cards to every seat. The seed
    /// makes the whole game reproducible given the same deciders.
    pub fn new(seats: Vec<(String, Box<dyn Decider>)>, config: Config, seed: u64) -> Result<Self, CoupError> {
        if seats.len() < MIN_PLAYERS {
            return Err(CoupError::NotEnoughPlayers(seats.len()));
        }
        if seats.len() > MAX_PLAYERS {
            return Err(CoupError::TooManyPlayers(seats.len()));
        }

        let mut rng = Pcg64::seed_from_u64(seed);
        let mut deck = Deck::new(&mut rng);

        let mut players = Vec::with_capacity(seats.len());
        let mut deciders = Vec::with_capacity(seats.len());
        for (name, decider) in seats {
            players.push(Player::new(name, deck.draw(STARTING_HAND)?));
            deciders.push(decider);
        }

        info!("dealt {} players, {} cards left in the deck (seed {seed})", players.len(), deck.len());

        Ok(Self {
            turn: 0,
            current_player_idx: 0,
            acted_this_round: vec![false; players.len()],
            deck,
            players,
            history: RoundHistory::new(),
            deciders: Dispatch::new(deciders)?,
            rng,
            config,
            transitions: Transitions::default(),
            observer: None,
            outcome: None,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_player(&self) -> usize {
        self.current_player_idx
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// The table as `viewer` is allowed to see it, `None` for a spectator.
    pub fn view(&self, viewer: Option<usize>) -> GameView {
        GameView::project(&self.players, self.deck.len(), self.current_player_idx, viewer)
    }

    /// Called after every completed turn with a spectator view of the table.
    pub fn set_observer(&mut self, observer: impl FnMut(&TurnReport, &GameView) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn winner(&self) -> Option<usize> {
        match self.outcome {
            Some(GameOutcome::Winner(player_idx)) => Some(player_idx),
            _ => None,
        }
    }

    pub fn play(&mut self) -> Result<GameOutcome, CoupError> {
        loop {
            self.play_turn()?;

            if let Some(outcome) = self.outcome {
                return Ok(outcome);
            }
        }
    }

    /// Runs the current player's turn, then checks for a winner and moves
    /// on to the next living player.
    pub fn play_turn(&mut self) -> Result<TurnReport, CoupError> {
        if self.outcome.is_some() {
            return Err(CoupError::GameOver);
        }

        let actor = self.current_player_idx;
        if !self.players[actor].is_active() {
            return Err(CoupError::InvalidPlayerState(self.players[actor].name().to_string()));
        }

        let report = Turn::new(self, actor).run()?;
        self.turn += 1;
        self.acted_this_round[actor] = true;

        if let Some(observer) = self.observer.as_mut() {
            let view = GameView::project(&self.players, self.deck.len(), self.current_player_idx, None);
            observer(&report, &view);
        }

        self.conclude_round_if_complete();

        self.outcome = match self.players.iter().filter(|player| player.is_active()).count() {
            0 => Some(GameOutcome::Draw),
            1 => self.players.iter().position(|player| player.is_active()).map(GameOutcome::Winner),
            _ if self.config.max_turns.map_or(false, |max_turns| self.turn >= max_turns) => Some(GameOutcome::TurnLimit),
            _ => None,
        };

        match self.outcome {
            Some(GameOutcome::Winner(player_idx)) => info!("game over after {} turns, {} wins", self.turn, self.players[player_idx].name()),
            Some(outcome) => info!("game over after {} turns: {:?}", self.turn, outcome),
            None => self.current_player_idx = self.next_living_player(),
        }

        Ok(report)
    }

    // a round is over once everyone still standing has had a turn in it
    fn conclude_round_if_complete(&mut self) {
        let complete = self.players
            .iter()
            .zip(&self.acted_this_round)
            .all(|(player, &acted)| acted || !player.is_active());

        if complete {
            let conclusion = self.history.conclude_round();
            debug!("{conclusion}");
            self.acted_this_round.iter_mut().for_each(|acted| *acted = false);
        }
    }

    fn next_living_player(&self) -> usize {
        let mut idx = self.current_player_idx;

        idx = (idx + 1) % self.players.len();
        while !self.players[idx].is_active() && idx != self.current_player_idx {
            idx = (idx + 1) % self.players.len();
        }

        idx
    }

    // deals every seat exactly these cards, going through the deck so the
    // card count stays right
    #[cfg(test)]
    pub(crate) fn rig(&mut self, hands: &[&[crate::Character]]) {
        assert_eq!(hands.len(), self.players.len());

        for player in self.players.iter_mut() {
            let old_hand = std::mem::take(&mut player.hand);
            self.deck.return_cards(old_hand, &mut self.rng);
        }

        for (player, hand) in self.players.iter_mut().zip(hands) {
            for &character in hand.iter() {
                match self.deck.take(character) {
                    Some(card) => player.hand.push(card),
                    None => panic!("no {character} left in the deck to rig"),
                }
            }
        }
    }
}
