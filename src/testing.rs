use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};
use crate::action::{Action, ActionKind};
use crate::config::Config;
use crate::coup::Coup;
use crate::decision::{Claim, Context, Decider, Snapshot};
use crate::history::RoundHistory;
use crate::player::Player;
use crate::view::GameView;
use crate::Character;

/// Replays queued answers. Once a queue runs dry it takes Income, never
/// challenges or counters, loses its first card and keeps its old hand.
#[derive(Default)]
pub(crate) struct Script {
    pub actions: VecDeque<(ActionKind, Option<usize>)>,
    pub challenges: VecDeque<bool>,
    pub counters: VecDeque<Option<Character>>,
    pub losses: VecDeque<usize>,
    pub keeps: VecDeque<Vec<usize>>,
    pub delay: Option<Duration>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn act(mut self, kind: ActionKind, target: Option<usize>) -> Self {
        self.actions.push_back((kind, target));
        self
    }

    pub fn challenge(mut self, answer: bool) -> Self {
        self.challenges.push_back(answer);
        self
    }

    pub fn counter(mut self, role: Option<Character>) -> Self {
        self.counters.push_back(role);
        self
    }

    pub fn lose(mut self, card_idx: usize) -> Self {
        self.losses.push_back(card_idx);
        self
    }

    pub fn keep(mut self, indices: Vec<usize>) -> Self {
        self.keeps.push_back(indices);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn wait(&self) {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
    }
}

impl Decider for Script {
    fn choose_action(&mut self, _ctx: &Context, _legal: &[ActionKind]) -> (ActionKind, Option<usize>) {
        self.wait();
        self.actions.pop_front().unwrap_or((ActionKind::Income, None))
    }

    fn decide_challenge(&mut self, _ctx: &Context, _claim: &Claim) -> bool {
        self.wait();
        self.challenges.pop_front().unwrap_or(false)
    }

    fn decide_counter(&mut self, _ctx: &Context, _actor: usize, _action: Action) -> Option<Character> {
        self.wait();
        self.counters.pop_front().flatten()
    }

    fn choose_card_to_lose(&mut self, _ctx: &Context) -> usize {
        self.wait();
        self.losses.pop_front().unwrap_or(0)
    }

    fn choose_exchange_keep(&mut self, ctx: &Context, _drawn: &[Character]) -> Vec<usize> {
        self.wait();
        self.keeps.pop_front().unwrap_or_else(|| (0..ctx.hand.len()).collect())
    }
}

/// A game seated P1, P2, ... with one script per seat.
pub(crate) fn game(scripts: Vec<Script>) -> Coup {
    game_with(scripts, Config::default())
}

pub(crate) fn game_with(scripts: Vec<Script>, config: Config) -> Coup {
    let seats = scripts
        .into_iter()
        .enumerate()
        .map(|(idx, script)| (format!("P{}", idx + 1), Box::new(script) as Box<dyn Decider>))
        .collect();

    match Coup::new(seats, config, 42) {
        Ok(game) => game,
        Err(err) => panic!("failed to set up game: {err}"),
    }
}

/// The 15 card bookkeeping rule, checked from the outside.
pub(crate) fn assert_card_invariant(game: &Coup) {
    let held: usize = game.players()
        .iter()
        .map(|player| player.hand().len() + player.revealed().len())
        .sum();
    assert_eq!(game.deck().len() + held, crate::DECK_SIZE);

    for player in game.players() {
        assert_eq!(player.is_active(), !player.hand().is_empty());
        if !player.is_active() {
            assert_eq!(player.coins(), 0);
        }
    }
}

/// What seat 0 of a two player table holding Duke and Captain gets asked with.
pub(crate) fn snapshot() -> Snapshot {
    let players = vec![
        Player::new("P1", vec![Character::Duke, Character::Captain]),
        Player::new("P2", vec![Character::Contessa, Character::Assassin]),
    ];

    Snapshot {
        seat: 0,
        view: GameView::project(&players, 11, 0, Some(0)),
        history: RoundHistory::new(),
        hand: players[0].hand().to_vec(),
        coins: players[0].coins(),
        opponents: vec![1],
        deadline: Instant::now() + Duration::from_secs(60),
    }
}
