use std::time::Instant;
use crate::action::{Action, ActionKind};
use crate::history::RoundHistory;
use crate::view::GameView;
use crate::Character;

/// Everything a decider may look at when it is asked something. The view is
/// already redacted for `seat`.
pub struct Context<'a> {
    pub seat: usize,
    pub view: &'a GameView,
    pub history: &'a RoundHistory,
    pub hand: &'a [Character],
    pub coins: u8,
    /// other seats still in the game, in turn order after `seat`
    pub opponents: &'a [usize],
    /// answers after this are discarded, long running deciders should give up
    pub deadline: Instant,
}

impl Context<'_> {
    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

// owns what a Context borrows so the question can leave the engine thread
pub(crate) struct Snapshot {
    pub(crate) seat: usize,
    pub(crate) view: GameView,
    pub(crate) history: RoundHistory,
    pub(crate) hand: Vec<Character>,
    pub(crate) coins: u8,
    pub(crate) opponents: Vec<usize>,
    pub(crate) deadline: Instant,
}

impl Snapshot {
    pub(crate) fn context(&self) -> Context<'_> {
        Context {
            seat: self.seat,
            view: &self.view,
            history: &self.history,
            hand: &self.hand,
            coins: self.coins,
            opponents: &self.opponents,
            deadline: self.deadline,
        }
    }
}

/// A role claim that is open to challenge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Claim {
    Action { actor: usize, action: Action, role: Character },
    Counter { counterer: usize, role: Character, actor: usize, action: Action },
}

impl Claim {
    pub fn claimant(&self) -> usize {
        match self {
            Claim::Action { actor, .. } => *actor,
            Claim::Counter { counterer, .. } => *counterer,
        }
    }

    pub fn role(&self) -> Character {
        match self {
            Claim::Action { role, .. } | Claim::Counter { role, .. } => *role,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Claim::Action { action, .. } | Claim::Counter { action, .. } => *action,
        }
    }
}

/// The seam between the rules engine and whatever picks moves: a person at a
/// prompt, a script or a model. Implementations only answer questions; the
/// engine validates every answer and does all of the mutation itself.
///
/// Questions are answered on a worker thread. One that runs past the
/// deadline is abandoned and the decider is not asked again until it returns.
pub trait Decider: Send {
    /// Pick one of `legal` and a target seat when the action needs one.
    fn choose_action(&mut self, ctx: &Context, legal: &[ActionKind]) -> (ActionKind, Option<usize>);

    fn decide_challenge(&mut self, ctx: &Context, claim: &Claim) -> bool;

    /// `Some(role)` blocks `action` claiming that role.
    fn decide_counter(&mut self, ctx: &Context, actor: usize, action: Action) -> Option<Character>;

    /// Index into `ctx.hand` of the card to turn face up.
    fn choose_card_to_lose(&mut self, ctx: &Context) -> usize;

    /// Indices into `ctx.hand` followed by `drawn`; exactly `ctx.hand.len()`
    /// distinct ones must be returned.
    fn choose_exchange_keep(&mut self, ctx: &Context, drawn: &[Character]) -> Vec<usize>;
}
