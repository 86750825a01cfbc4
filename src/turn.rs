use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use log::{debug, info, warn};
use petgraph::graphmap::DiGraphMap;
use rand::seq::SliceRandom;
use rand::Rng;
use crate::action::{available_actions, Action, ActionKind};
use crate::coup::Coup;
use crate::decision::{Claim, Context, Decider, Snapshot};
use crate::error::CoupError;
use crate::player::other_player_indexes;
use crate::view::GameView;
use crate::{Character, EXCHANGE_DRAW};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    AwaitingAction,
    AwaitingChallenge,
    AwaitingCounter,
    AwaitingCounterChallenge,
    Resolving,
    AwaitingInfluenceLoss,
    Done,
}

/// Every move a turn is allowed to make between phases. A turn that tries
/// anything else has a bookkeeping bug and is aborted.
#[derive(Clone, Debug)]
pub struct Transitions {
    graph: DiGraphMap<Phase, ()>,
}

impl Default for Transitions {
    fn default() -> Self {
        use Phase::*;

        let graph = DiGraphMap::from_edges([
            (AwaitingAction, AwaitingChallenge),
            (AwaitingAction, AwaitingCounter),
            (AwaitingAction, Resolving),
            (AwaitingChallenge, AwaitingCounter),
            (AwaitingChallenge, Resolving),
            (AwaitingChallenge, AwaitingInfluenceLoss),
            (AwaitingCounter, AwaitingCounterChallenge),
            (AwaitingCounter, Resolving),
            (AwaitingCounterChallenge, AwaitingInfluenceLoss),
            (AwaitingCounterChallenge, Done),
            (Resolving, AwaitingInfluenceLoss),
            (Resolving, Done),
            (AwaitingInfluenceLoss, AwaitingInfluenceLoss),
            (AwaitingInfluenceLoss, AwaitingCounter),
            (AwaitingInfluenceLoss, Resolving),
            (AwaitingInfluenceLoss, Done),
        ]);

        Self { graph }
    }
}

impl Transitions {
    pub fn allows(&self, from: Phase, to: Phase) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub fn graph(&self) -> &DiGraphMap<Phase, ()> {
        &self.graph
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChallengeResult {
    pub challenger: usize,
    pub claimant: usize,
    pub role: Character,
    // the claimant had the card, so the challenger was wrong
    pub claim_held: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Resolved,
    // caught bluffing, the action never happened
    Voided,
    Blocked { by: usize, role: Character },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub actor: usize,
    pub action: Action,
    pub challenge: Option<ChallengeResult>,
    pub counter: Option<(usize, Character)>,
    pub counter_challenge: Option<ChallengeResult>,
    pub outcome: TurnOutcome,
    pub losses: Vec<(usize, Character)>,
    pub eliminated: Vec<usize>,
    pub event: String,
}

impl Display for TurnReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.event)
    }
}

/// One player's turn, from declaring an action to writing it into the
/// round history.
pub(crate) struct Turn<'g> {
    game: &'g mut Coup,
    actor: usize,

    action: Action,
    paid: u8,
    challenge: Option<ChallengeResult>,
    counter: Option<(usize, Character)>,
    counter_challenge: Option<ChallengeResult>,
    outcome: TurnOutcome,

    pending_losses: VecDeque<usize>,
    // where to go once the pending losses are settled
    resume: Phase,
    losses: Vec<(usize, Character)>,
    eliminated: Vec<usize>,
    notes: Vec<String>,
}

impl<'g> Turn<'g> {
    pub(crate) fn new(game: &'g mut Coup, actor: usize) -> Self {
        Self {
            game,
            actor,
            action: Action::untargeted(ActionKind::Income),
            paid: 0,
            challenge: None,
            counter: None,
            counter_challenge: None,
            outcome: TurnOutcome::Resolved,
            pending_losses: VecDeque::new(),
            resume: Phase::Done,
            losses: Vec::new(),
            eliminated: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> Result<TurnReport, CoupError> {
        let mut phase = Phase::AwaitingAction;

        loop {
            let next = match phase {
                Phase::AwaitingAction => self.await_action()?,
                Phase::AwaitingChallenge => self.await_challenge()?,
                Phase::AwaitingCounter => self.await_counter(),
                Phase::AwaitingCounterChallenge => self.await_counter_challenge()?,
                Phase::Resolving => self.resolve()?,
                Phase::AwaitingInfluenceLoss => self.await_influence_loss()?,
                Phase::Done => break,
            };

            if !self.game.transitions.allows(phase, next) {
                return Err(CoupError::IllegalTransition { from: phase, to: next });
            }

            debug!("{:?} -> {:?}", phase, next);
            phase = next;
        }

        Ok(self.finish())
    }

    fn name(&self, seat: usize) -> &str {
        self.game.players[seat].name()
    }

    fn await_action(&mut self) -> Result<Phase, CoupError> {
        let actor = self.actor;
        let legal = available_actions(&self.game.players[actor])?;

        let options = legal.clone();
        let chosen = self.decide(
            actor,
            move |decider, ctx| decider.choose_action(ctx, &options),
            |turn: &Self, (kind, target): (ActionKind, Option<usize>)| turn.validate_action(&legal, kind, target),
        );

        let action = match chosen {
            Some(action) => action,
            None => {
                let action = self.fallback_action(&legal);
                warn!("{} did not choose a legal action, falling back to {:?}", self.name(actor), action);
                action
            }
        };

        self.action = action;
        // paid on declaration, whatever happens afterwards
        self.paid = self.game.players[actor].pay(action.kind.cost());
        self.notes.push(self.describe_declaration());

        Ok(if action.kind.can_be_challenged() {
            Phase::AwaitingChallenge
        } else {
            self.after_action_stands()
        })
    }

    fn validate_action(&self, legal: &[ActionKind], kind: ActionKind, target: Option<usize>) -> Result<Action, CoupError> {
        if !legal.contains(&kind) {
            return Err(CoupError::IllegalActionChoice(kind));
        }

        if !kind.requires_target() {
            return Ok(Action::untargeted(kind));
        }

        match target {
            Some(target) if self.is_valid_target(target) => Ok(Action::new(kind, Some(target))),
            _ => Err(CoupError::IllegalTargetChoice(target)),
        }
    }

    fn is_valid_target(&self, target: usize) -> bool {
        target != self.actor
            && self.game.players.get(target).map_or(false, |player| player.is_active())
    }

    fn fallback_action(&mut self, legal: &[ActionKind]) -> Action {
        let kind = legal.choose(&mut self.game.rng).copied().unwrap_or(ActionKind::Income);
        if !kind.requires_target() {
            return Action::untargeted(kind);
        }

        let opponents = other_player_indexes(&self.game.players, self.actor);
        match opponents.choose(&mut self.game.rng) {
            Some(&target) => Action::new(kind, Some(target)),
            None => Action::untargeted(ActionKind::Income),
        }
    }

    // the action survived its challenge window (or never had one)
    fn after_action_stands(&self) -> Phase {
        if self.action.kind.can_be_countered() {
            Phase::AwaitingCounter
        } else {
            Phase::Resolving
        }
    }

    fn await_challenge(&mut self) -> Result<Phase, CoupError> {
        let Some(role) = self.action.kind.claimed_role() else {
            return Ok(self.after_action_stands());
        };

        let actor = self.actor;
        let claim = Claim::Action { actor, action: self.action, role };
        let candidates = other_player_indexes(&self.game.players, actor);

        let Some(challenger) = self.poll_challengers(claim, candidates) else {
            return Ok(self.after_action_stands());
        };

        let claim_held = self.settle_challenge(actor, role)?;
        self.challenge = Some(ChallengeResult { challenger, claimant: actor, role, claim_held });

        if claim_held {
            self.notes.push(format!("{} challenged and {} revealed a {role}", self.name(challenger), self.name(actor)));
            self.pending_losses.push_back(challenger);
            self.resume = self.after_action_stands();
        } else {
            self.notes.push(format!("{} challenged and {} had no {role}", self.name(challenger), self.name(actor)));
            // a caught bluff voids the action entirely, including what it cost
            let refund = self.paid;
            self.game.players[actor].gain(refund);
            self.paid = 0;
            self.outcome = TurnOutcome::Voided;
            self.pending_losses.push_back(actor);
            self.resume = Phase::Done;
        }

        Ok(Phase::AwaitingInfluenceLoss)
    }

    fn counter_candidates(&self) -> Vec<usize> {
        let opponents = other_player_indexes(&self.game.players, self.actor);

        if self.game.config.target_only_counters && self.action.kind != ActionKind::ForeignAid {
            opponents.into_iter().filter(|&seat| Some(seat) == self.action.target).collect()
        } else {
            opponents
        }
    }

    fn await_counter(&mut self) -> Phase {
        let actor = self.actor;
        let action = self.action;

        for seat in self.counter_candidates() {
            let answer = self.decide(
                seat,
                move |decider, ctx| decider.decide_counter(ctx, actor, action),
                |_, role: Option<Character>| match role {
                    Some(role) if !action.kind.counter_roles().contains(&role) => Err(CoupError::IllegalCounterRole(role)),
                    role => Ok(role),
                },
            );

            if let Some(role) = answer.flatten() {
                self.notes.push(format!("{} countered claiming {role}", self.name(seat)));
                self.counter = Some((seat, role));
                return Phase::AwaitingCounterChallenge;
            }
        }

        Phase::Resolving
    }

    fn await_counter_challenge(&mut self) -> Result<Phase, CoupError> {
        // only entered right after a counter was declared
        let Some((counterer, role)) = self.counter else {
            return Err(CoupError::IllegalTransition { from: Phase::AwaitingCounter, to: Phase::AwaitingCounterChallenge });
        };

        let actor = self.actor;
        let claim = Claim::Counter { counterer, role, actor, action: self.action };

        // everyone else after the actor, the actor gets the last word
        let mut candidates: Vec<usize> = other_player_indexes(&self.game.players, actor)
            .into_iter()
            .filter(|&seat| seat != counterer)
            .collect();
        candidates.push(actor);

        let Some(challenger) = self.poll_challengers(claim, candidates) else {
            self.outcome = TurnOutcome::Blocked { by: counterer, role };
            return Ok(Phase::Done);
        };

        let claim_held = self.settle_challenge(counterer, role)?;
        self.counter_challenge = Some(ChallengeResult { challenger, claimant: counterer, role, claim_held });

        if claim_held {
            self.notes.push(format!("{} challenged the counter and {} revealed a {role}", self.name(challenger), self.name(counterer)));
            self.outcome = TurnOutcome::Blocked { by: counterer, role };
            self.pending_losses.push_back(challenger);
            self.resume = Phase::Done;
        } else {
            self.notes.push(format!("{} challenged the counter and {} had no {role}", self.name(challenger), self.name(counterer)));
            self.pending_losses.push_back(counterer);
            self.resume = Phase::Resolving;
        }

        Ok(Phase::AwaitingInfluenceLoss)
    }

    // first yes wins, later players are not asked
    fn poll_challengers(&mut self, claim: Claim, candidates: Vec<usize>) -> Option<usize> {
        candidates.into_iter().find(|&seat| {
            self.decide(seat, move |decider, ctx| decider.decide_challenge(ctx, &claim), |_, answer: bool| Ok(answer))
                .unwrap_or(false)
        })
    }

    /// Checks the claimant's hand. A proven card goes back into the deck and
    /// is replaced, so the proof doesn't give the card away for good.
    fn settle_challenge(&mut self, claimant: usize, role: Character) -> Result<bool, CoupError> {
        let Some(card_idx) = self.game.players[claimant].holds(role) else {
            return Ok(false);
        };

        let Coup { players, deck, rng, .. } = &mut *self.game;
        deck.return_cards([role], rng);
        let replacement = deck.draw(1)?
            .pop()
            .ok_or(CoupError::DeckUnderflow { requested: 1, remaining: 0 })?;
        players[claimant].hand[card_idx] = replacement;

        Ok(true)
    }

    fn resolve(&mut self) -> Result<Phase, CoupError> {
        let actor = self.actor;
        self.outcome = TurnOutcome::Resolved;

        match self.action.kind {
            ActionKind::Income => self.game.players[actor].gain(1),
            ActionKind::ForeignAid => self.game.players[actor].gain(2),
            ActionKind::Tax => self.game.players[actor].gain(3),
            ActionKind::Coup | ActionKind::Assassinate => {
                // the target may already be out after losing a challenge
                let target = self.action.target.filter(|&target| self.game.players[target].is_active());
                if let Some(target) = target {
                    self.pending_losses.push_back(target);
                    self.resume = Phase::Done;
                    return Ok(Phase::AwaitingInfluenceLoss);
                }
            }
            ActionKind::Steal => {
                if let Some(target) = self.action.target {
                    let taken = self.game.players[target].pay(2);
                    self.game.players[actor].gain(taken);
                    self.notes.push(format!("{} took {taken} from {}", self.name(actor), self.name(target)));
                }
            }
            ActionKind::Exchange => self.exchange()?,
        }

        Ok(Phase::Done)
    }

    fn exchange(&mut self) -> Result<(), CoupError> {
        let actor = self.actor;
        let drawn = self.game.deck.draw(EXCHANGE_DRAW)?;
        let keep_count = self.game.players[actor].influence();
        let pool: Vec<Character> = self.game.players[actor].hand
            .iter()
            .chain(drawn.iter())
            .copied()
            .collect();

        let offered = drawn.clone();
        let selection = self.decide(
            actor,
            move |decider, ctx| decider.choose_exchange_keep(ctx, &offered),
            |_, indices: Vec<usize>| validate_selection(indices, keep_count, pool.len()),
        );

        let keep = selection.unwrap_or_else(|| {
            warn!("{} keeps their hand after an invalid exchange", self.name(actor));
            (0..keep_count).collect()
        });

        let kept: Vec<Character> = keep.iter().map(|&idx| pool[idx]).collect();
        let returned: Vec<Character> = pool
            .iter()
            .enumerate()
            .filter(|(idx, _)| !keep.contains(idx))
            .map(|(_, &card)| card)
            .collect();

        let Coup { players, deck, rng, .. } = &mut *self.game;
        players[actor].hand = kept;
        deck.return_cards(returned, rng);

        self.notes.push(format!("{} exchanged cards with the court deck", self.name(actor)));
        Ok(())
    }

    fn await_influence_loss(&mut self) -> Result<Phase, CoupError> {
        if let Some(loser) = self.pending_losses.pop_front() {
            self.lose_influence(loser)?;
        }

        Ok(if self.pending_losses.is_empty() {
            self.resume
        } else {
            Phase::AwaitingInfluenceLoss
        })
    }

    /// Turns exactly one of the loser's cards face up.
    fn lose_influence(&mut self, loser: usize) -> Result<(), CoupError> {
        if !self.game.players[loser].is_active() {
            debug!("{} is already out, nothing to lose", self.name(loser));
            return Ok(());
        }

        let influence = self.game.players[loser].influence();
        let chosen = self.decide(
            loser,
            |decider, ctx| decider.choose_card_to_lose(ctx),
            |_, card_idx: usize| {
                if card_idx < influence {
                    Ok(card_idx)
                } else {
                    Err(CoupError::IllegalCardIndex(card_idx))
                }
            },
        );

        let card_idx = match chosen {
            Some(card_idx) => card_idx,
            None => {
                let card_idx = self.game.rng.gen_range(0..influence);
                warn!("{} did not pick a card to lose, discarding card {card_idx}", self.name(loser));
                card_idx
            }
        };

        let card = self.game.players[loser].lose_influence(card_idx)?;
        self.losses.push((loser, card));
        self.notes.push(format!("{} lost a {card}", self.name(loser)));

        if !self.game.players[loser].is_active() {
            self.eliminated.push(loser);
            self.notes.push(format!("{} is out of the game", self.name(loser)));
            info!("{} has been eliminated", self.name(loser));
        }

        Ok(())
    }

    /// Asks `seat` until it gives an answer `validate` accepts, at most
    /// `decision_attempts` times. A late answer ends the asking right away.
    fn decide<T, V, Q>(&mut self, seat: usize, query: Q, validate: impl Fn(&Self, T) -> Result<V, CoupError>) -> Option<V>
    where
        T: Send + 'static,
        Q: Fn(&mut dyn Decider, &Context) -> T + Clone + Send + 'static,
    {
        let attempts = self.game.config.decision_attempts;

        for attempt in 1..=attempts {
            let answer = match self.ask(seat, query.clone()) {
                Ok(answer) => answer,
                Err(err) => {
                    warn!("{}: {err}", self.name(seat));
                    return None;
                }
            };

            match validate(&*self, answer) {
                Ok(valid) => return Some(valid),
                Err(err) => warn!("{} ({attempt}/{attempts}): {err}", self.name(seat)),
            }
        }

        None
    }

    fn ask<T, Q>(&mut self, seat: usize, query: Q) -> Result<T, CoupError>
    where
        T: Send + 'static,
        Q: FnOnce(&mut dyn Decider, &Context) -> T + Send + 'static,
    {
        let timeout = self.game.config.decision_timeout();
        debug!("asking {}", self.name(seat));

        let snapshot = Snapshot {
            seat,
            view: GameView::project(&self.game.players, self.game.deck.len(), self.actor, Some(seat)),
            history: self.game.history.clone(),
            hand: self.game.players[seat].hand().to_vec(),
            coins: self.game.players[seat].coins(),
            opponents: other_player_indexes(&self.game.players, seat),
            deadline: Instant::now() + timeout,
        };

        self.game.deciders.ask(seat, snapshot, timeout, query)
    }

    fn describe_declaration(&self) -> String {
        let actor = self.name(self.actor);
        let target = self.action.target.map(|target| self.name(target)).unwrap_or("nobody");

        match self.action.kind {
            ActionKind::Income => format!("{actor} takes Income"),
            ActionKind::ForeignAid => format!("{actor} takes Foreign Aid"),
            ActionKind::Coup => format!("{actor} launches a Coup against {target}"),
            ActionKind::Tax => format!("{actor} claims Duke to collect Tax"),
            ActionKind::Assassinate => format!("{actor} claims Assassin to assassinate {target}"),
            ActionKind::Steal => format!("{actor} claims Captain to steal from {target}"),
            ActionKind::Exchange => format!("{actor} claims Ambassador to exchange cards"),
        }
    }

    fn finish(mut self) -> TurnReport {
        match self.outcome {
            TurnOutcome::Voided => self.notes.push("the action was voided".to_string()),
            TurnOutcome::Blocked { .. } => self.notes.push("the action was blocked".to_string()),
            TurnOutcome::Resolved => {}
        }

        let event = self.notes.join("; ");
        info!("{event}");
        self.game.history.append(event.clone());

        TurnReport {
            actor: self.actor,
            action: self.action,
            challenge: self.challenge,
            counter: self.counter,
            counter_challenge: self.counter_challenge,
            outcome: self.outcome,
            losses: self.losses,
            eliminated: self.eliminated,
            event,
        }
    }
}

fn validate_selection(indices: Vec<usize>, keep_count: usize, pool_size: usize) -> Result<Vec<usize>, CoupError> {
    let mut distinct = indices.clone();
    distinct.sort_unstable();
    distinct.dedup();

    if indices.len() != keep_count || distinct.len() != keep_count || indices.iter().any(|&idx| idx >= pool_size) {
        return Err(CoupError::IllegalExchangeSelection(indices));
    }

    Ok(indices)
}
