// simple deciders for simulations, benches and tests

use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use crate::action::{Action, ActionKind};
use crate::decision::{Claim, Context, Decider};
use crate::{Character, COPIES_PER_CHARACTER};
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

const CHALLENGE_CHANCE: f64 = 0.15;
const COUNTER_CHANCE: f64 = 0.25;

/// Plays uniformly at random among legal moves and bluffs freely.
pub struct RandomAi {
    rng: Pcg64,
}

impl RandomAi {
    pub fn new(seed: u64) -> Self {
        Self { rng: Pcg64::seed_from_u64(seed) }
    }
}

impl Decider for RandomAi {
    fn choose_action(&mut self, ctx: &Context, legal: &[ActionKind]) -> (ActionKind, Option<usize>) {
        let kind = legal.choose(&mut self.rng).copied().unwrap_or(ActionKind::Income);
        let target = if kind.requires_target() {
            ctx.opponents.choose(&mut self.rng).copied()
        } else {
            None
        };
        (kind, target)
    }

    fn decide_challenge(&mut self, _ctx: &Context, _claim: &Claim) -> bool {
        self.rng.gen_bool(CHALLENGE_CHANCE)
    }

    fn decide_counter(&mut self, _ctx: &Context, _actor: usize, action: Action) -> Option<Character> {
        if !self.rng.gen_bool(COUNTER_CHANCE) {
            return None;
        }
        action.kind.counter_roles().choose(&mut self.rng).copied()
    }

    fn choose_card_to_lose(&mut self, ctx: &Context) -> usize {
        self.rng.gen_range(0..ctx.hand.len().max(1))
    }

    fn choose_exchange_keep(&mut self, ctx: &Context, drawn: &[Character]) -> Vec<usize> {
        index::sample(&mut self.rng, ctx.hand.len() + drawn.len(), ctx.hand.len()).into_vec()
    }
}

/// Never bluffs. Only claims and blocks with cards it holds, and challenges
/// a claim when every copy of the role is already accounted for.
pub struct HonestAi;

// most useful first
const KEEP_PRIORITY: [Character; 5] = [Duke, Assassin, Captain, Contessa, Ambassador];

fn priority(character: Character) -> usize {
    KEEP_PRIORITY.iter().position(|&c| c == character).unwrap_or(KEEP_PRIORITY.len())
}

impl HonestAi {
    fn richest_opponent(ctx: &Context) -> Option<usize> {
        ctx.opponents
            .iter()
            .copied()
            .max_by_key(|&seat| ctx.view.players[seat].coin_count)
    }

    fn visible_copies(ctx: &Context, role: Character) -> usize {
        let in_hand = ctx.hand.iter().filter(|&&card| card == role).count();
        let face_up: usize = ctx.view.players
            .iter()
            .map(|player| player.revealed.iter().filter(|&&card| card == role).count())
            .sum();
        in_hand + face_up
    }
}

impl Decider for HonestAi {
    fn choose_action(&mut self, ctx: &Context, legal: &[ActionKind]) -> (ActionKind, Option<usize>) {
        let holds = |role| ctx.hand.contains(&role);
        let target = HonestAi::richest_opponent(ctx);

        let preferred = [
            (ActionKind::Coup, true),
            (ActionKind::Assassinate, holds(Assassin)),
            (ActionKind::Tax, holds(Duke)),
            (ActionKind::Steal, holds(Captain) && target.map_or(false, |seat| ctx.view.players[seat].coin_count >= 2)),
            (ActionKind::Exchange, holds(Ambassador)),
            (ActionKind::ForeignAid, true),
            (ActionKind::Income, true),
        ];

        let kind = preferred
            .iter()
            .find(|(kind, wanted)| *wanted && legal.contains(kind))
            .map(|(kind, _)| *kind)
            .unwrap_or(ActionKind::Income);

        (kind, target.filter(|_| kind.requires_target()))
    }

    fn decide_challenge(&mut self, ctx: &Context, claim: &Claim) -> bool {
        HonestAi::visible_copies(ctx, claim.role()) >= COPIES_PER_CHARACTER
    }

    fn decide_counter(&mut self, ctx: &Context, _actor: usize, action: Action) -> Option<Character> {
        if action.target.is_some() && action.target != Some(ctx.seat) {
            return None;
        }

        action.kind.counter_roles().iter().copied().find(|role| ctx.hand.contains(role))
    }

    fn choose_card_to_lose(&mut self, ctx: &Context) -> usize {
        ctx.hand
            .iter()
            .enumerate()
            .max_by_key(|&(_, &card)| priority(card))
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    fn choose_exchange_keep(&mut self, ctx: &Context, drawn: &[Character]) -> Vec<usize> {
        let mut pool: Vec<(usize, Character)> = ctx.hand.iter().chain(drawn).copied().enumerate().collect();
        pool.sort_by_key(|&(_, card)| priority(card));

        // distinct roles first, duplicates only to fill the hand
        let mut keep: Vec<usize> = Vec::with_capacity(ctx.hand.len());
        let mut kept_roles: Vec<Character> = Vec::new();
        for &(idx, card) in &pool {
            if keep.len() < ctx.hand.len() && !kept_roles.contains(&card) {
                keep.push(idx);
                kept_roles.push(card);
            }
        }
        for &(idx, _) in &pool {
            if keep.len() < ctx.hand.len() && !keep.contains(&idx) {
                keep.push(idx);
            }
        }
        keep
    }
}

#[cfg(test)]
mod tests {
    use crate::action::ActionKind;
    use crate::ai::{HonestAi, RandomAi};
    use crate::testing::assert_card_invariant;
    use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};
    use crate::{Config, Coup, Decider, GameOutcome};

    fn honest_game(num_players: usize) -> Coup {
        let seats = (0..num_players)
            .map(|idx| (format!("H{idx}"), Box::new(HonestAi) as Box<dyn Decider>))
            .collect();
        let config = Config { max_turns: Some(500), ..Config::default() };
        Coup::new(seats, config, 3).unwrap()
    }

    #[test]
    fn honest_claims_always_hold_up() {
        let mut coup = honest_game(4);

        while coup.outcome().is_none() {
            let report = coup.play_turn().unwrap();
            assert_card_invariant(&coup);

            if let Some(challenge) = report.challenge {
                assert!(challenge.claim_held);
            }
            if let Some(challenge) = report.counter_challenge {
                assert!(challenge.claim_held);
            }
        }
    }

    #[test]
    fn honest_exchange_prefers_distinct_roles() {
        let mut coup = honest_game(2);
        coup.rig(&[&[Ambassador, Ambassador], &[Contessa, Captain]]);
        coup.players[0].coins = 0;

        let report = coup.play_turn().unwrap();
        assert_eq!(report.action.kind, ActionKind::Exchange);

        let hand = coup.players()[0].hand();
        assert_eq!(hand.len(), 2);
        if hand[0] == hand[1] {
            // only possible when both drawn cards were Ambassadors too
            assert_eq!(hand[0], Ambassador);
        }
    }

    #[test]
    fn honest_assassin_goes_for_the_richest() {
        let mut coup = honest_game(3);
        coup.rig(&[&[Assassin, Duke], &[Duke, Captain], &[Duke, Captain]]);
        coup.players[0].coins = 3;
        coup.players[2].coins = 5;

        let report = coup.play_turn().unwrap();
        assert_eq!(report.action.kind, ActionKind::Assassinate);
        assert_eq!(report.action.target, Some(2));
    }

    #[test]
    fn random_games_finish() {
        for seed in 0..20 {
            let seats = (0..4)
                .map(|idx| (format!("R{idx}"), Box::new(RandomAi::new(seed + idx)) as Box<dyn Decider>))
                .collect();
            let config = Config { max_turns: Some(2000), ..Config::default() };
            let mut coup = Coup::new(seats, config, seed).unwrap();

            let outcome = coup.play().unwrap();
            assert!(matches!(outcome, GameOutcome::Winner(_) | GameOutcome::TurnLimit));
            assert_card_invariant(&coup);
        }
    }
}
