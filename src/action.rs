use std::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};
use crate::error::CoupError;
use crate::player::Player;
use crate::{Character, FORCED_COUP_COINS};
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Income,
    ForeignAid,
    Coup,
    Tax,
    Assassinate,
    Steal,
    Exchange,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Income,
        ActionKind::ForeignAid,
        ActionKind::Coup,
        ActionKind::Tax,
        ActionKind::Assassinate,
        ActionKind::Steal,
        ActionKind::Exchange,
    ];

    pub fn cost(self) -> u8 {
        match self {
            ActionKind::Coup => 7,
            ActionKind::Assassinate => 3,
            _ => 0,
        }
    }

    pub fn requires_target(self) -> bool {
        matches!(self, ActionKind::Coup | ActionKind::Assassinate | ActionKind::Steal)
    }

    pub fn can_be_challenged(self) -> bool {
        self.claimed_role().is_some()
    }

    pub fn can_be_countered(self) -> bool {
        !self.counter_roles().is_empty()
    }

    /// The character you have to (claim to) hold to take this action.
    pub fn claimed_role(self) -> Option<Character> {
        match self {
            ActionKind::Income | ActionKind::ForeignAid | ActionKind::Coup => None,
            ActionKind::Tax => Some(Duke),
            ActionKind::Assassinate => Some(Assassin),
            ActionKind::Steal => Some(Captain),
            ActionKind::Exchange => Some(Ambassador),
        }
    }

    pub fn counter_roles(self) -> &'static [Character] {
        match self {
            ActionKind::ForeignAid => &[Duke],
            ActionKind::Assassinate => &[Contessa],
            ActionKind::Steal => &[Ambassador, Captain],
            _ => &[],
        }
    }
}

/// A declared action. `target` is a seat index and is only set for actions
/// that require one.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub target: Option<usize>,
}

impl Action {
    pub fn new(kind: ActionKind, target: Option<usize>) -> Self {
        Self { kind, target }
    }

    pub fn untargeted(kind: ActionKind) -> Self {
        Self { kind, target: None }
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.target) {
            (ActionKind::Income, _) => f.write_str("takes Income"),
            (ActionKind::ForeignAid, _) => f.write_str("takes Foreign Aid"),
            (ActionKind::Tax, _) => f.write_str("collects Tax"),
            (ActionKind::Exchange, _) => f.write_str("exchanges with the court deck"),
            (ActionKind::Coup, Some(target)) => f.write_fmt(format_args!("coups player {target}")),
            (ActionKind::Assassinate, Some(target)) => f.write_fmt(format_args!("assassinates player {target}")),
            (ActionKind::Steal, Some(target)) => f.write_fmt(format_args!("steals from player {target}")),
            (kind, None) => f.write_fmt(format_args!("{:?} without a target", kind)),
        }
    }
}

/// Every action the player can afford. At 10 coins or more a coup is mandatory.
pub fn available_actions(player: &Player) -> Result<Vec<ActionKind>, CoupError> {
    if !player.is_active() {
        return Err(CoupError::InvalidPlayerState(player.name().to_string()));
    }

    if player.coins() >= FORCED_COUP_COINS {
        return Ok(vec![ActionKind::Coup]);
    }

    Ok(ActionKind::ALL
        .iter()
        .copied()
        .filter(|kind| kind.cost() <= player.coins())
        .collect())
}
