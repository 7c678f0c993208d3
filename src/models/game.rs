//! Match, round labels, and the result fields a match carries.

use crate::models::player::PlayerId;
use crate::models::tournament::{Group, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Knockout stages, ordered from earliest to latest.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum KnockoutStage {
    R16,
    QF,
    SF,
    #[serde(rename = "FINAL")]
    Final,
}

impl KnockoutStage {
    /// Stage played by a bracket of `players` entrants (16 → R16, 8 → QF, 4 → SF, 2 → FINAL).
    pub fn for_bracket_size(players: usize) -> Option<Self> {
        match players {
            16 => Some(KnockoutStage::R16),
            8 => Some(KnockoutStage::QF),
            4 => Some(KnockoutStage::SF),
            2 => Some(KnockoutStage::Final),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KnockoutStage::R16 => "R16",
            KnockoutStage::QF => "QF",
            KnockoutStage::SF => "SF",
            KnockoutStage::Final => "FINAL",
        }
    }
}

/// Which part of the schedule a match belongs to.
///
/// Stored and serialized as a plain label: `"LEAGUE round 3"`, `"Group A - Round 2"`,
/// or a knockout tag (`"R16"`, `"QF"`, `"SF"`, `"FINAL"`). Round numbers are 1-based.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RoundLabel {
    League { round: u32 },
    Group { group: Group, round: u32 },
    Knockout(KnockoutStage),
}

impl RoundLabel {
    pub fn knockout_stage(&self) -> Option<KnockoutStage> {
        match self {
            RoundLabel::Knockout(stage) => Some(*stage),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, RoundLabel::Group { .. })
    }
}

impl fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundLabel::League { round } => write!(f, "LEAGUE round {}", round),
            RoundLabel::Group { group, round } => write!(f, "Group {} - Round {}", group, round),
            RoundLabel::Knockout(stage) => f.write_str(stage.as_str()),
        }
    }
}

impl FromStr for RoundLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("unrecognised round label: {s}");
        match s {
            "R16" => return Ok(RoundLabel::Knockout(KnockoutStage::R16)),
            "QF" => return Ok(RoundLabel::Knockout(KnockoutStage::QF)),
            "SF" => return Ok(RoundLabel::Knockout(KnockoutStage::SF)),
            "FINAL" => return Ok(RoundLabel::Knockout(KnockoutStage::Final)),
            _ => {}
        }
        if let Some(n) = s.strip_prefix("LEAGUE round ") {
            let round = n.parse().map_err(|_| bad())?;
            return Ok(RoundLabel::League { round });
        }
        let rest = s.strip_prefix("Group ").ok_or_else(bad)?;
        let (group, n) = rest.split_once(" - Round ").ok_or_else(bad)?;
        Ok(RoundLabel::Group {
            group: group.parse().map_err(|_| bad())?,
            round: n.parse().map_err(|_| bad())?,
        })
    }
}

impl From<RoundLabel> for String {
    fn from(label: RoundLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for RoundLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a match was decided. Only informational for standings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionMethod {
    #[default]
    Normal,
    ExtraTime,
    Penalties,
}

/// Result state of a match. PLAYED and LOCKED count towards standings; only LOCKED
/// counts towards round progression and completion.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    #[default]
    Scheduled,
    Played,
    Locked,
}

impl MatchState {
    pub fn counts_for_standings(self) -> bool {
        matches!(self, MatchState::Played | MatchState::Locked)
    }
}

/// A single 1v1 match inside a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: RoundLabel,
    pub player_1: PlayerId,
    pub player_2: PlayerId,
    pub score_1: u32,
    pub score_2: u32,
    pub decision: DecisionMethod,
    /// Explicit winner (e.g. after penalties). When absent, the higher score wins.
    pub winner: Option<PlayerId>,
    pub state: MatchState,
    /// Who created the match by hand; `None` for generated fixtures.
    pub created_by: Option<PlayerId>,
    /// Set the first time the match is recorded as PLAYED or LOCKED.
    pub played_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    /// New scheduled fixture with 0-0 score.
    pub fn new(
        tournament_id: TournamentId,
        round: RoundLabel,
        player_1: PlayerId,
        player_2: PlayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            player_1,
            player_2,
            score_1: 0,
            score_2: 0,
            decision: DecisionMethod::Normal,
            winner: None,
            state: MatchState::Scheduled,
            created_by: None,
            played_at: None,
        }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player_1 == player || self.player_2 == player
    }

    /// `(goals for, goals against)` from `player`'s side. `None` if they did not play in it.
    pub fn goals_for(&self, player: PlayerId) -> Option<(u32, u32)> {
        if self.player_1 == player {
            Some((self.score_1, self.score_2))
        } else if self.player_2 == player {
            Some((self.score_2, self.score_1))
        } else {
            None
        }
    }

    /// Winner for progression purposes: the explicit winner, else the higher score.
    /// `None` on a tie with no explicit winner.
    pub fn decided_winner(&self) -> Option<PlayerId> {
        if let Some(w) = self.winner {
            return Some(w);
        }
        match self.score_1.cmp(&self.score_2) {
            std::cmp::Ordering::Greater => Some(self.player_1),
            std::cmp::Ordering::Less => Some(self.player_2),
            std::cmp::Ordering::Equal => None,
        }
    }
}
