//! Round progression: derive the current stage from the matches, check the round is done,
//! and produce the next round or the champion.

use crate::logic::fixtures::knockout_round;
use crate::logic::standings::compute_standing;
use crate::models::{
    GameMatch, Group, KnockoutStage, MatchState, Participant, PlayerId, RoundLabel, Standing,
    Tournament, TournamentError, TournamentFormat,
};
use rand::Rng;
use serde::Serialize;

/// Where a cup-bearing tournament currently is. Always derived from the match set,
/// never stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum CurrentStage {
    /// HYBRID before any knockout match exists.
    GroupStage,
    Knockout(KnockoutStage),
}

/// What advancing the current round produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advancement {
    NextRound {
        stage: KnockoutStage,
        matches: Vec<GameMatch>,
    },
    Champion(PlayerId),
}

/// Latest knockout stage present, or GroupStage for a HYBRID without knockout matches.
/// `None` for LEAGUE, and for a CUP that has no matches at all.
pub fn current_stage(format: TournamentFormat, matches: &[GameMatch]) -> Option<CurrentStage> {
    let latest = matches.iter().filter_map(|m| m.round.knockout_stage()).max();
    match (latest, format) {
        (_, TournamentFormat::League) => None,
        (Some(stage), _) => Some(CurrentStage::Knockout(stage)),
        (None, TournamentFormat::Hybrid) => Some(CurrentStage::GroupStage),
        (None, TournamentFormat::Cup) => None,
    }
}

/// True when the tournament has already moved past `round`: an earlier knockout stage,
/// or the group stage once any knockout match exists.
pub fn round_is_closed(
    format: TournamentFormat,
    round: &RoundLabel,
    matches: &[GameMatch],
) -> bool {
    match (round, current_stage(format, matches)) {
        (RoundLabel::Knockout(stage), Some(CurrentStage::Knockout(current))) => *stage < current,
        (RoundLabel::Group { .. }, Some(CurrentStage::Knockout(_))) => true,
        _ => false,
    }
}

/// Stage reached by `winners` players. Anything but 8, 4 or 2 is a bracket error.
pub fn next_stage(winners: usize) -> Result<KnockoutStage, TournamentError> {
    match winners {
        8 => Ok(KnockoutStage::QF),
        4 => Ok(KnockoutStage::SF),
        2 => Ok(KnockoutStage::Final),
        n => Err(TournamentError::BracketSize(n)),
    }
}

/// True once there is at least one match and every match is LOCKED.
pub fn all_locked<'a>(matches: impl IntoIterator<Item = &'a GameMatch>) -> bool {
    let mut any = false;
    for m in matches {
        if m.state != MatchState::Locked {
            return false;
        }
        any = true;
    }
    any
}

/// Winners of a finished knockout round, in match order.
pub fn round_winners(round: &[&GameMatch]) -> Result<Vec<PlayerId>, TournamentError> {
    round
        .iter()
        .map(|m| m.decided_winner().ok_or(TournamentError::UndecidedMatch(m.id)))
        .collect()
}

/// Best two of `group` by points then goal difference. Only players who have played
/// a counted match are ranked.
pub fn group_top_two(
    tournament: &Tournament,
    group: Group,
    participants: &[Participant],
    matches: &[GameMatch],
) -> Result<(PlayerId, PlayerId), TournamentError> {
    let mut ranked: Vec<Standing> = participants
        .iter()
        .filter(|p| p.group == Some(group))
        .map(|p| compute_standing(tournament.id, p.player_id, matches))
        .filter(|s| s.played > 0)
        .collect();
    ranked.sort_by(Standing::group_order);

    match ranked.as_slice() {
        [first, second, ..] => Ok((first.player_id, second.player_id)),
        _ => Err(TournamentError::InsufficientPlayers { group }),
    }
}

/// Advance `tournament` by one step from the stage its matches are in.
///
/// - GroupStage → SF: all group matches LOCKED; A1 vs B2 and B1 vs A2.
/// - R16/QF/SF → next: all matches of the round LOCKED and decided; winners are shuffled
///   and paired.
/// - FINAL → champion.
///
/// Pure: the caller persists the result. On error nothing is produced.
pub fn plan_advance<R: Rng + ?Sized>(
    tournament: &Tournament,
    participants: &[Participant],
    matches: &[GameMatch],
    rng: &mut R,
) -> Result<Advancement, TournamentError> {
    let stage = current_stage(tournament.format, matches).ok_or(TournamentError::InvalidState)?;

    match stage {
        CurrentStage::GroupStage => {
            if !all_locked(matches.iter().filter(|m| m.round.is_group())) {
                return Err(TournamentError::IncompleteResults);
            }
            let (a1, a2) = group_top_two(tournament, Group::A, participants, matches)?;
            let (b1, b2) = group_top_two(tournament, Group::B, participants, matches)?;
            let semi = RoundLabel::Knockout(KnockoutStage::SF);
            Ok(Advancement::NextRound {
                stage: KnockoutStage::SF,
                matches: vec![
                    GameMatch::new(tournament.id, semi, a1, b2),
                    GameMatch::new(tournament.id, semi, b1, a2),
                ],
            })
        }
        CurrentStage::Knockout(stage) => {
            let round: Vec<&GameMatch> = matches
                .iter()
                .filter(|m| m.round == RoundLabel::Knockout(stage))
                .collect();
            if !all_locked(round.iter().copied()) {
                return Err(TournamentError::IncompleteResults);
            }
            let winners = round_winners(&round)?;

            if stage == KnockoutStage::Final {
                return match winners.as_slice() {
                    [champion] => Ok(Advancement::Champion(*champion)),
                    other => Err(TournamentError::BracketSize(other.len())),
                };
            }

            let next = next_stage(winners.len())?;
            Ok(Advancement::NextRound {
                stage: next,
                matches: knockout_round(tournament, winners, next, rng),
            })
        }
    }
}
