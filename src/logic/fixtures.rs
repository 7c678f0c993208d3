//! Fixture generation: round-robin leagues, random cup brackets, and hybrid groups.

use crate::models::{
    GameMatch, Group, KnockoutStage, PlayerId, RoundLabel, Tournament, TournamentError,
    TournamentFormat,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Matches to create when a tournament starts, plus group assignments (HYBRID only).
#[derive(Clone, Debug, Default)]
pub struct FixturePlan {
    pub matches: Vec<GameMatch>,
    pub groups: Vec<(PlayerId, Group)>,
}

/// Build the full opening schedule for `tournament` from `roster`.
///
/// - LEAGUE: one round-robin over the whole roster.
/// - CUP: roster must be a power of two (2..=16); shuffled and paired into a single round.
/// - HYBRID: at least 4 players, shuffled into two balanced groups with a round-robin each.
///
/// Nothing is persisted here; a failure leaves no partial schedule behind.
pub fn generate_fixtures<R: Rng + ?Sized>(
    tournament: &Tournament,
    roster: &[PlayerId],
    rng: &mut R,
) -> Result<FixturePlan, TournamentError> {
    if roster.len() < 2 {
        return Err(TournamentError::InvalidRoster(format!(
            "need at least 2 players, have {}",
            roster.len()
        )));
    }
    let unique: HashSet<_> = roster.iter().collect();
    if unique.len() != roster.len() {
        return Err(TournamentError::InvalidRoster(
            "roster contains a player twice".to_string(),
        ));
    }

    match tournament.format {
        TournamentFormat::League => Ok(FixturePlan {
            matches: league_fixtures(tournament, roster),
            groups: Vec::new(),
        }),
        TournamentFormat::Cup => cup_fixtures(tournament, roster, rng),
        TournamentFormat::Hybrid => hybrid_fixtures(tournament, roster, rng),
    }
}

/// Circle-method round-robin. Returns `(round index, home, away)` with 0-based rounds.
///
/// An odd roster gets a bye slot; pairings against the bye are dropped, so every player
/// sits out exactly one round. Slot 0 stays fixed; after each round the last slot moves
/// to position 1.
pub fn round_robin_pairings(roster: &[PlayerId]) -> Vec<(u32, PlayerId, PlayerId)> {
    let mut slots: Vec<Option<PlayerId>> = roster.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }

    let mut pairings = Vec::with_capacity(n * (n - 1) / 2);
    for round in 0..n - 1 {
        for i in 0..n / 2 {
            if let (Some(home), Some(away)) = (slots[i], slots[n - 1 - i]) {
                pairings.push((round as u32, home, away));
            }
        }
        if let Some(last) = slots.pop() {
            slots.insert(1, last);
        }
    }
    pairings
}

fn league_fixtures(tournament: &Tournament, roster: &[PlayerId]) -> Vec<GameMatch> {
    round_robin_pairings(roster)
        .into_iter()
        .map(|(round, home, away)| {
            GameMatch::new(
                tournament.id,
                RoundLabel::League { round: round + 1 },
                home,
                away,
            )
        })
        .collect()
}

fn cup_fixtures<R: Rng + ?Sized>(
    tournament: &Tournament,
    roster: &[PlayerId],
    rng: &mut R,
) -> Result<FixturePlan, TournamentError> {
    if !roster.len().is_power_of_two() {
        return Err(TournamentError::InvalidRoster(format!(
            "cup needs a power-of-two roster, have {}",
            roster.len()
        )));
    }
    let stage = KnockoutStage::for_bracket_size(roster.len()).ok_or_else(|| {
        TournamentError::InvalidRoster(format!(
            "cup brackets go up to 16 players, have {}",
            roster.len()
        ))
    })?;

    Ok(FixturePlan {
        matches: knockout_round(tournament, roster.to_vec(), stage, rng),
        groups: Vec::new(),
    })
}

fn hybrid_fixtures<R: Rng + ?Sized>(
    tournament: &Tournament,
    roster: &[PlayerId],
    rng: &mut R,
) -> Result<FixturePlan, TournamentError> {
    if roster.len() < 4 {
        return Err(TournamentError::InvalidRoster(format!(
            "hybrid needs at least 4 players, have {}",
            roster.len()
        )));
    }

    let mut shuffled = roster.to_vec();
    shuffled.shuffle(rng);
    let (group_a, group_b) = shuffled.split_at(shuffled.len().div_ceil(2));

    let mut plan = FixturePlan::default();
    for (group, members) in [(Group::A, group_a), (Group::B, group_b)] {
        plan.groups.extend(members.iter().map(|&p| (p, group)));
        plan.matches.extend(round_robin_pairings(members).into_iter().map(
            |(round, home, away)| {
                GameMatch::new(
                    tournament.id,
                    RoundLabel::Group {
                        group,
                        round: round + 1,
                    },
                    home,
                    away,
                )
            },
        ));
    }
    Ok(plan)
}

/// Shuffle `players` and pair them consecutively into `stage` matches.
pub(crate) fn knockout_round<R: Rng + ?Sized>(
    tournament: &Tournament,
    mut players: Vec<PlayerId>,
    stage: KnockoutStage,
    rng: &mut R,
) -> Vec<GameMatch> {
    players.shuffle(rng);
    players
        .chunks_exact(2)
        .map(|pair| GameMatch::new(tournament.id, RoundLabel::Knockout(stage), pair[0], pair[1]))
        .collect()
}
