//! Per-player scores and round results.

use crate::dice::DiceRoll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    First,
    Second,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::First, Player::Second];

    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    FirstWins,
    SecondWins,
    Draw,
}

impl RoundOutcome {
    /// Higher sum wins; equal sums draw.
    pub fn of(roll: &DiceRoll) -> Self {
        match roll.first.sum().cmp(&roll.second.sum()) {
            std::cmp::Ordering::Greater => RoundOutcome::FirstWins,
            std::cmp::Ordering::Less => RoundOutcome::SecondWins,
            std::cmp::Ordering::Equal => RoundOutcome::Draw,
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            RoundOutcome::FirstWins => Some(Player::First),
            RoundOutcome::SecondWins => Some(Player::Second),
            RoundOutcome::Draw => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    names: [String; 2],
    scores: [u32; 2],
    rounds: u32,
}

impl Scoreboard {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            names: [first.into(), second.into()],
            scores: [0, 0],
            rounds: 0,
        }
    }

    pub fn name(&self, player: Player) -> &str {
        &self.names[player.index()]
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Score a round; the winner gains one point.
    pub fn record(&mut self, roll: &DiceRoll) -> RoundOutcome {
        let outcome = RoundOutcome::of(roll);
        if let Some(winner) = outcome.winner() {
            self.scores[winner.index()] += 1;
        }
        self.rounds += 1;
        outcome
    }

    pub fn label_text(&self, player: Player) -> String {
        format!("({}) score: {}", self.name(player), self.score(player))
    }

    pub fn outcome_text(&self, outcome: RoundOutcome) -> String {
        match outcome.winner() {
            Some(player) => format!("{} wins!", self.name(player)),
            None => "Draw!".to_string(),
        }
    }
}
