//! Dice rolling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DICE_PER_PLAYER: usize = 2;

/// Both dice thrown by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRoll {
    pub dice: [u8; DICE_PER_PLAYER],
}

impl PlayerRoll {
    pub fn sum(&self) -> u32 {
        self.dice.iter().map(|&d| u32::from(d)).sum()
    }
}

/// One round's throw for both players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub first: PlayerRoll,
    pub second: PlayerRoll,
}

impl DiceRoll {
    /// Faces in display order: first player's dice, then the second's.
    pub fn faces(&self) -> [u8; 2 * DICE_PER_PLAYER] {
        let [a, b] = self.first.dice;
        let [c, d] = self.second.dice;
        [a, b, c, d]
    }
}

/// Six-sided dice source.
#[derive(Debug)]
pub struct Dice {
    rng: StdRng,
}

impl Dice {
    /// Seeded dice repeat the same throws; unseeded dice draw from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    pub fn roll(&mut self) -> DiceRoll {
        DiceRoll {
            first: PlayerRoll {
                dice: [self.roll_die(), self.roll_die()],
            },
            second: PlayerRoll {
                dice: [self.roll_die(), self.roll_die()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_stay_in_range() {
        let mut dice = Dice::new(Some(1));
        for _ in 0..500 {
            let face = dice.roll_die();
            assert!((1..=6).contains(&face), "face {face} out of range");
        }
    }

    #[test]
    fn test_seeded_dice_repeat() {
        let mut a = Dice::new(Some(99));
        let mut b = Dice::new(Some(99));
        for _ in 0..20 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_sums_and_face_order() {
        let roll = DiceRoll {
            first: PlayerRoll { dice: [6, 5] },
            second: PlayerRoll { dice: [1, 2] },
        };
        assert_eq!(roll.first.sum(), 11);
        assert_eq!(roll.second.sum(), 3);
        assert_eq!(roll.faces(), [6, 5, 1, 2]);
    }
}
