//! Dice expressions such as `2d6+3`.

use std::fmt;

use rand::Rng;
use serde::Deserialize;

/// `count` dice with `sides` faces each, plus a flat `bonus`.
///
/// In content files dice are written as `[count, sides]` or
/// `[count, sides, bonus]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "DiceRepr")]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DiceRepr {
    WithBonus(u32, u32, i32),
    Plain(u32, u32),
}

impl From<DiceRepr> for Dice {
    fn from(repr: DiceRepr) -> Self {
        match repr {
            DiceRepr::WithBonus(count, sides, bonus) => {
                Self::new(count, sides).plus(bonus)
            }
            DiceRepr::Plain(count, sides) => Self::new(count, sides),
        }
    }
}

impl Dice {
    pub const fn new(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            bonus: 0,
        }
    }

    pub const fn plus(self, bonus: i32) -> Self {
        Self { bonus, ..self }
    }

    /// Rolls every die and adds the bonus. Zero-sided dice roll 0.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let mut total = self.bonus;
        if self.sides > 0 {
            for _ in 0..self.count {
                total += rng.random_range(1..=self.sides) as i32;
            }
        }
        total
    }

    /// The highest possible roll.
    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.bonus
    }
}

/// A single twenty-sided roll.
pub fn d20<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    Dice::new(1, 20).roll(rng)
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}
