//! Small value types shared across the world: places, directions, ability
//! scores, and equipment sizes.

use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A cell in the world grid.
///
/// Floors stack vertically: `up` decreases `floor`, `down` increases it.
/// Rows grow southward and columns grow eastward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize,
)]
#[serde(from = "[usize; 3]")]
pub struct Location {
    pub floor: usize,
    pub row: usize,
    pub col: usize,
}

impl From<[usize; 3]> for Location {
    fn from([floor, row, col]: [usize; 3]) -> Self {
        Self::new(floor, row, col)
    }
}

impl Location {
    pub const fn new(floor: usize, row: usize, col: usize) -> Self {
        Self { floor, row, col }
    }

    /// The neighbouring cell in `dir`, or `None` when that would leave
    /// the grid through a zero edge.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let Self { floor, row, col } = self;
        Some(match dir {
            Direction::North => Self::new(floor, row.checked_sub(1)?, col),
            Direction::South => Self::new(floor, row + 1, col),
            Direction::West => Self::new(floor, row, col.checked_sub(1)?),
            Direction::East => Self::new(floor, row, col + 1),
            Direction::Up => Self::new(floor.checked_sub(1)?, row, col),
            Direction::Down => Self::new(floor + 1, row, col),
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.floor, self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
    Up,
    Down,
}

impl Direction {
    /// Exit listing order.
    pub const ALL: [Self; 6] = [
        Self::North,
        Self::South,
        Self::West,
        Self::East,
        Self::Down,
        Self::Up,
    ];

    /// Parses a full direction name or its one-letter abbreviation.
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "north" | "n" => Some(Self::North),
            "south" | "s" => Some(Self::South),
            "west" | "w" => Some(Self::West),
            "east" | "e" => Some(Self::East),
            "up" | "u" => Some(Self::Up),
            "down" | "d" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Abilities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Self; 6] = [
        Self::Strength,
        Self::Dexterity,
        Self::Constitution,
        Self::Intelligence,
        Self::Wisdom,
        Self::Charisma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Dexterity => "Dexterity",
            Self::Constitution => "Constitution",
            Self::Intelligence => "Intelligence",
            Self::Wisdom => "Wisdom",
            Self::Charisma => "Charisma",
        }
    }
}

/// The six ability scores. Missing fields in content default to zero,
/// which suits species bonuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Abilities {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Abilities {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }

    /// Field-wise sum, used to apply species bonuses to class scores.
    pub fn plus(&self, other: &Self) -> Self {
        let mut sum = *self;
        for ability in Ability::ALL {
            *sum.get_mut(ability) += other.get(ability);
        }
        sum
    }
}

// ---------------------------------------------------------------------------
// Equipment categories
// ---------------------------------------------------------------------------

/// Weight class of a weapon or armor; classes are proficient per size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Light,
    Medium,
    Heavy,
}

impl Size {
    pub const ALL: [Self; 3] = [Self::Light, Self::Medium, Self::Heavy];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hands {
    One,
    Two,
}
