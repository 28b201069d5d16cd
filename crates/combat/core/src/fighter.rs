//! Fighter identity and the per-fight stat snapshot.
//!
//! A [`FighterProfile`] is supplied by the roster service and is immutable
//! for the duration of one fight; the engine only ever reads it.

use core::fmt;

/// Unique roster identifier for a fighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FighterId(pub u32);

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fighter-{}", self.0)
    }
}

/// One of the two corners of a fight.
///
/// Positive momentum favors [`Side::One`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Array index for per-side storage.
    pub const fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub const fn both() -> [Side; 2] {
        [Side::One, Side::Two]
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::One => write!(f, "side 1"),
            Side::Two => write!(f, "side 2"),
        }
    }
}

/// World affiliation of a fighter.
///
/// The tag drives AI style selection and the flavor of the status effect a
/// special attack inflicts. Two fighters sharing a tag get an environment
/// modifier attached at fight construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
pub enum WorldTag {
    /// Blood-sport pits. Specials open bleeding wounds; cornered fighters
    /// turn desperate early.
    DarkArena,
    /// Synthetic combatants. Specials scramble servos; plays opportunistic
    /// while capacitors are charged.
    SciFiAi,
    /// Dueling courts. Specials lay a weakening hex.
    MythicCourt,
    /// Scrapyard brawlers. Specials land concussive, stunning blows.
    Outlands,
}

/// Immutable-per-fight snapshot of a combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FighterProfile {
    pub id: FighterId,
    pub name: String,
    pub world: WorldTag,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub max_health: u32,
    pub special_move: String,
}

impl FighterProfile {
    pub fn new(
        id: FighterId,
        name: impl Into<String>,
        world: WorldTag,
        attack: u32,
        defense: u32,
        speed: u32,
        max_health: u32,
        special_move: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            world,
            attack,
            defense,
            speed,
            max_health,
            special_move: special_move.into(),
        }
    }
}
