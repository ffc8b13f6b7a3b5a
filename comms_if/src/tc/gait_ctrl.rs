//! # Gait control commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A direction of travel that gait control can be asked to walk in.
///
/// The set is closed: every trajectory table key and every fallback candidate is one of these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DirectionSymbol {
    Forward,
    Backward,

    /// Turn on the spot to the left.
    Left,

    /// Turn on the spot to the right.
    Right,

    ForwardLeft(TurnTier),
    ForwardRight(TurnTier),
    BackwardLeft(TurnTier),
    BackwardRight(TurnTier),
}

/// Graduated intensity of a travelling turn.
///
/// The tier names the stride of the inside legs relative to the outside legs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TurnTier {
    /// No stride reduction. Only produced by the fallback chain (plain fl/fr/bl/br).
    Full,

    /// Inside legs at 75% stride.
    ThreeQuarter,

    /// Inside legs at 50% stride.
    Half,
}

/// Longitudinal component of a direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Heading {
    Forward,
    Backward,
}

/// Lateral component of a direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Non-locomotion requests an operator can make.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Play the greeting routine.
    Greet,

    /// Query the battery level.
    Battery,

    /// Switch to the next gait in the table.
    SwitchGait,

    /// Run the on-board jump routine.
    Jump,

    /// Return the legs to the rest pose.
    Reset,

    /// Exit the control loop.
    Exit,

    /// Record the next movement.
    Record,

    /// Play the range-of-motion routine.
    ShowRange,
}

/// Discrete input keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    H,
    B,
    G,
    J,
    R,
    Z,
    C,
    Escape,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DirectionSymbol {
    /// Combine a heading, a turn side and a tier into a travelling turn.
    pub fn turn(heading: Heading, side: Side, tier: TurnTier) -> Self {
        match (heading, side) {
            (Heading::Forward, Side::Left) => DirectionSymbol::ForwardLeft(tier),
            (Heading::Forward, Side::Right) => DirectionSymbol::ForwardRight(tier),
            (Heading::Backward, Side::Left) => DirectionSymbol::BackwardLeft(tier),
            (Heading::Backward, Side::Right) => DirectionSymbol::BackwardRight(tier),
        }
    }

    /// Straight travel with the given heading.
    pub fn straight(heading: Heading) -> Self {
        match heading {
            Heading::Forward => DirectionSymbol::Forward,
            Heading::Backward => DirectionSymbol::Backward,
        }
    }

    /// Turn on the spot towards the given side.
    pub fn spin(side: Side) -> Self {
        match side {
            Side::Left => DirectionSymbol::Left,
            Side::Right => DirectionSymbol::Right,
        }
    }

    /// The ordered list of directions to try when this one is not available.
    ///
    /// Tiered turns degrade towards plainer turns and finally to straight travel. Straight travel
    /// and turns on the spot have no fallback.
    pub fn fallbacks(&self) -> &'static [DirectionSymbol] {
        use DirectionSymbol::*;
        use TurnTier::*;

        match self {
            ForwardLeft(Half) => &[ForwardLeft(ThreeQuarter), ForwardLeft(Full), Forward],
            ForwardLeft(ThreeQuarter) => &[ForwardLeft(Full), Forward],
            ForwardLeft(Full) => &[Forward],

            ForwardRight(Half) => &[ForwardRight(ThreeQuarter), ForwardRight(Full), Forward],
            ForwardRight(ThreeQuarter) => &[ForwardRight(Full), Forward],
            ForwardRight(Full) => &[Forward],

            BackwardLeft(Half) => &[BackwardLeft(ThreeQuarter), BackwardLeft(Full), Backward],
            BackwardLeft(ThreeQuarter) => &[BackwardLeft(Full), Backward],
            BackwardLeft(Full) => &[Backward],

            BackwardRight(Half) => &[BackwardRight(ThreeQuarter), BackwardRight(Full), Backward],
            BackwardRight(ThreeQuarter) => &[BackwardRight(Full), Backward],
            BackwardRight(Full) => &[Backward],

            Forward | Backward | Left | Right => &[],
        }
    }
}

impl TurnTier {
    /// Stride scale applied to the inside legs.
    pub fn stride_scale(&self) -> f64 {
        match self {
            TurnTier::Full => 1.0,
            TurnTier::ThreeQuarter => 0.75,
            TurnTier::Half => 0.5,
        }
    }
}

impl fmt::Display for DirectionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (base, tier) = match self {
            DirectionSymbol::Forward => return write!(f, "f"),
            DirectionSymbol::Backward => return write!(f, "b"),
            DirectionSymbol::Left => return write!(f, "l"),
            DirectionSymbol::Right => return write!(f, "r"),
            DirectionSymbol::ForwardLeft(t) => ("fl", t),
            DirectionSymbol::ForwardRight(t) => ("fr", t),
            DirectionSymbol::BackwardLeft(t) => ("bl", t),
            DirectionSymbol::BackwardRight(t) => ("br", t),
        };

        match tier {
            TurnTier::Full => write!(f, "{}", base),
            TurnTier::ThreeQuarter => write!(f, "{}_0.75", base),
            TurnTier::Half => write!(f, "{}_0.5", base),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
