//! Error types shared across the simulation core.
//!
//! Module-specific failures (catalog loading, combat validation, order
//! admission) live next to the code that produces them; this module holds
//! the errors that cross component boundaries.

use thiserror::Error;

use crate::planet::ResourceId;

/// A stored catalog formula could not be parsed or evaluated.
///
/// This is a fatal condition: formulas are static catalog data, never
/// player input, so any failure here means the catalog itself is corrupt.
/// It is surfaced to the operator, not mapped to a player-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// A character that is not part of the expression grammar.
    #[error("unexpected character '{character}' at offset {position}")]
    UnexpectedCharacter {
        /// Byte offset into the formula string.
        position: usize,
        /// The offending character.
        character: char,
    },

    /// A token in a position where the grammar does not allow it.
    #[error("unexpected token '{token}' at offset {position}")]
    UnexpectedToken {
        /// Byte offset into the formula string.
        position: usize,
        /// Display form of the offending token.
        token: String,
    },

    /// The expression ended while more input was required.
    #[error("formula ended unexpectedly")]
    UnexpectedEnd,

    /// Input remained after a complete expression was parsed.
    #[error("trailing input at offset {position}")]
    TrailingInput {
        /// Byte offset of the first unconsumed token.
        position: usize,
    },

    /// Division by zero during evaluation.
    #[error("division by zero")]
    DivisionByZero,

    /// Evaluation produced an infinite or NaN value.
    #[error("formula produced a non-finite value")]
    NonFinite,
}

/// A cost could not be covered by the planet's resource stock.
///
/// Expected validation outcome of an upgrade or build attempt; the outer
/// layer maps it to a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient resources: need {required} of resource {resource:?}, have {available}")]
pub struct InsufficientResources {
    /// The resource that ran short.
    pub resource: ResourceId,
    /// Amount the failing cost required.
    pub required: i64,
    /// Amount that was available when the cost was processed.
    pub available: i64,
}
