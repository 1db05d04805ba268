//! Individual value generators for each field kind.
//!
//! This module maps a `FieldKind` from the source configuration to the
//! function that produces a fresh value for it.

pub mod choice;
pub mod network;
pub mod numeric;
pub mod timestamp;

use crate::field::{FieldError, GenerationContext};
use rand::Rng;
use source_config::FieldKind;

/// Generate a fresh value for the given field kind.
///
/// This always regenerates; `repeat` / `change` caching lives in
/// [`crate::field::next_value`].
pub fn generate_value<R: Rng>(
    kind: &FieldKind,
    ctx: &GenerationContext,
    rng: &mut R,
) -> Result<String, FieldError> {
    match kind {
        FieldKind::Enum { values } => choice::generate_enum(rng, values),

        FieldKind::Chance { choices } => choice::generate_chance(rng, choices),

        FieldKind::Integer { min, max } => Ok(numeric::generate_integer(rng, *min, *max)),

        FieldKind::Float { min, max } => Ok(numeric::generate_float(rng, *min, *max)),

        FieldKind::Timestamp { format } => timestamp::format_timestamp(ctx.timestamp, format),

        FieldKind::Ip => Ok(network::generate_ipv4(rng)),
    }
}
