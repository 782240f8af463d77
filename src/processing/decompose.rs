//! Range to CIDR decomposition.
//!
//! Turns "start address + inclusive count" into the fewest aligned blocks
//! covering exactly that range.

use crate::error::{Error, Result};
use crate::models::{alignment_bits, Address, CidrBlock, Family};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Split `[start, start + count - 1]` into the minimal ordered list of aligned blocks.
///
/// # Examples
/// ```
/// use ip2country::processing::decompose;
/// let blocks = decompose(&"192.0.2.0".parse().unwrap(), &36u32.into()).unwrap();
/// let blocks: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
/// assert_eq!(blocks, ["192.0.2.0/27", "192.0.2.32/30"]);
/// ```
pub fn decompose(start: &Address, count: &BigUint) -> Result<Vec<CidrBlock>> {
    if count.is_zero() {
        return Err(Error::InvalidCount(count.to_string()));
    }
    let family = start.family();
    let width = family.width();
    let end = start.value() + count - 1u32;
    if end > family.max_value() {
        return Err(Error::RangeOverflow {
            start: start.to_string(),
            count: count.to_string(),
            family: family.name(),
        });
    }

    let mut blocks = Vec::new();
    let mut cursor = start.value().clone();
    // cursor may step one past the family maximum on the final block
    while cursor <= end {
        let host_bits = biggest_block_bits(&cursor, &end, family);
        let base = Address::new(family, cursor.clone())?;
        blocks.push(CidrBlock::new(base, width - host_bits)?);
        cursor += BigUint::one() << host_bits;
    }
    Ok(blocks)
}

/// Convenience wrapper taking the textual start address.
pub fn decompose_str(start: &str, count: u64) -> Result<Vec<CidrBlock>> {
    let start: Address = start.parse()?;
    decompose(&start, &BigUint::from(count))
}

/// Host bits of the biggest block that starts at `cursor` and ends at or before `end`.
///
/// The block is constrained by:
/// 1. The alignment of `cursor` (trailing zero bits)
/// 2. The remaining length `end - cursor + 1`
fn biggest_block_bits(cursor: &BigUint, end: &BigUint, family: Family) -> u8 {
    let max_aligned = alignment_bits(cursor, family);
    let remaining = end - cursor + 1u32;
    // bits() of a non-zero value is at least 1
    let max_fit = (remaining.bits() - 1) as u8;
    max_aligned.min(max_fit)
}
