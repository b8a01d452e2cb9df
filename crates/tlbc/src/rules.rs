//! Schema-independent decoding rules. Every rule consumes from a cursor
//! variable and is composed solely from the emitter's statement generators
//! and the validation primitive, so each consuming path checks remaining
//! capacity before the unsafe read it guards.

use crate::compile::{GenError, GenErrorKind};
use crate::emit::Emitter;
use crate::expr::{self, Expr, Var};

pub fn check_enough_bits(e: &mut Emitter, cs: &Var, count: &Expr) -> Result<(), GenError> {
    e.validate(&expr::less(&expr::slice_bits(&cs.expr())?, count)?)
}

pub fn check_has_ref(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    e.validate(&expr::no_refs(&cs.expr())?)
}

/// Fixed-width unsigned integer, read and discarded (schema padding).
pub fn uint_discard(e: &mut Emitter, cs: &Var, width: &Expr) -> Result<(), GenError> {
    check_enough_bits(e, cs, width)?;
    e.statement(&expr::load_uint(cs, width)?);
    Ok(())
}

/// Fixed-width unsigned integer bound to a fresh location.
pub fn uint_bind(
    e: &mut Emitter,
    cs: &Var,
    width: &Expr,
    prefix: &str,
) -> Result<Var, GenError> {
    check_enough_bits(e, cs, width)?;
    e.bind(prefix, &expr::load_uint(cs, width)?)
}

/// Fixed-width unsigned integer assigned to an existing location.
pub fn uint_into(e: &mut Emitter, cs: &Var, width: &Expr, target: &Var) -> Result<(), GenError> {
    check_enough_bits(e, cs, width)?;
    e.assign(target, &expr::load_uint(cs, width)?)
}

/// Raw bit run, read and discarded.
pub fn bits_discard(e: &mut Emitter, cs: &Var, count: &Expr) -> Result<(), GenError> {
    check_enough_bits(e, cs, count)?;
    e.statement(&expr::load_bits(cs, count)?);
    Ok(())
}

pub fn bit_discard(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    e.validate(&expr::slice_data_empty(&cs.expr())?)?;
    e.statement(&expr::load_bit(cs)?);
    Ok(())
}

/// One bit read as a flag, usable directly as a branch condition.
pub fn bit_flag(e: &mut Emitter, cs: &Var, prefix: &str) -> Result<Var, GenError> {
    e.validate(&expr::slice_data_empty(&cs.expr())?)?;
    e.bind(prefix, &expr::load_bit(cs)?)
}

/// Reads one bit and rejects unless it equals `expected`.
pub fn expect_bit(e: &mut Emitter, cs: &Var, expected: u8) -> Result<(), GenError> {
    if expected > 1 {
        return Err(GenError::new(
            GenErrorKind::Compose,
            format!("expect_bit takes 0 or 1, got {expected}"),
        ));
    }
    e.validate(&expr::slice_data_empty(&cs.expr())?)?;
    let bit = uint_bind(e, cs, &expr::lit_int(1), "expected_bit")?;
    e.validate(&expr::not_equals(&bit.expr(), &expr::lit_int(u64::from(expected)))?)
}

pub fn zero(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    expect_bit(e, cs, 0)
}

pub fn one(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    expect_bit(e, cs, 1)
}

/// Minimal width holding every value strictly below `max`: ceil(log2(max)).
fn width_below(max: u64) -> Result<u32, GenError> {
    if max == 0 {
        return Err(GenError::new(
            GenErrorKind::Compose,
            "bounded integer upper bound must be positive".to_string(),
        ));
    }
    Ok(u64::BITS - (max - 1).leading_zeros())
}

/// Minimal width holding every value up to and including `max`:
/// ceil(log2(max + 1)).
fn width_up_to(max: u64) -> u32 {
    u64::BITS - max.leading_zeros()
}

/// Bounded integer in [0, max): reads ceil(log2(max)) bits and rejects any
/// decoded value >= max.
pub fn number_below(
    e: &mut Emitter,
    cs: &Var,
    max: u64,
    prefix: &str,
) -> Result<Var, GenError> {
    let width = width_below(max)?;
    let num = uint_bind(e, cs, &expr::lit_int(u64::from(width)), prefix)?;
    e.validate(&expr::greater(&num.expr(), &expr::lit_int(max - 1))?)?;
    Ok(num)
}

/// Bounded integer in [0, max]: reads ceil(log2(max + 1)) bits and rejects
/// any decoded value > max, even when the width could represent it.
pub fn number_up_to(
    e: &mut Emitter,
    cs: &Var,
    max: u64,
    prefix: &str,
) -> Result<Var, GenError> {
    let width = width_up_to(max);
    let num = uint_bind(e, cs, &expr::lit_int(u64::from(width)), prefix)?;
    e.validate(&expr::greater(&num.expr(), &expr::lit_int(max))?)?;
    Ok(num)
}

/// Bounded integer in [min, max].
pub fn number_between(
    e: &mut Emitter,
    cs: &Var,
    min: u64,
    max: u64,
    prefix: &str,
) -> Result<Var, GenError> {
    if min > max {
        return Err(GenError::new(
            GenErrorKind::Compose,
            format!("empty bounded range [{min}, {max}]"),
        ));
    }
    let width = width_up_to(max);
    let num = uint_bind(e, cs, &expr::lit_int(u64::from(width)), prefix)?;
    e.validate(&expr::any_of(
        &expr::less(&num.expr(), &expr::lit_int(min))?,
        &expr::greater(&num.expr(), &expr::lit_int(max))?,
    )?)?;
    Ok(num)
}

/// VarUInteger max_len: a byte length below `max_len`, then that many bytes
/// as the value, discarded.
pub fn var_uint_discard(e: &mut Emitter, cs: &Var, max_len: u64) -> Result<(), GenError> {
    let byte_len = number_below(e, cs, max_len, "byte_len")?;
    uint_discard(e, cs, &expr::times(&byte_len.expr(), &expr::lit_int(8))?)
}

/// VarUInteger max_len assigned to an existing location.
pub fn var_uint_into(
    e: &mut Emitter,
    cs: &Var,
    max_len: u64,
    target: &Var,
) -> Result<(), GenError> {
    let byte_len = number_below(e, cs, max_len, "byte_len")?;
    uint_into(e, cs, &expr::times(&byte_len.expr(), &expr::lit_int(8))?, target)
}

pub fn grams_discard(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    var_uint_discard(e, cs, 16)
}

pub fn grams_into(e: &mut Emitter, cs: &Var, target: &Var) -> Result<(), GenError> {
    var_uint_into(e, cs, 16, target)
}

/// Maybe X: a presence bit; when unset the wrapped field keeps its declared
/// zero default and the cursor is not touched further.
pub fn maybe_of<F>(e: &mut Emitter, cs: &Var, rule: F) -> Result<(), GenError>
where
    F: FnOnce(&mut Emitter, &Var) -> Result<(), GenError>,
{
    let present = bit_flag(e, cs, "maybe_cons")?;
    e.if_block(&present.expr(), |e| rule(e, cs))
}

/// Either dispatch: discriminant bit 1 selects `when_set`, bit 0 selects
/// `when_clear`. The polarity is a fixed convention.
pub fn either_of<F, G>(e: &mut Emitter, cs: &Var, when_set: F, when_clear: G) -> Result<(), GenError>
where
    F: FnOnce(&mut Emitter, &Var) -> Result<(), GenError>,
    G: FnOnce(&mut Emitter, &Var) -> Result<(), GenError>,
{
    let tag = bit_flag(e, cs, "either_cons")?;
    e.if_else(&tag.expr(), |e| when_set(e, cs), |e| when_clear(e, cs))
}

/// Reference-indirected subtree: checks a reference remains and binds the
/// referenced cell. Residual-data policy is left to the nested rule.
pub fn ref_bind(e: &mut Emitter, cs: &Var, prefix: &str) -> Result<Var, GenError> {
    check_has_ref(e, cs)?;
    e.bind(prefix, &expr::load_ref(cs)?)
}

pub fn ref_discard(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    check_has_ref(e, cs)?;
    e.statement(&expr::load_ref(cs)?);
    Ok(())
}

/// Anycast: depth in [1, 30] followed by that many rewrite-prefix bits.
pub fn anycast(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    let depth = number_between(e, cs, 1, 30, "depth")?;
    bits_discard(e, cs, &depth.expr())
}
