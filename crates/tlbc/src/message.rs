//! TON message layout: one generator function per node of the TL-B grammar,
//! composed from the primitives in `rules`. The overall walk is a bounded
//! depth-first traversal of the schema, not of the input.

use crate::compile::{AddressStrategy, GenError};
use crate::emit::Emitter;
use crate::expr::{self, Var};
use crate::rules;
use crate::types::Kind;

/// Loads any address variant through the shared built-in, rejects on a load
/// failure, and normalises addr_none$00 to `null()`.
fn builtin_address(e: &mut Emitter, source: &Var, addr: &Var) -> Result<(), GenError> {
    let ok_name = e.fresh_name("ok")?;
    e.line(&format!(
        "({}, int {ok_name}) = {}~safe_load_msg_addr();",
        addr.name(),
        source.name()
    ));
    let ok = e.param(Kind::Bool, &ok_name);
    e.validate(&expr::not(&ok.expr())?)?;

    e.if_block(
        &expr::both_of(
            &expr::equals(&expr::slice_bits(&addr.expr())?, &expr::lit_int(2))?,
            &expr::equals(
                &expr::preload_uint(&addr.expr(), &expr::lit_int(2))?,
                &expr::lit_int(0),
            )?,
        )?,
        |e| e.assign(addr, &expr::null(Kind::Slice)),
    )
}

fn maybe_anycast(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    rules::maybe_of(e, cs, rules::anycast)
}

// addr_std$10 anycast:(Maybe Anycast) workchain_id:int8 address:bits256
fn addr_std(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    maybe_anycast(e, cs)?;
    rules::bits_discard(e, cs, &expr::lit_int(8))?;
    rules::bits_discard(e, cs, &expr::lit_int(256))
}

// addr_var$11 anycast:(Maybe Anycast) addr_len:(## 9) workchain_id:int32
//             address:(bits addr_len)
fn addr_var(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    maybe_anycast(e, cs)?;
    let addr_len = rules::uint_bind(e, cs, &expr::lit_int(9), "addr_len")?;
    rules::bits_discard(e, cs, &expr::lit_int(32))?;
    rules::bits_discard(e, cs, &addr_len.expr())
}

// addr_extern$01 len:(## 9) external_address:(bits len)
fn addr_extern(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    let len = rules::uint_bind(e, cs, &expr::lit_int(9), "addr_len")?;
    rules::bits_discard(e, cs, &len.expr())
}

/// Full-fidelity internal address: tag must be 10 or 11, the selected
/// constructor is validated bit by bit, and the extracted value still comes
/// from the built-in applied to a value copy of the cursor taken before the
/// walk (FunC slices copy on assignment).
fn msg_address_int_full(e: &mut Emitter, cs: &Var, addr: &Var) -> Result<(), GenError> {
    let probe = e.bind("addr_probe", &cs.expr())?;
    rules::one(e, cs)?;
    rules::either_of(e, cs, addr_var, addr_std)?;
    builtin_address(e, &probe, addr)
}

fn msg_address_ext_full(e: &mut Emitter, cs: &Var, addr: &Var) -> Result<(), GenError> {
    let probe = e.bind("addr_probe", &cs.expr())?;
    rules::zero(e, cs)?;
    // addr_none$00 carries no further fields.
    rules::either_of(e, cs, addr_extern, |_, _| Ok(()))?;
    builtin_address(e, &probe, addr)
}

pub fn msg_address_int(e: &mut Emitter, cs: &Var, addr: &Var) -> Result<(), GenError> {
    match e.options().address_strategy {
        AddressStrategy::Simplified => builtin_address(e, cs, addr),
        AddressStrategy::Full => msg_address_int_full(e, cs, addr),
    }
}

pub fn msg_address_ext(e: &mut Emitter, cs: &Var, addr: &Var) -> Result<(), GenError> {
    match e.options().address_strategy {
        AddressStrategy::Simplified => builtin_address(e, cs, addr),
        AddressStrategy::Full => msg_address_ext_full(e, cs, addr),
    }
}

/// Every HashmapE in the message layout is required to be hme_empty$0.
pub fn hashmap_e(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    rules::zero(e, cs)
}

fn extra_currency_collection(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    hashmap_e(e, cs)
}

pub fn currency_collection(e: &mut Emitter, cs: &Var, amount: &Var) -> Result<(), GenError> {
    rules::grams_into(e, cs, amount)?;
    extra_currency_collection(e, cs)
}

fn int_msg_info(
    e: &mut Emitter,
    cs: &Var,
    src: &Var,
    dest: &Var,
    amount: &Var,
) -> Result<(), GenError> {
    // ihr_disabled:Bool bounce:Bool bounced:Bool
    rules::bits_discard(e, cs, &expr::lit_int(3))?;
    msg_address_int(e, cs, src)?;
    msg_address_int(e, cs, dest)?;
    currency_collection(e, cs, amount)?;
    rules::grams_discard(e, cs)?; // ihr_fee:Grams
    rules::grams_discard(e, cs)?; // fwd_fee:Grams
    rules::bits_discard(e, cs, &expr::lit_int(96)) // created_lt:uint64 created_at:uint32
}

fn ext_in_msg_info(
    e: &mut Emitter,
    cs: &Var,
    src: &Var,
    dest: &Var,
    amount: &Var,
) -> Result<(), GenError> {
    msg_address_ext(e, cs, src)?;
    msg_address_int(e, cs, dest)?;
    rules::grams_discard(e, cs)?; // import_fee:Grams
    e.nullify(amount)
}

fn ext_out_msg_info(
    e: &mut Emitter,
    cs: &Var,
    src: &Var,
    dest: &Var,
    amount: &Var,
) -> Result<(), GenError> {
    msg_address_int(e, cs, src)?;
    msg_address_ext(e, cs, dest)?;
    rules::bits_discard(e, cs, &expr::lit_int(96))?; // created_lt:uint64 created_at:uint32
    e.nullify(amount)
}

// int_msg_info$0 / ext_in_msg_info$10 / ext_out_msg_info$11
pub fn common_msg_info(
    e: &mut Emitter,
    cs: &Var,
    src: &Var,
    dest: &Var,
    amount: &Var,
) -> Result<(), GenError> {
    let c0 = rules::bit_flag(e, cs, "c0")?;
    e.if_else(
        &c0.expr(),
        |e| {
            let c1 = rules::bit_flag(e, cs, "c1")?;
            e.if_else(
                &c1.expr(),
                |e| ext_out_msg_info(e, cs, src, dest, amount),
                |e| ext_in_msg_info(e, cs, src, dest, amount),
            )
        },
        |e| int_msg_info(e, cs, src, dest, amount),
    )
}

fn tick_tock(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    rules::bits_discard(e, cs, &expr::lit_int(2))
}

// _ split_depth:(Maybe (## 5)) special:(Maybe TickTock)
//   code:(Maybe ^Cell) data:(Maybe ^Cell) library:(HashmapE 256 SimpleLib)
fn state_init(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    rules::maybe_of(e, cs, |e, cs| rules::bits_discard(e, cs, &expr::lit_int(5)))?;
    rules::maybe_of(e, cs, tick_tock)?;
    rules::maybe_of(e, cs, rules::ref_discard)?;
    rules::maybe_of(e, cs, rules::ref_discard)?;
    hashmap_e(e, cs)
}

fn ref_state_init(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    let cell = rules::ref_bind(e, cs, "state_init_cell")?;
    let inner = e.bind("state_init_slice", &expr::begin_parse(&cell.expr())?)?;
    state_init(e, &inner)
}

fn either_state_init(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    rules::either_of(e, cs, ref_state_init, state_init)
}

fn init(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    rules::maybe_of(e, cs, either_state_init)
}

// body:(Either X ^X) — bit 1 puts the body in a reference, bit 0 leaves the
// (possibly empty) remainder in place.
fn body(e: &mut Emitter, cs: &Var) -> Result<(), GenError> {
    rules::either_of(e, cs, rules::ref_discard, |_, _| Ok(()))
}

pub fn message_any(
    e: &mut Emitter,
    cs: &Var,
    src: &Var,
    dest: &Var,
    amount: &Var,
) -> Result<(), GenError> {
    common_msg_info(e, cs, src, dest, amount)?;
    init(e, cs)?;
    body(e, cs)
}
