use std::fmt;

use serde::Serialize;

use crate::emit::Emitter;
use crate::expr;
use crate::message;
use crate::types::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenErrorKind {
    KindMismatch,
    Compose,
    Internal,
}

#[derive(Debug, Clone)]
pub struct GenError {
    pub kind: GenErrorKind,
    pub message: String,
}

impl GenError {
    pub fn new(kind: GenErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    pub(crate) fn kind_mismatch(op: &str, expected: &str, found: Kind) -> Self {
        Self::new(
            GenErrorKind::KindMismatch,
            format!("{op} expects {expected}, found {}", found.describe()),
        )
    }
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            GenErrorKind::KindMismatch => "kind mismatch",
            GenErrorKind::Compose => "compose",
            GenErrorKind::Internal => "internal",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl std::error::Error for GenError {}

/// How `MsgAddress` fields are decoded in the emitted program.
///
/// `Simplified` loads every address variant through the shared
/// `safe_load_msg_addr` built-in, which accepts external addresses in
/// internal positions. `Full` validates the four TL-B constructors
/// (addr_none$00, addr_extern$01, addr_std$10, addr_var$11) bit by bit and
/// only then extracts the address from a value copy of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressStrategy {
    #[default]
    Simplified,
    Full,
}

#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Emit a distinct, incrementing reject code per failure site instead of
    /// the fixed production sentinel. Development aid only.
    pub diagnostics: bool,
    pub address_strategy: AddressStrategy,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            diagnostics: false,
            address_strategy: AddressStrategy::Simplified,
        }
    }
}

pub const ENTRY_POINT: &str = "validate_message";

/// Emits the complete FunC source of the message validator: boilerplate,
/// the `validate_message` entry point, and the full `Message Any` walk.
pub fn generate_validator(options: &GenOptions) -> Result<String, GenError> {
    let mut e = Emitter::new(options.clone());

    e.line(r#"forall X -> tuple just_tuple(X x) asm "NOP";"#);
    e.line(r#"(slice, (slice, int)) safe_load_msg_addr(slice sc) asm(-> 1 0 2) "LDMSGADDRQ NULLROTRIFNOT";"#);
    e.line("");
    e.line("() recv_internal() { }");
    e.line("");

    e.line(&format!("(int, tuple) {ENTRY_POINT}(cell message) method_id {{"));
    e.indent_enter();

    let message = e.param(Kind::Cell, "message");
    let src = e.declare(Kind::Slice, "src")?;
    let dest = e.declare(Kind::Slice, "dest")?;
    let amount = e.declare(Kind::Int, "amount")?;
    let cs = e.bind("cs", &expr::begin_parse(&message.expr())?)?;
    message::message_any(&mut e, &cs, &src, &dest, &amount)?;
    e.line(&format!(
        "return (-1, just_tuple([{}, {}, {}]));",
        src.name(),
        dest.name(),
        amount.name()
    ));

    e.indent_exit();
    e.line("}");
    e.finish()
}
