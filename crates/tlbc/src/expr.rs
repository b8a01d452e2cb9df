use crate::compile::GenError;
use crate::types::Kind;

/// A named storage location declared in the generated program. Identifiers
/// are allocated by the emitter and never reused within one run.
#[derive(Debug, Clone)]
pub struct Var {
    kind: Kind,
    name: String,
}

impl Var {
    pub(crate) fn new(kind: Kind, name: String) -> Self {
        Self { kind, name }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> Expr {
        Expr {
            kind: self.kind,
            node: Node::Var(self.name.clone()),
        }
    }
}

/// Immutable typed expression over values that only exist as generated text.
/// The kind is fixed at construction; constructors reject operand kinds the
/// operator is not defined over.
#[derive(Debug, Clone)]
pub struct Expr {
    kind: Kind,
    node: Node,
}

#[derive(Debug, Clone)]
enum Node {
    Lit(String),
    Var(String),
    Unary {
        op: &'static str,
        operand: Box<Node>,
    },
    /// `lhs op rhs`. Operands are not re-parenthesised; every caller keeps
    /// them to single terms (see DESIGN.md on bracket handling).
    Binary {
        op: &'static str,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// `(lhs) op (rhs)` for the boolean connectives, where operands are
    /// themselves comparisons.
    Paired {
        op: &'static str,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// `recv.method(args)` or `recv~method(args)`.
    Call {
        recv: Box<Node>,
        method: &'static str,
        mutates: bool,
        args: Vec<Node>,
    },
}

fn render_node(node: &Node) -> String {
    match node {
        Node::Lit(s) => s.clone(),
        Node::Var(name) => name.clone(),
        Node::Unary { op, operand } => format!("{op} {}", render_node(operand)),
        Node::Binary { op, lhs, rhs } => {
            format!("{} {op} {}", render_node(lhs), render_node(rhs))
        }
        Node::Paired { op, lhs, rhs } => {
            format!("({}) {op} ({})", render_node(lhs), render_node(rhs))
        }
        Node::Call {
            recv,
            method,
            mutates,
            args,
        } => {
            let sep = if *mutates { "~" } else { "." };
            let args = args.iter().map(render_node).collect::<Vec<_>>().join(", ");
            format!("{}{sep}{method}({args})", render_node(recv))
        }
    }
}

impl Expr {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Pure function of the construction history; repeated calls yield
    /// identical text.
    pub fn render(&self) -> String {
        render_node(&self.node)
    }

    fn expect(&self, op: &str, kind: Kind) -> Result<(), GenError> {
        if self.kind != kind {
            return Err(GenError::kind_mismatch(op, kind.describe(), self.kind));
        }
        Ok(())
    }
}

pub fn lit_int(value: u64) -> Expr {
    Expr {
        kind: Kind::Int,
        node: Node::Lit(value.to_string()),
    }
}

pub fn lit_bool(value: bool) -> Expr {
    Expr {
        kind: Kind::Bool,
        node: Node::Lit(if value { "1" } else { "0" }.to_string()),
    }
}

/// TVM null of any kind; used for neutral slice initialisers and for
/// nullified integers on no-amount paths.
pub fn null(kind: Kind) -> Expr {
    Expr {
        kind,
        node: Node::Lit("null()".to_string()),
    }
}

pub fn not(value: &Expr) -> Result<Expr, GenError> {
    value.expect("~", Kind::Bool)?;
    Ok(Expr {
        kind: Kind::Bool,
        node: Node::Unary {
            op: "~",
            operand: Box::new(value.node.clone()),
        },
    })
}

fn int_binary(op: &'static str, kind: Kind, a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    a.expect(op, Kind::Int)?;
    b.expect(op, Kind::Int)?;
    Ok(Expr {
        kind,
        node: Node::Binary {
            op,
            lhs: Box::new(a.node.clone()),
            rhs: Box::new(b.node.clone()),
        },
    })
}

pub fn times(a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    int_binary("*", Kind::Int, a, b)
}

pub fn equals(a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    int_binary("==", Kind::Bool, a, b)
}

pub fn not_equals(a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    int_binary("!=", Kind::Bool, a, b)
}

pub fn less(a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    int_binary("<", Kind::Bool, a, b)
}

pub fn greater(a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    int_binary(">", Kind::Bool, a, b)
}

fn bool_paired(op: &'static str, a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    a.expect(op, Kind::Bool)?;
    b.expect(op, Kind::Bool)?;
    Ok(Expr {
        kind: Kind::Bool,
        node: Node::Paired {
            op,
            lhs: Box::new(a.node.clone()),
            rhs: Box::new(b.node.clone()),
        },
    })
}

pub fn any_of(a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    bool_paired("|", a, b)
}

pub fn both_of(a: &Expr, b: &Expr) -> Result<Expr, GenError> {
    bool_paired("&", a, b)
}

fn call(
    kind: Kind,
    recv: &Expr,
    method: &'static str,
    mutates: bool,
    args: Vec<Node>,
) -> Expr {
    Expr {
        kind,
        node: Node::Call {
            recv: Box::new(recv.node.clone()),
            method,
            mutates,
            args,
        },
    }
}

pub fn begin_parse(cell: &Expr) -> Result<Expr, GenError> {
    cell.expect("begin_parse", Kind::Cell)?;
    Ok(call(Kind::Slice, cell, "begin_parse", false, Vec::new()))
}

pub fn slice_bits(slice: &Expr) -> Result<Expr, GenError> {
    slice.expect("slice_bits", Kind::Slice)?;
    Ok(call(Kind::Int, slice, "slice_bits", false, Vec::new()))
}

pub fn slice_refs(slice: &Expr) -> Result<Expr, GenError> {
    slice.expect("slice_refs", Kind::Slice)?;
    Ok(call(Kind::Int, slice, "slice_refs", false, Vec::new()))
}

pub fn slice_data_empty(slice: &Expr) -> Result<Expr, GenError> {
    slice.expect("slice_data_empty?", Kind::Slice)?;
    Ok(call(Kind::Bool, slice, "slice_data_empty?", false, Vec::new()))
}

pub fn no_refs(slice: &Expr) -> Result<Expr, GenError> {
    equals(&slice_refs(slice)?, &lit_int(0))
}

pub fn preload_uint(slice: &Expr, width: &Expr) -> Result<Expr, GenError> {
    slice.expect("preload_uint", Kind::Slice)?;
    width.expect("preload_uint", Kind::Int)?;
    Ok(call(
        Kind::Int,
        slice,
        "preload_uint",
        false,
        vec![width.node.clone()],
    ))
}

fn cursor(cs: &Var, op: &str) -> Result<Expr, GenError> {
    if cs.kind() != Kind::Slice {
        return Err(GenError::kind_mismatch(op, "slice", cs.kind()));
    }
    Ok(cs.expr())
}

/// Unsafe read: assumes, rather than checks, that `width` bits remain.
pub fn load_uint(cs: &Var, width: &Expr) -> Result<Expr, GenError> {
    let recv = cursor(cs, "load_uint")?;
    width.expect("load_uint", Kind::Int)?;
    Ok(call(
        Kind::Int,
        &recv,
        "load_uint",
        true,
        vec![width.node.clone()],
    ))
}

/// Single-bit read typed as a flag, for presence/discriminant bits.
pub fn load_bit(cs: &Var) -> Result<Expr, GenError> {
    let recv = cursor(cs, "load_uint")?;
    Ok(call(
        Kind::Bool,
        &recv,
        "load_uint",
        true,
        vec![Node::Lit("1".to_string())],
    ))
}

/// Unsafe read: assumes `count` bits remain.
pub fn load_bits(cs: &Var, count: &Expr) -> Result<Expr, GenError> {
    let recv = cursor(cs, "load_bits")?;
    count.expect("load_bits", Kind::Int)?;
    Ok(call(
        Kind::Slice,
        &recv,
        "load_bits",
        true,
        vec![count.node.clone()],
    ))
}

/// Unsafe read: assumes an unread reference remains.
pub fn load_ref(cs: &Var) -> Result<Expr, GenError> {
    let recv = cursor(cs, "load_ref")?;
    Ok(call(Kind::Cell, &recv, "load_ref", true, Vec::new()))
}
