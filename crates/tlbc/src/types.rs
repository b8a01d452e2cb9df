#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Cell,
    Slice,
}

impl Kind {
    /// FunC declaration type for this kind. Booleans are plain ints on TVM,
    /// they are tracked separately only inside the generator.
    pub fn func_name(self) -> &'static str {
        match self {
            Kind::Bool | Kind::Int => "int",
            Kind::Cell => "cell",
            Kind::Slice => "slice",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Cell => "cell",
            Kind::Slice => "slice",
        }
    }
}
