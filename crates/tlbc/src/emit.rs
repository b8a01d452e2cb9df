use crate::compile::{GenError, GenErrorKind, GenOptions};
use crate::expr::{self, Expr, Var};
use crate::types::Kind;
use crate::validate;

/// Sequential FunC program buffer. One per generation run; holds the only
/// mutable state of the generator: the text, the indentation depth, the
/// fresh-name counter, and the next diagnostic reject code.
#[derive(Debug)]
pub struct Emitter {
    out: String,
    indent: usize,
    name_counter: u32,
    fail_code: i64,
    options: GenOptions,
}

impl Emitter {
    pub fn new(options: GenOptions) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            name_counter: 0,
            fail_code: 100,
            options,
        }
    }

    pub fn options(&self) -> &GenOptions {
        &self.options
    }

    pub fn depth(&self) -> usize {
        self.indent
    }

    pub fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(s);
        self.out.push('\n');
    }

    pub fn indent_enter(&mut self) {
        self.indent += 1;
    }

    pub fn indent_exit(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Allocates an identifier that is unique for the lifetime of this run,
    /// even after the generated scope that uses it closes.
    pub fn fresh_name(&mut self, prefix: &str) -> Result<String, GenError> {
        validate::validate_prefix(prefix)
            .map_err(|msg| GenError::new(GenErrorKind::Compose, msg))?;
        let name = format!("{prefix}{}", self.name_counter);
        self.name_counter += 1;
        Ok(name)
    }

    /// Handle for a value bound by the surrounding target-language context
    /// (an entry-point parameter), not declared by the emitter.
    pub fn param(&self, kind: Kind, name: &str) -> Var {
        Var::new(kind, name.to_string())
    }

    /// Zero-initialised declaration: slices start at null, ints at 0, cells
    /// at the target-language default.
    pub fn declare(&mut self, kind: Kind, prefix: &str) -> Result<Var, GenError> {
        let name = self.fresh_name(prefix)?;
        match kind {
            Kind::Slice => self.line(&format!("slice {name} = null();")),
            Kind::Int | Kind::Bool => self.line(&format!("int {name} = 0;")),
            Kind::Cell => self.line(&format!("cell {name};")),
        }
        Ok(Var::new(kind, name))
    }

    /// Declaration combined with initialisation from `value`.
    pub fn bind(&mut self, prefix: &str, value: &Expr) -> Result<Var, GenError> {
        let name = self.fresh_name(prefix)?;
        self.line(&format!(
            "{} {name} = {};",
            value.kind().func_name(),
            value.render()
        ));
        Ok(Var::new(value.kind(), name))
    }

    pub fn assign(&mut self, target: &Var, value: &Expr) -> Result<(), GenError> {
        if target.kind() != value.kind() {
            return Err(GenError::kind_mismatch(
                "assignment",
                target.kind().describe(),
                value.kind(),
            ));
        }
        self.line(&format!("{} = {};", target.name(), value.render()));
        Ok(())
    }

    /// Evaluate for effect only; used for unconditional consumption when no
    /// value is retained.
    pub fn statement(&mut self, value: &Expr) {
        self.line(&format!("{};", value.render()));
    }

    pub fn if_block<F>(&mut self, cond: &Expr, body: F) -> Result<(), GenError>
    where
        F: FnOnce(&mut Emitter) -> Result<(), GenError>,
    {
        if cond.kind() != Kind::Bool {
            return Err(GenError::kind_mismatch("if condition", "bool", cond.kind()));
        }
        self.line(&format!("if ({}) {{", cond.render()));
        self.indent_enter();
        let body_result = body(self);
        self.indent_exit();
        self.line("}");
        body_result
    }

    pub fn if_else<F, G>(
        &mut self,
        cond: &Expr,
        then_body: F,
        else_body: G,
    ) -> Result<(), GenError>
    where
        F: FnOnce(&mut Emitter) -> Result<(), GenError>,
        G: FnOnce(&mut Emitter) -> Result<(), GenError>,
    {
        if cond.kind() != Kind::Bool {
            return Err(GenError::kind_mismatch("if condition", "bool", cond.kind()));
        }
        self.line(&format!("if ({}) {{", cond.render()));

        self.indent_enter();
        let then_result = then_body(self);
        self.indent_exit();

        self.line("} else {");

        self.indent_enter();
        let else_result = else_body(self);
        self.indent_exit();

        self.line("}");
        then_result.and(else_result)
    }

    /// The reject sentinel. No statement after it is reachable in the same
    /// generated branch; the early return enforces that at runtime.
    pub fn fail(&mut self) {
        if self.options.diagnostics {
            let code = self.fail_code;
            self.fail_code += 1;
            self.line(&format!("return ({code}, null());"));
        } else {
            self.line("return (0, null());");
        }
    }

    /// `if (fail_cond) { <reject> }` — the single building block every
    /// schema rule is made of.
    pub fn validate(&mut self, fail_cond: &Expr) -> Result<(), GenError> {
        self.if_block(fail_cond, |e| {
            e.fail();
            Ok(())
        })
    }

    pub fn nullify(&mut self, target: &Var) -> Result<(), GenError> {
        self.assign(target, &expr::null(target.kind()))
    }

    pub fn finish(self) -> Result<String, GenError> {
        if self.indent != 0 {
            return Err(GenError::new(
                GenErrorKind::Internal,
                format!("unbalanced blocks: final indentation depth {}", self.indent),
            ));
        }
        Ok(self.out)
    }
}
