//! IR expression → Python expression

use super::Writer;
use crate::frontend::parser::ast::BinOp;
use crate::middle::ir::Expr;

impl<'a> Writer<'a> {
    pub(super) fn py_expr(
        &self,
        expr: &Expr,
    ) -> String {
        self.render(expr, &mut Vec::new())
    }

    /// Follow a temporary to its definition, stopping on a cycle
    fn resolve<'e>(
        &'e self,
        expr: &'e Expr,
        path: &[&str],
    ) -> &'e Expr {
        let mut current = expr;
        let mut seen: Vec<&str> = path.to_vec();
        while let Expr::Ident(name) = current {
            match self.temps.get_key_value(name.as_str()) {
                Some((&temp, &definition)) if !seen.contains(&temp) => {
                    seen.push(temp);
                    current = definition;
                }
                _ => break,
            }
        }
        current
    }

    /// `path` holds the temps being expanded above this expression
    fn render(
        &self,
        expr: &Expr,
        path: &mut Vec<&'a str>,
    ) -> String {
        match expr {
            Expr::Ident(name) => match self.temps.get_key_value(name.as_str()) {
                Some((&temp, &definition)) if !path.contains(&temp) => {
                    path.push(temp);
                    let text = self.render(definition, path);
                    path.pop();
                    text
                }
                _ => name.clone(),
            },
            Expr::Str(value) => format!("\"{}\"", value.replace('\\', "\\\\")),
            Expr::Int(value) => value.to_string(),
            Expr::Array(elements) => {
                let items: Vec<String> = elements.iter().map(|e| self.render(e, path)).collect();
                format!("[{}]", items.join(", "))
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.operand(lhs, path);
                let rhs = self.operand(rhs, path);
                format!("{} {} {}", lhs, py_operator(*op), rhs)
            }
            Expr::Index { name, index } => format!("{}[{}]", name, self.render(index, path)),
            Expr::Slice { name, start, end } => {
                let start = self.render(start, path);
                format!("{}[{}:{}]", name, start, self.exclusive_end(end, path))
            }
            Expr::Call { arg, .. } => format!("len({})", self.render(arg, path)),
            Expr::Iterator(name) => format!("iter({})", name),
            Expr::Next(name) => format!("next({})", name),
            Expr::HasNext(name) => format!("has_next({})", name),
        }
    }

    /// Binary operands are parenthesized when they are themselves binary
    fn operand(
        &self,
        expr: &Expr,
        path: &mut Vec<&'a str>,
    ) -> String {
        let binary = matches!(self.resolve(expr, path), Expr::Binary { .. });
        let text = self.render(expr, path);
        if binary {
            format!("({})", text)
        } else {
            text
        }
    }

    /// Inclusive IR bound → exclusive Python bound
    fn exclusive_end(
        &self,
        end: &Expr,
        path: &mut Vec<&'a str>,
    ) -> String {
        match self.resolve(end, path) {
            Expr::Int(n) => n.saturating_add(1).to_string(),
            _ => format!("{} + 1", self.operand(end, path)),
        }
    }
}

fn py_operator(op: BinOp) -> &'static str {
    match op {
        BinOp::Div => "//",
        other => other.symbol(),
    }
}
