//! 语句与表达式检查

use super::errors::TypeError;
use super::types::{ElemType, SymbolTable, Type};
use crate::frontend::parser::ast::{BinOp, Expr, Program, Stmt};
use crate::util::span::Span;
use tracing::debug;

/// 语义检查器
///
/// 单一扁平作用域；只有 for-each 循环变量的生命周期限于循环体。
#[derive(Debug, Default)]
pub struct TypeChecker {
    symbols: SymbolTable,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 检查整个程序，成功时返回符号表
    pub fn check_program(
        mut self,
        program: &Program,
    ) -> Result<SymbolTable, TypeError> {
        for stmt in &program.statements {
            self.check_stmt(stmt)?;
        }
        debug!("Semantic check passed, {} symbols", self.symbols.len());
        Ok(self.symbols)
    }

    fn check_stmt(
        &mut self,
        stmt: &Stmt,
    ) -> Result<(), TypeError> {
        match stmt {
            Stmt::Declaration {
                ty,
                name,
                expr,
                span,
            } => {
                if self.symbols.contains(name) {
                    return Err(TypeError::AlreadyDeclared {
                        name: name.clone(),
                        span: *span,
                    });
                }
                let found = self.check_value(expr)?;
                if !found.matches_decl(*ty) {
                    return Err(TypeError::DeclMismatch {
                        expected: *ty,
                        found,
                        span: *span,
                    });
                }
                self.symbols.insert(name, found);
                Ok(())
            }
            Stmt::Assignment { name, expr, span } => {
                let expected = self.lookup(name, *span)?;
                let found = self.check_value(expr)?;
                if matches!(expr, Expr::Slice { .. }) {
                    return Err(TypeError::SliceAssignment {
                        name: name.clone(),
                        span: *span,
                    });
                }
                if found != expected {
                    return Err(TypeError::AssignMismatch {
                        name: name.clone(),
                        expected,
                        found,
                        span: *span,
                    });
                }
                Ok(())
            }
            Stmt::Print { expr, .. } => self.check_value(expr).map(|_| ()),
            Stmt::ForEach {
                var,
                iterable,
                body,
                span,
            } => {
                let iter_type = self.lookup(iterable, *span)?;
                let (Some(elem), Some(elem_name)) =
                    (iter_type.element(), iter_type.element_type_name())
                else {
                    return Err(TypeError::NotIterable {
                        name: iterable.clone(),
                        ty: iter_type,
                        span: *span,
                    });
                };
                if self.symbols.contains(var) {
                    return Err(TypeError::LoopVarDeclared {
                        name: var.clone(),
                        span: *span,
                    });
                }
                self.symbols.insert(var, elem);
                self.symbols.record_loop_binding(*span, elem_name);
                for stmt in body {
                    self.check_stmt(stmt)?;
                }
                self.symbols.remove(var);
                Ok(())
            }
            Stmt::While {
                condition, body, ..
            } => {
                let found = self.check_expr(condition)?;
                if matches!(found, Type::Array(_)) {
                    return Err(TypeError::InvalidCondition {
                        found,
                        span: condition.span(),
                    });
                }
                for stmt in body {
                    self.check_stmt(stmt)?;
                }
                Ok(())
            }
        }
    }

    /// 值位置上的表达式：比较结果不能出现在这里
    fn check_value(
        &mut self,
        expr: &Expr,
    ) -> Result<Type, TypeError> {
        let ty = self.check_expr(expr)?;
        if ty == Type::Bool {
            return Err(TypeError::BoolValue { span: expr.span() });
        }
        Ok(ty)
    }

    fn check_expr(
        &mut self,
        expr: &Expr,
    ) -> Result<Type, TypeError> {
        match expr {
            Expr::Ident(name, span) => self.lookup(name, *span),
            Expr::Str(..) => Ok(Type::String),
            Expr::Int(..) => Ok(Type::Int),
            Expr::Array(elements, span) => self.check_array(elements, *span),
            Expr::Binary {
                op,
                left,
                right,
                span,
            } => {
                let left = self.check_value(left)?;
                let right = self.check_value(right)?;
                binary_result(*op, left, right).ok_or(TypeError::InvalidOperands {
                    op: *op,
                    left,
                    right,
                    span: *span,
                })
            }
            Expr::Index { name, index, span } => {
                let ty = self.sequence(name, *span)?;
                self.check_bound(index)?;
                // element() is Some for every sequence type
                Ok(ty.element().unwrap_or(ty))
            }
            Expr::Slice {
                name,
                start,
                end,
                span,
            } => {
                let ty = self.sequence(name, *span)?;
                self.check_bound(start)?;
                self.check_bound(end)?;
                if let (Expr::Int(start, _), Expr::Int(end, _)) = (start.as_ref(), end.as_ref()) {
                    if start > end {
                        return Err(TypeError::InvertedSlice {
                            start: *start,
                            end: *end,
                            span: *span,
                        });
                    }
                }
                Ok(ty)
            }
            Expr::Call { func, arg, span } => {
                let found = self.check_value(arg)?;
                if !found.is_sequence() {
                    return Err(TypeError::InvalidArgument {
                        func: func.name(),
                        found,
                        span: *span,
                    });
                }
                Ok(Type::Int)
            }
        }
    }

    fn check_array(
        &mut self,
        elements: &[Expr],
        span: Span,
    ) -> Result<Type, TypeError> {
        let mut elem_type: Option<ElemType> = None;
        for element in elements {
            let found = match self.check_value(element)? {
                Type::Int => ElemType::Int,
                Type::String => ElemType::String,
                other => {
                    return Err(TypeError::InvalidElement {
                        found: other,
                        span: element.span(),
                    })
                }
            };
            match elem_type {
                Some(existing) if existing != found => {
                    return Err(TypeError::HeterogeneousArray { span });
                }
                _ => elem_type = Some(found),
            }
        }
        Ok(Type::Array(elem_type.unwrap_or(ElemType::String)))
    }

    /// 索引 / 切片边界：必须是 int，字面量不能为负
    fn check_bound(
        &mut self,
        bound: &Expr,
    ) -> Result<(), TypeError> {
        if let Expr::Int(value, span) = bound {
            if *value < 0 {
                return Err(TypeError::NegativeSliceBound { span: *span });
            }
        }
        let found = self.check_value(bound)?;
        if found != Type::Int {
            return Err(TypeError::NonIntegerBound {
                found,
                span: bound.span(),
            });
        }
        Ok(())
    }

    fn sequence(
        &self,
        name: &str,
        span: Span,
    ) -> Result<Type, TypeError> {
        let ty = self.lookup(name, span)?;
        if !ty.is_sequence() {
            return Err(TypeError::NotSliceable {
                name: name.to_string(),
                ty,
                span,
            });
        }
        Ok(ty)
    }

    fn lookup(
        &self,
        name: &str,
        span: Span,
    ) -> Result<Type, TypeError> {
        self.symbols.get(name).ok_or_else(|| TypeError::Undeclared {
            name: name.to_string(),
            span,
        })
    }
}

fn binary_result(
    op: BinOp,
    left: Type,
    right: Type,
) -> Option<Type> {
    match (op, left, right) {
        (BinOp::Add, Type::Int, Type::Int) => Some(Type::Int),
        (BinOp::Add, Type::String, Type::String) => Some(Type::String),
        (BinOp::Sub | BinOp::Mul | BinOp::Div, Type::Int, Type::Int) => Some(Type::Int),
        (op, l, r)
            if op.is_comparison() && l == r && matches!(l, Type::Int | Type::String) =>
        {
            Some(Type::Bool)
        }
        _ => None,
    }
}
