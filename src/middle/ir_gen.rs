//! AST 到 IR 的生成器
//!
//! 单次遍历已通过语义检查的 AST，每种节点一个处理方法，输出扁平指令序列。
//!
//! - 每个二元运算和内建函数调用都产生一个新的临时变量 `tN`
//! - 标签 `LN` 与临时变量由两个单调递增的计数器分配，整个生成过程中从不重置
//! - 临时变量名会跳过源程序中已使用的变量名

use crate::frontend::parser::ast::{self, Stmt, TypeName};
use crate::frontend::typecheck::SymbolTable;
use crate::middle::ir::{Expr, Instruction};
use std::collections::HashSet;
use tracing::debug;

/// Lower a checked program to IR
pub fn generate(
    program: &ast::Program,
    symbols: &SymbolTable,
) -> Vec<Instruction> {
    IrGenerator::new(symbols).generate(program)
}

/// IR 生成器
pub struct IrGenerator<'a> {
    symbols: &'a SymbolTable,
    /// 源程序中出现过的变量名，临时变量不得与其冲突
    reserved: HashSet<String>,
    temp_counter: usize,
    label_counter: usize,
    instructions: Vec<Instruction>,
}

impl<'a> IrGenerator<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            reserved: HashSet::new(),
            temp_counter: 0,
            label_counter: 0,
            instructions: Vec::new(),
        }
    }

    pub fn generate(
        mut self,
        program: &ast::Program,
    ) -> Vec<Instruction> {
        collect_names(&program.statements, &mut self.reserved);
        for stmt in &program.statements {
            self.gen_stmt(stmt);
        }
        debug!(
            "Generated {} IR instructions ({} temps, {} labels)",
            self.instructions.len(),
            self.temp_counter,
            self.label_counter
        );
        self.instructions
    }

    fn new_temp(&mut self) -> String {
        loop {
            let name = format!("t{}", self.temp_counter);
            self.temp_counter += 1;
            if !self.reserved.contains(&name) {
                return name;
            }
        }
    }

    fn new_label(&mut self) -> String {
        let name = format!("L{}", self.label_counter);
        self.label_counter += 1;
        name
    }

    fn emit(
        &mut self,
        instruction: Instruction,
    ) {
        self.instructions.push(instruction);
    }

    fn gen_stmt(
        &mut self,
        stmt: &Stmt,
    ) {
        match stmt {
            Stmt::Declaration { ty, name, expr, .. } => self.gen_declaration(*ty, name, expr),
            Stmt::Assignment { name, expr, .. } => self.gen_assignment(name, expr),
            Stmt::Print { expr, .. } => self.gen_print(expr),
            Stmt::ForEach {
                var,
                iterable,
                body,
                span,
            } => {
                let ty = self.symbols.loop_binding(*span).unwrap_or(TypeName::String);
                self.gen_for_each(ty, var, iterable, body)
            }
            Stmt::While {
                condition, body, ..
            } => self.gen_while(condition, body),
        }
    }

    fn gen_declaration(
        &mut self,
        ty: TypeName,
        name: &str,
        expr: &ast::Expr,
    ) {
        let value = self.gen_expr(expr);
        self.emit(Instruction::Declare {
            ty,
            name: name.to_string(),
            value,
        });
    }

    fn gen_assignment(
        &mut self,
        name: &str,
        expr: &ast::Expr,
    ) {
        let value = self.gen_expr(expr);
        self.emit(Instruction::Assign {
            name: name.to_string(),
            value,
        });
    }

    fn gen_print(
        &mut self,
        expr: &ast::Expr,
    ) {
        let value = self.gen_expr(expr);
        self.emit(Instruction::Print(value));
    }

    /// ```text
    /// t = iterator(X)
    /// Ls:
    /// if has_next(t) goto Lb
    /// goto Le
    /// Lb:
    /// <ty> var = next(t)
    /// <body>
    /// goto Ls
    /// Le:
    /// ```
    fn gen_for_each(
        &mut self,
        ty: TypeName,
        var: &str,
        iterable: &str,
        body: &[Stmt],
    ) {
        let start = self.new_label();
        let body_label = self.new_label();
        let end = self.new_label();
        let handle = self.new_temp();

        self.emit(Instruction::TempAssign {
            temp: handle.clone(),
            value: Expr::Iterator(iterable.to_string()),
        });
        self.emit(Instruction::Label(start.clone()));
        self.emit(Instruction::IfGoto {
            cond: Expr::HasNext(handle.clone()),
            target: body_label.clone(),
        });
        self.emit(Instruction::Goto(end.clone()));
        self.emit(Instruction::Label(body_label));
        self.emit(Instruction::Declare {
            ty,
            name: var.to_string(),
            value: Expr::Next(handle),
        });
        for stmt in body {
            self.gen_stmt(stmt);
        }
        self.emit(Instruction::Goto(start));
        self.emit(Instruction::Label(end));
    }

    /// Test at top; the condition is lowered after the start label so it is
    /// re-evaluated on every iteration.
    fn gen_while(
        &mut self,
        condition: &ast::Expr,
        body: &[Stmt],
    ) {
        let start = self.new_label();
        let body_label = self.new_label();
        let end = self.new_label();

        self.emit(Instruction::Label(start.clone()));
        let cond = self.gen_expr(condition);
        self.emit(Instruction::IfGoto {
            cond,
            target: body_label.clone(),
        });
        self.emit(Instruction::Goto(end.clone()));
        self.emit(Instruction::Label(body_label));
        for stmt in body {
            self.gen_stmt(stmt);
        }
        self.emit(Instruction::Goto(start));
        self.emit(Instruction::Label(end));
    }

    fn gen_expr(
        &mut self,
        expr: &ast::Expr,
    ) -> Expr {
        match expr {
            ast::Expr::Ident(name, _) => Expr::Ident(name.clone()),
            ast::Expr::Str(value, _) => Expr::Str(value.clone()),
            ast::Expr::Int(value, _) => Expr::Int(*value),
            ast::Expr::Array(elements, _) => {
                Expr::Array(elements.iter().map(|e| self.gen_expr(e)).collect())
            }
            ast::Expr::Binary {
                op, left, right, ..
            } => {
                let lhs = self.gen_expr(left);
                let rhs = self.gen_expr(right);
                self.gen_temp(Expr::binary(*op, lhs, rhs))
            }
            ast::Expr::Index { name, index, .. } => Expr::Index {
                name: name.clone(),
                index: Box::new(self.gen_expr(index)),
            },
            ast::Expr::Slice {
                name, start, end, ..
            } => {
                let start = self.gen_expr(start);
                let end = self.gen_expr(end);
                Expr::Slice {
                    name: name.clone(),
                    start: Box::new(start),
                    end: Box::new(end),
                }
            }
            ast::Expr::Call { func, arg, .. } => {
                let arg = self.gen_expr(arg);
                self.gen_temp(Expr::Call {
                    func: *func,
                    arg: Box::new(arg),
                })
            }
        }
    }

    /// Store `value` in a fresh temporary and return a reference to it
    fn gen_temp(
        &mut self,
        value: Expr,
    ) -> Expr {
        let temp = self.new_temp();
        self.emit(Instruction::TempAssign {
            temp: temp.clone(),
            value,
        });
        Expr::Ident(temp)
    }
}

fn collect_names(
    stmts: &[Stmt],
    names: &mut HashSet<String>,
) {
    for stmt in stmts {
        match stmt {
            Stmt::Declaration { name, .. } | Stmt::Assignment { name, .. } => {
                names.insert(name.clone());
            }
            Stmt::ForEach { var, body, .. } => {
                names.insert(var.clone());
                collect_names(body, names);
            }
            Stmt::While { body, .. } => collect_names(body, names),
            Stmt::Print { .. } => {}
        }
    }
}
