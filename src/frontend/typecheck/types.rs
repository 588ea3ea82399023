//! 类型定义
//!
//! 源语言只有四种值类型；`Bool` 仅作为比较结果出现在 while 条件中。

use crate::frontend::parser::ast::TypeName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::util::span::Span;

/// 数组元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElemType {
    Int,
    String,
}

impl ElemType {
    pub fn as_type(&self) -> Type {
        match self {
            ElemType::Int => Type::Int,
            ElemType::String => Type::String,
        }
    }

    pub fn type_name(&self) -> TypeName {
        match self {
            ElemType::Int => TypeName::Int,
            ElemType::String => TypeName::String,
        }
    }
}

/// 静态类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    String,
    Bool,
    Array(ElemType),
}

impl Type {
    /// 声明关键字是否接受该类型（`array` 接受任意元素类型）
    pub fn matches_decl(
        &self,
        decl: TypeName,
    ) -> bool {
        matches!(
            (decl, self),
            (TypeName::Int, Type::Int)
                | (TypeName::String, Type::String)
                | (TypeName::Array, Type::Array(_))
        )
    }

    /// 可切片 / 可索引 / 可迭代
    pub fn is_sequence(&self) -> bool {
        matches!(self, Type::String | Type::Array(_))
    }

    /// 迭代或索引得到的元素类型
    pub fn element(&self) -> Option<Type> {
        match self {
            Type::String => Some(Type::String),
            Type::Array(elem) => Some(elem.as_type()),
            _ => None,
        }
    }

    /// 元素类型对应的声明关键字
    pub fn element_type_name(&self) -> Option<TypeName> {
        match self {
            Type::String => Some(TypeName::String),
            Type::Array(elem) => Some(elem.type_name()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Array(ElemType::Int) => write!(f, "array<int>"),
            Type::Array(ElemType::String) => write!(f, "array<string>"),
        }
    }
}

/// 符号表
///
/// 按声明顺序保存变量类型。循环变量在循环结束后移出，
/// 但其绑定类型按循环位置记录在 `loop_bindings` 中，供 IR 生成使用。
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    symbols: IndexMap<String, Type>,
    #[serde(skip)]
    loop_bindings: HashMap<Span, TypeName>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<Type> {
        self.symbols.get(name).copied()
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.symbols.contains_key(name)
    }

    pub(crate) fn insert(
        &mut self,
        name: &str,
        ty: Type,
    ) {
        self.symbols.insert(name.to_string(), ty);
    }

    pub(crate) fn remove(
        &mut self,
        name: &str,
    ) {
        self.symbols.shift_remove(name);
    }

    pub(crate) fn record_loop_binding(
        &mut self,
        loop_span: Span,
        ty: TypeName,
    ) {
        self.loop_bindings.insert(loop_span, ty);
    }

    /// 某个 for-each 循环变量的声明类型
    pub fn loop_binding(
        &self,
        loop_span: Span,
    ) -> Option<TypeName> {
        self.loop_bindings.get(&loop_span).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Type)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
