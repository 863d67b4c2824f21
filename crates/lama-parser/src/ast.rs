//! Syntax tree for lama.
//!
//! All nodes of one parse live in a single arena ([`Ast`]) and refer to each
//! other by [`NodeId`]. Dropping the `Ast` releases the whole tree at once,
//! whether the parse finished or not.
//!
//! Factories and setters check node variants before linking, and the
//! optional fields of `let`, methods, parameters and match arms can be
//! written once only. A violation is an engine bug, reported as a
//! [`TreeError`] rather than a user-facing syntax error.
//!
//! Identifier nodes hold only the hashed [`Ident`]. The arena also keeps
//! the first spelling seen for each id, used when writing source back out;
//! names that hash alike share one spelling.

use std::collections::HashMap;

use crate::ident::Ident;
use lama_lexer::Literal;

/// Index of a node in its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Misuse of the tree API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("node {node:?} is a {found}, expected {expected}")]
    WrongVariant {
        node: NodeId,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field `{field}` of node {node:?} is already set")]
    AlreadySet { node: NodeId, field: &'static str },
    #[error("match {0:?} already ends with a wildcard arm")]
    ArmAfterWildcard(NodeId),
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Identifier(Ident),
    Namespace(Namespace),
    Scope(Scope),
    Let(Let),
    Method(Method),
    Type(TypeNode),
    Variant(Variant),
    Param(Param),
    ParamList(ParamList),
    Literal(Literal),
    Unary(Unary),
    Binary(Binary),
    Assign(Assign),
    If(If),
    Match(Match),
    Arm(Arm),
}

/// A `space` declaration; the compilation unit is an unnamed namespace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Namespace {
    pub name: Option<NodeId>,
    pub items: Vec<NodeId>,
}

/// A `{ ... }` body: declarations first, then statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scope {
    pub declarations: Vec<NodeId>,
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Let {
    pub name: NodeId,
    pub ty: Option<NodeId>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Method {
    /// `None` for a method written as a `let` value.
    pub name: Option<NodeId>,
    pub params: Option<NodeId>,
    pub ret: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// A type known only by name, as written in an annotation.
    Interface,
    /// A `type` declaration.
    Struct,
    /// An `enum` declaration.
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Const,
    Static,
}

impl Qualifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Qualifier::Const => "const",
            Qualifier::Static => "static",
        }
    }
}

/// Members are `let` nodes for a struct and variants for an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub tag: TypeTag,
    pub name: Option<NodeId>,
    pub qualifier: Option<Qualifier>,
    pub members: Vec<NodeId>,
}

/// One `enum` case, optionally carrying a payload type: `Some(Int)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: NodeId,
    pub payload: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: NodeId,
    pub ty: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamList {
    pub params: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

/// `target = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub subject: NodeId,
    pub arms: Vec<NodeId>,
}

/// A match arm. No patterns means the wildcard arm `_ -> { }`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arm {
    pub patterns: Vec<NodeId>,
    pub body: Option<NodeId>,
}

impl Arm {
    pub fn is_wildcard(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Node {
    /// Variant label used in dumps and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Identifier(_) => "identifier",
            Node::Namespace(_) => "space",
            Node::Scope(_) => "scope",
            Node::Let(_) => "let",
            Node::Method(_) => "method",
            Node::Type(_) => "type",
            Node::Variant(_) => "variant",
            Node::Param(_) => "param",
            Node::ParamList(_) => "params",
            Node::Literal(_) => "literal",
            Node::Unary(_) => "unary",
            Node::Binary(_) => "binary",
            Node::Assign(_) => "assign",
            Node::If(_) => "if",
            Node::Match(_) => "match",
            Node::Arm(_) => "arm",
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::Identifier(_) | Node::Literal(_) | Node::Unary(_) | Node::Binary(_)
        )
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Node::Namespace(_) | Node::Type(_) | Node::Let(_) | Node::Method(_)
        )
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Node::Assign(_) | Node::If(_) | Node::Match(_))
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Arena holding every node of one parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    spellings: HashMap<Ident, String>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The compilation unit, set once parsing succeeds.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// First spelling recorded for `ident`, if it came from source text.
    pub fn spelling(&self, ident: Ident) -> Option<&str> {
        self.spellings.get(&ident).map(String::as_str)
    }

    /// The id behind an identifier node.
    pub fn ident(&self, id: NodeId) -> Result<Ident, TreeError> {
        match self.node(id)? {
            Node::Identifier(ident) => Ok(*ident),
            other => Err(wrong(id, "identifier", other)),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(id.index()).ok_or(TreeError::UnknownNode(id))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn check(
        &self,
        id: NodeId,
        expected: &'static str,
        accepts: impl Fn(&Node) -> bool,
    ) -> Result<(), TreeError> {
        let node = self.node(id)?;
        if accepts(node) {
            Ok(())
        } else {
            Err(wrong(id, expected, node))
        }
    }

    fn check_name(&self, name: Option<NodeId>) -> Result<(), TreeError> {
        match name {
            Some(id) => self.check(id, "identifier", |n| matches!(n, Node::Identifier(_))),
            None => Ok(()),
        }
    }

    // --- Factories ---

    pub fn identifier(&mut self, ident: Ident) -> NodeId {
        self.alloc(Node::Identifier(ident))
    }

    /// Hash `name` into an identifier node, remembering its first spelling.
    pub fn named_identifier(&mut self, name: &str) -> NodeId {
        let ident = Ident::from_name(name);
        self.spellings
            .entry(ident)
            .or_insert_with(|| name.to_string());
        self.identifier(ident)
    }

    pub fn literal(&mut self, literal: Literal) -> NodeId {
        self.alloc(Node::Literal(literal))
    }

    pub fn namespace(&mut self, name: Option<NodeId>) -> Result<NodeId, TreeError> {
        self.check_name(name)?;
        Ok(self.alloc(Node::Namespace(Namespace {
            name,
            items: Vec::new(),
        })))
    }

    pub fn scope(&mut self) -> NodeId {
        self.alloc(Node::Scope(Scope::default()))
    }

    pub fn let_binding(&mut self, name: NodeId) -> Result<NodeId, TreeError> {
        self.check_name(Some(name))?;
        Ok(self.alloc(Node::Let(Let {
            name,
            ty: None,
            value: None,
        })))
    }

    pub fn method(&mut self, name: Option<NodeId>) -> Result<NodeId, TreeError> {
        self.check_name(name)?;
        Ok(self.alloc(Node::Method(Method {
            name,
            ..Method::default()
        })))
    }

    /// A `type` or `enum` declaration; members are pushed afterwards.
    pub fn type_decl(&mut self, tag: TypeTag, name: Option<NodeId>) -> Result<NodeId, TreeError> {
        self.check_name(name)?;
        Ok(self.alloc(Node::Type(TypeNode {
            tag,
            name,
            qualifier: None,
            members: Vec::new(),
        })))
    }

    /// A named type reference such as the `Int` in `let x: const Int`.
    pub fn type_ref(
        &mut self,
        qualifier: Option<Qualifier>,
        name: NodeId,
    ) -> Result<NodeId, TreeError> {
        self.check_name(Some(name))?;
        Ok(self.alloc(Node::Type(TypeNode {
            tag: TypeTag::Interface,
            name: Some(name),
            qualifier,
            members: Vec::new(),
        })))
    }

    pub fn variant(&mut self, name: NodeId, payload: Option<NodeId>) -> Result<NodeId, TreeError> {
        self.check_name(Some(name))?;
        if let Some(payload) = payload {
            self.check(payload, "type", |n| matches!(n, Node::Type(_)))?;
        }
        Ok(self.alloc(Node::Variant(Variant { name, payload })))
    }

    pub fn param(&mut self, name: NodeId) -> Result<NodeId, TreeError> {
        self.check_name(Some(name))?;
        Ok(self.alloc(Node::Param(Param { name, ty: None })))
    }

    pub fn param_list(&mut self) -> NodeId {
        self.alloc(Node::ParamList(ParamList::default()))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> Result<NodeId, TreeError> {
        self.check(operand, "expression", Node::is_expression)?;
        Ok(self.alloc(Node::Unary(Unary { op, operand })))
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> Result<NodeId, TreeError> {
        self.check(lhs, "expression", Node::is_expression)?;
        self.check(rhs, "expression", Node::is_expression)?;
        Ok(self.alloc(Node::Binary(Binary { op, lhs, rhs })))
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> Result<NodeId, TreeError> {
        self.check_name(Some(target))?;
        self.check(value, "expression", Node::is_expression)?;
        Ok(self.alloc(Node::Assign(Assign { target, value })))
    }

    pub fn if_statement(&mut self, condition: NodeId, body: NodeId) -> Result<NodeId, TreeError> {
        self.check(condition, "expression", Node::is_expression)?;
        self.check(body, "scope", |n| matches!(n, Node::Scope(_)))?;
        Ok(self.alloc(Node::If(If { condition, body })))
    }

    pub fn match_statement(&mut self, subject: NodeId) -> Result<NodeId, TreeError> {
        self.check(subject, "expression", Node::is_expression)?;
        Ok(self.alloc(Node::Match(Match {
            subject,
            arms: Vec::new(),
        })))
    }

    /// A new match arm; without patterns it is the wildcard arm.
    pub fn arm(&mut self) -> NodeId {
        self.alloc(Node::Arm(Arm::default()))
    }

    // --- Container appends (insertion order is kept) ---

    pub fn push_item(&mut self, namespace: NodeId, item: NodeId) -> Result<(), TreeError> {
        self.check(item, "declaration", Node::is_declaration)?;
        match self.node_mut(namespace)? {
            Node::Namespace(space) => space.items.push(item),
            other => return Err(wrong(namespace, "space", other)),
        }
        Ok(())
    }

    pub fn push_declaration(&mut self, scope: NodeId, decl: NodeId) -> Result<(), TreeError> {
        self.check(decl, "declaration", Node::is_declaration)?;
        match self.node_mut(scope)? {
            Node::Scope(body) => body.declarations.push(decl),
            other => return Err(wrong(scope, "scope", other)),
        }
        Ok(())
    }

    pub fn push_statement(&mut self, scope: NodeId, stmt: NodeId) -> Result<(), TreeError> {
        self.check(stmt, "statement", Node::is_statement)?;
        match self.node_mut(scope)? {
            Node::Scope(body) => body.statements.push(stmt),
            other => return Err(wrong(scope, "scope", other)),
        }
        Ok(())
    }

    pub fn push_param(&mut self, list: NodeId, param: NodeId) -> Result<(), TreeError> {
        self.check(param, "param", |n| matches!(n, Node::Param(_)))?;
        match self.node_mut(list)? {
            Node::ParamList(params) => params.params.push(param),
            other => return Err(wrong(list, "params", other)),
        }
        Ok(())
    }

    /// Struct members must be `let` nodes, enum members variants.
    pub fn push_member(&mut self, ty: NodeId, member: NodeId) -> Result<(), TreeError> {
        let tag = match self.node(ty)? {
            Node::Type(decl) => decl.tag,
            other => return Err(wrong(ty, "type", other)),
        };
        match tag {
            TypeTag::Struct => self.check(member, "let", |n| matches!(n, Node::Let(_)))?,
            TypeTag::Enum => self.check(member, "variant", |n| matches!(n, Node::Variant(_)))?,
            TypeTag::Interface => {
                return Err(TreeError::WrongVariant {
                    node: ty,
                    expected: "type declaration",
                    found: "type reference",
                })
            }
        }
        if let Node::Type(decl) = self.node_mut(ty)? {
            decl.members.push(member);
        }
        Ok(())
    }

    pub fn push_pattern(&mut self, arm: NodeId, pattern: NodeId) -> Result<(), TreeError> {
        self.check(pattern, "expression", Node::is_expression)?;
        match self.node_mut(arm)? {
            Node::Arm(arm) => arm.patterns.push(pattern),
            other => return Err(wrong(arm, "arm", other)),
        }
        Ok(())
    }

    /// Append a finished arm; nothing may follow a wildcard arm.
    pub fn push_arm(&mut self, target: NodeId, arm: NodeId) -> Result<(), TreeError> {
        self.check(arm, "arm", |n| matches!(n, Node::Arm(a) if a.body.is_some()))?;
        let last_is_wildcard = match self.node(target)? {
            Node::Match(stmt) => match stmt.arms.last() {
                Some(&last) => matches!(self.node(last)?, Node::Arm(a) if a.is_wildcard()),
                None => false,
            },
            other => return Err(wrong(target, "match", other)),
        };
        if last_is_wildcard {
            return Err(TreeError::ArmAfterWildcard(target));
        }
        if let Node::Match(stmt) = self.node_mut(target)? {
            stmt.arms.push(arm);
        }
        Ok(())
    }

    // --- Single-assignment setters ---

    pub fn set_let_type(&mut self, target: NodeId, ty: NodeId) -> Result<(), TreeError> {
        self.check(ty, "type", |n| matches!(n, Node::Type(_)))?;
        match self.node_mut(target)? {
            Node::Let(binding) => set_once(&mut binding.ty, ty, target, "ty"),
            other => Err(wrong(target, "let", other)),
        }
    }

    /// A `let` value is an expression, a method, or a space/type/enum declaration.
    pub fn set_let_value(&mut self, target: NodeId, value: NodeId) -> Result<(), TreeError> {
        self.check(value, "let value", |n| {
            n.is_expression() || matches!(n, Node::Namespace(_) | Node::Type(_) | Node::Method(_))
        })?;
        match self.node_mut(target)? {
            Node::Let(binding) => set_once(&mut binding.value, value, target, "value"),
            other => Err(wrong(target, "let", other)),
        }
    }

    pub fn set_method_params(&mut self, target: NodeId, params: NodeId) -> Result<(), TreeError> {
        self.check(params, "params", |n| matches!(n, Node::ParamList(_)))?;
        match self.node_mut(target)? {
            Node::Method(method) => set_once(&mut method.params, params, target, "params"),
            other => Err(wrong(target, "method", other)),
        }
    }

    pub fn set_method_return(&mut self, target: NodeId, ty: NodeId) -> Result<(), TreeError> {
        self.check(ty, "type", |n| matches!(n, Node::Type(_)))?;
        match self.node_mut(target)? {
            Node::Method(method) => set_once(&mut method.ret, ty, target, "ret"),
            other => Err(wrong(target, "method", other)),
        }
    }

    pub fn set_method_body(&mut self, target: NodeId, body: NodeId) -> Result<(), TreeError> {
        self.check(body, "scope", |n| matches!(n, Node::Scope(_)))?;
        match self.node_mut(target)? {
            Node::Method(method) => set_once(&mut method.body, body, target, "body"),
            other => Err(wrong(target, "method", other)),
        }
    }

    pub fn set_param_type(&mut self, target: NodeId, ty: NodeId) -> Result<(), TreeError> {
        self.check(ty, "type", |n| matches!(n, Node::Type(_)))?;
        match self.node_mut(target)? {
            Node::Param(param) => set_once(&mut param.ty, ty, target, "ty"),
            other => Err(wrong(target, "param", other)),
        }
    }

    pub fn set_arm_body(&mut self, target: NodeId, body: NodeId) -> Result<(), TreeError> {
        self.check(body, "scope", |n| matches!(n, Node::Scope(_)))?;
        match self.node_mut(target)? {
            Node::Arm(arm) => set_once(&mut arm.body, body, target, "body"),
            other => Err(wrong(target, "arm", other)),
        }
    }

    /// Mark `unit` as the compilation unit. Set once.
    pub fn set_root(&mut self, unit: NodeId) -> Result<(), TreeError> {
        self.check(unit, "space", |n| matches!(n, Node::Namespace(_)))?;
        set_once(&mut self.root, unit, unit, "root")
    }
}

fn wrong(node: NodeId, expected: &'static str, found: &Node) -> TreeError {
    TreeError::WrongVariant {
        node,
        expected,
        found: found.kind_name(),
    }
}

fn set_once(
    slot: &mut Option<NodeId>,
    value: NodeId,
    node: NodeId,
    field: &'static str,
) -> Result<(), TreeError> {
    if slot.is_some() {
        return Err(TreeError::AlreadySet { node, field });
    }
    *slot = Some(value);
    Ok(())
}
