//! Parse engine for lama.
//!
//! Pulls tokens from a [`Scanner`] one at a time and builds an [`Ast`].
//! Grammar rules do not call each other on the native stack. Each active
//! rule is a [`Frame`] on an explicit, heap-allocated stack; a rule runs
//! until it needs a sub-rule, stores its progress in the frame's state and
//! asks the driver loop to push the callee. When the callee finishes, its
//! reply is left in a slot the caller reads on its next turn. Nesting depth
//! is therefore bounded by memory (or [`ParserConfig::max_depth`]), never by
//! the thread's stack.
//!
//! Grammar:
//!
//! ```text
//! Unit        := Declaration* EOF
//! Declaration := Namespace | Enum | TypeDecl | Let | Function
//! Namespace   := "space" ident? "{" Declaration* "}"
//! Enum        := "enum" ident? "{" (ident ("(" ident ")")? ","?)* "}"
//! TypeDecl    := "type" ident? "{" Let* "}"
//! Let         := "let" ident (":" TypeRef)?
//!                ("=" (Namespace | Enum | TypeDecl | Method | Expression))?
//! Function    := "func" ident "(" ParamList? ")" TypeRef? Scope
//! Method      := "(" ParamList? ")" TypeRef? Scope
//! ParamList   := Param ("," Param)*
//! Param       := ident (":" TypeRef)?
//! TypeRef     := ("const" | "static")? ident
//! Scope       := "{" Declaration* Statement* "}"
//! Statement   := ident "=" Expression
//!              | "if" Expression Scope
//!              | "match" Expression "{" Arm* WildArm? "}"
//! Arm         := Expression ("," Expression)* "->" Scope
//! WildArm     := "_" "->" Scope
//! Expression  := Term (("+" | "-") Term)*
//! Term        := Factor (("*" | "/") Factor)*
//! Factor      := ("-" | "!")? Value
//! Value       := literal | ident | "pi" | "tau" | "inf" | "nan"
//!              | "(" Expression ")"
//! ```
//!
//! The first error stops the parse. It is handed to the caller's
//! [`DiagnosticSink`], every pending frame is dropped and the partial tree
//! is released.

use std::mem;

use lama_lexer::{CharSource, Literal, Scanner, Token, TokenKind};

use crate::ast::{Ast, BinaryOp, NodeId, Qualifier, TreeError, TypeTag, UnaryOp};
use crate::diagnostics::{DiagnosticSink, Expected, ParseError};

/// Parser settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserConfig {
    max_depth: Option<usize>,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`ParseError::TooDeep`] once more than `limit` rules are
    /// active at the same time. Unlimited by default.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn depth_limit(&self) -> Option<usize> {
        self.max_depth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Unit,
    Declaration,
    Namespace,
    Enum,
    TypeDecl,
    Let,
    Function,
    Method,
    ParamList,
    Param,
    TypeRef,
    Scope,
    Statement,
    Expression,
    Term,
    Factor,
    Value,
}

/// Alternatives of [`Rule::Declaration`], tried in order.
const DECLARATIONS: [Rule; 5] = [
    Rule::Namespace,
    Rule::Enum,
    Rule::TypeDecl,
    Rule::Let,
    Rule::Function,
];

/// What a finished rule hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Node(NodeId),
    /// The rule does not apply here and consumed nothing.
    Declined,
}

enum Step {
    Call(Rule),
    Return(Reply),
}

/// One active grammar rule.
#[derive(Debug, Clone, Copy)]
struct Frame {
    rule: Rule,
    /// Resume point; 0 on the first turn.
    state: u8,
    /// The node this rule is building.
    node: Option<NodeId>,
    /// Second in-progress node: assignment target, `if` condition, current arm.
    aux: Option<NodeId>,
    binary: Option<BinaryOp>,
    unary: Option<UnaryOp>,
}

impl Frame {
    fn new(rule: Rule) -> Self {
        Self {
            rule,
            state: 0,
            node: None,
            aux: None,
            binary: None,
            unary: None,
        }
    }
}

/// Attach the current token's position to tree API failures.
trait Located<T> {
    fn located(self, token: &Token) -> Result<T, ParseError>;
}

impl<T> Located<T> for Result<T, TreeError> {
    fn located(self, token: &Token) -> Result<T, ParseError> {
        self.map_err(|err| ParseError::tree(err, token))
    }
}

/// lama parser over a single scanner.
pub struct Parser<S> {
    scanner: Scanner<S>,
    current: Token,
    config: ParserConfig,
    ast: Ast,
    stack: Vec<Frame>,
    popped: Option<Reply>,
    max_depth: usize,
}

impl<S: CharSource> Parser<S> {
    /// Create a parser; reads the first token immediately.
    pub fn new(mut scanner: Scanner<S>, config: ParserConfig) -> Self {
        let current = scanner.advance();
        Self {
            scanner,
            current,
            config,
            ast: Ast::new(),
            stack: Vec::new(),
            popped: None,
            max_depth: 0,
        }
    }

    /// Deepest frame stack seen by the last parse.
    pub fn max_depth_reached(&self) -> usize {
        self.max_depth
    }

    /// Parse one compilation unit.
    ///
    /// On failure the error is reported to `sink` and also returned.
    #[tracing::instrument(skip_all, fields(origin = %self.scanner.origin()))]
    pub fn parse(&mut self, sink: &mut dyn DiagnosticSink) -> Result<Ast, ParseError> {
        match self.run() {
            Ok(ast) => {
                tracing::debug!(
                    nodes = ast.len(),
                    max_depth = self.max_depth,
                    "parsed compilation unit"
                );
                Ok(ast)
            }
            Err(err) => {
                tracing::debug!(error = %err, pending = self.stack.len(), "parse failed");
                sink.report(&err);
                self.stack.clear();
                self.popped = None;
                self.ast = Ast::new();
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<Ast, ParseError> {
        self.ast = Ast::new();
        self.stack.clear();
        self.popped = None;
        self.max_depth = 0;

        self.push(Rule::Unit)?;
        while let Some(mut frame) = self.stack.pop() {
            match self.resume(&mut frame)? {
                Step::Call(rule) => {
                    self.stack.push(frame);
                    self.push(rule)?;
                }
                Step::Return(reply) => {
                    tracing::trace!(
                        rule = ?frame.rule,
                        matched = matches!(reply, Reply::Node(_)),
                        "leave"
                    );
                    self.popped = Some(reply);
                }
            }
        }

        match self.popped.take() {
            Some(Reply::Node(unit)) => {
                self.ast.set_root(unit).located(&self.current)?;
                Ok(mem::take(&mut self.ast))
            }
            _ => Err(self.internal("compilation unit produced no tree")),
        }
    }

    fn push(&mut self, rule: Rule) -> Result<(), ParseError> {
        let depth = self.stack.len() + 1;
        if let Some(limit) = self.config.max_depth {
            if depth > limit {
                return Err(ParseError::TooDeep {
                    origin: self.current.origin.clone(),
                    line: self.current.line,
                    limit,
                });
            }
        }
        self.max_depth = self.max_depth.max(depth);
        self.popped = None;
        tracing::trace!(rule = ?rule, depth, "enter");
        self.stack.push(Frame::new(rule));
        Ok(())
    }

    fn resume(&mut self, frame: &mut Frame) -> Result<Step, ParseError> {
        let reply = self.popped.take();
        if frame.state != 0 && reply.is_none() {
            return Err(self.internal(format!(
                "{:?} resumed in state {} without a reply",
                frame.rule, frame.state
            )));
        }
        let reply = reply.unwrap_or(Reply::Declined);
        match frame.rule {
            Rule::Unit => self.unit(frame, reply),
            Rule::Declaration => self.declaration(frame, reply),
            Rule::Namespace => self.namespace(frame, reply),
            Rule::Enum => self.enumeration(frame),
            Rule::TypeDecl => self.type_decl(frame, reply),
            Rule::Let => self.let_binding(frame, reply),
            Rule::Function => self.function(frame, reply),
            Rule::Method => self.method(frame, reply),
            Rule::ParamList => self.param_list(frame, reply),
            Rule::Param => self.param(frame, reply),
            Rule::TypeRef => self.type_ref(frame),
            Rule::Scope => self.scope(frame, reply),
            Rule::Statement => self.statement(frame, reply),
            Rule::Expression => self.binary_chain(frame, reply, Rule::Term, additive),
            Rule::Term => self.binary_chain(frame, reply, Rule::Factor, multiplicative),
            Rule::Factor => self.factor(frame, reply),
            Rule::Value => self.value(frame, reply),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn unit(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                f.node = Some(self.ast.namespace(None).located(&self.current)?);
                f.state = 1;
                Ok(Step::Call(Rule::Declaration))
            }
            1 => {
                let unit = self.node_of(f)?;
                match reply {
                    Reply::Node(decl) => {
                        self.ast.push_item(unit, decl).located(&self.current)?;
                        Ok(Step::Call(Rule::Declaration))
                    }
                    Reply::Declined if self.at(TokenKind::Eof) => {
                        Ok(Step::Return(Reply::Node(unit)))
                    }
                    Reply::Declined => Err(self.expected_rule("DECLARATION")),
                }
            }
            _ => Err(self.bad_state(f)),
        }
    }

    /// Ordered choice: the state indexes the next alternative to try.
    fn declaration(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        if let Reply::Node(decl) = reply {
            return Ok(Step::Return(Reply::Node(decl)));
        }
        match DECLARATIONS.get(usize::from(f.state)) {
            Some(&rule) => {
                f.state += 1;
                Ok(Step::Call(rule))
            }
            None => Ok(Step::Return(Reply::Declined)),
        }
    }

    fn namespace(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                if !self.eat(TokenKind::Space) {
                    return Ok(Step::Return(Reply::Declined));
                }
                let name = self.optional_identifier()?;
                self.expect(TokenKind::BraceOpen)?;
                f.node = Some(self.ast.namespace(name).located(&self.current)?);
                f.state = 1;
                Ok(Step::Call(Rule::Declaration))
            }
            1 => {
                let namespace = self.node_of(f)?;
                match reply {
                    Reply::Node(item) => {
                        self.ast.push_item(namespace, item).located(&self.current)?;
                        Ok(Step::Call(Rule::Declaration))
                    }
                    Reply::Declined => {
                        self.expect(TokenKind::BraceClose)?;
                        Ok(Step::Return(Reply::Node(namespace)))
                    }
                }
            }
            _ => Err(self.bad_state(f)),
        }
    }

    /// Enums have no nested rules and finish in one turn.
    fn enumeration(&mut self, f: &mut Frame) -> Result<Step, ParseError> {
        if f.state != 0 {
            return Err(self.bad_state(f));
        }
        if !self.eat(TokenKind::Enum) {
            return Ok(Step::Return(Reply::Declined));
        }
        let name = self.optional_identifier()?;
        self.expect(TokenKind::BraceOpen)?;
        let decl = self
            .ast
            .type_decl(TypeTag::Enum, name)
            .located(&self.current)?;

        while self.at(TokenKind::Identifier) {
            let name = self.identifier()?;
            let payload = if self.eat(TokenKind::ParenOpen) {
                let ty_name = self.identifier()?;
                let ty = self.ast.type_ref(None, ty_name).located(&self.current)?;
                self.expect(TokenKind::ParenClose)?;
                Some(ty)
            } else {
                None
            };
            let variant = self.ast.variant(name, payload).located(&self.current)?;
            self.ast.push_member(decl, variant).located(&self.current)?;
            self.eat(TokenKind::Comma);
        }

        self.expect(TokenKind::BraceClose)?;
        Ok(Step::Return(Reply::Node(decl)))
    }

    fn type_decl(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                if !self.eat(TokenKind::Type) {
                    return Ok(Step::Return(Reply::Declined));
                }
                let name = self.optional_identifier()?;
                self.expect(TokenKind::BraceOpen)?;
                f.node = Some(
                    self.ast
                        .type_decl(TypeTag::Struct, name)
                        .located(&self.current)?,
                );
                f.state = 1;
                Ok(Step::Call(Rule::Let))
            }
            1 => {
                let decl = self.node_of(f)?;
                match reply {
                    Reply::Node(member) => {
                        self.ast.push_member(decl, member).located(&self.current)?;
                        Ok(Step::Call(Rule::Let))
                    }
                    Reply::Declined => {
                        self.expect(TokenKind::BraceClose)?;
                        Ok(Step::Return(Reply::Node(decl)))
                    }
                }
            }
            _ => Err(self.bad_state(f)),
        }
    }

    fn let_binding(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                if !self.eat(TokenKind::Let) {
                    return Ok(Step::Return(Reply::Declined));
                }
                let name = self.identifier()?;
                f.node = Some(self.ast.let_binding(name).located(&self.current)?);
                if self.eat(TokenKind::Colon) {
                    f.state = 1;
                    return Ok(Step::Call(Rule::TypeRef));
                }
                self.let_value(f)
            }
            // type annotation
            1 => match reply {
                Reply::Node(ty) => {
                    let binding = self.node_of(f)?;
                    self.ast.set_let_type(binding, ty).located(&self.current)?;
                    self.let_value(f)
                }
                Reply::Declined => Err(self.expected_token(TokenKind::Identifier)),
            },
            // value: 2 for an expression or declaration, 3 for a method
            2 | 3 => match reply {
                Reply::Node(value) => {
                    let binding = self.node_of(f)?;
                    self.ast
                        .set_let_value(binding, value)
                        .located(&self.current)?;
                    Ok(Step::Return(Reply::Node(binding)))
                }
                Reply::Declined if f.state == 3 => Err(self.expected_rule("METHOD")),
                Reply::Declined => Err(self.expected_rule("EXPRESSION")),
            },
            _ => Err(self.bad_state(f)),
        }
    }

    fn let_value(&mut self, f: &mut Frame) -> Result<Step, ParseError> {
        if !self.eat(TokenKind::Equal) {
            return Ok(Step::Return(Reply::Node(self.node_of(f)?)));
        }
        f.state = 2;
        let rule = match self.peek() {
            TokenKind::Space => Rule::Namespace,
            TokenKind::Enum => Rule::Enum,
            TokenKind::Type => Rule::TypeDecl,
            TokenKind::ParenOpen => {
                f.state = 3;
                Rule::Method
            }
            _ => Rule::Expression,
        };
        Ok(Step::Call(rule))
    }

    fn function(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        if f.state != 0 {
            return self.method_tail(f, reply);
        }
        if !self.eat(TokenKind::Func) {
            return Ok(Step::Return(Reply::Declined));
        }
        let name = self.identifier()?;
        self.expect(TokenKind::ParenOpen)?;
        f.node = Some(self.ast.method(Some(name)).located(&self.current)?);
        f.state = 1;
        Ok(Step::Call(Rule::ParamList))
    }

    /// An anonymous method, written as a `let` value.
    fn method(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        if f.state != 0 {
            return self.method_tail(f, reply);
        }
        if !self.eat(TokenKind::ParenOpen) {
            return Ok(Step::Return(Reply::Declined));
        }
        f.node = Some(self.ast.method(None).located(&self.current)?);
        f.state = 1;
        Ok(Step::Call(Rule::ParamList))
    }

    /// Shared by named and anonymous methods, after the opening `(`.
    fn method_tail(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        let method = self.node_of(f)?;
        match f.state {
            // parameters; an empty list is still recorded
            1 => {
                let params = match reply {
                    Reply::Node(list) => list,
                    Reply::Declined => self.ast.param_list(),
                };
                self.ast
                    .set_method_params(method, params)
                    .located(&self.current)?;
                self.expect(TokenKind::ParenClose)?;
                f.state = 2;
                Ok(Step::Call(Rule::TypeRef))
            }
            // optional return type
            2 => {
                if let Reply::Node(ty) = reply {
                    self.ast
                        .set_method_return(method, ty)
                        .located(&self.current)?;
                }
                f.state = 3;
                Ok(Step::Call(Rule::Scope))
            }
            3 => match reply {
                Reply::Node(body) => {
                    self.ast
                        .set_method_body(method, body)
                        .located(&self.current)?;
                    Ok(Step::Return(Reply::Node(method)))
                }
                Reply::Declined => Err(self.expected_rule("SCOPE")),
            },
            _ => Err(self.bad_state(f)),
        }
    }

    fn param_list(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                f.state = 1;
                Ok(Step::Call(Rule::Param))
            }
            // first parameter, optional
            1 => match reply {
                Reply::Node(param) => {
                    let list = self.ast.param_list();
                    f.node = Some(list);
                    self.ast.push_param(list, param).located(&self.current)?;
                    self.next_param(f)
                }
                Reply::Declined => Ok(Step::Return(Reply::Declined)),
            },
            // after a comma, required
            2 => match reply {
                Reply::Node(param) => {
                    let list = self.node_of(f)?;
                    self.ast.push_param(list, param).located(&self.current)?;
                    self.next_param(f)
                }
                Reply::Declined => Err(self.expected_rule("PARAMETER")),
            },
            _ => Err(self.bad_state(f)),
        }
    }

    fn next_param(&mut self, f: &mut Frame) -> Result<Step, ParseError> {
        if self.eat(TokenKind::Comma) {
            f.state = 2;
            return Ok(Step::Call(Rule::Param));
        }
        Ok(Step::Return(Reply::Node(self.node_of(f)?)))
    }

    fn param(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                if !self.at(TokenKind::Identifier) {
                    return Ok(Step::Return(Reply::Declined));
                }
                let name = self.identifier()?;
                let param = self.ast.param(name).located(&self.current)?;
                if !self.eat(TokenKind::Colon) {
                    return Ok(Step::Return(Reply::Node(param)));
                }
                f.node = Some(param);
                f.state = 1;
                Ok(Step::Call(Rule::TypeRef))
            }
            1 => match reply {
                Reply::Node(ty) => {
                    let param = self.node_of(f)?;
                    self.ast.set_param_type(param, ty).located(&self.current)?;
                    Ok(Step::Return(Reply::Node(param)))
                }
                Reply::Declined => Err(self.expected_token(TokenKind::Identifier)),
            },
            _ => Err(self.bad_state(f)),
        }
    }

    fn type_ref(&mut self, f: &mut Frame) -> Result<Step, ParseError> {
        if f.state != 0 {
            return Err(self.bad_state(f));
        }
        let qualifier = match self.peek() {
            TokenKind::Const => Some(Qualifier::Const),
            TokenKind::Static => Some(Qualifier::Static),
            TokenKind::Identifier => None,
            _ => return Ok(Step::Return(Reply::Declined)),
        };
        if qualifier.is_some() {
            self.bump();
        }
        let name = self.identifier()?;
        let ty = self.ast.type_ref(qualifier, name).located(&self.current)?;
        Ok(Step::Return(Reply::Node(ty)))
    }

    // =========================================================================
    // Scopes and statements
    // =========================================================================

    fn scope(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                if !self.eat(TokenKind::BraceOpen) {
                    return Ok(Step::Return(Reply::Declined));
                }
                f.node = Some(self.ast.scope());
                f.state = 1;
                Ok(Step::Call(Rule::Declaration))
            }
            1 => {
                let scope = self.node_of(f)?;
                match reply {
                    Reply::Node(decl) => {
                        self.ast
                            .push_declaration(scope, decl)
                            .located(&self.current)?;
                        Ok(Step::Call(Rule::Declaration))
                    }
                    Reply::Declined => {
                        f.state = 2;
                        Ok(Step::Call(Rule::Statement))
                    }
                }
            }
            2 => {
                let scope = self.node_of(f)?;
                match reply {
                    Reply::Node(stmt) => {
                        self.ast
                            .push_statement(scope, stmt)
                            .located(&self.current)?;
                        Ok(Step::Call(Rule::Statement))
                    }
                    Reply::Declined => {
                        self.expect(TokenKind::BraceClose)?;
                        Ok(Step::Return(Reply::Node(scope)))
                    }
                }
            }
            _ => Err(self.bad_state(f)),
        }
    }

    fn statement(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => match self.peek() {
                TokenKind::Identifier => {
                    f.aux = Some(self.identifier()?);
                    self.expect(TokenKind::Equal)?;
                    f.state = 1;
                    Ok(Step::Call(Rule::Expression))
                }
                TokenKind::If => {
                    self.bump();
                    f.state = 2;
                    Ok(Step::Call(Rule::Expression))
                }
                TokenKind::Match => {
                    self.bump();
                    f.state = 4;
                    Ok(Step::Call(Rule::Expression))
                }
                _ => Ok(Step::Return(Reply::Declined)),
            },
            // assignment value
            1 => {
                let value = self.required(reply, "EXPRESSION")?;
                let target = self.aux_of(f)?;
                let stmt = self.ast.assign(target, value).located(&self.current)?;
                Ok(Step::Return(Reply::Node(stmt)))
            }
            // if condition, then body
            2 => {
                f.aux = Some(self.required(reply, "EXPRESSION")?);
                f.state = 3;
                Ok(Step::Call(Rule::Scope))
            }
            3 => {
                let body = self.required(reply, "SCOPE")?;
                let condition = self.aux_of(f)?;
                let stmt = self
                    .ast
                    .if_statement(condition, body)
                    .located(&self.current)?;
                Ok(Step::Return(Reply::Node(stmt)))
            }
            // match subject
            4 => {
                let subject = self.required(reply, "EXPRESSION")?;
                f.node = Some(
                    self.ast
                        .match_statement(subject)
                        .located(&self.current)?,
                );
                self.expect(TokenKind::BraceOpen)?;
                self.next_arm(f)
            }
            // first pattern of an arm; declining ends the arm list
            5 => match reply {
                Reply::Node(pattern) => {
                    let arm = self.ast.arm();
                    f.aux = Some(arm);
                    self.ast.push_pattern(arm, pattern).located(&self.current)?;
                    self.arm_patterns(f)
                }
                Reply::Declined => {
                    self.expect(TokenKind::BraceClose)?;
                    Ok(Step::Return(Reply::Node(self.node_of(f)?)))
                }
            },
            // pattern after a comma
            6 => {
                let pattern = self.required(reply, "EXPRESSION")?;
                let arm = self.aux_of(f)?;
                self.ast.push_pattern(arm, pattern).located(&self.current)?;
                self.arm_patterns(f)
            }
            // arm body; 8 is the wildcard arm, which must come last
            7 | 8 => {
                let body = self.required(reply, "SCOPE")?;
                let arm = self.aux_of(f)?;
                let stmt = self.node_of(f)?;
                self.ast.set_arm_body(arm, body).located(&self.current)?;
                self.ast.push_arm(stmt, arm).located(&self.current)?;
                if f.state == 7 {
                    return self.next_arm(f);
                }
                self.expect(TokenKind::BraceClose)?;
                Ok(Step::Return(Reply::Node(stmt)))
            }
            _ => Err(self.bad_state(f)),
        }
    }

    fn next_arm(&mut self, f: &mut Frame) -> Result<Step, ParseError> {
        if self.eat(TokenKind::Underscore) {
            self.expect(TokenKind::Arrow)?;
            f.aux = Some(self.ast.arm());
            f.state = 8;
            return Ok(Step::Call(Rule::Scope));
        }
        f.aux = None;
        f.state = 5;
        Ok(Step::Call(Rule::Expression))
    }

    fn arm_patterns(&mut self, f: &mut Frame) -> Result<Step, ParseError> {
        if self.eat(TokenKind::Comma) {
            f.state = 6;
            return Ok(Step::Call(Rule::Expression));
        }
        self.expect(TokenKind::Arrow)?;
        f.state = 7;
        Ok(Step::Call(Rule::Scope))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Left-folding chain of `operand (op operand)*`, shared by the additive
    /// and multiplicative levels.
    fn binary_chain(
        &mut self,
        f: &mut Frame,
        reply: Reply,
        operand: Rule,
        operator: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                f.state = 1;
                Ok(Step::Call(operand))
            }
            1 => match reply {
                Reply::Node(lhs) => {
                    f.node = Some(lhs);
                    self.next_operator(f, operand, operator)
                }
                Reply::Declined => Ok(Step::Return(Reply::Declined)),
            },
            2 => {
                let rhs = self.required(reply, "EXPRESSION")?;
                let lhs = self.node_of(f)?;
                let op = f
                    .binary
                    .take()
                    .ok_or_else(|| self.internal("binary operand without an operator"))?;
                f.node = Some(self.ast.binary(op, lhs, rhs).located(&self.current)?);
                self.next_operator(f, operand, operator)
            }
            _ => Err(self.bad_state(f)),
        }
    }

    fn next_operator(
        &mut self,
        f: &mut Frame,
        operand: Rule,
        operator: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Result<Step, ParseError> {
        match operator(self.peek()) {
            Some(op) => {
                self.bump();
                f.binary = Some(op);
                f.state = 2;
                Ok(Step::Call(operand))
            }
            None => Ok(Step::Return(Reply::Node(self.node_of(f)?))),
        }
    }

    fn factor(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                f.unary = match self.peek() {
                    TokenKind::Minus => Some(UnaryOp::Neg),
                    TokenKind::Bang => Some(UnaryOp::Not),
                    _ => None,
                };
                if f.unary.is_some() {
                    self.bump();
                }
                f.state = 1;
                Ok(Step::Call(Rule::Value))
            }
            1 => match (reply, f.unary) {
                (Reply::Node(value), Some(op)) => {
                    let node = self.ast.unary(op, value).located(&self.current)?;
                    Ok(Step::Return(Reply::Node(node)))
                }
                (Reply::Node(value), None) => Ok(Step::Return(Reply::Node(value))),
                (Reply::Declined, Some(_)) => Err(self.expected_rule("EXPRESSION")),
                (Reply::Declined, None) => Ok(Step::Return(Reply::Declined)),
            },
            _ => Err(self.bad_state(f)),
        }
    }

    fn value(&mut self, f: &mut Frame, reply: Reply) -> Result<Step, ParseError> {
        match f.state {
            0 => {
                let node = match self.peek() {
                    TokenKind::Literal => {
                        let mut token = self.bump();
                        let literal = token
                            .take_literal()
                            .ok_or_else(|| self.internal("literal token without a value"))?;
                        self.ast.literal(literal)
                    }
                    TokenKind::Identifier => self.identifier()?,
                    TokenKind::ConstPi => self.constant(std::f64::consts::PI),
                    TokenKind::ConstTau => self.constant(std::f64::consts::TAU),
                    TokenKind::ConstInf => self.constant(f64::INFINITY),
                    TokenKind::ConstNan => self.constant(f64::NAN),
                    TokenKind::ParenOpen => {
                        self.bump();
                        f.state = 1;
                        return Ok(Step::Call(Rule::Expression));
                    }
                    _ => return Ok(Step::Return(Reply::Declined)),
                };
                Ok(Step::Return(Reply::Node(node)))
            }
            1 => {
                let inner = self.required(reply, "EXPRESSION")?;
                self.expect(TokenKind::ParenClose)?;
                Ok(Step::Return(Reply::Node(inner)))
            }
            _ => Err(self.bad_state(f)),
        }
    }

    fn constant(&mut self, value: f64) -> NodeId {
        self.bump();
        self.ast.literal(Literal::Float(value))
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn peek(&self) -> TokenKind {
        self.current.kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consume the current token and return it.
    fn bump(&mut self) -> Token {
        let next = self.scanner.advance();
        mem::replace(&mut self.current, next)
    }

    /// Consume the current token if it is `kind`.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.expected_token(kind))
        }
    }

    /// Consume an identifier token into an identifier node.
    fn identifier(&mut self) -> Result<NodeId, ParseError> {
        let token = self.expect(TokenKind::Identifier)?;
        let name = token
            .name()
            .ok_or_else(|| self.internal("identifier token without a name"))?;
        Ok(self.ast.named_identifier(name))
    }

    fn optional_identifier(&mut self) -> Result<Option<NodeId>, ParseError> {
        if self.at(TokenKind::Identifier) {
            self.identifier().map(Some)
        } else {
            Ok(None)
        }
    }

    /// A sub-rule result that may not be missing at this point.
    fn required(&self, reply: Reply, rule: &'static str) -> Result<NodeId, ParseError> {
        match reply {
            Reply::Node(node) => Ok(node),
            Reply::Declined => Err(self.expected_rule(rule)),
        }
    }

    fn node_of(&self, f: &Frame) -> Result<NodeId, ParseError> {
        f.node
            .ok_or_else(|| self.internal(format!("{:?} has no node in state {}", f.rule, f.state)))
    }

    fn aux_of(&self, f: &Frame) -> Result<NodeId, ParseError> {
        f.aux.ok_or_else(|| {
            self.internal(format!("{:?} lost its pending node in state {}", f.rule, f.state))
        })
    }

    fn expected_token(&self, kind: TokenKind) -> ParseError {
        ParseError::expected(Expected::Token(kind), &self.current)
    }

    fn expected_rule(&self, rule: &'static str) -> ParseError {
        ParseError::expected(Expected::Rule(rule), &self.current)
    }

    fn internal(&self, message: impl Into<String>) -> ParseError {
        ParseError::internal(message, &self.current)
    }

    fn bad_state(&self, f: &Frame) -> ParseError {
        self.internal(format!("{:?} has no state {}", f.rule, f.state))
    }
}

fn additive(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        _ => None,
    }
}

fn multiplicative(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        _ => None,
    }
}
