//! Normalized source writer.
//!
//! Writes a tree back out as lama source: one declaration or statement per
//! line, four-space indentation, and parentheses only where precedence or
//! left-associativity needs them. Identifiers use the arena's recorded
//! spelling, or their pseudo-name when none was recorded. Parsing the output
//! and writing it again yields the same text.

use lama_lexer::{Literal, MAX_NUMBER_LEN};

use crate::ast::{Ast, BinaryOp, Method, Node, NodeId, TreeError, TypeTag};

const INDENT: &str = "    ";

/// Write the whole tree as source.
pub fn to_source(ast: &Ast) -> Result<String, TreeError> {
    let mut writer = Writer {
        ast,
        out: String::new(),
        depth: 0,
        work: Vec::new(),
    };
    if let Some(root) = ast.root() {
        writer.unit(root)?;
    }
    Ok(writer.out)
}

/// One pending piece of output. Structural tasks expand into smaller ones,
/// so nesting depth costs work-list entries instead of native stack.
#[derive(Debug, Clone, Copy)]
enum Task {
    Text(&'static str),
    Newline,
    Indent,
    Open,
    Close,
    Name(NodeId),
    Literal(NodeId),
    Declaration(NodeId),
    Param(NodeId),
    TypeRef(NodeId),
    Scope(NodeId),
    Statement(NodeId),
    Arm(NodeId),
    Expression(NodeId),
}

struct Writer<'a> {
    ast: &'a Ast,
    out: String,
    depth: usize,
    work: Vec<Task>,
}

impl Writer<'_> {
    fn unit(&mut self, root: NodeId) -> Result<(), TreeError> {
        let mut seq = Vec::new();
        match self.ast.node(root)? {
            Node::Namespace(space) if space.name.is_none() => {
                for &item in &space.items {
                    line(&mut seq, Task::Declaration(item));
                }
            }
            _ => line(&mut seq, Task::Declaration(root)),
        }
        self.schedule(seq);
        self.drain()
    }

    /// Queue `seq` so that its first task runs next.
    fn schedule(&mut self, seq: Vec<Task>) {
        self.work.extend(seq.into_iter().rev());
    }

    fn drain(&mut self) -> Result<(), TreeError> {
        while let Some(task) = self.work.pop() {
            let seq = match task {
                Task::Text(text) => {
                    self.out.push_str(text);
                    continue;
                }
                Task::Newline => {
                    self.out.push('\n');
                    continue;
                }
                Task::Indent => {
                    for _ in 0..self.depth {
                        self.out.push_str(INDENT);
                    }
                    continue;
                }
                Task::Open => {
                    self.depth += 1;
                    continue;
                }
                Task::Close => {
                    self.depth = self.depth.saturating_sub(1);
                    continue;
                }
                Task::Name(id) => {
                    self.name(id)?;
                    continue;
                }
                Task::Literal(id) => {
                    match self.ast.node(id)? {
                        Node::Literal(literal) => write_literal(&mut self.out, literal),
                        other => return Err(mismatch(id, "literal", other)),
                    }
                    continue;
                }
                Task::Declaration(id) => self.declaration(id)?,
                Task::Param(id) => self.param(id)?,
                Task::TypeRef(id) => self.type_ref(id)?,
                Task::Scope(id) => self.scope(id)?,
                Task::Statement(id) => self.statement(id)?,
                Task::Arm(id) => self.arm(id)?,
                Task::Expression(id) => self.expression(id)?,
            };
            self.schedule(seq);
        }
        Ok(())
    }

    // --- Declarations ---

    fn declaration(&self, id: NodeId) -> Result<Vec<Task>, TreeError> {
        let mut seq = Vec::new();
        match self.ast.node(id)? {
            Node::Namespace(space) => {
                seq.push(Task::Text("space "));
                optional_name(&mut seq, space.name);
                block(&mut seq, &space.items, Task::Declaration);
            }
            Node::Let(binding) => {
                seq.push(Task::Text("let "));
                seq.push(Task::Name(binding.name));
                if let Some(ty) = binding.ty {
                    seq.push(Task::Text(": "));
                    seq.push(Task::TypeRef(ty));
                }
                if let Some(value) = binding.value {
                    seq.push(Task::Text(" = "));
                    seq.push(match self.ast.node(value)? {
                        Node::Namespace(_) | Node::Type(_) | Node::Method(_) => {
                            Task::Declaration(value)
                        }
                        _ => Task::Expression(value),
                    });
                }
            }
            Node::Method(method) => {
                if let Some(name) = method.name {
                    seq.push(Task::Text("func "));
                    seq.push(Task::Name(name));
                }
                self.signature(&mut seq, method)?;
            }
            Node::Type(decl) => match decl.tag {
                TypeTag::Struct => {
                    seq.push(Task::Text("type "));
                    optional_name(&mut seq, decl.name);
                    block(&mut seq, &decl.members, Task::Declaration);
                }
                TypeTag::Enum => {
                    seq.push(Task::Text("enum "));
                    optional_name(&mut seq, decl.name);
                    self.variants(&mut seq, &decl.members)?;
                }
                TypeTag::Interface => seq.push(Task::TypeRef(id)),
            },
            other => return Err(mismatch(id, "declaration", other)),
        }
        Ok(seq)
    }

    /// `(params) Ret { body }`, shared by named and anonymous methods.
    fn signature(&self, seq: &mut Vec<Task>, method: &Method) -> Result<(), TreeError> {
        seq.push(Task::Text("("));
        if let Some(list) = method.params {
            let params = match self.ast.node(list)? {
                Node::ParamList(list) => &list.params,
                other => return Err(mismatch(list, "params", other)),
            };
            for (i, &param) in params.iter().enumerate() {
                if i > 0 {
                    seq.push(Task::Text(", "));
                }
                seq.push(Task::Param(param));
            }
        }
        seq.push(Task::Text(") "));
        if let Some(ret) = method.ret {
            seq.push(Task::TypeRef(ret));
            seq.push(Task::Text(" "));
        }
        seq.push(match method.body {
            Some(body) => Task::Scope(body),
            None => Task::Text("{}"),
        });
        Ok(())
    }

    fn param(&self, id: NodeId) -> Result<Vec<Task>, TreeError> {
        match self.ast.node(id)? {
            Node::Param(param) => {
                let mut seq = vec![Task::Name(param.name)];
                if let Some(ty) = param.ty {
                    seq.push(Task::Text(": "));
                    seq.push(Task::TypeRef(ty));
                }
                Ok(seq)
            }
            other => Err(mismatch(id, "param", other)),
        }
    }

    fn type_ref(&self, id: NodeId) -> Result<Vec<Task>, TreeError> {
        match self.ast.node(id)? {
            Node::Type(decl) if decl.tag == TypeTag::Interface => {
                let mut seq = Vec::new();
                if let Some(qualifier) = decl.qualifier {
                    seq.push(Task::Text(qualifier.keyword()));
                    seq.push(Task::Text(" "));
                }
                match decl.name {
                    Some(name) => seq.push(Task::Name(name)),
                    None => {
                        return Err(TreeError::WrongVariant {
                            node: id,
                            expected: "named type",
                            found: "type",
                        })
                    }
                }
                Ok(seq)
            }
            other => Err(mismatch(id, "type reference", other)),
        }
    }

    fn variants(&self, seq: &mut Vec<Task>, members: &[NodeId]) -> Result<(), TreeError> {
        if members.is_empty() {
            seq.push(Task::Text("{}"));
            return Ok(());
        }
        seq.extend([Task::Text("{"), Task::Newline, Task::Open]);
        for (i, &member) in members.iter().enumerate() {
            seq.push(Task::Indent);
            match self.ast.node(member)? {
                Node::Variant(variant) => {
                    seq.push(Task::Name(variant.name));
                    if let Some(payload) = variant.payload {
                        seq.extend([Task::Text("("), Task::TypeRef(payload), Task::Text(")")]);
                    }
                }
                other => return Err(mismatch(member, "variant", other)),
            }
            if i + 1 < members.len() {
                seq.push(Task::Text(","));
            }
            seq.push(Task::Newline);
        }
        seq.extend([Task::Close, Task::Indent, Task::Text("}")]);
        Ok(())
    }

    // --- Scopes and statements ---

    fn scope(&self, id: NodeId) -> Result<Vec<Task>, TreeError> {
        let scope = match self.ast.node(id)? {
            Node::Scope(scope) => scope,
            other => return Err(mismatch(id, "scope", other)),
        };
        if scope.declarations.is_empty() && scope.statements.is_empty() {
            return Ok(vec![Task::Text("{}")]);
        }
        let mut seq = vec![Task::Text("{"), Task::Newline, Task::Open];
        for &decl in &scope.declarations {
            line(&mut seq, Task::Declaration(decl));
        }
        for &stmt in &scope.statements {
            line(&mut seq, Task::Statement(stmt));
        }
        seq.extend([Task::Close, Task::Indent, Task::Text("}")]);
        Ok(seq)
    }

    fn statement(&self, id: NodeId) -> Result<Vec<Task>, TreeError> {
        match self.ast.node(id)? {
            Node::Assign(assign) => Ok(vec![
                Task::Name(assign.target),
                Task::Text(" = "),
                Task::Expression(assign.value),
            ]),
            Node::If(stmt) => Ok(vec![
                Task::Text("if "),
                Task::Expression(stmt.condition),
                Task::Text(" "),
                Task::Scope(stmt.body),
            ]),
            Node::Match(stmt) => {
                let mut seq = vec![
                    Task::Text("match "),
                    Task::Expression(stmt.subject),
                    Task::Text(" "),
                ];
                block(&mut seq, &stmt.arms, Task::Arm);
                Ok(seq)
            }
            other => Err(mismatch(id, "statement", other)),
        }
    }

    fn arm(&self, id: NodeId) -> Result<Vec<Task>, TreeError> {
        let arm = match self.ast.node(id)? {
            Node::Arm(arm) => arm,
            other => return Err(mismatch(id, "arm", other)),
        };
        let mut seq = Vec::new();
        if arm.is_wildcard() {
            seq.push(Task::Text("_"));
        }
        for (i, &pattern) in arm.patterns.iter().enumerate() {
            if i > 0 {
                seq.push(Task::Text(", "));
            }
            seq.push(Task::Expression(pattern));
        }
        seq.push(Task::Text(" -> "));
        seq.push(match arm.body {
            Some(body) => Task::Scope(body),
            None => Task::Text("{}"),
        });
        Ok(seq)
    }

    // --- Expressions ---

    fn expression(&self, id: NodeId) -> Result<Vec<Task>, TreeError> {
        let mut seq = Vec::new();
        match self.ast.node(id)? {
            Node::Identifier(_) => seq.push(Task::Name(id)),
            Node::Literal(_) => seq.push(Task::Literal(id)),
            Node::Unary(unary) => {
                seq.push(Task::Text(unary.op.symbol()));
                let nested = matches!(
                    self.ast.node(unary.operand)?,
                    Node::Unary(_) | Node::Binary(_)
                );
                operand(&mut seq, unary.operand, nested);
            }
            Node::Binary(binary) => {
                let level = precedence(binary.op);
                let lhs = self.binary_level(binary.lhs)?;
                let rhs = self.binary_level(binary.rhs)?;
                operand(&mut seq, binary.lhs, lhs.is_some_and(|inner| inner < level));
                seq.push(Task::Text(spaced(binary.op)));
                operand(&mut seq, binary.rhs, rhs.is_some_and(|inner| inner <= level));
            }
            other => return Err(mismatch(id, "expression", other)),
        }
        Ok(seq)
    }

    /// Precedence of `id` when it is a binary expression.
    fn binary_level(&self, id: NodeId) -> Result<Option<u8>, TreeError> {
        match self.ast.node(id)? {
            Node::Binary(inner) => Ok(Some(precedence(inner.op))),
            _ => Ok(None),
        }
    }

    // --- Names ---

    fn name(&mut self, id: NodeId) -> Result<(), TreeError> {
        let ident = self.ast.ident(id)?;
        match self.ast.spelling(ident) {
            Some(spelling) => self.out.push_str(spelling),
            None => self.out.push_str(&ident.pseudo_name()),
        }
        Ok(())
    }
}

fn line(seq: &mut Vec<Task>, task: Task) {
    seq.extend([Task::Indent, task, Task::Newline]);
}

fn block(seq: &mut Vec<Task>, children: &[NodeId], task: fn(NodeId) -> Task) {
    if children.is_empty() {
        seq.push(Task::Text("{}"));
        return;
    }
    seq.extend([Task::Text("{"), Task::Newline, Task::Open]);
    for &child in children {
        line(seq, task(child));
    }
    seq.extend([Task::Close, Task::Indent, Task::Text("}")]);
}

/// A name followed by a space, or nothing.
fn optional_name(seq: &mut Vec<Task>, name: Option<NodeId>) {
    if let Some(name) = name {
        seq.extend([Task::Name(name), Task::Text(" ")]);
    }
}

fn operand(seq: &mut Vec<Task>, id: NodeId, wrap: bool) {
    if wrap {
        seq.extend([Task::Text("("), Task::Expression(id), Task::Text(")")]);
    } else {
        seq.push(Task::Expression(id));
    }
}

fn spaced(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => " + ",
        BinaryOp::Sub => " - ",
        BinaryOp::Mul => " * ",
        BinaryOp::Div => " / ",
    }
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Sub => 1,
        BinaryOp::Mul | BinaryOp::Div => 2,
    }
}

fn write_literal(out: &mut String, literal: &Literal) {
    match literal {
        Literal::Int(n) => out.push_str(&n.to_string()),
        Literal::Float(n) if n.is_nan() => out.push_str("nan"),
        Literal::Float(n) if n.is_infinite() => {
            if n.is_sign_negative() {
                out.push('-');
            }
            out.push_str("inf");
        }
        Literal::Float(n) => {
            let text = n.to_string();
            out.push_str(&text);
            if !text.contains('.') {
                // A bare trailing dot still lexes as a float when `.0` would
                // push the literal past the number length limit.
                if text.len() + 2 <= MAX_NUMBER_LEN {
                    out.push_str(".0");
                } else {
                    out.push('.');
                }
            }
        }
        Literal::Text(text) => {
            out.push('"');
            for c in text.chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    c => out.push(c),
                }
            }
            out.push('"');
        }
    }
}

fn mismatch(node: NodeId, expected: &'static str, found: &Node) -> TreeError {
    TreeError::WrongVariant {
        node,
        expected,
        found: found.kind_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Ident;
    use crate::parse_source;
    use pretty_assertions::assert_eq;

    fn normalize(text: &str) -> String {
        let ast = parse_source("test.lama", text).unwrap();
        to_source(&ast).unwrap()
    }

    #[test]
    fn test_simple_let() {
        assert_eq!(normalize("let   x=5"), "let x = 5\n");
    }

    #[test]
    fn test_method_layout() {
        let text = "func f(a: Int, b) Int { let y = a x = -(a + b) * 2 \
                    match y { 1, 2 -> { } _ -> { y = 0 } } }";
        assert_eq!(
            normalize(text),
            concat!(
                "func f(a: Int, b) Int {\n",
                "    let y = a\n",
                "    x = -(a + b) * 2\n",
                "    match y {\n",
                "        1, 2 -> {}\n",
                "        _ -> {\n",
                "            y = 0\n",
                "        }\n",
                "    }\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_minimal_parentheses() {
        assert_eq!(normalize("let v = a - (b - c)"), "let v = a - (b - c)\n");
        assert_eq!(normalize("let v = a - b - c"), "let v = a - b - c\n");
        assert_eq!(normalize("let v = a * (b + c)"), "let v = a * (b + c)\n");
        assert_eq!(
            normalize("func f() { x = (a * b) + c }"),
            "func f() {\n    x = a * b + c\n}\n"
        );
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(normalize("let f = 2.0"), "let f = 2.0\n");
        assert_eq!(normalize("let f = 0.25"), "let f = 0.25\n");
        assert_eq!(normalize("let f = inf"), "let f = inf\n");
        assert_eq!(normalize("let f = nan"), "let f = nan\n");
        assert_eq!(normalize("let p = pi"), "let p = 3.141592653589793\n");
    }

    #[test]
    fn test_long_float_keeps_length_limit() {
        let text = format!("let f = 1{}.", "0".repeat(125));
        let once = normalize(&text);
        assert_eq!(once, format!("{text}\n"));
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_text_escapes() {
        let text = "let s = \"say \\\"hi\\\"\\n\\\\\"";
        assert_eq!(normalize(text), format!("{text}\n"));
    }

    #[test]
    fn test_collision_prints_first_spelling() {
        assert_eq!(
            normalize("let costarring = 1\nlet liquid = 2"),
            "let costarring = 1\nlet costarring = 2\n"
        );
    }

    #[test]
    fn test_pseudo_name_without_spelling() {
        let mut ast = Ast::new();
        let unit = ast.namespace(None).unwrap();
        let name = ast.identifier(Ident::from_raw(0));
        let binding = ast.let_binding(name).unwrap();
        ast.push_item(unit, binding).unwrap();
        ast.set_root(unit).unwrap();
        assert_eq!(to_source(&ast).unwrap(), "let AAAAAA\n");
    }

    #[test]
    fn test_enum_and_struct() {
        assert_eq!(
            normalize("enum Shape { Dot Circle(Float), } type { }"),
            "enum Shape {\n    Dot,\n    Circle(Float)\n}\ntype {}\n"
        );
    }

    #[test]
    fn test_deep_expression() {
        let depth = 20_000;
        let text = format!("let v = {}a - 1{}", "a - (".repeat(depth), ")".repeat(depth));
        let once = normalize(&text);
        assert_eq!(once, format!("{text}\n"));
    }

    #[test]
    fn test_deep_scopes() {
        let depth = 1_000;
        let text = format!("func f() {{ {}{} ", "if x { ".repeat(depth), "}".repeat(depth + 1));
        let once = normalize(&text);
        assert_eq!(once.lines().count(), 2 * depth + 1);
        assert_eq!(once.lines().last(), Some("}"));
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_fixpoint() {
        let text = r#"
            space geometry {
                type Point {
                    let x: Int
                    let y: const Int = 0
                }
                enum Shape { Dot, Circle(Float), }
                func area(s: Shape, scale) Float {
                    let r = 2.5
                    r = -(r * scale) / 2 + tau
                    if !ready { done = 1 }
                    match s {
                        1, 2 -> { hits = hits + 1 }
                        _ -> { }
                    }
                }
                let handler = (event: static Event) {
                    label = "clicked \"ok\"\n"
                }
            }
            # trailing comment
            let settings = space { let depth = 3 - (2 - 1) }
        "#;
        let once = normalize(text);
        let twice = normalize(&once);
        assert_eq!(once, twice);
        assert!(once.contains("let handler = (event: static Event) {\n"));
        assert!(once.contains("let settings = space {\n"));
    }
}
