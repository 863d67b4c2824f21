//! Debug dump of a syntax tree.
//!
//! One line per node, children nested in indented `{ }` blocks. Identifiers
//! are shown by their pseudo-name, so the dump reflects exactly what the tree
//! knows. The walk uses an explicit work list and handles trees of any depth.

use crate::ast::{Ast, Node, NodeId, TreeError, TypeTag};

const INDENT: &str = "  ";

enum Item {
    Open(NodeId, usize),
    Close(usize),
}

/// Dump the whole tree. An empty arena dumps as an empty string.
pub fn dump(ast: &Ast) -> Result<String, TreeError> {
    match ast.root() {
        Some(root) => dump_node(ast, root),
        None => Ok(String::new()),
    }
}

/// Dump the subtree rooted at `id`.
pub fn dump_node(ast: &Ast, id: NodeId) -> Result<String, TreeError> {
    let mut out = String::new();
    let mut work = vec![Item::Open(id, 0)];

    while let Some(item) = work.pop() {
        match item {
            Item::Open(id, depth) => {
                let (label, children) = outline(ast, id)?;
                out.push_str(&INDENT.repeat(depth));
                out.push_str(&label);
                if children.is_empty() {
                    out.push('\n');
                    continue;
                }
                out.push_str(" {\n");
                work.push(Item::Close(depth));
                work.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|child| Item::Open(child, depth + 1)),
                );
            }
            Item::Close(depth) => {
                out.push_str(&INDENT.repeat(depth));
                out.push_str("}\n");
            }
        }
    }

    Ok(out)
}

/// Label line and ordered children of one node.
fn outline(ast: &Ast, id: NodeId) -> Result<(String, Vec<NodeId>), TreeError> {
    let node = ast.node(id)?;
    let kind = node.kind_name();
    let outline = match node {
        Node::Identifier(ident) => (format!("{kind} {ident}"), Vec::new()),
        Node::Namespace(space) => (labeled(ast, kind, space.name)?, space.items.clone()),
        Node::Scope(scope) => {
            let mut children = scope.declarations.clone();
            children.extend(&scope.statements);
            (kind.to_string(), children)
        }
        Node::Let(binding) => (
            labeled(ast, kind, Some(binding.name))?,
            present([binding.ty, binding.value]),
        ),
        Node::Method(method) => (
            labeled(ast, kind, method.name)?,
            present([method.params, method.ret, method.body]),
        ),
        Node::Type(decl) => {
            let head = match (decl.tag, decl.qualifier) {
                (TypeTag::Interface, Some(qualifier)) => {
                    format!("{kind} {}", qualifier.keyword())
                }
                (TypeTag::Interface, None) => kind.to_string(),
                (TypeTag::Struct, _) => format!("{kind} struct"),
                (TypeTag::Enum, _) => format!("{kind} enum"),
            };
            (labeled(ast, &head, decl.name)?, decl.members.clone())
        }
        Node::Variant(variant) => (
            labeled(ast, kind, Some(variant.name))?,
            present([variant.payload]),
        ),
        Node::Param(param) => (labeled(ast, kind, Some(param.name))?, present([param.ty])),
        Node::ParamList(list) => (kind.to_string(), list.params.clone()),
        Node::Literal(literal) => (
            format!("{kind} {} {literal}", literal.type_name()),
            Vec::new(),
        ),
        Node::Unary(unary) => (format!("{kind} {}", unary.op.symbol()), vec![unary.operand]),
        Node::Binary(binary) => (
            format!("{kind} {}", binary.op.symbol()),
            vec![binary.lhs, binary.rhs],
        ),
        Node::Assign(assign) => (labeled(ast, kind, Some(assign.target))?, vec![assign.value]),
        Node::If(stmt) => (kind.to_string(), vec![stmt.condition, stmt.body]),
        Node::Match(stmt) => {
            let mut children = vec![stmt.subject];
            children.extend(&stmt.arms);
            (kind.to_string(), children)
        }
        Node::Arm(arm) => {
            let label = if arm.is_wildcard() {
                format!("{kind} _")
            } else {
                kind.to_string()
            };
            let mut children = arm.patterns.clone();
            children.extend(arm.body);
            (label, children)
        }
    };
    Ok(outline)
}

fn labeled(ast: &Ast, head: &str, name: Option<NodeId>) -> Result<String, TreeError> {
    match name {
        Some(name) => Ok(format!("{head} {}", ast.ident(name)?)),
        None => Ok(head.to_string()),
    }
}

fn present<const N: usize>(slots: [Option<NodeId>; N]) -> Vec<NodeId> {
    slots.into_iter().flatten().collect()
}
