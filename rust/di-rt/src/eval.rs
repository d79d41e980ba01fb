//! The tree-walking evaluator.
//!
//! Evaluation takes `(node, env)` and yields a [`Value`] or a located
//! [`DiError`]. Control flow follows the tree directly; there is no
//! lowering step. DI-level calls are depth-guarded so runaway recursion
//! surfaces as a `RuntimeError` instead of exhausting the host stack.

use di_core::ast::{ArithOp, CmpOp, Ident, NaryOp, Node, NumberLit, Pos, UnaryOp};
use di_core::env::Env;
use di_core::error::{DiError, DiResult};
use di_core::value::{CallableKind, FunctionValue, Value};
use std::rc::Rc;

const MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Default)]
pub struct Evaluator {
    depth: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a root scope against `env`. With `flush` disabled the
    /// top-level bindings persist afterwards (import semantics).
    pub fn eval_program(&mut self, program: &Node, env: &Env, flush: bool) -> DiResult<Value> {
        match program {
            Node::Scope(instructions, _) => self.eval_scope(instructions, env, flush),
            other => self.eval(other, env),
        }
    }

    pub fn eval(&mut self, node: &Node, env: &Env) -> DiResult<Value> {
        match node {
            Node::Number(NumberLit::Int(i), _) => Ok(Value::Int(i.clone())),
            Node::Number(NumberLit::Float(x), _) => Ok(Value::Float(*x)),
            Node::Boolean(b, _) => Ok(Value::Bool(*b)),
            Node::Null(_) => Ok(Value::Null),
            Node::Str(s, _) => Ok(Value::str(s.clone())),
            Node::Identifier(ident) => lookup(env, ident),
            Node::List(elements, _) => self.eval_list(elements, env),
            Node::Scope(instructions, _) => self.eval_scope(instructions, env, true),
            Node::IfElse {
                conditions,
                branches,
                else_scope,
                ..
            } => self.eval_if(conditions, branches, else_scope.as_deref(), env),
            Node::While {
                condition, body, ..
            } => self.eval_while(condition, body, env),
            Node::Assignment {
                targets,
                orders,
                value,
                ..
            } => self.eval_assignment(targets, orders, value, env),
            Node::Operator { op, operands, pos } => self.eval_operator(*op, operands, *pos, env),
            Node::Comparison { ops, operands, pos } => {
                self.eval_comparison(ops, operands, *pos, env)
            }
            Node::LeftPoly { ops, operands, pos } => self.eval_left_poly(ops, operands, *pos, env),
            Node::Unary { op, operand, pos } => self.eval_unary(*op, operand, *pos, env),
            Node::Call { head, groups, pos } => self.eval_call(head, groups, *pos, env),
            Node::Index { head, groups, pos } => self.eval_index(head, groups, *pos, env),
            Node::Attr { head, chain, .. } => self.eval_attr(head, chain, env),
            Node::FunctionDecl { params, body, .. } => {
                Ok(make_callable(params, body, env, CallableKind::Function))
            }
            Node::ClassDecl { params, body, .. } => {
                Ok(make_callable(params, body, env, CallableKind::Class))
            }
            Node::Ellipsis { pos, .. } => Err(DiError::runtime_syntax(
                *pos,
                "cannot use '...' outside a list literal or unpack target",
            )),
        }
    }

    /// Evaluate a block. The block's value is its last instruction's value
    /// (Null when empty); names introduced while it ran are dropped on exit
    /// unless flushing is disabled.
    fn eval_scope(&mut self, instructions: &[Node], env: &Env, flush: bool) -> DiResult<Value> {
        let snapshot = if flush { Some(env.snapshot()) } else { None };
        let mut last = Value::Null;
        for instruction in instructions {
            last = self.eval(instruction, env)?;
        }
        if let Some(snapshot) = &snapshot {
            env.flush(snapshot);
        }
        Ok(last)
    }

    fn eval_list(&mut self, elements: &[Node], env: &Env) -> DiResult<Value> {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            if let Node::Ellipsis { inner, pos } = element {
                let value = self.eval(inner, env)?;
                let spliced = iterable_values(&value).ok_or_else(|| {
                    DiError::type_error(
                        *pos,
                        format!("cannot splice a '{}' value into a list", value.type_name()),
                    )
                })?;
                items.extend(spliced);
            } else {
                items.push(self.eval(element, env)?);
            }
        }
        Ok(Value::list(items))
    }

    fn eval_if(
        &mut self,
        conditions: &[Node],
        branches: &[Node],
        else_scope: Option<&Node>,
        env: &Env,
    ) -> DiResult<Value> {
        for (condition, branch) in conditions.iter().zip(branches.iter()) {
            if self.eval(condition, env)?.is_truthy() {
                return self.eval(branch, env);
            }
        }
        match else_scope {
            Some(scope) => self.eval(scope, env),
            None => Ok(Value::Null),
        }
    }

    fn eval_while(&mut self, condition: &Node, body: &Node, env: &Env) -> DiResult<Value> {
        let mut result = Value::Null;
        while self.eval(condition, env)?.is_truthy() {
            result = self.eval(body, env)?;
        }
        Ok(result)
    }

    fn eval_operator(
        &mut self,
        op: NaryOp,
        operands: &[Node],
        pos: Pos,
        env: &Env,
    ) -> DiResult<Value> {
        let last = operands.len() - 1;
        match op {
            // `or` yields the first truthy operand, `and` the first falsy;
            // the deciding operand is never re-evaluated.
            NaryOp::Or => {
                for operand in &operands[..last] {
                    let value = self.eval(operand, env)?;
                    if value.is_truthy() {
                        return Ok(value);
                    }
                }
                self.eval(&operands[last], env)
            }
            NaryOp::And => {
                for operand in &operands[..last] {
                    let value = self.eval(operand, env)?;
                    if !value.is_truthy() {
                        return Ok(value);
                    }
                }
                self.eval(&operands[last], env)
            }
            NaryOp::Pow => {
                let mut value = self.eval(&operands[last], env)?;
                for operand in operands[..last].iter().rev() {
                    let base = self.eval(operand, env)?;
                    value = base.pow(&value).map_err(|e| e.at(operand.pos()))?;
                }
                Ok(value)
            }
            NaryOp::BitOr | NaryOp::BitXor | NaryOp::BitAnd => {
                let mut value = self.eval(&operands[0], env)?;
                for operand in &operands[1..] {
                    let rhs = self.eval(operand, env)?;
                    let folded = match op {
                        NaryOp::BitOr => value.bitor(&rhs),
                        NaryOp::BitXor => value.bitxor(&rhs),
                        _ => value.bitand(&rhs),
                    };
                    value = folded.map_err(|e| e.at(pos))?;
                }
                Ok(value)
            }
        }
    }

    /// Chain comparison: every adjacent pair must hold, each operand is
    /// evaluated once, and the chain short-circuits on the first false
    /// pair.
    fn eval_comparison(
        &mut self,
        ops: &[CmpOp],
        operands: &[Node],
        pos: Pos,
        env: &Env,
    ) -> DiResult<Value> {
        let mut prev = self.eval(&operands[0], env)?;
        for (op, operand) in ops.iter().zip(&operands[1..]) {
            let next = self.eval(operand, env)?;
            if !prev.compare(*op, &next).map_err(|e| e.at(pos))? {
                return Ok(Value::Bool(false));
            }
            prev = next;
        }
        Ok(Value::Bool(true))
    }

    fn eval_left_poly(
        &mut self,
        ops: &[ArithOp],
        operands: &[Node],
        pos: Pos,
        env: &Env,
    ) -> DiResult<Value> {
        let mut value = self.eval(&operands[0], env)?;
        for (op, operand) in ops.iter().zip(&operands[1..]) {
            let rhs = self.eval(operand, env)?;
            let folded = match op {
                ArithOp::Add => value.add(&rhs),
                ArithOp::Sub => value.sub(&rhs),
                ArithOp::Mul => value.mul(&rhs),
                ArithOp::Div => value.div(&rhs),
                ArithOp::FloorDiv => value.floordiv(&rhs),
                ArithOp::Mod => value.rem(&rhs),
                ArithOp::MatMul => value.matmul(&rhs),
                ArithOp::Shl => value.shl(&rhs),
                ArithOp::Shr => value.shr(&rhs),
            };
            value = folded.map_err(|e| e.at(pos))?;
        }
        Ok(value)
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Node, pos: Pos, env: &Env) -> DiResult<Value> {
        let value = self.eval(operand, env)?;
        let result = match op {
            UnaryOp::Plus => value.plus(),
            UnaryOp::Minus => value.neg(),
            UnaryOp::BitNot => value.invert(),
            UnaryOp::Not => return Ok(value.not()),
            UnaryOp::Len => value.length(),
        };
        result.map_err(|e| e.at(pos))
    }

    fn eval_call(
        &mut self,
        head: &Node,
        groups: &[Vec<Node>],
        pos: Pos,
        env: &Env,
    ) -> DiResult<Value> {
        let mut value = self.eval(head, env)?;
        for group in groups {
            let Value::Function(function) = &value else {
                return Err(DiError::type_error(
                    pos,
                    format!("'{}' is not callable", value.type_name()),
                ));
            };
            let function = Rc::clone(function);
            let mut args = Vec::with_capacity(group.len());
            for arg in group {
                args.push(self.eval(arg, env)?);
            }
            value = self.call(&function, args, pos)?;
        }
        Ok(value)
    }

    /// Invoke a function or class factory with already-evaluated arguments.
    pub fn call(&mut self, function: &FunctionValue, args: Vec<Value>, pos: Pos) -> DiResult<Value> {
        if args.len() != function.params.len() {
            return Err(DiError::args_count(
                pos,
                format!(
                    "expected {} argument(s), got {}",
                    function.params.len(),
                    args.len()
                ),
            ));
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(DiError::runtime(pos, "maximum call depth exceeded"));
        }
        self.depth += 1;
        let frame = function.closure.child();
        for (param, arg) in function.params.iter().zip(args) {
            frame.set(param, arg);
        }
        let result = match function.kind {
            CallableKind::Function => self.eval_program(&function.body, &frame, true),
            // A class body runs with flushing disabled; the resulting frame,
            // flattened with everything it captured, is the instance.
            CallableKind::Class => self
                .eval_program(&function.body, &frame, false)
                .map(|_| Value::dict(frame.flatten())),
        };
        self.depth -= 1;
        result
    }

    fn eval_index(
        &mut self,
        head: &Node,
        groups: &[Vec<Node>],
        pos: Pos,
        env: &Env,
    ) -> DiResult<Value> {
        let mut value = self.eval(head, env)?;
        for group in groups {
            for index_expr in group {
                let idx = self.eval(index_expr, env)?;
                value = value.index(&idx).map_err(|e| e.at(pos))?;
            }
        }
        Ok(value)
    }

    fn eval_attr(&mut self, head: &Node, chain: &[Ident], env: &Env) -> DiResult<Value> {
        let mut value = self.eval(head, env)?;
        for ident in chain {
            value = value.attr(&ident.name).map_err(|e| e.at(ident.pos))?;
        }
        Ok(value)
    }

    /// Right-to-left assignment chain: the rightmost value flows into each
    /// target in turn, and a swap (`=:`) link replaces it with the target's
    /// previous value for the links further left.
    fn eval_assignment(
        &mut self,
        targets: &[Node],
        orders: &[bool],
        value: &Node,
        env: &Env,
    ) -> DiResult<Value> {
        let mut acc = self.eval(value, env)?;
        for (target, return_old) in targets.iter().zip(orders.iter()).rev() {
            acc = self.assign(target, acc, *return_old, env)?;
        }
        Ok(acc)
    }

    fn assign(
        &mut self,
        target: &Node,
        value: Value,
        return_old: bool,
        env: &Env,
    ) -> DiResult<Value> {
        match target {
            Node::Identifier(ident) => {
                let old = if return_old {
                    Some(lookup(env, ident)?)
                } else {
                    None
                };
                env.set(&ident.name, value.clone());
                Ok(old.unwrap_or(value))
            }
            Node::Index { head, groups, pos } => {
                let mut container = self.eval(head, env)?;
                let mut indices = Vec::new();
                for group in groups {
                    for index_expr in group {
                        indices.push(self.eval(index_expr, env)?);
                    }
                }
                let Some((last, init)) = indices.split_last() else {
                    return Err(DiError::runtime_syntax(
                        *pos,
                        "cannot assign through an empty subscript",
                    ));
                };
                for idx in init {
                    container = container.index(idx).map_err(|e| e.at(*pos))?;
                }
                let old = if return_old {
                    Some(container.index(last).map_err(|e| e.at(*pos))?)
                } else {
                    None
                };
                container
                    .set_index(last, value.clone())
                    .map_err(|e| e.at(*pos))?;
                Ok(old.unwrap_or(value))
            }
            Node::Attr { head, chain, pos } => {
                let mut container = self.eval(head, env)?;
                let Some((last, init)) = chain.split_last() else {
                    return Err(DiError::runtime_syntax(
                        *pos,
                        "cannot assign through an empty member access",
                    ));
                };
                for ident in init {
                    container = container.attr(&ident.name).map_err(|e| e.at(ident.pos))?;
                }
                let old = if return_old {
                    Some(container.attr(&last.name).map_err(|e| e.at(last.pos))?)
                } else {
                    None
                };
                container
                    .set_attr(&last.name, value.clone())
                    .map_err(|e| e.at(last.pos))?;
                Ok(old.unwrap_or(value))
            }
            Node::List(pattern, pos) => self.assign_pattern(pattern, value, return_old, *pos, env),
            other => Err(DiError::runtime_syntax(
                other.pos(),
                "cannot assign to this expression",
            )),
        }
    }

    /// Destructure `value` into a list pattern. At most one element may be
    /// a `...` splat; it soaks up the middle of the iterable as a fresh
    /// list.
    fn assign_pattern(
        &mut self,
        pattern: &[Node],
        value: Value,
        return_old: bool,
        pos: Pos,
        env: &Env,
    ) -> DiResult<Value> {
        // The "previous value" of a pattern is the pattern evaluated as an
        // expression before any element is reassigned.
        let old = if return_old {
            Some(self.eval_list(pattern, env)?)
        } else {
            None
        };

        let values = iterable_values(&value).ok_or_else(|| {
            DiError::runtime_syntax(
                pos,
                format!("cannot unpack a non-iterable '{}' value", value.type_name()),
            )
        })?;

        let mut before: Vec<&Node> = Vec::new();
        let mut splat: Option<&Node> = None;
        let mut after: Vec<&Node> = Vec::new();
        for element in pattern {
            match element {
                Node::Ellipsis { inner, pos: splat_pos } => {
                    if splat.is_some() {
                        return Err(DiError::runtime_syntax(
                            *splat_pos,
                            "only one '...' target is allowed in an unpack pattern",
                        ));
                    }
                    splat = Some(&**inner);
                }
                _ => {
                    if splat.is_none() {
                        before.push(element);
                    } else {
                        after.push(element);
                    }
                }
            }
        }

        match splat {
            None => {
                if pattern.len() != values.len() {
                    let reason = if pattern.len() > values.len() {
                        "not enough"
                    } else {
                        "too many"
                    };
                    return Err(DiError::runtime_syntax(
                        pos,
                        format!(
                            "{reason} values to unpack (expected {}, got {})",
                            pattern.len(),
                            values.len()
                        ),
                    ));
                }
                for (element, item) in pattern.iter().zip(values) {
                    self.assign(element, item, false, env)?;
                }
            }
            Some(inner) => {
                let fixed = before.len() + after.len();
                if values.len() < fixed {
                    return Err(DiError::runtime_syntax(
                        pos,
                        format!(
                            "not enough values to unpack (expected at least {fixed}, got {})",
                            values.len()
                        ),
                    ));
                }
                let split_lo = before.len();
                let split_hi = values.len() - after.len();
                for (element, item) in before.iter().copied().zip(&values[..split_lo]) {
                    self.assign(element, item.clone(), false, env)?;
                }
                let middle = values[split_lo..split_hi].to_vec();
                self.assign(inner, Value::list(middle), false, env)?;
                for (element, item) in after.iter().copied().zip(&values[split_hi..]) {
                    self.assign(element, item.clone(), false, env)?;
                }
            }
        }
        Ok(old.unwrap_or(value))
    }
}

fn lookup(env: &Env, ident: &Ident) -> DiResult<Value> {
    env.get(&ident.name).ok_or_else(|| {
        DiError::name(
            ident.pos,
            format!("variable '{}' is not defined", ident.name),
        )
    })
}

fn make_callable(params: &[Ident], body: &Node, env: &Env, kind: CallableKind) -> Value {
    Value::Function(Rc::new(FunctionValue {
        params: params.iter().map(|p| p.name.clone()).collect(),
        body: Rc::new(body.clone()),
        closure: env.clone(),
        kind,
    }))
}

/// The element sequence of an iterable value: a list's elements, or a
/// string's characters as single-character strings.
fn iterable_values(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::List(items) => Some(items.borrow().clone()),
        Value::Str(s) => Some(s.chars().map(Value::str).collect()),
        _ => None,
    }
}
