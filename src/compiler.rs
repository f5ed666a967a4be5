//! Turns a syntax tree into a tree of reusable closures.
//!
//! Every node is compiled exactly once; the resulting [`Plan`] is immutable
//! and is invoked afresh with a new [`Scope`] for each input item. The
//! statement mode is baked into every mode-sensitive runtime call.

use std::sync::Arc;

use crate::ast::{Accessor, Body, Expr, Mode, Predicate};
use crate::runtime::{
    self, IndexPlan, Plan, PredicatePlan, Scope, Seq, Truth, compare, compare_all,
};
use crate::value::Value;

fn plan<F>(f: F) -> Plan
where
    F: Fn(&Scope) -> Seq + Send + Sync + 'static,
{
    Arc::new(f)
}

fn predicate<F>(f: F) -> PredicatePlan
where
    F: Fn(&Scope) -> Result<Truth, runtime::EvalError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn constant(value: Value) -> Plan {
    plan(move |_| Seq::Single(value.clone()))
}

pub struct Compiler {
    mode: Mode,
}

impl Compiler {
    pub fn new(mode: Mode) -> Self {
        Compiler { mode }
    }

    /// A predicate body yields one `true`, `false` or `null` per evaluation.
    pub fn compile_body(&self, body: &Body) -> Plan {
        match body {
            Body::Expr(expr) => self.compile_expr(expr),
            Body::Predicate(p) => {
                let p = self.compile_predicate(p);
                plan(move |scope| match p(scope) {
                    Ok(truth) => Seq::Single(truth.into_value()),
                    Err(e) => Seq::failed(e),
                })
            }
        }
    }

    pub fn compile_expr(&self, expr: &Expr) -> Plan {
        let mode = self.mode;
        match expr {
            Expr::Integer(n) => constant(Value::Integer(*n)),
            Expr::Float(n) => constant(Value::Float(*n)),
            Expr::String(s) => constant(Value::String(s.clone())),
            Expr::Boolean(b) => constant(Value::Boolean(*b)),
            Expr::Null => constant(Value::Null),

            Expr::Root => plan(|scope| Seq::Single(scope.root().clone())),
            Expr::Current => plan(|scope| Seq::Single(scope.current().clone())),
            Expr::Last => plan(|scope| match scope.last_index() {
                Some(index) => Seq::Single(Value::Integer(index)),
                None => Seq::Empty,
            }),
            Expr::Variable(name) => {
                let name = name.clone();
                plan(move |scope| match scope.variable(&name) {
                    Ok(value) => Seq::Single(value.clone()),
                    Err(e) => Seq::failed(e),
                })
            }

            Expr::Unary { op, operand } => {
                let op = *op;
                let operand = self.compile_expr(operand);
                plan(move |scope| operand(scope).bind(move |v| runtime::unary(mode, op, v)))
            }
            Expr::Binary { op, left, right } => {
                let op = *op;
                let left = self.compile_expr(left);
                let right = self.compile_expr(right);
                plan(move |scope| {
                    match runtime::binary(mode, op, left(scope), right(scope)) {
                        Ok(value) => Seq::Single(value),
                        Err(e) => Seq::failed(e),
                    }
                })
            }

            Expr::Access { base, accessor } => {
                let base = self.compile_expr(base);
                self.compile_accessor(base, accessor)
            }
        }
    }

    fn compile_accessor(&self, base: Plan, accessor: &Accessor) -> Plan {
        let mode = self.mode;
        match accessor {
            Accessor::Member(name) => {
                let name: Arc<str> = Arc::from(name.as_str());
                plan(move |scope| {
                    let name = name.clone();
                    base(scope).bind(move |v| runtime::member(mode, v, &name))
                })
            }
            Accessor::MemberWildcard => {
                plan(move |scope| base(scope).bind(move |v| runtime::member_wildcard(mode, v)))
            }
            Accessor::ElementWildcard => {
                plan(move |scope| base(scope).bind(move |v| runtime::element_wildcard(mode, v)))
            }
            Accessor::Subscripts(subscripts) => {
                let indexes: Arc<[IndexPlan]> = subscripts
                    .iter()
                    .map(|subscript| IndexPlan {
                        from: self.compile_expr(&subscript.from),
                        to: subscript.to.as_ref().map(|to| self.compile_expr(to)),
                    })
                    .collect();
                plan(move |scope| {
                    let indexes = indexes.clone();
                    let inner = scope.clone();
                    base(scope).bind(move |v| runtime::subscripts(mode, v, &inner, &indexes))
                })
            }
            Accessor::Filter(p) => {
                let p = self.compile_predicate(p);
                plan(move |scope| {
                    let p = p.clone();
                    let inner = scope.clone();
                    base(scope).bind(move |v| Ok(runtime::filter(mode, v, &inner, &p)))
                })
            }
            Accessor::Method(method) => {
                let method = *method;
                plan(move |scope| base(scope).bind(move |v| runtime::item_method(mode, method, v)))
            }
            Accessor::DateTime(template) => {
                let template = template.clone().map(Arc::new);
                plan(move |scope| {
                    let template = template.clone();
                    base(scope).bind(move |v| runtime::datetime(mode, template.clone(), v))
                })
            }
        }
    }

    pub fn compile_predicate(&self, p: &Predicate) -> PredicatePlan {
        match p {
            Predicate::Compare { op, left, right } => {
                let op = *op;
                let left = self.compile_expr(left);
                let right = self.compile_expr(right);
                predicate(move |scope| {
                    let lefts = left(scope).collect_values()?;
                    let rights = right(scope).collect_values()?;
                    let pairs = lefts
                        .iter()
                        .flat_map(|l| rights.iter().map(move |r| compare(op, l, r)));
                    Ok(compare_all(pairs))
                })
            }
            Predicate::Exists(operand) => {
                let operand = self.compile_expr(operand);
                predicate(move |scope| Ok(runtime::exists(operand(scope))))
            }
            Predicate::StartsWith { subject, prefix } => {
                let subject = self.compile_expr(subject);
                let prefix = self.compile_expr(prefix);
                predicate(move |scope| {
                    let subjects = subject(scope).collect_values()?;
                    let prefixes = prefix(scope).collect_values()?;
                    let pairs = subjects
                        .iter()
                        .flat_map(|s| prefixes.iter().map(move |p| runtime::starts_with(s, p)));
                    Ok(compare_all(pairs))
                })
            }
            Predicate::LikeRegex { subject, pattern } => {
                let subject = self.compile_expr(subject);
                let pattern = Arc::new(pattern.clone());
                predicate(move |scope| {
                    let subjects = subject(scope).collect_values()?;
                    Ok(compare_all(subjects.iter().map(|s| pattern.test(s))))
                })
            }
            Predicate::And(operands) => {
                let operands = self.compile_predicates(operands);
                predicate(move |scope| runtime::and(operands.iter().map(|p| p(scope))))
            }
            Predicate::Or(operands) => {
                let operands = self.compile_predicates(operands);
                predicate(move |scope| runtime::or(operands.iter().map(|p| p(scope))))
            }
            Predicate::Not(operand) => {
                let operand = self.compile_predicate(operand);
                predicate(move |scope| Ok(runtime::not(operand(scope)?)))
            }
            Predicate::IsUnknown(operand) => {
                let operand = self.compile_predicate(operand);
                predicate(move |scope| Ok(runtime::is_unknown(operand(scope)?)))
            }
            // Only boolean items count; anything else is unknown
            Predicate::Expr(expr) => {
                let expr = self.compile_expr(expr);
                predicate(move |scope| {
                    let values = expr(scope).collect_values()?;
                    let outcomes = values.iter().map(|v| match v {
                        Value::Boolean(b) => Truth::from(*b),
                        _ => Truth::Unknown,
                    });
                    Ok(compare_all(outcomes))
                })
            }
        }
    }

    fn compile_predicates(&self, predicates: &[Predicate]) -> Arc<[PredicatePlan]> {
        predicates.iter().map(|p| self.compile_predicate(p)).collect()
    }
}
