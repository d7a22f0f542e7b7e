//! Binary operator semantics for XPath 1.0 values.
//!
//! Comparisons involving node-sets are existential: `//a = 'x'` holds if any node's
//! string value equals `'x'`.

use super::ast::BinaryOperator;
use super::engine::{XPathValue, string_to_number};
use crate::datasource::DataSourceNode;
use crate::error::XPathError;

pub fn evaluate<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    match op {
        BinaryOperator::Or => Ok(XPathValue::Boolean(left.to_bool() || right.to_bool())),
        BinaryOperator::And => Ok(XPathValue::Boolean(left.to_bool() && right.to_bool())),
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => {
            Ok(XPathValue::Boolean(compare(op, &left, &right)))
        }
        BinaryOperator::Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        // XPath `mod` truncates like C's fmod, which is what `%` on f64 does.
        BinaryOperator::Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),
        BinaryOperator::Union => match (left, right) {
            (XPathValue::NodeSet(mut l), XPathValue::NodeSet(r)) => {
                l.extend(r);
                l.sort();
                l.dedup();
                Ok(XPathValue::NodeSet(l))
            }
            (l, r) => Err(XPathError::TypeError(format!(
                "Union operands must be node-sets, got {:?} and {:?}",
                l, r
            ))),
        },
    }
}

/// Compares two values with one of the six relational/equality operators.
fn compare<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    match (left, right) {
        (XPathValue::NodeSet(_), XPathValue::Boolean(_))
        | (XPathValue::Boolean(_), XPathValue::NodeSet(_)) => compare_atoms(
            op,
            &Atom::Bool(left.to_bool()),
            &Atom::Bool(right.to_bool()),
        ),
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => {
            let right_values: Vec<String> = r.iter().map(|n| n.string_value()).collect();
            l.iter().any(|ln| {
                let lv = ln.string_value();
                right_values
                    .iter()
                    .any(|rv| compare_atoms(op, &Atom::Str(lv.clone()), &Atom::Str(rv.clone())))
            })
        }
        (XPathValue::NodeSet(nodes), other) => nodes.iter().any(|n| {
            compare_atoms(op, &atom_for_node(n, other), &Atom::from_value(other))
        }),
        (other, XPathValue::NodeSet(nodes)) => nodes.iter().any(|n| {
            compare_atoms(op, &Atom::from_value(other), &atom_for_node(n, other))
        }),
        (l, r) => compare_atoms(op, &Atom::from_value(l), &Atom::from_value(r)),
    }
}

/// A non-node-set operand, already converted to its primitive form.
#[derive(Debug, Clone)]
enum Atom {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Atom {
    fn from_value<'a, N: DataSourceNode<'a>>(value: &XPathValue<N>) -> Self {
        match value {
            XPathValue::String(s) => Atom::Str(s.clone()),
            XPathValue::Number(n) => Atom::Num(*n),
            XPathValue::Boolean(b) => Atom::Bool(*b),
            XPathValue::NodeSet(_) => Atom::Bool(value.to_bool()),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Atom::Str(s) => string_to_number(s),
            Atom::Num(n) => *n,
            Atom::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    fn to_bool(&self) -> bool {
        match self {
            Atom::Str(s) => !s.is_empty(),
            Atom::Num(n) => *n != 0.0 && !n.is_nan(),
            Atom::Bool(b) => *b,
        }
    }
}

/// Converts a node to the primitive type it is compared against.
fn atom_for_node<'a, N: DataSourceNode<'a>>(node: &N, other: &XPathValue<N>) -> Atom {
    let sv = node.string_value();
    match other {
        XPathValue::Number(_) => Atom::Num(string_to_number(&sv)),
        _ => Atom::Str(sv),
    }
}

fn compare_atoms(op: BinaryOperator, left: &Atom, right: &Atom) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (left, right) {
                (Atom::Bool(_), _) | (_, Atom::Bool(_)) => left.to_bool() == right.to_bool(),
                (Atom::Num(_), _) | (_, Atom::Num(_)) => left.to_number() == right.to_number(),
                (Atom::Str(l), Atom::Str(r)) => l == r,
            };
            if op == BinaryOperator::Equals {
                equal
            } else {
                !equal
            }
        }
        _ => {
            let (l, r) = (left.to_number(), right.to_number());
            match op {
                BinaryOperator::LessThan => l < r,
                BinaryOperator::LessThanOrEqual => l <= r,
                BinaryOperator::GreaterThan => l > r,
                BinaryOperator::GreaterThanOrEqual => l >= r,
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, create_test_tree};

    fn num<'t>(n: f64) -> XPathValue<MockNode<'t>> {
        XPathValue::Number(n)
    }

    fn string<'t>(s: &str) -> XPathValue<MockNode<'t>> {
        XPathValue::String(s.to_string())
    }

    #[test]
    fn test_arithmetic() {
        let r = evaluate(BinaryOperator::Plus, num(1.0), string("2")).unwrap();
        assert_eq!(r.to_number(), 3.0);
        let r = evaluate(BinaryOperator::Modulo, num(-5.0), num(2.0)).unwrap();
        assert_eq!(r.to_number(), -1.0);
        let r = evaluate(BinaryOperator::Divide, num(1.0), num(0.0)).unwrap();
        assert!(r.to_number().is_infinite());
    }

    #[test]
    fn test_node_set_equality_is_existential() {
        let tree = create_test_tree();
        let paras = XPathValue::NodeSet(vec![tree.node(1), tree.node(8)]);
        assert!(evaluate(BinaryOperator::Equals, paras.clone(), string("World"))
            .unwrap()
            .to_bool());
        assert!(evaluate(BinaryOperator::NotEquals, paras.clone(), string("World"))
            .unwrap()
            .to_bool());
        assert!(!evaluate(BinaryOperator::Equals, paras, string("Nope"))
            .unwrap()
            .to_bool());
    }

    #[test]
    fn test_empty_node_set_comparisons_are_false() {
        let empty: XPathValue<MockNode<'_>> = XPathValue::NodeSet(vec![]);
        assert!(!evaluate(BinaryOperator::Equals, empty.clone(), string(""))
            .unwrap()
            .to_bool());
        assert!(!evaluate(BinaryOperator::NotEquals, empty, string(""))
            .unwrap()
            .to_bool());
    }

    #[test]
    fn test_union_merges_in_document_order() {
        let tree = create_test_tree();
        let left = XPathValue::NodeSet(vec![tree.node(8), tree.node(1)]);
        let right = XPathValue::NodeSet(vec![tree.node(6), tree.node(8)]);
        match evaluate(BinaryOperator::Union, left, right).unwrap() {
            XPathValue::NodeSet(nodes) => {
                let ids: Vec<_> = nodes.iter().map(|n| n.id).collect();
                assert_eq!(ids, vec![1, 6, 8]);
            }
            other => panic!("Expected a NodeSet, got {:?}", other),
        }
        assert!(evaluate(BinaryOperator::Union, num(1.0), num(2.0)).is_err());
    }

    #[test]
    fn test_relational_converts_to_numbers() {
        assert!(evaluate(BinaryOperator::LessThan, string("2"), string("10"))
            .unwrap()
            .to_bool());
        assert!(!evaluate(BinaryOperator::GreaterThan, string("abc"), num(0.0))
            .unwrap()
            .to_bool());
    }
}
