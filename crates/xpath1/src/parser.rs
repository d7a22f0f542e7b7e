//! XPath 1.0 expression parser built from `nom` combinators.
//!
//! Precedence levels, loosest first: `or`, `and`, equality, relational, additive,
//! multiplicative, unary minus, union, path.

use crate::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, PathStart, Step};
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, map_opt, map_res, not, opt, recognize, value, verify},
    error::Error,
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

type PResult<'a, O> = IResult<&'a str, O>;

/// Node-type tests: they look like calls but are never parsed as functions.
const NODE_TYPES: [&str; 4] = ["comment", "text", "processing-instruction", "node"];

/// Parses a complete expression. Anything left over after the expression is an error.
pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    let syntax_error = |message: String| XPathError::XPathParse(input.to_string(), message);
    if input.trim().is_empty() {
        return Err(syntax_error("empty expression".to_string()));
    }
    match ws(or_expr).parse(input) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => Err(syntax_error(format!("unexpected input at '{}'", rest))),
        Err(e) => Err(syntax_error(e.to_string())),
    }
}

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// An operator name (`and`, `div`, ...) that is not the start of a longer name.
fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_name_char)))
}

/// One left-associative precedence level: `operand (operator operand)*`.
fn left_assoc<'a>(
    input: &'a str,
    operand: fn(&'a str) -> PResult<'a, Expression>,
    operator: fn(&'a str) -> PResult<'a, BinaryOperator>,
) -> PResult<'a, Expression> {
    let (mut rest, mut expr) = operand(input)?;
    while let Ok((next, (op, rhs))) = pair(ws(operator), operand).parse(rest) {
        expr = Expression::binary(op, expr, rhs);
        rest = next;
    }
    Ok((rest, expr))
}

// Operators

fn or_operator(input: &str) -> PResult<'_, BinaryOperator> {
    value(BinaryOperator::Or, keyword("or")).parse(input)
}

fn and_operator(input: &str) -> PResult<'_, BinaryOperator> {
    value(BinaryOperator::And, keyword("and")).parse(input)
}

fn equality_operator(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        value(BinaryOperator::NotEquals, tag("!=")),
        value(BinaryOperator::Equals, char('=')),
    ))
    .parse(input)
}

fn relational_operator(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        value(BinaryOperator::LessThanOrEqual, tag("<=")),
        value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
        value(BinaryOperator::LessThan, char('<')),
        value(BinaryOperator::GreaterThan, char('>')),
    ))
    .parse(input)
}

fn additive_operator(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        value(BinaryOperator::Plus, char('+')),
        value(BinaryOperator::Minus, char('-')),
    ))
    .parse(input)
}

fn multiplicative_operator(input: &str) -> PResult<'_, BinaryOperator> {
    alt((
        value(BinaryOperator::Multiply, char('*')),
        value(BinaryOperator::Divide, keyword("div")),
        value(BinaryOperator::Modulo, keyword("mod")),
    ))
    .parse(input)
}

fn union_operator(input: &str) -> PResult<'_, BinaryOperator> {
    value(BinaryOperator::Union, char('|')).parse(input)
}

// Precedence ladder

fn or_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, and_expr, or_operator)
}

fn and_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, equality_expr, and_operator)
}

fn equality_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, relational_expr, equality_operator)
}

fn relational_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, additive_expr, relational_operator)
}

fn additive_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, multiplicative_expr, additive_operator)
}

fn multiplicative_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, unary_expr, multiplicative_operator)
}

fn unary_expr(input: &str) -> PResult<'_, Expression> {
    let (rest, signs) = many0(ws(char('-'))).parse(input)?;
    let (rest, operand) = union_expr(rest)?;
    let expr = signs
        .iter()
        .fold(operand, |expr, _| Expression::Negate(Box::new(expr)));
    Ok((rest, expr))
}

fn union_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, path_expr, union_operator)
}

// Paths

/// A filter expression, optionally continued by a relative path, or a location path.
fn path_expr(input: &str) -> PResult<'_, Expression> {
    let (rest, primary) = match filter_expr(input) {
        Ok(parsed) => parsed,
        Err(nom::Err::Error(_)) => return map(location_path, Expression::Path).parse(input),
        Err(e) => return Err(e),
    };
    let (rest, continuation) = opt(pair(ws(path_separator), relative_path)).parse(rest)?;
    let expr = match continuation {
        None => primary,
        Some((descend, steps)) => Expression::Path(LocationPath {
            start: PathStart::Expression(Box::new(primary)),
            steps: prefix_descendant(descend, steps),
        }),
    };
    Ok((rest, expr))
}

fn prefix_descendant(descend: bool, steps: Vec<Step>) -> Vec<Step> {
    if descend {
        std::iter::once(Step::descendant_or_self()).chain(steps).collect()
    } else {
        steps
    }
}

/// `//` yields `true`, `/` yields `false`.
fn path_separator(input: &str) -> PResult<'_, bool> {
    alt((value(true, tag("//")), value(false, char('/')))).parse(input)
}

fn location_path(input: &str) -> PResult<'_, LocationPath> {
    alt((
        map(preceded(tag("//"), relative_path), |steps| LocationPath {
            start: PathStart::Root,
            steps: prefix_descendant(true, steps),
        }),
        map(preceded(char('/'), opt(relative_path)), |steps| LocationPath {
            start: PathStart::Root,
            steps: steps.unwrap_or_default(),
        }),
        map(relative_path, |steps| LocationPath {
            start: PathStart::Context,
            steps,
        }),
    ))
    .parse(input)
}

fn relative_path(input: &str) -> PResult<'_, Vec<Step>> {
    let (rest, first) = step(input)?;
    let (rest, more) = many0(pair(ws(path_separator), step)).parse(rest)?;
    let mut steps = vec![first];
    for (descend, next) in more {
        if descend {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next);
    }
    Ok((rest, steps))
}

fn step(input: &str) -> PResult<'_, Step> {
    alt((
        value(Step::new(Axis::Parent, NodeTest::Node), tag("..")),
        value(Step::new(Axis::SelfAxis, NodeTest::Node), char('.')),
        map(
            (axis_specifier, node_test, many0(predicate)),
            |(axis, test, predicates)| Step {
                axis,
                test,
                predicates,
            },
        ),
    ))
    .parse(input)
}

/// `@`, `name::`, or nothing (the child axis).
fn axis_specifier(input: &str) -> PResult<'_, Axis> {
    map(
        opt(alt((
            value(Axis::Attribute, ws(char('@'))),
            map_opt(terminated(ncname, ws(tag("::"))), Axis::from_name),
        ))),
        |axis| axis.unwrap_or(Axis::Child),
    )
    .parse(input)
}

fn node_test(input: &str) -> PResult<'_, NodeTest> {
    alt((
        value(NodeTest::Any, char('*')),
        map(terminated(ncname, tag(":*")), |prefix: &str| {
            NodeTest::AnyInNamespace(prefix.to_string())
        }),
        node_type_test,
        map(qualified_name, NodeTest::name),
    ))
    .parse(input)
}

fn node_type_test(input: &str) -> PResult<'_, NodeTest> {
    let (rest, kind) = terminated(
        alt((
            tag("comment"),
            tag("text"),
            tag("processing-instruction"),
            tag("node"),
        )),
        ws(char('(')),
    )
    .parse(input)?;
    let (rest, target) = if kind == "processing-instruction" {
        opt(ws(literal)).parse(rest)?
    } else {
        (rest, None)
    };
    let (rest, _) = char::<_, Error<&str>>(')').parse(rest)?;
    let test = match kind {
        "comment" => NodeTest::Comment,
        "text" => NodeTest::Text,
        "node" => NodeTest::Node,
        _ => NodeTest::ProcessingInstruction(target.map(str::to_string)),
    };
    Ok((rest, test))
}

fn predicate(input: &str) -> PResult<'_, Expression> {
    delimited(ws(char('[')), or_expr, ws(char(']'))).parse(input)
}

// Primary expressions

fn filter_expr(input: &str) -> PResult<'_, Expression> {
    let (rest, primary) = primary_expr(input)?;
    let (rest, predicates) = many0(predicate).parse(rest)?;
    if predicates.is_empty() {
        return Ok((rest, primary));
    }
    Ok((
        rest,
        Expression::Filter {
            primary: Box::new(primary),
            predicates,
        },
    ))
}

fn primary_expr(input: &str) -> PResult<'_, Expression> {
    alt((
        map(preceded(char('$'), qualified_name), |name: &str| {
            Expression::Variable(name.to_string())
        }),
        delimited(ws(char('(')), or_expr, ws(char(')'))),
        map(literal, |s: &str| Expression::Literal(s.to_string())),
        map(number, Expression::Number),
        function_call,
    ))
    .parse(input)
}

fn function_call(input: &str) -> PResult<'_, Expression> {
    let (rest, name) = verify(qualified_name, |name: &str| {
        !NODE_TYPES.iter().any(|node_type| *node_type == name)
    })
    .parse(input)?;
    let (rest, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), or_expr),
        ws(char(')')),
    )
    .parse(rest)?;
    Ok((
        rest,
        Expression::Call {
            name: name.to_string(),
            args,
        },
    ))
}

/// Digits with an optional fraction, or a bare fraction. No sign and no exponent.
fn number(input: &str) -> PResult<'_, f64> {
    map_res(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        |text: &str| text.parse::<f64>(),
    )
    .parse(input)
}

/// A single- or double-quoted string. There are no escapes.
fn literal(input: &str) -> PResult<'_, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
    ))
    .parse(input)
}

fn ncname(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_name_char),
    ))
    .parse(input)
}

fn qualified_name(input: &str) -> PResult<'_, &str> {
    recognize(pair(ncname, opt(pair(char(':'), ncname)))).parse(input)
}
