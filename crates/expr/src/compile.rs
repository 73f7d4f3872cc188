//! Parsing through [`meval`] and checking the result against the names a
//! rate function may use.

use meval::{Expr, ParseError, RPNError, tokenizer::Token};

use crate::{
    error::{InvalidExpressionError, ParseErrorKind},
    function::{Builtin, constant},
};

/// Parses `source` into an expression over `variable`.
///
/// Every free name must be `variable` or a constant, and every call must name
/// a built-in with the right number of arguments, so evaluation can only fail
/// on non-finite arithmetic.
pub(crate) fn compile(source: &str, variable: &str) -> Result<Expr, InvalidExpressionError> {
    let fail = |position, kind| InvalidExpressionError::new(source, position, kind);

    let trimmed = source.trim_start();
    let offset = source.len() - trimmed.len();
    let text = trimmed.trim_end();
    if text.is_empty() {
        return Err(fail(None, ParseErrorKind::Empty));
    }

    // Same length replacement, so byte offsets still point into `text`.
    let normalized = text.replace("**", "^ ");
    let expr: Expr = normalized.parse().map_err(|err| match err {
        meval::Error::ParseError(ParseError::UnexpectedToken(at)) => {
            match text.get(at..).and_then(|rest| rest.chars().next()) {
                Some(c) => fail(Some(offset + at), ParseErrorKind::UnexpectedChar(c)),
                None => fail(None, ParseErrorKind::UnexpectedEnd),
            }
        }
        meval::Error::ParseError(ParseError::MissingArgument) => {
            fail(None, ParseErrorKind::UnexpectedEnd)
        }
        meval::Error::ParseError(ParseError::MissingRParen(_))
        | meval::Error::RPNError(
            RPNError::MismatchedLParen(_) | RPNError::MismatchedRParen(_),
        ) => fail(None, ParseErrorKind::UnbalancedParenthesis),
        meval::Error::RPNError(RPNError::UnexpectedComma(_)) => {
            fail(None, ParseErrorKind::UnexpectedChar(','))
        }
        other => fail(None, ParseErrorKind::Malformed(other.to_string())),
    })?;

    for token in expr.iter() {
        check_names(token, variable).map_err(|kind| fail(None, kind))?;
    }
    Ok(expr)
}

fn check_names(token: &Token, variable: &str) -> Result<(), ParseErrorKind> {
    match token {
        Token::Var(name) if name == variable || constant(name).is_some() => Ok(()),
        Token::Var(name) if Builtin::lookup(name).is_some() => {
            Err(ParseErrorKind::MissingArguments(name.clone()))
        }
        Token::Var(name) => Err(ParseErrorKind::UnknownSymbol(name.clone())),
        Token::Func(name, args) => {
            let builtin = Builtin::lookup(name)
                .ok_or_else(|| ParseErrorKind::UnknownFunction(name.clone()))?;
            let found = args.unwrap_or(0);
            if found == builtin.arity() {
                Ok(())
            } else {
                Err(ParseErrorKind::WrongArity {
                    name: name.clone(),
                    expected: builtin.arity(),
                    found,
                })
            }
        }
        _ => Ok(()),
    }
}
