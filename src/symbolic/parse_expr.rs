//! Turns formula text into an [`Expr`].
//!
//! Two passes:
//! 1. a `nom` lexer produces tokens tagged with their character position;
//!    implicit multiplication is made explicit right after lexing;
//! 2. a Pratt parser builds the tree.
//!
//! ```text
//!   precedence (low → high)       associativity
//!   binary + -                    left
//!   * /  and implicit product     left
//!   unary - +                     prefix
//!   ^  (alias **)                 right
//! ```
//!
//! Implicit multiplication is accepted when a number, `x` or `)` is directly followed
//! by `x`, a function name or `(`: `2x`, `3sin(x)`, `2(x+1)`, `(x+1)(x-1)`, `x(x+1)`.
//! Every other adjacency (`x2`, `(x)2`, `2 3`) is an error.
//!
//! The only identifiers are `x` and the names of [`Func`]; anything else is rejected
//! with its position.
//! # Example
//! ```
//! use RustedNewton::symbolic::symbolic_engine::Expr;
//! let expr = Expr::parse_expression("x^2 - 4x + 4").unwrap();
//! assert_eq!(expr.to_string(), "(((x ^ 2) - (4 * x)) + 4)");
//! ```
use crate::error::ParseError;
use crate::symbolic::symbolic_engine::{Expr, Func};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, one_of},
    combinator::{opt, recognize, value},
    multi::many0,
};

/// Longest accepted formula, in characters.
pub const MAX_EXPRESSION_LEN: usize = 1024;
/// Deepest accepted nesting of parentheses, signs and powers.
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Var,
    Func(Func),
    Op(char),
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spanned {
    token: Token,
    pos: usize,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(val) => val.to_string(),
            Token::Var => "x".to_string(),
            Token::Func(func) => func.to_string(),
            Token::Op(op) => op.to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
//                              LEXER
////////////////////////////////////////////////////////////////////////////////

/// `12`, `1.5`, `2.`, `.5`, each with an optional exponent `e-3`
fn number(input: &str) -> IResult<&str, &str> {
    recognize((
        alt((
            recognize((digit1, opt((char('.'), digit0)))),
            recognize((char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize((alpha1, many0(alt((alphanumeric1, tag("_")))))).parse(input)
}

fn operator(input: &str) -> IResult<&str, char> {
    alt((value('^', tag("**")), one_of("+-*/^"))).parse(input)
}

fn paren(input: &str) -> IResult<&str, Token> {
    alt((value(Token::LParen, char('(')), value(Token::RParen, char(')')))).parse(input)
}

/// character offset of `rest` inside `src`
fn offset(src: &str, rest: &str) -> usize {
    src[..src.len() - rest.len()].chars().count()
}

fn tokenize(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = src.trim_start();
    while !rest.is_empty() {
        let pos = offset(src, rest);
        if let Ok((remaining, text)) = number(rest) {
            let val = text
                .parse::<f64>()
                .ok()
                .filter(|val| val.is_finite())
                .ok_or_else(|| ParseError::InvalidNumber {
                    text: text.to_string(),
                    pos,
                })?;
            tokens.push(Spanned {
                token: Token::Number(val),
                pos,
            });
            rest = remaining;
        } else if let Ok((remaining, name)) = identifier(rest) {
            let token = if name == "x" {
                Token::Var
            } else {
                let func = name
                    .parse::<Func>()
                    .map_err(|_| ParseError::UnknownIdentifier {
                        name: name.to_string(),
                        pos,
                    })?;
                Token::Func(func)
            };
            tokens.push(Spanned { token, pos });
            rest = remaining;
        } else if let Ok((remaining, op)) = operator(rest) {
            tokens.push(Spanned {
                token: Token::Op(op),
                pos,
            });
            rest = remaining;
        } else if let Ok((remaining, token)) = paren(rest) {
            tokens.push(Spanned { token, pos });
            rest = remaining;
        } else {
            let ch = rest.chars().next().unwrap_or(' ');
            return Err(ParseError::UnexpectedChar { ch, pos });
        }
        rest = rest.trim_start();
    }
    Ok(tokens)
}

/// Inserts `*` where multiplication is written by juxtaposition.
fn insert_implicit_mul(tokens: Vec<Spanned>) -> Vec<Spanned> {
    let mut out: Vec<Spanned> = Vec::with_capacity(tokens.len() * 2);
    for tok in tokens {
        if let Some(prev) = out.last() {
            let left = matches!(prev.token, Token::Number(_) | Token::Var | Token::RParen);
            let right = matches!(tok.token, Token::Var | Token::Func(_) | Token::LParen);
            if left && right {
                out.push(Spanned {
                    token: Token::Op('*'),
                    pos: tok.pos,
                });
            }
        }
        out.push(tok);
    }
    out
}

////////////////////////////////////////////////////////////////////////////////
//                              PRATT PARSER
////////////////////////////////////////////////////////////////////////////////

const PREFIX_BP: u8 = 5;

fn infix_binding_power(op: char) -> (u8, u8) {
    match op {
        '+' | '-' => (1, 2),
        '*' | '/' => (3, 4),
        // right associative
        _ => (8, 7),
    }
}

struct ExprParser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    end: usize,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    fn current(&self) -> Option<Spanned> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn here(&self) -> usize {
        self.current().map(|tok| tok.pos).unwrap_or(self.end)
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeep {
                pos: self.here(),
                limit: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.descend()?;
        let mut lhs = self.parse_prefix()?;

        while let Some(tok) = self.current() {
            let op = match tok.token {
                Token::Op(op) => op,
                Token::RParen => break,
                other => {
                    return Err(ParseError::UnexpectedToken {
                        token: other.describe(),
                        pos: tok.pos,
                    });
                }
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            lhs = match op {
                '+' => Expr::Add(lhs.boxed(), rhs.boxed()),
                '-' => Expr::Sub(lhs.boxed(), rhs.boxed()),
                '*' => Expr::Mul(lhs.boxed(), rhs.boxed()),
                '/' => Expr::Div(lhs.boxed(), rhs.boxed()),
                _ => Expr::Pow(lhs.boxed(), rhs.boxed()),
            };
        }

        self.depth -= 1;
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let Some(tok) = self.current() else {
            return Err(ParseError::UnexpectedEnd { pos: self.end });
        };
        self.advance();
        match tok.token {
            Token::Number(val) => Ok(Expr::Const(val)),
            Token::Var => Ok(Expr::Var),
            Token::Op('-') => Ok(Expr::Neg(self.parse_expr(PREFIX_BP)?.boxed())),
            Token::Op('+') => self.parse_expr(PREFIX_BP),
            Token::LParen => {
                let inner = self.parse_expr(0)?;
                self.close_paren(tok.pos)?;
                Ok(inner)
            }
            Token::Func(func) => match self.current() {
                Some(Spanned {
                    token: Token::LParen,
                    pos,
                }) => {
                    self.advance();
                    let arg = self.parse_expr(0)?;
                    self.close_paren(pos)?;
                    Ok(Expr::Call(func, arg.boxed()))
                }
                _ => Err(ParseError::MissingCallParen {
                    name: func.to_string(),
                    pos: tok.pos,
                }),
            },
            Token::Op(_) | Token::RParen => Err(ParseError::UnexpectedToken {
                token: tok.token.describe(),
                pos: tok.pos,
            }),
        }
    }

    fn close_paren(&mut self, open_pos: usize) -> Result<(), ParseError> {
        match self.current() {
            Some(Spanned {
                token: Token::RParen,
                ..
            }) => {
                self.advance();
                Ok(())
            }
            None => Err(ParseError::UnclosedParen { pos: open_pos }),
            Some(other) => Err(ParseError::UnexpectedToken {
                token: other.token.describe(),
                pos: other.pos,
            }),
        }
    }
}

/// Parses formula text into an expression tree.
pub fn parse_expression_func(input: &str) -> Result<Expr, ParseError> {
    let len = input.chars().count();
    if len > MAX_EXPRESSION_LEN {
        return Err(ParseError::TooLong {
            len,
            limit: MAX_EXPRESSION_LEN,
        });
    }
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let tokens = insert_implicit_mul(tokenize(input)?);
    let mut parser = ExprParser {
        tokens: &tokens,
        pos: 0,
        end: len,
        depth: 0,
    };
    let expr = parser.parse_expr(0)?;
    match parser.current() {
        None => Ok(expr),
        Some(tok) => Err(ParseError::UnexpectedToken {
            token: tok.token.describe(),
            pos: tok.pos,
        }),
    }
}

impl Expr {
    /// Parses a mathematical expression from string representation.
    ///
    /// # Supported Syntax
    /// - Variable: `x`
    /// - Constants: `3`, `2.5`, `.5`, `1e-6`
    /// - Operators: `+`, `-`, `*`, `/`, `^` (or `**`), unary `-`
    /// - Functions: `sin`, `cos`, `tan`, `exp`, `log` (or `ln`), `sqrt`, `abs`
    /// - Parentheses for grouping, implicit multiplication such as `2x`
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        parse_expression_func(input)
    }
}
