//! Expression lexer, AST, parser, and evaluator.
//!
//! Directive attributes (`condition="n > 0"`, `value="'hi ' + name"`) hold a
//! single statement in a small dynamically-typed expression language:
//! arithmetic, string concatenation, comparison (loose `==` and strict
//! `===`), boolean operators, ternary, assignment, pre/post `++`/`--`, and
//! calls into an enumerated capability whitelist (see [`crate::builtins`]).
//!
//! Operator precedence (lowest → highest):
//!   comma → assign → ternary → or → and → equality/relational →
//!   bit-or → bit-xor → bit-and → shift → additive → multiplicative →
//!   unary → postfix → primary
//!
//! Unresolved identifiers evaluate to `0`, never to an error — documents are
//! expected to reference variables before any directive has defined them.

use crate::value::Value;

// ── EvalContext ───────────────────────────────────────────────────────────────

/// Dependency-injection interface used by the expression evaluator.
///
/// The engine implements this over a per-evaluation merged scope (global
/// store overlaid by the current local scope), so assignments inside an
/// expression land on the merged copy and are discarded when the evaluation
/// ends.  Directive-level assignment (`hs-set` etc.) is the only path that
/// writes through to a live scope.
pub trait EvalContext {
    /// Look up a variable in the merged scope.
    fn get_var(&self, name: &str) -> Option<Value>;

    /// Write a variable into the merged scope.
    fn set_var(&mut self, name: &str, value: Value);

    /// Invoke a whitelisted capability function.
    fn call_fn(&mut self, name: &str, args: Vec<Value>) -> Result<Value, String>;
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Ampersand,
    Pipe,
    Caret,
    ShiftLeft,
    ShiftRight,
    PlusPlus,
    MinusMinus,

    // Comparison
    Eq,       // ==
    StrictEq, // ===
    Ne,       // !=
    StrictNe, // !==
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And, // &&
    Or,  // ||

    // Assignment
    Assign,        // =
    PlusAssign,    // +=
    MinusAssign,   // -=
    StarAssign,    // *=
    SlashAssign,   // /=
    PercentAssign, // %=

    // Misc
    Question,
    Colon,
    Comma,
    Dot,
    LParen,
    RParen,
    /// Unrecognised input byte — reported as a diagnostic instead of masking as EOF.
    Unknown(char),
    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<u8> {
        self.src.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.src.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn read_number(&mut self, first: u8) -> Token {
        let mut s = String::new();
        s.push(first as char);
        let mut is_float = false;

        while matches!(self.peek(), Some(b'0'..=b'9')) {
            s.push(self.advance().unwrap() as char);
        }
        if self.peek() == Some(b'.') && matches!(self.peek2(), Some(b'0'..=b'9')) {
            is_float = true;
            s.push(self.advance().unwrap() as char);
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                s.push(self.advance().unwrap() as char);
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            s.push(self.advance().unwrap() as char);
            if matches!(self.peek(), Some(b'+' | b'-')) {
                s.push(self.advance().unwrap() as char);
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                s.push(self.advance().unwrap() as char);
            }
        }

        if is_float {
            Token::Float(s.parse().unwrap_or(0.0))
        } else {
            Token::Int(s.parse().unwrap_or(0))
        }
    }

    // Accumulates raw bytes so multi-byte UTF-8 sequences pass through
    // intact; quote and escape characters are all single-byte ASCII.
    fn read_string(&mut self, quote: u8) -> Token {
        let mut bytes = Vec::new();
        loop {
            match self.advance() {
                None => break,
                Some(b'\\') => match self.advance() {
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(c) => bytes.push(c),
                    None => break,
                },
                Some(c) if c == quote => break,
                Some(c) => bytes.push(c),
            }
        }
        Token::Str(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_ident(&mut self, first: u8) -> Token {
        let mut s = String::new();
        s.push(first as char);
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$')
        ) {
            s.push(self.advance().unwrap() as char);
        }
        Token::Ident(s)
    }

    fn next_token(&mut self) -> Token {
        self.skip_ws();
        let ch = match self.advance() {
            None => return Token::Eof,
            Some(c) => c,
        };

        match ch {
            b'0'..=b'9' => self.read_number(ch),
            b'"' => self.read_string(b'"'),
            b'\'' => self.read_string(b'\''),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.read_ident(ch),
            b'+' => {
                if self.eat(b'+') {
                    Token::PlusPlus
                } else if self.eat(b'=') {
                    Token::PlusAssign
                } else {
                    Token::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    Token::MinusMinus
                } else if self.eat(b'=') {
                    Token::MinusAssign
                } else {
                    Token::Minus
                }
            }
            b'*' => {
                if self.eat(b'=') {
                    Token::StarAssign
                } else {
                    Token::Star
                }
            }
            b'/' => {
                if self.eat(b'=') {
                    Token::SlashAssign
                } else {
                    Token::Slash
                }
            }
            b'%' => {
                if self.eat(b'=') {
                    Token::PercentAssign
                } else {
                    Token::Percent
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        Token::StrictNe
                    } else {
                        Token::Ne
                    }
                } else {
                    Token::Bang
                }
            }
            b'~' => Token::Tilde,
            b'^' => Token::Caret,
            b'&' => {
                if self.eat(b'&') {
                    Token::And
                } else {
                    Token::Ampersand
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    Token::Or
                } else {
                    Token::Pipe
                }
            }
            b'<' => {
                if self.eat(b'<') {
                    Token::ShiftLeft
                } else if self.eat(b'=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            b'>' => {
                if self.eat(b'>') {
                    Token::ShiftRight
                } else if self.eat(b'=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        Token::StrictEq
                    } else {
                        Token::Eq
                    }
                } else {
                    Token::Assign
                }
            }
            b'?' => Token::Question,
            b':' => Token::Colon,
            b',' => Token::Comma,
            b'.' => Token::Dot,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            c => Token::Unknown(c as char),
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token();
            let done = matches!(t, Token::Eof);
            tokens.push(t);
            if done {
                break;
            }
        }
        tokens
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Assign(String, AssignOp, Box<Expr>),
    /// `name++` / `name--` / `++name` / `--name`.
    IncDec {
        name: String,
        delta: i64,
        prefix: bool,
    },
    Call(String, Vec<Expr>),
    Comma(Vec<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_comma()
    }

    fn parse_comma(&mut self) -> Result<Expr, String> {
        let first = self.parse_assign()?;
        if self.peek() == &Token::Comma {
            let mut exprs = vec![first];
            while self.eat(&Token::Comma) {
                exprs.push(self.parse_assign()?);
            }
            Ok(Expr::Comma(exprs))
        } else {
            Ok(first)
        }
    }

    fn parse_assign(&mut self) -> Result<Expr, String> {
        // Look-ahead: Ident followed by an assign op parses as assignment.
        if let Token::Ident(name) = self.peek().clone() {
            let op = match self.tokens.get(self.pos + 1) {
                Some(Token::Assign) => Some(AssignOp::Set),
                Some(Token::PlusAssign) => Some(AssignOp::Add),
                Some(Token::MinusAssign) => Some(AssignOp::Sub),
                Some(Token::StarAssign) => Some(AssignOp::Mul),
                Some(Token::SlashAssign) => Some(AssignOp::Div),
                Some(Token::PercentAssign) => Some(AssignOp::Rem),
                _ => None,
            };
            if let Some(op) = op {
                self.pos += 2; // consume ident + assign-op
                let rhs = self.parse_assign()?;
                return Ok(Expr::Assign(name, op, Box::new(rhs)));
            }
        }
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, String> {
        let cond = self.parse_or()?;
        if self.eat(&Token::Question) {
            let then = self.parse_or()?;
            if !self.eat(&Token::Colon) {
                return Err("expected ':' in ternary".into());
            }
            let else_ = self.parse_ternary()?;
            Ok(Expr::Ternary(
                Box::new(cond),
                Box::new(then),
                Box::new(else_),
            ))
        } else {
            Ok(cond)
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_relational()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_bitor()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                Token::StrictEq => BinOp::StrictEq,
                Token::StrictNe => BinOp::StrictNe,
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_bitor()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_bitor(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_bitxor()?;
        while self.eat(&Token::Pipe) {
            let rhs = self.parse_bitxor()?;
            lhs = Expr::Binary(BinOp::BitOr, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_bitxor(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_bitand()?;
        while self.eat(&Token::Caret) {
            let rhs = self.parse_bitand()?;
            lhs = Expr::Binary(BinOp::BitXor, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_bitand(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_shift()?;
        while self.eat(&Token::Ampersand) {
            let rhs = self.parse_shift()?;
            lhs = Expr::Binary(BinOp::BitAnd, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_shift(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::ShiftLeft => BinOp::Shl,
                Token::ShiftRight => BinOp::Shr,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        match self.peek().clone() {
            Token::Minus => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            Token::Bang => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            Token::Tilde => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::BitNot, Box::new(self.parse_unary()?)))
            }
            Token::PlusPlus | Token::MinusMinus => {
                let delta = if self.advance() == Token::PlusPlus { 1 } else { -1 };
                match self.advance() {
                    Token::Ident(name) => Ok(Expr::IncDec {
                        name,
                        delta,
                        prefix: true,
                    }),
                    other => Err(format!("expected identifier after prefix operator, got {other:?}")),
                }
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, String> {
        let inner = self.parse_primary()?;
        match self.peek() {
            Token::PlusPlus | Token::MinusMinus => {
                if let Expr::Var(name) = inner {
                    let delta = if self.advance() == Token::PlusPlus { 1 } else { -1 };
                    Ok(Expr::IncDec {
                        name,
                        delta,
                        prefix: false,
                    })
                } else {
                    Err("postfix ++/-- requires a variable".into())
                }
            }
            _ => Ok(inner),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        let tok = self.advance();
        match tok {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Ident(name) => {
                // Keyword literals.
                match name.as_str() {
                    "true" => return Ok(Expr::Literal(Value::Bool(true))),
                    "false" => return Ok(Expr::Literal(Value::Bool(false))),
                    "undefined" | "null" => return Ok(Expr::Literal(Value::Undefined)),
                    _ => {}
                }
                // Namespace spellings resolve into the flat capability table.
                if self.eat(&Token::Dot) {
                    let member = match self.advance() {
                        Token::Ident(m) => m,
                        other => return Err(format!("expected member name after '.', got {other:?}")),
                    };
                    let resolved = match (name.as_str(), member.as_str()) {
                        ("Math", m) => m.to_owned(),
                        ("console", "log") => "log".to_owned(),
                        _ => return Err(format!("unknown namespace {name}.{member}")),
                    };
                    if !self.eat(&Token::LParen) {
                        return Err(format!("expected '(' after {name}.{member}"));
                    }
                    let args = self.parse_call_args(&resolved)?;
                    return Ok(Expr::Call(resolved, args));
                }
                if self.eat(&Token::LParen) {
                    let args = self.parse_call_args(&name)?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err("expected ')'".into());
                }
                Ok(inner)
            }
            other => Err(format!("unexpected token {other:?}")),
        }
    }

    /// Parse the argument list of a call whose `(` has been consumed.
    fn parse_call_args(&mut self, name: &str) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if self.peek() != &Token::RParen {
            args.push(self.parse_assign()?);
            while self.eat(&Token::Comma) {
                args.push(self.parse_assign()?);
            }
        }
        if !self.eat(&Token::RParen) {
            return Err(format!("expected ')' after args to {name}"));
        }
        Ok(args)
    }
}

/// Parse an expression string into an AST.
pub fn parse_expr(src: &str) -> Result<Expr, String> {
    let tokens = Lexer::new(src).tokenize();
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    if parser.peek() != &Token::Eof {
        return Err(format!("trailing input at token {:?}", parser.peek()));
    }
    Ok(expr)
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluate an [`Expr`] AST node against the given context.
pub fn eval_expr(expr: &Expr, ctx: &mut dyn EvalContext) -> Result<Value, String> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        // Unresolved names default to 0 — never a reference error.
        Expr::Var(name) => Ok(ctx.get_var(name).unwrap_or(Value::Int(0))),

        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, ctx)?;
            Ok(match op {
                UnaryOp::Neg => v.arith_neg(),
                UnaryOp::Not => Value::Bool(!v.as_bool()),
                UnaryOp::BitNot => Value::Int(!v.as_int()),
            })
        }

        Expr::Binary(op, lhs, rhs) => {
            // Short-circuit: && and || yield the deciding operand itself,
            // which is what `times="count || 0"` style documents rely on.
            match op {
                BinOp::And => {
                    let l = eval_expr(lhs, ctx)?;
                    if !l.as_bool() {
                        return Ok(l);
                    }
                    return eval_expr(rhs, ctx);
                }
                BinOp::Or => {
                    let l = eval_expr(lhs, ctx)?;
                    if l.as_bool() {
                        return Ok(l);
                    }
                    return eval_expr(rhs, ctx);
                }
                _ => {}
            }
            let l = eval_expr(lhs, ctx)?;
            let r = eval_expr(rhs, ctx)?;
            eval_binop(op, l, r)
        }

        Expr::Ternary(cond, then, else_) => {
            let c = eval_expr(cond, ctx)?;
            if c.as_bool() {
                eval_expr(then, ctx)
            } else {
                eval_expr(else_, ctx)
            }
        }

        Expr::Assign(name, op, rhs) => {
            let rval = eval_expr(rhs, ctx)?;
            let new_val = if let AssignOp::Set = op {
                rval
            } else {
                let cur = ctx.get_var(name).unwrap_or(Value::Int(0));
                match op {
                    AssignOp::Add => cur.arith_add(&rval),
                    AssignOp::Sub => cur.arith_sub(&rval),
                    AssignOp::Mul => cur.arith_mul(&rval),
                    AssignOp::Div => cur.arith_div(&rval)?,
                    AssignOp::Rem => cur.arith_rem(&rval)?,
                    AssignOp::Set => unreachable!(),
                }
            };
            ctx.set_var(name, new_val.clone());
            Ok(new_val)
        }

        Expr::IncDec {
            name,
            delta,
            prefix,
        } => {
            let cur = ctx.get_var(name).unwrap_or(Value::Int(0));
            let next = cur.arith_add(&Value::Int(*delta));
            ctx.set_var(name, next.clone());
            Ok(if *prefix { next } else { cur })
        }

        Expr::Call(name, arg_exprs) => {
            let mut args = Vec::with_capacity(arg_exprs.len());
            for ae in arg_exprs {
                args.push(eval_expr(ae, ctx)?);
            }
            ctx.call_fn(name, args)
        }

        Expr::Comma(exprs) => {
            let mut last = Value::Undefined;
            for e in exprs {
                last = eval_expr(e, ctx)?;
            }
            Ok(last)
        }
    }
}

fn eval_binop(op: &BinOp, l: Value, r: Value) -> Result<Value, String> {
    use std::cmp::Ordering;
    match op {
        BinOp::Add => Ok(l.arith_add(&r)),
        BinOp::Sub => Ok(l.arith_sub(&r)),
        BinOp::Mul => Ok(l.arith_mul(&r)),
        BinOp::Div => l.arith_div(&r),
        BinOp::Rem => l.arith_rem(&r),

        BinOp::Eq => Ok(Value::Bool(l.loose_eq(&r))),
        BinOp::Ne => Ok(Value::Bool(!l.loose_eq(&r))),
        BinOp::StrictEq => Ok(Value::Bool(l.strict_eq(&r))),
        BinOp::StrictNe => Ok(Value::Bool(!l.strict_eq(&r))),
        BinOp::Lt => Ok(Value::Bool(l.cmp_value(&r) == Ordering::Less)),
        BinOp::Le => Ok(Value::Bool(matches!(
            l.cmp_value(&r),
            Ordering::Less | Ordering::Equal
        ))),
        BinOp::Gt => Ok(Value::Bool(l.cmp_value(&r) == Ordering::Greater)),
        BinOp::Ge => Ok(Value::Bool(matches!(
            l.cmp_value(&r),
            Ordering::Greater | Ordering::Equal
        ))),

        BinOp::BitAnd => Ok(Value::Int(l.as_int() & r.as_int())),
        BinOp::BitOr => Ok(Value::Int(l.as_int() | r.as_int())),
        BinOp::BitXor => Ok(Value::Int(l.as_int() ^ r.as_int())),
        BinOp::Shl => Ok(Value::Int(l.as_int() << (r.as_int() & 63))),
        BinOp::Shr => Ok(Value::Int(l.as_int() >> (r.as_int() & 63))),

        BinOp::And | BinOp::Or => unreachable!("handled above"),
    }
}

/// Convenience: parse and evaluate an expression string.
pub fn eval_str(src: &str, ctx: &mut dyn EvalContext) -> Result<Value, String> {
    let expr = parse_expr(src)?;
    eval_expr(&expr, ctx)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
