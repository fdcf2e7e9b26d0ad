/* src/strategy/expression.rs */

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::iter::Peekable;
use std::str::Chars;

use async_trait::async_trait;

use super::{FlippingStrategy, required_param};
use crate::context::ExecutionContext;
use crate::error::{FlagError, FlagResult};
use crate::store::FeatureStore;

#[derive(Debug, Clone, PartialEq)]
enum Token {
	Ident(String),
	And,
	Or,
	Not,
	Open,
	Close,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
	Feature(String),
	Not(Box<Expr>),
	And(Vec<Expr>),
	Or(Vec<Expr>),
}

impl Expr {
	fn collect_features<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
		match self {
			Self::Feature(uid) => {
				out.insert(uid.as_str());
			}
			Self::Not(inner) => inner.collect_features(out),
			Self::And(items) | Self::Or(items) => {
				for item in items {
					item.collect_features(out);
				}
			}
		}
	}

	fn eval(&self, states: &HashMap<&str, bool>) -> bool {
		match self {
			Self::Feature(uid) => states.get(uid.as_str()).copied().unwrap_or(false),
			Self::Not(inner) => !inner.eval(states),
			Self::And(items) => items.iter().all(|item| item.eval(states)),
			Self::Or(items) => items.iter().any(|item| item.eval(states)),
		}
	}
}

fn is_ident_char(c: char) -> bool {
	c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
	let mut tokens = Vec::new();
	let mut chars: Peekable<Chars<'_>> = input.chars().peekable();
	while let Some(&c) = chars.peek() {
		match c {
			c if c.is_whitespace() => {
				chars.next();
			}
			'&' => {
				chars.next();
				tokens.push(Token::And);
			}
			'|' => {
				chars.next();
				tokens.push(Token::Or);
			}
			'!' => {
				chars.next();
				tokens.push(Token::Not);
			}
			'(' => {
				chars.next();
				tokens.push(Token::Open);
			}
			')' => {
				chars.next();
				tokens.push(Token::Close);
			}
			c if is_ident_char(c) => {
				let mut ident = String::new();
				while let Some(&c) = chars.peek() {
					if !is_ident_char(c) {
						break;
					}
					ident.push(c);
					chars.next();
				}
				tokens.push(Token::Ident(ident));
			}
			other => return Err(format!("unexpected character '{other}'")),
		}
	}
	Ok(tokens)
}

/// Deepest run of `!` and `(` a parser accepts.
const MAX_DEPTH: usize = 64;

/// Recursive descent: `or := and ('|' and)*`, `and := unary ('&' unary)*`,
/// `unary := '!' unary | ident | '(' or ')'`.
struct Parser {
	tokens: Vec<Token>,
	pos: usize,
	depth: usize,
}

impl Parser {
	fn parse(input: &str) -> Result<Expr, String> {
		let tokens = tokenize(input)?;
		if tokens.is_empty() {
			return Err("empty expression".to_string());
		}
		let mut parser = Self {
			tokens,
			pos: 0,
			depth: 0,
		};
		let expr = parser.or()?;
		if let Some(token) = parser.peek() {
			return Err(format!("unexpected {token:?} at position {}", parser.pos));
		}
		Ok(expr)
	}

	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	fn next(&mut self) -> Option<Token> {
		let token = self.tokens.get(self.pos).cloned();
		self.pos += 1;
		token
	}

	fn or(&mut self) -> Result<Expr, String> {
		let mut items = vec![self.and()?];
		while self.peek() == Some(&Token::Or) {
			self.pos += 1;
			items.push(self.and()?);
		}
		Ok(if items.len() == 1 {
			items.remove(0)
		} else {
			Expr::Or(items)
		})
	}

	fn and(&mut self) -> Result<Expr, String> {
		let mut items = vec![self.unary()?];
		while self.peek() == Some(&Token::And) {
			self.pos += 1;
			items.push(self.unary()?);
		}
		Ok(if items.len() == 1 {
			items.remove(0)
		} else {
			Expr::And(items)
		})
	}

	fn nested(&mut self, parse: fn(&mut Self) -> Result<Expr, String>) -> Result<Expr, String> {
		if self.depth >= MAX_DEPTH {
			return Err(format!("expression nested deeper than {MAX_DEPTH}"));
		}
		self.depth += 1;
		let expr = parse(self);
		self.depth -= 1;
		expr
	}

	fn unary(&mut self) -> Result<Expr, String> {
		match self.next() {
			Some(Token::Not) => Ok(Expr::Not(Box::new(self.nested(Self::unary)?))),
			Some(Token::Ident(uid)) => Ok(Expr::Feature(uid)),
			Some(Token::Open) => {
				let inner = self.nested(Self::or)?;
				match self.next() {
					Some(Token::Close) => Ok(inner),
					_ => Err("missing ')'".to_string()),
				}
			}
			Some(token) => Err(format!("unexpected {token:?}")),
			None => Err("unexpected end of expression".to_string()),
		}
	}
}

/// Boolean expression over other features' enabled flags, e.g.
/// `checkout & (beta | !legacy)`.
///
/// Referenced features are read from the store at evaluation time; a
/// missing feature counts as disabled. Strategies of referenced features
/// are not evaluated.
#[derive(Debug, Clone)]
pub struct ExpressionStrategy {
	params: BTreeMap<String, String>,
	expr: Expr,
}

impl ExpressionStrategy {
	pub const KIND: &'static str = "expression";
	pub const PARAM: &'static str = "expression";

	pub fn new(expression: &str) -> FlagResult<Self> {
		let params = BTreeMap::from([(Self::PARAM.to_string(), expression.to_string())]);
		Self::from_params(&params)
	}

	pub fn from_params(params: &BTreeMap<String, String>) -> FlagResult<Self> {
		let raw = required_param(Self::KIND, params, Self::PARAM)?;
		let expr = Parser::parse(raw).map_err(|e| {
			FlagError::InvalidArgument(format!("strategy '{}': bad expression '{raw}': {e}", Self::KIND))
		})?;
		Ok(Self {
			params: params.clone(),
			expr,
		})
	}

	/// Feature uids the expression refers to.
	pub fn referenced(&self) -> BTreeSet<&str> {
		let mut out = BTreeSet::new();
		self.expr.collect_features(&mut out);
		out
	}
}

#[async_trait]
impl FlippingStrategy for ExpressionStrategy {
	fn kind(&self) -> &str {
		Self::KIND
	}

	fn init_params(&self) -> &BTreeMap<String, String> {
		&self.params
	}

	async fn evaluate(
		&self,
		_feature_id: &str,
		store: &dyn FeatureStore,
		_context: &ExecutionContext,
	) -> FlagResult<bool> {
		let mut states = HashMap::new();
		for uid in self.referenced() {
			let enabled = store.get(uid).await?.is_some_and(|f| f.is_enabled());
			states.insert(uid, enabled);
		}
		Ok(self.expr.eval(&states))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn states<'a>(pairs: &[(&'a str, bool)]) -> HashMap<&'a str, bool> {
		pairs.iter().copied().collect()
	}

	#[test]
	fn test_precedence() {
		let expr = Parser::parse("a | b & !c").unwrap();
		assert_eq!(
			expr,
			Expr::Or(vec![
				Expr::Feature("a".into()),
				Expr::And(vec![
					Expr::Feature("b".into()),
					Expr::Not(Box::new(Expr::Feature("c".into()))),
				]),
			])
		);
		assert!(expr.eval(&states(&[("b", true)])));
		assert!(!expr.eval(&states(&[("b", true), ("c", true)])));
	}

	#[test]
	fn test_parentheses() {
		let expr = Parser::parse("(a | b) & c").unwrap();
		assert!(!expr.eval(&states(&[("a", true)])));
		assert!(expr.eval(&states(&[("a", true), ("c", true)])));
	}

	#[test]
	fn test_parse_errors() {
		assert!(Parser::parse("").is_err());
		assert!(Parser::parse("a &").is_err());
		assert!(Parser::parse("(a | b").is_err());
		assert!(Parser::parse("a b").is_err());
		assert!(Parser::parse("a # b").is_err());
		assert!(matches!(
			ExpressionStrategy::new("a &&"),
			Err(FlagError::InvalidArgument(_))
		));
	}

	#[test]
	fn test_nesting_depth_bounded() {
		let nested = |depth: usize| format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
		assert!(Parser::parse(&nested(MAX_DEPTH)).is_ok());
		assert!(Parser::parse(&format!("{}a", "!".repeat(MAX_DEPTH))).is_ok());

		let err = Parser::parse(&nested(MAX_DEPTH + 1)).unwrap_err();
		assert!(err.contains("nested deeper"));
		assert!(Parser::parse(&format!("{}a", "!".repeat(MAX_DEPTH + 1))).is_err());
		assert!(matches!(
			ExpressionStrategy::new(&nested(200_000)),
			Err(FlagError::InvalidArgument(_))
		));
		assert!(ExpressionStrategy::new(&"(!".repeat(100_000)).is_err());
	}

	#[test]
	fn test_referenced() {
		let strategy = ExpressionStrategy::new("x & (y | !x)").unwrap();
		assert_eq!(strategy.referenced().into_iter().collect::<Vec<_>>(), vec!["x", "y"]);
	}
}
