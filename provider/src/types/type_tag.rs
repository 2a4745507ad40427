// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Type Tags
//!
//! Runtime type descriptors passed as type arguments to script functions.
//!
//! ## Grammar
//!
//! ```text
//! type   := bool | u8 | u64 | u128 | address | signer
//!         | vector '<' type '>'
//!         | struct
//! struct := ADDRESS '::' IDENT '::' IDENT ( '<' type ( ',' type )* '>' )?
//! ```
//!
//! Whitespace between tokens is ignored. A struct tag is always fully
//! qualified; `STC` on its own is rejected.

use std::fmt;
use std::str::FromStr;

use super::{impl_serde_via_str, AccountAddress, Identifier, ParseError};
use crate::bcs::{BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};

/// Nesting limit for `vector<vector<…>>` and generic struct parameters.
const MAX_TYPE_TAG_DEPTH: usize = 32;

// ---------------------------------------------------------------------------
// TypeTag / StructTag
// ---------------------------------------------------------------------------

/// A Move type. BCS variant indexes follow declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
}

/// A fully qualified struct type, e.g. `0x1::STC::STC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: Identifier,
    pub name: Identifier,
    pub type_params: Vec<TypeTag>,
}

impl TypeTag {
    fn variant_index(&self) -> u32 {
        match self {
            Self::Bool => 0,
            Self::U8 => 1,
            Self::U64 => 2,
            Self::U128 => 3,
            Self::Address => 4,
            Self::Signer => 5,
            Self::Vector(_) => 6,
            Self::Struct(_) => 7,
        }
    }
}

impl From<StructTag> for TypeTag {
    fn from(tag: StructTag) -> Self {
        Self::Struct(Box::new(tag))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::U8 => f.write_str("u8"),
            Self::U64 => f.write_str("u64"),
            Self::U128 => f.write_str("u128"),
            Self::Address => f.write_str("address"),
            Self::Signer => f.write_str("signer"),
            Self::Vector(inner) => write!(f, "vector<{}>", inner),
            Self::Struct(tag) => write!(f, "{}", tag),
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if let Some((first, rest)) = self.type_params.split_first() {
            write!(f, "<{}", first)?;
            for param in rest {
                write!(f, ", {}", param)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl FromStr for TypeTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s)?;
        let tag = parser.parse_type_tag(0)?;
        parser.expect_end()?;
        Ok(tag)
    }
}

impl FromStr for StructTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<TypeTag>()? {
            TypeTag::Struct(tag) => Ok(*tag),
            other => Err(ParseError::InvalidTypeTag(format!(
                "expected a struct type, got {}",
                other
            ))),
        }
    }
}

impl_serde_via_str!(TypeTag, StructTag);

/// Parses a comma-separated list of type tags. An empty string is an
/// empty list.
pub fn parse_type_tags(s: &str) -> Result<Vec<TypeTag>, ParseError> {
    let mut parser = Parser::new(s)?;
    let mut tags = Vec::new();
    if parser.peek().is_none() {
        return Ok(tags);
    }
    loop {
        tags.push(parser.parse_type_tag(0)?);
        match parser.next() {
            None => return Ok(tags),
            Some(Token::Comma) => continue,
            Some(other) => return Err(unexpected(&other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    ColonColon,
    Lt,
    Gt,
    Comma,
}

fn tokenize(s: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '<' => {
                chars.next();
                tokens.push(Token::Lt);
            }
            '>' => {
                chars.next();
                tokens.push(Token::Gt);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            ':' => {
                chars.next();
                if chars.next() != Some(':') {
                    return Err(ParseError::InvalidTypeTag("single ':'".to_string()));
                }
                tokens.push(Token::ColonColon);
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(name));
            }
            other => {
                return Err(ParseError::InvalidTypeTag(format!(
                    "unexpected character {:?}",
                    other
                )))
            }
        }
    }
    Ok(tokens)
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::InvalidTypeTag(format!("unexpected token {:?}", token))
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
    peeked: Option<Token>,
}

impl Parser {
    fn new(s: &str) -> Result<Self, ParseError> {
        let mut tokens = tokenize(s)?.into_iter();
        let peeked = tokens.next();
        Ok(Self { tokens, peeked })
    }

    fn peek(&self) -> Option<&Token> {
        self.peeked.as_ref()
    }

    fn next(&mut self) -> Option<Token> {
        std::mem::replace(&mut self.peeked, self.tokens.next())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(unexpected(&token)),
            None => Err(ParseError::InvalidTypeTag(format!(
                "expected {:?}, found end of input",
                expected
            ))),
        }
    }

    fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.next() {
            Some(Token::Name(name)) => Ok(name),
            Some(token) => Err(unexpected(&token)),
            None => Err(ParseError::InvalidTypeTag(
                "expected a name, found end of input".to_string(),
            )),
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.next() {
            None => Ok(()),
            Some(token) => Err(unexpected(&token)),
        }
    }

    fn parse_type_tag(&mut self, depth: usize) -> Result<TypeTag, ParseError> {
        if depth > MAX_TYPE_TAG_DEPTH {
            return Err(ParseError::InvalidTypeTag("type nested too deeply".to_string()));
        }
        let name = self.expect_name()?;
        let tag = match name.as_str() {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            "vector" => {
                self.expect(Token::Lt)?;
                let inner = self.parse_type_tag(depth + 1)?;
                self.expect(Token::Gt)?;
                TypeTag::Vector(Box::new(inner))
            }
            _ => TypeTag::Struct(Box::new(self.parse_struct_tail(&name, depth)?)),
        };
        Ok(tag)
    }

    /// Parses `::Module::Name<…>` after the address token.
    fn parse_struct_tail(&mut self, address: &str, depth: usize) -> Result<StructTag, ParseError> {
        if !address.starts_with("0x") {
            return Err(ParseError::InvalidTypeTag(format!(
                "{:?} is not a primitive type or a qualified struct",
                address
            )));
        }
        let address: AccountAddress = address.parse()?;
        self.expect(Token::ColonColon)?;
        let module: Identifier = self.expect_name()?.parse()?;
        self.expect(Token::ColonColon)?;
        let name: Identifier = self.expect_name()?.parse()?;

        let mut type_params = Vec::new();
        if self.peek() == Some(&Token::Lt) {
            self.next();
            loop {
                type_params.push(self.parse_type_tag(depth + 1)?);
                match self.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::Gt) => break,
                    Some(token) => return Err(unexpected(&token)),
                    None => {
                        return Err(ParseError::InvalidTypeTag(
                            "unterminated type parameter list".to_string(),
                        ))
                    }
                }
            }
        }

        Ok(StructTag {
            address,
            module,
            name,
            type_params,
        })
    }
}

// ---------------------------------------------------------------------------
// BCS
// ---------------------------------------------------------------------------

impl BcsSerialize for TypeTag {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_variant_index(self.variant_index());
        match self {
            Self::Vector(inner) => inner.bcs_serialize(se),
            Self::Struct(tag) => tag.bcs_serialize(se),
            _ => Ok(()),
        }
    }
}

impl BcsDeserialize for TypeTag {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        decode_type_tag(de, 0)
    }
}

fn decode_type_tag(de: &mut BcsDeserializer<'_>, depth: usize) -> Result<TypeTag, BcsError> {
    if depth > MAX_TYPE_TAG_DEPTH {
        return Err(BcsError::InvalidValue {
            type_name: "TypeTag",
            reason: format!("nesting exceeds {} levels", MAX_TYPE_TAG_DEPTH),
        });
    }
    match de.deserialize_variant_index()? {
        0 => Ok(TypeTag::Bool),
        1 => Ok(TypeTag::U8),
        2 => Ok(TypeTag::U64),
        3 => Ok(TypeTag::U128),
        4 => Ok(TypeTag::Address),
        5 => Ok(TypeTag::Signer),
        6 => Ok(TypeTag::Vector(Box::new(decode_type_tag(de, depth + 1)?))),
        7 => Ok(TypeTag::Struct(Box::new(decode_struct_tag(de, depth)?))),
        index => Err(BcsError::InvalidVariant {
            type_name: "TypeTag",
            index,
        }),
    }
}

/// Type parameters sit one level below the struct itself.
fn decode_struct_tag(de: &mut BcsDeserializer<'_>, depth: usize) -> Result<StructTag, BcsError> {
    let address = BcsDeserialize::bcs_deserialize(de)?;
    let module = BcsDeserialize::bcs_deserialize(de)?;
    let name = BcsDeserialize::bcs_deserialize(de)?;
    let len = de.deserialize_len()?;
    let mut type_params = Vec::with_capacity(len.min(de.remaining()));
    for _ in 0..len {
        type_params.push(decode_type_tag(de, depth + 1)?);
    }
    Ok(StructTag {
        address,
        module,
        name,
        type_params,
    })
}

impl BcsSerialize for StructTag {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        self.address.bcs_serialize(se)?;
        self.module.bcs_serialize(se)?;
        self.name.bcs_serialize(se)?;
        self.type_params.bcs_serialize(se)
    }
}

impl BcsDeserialize for StructTag {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        decode_struct_tag(de, 0)
    }
}
