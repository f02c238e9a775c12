//! Tokenizer and recursive-descent parser for the supported SPARQL subset.

use std::collections::BTreeMap;

use crate::errors::{LexGraphError, Result};
use crate::graph::{ontology, Literal};

/// Parsed query.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Ask { pattern: GroupPattern },
    Select { projection: Projection, pattern: GroupPattern },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Vars(Vec<String>),
}

/// `{ … }` block: a basic graph pattern plus filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPattern {
    pub triples: Vec<TriplePattern>,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternTerm {
    Var(String),
    Iri(String),
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    NotExists(GroupPattern),
    Contains {
        var: String,
        needle: String,
        negated: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Iri(String),
    PrefixedName(String, String),
    Var(String),
    Str(String),
    LangTag(String),
    DoubleCaret,
    Integer(String),
    Word(String),
    Punct(char),
}

/// Parse query text.
///
/// The `eli`, `jlaw`, `rdf` and `xsd` prefixes are predeclared; explicit
/// `PREFIX` declarations override them.
///
/// # Errors
/// `MalformedQuery` describing the first offending token.
pub fn parse_query(text: &str) -> Result<Query> {
    let tokens = tokenize(text).map_err(|reason| malformed(text, reason))?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        prefixes: ontology::PREFIXES
            .iter()
            .map(|(p, ns)| ((*p).to_string(), (*ns).to_string()))
            .collect(),
    };
    parser.query().map_err(|reason| malformed(text, reason))
}

fn malformed(text: &str, reason: String) -> LexGraphError {
    LexGraphError::MalformedQuery {
        query: text.split_whitespace().collect::<Vec<_>>().join(" "),
        reason,
    }
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let is_name_char = |c: char| c.is_alphanumeric() || c == '_' || c == '-';

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        match c {
            '<' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|c| *c == '>')
                    .ok_or("unterminated IRI")?;
                tokens.push(Token::Iri(chars[start..start + end].iter().collect()));
                i = start + end + 1;
            }
            '?' | '$' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && is_name_char(chars[j]) {
                    j += 1;
                }
                if j == start {
                    return Err(format!("empty variable name at offset {i}"));
                }
                tokens.push(Token::Var(chars[start..j].iter().collect()));
                i = j;
            }
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                let mut j = i + 1;
                loop {
                    let Some(&ch) = chars.get(j) else {
                        return Err("unterminated string literal".to_string());
                    };
                    if ch == quote {
                        break;
                    }
                    if ch == '\\' {
                        let escaped = chars.get(j + 1).ok_or("dangling escape")?;
                        value.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => *other,
                        });
                        j += 2;
                    } else {
                        value.push(ch);
                        j += 1;
                    }
                }
                tokens.push(Token::Str(value));
                i = j + 1;
            }
            '@' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '-') {
                    j += 1;
                }
                if j == start {
                    return Err("empty language tag".to_string());
                }
                tokens.push(Token::LangTag(chars[start..j].iter().collect()));
                i = j;
            }
            '^' if chars.get(i + 1) == Some(&'^') => {
                tokens.push(Token::DoubleCaret);
                i += 2;
            }
            '{' | '}' | '(' | ')' | '.' | ',' | '!' | '*' | ';' => {
                tokens.push(Token::Punct(c));
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                tokens.push(Token::Integer(chars[start..i].iter().collect()));
            }
            c if is_name_char(c) || c == ':' => {
                let start = i;
                while i < chars.len() && (is_name_char(chars[i]) || chars[i] == ':' || chars[i] == '.') {
                    i += 1;
                }
                // A trailing '.' terminates the triple, it is not part of the name
                while i > start && chars[i - 1] == '.' {
                    i -= 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.split_once(':') {
                    Some((prefix, local)) => {
                        tokens.push(Token::PrefixedName(prefix.to_string(), local.to_string()))
                    }
                    None => tokens.push(Token::Word(word)),
                }
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    prefixes: BTreeMap<String, String>,
}

type ParseResult<T> = std::result::Result<T, String>;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!("expected {keyword}, found {:?}", self.peek()))
        }
    }

    fn expect_punct(&mut self, punct: char) -> ParseResult<()> {
        match self.next() {
            Some(Token::Punct(p)) if p == punct => Ok(()),
            other => Err(format!("expected '{punct}', found {other:?}")),
        }
    }

    fn query(&mut self) -> ParseResult<Query> {
        while self.peek_keyword("PREFIX") {
            self.pos += 1;
            let prefix = match self.next() {
                Some(Token::PrefixedName(prefix, local)) if local.is_empty() => prefix,
                other => return Err(format!("expected prefix name, found {other:?}")),
            };
            let iri = match self.next() {
                Some(Token::Iri(iri)) => iri,
                other => return Err(format!("expected IRI for prefix {prefix}, found {other:?}")),
            };
            self.prefixes.insert(prefix, iri);
        }

        let query = if self.peek_keyword("ASK") {
            self.pos += 1;
            if self.peek_keyword("WHERE") {
                self.pos += 1;
            }
            Query::Ask {
                pattern: self.group()?,
            }
        } else if self.peek_keyword("SELECT") {
            self.pos += 1;
            if self.peek_keyword("DISTINCT") {
                self.pos += 1;
            }
            let projection = if matches!(self.peek(), Some(Token::Punct('*'))) {
                self.pos += 1;
                Projection::All
            } else {
                let mut vars = Vec::new();
                while let Some(Token::Var(v)) = self.peek() {
                    vars.push(v.clone());
                    self.pos += 1;
                }
                if vars.is_empty() {
                    return Err("SELECT needs '*' or at least one variable".to_string());
                }
                Projection::Vars(vars)
            };
            if self.peek_keyword("WHERE") {
                self.pos += 1;
            }
            Query::Select {
                projection,
                pattern: self.group()?,
            }
        } else {
            return Err(format!("expected ASK or SELECT, found {:?}", self.peek()));
        };

        match self.peek() {
            None => Ok(query),
            Some(token) => Err(format!("unexpected trailing token {token:?}")),
        }
    }

    fn group(&mut self) -> ParseResult<GroupPattern> {
        self.expect_punct('{')?;
        let mut group = GroupPattern::default();
        loop {
            match self.peek() {
                Some(Token::Punct('}')) => {
                    self.pos += 1;
                    return Ok(group);
                }
                Some(Token::Punct('.')) => {
                    self.pos += 1;
                }
                Some(Token::Word(w)) if w.eq_ignore_ascii_case("FILTER") => {
                    self.pos += 1;
                    group.filters.push(self.filter()?);
                }
                Some(_) => group.triples.push(self.triple()?),
                None => return Err("unterminated group pattern".to_string()),
            }
        }
    }

    fn filter(&mut self) -> ParseResult<Filter> {
        if self.peek_keyword("NOT") {
            self.pos += 1;
            self.expect_keyword("EXISTS")?;
            return Ok(Filter::NotExists(self.group()?));
        }

        self.expect_punct('(')?;
        let negated = matches!(self.peek(), Some(Token::Punct('!')));
        if negated {
            self.pos += 1;
        }
        self.expect_keyword("CONTAINS")?;
        self.expect_punct('(')?;
        let var = match self.next() {
            Some(Token::Var(v)) => v,
            other => return Err(format!("CONTAINS expects a variable, found {other:?}")),
        };
        self.expect_punct(',')?;
        let needle = match self.next() {
            Some(Token::Str(s)) => s,
            other => return Err(format!("CONTAINS expects a string, found {other:?}")),
        };
        self.expect_punct(')')?;
        self.expect_punct(')')?;
        Ok(Filter::Contains {
            var,
            needle,
            negated,
        })
    }

    fn triple(&mut self) -> ParseResult<TriplePattern> {
        let subject = self.term(false)?;
        let predicate = self.term(true)?;
        let object = self.term(false)?;
        if matches!(predicate, PatternTerm::Literal(_)) {
            return Err("literal in predicate position".to_string());
        }
        Ok(TriplePattern {
            subject,
            predicate,
            object,
        })
    }

    fn term(&mut self, predicate_position: bool) -> ParseResult<PatternTerm> {
        match self.next() {
            Some(Token::Var(v)) => Ok(PatternTerm::Var(v)),
            Some(Token::Iri(iri)) => Ok(PatternTerm::Iri(iri)),
            Some(Token::PrefixedName(prefix, local)) => Ok(PatternTerm::Iri(self.expand(&prefix, &local)?)),
            Some(Token::Word(w)) if predicate_position && w == "a" => {
                Ok(PatternTerm::Iri(ontology::RDF_TYPE.to_string()))
            }
            Some(Token::Integer(n)) => Ok(PatternTerm::Literal(Literal::typed(n, ontology::XSD_INTEGER))),
            Some(Token::Str(value)) => {
                let literal = match self.peek() {
                    Some(Token::LangTag(lang)) => {
                        let lang = lang.clone();
                        self.pos += 1;
                        Literal::lang(value, lang)
                    }
                    Some(Token::DoubleCaret) => {
                        self.pos += 1;
                        let datatype = match self.next() {
                            Some(Token::Iri(iri)) => iri,
                            Some(Token::PrefixedName(prefix, local)) => self.expand(&prefix, &local)?,
                            other => return Err(format!("expected datatype IRI, found {other:?}")),
                        };
                        Literal::typed(value, datatype)
                    }
                    _ => Literal::plain(value),
                };
                Ok(PatternTerm::Literal(literal))
            }
            other => Err(format!("expected a term, found {other:?}")),
        }
    }

    fn expand(&self, prefix: &str, local: &str) -> ParseResult<String> {
        self.prefixes
            .get(prefix)
            .map(|ns| format!("{ns}{local}"))
            .ok_or_else(|| format!("undeclared prefix '{prefix}:'"))
    }
}
