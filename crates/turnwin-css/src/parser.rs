//! Selector parser
//!
//! Hand-written recursive descent over the selector grammar used by chat
//! platform tables. Anything outside that dialect is reported as an error
//! rather than silently matching nothing.

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, RelativeSelector, SelectorComponent, SelectorList,
};
use crate::SelectorError;

/// Selector parser over one input string
pub struct SelectorParser<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
        }
    }

    /// Parse the whole input as a selector list
    pub fn parse(mut self) -> Result<SelectorList, SelectorError> {
        self.skip_ws();
        if self.at_end() {
            return Err(SelectorError::Empty);
        }
        let list = self.parse_list(false)?;
        self.skip_ws();
        match self.peek() {
            None => Ok(list),
            Some(c) => Err(self.unexpected(c)),
        }
    }

    // === Cursor helpers ===

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn byte_offset(&self) -> usize {
        self.chars.get(self.pos).map(|&(i, _)| i).unwrap_or(self.input.len())
    }

    /// Skip whitespace, reporting whether any was consumed
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn unexpected(&self, ch: char) -> SelectorError {
        SelectorError::UnexpectedChar {
            ch,
            offset: self.byte_offset(),
        }
    }

    fn fail_here(&self) -> SelectorError {
        match self.peek() {
            Some(c) => self.unexpected(c),
            None => SelectorError::UnexpectedEnd,
        }
    }

    // === Grammar ===

    /// `complex (, complex)*`, stopping before `)` when nested
    fn parse_list(&mut self, nested: bool) -> Result<SelectorList, SelectorError> {
        let start = self.byte_offset();
        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') if nested => break,
                None if !nested => break,
                _ => return Err(self.fail_here()),
            }
        }
        let source = self.input[start..self.byte_offset()].trim().to_string();
        Ok(SelectorList { selectors, source })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::Subsequent,
                Some(',') | Some(')') | None => break,
                Some(_) if had_ws => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) => {
                components.push(SelectorComponent::Type(self.parse_ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            let component = match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    SelectorComponent::Id(self.parse_ident()?)
                }
                Some('.') => {
                    self.pos += 1;
                    SelectorComponent::Class(self.parse_ident()?)
                }
                Some('[') => SelectorComponent::Attribute(self.parse_attribute()?),
                Some(':') => SelectorComponent::PseudoClass(self.parse_pseudo()?),
                _ => break,
            };
            components.push(component);
        }

        if components.is_empty() {
            return Err(self.fail_here());
        }
        Ok(CompoundSelector { components })
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.peek() {
                    Some(escaped) => {
                        out.push(escaped);
                        self.pos += 1;
                    }
                    None => return Err(SelectorError::UnexpectedEnd),
                }
            } else if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.fail_here());
        }
        Ok(out)
    }

    fn parse_string(&mut self) -> Result<String, SelectorError> {
        let Some(quote) = self.peek() else {
            return Err(SelectorError::UnexpectedEnd);
        };
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.expect('[')?;
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                self.expect('=')?;
                c
            }
            _ => return Err(self.fail_here()),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some('"') | Some('\'') => self.parse_string()?,
            _ => self.parse_ident()?,
        };
        self.skip_ws();

        let mut case_insensitive = false;
        match self.peek() {
            Some('i') | Some('I') => {
                self.pos += 1;
                case_insensitive = true;
                self.skip_ws();
            }
            Some('s') | Some('S') => {
                self.pos += 1;
                self.skip_ws();
            }
            _ => {}
        }
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Includes(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        self.expect(':')?;
        if self.peek() == Some(':') {
            self.pos += 1;
            let name = self.parse_ident().unwrap_or_default();
            return Err(SelectorError::UnsupportedPseudo(format!("::{name}")));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();

        if self.peek() != Some('(') {
            return match name.as_str() {
                "root" => Ok(PseudoClass::Root),
                "empty" => Ok(PseudoClass::Empty),
                "first-child" => Ok(PseudoClass::FirstChild),
                "last-child" => Ok(PseudoClass::LastChild),
                "only-child" => Ok(PseudoClass::OnlyChild),
                _ => Err(SelectorError::UnsupportedPseudo(name)),
            };
        }

        self.pos += 1;
        let pseudo = match name.as_str() {
            "not" => PseudoClass::Not(self.parse_list(true)?),
            "is" => PseudoClass::Is(self.parse_list(true)?),
            "where" => PseudoClass::Where(self.parse_list(true)?),
            "has" => PseudoClass::Has(self.parse_relative_list()?),
            "nth-child" | "nth-last-child" => {
                let raw = self.take_until(')');
                let expr = NthExpression::parse(&raw).ok_or(SelectorError::InvalidNth(raw))?;
                if name == "nth-child" {
                    PseudoClass::NthChild(expr)
                } else {
                    PseudoClass::NthLastChild(expr)
                }
            }
            _ => return Err(SelectorError::UnsupportedPseudo(name)),
        };
        self.skip_ws();
        self.expect(')')?;
        Ok(pseudo)
    }

    fn parse_relative_list(&mut self) -> Result<Vec<RelativeSelector>, SelectorError> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::Subsequent,
                _ => Combinator::Descendant,
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            let selector = self.parse_complex()?;
            out.push(RelativeSelector {
                combinator,
                selector,
            });
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => break,
                _ => return Err(self.fail_here()),
            }
        }
        Ok(out)
    }

    fn take_until(&mut self, end: char) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == end {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
