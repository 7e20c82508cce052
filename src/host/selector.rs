// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSS selector parsing and matching against the host tree
//!
//! Supports type, universal, id, class and attribute selectors, a set of
//! structural and form pseudo-classes, the four combinators and comma lists.

use super::tree::{NodeId, NodeKind, Tree};
use crate::error::{Error, Result};

/// A parsed selector list (`a, b > c`)
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, stored right to left
#[derive(Debug, Clone)]
struct ComplexSelector {
    /// Rightmost compound, the one the matched element must satisfy
    subject: Compound,
    /// (combinator, compound) pairs walking leftwards from the subject
    ancestors: Vec<(Combinator, Compound)>,
}

/// Combinator between compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant (space)
    Descendant,
    /// Child (>)
    Child,
    /// Adjacent sibling (+)
    AdjacentSibling,
    /// General sibling (~)
    GeneralSibling,
}

type Compound = Vec<SelectorPart>;

/// A part of a compound selector
#[derive(Debug, Clone)]
pub enum SelectorPart {
    /// Universal selector (*)
    Universal,
    /// Tag name
    Tag(String),
    /// ID selector (#id)
    Id(String),
    /// Class selector (.class)
    Class(String),
    /// Attribute selector ([attr], [attr=value], etc.)
    Attribute(AttributeSelector),
    /// Pseudo-class (:first-child, etc.)
    PseudoClass(PseudoClass),
}

/// Attribute selector
#[derive(Debug, Clone)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttributeOperator>,
    pub value: Option<String>,
    pub case_insensitive: bool,
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [attr=value] - exact match
    Equals,
    /// [attr~=value] - word in space-separated list
    Includes,
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch,
    /// [attr^=value] - starts with
    Prefix,
    /// [attr$=value] - ends with
    Suffix,
    /// [attr*=value] - contains substring
    Substring,
}

/// Pseudo-class selectors
#[derive(Debug, Clone)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild(NthExpr),
    Empty,
    Root,
    Checked,
    Disabled,
    Enabled,
    Required,
    Optional,
    Not(Box<Selector>),
}

/// An+B expression for `:nth-child`
#[derive(Debug, Clone)]
pub struct NthExpr {
    pub a: i32,
    pub b: i32,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(selector: &str) -> Result<Self> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(Error::selector(selector, "empty selector"));
        }

        SelectorParser::new(trimmed)
            .parse_list()
            .map_err(|reason| Error::selector(selector, reason))
    }

    /// Check if element `id` matches any alternative
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        tree.is_element(id) && self.alternatives.iter().any(|c| c.matches(tree, id))
    }

    /// Matching elements below `scope`, in document order
    pub fn select_all(&self, tree: &Tree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|&id| self.matches(tree, id))
            .collect()
    }

    /// First matching element below `scope`
    pub fn select_first(&self, tree: &Tree, scope: NodeId) -> Option<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .skip(1)
            .find(|&id| self.matches(tree, id))
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        compound_matches(&self.subject, tree, id) && self.matches_from(0, tree, id)
    }

    /// Match `ancestors[index..]` given that the element at `index` matched `id`
    fn matches_from(&self, index: usize, tree: &Tree, id: NodeId) -> bool {
        let Some((combinator, compound)) = self.ancestors.get(index) else {
            return true;
        };

        match combinator {
            Combinator::Child => element_parent(tree, id).is_some_and(|parent| {
                compound_matches(compound, tree, parent)
                    && self.matches_from(index + 1, tree, parent)
            }),
            Combinator::Descendant => {
                let mut current = element_parent(tree, id);
                while let Some(ancestor) = current {
                    if compound_matches(compound, tree, ancestor)
                        && self.matches_from(index + 1, tree, ancestor)
                    {
                        return true;
                    }
                    current = element_parent(tree, ancestor);
                }
                false
            }
            Combinator::AdjacentSibling => previous_siblings(tree, id)
                .first()
                .is_some_and(|&sibling| {
                    compound_matches(compound, tree, sibling)
                        && self.matches_from(index + 1, tree, sibling)
                }),
            Combinator::GeneralSibling => {
                previous_siblings(tree, id).into_iter().any(|sibling| {
                    compound_matches(compound, tree, sibling)
                        && self.matches_from(index + 1, tree, sibling)
                })
            }
        }
    }
}

fn element_parent(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.parent(id).filter(|&p| tree.is_element(p))
}

/// Element siblings before `id`, nearest first
fn previous_siblings(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    let Some(parent) = tree.parent(id) else {
        return Vec::new();
    };
    let siblings = tree.element_children(parent);
    let position = siblings.iter().position(|&s| s == id).unwrap_or(0);
    siblings[..position].iter().rev().copied().collect()
}

/// 1-based index among element siblings, and the sibling count
fn sibling_position(tree: &Tree, id: NodeId) -> (usize, usize) {
    match tree.parent(id) {
        Some(parent) => {
            let siblings = tree.element_children(parent);
            let index = siblings.iter().position(|&s| s == id).unwrap_or(0);
            (index + 1, siblings.len())
        }
        None => (1, 1),
    }
}

fn compound_matches(compound: &Compound, tree: &Tree, id: NodeId) -> bool {
    compound.iter().all(|part| part_matches(part, tree, id))
}

fn part_matches(part: &SelectorPart, tree: &Tree, id: NodeId) -> bool {
    match part {
        SelectorPart::Universal => true,
        SelectorPart::Tag(tag) => tree.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag)),
        SelectorPart::Id(expected) => tree.attribute(id, "id") == Some(expected.as_str()),
        SelectorPart::Class(class) => tree
            .attribute(id, "class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class.as_str())),
        SelectorPart::Attribute(attr) => attribute_matches(attr, tree, id),
        SelectorPart::PseudoClass(pseudo) => pseudo_matches(pseudo, tree, id),
    }
}

fn attribute_matches(attr: &AttributeSelector, tree: &Tree, id: NodeId) -> bool {
    let Some(value) = tree.attribute(id, &attr.name) else {
        return false;
    };

    let (Some(op), Some(target)) = (&attr.operator, &attr.value) else {
        return true;
    };

    let (value, target) = if attr.case_insensitive {
        (value.to_lowercase(), target.to_lowercase())
    } else {
        (value.to_string(), target.clone())
    };

    match op {
        AttributeOperator::Equals => value == target,
        AttributeOperator::Includes => value.split_whitespace().any(|w| w == target),
        AttributeOperator::DashMatch => {
            value == target || value.starts_with(&format!("{}-", target))
        }
        AttributeOperator::Prefix => !target.is_empty() && value.starts_with(&target),
        AttributeOperator::Suffix => !target.is_empty() && value.ends_with(&target),
        AttributeOperator::Substring => !target.is_empty() && value.contains(&target),
    }
}

fn pseudo_matches(pseudo: &PseudoClass, tree: &Tree, id: NodeId) -> bool {
    match pseudo {
        PseudoClass::FirstChild => sibling_position(tree, id).0 == 1,
        PseudoClass::LastChild => {
            let (index, count) = sibling_position(tree, id);
            index == count
        }
        PseudoClass::OnlyChild => sibling_position(tree, id).1 == 1,
        PseudoClass::NthChild(expr) => expr.matches(sibling_position(tree, id).0 as i32),
        PseudoClass::Empty => tree.children(id).iter().all(|&c| {
            matches!(
                tree.kind(c),
                Some(NodeKind::Comment(_)) | Some(NodeKind::Doctype(_))
            )
        }),
        PseudoClass::Root => tree.document_element() == Some(id),
        PseudoClass::Checked => {
            tree.has_attribute(id, "checked") || tree.has_attribute(id, "selected")
        }
        PseudoClass::Disabled => is_form_control(tree, id) && tree.has_attribute(id, "disabled"),
        PseudoClass::Enabled => is_form_control(tree, id) && !tree.has_attribute(id, "disabled"),
        PseudoClass::Required => is_input(tree, id) && tree.has_attribute(id, "required"),
        PseudoClass::Optional => is_input(tree, id) && !tree.has_attribute(id, "required"),
        PseudoClass::Not(selector) => !selector.matches(tree, id),
    }
}

fn is_form_control(tree: &Tree, id: NodeId) -> bool {
    matches!(
        tree.tag(id),
        Some("button" | "input" | "select" | "textarea" | "option" | "optgroup" | "fieldset")
    )
}

fn is_input(tree: &Tree, id: NodeId) -> bool {
    matches!(tree.tag(id), Some("input" | "select" | "textarea"))
}

impl NthExpr {
    /// Check if a 1-based index matches this expression
    pub fn matches(&self, index: i32) -> bool {
        if self.a == 0 {
            return index == self.b;
        }

        let (a, diff) = (i64::from(self.a), i64::from(index) - i64::from(self.b));
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }

    /// Parse an An+B expression
    pub fn parse(expr: &str) -> Option<Self> {
        let expr: String = expr
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match expr.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            _ => {}
        }

        if let Ok(n) = expr.parse::<i32>() {
            return Some(Self { a: 0, b: n });
        }

        let (a_part, b_part) = expr.split_once('n')?;
        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            s => s.parse().ok()?,
        };
        let b = match b_part {
            "" => 0,
            s => s.strip_prefix('+').unwrap_or(s).parse().ok()?,
        };
        Some(Self { a, b })
    }
}

/// Recursive-descent selector parser; errors are plain reasons
struct SelectorParser {
    input: Vec<char>,
    pos: usize,
}

type ParseResult<T> = std::result::Result<T, String>;

impl SelectorParser {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse_list(&mut self) -> ParseResult<Selector> {
        let mut alternatives = vec![self.parse_complex()?];
        while self.peek() == Some(',') {
            self.advance();
            alternatives.push(self.parse_complex()?);
        }
        if let Some(c) = self.peek() {
            return Err(format!("unexpected '{}'", c));
        }
        Ok(Selector { alternatives })
    }

    fn parse_complex(&mut self) -> ParseResult<ComplexSelector> {
        self.skip_whitespace();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::AdjacentSibling,
                Some('~') => Combinator::GeneralSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(format!("unexpected '{}'", c)),
            };
            if combinator != Combinator::Descendant {
                self.advance();
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        let subject = compounds.pop().unwrap_or_default();
        let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
        Ok(ComplexSelector { subject, ancestors })
    }

    fn parse_compound(&mut self) -> ParseResult<Compound> {
        let mut parts = Vec::new();

        loop {
            match self.peek() {
                Some('#') => {
                    self.advance();
                    parts.push(SelectorPart::Id(self.read_identifier()?));
                }
                Some('.') => {
                    self.advance();
                    parts.push(SelectorPart::Class(self.read_identifier()?));
                }
                Some('[') => parts.push(SelectorPart::Attribute(self.parse_attribute()?)),
                Some(':') => parts.push(SelectorPart::PseudoClass(self.parse_pseudo()?)),
                Some('*') if parts.is_empty() => {
                    self.advance();
                    parts.push(SelectorPart::Universal);
                }
                Some(c) if parts.is_empty() && (c.is_alphabetic() || c == '_' || c == '-') => {
                    let tag = self.read_identifier()?;
                    parts.push(SelectorPart::Tag(tag.to_lowercase()));
                }
                _ => break,
            }
        }

        if parts.is_empty() {
            return Err(match self.peek() {
                Some(c) => format!("unexpected '{}'", c),
                None => "expected a selector".to_string(),
            });
        }
        Ok(parts)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    /// Returns whether any whitespace was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
        self.pos > start
    }

    fn read_identifier(&mut self) -> ParseResult<String> {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if result.is_empty() {
            return Err("expected identifier".to_string());
        }
        Ok(result)
    }

    fn parse_attribute(&mut self) -> ParseResult<AttributeSelector> {
        self.advance(); // '['

        self.skip_whitespace();
        let name = self.read_identifier()?.to_lowercase();
        self.skip_whitespace();

        let mut operator = None;
        let mut value = None;
        let mut case_insensitive = false;

        if let Some(c) = self.peek() {
            if c != ']' {
                let op = match c {
                    '=' => AttributeOperator::Equals,
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    '*' => AttributeOperator::Substring,
                    _ => return Err(format!("unknown attribute operator '{}'", c)),
                };
                self.advance();
                if op != AttributeOperator::Equals {
                    self.expect('=')?;
                }
                operator = Some(op);

                self.skip_whitespace();
                value = Some(self.read_string_or_ident()?);
                self.skip_whitespace();

                if let Some('i') | Some('I') = self.peek() {
                    case_insensitive = true;
                    self.advance();
                    self.skip_whitespace();
                }
            }
        }

        self.expect(']')?;

        Ok(AttributeSelector {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> ParseResult<PseudoClass> {
        self.advance(); // ':'

        let name = self.read_identifier()?;
        let pseudo = match name.to_lowercase().as_str() {
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "empty" => PseudoClass::Empty,
            "root" => PseudoClass::Root,
            "checked" => PseudoClass::Checked,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "required" => PseudoClass::Required,
            "optional" => PseudoClass::Optional,
            "nth-child" => {
                let expr = self.parse_function_arg()?;
                PseudoClass::NthChild(
                    NthExpr::parse(&expr)
                        .ok_or_else(|| format!("invalid nth expression '{}'", expr))?,
                )
            }
            "not" => {
                let inner = self.parse_function_arg()?;
                let selector = SelectorParser::new(inner.trim()).parse_list()?;
                PseudoClass::Not(Box::new(selector))
            }
            other => return Err(format!("unsupported pseudo-class ':{}'", other)),
        };

        Ok(pseudo)
    }

    fn parse_function_arg(&mut self) -> ParseResult<String> {
        self.expect('(')?;
        let mut depth = 1;
        let mut result = String::new();

        while let Some(c) = self.advance() {
            match c {
                '(' => {
                    depth += 1;
                    result.push(c);
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(result.trim().to_string());
                    }
                    result.push(c);
                }
                _ => result.push(c),
            }
        }

        Err("unterminated argument list".to_string())
    }

    fn read_string_or_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let mut result = String::new();
                while let Some(c) = self.advance() {
                    if c == quote {
                        return Ok(result);
                    }
                    if c == '\\' {
                        if let Some(escaped) = self.advance() {
                            result.push(escaped);
                        }
                    } else {
                        result.push(c);
                    }
                }
                Err("unterminated string".to_string())
            }
            _ => self.read_identifier(),
        }
    }

    fn expect(&mut self, expected: char) -> ParseResult<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected '{}', got '{}'", expected, c)),
            None => Err(format!("expected '{}', got end of input", expected)),
        }
    }
}
