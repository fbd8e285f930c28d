//! Path queries over JSON trees
//!
//! The grammar is a small JSON-path dialect:
//!
//! ```text
//! path      := root? step*           (a path may also start with a bare name, `*` or `[`)
//! root      := '$'
//! step      := '.' name | '.' '*' | '..' (name | '*' | bracket) | bracket
//! bracket   := '[' ( '*' | integer | quoted ) ']'
//! ```
//!
//! Negative indices count from the end of an array. Quoted keys accept
//! `'...'` or `"..."` with backslash escapes.

use crate::error::PathError;
use serde_json::Value;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// One step of a compiled path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Object field by name
    Field(String),
    /// Array element; negative values count from the end
    Index(i64),
    /// Every child of an object or array
    Wildcard,
    /// The current node and all of its descendants, in pre-order
    Descendants,
}

/// One key in a concrete location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// Object field
    Field(String),
    /// Array index
    Index(usize),
}

/// Concrete location of a value inside a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location(Vec<PathKey>);

impl Location {
    /// The root of the tree
    pub fn root() -> Self {
        Self::default()
    }

    /// Keys from the root down
    pub fn keys(&self) -> &[PathKey] {
        &self.0
    }

    /// True for the root location
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Location of a child
    pub fn child(&self, key: PathKey) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Self(keys)
    }

    /// Look the location up in `tree`
    pub fn get<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(tree, |node, key| match key {
            PathKey::Field(name) => node.as_object()?.get(name),
            PathKey::Index(i) => node.as_array()?.get(*i),
        })
    }

    /// Mutable lookup in `tree`
    pub fn get_mut<'a>(&self, tree: &'a mut Value) -> Option<&'a mut Value> {
        self.0.iter().try_fold(tree, |node, key| match key {
            PathKey::Field(name) => node.as_object_mut()?.get_mut(name),
            PathKey::Index(i) => node.as_array_mut()?.get_mut(*i),
        })
    }
}

impl fmt::Display for Location {
    /// Renders a path that compiles back to this exact location, e.g.
    /// `projects[0].description`. The root renders as `$`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, key) in self.0.iter().enumerate() {
            match key {
                PathKey::Field(name) if is_bare_name(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathKey::Field(name) => {
                    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
                    write!(f, "['{}']", escaped)?;
                }
                PathKey::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// A parsed, reusable path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    source: String,
    selectors: Vec<Selector>,
}

impl CompiledPath {
    /// Parse a query
    ///
    /// # Examples
    ///
    /// ```
    /// use etk_engine::CompiledPath;
    /// use serde_json::json;
    ///
    /// let path = CompiledPath::parse("projects[*].name").unwrap();
    /// let tree = json!({"projects": [{"name": "etk"}, {"name": "rltk"}]});
    /// let names: Vec<_> = path.resolve(&tree).into_iter().map(|(_, v)| v.clone()).collect();
    /// assert_eq!(names, [json!("etk"), json!("rltk")]);
    /// ```
    pub fn parse(query: &str) -> Result<Self, PathError> {
        let selectors = Parser::new(query).parse()?;
        Ok(Self {
            source: query.to_string(),
            selectors,
        })
    }

    /// The query this path was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compiled selectors
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Resolve against a tree
    ///
    /// Never fails: branches with missing keys, out-of-range indices or
    /// mismatched types simply produce nothing. Results are in document order.
    pub fn resolve<'a>(&self, tree: &'a Value) -> Vec<(Location, &'a Value)> {
        let mut current = vec![(Location::root(), tree)];
        for selector in &self.selectors {
            let mut next = Vec::new();
            for (location, node) in current {
                apply(selector, location, node, &mut next);
            }
            current = next;
        }
        current
    }
}

fn apply<'a>(
    selector: &Selector,
    location: Location,
    node: &'a Value,
    out: &mut Vec<(Location, &'a Value)>,
) {
    match selector {
        Selector::Field(name) => {
            if let Some(child) = node.as_object().and_then(|map| map.get(name)) {
                out.push((location.child(PathKey::Field(name.clone())), child));
            }
        }
        Selector::Index(index) => {
            if let Some(items) = node.as_array() {
                let len = items.len() as i64;
                let idx = if *index < 0 { len + index } else { *index };
                if (0..len).contains(&idx) {
                    let idx = idx as usize;
                    out.push((location.child(PathKey::Index(idx)), &items[idx]));
                }
            }
        }
        Selector::Wildcard => push_children(&location, node, out),
        Selector::Descendants => push_descendants(location, node, out),
    }
}

fn push_children<'a>(location: &Location, node: &'a Value, out: &mut Vec<(Location, &'a Value)>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                out.push((location.child(PathKey::Field(key.clone())), child));
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                out.push((location.child(PathKey::Index(idx)), child));
            }
        }
        _ => {}
    }
}

fn push_descendants<'a>(location: Location, node: &'a Value, out: &mut Vec<(Location, &'a Value)>) {
    let mut children = Vec::new();
    push_children(&location, node, &mut children);
    out.push((location, node));
    for (child_location, child) in children {
        push_descendants(child_location, child, out);
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || (!c.is_ascii() && c.is_alphanumeric())
}

fn is_bare_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

struct Parser<'a> {
    query: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(query: &'a str) -> Self {
        Self {
            query,
            chars: query.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<Vec<Selector>, PathError> {
        if self.query.is_empty() {
            return Err(self.error("empty path"));
        }

        let mut selectors = Vec::new();
        if !self.eat('$') {
            match self.peek() {
                Some('[') => {}
                Some('*') => {
                    self.bump();
                    selectors.push(Selector::Wildcard);
                }
                Some(c) if is_name_char(c) => selectors.push(Selector::Field(self.name()?)),
                Some(c) => return Err(self.error(format!("unexpected {:?} at start of path", c))),
                None => return Err(self.error("empty path")),
            }
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.bump();
                    if self.eat('.') {
                        selectors.push(Selector::Descendants);
                        if self.peek() == Some('[') {
                            continue;
                        }
                    }
                    match self.peek() {
                        Some('*') => {
                            self.bump();
                            selectors.push(Selector::Wildcard);
                        }
                        Some(c) if is_name_char(c) => selectors.push(Selector::Field(self.name()?)),
                        Some(c) => return Err(self.error(format!("unexpected {:?} after '.'", c))),
                        None => return Err(self.error("path ends with '.'")),
                    }
                }
                '[' => selectors.push(self.bracket()?),
                c => return Err(self.error(format!("unexpected {:?}", c))),
            }
        }

        Ok(selectors)
    }

    fn bracket(&mut self) -> Result<Selector, PathError> {
        self.bump(); // '['
        let selector = match self.peek() {
            Some('*') => {
                self.bump();
                Selector::Wildcard
            }
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                Selector::Field(self.quoted(quote)?)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => Selector::Index(self.integer()?),
            Some(']') => return Err(self.error("empty brackets")),
            Some(c) => return Err(self.error(format!("unexpected {:?} inside brackets", c))),
            None => return Err(self.error("unclosed '['")),
        };
        if !self.eat(']') {
            return Err(self.error("unclosed '['"));
        }
        Ok(selector)
    }

    fn name(&mut self) -> Result<String, PathError> {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| is_name_char(*c)) {
            name.push(c);
            self.bump();
        }
        if name.is_empty() {
            return Err(self.error("expected a field name"));
        }
        Ok(name)
    }

    fn integer(&mut self) -> Result<i64, PathError> {
        let start = self.position();
        let mut digits = String::new();
        if self.eat('-') {
            digits.push('-');
        }
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.bump();
        }
        digits
            .parse::<i64>()
            .map_err(|_| PathError::new(self.query, start, format!("invalid index {:?}", digits)))
    }

    fn quoted(&mut self, quote: char) -> Result<String, PathError> {
        let mut key = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => key.push(escaped),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) if c == quote => return Ok(key),
                Some(c) => key.push(c),
                None => return Err(self.error("unterminated quoted key")),
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn position(&mut self) -> usize {
        let len = self.query.len();
        self.chars.peek().map_or(len, |(i, _)| *i)
    }

    fn error(&mut self, reason: impl Into<String>) -> PathError {
        let position = self.position();
        PathError::new(self.query, position, reason)
    }
}
