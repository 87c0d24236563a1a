//! Grammar nodes.
//!
//! An [`Expr`] is a cheap-clone handle to an immutable [`Node`]. Grammars are
//! DAGs of nodes; the only back-edges go through [`NodeKind::Lazy`], whose
//! resolver runs at parse time.

use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};
use strand_core::{Colors, Value};

use super::error::GrammarError;
use super::lookahead::Head;

/// Stable node identity, assigned from a process-wide counter at construction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value for display/debugging.
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
}

/// The closed set of grammar constructs.
#[derive(Debug)]
pub enum NodeKind {
    /// Exact text; yields no value.
    Literal(String),
    /// Anchored regex; yields the matched text.
    Pattern(Pattern),
    /// Concatenation; yields an array assembled from the children.
    Sequence(Vec<Expr>),
    /// Ordered choice.
    Alternative(Expr, Expr),
    /// Indirection resolved on every visit.
    Lazy(Resolver),
    /// Marks an array result for splicing into the enclosing sequence.
    Flatten(Expr),
    /// Merges the object elements of an array result.
    Reduce(Expr),
    /// One or more items, spliced into a flat array. `[item, rest]`: the
    /// flattened item and the flattened `(self | empty([]))` tail. The engine
    /// loops over items instead of descending into the tail; the tail still
    /// serves as each item's continuation and as the recursive structure seen
    /// by lookahead and validation.
    Repeat([Expr; 2]),
    /// Consumes up to the boundary implied by what follows, optionally
    /// re-parsing the consumed span with a sub-grammar.
    Wildcard(Option<Expr>),
    /// Probe for a fixed string; yields `true`.
    Exists(String),
    /// Wraps the child's value as `{key: value}`.
    Field(String, Expr),
    /// Consumes the rest of the input through a transform.
    FunctionMatch(Transform),
    /// Client-supplied terminal parser.
    Primitive(Rc<dyn Primitive>),
    /// Zero-width; yields the stored value (or nothing).
    Empty(Option<Value>),
    /// Succeeds only at end of input, yielding the stored value (or nothing).
    End(Option<Value>),
}

/// Terminal parser with its own lookahead.
///
/// `parse` runs against the input of the current session (a wildcard's span
/// inside a sub-grammar) and returns the value and the end offset, which must
/// lie on a char boundary at or after `pos`. An `Err` is a match failure
/// carrying its message.
pub trait Primitive {
    /// Shown in grammar notation and error messages.
    fn name(&self) -> &str;

    fn parse(&self, input: &str, pos: usize) -> Result<(Option<Value>, usize), String>;

    /// Possible beginnings. Include [`Head::Transparent`] when the parser can
    /// succeed without consuming input.
    fn heads(&self) -> Vec<Head> {
        vec![Head::Unknown]
    }

    /// Lower bound on the bytes any successful parse consumes.
    fn min_len(&self) -> usize {
        0
    }
}

impl fmt::Debug for dyn Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive({})", self.name())
    }
}

/// Handle to a grammar node. Cloning shares the node.
#[derive(Clone)]
pub struct Expr(Rc<Node>);

impl Expr {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self(Rc::new(Node {
            id: NodeId::next(),
            kind,
        }))
    }

    /// Build a node that refers to itself through a weak handle.
    ///
    /// `build` receives the weak handle of the node under construction.
    pub(crate) fn cyclic(build: impl FnOnce(&Weak<Node>) -> NodeKind) -> Self {
        let id = NodeId::next();
        Self(Rc::new_cyclic(|weak| Node {
            id,
            kind: build(weak),
        }))
    }

    pub(crate) fn from_weak(weak: &Weak<Node>) -> Option<Self> {
        weak.upgrade().map(Self)
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Whether this node is a plain literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::Literal(text) => Some(text),
            _ => None,
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Expr {}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Expr::new(NodeKind::Literal(text.to_owned()))
    }
}

impl From<String> for Expr {
    fn from(text: String) -> Self {
        Expr::new(NodeKind::Literal(text))
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

/// Compiled regex plus the statically known minimum match length.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
    min_len: usize,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        let invalid = |message: String| GrammarError::InvalidPattern {
            pattern: source.to_owned(),
            message,
        };

        let hir = regex_syntax::parse(source).map_err(|e| invalid(e.to_string()))?;
        let regex = Regex::new(source).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            source: source.to_owned(),
            regex,
            min_len: hir.properties().minimum_len().unwrap_or(0),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Minimum number of bytes any match consumes.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// End offset of an anchored match starting at `pos`.
    pub(crate) fn match_at(&self, haystack: &str, pos: usize) -> Option<usize> {
        let input = Input::new(&haystack[pos..]).anchored(Anchored::Yes);
        self.regex.find(input).map(|m| pos + m.end())
    }

    /// Start offset of the first match at or after `pos`.
    pub(crate) fn find_from(&self, haystack: &str, pos: usize) -> Option<usize> {
        self.regex
            .find(Input::new(&haystack[pos..]))
            .map(|m| pos + m.start())
    }
}

/// Resolver thunk of a lazy reference.
#[derive(Clone)]
pub struct Resolver(Rc<dyn Fn() -> Expr>);

impl Resolver {
    pub(crate) fn new(resolve: impl Fn() -> Expr + 'static) -> Self {
        Self(Rc::new(resolve))
    }

    /// Produce the referenced node. Called afresh on every visit.
    pub fn resolve(&self) -> Expr {
        (self.0)()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver")
    }
}

/// User transform applied by a function match.
#[derive(Clone)]
pub struct Transform(Rc<dyn Fn(&str) -> Result<Value, String>>);

impl Transform {
    pub(crate) fn new(apply: impl Fn(&str) -> Result<Value, String> + 'static) -> Self {
        Self(Rc::new(apply))
    }

    pub fn apply(&self, text: &str) -> Result<Value, String> {
        (self.0)(text)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform")
    }
}

/// Compact grammar notation. Lazy references are not expanded.
///
/// `"lit"` literal, `/re/` pattern, `(a b)` sequence, `(a | b)` choice,
/// `@lazy`, `...x` flatten (repeats print as their flattened body),
/// `reduce(x)`, `*` wildcard, `*<x>` wildcard with sub-grammar, `?"x"` exists,
/// `{k: x}` field, `fn` transform, `%name` primitive, `empty(v)`, `nothing`,
/// `$` end, `$(v)` end with a value.
impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Literal(text) => write!(f, "{text:?}"),
            NodeKind::Pattern(p) => write!(f, "/{}/", p.as_str()),
            NodeKind::Sequence(children) => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child:?}")?;
                }
                f.write_str(")")
            }
            NodeKind::Alternative(a, b) => write!(f, "({a:?} | {b:?})"),
            NodeKind::Lazy(_) => f.write_str("@lazy"),
            NodeKind::Flatten(child) => write!(f, "...{child:?}"),
            NodeKind::Reduce(child) => write!(f, "reduce({child:?})"),
            NodeKind::Repeat([item, rest]) => write!(f, "...({item:?} {rest:?})"),
            NodeKind::Wildcard(None) => f.write_str("*"),
            NodeKind::Wildcard(Some(sub)) => write!(f, "*<{sub:?}>"),
            NodeKind::Exists(target) => write!(f, "?{target:?}"),
            NodeKind::Field(key, child) => write!(f, "{{{key}: {child:?}}}"),
            NodeKind::FunctionMatch(_) => f.write_str("fn"),
            NodeKind::Empty(Some(value)) => {
                write!(f, "empty({})", value.format(false, Colors::OFF))
            }
            NodeKind::Primitive(primitive) => write!(f, "%{}", primitive.name()),
            NodeKind::Empty(None) => f.write_str("nothing"),
            NodeKind::End(None) => f.write_str("$"),
            NodeKind::End(Some(value)) => {
                write!(f, "$({})", value.format(false, Colors::OFF))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
