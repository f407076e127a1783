// Circuit Model
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::error::SolveError;

/// How long reading a leaf takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latency {
    /// The value is available right away.
    #[default]
    Immediate,
    /// The value becomes available after the given delay.
    After(Duration),
    /// The read never finishes; only cancellation ends it.
    Never,
}

/// A boolean input of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub value: bool,
    pub latency: Latency,
}

impl Leaf {
    pub fn new(value: bool) -> Self {
        Self {
            value,
            latency: Latency::Immediate,
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }
}

/// Gates whose result window depends only on the child count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
}

/// Gates parameterized by an integer threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdKind {
    /// True iff more than `threshold` children are true.
    Gt,
    /// True iff fewer than `threshold` children are true.
    Lt,
}

/// The kind tag of a node, as seen by code that does not match on [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Not,
    And,
    Or,
    Gt,
    Lt,
    If,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Not => "not",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Gt => "gt",
            NodeKind::Lt => "lt",
            NodeKind::If => "if",
        };
        f.write_str(tag)
    }
}

impl FromStr for NodeKind {
    type Err = SolveError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_lowercase().as_str() {
            "leaf" => Ok(NodeKind::Leaf),
            "not" => Ok(NodeKind::Not),
            "and" => Ok(NodeKind::And),
            "or" => Ok(NodeKind::Or),
            "gt" => Ok(NodeKind::Gt),
            "lt" => Ok(NodeKind::Lt),
            "if" => Ok(NodeKind::If),
            _ => Err(SolveError::MalformedCircuit(format!(
                "unknown node kind `{tag}`"
            ))),
        }
    }
}

/// A node of an immutable boolean circuit.
///
/// Children are reference counted so a sub-circuit may be shared by several
/// parents, and so evaluation tasks can hold on to the part they work on
/// without borrowing from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    Not(Arc<Node>),
    Gate {
        kind: GateKind,
        children: Vec<Arc<Node>>,
    },
    Threshold {
        kind: ThresholdKind,
        threshold: i64,
        children: Vec<Arc<Node>>,
    },
    If {
        condition: Arc<Node>,
        when_true: Arc<Node>,
        when_false: Arc<Node>,
    },
}

fn collect<I, N>(children: I) -> Vec<Arc<Node>>
where
    I: IntoIterator<Item = N>,
    N: Into<Arc<Node>>,
{
    children.into_iter().map(Into::into).collect()
}

impl Node {
    pub fn leaf(value: bool) -> Self {
        Node::Leaf(Leaf::new(value))
    }

    /// A leaf whose value is only readable after `delay`.
    pub fn delayed_leaf(value: bool, delay: Duration) -> Self {
        Node::Leaf(Leaf::new(value).with_latency(Latency::After(delay)))
    }

    /// A leaf that never yields its value.
    pub fn stalled_leaf(value: bool) -> Self {
        Node::Leaf(Leaf::new(value).with_latency(Latency::Never))
    }

    pub fn not(child: impl Into<Arc<Node>>) -> Self {
        Node::Not(child.into())
    }

    pub fn and<I, N>(children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        Node::Gate {
            kind: GateKind::And,
            children: collect(children),
        }
    }

    pub fn or<I, N>(children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        Node::Gate {
            kind: GateKind::Or,
            children: collect(children),
        }
    }

    pub fn gt<I, N>(threshold: i64, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        Node::Threshold {
            kind: ThresholdKind::Gt,
            threshold,
            children: collect(children),
        }
    }

    pub fn lt<I, N>(threshold: i64, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        Node::Threshold {
            kind: ThresholdKind::Lt,
            threshold,
            children: collect(children),
        }
    }

    pub fn if_then_else(
        condition: impl Into<Arc<Node>>,
        when_true: impl Into<Arc<Node>>,
        when_false: impl Into<Arc<Node>>,
    ) -> Self {
        Node::If {
            condition: condition.into(),
            when_true: when_true.into(),
            when_false: when_false.into(),
        }
    }

    /// Assemble a node from its kind tag and loose parts.
    ///
    /// This is the checked entry point for producers that do not build
    /// [`Node`] values directly (e.g. foreign-language bindings). Parts that
    /// the kind does not use are ignored.
    pub fn from_parts(
        kind: NodeKind,
        value: Option<bool>,
        threshold: Option<i64>,
        mut children: Vec<Arc<Node>>,
    ) -> Result<Self, SolveError> {
        let arity = |expected: usize, children: &[Arc<Node>]| {
            if children.len() == expected {
                Ok(())
            } else {
                Err(SolveError::MalformedCircuit(format!(
                    "{kind} node expects {expected} children, got {}",
                    children.len()
                )))
            }
        };
        let threshold_of = || {
            threshold.ok_or_else(|| {
                SolveError::MalformedCircuit(format!("{kind} node is missing its threshold"))
            })
        };

        match kind {
            NodeKind::Leaf => value.map(Node::leaf).ok_or_else(|| {
                SolveError::MalformedCircuit("leaf node is missing its value".to_string())
            }),
            NodeKind::Not => {
                arity(1, &children)?;
                Ok(Node::Not(children.remove(0)))
            }
            NodeKind::And => Ok(Node::Gate {
                kind: GateKind::And,
                children,
            }),
            NodeKind::Or => Ok(Node::Gate {
                kind: GateKind::Or,
                children,
            }),
            NodeKind::Gt => Ok(Node::Threshold {
                kind: ThresholdKind::Gt,
                threshold: threshold_of()?,
                children,
            }),
            NodeKind::Lt => Ok(Node::Threshold {
                kind: ThresholdKind::Lt,
                threshold: threshold_of()?,
                children,
            }),
            NodeKind::If => {
                arity(3, &children)?;
                let mut parts = children.into_iter();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(condition), Some(when_true), Some(when_false)) => Ok(Node::If {
                        condition,
                        when_true,
                        when_false,
                    }),
                    _ => Err(SolveError::MalformedCircuit(
                        "if node expects 3 children".to_string(),
                    )),
                }
            }
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Not(_) => NodeKind::Not,
            Node::Gate {
                kind: GateKind::And,
                ..
            } => NodeKind::And,
            Node::Gate {
                kind: GateKind::Or, ..
            } => NodeKind::Or,
            Node::Threshold {
                kind: ThresholdKind::Gt,
                ..
            } => NodeKind::Gt,
            Node::Threshold {
                kind: ThresholdKind::Lt,
                ..
            } => NodeKind::Lt,
            Node::If { .. } => NodeKind::If,
        }
    }

    /// Children in circuit order. IF nodes list condition, true and false branch.
    pub fn args(&self) -> Vec<Arc<Node>> {
        match self {
            Node::Leaf(_) => Vec::new(),
            Node::Not(child) => vec![Arc::clone(child)],
            Node::Gate { children, .. } | Node::Threshold { children, .. } => children.clone(),
            Node::If {
                condition,
                when_true,
                when_false,
            } => vec![
                Arc::clone(condition),
                Arc::clone(when_true),
                Arc::clone(when_false),
            ],
        }
    }
}

/// Follow a chain of NOT nodes down to the first node that is not a NOT.
///
/// Returns that node and whether an odd number of NOTs was passed, so deep
/// negation chains are resolved in a loop rather than by recursion.
pub fn skip_negations(node: &Arc<Node>) -> (&Arc<Node>, bool) {
    let mut current = node;
    let mut negated = false;
    while let Node::Not(child) = current.as_ref() {
        current = child;
        negated = !negated;
    }
    (current, negated)
}

/// A circuit handed to the solver: a shared, read-only root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    root: Arc<Node>,
}

impl Circuit {
    pub fn new(root: impl Into<Arc<Node>>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Node::leaf(true).kind(), NodeKind::Leaf);
        assert_eq!(Node::not(Node::leaf(true)).kind(), NodeKind::Not);
        assert_eq!(Node::and([Node::leaf(true)]).kind(), NodeKind::And);
        assert_eq!(Node::or([Node::leaf(true)]).kind(), NodeKind::Or);
        assert_eq!(Node::gt(1, [Node::leaf(true)]).kind(), NodeKind::Gt);
        assert_eq!(Node::lt(1, [Node::leaf(true)]).kind(), NodeKind::Lt);
        let branch = Node::if_then_else(Node::leaf(true), Node::leaf(true), Node::leaf(false));
        assert_eq!(branch.kind(), NodeKind::If);
        assert_eq!(branch.args().len(), 3);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("AND".parse::<NodeKind>(), Ok(NodeKind::And));
        assert_eq!("lt".parse::<NodeKind>(), Ok(NodeKind::Lt));
        assert!(matches!(
            "xor".parse::<NodeKind>(),
            Err(SolveError::MalformedCircuit(_))
        ));
    }

    #[test]
    fn test_from_parts() {
        let child: Arc<Node> = Node::leaf(true).into();

        let not = Node::from_parts(NodeKind::Not, None, None, vec![Arc::clone(&child)]);
        assert_eq!(not, Ok(Node::Not(Arc::clone(&child))));

        let gt = Node::from_parts(NodeKind::Gt, None, Some(2), vec![Arc::clone(&child)]);
        assert_eq!(gt.map(|n| n.kind()), Ok(NodeKind::Gt));

        let leaf = Node::from_parts(NodeKind::Leaf, Some(false), None, Vec::new());
        assert_eq!(leaf, Ok(Node::leaf(false)));
    }

    #[test]
    fn test_from_parts_rejects_malformed() {
        let child: Arc<Node> = Node::leaf(true).into();

        // NOT with two children
        let result = Node::from_parts(
            NodeKind::Not,
            None,
            None,
            vec![Arc::clone(&child), Arc::clone(&child)],
        );
        assert!(matches!(result, Err(SolveError::MalformedCircuit(_))));

        // IF with a missing branch
        let result = Node::from_parts(
            NodeKind::If,
            None,
            None,
            vec![Arc::clone(&child), Arc::clone(&child)],
        );
        assert!(matches!(result, Err(SolveError::MalformedCircuit(_))));

        // threshold without threshold
        let result = Node::from_parts(NodeKind::Lt, None, None, vec![child]);
        assert!(matches!(result, Err(SolveError::MalformedCircuit(_))));

        // leaf without value
        let result = Node::from_parts(NodeKind::Leaf, None, None, Vec::new());
        assert!(matches!(result, Err(SolveError::MalformedCircuit(_))));
    }

    #[test]
    fn test_skip_negations() {
        let leaf: Arc<Node> = Node::leaf(true).into();
        let (inner, negated) = skip_negations(&leaf);
        assert!(Arc::ptr_eq(inner, &leaf));
        assert!(!negated);

        let three: Arc<Node> = Node::not(Node::not(Node::not(Arc::clone(&leaf)))).into();
        let (inner, negated) = skip_negations(&three);
        assert!(Arc::ptr_eq(inner, &leaf));
        assert!(negated);
    }

    #[test]
    fn test_shared_subcircuit() {
        let shared: Arc<Node> = Node::and([Node::leaf(true), Node::leaf(false)]).into();
        let root = Node::or([Arc::clone(&shared), Arc::clone(&shared)]);
        assert_eq!(Arc::strong_count(&shared), 3);
        assert_eq!(root.args().len(), 2);
    }
}
