//! Parsed rule chains and the rule-string parser.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::syntax::Syntax;

/// One procedure invocation: a name and its positional string arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleStep {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
}

impl RuleStep {
    /// Creates a step with the given arguments.
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a step without arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Procedure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positional arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Serializes this step.
    pub fn to_rule_string(&self, syntax: &Syntax) -> String {
        if self.args.is_empty() {
            self.name.clone()
        } else {
            format!(
                "{}{}{}",
                self.name,
                syntax.args(),
                self.args.join(syntax.glue())
            )
        }
    }

    fn parse(raw: &str, syntax: &Syntax) -> Self {
        match raw.split_once(syntax.args()) {
            Some((name, blob)) => Self {
                name: name.to_owned(),
                args: blob.split(syntax.glue()).map(str::to_owned).collect(),
            },
            None => Self::named(raw),
        }
    }
}

/// An ordered sequence of [`RuleStep`]s, executed left to right.
///
/// ```
/// use nebula_rulechain::{RuleChain, Syntax};
///
/// let chain = RuleChain::parse("trim->min_len::3", &Syntax::default());
/// assert_eq!(chain.len(), 2);
/// assert_eq!(chain.steps()[1].name(), "min_len");
/// assert_eq!(chain.steps()[1].args(), ["3"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleChain {
    steps: Vec<RuleStep>,
}

impl RuleChain {
    /// Creates a chain from already-built steps.
    pub fn new(steps: Vec<RuleStep>) -> Self {
        Self { steps }
    }

    /// Parses a rule string.
    ///
    /// Never fails: missing delimiters produce steps without arguments and
    /// the empty string produces a single step with an empty name.
    pub fn parse(rule: &str, syntax: &Syntax) -> Self {
        Self {
            steps: rule
                .split(syntax.chain())
                .map(|raw| RuleStep::parse(raw, syntax))
                .collect(),
        }
    }

    /// Serializes the chain back into a rule string.
    pub fn to_rule_string(&self, syntax: &Syntax) -> String {
        self.steps
            .iter()
            .map(|step| step.to_rule_string(syntax))
            .collect::<Vec<_>>()
            .join(syntax.chain())
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[RuleStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps at all.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether executing this chain must be a no-op.
    ///
    /// True for a chain without steps and for the lone empty-name step that
    /// parsing `""` yields.
    pub fn is_blank(&self) -> bool {
        match self.steps.as_slice() {
            [] => true,
            [only] => only.name.is_empty() && only.args.is_empty(),
            _ => false,
        }
    }

    /// Iterates over the steps.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleStep> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a RuleChain {
    type Item = &'a RuleStep;
    type IntoIter = std::slice::Iter<'a, RuleStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl FromIterator<RuleStep> for RuleChain {
    fn from_iter<T: IntoIterator<Item = RuleStep>>(iter: T) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl FromStr for RuleChain {
    type Err = Infallible;

    /// Parses with the default [`Syntax`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, &Syntax::default()))
    }
}

impl fmt::Display for RuleChain {
    /// Formats with the default [`Syntax`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rule_string(&Syntax::default()))
    }
}
