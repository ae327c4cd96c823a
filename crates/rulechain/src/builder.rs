//! Fluent construction of rule strings.

use crate::chain::{RuleChain, RuleStep};
use crate::syntax::Syntax;

/// Which buffer of a [`RuleBuilder`] a step goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Steps for a filter chain.
    Filter,
    /// Steps for a validator chain.
    Rule,
}

/// Accumulates steps and serializes them into rule strings.
///
/// A builder keeps one buffer for filter steps and one for validator
/// ("rule") steps. Draining a buffer returns its rule string and leaves it
/// empty, ready for the next chain.
///
/// ```
/// use nebula_rulechain::RuleBuilder;
///
/// let mut builder = RuleBuilder::new();
/// builder.filter("trim").filter_with("replace", ["-", ""]);
/// builder.condition("required").condition_with("between", ["1", "10"]);
///
/// assert_eq!(builder.create_filter(), "trim->replace::-,,");
/// assert_eq!(builder.create_rule(), "required->between::1,,10");
/// assert_eq!(builder.create_rule(), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    syntax: Syntax,
    filters: Vec<RuleStep>,
    rules: Vec<RuleStep>,
}

impl RuleBuilder {
    /// Creates a builder using the default [`Syntax`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder that serializes with `syntax`.
    pub fn with_syntax(syntax: Syntax) -> Self {
        Self {
            syntax,
            filters: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Appends a step to `buffer`.
    ///
    /// Steps are kept as given. If the step would not parse back into
    /// itself (a delimiter inside a name or argument, or one formed across
    /// the boundary with the next token), a warning is logged.
    pub fn add_step<I, S>(&mut self, buffer: BufferKind, name: &str, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let step = RuleStep::new(name, args);
        if !self.round_trips(&step) {
            tracing::warn!(
                step = step.name(),
                rendered = %step.to_rule_string(&self.syntax),
                "rule step contains a delimiter token and will not round-trip"
            );
        }
        self.buffer_mut(buffer).push(step);
        self
    }

    /// Appends a filter step without arguments.
    pub fn filter(&mut self, name: &str) -> &mut Self {
        self.add_step(BufferKind::Filter, name, std::iter::empty::<String>())
    }

    /// Appends a filter step with arguments.
    pub fn filter_with<I, S>(&mut self, name: &str, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_step(BufferKind::Filter, name, args)
    }

    /// Appends a validator step without arguments.
    pub fn condition(&mut self, name: &str) -> &mut Self {
        self.add_step(BufferKind::Rule, name, std::iter::empty::<String>())
    }

    /// Appends a validator step with arguments.
    pub fn condition_with<I, S>(&mut self, name: &str, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_step(BufferKind::Rule, name, args)
    }

    /// Number of steps waiting in `buffer`.
    pub fn pending(&self, buffer: BufferKind) -> usize {
        match buffer {
            BufferKind::Filter => self.filters.len(),
            BufferKind::Rule => self.rules.len(),
        }
    }

    /// Empties `buffer` and returns its steps as a chain.
    pub fn drain_chain(&mut self, buffer: BufferKind) -> RuleChain {
        std::mem::take(self.buffer_mut(buffer)).into_iter().collect()
    }

    /// Empties `buffer` and returns its rule string. An empty buffer yields `""`.
    pub fn drain(&mut self, buffer: BufferKind) -> String {
        let chain = self.drain_chain(buffer);
        chain.to_rule_string(&self.syntax)
    }

    /// Drains the filter buffer.
    pub fn create_filter(&mut self) -> String {
        self.drain(BufferKind::Filter)
    }

    /// Drains the validator buffer.
    pub fn create_rule(&mut self) -> String {
        self.drain(BufferKind::Rule)
    }

    fn buffer_mut(&mut self, buffer: BufferKind) -> &mut Vec<RuleStep> {
        match buffer {
            BufferKind::Filter => &mut self.filters,
            BufferKind::Rule => &mut self.rules,
        }
    }

    /// Whether `step`, followed by another step, parses back into itself.
    pub(crate) fn round_trips(&self, step: &RuleStep) -> bool {
        let chain = self.syntax.chain();
        let rendered = format!("{}{chain}", step.to_rule_string(&self.syntax));
        RuleChain::parse(&rendered, &self.syntax).steps() == [step.clone(), RuleStep::named("")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_buffer_drains_to_empty_string() {
        let mut builder = RuleBuilder::new();
        assert_eq!(builder.create_filter(), "");
        assert_eq!(builder.create_rule(), "");
    }

    #[test]
    fn buffers_are_independent() {
        let mut builder = RuleBuilder::new();
        builder.filter("trim");
        builder.condition("required");
        builder.filter("lowercase");

        assert_eq!(builder.pending(BufferKind::Filter), 2);
        assert_eq!(builder.pending(BufferKind::Rule), 1);
        assert_eq!(builder.create_rule(), "required");
        assert_eq!(builder.create_filter(), "trim->lowercase");
    }

    #[test]
    fn drain_resets_buffer() {
        let mut builder = RuleBuilder::new();
        builder.condition_with("min_len", ["3"]);
        assert_eq!(builder.create_rule(), "min_len::3");

        builder.condition("required");
        assert_eq!(builder.create_rule(), "required");
    }

    #[test]
    fn separate_builders_do_not_interleave() {
        let mut a = RuleBuilder::new();
        let mut b = RuleBuilder::new();
        a.condition("required");
        b.condition("optional");
        a.condition("is_int");

        assert_eq!(a.create_rule(), "required->is_int");
        assert_eq!(b.create_rule(), "optional");
    }

    #[test]
    fn custom_syntax() {
        let mut builder = RuleBuilder::with_syntax(Syntax::new("|", "=", ";").unwrap());
        builder.condition_with("between", ["1", "9"]).condition("required");
        assert_eq!(builder.create_rule(), "between=1;9|required");
    }

    #[test]
    fn reserved_tokens_are_kept_verbatim() {
        let mut builder = RuleBuilder::new();
        builder.filter_with("replace", ["->", "to"]);
        assert_eq!(builder.create_filter(), "replace::->,,to");
    }

    #[test]
    fn token_formed_across_boundary_breaks_round_trip() {
        let builder = RuleBuilder::new();
        assert!(!builder.round_trips(&RuleStep::new("len:", ["3"])));
        assert!(!builder.round_trips(&RuleStep::new("replace", ["->", "to"])));
        assert!(!builder.round_trips(&RuleStep::new("pad", ["x,", "y"])));
        assert!(builder.round_trips(&RuleStep::new("min_len", ["3"])));
        assert!(builder.round_trips(&RuleStep::new("matches", ["a::b"])));

        let mut builder = RuleBuilder::new();
        builder.condition_with("len:", ["3"]);
        assert_eq!(builder.create_rule(), "len:::3");
    }

    #[test]
    fn drain_chain_returns_steps() {
        let mut builder = RuleBuilder::new();
        builder.filter("trim").filter_with("default", ["n/a"]);

        let chain = builder.drain_chain(BufferKind::Filter);
        assert_eq!(
            chain.steps(),
            [RuleStep::named("trim"), RuleStep::new("default", ["n/a"])]
        );
        assert_eq!(builder.pending(BufferKind::Filter), 0);
    }
}
