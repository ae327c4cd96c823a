//! Delimiter configuration for the rule DSL.
//!
//! ```text
//! rule  := step (CHAIN step)*
//! step  := NAME (ARGS args)?
//! args  := ARG (GLUE ARG)*
//! ```
//!
//! No escaping exists: names and arguments must not contain any of the
//! three tokens. Pick tokens that cannot occur in your data if the defaults
//! collide with it.

use serde::{Deserialize, Serialize};

use crate::error::SyntaxError;

/// Default token between steps.
pub const CHAIN_DELIMITER: &str = "->";

/// Default token between a step name and its arguments.
pub const ARGS_DELIMITER: &str = "::";

/// Default token between two arguments.
pub const ARG_GLUE: &str = ",,";

/// The three tokens of the rule DSL.
///
/// Loadable from configuration; every field is optional and falls back to
/// the defaults. Deserialization runs the same checks as [`Syntax::new`].
///
/// ```
/// use nebula_rulechain::Syntax;
///
/// let syntax: Syntax = serde_json::from_str(r#"{ "chain": "|" }"#).unwrap();
/// assert_eq!(syntax.chain(), "|");
/// assert_eq!(syntax.args(), "::");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SyntaxConfig", into = "SyntaxConfig")]
pub struct Syntax {
    chain: String,
    args: String,
    glue: String,
}

impl Syntax {
    /// Creates a syntax from explicit tokens.
    ///
    /// Fails if a token is empty or if one token occurs inside another.
    pub fn new(
        chain: impl Into<String>,
        args: impl Into<String>,
        glue: impl Into<String>,
    ) -> Result<Self, SyntaxError> {
        let syntax = Self {
            chain: chain.into(),
            args: args.into(),
            glue: glue.into(),
        };
        syntax.check()?;
        Ok(syntax)
    }

    /// Token between steps.
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Token between a step name and its arguments.
    pub fn args(&self) -> &str {
        &self.args
    }

    /// Token between arguments.
    pub fn glue(&self) -> &str {
        &self.glue
    }

    /// Returns the first token that occurs in `text`, if any.
    pub fn reserved_token_in(&self, text: &str) -> Option<&str> {
        self.tokens()
            .into_iter()
            .map(|(_, token)| token)
            .find(|token| text.contains(token))
    }

    /// Returns the token that `text` would run into when a rule string
    /// places that token right after it.
    ///
    /// A name ending in `:` followed by `::` yields `:::`, which splits one
    /// character early. Only the tokens that can follow a name (chain and
    /// args) are checked.
    pub fn token_spliced_after(&self, text: &str) -> Option<&str> {
        [self.chain.as_str(), self.args.as_str()]
            .into_iter()
            .find(|token| format!("{text}{token}").find(token) != Some(text.len()))
    }

    fn tokens(&self) -> [(&'static str, &str); 3] {
        [
            ("chain", &self.chain),
            ("args", &self.args),
            ("glue", &self.glue),
        ]
    }

    fn check(&self) -> Result<(), SyntaxError> {
        let tokens = self.tokens();

        if let Some(&(which, _)) = tokens.iter().find(|(_, token)| token.is_empty()) {
            return Err(SyntaxError::EmptyToken { which });
        }

        for (i, (_, inner)) in tokens.iter().enumerate() {
            for (j, (_, outer)) in tokens.iter().enumerate() {
                if i != j && outer.contains(inner) {
                    return Err(SyntaxError::OverlappingTokens {
                        inner: (*inner).to_owned(),
                        outer: (*outer).to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            chain: CHAIN_DELIMITER.to_owned(),
            args: ARGS_DELIMITER.to_owned(),
            glue: ARG_GLUE.to_owned(),
        }
    }
}

/// Serialized form of [`Syntax`]; missing fields take the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SyntaxConfig {
    chain: String,
    args: String,
    glue: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Syntax::default().into()
    }
}

impl From<Syntax> for SyntaxConfig {
    fn from(syntax: Syntax) -> Self {
        Self {
            chain: syntax.chain,
            args: syntax.args,
            glue: syntax.glue,
        }
    }
}

impl TryFrom<SyntaxConfig> for Syntax {
    type Error = SyntaxError;

    fn try_from(config: SyntaxConfig) -> Result<Self, Self::Error> {
        Self::new(config.chain, config.args, config.glue)
    }
}
