use crate::engine::{DesignContext, Rule};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCss {
    pub css: String,
    pub flattened_color: Option<String>,
}

/// Answers whether a class token is a generated utility and renders it to
/// CSS. Idempotent and safe to call concurrently.
#[async_trait]
pub trait UtilityOracle: Send + Sync {
    async fn is_utility(&self, token: &str) -> bool;
    async fn css_for(&self, tokens: &[String]) -> Option<GeneratedCss>;
}

pub struct EngineOracle {
    workspace: PathBuf,
    context: OnceCell<Option<DesignContext>>,
    css_cache: Mutex<HashMap<String, GeneratedCss>>,
}

impl EngineOracle {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            context: OnceCell::new(),
            css_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Single-flight: concurrent first callers share one discovery pass and
    /// every later call observes the same context. A failed discovery is
    /// remembered as `None`, which downgrades every classification to
    /// "not a utility" instead of raising.
    async fn context(&self) -> Option<&DesignContext> {
        self.context
            .get_or_init(|| async {
                let context = DesignContext::discover(&self.workspace);
                match &context {
                    Some(context) => {
                        debug!(variant = context.variant_name(), "utility engine context built");
                    }
                    None => {
                        debug!(
                            workspace = %self.workspace.display(),
                            "no utility engine configuration found; treating every token as plain"
                        );
                    }
                }
                context
            })
            .await
            .as_ref()
    }

    /// Drops the cached context and rendered CSS so the next call rebuilds
    /// from disk. Not used by the rewrite path.
    pub fn clear(&mut self) {
        self.context = OnceCell::new();
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, GeneratedCss>> {
        match self.css_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl UtilityOracle for EngineOracle {
    async fn is_utility(&self, token: &str) -> bool {
        match self.context().await {
            Some(context) => context.rule_for(token).is_some(),
            None => false,
        }
    }

    async fn css_for(&self, tokens: &[String]) -> Option<GeneratedCss> {
        let key = tokens.join(" ");
        if let Some(entry) = self.cache().get(&key).cloned() {
            return Some(entry);
        }

        let context = self.context().await?;
        let rule = context.rule_for(tokens.first()?)?;
        let entry = GeneratedCss {
            flattened_color: flatten_rule_color(&rule),
            css: rule.render(),
        };
        self.cache().insert(key, entry.clone());
        Some(entry)
    }
}

/// Takes the first declaration whose property mentions `color`, substitutes
/// any declared property names referenced inside its value with their own
/// values, and normalizes the result to `rgba(...)` when it matches the
/// flat functional form.
fn flatten_rule_color(rule: &Rule) -> Option<String> {
    let mut color = rule
        .declarations
        .iter()
        .find(|(property, _)| property.contains("color"))
        .map(|(_, value)| value.clone())?;

    for (property, value) in &rule.declarations {
        color = color.replacen(property.as_str(), value, 1);
    }

    Some(convert_to_rgba(&color))
}

/// `rgb(R G B / A)` — with the alpha optionally wrapped in a `var(` call —
/// becomes `rgba(R, G, B, A)`. Anything else passes through unchanged.
fn convert_to_rgba(color: &str) -> String {
    match parse_rgb_function(color) {
        Some((r, g, b, alpha)) => format!("rgba({}, {}, {}, {})", r, g, b, alpha),
        None => color.to_string(),
    }
}

fn parse_rgb_function(color: &str) -> Option<(u32, u32, u32, f64)> {
    let start = color.find("rgb(")?;
    let mut rest = &color[start + "rgb(".len()..];

    let r = take_integer(&mut rest)?;
    if take_whitespace(&mut rest) == 0 {
        return None;
    }
    let g = take_integer(&mut rest)?;
    if take_whitespace(&mut rest) == 0 {
        return None;
    }
    let b = take_integer(&mut rest)?;

    take_whitespace(&mut rest);
    rest = rest.strip_prefix('/')?;
    take_whitespace(&mut rest);
    rest = rest.strip_prefix("var(").unwrap_or(rest);

    let number_len = rest
        .find(|ch: char| !ch.is_ascii_digit() && ch != '.')
        .unwrap_or(rest.len());
    if number_len == 0 {
        return None;
    }
    let alpha: f64 = rest[..number_len].parse().ok()?;
    if !rest[number_len..].starts_with(')') {
        return None;
    }

    Some((r, g, b, alpha))
}

fn take_integer(input: &mut &str) -> Option<u32> {
    let digits_len = input
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(input.len());
    if digits_len == 0 {
        return None;
    }
    let value = input[..digits_len].parse().ok()?;
    *input = &input[digits_len..];
    Some(value)
}

fn take_whitespace(input: &mut &str) -> usize {
    let len = input
        .find(|ch: char| !ch.is_whitespace())
        .unwrap_or(input.len());
    *input = &input[len..];
    len
}
