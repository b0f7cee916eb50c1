//! Designators and pin/wire tokens
//!
//! Connection sets reference components by designator. A designator may name
//! a template directly (`X1`), instantiate a template under a new designator
//! (`CONN.X3`) or ask for an auto-generated one (`CONN.` becomes `__CONN_1`).
//! Pins and wires are referenced by tokens: numbers, ranges like `1-4`, or
//! names (pin labels, wire colors, wire labels, `s` for the shield).

use serde_yml::Value;
use std::collections::HashMap;
use std::fmt;

use crate::core::error::{HarnessError, Result};

/// Largest pin or wire count a component, or a range, may span
pub const MAX_PORTS: u32 = 4096;

/// Prefix marking designators invented by the resolver
pub const GENERATED_PREFIX: &str = "__";

/// Whether a designator was auto-generated (and is therefore hidden in labels)
pub fn is_generated(designator: &str) -> bool {
    designator.starts_with(GENERATED_PREFIX)
}

/// A single pin or wire reference before it is resolved against a component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Number(u32),
    Name(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<u32> for Token {
    fn from(n: u32) -> Self {
        Token::Number(n)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::Name(s.to_string())
    }
}

/// Parse a scalar string into a number, a range, or a name
fn expand_str(s: &str) -> Result<Vec<Token>> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Ok(vec![Token::Number(n)]);
    }
    if let Some((a, b)) = s.split_once('-') {
        if let (Ok(a), Ok(b)) = (a.trim().parse::<u32>(), b.trim().parse::<u32>()) {
            if a.abs_diff(b) >= MAX_PORTS {
                return Err(HarnessError::validation(format!(
                    "Range {} spans more than {} pins or wires",
                    s, MAX_PORTS
                )));
            }
            return Ok(if a <= b {
                (a..=b).map(Token::Number).collect()
            } else {
                (b..=a).rev().map(Token::Number).collect()
            });
        }
    }
    Ok(vec![Token::Name(s.to_string())])
}

/// Expand a pin/wire spec (`3`, `"1-3"`, `[1, "4-5", RD]`) into tokens in order
pub fn expand(value: &Value) -> Result<Vec<Token>> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(|n| vec![Token::Number(n)])
            .ok_or_else(|| {
                HarnessError::validation(format!("Invalid pin or wire number: {}", n))
            }),
        Value::String(s) => expand_str(s),
        Value::Sequence(items) => {
            let mut tokens = Vec::new();
            for item in items {
                tokens.extend(expand(item)?);
            }
            Ok(tokens)
        }
        Value::Tagged(tagged) => expand(&tagged.value),
        other => Err(HarnessError::validation(format!(
            "Invalid pin or wire reference: {:?}",
            other
        ))),
    }
}

/// A designator after template resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDesignator {
    pub template: String,
    pub designator: String,
}

/// Tracks which template every designator was instantiated from
#[derive(Debug, Clone)]
pub struct DesignatorRegistry {
    separator: String,
    counters: HashMap<String, u32>,
    assigned: HashMap<String, String>,
}

impl DesignatorRegistry {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            counters: HashMap::new(),
            assigned: HashMap::new(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Resolve an entry name into (template, designator)
    pub fn resolve(&mut self, name: &str) -> Result<ResolvedDesignator> {
        if !self.separator.is_empty() && name.contains(&self.separator) {
            let parts: Vec<&str> = name.split(self.separator.as_str()).collect();
            if parts.len() > 2 {
                return Err(HarnessError::validation(format!(
                    "{} - found more than one separator ({})",
                    name, self.separator
                )));
            }
            let template = parts[0].to_string();
            let designator = if parts[1].is_empty() {
                let counter = self.counters.entry(template.clone()).or_insert(0);
                *counter += 1;
                format!("{}{}_{}", GENERATED_PREFIX, template, counter)
            } else {
                parts[1].to_string()
            };

            match self.assigned.get(&designator) {
                Some(existing) if *existing != template => {
                    return Err(HarnessError::configuration(format!(
                        "Trying to redefine {} from {} to {}",
                        designator, existing, template
                    )));
                }
                Some(_) => {}
                None => {
                    self.assigned.insert(designator.clone(), template.clone());
                }
            }
            Ok(ResolvedDesignator {
                template,
                designator,
            })
        } else {
            let template = self
                .assigned
                .entry(name.to_string())
                .or_insert_with(|| name.to_string())
                .clone();
            Ok(ResolvedDesignator {
                template,
                designator: name.to_string(),
            })
        }
    }

    /// Templates that were used through the separator at least once
    pub fn is_used_as_template(&self, template: &str) -> bool {
        self.assigned
            .iter()
            .any(|(designator, t)| t == template && designator != template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_ranges() {
        let value: Value = serde_yml::from_str("[1, '3-5', RD, '4-2']").unwrap();
        let tokens = expand(&value).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(1),
                Token::Number(3),
                Token::Number(4),
                Token::Number(5),
                Token::Name("RD".to_string()),
                Token::Number(4),
                Token::Number(3),
                Token::Number(2),
            ]
        );
    }

    #[test]
    fn test_expand_rejects_negative() {
        let value: Value = serde_yml::from_str("-1").unwrap();
        assert!(expand(&value).is_err());
    }

    #[test]
    fn test_expand_rejects_oversized_range() {
        let value: Value = serde_yml::from_str("'1-4294967295'").unwrap();
        let err = expand(&value).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");

        let value: Value = serde_yml::from_str("'4096-1'").unwrap();
        assert_eq!(expand(&value).unwrap().len(), 4096);
    }

    #[test]
    fn test_autogenerated_designators() {
        let mut registry = DesignatorRegistry::new(".");
        let a = registry.resolve("F.").unwrap();
        let b = registry.resolve("F.").unwrap();
        assert_eq!(a.designator, "__F_1");
        assert_eq!(b.designator, "__F_2");
        assert_eq!(a.template, "F");
        assert!(is_generated(&a.designator));
        assert!(registry.is_used_as_template("F"));
    }

    #[test]
    fn test_named_instances() {
        let mut registry = DesignatorRegistry::new(".");
        let x3 = registry.resolve("CONN.X3").unwrap();
        assert_eq!(x3.designator, "X3");
        assert_eq!(x3.template, "CONN");

        // later bare references keep the template
        let again = registry.resolve("X3").unwrap();
        assert_eq!(again.template, "CONN");

        let err = registry.resolve("OTHER.X3").unwrap_err();
        assert!(err.to_string().contains("redefine"));
    }

    #[test]
    fn test_plain_designator() {
        let mut registry = DesignatorRegistry::new(".");
        let x1 = registry.resolve("X1").unwrap();
        assert_eq!(x1.template, "X1");
        assert_eq!(x1.designator, "X1");
        assert!(!registry.is_used_as_template("X1"));
        assert!(registry.resolve("A.B.C").is_err());
    }
}
