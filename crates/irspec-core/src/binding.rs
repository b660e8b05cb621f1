//! Variable binding: resolves symbolic references against a case's setup.
//!
//! Three reference forms resolve against the same environment:
//!
//! | Form   | Example | Name |
//! |--------|---------|------|
//! | bare   | `x`     | `x`  |
//! | dollar | `$x`    | `x`  |
//! | braced | `${x}`  | `x`  |
//!
//! Resolution is soft: an unknown name hands the original token back. Deciding
//! whether that is an error or a warning is left to the caller, which knows
//! where the reference occurred.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::ir::IRVariable;
use crate::value::DynValue;

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").expect("reference pattern is valid")
});

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Value bound to a declared variable without a value.
static UNSET: DynValue = DynValue::Null;

/// Name → value environment built from one case's setup section.
#[derive(Debug, Clone, Default)]
pub struct Environment<'a> {
    vars: BTreeMap<&'a str, &'a DynValue>,
}

/// Outcome of resolving a reference token.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<'a, 't> {
    /// The token named a declared variable.
    Bound { name: &'t str, value: &'a DynValue },
    /// Unknown name; carries the original token unchanged.
    Unbound(&'t str),
}

impl<'a> Environment<'a> {
    /// Build from canonical `given` variables. When a name is declared twice
    /// the first declaration is kept; the validator reports the duplicate.
    pub fn from_given(given: &'a [IRVariable]) -> Self {
        let mut vars = BTreeMap::new();
        for var in given.iter().filter(|v| !v.name.is_empty()) {
            vars.entry(var.name.as_str())
                .or_insert_with(|| var.value.as_ref().unwrap_or(&UNSET));
        }
        Self { vars }
    }

    /// Build from a simplified-case `setup` map.
    pub fn from_setup(setup: &'a BTreeMap<String, DynValue>) -> Self {
        Self {
            vars: setup.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&'a DynValue> {
        self.vars.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Resolve a bare, `$`-prefixed or `${}`-braced token.
    pub fn resolve<'t>(&self, token: &'t str) -> Binding<'a, 't> {
        let name = reference_name(token);
        match self.get(name) {
            Some(value) => Binding::Bound { name, value },
            None => Binding::Unbound(token),
        }
    }
}

/// Strip the reference syntax from a token: `${x}` → `x`, `$x` → `x`.
pub fn reference_name(token: &str) -> &str {
    let token = token.trim();
    if let Some(inner) = token.strip_prefix("${").and_then(|t| t.strip_suffix('}')) {
        inner.trim()
    } else if let Some(inner) = token.strip_prefix('$') {
        inner
    } else {
        token
    }
}

/// Every `$name` / `${name}` reference inside free text, in order of
/// appearance. Empty `${}` placeholders are ignored.
pub fn scan_references(text: &str) -> Vec<&str> {
    REFERENCE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
        .collect()
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> BTreeMap<String, DynValue> {
        let mut m = BTreeMap::new();
        m.insert("x".to_string(), DynValue::Int(4));
        m.insert("name".to_string(), DynValue::from("bob"));
        m
    }

    #[test]
    fn test_all_reference_forms_resolve() {
        let setup = setup();
        let env = Environment::from_setup(&setup);
        for token in ["x", "$x", "${x}", " ${ x } "] {
            assert_eq!(
                env.resolve(token),
                Binding::Bound {
                    name: "x",
                    value: &DynValue::Int(4)
                },
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_unknown_reference_returns_token() {
        let setup = setup();
        let env = Environment::from_setup(&setup);
        assert_eq!(env.resolve("$missing"), Binding::Unbound("$missing"));
        assert_eq!(env.resolve("10"), Binding::Unbound("10"));
    }

    #[test]
    fn test_from_given_keeps_first_duplicate() {
        let given = vec![
            IRVariable::new("a", DynValue::Int(1), "int"),
            IRVariable::new("a", DynValue::Int(2), "int"),
            IRVariable {
                name: "unset".into(),
                value: None,
                type_hint: None,
            },
        ];
        let env = Environment::from_given(&given);
        assert_eq!(env.get("a"), Some(&DynValue::Int(1)));
        assert_eq!(env.get("unset"), Some(&DynValue::Null));
    }

    #[test]
    fn test_scan_references() {
        assert_eq!(scan_references("Add($a, ${b})"), vec!["a", "b"]);
        assert_eq!(scan_references("f(${}, $)"), Vec::<&str>::new());
        assert_eq!(scan_references("user.Save()"), Vec::<&str>::new());
        assert_eq!(scan_references("$a+$a_2"), vec!["a", "a_2"]);
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("valid_name"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("camelCase2"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("has-dash"));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier(""));
    }
}
