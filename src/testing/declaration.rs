// ABOUTME: Parser for the test declaration mini-syntax
// ABOUTME: Reads "[<module>]Class<<Superclass" into a structured declaration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{Result, TestingError};

const MODULE_MARKER: &str = "<module>";
const SUPERCLASS_SEPARATOR: &str = "<<";

/// One test class to run, and the superclass that selects its adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestDeclaration {
    pub module: bool,
    pub class_name: String,
    pub superclass: String,
}

impl TestDeclaration {
    pub fn new(module: bool, class_name: impl Into<String>, superclass: impl Into<String>) -> Self {
        Self {
            module,
            class_name: class_name.into(),
            superclass: superclass.into(),
        }
    }

    /// Parse `[<module>]<class-name><<<superclass-name>`.
    ///
    /// Neither name may be empty or contain `<`. Surrounding whitespace is
    /// ignored.
    pub fn parse(literal: &str) -> Result<Self> {
        let invalid = |reason: &str| TestingError::InvalidDeclaration {
            literal: literal.to_string(),
            reason: reason.to_string(),
        };

        let text = literal.trim();
        let (module, rest) = match text.strip_prefix(MODULE_MARKER) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let Some(split) = rest.find('<') else {
            return Err(invalid("expected '<<' followed by a superclass name"));
        };
        let (class_name, tail) = rest.split_at(split);

        let Some(superclass) = tail.strip_prefix(SUPERCLASS_SEPARATOR) else {
            return Err(invalid("expected '<<' after the class name"));
        };

        let class_name = class_name.trim();
        let superclass = superclass.trim();
        if class_name.is_empty() {
            return Err(invalid("missing class name"));
        }
        if superclass.is_empty() {
            return Err(invalid("missing superclass name"));
        }
        if superclass.contains('<') {
            return Err(invalid("superclass name cannot contain '<'"));
        }

        Ok(Self::new(module, class_name, superclass))
    }

    /// Parse every literal, stopping at the first malformed one.
    pub fn parse_all<I, S>(literals: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        literals
            .into_iter()
            .map(|literal| Self::parse(literal.as_ref()))
            .collect()
    }
}

impl FromStr for TestDeclaration {
    type Err = TestingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TestDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module {
            write!(f, "{}", MODULE_MARKER)?;
        }
        write!(f, "{}{}{}", self.class_name, SUPERCLASS_SEPARATOR, self.superclass)
    }
}
