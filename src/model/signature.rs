use std::fmt;

/// A statically-known call site, as extracted from the method's intermediate code.
///
/// Signatures are compared by exact field equality, not by identity, when matching
/// calls against decoded instructions. [`fmt::Display`] renders the canonical
/// signature string the inlining engine matches operand text against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Simple method name
    pub name: String,
    /// Return type name
    pub return_type: String,
    /// Declaring type name
    pub declaring_type: String,
    /// Ordered parameter type names
    pub parameters: Vec<String>,
}

impl MethodSignature {
    /// Create a signature from its parts.
    pub fn new(declaring_type: &str, name: &str, return_type: &str, parameters: &[&str]) -> Self {
        MethodSignature {
            name: name.to_string(),
            return_type: return_type.to_string(),
            declaring_type: declaring_type.to_string(),
            parameters: parameters.iter().map(ToString::to_string).collect(),
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}({})",
            self.return_type,
            self.declaring_type,
            self.name,
            self.parameters.join(", ")
        )
    }
}
