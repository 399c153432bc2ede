//! Diagnostics: stable codes, severities, and templated messages.
//!
//! Validation failures never abort graph construction. Each one becomes a
//! [`Diagnostic`] accumulated on the provider (and carried by the error call
//! site for the faulty branch), so sibling nodes and other providers keep
//! resolving.

use std::fmt;

use crate::registration::Location;

/// Diagnostic severity. Only `Error` blocks downstream code generation for
/// the affected provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A stable diagnostic descriptor: code, title, and a message template with
/// `{0}`-style positional placeholders.
#[derive(Debug)]
pub struct DiagnosticDescriptor {
    pub code: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub severity: Severity,
}

/// One reported diagnostic: a descriptor instantiated with positional
/// arguments and an optional source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub descriptor: &'static DiagnosticDescriptor,
    pub args: Vec<String>,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(
        descriptor: &'static DiagnosticDescriptor,
        args: Vec<String>,
        location: Option<Location>,
    ) -> Self {
        Self {
            descriptor,
            args,
            location,
        }
    }

    pub fn code(&self) -> &'static str {
        self.descriptor.code
    }

    pub fn severity(&self) -> Severity {
        self.descriptor.severity
    }

    pub fn is_error(&self) -> bool {
        self.descriptor.severity == Severity::Error
    }

    /// Renders the message template with this diagnostic's arguments.
    /// Placeholders without a matching argument are kept verbatim.
    pub fn message(&self) -> String {
        let mut out = String::with_capacity(self.descriptor.message.len());
        let mut rest = self.descriptor.message;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close)
                    if close > 0 && after[..close].bytes().all(|b| b.is_ascii_digit()) =>
                {
                    let index: usize = after[..close].parse().unwrap_or(usize::MAX);
                    match self.args.get(index) {
                        Some(arg) => out.push_str(arg),
                        None => out.push_str(&rest[open..open + close + 2]),
                    }
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        if let Some(location) = &self.location {
            write!(f, " [{}]", location)?;
        }
        Ok(())
    }
}

/// The full descriptor table. Codes are stable and never reused.
pub mod descriptors {
    use super::{DiagnosticDescriptor, Severity};

    pub static UNEXPECTED_ERROR: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0001",
        title: "Unexpected error during generation",
        message: "Unexpected error occurred during graph construction: {0}",
        severity: Severity::Error,
    };

    pub static SERVICE_REQUIRED_NOT_REGISTERED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0002",
        title: "The service registration not found",
        message: "The service '{0}' required to construct '{1}' is not registered",
        severity: Severity::Error,
    };

    pub static MEMBER_NOT_FOUND: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0003",
        title: "A member referenced by an instance or factory registration not found",
        message: "Unable to find a member '{0}' referenced by the registration for '{1}'",
        severity: Severity::Error,
    };

    pub static MEMBER_AMBIGUOUS: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0004",
        title: "Found multiple members referenced by an instance or factory registration",
        message: "Found multiple members with the '{0}' name, referenced by the registration for '{1}'",
        severity: Severity::Error,
    };

    pub static PROVIDER_NOT_EXTENSIBLE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0005",
        title: "The provider type has to be structurally extensible",
        message: "The provider type '{0}' has to be declared extensible to receive generated members",
        severity: Severity::Error,
    };

    pub static IMPORTED_TYPE_NOT_MODULE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0006",
        title: "The imported type has to be declared as a module",
        message: "The imported type '{0}' is not declared as a service module",
        severity: Severity::Error,
    };

    pub static MISSING_PUBLIC_CONSTRUCTOR: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0007",
        title: "The implementation type requires a public constructor",
        message: "The implementation type '{0}' is required to have at least one public constructor",
        severity: Severity::Error,
    };

    pub static CYCLIC_DEPENDENCY: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0008",
        title: "A cyclic dependency detected when resolving a service",
        message: "A cyclic dependency detected when resolving a service '{0}', dependency chain: '{1}'",
        severity: Severity::Error,
    };

    pub static SERVICE_NOT_REGISTERED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0010",
        title: "The service registration not found",
        message: "The service type '{0}' is not registered",
        severity: Severity::Error,
    };

    pub static IMPLEMENTATION_AND_FACTORY_NOT_ALLOWED: DiagnosticDescriptor =
        DiagnosticDescriptor {
            code: "FG0011",
            title: "Can't specify more than one construction source",
            message: "Can't specify more than one of implementation type, instance, and factory for service '{0}'",
            severity: Severity::Error,
        };

    pub static FACTORY_MUST_BE_METHOD_OR_DELEGATE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0012",
        title: "The factory member has to be a method or have a delegate type",
        message: "The factory member '{0}' has to be a method or have a delegate type, for service '{1}'",
        severity: Severity::Error,
    };

    pub static NULLABLE_SERVICE_NOT_REGISTERED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0013",
        title: "Not registered nullable dependency without a default value",
        message: "The nullable service '{0}' requested to construct '{1}' is not registered. Add a default value to make the service reference optional",
        severity: Severity::Error,
    };

    pub static NULLABLE_SERVICE_REGISTERED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0014",
        title: "Nullable dependency without a default value",
        message: "'{0}' parameter to construct '{1}' will never be null when constructed by the provider. Add a default value to make the service reference optional",
        severity: Severity::Warning,
    };

    pub static SERVICE_NAME_MUST_BE_ALPHANUMERIC: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0015",
        title: "Service name must be alphanumeric",
        message: "Service name '{0}' must be non-empty, alphanumeric and start with a letter",
        severity: Severity::Error,
    };

    pub static BUILT_IN_SERVICES_NOT_NAMED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0016",
        title: "Built-in provider services can not be named",
        message: "Built-in service '{0}' can not be named",
        severity: Severity::Error,
    };

    pub static IMPLICIT_COLLECTION_NOT_NAMED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0017",
        title: "Implicit collection services can not be named",
        message: "Implicit collection service '{0}' can not be named",
        severity: Severity::Error,
    };

    pub static SERVICE_AND_NAME_NOT_REGISTERED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0018",
        title: "The named service registration not found",
        message: "The service type '{0}' with name '{1}' is not registered",
        severity: Severity::Error,
    };

    pub static NAMED_SERVICE_REQUIRED_NOT_REGISTERED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0019",
        title: "The named service registration not found",
        message: "The service '{0}' with name '{1}' required to construct '{2}' is not registered",
        severity: Severity::Error,
    };

    pub static ONLY_STRING_KEYS_SUPPORTED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0020",
        title: "Only string service keys are supported",
        message: "Service key of type '{0}' is not supported, only string keys are supported",
        severity: Severity::Error,
    };

    pub static OPEN_GENERIC_INSTANCE_NOT_SUPPORTED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0021",
        title: "Open generic registrations cannot use instances",
        message: "Open generic service '{0}' cannot be registered using an instance",
        severity: Severity::Error,
    };

    pub static OPEN_GENERIC_IMPLEMENTATION_MUST_BE_OPEN: DiagnosticDescriptor =
        DiagnosticDescriptor {
            code: "FG0022",
            title: "Open generic implementations must be open generic definitions",
            message: "The implementation type '{0}' for open generic service '{1}' must be an open generic type definition",
            severity: Severity::Error,
        };

    pub static OPEN_GENERIC_ARITY_MISMATCH: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0023",
        title: "Open generic implementations must have matching arity",
        message: "The implementation type '{0}' for open generic service '{1}' must declare exactly {2} type parameter(s)",
        severity: Severity::Error,
    };

    pub static OPEN_GENERIC_NOT_ASSIGNABLE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0024",
        title: "Open generic implementation must be assignable",
        message: "The implementation type '{0}' for open generic service '{1}' must be assignable to the service",
        severity: Severity::Error,
    };

    pub static OPEN_GENERIC_FACTORY_MUST_BE_GENERIC: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0025",
        title: "Open generic factories must be generic methods",
        message: "The factory member '{0}' for open generic service '{1}' must be a generic method with {2} type parameter(s)",
        severity: Severity::Error,
    };

    pub static OPEN_GENERIC_FACTORY_RETURN_NOT_ASSIGNABLE: DiagnosticDescriptor =
        DiagnosticDescriptor {
            code: "FG0026",
            title: "Open generic factory return type must be assignable",
            message: "The factory method '{0}' must return a type assignable to open generic service '{2}', but returns '{1}'",
            severity: Severity::Error,
        };

    pub static OPEN_GENERIC_REQUIRES_IMPLEMENTATION: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0027",
        title: "Open generic service requires an implementation",
        message: "Open generic service '{0}' must specify an implementation type or factory because it cannot be instantiated directly",
        severity: Severity::Error,
    };

    pub static EXISTING_MUST_IMPLEMENT_SERVICE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0028",
        title: "Alias target must implement the declared service",
        message: "The existing registration target '{0}' does not implement the service '{1}'",
        severity: Severity::Error,
    };

    pub static EXISTING_TARGET_NOT_REGISTERED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0029",
        title: "Alias target is not registered",
        message: "The existing registration target '{0}' for service '{1}' is not registered",
        severity: Severity::Error,
    };

    pub static SINGLETON_DEPENDS_ON_SCOPED: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "FG0030",
        title: "Singleton service depends on a scoped service",
        message: "The singleton service '{0}' depends on the scoped service '{1}', which will be resolved from the default scope",
        severity: Severity::Warning,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_substitutes_positional_args() {
        let diag = Diagnostic::new(
            &descriptors::SERVICE_REQUIRED_NOT_REGISTERED,
            vec!["app.Config".to_string(), "app.Database".to_string()],
            None,
        );
        assert_eq!(
            diag.message(),
            "The service 'app.Config' required to construct 'app.Database' is not registered"
        );
        assert_eq!(diag.code(), "FG0002");
        assert!(diag.is_error());
    }

    #[test]
    fn message_keeps_unmatched_placeholders() {
        let diag = Diagnostic::new(&descriptors::SERVICE_NOT_REGISTERED, Vec::new(), None);
        assert_eq!(diag.message(), "The service type '{0}' is not registered");
    }

    #[test]
    fn display_appends_location() {
        let diag = Diagnostic::new(
            &descriptors::SERVICE_NOT_REGISTERED,
            vec!["app.Missing".to_string()],
            Some(Location("Services.rs:12".to_string())),
        );
        let rendered = diag.to_string();
        assert!(rendered.starts_with("FG0010:"));
        assert!(rendered.ends_with("[Services.rs:12]"));
    }
}
