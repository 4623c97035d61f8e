use std::fmt::{Debug, Display};

pub struct Error {
    kind: ErrorKind,
    context: Vec<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    /// A numeric input is negative, non-finite, not an integer where one is required, or a
    /// discount exceeds the subtotal.
    InvalidAmount(String),
    /// A textual input such as a role tag is not one of the accepted values.
    InvalidInput(String),
    NotFound(String),
    InvalidState(String),
    InsufficientStock(String),
    Template(minijinja::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
}

pub trait AddContext<T> {
    fn add_context(self, ctx: &str) -> Result<T, Error>;
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut context = self.context.clone();
        context.reverse();
        let context = if context.is_empty() {
            String::from("no context")
        } else {
            context.join(" -> ")
        };
        write!(f, "{context}")
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error {
            context: vec![format!("{:?}", value)],
            kind: ErrorKind::Io(value),
        }
    }
}

impl From<minijinja::Error> for Error {
    fn from(value: minijinja::Error) -> Self {
        Error {
            context: vec![format!("{}", value)],
            kind: ErrorKind::Template(value),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            context: vec![format!("{}", value)],
            kind: ErrorKind::Json(value),
        }
    }
}

impl Error {
    /// Build an [`ErrorKind::InvalidAmount`] error whose first context entry is `reason`.
    pub fn invalid_amount(reason: impl Into<String>) -> Error {
        let reason = reason.into();
        Error {
            context: vec![reason.clone()],
            kind: ErrorKind::InvalidAmount(reason),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Error {
        let reason = reason.into();
        Error {
            context: vec![reason.clone()],
            kind: ErrorKind::InvalidInput(reason),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Error {
        let what = what.into();
        Error {
            context: vec![format!("{what} not found")],
            kind: ErrorKind::NotFound(what),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Error {
        let reason = reason.into();
        Error {
            context: vec![reason.clone()],
            kind: ErrorKind::InvalidState(reason),
        }
    }

    pub fn insufficient_stock(reason: impl Into<String>) -> Error {
        let reason = reason.into();
        Error {
            context: vec![reason.clone()],
            kind: ErrorKind::InsufficientStock(reason),
        }
    }

    /// Return the kind of failure, for callers that map errors to user facing messages.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// `true` when the error was raised because of a bad numeric input.
    pub fn is_invalid_amount(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidAmount(_))
    }

    /// Add more context to the given error. This context will ultimately be displayed to the user
    /// and could be useful for correcting bad input.
    ///
    /// Generally a single layer of context should be added for every level that an error is
    /// surfaced. If the error is surfaced all the way to main and not handled there, then all the
    /// context will be displayed to the user in reverse order
    ///
    /// # Arguments
    /// * `context` - Any additional information that would be useful for the user to see if the
    ///   error is surfaced to them
    pub fn add_context(self, context: &str) -> Error {
        let mut existing = self.context;
        existing.push(context.to_string());
        Self {
            context: existing,
            ..self
        }
    }
}

impl<T> AddContext<T> for Result<T, Error> {
    fn add_context(self, ctx: &str) -> Result<T, Error> {
        self.map_err(|e| e.add_context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_displayed_outermost_first() {
        let err: Result<(), Error> = Err(Error::invalid_amount("quantity is negative"));
        let err = err
            .add_context("computing line total")
            .add_context("computing subtotal")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "computing subtotal -> computing line total -> quantity is negative"
        );
        assert!(err.is_invalid_amount());
    }

    #[test]
    fn kinds_are_preserved() {
        assert!(matches!(
            Error::not_found("product 3").kind(),
            ErrorKind::NotFound(_)
        ));
        assert!(!Error::invalid_state("already finalized").is_invalid_amount());
        assert!(matches!(
            Error::invalid_input("unknown role 'guest'").kind(),
            ErrorKind::InvalidInput(_)
        ));
        let io = Error::from(std::io::Error::other("disk"));
        assert!(matches!(io.kind(), ErrorKind::Io(_)));
    }
}
