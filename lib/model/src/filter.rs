use oxrdf::{NamedNodeRef, QuadRef, SubjectRef, TermRef, TripleRef};
use std::fmt::{Display, Formatter};

/// A triple pattern where every position is either fixed to a term or left open.
///
/// An open position is a wildcard that matches any term. Wildcards only exist at lookup time. They
/// are unrelated to SPARQL variables and can never be stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TripleFilter<'a> {
    pub subject: Option<SubjectRef<'a>>,
    pub predicate: Option<NamedNodeRef<'a>>,
    pub object: Option<TermRef<'a>>,
}

impl<'a> TripleFilter<'a> {
    /// A filter that matches every triple.
    pub const fn any() -> Self {
        Self {
            subject: None,
            predicate: None,
            object: None,
        }
    }

    /// Fixes the subject position.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<SubjectRef<'a>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Fixes the predicate position.
    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Into<NamedNodeRef<'a>>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Fixes the object position.
    #[must_use]
    pub fn with_object(mut self, object: impl Into<TermRef<'a>>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Returns `true` if no position is fixed.
    pub fn is_any(&self) -> bool {
        self.subject.is_none() && self.predicate.is_none() && self.object.is_none()
    }

    /// Returns whether every fixed position of this filter is equal to the corresponding term of
    /// `triple`.
    pub fn matches(&self, triple: TripleRef<'_>) -> bool {
        self.subject.map_or(true, |s| s == triple.subject)
            && self.predicate.map_or(true, |p| p == triple.predicate)
            && self.object.map_or(true, |o| o == triple.object)
    }

    /// Like [Self::matches] but ignores the graph name of `quad`.
    pub fn matches_quad(&self, quad: QuadRef<'_>) -> bool {
        self.subject.map_or(true, |s| s == quad.subject)
            && self.predicate.map_or(true, |p| p == quad.predicate)
            && self.object.map_or(true, |o| o == quad.object)
    }
}

impl Display for TripleFilter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.subject {
            Some(subject) => write!(f, "{subject} ")?,
            None => f.write_str("* ")?,
        }
        match self.predicate {
            Some(predicate) => write!(f, "{predicate} ")?,
            None => f.write_str("* ")?,
        }
        match self.object {
            Some(object) => write!(f, "{object}"),
            None => f.write_str("*"),
        }
    }
}
