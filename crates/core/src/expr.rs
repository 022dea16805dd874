//! Compiled boolean query expressions
//!
//! A [`DnfExpr`] is the compiled form of a `find_by` method name: an
//! ordered list of AND-groups with OR between groups. The expression is
//! always in strict disjunctive normal form - the deriver flattens method
//! names left to right and never nests.
//!
//! Term order is significant: scanning groups and terms left to right and
//! giving each *distinct* property the next unused slot defines positional
//! argument binding at execution time.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// One conjunction of property terms (AND within the group)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndGroup {
    terms: SmallVec<[String; 2]>,
}

impl AndGroup {
    /// A group over the given property terms, in order
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// The property terms of this group, in order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether the group holds no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A boolean query in disjunctive normal form (OR of AND-groups)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnfExpr {
    groups: Vec<AndGroup>,
}

impl DnfExpr {
    /// An expression over the given groups, in order
    pub fn new(groups: Vec<AndGroup>) -> Self {
        Self { groups }
    }

    /// The AND-groups of this expression, in order
    pub fn groups(&self) -> &[AndGroup] {
        &self.groups
    }

    /// Distinct property names in first-encounter scan order.
    ///
    /// This order is the positional argument binding order: the first
    /// argument binds the first property encountered, and a property that
    /// repeats later in the scan reuses its earlier slot.
    pub fn distinct_properties(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for group in &self.groups {
            for term in group.terms() {
                if !seen.contains(&term.as_str()) {
                    seen.push(term);
                }
            }
        }
        seen
    }
}

impl fmt::Display for DnfExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (gi, group) in self.groups.iter().enumerate() {
            if gi > 0 {
                write!(f, " or ")?;
            }
            for (ti, term) in group.terms().iter().enumerate() {
                if ti > 0 {
                    write!(f, " and ")?;
                }
                write!(f, "{}", term)?;
            }
        }
        Ok(())
    }
}
