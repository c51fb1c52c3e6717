//! # Session
//!
//! The explicit environment object passed into interpreter and query calls.
//!
//! A session owns the named artifacts of one workspace: published fragments
//! (immutable), live cases (mutable), and the dependency tracker. There is
//! no process-wide registry; create a session, use it, drop it.
//!
//! Different sessions are fully independent. If a session is shared across
//! threads, callers must apply single-writer/multiple-reader discipline
//! per case; the core itself is single-threaded and synchronous.

use crate::case::AssuranceCase;
use crate::dependency::DependencyTracker;
use crate::fragment::Fragment;
use crate::AttestError;
use std::collections::BTreeMap;

/// Named-artifact environment for interpreter and query execution.
#[derive(Debug, Default)]
pub struct Session {
    fragments: BTreeMap<String, Fragment>,
    cases: BTreeMap<String, AssuranceCase>,
    tracker: DependencyTracker,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // FRAGMENTS
    // =========================================================================

    /// Move a published fragment into the session.
    ///
    /// Fragments are immutable once published, so a taken name is an error
    /// rather than a rebind.
    pub fn publish_fragment(&mut self, fragment: Fragment) -> Result<(), AttestError> {
        if self.fragments.contains_key(fragment.name()) {
            return Err(AttestError::validation(format!(
                "fragment {} already published",
                fragment.name()
            )));
        }
        self.fragments.insert(fragment.name().to_string(), fragment);
        Ok(())
    }

    /// Lookup a published fragment.
    #[must_use]
    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.fragments.get(name)
    }

    /// Published fragment names, sorted.
    #[must_use]
    pub fn fragment_names(&self) -> Vec<&str> {
        self.fragments.keys().map(String::as_str).collect()
    }

    // =========================================================================
    // CASES
    // =========================================================================

    /// Bind a case to a name, replacing any previous binding.
    pub fn bind_case(&mut self, name: impl Into<String>, case: AssuranceCase) {
        self.cases.insert(name.into(), case);
    }

    /// Lookup a case by name.
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&AssuranceCase> {
        self.cases.get(name)
    }

    /// Mutable lookup of a case by name.
    pub fn case_mut(&mut self, name: &str) -> Option<&mut AssuranceCase> {
        self.cases.get_mut(name)
    }

    /// Lookup a case, erroring with the unknown name.
    pub fn require_case(&self, name: &str) -> Result<&AssuranceCase, AttestError> {
        self.cases
            .get(name)
            .ok_or_else(|| AttestError::Name(name.to_string()))
    }

    /// Mutable lookup of a case, erroring with the unknown name.
    pub fn require_case_mut(&mut self, name: &str) -> Result<&mut AssuranceCase, AttestError> {
        self.cases
            .get_mut(name)
            .ok_or_else(|| AttestError::Name(name.to_string()))
    }

    /// Remove a case binding, returning the case.
    pub fn discard_case(&mut self, name: &str) -> Option<AssuranceCase> {
        self.cases.remove(name)
    }

    /// Bound case names, sorted.
    #[must_use]
    pub fn case_names(&self) -> Vec<&str> {
        self.cases.keys().map(String::as_str).collect()
    }

    // =========================================================================
    // DEPENDENCIES
    // =========================================================================

    /// The session's dependency tracker.
    #[must_use]
    pub fn tracker(&self) -> &DependencyTracker {
        &self.tracker
    }

    /// Mutable access to the dependency tracker.
    pub fn tracker_mut(&mut self) -> &mut DependencyTracker {
        &mut self.tracker
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentBuilder;

    #[test]
    fn publish_and_lookup_fragment() {
        let mut session = Session::new();
        let fragment = FragmentBuilder::new("frag_a")
            .goal("G1", "claim")
            .publish()
            .expect("publish");

        session.publish_fragment(fragment).expect("session publish");
        assert!(session.fragment("frag_a").is_some());
        assert_eq!(session.fragment_names(), vec!["frag_a"]);
    }

    #[test]
    fn republishing_a_name_is_rejected() {
        let mut session = Session::new();
        for _ in 0..2 {
            let fragment = FragmentBuilder::new("frag_a")
                .goal("G1", "claim")
                .publish()
                .expect("publish");
            if session.publish_fragment(fragment).is_err() {
                return;
            }
        }
        unreachable!("second publish must fail");
    }

    #[test]
    fn case_bindings_can_rebind() {
        let mut session = Session::new();
        session.bind_case("main", AssuranceCase::new("c1", "First"));
        session.bind_case("main", AssuranceCase::new("c2", "Second"));

        assert_eq!(session.case("main").map(|c| c.id.as_str()), Some("c2"));
    }

    #[test]
    fn require_case_names_the_unknown() {
        let session = Session::new();
        let err = session.require_case("ghost").expect_err("must fail");
        assert!(matches!(err, AttestError::Name(name) if name == "ghost"));
    }

    #[test]
    fn discard_case_removes_binding() {
        let mut session = Session::new();
        session.bind_case("main", AssuranceCase::new("c1", "First"));
        assert!(session.discard_case("main").is_some());
        assert!(session.case("main").is_none());
    }
}
