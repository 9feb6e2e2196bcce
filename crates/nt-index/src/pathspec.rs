//! Glob-like path specifications: plain globs include, `!`-prefixed globs
//! exclude. Shared between the index's `reset` and the builder's workspace
//! walk so the two treat a pathspec identically.

use crate::error::IndexError;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// A compiled set of include/exclude globs.
pub struct PathSpecSet {
    include: GlobSet,
    exclude: GlobSet,
}

impl PathSpecSet {
    /// Compile `specs`. An empty list (or a list with only exclusions)
    /// includes everything not excluded.
    pub fn parse(specs: &[String]) -> Result<Self, IndexError> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut any_include = false;

        for spec in specs {
            if let Some(rest) = spec.strip_prefix('!') {
                exclude.add(Glob::new(rest)?);
            } else {
                include.add(Glob::new(spec)?);
                any_include = true;
            }
        }
        if !any_include {
            include.add(Glob::new("**")?);
        }

        Ok(PathSpecSet {
            include: include.build()?,
            exclude: exclude.build()?,
        })
    }

    /// True if `path` (workspace-relative, forward-slash separated) is
    /// selected.
    pub fn matches(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_matches_everything() {
        let spec = PathSpecSet::parse(&[]).unwrap();
        assert!(spec.matches("notes/a.md"));
    }

    #[test]
    fn exclude_prefix_excludes() {
        let specs = vec!["**/*.md".to_string(), "!drafts/**".to_string()];
        let spec = PathSpecSet::parse(&specs).unwrap();
        assert!(spec.matches("notes/a.md"));
        assert!(!spec.matches("drafts/b.md"));
    }

    #[test]
    fn include_is_restrictive_when_given() {
        let specs = vec!["journal/**".to_string()];
        let spec = PathSpecSet::parse(&specs).unwrap();
        assert!(spec.matches("journal/2026.md"));
        assert!(!spec.matches("notes/a.md"));
    }
}
