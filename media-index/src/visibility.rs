use serde::{Deserialize, Serialize};

use crate::models::{SelectionKind, VisibilityPreference};

/// How an allowed folder covers the folders below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixMatch {
    /// Plain string prefix; `/sdcard/Pic` also admits `/sdcard/Pics2`.
    /// This is what stored selections were written against.
    #[default]
    Literal,
    /// Prefix must end at a path separator
    PathSegment,
}

/// Decides whether a folder or bucket is shown under a [`VisibilityPreference`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter {
    pub prefix: PrefixMatch,
}

impl VisibilityFilter {
    pub fn new(prefix: PrefixMatch) -> Self {
        Self { prefix }
    }

    /// `candidate` is a folder path or a bucket id, matching `pref.kind`.
    pub fn is_visible(&self, candidate: &str, pref: &VisibilityPreference) -> bool {
        if pref.show_all || pref.allow_set.contains(candidate) {
            return true;
        }

        match pref.kind {
            SelectionKind::BucketId => false,
            SelectionKind::FolderPath => pref
                .allow_set
                .iter()
                .any(|allowed| self.covers(allowed, candidate)),
        }
    }

    fn covers(&self, allowed: &str, candidate: &str) -> bool {
        match self.prefix {
            PrefixMatch::Literal => candidate.starts_with(allowed),
            PrefixMatch::PathSegment => candidate
                .strip_prefix(allowed.trim_end_matches('/'))
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folders(allowed: &[&str]) -> VisibilityPreference {
        VisibilityPreference::only(SelectionKind::FolderPath, allowed.iter().copied())
    }

    #[test]
    fn test_show_all() {
        let filter = VisibilityFilter::default();
        let pref = VisibilityPreference::show_all(SelectionKind::FolderPath);
        assert!(filter.is_visible("/anything", &pref));
    }

    #[test]
    fn test_subfolders_inherit_selection() {
        let filter = VisibilityFilter::default();
        let pref = folders(&["/sdcard/DCIM"]);
        assert!(filter.is_visible("/sdcard/DCIM", &pref));
        assert!(filter.is_visible("/sdcard/DCIM/Camera", &pref));
        assert!(!filter.is_visible("/sdcard/Download", &pref));
    }

    #[test]
    fn test_literal_prefix_admits_sibling() {
        let filter = VisibilityFilter::new(PrefixMatch::Literal);
        assert!(filter.is_visible("/sdcard/Pics2", &folders(&["/sdcard/Pic"])));
    }

    #[test]
    fn test_path_segment_prefix() {
        let filter = VisibilityFilter::new(PrefixMatch::PathSegment);
        let pref = folders(&["/sdcard/Pic"]);
        assert!(!filter.is_visible("/sdcard/Pics2", &pref));
        assert!(filter.is_visible("/sdcard/Pic", &pref));
        assert!(filter.is_visible("/sdcard/Pic/2024", &pref));

        let trailing = folders(&["/sdcard/Pic/"]);
        assert!(filter.is_visible("/sdcard/Pic/2024", &trailing));
    }

    #[test]
    fn test_bucket_ids_are_exact() {
        let filter = VisibilityFilter::default();
        let pref = VisibilityPreference::only(SelectionKind::BucketId, ["123"]);
        assert!(filter.is_visible("123", &pref));
        assert!(!filter.is_visible("1234", &pref));
        assert!(!filter.is_visible("12", &pref));
    }

    #[test]
    fn test_empty_allow_set_hides_everything() {
        let filter = VisibilityFilter::default();
        assert!(!filter.is_visible("/sdcard/DCIM", &folders(&[])));
    }
}
