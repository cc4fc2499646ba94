// Continuation Resolver - Multi-page recipe stitching
//
// A recipe cut off at the bottom of page N is "pending" while page N+1 is
// processed. A fragment on page N+1 continues it when it is untitled (or its
// title carries a "continued" marker and still names the pending recipe) and
// declared page numbers, if both known, are consecutive. Anything else is a
// new recipe.

use crate::catalog::RecipeId;
use crate::matching::NameMatcher;
use crate::models::{CompletenessHint, Fragment};
use tracing::debug;

/// Open fragment waiting for its continuation on the next page
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFragment {
    pub recipe_id: RecipeId,
    /// Normalized key of the recipe the fragment belongs to
    pub key: String,
    pub page_number: Option<u32>,
    /// Page batch the fragment came from
    pub batch_index: usize,
}

/// Fragment expects more content on the next page
///
/// An explicit hint wins; otherwise the recipe it produced is consulted.
pub fn is_open(hint: CompletenessHint, recipe_complete: bool) -> bool {
    match hint {
        CompletenessHint::Incomplete => true,
        CompletenessHint::Complete => false,
        CompletenessHint::Unknown => !recipe_complete,
    }
}

/// Tracks the pending fragment across page batches
///
/// Call [`begin_page`](Self::begin_page) before each non-empty batch. Empty
/// batches (photo pages) leave the pending fragment in place.
#[derive(Debug, Clone)]
pub struct ContinuationResolver {
    matcher: NameMatcher,
    threshold: f64,
    /// Open fragment from the previous non-empty page
    pending: Option<PendingFragment>,
    /// Last open fragment seen on the current page
    staged: Option<PendingFragment>,
    /// A continuation was already accepted on the current page
    consumed: bool,
}

impl ContinuationResolver {
    /// `threshold` applies to marked titles compared with the pending recipe
    pub fn new(matcher: NameMatcher, threshold: f64) -> Self {
        Self {
            matcher,
            threshold,
            pending: None,
            staged: None,
            consumed: false,
        }
    }

    /// Advance to the next page: its predecessor's last open fragment becomes pending
    pub fn begin_page(&mut self) {
        if let Some(expired) = self.pending.take() {
            if !self.consumed {
                debug!(
                    recipe_id = %expired.recipe_id,
                    batch = expired.batch_index,
                    "Pending fragment expired without continuation"
                );
            }
        }
        self.pending = self.staged.take();
        self.consumed = false;
    }

    pub fn pending(&self) -> Option<&PendingFragment> {
        self.pending.as_ref()
    }

    /// Recipe this fragment continues, if any
    ///
    /// Only the first qualifying fragment on a page continues the pending one.
    pub fn resolve(&self, fragment: &Fragment) -> Option<RecipeId> {
        if self.consumed {
            return None;
        }
        let pending = self.pending.as_ref()?;

        let title_allows = match fragment.normalized_key() {
            None => true,
            Some(key) => {
                fragment.continuation_marker
                    && self.matcher.score(&key, &pending.key) >= self.threshold
            }
        };
        if !title_allows {
            return None;
        }

        if let (Some(previous), Some(current)) = (pending.page_number, fragment.page_number) {
            if previous.checked_add(1) != Some(current) {
                debug!(
                    recipe_id = %pending.recipe_id,
                    previous,
                    current,
                    "Continuation rejected: pages not sequential"
                );
                return None;
            }
        }

        Some(pending.recipe_id)
    }

    /// Record that the pending fragment was continued on this page
    pub fn confirm(&mut self) {
        self.consumed = true;
    }

    /// Note a reconciled fragment; open ones may be continued on the next page
    pub fn observe(&mut self, hint: CompletenessHint, pending: PendingFragment, recipe_complete: bool) {
        if is_open(hint, recipe_complete) {
            self.staged = Some(pending);
        }
    }

    /// Open fragment left at the end of the run
    pub fn finish(mut self) -> Option<PendingFragment> {
        self.staged.take()
    }
}
