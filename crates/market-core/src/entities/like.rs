//! Like toggle - the boolean/counter flip shared by posts and comments

/// Delta recorded by a single like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    /// `is_liked` after the toggle was applied
    pub now_liked: bool,
}

impl LikeToggle {
    /// Flip `is_liked` and move `likes_count` one step in the same direction
    ///
    /// The count saturates at zero.
    pub fn apply(is_liked: &mut bool, likes_count: &mut u32) -> Self {
        *is_liked = !*is_liked;
        if *is_liked {
            *likes_count = likes_count.saturating_add(1);
        } else {
            *likes_count = likes_count.saturating_sub(1);
        }
        Self {
            now_liked: *is_liked,
        }
    }

    /// Undo this toggle
    ///
    /// The server flips on every call, so toggles commute: undoing a failed
    /// one is one more flip no matter what was applied after it.
    pub fn revert(self, is_liked: &mut bool, likes_count: &mut u32) {
        Self::apply(is_liked, likes_count);
    }
}
