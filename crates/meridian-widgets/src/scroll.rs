//! Header and scroll-to-top behaviour driven by the page scroll offset.

/// Offset past which the scroll-to-top button is shown.
pub const SCROLL_TO_TOP_THRESHOLD: f64 = 200.0;

/// Widget state for a given vertical scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    /// Header carries `header--transparent`
    pub header_transparent: bool,
    /// `#scrollToTopBtn` is displayed
    pub scroll_to_top_visible: bool,
}

impl ScrollState {
    pub fn at(scroll_y: f64) -> Self {
        Self {
            header_transparent: scroll_y <= 0.0,
            scroll_to_top_visible: scroll_y > SCROLL_TO_TOP_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_transparent_only_at_top() {
        assert!(ScrollState::at(0.0).header_transparent);
        assert!(!ScrollState::at(1.0).header_transparent);
    }

    #[test]
    fn scroll_button_appears_past_threshold() {
        assert!(!ScrollState::at(200.0).scroll_to_top_visible);
        assert!(ScrollState::at(200.5).scroll_to_top_visible);
    }
}
