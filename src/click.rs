/// Classification of pointer events on links

use std::collections::HashMap;

/// Pointer travel, in screen pixels, at which a press counts as a drag
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Identical requests closer together than this are dropped (ms)
pub const DEDUP_WINDOW_MS: f64 = 500.0;

/// Remembered requests older than this are forgotten (ms)
pub const DEDUP_RETENTION_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.alt || self.shift || self.ctrl
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPos {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Other,
}

impl MouseButton {
    /// Map `MouseEvent.button`
    pub fn from_code(code: i16) -> MouseButton {
        match code {
            0 => MouseButton::Left,
            2 => MouseButton::Right,
            _ => MouseButton::Other,
        }
    }
}

/// True if the pointer moved far enough, in any direction, between press and release
pub fn was_dragged(down: Option<PointerPos>, up: PointerPos) -> bool {
    match down {
        Some(down) => {
            (up.x - down.x).abs().ceil() >= DRAG_THRESHOLD || (up.y - down.y).abs().ceil() >= DRAG_THRESHOLD
        }
        None => false,
    }
}

/// A pointer release on a link, reduced to what classification needs
#[derive(Debug, Clone, PartialEq)]
pub struct PointerRelease {
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub position: PointerPos,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Modifier,
    Drag,
    Button,
    NoLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    Ignore(IgnoreReason),
    Open { url: String },
}

/// Decide whether a release should open its link in a new tab
pub fn classify_release(pressed_at: Option<PointerPos>, release: &PointerRelease) -> Release {
    if release.modifiers.any() {
        return Release::Ignore(IgnoreReason::Modifier);
    }

    if was_dragged(pressed_at, release.position) {
        return Release::Ignore(IgnoreReason::Drag);
    }

    if release.button != MouseButton::Right {
        return Release::Ignore(IgnoreReason::Button);
    }

    match release.href.as_deref() {
        Some(href) if !href.is_empty() => Release::Open { url: href.to_string() },
        _ => Release::Ignore(IgnoreReason::NoLink),
    }
}

/// The native context menu stays available on blocked sites and with modifiers held
pub fn should_suppress_context_menu(blocked: bool, modifiers: Modifiers) -> bool {
    !blocked && !modifiers.any()
}

/// Recently sent requests, used to drop double deliveries
#[derive(Debug, Clone, Default)]
pub struct RecentRequests {
    sent_at: HashMap<(String, MouseButton), f64>,
}

impl RecentRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the same request went out less than 500ms ago
    pub fn admit(&mut self, url: &str, button: MouseButton, now: f64) -> bool {
        let key = (url.to_string(), button);

        if let Some(last) = self.sent_at.get(&key) {
            if now - last < DEDUP_WINDOW_MS {
                return false;
            }
        }

        self.sent_at.insert(key, now);
        self.sent_at.retain(|_, sent| now - *sent <= DEDUP_RETENTION_MS);
        true
    }

    pub fn len(&self) -> usize {
        self.sent_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent_at.is_empty()
    }
}

/// Cached answer to "should left clicks stay in the current tab?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeftClickDecision {
    #[default]
    Unknown,
    Known(bool),
}

impl LeftClickDecision {
    pub fn invalidate(&mut self) {
        *self = LeftClickDecision::Unknown;
    }

    /// Whether to strip `target` right now. Unknown means no.
    pub fn keep_in_tab(&self) -> bool {
        matches!(self, LeftClickDecision::Known(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(button: MouseButton, x: f64, y: f64) -> PointerRelease {
        PointerRelease {
            button,
            modifiers: Modifiers::default(),
            position: PointerPos { x, y },
            href: Some("https://example.com/".to_string()),
        }
    }

    const ORIGIN: Option<PointerPos> = Some(PointerPos { x: 100.0, y: 100.0 });

    #[test]
    fn test_right_release_opens() {
        assert_eq!(
            classify_release(ORIGIN, &release(MouseButton::Right, 100.0, 100.0)),
            Release::Open { url: "https://example.com/".to_string() }
        );
    }

    #[test]
    fn test_modifiers_left_to_browser() {
        for modifiers in [
            Modifiers { alt: true, ..Default::default() },
            Modifiers { shift: true, ..Default::default() },
            Modifiers { ctrl: true, ..Default::default() },
        ] {
            let event = PointerRelease {
                modifiers,
                ..release(MouseButton::Right, 100.0, 100.0)
            };
            assert_eq!(classify_release(ORIGIN, &event), Release::Ignore(IgnoreReason::Modifier));
        }
    }

    #[test]
    fn test_drag_threshold() {
        assert_eq!(
            classify_release(ORIGIN, &release(MouseButton::Right, 105.0, 100.0)),
            Release::Ignore(IgnoreReason::Drag)
        );
        assert_eq!(
            classify_release(ORIGIN, &release(MouseButton::Right, 100.0, 105.0)),
            Release::Ignore(IgnoreReason::Drag)
        );
        assert_eq!(
            classify_release(ORIGIN, &release(MouseButton::Right, 104.0, 104.0)),
            Release::Open { url: "https://example.com/".to_string() }
        );
    }

    #[test]
    fn test_fractional_movement_rounds_up() {
        assert!(was_dragged(ORIGIN, PointerPos { x: 104.2, y: 100.0 }));
        assert!(!was_dragged(ORIGIN, PointerPos { x: 103.9, y: 100.0 }));
        assert!(!was_dragged(None, PointerPos { x: 500.0, y: 500.0 }));
    }

    #[test]
    fn test_drag_in_any_direction() {
        assert!(was_dragged(ORIGIN, PointerPos { x: 0.0, y: 100.0 }));
        assert!(was_dragged(ORIGIN, PointerPos { x: 100.0, y: 0.0 }));
        assert!(was_dragged(ORIGIN, PointerPos { x: 95.0, y: 100.0 }));
        assert!(!was_dragged(ORIGIN, PointerPos { x: 96.5, y: 97.0 }));
        assert_eq!(
            classify_release(ORIGIN, &release(MouseButton::Right, 100.0, 90.0)),
            Release::Ignore(IgnoreReason::Drag)
        );
    }

    #[test]
    fn test_non_right_buttons_ignored() {
        assert_eq!(
            classify_release(ORIGIN, &release(MouseButton::Left, 100.0, 100.0)),
            Release::Ignore(IgnoreReason::Button)
        );
        assert_eq!(
            classify_release(ORIGIN, &release(MouseButton::Other, 100.0, 100.0)),
            Release::Ignore(IgnoreReason::Button)
        );
    }

    #[test]
    fn test_missing_href_ignored() {
        let event = PointerRelease {
            href: None,
            ..release(MouseButton::Right, 100.0, 100.0)
        };
        assert_eq!(classify_release(ORIGIN, &event), Release::Ignore(IgnoreReason::NoLink));

        let event = PointerRelease {
            href: Some(String::new()),
            ..release(MouseButton::Right, 100.0, 100.0)
        };
        assert_eq!(classify_release(ORIGIN, &event), Release::Ignore(IgnoreReason::NoLink));
    }

    #[test]
    fn test_button_codes() {
        assert_eq!(MouseButton::from_code(0), MouseButton::Left);
        assert_eq!(MouseButton::from_code(1), MouseButton::Other);
        assert_eq!(MouseButton::from_code(2), MouseButton::Right);
    }

    #[test]
    fn test_duplicates_within_window_dropped() {
        let mut recent = RecentRequests::new();

        assert!(recent.admit("https://example.com/", MouseButton::Right, 1000.0));
        assert!(!recent.admit("https://example.com/", MouseButton::Right, 1200.0));
        assert!(!recent.admit("https://example.com/", MouseButton::Right, 1499.0));
        assert!(recent.admit("https://example.com/", MouseButton::Right, 1500.0));
    }

    #[test]
    fn test_distinct_urls_not_deduplicated() {
        let mut recent = RecentRequests::new();

        assert!(recent.admit("https://example.com/a", MouseButton::Right, 1000.0));
        assert!(recent.admit("https://example.com/b", MouseButton::Right, 1001.0));
        assert!(recent.admit("https://example.com/a", MouseButton::Left, 1002.0));
    }

    #[test]
    fn test_old_entries_pruned() {
        let mut recent = RecentRequests::new();
        recent.admit("https://example.com/a", MouseButton::Right, 0.0);
        recent.admit("https://example.com/b", MouseButton::Right, 600.0);
        assert_eq!(recent.len(), 2);

        recent.admit("https://example.com/c", MouseButton::Right, 1500.0);

        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_context_menu_suppression() {
        assert!(should_suppress_context_menu(false, Modifiers::default()));
        assert!(!should_suppress_context_menu(true, Modifiers::default()));
        assert!(!should_suppress_context_menu(false, Modifiers { ctrl: true, ..Default::default() }));
    }

    #[test]
    fn test_left_click_decision() {
        let mut decision = LeftClickDecision::default();
        assert!(!decision.keep_in_tab());

        decision = LeftClickDecision::Known(true);
        assert!(decision.keep_in_tab());

        decision.invalidate();
        assert_eq!(decision, LeftClickDecision::Unknown);
    }
}
