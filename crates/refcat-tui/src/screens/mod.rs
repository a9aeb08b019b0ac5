//! Screen implementations. Each screen is a top-level Component.

pub mod console;
pub mod preview;

use refcat_core::{Catalogue, CatalogueSource};

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar. Every screen shares the one
/// catalogue source.
pub fn create_screens<S: CatalogueSource>(
    catalogue: &Catalogue<S>,
    preview_type: &str,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Console,
            Box::new(console::ConsoleScreen::new(catalogue.console())),
        ),
        (
            ScreenId::Preview,
            Box::new(preview::PreviewScreen::new(catalogue.clone(), preview_type)),
        ),
    ]
}

/// Move `current` by `delta` within `0..len`, saturating at both ends.
pub(crate) fn step(current: usize, delta: isize, len: usize) -> usize {
    let moved = if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta.unsigned_abs())
    };
    moved.min(len.saturating_sub(1))
}

/// Next or previous index in `0..len`, wrapping around. `len` must be non-zero.
pub(crate) fn cycle(current: usize, forward: bool, len: usize) -> usize {
    if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}
