//! A console progress bar counting simulated days.
//!
//! Only one bar exists per process. The bar's maximum is the day limit; a run that ends
//! early because nobody is infectious finalizes the bar where it stands.

use crate::log::trace;
use progress_bar::{
    finalize_progress_bar, init_progress_bar, set_progress_bar_action, set_progress_bar_progress,
    Color, Style,
};
use std::sync::atomic::{AtomicBool, Ordering};

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Starts the "Day" bar. Days are reported zero-based, so the bar spans `max_days + 1` days.
pub fn init_day_progress_bar(max_days: u64) {
    trace!("initializing day progress bar with max day {max_days}");
    let span = usize::try_from(max_days.saturating_add(1)).unwrap_or(usize::MAX);
    init_progress_bar(span);
    set_progress_bar_action("Day", Color::Blue, Style::Bold);
    ACTIVE.store(true, Ordering::SeqCst);
}

/// Marks `day` as completed.
pub fn update_day_progress(day: u64) {
    if ACTIVE.load(Ordering::SeqCst) {
        set_progress_bar_progress(usize::try_from(day.saturating_add(1)).unwrap_or(usize::MAX));
    }
}

/// Finishes the bar if one was started.
pub fn finish_day_progress() {
    if ACTIVE.swap(false, Ordering::SeqCst) {
        finalize_progress_bar();
    }
}
