//! Progress display for candidate evaluation

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static CANDIDATE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Candidates: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar advanced once per evaluated candidate
///
/// Hidden when `visible` is false so workers can call it unconditionally.
pub fn candidate_bar(candidates: usize, visible: bool) -> ProgressBar {
    let target = if visible {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    };
    let bar = ProgressBar::with_draw_target(Some(candidates as u64), target);
    bar.set_style(CANDIDATE_STYLE.clone());
    bar
}

/// Finish a candidate bar, leaving a summary line in place
pub fn finish_bar(bar: &ProgressBar, best_cost: Option<f64>) {
    match best_cost {
        Some(cost) => bar.finish_with_message(format!("best cost {cost:.1}")),
        None => bar.finish_and_clear(),
    }
}
