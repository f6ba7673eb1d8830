use rescue_core::{StatusView, UserAction};

const BAR_WIDTH: usize = 20;

/// Renders a status view as terminal lines.
pub fn render(view: &StatusView) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.detail.len() + 3);
    lines.push(format!("== {} ==", view.heading));
    lines.extend(view.detail.iter().map(|line| format!("   {line}")));
    lines.extend(render_progress(view));
    for action in &view.actions {
        lines.push(format!("   [{}]", action_label(*action)));
    }
    lines
}

/// Just the progress line, for animation ticks.
pub fn render_progress(view: &StatusView) -> Option<String> {
    view.progress
        .map(|progress| format!("   {} {progress:>3}%", progress_bar(progress)))
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn action_label(action: UserAction) -> &'static str {
    match action {
        UserAction::ReturnToOriginal => "close: return to original page",
        UserAction::CloseTab => "close: close tab",
    }
}
