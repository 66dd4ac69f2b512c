use std::fmt::Write as _;

use review_client::{Locale, NoticeLevel, ReviewView};

const RULE: &str = "────────────────────────────────────────────────────────";

pub fn paint(view: &ReviewView, locale: Locale) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    if let Some(address) = &view.address {
        let _ = writeln!(out, "[{address}]");
    }
    if let Some(label) = &view.instance_label {
        let _ = writeln!(out, "{label}");
    }
    for notice in &view.notices {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Danger => "error",
        };
        let _ = writeln!(out, "  ({tag}) {}", notice.message);
    }

    for message in &view.messages {
        let _ = writeln!(
            out,
            "\n{} {}",
            locale.role_icon(message.role),
            locale.role_heading(message.role)
        );
        let _ = writeln!(out, "{}", message.text);
    }

    for (label, panel) in [("A", &view.completion_a), ("B", &view.completion_b)] {
        if let Some(panel) = panel {
            let _ = writeln!(out, "\n--- completion {label} ---");
            let _ = writeln!(out, "{}", panel.text);
        }
    }

    if let Some(progress) = &view.progress_line {
        let _ = writeln!(out, "\n{progress}");
    }

    let form = &view.form;
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "answers: a={} b={} pref={} quality={} comment={:?}",
        show(form.completion_a_acceptable.map(|v| v.to_string())),
        show(form.completion_b_acceptable.map(|v| v.to_string())),
        show(form.preference.map(|v| v.to_string())),
        show(form.instance_quality.map(|v| v.to_string())),
        form.comment,
    );
    let _ = write!(out, "{RULE}");
    out
}
