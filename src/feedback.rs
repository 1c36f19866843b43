//! Weekly feedback: narrative text from the configured generator, with a
//! deterministic template fallback that only reads already-computed
//! aggregates and therefore cannot fail.

use crate::stats::{ActivityStats, ConsumptionStats, LanguageStats};
use sambo_core::catalog::{ConsumptionKind, LanguageCode, ACTIVITY_HABITS};
use sambo_core::traits::Generator;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::warn;

/// Everything the feedback step needs about one user's week.
#[derive(Debug, Clone)]
pub struct WeeklyReport {
    /// Monday date of the reported week.
    pub week_id: String,
    pub current: ActivityStats,
    /// Earlier weeks keyed by week id; the newest is `next_back()`.
    pub trailing: BTreeMap<String, ActivityStats>,
    pub consumption: ConsumptionStats,
    pub language: LanguageStats,
}

impl WeeklyReport {
    /// The immediately preceding week's aggregate, if any was computed.
    pub fn previous(&self) -> Option<&ActivityStats> {
        self.trailing.values().next_back()
    }
}

/// Produce the feedback text. A configured generator gets one shot; any
/// failure or empty result falls back to the template.
pub async fn generate(generator: Option<&dyn Generator>, report: &WeeklyReport) -> String {
    if let Some(generator) = generator.filter(|g| g.is_configured()) {
        match generator.generate(&build_prompt(report)).await {
            Ok(text) if !text.trim().is_empty() => return text,
            Ok(_) => warn!("{} returned empty feedback, using template", generator.name()),
            Err(e) => warn!("{} feedback failed, using template: {e}", generator.name()),
        }
    }
    render_template(report)
}

/// The prompt sent to the generator: all aggregates in a fixed layout.
pub fn build_prompt(report: &WeeklyReport) -> String {
    let mut out = format!(
        "Weekly habit statistics for the week starting {}.\n\n",
        report.week_id
    );

    out.push_str("Activity habits (completions this week):\n");
    for habit in &ACTIVITY_HABITS {
        let _ = writeln!(
            out,
            "- {}: {} of {}",
            habit.name,
            report.current.count(habit.id),
            habit.cadence.weekly_max()
        );
    }
    let _ = writeln!(out, "Days tracked: {}", report.current.days_tracked);

    out.push_str("\nConsumption (doses, rubles spent):\n");
    for kind in ConsumptionKind::ALL {
        let _ = writeln!(
            out,
            "- {}: {}, {}",
            kind.name(),
            report.consumption.count(kind),
            report.consumption.cost(kind)
        );
    }

    out.push_str("\nLanguage learning sessions:\n");
    for code in LanguageCode::ALL {
        let _ = writeln!(out, "- {}: {}", code.name(), report.language.count(code));
    }

    if !report.trailing.is_empty() {
        out.push_str("\nEarlier weeks (activity completions per habit, days tracked):\n");
        for (week, stats) in &report.trailing {
            let counts: Vec<String> = ACTIVITY_HABITS
                .iter()
                .map(|h| format!("{} {}", h.name, stats.count(h.id)))
                .collect();
            let _ = writeln!(
                out,
                "- {week}: {}; days tracked {}",
                counts.join(", "),
                stats.days_tracked
            );
        }
    }

    out.push_str(
        "\nWrite a short, warm weekly summary in two or three paragraphs. \
         Compare this week with the earlier ones, call out concrete wins, \
         and suggest one specific focus for next week.",
    );
    out
}

/// Deterministic fallback report. Lists every metric with its raw count
/// and, where a preceding week exists, an up/down/same indicator.
pub fn render_template(report: &WeeklyReport) -> String {
    let previous = report.previous();
    let mut out = format!("📊 Weekly report — week of {}\n", report.week_id);

    out.push_str("\nActivity:\n");
    for habit in &ACTIVITY_HABITS {
        let count = report.current.count(habit.id);
        let _ = write!(
            out,
            "• {}: {count}/{}",
            habit.name,
            habit.cadence.weekly_max()
        );
        if let Some(prev) = previous {
            let _ = write!(out, " {}", trend(count, prev.count(habit.id)));
        }
        out.push('\n');
    }
    let _ = writeln!(out, "Days tracked: {}", report.current.days_tracked);

    out.push_str("\nConsumption:\n");
    for kind in ConsumptionKind::ALL {
        let _ = write!(out, "• {}: {} dose(s)", kind.name(), report.consumption.count(kind));
        let cost = report.consumption.cost(kind);
        if cost > 0 {
            let _ = write!(out, ", {cost} руб");
        }
        out.push('\n');
    }

    out.push_str("\nLanguage:\n");
    for code in LanguageCode::ALL {
        let _ = writeln!(out, "• {}: {} session(s)", code.name(), report.language.count(code));
    }
    out
}

fn trend(current: u32, previous: u32) -> &'static str {
    match current.cmp(&previous) {
        std::cmp::Ordering::Greater => "↑",
        std::cmp::Ordering::Less => "↓",
        std::cmp::Ordering::Equal => "=",
    }
}

/// Whether to prompt the user for an improvement goal after the report:
/// true if any activity habit declined week-over-week, or stayed flat
/// while below its cadence maximum. A missing previous week counts as
/// all zeros.
pub fn should_request_goals(current: &ActivityStats, previous: Option<&ActivityStats>) -> bool {
    let zeros = ActivityStats::default();
    let previous = previous.unwrap_or(&zeros);
    ACTIVITY_HABITS.iter().any(|habit| {
        let now = current.count(habit.id);
        let was = previous.count(habit.id);
        now < was || (now == was && now < habit.cadence.weekly_max())
    })
}
