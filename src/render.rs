//! Render a finished guide as human-readable Markdown.
//!
//! The library's own displayable form of [`GuideData`] — what the CLI
//! prints or writes to disk. A host application with its own presentation
//! layer consumes the data structure directly and ignores this module.

use crate::guide::GuideData;

/// Format whole seconds as `MM:SS`, or `H:MM:SS` past the hour mark.
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Render the guide as a Markdown document.
pub fn format_guide_markdown(guide: &GuideData) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", guide.title));
    output.push_str(&format!(
        "**Creator:** {} | **Video:** {}\n\n",
        guide.author,
        guide.video_id.watch_url()
    ));
    output.push_str(&format!("![{}]({})\n\n", guide.title, guide.thumbnail_url));

    if guide.steps.is_empty() {
        output.push_str("*No steps were generated for this video.*\n");
        return output;
    }

    for (i, step) in guide.steps.iter().enumerate() {
        output.push_str(&format!("## {}. {}\n\n", i + 1, step.title));
        output.push_str(&format!(
            "*[{}]* — [watch this step]({})\n\n",
            format_timestamp(step.timestamp_seconds),
            step.video_url
        ));
        output.push_str(&step.description);
        output.push_str("\n\n");
    }

    output
}
