// Colored terminal summaries for the transition and distance analyses.
//
// main.rs delegates all display here; nothing in this module feeds back
// into the written matrices.

use colored::Colorize;

use crate::diagnostics::Diagnostics;
use crate::pipeline::distance_map::DistanceReport;
use crate::pipeline::transitions::TransitionReport;
use crate::table::labels::TopicLabels;

const LABEL_WIDTH: usize = 28;

/// Display the transition run: matrix stats, then each topic's strongest
/// next-sentence topics when labels are available.
pub fn display_transitions(report: &TransitionReport, top: usize) {
    let matrix = &report.matrix;
    println!(
        "\n{}",
        format!(
            "=== Topic Transitions ({} topics, {} sentences) ===",
            matrix.num_topics(),
            report.sentences
        )
        .bold()
    );
    println!(
        "  Transitions observed: {}  |  Accumulation: {}  |  Scale: {}",
        matrix.observations(),
        matrix.accumulation(),
        matrix.scale()
    );

    let silent = matrix
        .topic_total()
        .iter()
        .filter(|total| **total == 0.0)
        .count();
    if silent > 0 {
        println!(
            "  {} {} topics never lead into a next sentence (all-zero rows)",
            "~".yellow(),
            silent
        );
    }

    let Some(labeled) = &report.labeled else {
        println!(
            "{}",
            "  Pass --labels to see the strongest transitions per topic.".dimmed()
        );
        return;
    };

    println!();
    for topic in 0..labeled.num_topics() {
        let label = super::truncate_chars(labeled.label(topic), LABEL_WIDTH);
        let next: Vec<String> = labeled
            .top_transitions(topic, top)
            .into_iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(j, w)| {
                format!(
                    "{} {}",
                    super::truncate_chars(labeled.label(j), LABEL_WIDTH),
                    format!("{w:.2}").dimmed()
                )
            })
            .collect();

        if next.is_empty() {
            println!("  {:>3}. {:<30} {}", topic, label.bold(), "-".dimmed());
        } else {
            println!("  {:>3}. {:<30} -> {}", topic, label.bold(), next.join(", "));
        }
    }
}

/// Display the distance run: the nearest neighbors of every topic.
pub fn display_distances(report: &DistanceReport, top: usize) {
    let matrix = &report.matrix;
    println!(
        "\n{}",
        format!(
            "=== Intertopic Distances ({} topics, {}) ===",
            matrix.num_topics(),
            report.measure
        )
        .bold()
    );
    println!();

    for topic in 0..matrix.num_topics() {
        let neighbors: Vec<String> = matrix
            .nearest(topic, top)
            .into_iter()
            .map(|(j, d)| {
                let d_str = format!("{d:.3}");
                let colored_d = if d < 0.5 {
                    d_str.bright_green()
                } else if d < 0.8 {
                    d_str.bright_yellow()
                } else {
                    d_str.normal()
                };
                format!("{} {}", topic_name(report.labels.as_ref(), j), colored_d)
            })
            .collect();

        println!(
            "  {:>3}. {:<30} nearest: {}",
            topic,
            topic_name(report.labels.as_ref(), topic).bold(),
            neighbors.join(", ")
        );
    }
}

/// Display skipped rows, capped so a badly broken file doesn't flood the terminal.
pub fn display_diagnostics(diagnostics: &Diagnostics, limit: usize) {
    if diagnostics.is_empty() {
        return;
    }

    println!(
        "\n  {} {} rows or pairs were skipped:",
        "!".bright_red(),
        diagnostics.len()
    );
    for diagnostic in diagnostics.iter().take(limit) {
        println!("    {}", diagnostic.to_string().dimmed());
    }
    if diagnostics.len() > limit {
        println!(
            "    {}",
            format!("... and {} more (see warnings above)", diagnostics.len() - limit).dimmed()
        );
    }
}

/// A topic's label if one is known, otherwise `topic N`.
fn topic_name(labels: Option<&TopicLabels>, topic: usize) -> String {
    match labels.and_then(|l| l.get(topic).ok()) {
        Some(label) => super::truncate_chars(label, LABEL_WIDTH),
        None => format!("topic {topic}"),
    }
}
