//! Text rendering of applet cards.
//!
//! Walks the card body recursively and keeps what reads well in a terminal:
//! a title, text lines, facts and image URLs. Actions are listed in a table.

use applet_protocol::{Action, AppletCard};
use colored::Colorize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// What a card says, flattened to text.
#[derive(Debug, Default, PartialEq)]
pub struct CardSummary {
    pub title: Option<String>,
    pub lines: Vec<String>,
    pub images: Vec<String>,
}

pub fn summarize(card: &AppletCard) -> CardSummary {
    let mut summary = CardSummary::default();
    walk(&card.body, &mut summary);
    summary
}

fn walk(elements: &[Value], summary: &mut CardSummary) {
    for element in elements {
        let element_type = element.get("type").and_then(Value::as_str).unwrap_or_default();

        match element_type {
            "TextBlock" => {
                let Some(text) = element.get("text").and_then(Value::as_str).map(str::trim) else {
                    continue;
                };
                if text.is_empty() {
                    continue;
                }
                if summary.title.is_none() && is_heading(element) {
                    summary.title = Some(text.to_string());
                } else {
                    summary.lines.push(text.to_string());
                }
            }
            "RichTextBlock" => {
                let text: String = element
                    .get("inlines")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(|inline| inline.get("text").and_then(Value::as_str).or(inline.as_str()))
                    .collect();
                if !text.trim().is_empty() {
                    summary.lines.push(text.trim().to_string());
                }
            }
            "FactSet" => {
                for fact in element.get("facts").and_then(Value::as_array).into_iter().flatten() {
                    let title = fact.get("title").and_then(Value::as_str).unwrap_or_default();
                    let value = fact.get("value").and_then(Value::as_str).unwrap_or_default();
                    if !title.is_empty() || !value.is_empty() {
                        summary.lines.push(format!("{title}: {value}"));
                    }
                }
            }
            "Image" => {
                if let Some(url) = element.get("url").and_then(Value::as_str) {
                    summary.images.push(url.to_string());
                }
            }
            "ImageSet" => {
                for image in element.get("images").and_then(Value::as_array).into_iter().flatten() {
                    if let Some(url) = image.get("url").and_then(Value::as_str) {
                        summary.images.push(url.to_string());
                    }
                }
            }
            "Container" => {
                if let Some(items) = element.get("items").and_then(Value::as_array) {
                    walk(items, summary);
                }
            }
            "ColumnSet" => {
                for column in element.get("columns").and_then(Value::as_array).into_iter().flatten() {
                    if let Some(items) = column.get("items").and_then(Value::as_array) {
                        walk(items, summary);
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_heading(element: &Value) -> bool {
    let field = |key: &str| element.get(key).and_then(Value::as_str).map(str::to_ascii_lowercase);

    field("weight").as_deref() == Some("bolder")
        || matches!(field("size").as_deref(), Some("medium" | "large" | "extralarge"))
        || field("style").as_deref() == Some("heading")
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TYPE")]
    kind: &'static str,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "TARGET")]
    target: String,
}

/// The card's actions as a table, or `None` when it has none.
pub fn actions_table(card: &AppletCard) -> Option<String> {
    if card.actions.is_empty() {
        return None;
    }

    let rows = card.actions.iter().enumerate().map(|(index, action)| ActionRow {
        index: index + 1,
        id: action.id().unwrap_or("-").to_string(),
        kind: action.type_name(),
        title: action.title().unwrap_or_default().to_string(),
        target: action_target(action),
    });

    Some(Table::new(rows).with(Style::rounded()).to_string())
}

fn action_target(action: &Action) -> String {
    match action {
        Action::Execute(execute) => execute.verb.clone().unwrap_or_default(),
        Action::OpenUrl(open) => open.url.to_string(),
        Action::ShowCard(_) => String::new(),
    }
}

/// Short label for picking an action.
pub fn action_label(action: &Action) -> String {
    match (action.title(), action.id()) {
        (Some(title), _) if !title.is_empty() => title.to_string(),
        (_, Some(id)) => id.to_string(),
        _ => action.type_name().to_string(),
    }
}

pub fn print_card(card: &AppletCard) {
    let summary = summarize(card);
    let app_id = card.app_id().unwrap_or("?");

    println!("\n  {} {}", "▣".cyan(), app_id.bold());
    if let Some(title) = &summary.title {
        println!("\n    {}", title.bold());
    }
    for line in &summary.lines {
        println!("    {line}");
    }
    for url in &summary.images {
        println!("    {} {}", "🖼".to_string(), url.dimmed());
    }
    if let Some(refresh) = &card.auto_refresh {
        println!(
            "    {} auto-refresh: {}",
            "↻".dimmed(),
            refresh.action.verb.as_deref().unwrap_or("-").cyan()
        );
    }
    if let Some(table) = actions_table(card) {
        println!();
        for line in table.lines() {
            println!("  {line}");
        }
    }
    println!();
}
