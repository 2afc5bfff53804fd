//! Renderable content for a dashboard region and the formatters the pages
//! share.

use chrono::NaiveDate;

pub const LOADING_TEXT: &str = "Loading...";

/// What a region shows. A render replaces the region's previous content.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Shown while a load is in flight.
    Placeholder(String),
    /// Nothing to show; carries the empty-state message.
    Empty(String),
    Stats(Vec<Stat>),
    Table(Table),
    Cards(Vec<Card>),
    Text(String),
}

impl Content {
    pub fn placeholder() -> Self {
        Content::Placeholder(LOADING_TEXT.to_string())
    }

    /// Whether the content has nothing to display, so the empty state
    /// should be rendered instead.
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Placeholder(_) | Content::Empty(_) => true,
            Content::Stats(stats) => stats.is_empty(),
            Content::Table(table) => table.rows.is_empty(),
            Content::Cards(cards) => cards.is_empty(),
            Content::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Content::Placeholder(_))
    }

    /// Number of items (rows, cards, stat tiles) the content displays.
    pub fn item_count(&self) -> usize {
        match self {
            Content::Placeholder(_) | Content::Empty(_) => 0,
            Content::Stats(stats) => stats.len(),
            Content::Table(table) => table.rows.len(),
            Content::Cards(cards) => cards.len(),
            Content::Text(_) => 1,
        }
    }

    /// Whether any cell, card or tile mentions `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            Content::Placeholder(text) | Content::Empty(text) | Content::Text(text) => {
                text.contains(needle)
            }
            Content::Stats(stats) => stats
                .iter()
                .any(|s| s.label.contains(needle) || s.value.contains(needle)),
            Content::Table(table) => table
                .rows
                .iter()
                .flatten()
                .any(|cell| cell.contains(needle)),
            Content::Cards(cards) => cards.iter().any(|c| c.mentions(needle)),
        }
    }
}

/// A labelled figure on a stats strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

impl Stat {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Card {
    pub title: String,
    pub subtitle: Option<String>,
    pub lines: Vec<String>,
    pub badge: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    fn mentions(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.subtitle.as_deref().is_some_and(|s| s.contains(needle))
            || self.badge.as_deref().is_some_and(|s| s.contains(needle))
            || self.lines.iter().any(|l| l.contains(needle))
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Dates arrive as ISO strings on some records; show them as-is when they
/// don't parse.
pub fn format_date_str(raw: Option<&str>) -> String {
    match raw {
        None => "-".to_string(),
        Some(raw) => raw
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(format_date)
            .unwrap_or_else(|| raw.to_string()),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_score(score: Option<f64>, max_score: f64) -> String {
    match score {
        Some(score) => format!("{}/{}", trim_float(score), trim_float(max_score)),
        None => "Not graded".to_string(),
    }
}

pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// "pending_review" -> "Pending Review"
pub fn title_case(raw: &str) -> String {
    raw.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
