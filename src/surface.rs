//! The surface is where rendered overlay content ends up. Widgets only ever
//! talk to the [Surface] trait, so they don't care whether the output is a
//! browser page, a test buffer, or something else entirely.

use crate::{
    util::{Color, Severity},
    widget::Widget,
};
use anyhow::Context;
use indexmap::IndexMap;
use itertools::Itertools;
use std::{
    fmt::Write,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

/// Fixed display regions. Each maps to one element id in the overlay markup
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Field {
    Title,
    Subtitle,
    Location,
    Clock,
    WeatherTemp,
    WeatherDesc,
    DetailTemp,
    DetailFeels,
    DetailWind,
    DetailPrecip,
    DetailUv,
    DetailDesc,
    Forecast,
    TravelList,
    TransitList,
    Ticker,
}

impl Field {
    /// Every field, in document order
    pub const ALL: &'static [Self] = &[
        Self::Title,
        Self::Subtitle,
        Self::Location,
        Self::Clock,
        Self::WeatherTemp,
        Self::WeatherDesc,
        Self::DetailTemp,
        Self::DetailFeels,
        Self::DetailWind,
        Self::DetailPrecip,
        Self::DetailUv,
        Self::DetailDesc,
        Self::Forecast,
        Self::TravelList,
        Self::TransitList,
        Self::Ticker,
    ];

    /// Element id in the overlay markup
    pub fn id(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Location => "location",
            Self::Clock => "clock",
            Self::WeatherTemp => "w-temp",
            Self::WeatherDesc => "w-desc",
            Self::DetailTemp => "wt-temp",
            Self::DetailFeels => "wt-feels",
            Self::DetailWind => "wt-wind",
            Self::DetailPrecip => "wt-pop",
            Self::DetailUv => "wt-uv",
            Self::DetailDesc => "wt-desc",
            Self::Forecast => "wx-forecast",
            Self::TravelList => "travel-list",
            Self::TransitList => "transit-list",
            Self::Ticker => "ticker",
        }
    }
}

/// One line in a list region (travel, transit, forecast)
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub name: String,
    pub status: String,
    pub severity: Option<Severity>,
    pub badge: Option<String>,
}

impl Row {
    /// Visible text of the row, as a viewer would read it
    pub fn text(&self) -> String {
        [Some(&self.name), Some(&self.status), self.badge.as_ref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .join(" ")
    }
}

/// Contents of a list region. A provider that can't produce data renders
/// [ListState::Unavailable] rather than leaving old rows up.
#[derive(Clone, Debug, PartialEq)]
pub enum ListState {
    Rows(Vec<Row>),
    Unavailable,
}

impl ListState {
    const UNAVAILABLE: &'static str = "Unavailable";

    pub fn text(&self) -> String {
        match self {
            Self::Rows(rows) => rows.iter().map(Row::text).join("\n"),
            Self::Unavailable => Self::UNAVAILABLE.into(),
        }
    }
}

/// Sink for rendered content. Writes replace whatever was in the field.
/// Implementors handle their own synchronization, since every widget holds a
/// shared reference.
pub trait Surface: Send + Sync {
    /// Set the accent color used for highlights
    fn set_accent(&self, color: Color);

    fn set_text(&self, field: Field, text: &str);

    /// Replace the entire contents of a list region
    fn set_list(&self, field: Field, list: ListState);

    /// Replace a scrolling strip's items. Resets the offset to zero
    fn set_strip(&self, field: Field, items: &[String]);

    /// Move a scrolling strip horizontally, in pixels
    fn set_offset(&self, field: Field, offset: f64);

    /// Current visible text of a field. Empty if it was never written
    fn text(&self, field: Field) -> String;
}

/// Text of a ticker strip, as it's shown on screen
pub fn strip_text(items: &[String]) -> String {
    items.iter().map(|item| format!("• {item}")).join("")
}

#[derive(Clone, Debug, PartialEq)]
enum Content {
    Text(String),
    List(ListState),
    Strip { items: Vec<String>, offset: f64 },
}

#[derive(Debug, Default)]
struct SurfaceState {
    accent: Option<Color>,
    fields: IndexMap<Field, Content>,
}

/// A [Surface] that keeps everything in memory, and can render it out as a
/// standalone HTML page
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceState>,
}

impl MemorySurface {
    pub fn accent(&self) -> Option<Color> {
        self.lock(|state| state.accent)
    }

    /// Current offset of a strip field, if one has been built there
    pub fn offset(&self, field: Field) -> Option<f64> {
        self.lock(|state| match state.fields.get(&field) {
            Some(Content::Strip { offset, .. }) => Some(*offset),
            _ => None,
        })
    }

    /// Current list contents of a field, if it holds a list
    pub fn list(&self, field: Field) -> Option<ListState> {
        self.lock(|state| match state.fields.get(&field) {
            Some(Content::List(list)) => Some(list.clone()),
            _ => None,
        })
    }

    /// Render the whole overlay as an HTML document. Fields that were never
    /// written are rendered as empty elements.
    pub fn render_html(&self) -> String {
        self.lock(|state| {
            let accent = state.accent.unwrap_or(Color::DEFAULT_ACCENT);
            let mut html = String::new();
            html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
            html.push_str("<meta charset=\"utf-8\">\n");
            // Infallible because we're writing to a String
            let _ = writeln!(
                html,
                "<style>:root {{ --accent: {accent}; }}</style>"
            );
            html.push_str("</head>\n<body>\n");
            for &field in Field::ALL {
                render_field(&mut html, field, state.fields.get(&field));
            }
            html.push_str("</body>\n</html>\n");
            html
        })
    }

    fn lock<T>(&self, f: impl FnOnce(&mut SurfaceState) -> T) -> T {
        // A panic elsewhere doesn't invalidate what's on screen
        let mut guard =
            self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Surface for MemorySurface {
    fn set_accent(&self, color: Color) {
        self.lock(|state| state.accent = Some(color));
    }

    fn set_text(&self, field: Field, text: &str) {
        self.lock(|state| {
            state.fields.insert(field, Content::Text(text.to_owned()))
        });
    }

    fn set_list(&self, field: Field, list: ListState) {
        self.lock(|state| state.fields.insert(field, Content::List(list)));
    }

    fn set_strip(&self, field: Field, items: &[String]) {
        self.lock(|state| {
            state.fields.insert(
                field,
                Content::Strip {
                    items: items.to_vec(),
                    offset: 0.0,
                },
            )
        });
    }

    fn set_offset(&self, field: Field, new_offset: f64) {
        self.lock(|state| {
            if let Some(Content::Strip { offset, .. }) =
                state.fields.get_mut(&field)
            {
                *offset = new_offset;
            }
        });
    }

    fn text(&self, field: Field) -> String {
        self.lock(|state| match state.fields.get(&field) {
            None => String::new(),
            Some(Content::Text(text)) => text.clone(),
            Some(Content::List(list)) => list.text(),
            Some(Content::Strip { items, .. }) => strip_text(items),
        })
    }
}

fn render_field(html: &mut String, field: Field, content: Option<&Content>) {
    let id = field.id();
    // All writes are infallible because we're writing to a String
    match (field, content) {
        (Field::Forecast, Some(Content::List(ListState::Rows(rows)))) => {
            let _ = writeln!(html, "<div id=\"{id}\">");
            for row in rows {
                let _ = writeln!(
                    html,
                    "<div class=\"f\"><div class=\"label\">{}</div>\
                    <div class=\"val\"><strong>{}</strong></div></div>",
                    escape(&row.name),
                    escape(&row.status),
                );
            }
            html.push_str("</div>\n");
        }
        (_, Some(Content::List(list))) => {
            let _ = writeln!(html, "<ul id=\"{id}\">");
            match list {
                ListState::Rows(rows) => {
                    for row in rows {
                        render_row(html, row);
                    }
                }
                ListState::Unavailable => {
                    let _ = writeln!(
                        html,
                        "<li class=\"unavailable\"><span class=\"name\">{}\
                        </span></li>",
                        ListState::UNAVAILABLE
                    );
                }
            }
            html.push_str("</ul>\n");
        }
        (_, Some(Content::Strip { items, offset })) => {
            let _ = write!(
                html,
                "<div id=\"{id}\" \
                style=\"transform: translateX({offset:.1}px)\">"
            );
            for item in items {
                let _ = write!(
                    html,
                    "<span class=\"item\">• {}</span>",
                    escape(item)
                );
            }
            html.push_str("</div>\n");
        }
        (_, Some(Content::Text(text))) => {
            let _ = writeln!(html, "<div id=\"{id}\">{}</div>", escape(text));
        }
        (_, None) => {
            let _ = writeln!(html, "<div id=\"{id}\"></div>");
        }
    }
}

fn render_row(html: &mut String, row: &Row) {
    let class = match row.severity {
        Some(severity) => format!("stat {}", severity.class()),
        None => "stat".into(),
    };
    let _ = write!(
        html,
        "<li><span class=\"name\">{}</span><span class=\"{class}\">{}</span>",
        escape(&row.name),
        escape(&row.status),
    );
    if let Some(badge) = &row.badge {
        let _ = write!(html, "<span class=\"badge\">{}</span>", escape(badge));
    }
    html.push_str("</li>\n");
}

/// Escape text for use in element content or a quoted attribute
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Periodically write the rendered surface to disk, so a browser source can
/// pick it up
pub struct SnapshotWriter {
    surface: Arc<MemorySurface>,
    path: PathBuf,
    interval: Duration,
}

impl SnapshotWriter {
    pub fn new(
        surface: Arc<MemorySurface>,
        path: PathBuf,
        interval: Duration,
    ) -> Self {
        Self {
            surface,
            path,
            interval,
        }
    }
}

impl Widget for SnapshotWriter {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn period(&self) -> Duration {
        self.interval
    }

    async fn update(&mut self) -> anyhow::Result<()> {
        let html = self.surface.render_html();
        tokio::fs::write(&self.path, html).await.with_context(|| {
            format!("Error writing snapshot to {}", self.path.display())
        })
    }
}
