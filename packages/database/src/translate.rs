//! Translation of store errors into [`RepoError`] kinds.
//!
//! `switchy_database` hands back driver errors as opaque values, so the
//! translation works on their rendered text. The SQLSTATE code is read from
//! the `Debug` form (`SqlState(E23505)`). Constraint and parser names are
//! read from the primary message line of the error and of every `source()`
//! in its chain. Detail lines carry row data and are only consulted for the
//! `Key (...)=(...)` report.
//!
//! The mapping is total: anything that is not a recognised constraint or
//! geometry failure becomes [`RepoError::Unavailable`].

use std::sync::LazyLock;

use regex::Regex;

use crate::{ConflictKind, RepoError};

/// The kind of statement that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Insert,
    Update,
    Delete,
}

impl StoreOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

static SQLSTATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SqlState\(E?(?P<code>[0-9A-Z]{5})\)").expect("valid regex"));
static DETAIL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Key \((?P<columns>[^)]*)\)=\((?P<values>.*?)\)").expect("valid regex")
});
static CONSTRAINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"constraint "(?P<name>[^"]+)""#).expect("valid regex"));
static NOT_PRESENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"is not present in table "(?P<table>[^"]+)""#).expect("valid regex"));
static REFERENCED_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"is still referenced from table "(?P<table>[^"]+)""#).expect("valid regex")
});
static FOREIGN_KEY_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"foreign key constraint "[^"]+" on table "(?P<table>[^"]+)""#).expect("valid regex")
});
static NULL_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"null value in column "(?P<column>[^"]+)""#).expect("valid regex"));
static GEOJSON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgeojson\b").expect("valid regex"));

/// Spatial parser messages raised by the typed geometry column.
const GEOMETRY_MARKERS: &[&str] = &[
    "invalid geometry",
    "geometry requires more points",
    "geometry contains non-closed rings",
    "does not match column srid",
    "does not match column type",
];

/// SQLSTATE codes `PostGIS` raises for rejected geometry input.
const GEOMETRY_CODES: &[&str] = &["XX000", "22023"];

/// A store error rendered for classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorText {
    /// First line of the error and of each error in its source chain.
    pub messages: Vec<String>,
    /// Everything rendered: detail lines, the `Debug` form and the sources.
    pub full: String,
}

impl ErrorText {
    /// Renders `error` and its source chain.
    #[must_use]
    pub fn of(error: &(dyn std::error::Error + 'static)) -> Self {
        let display = error.to_string();
        let mut messages = vec![first_line(&display).to_string()];
        let mut full = format!("{display}\n{error:?}");

        let mut source = error.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            messages.push(first_line(&text).to_string());
            full.push('\n');
            full.push_str(&text);
            source = cause.source();
        }

        Self { messages, full }
    }

    fn sqlstate(&self) -> Option<&str> {
        SQLSTATE
            .captures(&self.full)
            .and_then(|caps| caps.name("code"))
            .map(|m| m.as_str())
    }

    fn message_text(&self) -> String {
        self.messages.join("\n")
    }
}

impl From<&str> for ErrorText {
    fn from(text: &str) -> Self {
        Self {
            messages: vec![first_line(text).to_string()],
            full: text.to_string(),
        }
    }
}

/// Constraint family a store error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Geometry,
    Other,
}

impl Violation {
    fn from_sqlstate(code: &str, messages: &str) -> Self {
        match code {
            "23505" => Self::Unique,
            "23503" => Self::ForeignKey,
            "23502" => Self::NotNull,
            "23514" => Self::Check,
            code if GEOMETRY_CODES.contains(&code) && is_geometry_message(messages) => {
                Self::Geometry
            }
            _ => Self::Other,
        }
    }

    fn from_messages(messages: &str) -> Self {
        let lower = messages.to_ascii_lowercase();
        if lower.contains("violates unique constraint") {
            Self::Unique
        } else if lower.contains("violates foreign key constraint") {
            Self::ForeignKey
        } else if lower.contains("violates not-null constraint") {
            Self::NotNull
        } else if lower.contains("violates check constraint") {
            Self::Check
        } else if is_geometry_message(messages) {
            Self::Geometry
        } else {
            Self::Other
        }
    }
}

fn is_geometry_message(messages: &str) -> bool {
    let lower = messages.to_ascii_lowercase();
    !lower.contains("does not exist")
        && (GEOJSON_WORD.is_match(messages)
            || GEOMETRY_MARKERS.iter().any(|marker| lower.contains(marker)))
}

/// Translates a `switchy_database` error raised by a `op` statement.
#[must_use]
pub fn store_error(op: StoreOp, error: &switchy_database::DatabaseError) -> RepoError {
    let text = ErrorText::of(error);
    let translated = classify(op, &text);

    match &translated {
        RepoError::Conflict(kind) => log::warn!("Store rejected {}: {kind}", op.as_str()),
        RepoError::Unavailable { .. } => log::error!("Store {} failed: {}", op.as_str(), text.full),
        RepoError::ValidationFailed(_) | RepoError::NotFound { .. } => {}
    }

    translated
}

/// Maps a rendered store error to a domain error kind.
///
/// A SQLSTATE code, when present, decides the constraint family on its own.
/// Without one, only the primary messages are matched.
#[must_use]
pub fn classify(op: StoreOp, error: &ErrorText) -> RepoError {
    let messages = error.message_text();
    let violation = error.sqlstate().map_or_else(
        || Violation::from_messages(&messages),
        |code| Violation::from_sqlstate(code, &messages),
    );

    let kind = match violation {
        Violation::Unique => unique(&messages, &error.full),
        Violation::ForeignKey => {
            let still_referenced = op == StoreOp::Delete
                || messages.to_ascii_lowercase().contains("update or delete on table");
            if still_referenced {
                ConflictKind::StillReferenced {
                    table: capture(&REFERENCED_FROM, &error.full, "table")
                        .or_else(|| capture(&FOREIGN_KEY_ON, &messages, "table")),
                }
            } else {
                missing_reference(&messages, &error.full)
            }
        }
        Violation::NotNull => ConflictKind::Check {
            constraint: capture(&NULL_COLUMN, &messages, "column")
                .unwrap_or_else(|| "not-null".into()),
        },
        Violation::Check => ConflictKind::Check {
            constraint: capture(&CONSTRAINT, &messages, "name").unwrap_or_else(|| "check".into()),
        },
        Violation::Geometry => ConflictKind::Geometry {
            message: error
                .messages
                .iter()
                .map(|m| strip_prefixes(m))
                .find(|m| is_geometry_message(m))
                .unwrap_or_else(|| strip_prefixes(&messages))
                .to_string(),
        },
        Violation::Other => {
            return RepoError::Unavailable {
                operation: op.as_str().to_string(),
                cause: error.full.clone(),
            };
        }
    };

    RepoError::Conflict(kind)
}

fn unique(messages: &str, full: &str) -> ConflictKind {
    DETAIL_KEY.captures(full).map_or_else(
        || ConflictKind::Unique {
            field: capture(&CONSTRAINT, messages, "name").unwrap_or_else(|| "unique key".into()),
            value: None,
        },
        |caps| ConflictKind::Unique {
            field: caps["columns"].to_string(),
            value: Some(caps["values"].to_string()),
        },
    )
}

fn missing_reference(messages: &str, full: &str) -> ConflictKind {
    let table = capture(&NOT_PRESENT, full, "table");
    match DETAIL_KEY.captures(full) {
        Some(caps) => ConflictKind::MissingReference {
            field: caps["columns"].to_string(),
            id: Some(caps["values"].to_string()),
            table,
        },
        None => ConflictKind::MissingReference {
            field: capture(&CONSTRAINT, messages, "name").unwrap_or_else(|| "foreign key".into()),
            id: None,
            table,
        },
    }
}

fn capture(re: &Regex, text: &str, group: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.name(group))
        .map(|m| m.as_str().to_string())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

/// The message without the `db error: ERROR:` prefixes.
fn strip_prefixes(line: &str) -> &str {
    let line = first_line(line);
    line.rsplit_once("ERROR: ").map_or(line, |(_, rest)| rest).trim()
}
