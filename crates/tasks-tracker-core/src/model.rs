use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Error returned when a label or ordinal does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// Offending input.
    pub value: String,
}

/// Rendering metadata attached to an enumerated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMeta {
    /// Human readable label, also used as the filter key.
    pub label: &'static str,
    /// Single glyph shown next to the label.
    pub icon: &'static str,
    /// Hex colour (`#rrggbb`).
    pub color: &'static str,
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not yet planned.
    #[default]
    Backlog,
    /// Planned, not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
    /// Abandoned.
    Cancelled,
}

const STATUS_META: [DisplayMeta; 5] = [
    DisplayMeta {
        label: "Backlog",
        icon: "?",
        color: "#868e96",
    },
    DisplayMeta {
        label: "Todo",
        icon: "○",
        color: "#74c0fc",
    },
    DisplayMeta {
        label: "In Progress",
        icon: "◷",
        color: "#fcc419",
    },
    DisplayMeta {
        label: "Done",
        icon: "✓",
        color: "#51cf66",
    },
    DisplayMeta {
        label: "Cancelled",
        icon: "✕",
        color: "#ff6b6b",
    },
];

impl Status {
    /// Every status in ordinal order.
    pub const ALL: [Self; 5] = [
        Self::Backlog,
        Self::Todo,
        Self::InProgress,
        Self::Done,
        Self::Cancelled,
    ];

    /// Ordinal used by the persistent store.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Decode a stored ordinal. Out-of-range values yield `None`.
    #[must_use]
    pub const fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Backlog),
            1 => Some(Self::Todo),
            2 => Some(Self::InProgress),
            3 => Some(Self::Done),
            4 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Rendering metadata for this status.
    #[must_use]
    pub const fn meta(self) -> DisplayMeta {
        STATUS_META[self as usize]
    }

    /// Display label ("In Progress", ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.meta().label
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    /// Accepts labels case-insensitively, with `-`, `_` or spaces as separators,
    /// as well as ordinals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "status", &Self::ALL, |status| status.label(), |n| {
            Self::from_ordinal(n)
        })
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Default priority.
    #[default]
    Low,
    /// Should be done soon.
    Medium,
    /// Should be done first.
    High,
}

const PRIORITY_META: [DisplayMeta; 3] = [
    DisplayMeta {
        label: "Low",
        icon: "↓",
        color: "#74c0fc",
    },
    DisplayMeta {
        label: "Medium",
        icon: "→",
        color: "#fcc419",
    },
    DisplayMeta {
        label: "High",
        icon: "↑",
        color: "#ff6b6b",
    },
];

impl Priority {
    /// Every priority in ordinal order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Ordinal used by the persistent store.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Decode a stored ordinal. Out-of-range values yield `None`.
    #[must_use]
    pub const fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    /// Rendering metadata for this priority.
    #[must_use]
    pub const fn meta(self) -> DisplayMeta {
        PRIORITY_META[self as usize]
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.meta().label
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "priority", &Self::ALL, |priority| priority.label(), |n| {
            Self::from_ordinal(n)
        })
    }
}

fn parse_variant<T: Copy>(
    raw: &str,
    kind: &'static str,
    all: &[T],
    label: impl Fn(T) -> &'static str,
    from_ordinal: impl Fn(i64) -> Option<T>,
) -> Result<T, UnknownVariant> {
    let normalized = normalize_label(raw);
    if let Ok(n) = normalized.parse::<i64>() {
        return from_ordinal(n).ok_or_else(|| UnknownVariant {
            kind,
            value: raw.to_owned(),
        });
    }
    all.iter()
        .copied()
        .find(|candidate| normalize_label(label(*candidate)) == normalized)
        .ok_or_else(|| UnknownVariant {
            kind,
            value: raw.to_owned(),
        })
}

fn normalize_label(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', '_', ' '], "")
}

/// Known tag with its badge colour and tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    /// Tag label as stored on tasks.
    pub name: &'static str,
    /// Badge colour (`#rrggbb`).
    pub color: &'static str,
    /// Tooltip text.
    pub description: &'static str,
}

/// Closed tag vocabulary offered by the task forms.
pub const KNOWN_TAGS: [TagInfo; 4] = [
    TagInfo {
        name: "Bug",
        color: "#d73a4a",
        description: "Something isn't working",
    },
    TagInfo {
        name: "Documentation",
        color: "#0076ca",
        description: "Improvements or additions to documentation",
    },
    TagInfo {
        name: "Enhancement",
        color: "#a2eeef",
        description: "New feature or request",
    },
    TagInfo {
        name: "Planning",
        color: "#fef2c0",
        description: "Iteration plans and roadmapping",
    },
];

/// Look up styling for a tag. Unknown tags return `None` and render unstyled.
#[must_use]
pub fn tag_info(name: &str) -> Option<&'static TagInfo> {
    KNOWN_TAGS.iter().find(|tag| tag.name == name)
}

/// Trim tag labels, drop blanks and duplicates while keeping first-seen order.
#[must_use]
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() || out.iter().any(|existing| existing == trimmed) {
            continue;
        }
        out.push(trimmed.to_owned());
    }
    out
}
