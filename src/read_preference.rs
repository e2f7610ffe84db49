/// Read preference values: the mode, tag sets, and their lifecycle
use crate::core::{Connection, RoleSet};
use crate::error::SelectionError;
use std::fmt;
use std::str::FromStr;

/// How a read is allowed to be routed across replica set members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadMode {
    /// Only the primary
    #[default]
    Primary,
    /// The primary when there is one, a secondary otherwise
    PrimaryPreferred,
    /// Only secondaries
    Secondary,
    /// Secondaries first, the primary as a fallback
    SecondaryPreferred,
    /// Whatever data-bearing node is closest
    Nearest,
}

impl ReadMode {
    pub const ALL: [ReadMode; 5] = [
        ReadMode::Primary,
        ReadMode::PrimaryPreferred,
        ReadMode::Secondary,
        ReadMode::SecondaryPreferred,
        ReadMode::Nearest,
    ];

    /// Roles a server may have to be a candidate under this mode
    pub fn eligible_roles(self) -> RoleSet {
        match self {
            ReadMode::Primary => RoleSet::PRIMARY,
            ReadMode::PrimaryPreferred | ReadMode::SecondaryPreferred => {
                RoleSet::PRIMARY | RoleSet::SECONDARY
            }
            ReadMode::Secondary => RoleSet::SECONDARY,
            // Standalone and mongos are reachable through "nearest" so that
            // multi-server seed lists without a replica set still select.
            ReadMode::Nearest => {
                RoleSet::STANDALONE | RoleSet::PRIMARY | RoleSet::SECONDARY | RoleSet::ROUTER_PROXY
            }
        }
    }

    /// Diagnostic label
    pub fn display_name(self) -> &'static str {
        match self {
            ReadMode::Primary => "primary",
            ReadMode::PrimaryPreferred => "primary preferred",
            ReadMode::Secondary => "secondary",
            ReadMode::SecondaryPreferred => "secondary preferred",
            ReadMode::Nearest => "nearest",
        }
    }

    /// Numeric wire/config code of this mode
    pub fn code(self) -> i32 {
        match self {
            ReadMode::Primary => 0,
            ReadMode::PrimaryPreferred => 1,
            ReadMode::Secondary => 2,
            ReadMode::SecondaryPreferred => 3,
            ReadMode::Nearest => 4,
        }
    }
}

/// Diagnostic label for a raw mode code; unknown codes map to `"unknown"`
pub fn mode_display_name(raw: i32) -> &'static str {
    ReadMode::try_from(raw)
        .map(ReadMode::display_name)
        .unwrap_or("unknown")
}

impl TryFrom<i32> for ReadMode {
    type Error = SelectionError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        ReadMode::ALL
            .into_iter()
            .find(|mode| mode.code() == raw)
            .ok_or_else(|| SelectionError::invalid_mode(raw.to_string()))
    }
}

impl FromStr for ReadMode {
    type Err = SelectionError;

    /// Accepts `primaryPreferred`, `primary_preferred` and `primary preferred` spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "primary" => Ok(ReadMode::Primary),
            "primarypreferred" => Ok(ReadMode::PrimaryPreferred),
            "secondary" => Ok(ReadMode::Secondary),
            "secondarypreferred" => Ok(ReadMode::SecondaryPreferred),
            "nearest" => Ok(ReadMode::Nearest),
            _ => Err(SelectionError::invalid_mode(s)),
        }
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A conjunctive set of `name:value` tags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `name:value` tag
    pub fn add_tag(&mut self, name: &str, value: &str) {
        self.tags.push(format!("{}:{}", name, value));
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// A connection matches when it carries every tag of the set, verbatim.
    /// The empty tag set matches every connection.
    pub fn matches(&self, connection: &Connection) -> bool {
        self.tags.iter().all(|tag| connection.has_tag(tag))
    }

    /// Join the tags with `", "` for log output
    pub fn squash(&self) -> String {
        self.tags.join(", ")
    }
}

impl FromStr for TagSet {
    type Err = SelectionError;

    /// Parses `dc:east,rack:2`. The empty string is the empty tag set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tag_set = TagSet::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match pair.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    tag_set.add_tag(name.trim(), value.trim())
                }
                _ => return Err(SelectionError::invalid_tag(pair)),
            }
        }
        Ok(tag_set)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.squash())
    }
}

/// A read preference: a mode plus an ordered list of tag sets.
///
/// The tag sets are owned by the preference. [`ReadPreference::destroy_contents`]
/// releases them but leaves the value itself usable, since the value is often
/// embedded in a larger structure owned by someone else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadPreference {
    pub mode: ReadMode,
    tag_sets: Vec<TagSet>,
}

impl ReadPreference {
    pub fn new(mode: ReadMode) -> Self {
        Self {
            mode,
            tag_sets: Vec::new(),
        }
    }

    /// Builder-style variant of [`ReadPreference::add_tag_set`]
    pub fn with_tag_set(mut self, tag_set: TagSet) -> Self {
        self.add_tag_set(tag_set);
        self
    }

    /// Append a tag set; the preference takes ownership of it
    pub fn add_tag_set(&mut self, tag_set: TagSet) {
        self.tag_sets.push(tag_set);
    }

    pub fn tag_sets(&self) -> &[TagSet] {
        &self.tag_sets
    }

    /// Drop every owned tag set. The mode is left untouched.
    pub fn destroy_contents(&mut self) {
        self.tag_sets = Vec::new();
    }

    /// Deep-copy this preference into `to`.
    ///
    /// `to` must not own any tag sets yet; use [`ReadPreference::replace_into`]
    /// to overwrite a live value.
    pub fn copy_into(&self, to: &mut ReadPreference) {
        debug_assert!(
            to.tag_sets.is_empty(),
            "copy_into target already owns tag sets"
        );
        to.mode = self.mode;
        to.tag_sets = self.tag_sets.clone();
    }

    /// Release `to`'s tag sets, then deep-copy this preference into it
    pub fn replace_into(&self, to: &mut ReadPreference) {
        to.destroy_contents();
        self.copy_into(to);
    }
}

impl fmt::Display for ReadPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode)?;
        for tag_set in &self.tag_sets {
            write!(f, " [{}]", tag_set)?;
        }
        Ok(())
    }
}
