//! Activity enum as the single source of truth for activity category names.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Work categories an allocation can be split across.
///
/// Variants are declared in alphabetical order of their canonical names so the
/// derived ordering matches the order entries are written and submitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Activity {
    Analysis,
    Bugfix,
    Dev,
    Meet,
    Pm,
    Support,
}

impl Activity {
    /// Every recognized activity, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Analysis,
        Self::Bugfix,
        Self::Dev,
        Self::Meet,
        Self::Pm,
        Self::Support,
    ];

    /// Canonical upper-case name, as written to artifacts and sent to Tempo.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "ANALYSIS",
            Self::Bugfix => "BUGFIX",
            Self::Dev => "DEV",
            Self::Meet => "MEET",
            Self::Pm => "PM",
            Self::Support => "SUPPORT",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Activity {
    type Err = UnknownActivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analysis" => Ok(Self::Analysis),
            "bugfix" => Ok(Self::Bugfix),
            "dev" | "development" => Ok(Self::Dev),
            "meet" | "meeting" => Ok(Self::Meet),
            "pm" | "project-management" | "project_management" => Ok(Self::Pm),
            "support" => Ok(Self::Support),
            _ => Err(UnknownActivity(s.to_string())),
        }
    }
}

impl Serialize for Activity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Activity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unrecognized activity names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivity(String);

impl fmt::Display for UnknownActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown activity: {}", self.0)
    }
}

impl std::error::Error for UnknownActivity {}

/// Activity-keyed input as written, before names are normalized.
///
/// `DEV`, `dev`, and `development` are distinct keys to a deserializer but
/// the same [`Activity`], so maps are read as raw pairs and folded with
/// [`ActivityEntries::into_map`], which refuses to merge them.
#[derive(Debug, Default)]
pub(crate) struct ActivityEntries<V>(Vec<(String, V)>);

/// Why raw activity entries could not become an activity map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ActivityKeyError {
    Unknown(UnknownActivity),
    Duplicate(Activity),
}

impl<V> ActivityEntries<V> {
    pub(crate) fn into_map(self) -> Result<BTreeMap<Activity, V>, ActivityKeyError> {
        let mut map = BTreeMap::new();
        for (name, value) in self.0 {
            let activity: Activity = name.parse().map_err(ActivityKeyError::Unknown)?;
            if map.insert(activity, value).is_some() {
                return Err(ActivityKeyError::Duplicate(activity));
            }
        }
        Ok(map)
    }
}

impl<'de, V> Deserialize<'de> for ActivityEntries<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V> Visitor<'de> for EntriesVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = ActivityEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from activity name to value")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(ActivityEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
