//! Query by example
//!
//! An [`Example`] is a probe (usually a transfer object with a few fields set)
//! plus an [`ExampleMatcher`] saying how to compare. Unset probe fields mean
//! "don't care" unless the matcher includes nulls. Required criteria are
//! added on top by services to scope a query to an owner or a parent.
//!
//! # Example
//!
//! ```rust,ignore
//! let probe = ReptileDto { species: Some("python".into()), ..Default::default() };
//! let example = Example::of_with(
//!     &probe,
//!     ExampleMatcher::matching()
//!         .with_string_matcher(StringMatcher::Containing)
//!         .with_ignore_case(),
//! )?
//! .and_equals("user_id", 7i64);
//! ```

use crate::core::error::{ServiceError, ServiceResult};
use crate::core::field::{FieldValue, Fields};
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};

/// Paths written by storage and services; an unset probe value there is never a null filter
const MANAGED_PATHS: [&str; 5] = ["id", "created_at", "created_by", "updated_at", "updated_by"];

/// How string probe values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMatcher {
    /// Same as [`StringMatcher::Exact`]
    #[default]
    Default,
    Exact,
    Starting,
    Ending,
    Containing,
    /// The probe value is a regular expression
    Regex,
}

/// Matching configuration of an [`Example`]
#[derive(Debug, Clone, Default)]
pub struct ExampleMatcher {
    ignored_paths: HashSet<String>,
    include_nulls: bool,
    string_matcher: StringMatcher,
    ignore_case: bool,
}

impl ExampleMatcher {
    /// Match all set fields exactly, ignore unset fields
    pub fn matching() -> Self {
        Self::default()
    }

    pub fn with_ignored_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Unset probe fields must also be unset on the candidate
    ///
    /// The identity, the audit attributes and fields under a required
    /// criterion are exempt unless the probe sets them.
    pub fn with_include_nulls(mut self) -> Self {
        self.include_nulls = true;
        self
    }

    pub fn with_string_matcher(mut self, matcher: StringMatcher) -> Self {
        self.string_matcher = matcher;
        self
    }

    pub fn with_ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored_paths.contains(path)
    }
}

/// A condition every match must satisfy, regardless of the probe
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Equals(String, FieldValue),
    In(String, Vec<FieldValue>),
    NotIn(String, Vec<FieldValue>),
    /// Inclusive range; a null value never matches
    Between(String, FieldValue, FieldValue),
}

impl Criterion {
    pub fn field(&self) -> &str {
        match self {
            Criterion::Equals(field, _)
            | Criterion::In(field, _)
            | Criterion::NotIn(field, _)
            | Criterion::Between(field, _, _) => field,
        }
    }

    fn matches<T: Fields + ?Sized>(&self, candidate: &T) -> bool {
        match self {
            Criterion::Equals(field, expected) => {
                candidate.field_value(field).as_ref() == Some(expected)
            }
            Criterion::In(field, allowed) => candidate
                .field_value(field)
                .is_some_and(|value| allowed.contains(&value)),
            Criterion::NotIn(field, excluded) => candidate
                .field_value(field)
                .is_none_or(|value| !excluded.contains(&value)),
            Criterion::Between(field, low, high) => {
                candidate.field_value(field).is_some_and(|value| {
                    !value.is_null() && value.compare(low).is_ge() && value.compare(high).is_le()
                })
            }
        }
    }
}

/// A probe, its matcher, and required criteria
#[derive(Debug, Clone, Default)]
pub struct Example {
    probe: Vec<(&'static str, FieldValue)>,
    matcher: ExampleMatcher,
    patterns: HashMap<&'static str, Regex>,
    criteria: Vec<Criterion>,
}

impl Example {
    /// Exact matching on every set field of `probe`
    pub fn of<T: Fields + ?Sized>(probe: &T) -> Self {
        Self {
            probe: probe.field_values(),
            ..Self::default()
        }
    }

    /// Match `probe` with a custom matcher
    ///
    /// Fails with `InvalidArgument` when the matcher uses regular expressions
    /// and a probe value is not a valid pattern.
    pub fn of_with<T: Fields + ?Sized>(probe: &T, matcher: ExampleMatcher) -> ServiceResult<Self> {
        let probe = probe.field_values();
        let mut patterns = HashMap::new();

        if matcher.string_matcher == StringMatcher::Regex {
            for (name, value) in &probe {
                if let FieldValue::String(pattern) = value {
                    let regex = RegexBuilder::new(pattern)
                        .case_insensitive(matcher.ignore_case)
                        .build()
                        .map_err(|e| ServiceError::invalid_argument("example", e.to_string()))?;
                    patterns.insert(*name, regex);
                }
            }
        }

        Ok(Self {
            probe,
            matcher,
            patterns,
            criteria: Vec::new(),
        })
    }

    /// An example every candidate matches
    pub fn matching_all() -> Self {
        Self::default()
    }

    pub fn and_equals(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.criteria.push(Criterion::Equals(field.into(), value.into()));
        self
    }

    pub fn and_in(mut self, field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        self.criteria.push(Criterion::In(field.into(), values));
        self
    }

    pub fn and_not_in(mut self, field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        self.criteria.push(Criterion::NotIn(field.into(), values));
        self
    }

    pub fn and_between(
        mut self,
        field: impl Into<String>,
        low: impl Into<FieldValue>,
        high: impl Into<FieldValue>,
    ) -> Self {
        self.criteria
            .push(Criterion::Between(field.into(), low.into(), high.into()));
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// True when `candidate` satisfies the probe and every criterion
    pub fn matches<T: Fields + ?Sized>(&self, candidate: &T) -> bool {
        self.criteria.iter().all(|c| c.matches(candidate))
            && self
                .probe
                .iter()
                .filter(|(name, _)| !self.matcher.is_ignored(name))
                .all(|(name, expected)| self.field_matches(name, expected, candidate))
    }

    fn field_matches<T: Fields + ?Sized>(
        &self,
        name: &str,
        expected: &FieldValue,
        candidate: &T,
    ) -> bool {
        let actual = candidate.field_value(name);

        if expected.is_null() {
            return !self.matcher.include_nulls
                || MANAGED_PATHS.contains(&name)
                || self.criteria.iter().any(|c| c.field() == name)
                || actual.is_none_or(|value| value.is_null());
        }

        let Some(actual) = actual else {
            return false;
        };

        match (expected, &actual) {
            (FieldValue::String(probe), FieldValue::String(value)) => {
                self.strings_match(name, probe, value)
            }
            _ => expected == &actual,
        }
    }

    fn strings_match(&self, name: &str, probe: &str, value: &str) -> bool {
        if let Some(regex) = self.patterns.get(name) {
            return regex.is_match(value);
        }

        let (probe, value) = if self.matcher.ignore_case {
            (probe.to_lowercase(), value.to_lowercase())
        } else {
            (probe.to_string(), value.to_string())
        };

        match self.matcher.string_matcher {
            StringMatcher::Default | StringMatcher::Exact => value == probe,
            StringMatcher::Starting => value.starts_with(&probe),
            StringMatcher::Ending => value.ends_with(&probe),
            StringMatcher::Containing => value.contains(&probe),
            // patterns are compiled up front; an uncompiled probe never matches
            StringMatcher::Regex => false,
        }
    }
}
