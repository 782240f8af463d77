//! Country filtering and output options.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Codes that never make it into the table.
const DEFAULT_IGNORED: [&str; 2] = ["", "ZZ"];

static COUNTRY_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_country_code_regex() -> &'static Regex {
    COUNTRY_CODE_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z]{2}$").expect("Invalid Regex"))
}

/// Upper-case a code for set membership.
fn canonical(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    All,
    Include(HashSet<String>),
    Exclude(HashSet<String>),
}

/// Allow/deny predicate over two-letter country codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryPolicy {
    ignored: HashSet<String>,
    selection: Selection,
}

impl CountryPolicy {
    /// Build a policy from user supplied include/exclude lists.
    ///
    /// Both lists non-empty, or any entry that is not exactly two letters, is rejected.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<CountryPolicy> {
        if !include.is_empty() && !exclude.is_empty() {
            return Err(Error::Policy(
                "include cannot be used alongside exclude".to_string(),
            ));
        }
        let include = validated_set(include)?;
        let exclude = validated_set(exclude)?;
        let selection = if !include.is_empty() {
            Selection::Include(include)
        } else if !exclude.is_empty() {
            Selection::Exclude(exclude)
        } else {
            Selection::All
        };
        Ok(CountryPolicy {
            ignored: DEFAULT_IGNORED.iter().map(|c| c.to_string()).collect(),
            selection,
        })
    }

    /// Policy with only the default ignore list.
    pub fn allow_all() -> CountryPolicy {
        CountryPolicy {
            ignored: DEFAULT_IGNORED.iter().map(|c| c.to_string()).collect(),
            selection: Selection::All,
        }
    }

    /// True if entries for `code` belong in the table.
    pub fn allows(&self, code: &str) -> bool {
        let code = canonical(code);
        if self.ignored.contains(&code) {
            return false;
        }
        match &self.selection {
            Selection::All => true,
            Selection::Include(set) => set.contains(&code),
            Selection::Exclude(set) => !set.contains(&code),
        }
    }
}

impl Default for CountryPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

fn validated_set<S: AsRef<str>>(codes: &[S]) -> Result<HashSet<String>> {
    codes
        .iter()
        .map(|c| {
            let c = c.as_ref().trim();
            if get_country_code_regex().is_match(c) {
                Ok(canonical(c))
            } else {
                Err(Error::Policy(format!(
                    "only two letter country codes are accepted, got '{c}'"
                )))
            }
        })
        .collect()
}

/// Letter case of country codes in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountryCase {
    #[default]
    Upper,
    Lower,
}

impl CountryCase {
    pub fn apply(self, code: &str) -> String {
        match self {
            CountryCase::Upper => code.trim().to_ascii_uppercase(),
            CountryCase::Lower => code.trim().to_ascii_lowercase(),
        }
    }
}

/// Which address families a run keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FamilyFilter {
    #[default]
    Any,
    Ipv4Only,
}

impl FamilyFilter {
    pub fn ipv4_only(self) -> bool {
        self == FamilyFilter::Ipv4Only
    }
}
