/// Domain list matching for Link Tab Opener
use serde::{Deserialize, Serialize};
use url::Url;

/// Whether the domain list names the sites to skip or the only sites to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListMode {
    #[default]
    Blacklist,
    Whitelist,
}

impl ListMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListMode::Blacklist => "blacklist",
            ListMode::Whitelist => "whitelist",
        }
    }

    /// Unknown values fall back to the default mode
    pub fn from_setting(value: &str) -> ListMode {
        match value {
            "whitelist" => ListMode::Whitelist,
            _ => ListMode::Blacklist,
        }
    }
}

impl From<String> for ListMode {
    fn from(value: String) -> Self {
        ListMode::from_setting(&value)
    }
}

impl From<ListMode> for String {
    fn from(mode: ListMode) -> Self {
        mode.as_str().to_string()
    }
}

/// A single domain list entry
///
/// Either an exact hostname (`example.com`) or a wildcard suffix
/// (`*bbc.co.uk`, `*.bbc.co.uk`) that also covers every subdomain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPattern {
    Exact(String),
    Suffix(String),
}

impl DomainPattern {
    /// Parse one line of the domain list. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<DomainPattern> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match line.strip_prefix('*') {
            Some(suffix) => Some(DomainPattern::Suffix(suffix.to_string())),
            None => Some(DomainPattern::Exact(line.to_string())),
        }
    }

    /// Match a hostname against this pattern
    ///
    /// `*X` matches `H` when `H` equals `X` without its leading dot, or when
    /// `H` ends with `X` or with `X` minus its leading dot.
    pub fn matches(&self, hostname: &str) -> bool {
        match self {
            DomainPattern::Exact(domain) => domain == hostname,
            DomainPattern::Suffix(suffix) => {
                let bare = suffix.strip_prefix('.').unwrap_or(suffix);
                hostname == bare || hostname.ends_with(suffix.as_str()) || hostname.ends_with(bare)
            }
        }
    }
}

/// The ordered list of patterns stored under `domain-list`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainList {
    patterns: Vec<DomainPattern>,
}

impl DomainList {
    /// Parse newline separated patterns, dropping blank lines
    pub fn parse(text: &str) -> DomainList {
        DomainList {
            patterns: text.lines().filter_map(DomainPattern::parse).collect(),
        }
    }

    pub fn patterns(&self) -> &[DomainPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, hostname: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(hostname))
    }
}

/// Decides whether the page agent stays inert on a given host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainGate {
    pub mode: ListMode,
    pub list: DomainList,
}

impl DomainGate {
    pub fn new(mode: ListMode, list: DomainList) -> DomainGate {
        DomainGate { mode, list }
    }

    pub fn is_blocked(&self, hostname: &str) -> bool {
        let listed = self.list.matches(hostname);
        match self.mode {
            ListMode::Blacklist => listed,
            ListMode::Whitelist => !listed,
        }
    }
}

/// Lowercase hostname of a URL, or `None` for URLs without a host
pub fn hostname_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}
