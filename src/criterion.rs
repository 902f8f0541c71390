// Search criteria and the request builder.
//
// A lookup is selected by exactly one required criterion (title or IMDb id)
// and narrowed by optional ones (year, plot length). Each criterion knows its
// OMDb query key, and `LookupRequest` turns a validated set of them into the
// final query URL.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{LookupError, Result};

/// Length of the plot summary OMDb should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotLength {
    Short,
    Full,
}

impl PlotLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotLength::Short => "short",
            PlotLength::Full => "full",
        }
    }
}

impl FromStr for PlotLength {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "short" => Ok(PlotLength::Short),
            "full" => Ok(PlotLength::Full),
            other => Err(LookupError::InvalidPlot(other.to_string())),
        }
    }
}

/// A single search key/value pair.
///
/// `Title` and `Id` are required criteria: one of them selects the movie.
/// `Year` and `Plot` are optional modifiers and are left out of the query
/// when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Title(String),
    Id(String),
    Year(String),
    Plot(Option<PlotLength>),
}

impl Criterion {
    pub fn title(value: impl Into<String>) -> Result<Self> {
        let c = Criterion::Title(value.into());
        c.validate()?;
        Ok(c)
    }

    pub fn id(value: impl Into<String>) -> Result<Self> {
        let c = Criterion::Id(value.into());
        c.validate()?;
        Ok(c)
    }

    /// An empty year is accepted and simply not sent.
    pub fn year(value: impl Into<String>) -> Result<Self> {
        let c = Criterion::Year(value.into());
        c.validate()?;
        Ok(c)
    }

    /// Accepts `""`, `"short"` or `"full"`.
    pub fn plot(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Ok(Criterion::Plot(None));
        }
        Ok(Criterion::Plot(Some(value.parse()?)))
    }

    /// Query parameter key understood by OMDb.
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::Title(_) => "t",
            Criterion::Id(_) => "i",
            Criterion::Year(_) => "y",
            Criterion::Plot(_) => "plot",
        }
    }

    /// Human readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Title(_) => "title",
            Criterion::Id(_) => "id",
            Criterion::Year(_) => "year",
            Criterion::Plot(_) => "plot",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Criterion::Title(v) | Criterion::Id(v) | Criterion::Year(v) => v,
            Criterion::Plot(p) => p.map_or("", |p| p.as_str()),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Criterion::Title(_) | Criterion::Id(_))
    }

    fn validate(&self) -> Result<()> {
        match self {
            Criterion::Title(v) | Criterion::Id(v) if v.is_empty() => {
                Err(LookupError::MissingRequired(self.name()))
            }
            Criterion::Year(v) if !v.is_empty() && v.parse::<i64>().is_err() => {
                Err(LookupError::InvalidYear(v.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key(), self.value())
    }
}

/// One required criterion plus optional modifiers, in the order they were
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    required: Criterion,
    optional: Vec<Criterion>,
}

impl LookupRequest {
    pub fn new(required: Criterion) -> Result<Self> {
        if !required.is_required() {
            return Err(LookupError::OptionalAsRequired(required.to_string()));
        }
        required.validate()?;
        Ok(LookupRequest {
            required,
            optional: Vec::new(),
        })
    }

    /// Append an optional criterion. Required criteria are rejected here:
    /// a request selects its movie by one key only.
    pub fn with(mut self, criterion: Criterion) -> Result<Self> {
        if criterion.is_required() {
            return Err(LookupError::RequiredAsOptional(criterion.to_string()));
        }
        criterion.validate()?;
        self.optional.push(criterion);
        Ok(self)
    }

    pub fn required(&self) -> &Criterion {
        &self.required
    }

    /// Build the query URL against `endpoint`, keeping whatever query the
    /// endpoint already carries (`v=1`, `apikey=...`).
    pub fn query_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        append_pair(&mut url, self.required.key(), self.required.value());
        for c in self.optional.iter().filter(|c| !c.value().is_empty()) {
            append_pair(&mut url, c.key(), c.value());
        }
        url
    }
}

/// Escape a query value: everything but ASCII alphanumerics and `-_.~` is
/// percent-encoded, spaces become `+`.
pub fn query_escape(value: &str) -> String {
    // '%' is always encoded, so "%20" here can only come from a space.
    urlencoding::encode(value).replace("%20", "+")
}

pub(crate) fn append_pair(url: &mut Url, key: &str, value: &str) {
    let pair = format!("{}={}", key, query_escape(value));
    let query = match url.query() {
        Some(q) if !q.is_empty() => format!("{}&{}", q, pair),
        _ => pair,
    };
    url.set_query(Some(&query));
}
