use std::fmt;
use tracing::debug;

use crate::counter::CountTable;
use crate::resolution::Resolution;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    UnknownResolution { label: String, allowed: Vec<&'static str> },
    InvalidLimit { resolution: String, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownResolution { label, allowed } =>
                write!(f, "unknown resolution '{}', accepted values are: {}", label, allowed.join(", ")),
            ValidationError::InvalidLimit { resolution, value } =>
                write!(f, "limitation for {} must be an integer, got '{}'", resolution, value),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPair {
    pub resolution: Resolution,
    pub limit: i64,
}

/// Caller-ordered list of resolution limits. Order is significant: the
/// evaluator stops at the first breach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitSpec {
    pairs: Vec<LimitPair>,
}

impl LimitSpec {
    /// Validate raw (resolution, limit) strings, failing on the first bad pair.
    pub fn parse<R, L>(raw: &[(R, L)]) -> Result<Self, ValidationError>
    where
        R: AsRef<str>,
        L: AsRef<str>,
    {
        let mut pairs = Vec::with_capacity(raw.len());
        for (res, limit) in raw {
            let (res, limit) = (res.as_ref(), limit.as_ref());
            let resolution = Resolution::from_label(res).ok_or_else(|| {
                ValidationError::UnknownResolution {
                    label: res.to_string(),
                    allowed: Resolution::allowed_labels(),
                }
            })?;
            let limit = limit.trim().parse::<i64>().map_err(|_| ValidationError::InvalidLimit {
                resolution: res.to_string(),
                value: limit.to_string(),
            })?;
            pairs.push(LimitPair { resolution, limit });
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[LimitPair] {
        &self.pairs
    }

    /// Distinct resolutions named by the limits, in ascending rank.
    pub fn resolutions(&self) -> Vec<Resolution> {
        let mut named: Vec<Resolution> = self.pairs.iter().map(|p| p.resolution).collect();
        named.sort();
        named.dedup();
        named
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breach {
    pub resolution: Resolution,
    pub count: u32,
    pub limit: i64,
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} transcodes at {} (limit {})", self.count, self.resolution, self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NoBreach,
    Breach(Breach),
}

/// First pair, in caller order, whose count reaches its limit wins.
pub fn evaluate(spec: &LimitSpec, counts: &CountTable) -> Verdict {
    for pair in spec.pairs() {
        let count = counts.get(pair.resolution);
        debug!("current streams: {} = {} / {}", pair.resolution, count, pair.limit);
        if i64::from(count) >= pair.limit {
            return Verdict::Breach(Breach {
                resolution: pair.resolution,
                count,
                limit: pair.limit,
            });
        }
    }
    Verdict::NoBreach
}
