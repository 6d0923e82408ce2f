//! Port types and the port expression parser.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSet` is the ordered, duplicate-free unit of work handed to a scanner.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Create a Port without validation. The caller guarantees `port >= 1`.
    #[inline]
    pub(crate) const fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(i64::from(value)))
    }
}

impl TryFrom<i64> for Port {
    type Error = PortError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Why part of a port expression was not used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(i64),
    #[error("invalid port number: {0:?}")]
    InvalidFormat(String),
    #[error("malformed port range: {0:?}")]
    MalformedRange(String),
    #[error("empty port specification")]
    Empty,
}

/// An ordered, duplicate-free set of ports.
///
/// Order is first-occurrence order from the expression it was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<Port>,
}

/// Result of parsing a port expression: the usable ports plus every token
/// that was dropped along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPorts {
    pub ports: PortSet,
    pub skipped: Vec<PortError>,
}

impl ParsedPorts {
    fn rejected(reason: PortError) -> Self {
        Self {
            ports: PortSet::new(),
            skipped: vec![reason],
        }
    }
}

impl PortSet {
    /// Create an empty port set.
    pub const fn new() -> Self {
        Self { ports: Vec::new() }
    }

    /// Every port, 1 through 65535.
    pub fn full() -> Self {
        Self::range(Port::new_unchecked(Port::MIN), Port::new_unchecked(Port::MAX))
    }

    /// An inclusive range. Bounds are swapped if given in reverse.
    pub fn range(start: Port, end: Port) -> Self {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        Self {
            ports: (lo.0..=hi.0).map(Port::new_unchecked).collect(),
        }
    }

    /// Parse a port expression.
    ///
    /// The first matching shape wins:
    /// - anything containing `*` selects every port;
    /// - anything containing `-` is a range `a-b`, with an invalid lower
    ///   bound clamped to 1 and an invalid upper bound clamped to 65535;
    /// - anything containing `,` is a list, invalid entries are dropped;
    /// - otherwise a single port.
    ///
    /// Never fails. Dropped tokens are returned in [`ParsedPorts::skipped`].
    pub fn parse(expr: &str) -> ParsedPorts {
        let expr = expr.trim();
        if expr.is_empty() {
            return ParsedPorts::default();
        }

        if expr.contains('*') {
            ParsedPorts {
                ports: Self::full(),
                skipped: Vec::new(),
            }
        } else if expr.contains('-') {
            parse_range(expr)
        } else if expr.contains(',') {
            parse_list(expr)
        } else {
            match parse_number(expr).and_then(Port::try_from) {
                Ok(port) => ParsedPorts {
                    ports: std::iter::once(port).collect(),
                    skipped: Vec::new(),
                },
                Err(e) => ParsedPorts::rejected(e),
            }
        }
    }

    /// Number of ports in the set.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn contains(&self, port: Port) -> bool {
        self.ports.contains(&port)
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    pub fn as_slice(&self) -> &[Port] {
        &self.ports
    }
}

impl FromIterator<Port> for PortSet {
    fn from_iter<I: IntoIterator<Item = Port>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let ports = iter.into_iter().filter(|p| seen.insert(*p)).collect();
        Self { ports }
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = Port;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Port>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter().copied()
    }
}

/// Strict parsing: succeeds if at least one port survives.
impl FromStr for PortSet {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = Self::parse(s);
        if parsed.ports.is_empty() {
            Err(parsed.skipped.into_iter().next().unwrap_or(PortError::Empty))
        } else {
            Ok(parsed.ports)
        }
    }
}

/// Renders consecutive runs as ranges, e.g. `22,80-82,443`.
impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut i = 0;
        while i < self.ports.len() {
            let start = self.ports[i].0;
            let mut end = start;
            while i + 1 < self.ports.len() && self.ports[i + 1].0 == end.wrapping_add(1) {
                end += 1;
                i += 1;
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
            i += 1;
        }
        Ok(())
    }
}

fn parse_number(token: &str) -> Result<i64, PortError> {
    let token = token.trim();
    token
        .parse::<i64>()
        .map_err(|_| PortError::InvalidFormat(token.to_string()))
}

fn parse_range(expr: &str) -> ParsedPorts {
    let Some((a, b)) = expr.split_once('-') else {
        return ParsedPorts::rejected(PortError::MalformedRange(expr.to_string()));
    };

    let (a, b) = match (parse_number(a), parse_number(b)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return ParsedPorts::rejected(PortError::MalformedRange(expr.to_string())),
    };

    let start = Port::try_from(a.min(b)).unwrap_or(Port::new_unchecked(Port::MIN));
    let end = Port::try_from(a.max(b)).unwrap_or(Port::new_unchecked(Port::MAX));

    ParsedPorts {
        ports: PortSet::range(start, end),
        skipped: Vec::new(),
    }
}

fn parse_list(expr: &str) -> ParsedPorts {
    let mut skipped = Vec::new();
    let ports = expr
        .split(',')
        .filter_map(|token| match parse_number(token).and_then(Port::try_from) {
            Ok(port) => Some(port),
            Err(e) => {
                skipped.push(e);
                None
            }
        })
        .collect();

    ParsedPorts { ports, skipped }
}
