//! Atom codec: exact, locale-independent text forms for every scalar kind.
//!
//! Each [`AtomKind`] has a parser ([`AtomKind::parse`]) and every [`Atom`]
//! a formatter ([`Atom::format`]). The pair guarantees that
//! `kind.parse(&atom.format()) == Some(atom)` for every representable value.
//! The reverse does not hold: `"+01"` parses as `Int32(1)`, which formats as
//! `"1"`.
//!
//! | Kind | Text form |
//! |------|-----------|
//! | integers | optional sign, decimal digits |
//! | `Decimal` | optional sign, digits, optional `.` fraction; scale is kept |
//! | `Double`, `Single` | shortest exact exponential form, or `INF`, `-INF`, `NaN` |
//! | `Boolean` | `true` or `false` |
//! | `Guid` | `3f2504e0-4f89-11d3-9a0c-0305e82c3301` |
//! | `TimeSpan` | `[-][d.]hh:mm:ss[.fffffff]` |
//! | `DateTimeOffset` | `yyyy-MM-ddTHH:mm:ss.fffffff+hh:mm` |
//! | `Binary` | lowercase hex |
//!
//! Representable values are bounded: a `TimeSpan` holds at most
//! 10675199 days, a `DateTimeOffset` needs a four-digit year, a whole-minute
//! offset and no leap second. [`Atom::validate`] reports values outside
//! those bounds, and the saver refuses to write them.
//!
//! Sub-tick precision is never dropped: time values that are not a whole
//! number of 100ns ticks are written with nine fractional digits instead of
//! seven.
//!
//! ```rust
//! use sdata::{Atom, AtomKind};
//!
//! let atom = Atom::Double(1.5e10);
//! let text = atom.format();
//! assert_eq!(AtomKind::Double.parse(&text), Some(atom));
//! assert_eq!(Atom::Double(f64::NEG_INFINITY).format(), "-INF");
//! ```

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike};
use num_bigint::{BigInt, Sign};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use uuid::Uuid;

const NANOS_PER_TICK: u32 = 100;
const SECONDS_PER_DAY: i64 = 86_400;
/// Largest day count a `TimeSpan` accepts.
const MAX_TIME_SPAN_DAYS: i64 = 10_675_199;
const MAX_DECIMAL_EXPONENT: i64 = 4_096;

/// The scalar kinds a schema can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomKind {
    String,
    IgnoreCaseString,
    Char,
    Decimal,
    Int64,
    Int32,
    Int16,
    SByte,
    UInt64,
    UInt32,
    UInt16,
    Byte,
    Double,
    Single,
    Boolean,
    Binary,
    Guid,
    TimeSpan,
    DateTimeOffset,
}

impl AtomKind {
    pub const ALL: [AtomKind; 19] = [
        AtomKind::String,
        AtomKind::IgnoreCaseString,
        AtomKind::Char,
        AtomKind::Decimal,
        AtomKind::Int64,
        AtomKind::Int32,
        AtomKind::Int16,
        AtomKind::SByte,
        AtomKind::UInt64,
        AtomKind::UInt32,
        AtomKind::UInt16,
        AtomKind::Byte,
        AtomKind::Double,
        AtomKind::Single,
        AtomKind::Boolean,
        AtomKind::Binary,
        AtomKind::Guid,
        AtomKind::TimeSpan,
        AtomKind::DateTimeOffset,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            AtomKind::String => "String",
            AtomKind::IgnoreCaseString => "IgnoreCaseString",
            AtomKind::Char => "Char",
            AtomKind::Decimal => "Decimal",
            AtomKind::Int64 => "Int64",
            AtomKind::Int32 => "Int32",
            AtomKind::Int16 => "Int16",
            AtomKind::SByte => "SByte",
            AtomKind::UInt64 => "UInt64",
            AtomKind::UInt32 => "UInt32",
            AtomKind::UInt16 => "UInt16",
            AtomKind::Byte => "Byte",
            AtomKind::Double => "Double",
            AtomKind::Single => "Single",
            AtomKind::Boolean => "Boolean",
            AtomKind::Binary => "Binary",
            AtomKind::Guid => "Guid",
            AtomKind::TimeSpan => "TimeSpan",
            AtomKind::DateTimeOffset => "DateTimeOffset",
        }
    }

    /// Parses `text` as a value of this kind. Returns `None` when the text is
    /// not a valid form.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<Atom> {
        match self {
            AtomKind::String => Some(Atom::String(text.to_string())),
            AtomKind::IgnoreCaseString => Some(Atom::IgnoreCaseString(text.to_string())),
            AtomKind::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(Atom::Char(ch)),
                    _ => None,
                }
            }
            AtomKind::Decimal => Decimal::parse(text).map(Atom::Decimal),
            AtomKind::Int64 => text.parse().ok().map(Atom::Int64),
            AtomKind::Int32 => text.parse().ok().map(Atom::Int32),
            AtomKind::Int16 => text.parse().ok().map(Atom::Int16),
            AtomKind::SByte => text.parse().ok().map(Atom::SByte),
            AtomKind::UInt64 => text.parse().ok().map(Atom::UInt64),
            AtomKind::UInt32 => text.parse().ok().map(Atom::UInt32),
            AtomKind::UInt16 => text.parse().ok().map(Atom::UInt16),
            AtomKind::Byte => text.parse().ok().map(Atom::Byte),
            AtomKind::Double => parse_float::<f64>(text, f64::INFINITY, f64::NAN).map(Atom::Double),
            AtomKind::Single => parse_float::<f32>(text, f32::INFINITY, f32::NAN).map(Atom::Single),
            AtomKind::Boolean => match text {
                "true" => Some(Atom::Boolean(true)),
                "false" => Some(Atom::Boolean(false)),
                _ => None,
            },
            AtomKind::Binary => hex::decode(text).ok().map(Atom::Binary),
            AtomKind::Guid => Uuid::parse_str(text).ok().map(Atom::Guid),
            AtomKind::TimeSpan => parse_time_span(text).map(Atom::TimeSpan),
            AtomKind::DateTimeOffset => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(Atom::DateTimeOffset),
        }
    }
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_float<F: FromStr + Copy + std::ops::Neg<Output = F>>(text: &str, inf: F, nan: F) -> Option<F> {
    match text {
        "INF" => Some(inf),
        "-INF" => Some(-inf),
        "NaN" => Some(nan),
        // Keep Rust's `inf`/`infinity`/`nan` spellings out.
        _ if text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) =>
        {
            text.parse().ok()
        }
        _ => None,
    }
}

fn parse_time_span(text: &str) -> Option<Duration> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parts = body.split(':');
    let (day_hours, minutes, seconds) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let (days, hours) = match day_hours.split_once('.') {
        Some((days, hours)) => (parse_digits(days, 1, 8)?, parse_digits(hours, 2, 2)?),
        None => (0, parse_digits(day_hours, 2, 2)?),
    };
    let minutes = parse_digits(minutes, 2, 2)?;
    let (seconds, nanos) = match seconds.split_once('.') {
        Some((seconds, fraction)) => {
            let digits = parse_digits(fraction, 1, 9)?;
            let scale = 10_i64.pow(9 - fraction.len() as u32);
            (parse_digits(seconds, 2, 2)?, digits * scale)
        }
        None => (parse_digits(seconds, 2, 2)?, 0),
    };
    if days > MAX_TIME_SPAN_DAYS || hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    let total = days * SECONDS_PER_DAY + hours * 3_600 + minutes * 60 + seconds;
    let span = Duration::seconds(total) + Duration::nanoseconds(nanos);
    Some(if negative { -span } else { span })
}

fn parse_digits(text: &str, min_len: usize, max_len: usize) -> Option<i64> {
    if text.len() < min_len || text.len() > max_len || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn format_time_span(span: &Duration) -> String {
    let negative = *span < Duration::zero();
    let magnitude = if negative { -*span } else { *span };
    let total_seconds = magnitude.num_seconds();
    let nanos = (magnitude - Duration::seconds(total_seconds))
        .num_nanoseconds()
        .unwrap_or(0);
    let days = total_seconds / SECONDS_PER_DAY;
    let rest = total_seconds % SECONDS_PER_DAY;

    let mut text = String::with_capacity(26);
    if negative {
        text.push('-');
    }
    if days > 0 {
        text.push_str(&days.to_string());
        text.push('.');
    }
    text.push_str(&format!(
        "{:02}:{:02}:{:02}",
        rest / 3_600,
        (rest % 3_600) / 60,
        rest % 60
    ));
    push_fraction(&mut text, nanos as u32, false);
    text
}

fn format_date_time(value: &DateTime<FixedOffset>) -> String {
    let mut text = value.format("%Y-%m-%dT%H:%M:%S").to_string();
    push_fraction(&mut text, value.nanosecond(), true);
    text.push_str(&value.format("%:z").to_string());
    text
}

/// Appends `.fffffff` (whole ticks) or `.fffffffff` (sub-tick precision).
fn push_fraction(text: &mut String, nanos: u32, always: bool) {
    if nanos == 0 && !always {
        return;
    }
    if nanos % NANOS_PER_TICK == 0 {
        text.push_str(&format!(".{:07}", nanos / NANOS_PER_TICK));
    } else {
        text.push_str(&format!(".{:09}", nanos));
    }
}

/// An arbitrary-precision decimal number: `mantissa * 10^-scale`.
///
/// The scale written in the text is preserved (`1.50` keeps two fractional
/// digits) while equality and hashing compare numeric values.
///
/// ```rust
/// use sdata::Decimal;
///
/// let a: Decimal = "1.50".parse().unwrap();
/// let b: Decimal = "1.5".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "1.50");
/// ```
#[derive(Clone, Debug)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    #[must_use]
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Decimal {
            mantissa: mantissa.into(),
            scale,
        }
    }

    #[must_use]
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Decimal> {
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (number, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exponent: i64 = body[pos + 1..].parse().ok()?;
                if exponent.abs() > MAX_DECIMAL_EXPONENT {
                    return None;
                }
                (&body[..pos], exponent)
            }
            None => (body, 0),
        };
        let (integral, fraction) = number.split_once('.').unwrap_or((number, ""));
        if integral.is_empty() && fraction.is_empty() {
            return None;
        }
        if !integral.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut digits = String::with_capacity(integral.len() + fraction.len());
        digits.push_str(integral);
        digits.push_str(fraction);
        let mut mantissa = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        let mut scale = fraction.len() as i64 - exponent;
        if scale < 0 {
            mantissa *= BigInt::from(10u32).pow((-scale) as u32);
            scale = 0;
        }
        if negative {
            mantissa = -mantissa;
        }
        Some(Decimal {
            mantissa,
            scale: u32::try_from(scale).ok()?,
        })
    }

    /// The same value with trailing fractional zeros removed.
    fn normalized(&self) -> (BigInt, u32) {
        let ten = BigInt::from(10u32);
        let mut mantissa = self.mantissa.clone();
        let mut scale = self.scale;
        while scale > 0 && (&mantissa % &ten).sign() == Sign::NoSign {
            mantissa /= &ten;
            scale -= 1;
        }
        (mantissa, scale)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_string();
        if self.mantissa.sign() == Sign::Minus {
            f.write_str("-")?;
        }
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() <= scale {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        } else {
            let (integral, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{}.{}", integral, fraction)
        }
    }
}

impl FromStr for Decimal {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Decimal::parse(s).ok_or_else(|| crate::Error::invalid_value(format!("invalid decimal '{}'", s)))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value, 0)
    }
}

/// A scalar value.
#[derive(Clone, Debug)]
pub enum Atom {
    String(String),
    /// Compared and hashed without regard to case.
    IgnoreCaseString(String),
    Char(char),
    Decimal(Decimal),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    SByte(i8),
    UInt64(u64),
    UInt32(u32),
    UInt16(u16),
    Byte(u8),
    Double(f64),
    Single(f32),
    Boolean(bool),
    Binary(Vec<u8>),
    Guid(Uuid),
    TimeSpan(Duration),
    DateTimeOffset(DateTime<FixedOffset>),
}

impl Atom {
    #[must_use]
    pub const fn kind(&self) -> AtomKind {
        match self {
            Atom::String(_) => AtomKind::String,
            Atom::IgnoreCaseString(_) => AtomKind::IgnoreCaseString,
            Atom::Char(_) => AtomKind::Char,
            Atom::Decimal(_) => AtomKind::Decimal,
            Atom::Int64(_) => AtomKind::Int64,
            Atom::Int32(_) => AtomKind::Int32,
            Atom::Int16(_) => AtomKind::Int16,
            Atom::SByte(_) => AtomKind::SByte,
            Atom::UInt64(_) => AtomKind::UInt64,
            Atom::UInt32(_) => AtomKind::UInt32,
            Atom::UInt16(_) => AtomKind::UInt16,
            Atom::Byte(_) => AtomKind::Byte,
            Atom::Double(_) => AtomKind::Double,
            Atom::Single(_) => AtomKind::Single,
            Atom::Boolean(_) => AtomKind::Boolean,
            Atom::Binary(_) => AtomKind::Binary,
            Atom::Guid(_) => AtomKind::Guid,
            Atom::TimeSpan(_) => AtomKind::TimeSpan,
            Atom::DateTimeOffset(_) => AtomKind::DateTimeOffset,
        }
    }

    /// Checks that [`Atom::format`] output parses back to this value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) for a
    /// `TimeSpan` longer than the largest day count, or a `DateTimeOffset`
    /// whose year is outside `0000..=9999`, whose offset has a seconds part,
    /// or which falls on a leap second.
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            Atom::TimeSpan(span) => {
                let magnitude = if *span < Duration::zero() { -*span } else { *span };
                if magnitude.num_seconds() / SECONDS_PER_DAY > MAX_TIME_SPAN_DAYS {
                    return Err(crate::Error::invalid_value(format!(
                        "TimeSpan exceeds {} days",
                        MAX_TIME_SPAN_DAYS
                    )));
                }
            }
            Atom::DateTimeOffset(value) => {
                if !(0..=9999).contains(&value.year()) {
                    return Err(crate::Error::invalid_value(format!(
                        "DateTimeOffset year {} is not four digits",
                        value.year()
                    )));
                }
                if value.offset().local_minus_utc() % 60 != 0 {
                    return Err(crate::Error::invalid_value(format!(
                        "DateTimeOffset offset {} has a seconds part",
                        value.offset()
                    )));
                }
                if value.nanosecond() >= 1_000_000_000 {
                    return Err(crate::Error::invalid_value("DateTimeOffset is a leap second"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// The canonical text of this value, before any literal quoting.
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            Atom::String(s) | Atom::IgnoreCaseString(s) => s.clone(),
            Atom::Char(ch) => ch.to_string(),
            Atom::Decimal(d) => d.to_string(),
            Atom::Int64(v) => v.to_string(),
            Atom::Int32(v) => v.to_string(),
            Atom::Int16(v) => v.to_string(),
            Atom::SByte(v) => v.to_string(),
            Atom::UInt64(v) => v.to_string(),
            Atom::UInt32(v) => v.to_string(),
            Atom::UInt16(v) => v.to_string(),
            Atom::Byte(v) => v.to_string(),
            Atom::Double(v) => format_float(*v, v.is_nan(), v.is_infinite(), || format!("{:e}", v)),
            Atom::Single(v) => format_float(
                f64::from(*v),
                v.is_nan(),
                v.is_infinite(),
                || format!("{:e}", v),
            ),
            Atom::Boolean(b) => (if *b { "true" } else { "false" }).to_string(),
            Atom::Binary(bytes) => hex::encode(bytes),
            Atom::Guid(guid) => guid.hyphenated().to_string(),
            Atom::TimeSpan(span) => format_time_span(span),
            Atom::DateTimeOffset(value) => format_date_time(value),
        }
    }

    /// Writes this value as a document literal.
    ///
    /// Strings use the verbatim form (`@"..."`, embedded quotes doubled),
    /// chars are always a `\uXXXX` escape, numbers and booleans are bare, and
    /// every other kind is a quoted string.
    pub fn write_literal(&self, out: &mut String) {
        match self {
            Atom::String(s) | Atom::IgnoreCaseString(s) => write_verbatim_string(out, s),
            Atom::Char(ch) => {
                out.push('\'');
                push_unicode_escape(out, *ch);
                out.push('\'');
            }
            Atom::Double(v) if !v.is_finite() => write_quoted(out, &self.format()),
            Atom::Single(v) if !v.is_finite() => write_quoted(out, &self.format()),
            Atom::Decimal(_)
            | Atom::Int64(_)
            | Atom::Int32(_)
            | Atom::Int16(_)
            | Atom::SByte(_)
            | Atom::UInt64(_)
            | Atom::UInt32(_)
            | Atom::UInt16(_)
            | Atom::Byte(_)
            | Atom::Double(_)
            | Atom::Single(_)
            | Atom::Boolean(_) => out.push_str(&self.format()),
            Atom::Binary(_) | Atom::Guid(_) | Atom::TimeSpan(_) | Atom::DateTimeOffset(_) => {
                write_quoted(out, &self.format())
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Atom::String(s) | Atom::IgnoreCaseString(s) => Some(s),
            _ => None,
        }
    }

    /// Widens any integer kind to `i128`.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Atom::Int64(v) => Some(i128::from(*v)),
            Atom::Int32(v) => Some(i128::from(*v)),
            Atom::Int16(v) => Some(i128::from(*v)),
            Atom::SByte(v) => Some(i128::from(*v)),
            Atom::UInt64(v) => Some(i128::from(*v)),
            Atom::UInt32(v) => Some(i128::from(*v)),
            Atom::UInt16(v) => Some(i128::from(*v)),
            Atom::Byte(v) => Some(i128::from(*v)),
            _ => None,
        }
    }
}

fn format_float(value: f64, nan: bool, infinite: bool, finite: impl FnOnce() -> String) -> String {
    if nan {
        "NaN".to_string()
    } else if infinite {
        (if value > 0.0 { "INF" } else { "-INF" }).to_string()
    } else {
        finite()
    }
}

pub(crate) fn write_verbatim_string(out: &mut String, s: &str) {
    out.push_str("@\"");
    for ch in s.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn push_unicode_escape(out: &mut String, ch: char) {
    let code = u32::from(ch);
    if code > 0xFFFF {
        out.push_str(&format!("\\U{:08X}", code));
    } else {
        out.push_str(&format!("\\u{:04X}", code));
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Atom::String(a), Atom::String(b)) => a == b,
            (Atom::IgnoreCaseString(a), Atom::IgnoreCaseString(b)) => {
                a.to_lowercase() == b.to_lowercase()
            }
            (Atom::Char(a), Atom::Char(b)) => a == b,
            (Atom::Decimal(a), Atom::Decimal(b)) => a == b,
            (Atom::Int64(a), Atom::Int64(b)) => a == b,
            (Atom::Int32(a), Atom::Int32(b)) => a == b,
            (Atom::Int16(a), Atom::Int16(b)) => a == b,
            (Atom::SByte(a), Atom::SByte(b)) => a == b,
            (Atom::UInt64(a), Atom::UInt64(b)) => a == b,
            (Atom::UInt32(a), Atom::UInt32(b)) => a == b,
            (Atom::UInt16(a), Atom::UInt16(b)) => a == b,
            (Atom::Byte(a), Atom::Byte(b)) => a == b,
            // Bitwise, except that every NaN equals every other NaN.
            (Atom::Double(a), Atom::Double(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Atom::Single(a), Atom::Single(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Atom::Boolean(a), Atom::Boolean(b)) => a == b,
            (Atom::Binary(a), Atom::Binary(b)) => a == b,
            (Atom::Guid(a), Atom::Guid(b)) => a == b,
            (Atom::TimeSpan(a), Atom::TimeSpan(b)) => a == b,
            // Same instant and same offset.
            (Atom::DateTimeOffset(a), Atom::DateTimeOffset(b)) => a == b && a.offset() == b.offset(),
            _ => false,
        }
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Atom::String(s) => s.hash(state),
            Atom::IgnoreCaseString(s) => s.to_lowercase().hash(state),
            Atom::Char(ch) => ch.hash(state),
            Atom::Decimal(d) => d.hash(state),
            Atom::Int64(v) => v.hash(state),
            Atom::Int32(v) => v.hash(state),
            Atom::Int16(v) => v.hash(state),
            Atom::SByte(v) => v.hash(state),
            Atom::UInt64(v) => v.hash(state),
            Atom::UInt32(v) => v.hash(state),
            Atom::UInt16(v) => v.hash(state),
            Atom::Byte(v) => v.hash(state),
            Atom::Double(v) => {
                if v.is_nan() {
                    f64::NAN.to_bits().hash(state)
                } else {
                    v.to_bits().hash(state)
                }
            }
            Atom::Single(v) => {
                if v.is_nan() {
                    f32::NAN.to_bits().hash(state)
                } else {
                    v.to_bits().hash(state)
                }
            }
            Atom::Boolean(b) => b.hash(state),
            Atom::Binary(bytes) => bytes.hash(state),
            Atom::Guid(guid) => guid.hash(state),
            Atom::TimeSpan(span) => span.hash(state),
            Atom::DateTimeOffset(value) => {
                value.naive_utc().hash(state);
                value.offset().local_minus_utc().hash(state);
            }
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom::String(value.to_string())
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Atom::String(value)
    }
}

impl From<char> for Atom {
    fn from(value: char) -> Self {
        Atom::Char(value)
    }
}

impl From<bool> for Atom {
    fn from(value: bool) -> Self {
        Atom::Boolean(value)
    }
}

impl From<i64> for Atom {
    fn from(value: i64) -> Self {
        Atom::Int64(value)
    }
}

impl From<i32> for Atom {
    fn from(value: i32) -> Self {
        Atom::Int32(value)
    }
}

impl From<u64> for Atom {
    fn from(value: u64) -> Self {
        Atom::UInt64(value)
    }
}

impl From<f64> for Atom {
    fn from(value: f64) -> Self {
        Atom::Double(value)
    }
}

impl From<Decimal> for Atom {
    fn from(value: Decimal) -> Self {
        Atom::Decimal(value)
    }
}

impl From<Uuid> for Atom {
    fn from(value: Uuid) -> Self {
        Atom::Guid(value)
    }
}
