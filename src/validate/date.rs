// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::pattern_type_mismatch)]

use crate::types::facets::{DateFacets, DateFormat};
use crate::types::BaseType;
use crate::validate::context::Context;
use crate::validate::error::ValidationError;
use crate::validate::options::ValidatorOptions;
use crate::validate::Check;
use crate::value::Value;

use std::sync::Arc;

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc,
};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref DATE_ONLY: Regex = Regex::new(r"^(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})$")
        .expect("date-only pattern should compile");
    static ref TIME_ONLY: Regex =
        Regex::new(r"^(?P<h>\d{2}):(?P<mi>\d{2}):(?P<s>\d{2})(?:\.(?P<f>\d{1,9}))?$")
            .expect("time-only pattern should compile");
    static ref DATETIME_ONLY: Regex = Regex::new(
        r"^(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})T(?P<h>\d{2}):(?P<mi>\d{2}):(?P<s>\d{2})(?:\.(?P<f>\d{1,9}))?$"
    )
    .expect("datetime-only pattern should compile");
    static ref DATETIME: Regex = Regex::new(
        r"^(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})[Tt](?P<h>\d{2}):(?P<mi>\d{2}):(?P<s>\d{2})(?:\.(?P<f>\d{1,9}))?(?P<tz>[Zz]|[+-]\d{2}:\d{2})$"
    )
    .expect("datetime pattern should compile");
    static ref DATE: Regex = Regex::new(
        r"^(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})(?:[Tt ](?P<h>\d{2}):(?P<mi>\d{2})(?::(?P<s>\d{2})(?:\.(?P<f>\d{1,9}))?)?(?P<tz>[Zz]|[+-]\d{2}:?\d{2})?)?$"
    )
    .expect("date pattern should compile");
}

/// Fields captured from a date string.
#[derive(Debug, Clone, PartialEq)]
struct Parts {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    fraction: Option<String>,
    // "Z" or "+hh:mm".
    offset: Option<String>,
    has_time: bool,
}

fn normalize_offset(tz: &str) -> String {
    match tz {
        "Z" | "z" => "Z".to_string(),
        _ if tz.len() == 5 => format!("{}:{}", &tz[..3], &tz[3..]),
        _ => tz.to_string(),
    }
}

fn offset_seconds(offset: &str) -> Option<i32> {
    if offset == "Z" {
        return Some(0);
    }
    let sign = match offset.get(..1)? {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = offset.get(1..3)?.parse().ok()?;
    let minutes: i32 = offset.get(4..6)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

impl Parts {
    fn from_captures(caps: &Captures<'_>) -> Option<Parts> {
        fn field<T: core::str::FromStr>(caps: &Captures<'_>, name: &str, default: T) -> Option<T> {
            match caps.name(name) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(default),
            }
        }
        Some(Parts {
            year: field(caps, "y", 1970)?,
            month: field(caps, "mo", 1)?,
            day: field(caps, "d", 1)?,
            hour: field(caps, "h", 0)?,
            minute: field(caps, "mi", 0)?,
            second: field(caps, "s", 0)?,
            fraction: caps.name("f").map(|m| m.as_str().to_string()),
            offset: caps.name("tz").map(|m| normalize_offset(m.as_str())),
            has_time: caps.name("h").is_some(),
        })
    }

    fn from_native(d: &DateTime<FixedOffset>) -> Parts {
        let nanos = d.nanosecond() % 1_000_000_000;
        let fraction = (nanos != 0).then(|| {
            format!("{nanos:09}")
                .trim_end_matches('0')
                .to_string()
        });
        let seconds = d.offset().local_minus_utc();
        let offset = if seconds == 0 {
            "Z".to_string()
        } else {
            let sign = if seconds < 0 { '-' } else { '+' };
            let abs = seconds.abs();
            format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
        };
        Parts {
            year: d.year(),
            month: d.month(),
            day: d.day(),
            hour: d.hour(),
            minute: d.minute(),
            second: d.second(),
            fraction,
            offset: Some(offset),
            has_time: true,
        }
    }

    // Field ranges, including "no 30th or 31st of February". Leap years are
    // left to the calendar check.
    fn in_range(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && !(self.month == 2 && self.day > 29)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
            && self.offset.as_deref().map_or(true, |o| offset_seconds(o).is_some())
    }

    /// The date reached by counting `day - 1` days from the first of the
    /// month. Out-of-month days roll over into the next month.
    fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)?
            .checked_add_days(Days::new(u64::from(self.day.saturating_sub(1))))
    }

    fn fraction_len(&self) -> usize {
        self.fraction.as_ref().map_or(0, |f| f.len() + 1)
    }

    fn iso(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.fraction
                .as_ref()
                .map(|f| format!(".{f}"))
                .unwrap_or_default(),
            self.offset.as_deref().unwrap_or("Z")
        )
    }

    fn to_native(&self) -> Option<DateTime<FixedOffset>> {
        let date = self.calendar_date()?;
        let nanos: u32 = match &self.fraction {
            Some(f) => format!("{f:0<9}").parse().ok()?,
            None => 0,
        };
        let time = NaiveTime::from_hms_nano_opt(self.hour, self.minute, self.second, nanos)?;
        let offset = FixedOffset::east_opt(offset_seconds(self.offset.as_deref().unwrap_or("Z"))?)?;
        NaiveDateTime::new(date, time)
            .and_local_timezone(offset)
            .single()
    }
}

fn date_part(iso: &str, _: &Parts) -> String {
    iso.get(..10).unwrap_or(iso).to_string()
}

fn time_part(iso: &str, parts: &Parts) -> String {
    iso.get(11..19 + parts.fraction_len())
        .unwrap_or(iso)
        .to_string()
}

fn local_part(iso: &str, parts: &Parts) -> String {
    iso.get(..19 + parts.fraction_len()).unwrap_or(iso).to_string()
}

fn full(iso: &str, _: &Parts) -> String {
    iso.to_string()
}

// `date` keeps as much as was written.
fn as_written(iso: &str, parts: &Parts) -> String {
    if !parts.has_time {
        date_part(iso, parts)
    } else if parts.offset.is_some() {
        full(iso, parts)
    } else {
        local_part(iso, parts)
    }
}

/// One row of the date family table.
#[derive(Clone, Copy)]
struct Variant {
    pattern: &'static Regex,
    label: &'static str,
    truncate: fn(&str, &Parts) -> String,
}

impl Variant {
    fn of(base: BaseType) -> Variant {
        match base {
            BaseType::DateOnly => Variant {
                pattern: &DATE_ONLY,
                label: "date-only (YYYY-MM-DD)",
                truncate: date_part,
            },
            BaseType::TimeOnly => Variant {
                pattern: &TIME_ONLY,
                label: "time-only (hh:mm:ss[.ff])",
                truncate: time_part,
            },
            BaseType::DateTimeOnly => Variant {
                pattern: &DATETIME_ONLY,
                label: "datetime-only (YYYY-MM-DDThh:mm:ss[.ff])",
                truncate: local_part,
            },
            BaseType::DateTime => Variant {
                pattern: &DATETIME,
                label: "datetime (RFC 3339)",
                truncate: full,
            },
            _ => Variant {
                pattern: &DATE,
                label: "date",
                truncate: as_written,
            },
        }
    }

    fn canonical(&self, parts: &Parts) -> String {
        (self.truncate)(&parts.iso(), parts)
    }
}

enum Rejection {
    Pattern,
    Calendar,
}

fn parse(variant: Variant, text: &str, fast: bool) -> Result<Parts, Rejection> {
    let parts = variant
        .pattern
        .captures(text)
        .and_then(|caps| Parts::from_captures(&caps))
        .filter(Parts::in_range)
        .ok_or(Rejection::Pattern)?;
    if !fast {
        match parts.calendar_date() {
            Some(date) if date.day() == parts.day => (),
            _ => return Err(Rejection::Calendar),
        }
    }
    Ok(parts)
}

fn http_date(d: &DateTime<FixedOffset>) -> String {
    d.with_timezone(&Utc)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

pub(super) fn compile(base: BaseType, facets: &DateFacets, options: &ValidatorOptions) -> Arc<Check> {
    let variant = Variant::of(base);
    let rfc2616 = base == BaseType::DateTime && facets.format == Some(DateFormat::Rfc2616);
    let fast = options.fast_date_validation;
    let native = options.coerce_native_types;
    let coerce = options.coerce_types;

    Arc::new(move |value: &Value, ctx: &mut Context| {
        let format_error = |ctx: &mut Context, format: &str| {
            ctx.report(ValidationError::FormatError {
                path: ctx.path(),
                actual: value.clone(),
                format: format.to_string(),
            });
            None
        };

        let text = match value {
            Value::DateTime(d) => {
                return Some(if native || !coerce {
                    value.clone()
                } else if rfc2616 {
                    Value::from(http_date(d))
                } else {
                    Value::from(variant.canonical(&Parts::from_native(d)))
                });
            }
            Value::String(s) => s.as_ref(),
            _ => {
                ctx.report(ValidationError::InvalidType {
                    path: ctx.path(),
                    expected: base.name().to_string(),
                    actual: value.clone(),
                });
                return None;
            }
        };

        if rfc2616 {
            return match DateTime::parse_from_rfc2822(text) {
                Ok(d) if native => Some(Value::DateTime(d)),
                Ok(d) if coerce => Some(Value::from(http_date(&d))),
                Ok(_) => Some(value.clone()),
                Err(_) => format_error(ctx, "datetime (RFC 2616)"),
            };
        }

        let parts = match parse(variant, text, fast) {
            Ok(parts) => parts,
            Err(Rejection::Pattern) => return format_error(ctx, variant.label),
            Err(Rejection::Calendar) => return format_error(ctx, "a calendar date"),
        };
        if native {
            match parts.to_native() {
                Some(d) => Some(Value::DateTime(d)),
                None => format_error(ctx, variant.label),
            }
        } else if coerce {
            Some(Value::from(variant.canonical(&parts)))
        } else {
            Some(value.clone())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(base: BaseType, text: &str) -> Option<Parts> {
        parse(Variant::of(base), text, false).ok()
    }

    #[test]
    fn offsets_are_normalized() {
        let p = parts(BaseType::Date, "2020-01-02T03:04+0530").unwrap();
        assert_eq!(p.offset.as_deref(), Some("+05:30"));
        assert_eq!(p.second, 0);
        assert_eq!(
            Variant::of(BaseType::Date).canonical(&p),
            "2020-01-02T03:04:00+05:30"
        );
    }

    #[test]
    fn truncation_per_variant() {
        let p = parts(BaseType::DateTime, "2020-01-02t03:04:05.250z").unwrap();
        assert_eq!(Variant::of(BaseType::DateTime).canonical(&p), "2020-01-02T03:04:05.250Z");
        assert_eq!(Variant::of(BaseType::DateOnly).canonical(&p), "2020-01-02");
        assert_eq!(Variant::of(BaseType::TimeOnly).canonical(&p), "03:04:05.250");
        assert_eq!(
            Variant::of(BaseType::DateTimeOnly).canonical(&p),
            "2020-01-02T03:04:05.250"
        );
    }

    #[test]
    fn fields_out_of_range_fail_the_pattern_stage() {
        for text in ["2021-13-01", "2021-00-10", "2021-02-30", "2021-04-32"] {
            assert!(matches!(
                parse(Variant::of(BaseType::DateOnly), text, true),
                Err(Rejection::Pattern)
            ));
        }
        assert!(matches!(
            parse(Variant::of(BaseType::TimeOnly), "24:00:00", true),
            Err(Rejection::Pattern)
        ));
    }

    #[test]
    fn calendar_rolls_over() {
        let p = parse(Variant::of(BaseType::DateOnly), "2021-02-29", true)
            .ok()
            .unwrap();
        assert_eq!(p.calendar_date(), NaiveDate::from_ymd_opt(2021, 3, 1));
        assert!(matches!(
            parse(Variant::of(BaseType::DateOnly), "2021-04-31", false),
            Err(Rejection::Calendar)
        ));
        assert!(parse(Variant::of(BaseType::DateOnly), "2024-02-29", false).is_ok());
    }

    #[test]
    fn native_round_trip() {
        let p = parts(BaseType::DateTime, "2020-06-01T10:00:00.5-02:00").unwrap();
        let d = p.to_native().unwrap();
        assert_eq!(d.offset().local_minus_utc(), -7200);
        assert_eq!(
            Variant::of(BaseType::DateTime).canonical(&Parts::from_native(&d)),
            "2020-06-01T10:00:00.5-02:00"
        );
    }

    #[test]
    fn http_dates() {
        let d = DateTime::parse_from_rfc2822("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(http_date(&d), "Sun, 06 Nov 1994 08:49:37 GMT");
    }
}
