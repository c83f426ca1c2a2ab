//! chrono + chrono-tz reference adapter.
//!
//! The bundled unit algebra for parsers working on [`chrono::DateTime`]s in
//! an IANA timezone. [`units`] covers the conventional short spellings:
//! `ms`, `s`, `m`, `h`, `d`, `w` (ISO week, Monday start), `mo`, `y`.
//!
//! Semantics, per unit:
//!
//! - `ms` through `h` add by absolute duration; an hour is always 3600
//!   seconds, even across a DST change.
//! - `d`, `w`, `mo`, `y` add on the local calendar: the wall-clock time is
//!   preserved, and months/years clamp the day of month (Jan 31 plus one
//!   month is Feb 29 in a leap year).
//! - Rounding works on the local wall clock. The adapter's precision is
//!   the millisecond, so rounding up yields the period's last millisecond,
//!   one below the next boundary and never the boundary itself.
//! - A local time that is ambiguous after an operation (DST fall-back)
//!   resolves to the earlier instant; one that does not exist
//!   (spring-forward gap) slides forward past the gap.

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::unit::{ParseContext, ParserConfig, UnitDefinition, UnitTable};

/// Time type produced by this adapter.
pub type Time = DateTime<Tz>;

/// Unit definition type for this adapter.
pub type Unit = UnitDefinition<Time, Tz>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grain {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Grain {
    fn name(self) -> &'static str {
        match self {
            Grain::Millisecond => "millisecond",
            Grain::Second => "second",
            Grain::Minute => "minute",
            Grain::Hour => "hour",
            Grain::Day => "day",
            Grain::Week => "week",
            Grain::Month => "month",
            Grain::Year => "year",
        }
    }
}

/// Current instant in the context's timezone.
pub fn now(ctx: &ParseContext<Tz>) -> Time {
    Utc::now().with_timezone(&ctx.timezone)
}

/// The default unit table.
pub fn units() -> UnitTable<Time, Tz> {
    [
        ("ms", Grain::Millisecond),
        ("s", Grain::Second),
        ("m", Grain::Minute),
        ("h", Grain::Hour),
        ("d", Grain::Day),
        ("w", Grain::Week),
        ("mo", Grain::Month),
        ("y", Grain::Year),
    ]
    .into_iter()
    .map(|(key, grain)| (key.to_owned(), unit_for(grain)))
    .collect()
}

/// Default spellings of the now-keyword.
pub fn now_aliases() -> Vec<String> {
    vec!["now".to_owned()]
}

/// A ready-to-use configuration over the default units.
///
/// Built as an explicit value rather than a process-wide singleton, so
/// parsers with different configurations can coexist.
pub fn config(timezone: Tz) -> ParserConfig<Time, Tz> {
    ParserConfig { now: Box::new(now), units: units(), timezone, now_aliases: now_aliases() }
}

fn unit_for(grain: Grain) -> Unit {
    UnitDefinition {
        name: grain.name().to_owned(),
        add: Box::new(move |time, amount, _ctx| add(time, amount, grain)),
        round_up: Box::new(move |time, _ctx| round_up(time, grain)),
        round_down: Box::new(move |time, _ctx| round_down(time, grain)),
    }
}

// chrono's `+` panics on out-of-range results; a user-typed amount must
// never crash the process, so additions saturate at the representable
// bounds instead.
fn add(time: Time, amount: i64, grain: Grain) -> Time {
    match grain {
        Grain::Millisecond => add_absolute(time, Duration::try_milliseconds(amount), amount),
        Grain::Second => add_absolute(time, Duration::try_seconds(amount), amount),
        Grain::Minute => add_absolute(time, Duration::try_minutes(amount), amount),
        Grain::Hour => add_absolute(time, Duration::try_hours(amount), amount),
        // Calendar units keep the local wall-clock time.
        Grain::Day | Grain::Week | Grain::Month | Grain::Year => {
            rezone(time.timezone(), shift_local(time.naive_local(), amount, grain))
        }
    }
}

fn add_absolute(time: Time, delta: Option<Duration>, amount: i64) -> Time {
    let tz = time.timezone();
    delta.and_then(|d| time.checked_add_signed(d)).unwrap_or_else(|| clamp_instant(tz, amount))
}

fn clamp_instant(tz: Tz, amount: i64) -> Time {
    let bound = if amount < 0 { DateTime::<Utc>::MIN_UTC } else { DateTime::<Utc>::MAX_UTC };
    bound.with_timezone(&tz)
}

fn clamp_local(amount: i64) -> NaiveDateTime {
    if amount < 0 { NaiveDateTime::MIN } else { NaiveDateTime::MAX }
}

fn round_down(time: Time, grain: Grain) -> Time {
    rezone(time.timezone(), start_of(grain, time.naive_local()))
}

// Last millisecond of the containing period: start of the next period on
// the local calendar, minus one.
fn round_up(time: Time, grain: Grain) -> Time {
    let next = shift_local(start_of(grain, time.naive_local()), 1, grain);
    rezone(time.timezone(), next) - Duration::milliseconds(1)
}

fn shift_local(dt: NaiveDateTime, amount: i64, grain: Grain) -> NaiveDateTime {
    let shifted = match grain {
        Grain::Millisecond => Duration::try_milliseconds(amount),
        Grain::Second => Duration::try_seconds(amount),
        Grain::Minute => Duration::try_minutes(amount),
        Grain::Hour => Duration::try_hours(amount),
        Grain::Day => Duration::try_days(amount),
        Grain::Week => Duration::try_weeks(amount),
        Grain::Month => return add_months(dt, amount),
        Grain::Year => return add_months(dt, amount.saturating_mul(12)),
    };
    shifted.and_then(|d| dt.checked_add_signed(d)).unwrap_or_else(|| clamp_local(amount))
}

fn start_of(grain: Grain, dt: NaiveDateTime) -> NaiveDateTime {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_else(|| dt.time());
    match grain {
        Grain::Millisecond => {
            let millis = dt.time().nanosecond() / 1_000_000;
            let time = dt.time().with_nanosecond(millis * 1_000_000).unwrap_or_else(|| dt.time());
            NaiveDateTime::new(dt.date(), time)
        }
        Grain::Second => {
            let time = dt.time().with_nanosecond(0).unwrap_or_else(|| dt.time());
            NaiveDateTime::new(dt.date(), time)
        }
        Grain::Minute => {
            let time = NaiveTime::from_hms_opt(dt.hour(), dt.minute(), 0).unwrap_or_else(|| dt.time());
            NaiveDateTime::new(dt.date(), time)
        }
        Grain::Hour => {
            let time = NaiveTime::from_hms_opt(dt.hour(), 0, 0).unwrap_or_else(|| dt.time());
            NaiveDateTime::new(dt.date(), time)
        }
        Grain::Day => NaiveDateTime::new(dt.date(), midnight),
        Grain::Week => {
            let weekday_offset = dt.date().weekday().num_days_from_monday() as i64;
            NaiveDateTime::new(dt.date() - Duration::days(weekday_offset), midnight)
        }
        Grain::Month => {
            NaiveDateTime::new(NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1).unwrap_or_else(|| dt.date()), midnight)
        }
        Grain::Year => {
            NaiveDateTime::new(NaiveDate::from_ymd_opt(dt.year(), 1, 1).unwrap_or_else(|| dt.date()), midnight)
        }
    }
}

fn add_months(dt: NaiveDateTime, months: i64) -> NaiveDateTime {
    let base_year = dt.date().year() as i64;
    let base_month = dt.date().month() as i64;
    let zero_based = (base_month - 1).saturating_add(months);
    let Ok(year) = i32::try_from(base_year + zero_based.div_euclid(12)) else {
        return clamp_local(months);
    };
    let month = (zero_based.rem_euclid(12) + 1) as u32;
    let day = dt.date().day().min(days_in_month(year, month));
    // from_ymd_opt also rejects years beyond chrono's calendar range.
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => NaiveDateTime::new(date, dt.time()),
        None => clamp_local(months),
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap());
    let last_day = first_next - Duration::days(1);
    last_day.day()
}

// Map a local wall-clock time back into the zone. Ambiguous times (DST
// fall-back) take the earlier instant; nonexistent times (spring-forward
// gap) slide forward until the clock exists again.
fn rezone(tz: Tz, local: NaiveDateTime) -> Time {
    let mut probe = local;
    for _ in 0..=48 {
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earlier, _) => return earlier,
            LocalResult::None => match probe.checked_add_signed(Duration::minutes(30)) {
                Some(next) => probe = next,
                None => break,
            },
        }
    }
    // No real zone has a gap this long; read the wall time as UTC instead
    // of probing further.
    tz.from_utc_datetime(&local)
}
