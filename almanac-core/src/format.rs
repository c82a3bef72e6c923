//! strftime-style formatting and parsing
//!
//! Both directions share one vocabulary of `%` directives:
//!
//! | directive | meaning                                  |
//! |-----------|------------------------------------------|
//! | `%Y`      | year, at least 4 digits (`-0044`)        |
//! | `%y`      | year within century, 2 digits            |
//! | `%C`      | century, 2 digits (format only)          |
//! | `%m`      | month, 01-12                             |
//! | `%d`      | day, 01-31                               |
//! | `%e`      | day, space padded                        |
//! | `%H`      | hour 00-23                               |
//! | `%I`      | hour 01-12                               |
//! | `%M`      | minute 00-59                             |
//! | `%S`      | second 00-59                             |
//! | `%p` `%P` | `AM`/`PM`, `am`/`pm`                     |
//! | `%A` `%a` | weekday name, full / abbreviated         |
//! | `%B` `%b` `%h` | month name, full / abbreviated      |
//! | `%j`      | day of year, 001-366                     |
//! | `%w` `%u` | weekday number, Sunday=0 / Monday=1..7   |
//! | `%s`      | seconds since the Unix epoch             |
//! | `%z` `%:z`| UTC offset, `+hhmm` / `+hh:mm`           |
//! | `%F` `%T` `%D` `%R` | `%Y-%m-%d`, `%H:%M:%S`, `%m/%d/%y`, `%H:%M` |
//! | `%n` `%t` `%%` | newline, tab, literal `%`           |
//!
//! Formatting copies unknown directives through unchanged. Parsing reports
//! text that does not fit the format as a parse error, and a well-shaped
//! but impossible date (February 30) as an invalid calendar field.

use std::fmt::Write;

use crate::calendar::{Calendar, CalendarFields, Offset};
use crate::civil;
use crate::error::{CalendarError, Result};
use crate::instant::Instant;

/// Format used by `Instant::parse` and `Display`
pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of `Instant::isoformat`
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// ISO 8601 with offset, used for serialization
pub const RFC3339_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

static WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

static MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ============================================================================
// Formatting
// ============================================================================

/// Render an instant in its own calendar
pub fn format(instant: &Instant, spec: &str) -> String {
    let fields = instant.fields();
    let mut out = String::with_capacity(spec.len() + 16);
    let printer = Printer {
        fields: &fields,
        epoch_seconds: instant.epoch_seconds(),
        offset: instant.calendar().offset(),
    };
    printer.write(&mut out, spec);
    out
}

struct Printer<'a> {
    fields: &'a CalendarFields,
    epoch_seconds: i64,
    offset: Offset,
}

impl Printer<'_> {
    fn write(&self, out: &mut String, spec: &str) {
        let mut chars = spec.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                None => out.push('%'),
                Some(':') if chars.peek() == Some(&'z') => {
                    chars.next();
                    self.write_offset(out, true);
                }
                Some(directive) => self.write_directive(out, directive),
            }
        }
    }

    // Writing to a String cannot fail
    fn write_directive(&self, out: &mut String, directive: char) {
        let f = self.fields;
        let _ = match directive {
            'Y' => write_year(out, f.year),
            'y' => write!(out, "{:02}", f.year.rem_euclid(100)),
            'C' => write!(out, "{:02}", f.year.div_euclid(100)),
            'm' => write!(out, "{:02}", f.month),
            'd' => write!(out, "{:02}", f.day),
            'e' => write!(out, "{:2}", f.day),
            'H' => write!(out, "{:02}", f.hour),
            'I' => write!(out, "{:02}", f.hour12()),
            'M' => write!(out, "{:02}", f.minute),
            'S' => write!(out, "{:02}", f.second),
            'p' => out.write_str(if f.is_pm() { "PM" } else { "AM" }),
            'P' => out.write_str(if f.is_pm() { "pm" } else { "am" }),
            'A' => out.write_str(weekday_name(f.weekday())),
            'a' => out.write_str(&weekday_name(f.weekday())[..3]),
            'B' => out.write_str(month_name(f.month)),
            'b' | 'h' => out.write_str(&month_name(f.month)[..3]),
            'j' => write!(out, "{:03}", f.day_of_year()),
            'w' => write!(out, "{}", f.weekday()),
            'u' => write!(out, "{}", match f.weekday() {
                0 => 7,
                wd => wd,
            }),
            's' => write!(out, "{}", self.epoch_seconds),
            'z' => {
                self.write_offset(out, false);
                Ok(())
            }
            'F' => {
                self.write(out, "%Y-%m-%d");
                Ok(())
            }
            'T' => {
                self.write(out, "%H:%M:%S");
                Ok(())
            }
            'D' => {
                self.write(out, "%m/%d/%y");
                Ok(())
            }
            'R' => {
                self.write(out, "%H:%M");
                Ok(())
            }
            'n' => out.write_char('\n'),
            't' => out.write_char('\t'),
            '%' => out.write_char('%'),
            unknown => {
                out.push('%');
                out.write_char(unknown)
            }
        };
    }

    fn write_offset(&self, out: &mut String, colon: bool) {
        let (sign, hours, minutes, _) = self.offset.parts();
        let sep = if colon { ":" } else { "" };
        let _ = write!(out, "{}{:02}{}{:02}", sign, hours, sep, minutes);
    }
}

fn write_year(out: &mut String, year: i32) -> std::fmt::Result {
    if year < 0 {
        write!(out, "-{:04}", year.unsigned_abs())
    } else {
        write!(out, "{:04}", year)
    }
}

fn weekday_name(weekday: u32) -> &'static str {
    WEEKDAY_NAMES[weekday as usize % 7]
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize + 11) % 12]
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse `text` against `spec`, composing the result in `calendar` unless
/// the text carries its own offset
pub fn parse(calendar: Calendar, text: &str, spec: &str) -> Result<Instant> {
    let result = Parser::new(text).run(spec).and_then(|parsed| parsed.resolve(calendar));
    if let Err(ref err) = result {
        tracing::debug!(text, spec, error = %err, "failed to parse instant");
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Field values recovered from the input, before validation
#[derive(Debug, Default)]
struct Parsed {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    hour12: Option<u32>,
    meridiem: Option<Meridiem>,
    minute: Option<u32>,
    second: Option<u32>,
    weekday: Option<u32>,
    day_of_year: Option<u32>,
    offset: Option<Offset>,
    timestamp: Option<i64>,
}

struct Parser<'i> {
    inp: &'i str,
    parsed: Parsed,
}

impl<'i> Parser<'i> {
    fn new(inp: &'i str) -> Self {
        Self { inp, parsed: Parsed::default() }
    }

    fn run(mut self, spec: &str) -> Result<Parsed> {
        self.parse_spec(spec)?;
        if !self.inp.is_empty() {
            return Err(CalendarError::parse(format!("unconverted input remains: '{}'", self.inp)));
        }
        Ok(self.parsed)
    }

    fn parse_spec(&mut self, spec: &str) -> Result<()> {
        let mut chars = spec.chars().peekable();
        while let Some(c) = chars.next() {
            if c.is_whitespace() {
                self.skip_whitespace();
                continue;
            }
            if c != '%' {
                self.expect_char(c)?;
                continue;
            }
            match chars.next() {
                None => self.expect_char('%')?,
                Some(':') if chars.peek() == Some(&'z') => {
                    chars.next();
                    self.parse_offset()?;
                }
                Some(directive) => self.parse_directive(directive)?,
            }
        }
        Ok(())
    }

    fn parse_directive(&mut self, directive: char) -> Result<()> {
        match directive {
            'Y' => {
                let year = self.parse_signed(self.year_width(), "year")?;
                self.parsed.year = Some(year as i32);
            }
            'y' => {
                let yy = self.parse_number(2, "year")? as i32;
                self.parsed.year = Some(if yy >= 69 { 1900 + yy } else { 2000 + yy });
            }
            'm' => self.parsed.month = Some(self.parse_number(2, "month")? as u32),
            'd' => self.parsed.day = Some(self.parse_number(2, "day")? as u32),
            'e' => {
                self.inp = self.inp.trim_start_matches(' ');
                self.parsed.day = Some(self.parse_number(2, "day")? as u32);
            }
            'H' => self.parsed.hour = Some(self.parse_number(2, "hour")? as u32),
            'I' => self.parsed.hour12 = Some(self.parse_number(2, "hour")? as u32),
            'M' => self.parsed.minute = Some(self.parse_number(2, "minute")? as u32),
            'S' => self.parsed.second = Some(self.parse_number(2, "second")? as u32),
            'p' | 'P' => self.parse_meridiem()?,
            'A' | 'a' => {
                let index = self.parse_name(&WEEKDAY_NAMES, "weekday")?;
                self.parsed.weekday = Some(index as u32);
            }
            'B' | 'b' | 'h' => {
                let index = self.parse_name(&MONTH_NAMES, "month")?;
                self.parsed.month = Some(index as u32 + 1);
            }
            'j' => self.parsed.day_of_year = Some(self.parse_number(3, "day of year")? as u32),
            'w' => {
                let wd = self.parse_number(1, "weekday")?;
                if wd > 6 {
                    return Err(CalendarError::parse(format!("weekday {} out of range 0-6", wd)));
                }
                self.parsed.weekday = Some(wd as u32);
            }
            'u' => {
                let wd = self.parse_number(1, "weekday")?;
                if !(1..=7).contains(&wd) {
                    return Err(CalendarError::parse(format!("weekday {} out of range 1-7", wd)));
                }
                self.parsed.weekday = Some(wd as u32 % 7);
            }
            's' => self.parsed.timestamp = Some(self.parse_signed(19, "timestamp")?),
            'z' => self.parse_offset()?,
            'F' => self.parse_spec("%Y-%m-%d")?,
            'T' => self.parse_spec("%H:%M:%S")?,
            'D' => self.parse_spec("%m/%d/%y")?,
            'R' => self.parse_spec("%H:%M")?,
            'n' | 't' => self.skip_whitespace(),
            '%' => self.expect_char('%')?,
            unknown => {
                self.expect_char('%')?;
                self.expect_char(unknown)?;
            }
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        self.inp = self.inp.trim_start();
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        match self.inp.strip_prefix(expected) {
            Some(rest) => {
                self.inp = rest;
                Ok(())
            }
            None => Err(CalendarError::parse(match self.inp.chars().next() {
                Some(found) => format!("expected '{}', found '{}'", expected, found),
                None => format!("expected '{}', found end of input", expected),
            })),
        }
    }

    /// Up to `max_digits` ASCII digits, at least one
    fn parse_number(&mut self, max_digits: usize, what: &str) -> Result<i64> {
        let len = self
            .inp
            .bytes()
            .take(max_digits)
            .take_while(u8::is_ascii_digit)
            .count();
        if len == 0 {
            return Err(CalendarError::parse(format!("expected digits for {}", what)));
        }
        let (digits, rest) = self.inp.split_at(len);
        let value = digits
            .parse::<i64>()
            .map_err(|_| CalendarError::parse(format!("{} '{}' is too large", what, digits)))?;
        self.inp = rest;
        Ok(value)
    }

    /// Digits `%Y` may consume: four, or five when the fifth ends the run.
    ///
    /// Read through a non-zero offset, the first and last instants in range
    /// fall in years -10000 and 10000; `compose` rejects anything further.
    fn year_width(&self) -> usize {
        let unsigned = self.inp.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(self.inp);
        match unsigned.bytes().take_while(u8::is_ascii_digit).count() {
            5 => 5,
            _ => 4,
        }
    }

    fn parse_signed(&mut self, max_digits: usize, what: &str) -> Result<i64> {
        let negative = match self.inp.as_bytes().first() {
            Some(b'-') => true,
            Some(b'+') => false,
            _ => return self.parse_number(max_digits, what),
        };
        self.inp = &self.inp[1..];
        let value = self.parse_number(max_digits, what)?;
        Ok(if negative { -value } else { value })
    }

    /// Case-insensitive match of a full name, or of its first three letters
    fn parse_name(&mut self, names: &[&str], what: &str) -> Result<usize> {
        let starts_with = |inp: &str, name: &str| {
            inp.len() >= name.len()
                && inp.is_char_boundary(name.len())
                && inp[..name.len()].eq_ignore_ascii_case(name)
        };
        for (index, name) in names.iter().enumerate() {
            if starts_with(self.inp, name) {
                self.inp = &self.inp[name.len()..];
                return Ok(index);
            }
        }
        for (index, name) in names.iter().enumerate() {
            if starts_with(self.inp, &name[..3]) {
                self.inp = &self.inp[3..];
                return Ok(index);
            }
        }
        Err(CalendarError::parse(format!("unknown {} name", what)))
    }

    fn parse_meridiem(&mut self) -> Result<()> {
        let meridiem = match self.inp.get(..2) {
            Some(m) if m.eq_ignore_ascii_case("am") => Meridiem::Am,
            Some(m) if m.eq_ignore_ascii_case("pm") => Meridiem::Pm,
            _ => return Err(CalendarError::parse("expected AM or PM")),
        };
        self.inp = &self.inp[2..];
        self.parsed.meridiem = Some(meridiem);
        Ok(())
    }

    /// `Z`, `+hhmm` or `+hh:mm`
    fn parse_offset(&mut self) -> Result<()> {
        if let Some(rest) = self.inp.strip_prefix(|c: char| c == 'Z' || c == 'z') {
            self.inp = rest;
            self.parsed.offset = Some(Offset::UTC);
            return Ok(());
        }
        let negative = match self.inp.as_bytes().first() {
            Some(b'+') => false,
            Some(b'-') => true,
            _ => return Err(CalendarError::parse("expected UTC offset")),
        };
        self.inp = &self.inp[1..];
        let hours = self.parse_fixed(2, "offset hours")?;
        if let Some(rest) = self.inp.strip_prefix(':') {
            self.inp = rest;
        }
        let minutes = self.parse_fixed(2, "offset minutes")?;
        if minutes > 59 {
            return Err(CalendarError::InvalidOffset(format!("minutes {} out of range", minutes)));
        }
        let seconds = (hours * 3600 + minutes * 60) as i32;
        let seconds = if negative { -seconds } else { seconds };
        self.parsed.offset = Some(Offset::from_seconds(seconds)?);
        Ok(())
    }

    /// Exactly `digits` ASCII digits
    fn parse_fixed(&mut self, digits: usize, what: &str) -> Result<i64> {
        let before = self.inp.len();
        let value = self.parse_number(digits, what)?;
        if before - self.inp.len() != digits {
            return Err(CalendarError::parse(format!("expected {} digits for {}", digits, what)));
        }
        Ok(value)
    }
}

impl Parsed {
    fn resolve(self, calendar: Calendar) -> Result<Instant> {
        let calendar = self.offset.map(Calendar::fixed).unwrap_or(calendar);
        if let Some(ts) = self.timestamp {
            return Ok(Instant::from_epoch_seconds_in(calendar, ts));
        }

        let hour = match self.hour12 {
            Some(h) if !(1..=12).contains(&h) => return Err(CalendarError::InvalidHour(h)),
            Some(h) => match self.meridiem {
                Some(Meridiem::Pm) => h % 12 + 12,
                _ => h % 12,
            },
            None => self.hour.unwrap_or(0),
        };

        let year = self.year.unwrap_or(1970);
        let (month, day) = match (self.day_of_year, self.month, self.day) {
            (Some(ordinal), None, None) => {
                civil::month_day_from_ordinal(year, ordinal).ok_or_else(|| {
                    CalendarError::parse(format!(
                        "day of year {} does not exist in {}",
                        ordinal, year
                    ))
                })?
            }
            (_, month, day) => (month.unwrap_or(1), day.unwrap_or(1)),
        };

        let fields = CalendarFields::new(
            year,
            month,
            day,
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        );
        let instant = calendar.compose(&fields)?;

        if let Some(wd) = self.weekday {
            if wd != fields.weekday() {
                return Err(CalendarError::parse(format!(
                    "{} does not fall on a {}",
                    instant.format("%Y-%m-%d"),
                    weekday_name(wd)
                )));
            }
        }
        if let Some(ordinal) = self.day_of_year {
            if ordinal != fields.day_of_year() {
                return Err(CalendarError::parse(format!(
                    "day of year {} does not match {}",
                    ordinal,
                    instant.format("%Y-%m-%d")
                )));
            }
        }
        Ok(instant)
    }
}
