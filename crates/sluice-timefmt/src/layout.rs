//! Token layouts
//!
//! A layout is compiled once from a token string such as
//! `YYYY-MM-dd HH:mm:ssSSS` and can then render instants and parse text.
//! Rendering is done token by token; parsing lowers the layout to a chrono
//! strftime string and picks the narrowest chrono type the layout can fill.

use chrono::format::{self, ParseError, ParseResult, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

use crate::error::{Error, Result};

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS_LONG: [&str; 12] = [
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

const WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const WEEKDAYS_LONG: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A single element of a compiled layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `YYYY`
    Year4,
    /// `YY`
    Year2,
    /// `M`
    Month,
    /// `MM`
    Month2,
    /// `MMM`
    MonthShort,
    /// `MMMM`
    MonthLong,
    /// `d`
    Day,
    /// `dd`
    Day2,
    /// `EEE`
    WeekdayShort,
    /// `EEEE`
    WeekdayLong,
    /// `HH`
    Hour24,
    /// `h`
    Hour12,
    /// `hh`
    Hour12Padded,
    /// `a`
    Meridiem,
    /// `m`
    Minute,
    /// `mm`
    Minute2,
    /// `s`
    Second,
    /// `ss`
    Second2,
    /// `S`, `SS`, `SSS`: dot followed by that many fraction digits
    Fraction(u8),
    /// `G`
    Era,
    /// `z`
    ZoneName,
    /// `Z` and `XX`: `+hhmm`
    OffsetHhmm,
    /// `X`: `+hh`
    OffsetHh,
    /// `XXX`: `+hh:mm`
    OffsetHhColonMm,
    /// Raw text
    Literal(String),
}

impl Token {
    fn is_date(&self) -> bool {
        matches!(
            self,
            Self::Year4
                | Self::Year2
                | Self::Month
                | Self::Month2
                | Self::MonthShort
                | Self::MonthLong
                | Self::Day
                | Self::Day2
        )
    }

    fn is_time(&self) -> bool {
        matches!(
            self,
            Self::Hour24
                | Self::Hour12
                | Self::Hour12Padded
                | Self::Minute
                | Self::Minute2
                | Self::Second
                | Self::Second2
        )
    }

    fn is_offset(&self) -> bool {
        matches!(
            self,
            Self::OffsetHhmm | Self::OffsetHh | Self::OffsetHhColonMm
        )
    }
}

/// A compiled date-format token string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source: String,
    tokens: Vec<Token>,
}

impl Layout {
    /// Compile a token string
    pub fn compile(format: &str) -> Result<Self> {
        Ok(Self {
            source: format.to_string(),
            tokens: tokenize(format)?,
        })
    }

    /// The token string this layout was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled tokens
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether the layout carries a numeric UTC offset
    pub fn has_offset(&self) -> bool {
        self.tokens.iter().any(Token::is_offset)
    }

    /// Render an instant with this layout
    pub fn render(&self, t: &DateTime<FixedOffset>) -> String {
        let mut out = String::with_capacity(self.source.len() + 8);
        for token in &self.tokens {
            write_token(&mut out, token, t);
        }
        out
    }

    /// Parse text with this layout
    ///
    /// Fields the layout does not carry take the start of their range: a
    /// missing day is the 1st, a missing time is midnight, and a layout with
    /// only a time of day is anchored on `0000-01-01`. A 12-hour clock
    /// without `a` reads `12` as noon and anything else as AM. Layouts
    /// without an offset yield UTC instants.
    pub fn parse(&self, value: &str) -> Result<DateTime<FixedOffset>> {
        if !self.tokens.iter().any(|t| t.is_date() || t.is_time()) {
            return Err(Error::parse(
                value,
                &self.source,
                "layout has no date or time fields",
            ));
        }
        let fail = |e: ParseError| Error::parse(value, &self.source, e.to_string());

        let fmt = self.strftime();
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, value, StrftimeItems::new(&fmt)).map_err(fail)?;
        fill_defaults(&mut parsed).map_err(fail)?;

        let naive = parsed
            .to_naive_date()
            .map_err(fail)?
            .and_time(parsed.to_naive_time().map_err(fail)?);
        let offset = match parsed.offset() {
            Some(_) => parsed.to_fixed_offset().map_err(fail)?,
            None => Utc.fix(),
        };
        naive
            .and_local_timezone(offset)
            .single()
            .ok_or_else(|| Error::parse(value, &self.source, "ambiguous local time"))
    }

    fn strftime(&self) -> String {
        let mut fmt = String::with_capacity(self.source.len() * 2);
        for token in &self.tokens {
            match token {
                Token::Year4 => fmt.push_str("%Y"),
                Token::Year2 => fmt.push_str("%y"),
                Token::Month | Token::Month2 => fmt.push_str("%m"),
                Token::MonthShort => fmt.push_str("%b"),
                Token::MonthLong => fmt.push_str("%B"),
                Token::Day | Token::Day2 => fmt.push_str("%d"),
                Token::WeekdayShort => fmt.push_str("%a"),
                Token::WeekdayLong => fmt.push_str("%A"),
                Token::Hour24 => fmt.push_str("%H"),
                Token::Hour12 | Token::Hour12Padded => fmt.push_str("%I"),
                Token::Meridiem => fmt.push_str("%p"),
                Token::Minute | Token::Minute2 => fmt.push_str("%M"),
                Token::Second | Token::Second2 => fmt.push_str("%S"),
                Token::Fraction(3) => fmt.push_str("%.3f"),
                Token::Fraction(_) => fmt.push_str("%.f"),
                Token::Era => fmt.push_str("AD"),
                Token::ZoneName => fmt.push_str("%Z"),
                Token::OffsetHhmm => fmt.push_str("%z"),
                Token::OffsetHh => fmt.push_str("%#z"),
                Token::OffsetHhColonMm => fmt.push_str("%:z"),
                Token::Literal(text) => fmt.push_str(&text.replace('%', "%%")),
            }
        }
        fmt
    }
}

/// Parse `value` with the token string `format`
pub fn parse_token(value: &str, format: &str) -> Result<DateTime<FixedOffset>> {
    Layout::compile(format)?.parse(value)
}

/// Render `t` with the token string `format`
pub fn render_token(t: &DateTime<FixedOffset>, format: &str) -> Result<String> {
    Ok(Layout::compile(format)?.render(t))
}

fn fill_defaults(parsed: &mut Parsed) -> ParseResult<()> {
    if parsed.year().is_none() && parsed.year_mod_100().is_none() {
        parsed.set_year(0)?;
    }
    if parsed.month().is_none() {
        parsed.set_month(1)?;
    }
    if parsed.day().is_none() {
        parsed.set_day(1)?;
    }
    match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (None, None) => parsed.set_hour(0)?,
        (None, Some(h)) => parsed.set_ampm(h == 0)?,
        _ => {}
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    if parsed.second().is_none() {
        parsed.set_second(0)?;
    }
    Ok(())
}

fn run_length(chars: &[char], start: usize, max: usize) -> usize {
    let c = chars[start];
    chars[start..]
        .iter()
        .take(max)
        .take_while(|&&x| x == c)
        .count()
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(prev)) = tokens.last_mut() {
        prev.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

fn tokenize(format: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = format.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let token = match c {
            'Y' | 'y' => {
                let n = run_length(&chars, i, 4);
                i += n;
                match n {
                    4 => Token::Year4,
                    2 => Token::Year2,
                    _ => {
                        return Err(Error::invalid_format(
                            format,
                            format!("year takes {c}{c}{c}{c} or {c}{c}"),
                        ))
                    }
                }
            }
            'M' => {
                let n = run_length(&chars, i, 4);
                i += n;
                match n {
                    1 => Token::Month,
                    2 => Token::Month2,
                    3 => Token::MonthShort,
                    _ => Token::MonthLong,
                }
            }
            'd' => {
                let n = run_length(&chars, i, 2);
                i += n;
                if n == 1 {
                    Token::Day
                } else {
                    Token::Day2
                }
            }
            'E' => {
                let n = run_length(&chars, i, 4);
                i += n;
                match n {
                    3 => Token::WeekdayShort,
                    4 => Token::WeekdayLong,
                    _ => {
                        return Err(Error::invalid_format(format, "weekday takes EEE or EEEE"))
                    }
                }
            }
            'H' => {
                let n = run_length(&chars, i, 2);
                i += n;
                if n != 2 {
                    return Err(Error::invalid_format(
                        format,
                        "hour of day only supports HH",
                    ));
                }
                Token::Hour24
            }
            'h' => {
                let n = run_length(&chars, i, 2);
                i += n;
                if n == 1 {
                    Token::Hour12
                } else {
                    Token::Hour12Padded
                }
            }
            'm' => {
                let n = run_length(&chars, i, 2);
                i += n;
                if n == 1 {
                    Token::Minute
                } else {
                    Token::Minute2
                }
            }
            's' => {
                let n = run_length(&chars, i, 2);
                i += n;
                if n == 1 {
                    Token::Second
                } else {
                    Token::Second2
                }
            }
            'S' => {
                let n = run_length(&chars, i, 3);
                i += n;
                Token::Fraction(n as u8)
            }
            'X' => {
                let n = run_length(&chars, i, 3);
                i += n;
                match n {
                    1 => Token::OffsetHh,
                    2 => Token::OffsetHhmm,
                    _ => Token::OffsetHhColonMm,
                }
            }
            'a' => {
                i += 1;
                Token::Meridiem
            }
            'G' => {
                i += 1;
                Token::Era
            }
            'z' => {
                i += 1;
                Token::ZoneName
            }
            'Z' => {
                i += 1;
                Token::OffsetHhmm
            }
            '\'' => {
                // '' is a literal quote, otherwise a quoted run
                if chars.get(i + 1) == Some(&'\'') {
                    push_literal(&mut tokens, "'");
                    i += 2;
                    continue;
                }
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&x| x == '\'')
                    .map(|p| start + p)
                    .ok_or_else(|| Error::invalid_format(format, "unterminated quoted text"))?;
                let text: String = chars[start..end].iter().collect();
                push_literal(&mut tokens, &text);
                i = end + 1;
                continue;
            }
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| Error::invalid_format(format, "dangling escape"))?;
                push_literal(&mut tokens, &escaped.to_string());
                i += 2;
                continue;
            }
            other => {
                push_literal(&mut tokens, &other.to_string());
                i += 1;
                continue;
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn push_offset(out: &mut String, t: &DateTime<FixedOffset>, minutes: bool, colon: bool) {
    let secs = t.offset().local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.unsigned_abs();
    out.push(sign);
    out.push_str(&format!("{:02}", abs / 3600));
    if minutes {
        if colon {
            out.push(':');
        }
        out.push_str(&format!("{:02}", (abs % 3600) / 60));
    }
}

fn write_token(out: &mut String, token: &Token, t: &DateTime<FixedOffset>) {
    match token {
        Token::Year4 => out.push_str(&format!("{:04}", t.year())),
        Token::Year2 => out.push_str(&format!("{:02}", t.year().rem_euclid(100))),
        Token::Month => out.push_str(&t.month().to_string()),
        Token::Month2 => out.push_str(&format!("{:02}", t.month())),
        Token::MonthShort => out.push_str(MONTHS_SHORT[t.month0() as usize]),
        Token::MonthLong => out.push_str(MONTHS_LONG[t.month0() as usize]),
        Token::Day => out.push_str(&t.day().to_string()),
        Token::Day2 => out.push_str(&format!("{:02}", t.day())),
        Token::WeekdayShort => {
            out.push_str(WEEKDAYS_SHORT[t.weekday().num_days_from_monday() as usize])
        }
        Token::WeekdayLong => {
            out.push_str(WEEKDAYS_LONG[t.weekday().num_days_from_monday() as usize])
        }
        Token::Hour24 => out.push_str(&format!("{:02}", t.hour())),
        Token::Hour12 => out.push_str(&t.hour12().1.to_string()),
        Token::Hour12Padded => out.push_str(&format!("{:02}", t.hour12().1)),
        Token::Meridiem => out.push_str(if t.hour12().0 { "PM" } else { "AM" }),
        Token::Minute => out.push_str(&t.minute().to_string()),
        Token::Minute2 => out.push_str(&format!("{:02}", t.minute())),
        Token::Second => out.push_str(&t.second().to_string()),
        Token::Second2 => out.push_str(&format!("{:02}", t.second())),
        Token::Fraction(digits) => {
            // leap seconds report nanos >= 1e9
            let nanos = format!("{:09}", t.nanosecond() % 1_000_000_000);
            out.push('.');
            out.push_str(&nanos[..usize::from(*digits)]);
        }
        Token::Era => out.push_str("AD"),
        Token::ZoneName => {
            if t.offset().local_minus_utc() == 0 {
                out.push_str("UTC");
            } else {
                push_offset(out, t, true, false);
            }
        }
        Token::OffsetHhmm => push_offset(out, t, true, false),
        Token::OffsetHh => push_offset(out, t, false, false),
        Token::OffsetHhColonMm => push_offset(out, t, true, true),
        Token::Literal(text) => out.push_str(text),
    }
}
