//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Month names for one language
#[derive(Debug)]
pub struct Locale {
    pub code: &'static str,
    pub months: [&'static str; 12],
    pub months_short: [&'static str; 12],
}

pub static PT_BR: Locale = Locale {
    code: "pt-BR",
    months: [
        "Janeiro",
        "Fevereiro",
        "Março",
        "Abril",
        "Maio",
        "Junho",
        "Julho",
        "Agosto",
        "Setembro",
        "Outubro",
        "Novembro",
        "Dezembro",
    ],
    months_short: [
        "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
    ],
};

pub static EN: Locale = Locale {
    code: "en",
    months: [
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
    ],
    months_short: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
};

/// Pick the locale for a language tag, defaulting to English
pub fn locale_for(language: &str) -> &'static Locale {
    let lang = language.to_ascii_lowercase();
    if lang == "pt" || lang.starts_with("pt-") || lang.starts_with("pt_") {
        &PT_BR
    } else {
        &EN
    }
}

/// Parse a publication timestamp as sent by the content API
///
/// Accepts `2023-04-19T13:05:00+0000`, RFC 3339 and bare `2023-04-19` dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
}

/// Format a date with a date-fns style pattern
///
/// Supported tokens: `d dd`, `M MM MMM MMMM`, `yy yyyy`, `H HH`, `mm`, `ss`.
/// Text inside single quotes is copied verbatim.
///
/// # Examples
/// ```ignore
/// format_pattern(&date, "dd MMM yyyy", &PT_BR) // -> "19 Abr 2023"
/// ```
pub fn format_pattern<Tz2: TimeZone>(date: &DateTime<Tz2>, pattern: &str, locale: &Locale) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut result = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is an escaped quote
            if chars.get(i + 1) == Some(&'\'') {
                result.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        result.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                result.push(chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            result.push(c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let month = date.month0() as usize;
        let token = match (c, run) {
            ('d', 1) => date.day().to_string(),
            ('d', _) => format!("{:02}", date.day()),
            ('M', 1) => date.month().to_string(),
            ('M', 2) => format!("{:02}", date.month()),
            ('M', 3) => locale.months_short[month].to_string(),
            ('M', _) => locale.months[month].to_string(),
            ('y', 2) => format!("{:02}", date.year().rem_euclid(100)),
            ('y', _) => format!("{:04}", date.year()),
            ('H', 1) => date.hour().to_string(),
            ('H', _) => format!("{:02}", date.hour()),
            ('m', 1) => date.minute().to_string(),
            ('m', _) => format!("{:02}", date.minute()),
            ('s', 1) => date.second().to_string(),
            ('s', _) => format!("{:02}", date.second()),
            _ => std::iter::repeat(c).take(run).collect(),
        };
        result.push_str(&token);
        i += run;
    }

    result
}

/// Formats publication dates for display
#[derive(Debug, Clone)]
pub struct DateFormatter {
    pattern: String,
    locale: &'static Locale,
    timezone: Tz,
}

impl DateFormatter {
    /// Create a formatter; an empty timezone means UTC
    pub fn new(pattern: &str, language: &str, timezone: &str) -> Result<Self> {
        let timezone = if timezone.trim().is_empty() {
            Tz::UTC
        } else {
            timezone
                .trim()
                .parse::<Tz>()
                .map_err(|_| anyhow!("Unknown timezone: {}", timezone))?
        };

        Ok(Self {
            pattern: pattern.to_string(),
            locale: locale_for(language),
            timezone,
        })
    }

    /// Create a formatter from the site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(&config.date_format, &config.language, &config.timezone)
    }

    pub fn locale(&self) -> &'static Locale {
        self.locale
    }

    /// Format an API timestamp
    ///
    /// `None` stays `None`; an unparseable timestamp is dropped rather than shown raw.
    pub fn format(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw?;
        match parse_timestamp(raw) {
            Some(date) => {
                let local = date.with_timezone(&self.timezone);
                Some(format_pattern(&local, &self.pattern, self.locale))
            }
            None => {
                tracing::warn!("Ignoring unparseable publication date {:?}", raw);
                None
            }
        }
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            pattern: "dd MMM yyyy".to_string(),
            locale: &PT_BR,
            timezone: Tz::UTC,
        }
    }
}
