//! Number format types and display formatting

use crate::cell::serial_to_datetime;

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 0 - General
    pub const ID_GENERAL: u32 = 0;
    /// 1 - 0
    pub const ID_NUMBER_INT: u32 = 1;
    /// 2 - 0.00
    pub const ID_NUMBER_DEC2: u32 = 2;
    /// 3 - #,##0
    pub const ID_NUMBER_SEP: u32 = 3;
    /// 4 - #,##0.00
    pub const ID_NUMBER_SEP_DEC2: u32 = 4;
    /// 9 - 0%
    pub const ID_PERCENT_INT: u32 = 9;
    /// 10 - 0.00%
    pub const ID_PERCENT_DEC2: u32 = 10;
    /// 11 - 0.00E+00
    pub const ID_SCIENTIFIC: u32 = 11;
    /// 14 - mm-dd-yy
    pub const ID_DATE_SHORT: u32 = 14;
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u32 = 22;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    /// Date and time (m/d/yy h:mm), the default style for streamed timestamps
    pub fn datetime() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATETIME)
    }

    /// Get the format code
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => builtin_format_string(*id).unwrap_or("General"),
            NumberFormat::Custom(s) => s,
        }
    }

    /// Numeric id to write as `numFmtId`, or `None` for custom codes
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(Self::ID_GENERAL),
            NumberFormat::BuiltIn(id) => Some(*id),
            NumberFormat::Custom(_) => None,
        }
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        matches!(self.display_id(), 14..=22)
    }

    /// The built-in format this one displays as; unrecognized custom codes
    /// fall back to General.
    fn display_id(&self) -> u32 {
        match self {
            NumberFormat::General => 0,
            NumberFormat::BuiltIn(id) => *id,
            NumberFormat::Custom(code) => (0..=49)
                .find(|id| builtin_format_string(*id) == Some(code.as_str()))
                .unwrap_or(0),
        }
    }

    /// Render a numeric cell value as text under this format.
    ///
    /// ```
    /// use streamsheet_core::NumberFormat;
    ///
    /// assert_eq!(NumberFormat::BuiltIn(4).format_value(1234.5, false), "1,234.50");
    /// assert_eq!(NumberFormat::General.format_value(0.1 + 0.2, false), "0.3");
    /// ```
    pub fn format_value(&self, value: f64, date_1904: bool) -> String {
        if !value.is_finite() {
            return format_general(value);
        }
        match self.display_id() {
            1 => format_fixed(value, 0),
            2 => format_fixed(value, 2),
            3 => with_thousands(&format_fixed(value, 0)),
            4 => with_thousands(&format_fixed(value, 2)),
            9 => format!("{}%", format_fixed(value * 100.0, 0)),
            10 => format!("{}%", format_fixed(value * 100.0, 2)),
            11 => format_scientific(value),
            id @ 14..=22 => match serial_to_datetime(value, date_1904) {
                Some(dt) => dt.format(date_pattern(id)).to_string(),
                None => format_general(value),
            },
            _ => format_general(value),
        }
    }
}

fn builtin_format_string(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

fn date_pattern(id: u32) -> &'static str {
    match id {
        14 => "%m-%d-%y",
        15 => "%-d-%b-%y",
        16 => "%-d-%b",
        17 => "%b-%y",
        18 => "%-I:%M %p",
        19 => "%-I:%M:%S %p",
        20 => "%-H:%M",
        21 => "%-H:%M:%S",
        _ => "%-m/%-d/%y %-H:%M",
    }
}

/// Round half away from zero, then print with a fixed number of decimals
fn format_fixed(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    let text = format!("{:.*}", decimals, rounded);
    if text.starts_with('-') && text[1..].bytes().all(|b| b == b'0' || b == b'.') {
        text[1..].to_string()
    } else {
        text
    }
}

fn with_thousands(fixed: &str) -> String {
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn format_scientific(value: f64) -> String {
    let text = format!("{:.2e}", value);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}E{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// General display: integers without a fraction, everything else rounded
/// to 15 significant digits.
pub(crate) fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let rounded: f64 = format!("{:.14e}", value).parse().unwrap_or(value);
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general() {
        assert_eq!(NumberFormat::General.format_value(42.0, false), "42");
        assert_eq!(NumberFormat::General.format_value(-7.25, false), "-7.25");
        assert_eq!(NumberFormat::General.format_value(1.0 / 3.0, false), "0.333333333333333");
    }

    #[test]
    fn test_fixed_and_thousands() {
        assert_eq!(NumberFormat::BuiltIn(1).format_value(2.5, false), "3");
        assert_eq!(NumberFormat::BuiltIn(2).format_value(3.14159, false), "3.14");
        assert_eq!(NumberFormat::BuiltIn(3).format_value(1234567.0, false), "1,234,567");
        assert_eq!(NumberFormat::BuiltIn(4).format_value(-1234.5, false), "-1,234.50");
        assert_eq!(NumberFormat::BuiltIn(3).format_value(999.0, false), "999");
    }

    #[test]
    fn test_percent_and_scientific() {
        assert_eq!(NumberFormat::BuiltIn(9).format_value(0.256, false), "26%");
        assert_eq!(NumberFormat::BuiltIn(10).format_value(0.256, false), "25.60%");
        assert_eq!(NumberFormat::BuiltIn(11).format_value(12345.678, false), "1.23E+04");
        assert_eq!(NumberFormat::BuiltIn(11).format_value(0.00012, false), "1.20E-04");
    }

    #[test]
    fn test_dates() {
        assert_eq!(NumberFormat::BuiltIn(14).format_value(44927.0, false), "01-01-23");
        assert_eq!(NumberFormat::datetime().format_value(44927.5, false), "1/1/23 12:00");
        assert_eq!(NumberFormat::BuiltIn(20).format_value(0.75, false), "18:00");
        assert_eq!(NumberFormat::BuiltIn(14).format_value(43465.0, true), "01-01-23");
    }

    #[test]
    fn test_custom_matching_builtin() {
        let fmt = NumberFormat::Custom("0.00".into());
        assert_eq!(fmt.format_value(2.0, false), "2.00");

        let fmt = NumberFormat::Custom("[Blue]0.0".into());
        assert_eq!(fmt.format_value(2.0, false), "2");
    }

    #[test]
    fn test_is_date_format() {
        assert!(NumberFormat::datetime().is_date_format());
        assert!(NumberFormat::Custom("mm-dd-yy".into()).is_date_format());
        assert!(!NumberFormat::BuiltIn(4).is_date_format());
    }
}
