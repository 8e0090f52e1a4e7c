use crate::actions::Action;
use crate::plugin::Plugin;

/// Radices offered by the converter, with their display names.
pub const BASES: [(&str, u32); 6] = [
    ("Binary", 2),
    ("Octal", 8),
    ("Decimal", 10),
    ("Hexadecimal", 16),
    ("Base 32", 32),
    ("Base 36", 36),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub name: &'static str,
    pub radix: u32,
    pub value: String,
}

pub fn is_supported(radix: u32) -> bool {
    BASES.iter().any(|(_, r)| *r == radix)
}

/// Lenient integer parse: surrounding whitespace and a sign are accepted, as
/// is `0x` for radix 16, and the longest run of valid digits is used.
pub fn parse_int_prefix(input: &str, radix: u32) -> Option<i128> {
    if !(2..=36).contains(&radix) {
        return None;
    }
    let mut s = input.trim();
    let negative = if let Some(rest) = s.strip_prefix('-') {
        s = rest;
        true
    } else {
        s = s.strip_prefix('+').unwrap_or(s);
        false
    };
    if radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
        }
    }

    let mut magnitude: i128 = 0;
    let mut digits = 0usize;
    for c in s.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        magnitude = magnitude
            .checked_mul(radix as i128)?
            .checked_add(d as i128)?;
        digits += 1;
    }
    if digits == 0 {
        return None;
    }
    Some(if negative { -magnitude } else { magnitude })
}

/// Render `value` in `radix` using uppercase digits.
pub fn to_radix(value: i128, radix: u32) -> String {
    let mut n = value.unsigned_abs();
    if n == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while n > 0 {
        let d = (n % radix as u128) as u32;
        if let Some(c) = std::char::from_digit(d, radix) {
            digits.push(c.to_ascii_uppercase());
        }
        n /= radix as u128;
    }
    if value < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// Parse `input` in `from` and render it in every supported radix.
/// Unparseable input yields no conversions.
pub fn convert_all(input: &str, from: u32) -> Vec<Conversion> {
    if !is_supported(from) {
        return Vec::new();
    }
    let Some(value) = parse_int_prefix(input, from) else {
        return Vec::new();
    };
    BASES
        .iter()
        .map(|&(name, radix)| Conversion {
            name,
            radix,
            value: to_radix(value, radix),
        })
        .collect()
}

/// Input state of the base converter view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseConverter {
    pub input: String,
    pub from: u32,
}

impl Default for BaseConverter {
    fn default() -> Self {
        Self {
            input: "255".into(),
            from: 10,
        }
    }
}

impl BaseConverter {
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Change the source radix; unsupported radices are ignored.
    pub fn set_radix(&mut self, radix: u32) -> bool {
        if is_supported(radix) {
            self.from = radix;
            true
        } else {
            tracing::warn!(radix, "ignoring unsupported radix");
            false
        }
    }

    pub fn conversions(&self) -> Vec<Conversion> {
        convert_all(&self.input, self.from)
    }
}

/// Accepts `2`, `bin`, `binary`, `hex`, `b32` and friends.
pub fn parse_radix(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    let radix = match lower.as_str() {
        "bin" | "binary" => 2,
        "oct" | "octal" => 8,
        "dec" | "decimal" => 10,
        "hex" | "hexadecimal" => 16,
        "b32" | "base32" => 32,
        "b36" | "base36" => 36,
        other => other.parse().ok()?,
    };
    is_supported(radix).then_some(radix)
}

pub struct BaseConvertPlugin;

impl Plugin for BaseConvertPlugin {
    fn search(&self, query: &str) -> Vec<Action> {
        const CONV_PREFIX: &str = "conv ";
        const CONVERT_PREFIX: &str = "convert ";
        let trimmed = query.trim_start();
        let rest = if let Some(r) = crate::common::strip_prefix_ci(trimmed, CONV_PREFIX) {
            r
        } else if let Some(r) = crate::common::strip_prefix_ci(trimmed, CONVERT_PREFIX) {
            r
        } else {
            return Vec::new();
        };
        let Some(tokens) = shlex::split(rest.trim()) else {
            return Vec::new();
        };
        let (value, from) = match tokens.as_slice() {
            [value] => (value.as_str(), 10),
            [value, radix] => match parse_radix(radix) {
                Some(r) => (value.as_str(), r),
                None => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        convert_all(value, from)
            .into_iter()
            .filter(|c| c.radix != from)
            .map(|c| Action {
                label: format!("{} = {}", c.name, c.value),
                desc: "Base Convert".into(),
                action: format!("clipboard:{}", c.value),
                args: None,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "base_convert"
    }

    fn description(&self) -> &str {
        "Convert integers between radices (prefix: `conv <value> [radix]`)"
    }

    fn commands(&self) -> Vec<Action> {
        vec![Action::new("conv", "Base Convert", "query:conv ")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_parse_matches_lenient_rules() {
        assert_eq!(parse_int_prefix("  12z ", 10), Some(12));
        assert_eq!(parse_int_prefix("-ff", 16), Some(-255));
        assert_eq!(parse_int_prefix("0xFF", 16), Some(255));
        assert_eq!(parse_int_prefix("z", 10), None);
        assert_eq!(parse_int_prefix("", 2), None);
    }

    #[test]
    fn overflow_is_a_failure() {
        let huge = "9".repeat(60);
        assert_eq!(parse_int_prefix(&huge, 10), None);
    }

    #[test]
    fn renders_uppercase() {
        assert_eq!(to_radix(255, 16), "FF");
        assert_eq!(to_radix(35, 36), "Z");
        assert_eq!(to_radix(-5, 2), "-101");
        assert_eq!(to_radix(0, 8), "0");
    }
}
