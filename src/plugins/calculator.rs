use crate::actions::Action;
use crate::history::{BoundedHistory, HISTORY_LIMIT};
use crate::hotkey::Key;
use crate::plugin::Plugin;
use once_cell::sync::Lazy;
use regex::Regex;

/// Shown on the display when an evaluation fails.
pub const ERROR_TOKEN: &str = "Error";

// Anything outside digits, the four operators, parentheses and the decimal
// point is dropped before evaluation.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^-()\d/*+.]").unwrap_or_else(|e| panic!("invalid sanitizer pattern: {e}"))
});

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("invalid expression: {0}")]
    Parse(String),
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcKey {
    Digit(char),
    Dot,
    Op(Operator),
    Percent,
    ToggleSign,
    Clear,
    Backspace,
    Evaluate,
}

impl CalcKey {
    /// Keyboard mapping used when the calculator view has focus.
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Enter => Some(CalcKey::Evaluate),
            Key::Escape => Some(CalcKey::Clear),
            Key::Backspace => Some(CalcKey::Backspace),
            Key::Char(c) => Self::from_char(c),
            _ => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(CalcKey::Digit(c)),
            '.' => Some(CalcKey::Dot),
            '=' => Some(CalcKey::Evaluate),
            '%' => Some(CalcKey::Percent),
            'c' | 'C' => Some(CalcKey::Clear),
            _ => Operator::from_char(c).map(CalcKey::Op),
        }
    }
}

/// Strip every character the evaluator must never see.
pub fn sanitize(expr: &str) -> String {
    DISALLOWED.replace_all(expr, "").into_owned()
}

pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    let sanitized = sanitize(expr);
    if sanitized.trim().is_empty() {
        return Err(CalcError::Empty);
    }
    let value =
        exmex::eval_str::<f64>(&sanitized).map_err(|e| CalcError::Parse(e.to_string()))?;
    if !value.is_finite() {
        return Err(CalcError::NonFinite);
    }
    Ok(value)
}

/// Integral values print without a decimal point; others are rounded to four
/// places with trailing zeros removed.
pub fn format_result(value: f64) -> String {
    let out = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let fixed = format!("{value:.4}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    if out == "-0" {
        "0".into()
    } else {
        out
    }
}

fn is_operator(c: char) -> bool {
    Operator::from_char(c).is_some()
}

/// Split the operand at the end of `prefix` off, returning `(rest, operand)`.
fn split_trailing_operand(prefix: &str) -> (String, String) {
    if prefix.ends_with(')') {
        if let Some(open) = prefix.rfind('(') {
            let inner = &prefix[open + 1..prefix.len() - 1];
            return (prefix[..open].to_string(), inner.to_string());
        }
    }
    let start = prefix
        .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let (rest, operand) = prefix.split_at(start);
    if rest == "-" {
        return (String::new(), prefix.to_string());
    }
    (rest.to_string(), operand.to_string())
}

#[derive(Debug, Clone)]
pub struct Calculator {
    /// Completed part of the expression, ending with an operator when non-empty.
    prefix: String,
    display: String,
    /// Whether `display` is the operand currently being typed.
    operand_active: bool,
    should_reset: bool,
    history: BoundedHistory<String>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl Calculator {
    pub fn new(history_limit: usize) -> Self {
        Self {
            prefix: String::new(),
            display: "0".into(),
            operand_active: false,
            should_reset: false,
            history: BoundedHistory::new(history_limit),
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// The accumulated expression as shown above the display.
    pub fn equation(&self) -> String {
        if self.operand_active {
            format!("{}{}", self.prefix, self.render_operand())
        } else {
            self.prefix.clone()
        }
    }

    pub fn history(&self) -> &BoundedHistory<String> {
        &self.history
    }

    fn render_operand(&self) -> String {
        if !self.prefix.is_empty() && self.display.starts_with('-') {
            format!("({})", self.display)
        } else {
            self.display.clone()
        }
    }

    fn start_operand(&mut self, text: &str) {
        if self.should_reset {
            self.prefix.clear();
            self.should_reset = false;
        }
        self.display = text.to_string();
        self.operand_active = true;
    }

    pub fn press(&mut self, key: CalcKey) {
        match key {
            CalcKey::Digit(d) => self.digit(d),
            CalcKey::Dot => self.dot(),
            CalcKey::Op(op) => self.operator(op),
            CalcKey::Percent => self.percent(),
            CalcKey::ToggleSign => self.toggle_sign(),
            CalcKey::Clear => self.clear(),
            CalcKey::Backspace => self.backspace(),
            CalcKey::Evaluate => {
                let _ = self.evaluate();
            }
        }
    }

    /// Feed every recognised character of `input` as a key press.
    pub fn type_str(&mut self, input: &str) {
        for c in input.chars() {
            if let Some(key) = CalcKey::from_char(c) {
                self.press(key);
            }
        }
    }

    fn digit(&mut self, d: char) {
        if self.should_reset || !self.operand_active {
            self.start_operand(&d.to_string());
        } else if self.display == "0" {
            self.display = d.to_string();
        } else if self.display == "-0" {
            self.display = format!("-{d}");
        } else {
            self.display.push(d);
        }
    }

    fn dot(&mut self) {
        if self.should_reset || !self.operand_active {
            self.start_operand("0.");
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    fn operator(&mut self, op: Operator) {
        if self.display == ERROR_TOKEN {
            self.prefix.clear();
            self.display = "0".into();
            self.operand_active = true;
        }
        self.should_reset = false;
        if self.operand_active {
            let operand = self.render_operand();
            self.prefix.push_str(&operand);
            self.operand_active = false;
        } else if self.prefix.ends_with(is_operator) {
            self.prefix.pop();
        } else if self.prefix.is_empty() {
            let operand = self.render_operand();
            self.prefix.push_str(&operand);
        }
        self.prefix.push(op.symbol());
    }

    fn percent(&mut self) {
        let Ok(value) = self.display.parse::<f64>() else {
            return;
        };
        if !self.operand_active && !self.prefix.is_empty() {
            return;
        }
        self.display = format!("{}", value / 100.0);
        self.operand_active = true;
    }

    fn toggle_sign(&mut self) {
        if self.display.parse::<f64>().is_err() {
            return;
        }
        if !self.operand_active && !self.prefix.is_empty() {
            return;
        }
        if let Some(positive) = self.display.strip_prefix('-') {
            self.display = positive.to_string();
        } else {
            self.display = format!("-{}", self.display);
        }
        self.operand_active = true;
    }

    pub fn clear(&mut self) {
        self.prefix.clear();
        self.display = "0".into();
        self.operand_active = false;
        self.should_reset = false;
    }

    fn backspace(&mut self) {
        if self.display == ERROR_TOKEN {
            self.clear();
            return;
        }
        if self.operand_active {
            self.display.pop();
            if self.display.is_empty() || self.display == "-" {
                self.display = "0".into();
                self.operand_active = false;
            }
            return;
        }
        if self.prefix.ends_with(is_operator) {
            self.prefix.pop();
            let (rest, operand) = split_trailing_operand(&self.prefix);
            self.prefix = rest;
            if !operand.is_empty() {
                self.display = operand;
                self.operand_active = true;
            }
        }
    }

    /// Evaluate the accumulated expression. On success one history entry is
    /// recorded and the result becomes the new operand.
    pub fn evaluate(&mut self) -> Result<String, CalcError> {
        let equation = self.equation();
        match evaluate(&equation) {
            Ok(value) => {
                let result = format_result(value);
                self.history.push_front(format!("{equation} = {result}"));
                tracing::debug!(%equation, %result, "calculator evaluated");
                self.prefix.clear();
                self.display = result.clone();
                self.operand_active = true;
                self.should_reset = true;
                Ok(result)
            }
            Err(e) => {
                tracing::debug!(%equation, "calculator evaluation failed: {e}");
                self.prefix.clear();
                self.display = ERROR_TOKEN.into();
                self.operand_active = false;
                self.should_reset = true;
                Err(e)
            }
        }
    }
}

#[derive(Default)]
pub struct CalculatorPlugin;

impl Plugin for CalculatorPlugin {
    fn search(&self, query: &str) -> Vec<Action> {
        let trimmed = query.trim();
        let Some(rest) = trimmed.strip_prefix('=') else {
            return Vec::new();
        };
        let expr = rest.trim();
        if expr.is_empty() {
            return Vec::new();
        }
        match evaluate(expr) {
            Ok(v) => {
                let result = format_result(v);
                vec![Action {
                    label: format!("{} = {}", sanitize(expr), result),
                    desc: "Calculator".into(),
                    action: format!("clipboard:{result}"),
                    args: None,
                }]
            }
            Err(_) => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate arithmetic expressions (prefix: `=`)"
    }

    fn commands(&self) -> Vec<Action> {
        vec![Action::new("=", "Calculator", "query:= ")]
    }
}
