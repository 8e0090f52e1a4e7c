use multi_toolbox::hotkey::Key;
use multi_toolbox::plugin::Plugin;
use multi_toolbox::plugins::calculator::{CalcKey, Calculator, CalculatorPlugin, ERROR_TOKEN};

#[test]
fn simple_addition() {
    let mut calc = Calculator::default();
    calc.type_str("2+3=");
    assert_eq!(calc.display(), "5");
    assert_eq!(calc.history().get(0).map(String::as_str), Some("2+3 = 5"));
}

#[test]
fn division_by_zero_is_an_error() {
    let mut calc = Calculator::default();
    calc.type_str("1/0=");
    assert_eq!(calc.display(), ERROR_TOKEN);
    assert_eq!(calc.equation(), "");
    assert!(calc.history().is_empty());
    calc.press(CalcKey::Digit('4'));
    assert_eq!(calc.display(), "4");
}

#[test]
fn results_are_rounded_to_four_places() {
    let mut calc = Calculator::default();
    calc.type_str("1/3=");
    assert_eq!(calc.display(), "0.3333");
    calc.type_str("10/4=");
    assert_eq!(calc.display(), "2.5");
}

#[test]
fn operator_starts_a_fresh_operand() {
    let mut calc = Calculator::default();
    calc.type_str("12+3");
    assert_eq!(calc.display(), "3");
    assert_eq!(calc.equation(), "12+3");
}

#[test]
fn repeated_operator_replaces_previous() {
    let mut calc = Calculator::default();
    calc.type_str("6+*2=");
    assert_eq!(calc.display(), "12");
}

#[test]
fn second_decimal_point_is_ignored() {
    let mut calc = Calculator::default();
    calc.type_str("1.2.3");
    assert_eq!(calc.display(), "1.23");
    calc.press(CalcKey::Clear);
    calc.press(CalcKey::Dot);
    assert_eq!(calc.display(), "0.");
}

#[test]
fn sign_toggle_applies_to_current_operand() {
    let mut calc = Calculator::default();
    calc.type_str("5+3");
    calc.press(CalcKey::ToggleSign);
    assert_eq!(calc.equation(), "5+(-3)");
    calc.press(CalcKey::Evaluate);
    assert_eq!(calc.display(), "2");
}

#[test]
fn percent_divides_display() {
    let mut calc = Calculator::default();
    calc.type_str("50%");
    assert_eq!(calc.display(), "0.5");
    assert_eq!(calc.equation(), "0.5");
}

#[test]
fn backspace_walks_back_over_operator() {
    let mut calc = Calculator::default();
    calc.type_str("12+");
    calc.press(CalcKey::Backspace);
    assert_eq!(calc.equation(), "12");
    assert_eq!(calc.display(), "12");
    calc.press(CalcKey::Backspace);
    assert_eq!(calc.display(), "1");
}

#[test]
fn result_can_be_continued_or_replaced() {
    let mut calc = Calculator::default();
    calc.type_str("2+3=*2=");
    assert_eq!(calc.display(), "10");
    calc.type_str("7");
    assert_eq!(calc.display(), "7");
    assert_eq!(calc.equation(), "7");
}

#[test]
fn history_is_capped_newest_first() {
    let mut calc = Calculator::default();
    for i in 0..12 {
        calc.type_str(&format!("{i}+1="));
    }
    assert_eq!(calc.history().len(), 10);
    assert_eq!(calc.history().get(0).map(String::as_str), Some("11+1 = 12"));
}

#[test]
fn keyboard_mapping() {
    assert_eq!(CalcKey::from_key(Key::Enter), Some(CalcKey::Evaluate));
    assert_eq!(CalcKey::from_key(Key::Escape), Some(CalcKey::Clear));
    assert_eq!(CalcKey::from_key(Key::Char('C')), Some(CalcKey::Clear));
    assert_eq!(CalcKey::from_key(Key::Char('=')), Some(CalcKey::Evaluate));
    assert_eq!(CalcKey::from_key(Key::Backspace), Some(CalcKey::Backspace));
    assert_eq!(CalcKey::from_key(Key::Tab), None);
}

#[test]
fn plugin_evaluates_query() {
    let plugin = CalculatorPlugin;
    let results = plugin.search("= 2*(3+4)");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "2*(3+4) = 14");
    assert_eq!(results[0].action, "clipboard:14");
}

#[test]
fn plugin_ignores_letters_only() {
    let plugin = CalculatorPlugin;
    assert!(plugin.search("=abc").is_empty());
    assert!(plugin.search("2+2").is_empty());
}
