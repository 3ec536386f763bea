use adsmith::coerce::{extract_json_object, parse_numbered_lines, strip_think, with_fallback};
use adsmith::{ColorPalette, WizardError};
use spectral::prelude::*;

mod ai_extras;

assert_numbered_lines! {
    plain_list: response => "1. Hello\n2. World", result => ["Hello", "World"],
    unnumbered_lines_are_skipped:
        response => "Here are your copies:\n1. Hello\n2. World\n\nnot numbered",
        result => ["Hello", "World"],
    indented_items: response => "   1.   Spaced out  \n  10. Tenth", result => ["Spaced out", "Tenth"],
    empty_items_are_dropped: response => "1.\n2. Kept\n3.   ", result => ["Kept"],
    think_block_is_ignored:
        response => "<think>\n1. Draft that should vanish\n</think>\n1. Final copy",
        result => ["Final copy"],
    no_space_after_dot: response => "1.Tight\n2.Also tight", result => ["Tight", "Also tight"],
}

#[test]
fn numbered_lines_missing_is_a_shape_error() {
    let result = parse_numbered_lines("Nothing numbered here.\n- a bullet");

    assert_that(&matches!(result, Err(WizardError::Shape(_)))).is_true();
}

#[test]
fn think_blocks_are_stripped() {
    assert_that(&strip_think("<think>\nhmm\n</think>\n\nAnswer  ")).is_equal_to("Answer".to_owned());
    assert_that(&strip_think("No reasoning")).is_equal_to("No reasoning".to_owned());
}

#[test]
fn json_object_is_found_inside_chatter() {
    let palette: ColorPalette = extract_json_object(
        "Sure!\n```json\n{\"main\":\"#000000\",\"accent\":\"#111111\",\"base\":\"#222222\"}\n```\nEnjoy.",
    )
    .expect("Expected a palette.");

    assert_that(&palette.accent).is_equal_to("#111111".to_owned());
}

#[test]
fn missing_json_object_is_a_shape_error() {
    let result = extract_json_object::<ColorPalette>("no braces at all");

    assert_that(&matches!(result, Err(WizardError::Shape(_)))).is_true();
}

#[test]
fn malformed_json_object_is_a_shape_error() {
    let result = extract_json_object::<ColorPalette>("{\"main\": \"#000000\", oops}");

    assert_that(&matches!(result, Err(WizardError::Shape(_)))).is_true();
}

#[test]
fn fallback_flag_follows_the_result() {
    let live = with_fallback("test", Ok(1), || 2);
    let substitute = with_fallback("test", Err(WizardError::upstream("down")), || 2);

    assert_that(&live.value).is_equal_to(1);
    assert_that(&live.fallback).is_false();
    assert_that(&substitute.value).is_equal_to(2);
    assert_that(&substitute.fallback).is_true();
}
