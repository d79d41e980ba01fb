//! Direct tests of the value domain: promotion, elementwise list
//! arithmetic, subscripting, truthiness, and rendering.

use di_core::ast::CmpOp;
use di_core::error::ErrorKind;
use di_core::value::Value;
use indexmap::IndexMap;
use num_bigint::BigInt;

fn int(v: i64) -> Value {
    Value::int(v)
}

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().map(|v| int(*v)).collect())
}

// ============================================================================
// Numeric promotion
// ============================================================================

#[test]
fn int_plus_int_stays_int() {
    assert_eq!(int(2).add(&int(3)).expect("add"), int(5));
}

#[test]
fn int_plus_float_promotes() {
    assert_eq!(int(2).add(&Value::Float(0.5)).expect("add"), Value::Float(2.5));
}

#[test]
fn bool_acts_as_zero_or_one() {
    assert_eq!(Value::Bool(true).add(&int(2)).expect("add"), int(3));
    assert_eq!(Value::Bool(false).mul(&int(9)).expect("mul"), int(0));
}

#[test]
fn division_by_zero_is_reported() {
    let err = int(1).div(&int(0)).expect_err("expected zero division");
    assert_eq!(err.kind, ErrorKind::ZeroDivision);
    let err = Value::Float(1.0)
        .rem(&Value::Float(0.0))
        .expect_err("expected zero division");
    assert_eq!(err.kind, ErrorKind::ZeroDivision);
}

#[test]
fn mixed_type_arithmetic_is_a_type_error() {
    let err = int(1).add(&Value::Null).expect_err("expected type error");
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("int") && err.message.contains("null"));
}

#[test]
fn huge_integers_round_trip_through_arithmetic() {
    let huge: BigInt = "99999999999999999999999999".parse().expect("bigint");
    let value = Value::Int(huge.clone());
    assert_eq!(
        value.add(&int(1)).expect("add"),
        Value::Int(huge + BigInt::from(1))
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn string_operations() {
    let hello = Value::str("hello");
    assert_eq!(hello.add(&Value::str(" world")).expect("concat"), Value::str("hello world"));
    assert_eq!(Value::str("ab").mul(&int(2)).expect("repeat"), Value::str("abab"));
    assert_eq!(hello.length().expect("length"), int(5));
    assert_eq!(hello.index(&int(1)).expect("index"), Value::str("e"));
    assert_eq!(hello.index(&int(-1)).expect("index"), Value::str("o"));
}

#[test]
fn strings_do_not_support_item_assignment() {
    let err = Value::str("abc")
        .set_index(&int(0), Value::str("x"))
        .expect_err("expected type error");
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn string_length_counts_code_points() {
    assert_eq!(Value::str("héllo").length().expect("length"), int(5));
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn elementwise_arithmetic_requires_equal_lengths() {
    let err = ints(&[1, 2]).add(&ints(&[1])).expect_err("expected value error");
    assert_eq!(err.kind, ErrorKind::Value);
}

#[test]
fn nested_lists_combine_recursively() {
    let a = Value::list(vec![ints(&[1, 2]), ints(&[3, 4])]);
    let b = Value::list(vec![ints(&[10, 20]), ints(&[30, 40])]);
    assert_eq!(
        a.add(&b).expect("add"),
        Value::list(vec![ints(&[11, 22]), ints(&[33, 44])])
    );
}

#[test]
fn index_bounds_are_symmetric() {
    let xs = ints(&[10, 20, 30]);
    assert_eq!(xs.index(&int(0)).expect("index"), int(10));
    assert_eq!(xs.index(&int(-3)).expect("index"), int(10));
    assert_eq!(xs.index(&int(2)).expect("index"), int(30));
    assert!(xs.index(&int(3)).is_err());
    assert!(xs.index(&int(-4)).is_err());
}

#[test]
fn out_of_range_hint_names_the_valid_window() {
    let err = ints(&[1, 2, 3]).index(&int(7)).expect_err("expected index error");
    assert_eq!(err.kind, ErrorKind::Index);
    assert!(err.message.contains("size is 3"), "{}", err.message);
}

#[test]
fn non_integer_index_is_a_type_error() {
    let err = ints(&[1]).index(&Value::Float(0.5)).expect_err("expected type error");
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn matmul_checks_rectangularity() {
    let ragged = Value::list(vec![ints(&[1, 2]), ints(&[3])]);
    let square = Value::list(vec![ints(&[1, 0]), ints(&[0, 1])]);
    let err = ragged.matmul(&square).expect_err("expected value error");
    assert_eq!(err.kind, ErrorKind::Value);
}

// ============================================================================
// Dicts
// ============================================================================

#[test]
fn dict_reads_by_key_and_attribute() {
    let mut entries = IndexMap::new();
    entries.insert("name".to_string(), Value::str("Ada"));
    entries.insert("age".to_string(), int(36));
    let d = Value::dict(entries);
    assert_eq!(d.index(&Value::str("name")).expect("index"), Value::str("Ada"));
    assert_eq!(d.attr("age").expect("attr"), int(36));
    assert_eq!(d.length().expect("length"), int(2));
}

#[test]
fn missing_dict_key_is_an_index_error() {
    let d = Value::dict(IndexMap::new());
    assert_eq!(d.index(&Value::str("x")).expect_err("err").kind, ErrorKind::Index);
    assert_eq!(d.attr("x").expect_err("err").kind, ErrorKind::Index);
}

#[test]
fn dict_insertion_order_is_preserved() {
    let d = Value::dict(IndexMap::new());
    d.set_attr("z", int(1)).expect("set");
    d.set_attr("a", int(2)).expect("set");
    d.set_attr("m", int(3)).expect("set");
    assert_eq!(d.repr(), "{z: 1, a: 2, m: 3}");
}

// ============================================================================
// Truthiness and equality
// ============================================================================

#[test]
fn truthiness_table() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(!int(0).is_truthy());
    assert!(!Value::Float(0.0).is_truthy());
    assert!(!Value::Float(f64::NAN).is_truthy());
    assert!(!Value::str("").is_truthy());
    assert!(!Value::list(vec![]).is_truthy());
    assert!(!Value::dict(IndexMap::new()).is_truthy());

    assert!(Value::Bool(true).is_truthy());
    assert!(int(-1).is_truthy());
    assert!(Value::Float(0.1).is_truthy());
    assert!(Value::str("0").is_truthy());
    assert!(Value::list(vec![int(0)]).is_truthy());
}

#[test]
fn equality_crosses_the_numeric_tower() {
    assert_eq!(int(4), Value::Float(4.0));
    assert_eq!(Value::Bool(true), int(1));
    assert_ne!(int(1), Value::str("1"));
    assert_ne!(Value::Null, int(0));
}

#[test]
fn comparison_of_complex_values_is_a_type_error() {
    let c = Value::Complex(num_complex::Complex64::new(1.0, 1.0));
    let err = c.compare(CmpOp::Lt, &int(1)).expect_err("expected type error");
    assert_eq!(err.kind, ErrorKind::Type);
    // Equality still works.
    assert!(c.compare(CmpOp::Ne, &int(1)).expect("ne"));
}

#[test]
fn nan_compares_false_everywhere() {
    let nan = Value::Float(f64::NAN);
    assert!(!nan.compare(CmpOp::Lt, &int(1)).expect("lt"));
    assert!(!nan.compare(CmpOp::Ge, &int(1)).expect("ge"));
    assert!(!nan.compare(CmpOp::Eq, &nan).expect("eq"));
}

#[test]
fn list_ordering_is_lexicographic() {
    assert!(ints(&[1, 2]).compare(CmpOp::Lt, &ints(&[1, 3])).expect("lt"));
    assert!(ints(&[1, 2]).compare(CmpOp::Lt, &ints(&[1, 2, 0])).expect("lt"));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn display_renders_each_variant() {
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(int(42).to_string(), "42");
    assert_eq!(Value::Float(3.5).to_string(), "3.5");
    assert_eq!(Value::Float(4.0).to_string(), "4.0");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(ints(&[1, 2]).to_string(), "[1, 2]");
}

#[test]
fn strings_print_bare_at_top_level_but_quoted_inside() {
    let s = Value::str("hi");
    assert_eq!(s.to_string(), "hi");
    assert_eq!(Value::list(vec![s]).to_string(), "[\"hi\"]");
}

#[test]
fn repr_escapes_string_contents() {
    assert_eq!(Value::str("a\"b\\c").repr(), "\"a\\\"b\\\\c\"");
}
