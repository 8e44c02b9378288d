//! Accumulator framework
//!
//! Stateful per-group reducers looked up by operator name.
//!
//! # Operators
//!
//! | name | empty result | partial form |
//! |------|--------------|--------------|
//! | `$first`, `$last` | null | `[]` or `[value]` |
//! | `$sum` | `0` | number |
//! | `$avg` | null | `{sum, count}` |
//! | `$min`, `$max` | null | value or null |
//! | `$push`, `$addToSet` | `[]` | array |
//! | `$count` | `0` | integer |
//!
//! Missing inputs are dropped, except by `$count` (which counts them) and
//! by `$push`/`$addToSet` when `record_missing` is set (recorded as null).

#[allow(clippy::module_inception)]
mod accumulator;
mod errors;
mod registry;
mod state;

pub use accumulator::{Accumulator, AccumulatorOptions};
pub use errors::{AccumulatorError, AccumulatorResult};
pub use registry::registered_names;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Value;

    /// Runs each case three ways: one accumulator over every input, one
    /// partition merged into a final accumulator, and one partition per
    /// input merged in order. All three must agree in value and type.
    fn assert_results(name: &str, cases: Vec<(Vec<Option<Value>>, Value)>) {
        let options = AccumulatorOptions::default();
        let create = || Accumulator::create(name, &options).unwrap();

        for (inputs, expected) in cases {
            let mut direct = create();
            for input in &inputs {
                direct.process(input.as_ref()).unwrap();
            }
            assert_same(name, &inputs, &expected, &direct.get_value());

            let mut shard = create();
            for input in &inputs {
                shard.process(input.as_ref()).unwrap();
            }
            let mut merged = create();
            merged.merge_partial(&shard.partial_value()).unwrap();
            assert_same(name, &inputs, &expected, &merged.get_value());

            let mut merged = create();
            for input in &inputs {
                let mut shard = create();
                shard.process(input.as_ref()).unwrap();
                merged.merge_partial(&shard.partial_value()).unwrap();
            }
            assert_same(name, &inputs, &expected, &merged.get_value());
        }
    }

    fn assert_same(name: &str, inputs: &[Option<Value>], expected: &Value, actual: &Value) {
        assert_eq!(expected, actual, "{name} over {inputs:?}");
        assert_eq!(
            expected.type_name(),
            actual.type_name(),
            "{name} over {inputs:?}"
        );
    }

    fn int(i: i64) -> Option<Value> {
        Some(Value::Int(i))
    }

    fn double(d: f64) -> Option<Value> {
        Some(Value::Double(d))
    }

    fn string(s: &str) -> Option<Value> {
        Some(Value::String(s.to_string()))
    }

    #[test]
    fn test_last() {
        assert_results(
            "$last",
            vec![
                (vec![], Value::Null),
                (vec![int(5)], Value::Int(5)),
                (vec![int(3), int(7), int(2)], Value::Int(2)),
                (vec![int(5), None], Value::Int(5)),
                (vec![int(5), Some(Value::Null)], Value::Null),
            ],
        );
    }

    #[test]
    fn test_first() {
        assert_results(
            "$first",
            vec![
                (vec![], Value::Null),
                (vec![int(5), int(7)], Value::Int(5)),
                (vec![None, int(7)], Value::Int(7)),
                (vec![Some(Value::Null), int(7)], Value::Null),
            ],
        );
    }

    #[test]
    fn test_sum() {
        assert_results(
            "$sum",
            vec![
                (vec![], Value::Int(0)),
                (vec![int(10)], Value::Int(10)),
                (vec![double(7.5)], Value::Double(7.5)),
                (vec![int(4), int(5)], Value::Int(9)),
                (vec![int(4), double(5.5)], Value::Double(9.5)),
                (vec![double(2.5), double(5.5)], Value::Double(8.0)),
                (vec![int(5), int(-8)], Value::Int(-3)),
                (
                    vec![int(i64::MAX), int(i64::MAX)],
                    Value::Double(i64::MAX as f64 * 2.0),
                ),
                (vec![int(5), Some(Value::Null)], Value::Int(5)),
                (vec![int(9), None], Value::Int(9)),
                (vec![int(9), string("x")], Value::Int(9)),
                (vec![double(f64::NAN)], Value::Double(f64::NAN)),
            ],
        );
    }

    #[test]
    fn test_avg() {
        assert_results(
            "$avg",
            vec![
                (vec![], Value::Null),
                (vec![int(3)], Value::Double(3.0)),
                (vec![int(10), int(11)], Value::Double(10.5)),
                (vec![int(10), double(11.0)], Value::Double(10.5)),
                (vec![int(1), int(2), double(6.0)], Value::Double(3.0)),
                (
                    vec![int(i64::MAX), int(i64::MAX)],
                    Value::Double(i64::MAX as f64),
                ),
                (vec![int(4), None, Some(Value::Null)], Value::Double(4.0)),
            ],
        );
    }

    #[test]
    fn test_min_and_max() {
        assert_results(
            "$min",
            vec![
                (vec![], Value::Null),
                (vec![int(3), int(1), int(2)], Value::Int(1)),
                (vec![string("a"), int(9)], Value::Int(9)),
                (vec![None, Some(Value::Null), int(4)], Value::Int(4)),
                (vec![None], Value::Null),
            ],
        );
        assert_results(
            "$max",
            vec![
                (vec![], Value::Null),
                (vec![int(3), int(1), int(2)], Value::Int(3)),
                (vec![string("a"), int(9)], Value::String("a".into())),
                (vec![int(1), double(1.5)], Value::Double(1.5)),
            ],
        );
    }

    #[test]
    fn test_push_keeps_order_and_duplicates() {
        assert_results(
            "$push",
            vec![
                (vec![], Value::Array(vec![])),
                (
                    vec![int(2), int(1), int(2), None],
                    Value::Array(vec![Value::Int(2), Value::Int(1), Value::Int(2)]),
                ),
            ],
        );
    }

    #[test]
    fn test_add_to_set_is_sorted_and_distinct() {
        assert_results(
            "$addToSet",
            vec![
                (vec![], Value::Array(vec![])),
                (
                    vec![int(2), string("b"), int(1), int(2), double(1.0)],
                    Value::Array(vec![Value::Int(1), Value::Int(2), Value::String("b".into())]),
                ),
            ],
        );
    }

    #[test]
    fn test_count_includes_missing() {
        assert_results(
            "$count",
            vec![
                (vec![], Value::Int(0)),
                (vec![int(1), None, Some(Value::Null)], Value::Int(3)),
            ],
        );
    }

    #[test]
    fn test_record_missing_as_null() {
        let options = AccumulatorOptions {
            record_missing: true,
            ..AccumulatorOptions::default()
        };
        let mut push = Accumulator::create("$push", &options).unwrap();
        push.process(int(1).as_ref()).unwrap();
        push.process(None).unwrap();
        assert_eq!(push.get_value(), Value::Array(vec![Value::Int(1), Value::Null]));

        let mut last = Accumulator::create("$last", &options).unwrap();
        last.process(int(1).as_ref()).unwrap();
        last.process(None).unwrap();
        assert_eq!(last.get_value(), Value::Int(1));
    }

    #[test]
    fn test_memory_limit() {
        let options = AccumulatorOptions {
            record_missing: false,
            max_memory_bytes: 20,
        };
        let mut push = Accumulator::create("$push", &options).unwrap();
        push.process(int(1).as_ref()).unwrap();
        push.process(int(2).as_ref()).unwrap();
        let err = push.process(int(3).as_ref()).unwrap_err();
        assert_eq!(
            err,
            AccumulatorError::MemoryLimitExceeded {
                operator: "$push",
                limit: 20
            }
        );
        assert_eq!(
            push.get_value(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );

        let mut set = Accumulator::create("$addToSet", &options).unwrap();
        for _ in 0..10 {
            set.process(int(7).as_ref()).unwrap();
        }
        assert_eq!(set.get_value(), Value::Array(vec![Value::Int(7)]));
    }

    #[test]
    fn test_merge_rejects_wrong_shape() {
        let options = AccumulatorOptions::default();
        let mut avg = Accumulator::create("$avg", &options).unwrap();
        let err = avg.merge_partial(&Value::Int(3)).unwrap_err();
        assert_eq!(err.code(), "DQ_MERGE_SHAPE");

        let mut last = Accumulator::create("$last", &options).unwrap();
        assert!(last
            .merge_partial(&Value::Array(vec![Value::Int(1), Value::Int(2)]))
            .is_err());
    }

    #[test]
    fn test_registered_names() {
        let names: Vec<_> = registered_names().collect();
        assert!(names.contains(&"$last"));
        assert!(names.contains(&"$avg"));
        assert_eq!(names.len(), 9);
    }
}
