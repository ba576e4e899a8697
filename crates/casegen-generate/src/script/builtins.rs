//! Built-in library available to custom-code programs.

use std::cmp::Ordering;
use std::fmt::Write as _;

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;

use super::ScriptError;
use super::Value;
use super::eval::{Interpreter, as_f64, compare_values};
use crate::generators::draw_float;

/// Upper bound on lists and strings built by the library.
pub(super) const MAX_COLLECTION_LEN: usize = 1_000_000;
/// Repetition cap for unbounded quantifiers in `pattern()`.
const PATTERN_MAX_REPEAT: u32 = 32;
const DATE_FORMAT: &str = "%Y-%m-%d";

const BUILTINS: &[&str] = &[
    // random
    "randint",
    "uniform",
    "choice",
    "shuffle",
    "sample",
    "pattern",
    // strings
    "str",
    "int",
    "float",
    "len",
    "upper",
    "lower",
    "join",
    "split",
    "repeat",
    "chr",
    "ord",
    "concat",
    "ascii_lowercase",
    "ascii_uppercase",
    "digits",
    // math
    "abs",
    "min",
    "max",
    "sum",
    "pow",
    "sqrt",
    "floor",
    "ceil",
    "round",
    // iteration
    "range",
    "map",
    "filter",
    "times",
    "sorted",
    "reversed",
    // dates
    "today",
    "date_between",
    // regex
    "matches",
    "replace",
];

pub(super) fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

pub(super) fn call(
    interp: &mut Interpreter<'_, '_>,
    name: &str,
    args: Vec<Value>,
) -> Result<Value, ScriptError> {
    match name {
        "randint" => {
            let [lo, hi] = exact::<2>(name, args)?;
            let (lo, hi) = (int_arg(name, &lo)?, int_arg(name, &hi)?);
            if lo > hi {
                return Err(runtime(format!("randint({lo}, {hi}): empty range")));
            }
            Ok(Value::Int(interp.rng.random_range(lo..=hi)))
        }
        "uniform" => {
            let [lo, hi] = exact::<2>(name, args)?;
            let (mut lo, mut hi) = (num_arg(name, &lo)?, num_arg(name, &hi)?);
            if lo > hi {
                std::mem::swap(&mut lo, &mut hi);
            }
            draw_float(&mut *interp.rng, lo, hi)
                .map(Value::Float)
                .ok_or_else(|| runtime("uniform() bounds must be finite"))
        }
        "choice" => {
            let [items] = exact::<1>(name, args)?;
            let mut items = sequence(name, items)?;
            if items.is_empty() {
                return Err(runtime("choice() from an empty sequence"));
            }
            let idx = interp.rng.random_range(0..items.len());
            Ok(items.swap_remove(idx))
        }
        "shuffle" => {
            let [items] = exact::<1>(name, args)?;
            let mut items = sequence(name, items)?;
            items.shuffle(&mut *interp.rng);
            Ok(Value::List(items))
        }
        "sample" => {
            let [items, amount] = exact::<2>(name, args)?;
            let items = sequence(name, items)?;
            let amount = count_arg(name, &amount)?;
            if amount > items.len() {
                return Err(runtime(format!(
                    "sample() of {amount} from a sequence of {}",
                    items.len()
                )));
            }
            let picked = rand::seq::index::sample(&mut *interp.rng, items.len(), amount);
            Ok(Value::List(
                picked.into_iter().map(|idx| items[idx].clone()).collect(),
            ))
        }
        "pattern" => {
            let [pattern] = exact::<1>(name, args)?;
            let pattern = str_arg(name, &pattern)?;
            let generator = rand_regex::Regex::compile(pattern, PATTERN_MAX_REPEAT)
                .map_err(|err| runtime(format!("pattern '{pattern}': {err}")))?;
            let value: String = interp.rng.sample(&generator);
            Ok(Value::Str(value))
        }

        "str" => {
            let [value] = exact::<1>(name, args)?;
            Ok(Value::Str(value.to_string()))
        }
        "int" => {
            let [value] = exact::<1>(name, args)?;
            to_int(&value).map(Value::Int)
        }
        "float" => {
            let [value] = exact::<1>(name, args)?;
            match &value {
                Value::Int(v) => Ok(Value::Float(*v as f64)),
                Value::Float(v) => Ok(Value::Float(*v)),
                Value::Bool(v) => Ok(Value::Float(if *v { 1.0 } else { 0.0 })),
                Value::Str(text) => text
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| runtime(format!("float(): invalid literal '{text}'"))),
                other => Err(type_error(name, "a number or string", other)),
            }
        }
        "len" => {
            let [value] = exact::<1>(name, args)?;
            let len = match &value {
                Value::Str(text) => text.chars().count(),
                Value::List(items) => items.len(),
                other => return Err(type_error(name, "a string or list", other)),
            };
            Ok(Value::Int(len as i64))
        }
        "upper" => {
            let [value] = exact::<1>(name, args)?;
            Ok(Value::Str(str_arg(name, &value)?.to_uppercase()))
        }
        "lower" => {
            let [value] = exact::<1>(name, args)?;
            Ok(Value::Str(str_arg(name, &value)?.to_lowercase()))
        }
        "join" => {
            arity_between(name, &args, 1, 2)?;
            let separator = match args.get(1) {
                Some(value) => str_arg(name, value)?.to_string(),
                None => String::new(),
            };
            let items = list_arg(name, &args[0])?;
            let parts: Vec<String> = items.iter().map(Value::to_string).collect();
            Ok(Value::Str(parts.join(&separator)))
        }
        "split" => {
            arity_between(name, &args, 1, 2)?;
            let text = str_arg(name, &args[0])?;
            let parts: Vec<Value> = match args.get(1) {
                None => text
                    .split_whitespace()
                    .map(|part| Value::Str(part.to_string()))
                    .collect(),
                Some(separator) => {
                    let separator = str_arg(name, separator)?;
                    if separator.is_empty() {
                        return Err(runtime("split(): empty separator"));
                    }
                    text.split(separator)
                        .map(|part| Value::Str(part.to_string()))
                        .collect()
                }
            };
            Ok(Value::List(parts))
        }
        "repeat" => {
            let [text, times] = exact::<2>(name, args)?;
            repeat_str(str_arg(name, &text)?, int_arg(name, &times)?).map(Value::Str)
        }
        "chr" => {
            let [code] = exact::<1>(name, args)?;
            let code = int_arg(name, &code)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(|ch| Value::Str(ch.to_string()))
                .ok_or_else(|| runtime(format!("chr(): {code} is not a valid code point")))
        }
        "ord" => {
            let [text] = exact::<1>(name, args)?;
            let text = str_arg(name, &text)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok(Value::Int(i64::from(u32::from(ch)))),
                _ => Err(runtime(format!(
                    "ord() expects a single character, got '{text}'"
                ))),
            }
        }
        "concat" => {
            let mut out = String::new();
            for value in &args {
                out.push_str(&value.to_string());
            }
            Ok(Value::Str(out))
        }
        "ascii_lowercase" => {
            let [] = exact::<0>(name, args)?;
            Ok(Value::Str(('a'..='z').collect()))
        }
        "ascii_uppercase" => {
            let [] = exact::<0>(name, args)?;
            Ok(Value::Str(('A'..='Z').collect()))
        }
        "digits" => {
            let [] = exact::<0>(name, args)?;
            Ok(Value::Str(('0'..='9').collect()))
        }

        "abs" => {
            let [value] = exact::<1>(name, args)?;
            match value {
                Value::Int(v) => v
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| runtime("integer overflow")),
                Value::Float(v) => Ok(Value::Float(v.abs())),
                other => Err(type_error(name, "a number", &other)),
            }
        }
        "min" | "max" => {
            let candidates = match args.len() {
                0 => {
                    return Err(ScriptError::Arity {
                        name: name.to_string(),
                        expected: "at least 1".to_string(),
                        found: 0,
                    });
                }
                1 => list_arg(name, &args[0])?.to_vec(),
                _ => args,
            };
            let want = if name == "min" {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let mut iter = candidates.into_iter();
            let mut best = iter
                .next()
                .ok_or_else(|| runtime(format!("{name}() of an empty list")))?;
            for candidate in iter {
                if compare_values(&candidate, &best)? == want {
                    best = candidate;
                }
            }
            Ok(best)
        }
        "sum" => {
            let [items] = exact::<1>(name, args)?;
            let mut int_total: i64 = 0;
            let mut float_total: Option<f64> = None;
            for item in list_arg(name, &items)? {
                match item {
                    Value::Int(v) => {
                        int_total = int_total
                            .checked_add(*v)
                            .ok_or_else(|| runtime("integer overflow"))?;
                    }
                    Value::Float(v) => *float_total.get_or_insert(0.0) += v,
                    other => return Err(type_error(name, "a list of numbers", other)),
                }
            }
            Ok(match float_total {
                Some(total) => Value::Float(total + int_total as f64),
                None => Value::Int(int_total),
            })
        }
        "pow" => {
            let [base, exponent] = exact::<2>(name, args)?;
            match (&base, &exponent) {
                (Value::Int(b), Value::Int(e)) if *e >= 0 => u32::try_from(*e)
                    .ok()
                    .and_then(|e| b.checked_pow(e))
                    .map(Value::Int)
                    .ok_or_else(|| runtime("integer overflow")),
                _ => Ok(Value::Float(
                    num_arg(name, &base)?.powf(num_arg(name, &exponent)?),
                )),
            }
        }
        "sqrt" => {
            let [value] = exact::<1>(name, args)?;
            let value = num_arg(name, &value)?;
            if value < 0.0 {
                return Err(runtime(format!("sqrt() of negative number {value}")));
            }
            Ok(Value::Float(value.sqrt()))
        }
        "floor" | "ceil" => {
            let [value] = exact::<1>(name, args)?;
            match value {
                Value::Int(v) => Ok(Value::Int(v)),
                other => {
                    let v = num_arg(name, &other)?;
                    let rounded = if name == "floor" { v.floor() } else { v.ceil() };
                    float_to_int(rounded).map(Value::Int)
                }
            }
        }
        "round" => {
            arity_between(name, &args, 1, 2)?;
            match args.get(1) {
                None => match &args[0] {
                    Value::Int(v) => Ok(Value::Int(*v)),
                    other => float_to_int(num_arg(name, other)?.round_ties_even()).map(Value::Int),
                },
                Some(places) => {
                    let places = int_arg(name, places)?.clamp(-15, 15) as i32;
                    let scale = 10f64.powi(places);
                    let value = num_arg(name, &args[0])?;
                    Ok(Value::Float((value * scale).round_ties_even() / scale))
                }
            }
        }

        "range" => {
            arity_between(name, &args, 1, 3)?;
            let ints = args
                .iter()
                .map(|arg| int_arg(name, arg))
                .collect::<Result<Vec<_>, _>>()?;
            let (start, stop, step) = match ints.as_slice() {
                [stop] => (0, *stop, 1),
                [start, stop] => (*start, *stop, 1),
                [start, stop, step] => (*start, *stop, *step),
                _ => return Err(runtime("range() expects 1 to 3 arguments")),
            };
            range_values(start, stop, step).map(Value::List)
        }
        "map" => {
            let [func, items] = exact::<2>(name, args)?;
            let items = sequence(name, items)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(interp.call_value(&func, vec![item])?);
            }
            Ok(Value::List(out))
        }
        "filter" => {
            let [func, items] = exact::<2>(name, args)?;
            let items = sequence(name, items)?;
            let mut out = Vec::new();
            for item in items {
                if interp.call_value(&func, vec![item.clone()])?.truthy() {
                    out.push(item);
                }
            }
            Ok(Value::List(out))
        }
        "times" => {
            let [count, func] = exact::<2>(name, args)?;
            let count = count_arg(name, &count)?;
            if count > MAX_COLLECTION_LEN {
                return Err(runtime(format!("times(): {count} exceeds the list limit")));
            }
            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                out.push(interp.call_value(&func, Vec::new())?);
            }
            Ok(Value::List(out))
        }
        "sorted" => {
            let [items] = exact::<1>(name, args)?;
            let mut items = sequence(name, items)?;
            let mut failure = None;
            items.sort_by(|a, b| {
                compare_values(a, b).unwrap_or_else(|err| {
                    failure.get_or_insert(err);
                    Ordering::Equal
                })
            });
            match failure {
                Some(err) => Err(err),
                None => Ok(Value::List(items)),
            }
        }
        "reversed" => {
            let [items] = exact::<1>(name, args)?;
            match items {
                Value::Str(text) => Ok(Value::Str(text.chars().rev().collect())),
                Value::List(mut items) => {
                    items.reverse();
                    Ok(Value::List(items))
                }
                other => Err(type_error(name, "a string or list", &other)),
            }
        }

        "today" => {
            let [] = exact::<0>(name, args)?;
            let today = chrono::Local::now().date_naive();
            Ok(Value::Str(today.format(DATE_FORMAT).to_string()))
        }
        "date_between" => {
            arity_between(name, &args, 2, 3)?;
            let start = date_arg(name, &args[0])?;
            let end = date_arg(name, &args[1])?;
            let span = (end - start).num_days();
            if span < 0 {
                return Err(runtime(format!("date_between(): {start} is after {end}")));
            }
            let offset = interp.rng.random_range(0..=span);
            let date = start
                .checked_add_days(chrono::Days::new(offset as u64))
                .ok_or_else(|| runtime("date_between(): date out of range"))?;
            let format = match args.get(2) {
                Some(format) => str_arg(name, format)?,
                None => DATE_FORMAT,
            };
            let mut out = String::new();
            write!(out, "{}", date.format(format))
                .map_err(|_| runtime(format!("date_between(): invalid format '{format}'")))?;
            Ok(Value::Str(out))
        }

        "matches" => {
            let [pattern, text] = exact::<2>(name, args)?;
            let regex = compile_regex(name, str_arg(name, &pattern)?)?;
            Ok(Value::Bool(regex.is_match(str_arg(name, &text)?)))
        }
        "replace" => {
            let [pattern, text, replacement] = exact::<3>(name, args)?;
            let regex = compile_regex(name, str_arg(name, &pattern)?)?;
            let replaced = regex.replace_all(str_arg(name, &text)?, str_arg(name, &replacement)?);
            Ok(Value::Str(replaced.into_owned()))
        }

        other => Err(ScriptError::UnknownName(other.to_string())),
    }
}

pub(super) fn repeat_str(text: &str, times: i64) -> Result<String, ScriptError> {
    let times = usize::try_from(times.max(0)).unwrap_or(usize::MAX);
    if text.len().saturating_mul(times) > MAX_COLLECTION_LEN {
        return Err(runtime("repeated string exceeds the size limit"));
    }
    Ok(text.repeat(times))
}

pub(super) fn repeat_list(items: &[Value], times: i64) -> Result<Vec<Value>, ScriptError> {
    let times = usize::try_from(times.max(0)).unwrap_or(usize::MAX);
    if items.len().saturating_mul(times) > MAX_COLLECTION_LEN {
        return Err(runtime("repeated list exceeds the size limit"));
    }
    Ok(std::iter::repeat_n(items, times).flatten().cloned().collect())
}

fn range_values(start: i64, stop: i64, step: i64) -> Result<Vec<Value>, ScriptError> {
    if step == 0 {
        return Err(runtime("range() step must not be zero"));
    }
    let span = if step > 0 {
        i128::from(stop) - i128::from(start)
    } else {
        i128::from(start) - i128::from(stop)
    };
    let stride = i128::from(step).abs();
    let len = if span <= 0 {
        0
    } else {
        (span + stride - 1) / stride
    };
    if len > MAX_COLLECTION_LEN as i128 {
        return Err(runtime(format!("range() of {len} items exceeds the list limit")));
    }
    Ok((0..len)
        .map(|idx| Value::Int((i128::from(start) + idx * i128::from(step)) as i64))
        .collect())
}

fn exact<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], ScriptError> {
    <[Value; N]>::try_from(args).map_err(|args| ScriptError::Arity {
        name: name.to_string(),
        expected: N.to_string(),
        found: args.len(),
    })
}

fn arity_between(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), ScriptError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(ScriptError::Arity {
            name: name.to_string(),
            expected: format!("{min} to {max}"),
            found: args.len(),
        })
    }
}

fn runtime(message: impl Into<String>) -> ScriptError {
    ScriptError::Runtime(message.into())
}

fn type_error(name: &str, expected: &str, found: &Value) -> ScriptError {
    ScriptError::Type(format!(
        "{name}() expects {expected}, got {}",
        found.type_name()
    ))
}

fn int_arg(name: &str, value: &Value) -> Result<i64, ScriptError> {
    match value {
        Value::Int(v) => Ok(*v),
        other => Err(type_error(name, "an int", other)),
    }
}

fn count_arg(name: &str, value: &Value) -> Result<usize, ScriptError> {
    let count = int_arg(name, value)?;
    usize::try_from(count).map_err(|_| runtime(format!("{name}(): count {count} is negative")))
}

fn num_arg(name: &str, value: &Value) -> Result<f64, ScriptError> {
    as_f64(value).ok_or_else(|| type_error(name, "a number", value))
}

fn str_arg<'v>(name: &str, value: &'v Value) -> Result<&'v str, ScriptError> {
    match value {
        Value::Str(text) => Ok(text),
        other => Err(type_error(name, "a string", other)),
    }
}

fn list_arg<'v>(name: &str, value: &'v Value) -> Result<&'v [Value], ScriptError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(type_error(name, "a list", other)),
    }
}

fn date_arg(name: &str, value: &Value) -> Result<NaiveDate, ScriptError> {
    let text = str_arg(name, value)?;
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| runtime(format!("{name}(): '{text}' is not a YYYY-MM-DD date")))
}

/// Lists pass through; strings iterate by character.
fn sequence(name: &str, value: Value) -> Result<Vec<Value>, ScriptError> {
    match value {
        Value::List(items) => Ok(items),
        Value::Str(text) => Ok(text.chars().map(|ch| Value::Str(ch.to_string())).collect()),
        other => Err(type_error(name, "a list or string", &other)),
    }
}

fn to_int(value: &Value) -> Result<i64, ScriptError> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Float(v) => float_to_int(v.trunc()),
        Value::Bool(v) => Ok(i64::from(*v)),
        Value::Str(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| runtime(format!("int(): invalid literal '{text}'"))),
        other => Err(type_error("int", "a number or string", other)),
    }
}

fn float_to_int(value: f64) -> Result<i64, ScriptError> {
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(runtime(format!("{value} cannot be converted to int")))
    }
}

fn compile_regex(name: &str, pattern: &str) -> Result<regex::Regex, ScriptError> {
    regex::Regex::new(pattern).map_err(|err| runtime(format!("{name}(): {err}")))
}

#[cfg(test)]
mod tests {
    use super::super::{Script, Value};
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn eval_with_seed(source: &str, seed: u64) -> Result<Value, ScriptError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Script::compile(&format!("fn generate_data() = {source}"))?.run(&mut rng)
    }

    fn eval_expr(source: &str) -> Result<Value, ScriptError> {
        eval_with_seed(source, 5)
    }

    fn ints(values: &[i64]) -> Value {
        Value::List(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn uniform_handles_spans_wider_than_f64() {
        for seed in 0..20 {
            let Ok(Value::Float(v)) =
                eval_with_seed("uniform(float('-1e308'), float('1e308'))", seed)
            else {
                panic!("uniform should produce a float");
            };
            assert!(v.is_finite() && (-1e308..=1e308).contains(&v));
        }
    }

    #[test]
    fn lists_repeat_by_multiplication() {
        assert_eq!(eval_expr("[1, 2] * 2"), Ok(ints(&[1, 2, 1, 2])));
        assert_eq!(eval_expr("0 * [1]"), Ok(ints(&[])));
    }

    #[test]
    fn randint_stays_in_bounds() {
        for seed in 0..50 {
            let Ok(Value::Int(v)) = eval_with_seed("randint(3, 6)", seed) else {
                panic!("randint should produce an int");
            };
            assert!((3..=6).contains(&v));
        }
        assert!(matches!(eval_expr("randint(5, 1)"), Err(ScriptError::Runtime(_))));
    }

    #[test]
    fn random_helpers_are_reproducible_per_seed() {
        let source = "concat(randint(1, 1000), choice('xyz'), shuffle(range(5)))";
        assert_eq!(eval_with_seed(source, 9), eval_with_seed(source, 9));
    }

    #[test]
    fn sample_picks_distinct_items() {
        let Ok(Value::List(items)) = eval_expr("sample(range(10), 4)") else {
            panic!("sample should produce a list");
        };
        assert_eq!(items.len(), 4);
        let mut seen: Vec<i64> = items
            .iter()
            .map(|item| match item {
                Value::Int(v) => *v,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 4);
        assert!(matches!(eval_expr("sample([1], 2)"), Err(ScriptError::Runtime(_))));
    }

    #[test]
    fn pattern_generates_matching_strings() {
        let Ok(Value::Str(text)) = eval_expr("pattern('[A-Z]{2}[0-9]{3}')") else {
            panic!("pattern should produce a string");
        };
        assert_eq!(text.len(), 5);
        assert!(text[..2].chars().all(|ch| ch.is_ascii_uppercase()));
        assert!(text[2..].chars().all(|ch| ch.is_ascii_digit()));
    }

    #[test]
    fn string_helpers() {
        assert_eq!(
            eval_expr("join(map(upper, split('a b c')), '-')"),
            Ok(Value::Str("A-B-C".to_string()))
        );
        assert_eq!(eval_expr("len('héllo')"), Ok(Value::Int(5)));
        assert_eq!(eval_expr("int(' 42 ')"), Ok(Value::Int(42)));
        assert_eq!(eval_expr("int(3.9)"), Ok(Value::Int(3)));
        assert_eq!(eval_expr("chr(ord('a') + 1)"), Ok(Value::Str("b".to_string())));
        assert_eq!(eval_expr("repeat('ab', 2)"), Ok(Value::Str("abab".to_string())));
        assert_eq!(
            eval_expr("concat('n=', 3, ' f=', 1.0)"),
            Ok(Value::Str("n=3 f=1.0".to_string()))
        );
        assert_eq!(eval_expr("len(ascii_lowercase() + digits())"), Ok(Value::Int(36)));
    }

    #[test]
    fn math_helpers() {
        assert_eq!(eval_expr("abs(-4)"), Ok(Value::Int(4)));
        assert_eq!(eval_expr("min(4, 2, 9)"), Ok(Value::Int(2)));
        assert_eq!(eval_expr("max([1, 7.5, 3])"), Ok(Value::Float(7.5)));
        assert_eq!(eval_expr("sum([1, 2, 3])"), Ok(Value::Int(6)));
        assert_eq!(eval_expr("sum([1, 0.5])"), Ok(Value::Float(1.5)));
        assert_eq!(eval_expr("pow(2, 10)"), Ok(Value::Int(1024)));
        assert_eq!(eval_expr("sqrt(16)"), Ok(Value::Float(4.0)));
        assert_eq!(eval_expr("floor(-1.5)"), Ok(Value::Int(-2)));
        assert_eq!(eval_expr("ceil(1.2)"), Ok(Value::Int(2)));
        assert_eq!(eval_expr("round(2.5)"), Ok(Value::Int(2)));
        assert_eq!(eval_expr("round(1.256, 2)"), Ok(Value::Float(1.26)));
        assert!(matches!(eval_expr("sqrt(-1)"), Err(ScriptError::Runtime(_))));
    }

    #[test]
    fn iteration_helpers() {
        assert_eq!(eval_expr("range(4)"), Ok(ints(&[0, 1, 2, 3])));
        assert_eq!(eval_expr("range(5, 0, -2)"), Ok(ints(&[5, 3, 1])));
        assert_eq!(eval_expr("range(3, 3)"), Ok(ints(&[])));
        assert!(matches!(eval_expr("range(0, 5, 0)"), Err(ScriptError::Runtime(_))));
        assert!(matches!(
            eval_expr("range(0, 100000000)"),
            Err(ScriptError::Runtime(_))
        ));
        assert_eq!(eval_expr("sorted([3, 1, 2])"), Ok(ints(&[1, 2, 3])));
        assert_eq!(eval_expr("reversed([1, 2])"), Ok(ints(&[2, 1])));
        assert!(matches!(eval_expr("sorted([1, 'a'])"), Err(ScriptError::Type(_))));
    }

    #[test]
    fn higher_order_helpers_call_user_functions() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let script = Script::compile(
            "fn even(x) = x % 2 == 0\nfn seven() = 7\nfn generate_data() = [filter(even, range(7)), times(2, seven)]",
        )
        .expect("compile");
        assert_eq!(
            script.run(&mut rng),
            Ok(Value::List(vec![ints(&[0, 2, 4, 6]), ints(&[7, 7])]))
        );
    }

    #[test]
    fn date_between_stays_in_range() {
        let Ok(Value::Str(date)) = eval_expr("date_between('2024-02-27', '2024-03-02')") else {
            panic!("date_between should produce a string");
        };
        let parsed = NaiveDate::parse_from_str(&date, DATE_FORMAT).expect("date");
        assert!(parsed >= NaiveDate::from_ymd_opt(2024, 2, 27).expect("date"));
        assert!(parsed <= NaiveDate::from_ymd_opt(2024, 3, 2).expect("date"));
        assert_eq!(
            eval_expr("date_between('2024-01-01', '2024-01-01', '%d/%m/%Y')"),
            Ok(Value::Str("01/01/2024".to_string()))
        );
        assert!(matches!(
            eval_expr("date_between('2024-02-01', '2024-01-01')"),
            Err(ScriptError::Runtime(_))
        ));
    }

    #[test]
    fn regex_helpers() {
        assert_eq!(eval_expr("matches('^[0-9]+$', '123')"), Ok(Value::Bool(true)));
        assert_eq!(
            eval_expr("replace('[aeiou]', 'banana', '_')"),
            Ok(Value::Str("b_n_n_".to_string()))
        );
        assert!(matches!(eval_expr("matches('(', 'x')"), Err(ScriptError::Runtime(_))));
    }

    #[test]
    fn wrong_arity_is_reported() {
        assert!(matches!(
            eval_expr("randint(1)"),
            Err(ScriptError::Arity { .. })
        ));
    }
}
