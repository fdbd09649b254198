// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversion of engine-native result trees into plain JSON values

use ndarray::ArrayViewD;
use serde_json::{Number, Value};

use super::RawValue;

/// Convert a raw engine result into JSON.
///
/// Every fixed-width number becomes a plain JSON number, numeric buffers
/// become nested arrays following their shape, and lists/tuples become
/// arrays. Non-finite floats have no JSON form and become `null`.
pub fn normalize(raw: RawValue) -> Value {
    match raw {
        RawValue::None => Value::Null,
        RawValue::Bool(b) => Value::Bool(b),
        RawValue::I32(n) => Value::from(n),
        RawValue::I64(n) => Value::from(n),
        RawValue::U32(n) => Value::from(n),
        RawValue::F32(x) => float(f64::from(x)),
        RawValue::F64(x) => float(x),
        RawValue::Text(s) => Value::String(s),
        RawValue::Array(array) => array_to_value(array.view()),
        RawValue::List(items) | RawValue::Tuple(items) => {
            Value::Array(items.into_iter().map(normalize).collect())
        }
    }
}

fn float(x: f64) -> Value {
    Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
}

fn array_to_value(view: ArrayViewD<'_, f64>) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().copied().map(float).unwrap_or(Value::Null);
    }

    Value::Array(view.outer_iter().map(array_to_value).collect())
}
