//! Validation of raw pack requests.
//!
//! Turns an untyped JSON body into a [`PackRequest`]. Validation stops at the
//! first violation and reports the offending field path together with the
//! reason, e.g. `items[1].quantity: must be > 0`.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::PackError;
use crate::model::{ContainerSpec, ItemSpec, PackRequest, PackingOptions, PutType};
use crate::units::LengthUnit;

type Object = Map<String, Value>;

/// Parses and validates a raw request body.
///
/// Checks run in a fixed order: body shape, `units`, `container`, `items`
/// (including `item_id` uniqueness) and finally `options`. Missing options
/// take the defaults from [`PackingOptions::default`].
///
/// # Examples
/// ```
/// use pack_normalizer::request::parse;
/// use serde_json::json;
///
/// let request = parse(&json!({
///     "units": "cm",
///     "container": { "length": 100, "width": 100, "height": 100, "max_weight": 1000 },
///     "items": [{ "item_id": "A", "label": "Cube", "length": 50, "width": 50,
///                 "height": 50, "weight": 10, "quantity": 2 }]
/// }))
/// .unwrap();
/// assert_eq!(request.expanded_items(), 2);
/// ```
pub fn parse(raw: &Value) -> Result<PackRequest, PackError> {
    let body = raw
        .as_object()
        .ok_or_else(|| PackError::invalid("body", "must be a JSON object"))?;

    let units = parse_units(require(body, "units", "units")?)?;
    let container = parse_container(require(body, "container", "container")?)?;
    let items = parse_items(require(body, "items", "items")?)?;
    let options = parse_options(body.get("options"))?;

    Ok(PackRequest {
        units,
        container,
        items,
        options,
    })
}

fn require<'a>(obj: &'a Object, key: &str, field: &str) -> Result<&'a Value, PackError> {
    obj.get(key)
        .ok_or_else(|| PackError::invalid(field, "missing required field"))
}

fn parse_units(value: &Value) -> Result<LengthUnit, PackError> {
    value
        .as_str()
        .and_then(|tag| tag.parse::<LengthUnit>().ok())
        .ok_or_else(|| PackError::invalid("units", "must be one of: mm, cm, m"))
}

fn parse_container(value: &Value) -> Result<ContainerSpec, PackError> {
    let obj = value
        .as_object()
        .ok_or_else(|| PackError::invalid("container", "must be an object"))?;

    let field = |key: &str| -> Result<f64, PackError> {
        let path = format!("container.{}", key);
        positive_number(require(obj, key, &path)?, &path)
    };

    Ok(ContainerSpec {
        length: field("length")?,
        width: field("width")?,
        height: field("height")?,
        max_weight: field("max_weight")?,
    })
}

fn parse_items(value: &Value) -> Result<Vec<ItemSpec>, PackError> {
    let raw_items = match value.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(PackError::invalid("items", "must be a non-empty array")),
    };

    let mut items = Vec::with_capacity(raw_items.len());
    let mut seen_ids = HashSet::with_capacity(raw_items.len());

    for (idx, raw) in raw_items.iter().enumerate() {
        let item = parse_item(idx, raw)?;
        if !seen_ids.insert(item.item_id.clone()) {
            return Err(PackError::invalid(
                format!("items[{}].item_id", idx),
                format!("duplicate item_id '{}'", item.item_id),
            ));
        }
        items.push(item);
    }

    Ok(items)
}

fn parse_item(idx: usize, value: &Value) -> Result<ItemSpec, PackError> {
    let prefix = format!("items[{}]", idx);
    let obj = value
        .as_object()
        .ok_or_else(|| PackError::invalid(prefix.as_str(), "must be an object"))?;

    let path = |key: &str| format!("{}.{}", prefix, key);
    let text = |key: &str| -> Result<String, PackError> {
        let path = path(key);
        text_value(require(obj, key, &path)?, &path)
    };
    let number = |key: &str| -> Result<f64, PackError> {
        let path = path(key);
        positive_number(require(obj, key, &path)?, &path)
    };

    let item_id = text("item_id")?;
    let label = text("label")?;
    let length = number("length")?;
    let width = number("width")?;
    let height = number("height")?;
    let weight = number("weight")?;
    let quantity_path = path("quantity");
    let quantity = positive_integer(require(obj, "quantity", &quantity_path)?, &quantity_path)?;

    Ok(ItemSpec {
        item_id,
        label,
        length,
        width,
        height,
        weight,
        quantity,
    })
}

fn parse_options(value: Option<&Value>) -> Result<PackingOptions, PackError> {
    let empty = Object::new();
    let obj = match value {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(obj)) => obj,
        Some(_) => return Err(PackError::invalid("options", "must be an object")),
    };

    let flag = |key: &str, default: bool| -> Result<bool, PackError> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(PackError::invalid(
                format!("options.{}", key),
                "must be a boolean",
            )),
        }
    };

    let fix_point = flag("fix_point", PackingOptions::DEFAULT_FIX_POINT)?;
    let check_stable = flag("check_stable", PackingOptions::DEFAULT_CHECK_STABLE)?;
    let bigger_first = flag("bigger_first", PackingOptions::DEFAULT_BIGGER_FIRST)?;

    let support_surface_ratio = match obj.get("support_surface_ratio") {
        None | Some(Value::Null) => PackingOptions::DEFAULT_SUPPORT_SURFACE_RATIO,
        Some(raw) => {
            let ratio = number_value(raw, "options.support_surface_ratio")?;
            if ratio <= 0.0 || ratio > 1.0 {
                return Err(PackError::invalid(
                    "options.support_surface_ratio",
                    "must be in (0, 1]",
                ));
            }
            ratio
        }
    };

    let put_type = match obj.get("put_type") {
        None | Some(Value::Null) => PutType::default(),
        Some(raw) => integer_value(raw, "options.put_type")
            .ok()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(|n| PutType::try_from(n).ok())
            .ok_or_else(|| {
                PackError::invalid(
                    "options.put_type",
                    "must be 1 (general) or 2 (open top)",
                )
            })?,
    };

    Ok(PackingOptions {
        fix_point,
        check_stable,
        support_surface_ratio,
        bigger_first,
        put_type,
    })
}

/// Reads a finite number; numeric strings such as `"12.5"` are accepted.
fn number_value(value: &Value, field: &str) -> Result<f64, PackError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(PackError::invalid(field, "invalid number")),
    }
}

fn positive_number(value: &Value, field: &str) -> Result<f64, PackError> {
    let n = number_value(value, field)?;
    if n <= 0.0 {
        return Err(PackError::invalid(field, "must be > 0"));
    }
    Ok(n)
}

/// Reads a whole number. Floats are accepted only without a fractional part.
fn integer_value(value: &Value, field: &str) -> Result<i64, PackError> {
    let invalid = || PackError::invalid(field, "invalid integer");
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn positive_integer(value: &Value, field: &str) -> Result<u32, PackError> {
    let n = integer_value(value, field)?;
    if n <= 0 {
        return Err(PackError::invalid(field, "must be > 0"));
    }
    u32::try_from(n).map_err(|_| PackError::invalid(field, "is too large"))
}

/// Reads an identifier or label; numbers are rendered as strings.
fn text_value(value: &Value, field: &str) -> Result<String, PackError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(PackError::invalid(field, "must be a string")),
    }
}
