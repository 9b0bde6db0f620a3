//! Deserializers for `double` fields that also accept the proto3 JSON spellings of
//! non-finite values: `"NaN"`, `"Infinity"` and `"-Infinity"`.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, Visitor};

const EXPECTED: &str = "a number or one of \"NaN\", \"Infinity\", \"-Infinity\"";

struct DoubleVisitor;

impl<'de> Visitor<'de> for DoubleVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(EXPECTED)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        match v {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(other), &EXPECTED)),
        }
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    deserializer.deserialize_any(DoubleVisitor)
}

/// `optional double`; JSON `null` is absent.
pub fn option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    struct OptionVisitor;

    impl<'de> Visitor<'de> for OptionVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(EXPECTED)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            deserialize(d).map(Some)
        }
    }

    deserializer.deserialize_option(OptionVisitor)
}

/// `repeated double`.
pub fn vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    struct Double(f64);

    impl<'de> Deserialize<'de> for Double {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            deserialize(d).map(Double)
        }
    }

    Vec::<Double>::deserialize(deserializer).map(|values| values.into_iter().map(|d| d.0).collect())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Point {
        #[serde(deserialize_with = "super::deserialize")]
        value: f64,
        #[serde(default, deserialize_with = "super::option")]
        sum: Option<f64>,
        #[serde(default, deserialize_with = "super::vec")]
        bounds: Vec<f64>,
    }

    #[test]
    fn accepts_numbers_and_non_finite_names() {
        let point: Point = serde_json::from_str(
            r#"{"value": "NaN", "sum": "-Infinity", "bounds": [1, 2.5, "Infinity"]}"#,
        )
        .unwrap();
        assert!(point.value.is_nan());
        assert_eq!(point.sum, Some(f64::NEG_INFINITY));
        assert_eq!(point.bounds, vec![1.0, 2.5, f64::INFINITY]);

        let plain: Point = serde_json::from_str(r#"{"value": 3, "sum": null}"#).unwrap();
        assert_eq!(plain.value, 3.0);
        assert_eq!(plain.sum, None);
        assert!(plain.bounds.is_empty());
    }

    #[test]
    fn rejects_other_strings() {
        assert!(serde_json::from_str::<Point>(r#"{"value": "lots"}"#).is_err());
    }
}
