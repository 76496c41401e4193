//! Serde adapters writing undefined (`NaN`) values as `null`.
//!
//! JSON has no NaN; serde_json already emits `null` for it but cannot read
//! `null` back into `f64`. These adapters make the round trip explicit.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn to_opt(v: f64) -> Option<f64> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

pub mod scalar {
    use super::*;

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        to_opt(*v).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}

pub mod columns {
    use super::*;

    pub fn serialize<S: Serializer>(cols: &[Vec<f64>], s: S) -> Result<S::Ok, S::Error> {
        let cols: Vec<Vec<Option<f64>>> = cols
            .iter()
            .map(|c| c.iter().copied().map(to_opt).collect())
            .collect();
        cols.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let cols = Vec::<Vec<Option<f64>>>::deserialize(d)?;
        Ok(cols
            .into_iter()
            .map(|c| c.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super::scalar")]
        x: f64,
        #[serde(with = "super::columns")]
        cols: Vec<Vec<f64>>,
    }

    #[test]
    fn nan_survives_json() {
        let h = Holder {
            x: f64::NAN,
            cols: vec![vec![1.0, f64::NAN]],
        };
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"{"x":null,"cols":[[1.0,null]]}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert!(back.x.is_nan());
        assert_eq!(back.cols[0][0], 1.0);
        assert!(back.cols[0][1].is_nan());
    }
}
