use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One related query reported as surging over the query window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RisingRecord {
    pub query: String,
    pub value: SurgeValue,
}

/// Growth indicator for a rising query: either a surge percentage or the
/// provider's "Breakout" sentinel for unbounded growth (>5000%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurgeValue {
    Percent(i64),
    Breakout,
}

impl Serialize for SurgeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SurgeValue::Percent(n) => serializer.serialize_i64(*n),
            SurgeValue::Breakout => serializer.serialize_str("Breakout"),
        }
    }
}

impl<'de> Deserialize<'de> for SurgeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A number on the wire is a percentage; any string is the breakout sentinel.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(SurgeValue::Percent(n)),
            Raw::Text(_) => Ok(SurgeValue::Breakout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surge_value_roundtrips_as_number_or_sentinel() {
        let pct = serde_json::to_string(&SurgeValue::Percent(250)).unwrap();
        assert_eq!(pct, "250");
        let breakout = serde_json::to_string(&SurgeValue::Breakout).unwrap();
        assert_eq!(breakout, "\"Breakout\"");

        assert_eq!(
            serde_json::from_str::<SurgeValue>("250").unwrap(),
            SurgeValue::Percent(250)
        );
        assert_eq!(
            serde_json::from_str::<SurgeValue>("\"Breakout\"").unwrap(),
            SurgeValue::Breakout
        );
    }

    #[test]
    fn record_parses_from_persisted_shape() {
        let rec: RisingRecord =
            serde_json::from_str(r#"{"query":"ai tools","value":250}"#).unwrap();
        assert_eq!(rec.query, "ai tools");
        assert_eq!(rec.value, SurgeValue::Percent(250));
    }
}
