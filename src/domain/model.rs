use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// A lottery result document as published by the upstream API.
///
/// Only obtainable through deserialization, so holding one means the
/// document had every field the transformer reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub status_message: String,
    pub status_code: Number,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseBody {
    pub result: DrawResult,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DrawResult {
    pub date: String,
    pub data: PrizeTable,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrizeEntry {
    pub price: String,
    pub number: Vec<NumberEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NumberEntry {
    pub round: Number,
    pub value: String,
}

impl RawRecord {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// Prize categories keyed by name, in the order they appear in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrizeTable(Vec<(String, PrizeEntry)>);

impl PrizeTable {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrizeEntry)> {
        self.0.iter().map(|(category, entry)| (category.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for PrizeTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PrizeTableVisitor;

        impl<'de> Visitor<'de> for PrizeTableVisitor {
            type Value = PrizeTable;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from prize category to prize entry")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<PrizeTable, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((category, entry)) = map.next_entry::<String, PrizeEntry>()? {
                    entries.push((category, entry));
                }
                Ok(PrizeTable(entries))
            }
        }

        deserializer.deserialize_map(PrizeTableVisitor)
    }
}

/// Flattened output written for every valid document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedRecord {
    pub lottery_date: String,
    pub prizes: Vec<Prize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub category: String,
    pub price: String,
    pub numbers: Vec<DrawnNumber>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnNumber {
    pub round: Number,
    pub value: String,
}
