//! Document-level metadata carried by the root `Law` element.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Law-level facts compared by the diff summary and emitted on the graph root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawMetadata {
    pub law_number: Option<String>,
    pub title: Option<String>,
    pub law_type: Option<String>,
    pub promulgation_date: Option<NaiveDate>,
}

impl LawMetadata {
    /// Named fields for field-by-field comparison.
    pub fn fields(&self) -> [(&'static str, Option<String>); 4] {
        [
            ("law_number", self.law_number.clone()),
            ("title", self.title.clone()),
            ("law_type", self.law_type.clone()),
            (
                "promulgation_date",
                self.promulgation_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ),
        ]
    }
}

/// Gregorian year of `year` in a Japanese era, or `None` for an unknown era.
pub fn era_to_gregorian(era: &str, year: i32) -> Option<i32> {
    let offset = match era {
        "Meiji" => 1867,
        "Taisho" => 1911,
        "Showa" => 1925,
        "Heisei" => 1988,
        "Reiwa" => 2018,
        _ => return None,
    };
    Some(offset + year)
}

/// Promulgation date from the era-based attributes of a source-language root.
pub fn era_date(era: &str, year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year = era_to_gregorian(era, year.trim().parse().ok()?)?;
    NaiveDate::from_ymd_opt(year, month.trim().parse().ok()?, day.trim().parse().ok()?)
}

/// Promulgation date from a translation's `OriginalPromulgateDate` (`May 2, 1950`).
pub fn english_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%B %d, %Y").ok()
}

pub(crate) fn extract(root: roxmltree::Node<'_, '_>) -> LawMetadata {
    let text_of = |path: &[&str]| -> Option<String> {
        let mut node = root;
        for name in path {
            node = node
                .children()
                .find(|c| c.is_element() && c.tag_name().name() == *name)?;
        }
        let text: String = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    };

    let promulgation_date = match (
        root.attribute("Era"),
        root.attribute("Year"),
        root.attribute("PromulgateMonth"),
        root.attribute("PromulgateDay"),
    ) {
        (Some(era), Some(year), Some(month), Some(day)) => era_date(era, year, month, day),
        _ => None,
    }
    .or_else(|| root.attribute("OriginalPromulgateDate").and_then(english_date));

    LawMetadata {
        law_number: text_of(&["LawNum"]),
        title: text_of(&["LawBody", "LawTitle"]),
        law_type: root.attribute("LawType").map(str::to_string),
        promulgation_date,
    }
}
