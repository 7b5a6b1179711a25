//! Document metadata from the leading TOML title block.

use serde::Deserialize;

/// Metadata for the document's front matter, as authors write it between
/// `%%%` fences at the top of the source file. Every field is optional;
/// missing values render as empty rather than failing the document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TitleBlock {
    pub title: String,
    pub abbrev: String,
    #[serde(rename = "docName", alias = "docname")]
    pub doc_name: String,
    pub ipr: String,
    pub category: String,
    pub area: String,
    pub workgroup: String,
    pub keyword: Vec<String>,
    pub date: Option<toml::value::Datetime>,
    pub author: Vec<Author>,
}

impl TitleBlock {
    /// Parse a title block from its TOML source, fence lines excluded.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Author {
    pub initials: String,
    pub surname: String,
    pub fullname: String,
    pub organization: String,
    pub address: Address,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Address {
    pub email: String,
}

/// English month name for a one-based month number.
pub(crate) fn month_name(month: u8) -> Option<&'static str> {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    MONTHS.get(usize::from(month).checked_sub(1)?).copied()
}
