use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BookSummary {
    pub(crate) book_id: String,
    pub(crate) book_name: String,
}

/// Detail responses come in two envelopes; they are classified once when fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DetailPayload {
    Direct(BookSummary),
    Legacy(BookSummary),
    Unrecognized,
}

impl DetailPayload {
    pub(crate) fn classify(value: &Value) -> Self {
        if let Some(book) = book_from_object(value) {
            return Self::Direct(book);
        }
        if let Some(book) = value.pointer("/data/book").and_then(book_from_object) {
            return Self::Legacy(book);
        }
        Self::Unrecognized
    }

    pub(crate) fn book(&self) -> Option<&BookSummary> {
        match self {
            Self::Direct(book) | Self::Legacy(book) => Some(book),
            Self::Unrecognized => None,
        }
    }

    pub(crate) fn into_book(self) -> Option<BookSummary> {
        match self {
            Self::Direct(book) | Self::Legacy(book) => Some(book),
            Self::Unrecognized => None,
        }
    }
}

fn book_from_object(value: &Value) -> Option<BookSummary> {
    let object = value.as_object()?;
    let book_id = scalar_text(object.get("bookId")?)?;
    let book_name = scalar_text(object.get("bookName")?)?;
    Some(BookSummary { book_id, book_name })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Episode {
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) chapter_id: String,
    #[serde(default)]
    pub(crate) chapter_index: usize,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) chapter_img: String,
    #[serde(default)]
    pub(crate) cdn_list: Vec<CdnSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CdnSource {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub(crate) is_default: u8,
    #[serde(default)]
    pub(crate) video_path_list: Vec<VideoVariant>,
}

impl CdnSource {
    pub(crate) fn is_default(&self) -> bool {
        self.is_default == 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoVariant {
    #[serde(default, deserialize_with = "lenient_quality")]
    pub(crate) quality: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) video_path: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub(crate) is_default: u8,
}

impl VideoVariant {
    pub(crate) fn is_default(&self) -> bool {
        self.is_default == 1
    }
}

// Only JSON numbers count as a quality (`720` or `720.0`); anything else is
// treated as absent.
fn lenient_quality<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|quality| quality.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(quality))
        .map(|quality| quality as u32))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) if number.as_u64() == Some(1) => 1,
        Value::Bool(true) => 1,
        _ => 0,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value).unwrap_or_default())
}

/// Episode lists arrive either bare or wrapped in a `data` envelope. Order is
/// kept as served; the selected index addresses this list directly.
pub(crate) fn parse_episode_list(raw: &str) -> Result<Vec<Episode>, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    let items = match value {
        Value::Object(mut object) => match object.remove("data") {
            Some(data @ Value::Array(_)) => data,
            _ => {
                return Err(<serde_json::Error as de::Error>::custom(
                    "episode response has no `data` array",
                ));
            }
        },
        other => other,
    };
    serde_json::from_value(items)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn summary(id: &str, name: &str) -> BookSummary {
        BookSummary {
            book_id: id.to_string(),
            book_name: name.to_string(),
        }
    }

    #[test]
    fn classify_accepts_direct_shape() {
        let payload = DetailPayload::classify(&json!({"bookId": "1", "bookName": "X"}));
        assert_eq!(payload, DetailPayload::Direct(summary("1", "X")));
    }

    #[test]
    fn classify_accepts_legacy_envelope() {
        let payload =
            DetailPayload::classify(&json!({"data": {"book": {"bookId": "1", "bookName": "X"}}}));
        assert_eq!(payload, DetailPayload::Legacy(summary("1", "X")));
        assert_eq!(payload.book(), Some(&summary("1", "X")));
    }

    #[test]
    fn classify_rejects_unknown_shapes() {
        assert_eq!(DetailPayload::classify(&json!({})), DetailPayload::Unrecognized);
        assert_eq!(
            DetailPayload::classify(&json!({"data": {"book": null}})),
            DetailPayload::Unrecognized
        );
        assert_eq!(DetailPayload::classify(&json!(null)), DetailPayload::Unrecognized);
        assert!(DetailPayload::Unrecognized.book().is_none());
    }

    #[test]
    fn classify_renders_numeric_book_id() {
        let payload = DetailPayload::classify(&json!({"bookId": 42000, "bookName": "Numbers"}));
        assert_eq!(payload.into_book(), Some(summary("42000", "Numbers")));
    }

    #[test]
    fn parse_episode_list_accepts_wrapped_data_in_served_order() {
        let raw = r#"{"data":[
            {"chapterId":"b","chapterIndex":1,"chapterImg":"b.jpg","cdnList":[]},
            {"chapterId":"a","chapterIndex":0,"chapterImg":"a.jpg","cdnList":[
                {"isDefault":1,"videoPathList":[{"quality":"hd","videoPath":"a.mp4","isDefault":1}]}
            ]}
        ]}"#;

        let episodes = parse_episode_list(raw).expect("list should parse");
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].chapter_id, "b");
        assert_eq!(episodes[1].chapter_id, "a");
        let variant = &episodes[1].cdn_list[0].video_path_list[0];
        assert_eq!(variant.quality, None);
        assert!(variant.is_default());
    }

    #[test]
    fn parse_episode_list_accepts_bare_array() {
        let raw = r#"[{"chapterId":101,"chapterIndex":0}]"#;
        let episodes = parse_episode_list(raw).expect("bare array should parse");
        assert_eq!(episodes[0].chapter_id, "101");
        assert!(episodes[0].cdn_list.is_empty());
    }

    #[test]
    fn parse_episode_list_rejects_object_without_data_array() {
        assert!(parse_episode_list(r#"{"error":"rate limited"}"#).is_err());
        assert!(parse_episode_list(r#"{"data":null}"#).is_err());
        assert!(parse_episode_list(r#"{"data":[]}"#).expect("empty list").is_empty());
    }

    #[test]
    fn whole_float_qualities_count_as_numbers() {
        let raw = r#"[{"chapterId":"a","cdnList":[{"videoPathList":[
            {"quality":720.0,"videoPath":"a.mp4"},
            {"quality":540.5,"videoPath":"b.mp4"},
            {"quality":-1,"videoPath":"c.mp4"},
            {"quality":1080,"videoPath":"d.mp4"}
        ]}]}]"#;
        let episodes = parse_episode_list(raw).expect("list should parse");
        let qualities: Vec<Option<u32>> = episodes[0].cdn_list[0]
            .video_path_list
            .iter()
            .map(|variant| variant.quality)
            .collect();
        assert_eq!(qualities, vec![Some(720), None, None, Some(1080)]);
    }
}
