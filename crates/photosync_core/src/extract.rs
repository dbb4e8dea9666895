use serde_json::Value;
use url::Url;

use crate::album::json_identifier;
use crate::{ActivityContext, AlbumDirectory, TransferItem, DEFAULT_ALBUM_NAME};

/// Record fields holding a picture URL, best quality first.
const URL_FIELDS: [&str; 3] = ["origin_img", "big_img", "pic_url"];
const ALBUM_KEY_PARAM: &str = "key";
const UNNAMED_FILE: &str = "unnamed.jpg";

/// Turns the records of one media listing into transfer items, in record order.
///
/// Records without any usable URL are skipped; the album name comes from the
/// listing's `key` query parameter.
pub fn extract_items(
    target: &str,
    records: &[Value],
    albums: &AlbumDirectory,
    activity: &ActivityContext,
) -> Vec<TransferItem> {
    let album_name = album_key(target)
        .map(|key| albums.resolve(&key))
        .unwrap_or(DEFAULT_ALBUM_NAME);

    records
        .iter()
        .filter_map(|record| {
            let url = best_url(record)?;
            Some(TransferItem::new(
                url,
                display_name(record),
                album_name,
                activity.name(),
            ))
        })
        .collect()
}

/// The `key` query parameter of a request target, absolute or relative.
pub fn album_key(target: &str) -> Option<String> {
    let parsed = match Url::parse(target) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse("http://localhost/").ok()?;
            base.join(target).ok()?
        }
        Err(_) => return None,
    };
    parsed
        .query_pairs()
        .find(|(name, _)| name == ALBUM_KEY_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Protocol-relative URLs become `https:` URLs; everything else is kept as is.
pub fn normalize_url(raw: &str) -> String {
    if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    }
}

fn best_url(record: &Value) -> Option<String> {
    URL_FIELDS
        .iter()
        .filter_map(|field| record.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|raw| !raw.is_empty())
        .map(normalize_url)
}

fn display_name(record: &Value) -> String {
    if let Some(name) = record
        .get("pic_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
    {
        return name.to_string();
    }
    match record.get("id").and_then(json_identifier) {
        Some(id) => format!("{id}.jpg"),
        None => UNNAMED_FILE.to_string(),
    }
}
