// src/backend/parse.rs

use super::ResponseShape;
use crate::{
    error::BackendError,
    models::{FormatRequest, NormalizedLinkResult},
};
use itertools::Itertools;
use serde_json::{Map, Value};

const ERROR_STATUSES: &[&str] = &["error", "fail", "failed"];

/// 读取非空字符串字段
fn text(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn malformed(msg: &str) -> BackendError {
    BackendError::Malformed(msg.to_string())
}

/// 响应中带有显式错误标记时直接判定失败
fn check_reported_error(doc: &Value) -> Result<(), BackendError> {
    let message = || {
        text(doc, "mess")
            .or_else(|| text(doc, "message"))
            .or_else(|| text(doc, "error"))
            .unwrap_or_else(|| "未提供错误信息".to_string())
    };

    if let Some(status) = text(doc, "status")
        && ERROR_STATUSES.iter().any(|s| status.eq_ignore_ascii_case(s))
    {
        return Err(BackendError::Reported(message()));
    }
    match doc.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(()),
        Some(other) => Err(BackendError::Reported(
            other.as_str().map(str::to_string).unwrap_or_else(|| other.to_string()),
        )),
    }
}

/// 把各后端的响应统一成 `NormalizedLinkResult`。主链接为空视为失败。
pub fn normalize(
    shape: ResponseShape,
    doc: &Value,
    format: &FormatRequest,
) -> Result<NormalizedLinkResult, BackendError> {
    if !doc.is_object() {
        return Err(malformed("响应顶层不是对象"));
    }
    check_reported_error(doc)?;

    let result = match shape {
        ResponseShape::LinkGroups => from_link_groups(doc, format)?,
        ResponseShape::DirectLink => from_direct_link(doc)?,
        ResponseShape::LinkList => from_link_list(doc)?,
    };

    if result.is_usable() {
        Ok(result)
    } else {
        Err(malformed("主链接为空"))
    }
}

/// 整数键按数值升序排在前面，其余键保持原有顺序，与上游服务遍历条目的方式一致
fn ordered_entries(group: &Map<String, Value>) -> Vec<(&str, &Value)> {
    let (mut numeric, other): (Vec<_>, Vec<_>) = group
        .iter()
        .map(|(key, entry)| (key.as_str(), entry))
        .partition(|(key, _)| key.parse::<u64>().is_ok());
    numeric.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
    numeric.extend(other);
    numeric
}

/// `links.<mp3|mp4>.<key>.k`。依次匹配：键等于格式代码、`q` 等于请求标签、`f` 等于容器类型，
/// 都不命中时取第一个条目
fn from_link_groups(doc: &Value, format: &FormatRequest) -> Result<NormalizedLinkResult, BackendError> {
    let group_key = if format.is_audio { "mp3" } else { "mp4" };
    let group: &Map<String, Value> = doc
        .get("links")
        .and_then(|l| l.get(group_key))
        .and_then(Value::as_object)
        .ok_or_else(|| BackendError::Malformed(format!("缺少 links.{} 字段", group_key)))?;

    let entries: Vec<(&str, &Value, String)> = ordered_entries(group)
        .into_iter()
        .filter_map(|(key, entry)| text(entry, "k").map(|k| (key, entry, k)))
        .collect();
    if entries.is_empty() {
        return Err(BackendError::Malformed(format!("links.{} 中没有可用条目", group_key)));
    }

    let field_matches = |entry: &Value, field: &str, expected: &str| {
        text(entry, field).is_some_and(|v| v.eq_ignore_ascii_case(expected))
    };
    let chosen = entries
        .iter()
        .position(|(key, _, _)| *key == format.code)
        .or_else(|| entries.iter().position(|(_, e, _)| field_matches(*e, "q", &format.label)))
        .or_else(|| entries.iter().position(|(_, e, _)| field_matches(*e, "f", group_key)))
        .unwrap_or(0);

    let primary_link = entries[chosen].2.clone();
    let alternative_links = entries
        .iter()
        .map(|(_, _, k)| k.clone())
        .filter(|k| *k != primary_link)
        .unique()
        .collect();

    Ok(NormalizedLinkResult {
        primary_link,
        alternative_links,
        title: text(doc, "title"),
        author: text(doc, "a").or_else(|| text(doc, "author")),
    })
}

/// `response.direct_link`
fn from_direct_link(doc: &Value) -> Result<NormalizedLinkResult, BackendError> {
    let response = doc
        .get("response")
        .filter(|r| r.is_object())
        .ok_or_else(|| malformed("缺少 response 字段"))?;
    let primary_link = text(response, "direct_link").ok_or_else(|| malformed("缺少 response.direct_link 字段"))?;

    let alternative_links = response
        .get("alternatives")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty() && *s != primary_link)
                .map(str::to_string)
                .unique()
                .collect()
        })
        .unwrap_or_default();

    Ok(NormalizedLinkResult {
        primary_link,
        alternative_links,
        title: text(response, "title"),
        author: text(response, "author"),
    })
}

/// `links[0].url`，其余条目作为备选
fn from_link_list(doc: &Value) -> Result<NormalizedLinkResult, BackendError> {
    let urls: Vec<String> = doc
        .get("links")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("缺少 links 数组"))?
        .iter()
        .filter_map(|entry| text(entry, "url"))
        .unique()
        .collect();

    let mut urls = urls.into_iter();
    let primary_link = urls.next().ok_or_else(|| malformed("links 数组中没有 url"))?;

    Ok(NormalizedLinkResult {
        primary_link,
        alternative_links: urls.collect(),
        title: text(doc, "title"),
        author: text(doc, "author"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fmt(label: &str, code: &str, is_audio: bool) -> FormatRequest {
        FormatRequest { label: label.into(), code: code.into(), is_audio }
    }

    fn y2mate_doc() -> Value {
        json!({
            "status": "ok",
            "mess": "",
            "vid": "abc12345678",
            "title": "Some Title",
            "a": "Some Channel",
            "links": {
                "mp4": {
                    "137": { "f": "mp4", "q": "1080p", "k": "https://dl.test/1080" },
                    "18":  { "f": "mp4", "q": "360p",  "k": "https://dl.test/360" },
                    "22":  { "f": "mp4", "q": "720p",  "k": "https://dl.test/720" }
                },
                "mp3": {
                    "mp3128": { "f": "mp3", "q": "128kbps", "k": "https://dl.test/audio" }
                }
            }
        })
    }

    #[test]
    fn link_groups_prefer_requested_quality() {
        let r = normalize(ResponseShape::LinkGroups, &y2mate_doc(), &fmt("720p", "22", false)).unwrap();
        assert_eq!(r.primary_link, "https://dl.test/720");
        assert_eq!(r.alternative_links.len(), 2);
        assert!(!r.alternative_links.contains(&r.primary_link));
        assert_eq!(r.title.as_deref(), Some("Some Title"));
        assert_eq!(r.author.as_deref(), Some("Some Channel"));
    }

    #[test]
    fn link_groups_pick_audio_group_for_audio_codes() {
        let r = normalize(ResponseShape::LinkGroups, &y2mate_doc(), &fmt("mp3", "140", true)).unwrap();
        assert_eq!(r.primary_link, "https://dl.test/audio");
        assert!(r.alternative_links.is_empty());
    }

    #[test]
    fn link_groups_prefer_entry_keyed_by_format_code() {
        let r = normalize(ResponseShape::LinkGroups, &y2mate_doc(), &fmt("mp4", "18", false)).unwrap();
        assert_eq!(r.primary_link, "https://dl.test/360");
        assert_eq!(r.alternative_links, ["https://dl.test/720", "https://dl.test/1080"]);
    }

    #[test]
    fn link_groups_fall_back_to_container_match_in_numeric_key_order() {
        let doc = json!({ "links": { "mp4": {
            "137": { "f": "mp4", "q": "1080p", "k": "K137" },
            "22":  { "f": "mp4", "q": "720p",  "k": "K22" },
            "auto": { "f": "webm", "q": "auto", "k": "Kauto" },
            "18":  { "f": "mp4", "q": "360p",  "k": "K18" }
        }}});
        // 请求的代码不存在时按整数键升序取第一个 mp4 条目，而不是按字典序
        let r = normalize(ResponseShape::LinkGroups, &doc, &fmt("mp4", "43", false)).unwrap();
        assert_eq!(r.primary_link, "K18");
        assert_eq!(r.alternative_links, ["K22", "K137", "Kauto"]);
    }

    #[test]
    fn link_groups_use_first_entry_when_nothing_matches() {
        let doc = json!({ "links": { "mp4": {
            "b": { "q": "x", "k": "Kb" },
            "a": { "q": "y", "k": "Ka" },
            "5": { "q": "z", "k": "K5" }
        }}});
        let r = normalize(ResponseShape::LinkGroups, &doc, &fmt("mp4", "18", false)).unwrap();
        assert_eq!(r.primary_link, "K5");
    }

    #[test]
    fn missing_group_is_malformed() {
        let doc = json!({ "links": { "mp3": {} } });
        let err = normalize(ResponseShape::LinkGroups, &doc, &fmt("mp4", "18", false)).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn entries_without_key_are_skipped() {
        let doc = json!({ "links": { "mp4": { "a": { "f": "mp4", "k": "" }, "b": { "f": "mp4" } } } });
        assert!(normalize(ResponseShape::LinkGroups, &doc, &fmt("mp4", "18", false)).is_err());
    }

    #[test]
    fn direct_link_shape() {
        let doc = json!({ "response": {
            "direct_link": "https://cdn.test/v.mp4",
            "alternatives": ["https://cdn.test/v.mp4", "https://mirror.test/v.mp4", 42],
            "title": "T"
        }});
        let r = normalize(ResponseShape::DirectLink, &doc, &fmt("mp4", "18", false)).unwrap();
        assert_eq!(r.primary_link, "https://cdn.test/v.mp4");
        assert_eq!(r.alternative_links, ["https://mirror.test/v.mp4"]);
        assert_eq!(r.title.as_deref(), Some("T"));
    }

    #[test]
    fn link_list_shape() {
        let doc = json!({ "links": [ { "url": "https://a.test/1" }, { "quality": "hd" }, { "url": "https://a.test/2" } ] });
        let r = normalize(ResponseShape::LinkList, &doc, &fmt("mp4", "18", false)).unwrap();
        assert_eq!(r.primary_link, "https://a.test/1");
        assert_eq!(r.alternative_links, ["https://a.test/2"]);
    }

    #[test]
    fn explicit_error_fields_are_reported() {
        for doc in [
            json!({ "status": "error", "mess": "Video not found" }),
            json!({ "error": "quota exceeded", "links": [] }),
            json!({ "error": { "code": 500 } }),
        ] {
            let err = normalize(ResponseShape::LinkList, &doc, &fmt("mp4", "18", false)).unwrap_err();
            assert!(matches!(err, BackendError::Reported(_)), "{}", doc);
        }
    }

    #[test]
    fn shape_drift_never_panics() {
        let docs = [
            json!(null),
            json!([1, 2, 3]),
            json!("links"),
            json!({ "links": "nope" }),
            json!({ "links": { "mp4": [1] } }),
            json!({ "response": { "direct_link": 7 } }),
            json!({ "response": "direct_link" }),
        ];
        for shape in [ResponseShape::LinkGroups, ResponseShape::DirectLink, ResponseShape::LinkList] {
            for doc in &docs {
                assert!(normalize(shape, doc, &fmt("mp4", "18", false)).is_err());
            }
        }
    }
}
