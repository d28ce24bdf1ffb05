// src/extractor/rules.rs

use crate::models::VideoIdentifier;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// 已知的链接形态，按匹配顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Rule {
    /// `watch?v=<id>`
    QueryParam,
    /// `/shorts/<id>`、`/embed/<id>`、`/v/<id>`
    PathSegment(&'static str),
    /// `youtu.be/<id>`
    ShortHost,
}

pub(super) const RULES: [Rule; 5] = [
    Rule::QueryParam,
    Rule::PathSegment("shorts"),
    Rule::PathSegment("embed"),
    Rule::PathSegment("v"),
    Rule::ShortHost,
];

// 与 RULES 一一对应，用于无法解析为 URL 的输入
static RAW_PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        Regex::new(r"[?&]v=([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"/shorts/([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"/embed/([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"/v/([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"youtu\.be/([A-Za-z0-9_-]+)").unwrap(),
    ]
});

/// 取出字符串开头连续的合法 ID 字符
fn leading_id(s: &str) -> Option<VideoIdentifier> {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(s.len());
    VideoIdentifier::parse(&s[..end])
}

pub(super) fn host_matches(host: &str, accepted: &str) -> bool {
    host == accepted
        || host
            .strip_suffix(accepted)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

impl Rule {
    pub(super) fn apply(&self, url: &Url) -> Option<VideoIdentifier> {
        match self {
            Rule::QueryParam => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .and_then(|(_, v)| leading_id(&v)),
            Rule::PathSegment(name) => {
                let mut segments = url.path_segments()?;
                if segments.next()? != *name {
                    return None;
                }
                leading_id(segments.next()?)
            }
            Rule::ShortHost => {
                let host = url.host_str()?.to_ascii_lowercase();
                if !crate::constants::SHORT_LINK_HOSTS.iter().any(|h| host_matches(&host, h)) {
                    return None;
                }
                leading_id(url.path_segments()?.next()?)
            }
        }
    }
}

/// 对原始文本逐条尝试正则，首个命中即返回
pub(super) fn match_raw(text: &str) -> Option<VideoIdentifier> {
    RAW_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| VideoIdentifier::parse(m.as_str()))
    })
}
