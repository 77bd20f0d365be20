use serde::{Deserialize, Serialize};

/// Originating platform of a URL, derived purely from substring matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Wechat,
    Zhihu,
    Toutiao,
    Jianshu,
    Csdn,
    Juejin,
    Bilibili,
    Sspai,
    Douyin,
    Kuaishou,
    Xigua,
    Other,
}

/// Ordered detection table. First match wins, so the more specific hosts
/// (`mp.weixin.qq.com`, `v.douyin.com`) sit above the broader ones. None of
/// the substrings overlap in practice, but the fixed order keeps detection
/// deterministic if that ever changes.
const SOURCE_RULES: &[(&str, Source)] = &[
    ("mp.weixin.qq.com", Source::Wechat),
    ("v.douyin.com", Source::Douyin),
    ("douyin.com", Source::Douyin),
    ("bilibili.com", Source::Bilibili),
    ("b23.tv", Source::Bilibili),
    ("weixin.qq.com", Source::Wechat),
    ("video.qq.com", Source::Wechat),
    ("kuaishou.com", Source::Kuaishou),
    ("ixigua.com", Source::Xigua),
    ("zhihu.com", Source::Zhihu),
    ("toutiao.com", Source::Toutiao),
    ("toutiao.cn", Source::Toutiao),
    ("jianshu.com", Source::Jianshu),
    ("csdn.net", Source::Csdn),
    ("juejin.cn", Source::Juejin),
    ("sspai.com", Source::Sspai),
];

impl Source {
    /// Classify a URL. Pure, no I/O, case-insensitive; anything unparsable or
    /// unknown is simply `Other`.
    pub fn detect(url: &str) -> Source {
        let lower = url.to_lowercase();
        SOURCE_RULES
            .iter()
            .find(|(needle, _)| lower.contains(needle))
            .map(|&(_, source)| source)
            .unwrap_or(Source::Other)
    }

    /// Placeholder title used when extraction yields nothing for a video.
    pub fn default_title(&self) -> &'static str {
        match self {
            Source::Douyin => "抖音视频",
            Source::Bilibili => "B站视频",
            Source::Wechat => "微信视频",
            Source::Kuaishou => "快手视频",
            Source::Xigua => "西瓜视频",
            _ => "视频",
        }
    }

    /// Stable lowercase tag, as persisted on articles and videos.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Wechat => "wechat",
            Source::Zhihu => "zhihu",
            Source::Toutiao => "toutiao",
            Source::Jianshu => "jianshu",
            Source::Csdn => "csdn",
            Source::Juejin => "juejin",
            Source::Bilibili => "bilibili",
            Source::Sspai => "sspai",
            Source::Douyin => "douyin",
            Source::Kuaishou => "kuaishou",
            Source::Xigua => "xigua",
            Source::Other => "other",
        }
    }

    /// Douyin share links are short links that must be expanded before the
    /// content page can be fetched.
    pub fn needs_redirect(&self, url: &str) -> bool {
        *self == Source::Douyin && url.to_lowercase().contains("v.douyin.com")
    }
}
