//! Categorized keyword vocabulary.
//!
//! The lexicon is built once at startup and shared by read-only reference
//! into the classifier. Keywords are matched as exact substrings of the
//! utterance (no tokenization or stemming), which keeps matching reliable
//! for CJK text where whitespace-delimited tokens do not exist.

use serde::{Deserialize, Serialize};

/// The six keyword categories the classifier scores against.
///
/// Categories are disjoint in storage, but a substring of an utterance may
/// be matched by keywords from several categories independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    /// Faults, warnings, hazards: conditions needing an immediate answer.
    Emergency,
    /// Vehicle systems and component names.
    Technical,
    /// Service and upkeep vocabulary.
    Maintenance,
    /// Cabin features and equipment.
    Feature,
    /// Interrogative particles, used for feature flags only.
    Question,
    /// Travel, entertainment, and open-ended chat vocabulary.
    Creative,
}

impl KeywordCategory {
    /// All categories, in lexicon storage order.
    pub const ALL: [KeywordCategory; 6] = [
        KeywordCategory::Emergency,
        KeywordCategory::Technical,
        KeywordCategory::Maintenance,
        KeywordCategory::Feature,
        KeywordCategory::Question,
        KeywordCategory::Creative,
    ];
}

// =============================================================================
// Built-in vocabulary
// =============================================================================

static EMERGENCY_WORDS: &[&str] = &[
    "故障", "警告", "危险", "紧急", "异常", "失灵", "失效", "损坏", "发动机故障",
    "制动故障", "转向故障", "电气故障", "安全气囊", "ABS故障",
];

static TECHNICAL_WORDS: &[&str] = &[
    "发动机", "制动", "变速箱", "电气", "空调", "转向", "悬挂", "轮胎", "机油",
    "冷却液", "制动液", "变速箱油", "电瓶", "发电机", "起动机",
];

static MAINTENANCE_WORDS: &[&str] = &[
    "保养", "维修", "更换", "检查", "清洁", "调整", "润滑", "紧固", "定期保养",
    "机油更换", "滤清器", "火花塞", "制动片", "轮胎更换",
];

static FEATURE_WORDS: &[&str] = &[
    "自动泊车", "车道保持", "定速巡航", "导航", "娱乐", "空调控制", "座椅调节",
    "后视镜", "雨刷", "灯光", "音响", "蓝牙",
];

static QUESTION_WORDS: &[&str] = &[
    "什么", "怎么", "如何", "为什么", "哪里", "何时", "多少", "哪个", "吗", "呢",
    "嘛", "能不能", "可不可以", "有没有", "推荐一下", "怎么去", "去哪里", "怎么玩",
];

static CREATIVE_WORDS: &[&str] = &[
    "推荐", "建议", "想法", "创意", "优化", "改进", "设计", "规划", "旅游", "旅行",
    "出行", "景点", "门票", "酒店", "民宿", "机票", "火车票", "高铁", "行程", "路线",
    "攻略", "签证", "租车", "自驾", "海岛", "海滩", "公园", "博物馆", "古镇", "温泉",
    "夜市", "特产", "美食", "摄影", "网红", "打卡", "露营", "徒步", "游玩", "娱乐",
    "主题乐园", "游乐园", "迪士尼", "环球影城", "水上乐园", "演唱会", "音乐节",
    "展览", "赛事", "滑雪", "潜水", "骑行", "登山", "预订", "订票", "订酒店",
    "退改签", "行李", "登机", "值机", "改签", "延误", "转机", "天气", "笑话", "故事",
    "新闻", "百科", "科普", "翻译", "计算", "单位换算", "今天", "明天", "现在",
    "附近", "哪里有", "怎么走",
];

// =============================================================================
// KeywordLexicon
// =============================================================================

/// Immutable categorized keyword store.
///
/// Lookups are linear scans over small per-category lists, which is adequate
/// at this vocabulary size; swapping in a set or trie per category would not
/// change observable behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordLexicon {
    categories: Vec<(KeywordCategory, Vec<String>)>,
}

impl KeywordLexicon {
    /// Build the default in-car assistant vocabulary.
    pub fn builtin() -> Self {
        let own = |words: &[&str]| words.iter().map(|w| (*w).to_string()).collect();
        Self {
            categories: vec![
                (KeywordCategory::Emergency, own(EMERGENCY_WORDS)),
                (KeywordCategory::Technical, own(TECHNICAL_WORDS)),
                (KeywordCategory::Maintenance, own(MAINTENANCE_WORDS)),
                (KeywordCategory::Feature, own(FEATURE_WORDS)),
                (KeywordCategory::Question, own(QUESTION_WORDS)),
                (KeywordCategory::Creative, own(CREATIVE_WORDS)),
            ],
        }
    }

    /// Build a lexicon from explicit category lists. Intended for tests and
    /// for alternative vocabularies shipped in configuration.
    pub fn from_categories(categories: Vec<(KeywordCategory, Vec<String>)>) -> Self {
        Self { categories }
    }

    /// A lexicon with no keywords at all.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// The keyword list for a category, empty if the category is absent.
    pub fn keywords(&self, category: KeywordCategory) -> &[String] {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, words)| words.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `keyword` is stored under `category`.
    pub fn contains(&self, category: KeywordCategory, keyword: &str) -> bool {
        self.keywords(category).iter().any(|w| w == keyword)
    }

    /// Iterate categories and their keyword lists in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (KeywordCategory, &[String])> {
        self.categories.iter().map(|(c, words)| (*c, words.as_slice()))
    }

    /// Total number of keywords across all categories.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, words)| words.len()).sum()
    }

    /// True if no category holds any keyword.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_all_categories() {
        let lexicon = KeywordLexicon::builtin();
        for category in KeywordCategory::ALL {
            assert!(
                !lexicon.keywords(category).is_empty(),
                "category {:?} should not be empty",
                category
            );
        }
    }

    #[test]
    fn test_builtin_counts() {
        let lexicon = KeywordLexicon::builtin();
        assert_eq!(lexicon.keywords(KeywordCategory::Emergency).len(), 14);
        assert_eq!(lexicon.keywords(KeywordCategory::Technical).len(), 15);
        assert_eq!(lexicon.keywords(KeywordCategory::Maintenance).len(), 14);
        assert_eq!(lexicon.keywords(KeywordCategory::Feature).len(), 12);
        assert_eq!(lexicon.keywords(KeywordCategory::Question).len(), 18);
        assert_eq!(lexicon.keywords(KeywordCategory::Creative).len(), 78);
    }

    #[test]
    fn test_contains() {
        let lexicon = KeywordLexicon::builtin();
        assert!(lexicon.contains(KeywordCategory::Emergency, "故障"));
        assert!(lexicon.contains(KeywordCategory::Technical, "发动机"));
        assert!(lexicon.contains(KeywordCategory::Creative, "旅游"));
        assert!(!lexicon.contains(KeywordCategory::Emergency, "旅游"));
        assert!(!lexicon.contains(KeywordCategory::Feature, "不存在的词"));
    }

    #[test]
    fn test_empty_lexicon() {
        let lexicon = KeywordLexicon::empty();
        assert!(lexicon.is_empty());
        assert_eq!(lexicon.len(), 0);
        assert!(lexicon.keywords(KeywordCategory::Emergency).is_empty());
    }

    #[test]
    fn test_from_categories() {
        let lexicon = KeywordLexicon::from_categories(vec![(
            KeywordCategory::Emergency,
            vec!["alert".to_string(), "mayday".to_string()],
        )]);
        assert_eq!(lexicon.len(), 2);
        assert!(lexicon.contains(KeywordCategory::Emergency, "mayday"));
        assert!(lexicon.keywords(KeywordCategory::Creative).is_empty());
    }

    #[test]
    fn test_lexicon_with_empty_lists_is_empty() {
        let lexicon = KeywordLexicon::from_categories(vec![
            (KeywordCategory::Emergency, vec![]),
            (KeywordCategory::Creative, vec![]),
        ]);
        assert!(lexicon.is_empty());
    }

    #[test]
    fn test_iter_preserves_storage_order() {
        let lexicon = KeywordLexicon::builtin();
        let order: Vec<KeywordCategory> = lexicon.iter().map(|(c, _)| c).collect();
        assert_eq!(order, KeywordCategory::ALL.to_vec());
    }

    #[test]
    fn test_keywords_within_category_are_distinct() {
        let lexicon = KeywordLexicon::builtin();
        for (category, words) in lexicon.iter() {
            let mut seen = std::collections::HashSet::new();
            for word in words {
                assert!(seen.insert(word), "duplicate {:?} in {:?}", word, category);
            }
        }
    }
}
