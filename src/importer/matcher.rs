// ==========================================
// 器具移动导入 - 相似度匹配器
// ==========================================
// 职责: 自由文本地点名 → 目录规范名称
// 算法: 规范化后精确匹配 → 编辑距离相似度 + 包含关系加权 → 阈值过滤
// 约束: 同分取目录遍历顺序靠前者（目录必须保序）
// ==========================================

use crate::domain::catalog::CatalogName;
use crate::importer::normalizer::normalize;
use serde::{Deserialize, Serialize};

/// 默认置信度阈值
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;

/// 包含关系成立时，相似度需超过此值才加权
const CONTAINMENT_MIN_SIMILARITY: f64 = 0.5;

/// 包含关系加权后的置信度下限
const CONTAINMENT_CONFIDENCE_FLOOR: f64 = 0.8;

// ==========================================
// MatchResult - 匹配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Option<String>,      // 命中的规范名称
    pub matched_index: Option<usize>, // 命中条目在目录中的位置
    pub confidence: f64,              // [0, 1]
    pub exact_match: bool,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            matched: None,
            matched_index: None,
            confidence: 0.0,
            exact_match: false,
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

/// 基于编辑距离的相似度 (0-1)
///
/// 两个空串视为完全相同（1.0）
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = strsim::levenshtein(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// 任一方包含另一方
fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

// ==========================================
// SimilarityMatcher
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct SimilarityMatcher {
    threshold: f64,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl SimilarityMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 在目录中查找最佳匹配
    ///
    /// # 返回
    /// - 精确匹配（规范化后相等）: confidence = 1.0, exact_match = true
    /// - 模糊匹配: 最高置信度 >= threshold 的条目
    /// - 无匹配 / 输入为空: MatchResult::none()
    pub fn best_match<T: CatalogName>(&self, input: &str, catalog: &[T]) -> MatchResult {
        if input.trim().is_empty() {
            return MatchResult::none();
        }

        let needle = normalize(input);
        let normalized: Vec<String> = catalog
            .iter()
            .map(|entry| normalize(entry.catalog_name()))
            .collect();

        if let Some(idx) = normalized.iter().position(|name| *name == needle) {
            return MatchResult {
                matched: Some(catalog[idx].catalog_name().to_string()),
                matched_index: Some(idx),
                confidence: 1.0,
                exact_match: true,
            };
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, name) in normalized.iter().enumerate() {
            let score = similarity(&needle, name);

            // 部分包含（如 "maca" vs "macae"）抬升置信度
            let confidence = if contains_either(name, &needle) && score > CONTAINMENT_MIN_SIMILARITY
            {
                score.max(CONTAINMENT_CONFIDENCE_FLOOR)
            } else {
                score
            };

            // 严格大于: 同分保留先遍历到的条目
            if best.map_or(true, |(_, top)| confidence > top) {
                best = Some((idx, confidence));
            }
        }

        match best {
            Some((idx, confidence)) if confidence >= self.threshold => MatchResult {
                matched: Some(catalog[idx].catalog_name().to_string()),
                matched_index: Some(idx),
                confidence,
                exact_match: false,
            },
            _ => MatchResult::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::LocationCatalogEntry;

    fn catalog(names: &[&str]) -> Vec<LocationCatalogEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| LocationCatalogEntry {
                location_id: (i + 1).to_string(),
                name: n.to_string(),
            })
            .collect()
    }

    fn stores() -> Vec<LocationCatalogEntry> {
        catalog(&[
            "MACAE",
            "CABO FRIO",
            "CAMPOS",
            "GRAJAU",
            "BOTAFOGO",
            "TIJUCA",
            "MARACANA",
            "BARRA",
            "BARRA DA TIJUCA",
        ])
    }

    #[test]
    fn test_similarity_basics() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert!((similarity("cabofrio", "cabo frio") - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_entry_matches_itself_exactly() {
        let matcher = SimilarityMatcher::default();
        let stores = stores();
        for (idx, entry) in stores.iter().enumerate() {
            let result = matcher.best_match(&entry.name, &stores);
            assert_eq!(result.matched.as_deref(), Some(entry.name.as_str()));
            assert_eq!(result.matched_index, Some(idx));
            assert_eq!(result.confidence, 1.0);
            assert!(result.exact_match);
        }
    }

    #[test]
    fn test_empty_input_returns_none() {
        let matcher = SimilarityMatcher::default();
        assert_eq!(matcher.best_match("", &stores()), MatchResult::none());
        assert_eq!(matcher.best_match("   ", &stores()), MatchResult::none());

        let empty: Vec<LocationCatalogEntry> = vec![];
        assert_eq!(matcher.best_match("", &empty), MatchResult::none());
    }

    #[test]
    fn test_cabo_frio_variants() {
        let matcher = SimilarityMatcher::default();
        for input in ["cabo frio", "CABOFRIO", "Cabo Frio", "cabofrio"] {
            let result = matcher.best_match(input, &stores());
            assert_eq!(result.matched.as_deref(), Some("CABO FRIO"), "input {:?}", input);
            assert!(result.confidence >= 0.7);
        }
    }

    #[test]
    fn test_diacritics_are_exact() {
        let matcher = SimilarityMatcher::default();
        let result = matcher.best_match("Macaé", &stores());
        assert_eq!(result.matched.as_deref(), Some("MACAE"));
        assert!(result.exact_match);

        let result = matcher.best_match("grajaú", &stores());
        assert_eq!(result.matched.as_deref(), Some("GRAJAU"));
        assert!(result.exact_match);
    }

    #[test]
    fn test_containment_boost() {
        let matcher = SimilarityMatcher::default();

        // "maca" ⊂ "macae": 相似度 0.8 → 加权后 0.8
        let result = matcher.best_match("maca", &stores());
        assert_eq!(result.matched.as_deref(), Some("MACAE"));
        assert!(!result.exact_match);
        assert!((result.confidence - 0.8).abs() < 1e-9);

        // "graja" ⊂ "grajau": 5/6
        let result = matcher.best_match("graja", &stores());
        assert_eq!(result.matched.as_deref(), Some("GRAJAU"));
        assert!((result.confidence - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_containment_requires_minimum_similarity() {
        // "barra" ⊂ "barra da tijuca" 但相似度仅 5/15，不加权
        let matcher = SimilarityMatcher::default();
        let only_long = catalog(&["BARRA DA TIJUCA"]);
        let result = matcher.best_match("barra", &only_long);
        assert_eq!(result, MatchResult::none());
    }

    #[test]
    fn test_unknown_input_below_threshold() {
        let matcher = SimilarityMatcher::default();
        let result = matcher.best_match("inexistente", &stores());
        assert_eq!(result.matched, None);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.exact_match);
    }

    #[test]
    fn test_tie_resolves_to_first_in_catalog_order() {
        let matcher = SimilarityMatcher::default();
        let tied = catalog(&["ABCD", "ABCE"]);
        let result = matcher.best_match("ABCX", &tied);
        assert_eq!(result.matched.as_deref(), Some("ABCD"));
        assert_eq!(result.matched_index, Some(0));

        let reversed = catalog(&["ABCE", "ABCD"]);
        let result = matcher.best_match("ABCX", &reversed);
        assert_eq!(result.matched.as_deref(), Some("ABCE"));
    }

    #[test]
    fn test_custom_threshold() {
        let strict = SimilarityMatcher::new(0.9);
        assert_eq!(strict.best_match("maca", &stores()).matched, None);

        let loose = SimilarityMatcher::new(0.5);
        assert_eq!(loose.best_match("maca", &stores()).matched.as_deref(), Some("MACAE"));
        assert_eq!(loose.threshold(), 0.5);
    }
}
