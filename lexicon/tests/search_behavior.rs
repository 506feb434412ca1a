//! End-to-end search behavior
//!
//! Exercises `Engine::search` over small deterministic corpora:
//! - the single-entry reference example
//! - pagination contract (1-indexed, size 0 = all, past-the-end = empty)
//! - predicate order independence
//! - phonetic patterns held to syllable boundaries
//! - malformed quantifiers failing open instead of rejecting the query
//! - invalid patterns reported as structured failures

use std::sync::Arc;

use lexicon::{Category, CorpusIndex, Engine, Entry, Query, QueryError, SearchConfig, StructureTag};
use lexicon_core::TableRomanizer;

fn romanizer() -> TableRomanizer {
    TableRomanizer::new()
        .with('中', &["zhōng", "zhòng"])
        .with('国', &["guó"])
        .with('人', &["rén"])
        .with('高', &["gāo"])
        .with('兴', &["xìng", "xīng"])
        .with('一', &["yī"])
        .with('心', &["xīn"])
        .with('意', &["yì"])
        .with('钟', &["zhōng"])
        .with('宗', &["zōng"])
        .with('教', &["jiào"])
        .with('天', &["tiān"])
        .with('下', &["xià"])
        .with('安', &["ān"])
        .with('先', &["xiān"])
        .with('仍', &["réng"])
        .with('棱', &["léng"])
}

fn engine_over(texts: &[(&str, Category)]) -> Engine {
    let r = romanizer();
    let entries = texts
        .iter()
        .map(|(t, c)| Entry::new(t, *c, &r).unwrap())
        .collect();
    Engine::new(CorpusIndex::build(entries), Arc::new(r), SearchConfig::default())
}

fn corpus() -> Engine {
    engine_over(&[
        ("中国", Category::Word),
        ("中国人", Category::Word),
        ("高高兴兴", Category::Idiom),
        ("一心一意", Category::Idiom),
        ("钟", Category::Word),
        ("宗教", Category::Word),
        ("天下", Category::Word),
        ("一天", Category::Word),
    ])
}

fn texts(engine: &Engine, q: &Query) -> Vec<String> {
    engine
        .search_all(q)
        .unwrap()
        .iter()
        .map(|e| e.text().to_string())
        .collect()
}

#[test]
fn test_single_entry_reference_example() {
    let e = engine_over(&[("中国", Category::Word)]);
    let hit = vec!["中国".to_string()];

    assert_eq!(texts(&e, &Query::new().length(2)), hit);
    assert_eq!(texts(&e, &Query::new().initials("zg")), hit);
    assert!(texts(&e, &Query::new().rhyme("ong")).is_empty());
    assert_eq!(
        texts(&e, &Query::new().pattern("^zh.*$").phonetic(true)),
        hit
    );
    assert!(texts(&e, &Query::new().category(Category::Idiom)).is_empty());
}

#[test]
fn test_pagination_contract() {
    let e = corpus();
    let all = e.search(&Query::new(), 1, 0).unwrap();
    assert_eq!(all.entries.len(), 8);
    assert_eq!(all.total, 8);

    let p2 = e.search(&Query::new(), 2, 3).unwrap();
    let p2_texts: Vec<&str> = p2.entries.iter().map(|x| x.text()).collect();
    assert_eq!(p2_texts, vec!["一心一意", "钟", "宗教"]);
    assert_eq!(p2.total, 8);
    assert_eq!((p2.page, p2.page_size), (2, 3));

    let past = e.search(&Query::new(), 9, 3).unwrap();
    assert!(past.entries.is_empty());
    assert_eq!(past.total, 8);
}

#[test]
fn test_pagination_violations_precede_lookup() {
    let e = corpus();
    // an invalid pattern is never reached when the page is invalid
    let q = Query::new().pattern("(");
    assert_eq!(e.search(&q, 0, 10).unwrap_err(), QueryError::InvalidPage(0));
    assert_eq!(e.search(&q, 1, -5).unwrap_err(), QueryError::InvalidPageSize(-5));
}

#[test]
fn test_intersection_is_order_independent() {
    let e = corpus();
    let a = Query::new()
        .category(Category::Word)
        .starts_with("中一")
        .length(2);
    let b = Query::new()
        .length(2)
        .starts_with("一中")
        .category(Category::Word);
    assert_eq!(texts(&e, &a), texts(&e, &b));
    assert_eq!(texts(&e, &a), vec!["中国", "一天"]);
}

#[test]
fn test_structure_rhyme_and_tones() {
    let e = corpus();
    assert_eq!(
        texts(&e, &Query::new().structure(StructureTag::Aabb)),
        vec!["高高兴兴"]
    );
    assert_eq!(
        texts(&e, &Query::new().structure(StructureTag::Abac)),
        vec!["一心一意"]
    );
    assert_eq!(texts(&e, &Query::new().rhyme("uo")), vec!["中国"]);
    assert_eq!(texts(&e, &Query::new().tones("1,2,2")), vec!["中国人"]);
}

#[test]
fn test_character_set_filters() {
    let e = corpus();
    assert_eq!(
        texts(&e, &Query::new().ends_with("国天")),
        vec!["中国", "一天"]
    );
    assert_eq!(
        texts(&e, &Query::new().contains_all("国人")),
        vec!["中国人"]
    );
    // an empty set is no filter at all
    assert_eq!(texts(&e, &Query::new().starts_with("")).len(), 8);
    assert_eq!(texts(&e, &Query::new().contains_all(" ")).len(), 8);
}

#[test]
fn test_phonetic_pattern_matches_homophone_characters() {
    let e = corpus();
    // 钟 shares the reading of 中
    assert_eq!(
        texts(&e, &Query::new().pattern("^中$").phonetic(true)),
        vec!["钟"]
    );
    assert!(texts(&e, &Query::new().pattern("^中$")).is_empty());
    // fuzzy expansion reaches zong
    assert_eq!(
        texts(
            &e,
            &Query::new().pattern("^zhong").phonetic(true).homophone(true)
        ),
        vec!["中国", "中国人", "钟", "宗教"]
    );
}

#[test]
fn test_pattern_round_trip_matches_own_romanization_only() {
    let e = corpus();
    for entry in e.index().entries() {
        let pattern = format!("^{}$", entry.text());
        let got = texts(&e, &Query::new().pattern(&pattern).phonetic(true));
        for text in &got {
            let other = e.lookup(text).unwrap();
            assert_eq!(other.romanization_plain(), entry.romanization_plain());
        }
        assert!(got.contains(&entry.text().to_string()));
    }
}

#[test]
fn test_unanchored_pattern_does_not_match_inside_syllables() {
    let e = engine_over(&[("安", Category::Word), ("先", Category::Word)]);
    assert_eq!(texts(&e, &Query::new().pattern("安").phonetic(true)), vec!["安"]);
    assert_eq!(texts(&e, &Query::new().pattern("an").phonetic(true)), vec!["安"]);
    // a fragment is still a prefix search
    assert_eq!(texts(&e, &Query::new().pattern("xia").phonetic(true)), vec!["先"]);
}

#[test]
fn test_malformed_quantifiers_fail_open_in_phonetic_mode() {
    let e = corpus();
    for pattern in ["中{", ".{x}", "国}"] {
        let got = e.search(&Query::new().pattern(pattern).phonetic(true), 1, 0);
        assert!(got.is_ok(), "{pattern}: {got:?}");
        assert!(got.unwrap().entries.is_empty(), "{pattern}");
    }
    // {,n} reads as {0,n}
    let got = e
        .search(&Query::new().pattern(".{,3}").phonetic(true), 1, 0)
        .unwrap();
    assert_eq!(got.total, 8);
    let got = e.search(&Query::new().pattern("^一.{,1}$"), 1, 0).unwrap();
    let hits: Vec<&str> = got.entries.iter().map(|x| x.text()).collect();
    assert_eq!(hits, vec!["一天"]);
}

#[test]
fn test_first_page_uses_configured_size() {
    let r = romanizer();
    let entries = ["中国", "中国人", "钟", "宗教"]
        .iter()
        .map(|t| Entry::new(t, Category::Word, &r).unwrap())
        .collect();
    let config = SearchConfig {
        default_page_size: 3,
        ..SearchConfig::default()
    };
    let e = Engine::build(entries, Arc::new(r), config);
    let page = e.search_first_page(&Query::new()).unwrap();
    assert_eq!((page.page, page.page_size, page.total), (1, 3, 4));
    assert_eq!(page.entries.len(), 3);
}

#[test]
fn test_configured_similarity_drives_both_fuzzy_paths() {
    let r = romanizer();
    let entries = ["仍", "棱"]
        .iter()
        .map(|t| Entry::new(t, Category::Word, &r).unwrap())
        .collect();
    let mut config = SearchConfig::default();
    config.base_mut().similar_initials = vec!["r=l".to_string()];
    config.base_mut().similar_finals = Vec::new();
    let e = Engine::build(entries, Arc::new(r), config);

    let both = vec!["仍".to_string(), "棱".to_string()];
    assert_eq!(
        texts(&e, &Query::new().initials("r").homophone(true)),
        both
    );
    assert_eq!(
        texts(
            &e,
            &Query::new().pattern("^仍$").phonetic(true).homophone(true)
        ),
        both
    );
}

#[test]
fn test_syllable_quantifier_counts_syllables() {
    let e = corpus();
    let got = texts(&e, &Query::new().pattern("^.{3,4}$").phonetic(true));
    assert_eq!(got, vec!["中国人", "高高兴兴", "一心一意"]);
}

#[test]
fn test_invalid_pattern_is_structured_failure() {
    let e = corpus();
    let err = e
        .search(&Query::new().pattern("中(").phonetic(true), 1, 10)
        .unwrap_err();
    match err {
        QueryError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "中("),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = e.search(&Query::new().pattern("[a-"), 1, 10).unwrap_err();
    assert!(matches!(
        err,
        QueryError::InvalidPattern {
            transpiled: None,
            ..
        }
    ));
}

#[test]
fn test_fuzzy_initials_with_final_wildcard() {
    let e = corpus();
    // zh@g spells one full syllable then an initial
    assert_eq!(
        texts(&e, &Query::new().initials("zh@g")),
        vec!["中国"]
    );
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let e = corpus();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let e = e.clone();
            std::thread::spawn(move || e.search_all(&Query::new().length(2)).unwrap().len())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 4);
    }
}
