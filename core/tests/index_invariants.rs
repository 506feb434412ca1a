//! Index construction invariants
//!
//! Tests the per-entry attribute invariants and the structure of the
//! inverted maps built by `CorpusIndex::build`:
//! - one initial and one tone per character, mixed text included
//! - positions lists ascending and duplicate-free
//! - structural tags deterministic for ambiguous words

use lexicon_core::{
    Category, Config, CorpusIndex, Entry, FrequencyPosition, PinyinRomanizer, StructureTag,
    TableRomanizer,
};

fn romanizer() -> TableRomanizer {
    TableRomanizer::new()
        .with('一', &["yī"])
        .with('心', &["xīn"])
        .with('意', &["yì"])
        .with('行', &["xíng", "háng"])
        .with('人', &["rén"])
        .with('好', &["hǎo", "hào"])
        .with('的', &["de", "dí"])
        .with('天', &["tiān"])
}

fn entries() -> Vec<Entry> {
    let r = romanizer();
    vec![
        Entry::new("一心一意", Category::Idiom, &r).unwrap(),
        Entry::new("行人", Category::Word, &r).unwrap(),
        Entry::new("好的", Category::Word, &r).unwrap(),
        Entry::new("天天", Category::Word, &r).unwrap(),
        Entry::new("一", Category::Word, &r).unwrap(),
        Entry::new("好人A", Category::Riddle, &r).unwrap(),
    ]
}

#[test]
fn test_initials_and_tones_match_length() {
    for e in entries() {
        assert_eq!(e.initials().chars().count(), e.length(), "{}", e.text());
        assert_eq!(e.tones().split(',').count(), e.length(), "{}", e.text());
        assert_eq!(e.chars().len(), e.length());
    }
}

#[test]
fn test_first_reading_is_representative() {
    let idx = CorpusIndex::build(entries());
    let e = idx.entry(1).unwrap();
    assert_eq!(e.romanization(), "xíng rén");
    assert_eq!(e.romanization_plain(), "xing ren");
    assert_eq!(e.tones(), "2,2");

    let neutral = idx.entry(2).unwrap();
    assert_eq!(neutral.tones(), "3,0");
    assert_eq!(neutral.rhyme(), "e");
}

#[test]
fn test_positions_are_sorted_and_unique() {
    let idx = CorpusIndex::build(entries());
    for ch in ['一', '天', '好', '人'] {
        let list = idx.by_char(ch);
        assert!(list.windows(2).all(|w| w[0] < w[1]), "{ch}: {list:?}");
    }
    assert_eq!(idx.by_char('一'), &[0, 4]);
    assert_eq!(idx.by_char('天'), &[3]);
}

#[test]
fn test_map_lookups() {
    let idx = CorpusIndex::build(entries());
    assert_eq!(idx.by_structure(StructureTag::Abac), &[0]);
    assert_eq!(idx.by_rhyme("i"), &[0, 4]);
    assert_eq!(idx.by_length(1), &[4]);
    assert_eq!(idx.by_category(Category::Riddle), &[5]);
    assert_eq!(idx.by_initials("xr"), &[1]);
    assert_eq!(idx.by_plain("tian tian"), &[3]);
    assert!(idx.by_initials("zz").is_empty());
}

#[test]
fn test_mixed_text_clears_rhyme() {
    let idx = CorpusIndex::build(entries());
    let riddle = idx.entry(5).unwrap();
    assert_eq!(riddle.initials(), "hrA");
    assert_eq!(riddle.rhyme(), "");
    // only ideographs enter the syllable table
    assert!(!idx.is_known_syllable("A"));
}

#[test]
fn test_structure_tag_is_deterministic_for_identical_chars() {
    let r = TableRomanizer::new().with('哈', &["hā"]);
    for _ in 0..3 {
        let e = Entry::new("哈哈哈哈", Category::Word, &r).unwrap();
        assert_eq!(e.structure(), Some(StructureTag::Aabb));
    }
}

#[test]
fn test_custom_similarity_tables() {
    let cfg = Config {
        similar_initials: vec!["r=l".to_string()],
        similar_finals: vec![],
        ..Config::default()
    };
    let idx = CorpusIndex::build_with(entries(), &cfg.tables());
    let similar = idx.similar_to("ren").unwrap();
    assert!(similar.contains("len"));
    assert_eq!(similar.len(), 1);
    assert!(idx.similar_to("tian").is_none());
}

#[test]
fn test_statistics() {
    let idx = CorpusIndex::build(entries());
    let top = idx.frequency(FrequencyPosition::All).most_common(2);
    assert_eq!(top[0], ('一', 3));
    assert_eq!(idx.frequency(FrequencyPosition::End).get('人'), 1);
    assert_eq!(
        idx.category_counts(),
        vec![
            (Category::Idiom, 1),
            (Category::Word, 4),
            (Category::Riddle, 1)
        ]
    );
}

#[test]
fn test_pinyin_adapter_builds_entries() {
    let r = PinyinRomanizer::new();
    let e = Entry::new("中国", Category::Word, &r).unwrap();
    assert_eq!(e.romanization_plain(), "zhong guo");
    assert_eq!(e.initials(), "zg");
    assert_eq!(e.tones(), "1,2");
    assert_eq!(e.rhyme(), "uo");
}

#[test]
fn test_whitespace_in_text_keeps_syllable_table_aligned() {
    let r = TableRomanizer::new().with('中', &["zhōng"]).with('国', &["guó"]);
    let e = Entry::new("中 国", Category::Riddle, &r).unwrap();
    assert_eq!(e.syllables().count(), e.length());

    let idx = CorpusIndex::build(vec![e]);
    assert!(idx.chars_for_syllable("guo").is_some_and(|s| s.contains(&'国')));
    assert!(idx.chars_for_syllable("").is_none());
    assert!(idx.chars_for_syllable(" ").is_none());
}
