//! Global hashtag popularity table.
//!
//! Persisted as text, one `tag | pct%` line per tag, sorted by tag. Each
//! cycle's percentage for a tag overwrites the stored one; no averaging
//! across cycles.

use std::collections::BTreeMap;

use crate::normalize::normalize_tag;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashtagTable {
    entries: BTreeMap<String, f64>,
}

impl HashtagTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted text form.
    ///
    /// The percentage follows the last `|`, so tags may contain pipes. A line
    /// without `|` is a bare tag at 0%. A percentage that does not
    /// parse also reads as 0%. Blank lines are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let (tag, pct) = match line.rsplit_once('|') {
                Some((tag, pct)) => (tag, parse_percentage(pct)),
                None => (line, 0.0),
            };
            if let Some(tag) = normalize_tag(tag) {
                entries.insert(tag, pct);
            }
        }
        Self { entries }
    }

    /// Render the persisted text form, sorted by tag.
    #[must_use]
    pub fn render(&self) -> String {
        // `{:?}` keeps one fractional digit on whole numbers ("10.0%").
        self.entries
            .iter()
            .map(|(tag, pct)| format!("{tag} | {pct:?}%\n"))
            .collect()
    }

    /// Overwrite-merge one cycle's percentages into the table.
    ///
    /// Tags absent from `cycle` keep their stored value. Returns the number of
    /// tags written.
    pub fn merge(&mut self, cycle: &BTreeMap<String, f64>) -> usize {
        for (tag, pct) in cycle {
            self.entries.insert(tag.clone(), *pct);
        }
        cycle.len()
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<f64> {
        self.entries.get(tag).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, p)| (t.as_str(), *p))
    }

    /// Entries sorted by percentage descending, ties broken by tag.
    #[must_use]
    pub fn by_popularity(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .entries
            .iter()
            .map(|(t, p)| (t.clone(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

fn parse_percentage(raw: &str) -> f64 {
    raw.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0)
}

impl FromIterator<(String, f64)> for HashtagTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(t, p)| ((*t).to_string(), *p)).collect()
    }

    #[test]
    fn merge_overwrites_and_retains() {
        let mut table: HashtagTable = cycle(&[("a", 10.0), ("b", 5.0)]).into_iter().collect();
        table.merge(&cycle(&[("b", 8.0), ("c", 3.0)]));

        assert_eq!(table.get("a"), Some(10.0));
        assert_eq!(table.get("b"), Some(8.0));
        assert_eq!(table.get("c"), Some(3.0));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut table = HashtagTable::new();
        let new = cycle(&[("x", 1.5), ("y", 2.25)]);
        table.merge(&new);
        let once = table.clone();
        table.merge(&new);
        assert_eq!(table, once);
    }

    #[test]
    fn empty_cycle_leaves_table_unchanged() {
        let mut table: HashtagTable = cycle(&[("a", 10.0)]).into_iter().collect();
        let before = table.clone();
        assert_eq!(table.merge(&BTreeMap::new()), 0);
        assert_eq!(table, before);
    }

    #[test]
    fn render_is_sorted_by_tag() {
        let table: HashtagTable = cycle(&[("zebra", 12.5), ("apple", 10.0), ("mango", 33.33)])
            .into_iter()
            .collect();
        assert_eq!(
            table.render(),
            "apple | 10.0%\nmango | 33.33%\nzebra | 12.5%\n"
        );
    }

    #[test]
    fn parse_handles_legacy_lines() {
        let text = "Music | 12.5%\n\nbare tag\nbroken | n/a%\n  news|3%  \n";
        let table = HashtagTable::parse(text);
        assert_eq!(table.get("music"), Some(12.5));
        assert_eq!(table.get("bare tag"), Some(0.0));
        assert_eq!(table.get("broken"), Some(0.0));
        assert_eq!(table.get("news"), Some(3.0));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn tag_containing_pipe_survives_render_and_parse() {
        let table: HashtagTable = cycle(&[("rock", 40.0), ("rock|pop", 12.5)])
            .into_iter()
            .collect();
        let reloaded = HashtagTable::parse(&table.render());

        assert_eq!(reloaded, table);
        assert_eq!(reloaded.get("rock"), Some(40.0));
        assert_eq!(reloaded.get("rock|pop"), Some(12.5));
    }

    #[test]
    fn parse_reads_rendered_output() {
        let table: HashtagTable = cycle(&[("a", 1.0), ("b", 99.99)]).into_iter().collect();
        assert_eq!(HashtagTable::parse(&table.render()), table);
    }

    #[test]
    fn by_popularity_sorts_descending() {
        let table: HashtagTable = cycle(&[("a", 1.0), ("b", 5.0), ("c", 5.0)])
            .into_iter()
            .collect();
        let ranked: Vec<String> = table.by_popularity().into_iter().map(|(t, _)| t).collect();
        assert_eq!(ranked, vec!["b", "c", "a"]);
    }
}
