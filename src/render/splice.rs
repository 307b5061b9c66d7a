//! Single-pass text substitution.
//!
//! Replacements are collected as byte-range edits against the original text
//! and applied once, so a replacement can never be matched again by a later
//! key. A key only matches where its occurrence is not already claimed and
//! is not followed by an ASCII alphanumeric character (`https://t.co/ab` must
//! not match inside `https://t.co/abc`, but `https://t.co/abです` holds a
//! complete link).

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

/// Pending edits over a borrowed source text.
///
#[derive(Debug)]
pub struct Splice<'a> {
    source: &'a str,
    edits: Vec<Edit>,
    appended: Vec<String>,
}

impl<'a> Splice<'a> {
    pub fn new(source: &'a str) -> Self {
        Splice {
            source,
            edits: Vec::new(),
            appended: Vec::new(),
        }
    }

    fn is_free(&self, start: usize, end: usize) -> bool {
        self.edits.iter().all(|e| end <= e.start || start >= e.end)
    }

    fn ends_on_boundary(&self, end: usize) -> bool {
        self.source[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric())
    }

    fn free_occurrences(&self, key: &str) -> Vec<(usize, usize)> {
        if key.is_empty() {
            return Vec::new();
        }
        self.source
            .match_indices(key)
            .map(|(start, matched)| (start, start + matched.len()))
            .filter(|&(start, end)| self.is_free(start, end) && self.ends_on_boundary(end))
            .collect()
    }

    /// Replace the first unclaimed occurrence of `key`. Returns whether one
    /// was found.
    ///
    pub fn replace_first(&mut self, key: &str, replacement: &str) -> bool {
        match self.free_occurrences(key).first() {
            Some(&(start, end)) => {
                self.edits.push(Edit {
                    start,
                    end,
                    replacement: replacement.to_owned(),
                });
                true
            }
            None => false,
        }
    }

    /// Replace every unclaimed occurrence of `key`. Returns the count.
    ///
    pub fn replace_all(&mut self, key: &str, replacement: &str) -> usize {
        let occurrences = self.free_occurrences(key);
        for &(start, end) in &occurrences {
            self.edits.push(Edit {
                start,
                end,
                replacement: replacement.to_owned(),
            });
        }
        occurrences.len()
    }

    /// Remove the first unclaimed occurrence of `key` together with the
    /// whitespace around it. Whitespace before the link is always consumed.
    /// Whitespace after it is consumed entirely when nothing but whitespace
    /// follows or precedes it; otherwise a single separator is kept so the
    /// following token stays apart from the preceding one.
    ///
    pub fn remove_link(&mut self, key: &str) -> bool {
        let (link_start, link_end) = match self.free_occurrences(key).first() {
            Some(&occurrence) => occurrence,
            None => return false,
        };

        let leading: usize = self.source[..link_start]
            .chars()
            .rev()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        let trailing: Vec<char> = self.source[link_end..]
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        let trailing_len: usize = trailing.iter().map(|c| c.len_utf8()).sum();

        let start = link_start - leading;
        let end = if link_end + trailing_len == self.source.len() || start == 0 {
            link_end + trailing_len
        } else {
            link_end + trailing_len - trailing.last().map_or(0, |c| c.len_utf8())
        };

        let (start, end) = if self.is_free(start, end) {
            (start, end)
        } else {
            (link_start, link_end)
        };
        self.edits.push(Edit {
            start,
            end,
            replacement: String::new(),
        });
        true
    }

    /// Remove every unclaimed occurrence of `key` the way `remove_link`
    /// does. Returns the count.
    ///
    pub fn remove_links(&mut self, key: &str) -> usize {
        let mut removed = 0;
        while self.remove_link(key) {
            removed += 1;
        }
        removed
    }

    /// Queue text to be added after the body, separated by a space.
    ///
    pub fn append(&mut self, text: &str) {
        self.appended.push(text.to_owned());
    }

    /// Apply every edit in one pass and return the result.
    ///
    pub fn apply(self) -> String {
        let mut edits = self.edits;
        edits.sort_by_key(|e| e.start);

        let mut result = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for edit in edits {
            result.push_str(&self.source[cursor..edit.start]);
            result.push_str(&edit.replacement);
            cursor = edit.end;
        }
        result.push_str(&self.source[cursor..]);

        for text in self.appended {
            result.push(' ');
            result.push_str(&text);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(text: &str, key: &str) -> String {
        let mut splice = Splice::new(text);
        assert!(splice.remove_link(key));
        splice.apply()
    }

    #[test]
    fn test_replacements_do_not_chain() {
        let mut splice = Splice::new("go https://t.co/a now");
        splice.replace_all("https://t.co/a", "https://t.co/b");
        splice.replace_all("https://t.co/b", "https://example.com");
        assert_eq!(splice.apply(), "go https://t.co/b now");
    }

    #[test]
    fn test_replace_all_and_first() {
        let mut splice = Splice::new("x https://t.co/a y https://t.co/a");
        assert!(splice.replace_first("https://t.co/a", "A"));
        assert_eq!(splice.replace_all("https://t.co/a", "B"), 1);
        assert_eq!(splice.apply(), "x A y B");
    }

    #[test]
    fn test_claimed_occurrence_is_not_found_again() {
        let mut splice = Splice::new("pic https://t.co/p");
        assert!(splice.replace_first("https://t.co/p", "one.jpg"));
        assert!(!splice.replace_first("https://t.co/p", "two.jpg"));
        splice.append("two.jpg");
        assert_eq!(splice.apply(), "pic one.jpg two.jpg");
    }

    #[test]
    fn test_prefix_key_does_not_match_longer_link() {
        let mut splice = Splice::new("https://t.co/abc");
        assert_eq!(splice.replace_all("https://t.co/ab", "X"), 0);
        assert_eq!(splice.replace_all("https://t.co/abc", "Y"), 1);
        assert_eq!(splice.apply(), "Y");
    }

    #[test]
    fn test_key_followed_by_non_ascii_letter_matches() {
        let mut splice = Splice::new("詳細は https://t.co/xyzです");
        assert_eq!(splice.replace_all("https://t.co/xyz", "https://example.com/page"), 1);
        assert_eq!(splice.apply(), "詳細は https://example.com/pageです");
    }

    #[test]
    fn test_empty_key_never_matches() {
        let mut splice = Splice::new("text");
        assert!(!splice.replace_first("", "X"));
        assert_eq!(splice.apply(), "text");
    }

    #[test]
    fn test_remove_link_at_end() {
        assert_eq!(
            removed("check this out https://t.co/abc", "https://t.co/abc"),
            "check this out"
        );
        assert_eq!(
            removed("check this out https://t.co/abc   ", "https://t.co/abc"),
            "check this out"
        );
    }

    #[test]
    fn test_remove_link_mid_sentence_keeps_following_token() {
        assert_eq!(
            removed("check https://t.co/abc more", "https://t.co/abc"),
            "check more"
        );
        assert_eq!(
            removed("check   https://t.co/abc   more", "https://t.co/abc"),
            "check more"
        );
    }

    #[test]
    fn test_remove_link_at_start() {
        assert_eq!(removed("https://t.co/abc hello", "https://t.co/abc"), "hello");
    }

    #[test]
    fn test_remove_link_before_punctuation() {
        assert_eq!(removed("wow https://t.co/abc!", "https://t.co/abc"), "wow!");
    }

    #[test]
    fn test_remove_links_takes_every_copy() {
        let mut splice = Splice::new("a https://t.co/q b https://t.co/q");
        assert_eq!(splice.remove_links("https://t.co/q"), 2);
        assert_eq!(splice.apply(), "a b");
    }

    #[test]
    fn test_remove_missing_link() {
        let mut splice = Splice::new("nothing here");
        assert!(!splice.remove_link("https://t.co/abc"));
        assert_eq!(splice.apply(), "nothing here");
    }
}
