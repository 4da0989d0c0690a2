//! Natural ("human") ordering of file and folder names.
//!
//! Names are split into alternating runs of ASCII digits and non-digits. Digit
//! runs compare by value, so `img2` sorts before `img10`; text runs compare
//! case-insensitively; a digit run always sorts before a text run at the same
//! index. When every compared run is equal the name with fewer runs comes first.

use std::cmp::Ordering;
use std::path::Path;

/// A maximal run of digits or non-digits inside a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run<'a> {
    pub text: &'a str,
    pub numeric: bool,
}

impl Run<'_> {
    /// Numeric value of a digit run; overflow counts as 0
    fn value(&self) -> u64 {
        self.text.parse::<u64>().unwrap_or(0)
    }
}

/// Splits `input` into alternating digit / non-digit runs.
pub fn split_alphanumeric(input: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, ch) in input.char_indices() {
        let digit = ch.is_ascii_digit();
        match current {
            Some(numeric) if numeric != digit => {
                runs.push(Run {
                    text: &input[start..idx],
                    numeric,
                });
                start = idx;
                current = Some(digit);
            }
            None => current = Some(digit),
            _ => {}
        }
    }

    if let Some(numeric) = current {
        runs.push(Run {
            text: &input[start..],
            numeric,
        });
    }
    runs
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Compares two names in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = split_alphanumeric(a);
    let right = split_alphanumeric(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l.numeric, r.numeric) {
            (true, true) => l.value().cmp(&r.value()),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => cmp_ignore_case(l.text, r.text),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}

/// Orders files by their names without extension.
pub fn compare_files(a: &Path, b: &Path) -> Ordering {
    natural_cmp(&stem(a), &stem(b))
}

/// Orders folders by their final path component.
pub fn compare_folders(a: &Path, b: &Path) -> Ordering {
    natural_cmp(&name(a), &name(b))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_split_runs() {
        let runs: Vec<&str> = split_alphanumeric("img12b003")
            .iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(runs, vec!["img", "12", "b", "003"]);
        assert!(split_alphanumeric("").is_empty());
        assert!(split_alphanumeric("42")[0].numeric);
    }

    #[test]
    fn test_numbers_by_value() {
        assert_eq!(natural_cmp("img2", "img10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "9"), Ordering::Greater);
        assert_eq!(
            compare_files(Path::new("img2.jpg"), Path::new("img10.jpg")),
            Ordering::Less
        );
    }

    #[test]
    fn test_zero_padding_ties() {
        assert_eq!(natural_cmp("img02", "img2"), Ordering::Equal);
        assert_eq!(natural_cmp("img02a", "img2b"), Ordering::Less);
    }

    #[test]
    fn test_numbers_before_text_and_case() {
        assert_eq!(natural_cmp("1abc", "abc"), Ordering::Less);
        assert_eq!(natural_cmp("Beach", "apple"), Ordering::Greater);
        assert_eq!(natural_cmp("APPLE", "apple"), Ordering::Equal);
    }

    #[test]
    fn test_shorter_wins_ties() {
        assert_eq!(natural_cmp("photo", "photo1"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_overflowing_run_counts_as_zero() {
        let huge = "99999999999999999999999";
        assert_eq!(natural_cmp(huge, "1"), Ordering::Less);
        assert_eq!(natural_cmp(huge, "0"), Ordering::Equal);
    }

    #[test]
    fn test_folder_sorting() {
        let mut folders = vec![
            PathBuf::from("/sd/Trip 10"),
            PathBuf::from("/other/Trip 2"),
            PathBuf::from("/sd/2019"),
            PathBuf::from("/sd/album"),
        ];
        folders.sort_by(|a, b| compare_folders(a, b));
        let names: Vec<_> = folders
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["2019", "album", "Trip 2", "Trip 10"]);
    }

    #[test]
    fn test_antisymmetric_and_transitive_sample() {
        let names = ["a1", "a01b", "A2", "b", "10", "2", "", "a10", "a1b2", "a1b10"];
        for x in names {
            for y in names {
                assert_eq!(natural_cmp(x, y), natural_cmp(y, x).reverse());
                for z in names {
                    if natural_cmp(x, y) != Ordering::Greater
                        && natural_cmp(y, z) != Ordering::Greater
                    {
                        assert_ne!(natural_cmp(x, z), Ordering::Greater, "{x} {y} {z}");
                    }
                }
            }
        }
    }
}
