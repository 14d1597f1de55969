//! "Did you mean" suggestions for mistyped sub-command names.

/// Default edit distance under which a sub-command name is suggested.
pub const DEFAULT_SUGGESTIONS_MINIMUM_DISTANCE: usize = 2;

/// Levenshtein edit distance between two strings, by character.
///
/// When `ignore_case` is set both inputs are lowercased first.
///
/// # Examples
///
/// ```
/// use command_guard_core::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting", false), 3);
/// assert_eq!(levenshtein("Push", "push", true), 0);
/// ```
pub fn levenshtein(a: &str, b: &str, ignore_case: bool) -> usize {
    let (a, b) = if ignore_case {
        (a.to_lowercase(), b.to_lowercase())
    } else {
        (a.to_string(), b.to_string())
    };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Picks the candidates that look like what the user meant by `typed`.
///
/// A candidate matches when it is within `minimum_distance` edits of `typed`
/// or starts with it, both compared case-insensitively. Order follows
/// `candidates`; duplicates are dropped.
pub fn suggestions_for<'a, I>(typed: &str, candidates: I, minimum_distance: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let lowered = typed.to_lowercase();
    let mut suggestions: Vec<String> = Vec::new();

    for candidate in candidates {
        let close = levenshtein(typed, candidate, true) <= minimum_distance;
        let prefixed = candidate.to_lowercase().starts_with(&lowered);
        if (close || prefixed) && !suggestions.iter().any(|s| s == candidate) {
            suggestions.push(candidate.to_string());
        }
    }

    suggestions
}

/// Renders suggestions the way they are appended to an error message.
pub(crate) fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n\nDid you mean this?\n");
    for suggestion in suggestions {
        out.push('\t');
        out.push_str(suggestion);
        out.push('\n');
    }
    out
}
