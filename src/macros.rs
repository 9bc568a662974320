#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a [`CategorialGrammar`](crate::CategorialGrammar) from inline entries.
///
/// ```
/// use chartrealize::lexicon;
///
/// let grammar = lexicon![
///     "john" => "np" : "John",
///     "sleep" => "s\\np" : "sleeps",
///     "dog" + "def" => "np" : "the dog",
/// ]
/// .unwrap();
/// assert_eq!(grammar.entry_count(), 3);
/// ```
#[macro_export]
macro_rules! lexicon {
    (
        $( $anchor:literal $(+ $extra:literal)* => $cat:literal : $words:literal ),* $(,)?
    ) => {{
        $crate::CategorialGrammar::from_entries([
            $(
                $crate::LexEntrySpec {
                    preds: &[$anchor $(, $extra)*],
                    category: $cat,
                    words: $words,
                }
            ),*
        ])
    }};
}
