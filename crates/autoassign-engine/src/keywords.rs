/// `true` when any skip keyword appears in `title`, ignoring case.
///
/// An empty keyword list never skips.
///
/// # Examples
///
/// ```
/// use autoassign_engine::keywords::should_skip;
///
/// let keywords = vec!["wip".to_string()];
/// assert!(should_skip("WIP: new parser", &keywords));
/// assert!(!should_skip("New parser", &keywords));
/// ```
pub fn should_skip(title: &str, skip_keywords: &[String]) -> bool {
    let title = title.to_lowercase();
    skip_keywords
        .iter()
        .any(|keyword| title.contains(&keyword.to_lowercase()))
}
