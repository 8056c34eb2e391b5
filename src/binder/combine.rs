// Token merging for the combine policies. Callers have already checked arity
// and the operation definition.

/// All tokens as one value.
pub(crate) fn combine_params(tokens: &[String]) -> String {
    tokens.join(" ")
}

/// The first slot absorbs the leading tokens; the last `min(len, max) - 1`
/// tokens stay positional.
pub(crate) fn combine_start(tokens: &[String], max: usize) -> Vec<String> {
    let trailing = tokens.len().min(max).saturating_sub(1);
    let split = tokens.len() - trailing;

    let mut combined = Vec::with_capacity(trailing + 1);
    if split > 0 {
        combined.push(tokens[..split].join(" "));
    }
    combined.extend(tokens[split..].iter().cloned());
    combined
}

/// The first `count - 1` tokens stay positional; the rest fill the last slot.
pub(crate) fn combine_end(tokens: &[String], count: usize) -> Vec<String> {
    let leading = count.saturating_sub(1);

    let mut combined: Vec<String> = tokens.iter().take(leading).cloned().collect();
    combined.push(tokens.get(leading..).unwrap_or(&[]).join(" "));
    combined
}
