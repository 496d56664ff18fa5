const MAX_ERROR_MESSAGE_LEN: usize = 256;

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// Normalizes model output into raw source text.
///
/// A reply that is exactly one markdown fenced block is unwrapped; anything
/// else, including several blocks with prose between them, is returned with
/// surrounding blank lines removed. Leading indentation of the first line is
/// preserved.
pub(crate) fn extract_code_payload(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(fenced) = extract_markdown_fenced_block(trimmed) {
        let fenced = strip_blank_edges(fenced);
        return (!fenced.trim().is_empty()).then(|| fenced.to_string());
    }

    Some(strip_blank_edges(text).to_string())
}

fn extract_markdown_fenced_block(text: &str) -> Option<&str> {
    let stripped = text.strip_prefix("```")?;
    let first_newline = stripped.find('\n')?;
    let body = &stripped[first_newline + 1..];

    // The block ends at the first fence line; it is the payload only when
    // nothing but whitespace follows.
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim() == "```" {
            let trailing = &body[offset + line.len()..];
            return trailing.trim().is_empty().then_some(&body[..offset]);
        }
        offset += line.len();
    }
    None
}

fn strip_blank_edges(text: &str) -> &str {
    let start = text
        .char_indices()
        .take_while(|(_, ch)| ch.is_whitespace())
        .filter(|(_, ch)| *ch == '\n')
        .last()
        .map(|(index, _)| index + 1)
        .unwrap_or(0);
    text[start..].trim_end()
}
