// Doc-comment normalization: a raw `/** ... */` block becomes a one-line
// summary suitable for an index view. Truncation keeps the first sentence
// when the text uses sentence-ending periods, otherwise caps the word count.

const SUMMARY_WORD_LIMIT: usize = 10;

pub fn normalize_doc_comment(raw: &str) -> String {
    let body = raw.strip_prefix("/**").unwrap_or(raw);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut kept_lines = Vec::new();
    for line in body.lines() {
        let mut line = line.trim();
        if let Some(stripped) = line.strip_prefix('*') {
            line = stripped.trim();
        }

        // Annotation lines (@param, @return, ...) never contribute to the summary
        if line.is_empty() || line.starts_with('@') {
            continue;
        }

        kept_lines.push(line);
    }

    let clean_text = kept_lines.join(" ");

    // The first-period rule only makes sense for text with Latin script;
    // anything else is returned whole.
    let truncated = if clean_text.chars().any(|c| c.is_ascii_alphabetic()) {
        match clean_text.find('.') {
            Some(dot) => clean_text[..=dot].to_string(),
            None => {
                let words: Vec<&str> = clean_text.split_whitespace().collect();
                if words.len() > SUMMARY_WORD_LIMIT {
                    format!("{}...", words[..SUMMARY_WORD_LIMIT].join(" "))
                } else {
                    clean_text
                }
            }
        }
    } else {
        clean_text
    };

    truncated.trim().to_string()
}
