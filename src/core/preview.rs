/*
 * Preview truncation. A preview is what the user sees; the export path never
 * goes through here and always writes the full text.
 */

pub const TRUNCATION_MARKER: &str =
    "\n\n... [Preview Truncated for Performance - Full content will be exported] ...";

/*
 * Returns `full_text` unchanged when it has at most `char_limit` characters,
 * otherwise its first `char_limit` characters followed by `TRUNCATION_MARKER`.
 * Characters are Unicode scalar values, so the cut never splits a code point.
 */
pub fn derive_preview(full_text: &str, char_limit: usize) -> String {
    match full_text.char_indices().nth(char_limit) {
        None => full_text.to_string(),
        Some((cut_at, _)) => {
            log::trace!(
                "Preview: Truncating {} bytes at byte {cut_at} ({char_limit} chars).",
                full_text.len()
            );
            let mut preview = String::with_capacity(cut_at + TRUNCATION_MARKER.len());
            preview.push_str(&full_text[..cut_at]);
            preview.push_str(TRUNCATION_MARKER);
            preview
        }
    }
}
