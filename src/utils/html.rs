use ammonia;

/// Clean author-supplied text using the ammonia library.
///
/// Quiz titles, question text and option text come from the admin panel;
/// whitelist-based sanitization strips script tags and event-handler
/// attributes before they are stored, as a fail-safe against Stored XSS
/// in whichever client renders them.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_html("What is 2 + 2?<script>alert(1)</script>");
        assert_eq!(cleaned, "What is 2 + 2?");
    }

    #[test]
    fn keeps_plain_text() {
        assert_eq!(clean_html("All of the above"), "All of the above");
    }
}
